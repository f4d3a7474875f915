// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::{AWS_QUERY_ENCODE_SET, X_AMZ_SECURITY_TOKEN};
use awsauth_core::{Property, PropertySource, PropertyStore, Result};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::request::Parts;
use http::uri::PathAndQuery;
use http::Uri;
use percent_encoding::utf8_percent_encode;
use std::fmt::Write;

/// Hex encoded signature.
pub const RESULT_SIGNATURE: &str = "signature";
/// Canonical request the signature was computed over.
pub const RESULT_CANONICAL_REQUEST: &str = "canonical_request";
/// String to sign the signature was computed over.
pub const RESULT_STRING_TO_SIGN: &str = "string_to_sign";
/// `;` separated names of the signed headers.
pub const RESULT_SIGNED_HEADERS: &str = "signed_headers";
/// Value of the `Authorization` header, header signature types only.
pub const RESULT_AUTHORIZATION: &str = "Authorization";
/// List of headers to add to the request.
pub const RESULT_LIST_HEADERS: &str = "headers";
/// List of query params to add to the request, values not encoded.
pub const RESULT_LIST_PARAMS: &str = "params";

/// SigningResult is the output of one signing pass.
///
/// It's a read-only projection over named properties and lists. Asking for
/// something that isn't there returns `None` or an empty list.
#[derive(Debug, Clone, Default)]
pub struct SigningResult {
    store: PropertyStore,
}

impl SigningResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.store.set_property(name, value)
    }

    pub(crate) fn append_to_list(&mut self, list_name: &str, name: &str, value: &str) -> Result<()> {
        self.store.append_to_list(list_name, name, value)
    }

    /// Get a property of the result.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.store.get_property(name)
    }

    /// Get a property list of the result.
    pub fn get_property_list(&self, name: &str) -> &[Property] {
        self.store.get_list(name)
    }

    /// Hex encoded signature.
    pub fn signature(&self) -> Option<&str> {
        self.get_property(RESULT_SIGNATURE)
    }

    /// Write the headers and query params of this result into an http request.
    ///
    /// Headers replace existing ones with the same name. Params are appended
    /// to the query after removing existing pairs with the same name.
    pub fn apply_to_request(&self, parts: &mut Parts) -> Result<()> {
        for (name, value) in self.get_property_list(RESULT_LIST_HEADERS) {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let mut value = HeaderValue::from_str(value)?;
            // Set sensitive to avoid leaking.
            if name == AUTHORIZATION || name.as_str() == X_AMZ_SECURITY_TOKEN {
                value.set_sensitive(true);
            }
            parts.headers.insert(name, value);
        }

        let params = self.get_property_list(RESULT_LIST_PARAMS);
        if params.is_empty() {
            return Ok(());
        }

        let mut uri_parts = parts.uri.clone().into_parts();
        let (path, query) = match uri_parts.path_and_query.as_ref() {
            Some(paq) => (paq.path(), paq.query().unwrap_or_default()),
            None => ("/", ""),
        };

        let mut s = String::with_capacity(path.len() + query.len() + 256);
        s.push_str(path);
        s.push('?');
        // Existing pairs overridden by a signed param are dropped.
        for pair in query.split('&').filter(|v| !v.is_empty()) {
            let overridden = form_urlencoded::parse(pair.as_bytes())
                .next()
                .is_some_and(|(k, _)| params.iter().any(|(name, _)| *name == k));
            if !overridden {
                s.push_str(pair);
                s.push('&');
            }
        }
        for (i, (k, v)) in params.iter().enumerate() {
            if i > 0 {
                s.push('&');
            }
            write!(
                s,
                "{}={}",
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)
            )?;
        }

        uri_parts.path_and_query = Some(PathAndQuery::try_from(s)?);
        parts.uri = Uri::from_parts(uri_parts)?;
        Ok(())
    }
}

impl PropertySource for SigningResult {
    fn get_property(&self, name: &str) -> Option<&str> {
        self.store.get_property(name)
    }

    fn get_property_list(&self, name: &str) -> &[Property] {
        self.store.get_list(name)
    }
}
