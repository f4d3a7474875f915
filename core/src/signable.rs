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

use crate::property::{Property, PropertySource, PropertyStore};
use crate::{Error, Result};
use bytes::Bytes;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Property holding the HTTP method, e.g. `GET`.
pub const PROPERTY_HTTP_METHOD: &str = "http-method";
/// Property holding the request path with an optional `?query`.
pub const PROPERTY_URI: &str = "uri";
/// Property holding a prebuilt canonical request.
pub const PROPERTY_CANONICAL_REQUEST: &str = "canonical-request";
/// Property list holding request headers.
pub const PROPERTY_LIST_HEADERS: &str = "headers";

/// PayloadStream is a read-only handle to a request body owned by the caller.
///
/// The signer only reads it to hash the payload when the signing config
/// doesn't provide a precomputed body value.
pub trait PayloadStream: Debug + Send + Sync + 'static {
    /// Read the whole payload.
    fn read_all(&self) -> Result<Bytes>;
}

impl PayloadStream for Bytes {
    fn read_all(&self) -> Result<Bytes> {
        Ok(self.clone())
    }
}

/// Signable is the thing to be signed.
///
/// It exposes named properties, named property lists and an optional payload
/// stream to a signing algorithm.
///
/// Populate it fully, then sign: signing borrows the signable immutably and
/// only ever reads from it, so it can be signed any number of times.
///
/// ## Example
///
/// ```
/// use awsauth_core::Signable;
///
/// # fn main() -> awsauth_core::Result<()> {
/// let mut signable = Signable::new();
/// signable.set_property("http-method", "GET")?;
/// signable.set_property("uri", "/hello?a=b")?;
/// signable.append_to_list("headers", "host", "example.amazonaws.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Signable {
    store: PropertyStore,
    payload: Option<Arc<dyn PayloadStream>>,
}

impl Debug for Signable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signable")
            .field("store", &self.store)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl Signable {
    /// Create an empty signable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signable from an http request.
    ///
    /// Fills `http-method`, `uri` (path and query) and the `headers` list.
    pub fn from_http_request(parts: &http::request::Parts) -> Result<Self> {
        let mut signable = Self::new();

        signable.set_property(PROPERTY_HTTP_METHOD, parts.method.as_str())?;
        let uri = parts
            .uri
            .path_and_query()
            .map(|v| v.as_str())
            .unwrap_or("/");
        signable.set_property(PROPERTY_URI, uri)?;

        // Make sure `headers` exists even for a request without headers.
        signable.set_list(PROPERTY_LIST_HEADERS, [])?;
        let mut has_host = false;
        for (name, value) in parts.headers.iter() {
            has_host |= *name == http::header::HOST;
            let value = value.to_str().map_err(|e| {
                Error::invalid_argument(format!("header {name} is not valid utf-8")).with_source(e)
            })?;
            signable.append_to_list(PROPERTY_LIST_HEADERS, name.as_str(), value)?;
        }

        if !has_host {
            if let Some(authority) = parts.uri.authority() {
                signable.append_to_list(PROPERTY_LIST_HEADERS, "host", authority.as_str())?;
            }
        }

        Ok(signable)
    }

    /// Attach a payload stream.
    ///
    /// The stream stays owned by the caller, the signable only keeps a shared reference.
    pub fn with_payload_stream(mut self, stream: Arc<dyn PayloadStream>) -> Self {
        self.payload = Some(stream);
        self
    }

    /// Get the attached payload stream.
    pub fn get_payload_stream(&self) -> Option<&Arc<dyn PayloadStream>> {
        self.payload.as_ref()
    }

    /// Insert or overwrite a property.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.store.set_property(name, value)
    }

    /// Get a property.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.store.get_property(name)
    }

    /// Append one entry to a property list.
    pub fn append_to_list(&mut self, list_name: &str, name: &str, value: &str) -> Result<()> {
        self.store.append_to_list(list_name, name, value)
    }

    /// Replace a property list.
    pub fn set_list<'a>(
        &mut self,
        list_name: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        self.store.set_list(list_name, pairs)
    }

    /// Append entries to a property list.
    pub fn extend_list<'a>(
        &mut self,
        list_name: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        self.store.extend_list(list_name, pairs)
    }

    /// Get a property list.
    pub fn get_list(&self, list_name: &str) -> &[Property] {
        self.store.get_list(list_name)
    }
}

impl PropertySource for Signable {
    fn get_property(&self, name: &str) -> Option<&str> {
        self.store.get_property(name)
    }

    fn get_property_list(&self, name: &str) -> &[Property] {
        self.store.get_list(name)
    }
}
