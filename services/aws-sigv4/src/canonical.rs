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

//! Canonical request building.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html#create-canonical-request)

use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, SKIPPED_HEADERS, X_AMZ_SIGNATURE_QUERY,
};
use crate::SigningFlags;
use awsauth_core::{Error, Property, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// CanonicalRequest is the normalized form of a request that gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CanonicalRequest {
    pub method: String,
    pub path: String,
    /// Encoded and sorted.
    pub query: Vec<(String, String)>,
    /// Lower-cased names, normalized values, sorted by name.
    pub headers: Vec<(String, String)>,
    pub payload_hash: String,
}

impl CanonicalRequest {
    /// Names of the signed headers joined by `;`.
    pub fn signed_headers(&self) -> String {
        signed_headers(&self.headers)
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
        }
        writeln!(f)?;
        for (k, v) in self.headers.iter() {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Names of the given canonical headers joined by `;`.
pub(crate) fn signed_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

/// Extract the signed headers line from a prebuilt canonical request.
///
/// It's the second to last line, right before the payload hash.
pub(crate) fn signed_headers_of(canonical_request: &str) -> &str {
    canonical_request.lines().rev().nth(1).unwrap_or_default()
}

/// Build the canonical path.
pub(crate) fn canonicalize_path(path: &str, flags: SigningFlags) -> Result<String> {
    let path = if path.is_empty() { "/" } else { path };
    let decoded = percent_decode_str(path).decode_utf8().map_err(|e| {
        Error::invalid_argument(format!("path {path} is not valid utf-8")).with_source(e)
    })?;

    let decoded = if flags.normalize_uri_path {
        normalize_path(&decoded)
    } else {
        decoded.into_owned()
    };

    let encoded = utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string();
    if flags.use_double_uri_encode {
        Ok(utf8_percent_encode(&encoded, &AWS_URI_ENCODE_SET).to_string())
    } else {
        Ok(encoded)
    }
}

/// Remove `.` and `..` segments and collapse duplicated slashes.
///
/// A trailing slash is kept.
fn normalize_path(path: &str) -> String {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');
    normalized.push_str(&segments.join("/"));
    if !segments.is_empty() && path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Build the canonical query.
///
/// `query` is the raw query string of the request; pairs whose name is in
/// `extra` are dropped from it and `extra` is added instead. A stale
/// `X-Amz-Signature` is never part of the canonical query.
pub(crate) fn canonicalize_query(query: &str, extra: &[Property]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| {
            k != X_AMZ_SIGNATURE_QUERY && !extra.iter().any(|(name, _)| name == k)
        })
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(&v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();

    pairs.extend(extra.iter().map(|(k, v)| {
        (
            utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
            utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
        )
    }));

    // Sort by param name, then by value.
    pairs.sort();
    pairs
}

/// Build the canonical headers.
///
/// Names are lower-cased, values trimmed with inner whitespace runs
/// collapsed, and repeated names merged with `,` in order of appearance.
/// Headers in the built-in skip list, headers rejected by `should_sign` and
/// headers overridden by `extra` are dropped. `extra` headers are always signed.
pub(crate) fn canonicalize_headers(
    headers: &[Property],
    extra: &[Property],
    should_sign: impl Fn(&str) -> bool,
) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.to_ascii_lowercase();
        if SKIPPED_HEADERS.contains(&name.as_str())
            || extra.iter().any(|(k, _)| k.eq_ignore_ascii_case(&name))
            || !should_sign(&name)
        {
            continue;
        }
        merged
            .entry(name)
            .or_default()
            .push(normalize_header_value(value));
    }
    for (name, value) in extra {
        merged
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(normalize_header_value(value));
    }

    merged
        .into_iter()
        .map(|(k, v)| (k, v.join(",")))
        .collect()
}

/// Trim the value and collapse inner whitespace runs into a single space.
fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
