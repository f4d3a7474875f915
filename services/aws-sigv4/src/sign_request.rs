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

use crate::canonical::{
    canonicalize_headers, canonicalize_path, canonicalize_query, signed_headers,
    signed_headers_of, CanonicalRequest,
};
use crate::constants::*;
use crate::key::{derive_ecdsa_private_key, generate_signing_key};
use crate::signing_result::*;
use crate::{
    Credentials, CredentialsSource, SignatureType, SignedBodyHeader, SigningAlgorithm,
    SigningConfig, SigningResult,
};
use awsauth_core::time::{format_date, format_iso8601};
use awsauth_core::{
    Context, Error, Property, Result, Signable, PROPERTY_CANONICAL_REQUEST, PROPERTY_HTTP_METHOD,
    PROPERTY_LIST_HEADERS, PROPERTY_URI,
};
use log::{debug, warn};

/// Sign a signable with the given config.
///
/// Credentials bound to the config are used directly. Otherwise they are
/// resolved through the configured provider, bounded by
/// [`SigningConfig::credentials_timeout`]; resolving them requires a tokio runtime.
///
/// The signable is only read, the outcome is reported through the returned
/// [`SigningResult`].
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv.html)
pub async fn sign_request(
    ctx: &Context,
    signable: &Signable,
    config: &SigningConfig,
) -> Result<SigningResult> {
    let cred = resolve_credentials(ctx, config).await?;
    sign_with_credentials(ctx, signable, config, &cred)
}

/// Sign a signable without awaiting anything.
///
/// Only works for configs with bound credentials, see
/// [`SigningConfig::is_signing_synchronous`].
pub fn sign_request_sync(
    ctx: &Context,
    signable: &Signable,
    config: &SigningConfig,
) -> Result<SigningResult> {
    let Some(cred) = config.credentials() else {
        return Err(Error::credential_unavailable(
            "signing synchronously requires credentials bound to the config",
        ));
    };
    sign_with_credentials(ctx, signable, config, cred)
}

async fn resolve_credentials(ctx: &Context, config: &SigningConfig) -> Result<Credentials> {
    let provider = match config.credentials_source() {
        CredentialsSource::Static(cred) => return Ok(cred.acquire()),
        CredentialsSource::Provider(provider) => provider,
    };

    let timeout = config.credentials_timeout();
    match tokio::time::timeout(timeout, provider.provide_credential(ctx)).await {
        Ok(Ok(Some(cred))) => Ok(cred),
        Ok(Ok(None)) => {
            warn!("credential provider {provider:?} returned no credentials");
            Err(Error::credential_unavailable(
                "credential provider returned no credentials",
            ))
        }
        Ok(Err(err)) => {
            warn!("credential provider {provider:?} failed: {err}");
            Err(Error::credential_unavailable("credential provider failed").with_source(err))
        }
        Err(err) => {
            warn!("credential provider {provider:?} timed out after {timeout:?}");
            Err(
                Error::credential_unavailable(format!("credential provider timed out after {timeout:?}"))
                    .with_source(err),
            )
        }
    }
}

/// Everything computed before the signature itself.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub canonical_request: String,
    pub signed_headers: String,
    /// Headers to add that take part in the signature.
    pub headers: Vec<Property>,
    /// Query params to add that take part in the signature.
    pub params: Vec<Property>,
    /// Session token left out of the signature by `omit_session_token`.
    pub late_session_token: Option<String>,
}

/// Credential scope.
///
/// - SigV4: `20150830/us-east-1/service/aws4_request`
/// - SigV4A: `20150830/service/aws4_request`
pub(crate) fn credential_scope(config: &SigningConfig) -> String {
    match config.algorithm() {
        SigningAlgorithm::SigV4 => format!(
            "{}/{}/{}/{AWS4_REQUEST}",
            format_date(config.date()),
            config.region(),
            config.service()
        ),
        SigningAlgorithm::SigV4A => format!(
            "{}/{}/{AWS4_REQUEST}",
            format_date(config.date()),
            config.service()
        ),
    }
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20150830T123600Z
/// 20150830/us-east-1/service/aws4_request
/// <hashed_canonical_request>
/// ```
pub(crate) fn string_to_sign(ctx: &Context, config: &SigningConfig, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        config.algorithm().as_str(),
        format_iso8601(config.date()),
        credential_scope(config),
        ctx.crypto().sha256_hex(canonical_request.as_bytes())
    )
}

/// Hash of the payload as it goes into the canonical request.
fn payload_hash(ctx: &Context, signable: &Signable, config: &SigningConfig) -> Result<String> {
    if let Some(v) = config.signed_body_value() {
        return Ok(v.to_string());
    }

    match signable.get_payload_stream() {
        Some(stream) => Ok(ctx.crypto().sha256_hex(&stream.read_all()?)),
        None => Ok(ctx.crypto().sha256_hex(b"")),
    }
}

/// Build the canonical request of a signable, along with the headers and
/// params signing adds.
pub(crate) fn prepare_request(
    ctx: &Context,
    signable: &Signable,
    config: &SigningConfig,
    cred: &Credentials,
) -> Result<PreparedRequest> {
    let signature_type = config.signature_type();

    if signature_type.is_canonical_request() {
        let creq = signable
            .get_property(PROPERTY_CANONICAL_REQUEST)
            .ok_or_else(|| {
                Error::missing_property(format!(
                    "signable has no {PROPERTY_CANONICAL_REQUEST} property"
                ))
            })?;
        return Ok(PreparedRequest {
            canonical_request: creq.to_string(),
            signed_headers: signed_headers_of(creq).to_string(),
            headers: Vec::new(),
            params: Vec::new(),
            late_session_token: None,
        });
    }

    let method = signable.get_property(PROPERTY_HTTP_METHOD).ok_or_else(|| {
        Error::missing_property(format!("signable has no {PROPERTY_HTTP_METHOD} property"))
    })?;
    let uri = signable
        .get_property(PROPERTY_URI)
        .filter(|v| !v.is_empty())
        .unwrap_or("/");
    let (path, query) = uri.split_once('?').unwrap_or((uri, ""));

    let payload_hash = payload_hash(ctx, signable, config)?;
    let now = config.date();

    let session_token = cred.session_token();
    let omit_session_token = config.flags().omit_session_token;
    let late_session_token = session_token
        .filter(|_| omit_session_token)
        .map(|v| v.to_string());

    let mut headers: Vec<Property> = Vec::new();
    let mut params: Vec<Property> = Vec::new();

    if signature_type == SignatureType::HttpRequestHeaders {
        headers.push((X_AMZ_DATE.to_string(), format_iso8601(now)));
        if config.algorithm() == SigningAlgorithm::SigV4A {
            headers.push((X_AMZ_REGION_SET.to_string(), config.region().to_string()));
        }
        if config.signed_body_header() == SignedBodyHeader::XAmzContentSha256 {
            headers.push((X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.clone()));
        }
        if let Some(token) = session_token.filter(|_| !omit_session_token) {
            headers.push((X_AMZ_SECURITY_TOKEN.to_string(), token.to_string()));
        }
    }

    let canonical_headers = canonicalize_headers(
        signable.get_list(PROPERTY_LIST_HEADERS),
        &headers,
        |name| config.should_sign_header(name),
    );
    let signed_headers = signed_headers(&canonical_headers);

    if signature_type == SignatureType::HttpRequestQueryParams {
        params.push((
            X_AMZ_ALGORITHM_QUERY.to_string(),
            config.algorithm().as_str().to_string(),
        ));
        params.push((
            X_AMZ_CREDENTIAL_QUERY.to_string(),
            format!("{}/{}", cred.access_key_id(), credential_scope(config)),
        ));
        params.push((X_AMZ_DATE_QUERY.to_string(), format_iso8601(now)));
        params.push((X_AMZ_SIGNED_HEADERS_QUERY.to_string(), signed_headers.clone()));
        if let Some(expires) = config.expiration_in_seconds() {
            params.push((X_AMZ_EXPIRES_QUERY.to_string(), expires.to_string()));
        }
        if let Some(token) = session_token.filter(|_| !omit_session_token) {
            params.push((X_AMZ_SECURITY_TOKEN_QUERY.to_string(), token.to_string()));
        }
        if config.algorithm() == SigningAlgorithm::SigV4A {
            params.push((X_AMZ_REGION_SET_QUERY.to_string(), config.region().to_string()));
        }
    }

    let creq = CanonicalRequest {
        method: method.to_string(),
        path: canonicalize_path(path, config.flags())?,
        query: canonicalize_query(query, &params),
        headers: canonical_headers,
        payload_hash,
    };

    Ok(PreparedRequest {
        canonical_request: creq.to_string(),
        signed_headers,
        headers,
        params,
        late_session_token,
    })
}

/// Compute the signature over a string to sign.
fn calculate_signature(
    ctx: &Context,
    config: &SigningConfig,
    cred: &Credentials,
    string_to_sign: &str,
) -> Result<String> {
    match config.algorithm() {
        SigningAlgorithm::SigV4 => {
            let signing_key = generate_signing_key(
                ctx,
                cred.secret_access_key(),
                config.date(),
                config.region(),
                config.service(),
            );
            Ok(hex::encode(
                ctx.crypto()
                    .hmac_sha256(&signing_key, string_to_sign.as_bytes()),
            ))
        }
        SigningAlgorithm::SigV4A => {
            let private_key =
                derive_ecdsa_private_key(ctx, cred.access_key_id(), cred.secret_access_key())?;
            let signature = ctx
                .crypto()
                .ecdsa_p256_sign(&private_key, string_to_sign.as_bytes())?;
            Ok(hex::encode(signature))
        }
    }
}

fn sign_with_credentials(
    ctx: &Context,
    signable: &Signable,
    config: &SigningConfig,
    cred: &Credentials,
) -> Result<SigningResult> {
    let prepared = prepare_request(ctx, signable, config, cred)?;
    debug!("calculated canonical request: {}", prepared.canonical_request);

    let scope = credential_scope(config);
    debug!("calculated scope: {scope}");

    let string_to_sign = string_to_sign(ctx, config, &prepared.canonical_request);
    debug!("calculated string to sign: {string_to_sign}");

    let signature = calculate_signature(ctx, config, cred, &string_to_sign)?;

    let mut result = SigningResult::new();
    result.set_property(RESULT_SIGNATURE, &signature)?;
    result.set_property(RESULT_CANONICAL_REQUEST, &prepared.canonical_request)?;
    result.set_property(RESULT_STRING_TO_SIGN, &string_to_sign)?;
    result.set_property(RESULT_SIGNED_HEADERS, &prepared.signed_headers)?;

    for (name, value) in &prepared.headers {
        result.append_to_list(RESULT_LIST_HEADERS, name, value)?;
    }
    for (name, value) in &prepared.params {
        result.append_to_list(RESULT_LIST_PARAMS, name, value)?;
    }

    if config.signature_type().is_query_params() {
        if let Some(token) = &prepared.late_session_token {
            result.append_to_list(RESULT_LIST_PARAMS, X_AMZ_SECURITY_TOKEN_QUERY, token)?;
        }
        result.append_to_list(RESULT_LIST_PARAMS, X_AMZ_SIGNATURE_QUERY, &signature)?;
    } else {
        if let Some(token) = &prepared.late_session_token {
            result.append_to_list(RESULT_LIST_HEADERS, X_AMZ_SECURITY_TOKEN, token)?;
        }

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            config.algorithm().as_str(),
            cred.access_key_id(),
            scope,
            prepared.signed_headers,
            signature
        );
        result.set_property(RESULT_AUTHORIZATION, &authorization)?;
        result.append_to_list(RESULT_LIST_HEADERS, AUTHORIZATION, &authorization)?;
    }

    Ok(result)
}
