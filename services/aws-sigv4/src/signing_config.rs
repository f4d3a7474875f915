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

use crate::constants::{AWS4_ECDSA_P256_SHA256, AWS4_HMAC_SHA256};
use crate::{Config, Credentials};
use awsauth_core::time::{now, DateTime};
use awsauth_core::{Error, ProvideCredential, Result};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for resolving credentials through a provider.
pub const DEFAULT_CREDENTIALS_TIMEOUT: Duration = Duration::from_secs(10);

/// Signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    /// HMAC-SHA256 based, scoped to a single region.
    #[default]
    SigV4,
    /// ECDSA-P256 based, valid for a set of regions.
    SigV4A,
}

impl SigningAlgorithm {
    /// Algorithm name as written into the string to sign.
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::SigV4 => AWS4_HMAC_SHA256,
            SigningAlgorithm::SigV4A => AWS4_ECDSA_P256_SHA256,
        }
    }
}

/// What gets signed and where the signature goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    /// Sign an http request, put the signature in the `Authorization` header.
    HttpRequestHeaders,
    /// Sign an http request, put the signature in query params (presign).
    HttpRequestQueryParams,
    /// Sign a prebuilt canonical request, signature goes to headers.
    CanonicalRequestHeaders,
    /// Sign a prebuilt canonical request, signature goes to query params.
    CanonicalRequestQueryParams,
    /// Sign one chunk of a streaming body.
    HttpRequestChunk,
    /// Sign one event of an event stream.
    HttpRequestEvent,
}

impl SignatureType {
    /// Whether the signature is carried in query params.
    pub fn is_query_params(&self) -> bool {
        matches!(
            self,
            SignatureType::HttpRequestQueryParams | SignatureType::CanonicalRequestQueryParams
        )
    }

    /// Whether the signable carries a prebuilt canonical request.
    pub fn is_canonical_request(&self) -> bool {
        matches!(
            self,
            SignatureType::CanonicalRequestHeaders | SignatureType::CanonicalRequestQueryParams
        )
    }
}

/// Whether signing adds a header carrying the payload hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignedBodyHeader {
    /// Don't add any header.
    #[default]
    None,
    /// Add `x-amz-content-sha256`.
    XAmzContentSha256,
}

/// Flags tweaking canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningFlags {
    /// Percent-encode the canonical path twice. Every service except S3 expects this.
    pub use_double_uri_encode: bool,
    /// Remove dot segments and duplicated slashes from the path.
    pub normalize_uri_path: bool,
    /// Add the session token after signing so that it's not part of the signature.
    pub omit_session_token: bool,
}

impl Default for SigningFlags {
    fn default() -> Self {
        Self {
            use_double_uri_encode: true,
            normalize_uri_path: true,
            omit_session_token: false,
        }
    }
}

impl SigningFlags {
    /// Flags used by S3: no double encoding and no path normalization.
    pub fn s3() -> Self {
        Self {
            use_double_uri_encode: false,
            normalize_uri_path: false,
            omit_session_token: false,
        }
    }
}

/// Predicate deciding whether a header (lower-cased name) takes part in the signature.
pub type ShouldSignHeader = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Where credentials come from.
#[derive(Clone)]
pub enum CredentialsSource {
    /// Credentials bound at construction, signing can run synchronously.
    Static(Credentials),
    /// Credentials resolved by a provider at signing time.
    Provider(Arc<dyn ProvideCredential<Credential = Credentials>>),
}

impl Debug for CredentialsSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialsSource::Static(cred) => f.debug_tuple("Static").field(cred).finish(),
            CredentialsSource::Provider(p) => f.debug_tuple("Provider").field(p).finish(),
        }
    }
}

/// SigningConfig is the validated bundle of everything one signing pass needs.
///
/// It can only be created through [`SigningConfigBuilder::build`], so every
/// config in hand has passed validation.
#[derive(Clone)]
pub struct SigningConfig {
    algorithm: SigningAlgorithm,
    signature_type: SignatureType,
    region: String,
    service: String,
    date: DateTime,
    signed_body_value: Option<String>,
    signed_body_header: SignedBodyHeader,
    credentials: CredentialsSource,
    flags: SigningFlags,
    should_sign_header: Option<ShouldSignHeader>,
    expiration_in_seconds: Option<u64>,
    credentials_timeout: Duration,
}

impl Debug for SigningConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("algorithm", &self.algorithm)
            .field("signature_type", &self.signature_type)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("date", &self.date)
            .field("signed_body_value", &self.signed_body_value)
            .field("signed_body_header", &self.signed_body_header)
            .field("credentials", &self.credentials)
            .field("flags", &self.flags)
            .field("should_sign_header", &self.should_sign_header.is_some())
            .field("expiration_in_seconds", &self.expiration_in_seconds)
            .field("credentials_timeout", &self.credentials_timeout)
            .finish()
    }
}

impl SigningConfig {
    /// Start building a config.
    pub fn builder(
        algorithm: SigningAlgorithm,
        signature_type: SignatureType,
    ) -> SigningConfigBuilder {
        SigningConfigBuilder::new(algorithm, signature_type)
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Signature type.
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Region, or the region set for SigV4A.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Signing time.
    pub fn date(&self) -> DateTime {
        self.date
    }

    /// Precomputed payload hash, or a marker such as `UNSIGNED-PAYLOAD`.
    pub fn signed_body_value(&self) -> Option<&str> {
        self.signed_body_value.as_deref()
    }

    /// Which header carries the payload hash.
    pub fn signed_body_header(&self) -> SignedBodyHeader {
        self.signed_body_header
    }

    /// Credentials source.
    pub fn credentials_source(&self) -> &CredentialsSource {
        &self.credentials
    }

    /// Credentials bound at construction, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        match &self.credentials {
            CredentialsSource::Static(cred) => Some(cred),
            CredentialsSource::Provider(_) => None,
        }
    }

    /// Canonicalization flags.
    pub fn flags(&self) -> SigningFlags {
        self.flags
    }

    /// Whether the given lower-cased header name takes part in the signature.
    pub fn should_sign_header(&self, name: &str) -> bool {
        self.should_sign_header
            .as_ref()
            .map_or(true, |should_sign| should_sign(name))
    }

    /// Lifetime of a presigned request.
    pub fn expiration_in_seconds(&self) -> Option<u64> {
        self.expiration_in_seconds
    }

    /// Deadline for resolving credentials through a provider.
    pub fn credentials_timeout(&self) -> Duration {
        self.credentials_timeout
    }

    /// Whether signing can complete without waiting on a provider.
    pub fn is_signing_synchronous(&self) -> bool {
        matches!(self.credentials, CredentialsSource::Static(_))
    }
}

/// Builder for [`SigningConfig`].
///
/// ```
/// use awsauth_core::Result;
/// use awsauth_sigv4::{Credentials, SignatureType, SigningAlgorithm, SigningConfig};
///
/// # fn main() -> Result<()> {
/// let config = SigningConfig::builder(SigningAlgorithm::SigV4, SignatureType::HttpRequestHeaders)
///     .with_region("us-east-1")
///     .with_service("s3")
///     .with_credentials(Credentials::new("access_key_id", "secret_access_key", None, None)?)
///     .build()?;
/// assert!(config.is_signing_synchronous());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SigningConfigBuilder {
    algorithm: SigningAlgorithm,
    signature_type: SignatureType,
    region: String,
    service: String,
    date: Option<DateTime>,
    signed_body_value: Option<String>,
    signed_body_header: SignedBodyHeader,
    credentials: Option<CredentialsSource>,
    flags: SigningFlags,
    should_sign_header: Option<PredicateSlot>,
    unsigned_headers: Vec<String>,
    expiration_in_seconds: Option<u64>,
    credentials_timeout: Duration,
}

#[derive(Clone)]
struct PredicateSlot(ShouldSignHeader);

impl Debug for PredicateSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("<predicate>")
    }
}

impl SigningConfigBuilder {
    /// Create a builder for the given algorithm and signature type.
    pub fn new(algorithm: SigningAlgorithm, signature_type: SignatureType) -> Self {
        Self {
            algorithm,
            signature_type,
            region: String::new(),
            service: String::new(),
            date: None,
            signed_body_value: None,
            signed_body_header: SignedBodyHeader::None,
            credentials: None,
            flags: SigningFlags::default(),
            should_sign_header: None,
            unsigned_headers: Vec::new(),
            expiration_in_seconds: None,
            credentials_timeout: DEFAULT_CREDENTIALS_TIMEOUT,
        }
    }

    /// Set the region, or the region set for SigV4A (e.g. `*` or `us-east-1,us-west-2`).
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Set the service name.
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Set the signing time, defaults to now.
    pub fn with_date(mut self, date: DateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Use a precomputed payload hash or a marker like `UNSIGNED-PAYLOAD`.
    pub fn with_signed_body_value(mut self, value: &str) -> Self {
        self.signed_body_value = Some(value.to_string());
        self
    }

    /// Set which header carries the payload hash.
    pub fn with_signed_body_header(mut self, header: SignedBodyHeader) -> Self {
        self.signed_body_header = header;
        self
    }

    /// Bind concrete credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(CredentialsSource::Static(credentials));
        self
    }

    /// Resolve credentials through a provider at signing time.
    pub fn with_credentials_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credentials>,
    ) -> Self {
        self.credentials = Some(CredentialsSource::Provider(Arc::new(provider)));
        self
    }

    /// Set canonicalization flags.
    pub fn with_flags(mut self, flags: SigningFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Only sign headers accepted by this predicate.
    ///
    /// The predicate receives lower-cased header names.
    pub fn with_should_sign_header(
        mut self,
        f: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_sign_header = Some(PredicateSlot(Arc::new(f)));
        self
    }

    /// Never sign these headers. Names are matched case-insensitively.
    pub fn with_unsigned_headers<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.unsigned_headers
            .extend(names.into_iter().map(|v| v.to_ascii_lowercase()));
        self
    }

    /// Set the lifetime of a presigned request.
    pub fn with_expiration_in_seconds(mut self, secs: u64) -> Self {
        self.expiration_in_seconds = Some(secs);
        self
    }

    /// Set the deadline for resolving credentials through a provider.
    pub fn with_credentials_timeout(mut self, timeout: Duration) -> Self {
        self.credentials_timeout = timeout;
        self
    }

    /// Apply region and static credentials loaded into a [`Config`].
    ///
    /// Values already set on the builder are kept.
    pub fn with_config(mut self, config: &Config) -> Result<Self> {
        if self.region.is_empty() {
            if let Some(region) = &config.region {
                self.region = region.clone();
            }
        }
        if self.credentials.is_none() {
            if let Some(cred) = config.credentials()? {
                self.credentials = Some(CredentialsSource::Static(cred));
            }
        }
        Ok(self)
    }

    /// Validate and build the config.
    pub fn build(self) -> Result<SigningConfig> {
        if self.region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        if self.service.is_empty() {
            return Err(Error::config_invalid("service must not be empty"));
        }
        if matches!(
            self.signature_type,
            SignatureType::HttpRequestChunk | SignatureType::HttpRequestEvent
        ) {
            return Err(Error::config_invalid(format!(
                "signature type {:?} is not supported by {:?}",
                self.signature_type, self.algorithm
            )));
        }
        let Some(credentials) = self.credentials else {
            return Err(Error::config_invalid(
                "either credentials or a credentials provider is required",
            ));
        };

        let should_sign_header = match (self.should_sign_header, self.unsigned_headers) {
            (None, unsigned) if unsigned.is_empty() => None,
            (Some(PredicateSlot(f)), unsigned) if unsigned.is_empty() => Some(f),
            (None, unsigned) => {
                let f: ShouldSignHeader = Arc::new(move |name: &str| {
                    !unsigned.iter().any(|v| v.eq_ignore_ascii_case(name))
                });
                Some(f)
            }
            (Some(PredicateSlot(f)), unsigned) => {
                let f: ShouldSignHeader = Arc::new(move |name: &str| {
                    !unsigned.iter().any(|v| v.eq_ignore_ascii_case(name)) && f(name)
                });
                Some(f)
            }
        };

        Ok(SigningConfig {
            algorithm: self.algorithm,
            signature_type: self.signature_type,
            region: self.region,
            service: self.service,
            date: self.date.unwrap_or_else(now),
            signed_body_value: self.signed_body_value.filter(|v| !v.is_empty()),
            signed_body_header: self.signed_body_header,
            credentials,
            flags: self.flags,
            should_sign_header,
            expiration_in_seconds: self.expiration_in_seconds.filter(|v| *v != 0),
            credentials_timeout: self.credentials_timeout,
        })
    }
}
