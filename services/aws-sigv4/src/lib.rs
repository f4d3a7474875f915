//! AWS SigV4 and SigV4A request signing.
//!
//! Populate a [`Signable`](awsauth_core::Signable), build a [`SigningConfig`],
//! call [`sign_request`] and read the [`SigningResult`].
//!
//! ## Example
//!
//! ```
//! use awsauth_core::{Context, Signable};
//! use awsauth_sigv4::{
//!     sign_request_sync, Credentials, SignatureType, SigningAlgorithm, SigningConfig,
//! };
//!
//! # fn main() -> awsauth_core::Result<()> {
//! let ctx = Context::new();
//!
//! let mut signable = Signable::new();
//! signable.set_property("http-method", "GET")?;
//! signable.set_property("uri", "/")?;
//! signable.append_to_list("headers", "host", "example.amazonaws.com")?;
//!
//! let config = SigningConfig::builder(SigningAlgorithm::SigV4, SignatureType::HttpRequestHeaders)
//!     .with_region("us-east-1")
//!     .with_service("service")
//!     .with_credentials(Credentials::new(
//!         "AKIDEXAMPLE",
//!         "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
//!         None,
//!         None,
//!     )?)
//!     .build()?;
//!
//! let result = sign_request_sync(&ctx, &signable, &config)?;
//! assert!(result.get_property("Authorization").is_some());
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::{Credentials, EcdsaKeyPair};

mod provide_credential;
pub use provide_credential::*;

mod signing_config;
pub use signing_config::{
    CredentialsSource, ShouldSignHeader, SignatureType, SignedBodyHeader, SigningAlgorithm,
    SigningConfig, SigningConfigBuilder, SigningFlags, DEFAULT_CREDENTIALS_TIMEOUT,
};

mod signing_result;
pub use signing_result::{
    SigningResult, RESULT_AUTHORIZATION, RESULT_CANONICAL_REQUEST, RESULT_LIST_HEADERS,
    RESULT_LIST_PARAMS, RESULT_SIGNATURE, RESULT_SIGNED_HEADERS, RESULT_STRING_TO_SIGN,
};

mod canonical;
mod key;

mod sign_request;
pub use sign_request::{sign_request, sign_request_sync};

mod verify;
pub use verify::verify_signature;
