//! Core components for signing AWS requests.
//!
//! This crate provides the service independent half of the awsauth
//! ecosystem: the data model a signing algorithm reads from, the capability
//! traits it calls out to, and the shared error type.
//!
//! ## Overview
//!
//! - [`PropertyStore`]: named properties plus named, ordered property lists.
//! - [`Signable`]: the thing to be signed, a property store plus an optional
//!   [`PayloadStream`].
//! - [`PropertySource`]: the read-only view a signing algorithm consumes,
//!   implemented by signables and signing results alike.
//! - [`Context`]: the external collaborators used while signing, namely
//!   [`Crypto`] primitives and [`Env`] access.
//! - [`ProvideCredential`]: asynchronous credential resolution.
//!
//! ## Example
//!
//! ```
//! use awsauth_core::{PropertySource, Signable};
//!
//! # fn main() -> awsauth_core::Result<()> {
//! let mut signable = Signable::new();
//! signable.set_property("http-method", "GET")?;
//! signable.append_to_list("headers", "host", "examplebucket.s3.amazonaws.com")?;
//!
//! assert_eq!(signable.get_property("http-method"), Some("GET"));
//! assert_eq!(signable.get_property_list("headers").len(), 1);
//! assert!(signable.get_property_list("params").is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: hashing helpers backing [`RustCrypto`]
//! - [`time`]: time formatting and parsing
//! - [`utils`]: data redaction for `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod crypto;
pub use crypto::{Crypto, RustCrypto};
mod context;
pub use context::{Context, Env, NoopEnv, OsEnv, StaticEnv};
mod api;
pub use api::{ProvideCredential, SigningCredential};
mod property;
pub use property::{Property, PropertySource, PropertyStore};
mod signable;
pub use signable::{
    PayloadStream, Signable, PROPERTY_CANONICAL_REQUEST, PROPERTY_HTTP_METHOD,
    PROPERTY_LIST_HEADERS, PROPERTY_URI,
};
