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

use crate::key::derive_ecdsa_private_key;
use awsauth_core::time::{from_epoch_secs, now, DateTime};
use awsauth_core::utils::Redact;
use awsauth_core::{Context, Error, Result, SigningCredential};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Credentials holds the identity used to sign a request.
///
/// Fields are immutable once built. The value is shared through an `Arc`:
/// [`Credentials::acquire`] hands out another reference and
/// [`Credentials::release`] gives one back. The underlying data is freed
/// when the last reference is released.
#[derive(Clone)]
pub struct Credentials {
    inner: Arc<Inner>,
}

struct Inner {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expiration: Option<u64>,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// An empty session token is treated as absent, and so is an expiration
    /// of `0`.
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        session_token: Option<&str>,
        expiration_secs: Option<u64>,
    ) -> Result<Self> {
        if access_key_id.is_empty() {
            return Err(Error::invalid_argument("access key id must not be empty"));
        }
        if secret_access_key.is_empty() {
            return Err(Error::invalid_argument(
                "secret access key must not be empty",
            ));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                session_token: session_token
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string()),
                expiration: expiration_secs.filter(|v| *v != 0),
            }),
        })
    }

    /// Take another reference to the same credentials.
    pub fn acquire(&self) -> Self {
        self.clone()
    }

    /// Give back this reference.
    pub fn release(self) {
        drop(self)
    }

    /// Number of live references to these credentials.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Access key id.
    pub fn access_key_id(&self) -> &str {
        &self.inner.access_key_id
    }

    /// Secret access key.
    pub fn secret_access_key(&self) -> &str {
        &self.inner.secret_access_key
    }

    /// Session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.inner.session_token.as_deref()
    }

    /// Expiration in seconds since unix epoch, `None` if these credentials don't expire.
    pub fn expiration_timepoint_seconds(&self) -> Option<u64> {
        self.inner.expiration
    }

    /// Expiration as datetime, `None` if these credentials don't expire.
    pub fn expiration(&self) -> Option<DateTime> {
        self.inner
            .expiration
            .and_then(|secs| from_epoch_secs(secs).ok())
    }

    /// Whether the expiration time has passed.
    pub fn is_expired(&self) -> bool {
        self.expiration().is_some_and(|t| t <= now())
    }

    /// Derive the SigV4A key pair of these credentials.
    pub fn ecdsa_key_pair(&self, ctx: &Context) -> Result<EcdsaKeyPair> {
        let private_key = derive_ecdsa_private_key(
            ctx,
            &self.inner.access_key_id,
            &self.inner.secret_access_key,
        )?;
        let public_key = ctx.crypto().ecdsa_p256_public_key(&private_key)?;

        Ok(EcdsaKeyPair {
            private_key,
            public_key,
        })
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &Redact::from(&self.inner.access_key_id))
            .field(
                "secret_access_key",
                &Redact::from(&self.inner.secret_access_key),
            )
            .field("session_token", &Redact::from(&self.inner.session_token))
            .field("expiration", &self.inner.expiration)
            .finish()
    }
}

impl SigningCredential for Credentials {
    fn is_valid(&self) -> bool {
        let Some(expiration) = self.expiration() else {
            return true;
        };

        // Take 120s as buffer to avoid edge cases.
        expiration > now() + chrono::TimeDelta::minutes(2)
    }
}

/// EcdsaKeyPair is the P-256 key pair derived from credentials for SigV4A.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    private_key: [u8; 32],
    public_key: Vec<u8>,
}

impl EcdsaKeyPair {
    /// Private scalar, big endian.
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Uncompressed SEC1 public key: `0x04 || X || Y`.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Hex encoded uncompressed SEC1 public key, the form [`crate::verify_signature`] accepts.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }

    /// Hex encoded X coordinate of the public key.
    pub fn public_key_x_hex(&self) -> String {
        hex::encode(self.public_key.get(1..33).unwrap_or_default())
    }

    /// Hex encoded Y coordinate of the public key.
    pub fn public_key_y_hex(&self) -> String {
        hex::encode(self.public_key.get(33..65).unwrap_or_default())
    }
}

impl Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaKeyPair")
            .field("private_key", &"***")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}
