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

//! Cryptographic primitives used by signing.

use crate::hash;
use crate::{Error, Result};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{DerSignature, SigningKey, VerifyingKey};
use std::fmt::Debug;

/// Crypto provides the primitives a signing algorithm needs.
///
/// Signing never touches a hash or curve implementation directly, it always
/// goes through the `Crypto` configured in [`crate::Context`].
pub trait Crypto: Debug + Send + Sync + 'static {
    /// Hex encoded SHA256 hash of `content`.
    fn sha256_hex(&self, content: &[u8]) -> String;

    /// HMAC-SHA256 of `content` keyed by `key`.
    fn hmac_sha256(&self, key: &[u8], content: &[u8]) -> Vec<u8>;

    /// Sign `message` with a P-256 private scalar (32 bytes big endian).
    ///
    /// The message is hashed with SHA256 before signing, the returned
    /// signature is ASN.1 DER encoded.
    fn ecdsa_p256_sign(&self, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>>;

    /// Verify a DER encoded signature of `message` against a SEC1 encoded public key.
    ///
    /// Returns `Ok(false)` for a signature that is malformed or doesn't match,
    /// and an error only when the public key itself can't be used.
    fn ecdsa_p256_verify(&self, public_key: &[u8], message: &[u8], signature: &[u8])
        -> Result<bool>;

    /// Uncompressed SEC1 public key of a P-256 private scalar.
    fn ecdsa_p256_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>>;
}

/// RustCrypto implements [`Crypto`] with `sha2`, `hmac` and `p256`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

impl Crypto for RustCrypto {
    fn sha256_hex(&self, content: &[u8]) -> String {
        hash::hex_sha256(content)
    }

    fn hmac_sha256(&self, key: &[u8], content: &[u8]) -> Vec<u8> {
        hash::hmac_sha256(key, content)
    }

    fn ecdsa_p256_sign(&self, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let key = SigningKey::from_slice(private_key)
            .map_err(|e| Error::crypto("invalid ecdsa private key").with_source(e))?;
        let signature: DerSignature = key
            .try_sign(message)
            .map_err(|e| Error::crypto("ecdsa sign failed").with_source(e))?;
        Ok(signature.as_bytes().to_vec())
    }

    fn ecdsa_p256_verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let key = VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| Error::crypto("invalid ecdsa public key").with_source(e))?;
        let Ok(signature) = DerSignature::try_from(signature) else {
            return Ok(false);
        };

        Ok(key.verify(message, &signature).is_ok())
    }

    fn ecdsa_p256_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
        let key = SigningKey::from_slice(private_key)
            .map_err(|e| Error::crypto("invalid ecdsa private key").with_source(e))?;
        Ok(key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec())
    }
}
