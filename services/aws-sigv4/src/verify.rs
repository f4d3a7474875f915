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

use crate::sign_request::{prepare_request, string_to_sign};
use crate::{SigningAlgorithm, SigningConfig};
use awsauth_core::{Context, Error, Result, Signable};
use log::debug;

/// Verify a SigV4A signature.
///
/// - `expected_canonical_request`: the canonical request the signature is
///   expected to cover.
/// - `signature`: hex encoded DER ECDSA signature.
/// - `public_key`: hex encoded SEC1 P-256 public key.
///
/// When the config carries bound credentials, the canonical request is
/// rebuilt from the signable first and must match the expected one.
///
/// Returns `Ok(false)` for a mismatching canonical request and for a wrong or
/// malformed signature. A public key that can't be decoded is an error.
pub fn verify_signature(
    ctx: &Context,
    signable: &Signable,
    config: &SigningConfig,
    expected_canonical_request: &str,
    signature: &str,
    public_key: &str,
) -> Result<bool> {
    if config.algorithm() != SigningAlgorithm::SigV4A {
        return Err(Error::config_invalid(
            "only SigV4A signatures can be verified",
        ));
    }

    let public_key = hex::decode(public_key)
        .map_err(|e| Error::crypto("public key is not valid hex").with_source(e))?;

    if let Some(cred) = config.credentials() {
        let prepared = prepare_request(ctx, signable, config, cred)?;
        if prepared.canonical_request != expected_canonical_request {
            debug!(
                "canonical request mismatch, calculated: {}, expected: {}",
                prepared.canonical_request, expected_canonical_request
            );
            return Ok(false);
        }
    }

    let Ok(signature) = hex::decode(signature) else {
        debug!("signature is not valid hex");
        return Ok(false);
    };

    let string_to_sign = string_to_sign(ctx, config, expected_canonical_request);
    debug!("calculated string to sign: {string_to_sign}");

    ctx.crypto()
        .ecdsa_p256_verify(&public_key, string_to_sign.as_bytes(), &signature)
}
