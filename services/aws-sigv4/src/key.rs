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

use crate::constants::{AWS4_ECDSA_P256_SHA256, AWS4_REQUEST};
use awsauth_core::time::{format_date, DateTime};
use awsauth_core::{Context, Error, Result};
use p256::elliptic_curve::bigint::{Encoding, U256};
use p256::elliptic_curve::Curve;
use p256::NistP256;

/// Generate the SigV4 signing key.
///
/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
pub(crate) fn generate_signing_key(
    ctx: &Context,
    secret: &str,
    time: DateTime,
    region: &str,
    service: &str,
) -> Vec<u8> {
    let crypto = ctx.crypto();

    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = crypto.hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = crypto.hmac_sha256(&sign_date, region.as_bytes());
    // Sign service
    let sign_service = crypto.hmac_sha256(&sign_region, service.as_bytes());
    // Sign request
    crypto.hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes())
}

/// Derive the SigV4A private key from an access key pair.
///
/// Uses NIST SP 800-108 KDF in counter mode with HMAC-SHA256. The fixed input is
///
/// ```text
/// 0x00000001 || "AWS4-ECDSA-P256-SHA256" || 0x00 || access_key_id || counter || 0x00000100
/// ```
///
/// keyed by `"AWS4A" + secret`. A candidate `k0` is accepted when
/// `k0 <= n - 2` and the private scalar is `k0 + 1`, otherwise the
/// external counter is bumped and the derivation retried.
pub(crate) fn derive_ecdsa_private_key(
    ctx: &Context,
    access_key_id: &str,
    secret: &str,
) -> Result<[u8; 32]> {
    let input_key = format!("AWS4A{secret}");
    let n_minus_two = NistP256::ORDER.wrapping_sub(&U256::from_u8(2));

    let mut fixed_input =
        Vec::with_capacity(4 + AWS4_ECDSA_P256_SHA256.len() + 1 + access_key_id.len() + 1 + 4);
    for counter in 1..=u8::MAX - 1 {
        fixed_input.clear();
        fixed_input.extend_from_slice(&1u32.to_be_bytes());
        fixed_input.extend_from_slice(AWS4_ECDSA_P256_SHA256.as_bytes());
        fixed_input.push(0x00);
        fixed_input.extend_from_slice(access_key_id.as_bytes());
        fixed_input.push(counter);
        // Output length in bits.
        fixed_input.extend_from_slice(&256u32.to_be_bytes());

        let k0 = ctx.crypto().hmac_sha256(input_key.as_bytes(), &fixed_input);
        if k0.len() != 32 {
            return Err(Error::crypto(format!(
                "hmac output must be 32 bytes, got {}",
                k0.len()
            )));
        }

        let k0 = U256::from_be_slice(&k0);
        if k0 <= n_minus_two {
            return Ok(k0.wrapping_add(&U256::ONE).to_be_bytes());
        }
    }

    Err(Error::crypto(
        "failed to derive ecdsa private key: counter exhausted",
    ))
}
