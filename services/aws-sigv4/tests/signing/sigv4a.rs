use super::{init, signable_of, suite_credentials, suite_time};
use anyhow::Result;
use awsauth_core::{Context, Signable};
use awsauth_sigv4::{
    sign_request, sign_request_sync, verify_signature, SignatureType, SigningAlgorithm,
    SigningConfig, StaticCredentialProvider, RESULT_AUTHORIZATION, RESULT_CANONICAL_REQUEST,
    RESULT_LIST_PARAMS, RESULT_SIGNED_HEADERS, RESULT_STRING_TO_SIGN,
};
use http::{Method, Request};
use pretty_assertions::assert_eq;

fn signable() -> Result<Signable> {
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://example.amazonaws.com/?Param1=value1")
        .body(())?;
    Ok(signable_of(req).0)
}

fn config(signature_type: SignatureType) -> Result<SigningConfig> {
    Ok(
        SigningConfig::builder(SigningAlgorithm::SigV4A, signature_type)
            .with_region("us-east-1")
            .with_service("service")
            .with_date(suite_time())
            .with_credentials(suite_credentials())
            .build()?,
    )
}

fn public_key(ctx: &Context) -> Result<String> {
    Ok(suite_credentials().ecdsa_key_pair(ctx)?.public_key_hex())
}

/// Flip one bit of the given byte.
fn flip_bit(bs: &mut [u8], idx: usize) {
    bs[idx] ^= 0x01;
}

#[tokio::test]
async fn test_sign_and_verify() -> Result<()> {
    let ctx = init();
    let signable = signable()?;
    let config = config(SignatureType::HttpRequestHeaders)?;

    let result = sign_request(&ctx, &signable, &config).await?;
    let creq = result
        .get_property(RESULT_CANONICAL_REQUEST)
        .expect("canonical request must be set");
    let signature = result.signature().expect("signature must be set");

    assert_eq!(
        result.get_property(RESULT_SIGNED_HEADERS),
        Some("host;x-amz-date;x-amz-region-set")
    );
    assert!(result
        .get_property(RESULT_STRING_TO_SIGN)
        .is_some_and(|v| v.starts_with(
            "AWS4-ECDSA-P256-SHA256\n20150830T123600Z\n20150830/service/aws4_request\n"
        )));
    assert!(result
        .get_property(RESULT_AUTHORIZATION)
        .is_some_and(|v| v.starts_with(
            "AWS4-ECDSA-P256-SHA256 Credential=AKIDEXAMPLE/20150830/service/aws4_request, SignedHeaders=host;x-amz-date;x-amz-region-set, Signature="
        )));

    assert!(verify_signature(
        &ctx,
        &signable,
        &config,
        creq,
        signature,
        &public_key(&ctx)?
    )?);
    Ok(())
}

#[test]
fn test_mutated_signature_is_rejected() -> Result<()> {
    let ctx = init();
    let signable = signable()?;
    let config = config(SignatureType::HttpRequestHeaders)?;

    let result = sign_request_sync(&ctx, &signable, &config)?;
    let creq = result
        .get_property(RESULT_CANONICAL_REQUEST)
        .expect("canonical request must be set");
    let signature = hex::decode(result.signature().expect("signature must be set"))?;
    let public_key = public_key(&ctx)?;

    // Mutate a bit in the middle and at the end of the signature.
    for idx in [signature.len() / 2, signature.len() - 1] {
        let mut mutated = signature.clone();
        flip_bit(&mut mutated, idx);

        assert!(!verify_signature(
            &ctx,
            &signable,
            &config,
            creq,
            &hex::encode(&mutated),
            &public_key
        )?);
    }
    Ok(())
}

#[test]
fn test_mutated_canonical_request_is_rejected() -> Result<()> {
    let ctx = init();
    let signable = signable()?;
    let config = config(SignatureType::HttpRequestHeaders)?;

    let result = sign_request_sync(&ctx, &signable, &config)?;
    let creq = result
        .get_property(RESULT_CANONICAL_REQUEST)
        .expect("canonical request must be set");
    let signature = result.signature().expect("signature must be set");
    let public_key = public_key(&ctx)?;

    let mut mutated = creq.as_bytes().to_vec();
    flip_bit(&mut mutated, 0);
    let mutated = String::from_utf8(mutated)?;

    // Rejected by the canonical request check.
    assert!(!verify_signature(
        &ctx,
        &signable,
        &config,
        &mutated,
        signature,
        &public_key
    )?);

    // Rejected by the signature check alone when no credentials are bound.
    let unbound = SigningConfig::builder(SigningAlgorithm::SigV4A, SignatureType::HttpRequestHeaders)
        .with_region("us-east-1")
        .with_service("service")
        .with_date(suite_time())
        .with_credentials_provider(StaticCredentialProvider::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        ))
        .build()?;
    assert!(verify_signature(
        &ctx,
        &signable,
        &unbound,
        creq,
        signature,
        &public_key
    )?);
    assert!(!verify_signature(
        &ctx,
        &signable,
        &unbound,
        &mutated,
        signature,
        &public_key
    )?);
    Ok(())
}

#[test]
fn test_presigned_sigv4a() -> Result<()> {
    let ctx = init();
    let signable = signable()?;
    let config = config(SignatureType::HttpRequestQueryParams)?;

    let result = sign_request_sync(&ctx, &signable, &config)?;
    let names: Vec<&str> = result
        .get_property_list(RESULT_LIST_PARAMS)
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert!(names.contains(&"X-Amz-Region-Set"));
    assert_eq!(names.last(), Some(&"X-Amz-Signature"));

    let creq = result
        .get_property(RESULT_CANONICAL_REQUEST)
        .expect("canonical request must be set");
    assert!(creq.contains("X-Amz-Region-Set=us-east-1"));
    assert!(creq.contains("X-Amz-Algorithm=AWS4-ECDSA-P256-SHA256"));

    assert!(verify_signature(
        &ctx,
        &signable,
        &config,
        creq,
        result.signature().expect("signature must be set"),
        &public_key(&ctx)?
    )?);
    Ok(())
}
