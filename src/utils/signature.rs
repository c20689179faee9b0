//! HMAC signatures for webhook deliveries.
//!
//! A delivery carries a header of the form `algorithm=hex,timestamp,nonce`.
//! The hex value is `HMAC(algorithm, secret, url + "|" + canonical_json(payload))`
//! where `url` is the receiver's own public webhook URL.

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;
use tracing::debug;

use crate::config::SignatureConfig;
use crate::utils::canonical::canonical_json;

/// Default replay window in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

/// Separator between the URL and the canonical payload in the signed data.
const SIGNED_DATA_SEPARATOR: u8 = b'|';

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Invalid header format: {0}")]
    MalformedHeader(&'static str),

    #[error("Invalid signature format")]
    MalformedSignature,

    #[error("Signature timestamp is too old: {age_secs}s exceeds the {max_age_secs}s window")]
    StaleSignature { age_secs: u64, max_age_secs: u64 },

    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// `KeyInit::new_from_slice` is fallible by signature only: HMAC hashes
    /// long keys and pads short ones, so no key length is rejected.
    #[error("Invalid HMAC key")]
    InvalidKey,

    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Digest algorithms accepted in the signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HmacAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HmacAlgorithm::Sha1 => "sha1",
            HmacAlgorithm::Sha224 => "sha224",
            HmacAlgorithm::Sha256 => "sha256",
            HmacAlgorithm::Sha384 => "sha384",
            HmacAlgorithm::Sha512 => "sha512",
        }
    }

    /// Keyed hash of `data`, lowercase hex encoded.
    pub fn hex_digest(&self, secret: &[u8], data: &[u8]) -> Result<String, SignatureError> {
        match self {
            HmacAlgorithm::Sha1 => hmac_hex::<Hmac<Sha1>>(secret, data),
            HmacAlgorithm::Sha224 => hmac_hex::<Hmac<Sha224>>(secret, data),
            HmacAlgorithm::Sha256 => hmac_hex::<Hmac<Sha256>>(secret, data),
            HmacAlgorithm::Sha384 => hmac_hex::<Hmac<Sha384>>(secret, data),
            HmacAlgorithm::Sha512 => hmac_hex::<Hmac<Sha512>>(secret, data),
        }
    }
}

impl FromStr for HmacAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HmacAlgorithm::Sha1),
            "sha224" => Ok(HmacAlgorithm::Sha224),
            "sha256" => Ok(HmacAlgorithm::Sha256),
            "sha384" => Ok(HmacAlgorithm::Sha384),
            "sha512" => Ok(HmacAlgorithm::Sha512),
            _ => Err(SignatureError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hmac_hex<M>(secret: &[u8], data: &[u8]) -> Result<String, SignatureError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Parsed `signature,timestamp,nonce` header value.
///
/// The signature part is kept raw so the freshness check can run before the
/// `algorithm=hex` structure is inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub signature_part: &'a str,
    pub timestamp: i64,
    pub nonce: &'a str,
}

impl<'a> SignatureHeader<'a> {
    pub fn parse(value: &'a str) -> Result<Self, SignatureError> {
        let parts: Vec<&str> = value.split(',').collect();
        let &[signature_part, timestamp, nonce] = parts.as_slice() else {
            return Err(SignatureError::MalformedHeader("expected signature,timestamp,nonce"));
        };

        if signature_part.is_empty() || timestamp.is_empty() || nonce.is_empty() {
            return Err(SignatureError::MalformedHeader("empty header field"));
        }

        let timestamp = timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| SignatureError::MalformedHeader("timestamp is not an integer"))?;

        Ok(Self {
            signature_part,
            timestamp,
            nonce,
        })
    }

    /// Split the signature part on its first `=` into algorithm name and hex value.
    pub fn algorithm_and_signature(&self) -> Result<(&'a str, &'a str), SignatureError> {
        match self.signature_part.split_once('=') {
            Some((algorithm, signature)) if !algorithm.is_empty() && !signature.is_empty() => {
                Ok((algorithm, signature))
            }
            _ => Err(SignatureError::MalformedSignature),
        }
    }
}

/// Bytes covered by the signature: `url|canonical_payload`.
pub fn signed_data(canonical_url: &str, payload: &Value) -> Result<Vec<u8>, SignatureError> {
    let canonical_payload = canonical_json(payload)?;

    let mut data = Vec::with_capacity(canonical_url.len() + 1 + canonical_payload.len());
    data.extend_from_slice(canonical_url.as_bytes());
    data.push(SIGNED_DATA_SEPARATOR);
    data.extend_from_slice(&canonical_payload);
    Ok(data)
}

/// Compute the lowercase hex signature a sender would attach for `payload`.
pub fn compute_signature(
    algorithm: HmacAlgorithm,
    shared_secret: &str,
    canonical_url: &str,
    payload: &Value,
) -> Result<String, SignatureError> {
    let data = signed_data(canonical_url, payload)?;
    algorithm.hex_digest(shared_secret.as_bytes(), &data)
}

/// Build a complete header value for `payload`.
pub fn sign_payload(
    payload: &Value,
    config: &SignatureConfig,
    algorithm: HmacAlgorithm,
    timestamp: i64,
    nonce: &str,
) -> Result<String, SignatureError> {
    if nonce.is_empty() || nonce.contains(',') {
        return Err(SignatureError::MalformedHeader("nonce must be non-empty and comma free"));
    }

    let signature = compute_signature(
        algorithm,
        &config.shared_secret,
        &config.canonical_url,
        payload,
    )?;
    Ok(format!("{algorithm}={signature},{timestamp},{nonce}"))
}

/// Verify a delivery against the current wall clock.
pub fn verify_hmac_signature(
    payload: &Value,
    header_value: &str,
    config: &SignatureConfig,
) -> Result<bool, SignatureError> {
    verify_hmac_signature_at(payload, header_value, config, chrono::Utc::now().timestamp())
}

/// Verify a delivery as of `now` (unix seconds).
///
/// Malformed or stale headers are errors. A well-formed header whose
/// signature does not match returns `Ok(false)`.
pub fn verify_hmac_signature_at(
    payload: &Value,
    header_value: &str,
    config: &SignatureConfig,
    now: i64,
) -> Result<bool, SignatureError> {
    let header = SignatureHeader::parse(header_value)?;

    let age_secs = now.abs_diff(header.timestamp);
    if age_secs > config.max_age_secs {
        return Err(SignatureError::StaleSignature {
            age_secs,
            max_age_secs: config.max_age_secs,
        });
    }

    let (algorithm, presented) = header.algorithm_and_signature()?;
    let algorithm: HmacAlgorithm = algorithm.parse()?;

    let expected = compute_signature(
        algorithm,
        &config.shared_secret,
        &config.canonical_url,
        payload,
    )?;
    let valid = constant_time_eq(expected.as_bytes(), presented.as_bytes());

    debug!(
        algorithm = %algorithm,
        nonce = %header.nonce,
        age_secs,
        valid,
        "Signature checked"
    );

    Ok(valid)
}

/// Compare two byte strings without exiting early on the first difference.
///
/// Always walks `max(a.len(), b.len())` positions; a length mismatch is folded
/// into the accumulator instead of returning immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = a.len() ^ b.len();

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }

    diff == 0
}
