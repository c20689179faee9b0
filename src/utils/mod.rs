// Signature utilities
// Canonical JSON encoding and HMAC verification for webhook deliveries.

pub mod canonical;
pub mod signature;

pub use canonical::{canonical_json, canonicalize};
pub use signature::{
    compute_signature, constant_time_eq, sign_payload, verify_hmac_signature,
    verify_hmac_signature_at, HmacAlgorithm, SignatureError, SignatureHeader,
};
