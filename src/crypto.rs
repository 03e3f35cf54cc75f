//! Hashing and signature primitives
//!
//! Identities (transaction and block hashes) are double-SHA256 over the
//! canonical encoding. Signatures are ECDSA over secp256k1, DER encoded, and
//! sign the single SHA256 digest of the signable bytes.

use crate::error::Result;
use crate::types::*;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// SHA256 digest of `data`
pub fn sha256_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Double-SHA256 of the concatenation of `parts`
pub fn double_sha256(parts: &[&[u8]]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    for part in parts {
        engine.input(part);
    }
    sha256d::Hash::from_engine(engine).into_inner()
}

/// Sign `message` with `secret`, returning a DER-encoded signature
pub fn sign_message(secret: &SecretKey, message: &[u8]) -> ByteString {
    let secp = Secp256k1::signing_only();
    let digest = Message::from_digest(sha256_hash(message));
    secp.sign_ecdsa(&digest, secret).serialize_der().to_vec()
}

/// Verify a DER-encoded signature over `message` against a compressed or
/// uncompressed public key. Malformed keys or signatures never verify.
pub fn verify_signature(pubkey_bytes: &[u8], message: &[u8], signature_bytes: &[u8]) -> bool {
    let pubkey = match PublicKey::from_slice(pubkey_bytes) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match Signature::from_der(signature_bytes) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let secp = Secp256k1::verification_only();
    let digest = Message::from_digest(sha256_hash(message));
    secp.verify_ecdsa(&digest, &signature, &pubkey).is_ok()
}

/// Compressed public key bytes for `secret`, the form stored in outputs
pub fn public_key_bytes(secret: &SecretKey) -> ByteString {
    let secp = Secp256k1::signing_only();
    PublicKey::from_secret_key(&secp, secret).serialize().to_vec()
}

/// Parse a 32-byte secret key
pub fn secret_key_from_bytes(bytes: &[u8]) -> Result<SecretKey> {
    Ok(SecretKey::from_slice(bytes)?)
}
