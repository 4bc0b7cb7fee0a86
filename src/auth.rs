// SPDX-License-Identifier: EUPL-1.2

//! Session token signing and password hashing.
//!
//! Every token handed out by `POST /auth/signin` and `POST /auth/signup` is
//! an Ed25519 signature over a canonical message, bound to a server-side
//! session row so it can be revoked on sign-out.
//!
//! ## Token format
//!
//! ```text
//! {base64url(message)}.{base64url(signature)}
//! ```
//!
//! with the canonical message
//!
//! ```text
//! toolshelf:session:{session_id}:{user_id}
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use uuid::Uuid;

const MESSAGE_PREFIX: &str = "toolshelf:session:";

/// Ids carried by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

/// Server signing key for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    signing: SigningKey,
}

impl SessionKeys {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { signing: SigningKey::from_bytes(&seed) }
    }

    /// Decode a base64url-encoded 32-byte seed.
    pub fn from_seed_b64(seed_b64: &str) -> Result<Self, String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(seed_b64.trim())
            .map_err(|e| format!("bad seed encoding: {e}"))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "seed must be 32 bytes".to_string())?;
        Ok(Self::from_seed(seed))
    }

    /// Fresh key for this process only; tokens die with it.
    pub fn ephemeral() -> Self {
        let mut seed = [0u8; 32];
        seed[..16].copy_from_slice(Uuid::new_v4().as_bytes());
        seed[16..].copy_from_slice(Uuid::new_v4().as_bytes());
        Self::from_seed(seed)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    pub fn issue(&self, claims: SessionClaims) -> String {
        let message = session_message(claims.session_id, claims.user_id);
        let signature = self.signing.sign(message.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(message.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }

    /// Check the signature and parse the claims of `token`.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, String> {
        let (message_b64, signature_b64) = token
            .trim()
            .split_once('.')
            .ok_or_else(|| "token must be <message>.<signature>".to_string())?;

        let message = URL_SAFE_NO_PAD
            .decode(message_b64)
            .map_err(|e| format!("bad message encoding: {e}"))?;
        let message = String::from_utf8(message).map_err(|_| "message is not UTF-8".to_string())?;

        verify_signature(&self.verifying_key(), &message, signature_b64)?;
        parse_session_message(&message)
    }
}

/// Verify an Ed25519 signature over a message.
///
/// - `key`           — the verifying half of the server key
/// - `message`       — the canonical message that was signed
/// - `signature_b64` — base64url-encoded 64-byte Ed25519 signature
pub fn verify_signature(key: &VerifyingKey, message: &str, signature_b64: &str) -> Result<(), String> {
    let sig_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| format!("bad signature encoding: {e}"))?;

    let sig_bytes: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| "signature must be 64 bytes".to_string())?;

    let signature = Signature::from_bytes(&sig_bytes);

    key.verify(message.as_bytes(), &signature)
        .map_err(|e| format!("signature verification failed: {e}"))
}

/// Build the canonical message for a session token.
pub fn session_message(session_id: Uuid, user_id: Uuid) -> String {
    format!("{MESSAGE_PREFIX}{session_id}:{user_id}")
}

fn parse_session_message(message: &str) -> Result<SessionClaims, String> {
    let rest = message
        .strip_prefix(MESSAGE_PREFIX)
        .ok_or_else(|| "not a session token".to_string())?;
    let (session, user) = rest
        .split_once(':')
        .ok_or_else(|| "malformed session message".to_string())?;

    Ok(SessionClaims {
        session_id: session.parse().map_err(|e| format!("bad session id: {e}"))?,
        user_id: user.parse().map_err(|e| format!("bad user id: {e}"))?,
    })
}

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("hashing failed: {e}"))
}

/// `false` on mismatch and on a malformed stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
