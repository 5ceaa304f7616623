use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// XChaCha20-Poly1305 nonce length in bytes
const NONCE_LEN: usize = 24;

/// Pending registration, sealed into the emailed activation link.  The
/// account exists nowhere else until the link is followed, so losing the
/// email simply loses the registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationTicket {
    pub username: String,
    pub password_hash: String,
    pub issued_at: i64,
}

/// Review takedown authorization, sealed into the removal link mailed to
/// the admin when a review is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalTicket {
    pub review_id: i64,
    pub issued_at: i64,
}

/// Seals small JSON tickets into opaque URL-safe tokens and opens them
/// again, authenticating along the way.
///
/// Token layout: `base64url( nonce ‖ ciphertext )` with a fresh random
/// 24-byte nonce per seal.  Anyone may read a token's length; nobody
/// without the key can read or forge its contents.
pub struct Sealer {
    cipher: XChaCha20Poly1305,
}

impl Sealer {
    /// Build a sealer from the configured secret.  The first 32 bytes of
    /// the secret become the cipher key, so the secret must be at least
    /// that long (config validation enforces the same bound).
    pub fn new(secret: &str) -> Result<Self> {
        let bytes = secret.as_bytes();
        if bytes.len() < 32 {
            anyhow::bail!("secret key must be at least 32 bytes, got {}", bytes.len());
        }

        let cipher = XChaCha20Poly1305::new_from_slice(&bytes[..32])
            .map_err(|e| anyhow::anyhow!("Failed to build cipher: {}", e))?;

        Ok(Self { cipher })
    }

    /// Serialize and seal a ticket into a URL-safe token
    pub fn seal<T: Serialize>(&self, ticket: &T) -> Result<String> {
        let plaintext = serde_json::to_vec(ticket).context("Failed to serialize ticket")?;

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| anyhow::anyhow!("Sealing failed: {}", e))?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Open a sealed token back into its ticket.  Fails on any tampering,
    /// truncation, or a token sealed under a different key.
    pub fn unseal<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .context("Ticket is not valid base64")?;

        if bytes.len() <= NONCE_LEN {
            anyhow::bail!("Ticket too short to contain a payload");
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow::anyhow!("Ticket failed authentication"))?;

        serde_json::from_slice(&plaintext).context("Ticket payload is not valid JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "an-absolutely-minimal-32-byte-key!!";
    const OTHER_KEY: &str = "a-completely-different-32-byte-key!";

    fn ticket() -> ActivationTicket {
        ActivationTicket {
            username: "alice@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            issued_at: 1_700_000_000,
        }
    }

    #[test]
    fn seal_then_unseal_roundtrips() {
        let sealer = Sealer::new(KEY).unwrap();

        let token = sealer.seal(&ticket()).unwrap();
        let back: ActivationTicket = sealer.unseal(&token).unwrap();
        assert_eq!(back, ticket());
    }

    #[test]
    fn tokens_are_url_safe() {
        let sealer = Sealer::new(KEY).unwrap();
        let token = sealer.seal(&ticket()).unwrap();

        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn each_seal_uses_a_fresh_nonce() {
        let sealer = Sealer::new(KEY).unwrap();

        let a = sealer.seal(&ticket()).unwrap();
        let b = sealer.seal(&ticket()).unwrap();
        assert_ne!(a, b);

        let from_a: ActivationTicket = sealer.unseal(&a).unwrap();
        let from_b: ActivationTicket = sealer.unseal(&b).unwrap();
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let sealer = Sealer::new(KEY).unwrap();
        let token = sealer.seal(&ticket()).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert!(sealer.unseal::<ActivationTicket>(&tampered).is_err());
    }

    #[test]
    fn foreign_key_tokens_are_rejected() {
        let sealer = Sealer::new(KEY).unwrap();
        let other = Sealer::new(OTHER_KEY).unwrap();

        let token = other.seal(&ticket()).unwrap();
        assert!(sealer.unseal::<ActivationTicket>(&token).is_err());
    }

    #[test]
    fn garbage_input_errors_instead_of_panicking() {
        let sealer = Sealer::new(KEY).unwrap();

        for junk in ["", "!!!not-base64!!!", "c2hvcnQ", "AAAA"] {
            assert!(sealer.unseal::<ActivationTicket>(junk).is_err());
        }
    }

    #[test]
    fn short_secrets_are_refused() {
        assert!(Sealer::new("too-short").is_err());
        assert!(Sealer::new(KEY).is_ok());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_ticket_roundtrips(
                username in "\\PC{0,40}",
                password_hash in "\\PC{0,40}",
                issued_at in any::<i64>(),
            ) {
                let sealer = Sealer::new(KEY).unwrap();
                let ticket = ActivationTicket { username, password_hash, issued_at };

                let token = sealer.seal(&ticket).unwrap();
                let back: ActivationTicket = sealer.unseal(&token).unwrap();
                prop_assert_eq!(back, ticket);
            }

            #[test]
            fn random_tokens_never_unseal(token in "[A-Za-z0-9_-]{0,120}") {
                let sealer = Sealer::new(KEY).unwrap();
                // 2^-128-ish odds of forging a valid tag; treat any success
                // as a failure outright.
                prop_assert!(sealer.unseal::<ActivationTicket>(&token).is_err());
            }
        }
    }
}
