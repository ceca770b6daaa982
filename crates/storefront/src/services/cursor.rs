//! Opaque pagination cursors.
//!
//! A [`CursorData`] is serialized as JSON, sealed with AES-256-GCM under a
//! key derived from the server secret, and handed to clients as URL-safe
//! base64 of `nonce || ciphertext`. Clients can neither read nor forge it.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mercadillo_core::CursorData;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Associated data binding tokens to their purpose.
const CURSOR_AAD: &[u8] = b"mercadillo:category-cursor:v1";

/// Errors that can occur while sealing or opening a cursor.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("cursor is too short")]
    Truncated,

    /// Wrong key, tampered token, or a token sealed for something else.
    #[error("cursor failed authentication")]
    Authentication,

    #[error("cursor encryption failed")]
    Seal,

    #[error("cursor payload is invalid: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Seals and opens pagination cursors.
#[derive(Clone)]
pub struct CursorCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec").finish_non_exhaustive()
    }
}

impl CursorCodec {
    /// Create a codec whose key is the SHA-256 of `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = Sha256::digest(secret.expose_secret().as_bytes());
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }

    /// Seal `data` into a URL-safe token.
    ///
    /// A fresh random nonce is drawn for every call, so equal inputs give
    /// different tokens.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Payload` if `data` cannot be serialized and
    /// `CursorError::Seal` if encryption fails.
    pub fn encrypt(&self, data: &CursorData) -> Result<String, CursorError> {
        let plaintext = serde_json::to_vec(data)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &plaintext,
                    aad: CURSOR_AAD,
                },
            )
            .map_err(|_| CursorError::Seal)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a token produced by [`CursorCodec::encrypt`].
    ///
    /// # Errors
    ///
    /// Fails if the token is not base64, is shorter than a nonce, does not
    /// authenticate under this key, or does not hold a cursor.
    pub fn decrypt(&self, token: &str) -> Result<CursorData, CursorError> {
        let sealed = URL_SAFE_NO_PAD.decode(token)?;
        let (nonce, ciphertext) = sealed
            .split_at_checked(NONCE_LEN)
            .ok_or(CursorError::Truncated)?;

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: CURSOR_AAD,
                },
            )
            .map_err(|_| CursorError::Authentication)?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mercadillo_core::SortBy;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn codec(secret: &str) -> CursorCodec {
        CursorCodec::new(&SecretString::from(secret.to_owned()))
    }

    fn sample() -> CursorData {
        CursorData {
            timestamp: Utc.with_ymd_and_hms(2026, 4, 2, 18, 30, 5).unwrap(),
            sort_by: SortBy::Rating,
            price: None,
            rating: Some(Decimal::new(475, 2)),
            sold: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let codec = codec("k3y-for-tests-only");
        let token = codec.encrypt(&sample()).unwrap();
        assert_eq!(codec.decrypt(&token).unwrap(), sample());
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = codec("k3y-for-tests-only").encrypt(&sample()).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_token_does_not_leak_fields() {
        let token = codec("k3y-for-tests-only").encrypt(&sample()).unwrap();
        let raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let text = String::from_utf8_lossy(&raw);
        assert!(!text.contains("rating"));
        assert!(!text.contains("4.75"));
    }

    #[test]
    fn test_nonce_is_fresh() {
        let codec = codec("k3y-for-tests-only");
        assert_ne!(
            codec.encrypt(&sample()).unwrap(),
            codec.encrypt(&sample()).unwrap()
        );
    }

    #[test]
    fn test_other_key_rejected() {
        let token = codec("first-secret").encrypt(&sample()).unwrap();
        assert!(matches!(
            codec("second-secret").decrypt(&token),
            Err(CursorError::Authentication)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec("k3y-for-tests-only");
        assert!(matches!(codec.decrypt("not base64!"), Err(CursorError::Encoding(_))));
        assert!(matches!(codec.decrypt("AAAA"), Err(CursorError::Truncated)));
        assert!(codec.decrypt("").is_err());
    }

    #[test]
    fn test_token_is_used_verbatim() {
        let codec = codec("k3y-for-tests-only");
        let token = codec.encrypt(&sample()).unwrap();
        assert!(codec.decrypt(&format!(" {token}")).is_err());
        assert!(codec.decrypt(&format!("{token}\n")).is_err());
    }

    fn cursor_strategy() -> impl Strategy<Value = CursorData> {
        (
            0i64..4_000_000_000,
            prop::sample::select(SortBy::ALL.to_vec()),
            proptest::option::of(0i64..1_000_000_000),
            proptest::option::of(0i64..=500),
            proptest::option::of(0i32..100_000),
        )
            .prop_map(|(secs, sort_by, price, rating, sold)| CursorData {
                timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
                sort_by,
                price,
                rating: rating.map(|r| Decimal::new(r, 2)),
                sold,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip(data in cursor_strategy()) {
            let codec = codec("property-secret");
            let token = codec.encrypt(&data).unwrap();
            prop_assert_eq!(codec.decrypt(&token).unwrap(), data);
        }

        /// Changing any single character of a token makes it unreadable.
        #[test]
        fn prop_tampering_detected(data in cursor_strategy(), position in any::<prop::sample::Index>()) {
            let codec = codec("property-secret");
            let token = codec.encrypt(&data).unwrap();
            let i = position.index(token.len());
            let mut chars: Vec<char> = token.chars().collect();
            let original = chars.get(i).copied().unwrap();
            let replacement = if original == 'A' { 'B' } else { 'A' };
            *chars.get_mut(i).unwrap() = replacement;
            let tampered: String = chars.into_iter().collect();

            prop_assert!(codec.decrypt(&tampered).is_err());
        }
    }
}
