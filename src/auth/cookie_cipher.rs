use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use thiserror::Error;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Cookie encryption/decryption errors
#[derive(Error, Debug)]
pub enum CookieError {
    #[error("Failed to encrypt cookie: {0}")]
    EncryptionError(String),

    #[error("Failed to decrypt cookie: {0}")]
    DecryptionError(String),

    #[error("Invalid cookie format: {0}")]
    InvalidFormat(String),

    #[error("Failed to decode base64: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// Turns a session payload into an opaque cookie value and back.
///
/// The session manager only needs this pair; how the blob is protected is
/// up to the implementation.
pub trait SessionSealer: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<String, CookieError>;
    fn open(&self, sealed: &str) -> Result<Vec<u8>, CookieError>;
}

/// AES-256-GCM sealer
///
/// Cookie format: base64url([12-byte nonce][ciphertext][16-byte auth tag])
pub struct CookieCipher {
    cipher: Aes256Gcm,
}

impl CookieCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }
}

impl SessionSealer for CookieCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<String, CookieError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::thread_rng().gen();
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CookieError::EncryptionError(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        // base64url keeps the value legal inside a cookie without quoting
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    fn open(&self, sealed: &str) -> Result<Vec<u8>, CookieError> {
        let raw = URL_SAFE_NO_PAD.decode(sealed)?;

        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CookieError::InvalidFormat(format!(
                "Cookie too short: {} bytes (minimum {})",
                raw.len(),
                NONCE_LEN + TAG_LEN
            )));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce_bytes: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| CookieError::InvalidFormat("Failed to extract nonce".to_string()))?;

        self.cipher
            .decrypt(&Nonce::from(nonce_bytes), ciphertext)
            .map_err(|e| CookieError::DecryptionError(e.to_string()))
    }
}
