//! Stored-password obfuscation.
//!
//! A remembered password is written to the config store as a "fingerprint":
//! the UTF-8 password encrypted with single DES in ECB mode with PKCS#7
//! padding, then Base64 encoded. The key is the first eight bytes of the
//! absolute path of the user's data directory.
//!
//! **This is obfuscation, not protection.** DES is broken, ECB leaks
//! structure, and the key is derived from a path anyone with access to the
//! machine can read. It keeps the password out of plain sight in the config
//! file and nothing more. The format is kept only so fingerprints written
//! by existing installations still decode.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use des::Des;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};

use crate::SessionError;

type DesEcbEnc = ecb::Encryptor<Des>;
type DesEcbDec = ecb::Decryptor<Des>;

/// DES key size in bytes.
const KEY_LEN: usize = 8;

/// Encoder/decoder for password fingerprints, keyed for one installation.
#[derive(Clone)]
pub struct Fingerprint {
    key: [u8; KEY_LEN],
}

impl Fingerprint {
    /// Derives the key from the user data directory. A relative path is
    /// resolved against the current directory first, so both spellings of
    /// one directory give the same key.
    ///
    /// # Errors
    /// [`SessionError::Io`] if the path cannot be made absolute,
    /// [`SessionError::Fingerprint`] if it is shorter than 8 bytes.
    pub fn from_user_dir(user_dir: &Path) -> Result<Self, SessionError> {
        let absolute = std::path::absolute(user_dir)?;
        let path = absolute.to_string_lossy();
        let bytes = path.as_bytes();
        let key: [u8; KEY_LEN] = bytes
            .get(..KEY_LEN)
            .and_then(|k| k.try_into().ok())
            .ok_or_else(|| {
                SessionError::Fingerprint(format!(
                    "user directory path has {} bytes, at least {KEY_LEN} are needed",
                    bytes.len()
                ))
            })?;
        Ok(Self { key })
    }

    /// Produces the fingerprint text for `password`.
    pub fn encode(&self, password: &str) -> Result<String, SessionError> {
        let cipher = DesEcbEnc::new_from_slice(&self.key)
            .map_err(|e| SessionError::Fingerprint(e.to_string()))?;
        let encrypted = cipher.encrypt_padded_vec_mut::<Pkcs7>(password.as_bytes());
        Ok(BASE64.encode(encrypted))
    }

    /// Recovers the password from a fingerprint.
    ///
    /// # Errors
    /// [`SessionError::Fingerprint`] if the text is not Base64, the padding
    /// is wrong (which is what a different key produces), or the result is
    /// not UTF-8.
    pub fn decode(&self, fingerprint: &str) -> Result<String, SessionError> {
        let encrypted = BASE64
            .decode(fingerprint.trim())
            .map_err(|e| SessionError::Fingerprint(format!("invalid base64: {e}")))?;
        let cipher = DesEcbDec::new_from_slice(&self.key)
            .map_err(|e| SessionError::Fingerprint(e.to_string()))?;
        let plain = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&encrypted)
            .map_err(|_| SessionError::Fingerprint("bad padding".into()))?;
        String::from_utf8(plain)
            .map_err(|_| SessionError::Fingerprint("decoded password is not UTF-8".into()))
    }
}

// The key is derived from a path, but there is no reason to print it.
impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprint").finish_non_exhaustive()
    }
}
