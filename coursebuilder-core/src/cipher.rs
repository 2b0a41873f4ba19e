//! Public-key encryption of the shared secret.
//!
//! The verification endpoint expects the client secret encrypted with the
//! supplier's RSA public key (PKCS#1 v1.5 padding). [`SecretCipher`] is the
//! seam; [`RsaCipher`] is the default implementation and accepts either a
//! `BEGIN PUBLIC KEY` (SPKI) or a `BEGIN RSA PUBLIC KEY` (PKCS#1) PEM block.

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use thiserror::Error;

/// Error type for secret encryption.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The public key could not be parsed.
    #[error("invalid public key: {message}")]
    InvalidKey { message: String },

    /// The encryption primitive rejected the input.
    #[error("encryption failed: {message}")]
    EncryptionFailed { message: String },
}

/// Encrypts a secret with a public key.
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, secret: &[u8], public_key: &str) -> Result<Vec<u8>, CipherError>;
}

/// RSA PKCS#1 v1.5 encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaCipher;

impl RsaCipher {
    fn parse_key(public_key: &str) -> Result<RsaPublicKey, CipherError> {
        let pem = public_key.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| CipherError::InvalidKey {
                message: e.to_string(),
            })
    }
}

impl SecretCipher for RsaCipher {
    fn encrypt(&self, secret: &[u8], public_key: &str) -> Result<Vec<u8>, CipherError> {
        let key = Self::parse_key(public_key)?;
        let mut rng = rand::thread_rng();
        key.encrypt(&mut rng, Pkcs1v15Encrypt, secret)
            .map_err(|e| CipherError::EncryptionFailed {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};

    #[test]
    fn test_invalid_key_rejected() {
        let result = RsaCipher.encrypt(b"secret", "not a key");
        assert!(matches!(result, Err(CipherError::InvalidKey { .. })));
    }

    #[test]
    fn test_encrypt_decrypts_with_private_key() {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let ciphertext = RsaCipher.encrypt(b"0123456789abcdef", &pem).unwrap();
        assert_eq!(ciphertext.len(), 128);

        let plaintext = private_key.decrypt(Pkcs1v15Encrypt, &ciphertext).unwrap();
        assert_eq!(plaintext, b"0123456789abcdef");
    }
}
