use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

#[derive(Debug, Clone, Copy)]
enum KeySize {
    Aes128,
    Aes256,
}

/// AES-CBC codec for provider result payloads.
///
/// Key and IV come from tenant configuration as plain UTF-8 strings and are
/// used directly as byte material; a 16-byte key selects AES-128, a 32-byte
/// key AES-256. Padding is PKCS#7.
pub struct ResultCipher {
    key: Vec<u8>,
    iv: [u8; 16],
    size: KeySize,
}

impl ResultCipher {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let size = match key.len() {
            16 => KeySize::Aes128,
            32 => KeySize::Aes256,
            n => return Err(CryptoError::InvalidKey(n)),
        };
        let iv: [u8; 16] = iv
            .try_into()
            .map_err(|_| CryptoError::InvalidIv(iv.len()))?;

        Ok(Self {
            key: key.to_vec(),
            iv,
            size,
        })
    }

    /// Decrypt a result payload. Fails on truncated ciphertext or bad
    /// padding; never returns partial plaintext.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let plaintext = match self.size {
            KeySize::Aes128 => Aes128CbcDec::new_from_slices(&self.key, &self.iv)
                .map_err(|_| CryptoError::InvalidKey(self.key.len()))?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| CryptoError::Decrypt)?,
            KeySize::Aes256 => Aes256CbcDec::new_from_slices(&self.key, &self.iv)
                .map_err(|_| CryptoError::InvalidKey(self.key.len()))?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| CryptoError::Decrypt)?,
        };
        Ok(plaintext)
    }

    /// Encrypt a payload the way the provider does. Used for fixtures and
    /// round-trip checks.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = match self.size {
            KeySize::Aes128 => Aes128CbcEnc::new_from_slices(&self.key, &self.iv)
                .map_err(|_| CryptoError::InvalidKey(self.key.len()))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            KeySize::Aes256 => Aes256CbcEnc::new_from_slices(&self.key, &self.iv)
                .map_err(|_| CryptoError::InvalidKey(self.key.len()))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        };
        Ok(ciphertext)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("cipher key must be 16 or 32 bytes, got {0}")]
    InvalidKey(usize),

    #[error("cipher IV must be 16 bytes, got {0}")]
    InvalidIv(usize),

    #[error("result payload failed CBC decryption (bad padding or truncated ciphertext)")]
    Decrypt,
}
