use crate::core::KrbUser;
use crate::error::{Error, Result};
use kerberos_asn1::EncryptionKey;
use kerberos_crypto::{
    checksum_hmac_md5, new_kerberos_cipher, AesCipher, AesSizes,
    KerberosCipher, Key, Rc4Cipher,
};
use std::convert::TryFrom;

pub struct Cipher {
    cipher: Box<dyn KerberosCipher>,
    key: Vec<u8>,
}

impl Cipher {
    pub fn generate(user_key: &Key, user: &KrbUser) -> Result<Self> {
        let (cipher, key) = generate_cipher_and_key(user_key, user)?;
        return Ok(Self::new(cipher, key));
    }

    pub fn new(cipher: Box<dyn KerberosCipher>, key: Vec<u8>) -> Self {
        return Self { cipher, key };
    }

    pub fn etype(&self) -> i32 {
        return self.cipher.etype();
    }

    pub fn encrypt(&self, key_usage: i32, plaintext: &[u8]) -> Vec<u8> {
        return self.cipher.encrypt(&self.key, key_usage, plaintext);
    }

    pub fn checksum_hmac_md5(&self, key_usage: i32, text: &[u8]) -> Vec<u8> {
        return checksum_hmac_md5(&self.key, key_usage, text);
    }

    pub fn decrypt(&self, key_usage: i32, ciphertext: &[u8]) -> Result<Vec<u8>> {
        return Ok(self
            .cipher
            .decrypt(&self.key, key_usage, ciphertext)
            .map_err(|err| format!("Decryption error: {}", err))?);
    }
}

impl TryFrom<EncryptionKey> for Cipher {
    type Error = Error;

    fn try_from(enc_key: EncryptionKey) -> Result<Self> {
        let etype = enc_key.keytype;
        let cipher = new_kerberos_cipher(etype).map_err(|_| {
            Error::DataError(format!("Unknown etype {} of EncryptionKey", etype))
        })?;

        return Ok(Self::new(cipher, enc_key.keyvalue));
    }
}

/// Helper to generate a cipher based on the long-term key of the user.
/// Only raw keys are accepted, as read from keytabs.
fn generate_cipher_and_key(
    user_key: &Key,
    user: &KrbUser,
) -> Result<(Box<dyn KerberosCipher>, Vec<u8>)> {
    match user_key {
        Key::Secret(_) => {
            return Err(Error::ArgumentError(format!(
                "Password login is not supported for {}, a keytab key is required",
                user
            )));
        }
        Key::RC4Key(key) => {
            let cipher = Rc4Cipher::new();
            return Ok((Box::new(cipher), key.to_vec()));
        }
        Key::AES128Key(key) => {
            let cipher = AesCipher::new(AesSizes::Aes128);
            return Ok((Box::new(cipher), key.to_vec()));
        }
        Key::AES256Key(key) => {
            let cipher = AesCipher::new(AesSizes::Aes256);
            return Ok((Box::new(cipher), key.to_vec()));
        }
    };
}
