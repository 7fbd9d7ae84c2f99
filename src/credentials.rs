use crate::crypto::{self, HmacKey};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The digest algorithms a Hawk client and server may agree on.
///
/// Inputs naming an algorithm (`"sha1"`, `"SHA-256"`, ...) normalize to this
/// tag through `FromStr`; any other name is [`Error::UnknownAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
    Sha256,
}

impl FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Algorithm> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Algorithm::Sha1),
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            _ => Err(Error::UnknownAlgorithm),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::Sha1 => write!(f, "sha1"),
            Algorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// A Hawk symmetric key bound to its digest algorithm.
///
/// While any non-empty sequence of bytes can be specified as a key, note that
/// each digest algorithm has a suggested key length, and that passwords
/// should *not* be used as keys.
pub struct Key {
    signer: Box<dyn HmacKey>,
    key: Vec<u8>,
    algorithm: Algorithm,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key")
            .field("key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Key {
    /// Create a new key.  An empty secret is rejected as
    /// [`Error::InvalidCredentials`].
    pub fn new<B>(key: B, algorithm: Algorithm) -> Result<Key>
    where
        B: Into<Vec<u8>>,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let signer = crypto::cryptographer().new_key(algorithm, &key)?;
        Ok(Key {
            signer,
            key,
            algorithm,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// HMAC `data` with this key.
    pub(crate) fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signer.sign(data)?)
    }

    /// The raw secret, handed to the nonce collaborator so replay records
    /// can be scoped per key.
    pub(crate) fn raw(&self) -> &[u8] {
        &self.key
    }
}

/// Hawk credentials: an identifier and the key registered for it.  The
/// algorithm travels inside the key; the two ends must agree on it out of
/// band.
#[derive(Debug)]
pub struct Credentials {
    pub id: String,
    pub key: Key,
}
