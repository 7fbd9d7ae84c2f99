//! Pluggable cryptographic backend.
//!
//! All digest, HMAC, randomness, and constant-time comparison needs of the
//! crate go through a process-global [`Cryptographer`].  With the default
//! `use_ring` feature the *ring* backend installs itself on first use; with
//! `use_openssl` (and without `use_ring`) the OpenSSL backend does.  Hosts
//! with their own cryptographic stack can disable both features and install
//! an implementation with [`set_cryptographer`].

use crate::credentials::Algorithm;
use failure::Fail;

mod holder;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};
pub(crate) use holder::cryptographer;

#[cfg(feature = "use_ring")]
mod ring;
#[cfg(feature = "use_openssl")]
mod openssl;

#[derive(Debug, Fail)]
pub enum CryptoError {
    #[fail(display = "Unsupported digest algorithm: {}", _0)]
    UnsupportedDigest(Algorithm),
    #[fail(display = "{}", _0)]
    Other(failure::Error),
}

/// An HMAC key, bound to the algorithm it was created for.
pub trait HmacKey: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An in-progress digest computation.
pub trait Hasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finish the computation and return the digest.  Must not be called
    /// twice.
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

/// The set of cryptographic operations the crate consumes.
pub trait Cryptographer: Send + Sync {
    /// Fill `output` with random bytes.
    fn rand_bytes(&self, output: &mut [u8]) -> Result<(), CryptoError>;

    fn new_key(&self, algorithm: Algorithm, key: &[u8]) -> Result<Box<dyn HmacKey>, CryptoError>;

    /// Compare two byte sequences without leaking the position of the first
    /// difference through timing.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;

    fn new_hasher(&self, algorithm: Algorithm) -> Result<Box<dyn Hasher>, CryptoError>;
}

pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    cryptographer().constant_time_compare(a, b)
}
