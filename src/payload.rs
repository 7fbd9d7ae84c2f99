use crate::b64;
use crate::credentials::Algorithm;
use crate::crypto::{self, Hasher};
use crate::error::Result;

/// A utility for hashing request and response payloads.
///
/// Feed the entity body to this, then pass the `finish` result to a request
/// or response.  The digest must be the same as the one the credentials were
/// created for, and the `content_type` should already be stripped of its
/// parameters (everything from the first `;`).
pub struct PayloadHasher {
    inner: Box<dyn Hasher>,
}

impl PayloadHasher {
    pub fn new(content_type: &[u8], algorithm: Algorithm) -> Result<Self> {
        let mut inner = crypto::cryptographer().new_hasher(algorithm)?;
        inner.update(b"hawk.1.payload\n")?;
        inner.update(content_type)?;
        inner.update(b"\n")?;
        Ok(PayloadHasher { inner })
    }

    /// Hash a single value and return the digest bytes.
    pub fn hash<B>(content_type: &[u8], algorithm: Algorithm, payload: B) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Hash a single value and return its wire form (standard base64).
    pub fn hash_base64<B>(content_type: &[u8], algorithm: Algorithm, payload: B) -> Result<String>
    where
        B: AsRef<[u8]>,
    {
        Ok(b64::encode(&PayloadHasher::hash(
            content_type,
            algorithm,
            payload,
        )?))
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        self.inner.update(data.as_ref())?;
        Ok(())
    }

    /// Finish hashing and return the digest.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.inner.update(b"\n")?;
        Ok(self.inner.finish()?)
    }
}
