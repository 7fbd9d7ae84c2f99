use super::Cryptographer;
use failure::Fail;
use once_cell::sync::OnceCell;

// The backend is chosen once and shared for the life of the process; every
// signing and hashing call in the crate reads through this cell.
static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

/// A cryptographer was already installed, either explicitly or by the
/// feature-selected default.
#[derive(Debug, Fail)]
#[fail(display = "Cryptographer already initialized")]
pub struct SetCryptographerError(());

/// Install the cryptographic backend for this process.
///
/// At most one backend is ever installed.  With the `use_ring` or
/// `use_openssl` features enabled, the matching backend installs itself the
/// first time cryptography is needed, so a host only calls this to override
/// that choice — and must then do so before any other use of the crate.
/// Without either feature, installing a backend is mandatory: cryptographic
/// operations panic until one is present.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

/// Like [`set_cryptographer`], for backends constructed at runtime.  The box
/// is leaked to satisfy the `'static` requirement.
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    set_cryptographer(Box::leak(c))
}

pub(crate) fn cryptographer() -> &'static dyn Cryptographer {
    if let Some(installed) = CRYPTOGRAPHER.get() {
        return *installed;
    }
    install_default();
    CRYPTOGRAPHER.get().copied().expect(
        "no cryptographer installed; call `set_cryptographer` or enable a backend feature",
    )
}

#[cfg(feature = "use_ring")]
fn install_default() {
    let _ = set_cryptographer(&super::ring::RingCryptographer);
}

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
fn install_default() {
    let _ = set_cryptographer(&super::openssl::OpensslCryptographer);
}

#[cfg(not(any(feature = "use_ring", feature = "use_openssl")))]
fn install_default() {}
