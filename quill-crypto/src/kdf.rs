#![forbid(unsafe_code)]

//! Misuse-resistant HKDF wrapper.
//!
//! Provides typed labels to avoid context/domain confusion when deriving
//! keys. All APIs use HKDF-SHA256. The fixed labels distinguish Quill's
//! derivations from any other use of the same KDF, preventing
//! cross-protocol key reuse.

use hkdf::Hkdf;
use sha2::Sha256;

/// Label domain for HKDF operations. Ensures unique separation between
/// different uses of the same input keying material.
#[derive(Debug, Clone, Copy)]
pub enum KdfLabel {
    /// Hybrid session key derivation (used as both salt and info).
    Session,
    /// Simulated-KEM shared-secret derivation.
    KemSim,
    /// Custom static string label supplied by caller.
    Custom(&'static [u8]),
}

impl KdfLabel {
    /// Convert to the associated ASCII label bytes.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            KdfLabel::Session => b"quill-hybrid-session",
            KdfLabel::KemSim => b"quill-kem-sim",
            KdfLabel::Custom(s) => s,
        }
    }
}

/// Extract-and-expand the given input keying material into `out_len` bytes.
///
/// Deterministic for identical inputs. An empty salt falls back to the
/// HKDF default (a zeroed block).
///
/// # Panics
/// * If `out_len` exceeds the maximum allowed by HKDF (255 * HashLen).
pub fn hkdf_extract_expand(ikm: &[u8], salt: &[u8], info: &[u8], out_len: usize) -> Vec<u8> {
    let salt = if salt.is_empty() { None } else { Some(salt) };
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    let mut okm = vec![0u8; out_len];
    hk.expand(info, &mut okm).expect("HKDF expand failed");
    okm
}
