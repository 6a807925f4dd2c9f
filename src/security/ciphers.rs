//! Cipher suite predicates.

use crate::models::TlsVersion;

/// Substrings that mark a cipher suite as weak.
pub const WEAK_CIPHER_MARKERS: &[&str] = &["NULL", "EXPORT", "RC4", "DES", "MD5", "ANON"];

/// True if `name` contains any weak marker, ignoring case.
pub fn is_weak_cipher(name: &str) -> bool {
    let upper = name.to_uppercase();
    WEAK_CIPHER_MARKERS.iter().any(|m| upper.contains(m))
}

/// True for every TLS 1.3 suite and for (EC)DHE key exchange below it.
pub fn is_forward_secret(name: &str, version: TlsVersion) -> bool {
    version == TlsVersion::Tls13 || name.to_uppercase().contains("DHE")
}
