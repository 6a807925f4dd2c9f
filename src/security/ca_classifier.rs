//! Certificate issuer classification.

use crate::models::CaType;

/// Issuer markers of free, automated CAs (including Let's Encrypt intermediates).
pub const FREE_CA_MARKERS: &[&str] = &[
    "Let's Encrypt",
    "ZeroSSL",
    "Buypass",
    "SSL.com Free",
    "cPanel",
    "R3",
    "R10",
    "R11",
    "E1",
    "E2",
];

/// Issuer markers of commercial CAs.
pub const COMMERCIAL_CA_MARKERS: &[&str] = &[
    "DigiCert",
    "GlobalSign",
    "Sectigo",
    "Comodo",
    "GeoTrust",
    "Thawte",
    "Entrust",
    "GoDaddy",
    "Network Solutions",
    "Symantec",
    "VeriSign",
    "RapidSSL",
    "AlphaSSL",
    "Certum",
    "SwissSign",
    "QuoVadis",
    "Amazon",
    "Google Trust Services",
    "Microsoft",
    "Apple",
];

/// Maps an issuer distinguished name to a `CaType` by substring matching.
///
/// Markers are stored upper-cased; matching is case-insensitive. The free set
/// is checked first, so an issuer matching both sets is `FreeCa`.
#[derive(Debug, Clone)]
pub struct CaClassifier {
    free: Vec<String>,
    commercial: Vec<String>,
}

impl Default for CaClassifier {
    fn default() -> Self {
        Self::new(FREE_CA_MARKERS, COMMERCIAL_CA_MARKERS)
    }
}

impl CaClassifier {
    pub fn new<F, C>(free: F, commercial: C) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let upper = |m: &str| m.trim().to_uppercase();
        Self {
            free: free
                .into_iter()
                .map(|m| upper(m.as_ref()))
                .filter(|m| !m.is_empty())
                .collect(),
            commercial: commercial
                .into_iter()
                .map(|m| upper(m.as_ref()))
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, issuer: &str) -> CaType {
        let issuer = issuer.trim();
        if issuer.is_empty() {
            return CaType::Unknown;
        }
        let issuer = issuer.to_uppercase();

        if self.free.iter().any(|m| issuer.contains(m.as_str())) {
            CaType::FreeCa
        } else if self.commercial.iter().any(|m| issuer.contains(m.as_str())) {
            CaType::CommercialCa
        } else {
            CaType::Unknown
        }
    }
}
