//! TLS probe built on `tokio-rustls`.
//!
//! A baseline handshake (all suites, TLS 1.2 + 1.3) establishes reachability
//! and captures the leaf certificate. Each cipher suite is then offered on its
//! own to enumerate what the server accepts per version.
//!
//! rustls only speaks TLS 1.2 and TLS 1.3, so SSL 2.0 through TLS 1.1 are
//! always reported as not supported by this probe.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme, SupportedCipherSuite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use super::{LeafCertificate, ProtocolProbe, TlsProbe, TlsProbeReport};
use crate::error_handling::TlsProbeError;
use crate::models::TlsVersion;

/// TLS probe using the rustls ring provider.
///
/// Certificates are recorded as presented; chain validation is not part of
/// grading, so expired or self-signed certificates still produce a report.
#[derive(Debug, Clone)]
pub struct RustlsTlsProbe {
    provider: Arc<CryptoProvider>,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl RustlsTlsProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            provider: Arc::new(ring::default_provider()),
            connect_timeout: timeout,
            handshake_timeout: timeout,
        }
    }

    fn config_for(
        &self,
        suites: Vec<SupportedCipherSuite>,
        versions: &[&'static rustls::SupportedProtocolVersion],
    ) -> Result<Arc<ClientConfig>, rustls::Error> {
        let provider = CryptoProvider {
            cipher_suites: suites,
            ..(*self.provider).clone()
        };
        let verifier = Arc::new(RecordingVerifier {
            algorithms: self.provider.signature_verification_algorithms,
        });
        let config = ClientConfig::builder_with_provider(Arc::new(provider))
            .with_protocol_versions(versions)?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();
        Ok(Arc::new(config))
    }

    async fn handshake(
        &self,
        domain: &str,
        port: u16,
        server_name: ServerName<'static>,
        config: Arc<ClientConfig>,
    ) -> Result<Handshake, AttemptError> {
        let sock = match tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((domain, port)),
        )
        .await
        {
            Ok(Ok(sock)) => sock,
            Ok(Err(e)) => return Err(AttemptError::Connect(e.to_string())),
            Err(_) => return Err(AttemptError::ConnectTimeout),
        };

        let connector = TlsConnector::from(config);
        let stream = match tokio::time::timeout(
            self.handshake_timeout,
            connector.connect(server_name, sock),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(AttemptError::Handshake(e.to_string())),
            Err(_) => return Err(AttemptError::HandshakeTimeout),
        };

        let conn = stream.get_ref().1;
        Ok(Handshake {
            version: conn.protocol_version().and_then(map_protocol_version),
            leaf: conn
                .peer_certificates()
                .and_then(|certs| certs.first())
                .map(|cert| cert.as_ref().to_vec()),
        })
    }
}

impl TlsProbe for RustlsTlsProbe {
    async fn probe(&self, domain: &str, port: u16) -> Result<TlsProbeReport, TlsProbeError> {
        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|e| TlsProbeError::InvalidDomain(format!("{domain}: {e}")))?;

        let all_versions = [&rustls::version::TLS13, &rustls::version::TLS12];
        let baseline_config = self
            .config_for(self.provider.cipher_suites.clone(), &all_versions)
            .map_err(|e| TlsProbeError::ConnectFailed(e.to_string()))?;

        log::debug!("Baseline handshake with {domain}:{port}");
        let baseline = self
            .handshake(domain, port, server_name.clone(), baseline_config)
            .await
            .map_err(|e| e.into_probe_error(domain, port, self.connect_timeout))?;

        let certificate = match baseline.leaf.as_deref().map(parse_leaf) {
            Some(Ok(leaf)) => Some(leaf),
            Some(Err(e)) => {
                log::warn!("Unreadable certificate from {domain}: {e}");
                None
            }
            None => None,
        };

        let mut tls12 = Vec::new();
        let mut tls13 = Vec::new();
        for suite in self.provider.cipher_suites.iter().copied() {
            let (version, protocol) = match suite {
                SupportedCipherSuite::Tls13(_) => (TlsVersion::Tls13, &rustls::version::TLS13),
                SupportedCipherSuite::Tls12(_) => (TlsVersion::Tls12, &rustls::version::TLS12),
            };
            let name = format!("{:?}", suite.suite());
            let config = match self.config_for(vec![suite], &[protocol]) {
                Ok(config) => config,
                Err(e) => {
                    log::debug!("Skipping {name}: {e}");
                    continue;
                }
            };

            match self.handshake(domain, port, server_name.clone(), config).await {
                Ok(_) => {
                    log::trace!("{domain} accepted {name}");
                    match version {
                        TlsVersion::Tls13 => tls13.push(name),
                        _ => tls12.push(name),
                    }
                }
                Err(e) => log::trace!("{domain} rejected {name}: {e:?}"),
            }
        }

        // A server can accept the baseline with a suite the per-suite pass missed
        // (for example after a transient failure); the negotiated version counts.
        let tls12_supported = !tls12.is_empty() || baseline.version == Some(TlsVersion::Tls12);
        let tls13_supported = !tls13.is_empty() || baseline.version == Some(TlsVersion::Tls13);
        if !tls12_supported && !tls13_supported {
            return Err(TlsProbeError::NoProtocolNegotiated(domain.to_string()));
        }

        let mut protocols: Vec<ProtocolProbe> = TlsVersion::ALL
            .into_iter()
            .filter(|v| v.is_deprecated())
            .map(ProtocolProbe::unsupported)
            .collect();
        protocols.push(if tls12_supported {
            ProtocolProbe::supported(TlsVersion::Tls12, tls12)
        } else {
            ProtocolProbe::unsupported(TlsVersion::Tls12)
        });
        protocols.push(if tls13_supported {
            ProtocolProbe::supported(TlsVersion::Tls13, tls13)
        } else {
            ProtocolProbe::unsupported(TlsVersion::Tls13)
        });

        Ok(TlsProbeReport {
            protocols,
            certificate,
        })
    }
}

struct Handshake {
    version: Option<TlsVersion>,
    leaf: Option<Vec<u8>>,
}

#[derive(Debug)]
enum AttemptError {
    ConnectTimeout,
    Connect(String),
    HandshakeTimeout,
    Handshake(String),
}

impl AttemptError {
    fn into_probe_error(self, domain: &str, port: u16, timeout: Duration) -> TlsProbeError {
        match self {
            AttemptError::ConnectTimeout => TlsProbeError::ConnectTimeout {
                domain: domain.to_string(),
                port,
                secs: timeout.as_secs(),
            },
            AttemptError::Connect(e) => {
                TlsProbeError::ConnectFailed(format!("{domain}:{port} - {e}"))
            }
            AttemptError::HandshakeTimeout => TlsProbeError::HandshakeTimeout {
                domain: domain.to_string(),
                secs: timeout.as_secs(),
            },
            AttemptError::Handshake(e) => {
                TlsProbeError::NoProtocolNegotiated(format!("{domain} ({e})"))
            }
        }
    }
}

fn map_protocol_version(version: rustls::ProtocolVersion) -> Option<TlsVersion> {
    match version {
        rustls::ProtocolVersion::TLSv1_3 => Some(TlsVersion::Tls13),
        rustls::ProtocolVersion::TLSv1_2 => Some(TlsVersion::Tls12),
        rustls::ProtocolVersion::TLSv1_1 => Some(TlsVersion::Tls11),
        rustls::ProtocolVersion::TLSv1_0 => Some(TlsVersion::Tls10),
        rustls::ProtocolVersion::SSLv3 => Some(TlsVersion::Ssl3),
        rustls::ProtocolVersion::SSLv2 => Some(TlsVersion::Ssl2),
        _ => None,
    }
}

/// Accepts any certificate chain but still checks handshake signatures.
#[derive(Debug)]
struct RecordingVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for RecordingVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Encodes a DER certificate as PEM with 64-column base64 lines.
pub fn der_to_pem(der: &[u8]) -> String {
    let encoded = STANDARD.encode(der);
    let mut pem = String::with_capacity(encoded.len() + encoded.len() / 64 + 64);
    pem.push_str("-----BEGIN CERTIFICATE-----\n");
    for chunk in encoded.as_bytes().chunks(64) {
        // base64 output is ASCII
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str("-----END CERTIFICATE-----\n");
    pem
}

fn parse_leaf(der: &[u8]) -> Result<LeafCertificate, TlsProbeError> {
    let (_, cert) = parse_x509_certificate(der)
        .map_err(|e| TlsProbeError::Certificate(e.to_string()))?;

    let validity = cert.validity();
    let valid_from = asn1_to_utc(&validity.not_before)?;
    let valid_until = asn1_to_utc(&validity.not_after)?;

    let (public_key_algorithm, public_key_size) = match cert.public_key().parsed() {
        Ok(PublicKey::RSA(rsa)) => (Some("RSA".to_string()), Some(rsa.key_size() as u32)),
        Ok(PublicKey::EC(ec)) => (Some("EC".to_string()), Some(ec.key_size() as u32)),
        _ => (
            Some(key_algorithm_name(
                &cert.public_key().algorithm.algorithm.to_id_string(),
            )),
            None,
        ),
    };

    Ok(LeafCertificate {
        der: der.to_vec(),
        pem: Some(der_to_pem(der)),
        issuer: cert.issuer().to_string(),
        subject: cert.subject().to_string(),
        signature_algorithm: Some(signature_algorithm_name(
            &cert.signature_algorithm.algorithm.to_id_string(),
        )),
        public_key_algorithm,
        public_key_size,
        valid_from,
        valid_until,
    })
}

fn asn1_to_utc(time: &ASN1Time) -> Result<DateTime<Utc>, TlsProbeError> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| TlsProbeError::Certificate(format!("validity out of range: {time}")))
}

fn signature_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption",
        "1.2.840.113549.1.1.10" => "rsassaPss",
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption",
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption",
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption",
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256",
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384",
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512",
        "1.3.101.112" => "Ed25519",
        "1.3.101.113" => "Ed448",
        other => return other.to_string(),
    }
    .to_string()
}

fn key_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.1" => "RSA",
        "1.2.840.10045.2.1" => "EC",
        "1.3.101.112" => "Ed25519",
        "1.3.101.113" => "Ed448",
        other => return other.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der_to_pem_wraps_lines() {
        let der = vec![0xABu8; 100];
        let pem = der_to_pem(&der);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        for line in pem.lines() {
            assert!(line.len() <= 64 || line.starts_with("-----"));
        }
        let body: String = pem
            .lines()
            .filter(|l| !l.starts_with("-----"))
            .collect();
        assert_eq!(STANDARD.decode(body).unwrap(), der);
    }

    #[test]
    fn test_oid_names() {
        assert_eq!(
            signature_algorithm_name("1.2.840.113549.1.1.11"),
            "sha256WithRSAEncryption"
        );
        assert_eq!(signature_algorithm_name("1.2.3.4"), "1.2.3.4");
        assert_eq!(key_algorithm_name("1.2.840.10045.2.1"), "EC");
    }

    #[test]
    fn test_parse_leaf_rejects_garbage() {
        assert!(matches!(
            parse_leaf(&[0x30, 0x03, 0x01, 0x01]),
            Err(TlsProbeError::Certificate(_))
        ));
    }

    #[test]
    fn test_handshake_count_fits_domain_deadline() {
        let suites = ring::default_provider().cipher_suites.len() as u64;
        assert!(suites < crate::config::MAX_TLS_HANDSHAKES);
    }

    #[test]
    fn test_protocol_version_mapping() {
        assert_eq!(
            map_protocol_version(rustls::ProtocolVersion::TLSv1_3),
            Some(TlsVersion::Tls13)
        );
        assert_eq!(
            map_protocol_version(rustls::ProtocolVersion::TLSv1_2),
            Some(TlsVersion::Tls12)
        );
    }

    #[tokio::test]
    async fn test_invalid_server_name() {
        let probe = RustlsTlsProbe::new(Duration::from_secs(1));
        let result = probe.probe("not a domain", 443).await;
        assert!(matches!(result, Err(TlsProbeError::InvalidDomain(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_failure() {
        // Bind and drop a listener to get a local port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = RustlsTlsProbe::new(Duration::from_secs(2));
        let result = probe.probe("localhost", port).await;
        assert!(matches!(
            result,
            Err(TlsProbeError::ConnectFailed(_)) | Err(TlsProbeError::ConnectTimeout { .. })
        ));
    }
}
