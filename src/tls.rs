// src/tls.rs
// TLS certificate loading, self-signed generation and rustls configuration

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    Disabled,
    /// Generate a throwaway certificate at startup.
    SelfSigned,
    /// Certificate chain and private key supplied as PEM files.
    Pem { cert_path: PathBuf, key_path: PathBuf },
}

#[derive(Debug)]
pub enum TlsError {
    IoError(io::Error),
    InvalidCertificate(String),
    InvalidPrivateKey(String),
    MissingPrivateKey,
    GenerationFailed(String),
    ConfigError(String),
}

impl std::fmt::Display for TlsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsError::IoError(e) => write!(f, "IO error: {}", e),
            TlsError::InvalidCertificate(msg) => write!(f, "Invalid certificate: {}", msg),
            TlsError::InvalidPrivateKey(msg) => write!(f, "Invalid private key: {}", msg),
            TlsError::MissingPrivateKey => {
                write!(f, "Private key is required for PEM certificates")
            }
            TlsError::GenerationFailed(msg) => {
                write!(f, "Self-signed certificate generation failed: {}", msg)
            }
            TlsError::ConfigError(msg) => write!(f, "TLS configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TlsError {}

impl From<io::Error> for TlsError {
    fn from(err: io::Error) -> Self {
        TlsError::IoError(err)
    }
}

impl From<rustls::Error> for TlsError {
    fn from(err: rustls::Error) -> Self {
        TlsError::ConfigError(format!("Rustls error: {}", err))
    }
}

impl TlsMode {
    /// Validate the TLS related command line arguments.
    ///
    /// An explicit certificate takes precedence over `--ssl`.
    pub fn from_args(
        self_signed: bool,
        cert: Option<&str>,
        key: Option<&str>,
    ) -> Result<Self, TlsError> {
        match (cert, key) {
            (Some(cert_path), Some(key_path)) => Ok(TlsMode::Pem {
                cert_path: PathBuf::from(cert_path),
                key_path: PathBuf::from(key_path),
            }),
            (Some(_), None) => Err(TlsError::MissingPrivateKey),
            (None, Some(_)) => Err(TlsError::ConfigError(
                "SSL key provided without certificate".to_string(),
            )),
            (None, None) if self_signed => Ok(TlsMode::SelfSigned),
            (None, None) => Ok(TlsMode::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, TlsMode::Disabled)
    }

    pub fn scheme(&self) -> &'static str {
        if self.is_enabled() {
            "https"
        } else {
            "http"
        }
    }

    /// Build the rustls server configuration, or `None` for plain HTTP.
    ///
    /// `hosts` become the subject alternative names of a self-signed
    /// certificate and are ignored otherwise.
    pub fn server_config(&self, hosts: &[String]) -> Result<Option<ServerConfig>, TlsError> {
        match self {
            TlsMode::Disabled => Ok(None),
            TlsMode::SelfSigned => {
                let (chain, key) = generate_self_signed(hosts)?;
                build_server_config(chain, key).map(Some)
            }
            TlsMode::Pem {
                cert_path,
                key_path,
            } => {
                let chain = load_cert_chain(cert_path)?;
                let key = load_private_key(key_path)?;
                build_server_config(chain, key).map(Some)
            }
        }
    }
}

fn generate_self_signed(
    hosts: &[String],
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TlsError> {
    let names = if hosts.is_empty() {
        vec!["localhost".to_string()]
    } else {
        hosts.to_vec()
    };

    let cert = rcgen::generate_simple_self_signed(names)
        .map_err(|e| TlsError::GenerationFailed(e.to_string()))?;
    let cert_der = cert
        .serialize_der()
        .map_err(|e| TlsError::GenerationFailed(e.to_string()))?;
    let key_der = cert.serialize_private_key_der();

    Ok((
        vec![CertificateDer::from(cert_der)],
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_der)),
    ))
}

fn load_cert_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = BufReader::new(File::open(path)?);
    let chain = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::InvalidCertificate(format!("Failed to parse certificates: {}", e)))?;

    if chain.is_empty() {
        return Err(TlsError::InvalidCertificate(
            "No certificates found in file".to_string(),
        ));
    }

    Ok(chain)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::InvalidPrivateKey(format!("Failed to parse private key: {}", e)))?
        .ok_or_else(|| TlsError::InvalidPrivateKey("No valid private key found".to_string()))
}

fn build_server_config(
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<ServerConfig, TlsError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(chain, key)?;

    Ok(config)
}
