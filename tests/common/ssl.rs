//! Certificates for HTTPS tests

use std::io::Write;

use tempfile::NamedTempFile;

pub struct SslTestHelper;

impl SslTestHelper {
    /// Generate a self-signed certificate for testing
    pub fn generate_test_certificate() -> Result<(String, String), Box<dyn std::error::Error>> {
        use rcgen::{Certificate, CertificateParams};

        let mut params =
            CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()]);
        params.alg = &rcgen::PKCS_ECDSA_P256_SHA256;

        let cert = Certificate::from_params(params)?;
        let cert_pem = cert.serialize_pem()?;
        let key_pem = cert.serialize_private_key_pem();

        Ok((cert_pem, key_pem))
    }

    /// Create temporary certificate and key files for testing
    pub fn create_temp_cert_files(
    ) -> Result<(NamedTempFile, NamedTempFile), Box<dyn std::error::Error>> {
        let (cert_pem, key_pem) = Self::generate_test_certificate()?;

        let mut cert_file = NamedTempFile::new()?;
        cert_file.write_all(cert_pem.as_bytes())?;

        let mut key_file = NamedTempFile::new()?;
        key_file.write_all(key_pem.as_bytes())?;

        Ok((cert_file, key_file))
    }
}
