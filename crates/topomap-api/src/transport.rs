// HTTP settings for reaching the inventory service.
//
// TLS trust, the request ceiling and the bearer token live here; the
// client only builds and classifies queries.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// How the inventory's certificate is checked.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    #[default]
    System,
    /// Trust the PEM bundle at this path in addition to the system roots.
    CustomCa(PathBuf),
    /// Accept any certificate (lab inventories with self-signed certs).
    DangerAcceptInvalid,
}

/// Everything needed to build the `reqwest::Client` an [`InventoryClient`] uses.
///
/// [`InventoryClient`]: crate::InventoryClient
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Upper bound for a whole request; individual queries may tighten it.
    pub timeout: Duration,
    /// Bearer token sent as `Authorization` on every request.
    pub token: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("topomap/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("cannot read CA bundle {}: {e}", path.display()))
                })?;
                let ca = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Tls(format!("CA bundle {} is not PEM: {e}", path.display())))?;
                builder = builder.add_root_certificate(ca);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref token) = self.token {
            let mut headers = HeaderMap::new();
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Tls(format!("invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build inventory HTTP client: {e}")))
    }
}
