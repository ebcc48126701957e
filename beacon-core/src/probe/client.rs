use std::fmt::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};
use x509_parser::parse_x509_certificate;

use super::types::{ChannelOutcome, SslOutcome, TrialRecord};
use crate::config::CheckConfig;
use crate::error::{BeaconError, Result};
use crate::validation::{ProbeTargets, TLS_PORT};

const HTTPS_UNREACHABLE: &str = "https request failed";

/// A single health probe against one domain.
///
/// Implementations must never fail: every transport problem is folded into
/// the returned [`TrialRecord`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, domain: &str) -> TrialRecord;
}

/// Network probe: one HTTP GET, one HTTPS GET and one TLS certificate fetch.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    connector: tokio_native_tls::TlsConnector,
    timeout: Duration,
}

impl std::fmt::Debug for HttpProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProbe")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpProbe {
    /// Build a probe whose requests and TLS handshakes share the configured
    /// timeout.
    pub fn new(config: &CheckConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("beacon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BeaconError::HttpError(e.to_string()))?;

        // Default trust roots and hostname verification.
        let connector = native_tls::TlsConnector::new()
            .map_err(|e| BeaconError::CertificateError(e.to_string()))?;

        Ok(Self {
            client,
            connector: tokio_native_tls::TlsConnector::from(connector),
            timeout: config.request_timeout,
        })
    }

    /// GET `url` once.
    ///
    /// The latency covers the whole body transfer and is recorded for any
    /// status code. A body that cannot be read in full counts as a transport
    /// failure, with no latency.
    async fn fetch(&self, url: &str) -> (ChannelOutcome, Option<f64>) {
        let start = Instant::now();
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if let Err(e) = response.bytes().await {
                    let message = error_chain(&e);
                    warn!(url = %url, error = %message, "Response body could not be read");
                    return (ChannelOutcome::Error { message }, None);
                }
                let elapsed = start.elapsed().as_secs_f64();

                let outcome = if status == reqwest::StatusCode::OK {
                    ChannelOutcome::Ok
                } else {
                    ChannelOutcome::Failed {
                        status: Some(status.as_u16()),
                    }
                };
                (outcome, Some(elapsed))
            }
            Err(e) => {
                let message = error_chain(&e);
                warn!(url = %url, error = %message, "Request failed");
                (ChannelOutcome::Error { message }, None)
            }
        }
    }

    async fn inspect_certificate(&self, host: &str) -> SslOutcome {
        match self.fetch_certificate_expiry(host).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(host = %host, error = %e, "Certificate inspection failed");
                SslOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn fetch_certificate_expiry(&self, host: &str) -> Result<SslOutcome> {
        let handshake = async {
            let stream = TcpStream::connect((host, TLS_PORT))
                .await
                .map_err(|e| BeaconError::CertificateError(e.to_string()))?;
            self.connector
                .connect(host, stream)
                .await
                .map_err(|e| BeaconError::CertificateError(error_chain(&e)))
        };

        let tls_stream = tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| BeaconError::Timeout(format!("TLS handshake with {} timed out", host)))??;

        let Some(cert) = tls_stream
            .get_ref()
            .peer_certificate()
            .map_err(|e| BeaconError::CertificateError(e.to_string()))?
        else {
            return Ok(SslOutcome::Invalid);
        };

        let der = cert
            .to_der()
            .map_err(|e| BeaconError::CertificateError(e.to_string()))?;

        certificate_outcome(&der)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    #[instrument(skip(self), fields(domain = %domain))]
    async fn probe(&self, domain: &str) -> TrialRecord {
        let targets = match ProbeTargets::from_input(domain) {
            Ok(targets) => targets,
            Err(e) => {
                warn!(error = %e, "Unusable domain entry");
                return TrialRecord::failed(domain, e.to_string());
            }
        };

        let (http, http_latency_secs) = self.fetch(&targets.http_url).await;
        let (https, https_latency_secs) = self.fetch(&targets.https_url).await;

        // The certificate is only inspected once the HTTPS target answered.
        // A certificate failure after that leaves the HTTPS outcome alone.
        let ssl = if https_latency_secs.is_some() {
            self.inspect_certificate(&targets.tls_host).await
        } else {
            SslOutcome::Error {
                message: HTTPS_UNREACHABLE.to_string(),
            }
        };

        debug!(?http, ?https, ?ssl, "Probe finished");

        TrialRecord {
            domain: domain.to_string(),
            http,
            https,
            ssl,
            http_latency_secs,
            https_latency_secs,
        }
    }
}

/// Extract the `notAfter` timestamp from a DER certificate.
fn certificate_outcome(der: &[u8]) -> Result<SslOutcome> {
    let (_, parsed) = parse_x509_certificate(der)
        .map_err(|e| BeaconError::CertificateError(format!("unparsable certificate: {}", e)))?;

    let validity = parsed.validity();
    let expiry = DateTime::<Utc>::from_timestamp(validity.not_after.timestamp(), 0)
        .ok_or_else(|| BeaconError::CertificateError("expiry out of range".to_string()))?;

    if validity.is_valid() {
        Ok(SslOutcome::Valid { expiry })
    } else {
        Ok(SslOutcome::Invalid)
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(source) = err.source() {
        let _ = write!(s, ": {}", source);
        err = source;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response on a local port and return its base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    /// A local address with nothing listening on it.
    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    fn http_probe() -> HttpProbe {
        HttpProbe::new(&CheckConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_status_200_is_ok() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
        )
        .await;

        let (outcome, latency) = http_probe().fetch(&url).await;

        assert_eq!(outcome, ChannelOutcome::Ok);
        assert!(latency.is_some());
    }

    #[tokio::test]
    async fn test_fetch_other_status_fails_but_keeps_latency() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        )
        .await;

        let (outcome, latency) = http_probe().fetch(&url).await;

        assert_eq!(outcome, ChannelOutcome::Failed { status: Some(404) });
        assert!(latency.is_some());
    }

    #[tokio::test]
    async fn test_fetch_truncated_body_is_an_error() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nshort").await;

        let (outcome, latency) = http_probe().fetch(&url).await;

        assert!(matches!(outcome, ChannelOutcome::Error { .. }));
        assert!(latency.is_none());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_an_error() {
        let url = format!("http://{}", closed_port().await);

        let (outcome, latency) = http_probe().fetch(&url).await;

        assert!(matches!(outcome, ChannelOutcome::Error { .. }));
        assert!(latency.is_none());
    }

    #[tokio::test]
    async fn test_certificate_skipped_when_https_unreachable() {
        let domain = closed_port().await;

        let trial = http_probe().probe(&domain).await;

        assert!(matches!(trial.http, ChannelOutcome::Error { .. }));
        assert!(matches!(trial.https, ChannelOutcome::Error { .. }));
        assert_eq!(
            trial.ssl,
            SslOutcome::Error {
                message: HTTPS_UNREACHABLE.to_string()
            }
        );
        assert!(trial.https_latency_secs.is_none());
    }

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let err = Outer(Inner);
        assert_eq!(error_chain(&err), "error sending request: connection refused");
    }

    #[test]
    fn test_garbage_certificate_is_an_error() {
        let result = certificate_outcome(&[0x30, 0x03, 0x01, 0x02]);
        assert!(matches!(result, Err(BeaconError::CertificateError(_))));
    }

    #[test]
    fn test_probe_builds_from_default_config() {
        let probe = HttpProbe::new(&CheckConfig::default()).unwrap();
        assert_eq!(probe.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unusable_entry_fails_every_channel() {
        let probe = HttpProbe::new(&CheckConfig::default()).unwrap();
        let trial = probe.probe("http://").await;

        assert_eq!(trial.domain, "http://");
        assert!(matches!(trial.http, ChannelOutcome::Error { .. }));
        assert!(matches!(trial.https, ChannelOutcome::Error { .. }));
        assert!(matches!(trial.ssl, SslOutcome::Error { .. }));
        assert!(trial.http_latency_secs.is_none());
    }
}
