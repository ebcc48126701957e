//! Target construction for probe inputs.
//!
//! Domain list entries arrive either as bare hostnames (`example.com`) or as
//! URLs (`https://example.com:8443/path`). Both forms are turned into a pair of
//! `http://` and `https://` targets plus the host used for the certificate
//! inspection, which always connects on port 443.

use url::{Host, Url};

use crate::error::{BeaconError, Result};

pub const TLS_PORT: u16 = 443;

/// Network targets derived from a single domain list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTargets {
    pub http_url: String,
    pub https_url: String,
    /// Host used for SNI and hostname verification during certificate inspection.
    pub tls_host: String,
}

impl ProbeTargets {
    /// Build targets from a raw entry.
    ///
    /// Without a scheme the entry is used verbatim after `http://` and
    /// `https://`. With a scheme only the host and explicit port survive; the
    /// entry's own scheme and any path, query or fragment are discarded.
    pub fn from_input(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BeaconError::InvalidDomain("empty domain".to_string()));
        }

        if has_scheme(input) {
            let parsed = Url::parse(input)
                .map_err(|e| BeaconError::InvalidDomain(format!("{}: {}", input, e)))?;
            let host = parsed
                .host()
                .ok_or_else(|| BeaconError::InvalidDomain(format!("{}: missing host", input)))?;
            let authority = match written_port(input, &parsed) {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };

            Ok(Self {
                http_url: format!("http://{}", authority),
                https_url: format!("https://{}", authority),
                tls_host: host_name(&host),
            })
        } else {
            let https_url = format!("https://{}", input);
            let parsed = Url::parse(&https_url)
                .map_err(|e| BeaconError::InvalidDomain(format!("{}: {}", input, e)))?;
            let host = parsed
                .host()
                .ok_or_else(|| BeaconError::InvalidDomain(format!("{}: missing host", input)))?;

            Ok(Self {
                http_url: format!("http://{}", input),
                tls_host: host_name(&host),
                https_url,
            })
        }
    }
}

fn has_scheme(input: &str) -> bool {
    input
        .split_once("://")
        .is_some_and(|(scheme, _)| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        })
}

/// Port as written in the entry.
///
/// `Url::port` hides a port equal to the scheme default, so `:443` on an
/// `https://` entry is recovered from the raw authority.
fn written_port(input: &str, parsed: &Url) -> Option<u16> {
    if let Some(port) = parsed.port() {
        return Some(port);
    }

    let rest = input.split_once("://").map_or(input, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let (_, port) = host_port.rsplit_once(':')?;

    if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
        parsed.port_or_known_default()
    } else {
        None
    }
}

fn host_name(host: &Host<&str>) -> String {
    match host {
        Host::Domain(domain) => domain.to_string(),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain() {
        let targets = ProbeTargets::from_input("example.com").unwrap();
        assert_eq!(targets.http_url, "http://example.com");
        assert_eq!(targets.https_url, "https://example.com");
        assert_eq!(targets.tls_host, "example.com");
    }

    #[test]
    fn test_bare_domain_is_trimmed() {
        let targets = ProbeTargets::from_input("  example.org \t").unwrap();
        assert_eq!(targets.http_url, "http://example.org");
        assert_eq!(targets.tls_host, "example.org");
    }

    #[test]
    fn test_scheme_is_replaced_and_path_dropped() {
        let targets = ProbeTargets::from_input("https://www.example.com/some/path?q=1").unwrap();
        assert_eq!(targets.http_url, "http://www.example.com");
        assert_eq!(targets.https_url, "https://www.example.com");
        assert_eq!(targets.tls_host, "www.example.com");
    }

    #[test]
    fn test_explicit_port_is_kept_for_urls_but_not_tls() {
        let targets = ProbeTargets::from_input("http://example.com:8080/").unwrap();
        assert_eq!(targets.http_url, "http://example.com:8080");
        assert_eq!(targets.https_url, "https://example.com:8080");
        assert_eq!(targets.tls_host, "example.com");
    }

    #[test]
    fn test_default_port_written_explicitly_is_kept() {
        let targets = ProbeTargets::from_input("https://example.com:443/x").unwrap();
        assert_eq!(targets.http_url, "http://example.com:443");
        assert_eq!(targets.https_url, "https://example.com:443");
        assert_eq!(targets.tls_host, "example.com");

        let targets = ProbeTargets::from_input("http://example.com:80").unwrap();
        assert_eq!(targets.http_url, "http://example.com:80");
        assert_eq!(targets.https_url, "https://example.com:80");
    }

    #[test]
    fn test_url_without_port_gets_none_added() {
        let targets = ProbeTargets::from_input("https://user@example.com/a:b").unwrap();
        assert_eq!(targets.http_url, "http://example.com");

        let targets = ProbeTargets::from_input("https://[::1]/").unwrap();
        assert_eq!(targets.https_url, "https://[::1]");
    }

    #[test]
    fn test_domain_starting_with_http_is_not_a_scheme() {
        let targets = ProbeTargets::from_input("httpbin.org").unwrap();
        assert_eq!(targets.http_url, "http://httpbin.org");
        assert_eq!(targets.tls_host, "httpbin.org");
    }

    #[test]
    fn test_ipv6_host() {
        let targets = ProbeTargets::from_input("https://[::1]:8443").unwrap();
        assert_eq!(targets.https_url, "https://[::1]:8443");
        assert_eq!(targets.tls_host, "::1");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(ProbeTargets::from_input("").is_err());
        assert!(ProbeTargets::from_input("   ").is_err());
        assert!(ProbeTargets::from_input("http://").is_err());
        assert!(ProbeTargets::from_input("exa mple.com").is_err());
    }
}
