use crate::{Error, Result};
use std::collections::BTreeSet;
use url::{Host, Url};

/// Restricts which hosts receive credentials.
///
/// Hosts are compared case-insensitively. An empty validator accepts every
/// host.
///
/// # Examples
///
/// ```
/// use apisdk::auth::AllowedHostsValidator;
/// use url::Url;
///
/// let validator = AllowedHostsValidator::new(["api.example.com"]).unwrap();
///
/// assert!(validator.is_url_host_valid(&Url::parse("https://API.example.com/foo").unwrap()));
/// assert!(!validator.is_url_host_valid(&Url::parse("https://evil.example.net/").unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllowedHostsValidator {
    hosts: BTreeSet<String>,
}

impl AllowedHostsValidator {
    /// Creates a validator for the given host names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if an entry carries a scheme, such
    /// as `https://api.example.com`.
    pub fn new<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for host in hosts {
            let host = host.as_ref().trim();
            if host.contains("://") {
                return Err(Error::ConfigurationError(format!(
                    "Allowed host must not include a scheme: {}",
                    host
                )));
            }
            if !host.is_empty() {
                set.insert(host.to_ascii_lowercase());
            }
        }
        Ok(Self { hosts: set })
    }

    /// The configured hosts, lowercased.
    pub fn allowed_hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Returns `true` if credentials may be sent to the host of `url`.
    pub fn is_url_host_valid(&self, url: &Url) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        url.host_str()
            .map(|host| self.hosts.contains(&host.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

/// Rejects credentials over plain HTTP unless the target is the local machine.
pub(crate) fn ensure_secure(url: &Url) -> Result<()> {
    if url.scheme() == "https" || is_loopback(url) {
        return Ok(());
    }
    Err(Error::Authentication(format!(
        "Credentials are only sent over https, refusing {}",
        url
    )))
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
