//! Registrable-domain extraction
//!
//! Reduces a URL to the part a registrant controls (eTLD+1), e.g.
//! `http://www.news.example.co.uk/a` → `example.co.uk`, using the Public
//! Suffix List (private section included, so `alice.blogspot.com` is its
//! own site). IP hosts are returned as `host[:port]`.

use url::{Host, Url};

fn parse(url: &str) -> Option<Url> {
    let url = url.trim();
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => Some(parsed),
        // Bare hosts such as "example.com" carry no scheme
        _ => Url::parse(&format!("http://{}", url))
            .ok()
            .filter(Url::has_host),
    }
}

/// True when the URL's host is an IPv4 or IPv6 literal
pub fn is_ip(url: &str) -> bool {
    matches!(
        parse(url).as_ref().and_then(Url::host),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_))
    )
}

/// Registrable domain of `url`, or `None` if it has no usable host
///
/// A host that is itself a public suffix (`gov.br`) is its own registrable
/// domain, and its `www.` alias maps back onto it.
pub fn registrable_domain(url: &str) -> Option<String> {
    let parsed = parse(url)?;
    match parsed.host()? {
        Host::Ipv4(_) | Host::Ipv6(_) => {
            let host = parsed.host_str()?;
            Some(match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        }
        Host::Domain(host) => {
            let host = host.trim_matches('.').to_ascii_lowercase();
            if host.is_empty() {
                return None;
            }
            let registrable = psl::domain_str(&host).unwrap_or(host.as_str());
            let registrable = match registrable.strip_prefix("www.") {
                Some(rest) if rest.contains('.') && psl::domain_str(rest).is_none() => rest,
                _ => registrable,
            };
            Some(registrable.to_string())
        }
    }
}

/// Label just left of the public suffix (`example` for `example.co.uk`)
///
/// `None` when the domain is a bare public suffix.
pub fn organization_label(registrable: &str) -> Option<&str> {
    let suffix = psl::suffix_str(registrable)?;
    registrable
        .strip_suffix(suffix)?
        .strip_suffix('.')?
        .rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ip() {
        assert!(is_ip("https://192.128.0.1:80"));
        assert!(is_ip("http://[::1]/"));
        assert!(!is_ip("https://www.google.com"));
    }

    #[test]
    fn test_strips_subdomains() {
        assert_eq!(
            registrable_domain("http://www.example.com/path?q=1").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            registrable_domain("https://a.b.c.example.org").as_deref(),
            Some("example.org")
        );
    }

    #[test]
    fn test_country_second_level_suffix() {
        assert_eq!(
            registrable_domain("http://news.bbc.co.uk/").as_deref(),
            Some("bbc.co.uk")
        );
        assert_eq!(
            registrable_domain("https://portal.saude.gov.br/").as_deref(),
            Some("saude.gov.br")
        );
    }

    #[test]
    fn test_site_on_a_public_suffix_keeps_www_alias() {
        assert_eq!(registrable_domain("http://gov.br/").as_deref(), Some("gov.br"));
        assert_eq!(registrable_domain("https://www.gov.br/").as_deref(), Some("gov.br"));
        assert_eq!(registrable_domain("https://www.gov.za/").as_deref(), Some("gov.za"));
        // www.com is an ordinary registration, not an alias of "com"
        assert_eq!(registrable_domain("http://www.com/").as_deref(), Some("www.com"));
    }

    #[test]
    fn test_private_suffixes_separate_tenants() {
        assert_eq!(
            registrable_domain("http://alice.blogspot.com/").as_deref(),
            Some("alice.blogspot.com")
        );
        assert_ne!(
            registrable_domain("http://alice.blogspot.com/"),
            registrable_domain("http://censor.blogspot.com/")
        );
    }

    #[test]
    fn test_bare_host_without_scheme() {
        assert_eq!(registrable_domain("example.com").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_ip_keeps_port() {
        assert_eq!(
            registrable_domain("http://10.10.34.34:8080/blocked.html").as_deref(),
            Some("10.10.34.34:8080")
        );
        assert_eq!(
            registrable_domain("http://10.10.34.34/").as_deref(),
            Some("10.10.34.34")
        );
    }

    #[test]
    fn test_single_label_host() {
        assert_eq!(registrable_domain("http://localhost/").as_deref(), Some("localhost"));
    }

    #[test]
    fn test_case_and_trailing_dot_normalized() {
        assert_eq!(
            registrable_domain("http://WWW.Example.COM./").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_organization_label() {
        assert_eq!(organization_label("example.co.uk"), Some("example"));
        assert_eq!(organization_label("alice.blogspot.com"), Some("alice"));
        assert_eq!(organization_label("gov.br"), None);
    }
}
