//! Address syntax checks for alias targets

use std::net::{IpAddr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;

/// Domain name regex: labels of letters, digits and underscores with inner
/// hyphens, optional single trailing dot
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:[a-z_0-9]|[a-z_0-9][a-z_0-9\-]*[a-z_0-9])\.)*(?:[a-z_0-9]|[a-z_0-9][a-z_0-9\-]*[a-z_0-9\.])$",
    )
    .expect("Invalid domain regex")
});

/// Check for an IPv4 or IPv6 literal
///
/// IPv6 link-local literals may carry a zone suffix (`fe80::1%em0`).
///
/// # Examples
/// ```
/// use aliastool::alias::is_ipaddr;
/// assert!(is_ipaddr("192.168.1.10"));
/// assert!(is_ipaddr("2001:db8::1"));
/// assert!(is_ipaddr("fe80::1%em0"));
/// assert!(!is_ipaddr("192.168.1.256"));
/// ```
pub fn is_ipaddr(value: &str) -> bool {
    if value.parse::<IpAddr>().is_ok() {
        return true;
    }

    match value.split_once('%') {
        Some((addr, zone)) if !zone.is_empty() => {
            addr.parse::<Ipv6Addr>().is_ok() && addr.to_ascii_lowercase().starts_with("fe80:")
        }
        _ => false,
    }
}

/// Check for a syntactically valid domain name
///
/// # Examples
/// ```
/// use aliastool::alias::is_domain;
/// assert!(is_domain("www.example.com"));
/// assert!(is_domain("_sip._udp.example.com."));
/// assert!(!is_domain("notanip_or_domain!"));
/// ```
pub fn is_domain(value: &str) -> bool {
    DOMAIN_RE.is_match(value)
}

/// A host alias accepts either an IP address or a domain name
pub fn is_valid_target(value: &str) -> bool {
    is_ipaddr(value) || is_domain(value)
}
