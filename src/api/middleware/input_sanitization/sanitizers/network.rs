use std::net::IpAddr;

use url::{Host, Url};

use super::Sanitizer;

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https"];

impl Sanitizer {
    /// Normalize an http(s) URL; every other scheme yields `""`.
    ///
    /// Bare domains are upgraded to `https://`.
    pub fn sanitize_url(input: &str) -> String {
        let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let candidate = match url_scheme(trimmed) {
            Some(scheme) if ALLOWED_URL_SCHEMES.contains(&scheme.as_str()) => trimmed.to_string(),
            Some(_) => return String::new(),
            None if trimmed.starts_with("//") => format!("https:{}", trimmed),
            None => format!("https://{}", trimmed),
        };

        let url = match Url::parse(&candidate) {
            Ok(url) => url,
            Err(_) => return String::new(),
        };

        if !url.username().is_empty() || url.password().is_some() {
            return String::new();
        }

        match url.host() {
            Some(Host::Domain(domain)) if domain.contains('.') || domain == "localhost" => {}
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
            _ => return String::new(),
        }

        url.to_string()
    }

    /// Canonical IPv4/IPv6 text; IPv4-mapped IPv6 collapses to IPv4
    pub fn sanitize_ip_address(input: &str) -> String {
        match input.trim().parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
                Some(v4) => v4.to_string(),
                None => v6.to_string(),
            },
            Ok(ip) => ip.to_string(),
            Err(_) => String::new(),
        }
    }
}

/// Lower-cased scheme of `input`, if it has one.
///
/// `host:8080` is a port, not a scheme.
fn url_scheme(input: &str) -> Option<String> {
    let (prefix, rest) = input.split_once(':')?;
    let mut chars = prefix.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-')) {
        return None;
    }
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(prefix.to_ascii_lowercase())
}
