//! Input resolution for the address bar
//!
//! 1. Internal pseudo-URL → open the internal page
//! 2. Looks like an address → navigate (adding `https://` when missing)
//! 3. Otherwise → search

use std::net::IpAddr;

use crate::engine::SearchEngine;
use crate::internal::InternalPage;

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    /// Navigate to a URL
    Navigate(String),
    /// Search URL built from the query
    Search(String),
    /// Open one of the shell's own pages
    Internal(InternalPage),
}

impl InputResolution {
    /// URL the surface should load, if any.
    pub fn target_url(&self) -> Option<&str> {
        match self {
            InputResolution::Navigate(url) | InputResolution::Search(url) => Some(url),
            InputResolution::Internal(_) => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InputResolver;

impl InputResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve user input into an action. Blank input resolves to nothing.
    pub fn resolve(&self, input: &str, engine: &SearchEngine) -> Option<InputResolution> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(page) = InternalPage::parse(input) {
            return Some(InputResolution::Internal(page));
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Some(InputResolution::Navigate(input.to_string()));
        }

        if host_ip(split_host(input).0).is_some() {
            return Some(InputResolution::Navigate(self.with_https(input)));
        }

        if !input.contains('.') && !input.contains("localhost") && !input.starts_with("http") {
            let search_url = format!("{}{}", engine.search_url, encode_component(input));
            return Some(InputResolution::Search(search_url));
        }

        Some(InputResolution::Navigate(self.with_https(input)))
    }

    fn with_https(&self, input: &str) -> String {
        let (host, rest) = split_host(input);
        match host_ip(host) {
            Some(IpAddr::V6(_)) if !host.starts_with('[') => format!("https://[{}]{}", host, rest),
            _ => format!("https://{}", input),
        }
    }
}

/// Splits before the first `/`, `?` or `#`.
fn split_host(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(input.len());
    input.split_at(end)
}

/// IP address of a host, ignoring brackets and an IPv4 port.
fn host_ip(host: &str) -> Option<IpAddr> {
    let host = host.trim();
    if let Some(inner) = host.strip_prefix('[') {
        return inner.split(']').next()?.parse().ok();
    }
    match host.split_once(':') {
        Some((ip, port)) if !port.contains(':') => ip.parse().ok(),
        _ => host.parse().ok(),
    }
}

/// Percent-encode everything outside the URI-component unreserved set.
fn encode_component(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => result.push(byte as char),
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
