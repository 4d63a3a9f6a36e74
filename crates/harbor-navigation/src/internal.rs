//! Internal pseudo-pages
//!
//! The shell's own pages are loaded from file URLs but displayed and
//! addressed as `app://settings` and `app://home`. The `browser:` and
//! `firefox:` schemes are accepted as aliases when typed or linked.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::engine::SearchEngine;
use crate::error::NavigationError;
use crate::Result;

const INTERNAL_SCHEMES: [&str; 3] = ["app", "browser", "firefox"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InternalPage {
    Home,
    Settings,
}

impl InternalPage {
    /// Recognise `<scheme>://settings` / `<scheme>://home` for any internal scheme.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        if !INTERNAL_SCHEMES.contains(&parsed.scheme()) {
            return None;
        }

        match parsed.host_str() {
            Some("settings") => Some(InternalPage::Settings),
            Some("home") => Some(InternalPage::Home),
            _ => None,
        }
    }

    pub fn display_url(&self) -> &'static str {
        match self {
            InternalPage::Home => "app://home",
            InternalPage::Settings => "app://settings",
        }
    }
}

impl std::fmt::Display for InternalPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_url())
    }
}

pub fn is_external_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub fn is_internal_url(url: &str) -> bool {
    InternalPage::parse(url).is_some() || url.starts_with("app://")
}

/// Locations of the real documents behind the internal pages.
#[derive(Debug, Clone)]
pub struct InternalPages {
    home_url: String,
    settings_url: String,
}

impl InternalPages {
    pub fn new(home_url: impl Into<String>, settings_url: impl Into<String>) -> Self {
        Self {
            home_url: home_url.into(),
            settings_url: settings_url.into(),
        }
    }

    pub fn settings_url(&self) -> &str {
        &self.settings_url
    }

    /// Home page URL carrying the selected engine so the page can search.
    pub fn home_url_for(&self, engine: &SearchEngine) -> Result<String> {
        let mut url = Url::parse(&self.home_url)
            .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", self.home_url, e)))?;
        url.query_pairs_mut()
            .clear()
            .append_pair("engine", engine.key)
            .append_pair("engineName", engine.name)
            .append_pair("searchUrl", engine.search_url);
        Ok(url.to_string())
    }

    /// Whether a surface location is (a variant of) the given page.
    pub fn shows(&self, location: &str, page: InternalPage) -> bool {
        let base = match page {
            InternalPage::Home => &self.home_url,
            InternalPage::Settings => &self.settings_url,
        };
        !base.is_empty() && location.starts_with(base.as_str())
    }

    /// Map a surface location to what the address bar and tab show.
    pub fn normalize(&self, url: &str) -> String {
        if self.shows(url, InternalPage::Settings) {
            return InternalPage::Settings.display_url().to_string();
        }
        if self.shows(url, InternalPage::Home) {
            return InternalPage::Home.display_url().to_string();
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SEARCH_ENGINES;

    fn pages() -> InternalPages {
        InternalPages::new("file:///opt/harbor/home.html", "file:///opt/harbor/settings.html")
    }

    #[test]
    fn test_parse_internal_pages() {
        assert_eq!(InternalPage::parse("app://settings"), Some(InternalPage::Settings));
        assert_eq!(InternalPage::parse("browser://home"), Some(InternalPage::Home));
        assert_eq!(InternalPage::parse("firefox://settings/"), Some(InternalPage::Settings));
        assert_eq!(InternalPage::parse("app://downloads"), None);
        assert_eq!(InternalPage::parse("https://settings"), None);
        assert_eq!(InternalPage::parse("not a url"), None);
    }

    #[test]
    fn test_internal_and_external() {
        assert!(is_internal_url("app://settings"));
        assert!(is_internal_url("app://anything"));
        assert!(!is_internal_url("https://example.com"));
        assert!(is_external_url("http://example.com"));
        assert!(!is_external_url("file:///tmp/a.html"));
    }

    #[test]
    fn test_normalize() {
        let pages = pages();
        assert_eq!(
            pages.normalize("file:///opt/harbor/settings.html?theme=dusk"),
            "app://settings"
        );
        assert_eq!(pages.normalize("file:///opt/harbor/home.html?engine=bing"), "app://home");
        assert_eq!(pages.normalize("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_home_url_carries_engine() {
        let url = pages().home_url_for(&SEARCH_ENGINES[1]).unwrap();
        assert!(url.starts_with("file:///opt/harbor/home.html?"));
        assert!(url.contains("engine=google"));
        assert!(url.contains("engineName=Google"));
    }

    #[test]
    fn test_home_url_invalid_base() {
        let pages = InternalPages::new("not a url", "");
        assert!(pages.home_url_for(&SEARCH_ENGINES[0]).is_err());
        assert!(!pages.shows("anything", InternalPage::Settings));
    }
}
