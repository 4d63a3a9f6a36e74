//! Search engine catalog and the persisted selection

use harbor_storage::SharedStore;

pub const SEARCH_ENGINE_KEY: &str = "searchEngine";
pub const DEFAULT_ENGINE: &str = "duckduckgo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEngine {
    pub key: &'static str,
    pub name: &'static str,
    /// Prefix the encoded query is appended to
    pub search_url: &'static str,
    pub home_url: &'static str,
}

pub static SEARCH_ENGINES: [SearchEngine; 6] = [
    SearchEngine {
        key: "duckduckgo",
        name: "DuckDuckGo",
        search_url: "https://duckduckgo.com/?q=",
        home_url: "https://duckduckgo.com",
    },
    SearchEngine {
        key: "google",
        name: "Google",
        search_url: "https://www.google.com/search?q=",
        home_url: "https://www.google.com",
    },
    SearchEngine {
        key: "bing",
        name: "Bing",
        search_url: "https://www.bing.com/search?q=",
        home_url: "https://www.bing.com",
    },
    SearchEngine {
        key: "yahoo",
        name: "Yahoo",
        search_url: "https://search.yahoo.com/search?p=",
        home_url: "https://www.yahoo.com",
    },
    SearchEngine {
        key: "brave",
        name: "Brave",
        search_url: "https://search.brave.com/search?q=",
        home_url: "https://search.brave.com",
    },
    SearchEngine {
        key: "ecosia",
        name: "Ecosia",
        search_url: "https://www.ecosia.org/search?q=",
        home_url: "https://www.ecosia.org",
    },
];

impl SearchEngine {
    pub fn find(key: &str) -> Option<&'static SearchEngine> {
        SEARCH_ENGINES.iter().find(|engine| engine.key == key)
    }

    pub fn default_engine() -> &'static SearchEngine {
        &SEARCH_ENGINES[0]
    }
}

/// The user's engine choice, restored from and written back to the store.
pub struct SearchPreference {
    store: SharedStore,
    current: &'static SearchEngine,
}

impl SearchPreference {
    /// Restore the stored choice; unknown or unreadable values fall back to `fallback_key`
    /// and then to DuckDuckGo.
    pub fn load(store: SharedStore, fallback_key: &str) -> Self {
        let stored = match store.get(SEARCH_ENGINE_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Search engine preference unreadable");
                None
            }
        };

        let current = stored
            .as_deref()
            .and_then(SearchEngine::find)
            .or_else(|| SearchEngine::find(fallback_key))
            .unwrap_or_else(SearchEngine::default_engine);

        Self { store, current }
    }

    pub fn current(&self) -> &'static SearchEngine {
        self.current
    }

    /// Select an engine by key. Unknown keys are ignored.
    pub fn select(&mut self, key: &str) -> bool {
        let Some(engine) = SearchEngine::find(key) else {
            tracing::debug!(key = %key, "Ignoring unknown search engine");
            return false;
        };

        self.current = engine;
        if let Err(e) = self.store.set(SEARCH_ENGINE_KEY, engine.key) {
            tracing::warn!(error = %e, "Search engine preference not saved");
        }
        tracing::info!(engine = %engine.name, "Search engine selected");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_find() {
        assert_eq!(SearchEngine::find("bing").unwrap().name, "Bing");
        assert!(SearchEngine::find("altavista").is_none());
        assert_eq!(SearchEngine::default_engine().key, DEFAULT_ENGINE);
    }

    #[test]
    fn test_preference_roundtrip() {
        let store = MemoryStore::new().shared();
        let mut pref = SearchPreference::load(store.clone(), DEFAULT_ENGINE);
        assert_eq!(pref.current().key, "duckduckgo");

        assert!(pref.select("brave"));
        assert!(!pref.select("altavista"));
        assert_eq!(pref.current().key, "brave");

        let restored = SearchPreference::load(store, DEFAULT_ENGINE);
        assert_eq!(restored.current().key, "brave");
    }

    #[test]
    fn test_preference_fallbacks() {
        let store = MemoryStore::new().shared();
        store.set(SEARCH_ENGINE_KEY, "altavista").unwrap();
        assert_eq!(SearchPreference::load(store.clone(), "ecosia").current().key, "ecosia");
        assert_eq!(SearchPreference::load(store, "nope").current().key, "duckduckgo");

        let failing = SearchPreference::load(MemoryStore::failing().shared(), "google");
        assert_eq!(failing.current().key, "google");
    }
}
