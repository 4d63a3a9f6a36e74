//! Tab Registry
//!
//! Owns the ordered tabs, their surfaces and the active pointer. Every
//! projection (`update_*`) tolerates ids of tabs that have since closed.

use serde::Serialize;
use url::Url;

use harbor_navigation::is_external_url;

use crate::gate::NavigationGate;
use crate::state::SecurityState;
use crate::surface::{Surface, SurfaceFactory};
use crate::tab::{Tab, TabId};

/// What the toolbar shows for the active tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeState {
    pub tab_id: TabId,
    pub address: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub security: SecurityState,
}

struct TabEntry {
    tab: Tab,
    surface: Box<dyn Surface>,
    gate: NavigationGate,
}

pub struct TabRegistry {
    entries: Vec<TabEntry>,
    active: Option<TabId>,
    next_id: u64,
    factory: Box<dyn SurfaceFactory>,
    /// Location for tabs the registry opens on its own
    default_url: String,
}

impl TabRegistry {
    /// Create a registry holding one default tab.
    pub fn new(factory: Box<dyn SurfaceFactory>, default_url: impl Into<String>) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            active: None,
            next_id: 0,
            factory,
            default_url: default_url.into(),
        };
        let url = registry.default_url.clone();
        registry.create_tab(&url);
        registry
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    pub fn set_default_url(&mut self, url: impl Into<String>) {
        self.default_url = url.into();
    }

    /// Append a tab with a fresh surface and make it active.
    pub fn create_tab(&mut self, url: &str) -> TabId {
        let id = TabId::new(self.next_id);
        self.next_id += 1;

        let surface = self.factory.create(id, url);
        self.entries.push(TabEntry {
            tab: Tab::new(id, url),
            surface,
            gate: NavigationGate::new(),
        });

        tracing::info!(tab_id = %id, url = %url, "Created tab");

        self.switch_tab(id);
        id
    }

    /// Point the registry at `id`. Unknown ids are ignored.
    pub fn switch_tab(&mut self, id: TabId) -> Option<ChromeState> {
        if !self.contains(id) {
            tracing::debug!(tab_id = %id, "Switch to unknown tab ignored");
            return None;
        }

        self.active = Some(id);
        tracing::debug!(tab_id = %id, "Switched tab");
        self.chrome_state()
    }

    /// Select the tab at `index` (keyboard shortcuts 1-9).
    pub fn switch_to_index(&mut self, index: usize) -> Option<ChromeState> {
        let id = self.entries.get(index)?.tab.id;
        self.switch_tab(id)
    }

    /// Remove a tab and its surface. Returns false for unknown ids.
    ///
    /// Closing the active tab activates its left neighbour (clamped to the
    /// first tab); closing the last tab opens a default one.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(tab_id = %id, "Close of unknown tab ignored");
            return false;
        };

        let mut entry = self.entries.remove(index);
        entry.surface.close();
        tracing::info!(tab_id = %id, remaining = self.entries.len(), "Closed tab");

        if self.entries.is_empty() {
            self.active = None;
            let url = self.default_url.clone();
            self.create_tab(&url);
            return true;
        }

        if self.active == Some(id) {
            let next = index.saturating_sub(1).min(self.entries.len() - 1);
            let next_id = self.entries[next].tab.id;
            self.switch_tab(next_id);
        }

        true
    }

    pub fn close_active(&mut self) -> bool {
        match self.active {
            Some(id) => self.close_tab(id),
            None => false,
        }
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.entries.iter().position(|e| e.tab.id == id)
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.entry(id).map(|e| &e.tab)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.entries.iter().map(|e| &e.tab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn is_active(&self, id: TabId) -> bool {
        self.active == Some(id)
    }

    // === Derived-state projections ===

    pub fn update_title(&mut self, id: TabId, title: &str) -> bool {
        self.with_tab(id, |tab| tab.set_title(title))
    }

    pub fn update_favicon(&mut self, id: TabId, favicon: Option<String>) -> bool {
        self.with_tab(id, |tab| tab.set_favicon(favicon))
    }

    pub fn update_loading(&mut self, id: TabId, loading: bool) -> bool {
        self.with_tab(id, |tab| tab.set_loading(loading))
    }

    pub fn update_url(&mut self, id: TabId, url: &str) -> bool {
        self.with_tab(id, |tab| tab.set_url(url))
    }

    /// Guess `<origin>/favicon.ico` for an external page when the surface
    /// hasn't supplied a favicon. Never replaces one it did supply.
    pub fn apply_fallback_favicon(&mut self, id: TabId, url: &str) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if entry.tab.favicon.is_some() || !is_external_url(url) {
            return false;
        }

        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let fallback = format!("{}/favicon.ico", parsed.origin().ascii_serialization());
        tracing::trace!(tab_id = %id, favicon = %fallback, "Using fallback favicon");
        entry.tab.set_favicon(Some(fallback));
        true
    }

    // === Surface access ===

    pub fn mark_ready(&mut self, id: TabId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.gate.mark_ready();
                true
            }
            None => false,
        }
    }

    pub fn is_ready(&self, id: TabId) -> bool {
        self.entry(id).map(|e| e.gate.is_ready()).unwrap_or(false)
    }

    pub fn go_back(&mut self, id: TabId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => entry.gate.back(entry.surface.as_mut()),
            None => false,
        }
    }

    pub fn go_forward(&mut self, id: TabId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => entry.gate.forward(entry.surface.as_mut()),
            None => false,
        }
    }

    pub fn reload(&mut self, id: TabId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => entry.gate.reload(entry.surface.as_mut()),
            None => false,
        }
    }

    /// Ask the surface to load `url`. Failures are logged and leave state as is.
    pub fn load_url(&mut self, id: TabId, url: &str) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };

        match entry.surface.load_url(url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(tab_id = %id, url = %url, error = %e, "Load request failed");
                false
            }
        }
    }

    pub fn record_navigation(&mut self, id: TabId, url: &str) {
        if let Some(entry) = self.entry_mut(id) {
            entry.surface.record_navigation(url);
        }
    }

    pub fn surface_url(&self, id: TabId) -> Option<String> {
        self.entry(id).and_then(|e| e.surface.current_url())
    }

    /// Toolbar state for the active tab.
    pub fn chrome_state(&self) -> Option<ChromeState> {
        let entry = self.entry(self.active?)?;
        Some(ChromeState {
            tab_id: entry.tab.id,
            address: entry.tab.url.clone(),
            can_go_back: entry.gate.can_go_back(entry.surface.as_ref()),
            can_go_forward: entry.gate.can_go_forward(entry.surface.as_ref()),
            security: entry.tab.security(),
        })
    }

    fn entry(&self, id: TabId) -> Option<&TabEntry> {
        self.entries.iter().find(|e| e.tab.id == id)
    }

    fn entry_mut(&mut self, id: TabId) -> Option<&mut TabEntry> {
        self.entries.iter_mut().find(|e| e.tab.id == id)
    }

    fn with_tab<F>(&mut self, id: TabId, f: F) -> bool
    where
        F: FnOnce(&mut Tab),
    {
        match self.entry_mut(id) {
            Some(entry) => {
                f(&mut entry.tab);
                true
            }
            None => false,
        }
    }
}
