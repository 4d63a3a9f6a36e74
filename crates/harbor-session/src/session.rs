//! Session state and user operations

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use harbor_download::{
    DownloadHistory, DownloadSnapshot, DownloadTracker, SnapshotOutcome, DOWNLOAD_HISTORY_LIMIT,
};
use harbor_navigation::{
    BrowseHistory, HistoryEntry, InputResolution, InputResolver, InternalPage, InternalPages,
    SearchEngine, SearchPreference, BROWSE_HISTORY_LIMIT, DEFAULT_ENGINE, DROPDOWN_LIMIT,
};
use harbor_storage::SharedStore;
use harbor_tabs::{ChromeState, SurfaceFactory, Tab, TabId, TabRegistry};

use crate::command::{HostCommand, UserCommand};
use crate::error::SessionError;
use crate::Result;

/// Construction parameters for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Document behind `app://home`
    pub home_url: String,
    /// Document behind `app://settings`
    pub settings_url: String,
    pub browse_history_limit: usize,
    pub download_history_limit: usize,
    /// Engine used when no valid choice is stored
    pub default_search_engine: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            home_url: "file:///usr/share/harbor/home.html".to_string(),
            settings_url: "file:///usr/share/harbor/settings.html".to_string(),
            browse_history_limit: BROWSE_HISTORY_LIMIT,
            download_history_limit: DOWNLOAD_HISTORY_LIMIT,
            default_search_engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// Snapshot of session size, logged in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub tab_count: usize,
    pub active_tab: Option<TabId>,
    pub live_downloads: usize,
    pub archived_downloads: usize,
    pub history_entries: usize,
    pub search_engine: &'static str,
}

pub struct Session {
    pub(crate) tabs: TabRegistry,
    pub(crate) downloads: DownloadTracker,
    pub(crate) download_history: DownloadHistory,
    pub(crate) browse_history: BrowseHistory,
    pub(crate) search: SearchPreference,
    pub(crate) resolver: InputResolver,
    pub(crate) pages: InternalPages,
    host: UnboundedSender<HostCommand>,
}

impl Session {
    /// Restore persisted state and open the first tab on the home page.
    ///
    /// Fails only when the configured home page is not a valid URL.
    pub fn new(
        factory: Box<dyn SurfaceFactory>,
        store: SharedStore,
        options: SessionOptions,
        host: UnboundedSender<HostCommand>,
    ) -> Result<Self> {
        let search = SearchPreference::load(store.clone(), &options.default_search_engine);
        let pages = InternalPages::new(options.home_url, options.settings_url);
        let home = pages.home_url_for(search.current())?;

        let tabs = TabRegistry::new(factory, home);
        let browse_history = BrowseHistory::load(store.clone(), options.browse_history_limit);
        let download_history = DownloadHistory::load(store, options.download_history_limit);

        let mut session = Self {
            tabs,
            downloads: DownloadTracker::with_finished_cap(options.download_history_limit),
            download_history,
            browse_history,
            search,
            resolver: InputResolver::new(),
            pages,
            host,
        };
        session.sync_active_display_url();

        tracing::info!(
            engine = %session.search.current().name,
            history = session.browse_history.len(),
            downloads = session.download_history.len(),
            "Session ready"
        );

        Ok(session)
    }

    /// Apply one user command.
    pub fn execute(&mut self, command: UserCommand) {
        tracing::debug!(command = command.name(), "User command");
        match command {
            UserCommand::NewTab { url } => {
                self.new_tab(url.as_deref());
            }
            UserCommand::CloseTab { tab_id } => {
                self.close_tab(tab_id);
            }
            UserCommand::CloseActiveTab => {
                if let Some(id) = self.tabs.active_id() {
                    self.close_tab(id);
                }
            }
            UserCommand::SwitchTab { tab_id } => {
                self.switch_tab(tab_id);
            }
            UserCommand::SwitchToIndex { index } => {
                self.tabs.switch_to_index(index);
            }
            UserCommand::Navigate { input } => self.navigate(&input),
            UserCommand::Back => {
                self.go_back();
            }
            UserCommand::Forward => {
                self.go_forward();
            }
            UserCommand::Reload => {
                self.reload();
            }
            UserCommand::Home => self.go_home(),
            UserCommand::OpenSettings => self.open_settings(),
            UserCommand::CancelDownload { id } => {
                self.cancel_download(&id);
            }
            UserCommand::RemoveDownload { id } => {
                self.remove_download(&id);
            }
            UserCommand::ClearDownloads => self.clear_downloads(),
            UserCommand::OpenDownload { id } => {
                self.open_download(&id);
            }
            UserCommand::RevealDownload { id } => {
                self.reveal_download(&id);
            }
            UserCommand::SetSearchEngine { key } => {
                self.set_search_engine(&key);
            }
        }
    }

    // === Tabs ===

    /// Open a tab on `url`, or on the home page.
    pub fn new_tab(&mut self, url: Option<&str>) -> TabId {
        let url = match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => self.tabs.default_url().to_string(),
        };
        let id = self.tabs.create_tab(&url);
        self.sync_active_display_url();
        id
    }

    pub fn close_tab(&mut self, id: TabId) -> bool {
        let closed = self.tabs.close_tab(id);
        if closed {
            // The replacement tab, if one was opened, starts on the raw home URL
            self.sync_active_display_url();
        }
        closed
    }

    pub fn switch_tab(&mut self, id: TabId) -> Option<ChromeState> {
        self.tabs.switch_tab(id)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.tabs()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active_tab()
    }

    pub fn chrome_state(&self) -> Option<ChromeState> {
        self.tabs.chrome_state()
    }

    // === Navigation ===

    /// Resolve address bar input and load it in the active tab.
    pub fn navigate(&mut self, input: &str) {
        let Some(id) = self.tabs.active_id() else {
            return;
        };
        let Some(resolution) = self.resolver.resolve(input, self.search.current()) else {
            return;
        };

        match resolution {
            InputResolution::Internal(page) => self.open_internal(page),
            InputResolution::Navigate(url) | InputResolution::Search(url) => {
                tracing::debug!(tab_id = %id, url = %url, "Navigating");
                self.tabs.load_url(id, &url);
            }
        }
    }

    pub fn go_back(&mut self) -> bool {
        self.tabs.active_id().is_some_and(|id| self.tabs.go_back(id))
    }

    pub fn go_forward(&mut self) -> bool {
        self.tabs.active_id().is_some_and(|id| self.tabs.go_forward(id))
    }

    pub fn reload(&mut self) -> bool {
        self.tabs.active_id().is_some_and(|id| self.tabs.reload(id))
    }

    pub fn go_home(&mut self) {
        let Some(id) = self.tabs.active_id() else {
            return;
        };
        let home = self.tabs.default_url().to_string();
        self.tabs.load_url(id, &home);
        self.tabs.update_url(id, InternalPage::Home.display_url());
    }

    /// Show settings in the active tab unless it already does.
    pub fn open_settings(&mut self) {
        let Some(id) = self.tabs.active_id() else {
            return;
        };

        let showing = self
            .tabs
            .surface_url(id)
            .is_some_and(|current| self.pages.shows(&current, InternalPage::Settings));
        if !showing {
            let settings = self.pages.settings_url().to_string();
            self.tabs.load_url(id, &settings);
        }
        self.tabs.update_url(id, InternalPage::Settings.display_url());
    }

    pub(crate) fn open_internal(&mut self, page: InternalPage) {
        match page {
            InternalPage::Home => self.go_home(),
            InternalPage::Settings => self.open_settings(),
        }
    }

    // === Search ===

    pub fn search_engine(&self) -> &'static SearchEngine {
        self.search.current()
    }

    /// Select an engine; new home pages carry it from now on.
    pub fn set_search_engine(&mut self, key: &str) -> bool {
        if !self.search.select(key) {
            return false;
        }
        match self.pages.home_url_for(self.search.current()) {
            Ok(home) => self.tabs.set_default_url(home),
            Err(e) => tracing::warn!(error = %e, "Home page not updated for new engine"),
        }
        true
    }

    /// Address bar dropdown rows for `query`.
    pub fn history_suggestions(&self, query: &str) -> Vec<HistoryEntry> {
        self.browse_history.search(query, DROPDOWN_LIMIT)
    }

    pub fn browse_history(&self) -> &[HistoryEntry] {
        self.browse_history.entries()
    }

    // === Downloads ===

    /// Mirror a host snapshot; terminal snapshots are archived.
    pub fn handle_download_snapshot(&mut self, snapshot: DownloadSnapshot) -> SnapshotOutcome {
        let outcome = self.downloads.apply(snapshot);
        if let SnapshotOutcome::Finished(finished) = &outcome {
            self.download_history.archive(finished.clone());
        }
        outcome
    }

    pub fn cancel_download(&mut self, id: &str) -> bool {
        if !self.downloads.request_cancel(id) {
            return false;
        }
        self.send(HostCommand::CancelDownload { id: id.to_string() });
        true
    }

    pub fn remove_download(&mut self, id: &str) -> bool {
        self.downloads.dismiss(id)
    }

    /// Dismiss live downloads and empty the archive.
    pub fn clear_downloads(&mut self) {
        self.downloads.clear();
        self.download_history.clear();
        tracing::info!("Cleared downloads");
    }

    pub fn open_download(&mut self, id: &str) -> bool {
        match self.download_path(id) {
            Some(path) => {
                self.send(HostCommand::OpenFile { path });
                true
            }
            None => false,
        }
    }

    pub fn reveal_download(&mut self, id: &str) -> bool {
        match self.download_path(id) {
            Some(path) => {
                self.send(HostCommand::RevealInFolder { path });
                true
            }
            None => false,
        }
    }

    pub fn live_downloads(&self) -> Vec<&DownloadSnapshot> {
        self.downloads.live()
    }

    pub fn download_history(&self) -> &[DownloadSnapshot] {
        self.download_history.entries()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            tab_count: self.tabs.len(),
            active_tab: self.tabs.active_id(),
            live_downloads: self.downloads.len(),
            archived_downloads: self.download_history.len(),
            history_entries: self.browse_history.len(),
            search_engine: self.search.current().key,
        }
    }

    fn download_path(&self, id: &str) -> Option<String> {
        self.downloads
            .get(id)
            .or_else(|| self.download_history.get(id))
            .map(|d| d.save_path.clone())
            .filter(|path| !path.is_empty())
    }

    fn send(&self, command: HostCommand) {
        let result = self
            .host
            .send(command)
            .map_err(|e| SessionError::HostChannelClosed(format!("{:?}", e.0)));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Host command not delivered");
        }
    }

    /// Show the internal page name instead of its file URL.
    fn sync_active_display_url(&mut self) {
        let Some(tab) = self.tabs.active_tab() else {
            return;
        };
        let (id, display) = (tab.id, self.pages.normalize(&tab.url));
        if display != tab.url {
            self.tabs.update_url(id, &display);
        }
    }
}
