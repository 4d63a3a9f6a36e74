//! Per-tab surface event dispatch

use harbor_navigation::InternalPage;
use harbor_tabs::{SurfaceEvent, TabId, DEFAULT_TITLE, ERR_ABORTED};

use crate::command::EventVerdict;
use crate::session::Session;

impl Session {
    /// Apply one lifecycle event reported by the surface of `tab_id`.
    ///
    /// Events for tabs that have since closed are ignored.
    pub fn handle_surface_event(&mut self, tab_id: TabId, event: SurfaceEvent) -> EventVerdict {
        if !self.tabs.contains(tab_id) {
            tracing::debug!(tab_id = %tab_id, "Event for closed tab ignored");
            return EventVerdict::Proceed;
        }

        match event {
            SurfaceEvent::DomReady => {
                self.tabs.mark_ready(tab_id);
            }
            SurfaceEvent::NavigationStarted => {
                self.tabs.update_loading(tab_id, true);
            }
            SurfaceEvent::NavigationStopped => {
                self.tabs.update_loading(tab_id, false);
            }
            SurfaceEvent::TitleUpdated { title } => {
                self.tabs.update_title(tab_id, &title);
                if let Some(url) = self.tabs.get(tab_id).map(|tab| tab.url.clone()) {
                    self.browse_history.update_title(&url, &title);
                }
            }
            SurfaceEvent::FaviconUpdated { favicons } => {
                if let Some(first) = favicons.into_iter().next() {
                    self.tabs.update_favicon(tab_id, Some(first));
                }
            }
            SurfaceEvent::Navigated { url } => {
                self.on_navigated(tab_id, &url);
                self.tabs.apply_fallback_favicon(tab_id, &url);
            }
            SurfaceEvent::NavigatedInPage { url } => {
                self.on_navigated(tab_id, &url);
            }
            SurfaceEvent::WillNavigate { url } => {
                if let Some(page) = InternalPage::parse(&url) {
                    tracing::debug!(tab_id = %tab_id, page = %page, "Intercepted navigation");
                    self.open_internal(page);
                    return EventVerdict::Prevent;
                }
            }
            SurfaceEvent::NewWindowRequested { url } => {
                // The shell opens its own tabs; the surface never does.
                match InternalPage::parse(&url) {
                    Some(page) => self.open_internal(page),
                    None => {
                        self.new_tab(Some(&url));
                    }
                }
                return EventVerdict::Prevent;
            }
            SurfaceEvent::LoadFailed {
                error_code,
                description,
            } => {
                if error_code == ERR_ABORTED {
                    tracing::trace!(tab_id = %tab_id, "Load aborted by navigation");
                } else {
                    tracing::warn!(
                        tab_id = %tab_id,
                        error_code,
                        description = %description,
                        "Failed to load"
                    );
                }
            }
        }

        EventVerdict::Proceed
    }

    fn on_navigated(&mut self, tab_id: TabId, url: &str) {
        self.tabs.record_navigation(tab_id, url);
        let display = self.pages.normalize(url);
        self.tabs.update_url(tab_id, &display);

        let title = self
            .tabs
            .get(tab_id)
            .map(|tab| tab.title.clone())
            .filter(|title| title != DEFAULT_TITLE);
        self.browse_history.record_visit(url, title.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use harbor_download::{DownloadSnapshot, DownloadState, SnapshotOutcome};
    use harbor_storage::{MemoryStore, SharedStore};
    use harbor_tabs::{HeadlessFactory, SecurityState, SurfaceCommand};

    use super::*;
    use crate::command::{HostCommand, UserCommand};
    use crate::session::SessionOptions;

    const HOME: &str = "file:///opt/harbor/home.html";
    const SETTINGS: &str = "file:///opt/harbor/settings.html";

    type Journal = Arc<Mutex<Vec<(TabId, SurfaceCommand)>>>;

    struct Harness {
        session: Session,
        host: UnboundedReceiver<HostCommand>,
        surfaces: Journal,
    }

    fn harness_with_store(store: SharedStore) -> Harness {
        let surfaces: Journal = Arc::new(Mutex::new(Vec::new()));
        let journal = surfaces.clone();
        let factory = HeadlessFactory::with_sink(Arc::new(move |id, command| {
            journal.lock().push((id, command));
        }));
        let (tx, rx) = unbounded_channel();
        let options = SessionOptions {
            home_url: HOME.to_string(),
            settings_url: SETTINGS.to_string(),
            ..SessionOptions::default()
        };
        let session = Session::new(Box::new(factory), store, options, tx).unwrap();
        Harness {
            session,
            host: rx,
            surfaces,
        }
    }

    fn harness() -> Harness {
        harness_with_store(MemoryStore::new().shared())
    }

    fn last_surface_command(h: &Harness) -> Option<SurfaceCommand> {
        h.surfaces.lock().last().map(|(_, command)| command.clone())
    }

    fn active(h: &Harness) -> TabId {
        h.session.active_tab().unwrap().id
    }

    fn download(id: &str, state: DownloadState) -> DownloadSnapshot {
        DownloadSnapshot {
            id: id.to_string(),
            filename: "file.zip".to_string(),
            received_bytes: 512,
            total_bytes: 1024,
            state,
            save_path: "/downloads/file.zip".to_string(),
            speed_bps: 256.0,
        }
    }

    #[test]
    fn test_starts_on_home() {
        let h = harness();
        let tab = h.session.active_tab().unwrap();
        assert_eq!(tab.url, "app://home");
        assert_eq!(h.session.chrome_state().unwrap().security, SecurityState::Internal);

        match last_surface_command(&h) {
            Some(SurfaceCommand::Open { url }) => {
                assert!(url.starts_with(HOME));
                assert!(url.contains("engine=duckduckgo"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_navigated_updates_tab_and_history() {
        let mut h = harness();
        let id = active(&h);

        h.session.handle_surface_event(id, SurfaceEvent::NavigationStarted);
        assert!(h.session.tab(id).unwrap().loading);
        h.session.handle_surface_event(
            id,
            SurfaceEvent::Navigated {
                url: "https://example.com/a".to_string(),
            },
        );
        h.session.handle_surface_event(
            id,
            SurfaceEvent::TitleUpdated {
                title: "Example".to_string(),
            },
        );
        h.session.handle_surface_event(id, SurfaceEvent::NavigationStopped);

        let tab = h.session.tab(id).unwrap();
        assert_eq!(tab.url, "https://example.com/a");
        assert_eq!(tab.title, "Example");
        assert_eq!(tab.favicon.as_deref(), Some("https://example.com/favicon.ico"));
        assert!(!tab.loading);

        let history = h.session.browse_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "Example");
    }

    #[test]
    fn test_surface_favicon_wins_over_fallback() {
        let mut h = harness();
        let id = active(&h);
        h.session.handle_surface_event(
            id,
            SurfaceEvent::FaviconUpdated {
                favicons: vec!["https://cdn.test/icon.png".to_string(), "x".to_string()],
            },
        );
        h.session.handle_surface_event(
            id,
            SurfaceEvent::Navigated {
                url: "https://example.com".to_string(),
            },
        );
        assert_eq!(
            h.session.tab(id).unwrap().favicon.as_deref(),
            Some("https://cdn.test/icon.png")
        );

        h.session
            .handle_surface_event(id, SurfaceEvent::FaviconUpdated { favicons: vec![] });
        assert!(h.session.tab(id).unwrap().favicon.is_some());
    }

    #[test]
    fn test_internal_pages_not_recorded() {
        let mut h = harness();
        let id = active(&h);
        h.session.handle_surface_event(
            id,
            SurfaceEvent::Navigated {
                url: format!("{}?theme=dark", SETTINGS),
            },
        );
        assert_eq!(h.session.tab(id).unwrap().url, "app://settings");
        assert!(h.session.browse_history().is_empty());
    }

    #[test]
    fn test_will_navigate_to_internal_is_prevented() {
        let mut h = harness();
        let id = active(&h);

        let verdict = h.session.handle_surface_event(
            id,
            SurfaceEvent::WillNavigate {
                url: "browser://settings".to_string(),
            },
        );
        assert_eq!(verdict, EventVerdict::Prevent);
        assert_eq!(h.session.tab(id).unwrap().url, "app://settings");
        assert_eq!(
            last_surface_command(&h),
            Some(SurfaceCommand::Load {
                url: SETTINGS.to_string()
            })
        );

        let verdict = h.session.handle_surface_event(
            id,
            SurfaceEvent::WillNavigate {
                url: "https://example.com".to_string(),
            },
        );
        assert_eq!(verdict, EventVerdict::Proceed);
    }

    #[test]
    fn test_new_window_opens_tab() {
        let mut h = harness();
        let first = active(&h);

        let verdict = h.session.handle_surface_event(
            first,
            SurfaceEvent::NewWindowRequested {
                url: "https://popup.test".to_string(),
            },
        );
        assert_eq!(verdict, EventVerdict::Prevent);
        assert_eq!(h.session.tabs().count(), 2);
        assert_ne!(active(&h), first);
        assert_eq!(h.session.active_tab().unwrap().url, "https://popup.test");

        // Internal targets open in the active tab instead
        h.session.handle_surface_event(
            first,
            SurfaceEvent::NewWindowRequested {
                url: "app://home".to_string(),
            },
        );
        assert_eq!(h.session.tabs().count(), 2);
        assert_eq!(h.session.active_tab().unwrap().url, "app://home");
    }

    #[test]
    fn test_events_for_closed_tab_are_ignored() {
        let mut h = harness();
        let first = active(&h);
        h.session.new_tab(Some("https://b.test"));
        assert!(h.session.close_tab(first));

        let verdict = h.session.handle_surface_event(
            first,
            SurfaceEvent::Navigated {
                url: "https://late.test".to_string(),
            },
        );
        assert_eq!(verdict, EventVerdict::Proceed);
        assert!(h.session.browse_history().is_empty());
    }

    #[test]
    fn test_navigation_gated_until_dom_ready() {
        let mut h = harness();
        let id = active(&h);
        h.session.navigate("example.com");
        h.session.handle_surface_event(
            id,
            SurfaceEvent::Navigated {
                url: "https://example.com".to_string(),
            },
        );

        assert!(!h.session.go_back());
        assert!(!h.session.chrome_state().unwrap().can_go_back);

        h.session.handle_surface_event(id, SurfaceEvent::DomReady);
        assert!(h.session.chrome_state().unwrap().can_go_back);
        assert!(h.session.go_back());
        assert_eq!(last_surface_command(&h), Some(SurfaceCommand::Back));
    }

    #[test]
    fn test_navigate_resolves_input() {
        let mut h = harness();
        h.session.navigate("rust ownership");
        assert_eq!(
            last_surface_command(&h),
            Some(SurfaceCommand::Load {
                url: "https://duckduckgo.com/?q=rust%20ownership".to_string()
            })
        );

        h.session.navigate("   ");
        h.session.navigate("docs.rs");
        assert_eq!(
            last_surface_command(&h),
            Some(SurfaceCommand::Load {
                url: "https://docs.rs".to_string()
            })
        );
    }

    #[test]
    fn test_open_settings_skips_reload() {
        let mut h = harness();
        h.session.open_settings();
        let loads = h.surfaces.lock().len();

        h.session.open_settings();
        assert_eq!(h.surfaces.lock().len(), loads);
        assert_eq!(h.session.active_tab().unwrap().url, "app://settings");
    }

    #[test]
    fn test_search_engine_persists() {
        let store = MemoryStore::new().shared();
        {
            let mut h = harness_with_store(store.clone());
            assert!(h.session.set_search_engine("brave"));
            assert!(!h.session.set_search_engine("altavista"));
            h.session.execute(UserCommand::NewTab { url: None });
            match last_surface_command(&h) {
                Some(SurfaceCommand::Open { url }) => assert!(url.contains("engine=brave")),
                other => panic!("unexpected command {:?}", other),
            }
        }
        let h = harness_with_store(store);
        assert_eq!(h.session.search_engine().key, "brave");
    }

    #[test]
    fn test_close_last_tab_reopens_home() {
        let mut h = harness();
        let id = active(&h);
        h.session.execute(UserCommand::CloseTab { tab_id: id });

        let tabs: Vec<_> = h.session.tabs().collect();
        assert_eq!(tabs.len(), 1);
        assert_ne!(tabs[0].id, id);
        assert_eq!(tabs[0].url, "app://home");
    }

    #[test]
    fn test_history_title_patch() {
        let mut h = harness();
        let id = active(&h);
        h.session.handle_surface_event(
            id,
            SurfaceEvent::Navigated {
                url: "https://a.test".to_string(),
            },
        );
        assert_eq!(h.session.browse_history()[0].title, "https://a.test");

        h.session.handle_surface_event(
            id,
            SurfaceEvent::TitleUpdated {
                title: "Alpha".to_string(),
            },
        );
        assert_eq!(h.session.history_suggestions("alp")[0].url, "https://a.test");
    }

    #[test]
    fn test_download_flow() {
        let mut h = harness();
        let outcome = h.session.handle_download_snapshot(download("d1", DownloadState::Progress));
        assert!(matches!(outcome, SnapshotOutcome::Updated { is_new: true, .. }));

        assert!(h.session.cancel_download("d1"));
        assert_eq!(
            h.host.try_recv().unwrap(),
            HostCommand::CancelDownload { id: "d1".to_string() }
        );

        // Completion raced ahead of the cancel
        h.session.handle_download_snapshot(download("d1", DownloadState::Completed));
        h.session.handle_download_snapshot(download("d1", DownloadState::Completed));
        assert!(h.session.live_downloads().is_empty());
        assert_eq!(h.session.download_history().len(), 1);
        assert_eq!(h.session.download_history()[0].state, DownloadState::Completed);

        assert!(!h.session.cancel_download("d1"));
        assert!(h.host.try_recv().is_err());

        assert!(h.session.open_download("d1"));
        assert_eq!(
            h.host.try_recv().unwrap(),
            HostCommand::OpenFile {
                path: "/downloads/file.zip".to_string()
            }
        );
        assert!(!h.session.reveal_download("missing"));
    }

    #[test]
    fn test_dismissed_download_not_archived() {
        let mut h = harness();
        h.session.handle_download_snapshot(download("d1", DownloadState::Progress));
        assert!(h.session.remove_download("d1"));

        let outcome = h.session.handle_download_snapshot(download("d1", DownloadState::Failed));
        assert_eq!(outcome, SnapshotOutcome::Dismissed);
        assert!(h.session.download_history().is_empty());
    }

    #[test]
    fn test_clear_downloads() {
        let mut h = harness();
        h.session.handle_download_snapshot(download("d1", DownloadState::Progress));
        h.session.handle_download_snapshot(download("d2", DownloadState::Progress));
        h.session.handle_download_snapshot(download("d2", DownloadState::Completed));
        h.session.execute(UserCommand::ClearDownloads);

        assert!(h.session.live_downloads().is_empty());
        assert!(h.session.download_history().is_empty());
        assert_eq!(h.session.diagnostics().archived_downloads, 0);

        let outcome = h.session.handle_download_snapshot(download("d1", DownloadState::Completed));
        assert_eq!(outcome, SnapshotOutcome::Dismissed);
        assert!(h.session.download_history().is_empty());
    }

    #[test]
    fn test_stalled_download_cancel_reaches_host() {
        let mut h = harness();
        h.session.handle_download_snapshot(download("d1", DownloadState::Progress));
        h.session.handle_download_snapshot(download("d1", DownloadState::Interrupted));

        h.session.execute(UserCommand::CancelDownload { id: "d1".to_string() });
        assert_eq!(
            h.host.try_recv().unwrap(),
            HostCommand::CancelDownload { id: "d1".to_string() }
        );
    }

    #[test]
    fn test_closed_host_channel_is_tolerated() {
        let mut h = harness();
        h.session.handle_download_snapshot(download("d1", DownloadState::Progress));
        drop(h.host);
        assert!(h.session.cancel_download("d1"));
    }

    #[test]
    fn test_load_failures_are_not_fatal() {
        let mut h = harness();
        let id = active(&h);
        for code in [ERR_ABORTED, -105] {
            let verdict = h.session.handle_surface_event(
                id,
                SurfaceEvent::LoadFailed {
                    error_code: code,
                    description: "boom".to_string(),
                },
            );
            assert_eq!(verdict, EventVerdict::Proceed);
        }
        assert_eq!(h.session.tab(id).unwrap().url, "app://home");
    }
}
