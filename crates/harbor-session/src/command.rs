//! Commands crossing the session boundary

use serde::{Deserialize, Serialize};

use harbor_tabs::TabId;

/// What the user asked the shell to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UserCommand {
    NewTab {
        #[serde(default)]
        url: Option<String>,
    },
    CloseTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    CloseActiveTab,
    SwitchTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    SwitchToIndex {
        index: usize,
    },
    /// Raw address bar input
    Navigate {
        input: String,
    },
    Back,
    Forward,
    Reload,
    Home,
    OpenSettings,
    CancelDownload {
        id: String,
    },
    RemoveDownload {
        id: String,
    },
    ClearDownloads,
    OpenDownload {
        id: String,
    },
    RevealDownload {
        id: String,
    },
    SetSearchEngine {
        key: String,
    },
}

impl UserCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UserCommand::NewTab { .. } => "newTab",
            UserCommand::CloseTab { .. } => "closeTab",
            UserCommand::CloseActiveTab => "closeActiveTab",
            UserCommand::SwitchTab { .. } => "switchTab",
            UserCommand::SwitchToIndex { .. } => "switchToIndex",
            UserCommand::Navigate { .. } => "navigate",
            UserCommand::Back => "back",
            UserCommand::Forward => "forward",
            UserCommand::Reload => "reload",
            UserCommand::Home => "home",
            UserCommand::OpenSettings => "openSettings",
            UserCommand::CancelDownload { .. } => "cancelDownload",
            UserCommand::RemoveDownload { .. } => "removeDownload",
            UserCommand::ClearDownloads => "clearDownloads",
            UserCommand::OpenDownload { .. } => "openDownload",
            UserCommand::RevealDownload { .. } => "revealDownload",
            UserCommand::SetSearchEngine { .. } => "setSearchEngine",
        }
    }
}

/// Fire-and-forget requests for the host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    CancelDownload { id: String },
    OpenFile { path: String },
    RevealInFolder { path: String },
}

/// Answer to a cancelable surface event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVerdict {
    Proceed,
    /// The surface must not perform the navigation itself
    Prevent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_command_wire_format() {
        let command: UserCommand =
            serde_json::from_str(r#"{"type":"closeTab","tabId":3}"#).unwrap();
        assert_eq!(command, UserCommand::CloseTab { tab_id: TabId::new(3) });

        let command: UserCommand = serde_json::from_str(r#"{"type":"newTab"}"#).unwrap();
        assert_eq!(command, UserCommand::NewTab { url: None });

        let command: UserCommand =
            serde_json::from_str(r#"{"type":"setSearchEngine","key":"brave"}"#).unwrap();
        assert_eq!(command.name(), "setSearchEngine");

        assert!(serde_json::from_str::<UserCommand>(r#"{"type":"closeTab"}"#).is_err());
        assert!(serde_json::from_str::<UserCommand>(r#"{"type":"selfDestruct"}"#).is_err());
    }
}
