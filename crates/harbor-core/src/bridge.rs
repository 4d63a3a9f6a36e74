//! Event Bridge wire format
//!
//! Every message is `{"channel": "<name>", "payload": ...}`.
//!
//! Inbound: `download-item`, `surface-event`, `user-command`.
//! Outbound: `download-cancel`, `download-open`, `download-show`,
//! `surface-command`, `navigation-prevented`.

use serde::{Deserialize, Serialize};

use harbor_download::DownloadSnapshot;
use harbor_session::{HostCommand, UserCommand};
use harbor_tabs::{SurfaceCommand, SurfaceEvent, TabId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceEventMessage {
    pub tab_id: TabId,
    pub event: SurfaceEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum InboundMessage {
    DownloadItem(DownloadSnapshot),
    SurfaceEvent(SurfaceEventMessage),
    UserCommand(UserCommand),
}

impl InboundMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            InboundMessage::DownloadItem(_) => "download-item",
            InboundMessage::SurfaceEvent(_) => "surface-event",
            InboundMessage::UserCommand(_) => "user-command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum OutboundMessage {
    DownloadCancel {
        id: String,
    },
    DownloadOpen {
        path: String,
    },
    DownloadShow {
        path: String,
    },
    SurfaceCommand {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        command: SurfaceCommand,
    },
    /// Answer to a vetoed `willNavigate`
    NavigationPrevented {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
    },
}

impl From<HostCommand> for OutboundMessage {
    fn from(command: HostCommand) -> Self {
        match command {
            HostCommand::CancelDownload { id } => OutboundMessage::DownloadCancel { id },
            HostCommand::OpenFile { path } => OutboundMessage::DownloadOpen { path },
            HostCommand::RevealInFolder { path } => OutboundMessage::DownloadShow { path },
        }
    }
}

/// Parse one inbound line. Malformed messages are logged and dropped.
pub fn decode_inbound(line: &str) -> Option<InboundMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed bridge message");
            None
        }
    }
}

pub fn encode_outbound(message: &OutboundMessage) -> crate::Result<String> {
    Ok(serde_json::to_string(message)?)
}
