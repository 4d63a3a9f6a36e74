//! Download snapshot and state

use serde::{Deserialize, Serialize};

use crate::error::DownloadError;
use crate::Result;

/// ```text
/// (start) -> progress
/// progress -> progress | interrupted
/// interrupted -> progress
/// progress | interrupted -> completed | cancelled | failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    /// Bytes are flowing
    Progress,
    /// Stalled or paused; recoverable and still shown as active
    Interrupted,
    Completed,
    Cancelled,
    Failed,
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadState::Completed | DownloadState::Cancelled | DownloadState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Progress => "progress",
            DownloadState::Interrupted => "interrupted",
            DownloadState::Completed => "completed",
            DownloadState::Cancelled => "cancelled",
            DownloadState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DownloadState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "progress" => Ok(DownloadState::Progress),
            "interrupted" => Ok(DownloadState::Interrupted),
            "completed" => Ok(DownloadState::Completed),
            "cancelled" => Ok(DownloadState::Cancelled),
            "failed" => Ok(DownloadState::Failed),
            _ => Err(format!("Unknown download state: {}", s)),
        }
    }
}

/// Point-in-time view of one download, as pushed from host to shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSnapshot {
    pub id: String,
    pub filename: String,
    pub received_bytes: u64,
    /// 0 when the size is unknown
    pub total_bytes: u64,
    pub state: DownloadState,
    pub save_path: String,
    pub speed_bps: f64,
}

impl DownloadSnapshot {
    /// Reject snapshots that can't be attributed or displayed.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DownloadError::Malformed("empty id".to_string()));
        }
        if !self.speed_bps.is_finite() {
            return Err(DownloadError::Malformed(format!(
                "speed {} for {}",
                self.speed_bps, self.id
            )));
        }
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whole percent, 0 while the size is unknown.
    pub fn progress_percent(&self) -> u64 {
        if self.total_bytes == 0 {
            return 0;
        }
        let percent = (self.received_bytes as f64 / self.total_bytes as f64 * 100.0).round();
        (percent as u64).min(100)
    }

    pub fn status_label(&self) -> String {
        match self.state {
            DownloadState::Completed => "Done".to_string(),
            DownloadState::Failed => "Failed".to_string(),
            DownloadState::Interrupted => "Paused".to_string(),
            DownloadState::Cancelled => "Cancelled".to_string(),
            DownloadState::Progress => {
                let speed = format_speed(self.speed_bps);
                let speed = if speed.is_empty() {
                    String::new()
                } else {
                    format!(" \u{2022} {}", speed)
                };
                if self.total_bytes > 0 {
                    format!("Downloading {}%{}", self.progress_percent(), speed)
                } else {
                    format!("Downloading{}", speed)
                }
            }
        }
    }
}

/// Human-readable rate: `512 B/s`, `1.50 KB/s`, `12.3 MB/s`.
pub fn format_speed(bytes_per_second: f64) -> String {
    if !bytes_per_second.is_finite() || bytes_per_second <= 0.0 {
        return String::new();
    }

    const UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];
    let mut value = bytes_per_second;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value >= 100.0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else if value >= 10.0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
