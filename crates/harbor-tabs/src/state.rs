//! Security indicator derived from the displayed URL
//!
//! ```text
//! https://…            → Secure
//! app://… (internal)   → Internal  ("Browser settings")
//! anything else        → Insecure
//! ```

use serde::{Deserialize, Serialize};

use harbor_navigation::is_internal_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityState {
    Secure,
    Internal,
    Insecure,
}

impl SecurityState {
    pub fn for_url(url: &str) -> Self {
        if url.starts_with("https://") {
            SecurityState::Secure
        } else if is_internal_url(url) {
            SecurityState::Internal
        } else {
            SecurityState::Insecure
        }
    }

    /// Tooltip shown on the indicator
    pub fn label(&self) -> &'static str {
        match self {
            SecurityState::Secure => "Secure connection",
            SecurityState::Internal => "Browser settings",
            SecurityState::Insecure => "Not secure",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityState::Secure => "secure",
            SecurityState::Internal => "internal",
            SecurityState::Insecure => "insecure",
        }
    }
}

impl std::fmt::Display for SecurityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
