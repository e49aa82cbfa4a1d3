//! Platform selection tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// The run's platform choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// iOS and Android.
    Both,
    /// iOS only.
    Ios,
    /// Android only.
    Android,
    /// Web only.
    Web,
}

impl Selection {
    /// Every selection value.
    pub const ALL: [Selection; 4] = [
        Selection::Both,
        Selection::Ios,
        Selection::Android,
        Selection::Web,
    ];

    /// The configuration token for this selection.
    pub fn as_str(self) -> &'static str {
        match self {
            Selection::Both => "both",
            Selection::Ios => "ios",
            Selection::Android => "android",
            Selection::Web => "web",
        }
    }
}

impl FromStr for Selection {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.as_str() == s)
            .ok_or_else(|| PlatformError::InvalidSelection {
                value: s.to_string(),
                expected: Self::ALL.map(Selection::as_str).join(", "),
            })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
