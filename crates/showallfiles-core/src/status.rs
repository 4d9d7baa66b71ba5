use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether Explorer shows hidden files.
///
/// The discriminants are the raw registry encoding of the `Hidden`
/// value and must never change: `1` shows hidden files, `2` hides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityStatus {
    Visible = 1,
    Hidden = 2,
}

impl VisibilityStatus {
    /// Returns the raw registry value.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Decodes a raw registry value.
    ///
    /// Only `2` means hidden; every other value is treated as visible,
    /// which is also how a toggle from an unknown value resolves.
    pub const fn from_raw(raw: u32) -> Self {
        if raw == Self::Hidden as u32 {
            Self::Hidden
        } else {
            Self::Visible
        }
    }

    /// Returns the opposite status.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }

    /// Label for the toggle control: the action it would perform.
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Visible => "Hide",
            Self::Hidden => "Show",
        }
    }

    /// Short state description used in the indicator tooltip.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Visible => "Enabled",
            Self::Hidden => "Disabled",
        }
    }
}

impl fmt::Display for VisibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}
