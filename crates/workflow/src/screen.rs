use core::str::FromStr;

use serde::{Deserialize, Serialize};

use billzy_core::DomainError;

/// The seven views of the filing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    Dashboard,
    Upload,
    Validation,
    Generate,
    GstUpload,
    Reports,
}

/// Header navigation entries, in display order.
pub const NAV_ITEMS: [(Screen, &str); 3] = [
    (Screen::Dashboard, "Dashboard"),
    (Screen::Upload, "Upload Bills"),
    (Screen::Reports, "Reports"),
];

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Login,
        Screen::Dashboard,
        Screen::Upload,
        Screen::Validation,
        Screen::Generate,
        Screen::GstUpload,
        Screen::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Dashboard => "dashboard",
            Screen::Upload => "upload",
            Screen::Validation => "validation",
            Screen::Generate => "generate",
            Screen::GstUpload => "gst-upload",
            Screen::Reports => "reports",
        }
    }

    /// Whether the screen has an entry in the header navigation.
    pub fn in_header(&self) -> bool {
        NAV_ITEMS.iter().any(|(screen, _)| screen == self)
    }
}

impl core::fmt::Display for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown screen: {s}")))
    }
}
