use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every window the desktop can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applet {
    Explorer,
    Terminal,
    Music,
    Browser,
    Chat,
    Flashcards,
}

impl Applet {
    pub const ALL: [Applet; 6] = [
        Applet::Explorer,
        Applet::Terminal,
        Applet::Music,
        Applet::Browser,
        Applet::Chat,
        Applet::Flashcards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Applet::Explorer => "explorer",
            Applet::Terminal => "terminal",
            Applet::Music => "music",
            Applet::Browser => "browser",
            Applet::Chat => "chat",
            Applet::Flashcards => "flashcards",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Applet::Explorer => "Files",
            Applet::Terminal => "Shell",
            Applet::Music => "Music",
            Applet::Browser => "Browser",
            Applet::Chat => "Chat",
            Applet::Flashcards => "Cards",
        }
    }

    pub fn full_size(&self) -> bool {
        matches!(self, Applet::Browser | Applet::Chat | Applet::Flashcards)
    }

    pub fn show_in_dock(&self) -> bool {
        !matches!(self, Applet::Browser | Applet::Chat)
    }

    pub fn visible_on_start(&self) -> bool {
        matches!(self, Applet::Explorer)
    }
}

impl FromStr for Applet {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Applet::ALL
            .into_iter()
            .find(|applet| applet.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("Unknown applet: {}", value))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppletInfo {
    pub applet: Applet,
    pub display_name: &'static str,
    pub title: String,
    pub visible: bool,
    pub full_size: bool,
    pub show_in_dock: bool,
}
