use std::collections::BTreeMap;

use crate::models::applet::{Applet, AppletInfo};

/// Which desktop windows are open.
#[derive(Debug, Clone)]
pub struct AppletVisibility {
    visible: BTreeMap<Applet, bool>,
}

impl Default for AppletVisibility {
    fn default() -> Self {
        Self {
            visible: Applet::ALL
                .into_iter()
                .map(|applet| (applet, applet.visible_on_start()))
                .collect(),
        }
    }
}

impl AppletVisibility {
    pub fn is_visible(&self, applet: Applet) -> bool {
        self.visible.get(&applet).copied().unwrap_or(false)
    }

    pub fn set(&mut self, applet: Applet, visible: bool) {
        self.visible.insert(applet, visible);
    }

    /// Returns the new visibility.
    pub fn toggle(&mut self, applet: Applet) -> bool {
        let visible = !self.is_visible(applet);
        self.set(applet, visible);
        tracing::debug!("Applet {} visible={}", applet.as_str(), visible);
        visible
    }

    /// `lives` fills in the hearts of the flashcards window title.
    pub fn describe(&self, lives: Option<(u32, u32)>) -> Vec<AppletInfo> {
        Applet::ALL
            .into_iter()
            .map(|applet| AppletInfo {
                applet,
                display_name: applet.display_name(),
                title: title_for(applet, lives),
                visible: self.is_visible(applet),
                full_size: applet.full_size(),
                show_in_dock: applet.show_in_dock(),
            })
            .collect()
    }
}

fn title_for(applet: Applet, lives: Option<(u32, u32)>) -> String {
    match (applet, lives) {
        (Applet::Flashcards, Some((remaining, max))) => {
            let hearts: String = (0..max)
                .map(|i| if i < remaining { '♥' } else { '♡' })
                .collect();
            format!("Flashcards {}", hearts)
        }
        (Applet::Flashcards, None) => "Flashcards".to_string(),
        _ => applet.display_name().to_string(),
    }
}
