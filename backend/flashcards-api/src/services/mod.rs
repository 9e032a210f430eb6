use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use applet_registry::AppletVisibility;
use card_source::{CardSource, DirectoryCardSource, HttpCardSource};
use selection::Selection;
use session_builder::SessionBuilder;
use study_session::StudySession;

/// Shared state for the single local learner.
pub struct AppState {
    pub config: Config,
    pub builder: SessionBuilder,
    pub study: Mutex<Option<StudySession>>,
    pub selection: Mutex<Selection>,
    pub applets: Mutex<AppletVisibility>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let source: Arc<dyn CardSource> = match &config.cards_dir {
            Some(dir) => {
                tracing::info!("Loading flashcards from directory {}", dir);
                Arc::new(DirectoryCardSource::new(dir))
            }
            None => {
                tracing::info!("Loading flashcards from {}", config.card_api_url);
                Arc::new(HttpCardSource::new(
                    &config.card_api_url,
                    config.fetch_timeout(),
                )?)
            }
        };

        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: Config, source: Arc<dyn CardSource>) -> Self {
        let builder = SessionBuilder::new(source, config.session_size, config.starting_lives);

        Self {
            config,
            builder,
            study: Mutex::new(None),
            selection: Mutex::new(Selection::default()),
            applets: Mutex::new(AppletVisibility::default()),
        }
    }
}

pub mod applet_registry;
pub mod card_source;
pub mod deck_sequencer;
pub mod progress_tracker;
pub mod selection;
pub mod session_builder;
pub mod study_session;
