use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use url::Url;
use validator::Validate;

use crate::error::{StudyError, StudyResult};
use crate::metrics::{CARD_FETCH_DURATION_SECONDS, CARD_FETCH_TOTAL};
use crate::models::card::Card;

/// Supplies the raw card pool for a category and folder selection.
#[async_trait]
pub trait CardSource: Send + Sync {
    async fn fetch_cards(&self, category: &str, folders: &[String]) -> StudyResult<Vec<Card>>;

    fn name(&self) -> &'static str;
}

/// Rejects records missing an id or front, with fewer than two options, or
/// linking to a step another card already links to. Each chain step has a
/// single predecessor.
pub fn validate_cards(cards: &[Card]) -> StudyResult<()> {
    let mut linked_from: HashMap<&str, &str> = HashMap::new();

    for card in cards {
        card.validate().map_err(|e| {
            StudyError::MalformedCard(format!("card {:?}: {}", card.id, e))
        })?;

        if let Some(next) = card.next_card_id.as_deref() {
            if let Some(previous) = linked_from.insert(next, card.id.as_str()) {
                return Err(StudyError::MalformedCard(format!(
                    "cards {:?} and {:?} both link to {:?}",
                    previous, card.id, next
                )));
            }
        }
    }
    Ok(())
}

/// Runs a fetch and records its outcome in the card fetch metrics.
pub async fn track_fetch<F>(source: &str, future: F) -> StudyResult<Vec<Card>>
where
    F: std::future::Future<Output = StudyResult<Vec<Card>>>,
{
    let start = Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = match &result {
        Ok(cards) if cards.is_empty() => "empty",
        Ok(_) => "success",
        Err(StudyError::FetchTimeout(_)) => "timeout",
        Err(_) => "error",
    };

    CARD_FETCH_TOTAL.with_label_values(&[source, status]).inc();
    CARD_FETCH_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration);

    result
}

/// Fetches cards from the flashcards REST endpoint.
pub struct HttpCardSource {
    http_client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpCardSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("api/flashcards")?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CardSource for HttpCardSource {
    async fn fetch_cards(&self, category: &str, folders: &[String]) -> StudyResult<Vec<Card>> {
        tracing::debug!(
            "Fetching flashcards from {}: category={}, folders={:?}",
            self.endpoint,
            category,
            folders
        );

        let folders_param = folders.join(",");
        let response = self
            .http_client
            .get(self.endpoint.clone())
            .query(&[("category", category), ("folders", folders_param.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StudyError::FetchTimeout(self.timeout)
                } else {
                    StudyError::FetchFailure(e.to_string())
                }
            })?;

        // The endpoint answers "No flashcards found" with a 404.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("No flashcards found for category={}", category);
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StudyError::FetchFailure(format!(
                "flashcards endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StudyError::FetchFailure(e.to_string()))?;
        let cards: Vec<Card> = serde_json::from_slice(&body)
            .map_err(|e| StudyError::MalformedCard(e.to_string()))?;
        validate_cards(&cards)?;

        tracing::info!("Fetched {} flashcards for {}", cards.len(), category);
        Ok(cards)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Directory names for course folders whose display name differs.
const COURSE_DIRS: [(&str, &str); 3] = [
    ("Pre-Calculus", "precalc"),
    ("Algebra", "algebra"),
    ("Calculus 1", "calc1"),
];

fn course_dir(folder: &str) -> Option<&'static str> {
    COURSE_DIRS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(folder))
        .map(|(_, dir)| *dir)
}

/// Reads cards from JSON files laid out as `<root>/<category>/<folder>/**.json`.
///
/// A `chapter.unit` folder name maps to the nested `chapter/unit` directory;
/// course names such as `Pre-Calculus` map to their directory (`precalc`).
pub struct DirectoryCardSource {
    root: PathBuf,
}

impl DirectoryCardSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn folder_path(&self, category: &str, folder: &str) -> PathBuf {
        let mut path = self.root.join(category.to_lowercase());
        match course_dir(folder) {
            Some(dir) => path.push(dir),
            None => {
                for segment in folder.split('.').filter(|s| !s.is_empty()) {
                    path.push(segment.to_lowercase());
                }
            }
        }
        path
    }

    fn load_folder(path: &Path, cards: &mut Vec<Card>) -> StudyResult<()> {
        let entries = std::fs::read_dir(path).map_err(|e| {
            StudyError::FetchFailure(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        paths.sort();

        for entry_path in paths {
            if entry_path.is_dir() {
                Self::load_folder(&entry_path, cards)?;
            } else if entry_path.extension().is_some_and(|ext| ext == "json") {
                let content = std::fs::read_to_string(&entry_path).map_err(|e| {
                    StudyError::FetchFailure(format!("cannot read {}: {}", entry_path.display(), e))
                })?;
                let parsed: Vec<Card> = serde_json::from_str(&content).map_err(|e| {
                    StudyError::MalformedCard(format!("{}: {}", entry_path.display(), e))
                })?;
                tracing::debug!("Parsed {} flashcards from {}", parsed.len(), entry_path.display());
                cards.extend(parsed);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CardSource for DirectoryCardSource {
    async fn fetch_cards(&self, category: &str, folders: &[String]) -> StudyResult<Vec<Card>> {
        let paths: Vec<PathBuf> = folders
            .iter()
            .map(|folder| self.folder_path(category, folder))
            .collect();

        let cards = tokio::task::spawn_blocking(move || {
            let mut cards = Vec::new();
            for path in &paths {
                tracing::debug!("Loading flashcards from {}", path.display());
                Self::load_folder(path, &mut cards)?;
            }
            Ok::<_, StudyError>(cards)
        })
        .await
        .map_err(|e| StudyError::FetchFailure(format!("card loader panicked: {}", e)))??;

        validate_cards(&cards)?;
        Ok(cards)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

/// In-memory card pool keyed by category; folders are ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticCardSource {
    pools: Vec<(String, Vec<Card>)>,
}

impl StaticCardSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>, cards: Vec<Card>) -> Self {
        self.pools.push((category.into(), cards));
        self
    }
}

#[async_trait]
impl CardSource for StaticCardSource {
    async fn fetch_cards(&self, category: &str, _folders: &[String]) -> StudyResult<Vec<Card>> {
        let cards = self
            .pools
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, cards)| cards.clone())
            .unwrap_or_default();
        validate_cards(&cards)?;
        Ok(cards)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
