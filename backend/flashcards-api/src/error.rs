use axum::http::StatusCode;
use std::time::Duration;

/// Failures surfaced by card sources and the study session.
///
/// None of these end the process; handlers turn them into HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error("Failed to fetch flashcards: {0}")]
    FetchFailure(String),

    #[error("Card fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("Malformed flashcard record: {0}")]
    MalformedCard(String),

    #[error("No study session in progress")]
    NoActiveSession,

    #[error("No card is currently showing")]
    NoCurrentCard,

    #[error("Card {card_id} has no option at index {index}")]
    InvalidOption { card_id: String, index: usize },

    #[error("Card {0} is multiple choice; answer with an option index")]
    ChoiceRequired(String),

    #[error("No category selected")]
    NoCategorySelected,
}

impl StudyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StudyError::FetchFailure(_) | StudyError::MalformedCard(_) => StatusCode::BAD_GATEWAY,
            StudyError::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            StudyError::NoActiveSession => StatusCode::NOT_FOUND,
            StudyError::NoCurrentCard => StatusCode::CONFLICT,
            StudyError::InvalidOption { .. }
            | StudyError::ChoiceRequired(_)
            | StudyError::NoCategorySelected => StatusCode::BAD_REQUEST,
        }
    }

    /// True for errors meaning "no usable deck could be obtained".
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            StudyError::FetchFailure(_) | StudyError::FetchTimeout(_) | StudyError::MalformedCard(_)
        )
    }
}

impl From<StudyError> for (StatusCode, String) {
    fn from(err: StudyError) -> Self {
        (err.status_code(), err.to_string())
    }
}

pub type StudyResult<T> = Result<T, StudyError>;
