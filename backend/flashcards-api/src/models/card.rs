use serde::{Deserialize, Serialize};
use validator::Validate;

/// One flashcard record as delivered by a card source.
///
/// Multiple-choice cards store the correct answer at `options[0]`; display
/// order is shuffled separately (see [`crate::utils::shuffle::shuffle_options`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[validate(length(min = 1, message = "card id must not be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "card front must not be empty"))]
    pub front: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,

    #[validate(length(min = 2, message = "multiple choice needs at least two options"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(
        default,
        alias = "nextQuestionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_card_id: Option<String>,

    #[serde(default)]
    pub never_display_first: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,

    #[serde(
        default,
        alias = "chapter_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub chapter: Option<u32>,

    #[serde(default, alias = "unit_number", skip_serializing_if = "Option::is_none")]
    pub unit: Option<u32>,
}

impl Card {
    /// Plain front/back card with no chain links.
    pub fn new(id: impl Into<String>, front: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            front: front.into(),
            back: None,
            options: None,
            next_card_id: None,
            never_display_first: false,
            step_number: None,
            total_steps: None,
            chapter: None,
            unit: None,
        }
    }

    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = Some(back.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_next(mut self, next_card_id: impl Into<String>) -> Self {
        self.next_card_id = Some(next_card_id.into());
        self
    }

    pub fn never_first(mut self) -> Self {
        self.never_display_first = true;
        self
    }

    pub fn with_step(mut self, step_number: u32, total_steps: u32) -> Self {
        self.step_number = Some(step_number);
        self.total_steps = Some(total_steps);
        self
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.options.is_some()
    }

    /// Eligible to open a session or be reached by sequential advance.
    pub fn is_displayable(&self) -> bool {
        !self.never_display_first
    }

    /// Grades a choice by its index in the stored (pre-shuffle) order.
    pub fn is_correct_option(&self, original_index: usize) -> Option<bool> {
        let options = self.options.as_ref()?;
        if original_index < options.len() {
            Some(original_index == 0)
        } else {
            None
        }
    }

    /// Window title for the card, e.g. `Math - Chapter 4, Unit 1 (2/4)`.
    pub fn display_title(&self, category: Option<&str>) -> String {
        let mut title = category.unwrap_or("Flashcards").to_string();

        if let (Some(chapter), Some(unit)) = (self.chapter, self.unit) {
            title.push_str(&format!(" - Chapter {}, Unit {}", chapter, unit));
        }

        if let (Some(step), Some(total)) = (self.step_number, self.total_steps) {
            title.push_str(&format!(" ({}/{})", step, total));
        }

        title
    }
}
