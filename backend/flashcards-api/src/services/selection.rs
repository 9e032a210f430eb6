use serde::Serialize;

use crate::error::{StudyError, StudyResult};

/// Category and folder choices made before a session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub category: Option<String>,
    pub folders: Vec<String>,
}

impl Selection {
    /// Picking a category always starts from an empty folder list.
    pub fn select_category(&mut self, category: impl Into<String>) {
        self.category = Some(category.into());
        self.folders.clear();
    }

    /// Adds the folder, or removes it if already selected. Returns whether it is now selected.
    pub fn toggle_folder(&mut self, folder: &str) -> bool {
        if let Some(pos) = self.folders.iter().position(|f| f == folder) {
            self.folders.remove(pos);
            false
        } else {
            self.folders.push(folder.to_string());
            true
        }
    }

    pub fn reset(&mut self) {
        self.category = None;
        self.folders.clear();
    }

    pub fn confirmed(&self) -> StudyResult<(String, Vec<String>)> {
        let category = self
            .category
            .clone()
            .ok_or(StudyError::NoCategorySelected)?;
        Ok((category, self.folders.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::default();
        selection.select_category("Math");

        assert!(selection.toggle_folder("4.1"));
        assert!(selection.toggle_folder("4.2"));
        assert!(!selection.toggle_folder("4.1"));
        assert_eq!(selection.folders, vec!["4.2".to_string()]);
    }

    #[test]
    fn new_category_clears_folders() {
        let mut selection = Selection::default();
        selection.select_category("Math");
        selection.toggle_folder("4.1");

        selection.select_category("Computer Science");
        assert!(selection.folders.is_empty());
        assert_eq!(selection.category.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn confirmed_requires_category() {
        let mut selection = Selection::default();
        assert!(matches!(
            selection.confirmed(),
            Err(StudyError::NoCategorySelected)
        ));

        selection.select_category("Math");
        selection.toggle_folder("4.1");
        selection.reset();
        assert_eq!(selection, Selection::default());
    }
}
