//! Review checklist shown to the reviewer model.
//!
//! The reviewer gives a binary verdict against these items. PASS only when
//! every item holds; otherwise FAIL with specific fixes.

/// Items a draft must satisfy to be approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewChecklist {
    items: Vec<String>,
}

impl Default for ReviewChecklist {
    fn default() -> Self {
        Self::new().with_items([
            "Syntax and imports are correct and the code compiles cleanly",
            "Structure follows the expected conventions for the language",
            "Runs standalone, including environment setup and logging",
            "Clear docstrings and no extraneous prose outside the code",
            "No duplicate code blocks",
        ])
    }
}

impl ReviewChecklist {
    /// An empty checklist
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Add multiple items.
    pub fn with_items(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_five_items() {
        let checklist = ReviewChecklist::default();
        assert_eq!(checklist.len(), 5);
        assert!(checklist.items()[0].contains("imports"));
        assert!(checklist.items()[4].contains("duplicate"));
    }

    #[test]
    fn test_builder() {
        let checklist = ReviewChecklist::new()
            .with_item("Uses type hints")
            .with_items(["Handles empty input", "Has a main guard"]);
        assert_eq!(checklist.len(), 3);
        assert_eq!(checklist.items()[2], "Has a main guard");
        assert!(ReviewChecklist::new().is_empty());
    }
}
