//! Consolidator - turns the latest draft into the final result
//!
//! Runs once, after the loop terminates. Normalization is deterministic:
//! strip one enclosing Markdown fence (with optional language tag), then
//! trim surrounding whitespace.

use crate::domain::FinalResult;
use crate::state::{StateStore, fields};

const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consolidator {
    normalize: bool,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self { normalize: true }
    }
}

impl Consolidator {
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    pub fn consolidate(&self, store: &StateStore) -> FinalResult {
        let Some(entry) = store.latest_entry(fields::CODE_DRAFT) else {
            log::info!("no draft was ever written");
            return FinalResult::NoArtifact;
        };

        let content = if self.normalize {
            normalize(&entry.value)
        } else {
            entry.value.as_str()
        };

        if content.trim().is_empty() {
            log::info!("latest draft (round {}) is empty", entry.round);
            return FinalResult::NoArtifact;
        }

        FinalResult::Artifact {
            content: content.to_string(),
            round: entry.round,
        }
    }
}

/// Strip one enclosing code fence and surrounding whitespace.
///
/// Text that is not wholly enclosed in a fence is only trimmed.
pub fn normalize(text: &str) -> &str {
    let trimmed = text.trim();
    strip_fence(trimmed).map(str::trim).unwrap_or(trimmed)
}

fn strip_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(FENCE)?.strip_suffix(FENCE)?;

    // Opening line holds at most a language tag
    let newline = inner.find('\n')?;
    let tag = inner[..newline].trim();
    if tag.contains(char::is_whitespace) || tag.contains('`') {
        return None;
    }

    let body = &inner[newline + 1..];
    // A second fence inside means the text is several blocks, not one
    if body.lines().any(|line| line.trim_start().starts_with(FENCE)) {
        return None;
    }
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(drafts: &[(&str, u32)]) -> StateStore {
        let mut store = StateStore::new();
        store.append(fields::PROMPT, "add two numbers", 0);
        for (draft, round) in drafts {
            store.append(fields::CODE_DRAFT, *draft, *round);
        }
        store
    }

    #[test]
    fn test_normalize_strips_tagged_fence() {
        assert_eq!(normalize("```python\ndef f():\n    pass\n```"), "def f():\n    pass");
    }

    #[test]
    fn test_normalize_strips_bare_fence_and_whitespace() {
        assert_eq!(normalize("\n\n```\nx = 1\n```\n  "), "x = 1");
    }

    #[test]
    fn test_normalize_plain_text_is_trimmed() {
        assert_eq!(normalize("  x = 1\n"), "x = 1");
    }

    #[test]
    fn test_normalize_strips_only_one_fence() {
        assert_eq!(normalize("```\n```rust\nfn main() {}\n```\n```"), "```\n```rust\nfn main() {}\n```\n```");
        assert_eq!(normalize("````\nx\n````"), "````\nx\n````");
    }

    #[test]
    fn test_normalize_leaves_multiple_blocks() {
        let text = "```python\na = 1\n```\nand\n```python\nb = 2\n```";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_normalize_single_line_fence_untouched() {
        assert_eq!(normalize("```x = 1```"), "```x = 1```");
    }

    #[test]
    fn test_no_draft_is_no_artifact() {
        let result = Consolidator::default().consolidate(&store_with(&[]));
        assert_eq!(result, FinalResult::NoArtifact);
    }

    #[test]
    fn test_blank_draft_is_no_artifact() {
        let result = Consolidator::default().consolidate(&store_with(&[("v1", 1), ("   \n", 3)]));
        assert_eq!(result, FinalResult::NoArtifact);
    }

    #[test]
    fn test_empty_fence_is_no_artifact() {
        let result = Consolidator::default().consolidate(&store_with(&[("```python\n\n```", 1)]));
        assert_eq!(result, FinalResult::NoArtifact);
    }

    #[test]
    fn test_latest_draft_wins() {
        let result = Consolidator::default().consolidate(&store_with(&[("v1", 1), ("```\nv2\n```", 3)]));
        assert_eq!(
            result,
            FinalResult::Artifact {
                content: "v2".to_string(),
                round: 3
            }
        );
    }

    #[test]
    fn test_normalization_disabled_keeps_text() {
        let consolidator = Consolidator::new(false);
        assert!(!consolidator.normalizes());
        let result = consolidator.consolidate(&store_with(&[("```\nv1\n```\n", 1)]));
        assert_eq!(result.content(), Some("```\nv1\n```\n"));
        assert_eq!(result.round(), Some(1));
    }
}
