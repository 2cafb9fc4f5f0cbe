//! Prompt Loader - Load and cache prompt templates from files
//!
//! This module provides the PromptLoader struct which loads prompt templates
//! from a directory and caches them in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{DraftloopError, Result};

/// Loads and caches prompt templates from a directory
pub struct PromptLoader {
    /// Base directory containing prompt template files
    templates_dir: PathBuf,
    /// In-memory cache of loaded templates
    cache: RwLock<HashMap<String, String>>,
}

impl PromptLoader {
    pub fn new(templates_dir: impl AsRef<Path>) -> Self {
        Self {
            templates_dir: templates_dir.as_ref().to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a template from disk and cache it
    ///
    /// # Arguments
    /// * `name` - The template name (without .md extension)
    pub fn load(&self, name: &str) -> Result<String> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|e| DraftloopError::Template(format!("Failed to acquire read lock: {}", e)))?;
            if let Some(content) = cache.get(name) {
                return Ok(content.clone());
            }
        }

        let path = self.template_path(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DraftloopError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to load template '{}' from {:?}: {}", name, path, e),
            ))
        })?;

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| DraftloopError::Template(format!("Failed to acquire write lock: {}", e)))?;
            cache.insert(name.to_string(), content.clone());
        }

        Ok(content)
    }

    /// Load a template if its file exists
    pub fn load_optional(&self, name: &str) -> Result<Option<String>> {
        if self.exists(name) {
            self.load(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Check if a template exists on disk
    pub fn exists(&self, name: &str) -> bool {
        self.template_path(name).exists()
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir.join(format!("{}.md", name))
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }
}
