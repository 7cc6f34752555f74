// src/level/error.rs
use std::path::PathBuf;

use super::registry::TemplateRole;

/// Everything that can abort a level-generation run.
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("image unavailable ({}): {reason}", .path.display())]
    ImageUnavailable { path: PathBuf, reason: String },

    #[error("{role} template '{name}' unavailable")]
    TemplateUnavailable { role: TemplateRole, name: String },

    #[error("bad command: {0}")]
    Command(String),
}

impl LevelError {
    pub fn image_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ImageUnavailable { path: path.into(), reason: reason.to_string() }
    }

    pub fn template_unavailable(role: TemplateRole, name: impl Into<String>) -> Self {
        Self::TemplateUnavailable { role, name: name.into() }
    }
}
