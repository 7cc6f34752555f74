// src/level/request.rs
use std::path::PathBuf;

use super::registry::TemplateSelection;

/// Everything one generation run needs, fixed up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub level_name: String,
    /// Relative to the assets root.
    pub image_path: PathBuf,
    pub templates: TemplateSelection,
}

impl GenerationRequest {
    pub fn new(level_name: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            level_name: level_name.into(),
            image_path: image_path.into(),
            templates: TemplateSelection::default(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateSelection) -> Self {
        self.templates = templates;
        self
    }
}
