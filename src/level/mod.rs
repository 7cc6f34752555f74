//! Bitmap → level layout: sampling, generation, templates, and the Bevy host.

pub mod command;
pub mod components;
pub mod core;
pub mod error;
pub mod generator;
pub mod host;
pub mod naming;
pub mod plugin;
pub mod registry;
pub mod request;
pub mod runner;
pub mod sampler;
pub mod spawn;

pub use error::LevelError;
pub use plugin::{LevelCreatorPlugin, LevelCreatorSettings, LevelGenerationFailed, LevelRequestQueue};
pub use request::GenerationRequest;
