pub mod level;
pub mod viewer;
