// src/level/components.rs
use bevy::prelude::*;

use super::core::ElementKind;

/// Root of one generated level; everything spawned for it is a descendant.
#[derive(Component, Clone, Debug)]
pub struct Level {
    pub name: String,
}

#[derive(Component)]
pub struct LevelFloor;

/// A wall or breakable wall placed from a pixel.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelElement {
    pub kind: ElementKind,
}

/// Groups a level's lights.
#[derive(Component)]
pub struct LightingFolder;
