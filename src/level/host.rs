// src/level/host.rs
//! Scene-host seam: whatever owns instantiation implements `SceneHost`.

use bevy::prelude::*;

use super::core::{ElementKind, FloorSpec};
use super::error::LevelError;
use super::registry::TemplateDef;

/// Receives the output of a generation run.
pub trait SceneHost {
    /// Host-side handle of a spawned element.
    type Instance;

    fn set_floor(
        &mut self,
        floor: &FloorSpec,
        template: &TemplateDef,
    ) -> Result<Self::Instance, LevelError>;

    /// `position` is in layout space (Z-up).
    fn spawn(
        &mut self,
        template: &TemplateDef,
        kind: ElementKind,
        position: Vec3,
    ) -> Result<Self::Instance, LevelError>;
}

/// One call received by a `RecordingHost`.
#[derive(Clone, Debug, PartialEq)]
pub enum HostRecord {
    Floor { template: String, position: Vec3, scale: Vec3 },
    Spawn { template: String, kind: ElementKind, position: Vec3 },
}

/// In-memory host: keeps every call in order. Instances are record indices.
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    pub records: Vec<HostRecord>,
}

impl RecordingHost {
    pub fn spawned(&self) -> impl Iterator<Item = (ElementKind, Vec3)> + '_ {
        self.records.iter().filter_map(|r| match r {
            HostRecord::Spawn { kind, position, .. } => Some((*kind, *position)),
            HostRecord::Floor { .. } => None,
        })
    }

    pub fn floors(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, HostRecord::Floor { .. }))
            .count()
    }
}

impl SceneHost for RecordingHost {
    type Instance = usize;

    fn set_floor(&mut self, floor: &FloorSpec, template: &TemplateDef) -> Result<usize, LevelError> {
        self.records.push(HostRecord::Floor {
            template: template.name.clone(),
            position: floor.position,
            scale: floor.scale,
        });
        Ok(self.records.len() - 1)
    }

    fn spawn(
        &mut self,
        template: &TemplateDef,
        kind: ElementKind,
        position: Vec3,
    ) -> Result<usize, LevelError> {
        self.records.push(HostRecord::Spawn { template: template.name.clone(), kind, position });
        Ok(self.records.len() - 1)
    }
}
