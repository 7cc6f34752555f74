// src/level/spawn.rs
//! ECS scene host: turns floor/placement calls into entities under a level root.

use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use std::collections::HashMap;

use super::components::{LevelElement, LevelFloor, LightingFolder};
use super::core::{ElementKind, FloorSpec, Placeable};
use super::error::LevelError;
use super::host::SceneHost;
use super::registry::{RenderRef, TemplateDef, TemplateRole};

/// Layout space is Z-up, Bevy is Y-up.
#[inline]
pub fn to_world(layout: Vec3) -> Vec3 {
    Vec3::new(layout.x, layout.z, layout.y)
}

/// Radius of the per-level sky dome.
pub const SKY_RADIUS: f32 = 100_000.0;

pub const SKY_COLOR: Color = Color::srgb(0.53, 0.68, 0.86);

/// Where the floor entity goes. Cuboid meshes are centred, so the floor is
/// sunk by half its thickness to put its top face at height zero.
pub fn floor_translation(floor: &FloorSpec, template: &TemplateDef) -> Vec3 {
    let mut t = to_world(floor.position);
    if matches!(template.render, RenderRef::Cuboid { .. }) {
        t.y -= template.footprint().half_height() * floor.scale.z;
    }
    t
}

/// What to attach to an entity to render a template.
#[derive(Clone)]
enum Visual {
    Scene(Handle<Scene>),
    Mesh(Handle<Mesh>, Handle<StandardMaterial>),
}

pub struct BevySceneHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    asset_server: &'a AssetServer,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    root: Entity,
    visuals: HashMap<String, Visual>,
}

impl<'a, 'w, 's> BevySceneHost<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        asset_server: &'a AssetServer,
        meshes: &'a mut Assets<Mesh>,
        materials: &'a mut Assets<StandardMaterial>,
        root: Entity,
    ) -> Self {
        Self { commands, asset_server, meshes, materials, root, visuals: HashMap::new() }
    }

    /// Handles are built once per template and shared by all its instances.
    fn visual_for(&mut self, template: &TemplateDef, role: TemplateRole) -> Result<Visual, LevelError> {
        if let Some(v) = self.visuals.get(&template.name) {
            return Ok(v.clone());
        }

        let visual = match &template.render {
            RenderRef::Scene { path } => {
                if path.is_empty() {
                    return Err(LevelError::template_unavailable(role, template.name.clone()));
                }
                Visual::Scene(self.asset_server.load(path.clone()))
            }
            RenderRef::MeshMaterial { mesh, material } => {
                if mesh.is_empty() {
                    return Err(LevelError::template_unavailable(role, template.name.clone()));
                }
                let mesh_h: Handle<Mesh> = self.asset_server.load(mesh.clone());
                let mat_h: Handle<StandardMaterial> = match material {
                    Some(path) => self.asset_server.load(path.clone()),
                    None => self.materials.add(StandardMaterial { base_color: Color::WHITE, ..default() }),
                };
                Visual::Mesh(mesh_h, mat_h)
            }
            RenderRef::Cuboid { color } => {
                let size = to_world(template.footprint().size());
                let mesh_h = self.meshes.add(Cuboid::new(size.x, size.y, size.z));
                let mat_h = self.materials.add(StandardMaterial {
                    base_color: Color::srgb(color[0], color[1], color[2]),
                    perceptual_roughness: 0.9,
                    ..default()
                });
                Visual::Mesh(mesh_h, mat_h)
            }
        };

        self.visuals.insert(template.name.clone(), visual.clone());
        Ok(visual)
    }

    fn spawn_visual(&mut self, visual: Visual, bundle: impl Bundle) -> Entity {
        let mut e = self.commands.spawn((bundle, Visibility::default(), ChildOf(self.root)));
        match visual {
            Visual::Scene(scene) => {
                e.insert(SceneRoot(scene));
            }
            Visual::Mesh(mesh, material) => {
                e.insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
        }
        e.id()
    }
}

impl SceneHost for BevySceneHost<'_, '_, '_> {
    type Instance = Entity;

    fn set_floor(&mut self, floor: &FloorSpec, template: &TemplateDef) -> Result<Entity, LevelError> {
        let visual = self.visual_for(template, TemplateRole::Floor)?;
        let transform = Transform::from_translation(floor_translation(floor, template))
            .with_scale(to_world(floor.scale));
        Ok(self.spawn_visual(
            visual,
            (LevelFloor, transform, Name::new(format!("Floor ({})", template.name))),
        ))
    }

    fn spawn(
        &mut self,
        template: &TemplateDef,
        kind: ElementKind,
        position: Vec3,
    ) -> Result<Entity, LevelError> {
        let visual = self.visual_for(template, kind.into())?;
        Ok(self.spawn_visual(
            visual,
            (
                LevelElement { kind },
                Transform::from_translation(to_world(position)),
                Name::new(format!(
                    "{} ({}) @ ({:.0},{:.0})",
                    kind.label(),
                    template.name,
                    position.x,
                    position.y
                )),
            ),
        ))
    }
}

/// Lighting folder under the level root: a sun angled down across the floor and
/// an unlit sky dome seen from inside.
pub fn spawn_level_lighting(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    root: Entity,
) -> Entity {
    let folder = commands
        .spawn((
            LightingFolder,
            Name::new("Lighting"),
            Transform::default(),
            Visibility::default(),
            ChildOf(root),
        ))
        .id();

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 10_000.0,
            ..default()
        },
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::new(-0.4, 0.0, -0.6), Vec3::Y),
        Name::new("Sun"),
        ChildOf(folder),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(SKY_RADIUS).mesh().uv(32, 18))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: SKY_COLOR,
            unlit: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
        NotShadowCaster,
        NotShadowReceiver,
        Name::new("Sky"),
        ChildOf(folder),
    ));

    folder
}
