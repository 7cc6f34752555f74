// src/level/registry.rs
//! Data-driven level templates (floor, walls) + `.templates.ron` loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::core::{ElementKind, Footprint, Placeable};
use super::error::LevelError;

// ---------- Public plugin to register asset+loader ----------

pub struct LevelTemplatesAssetPlugin;

impl Plugin for LevelTemplatesAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<TemplateRegistry>()
            .register_asset_loader(TemplateRegistryLoader);
    }
}

// ---------- Roles ----------

/// Which slot of a level a template fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateRole {
    Floor,
    Wall,
    BreakableWall,
}

impl From<ElementKind> for TemplateRole {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Wall => Self::Wall,
            ElementKind::BreakableWall => Self::BreakableWall,
        }
    }
}

impl fmt::Display for TemplateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::BreakableWall => "breakable wall",
        })
    }
}

// ---------- Render refs (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RenderRef {
    /// glTF scene, e.g. `"models/wall.glb#Scene0"`.
    Scene { path: String },
    MeshMaterial { mesh: String, material: Option<String> },
    /// Plain box sized to the footprint.
    Cuboid {
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
}

fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

// ---------- Template definition (data form) ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Unique name (used for lookup).
    pub name: String,

    /// Bounding-box size (X, Y ground plane, Z height), unscaled.
    pub footprint: [f32; 3],

    pub render: RenderRef,
}

impl Placeable for TemplateDef {
    fn footprint(&self) -> Footprint {
        let [x, y, z] = self.footprint;
        Footprint::new(x, y, z)
    }
}

// ---------- Selection & defaults ----------

/// Template names picked for one run; `None` falls back to `TemplateDefaults`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateSelection {
    pub floor: Option<String>,
    pub wall: Option<String>,
    pub breakable_wall: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDefaults {
    pub floor: String,
    pub wall: String,
    pub breakable_wall: String,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            floor: "floor".to_string(),
            wall: "wall".to_string(),
            breakable_wall: "wall02".to_string(),
        }
    }
}

/// The three resolved templates of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateSet {
    pub floor: TemplateDef,
    pub wall: TemplateDef,
    pub breakable_wall: TemplateDef,
}

impl TemplateSet {
    pub fn for_kind(&self, kind: ElementKind) -> &TemplateDef {
        match kind {
            ElementKind::Wall => &self.wall,
            ElementKind::BreakableWall => &self.breakable_wall,
        }
    }
}

// ---------- Runtime registry asset ----------

#[derive(Asset, TypePath, Clone, Debug)]
pub struct TemplateRegistry {
    /// Ordered as in the manifest.
    pub templates: Vec<TemplateDef>,
    /// Name → index for quick lookups.
    pub name_to_index: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Validate names and footprints and index the definitions.
    pub fn from_defs(defs: Vec<TemplateDef>) -> Result<Self, TemplatesLoadError> {
        let mut name_to_index = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if !def.footprint().is_valid() {
                return Err(TemplatesLoadError::InvalidFootprint {
                    name: def.name.clone(),
                    footprint: def.footprint,
                });
            }
            if let Some(prev) = name_to_index.insert(def.name.clone(), i) {
                return Err(TemplatesLoadError::DuplicateName {
                    name: def.name.clone(),
                    first: prev,
                    second: i,
                });
            }
        }

        Ok(Self { templates: defs, name_to_index })
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, TemplatesLoadError> {
        let defs: Vec<TemplateDef> =
            ron::de::from_bytes(bytes).map_err(|e| TemplatesLoadError::Ron(e.to_string()))?;
        Self::from_defs(defs)
    }

    pub fn get(&self, name: &str) -> Option<&TemplateDef> {
        self.name_to_index.get(name).and_then(|&i| self.templates.get(i))
    }

    pub fn resolve(&self, role: TemplateRole, name: &str) -> Result<&TemplateDef, LevelError> {
        self.get(name)
            .ok_or_else(|| LevelError::template_unavailable(role, name))
    }

    /// Resolve all three roles, falling back to `defaults` for unselected slots.
    pub fn resolve_set(
        &self,
        selection: &TemplateSelection,
        defaults: &TemplateDefaults,
    ) -> Result<TemplateSet, LevelError> {
        let pick = |chosen: &Option<String>, fallback: &str| -> String {
            chosen.clone().unwrap_or_else(|| fallback.to_string())
        };

        let floor = pick(&selection.floor, &defaults.floor);
        let wall = pick(&selection.wall, &defaults.wall);
        let breakable = pick(&selection.breakable_wall, &defaults.breakable_wall);

        Ok(TemplateSet {
            floor: self.resolve(TemplateRole::Floor, &floor)?.clone(),
            wall: self.resolve(TemplateRole::Wall, &wall)?.clone(),
            breakable_wall: self.resolve(TemplateRole::BreakableWall, &breakable)?.clone(),
        })
    }
}

// ---------- Asset loader for `.templates.ron` ----------

#[derive(Default)]
pub struct TemplateRegistryLoader;

impl AssetLoader for TemplateRegistryLoader {
    type Asset = TemplateRegistry;
    type Settings = ();
    type Error = TemplatesLoadError;

    fn extensions(&self) -> &[&str] {
        &["templates.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        TemplateRegistry::from_ron_bytes(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum TemplatesLoadError {
    #[error("I/O while reading templates: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate template name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: usize, second: usize },
    #[error("Template '{name}' has an invalid footprint {footprint:?}")]
    InvalidFootprint { name: String, footprint: [f32; 3] },
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[
        (
            name: "floor",
            footprint: (1000.0, 1000.0, 10.0),
            render: Cuboid(color: (0.4, 0.4, 0.4)),
        ),
        (
            name: "wall",
            footprint: (100.0, 100.0, 300.0),
            render: Scene(path: "models/wall.glb#Scene0"),
        ),
        (
            name: "wall02",
            footprint: (100.0, 100.0, 200.0),
            render: Cuboid(),
        ),
        (
            name: "crate",
            footprint: (100.0, 100.0, 100.0),
            render: MeshMaterial(mesh: "models/crate.glb#Mesh0/Primitive0", material: None),
        ),
    ]"#;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_ron_bytes(MANIFEST.as_bytes()).unwrap()
    }

    #[test]
    fn parses_manifest() {
        let reg = registry();
        assert_eq!(reg.templates.len(), 4);
        let wall = reg.get("wall").unwrap();
        assert_eq!(wall.footprint().half_height(), 150.0);
        assert_eq!(
            wall.render,
            RenderRef::Scene { path: "models/wall.glb#Scene0".into() }
        );
        assert_eq!(
            reg.get("wall02").unwrap().render,
            RenderRef::Cuboid { color: default_color() }
        );
    }

    #[test]
    fn ships_a_parsable_default_manifest() {
        let bytes = include_bytes!("../../assets/levels/default.templates.ron");
        let reg = TemplateRegistry::from_ron_bytes(bytes).unwrap();
        let defaults = TemplateDefaults::default();
        assert!(reg.resolve_set(&TemplateSelection::default(), &defaults).is_ok());
    }

    #[test]
    fn rejects_duplicate_names() {
        let src = r#"[
            (name: "wall", footprint: (1.0, 1.0, 1.0), render: Cuboid(color: (0.0, 0.0, 0.0))),
            (name: "wall", footprint: (2.0, 2.0, 2.0), render: Cuboid(color: (0.0, 0.0, 0.0))),
        ]"#;
        let err = TemplateRegistry::from_ron_bytes(src.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TemplatesLoadError::DuplicateName { first: 0, second: 1, .. }
        ));
    }

    #[test]
    fn rejects_negative_footprints() {
        let src = r#"[(name: "bad", footprint: (100.0, -5.0, 1.0), render: Cuboid(color: (1.0, 1.0, 1.0)))]"#;
        let err = TemplateRegistry::from_ron_bytes(src.as_bytes()).unwrap_err();
        assert!(matches!(err, TemplatesLoadError::InvalidFootprint { .. }));
    }

    #[test]
    fn rejects_malformed_ron() {
        let err = TemplateRegistry::from_ron_bytes(b"[ (name: ").unwrap_err();
        assert!(matches!(err, TemplatesLoadError::Ron(_)));
    }

    #[test]
    fn unselected_roles_use_defaults() {
        let set = registry()
            .resolve_set(&TemplateSelection::default(), &TemplateDefaults::default())
            .unwrap();
        assert_eq!(set.floor.name, "floor");
        assert_eq!(set.for_kind(ElementKind::Wall).name, "wall");
        assert_eq!(set.for_kind(ElementKind::BreakableWall).name, "wall02");
    }

    #[test]
    fn selected_roles_override_defaults() {
        let selection = TemplateSelection {
            breakable_wall: Some("crate".into()),
            ..Default::default()
        };
        let set = registry()
            .resolve_set(&selection, &TemplateDefaults::default())
            .unwrap();
        assert_eq!(set.breakable_wall.name, "crate");
        assert_eq!(set.wall.name, "wall");
    }

    #[test]
    fn unknown_template_names_its_role() {
        let selection = TemplateSelection {
            wall: Some("missing".into()),
            ..Default::default()
        };
        let err = registry()
            .resolve_set(&selection, &TemplateDefaults::default())
            .unwrap_err();
        match err {
            LevelError::TemplateUnavailable { role, name } => {
                assert_eq!(role, TemplateRole::Wall);
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
