//! Level creator plugin wiring (glue).
//! - Template registry asset/loader
//! - Settings + request queue + session name catalog
//! - Request processing once templates are ready

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use super::components::Level;
use super::core::{FloorSpec, Placeable, ScanStats};
use super::error::LevelError;
use super::naming::{ensure_unique_name, level_name_or_random};
use super::registry::{LevelTemplatesAssetPlugin, TemplateDefaults, TemplateRegistry};
use super::request::GenerationRequest;
use super::runner::run_generation;
use super::sampler::LevelImage;
use super::spawn::{spawn_level_lighting, BevySceneHost};

/// Where templates and level images live.
#[derive(Resource, Clone)]
pub struct LevelCreatorSettings {
    /// Asset path of the templates manifest.
    pub templates_path: String,
    /// On-disk root that request image paths are relative to.
    pub assets_root: PathBuf,
    /// Used for roles a request leaves unselected.
    pub defaults: TemplateDefaults,
    /// Send `AppExit::error()` when a request fails (set by the CLI).
    pub exit_on_failure: bool,
}

impl Default for LevelCreatorSettings {
    fn default() -> Self {
        Self {
            templates_path: "levels/default.templates.ron".to_string(),
            assets_root: PathBuf::from("assets"),
            defaults: TemplateDefaults::default(),
            exit_on_failure: false,
        }
    }
}

/// Handle to the loaded TemplateRegistry asset.
#[derive(Resource, Default)]
pub struct LevelTemplatesHandle(pub Handle<TemplateRegistry>);

/// Requests waiting for the registry; drained front to back.
#[derive(Resource, Default)]
pub struct LevelRequestQueue {
    pub items: VecDeque<GenerationRequest>,
}

impl LevelRequestQueue {
    pub fn push(&mut self, request: GenerationRequest) {
        self.items.push_back(request);
    }
}

/// Names of levels generated this session.
#[derive(Resource, Default)]
pub struct LevelCatalog {
    names: HashSet<String>,
}

impl LevelCatalog {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }
}

/// Fired after a level has been spawned.
#[derive(Event, Clone, Debug)]
pub struct LevelGenerated {
    pub root: Entity,
    pub name: String,
    pub floor: FloorSpec,
    /// Ground-plane size of the floor, layout units.
    pub floor_size: Vec2,
    pub stats: ScanStats,
}

/// Fired for every request that produced no level.
#[derive(Event, Clone, Debug)]
pub struct LevelGenerationFailed {
    pub name: String,
    pub image_path: PathBuf,
    pub reason: String,
}

impl LevelGenerationFailed {
    fn new(request: &GenerationRequest, reason: impl ToString) -> Self {
        Self {
            name: request.level_name.clone(),
            image_path: request.image_path.clone(),
            reason: reason.to_string(),
        }
    }
}

pub struct LevelCreatorPlugin;

impl Plugin for LevelCreatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(LevelTemplatesAssetPlugin)
            .init_resource::<LevelCreatorSettings>()
            .init_resource::<LevelTemplatesHandle>()
            .init_resource::<LevelRequestQueue>()
            .init_resource::<LevelCatalog>()
            .add_event::<LevelGenerated>()
            .add_event::<LevelGenerationFailed>()
            .add_systems(Startup, load_templates)
            .add_systems(Update, monitor_templates)
            .add_systems(Update, process_level_requests.run_if(templates_ready))
            .add_systems(Update, reject_level_requests.run_if(templates_failed))
            .add_systems(
                Update,
                exit_on_generation_failure
                    .run_if(|s: Res<LevelCreatorSettings>| s.exit_on_failure)
                    .after(process_level_requests)
                    .after(reject_level_requests),
            );
    }
}

/// Startup: request loading the templates manifest, store handle.
fn load_templates(
    mut handle_res: ResMut<LevelTemplatesHandle>,
    settings: Res<LevelCreatorSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    handle_res.0 = assets.load(settings.templates_path.as_str());
    info!("Levels: loading templates from '{}'", settings.templates_path);
}

/// Update: log once when the registry becomes available (or fails to load).
fn monitor_templates(
    handle_res: Res<LevelTemplatesHandle>,
    registries: Res<Assets<TemplateRegistry>>,
    assets: Res<AssetServer>,
    mut logged: Local<bool>,
) {
    if *logged { return; }
    if let Some(reg) = registries.get(&handle_res.0) {
        *logged = true;
        info!("Levels: {} templates loaded and ready", reg.templates.len());
    } else if let Some(LoadState::Failed(err)) = assets.get_load_state(&handle_res.0) {
        *logged = true;
        error!("Levels: templates failed to load: {}", err);
    }
}

fn templates_ready(
    handle: Res<LevelTemplatesHandle>,
    regs: Res<Assets<TemplateRegistry>>,
) -> bool {
    regs.get(&handle.0).is_some()
}

fn templates_failed(handle: Res<LevelTemplatesHandle>, assets: Res<AssetServer>) -> bool {
    matches!(assets.get_load_state(&handle.0), Some(LoadState::Failed(_)))
}

/// Update: no registry will ever arrive, so every queued request fails.
fn reject_level_requests(
    mut queue: ResMut<LevelRequestQueue>,
    settings: Res<LevelCreatorSettings>,
    mut failed: EventWriter<LevelGenerationFailed>,
) {
    for request in queue.items.drain(..) {
        error!(
            "Levels: '{}' not generated: templates '{}' failed to load",
            request.level_name, settings.templates_path
        );
        failed.write(LevelGenerationFailed::new(&request, "templates unavailable"));
    }
}

fn exit_on_generation_failure(
    mut failed: EventReader<LevelGenerationFailed>,
    mut exit: EventWriter<AppExit>,
) {
    if failed.read().count() > 0 {
        exit.write(AppExit::error());
    }
}

/// Update: run every queued request against the loaded registry.
#[allow(clippy::too_many_arguments)]
fn process_level_requests(
    mut commands: Commands,
    mut queue: ResMut<LevelRequestQueue>,
    mut catalog: ResMut<LevelCatalog>,
    settings: Res<LevelCreatorSettings>,
    handle: Res<LevelTemplatesHandle>,
    registries: Res<Assets<TemplateRegistry>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut generated: EventWriter<LevelGenerated>,
    mut failed: EventWriter<LevelGenerationFailed>,
) {
    let Some(registry) = registries.get(&handle.0) else { return };

    while let Some(request) = queue.items.pop_front() {
        let result = build_level(
            &request,
            registry,
            &settings,
            &catalog,
            &mut commands,
            &asset_server,
            &mut meshes,
            &mut materials,
        );
        match result {
            Ok(ev) => {
                info!(
                    "Levels: '{}' generated from {} ({} walls, {} breakable walls)",
                    ev.name,
                    request.image_path.display(),
                    ev.stats.walls,
                    ev.stats.breakable_walls
                );
                catalog.insert(ev.name.clone());
                generated.write(ev);
            }
            Err(err) => {
                error!("Levels: '{}' not generated: {}", request.level_name, err);
                failed.write(LevelGenerationFailed::new(&request, err));
            }
        }
    }
}

/// One request end to end. Templates and image are resolved before anything is
/// spawned; a failure during the scan despawns the partial level.
#[allow(clippy::too_many_arguments)]
fn build_level(
    request: &GenerationRequest,
    registry: &TemplateRegistry,
    settings: &LevelCreatorSettings,
    catalog: &LevelCatalog,
    commands: &mut Commands,
    asset_server: &AssetServer,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Result<LevelGenerated, LevelError> {
    let candidate = level_name_or_random(&request.level_name);
    let name = ensure_unique_name(&candidate, |n| catalog.contains(n)).name;

    let templates = registry.resolve_set(&request.templates, &settings.defaults)?;
    let image = LevelImage::open(settings.assets_root.join(&request.image_path))?;

    let root = commands
        .spawn((
            Level { name: name.clone() },
            Name::new(name.clone()),
            Transform::default(),
            Visibility::default(),
        ))
        .id();
    spawn_level_lighting(commands, meshes, materials, root);

    let result = {
        let mut host = BevySceneHost::new(commands, asset_server, meshes, materials, root);
        run_generation(&image, &templates, &mut host)
    };
    match result {
        Ok(report) => Ok(LevelGenerated {
            root,
            name,
            floor: report.floor,
            floor_size: report.floor.world_size(templates.floor.footprint()),
            stats: report.stats,
        }),
        Err(err) => {
            commands.entity(root).despawn();
            Err(err)
        }
    }
}
