// src/level/runner.rs
use bevy::prelude::*;

use super::core::{FloorSpec, Placeable, ScanStats};
use super::error::LevelError;
use super::generator::{scan, LayoutParams};
use super::host::SceneHost;
use super::registry::TemplateSet;
use super::sampler::{LevelImage, SampledImage};

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    pub floor: FloorSpec,
    pub stats: ScanStats,
}

/// Lock the image, place the floor, then stream every placement into `host`.
///
/// The image is unlocked when this returns, whichever way. A host error aborts the
/// scan; elements spawned before it are left to the host to clean up.
pub fn run_generation<H: SceneHost>(
    image: &LevelImage,
    templates: &TemplateSet,
    host: &mut H,
) -> Result<RunReport, LevelError> {
    let sampled = SampledImage::open(image)?;

    let floor = FloorSpec::for_image(sampled.width(), sampled.height());
    host.set_floor(&floor, &templates.floor)?;

    let params = LayoutParams::new(
        floor.world_size(templates.floor.footprint()),
        &templates.wall,
        &templates.breakable_wall,
    );

    let stats = scan(&sampled, &params, |p| {
        host.spawn(templates.for_kind(p.kind), p.kind, p.position).map(|_| ())
    })?;

    debug!(
        "{}: placed {} walls ({} solid, {} breakable) on a {:?} floor",
        image.source().display(),
        stats.placed(),
        stats.walls,
        stats.breakable_walls,
        floor.scale
    );

    Ok(RunReport { floor, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::core::{ElementKind, PixelColor};
    use crate::level::generator::generate;
    use crate::level::host::{HostRecord, RecordingHost};
    use crate::level::registry::{RenderRef, TemplateDef, TemplateRole};
    use image::{Rgba, RgbaImage};

    fn template(name: &str, footprint: [f32; 3]) -> TemplateDef {
        TemplateDef {
            name: name.into(),
            footprint,
            render: RenderRef::Cuboid { color: [1.0, 1.0, 1.0] },
        }
    }

    fn templates() -> TemplateSet {
        TemplateSet {
            floor: template("floor", [1000.0, 1000.0, 10.0]),
            wall: template("wall", [100.0, 100.0, 300.0]),
            breakable_wall: template("wall02", [100.0, 100.0, 200.0]),
        }
    }

    fn maze() -> LevelImage {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            let c = match (x + 2 * y) % 3 {
                0 => PixelColor::BLACK,
                1 => PixelColor::RED,
                _ => PixelColor::WHITE,
            };
            Rgba::from(c)
        });
        LevelImage::from_rgba("maze.png", img)
    }

    /// Host that refuses the n-th spawn.
    struct FailingHost {
        inner: RecordingHost,
        fail_at: usize,
    }

    impl SceneHost for FailingHost {
        type Instance = usize;

        fn set_floor(&mut self, floor: &FloorSpec, template: &TemplateDef) -> Result<usize, LevelError> {
            self.inner.set_floor(floor, template)
        }

        fn spawn(&mut self, template: &TemplateDef, kind: ElementKind, position: Vec3) -> Result<usize, LevelError> {
            if self.inner.spawned().count() + 1 == self.fail_at {
                return Err(LevelError::template_unavailable(kind.into(), template.name.clone()));
            }
            self.inner.spawn(template, kind, position)
        }
    }

    #[test]
    fn floor_first_then_placements_in_scan_order() {
        let image = maze();
        let set = templates();
        let mut host = RecordingHost::default();

        let report = run_generation(&image, &set, &mut host).unwrap();

        assert_eq!(host.floors(), 1);
        assert_eq!(
            host.records[0],
            HostRecord::Floor {
                template: "floor".into(),
                position: Vec3::ZERO,
                scale: Vec3::new(0.4, 0.3, 1.0),
            }
        );

        let expected = {
            let sampled = SampledImage::open(&image).unwrap();
            generate(&sampled, Vec2::new(400.0, 300.0), &set.wall, &set.breakable_wall)
        };
        let spawned: Vec<_> = host.spawned().collect();
        let from_layout: Vec<_> = expected.placements.iter().map(|p| (p.kind, p.position)).collect();
        assert_eq!(spawned, from_layout);
        assert_eq!(report.stats, expected.stats);
    }

    #[test]
    fn spawns_use_the_template_for_each_kind() {
        let image = maze();
        let mut host = RecordingHost::default();
        run_generation(&image, &templates(), &mut host).unwrap();

        for record in &host.records[1..] {
            let HostRecord::Spawn { template, kind, position } = record else {
                panic!("second floor record");
            };
            match kind {
                ElementKind::Wall => {
                    assert_eq!(template, "wall");
                    assert_eq!(position.z, 150.0);
                }
                ElementKind::BreakableWall => {
                    assert_eq!(template, "wall02");
                    assert_eq!(position.z, 100.0);
                }
            }
        }
    }

    #[test]
    fn image_is_released_after_success() {
        let image = maze();
        run_generation(&image, &templates(), &mut RecordingHost::default()).unwrap();
        assert!(!image.is_locked());
        assert_eq!(image.lock_count(), 1);
    }

    #[test]
    fn image_is_released_after_mid_scan_failure() {
        let image = maze();
        let mut host = FailingHost { inner: RecordingHost::default(), fail_at: 3 };

        let err = run_generation(&image, &templates(), &mut host).unwrap_err();

        assert!(matches!(err, LevelError::TemplateUnavailable { .. }));
        assert_eq!(host.inner.spawned().count(), 2);
        assert!(!image.is_locked());
        assert_eq!(image.lock_count(), 1);
    }

    #[test]
    fn failure_reports_the_role_of_the_refused_template() {
        let image = LevelImage::from_rgba("red.png", RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])));
        let mut host = FailingHost { inner: RecordingHost::default(), fail_at: 1 };

        match run_generation(&image, &templates(), &mut host).unwrap_err() {
            LevelError::TemplateUnavailable { role, name } => {
                assert_eq!(role, TemplateRole::BreakableWall);
                assert_eq!(name, "wall02");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shipped_demo_level_generates() {
        use crate::level::registry::{TemplateDefaults, TemplateRegistry, TemplateSelection};

        let manifest = include_bytes!("../../assets/levels/default.templates.ron");
        let set = TemplateRegistry::from_ron_bytes(manifest)
            .unwrap()
            .resolve_set(&TemplateSelection::default(), &TemplateDefaults::default())
            .unwrap();
        let image = LevelImage::open(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/levels/demo.png")).unwrap();
        let mut host = RecordingHost::default();

        let report = run_generation(&image, &set, &mut host).unwrap();

        assert_eq!(report.floor.scale, Vec3::new(1.2, 0.8, 1.0));
        assert_eq!(report.stats.walls, 46);
        assert_eq!(report.stats.breakable_walls, 3);
        assert_eq!(report.stats.unclassified, 0);
        assert_eq!(host.spawned().count(), 49);
    }

    #[test]
    fn locked_image_aborts_before_any_spawn() {
        let image = maze();
        let _held = SampledImage::open(&image).unwrap();
        let mut host = RecordingHost::default();

        let err = run_generation(&image, &templates(), &mut host).unwrap_err();

        assert!(matches!(err, LevelError::ImageUnavailable { .. }));
        assert!(host.records.is_empty());
        assert_eq!(image.lock_count(), 1);
    }
}
