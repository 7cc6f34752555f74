use bevy::prelude::*;
use std::env;
use std::process::ExitCode;

use level_creator::level::command::{parse_command, USAGE};
use level_creator::level::{LevelCreatorPlugin, LevelCreatorSettings, LevelRequestQueue};
use level_creator::viewer::ViewerPlugin;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: level-creator {USAGE}");
        return ExitCode::FAILURE;
    }

    // Bad commands fail here, before any window or spawn.
    let request = match parse_command(&args) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut queue = LevelRequestQueue::default();
    queue.push(request);

    let exit = App::new()
        .add_plugins(DefaultPlugins)
        // level generation + templates
        .add_plugins(LevelCreatorPlugin)
        // camera, sky colour, ambient light
        .add_plugins(ViewerPlugin)
        .insert_resource(queue)
        // a failed `newlevel` ends the process with a failing status
        .insert_resource(LevelCreatorSettings { exit_on_failure: true, ..default() })
        .run();

    if exit.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
