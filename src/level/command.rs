// src/level/command.rs
//! `newlevel <levelName> <imageRelativePath> [--floor N] [--wall N] [--breakable N]`

use super::error::LevelError;
use super::registry::TemplateSelection;
use super::request::GenerationRequest;

pub const NEWLEVEL: &str = "newlevel";

pub const USAGE: &str =
    "newlevel <levelName> <imageRelativePath> [--floor <template>] [--wall <template>] [--breakable <template>]";

/// Parse one console line.
pub fn parse_console_line(line: &str) -> Result<GenerationRequest, LevelError> {
    parse_command(line.split_whitespace())
}

/// Parse pre-split tokens, verb first.
pub fn parse_command<I, S>(tokens: I) -> Result<GenerationRequest, LevelError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<S> = tokens.into_iter().collect();
    let mut it = tokens.iter().map(AsRef::<str>::as_ref);

    match it.next() {
        Some(verb) if verb.eq_ignore_ascii_case(NEWLEVEL) => {}
        Some(other) => return Err(LevelError::Command(format!("unknown command '{other}'; usage: {USAGE}"))),
        None => return Err(LevelError::Command(format!("empty command; usage: {USAGE}"))),
    }

    let level_name = it
        .next()
        .ok_or_else(|| LevelError::Command(format!("missing level name; usage: {USAGE}")))?;
    let image_path = it
        .next()
        .ok_or_else(|| LevelError::Command(format!("missing image path; usage: {USAGE}")))?;

    let mut templates = TemplateSelection::default();
    while let Some(flag) = it.next() {
        let slot = match flag {
            "--floor" => &mut templates.floor,
            "--wall" => &mut templates.wall,
            "--breakable" => &mut templates.breakable_wall,
            other => {
                return Err(LevelError::Command(format!(
                    "unexpected argument '{other}'; usage: {USAGE}"
                )))
            }
        };
        let value = it
            .next()
            .ok_or_else(|| LevelError::Command(format!("{flag} needs a template name")))?;
        *slot = Some(value.to_string());
    }

    Ok(GenerationRequest::new(level_name, image_path).with_templates(templates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_basic_command() {
        let req = parse_console_line("newlevel Crypt levels/crypt.png").unwrap();
        assert_eq!(req.level_name, "Crypt");
        assert_eq!(req.image_path, PathBuf::from("levels/crypt.png"));
        assert_eq!(req.templates, TemplateSelection::default());
    }

    #[test]
    fn verb_is_case_insensitive() {
        assert!(parse_console_line("NewLevel A b.png").is_ok());
    }

    #[test]
    fn parses_template_overrides() {
        let req = parse_command(["newlevel", "A", "a.png", "--breakable", "crate", "--wall", "stone"]).unwrap();
        assert_eq!(req.templates.wall.as_deref(), Some("stone"));
        assert_eq!(req.templates.breakable_wall.as_deref(), Some("crate"));
        assert_eq!(req.templates.floor, None);
    }

    #[test]
    fn rejects_malformed_commands() {
        for line in [
            "",
            "spawn A a.png",
            "newlevel",
            "newlevel OnlyName",
            "newlevel A a.png extra",
            "newlevel A a.png --wall",
        ] {
            assert!(
                matches!(parse_console_line(line), Err(LevelError::Command(_))),
                "accepted {line:?}"
            );
        }
    }
}
