// src/level/naming.rs
//! Level-name policy.
//!
//! A taken name is renamed once with a timestamp suffix and not re-checked, so two
//! runs picking the same name within one clock tick can still collide.

use bevy::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of the uniqueness check. `collided` holds the original candidate when it
/// was already taken (non-fatal).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueName {
    pub name: String,
    pub collided: Option<String>,
}

/// Nanoseconds since the Unix epoch; 0 if the clock is before it.
pub fn timestamp_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// Spaces are not allowed in level names; each becomes `_`.
pub fn sanitize_level_name(raw: &str) -> String {
    raw.replace(' ', "_")
}

pub fn random_level_name() -> String {
    format!("Level_{}", timestamp_suffix())
}

/// Sanitized `raw`, or a generated `Level_<timestamp>` when it is empty.
pub fn level_name_or_random(raw: &str) -> String {
    if raw.is_empty() {
        random_level_name()
    } else {
        sanitize_level_name(raw)
    }
}

pub fn ensure_unique_name(candidate: &str, is_taken: impl Fn(&str) -> bool) -> UniqueName {
    ensure_unique_name_with(candidate, is_taken, timestamp_suffix)
}

/// Single check: `candidate` if free, else `candidate_<suffix()>`.
pub fn ensure_unique_name_with(
    candidate: &str,
    is_taken: impl Fn(&str) -> bool,
    suffix: impl FnOnce() -> u128,
) -> UniqueName {
    if !is_taken(candidate) {
        return UniqueName { name: candidate.to_string(), collided: None };
    }

    let name = format!("{}_{}", candidate, suffix());
    warn!("Level name '{}' already exists, renamed to '{}'", candidate, name);
    UniqueName { name, collided: Some(candidate.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn free_names_pass_through() {
        let out = ensure_unique_name("Dungeon", |_| false);
        assert_eq!(out, UniqueName { name: "Dungeon".into(), collided: None });
    }

    #[test]
    fn taken_names_get_one_suffix() {
        let taken: HashSet<&str> = ["Dungeon"].into_iter().collect();
        let out = ensure_unique_name_with("Dungeon", |n| taken.contains(n), || 42);
        assert_eq!(out.name, "Dungeon_42");
        assert_eq!(out.collided.as_deref(), Some("Dungeon"));
    }

    #[test]
    fn renamed_candidate_is_not_rechecked() {
        let out = ensure_unique_name_with("A", |_| true, || 7);
        assert_eq!(out.name, "A_7");
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(sanitize_level_name("my first  level"), "my_first__level");
        assert_eq!(level_name_or_random("ice cave"), "ice_cave");
    }

    #[test]
    fn empty_names_are_generated() {
        let name = level_name_or_random("");
        let digits = name.strip_prefix("Level_").unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
