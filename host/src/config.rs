//! Host configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_MAP_PATH: &str = "maps/session.json";
pub const DEFAULT_AUTOSAVE: bool = true;

/// Runtime configuration for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Where the map snapshot is read on hydration and written on flush.
    pub map_path: PathBuf,
    /// Whether dirty sessions are flushed to disk when the last client
    /// leaves. Disabled in throwaway sessions.
    pub autosave: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { map_path: PathBuf::from(DEFAULT_MAP_PATH), autosave: DEFAULT_AUTOSAVE }
    }
}

impl HostConfig {
    /// Build config from environment variables, loading `.env` first.
    ///
    /// Optional:
    /// - `MAPTABLE_MAP_PATH`: snapshot file path (default `maps/session.json`)
    /// - `MAPTABLE_AUTOSAVE`: `true`/`false`/`1`/`0` (default `true`)
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            map_path: parse_map_path(std::env::var("MAPTABLE_MAP_PATH").ok().as_deref()),
            autosave: parse_bool(std::env::var("MAPTABLE_AUTOSAVE").ok().as_deref(), DEFAULT_AUTOSAVE),
        }
    }
}

fn parse_map_path(raw: Option<&str>) -> PathBuf {
    match raw {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
        _ => PathBuf::from(DEFAULT_MAP_PATH),
    }
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim) {
        Some("true" | "1" | "yes") => true,
        Some("false" | "0" | "no") => false,
        _ => default,
    }
}
