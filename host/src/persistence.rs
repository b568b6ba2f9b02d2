//! Snapshot persistence: atomic save, lenient load.
//!
//! ERROR HANDLING
//! ==============
//! Save is strict and atomic: the snapshot is written to a sibling temp file
//! and renamed into place so a crash mid-write never corrupts the previous
//! save. Load is deliberately forgiving past the I/O boundary: a missing
//! file yields `None` (fresh session), and a file that parses hands repair
//! of its contents to [`MapSnapshot::into_world`].

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::path::Path;

use tracing::{info, warn};

use intents::snapshot::MapSnapshot;
use tabletop::fog::FogOfWar;
use tabletop::world::WorldModel;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write the session's snapshot atomically.
///
/// # Errors
///
/// Returns [`PersistError`] when serialization or any filesystem step fails;
/// the previous snapshot file is left untouched in that case.
pub async fn save_snapshot(
    path: &Path,
    world: &WorldModel,
    fog: &FogOfWar,
) -> Result<(), PersistError> {
    let snapshot = MapSnapshot::from_world(world, fog);
    let json = serde_json::to_vec_pretty(&snapshot)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;

    info!(path = %path.display(), tokens = snapshot.tokens.len(), "snapshot saved");
    Ok(())
}

/// Load a session from disk.
///
/// Returns `Ok(None)` when no snapshot exists yet. Unreadable JSON is an
/// error at this boundary; everything inside a parsed snapshot is repaired
/// rather than rejected.
///
/// # Errors
///
/// Returns [`PersistError`] for I/O failures other than a missing file and
/// for files that are not valid JSON.
pub async fn load_snapshot(path: &Path) -> Result<Option<(WorldModel, FogOfWar)>, PersistError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot on disk; starting fresh");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: MapSnapshot = serde_json::from_slice(&bytes)?;
    let (world, fog) = snapshot.into_world();
    info!(
        path = %path.display(),
        tokens = world.tokens().count(),
        explored = fog.explored().len(),
        "snapshot loaded"
    );
    Ok(Some((world, fog)))
}

/// Flush a session if dirty. Logs and reports failure; the caller decides
/// whether to retain the session for retry.
pub async fn flush_if_dirty(
    path: &Path,
    world: &WorldModel,
    fog: &FogOfWar,
    dirty: bool,
) -> bool {
    if !dirty {
        return true;
    }
    match save_snapshot(path, world, fog).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "snapshot flush failed");
            false
        }
    }
}
