//! Snapshot export
//!
//! Writes the final market state as pretty-printed JSON for external
//! reporting tools.

use market_events::MarketSnapshot;
use std::fs;
use std::io;
use std::path::Path;

/// Write `snapshot` to `path`, creating parent directories as needed
pub fn write_snapshot(snapshot: &MarketSnapshot, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = snapshot.to_json()?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), agents = snapshot.agents.len(), "wrote snapshot");
    Ok(())
}

/// Read a snapshot previously written by [`write_snapshot`]
pub fn read_snapshot(path: impl AsRef<Path>) -> io::Result<MarketSnapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
