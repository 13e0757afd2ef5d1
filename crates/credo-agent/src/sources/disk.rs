//! Disk usage for one mount point.

use async_trait::async_trait;
use credo_core::beliefs::collect_blocking;
use credo_core::{CredoError, CredoResult, ObservationSource};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Records `{"type": "disk_usage", "data": {total, used, free}}` for the
/// disk holding `path`.
pub struct DiskUsageSource {
    name: String,
    path: PathBuf,
}

impl DiskUsageSource {
    pub const DEFAULT_NAME: &'static str = "file_system";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            path: path.into(),
        }
    }
}

/// Index of the mount point that is the longest prefix of `path`.
fn best_mount<'a>(path: &Path, mounts: impl Iterator<Item = &'a Path>) -> Option<usize> {
    mounts
        .enumerate()
        .filter(|(_, mount)| path.starts_with(mount))
        .max_by_key(|(_, mount)| mount.components().count())
        .map(|(i, _)| i)
}

#[async_trait]
impl ObservationSource for DiskUsageSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> CredoResult<Vec<Value>> {
        let name = self.name.clone();
        let path = self.path.clone();
        collect_blocking(&self.name, move || read_usage(&name, &path)).await
    }
}

/// Query the mounted disks. Blocks on the filesystem.
fn read_usage(source_name: &str, path: &Path) -> CredoResult<Vec<Value>> {
    let disks = Disks::new_with_refreshed_list();
    let index = best_mount(path, disks.list().iter().map(|d| d.mount_point()))
        .ok_or_else(|| CredoError::source(source_name, format!("no disk mounted at {}", path.display())))?;
    let disk = &disks.list()[index];

    let total = disk.total_space();
    let free = disk.available_space();
    Ok(vec![json!({
        "type": "disk_usage",
        "data": {
            "total": total,
            "used": total.saturating_sub(free),
            "free": free,
        }
    })])
}
