use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use tracing::{debug, warn};

use crate::frame::FrameName;
use crate::result::Result;

/// Flat directory of uploaded frames. Nothing is cached in memory: every
/// query reads the directory, so the store always agrees with the disk.
pub struct FrameStore {
    dir: PathBuf,
    seq: AtomicU64,
}

/// Outcome of [`FrameStore::purge_frames`]. Failures are collected, never raised.
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub removed: usize,
    pub failed: Vec<(String, io::Error)>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl FrameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_working_directory(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create frames dir {}", self.dir.display()))
    }

    /// Validates `name` before touching the disk, then writes through a
    /// private temp file and renames it into place. A frames dir removed
    /// since startup is recreated.
    pub async fn store_frame(&self, name: &str, bytes: &[u8]) -> Result<FrameName> {
        let name = FrameName::parse(name)?;
        let path = self.dir.join(name.as_str());
        let tmp = self.tmp_path_for(&name);

        let written = match tokio::fs::write(&tmp, bytes).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("frames dir {} is gone, recreating it", self.dir.display());
                match tokio::fs::create_dir_all(&self.dir).await {
                    Ok(()) => tokio::fs::write(&tmp, bytes).await,
                    Err(e) => Err(e),
                }
            }
            written => written,
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to write frame {}", name))
                .into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to move frame {} into place", name))
                .into());
        }

        debug!("stored {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    pub async fn count_frames(&self) -> usize {
        self.frames().await.len()
    }

    /// Frame names currently on disk, in sequence order. A missing or
    /// unreadable directory yields an empty list.
    pub async fn frames(&self) -> Vec<FrameName> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("cannot list frames dir {}: {}", self.dir.display(), e);
                }
                return names;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let file_name = entry.file_name();
                    if let Some(name) = file_name.to_str()
                        && let Ok(name) = FrameName::parse(name)
                    {
                        names.push(name);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("error while listing {}: {}", self.dir.display(), e);
                    break;
                }
            }
        }

        names.sort_by_key(FrameName::index);
        names
    }

    /// Best effort: every frame is attempted even when some removals fail.
    pub async fn purge_frames(&self) -> PurgeReport {
        let mut report = PurgeReport::default();
        for name in self.frames().await {
            match tokio::fs::remove_file(self.dir.join(name.as_str())).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!("failed to remove {}: {}", name, e);
                    report.failed.push((name.to_string(), e));
                }
            }
        }
        debug!(
            "purged {} frames from {} ({} failed)",
            report.removed,
            self.dir.display(),
            report.failed.len()
        );
        report
    }

    fn tmp_path_for(&self, name: &FrameName) -> PathBuf {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}
