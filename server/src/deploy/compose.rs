//! Compose specification preprocessing
//!
//! The runtime CLI only reads specifications from a file, so every deployment
//! writes one into the scratch directory. Relative bind-mount sources are
//! anchored under the project's mount root first, because the scratch file's
//! own directory is not where the caller meant them to resolve.

use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::deploy::trace::DeploymentTrace;
use crate::errors::ServerError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::storage::layout::ScratchLayout;

/// A bind-mount source that was rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRewrite {
    pub service: String,
    pub original: String,
    pub anchored: PathBuf,
}

/// The on-disk specification of one in-flight deployment.
///
/// Dropping it without [`ScratchFile::release`] still removes the file, so
/// every exit path from a deployment cleans up.
#[derive(Debug)]
pub struct ScratchFile {
    file: File,
    dir: Dir,
    released: bool,
}

impl ScratchFile {
    fn new(file: File, dir: Dir) -> Self {
        Self {
            file,
            dir,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file, then the scratch directory if nothing else is in it.
    /// Failures are recorded in the trace and otherwise ignored.
    pub async fn release(mut self, trace: &mut DeploymentTrace) {
        self.released = true;
        trace.push("Cleaning up compose files...");

        if let Err(e) = self.file.delete().await {
            warn!("Failed to remove {}: {}", self.file.path().display(), e);
            trace.push(format!("Cleanup error: {}", e));
        }

        match self.dir.remove_if_empty().await {
            Ok(true) => debug!("Removed scratch directory {}", self.dir.path().display()),
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to remove {}: {}", self.dir.path().display(), e);
                trace.push(format!("Cleanup error: {}", e));
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.file.delete_blocking() {
            warn!("Failed to remove {}: {}", self.file.path().display(), e);
        }
        if let Err(e) = self.dir.remove_if_empty_blocking() {
            warn!("Failed to remove {}: {}", self.dir.path().display(), e);
        }
    }
}

/// Parse the specification text. No I/O happens before this succeeds.
pub fn parse_spec(raw: &str) -> Result<Value, ServerError> {
    serde_yaml::from_str(raw).map_err(|e| ServerError::InvalidSpec(e.to_string()))
}

/// Whether a mount source is relative to the specification's directory
pub fn is_relative_source(source: &str) -> bool {
    source == "." || source.starts_with("./") || source.starts_with("../")
}

/// Stands in for each `..` that would climb above the mount root
pub const PARENT_SEGMENT: &str = "__parent__";

/// Join `relative` under `root`. `..` never climbs above `root`: each level
/// that would escape becomes a [`PARENT_SEGMENT`] directory instead, so
/// `./shared` and `../shared` stay distinct.
pub fn anchor(root: &Path, relative: &str) -> Result<PathBuf, ServerError> {
    let mut escapes = 0usize;
    let mut segments = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) if part == PARENT_SEGMENT => {
                return Err(ServerError::InvalidSpec(format!(
                    "bind mount source '{}' uses the reserved segment '{}'",
                    relative, PARENT_SEGMENT
                )));
            }
            Component::Normal(part) => segments.push(part),
            Component::ParentDir => {
                if segments.pop().is_none() {
                    escapes += 1;
                }
            }
            _ => {}
        }
    }

    let mut anchored = root.to_path_buf();
    anchored.extend(std::iter::repeat(PARENT_SEGMENT).take(escapes));
    anchored.extend(segments);
    Ok(anchored)
}

/// Rewrite relative bind-mount sources of every service, in place.
///
/// Handles the short `src:dst[:mode]` and the long `{source: ..}` syntax.
/// Absolute paths and named volumes are left alone.
pub fn rewrite_bind_mounts(
    spec: &mut Value,
    mount_root: &Path,
) -> Result<Vec<MountRewrite>, ServerError> {
    let mut rewrites = Vec::new();

    let Some(services) = spec.get_mut("services").and_then(Value::as_mapping_mut) else {
        return Ok(rewrites);
    };

    for (name, service) in services.iter_mut() {
        let service_name = name.as_str().unwrap_or_default().to_string();
        let Some(volumes) = service
            .get_mut("volumes")
            .and_then(Value::as_sequence_mut)
        else {
            continue;
        };

        for volume in volumes.iter_mut() {
            let rewrite = match volume {
                Value::String(short) => rewrite_short(short, mount_root)?,
                Value::Mapping(long) => match long.get_mut("source") {
                    Some(Value::String(source)) => rewrite_source(source, mount_root)?,
                    _ => None,
                },
                _ => None,
            };

            if let Some((original, anchored)) = rewrite {
                rewrites.push(MountRewrite {
                    service: service_name.clone(),
                    original,
                    anchored,
                });
            }
        }
    }

    Ok(rewrites)
}

type Rewrite = Option<(String, PathBuf)>;

fn rewrite_short(volume: &mut String, mount_root: &Path) -> Result<Rewrite, ServerError> {
    let (source, rest) = match volume.split_once(':') {
        Some((source, rest)) => (source.to_string(), Some(rest.to_string())),
        None => (volume.clone(), None),
    };
    if !is_relative_source(&source) {
        return Ok(None);
    }

    let anchored = anchor(mount_root, &source)?;
    *volume = match rest {
        Some(rest) => format!("{}:{}", anchored.display(), rest),
        None => anchored.display().to_string(),
    };
    Ok(Some((source, anchored)))
}

fn rewrite_source(source: &mut String, mount_root: &Path) -> Result<Rewrite, ServerError> {
    if !is_relative_source(source) {
        return Ok(None);
    }
    let anchored = anchor(mount_root, source)?;
    let original = std::mem::replace(source, anchored.display().to_string());
    Ok(Some((original, anchored)))
}

/// Turn raw specification text into a durable scratch file for `project_name`.
pub async fn preprocess(
    raw: &str,
    project_name: &str,
    layout: &ScratchLayout,
    trace: &mut DeploymentTrace,
) -> Result<ScratchFile, ServerError> {
    trace.push("=== Original YAML ===");
    trace.push(raw.trim_end());

    let mut spec = parse_spec(raw)?;
    trace.push("YAML successfully parsed.");

    let mount_root = layout.mount_root(project_name);
    let rewrites = rewrite_bind_mounts(&mut spec, mount_root.path())?;
    for rewrite in &rewrites {
        debug!(
            "Anchoring bind mount {} of service {} at {}",
            rewrite.original,
            rewrite.service,
            rewrite.anchored.display()
        );
        fs::create_dir_all(&rewrite.anchored).await?;
        trace.push(format!(
            "Bind mount {} of service '{}' -> {}",
            rewrite.original,
            rewrite.service,
            rewrite.anchored.display()
        ));
    }

    let serialized =
        serde_yaml::to_string(&spec).map_err(|e| ServerError::InvalidSpec(e.to_string()))?;

    let scratch = ScratchFile::new(layout.compose_file(project_name), layout.compose_dir());
    trace.push(format!(
        "Writing compose file to {}...",
        scratch.path().display()
    ));
    if let Err(e) = scratch.file.write_durable(&serialized).await {
        scratch.release(trace).await;
        return Err(e);
    }
    info!("Wrote compose file {}", scratch.path().display());
    trace.push("Compose file written.");

    Ok(scratch)
}
