//! Scratch storage layout

use std::path::PathBuf;

use crate::errors::ServerError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Directory holding in-flight compose files
pub const COMPOSE_DIR_NAME: &str = "docker_compose_files";

/// Directory holding host directories for relative bind mounts
pub const VOLUMES_DIR_NAME: &str = "docker_compose_volumes";

/// Storage layout for deployment scratch files
#[derive(Debug, Clone)]
pub struct ScratchLayout {
    /// Base directory for all scratch storage
    pub base_dir: PathBuf,
}

impl ScratchLayout {
    /// Create a new scratch layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Layout rooted at the process working directory
    pub fn from_current_dir() -> Result<Self, ServerError> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Get the compose scratch directory
    pub fn compose_dir(&self) -> Dir {
        Dir::new(self.base_dir.join(COMPOSE_DIR_NAME))
    }

    /// Get the scratch compose file for a project
    pub fn compose_file(&self, project_name: &str) -> File {
        self.compose_dir()
            .file(&format!("{}-docker-compose.yml", project_name))
    }

    /// Get the bind-mount volumes directory
    pub fn volumes_dir(&self) -> Dir {
        Dir::new(self.base_dir.join(VOLUMES_DIR_NAME))
    }

    /// Get the root under which a project's relative bind mounts are anchored
    pub fn mount_root(&self, project_name: &str) -> Dir {
        self.volumes_dir().subdir(project_name)
    }
}
