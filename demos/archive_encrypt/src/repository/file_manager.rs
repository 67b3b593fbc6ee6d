//! Filesystem operations the archive-encrypt pipeline performs, each one
//! bound through `backup_machines::core::Binder` so a node body never
//! touches `std::fs` directly.

use std::path::{Path, PathBuf};

use backup_machines::core::{Logger, RepositoryAdapter};

pub struct EnsureDirectory {
    pub path: PathBuf,
}

impl RepositoryAdapter for EnsureDirectory {
    type Output = ();
    type Error = std::io::Error;

    fn execute(&mut self, logger: &dyn Logger) -> Result<(), std::io::Error> {
        logger.debug(&format!("make_dir_if_not_exists {}", self.path.display()));
        std::fs::create_dir_all(&self.path)
    }
}

pub struct CopyFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RepositoryAdapter for CopyFile {
    type Output = ();
    type Error = std::io::Error;

    fn execute(&mut self, logger: &dyn Logger) -> Result<(), std::io::Error> {
        logger.debug(&format!(
            "copy {} -> {}",
            self.from.display(),
            self.to.display()
        ));
        std::fs::copy(&self.from, &self.to).map(|_| ())
    }
}

pub struct MoveFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RepositoryAdapter for MoveFile {
    type Output = ();
    type Error = std::io::Error;

    fn execute(&mut self, logger: &dyn Logger) -> Result<(), std::io::Error> {
        logger.debug(&format!(
            "move {} -> {}",
            self.from.display(),
            self.to.display()
        ));
        std::fs::rename(&self.from, &self.to)
    }
}

pub struct RemoveFileIfExists {
    pub path: PathBuf,
}

impl RepositoryAdapter for RemoveFileIfExists {
    type Output = ();
    type Error = std::io::Error;

    fn execute(&mut self, logger: &dyn Logger) -> Result<(), std::io::Error> {
        logger.debug(&format!("remove_file_if_exists {}", self.path.display()));
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

pub fn staged_path(staging_folder: &Path, source_path: &Path) -> PathBuf {
    let file_name = source_path
        .file_name()
        .expect("source_path must name a file");
    staging_folder.join(file_name)
}
