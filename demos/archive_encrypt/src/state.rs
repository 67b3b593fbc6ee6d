//! The fixed parameters of one archive-encrypt run.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ArchiveEncryptState {
    pub source_path: PathBuf,
    pub staging_folder: PathBuf,
    pub archive_folder: PathBuf,
    pub gpg_key_name: String,
}
