//! Encryption, shelling out to the system `gpg` binary rather than binding
//! an FFI crate. One subprocess call is the whole observable side effect
//! of the `encrypt_file` node.

use std::path::PathBuf;
use std::process::Command;

use backup_machines::core::{Logger, RepositoryAdapter};

#[derive(Debug, thiserror::Error)]
pub enum GpgError {
    #[error("failed to launch gpg: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("gpg exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },
}

pub struct EncryptFile {
    pub key_name: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

impl RepositoryAdapter for EncryptFile {
    type Output = ();
    type Error = GpgError;

    fn execute(&mut self, logger: &dyn Logger) -> Result<(), GpgError> {
        logger.debug(&format!(
            "gpg encrypt {} -> {} (recipient {})",
            self.from.display(),
            self.to.display(),
            self.key_name
        ));

        let output = Command::new("gpg")
            .arg("--batch")
            .arg("--yes")
            .arg("--recipient")
            .arg(&self.key_name)
            .arg("--output")
            .arg(&self.to)
            .arg("--encrypt")
            .arg(&self.from)
            .output()
            .map_err(GpgError::Spawn)?;

        if !output.status.success() {
            return Err(GpgError::NonZeroExit {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}
