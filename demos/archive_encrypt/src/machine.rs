//! Archives a file by staging it, encrypting it with GPG, and moving the
//! encrypted copy into an archive folder, with matching rollback nodes for
//! every failure point.

use backup_machines::prelude::*;

use crate::repository::file_manager::{staged_path, CopyFile, EnsureDirectory, MoveFile, RemoveFileIfExists};
use crate::repository::gpg::EncryptFile;
use crate::state::ArchiveEncryptState;

pub struct ArchiveEncrypt {
    runtime: Runtime,
    failure_prefix: String,
    logger: Box<dyn Logger>,
    state: ArchiveEncryptState,
}

impl ArchiveEncrypt {
    pub fn new(state: ArchiveEncryptState, logger: Box<dyn Logger>) -> Self {
        let failure_prefix = format!("[archive_encrypt:{}]", state.source_path.display());
        Self {
            runtime: Runtime::new(),
            failure_prefix,
            logger,
            state,
        }
    }

    pub fn state(&self) -> &ArchiveEncryptState {
        &self.state
    }

    fn binder(&self) -> Binder<'_> {
        Binder::new(self.logger.as_ref())
    }

    fn encrypted_file_name(&self) -> String {
        let source_name = self
            .state
            .source_path
            .file_name()
            .expect("source_path must name a file")
            .to_string_lossy()
            .into_owned();
        format!("{source_name}.gpg")
    }
}

impl Machine for ArchiveEncrypt {
    fn type_name() -> &'static str {
        Self::TYPE_NAME
    }

    fn metadata() -> &'static MachineMetadata<Self> {
        Self::metadata()
    }

    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    fn failure_prefix(&self) -> &str {
        &self.failure_prefix
    }

    fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}

#[machine(overview = "Archives a file by copying it to a staging folder, encrypting it with GPG, and moving the encrypted file to an archive folder.")]
impl ArchiveEncrypt {
    #[node(
        overview = "Ensures the staging directory exists.",
        is_entry,
        happy_paths(copy_to_staging),
        unhappy_paths(report_results)
    )]
    #[handle_exceptions(on_exception = report_results)]
    fn ensure_staging(&mut self) -> NodeOutcome {
        self.binder()
            .bind(EnsureDirectory {
                path: self.state.staging_folder.clone(),
            })
            .execute()?;
        Ok(self.success("copy_to_staging"))
    }

    #[node(
        overview = "Copies the source file to the staging folder.",
        happy_paths(encrypt_file),
        unhappy_paths(remove_copied_file)
    )]
    #[handle_exceptions(on_exception = remove_copied_file)]
    fn copy_to_staging(&mut self) -> NodeOutcome {
        let to = staged_path(&self.state.staging_folder, &self.state.source_path);
        self.binder()
            .bind(CopyFile {
                from: self.state.source_path.clone(),
                to,
            })
            .execute()?;
        Ok(self.success("encrypt_file"))
    }

    #[node(
        overview = "Encrypts the staged file with GPG.",
        happy_paths(ensure_archive),
        unhappy_paths(remove_copied_file)
    )]
    #[handle_exceptions(on_exception = remove_copied_file)]
    fn encrypt_file(&mut self) -> NodeOutcome {
        let staged = staged_path(&self.state.staging_folder, &self.state.source_path);
        let encrypted = self.state.staging_folder.join(self.encrypted_file_name());
        self.binder()
            .bind(EncryptFile {
                key_name: self.state.gpg_key_name.clone(),
                from: staged,
                to: encrypted,
            })
            .execute()?;
        Ok(self.success("ensure_archive"))
    }

    #[node(
        overview = "Ensures the archive directory exists.",
        happy_paths(move_to_archive),
        unhappy_paths(remove_encrypted_file)
    )]
    #[handle_exceptions(on_exception = remove_encrypted_file)]
    fn ensure_archive(&mut self) -> NodeOutcome {
        self.binder()
            .bind(EnsureDirectory {
                path: self.state.archive_folder.clone(),
            })
            .execute()?;
        Ok(self.success("move_to_archive"))
    }

    #[node(
        overview = "Moves the encrypted file from staging to the archive folder.",
        happy_paths(report_results),
        unhappy_paths(remove_encrypted_file)
    )]
    #[handle_exceptions(on_exception = remove_encrypted_file)]
    fn move_to_archive(&mut self) -> NodeOutcome {
        let encrypted_name = self.encrypted_file_name();
        let from = self.state.staging_folder.join(&encrypted_name);
        let to = self.state.archive_folder.join(&encrypted_name);
        self.binder().bind(MoveFile { from, to }).execute()?;
        Ok(self.success("report_results"))
    }

    #[node(
        overview = "Rolls back the encrypted file, from staging and (if already moved) from the archive folder.",
        happy_paths(remove_copied_file),
        unhappy_paths(remove_copied_file)
    )]
    #[handle_exceptions(on_exception = remove_copied_file)]
    fn remove_encrypted_file(&mut self) -> NodeOutcome {
        let encrypted_name = self.encrypted_file_name();
        let staged = self.state.staging_folder.join(&encrypted_name);
        let archived = self.state.archive_folder.join(&encrypted_name);

        self.binder()
            .bind(RemoveFileIfExists { path: staged })
            .execute()?;
        self.binder()
            .bind(RemoveFileIfExists { path: archived })
            .execute()?;
        Ok(self.success("remove_copied_file"))
    }

    #[node(
        overview = "Rolls back the copied file from the staging folder.",
        happy_paths(report_results),
        unhappy_paths(report_results)
    )]
    #[handle_exceptions(on_exception = report_results)]
    fn remove_copied_file(&mut self) -> NodeOutcome {
        let staged = staged_path(&self.state.staging_folder, &self.state.source_path);
        self.binder()
            .bind(RemoveFileIfExists { path: staged })
            .execute()?;
        Ok(self.success("report_results"))
    }

    #[node(overview = "Reports the Success/Failure outcomes.", is_terminal)]
    #[no_exceptions]
    fn report_results(&mut self) -> NodeOutcome {
        Ok(self.exit())
    }
}
