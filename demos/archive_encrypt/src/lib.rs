//! A concrete pipeline: archive and encrypt a file, built on
//! `backup-machines`.

mod machine;
mod repository;
mod state;

pub use machine::ArchiveEncrypt;
pub use state::ArchiveEncryptState;
