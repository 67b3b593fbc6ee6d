use std::process::ExitCode;

use archive_encrypt_demo::{ArchiveEncrypt, ArchiveEncryptState};
use backup_machines::cli::Cli;
use backup_machines::core::{Driver, Outcome, QualifiedName};
use backup_machines::logging;
use clap::Parser;

/// Archive a file: stage it, encrypt it with GPG, and move it into an
/// archive folder.
#[derive(Debug, Parser)]
#[command(name = "archive-encrypt", version, about)]
struct Args {
    /// File to archive and encrypt.
    source_path: std::path::PathBuf,

    /// Staging folder the file is copied to before encryption.
    #[arg(long)]
    staging_folder: std::path::PathBuf,

    /// Folder the encrypted file is moved to on success.
    #[arg(long)]
    archive_folder: std::path::PathBuf,

    /// GPG recipient key to encrypt with.
    #[arg(long)]
    gpg_key_name: String,

    #[command(flatten)]
    common: Cli,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.common.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("archive-encrypt: {err}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = args.common.log_level(&config);
    if logging::init(&log_level, config.logging.format).is_err() {
        eprintln!("a tracing subscriber was already installed");
    }

    let state = ArchiveEncryptState {
        source_path: args.source_path,
        staging_folder: args.staging_folder,
        archive_folder: args.archive_folder,
        gpg_key_name: args.gpg_key_name,
    };

    // A single run is still one job through the shared CLI/config/pool
    // path; a binary driving several machines at once would push more
    // closures into this vector instead.
    let jobs: Vec<Box<dyn FnOnce() -> Vec<Outcome> + Send>> = vec![Box::new(move || {
        let mut machine = ArchiveEncrypt::new(state, Box::new(logging::TracingLogger));
        match Driver::run(&mut machine) {
            Ok(results) => results,
            Err(err) => {
                eprintln!("archive-encrypt aborted: {err}");
                vec![Outcome::failure(
                    QualifiedName::new("archive-encrypt", "driver"),
                    err.to_string(),
                )]
            }
        }
    })];

    let results = args.common.run(&config, jobs);

    for result in &results {
        println!("{result}");
    }

    let failures = results.iter().filter(|o| o.is_failure()).count();
    ExitCode::from(failures.min(u8::MAX as usize) as u8)
}
