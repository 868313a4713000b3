mod cli;
mod error;
mod logging;
mod preview;

use crate::cli::{Cli, Command, JobArgs, toggle};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use debrother_config::Settings;
use debrother_library::commit::CommitEvent;
use debrother_library::error::ErrorKind as LibraryErrorKind;
use debrother_library::models::ScanFile;
use debrother_library::template::{Placeholder, SAMPLE_FILE};
use debrother_library::{Job, PathGenerator, today};
use debrother_storage::StorageBackend;
use debrother_storage::backend::{LocalBackend, ReadOnlyBackend};
use exn::ResultExt;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", *err);
            if err.is_retryable() {
                eprintln!("the command can be run again once this is fixed");
            }
            tracing::debug!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => Settings::default_path().map_err(ErrorKind::settings)?,
    };
    let mut settings = Settings::load(&path).map_err(ErrorKind::settings)?;
    let mut stdout = io::stdout().lock();

    let result = match cli.command {
        Command::Preview { job, sort_by } => {
            prepare(&job, &mut settings);
            print_preview(&settings, sort_by, &mut stdout)
        },
        Command::Rename { job, delete_originals, keep_originals, dry_run } => {
            prepare(&job, &mut settings);
            toggle(&mut settings.delete_originals, delete_originals, keep_originals);
            rename(&settings, dry_run, &mut stdout)
        },
        Command::Check { template } => return check(&template, &mut stdout),
        Command::Placeholders => return placeholders(&mut stdout),
    };

    if !cli.no_save {
        let saved = settings.save(&path).map_err(ErrorKind::settings);
        // The command's own error matters more than a failure to save.
        result?;
        saved?;
        return Ok(());
    }
    result
}

fn prepare(args: &JobArgs, settings: &mut Settings) {
    args.apply(settings);
    tracing::debug!(?settings, "Effective settings");
}

fn compile(template: &str) -> Result<PathGenerator> {
    template.parse().map_err(|err| ErrorKind::library(LibraryErrorKind::template(err)))
}

fn job(settings: &Settings) -> Result<Job> {
    Ok(Job {
        input: settings.input.clone(),
        output: settings.output_dir().to_path_buf(),
        template: compile(&settings.pattern)?,
        policy: settings.policy(),
        delete_originals: settings.delete_originals,
    })
}

fn print_preview(settings: &Settings, sort_by: preview::SortBy, out: &mut impl Write) -> Result<()> {
    let job = job(settings)?;
    let backend = LocalBackend::default();
    let plan = job.plan(&backend, today()).map_err(ErrorKind::library)?;
    let collisions = preview::collisions(&plan, &backend);
    let mut rows = preview::rows(&plan, &job.input, &job.output, &collisions);
    preview::sort(&mut rows, sort_by);
    preview::render(&rows, out).or_raise(|| ErrorKind::Output)?;
    writeln!(out, "\n{} files from {} into {}", plan.len(), job.input.display(), job.output.display())
        .or_raise(|| ErrorKind::Output)?;
    if !collisions.is_empty() {
        writeln!(out, "{} destinations collide; renaming would be refused", collisions.len())
            .or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

fn rename(settings: &Settings, dry_run: bool, out: &mut impl Write) -> Result<()> {
    let job = job(settings)?;
    let local = LocalBackend::default();
    let read_only = ReadOnlyBackend::new(LocalBackend::default());
    let backend: &dyn StorageBackend = if dry_run { &read_only } else { &local };
    let outcome = job
        .run(backend, today(), |event| match event {
            CommitEvent::Committed(destination) => tracing::info!(destination = %destination.display(), "Renamed"),
            CommitEvent::RolledBack(destination) => tracing::warn!(destination = %destination.display(), "Rolled back"),
            CommitEvent::Deleted(source) => tracing::debug!(source = %source.display(), "Deleted original"),
            _ => {},
        })
        .map_err(ErrorKind::library)?;

    let verb = if dry_run { "Would rename" } else { "Renamed" };
    writeln!(out, "{verb} {} files into {}", outcome.committed.len(), job.output.display()).or_raise(|| ErrorKind::Output)?;
    if !outcome.deleted.is_empty() {
        let verb = if dry_run { "Would delete" } else { "Deleted" };
        writeln!(out, "{verb} {} originals", outcome.deleted.len()).or_raise(|| ErrorKind::Output)?;
    }
    for source in &outcome.undeleted {
        writeln!(out, "Could not delete {}", source.display()).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

fn check(template: &str, out: &mut impl Write) -> Result<()> {
    let generator = compile(template)?;
    let sample = ScanFile::from(SAMPLE_FILE);
    let date = today();
    writeln!(out, "{template} is valid").or_raise(|| ErrorKind::Output)?;
    for position in 0..3 {
        let path = generator.generate(&sample, position, date).map_err(|err| ErrorKind::library(LibraryErrorKind::template(err)))?;
        writeln!(out, "  {position}: {} -> {}", sample, path.display()).or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

fn placeholders(out: &mut impl Write) -> Result<()> {
    for placeholder in Placeholder::ALL {
        let kind = if placeholder.is_integer() { "integer" } else { "text" };
        writeln!(out, "{:<10} {:<8} {}", format!("{{{}}}", placeholder.name()), kind, placeholder.description())
            .or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}
