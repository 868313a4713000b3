use super::plan::Plan;
use crate::error::{ErrorKind, Result};
use debrother_storage::StorageBackend;
use debrother_storage::common_ancestor;
use debrother_storage::error::{ErrorKind as StorageErrorKind, Result as StorageResult};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::instrument;

/// Progress events reported by [`Transaction::commit`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`Staged`](Self::Staged), once per file.
/// 3. [`Committed`](Self::Committed), once per file that reached its
///    destination.
/// 4. [`RolledBack`](Self::RolledBack), once per committed file, only when the
///    commit phase failed.
/// 5. [`Deleted`](Self::Deleted), once per removed original, only when asked to.
/// 6. [`Complete`](Self::Complete), exactly once, only on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitEvent<'a> {
    /// The transaction has begun; carries the number of files.
    Started(usize),
    /// A source was copied into the scratch directory.
    Staged(&'a Path),
    /// A staged copy was moved to this destination.
    Committed(&'a Path),
    /// A committed destination was removed again.
    RolledBack(&'a Path),
    /// An original was removed after a fully successful commit.
    Deleted(&'a Path),
    Complete,
}

/// One file's journey: source, scratch copy, destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameJob {
    pub source: PathBuf,
    pub staged: PathBuf,
    pub destination: PathBuf,
}

/// What a successful commit did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Every destination, in page order.
    pub committed: Vec<PathBuf>,
    /// Originals that were removed.
    pub deleted: Vec<PathBuf>,
    /// Originals that should have been removed but could not be; they were
    /// logged and left in place.
    pub undeleted: Vec<PathBuf>,
}

type Observer<'a> = Box<dyn FnMut(CommitEvent<'_>) + 'a>;

/// Where staged copies live until they are moved into place. A read-only
/// backend never writes them, so no directory is created for it.
enum Scratch {
    Disk(TempDir),
    Virtual(PathBuf),
}
impl Scratch {
    fn path(&self) -> &Path {
        match self {
            Self::Disk(dir) => dir.path(),
            Self::Virtual(path) => path,
        }
    }

    fn close(self) {
        if let Self::Disk(dir) = self
            && let Err(err) = dir.close()
        {
            tracing::warn!(error = %err, "Could not remove scratch directory");
        }
    }
}

/// All-or-nothing rename of a [`Plan`].
///
/// Sources are first copied into a scratch directory next to the destinations,
/// then moved into place one by one. If any move fails, every destination
/// written so far (and every directory created for them) is removed again, so
/// the destination tree ends up exactly as it was and all originals remain.
/// Originals are only deleted once every destination exists.
///
/// A transaction is single use: [`commit`](Self::commit) consumes it.
pub struct Transaction<'a> {
    backend: &'a dyn StorageBackend,
    delete_originals: bool,
    observer: Option<Observer<'a>>,
}
impl<'a> Transaction<'a> {
    pub fn new(backend: &'a dyn StorageBackend) -> Self {
        Self { backend, delete_originals: false, observer: None }
    }

    /// Remove the originals after a fully successful commit.
    pub fn delete_originals(mut self, delete: bool) -> Self {
        self.delete_originals = delete;
        self
    }

    /// Report progress to `observer`.
    pub fn observe(mut self, observer: impl FnMut(CommitEvent<'_>) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[instrument(skip_all, fields(files = plan.len(), backend = self.backend.name(), delete_originals = self.delete_originals))]
    pub fn commit(mut self, plan: &Plan) -> Result<Outcome> {
        self.emit(CommitEvent::Started(plan.len()));
        if plan.is_empty() {
            self.emit(CommitEvent::Complete);
            return Ok(Outcome::default());
        }
        plan.check(self.backend)?;

        let scratch = self.scratch(plan)?;
        let jobs = self.stage(plan, &scratch)?;
        let committed = self.commit_all(&jobs)?;
        let mut outcome = Outcome { committed, ..Default::default() };
        scratch.close();

        if self.delete_originals {
            for job in &jobs {
                match self.backend.delete(&job.source) {
                    Ok(()) => {
                        self.emit(CommitEvent::Deleted(&job.source));
                        outcome.deleted.push(job.source.clone());
                    },
                    Err(err) => {
                        tracing::warn!(source = %job.source.display(), error = ?err, "Could not delete original");
                        outcome.undeleted.push(job.source.clone());
                    },
                }
            }
        }

        tracing::info!(committed = outcome.committed.len(), deleted = outcome.deleted.len(), "Renamed scan batch");
        self.emit(CommitEvent::Complete);
        Ok(outcome)
    }

    /// Copy every source into the scratch directory. Nothing outside of it is
    /// written, so a failure here needs no rollback.
    fn stage(&mut self, plan: &Plan, scratch: &Scratch) -> Result<Vec<RenameJob>> {
        let mut jobs = Vec::with_capacity(plan.len());
        for (position, (source, destination)) in plan.pairs().enumerate() {
            let staged = scratch.path().join(format!("{position:06}"));
            let bytes = self.backend.copy(source.path(), &staged).or_raise(|| ErrorKind::ReadFailure(source.path().to_path_buf()))?;
            tracing::trace!(source = %source, bytes, "Staged");
            self.emit(CommitEvent::Staged(source.path()));
            jobs.push(RenameJob { source: source.path().to_path_buf(), staged, destination: destination.to_path_buf() });
        }
        Ok(jobs)
    }

    fn commit_all(&mut self, jobs: &[RenameJob]) -> Result<Vec<PathBuf>> {
        let mut committed = Vec::with_capacity(jobs.len());
        let mut created = Vec::new();
        for job in jobs {
            if let Err(err) = self.commit_one(job, &mut created) {
                tracing::error!(destination = %job.destination.display(), "Commit failed, rolling back");
                self.rollback(&committed, &created);
                return Err(err.raise(ErrorKind::WriteFailure(job.destination.clone())));
            }
            self.emit(CommitEvent::Committed(&job.destination));
            committed.push(job.destination.clone());
        }
        Ok(committed)
    }

    fn commit_one(&self, job: &RenameJob, created: &mut Vec<PathBuf>) -> StorageResult<()> {
        if let Some(parent) = job.destination.parent() {
            let mut missing = Vec::new();
            for dir in parent.ancestors().filter(|dir| !dir.as_os_str().is_empty()) {
                if self.backend.exists(dir)? {
                    break;
                }
                missing.push(dir);
            }
            for dir in missing.into_iter().rev() {
                self.backend.create_dir(dir)?;
                created.push(dir.to_path_buf());
            }
        }
        // Something may have appeared since the plan was checked.
        if self.backend.exists(&job.destination)? {
            exn::bail!(StorageErrorKind::AlreadyExists(job.destination.clone()));
        }
        self.backend.rename(&job.staged, &job.destination)
    }

    /// Best effort: a destination that cannot be removed is logged, and the
    /// rest of the rollback still happens.
    fn rollback(&mut self, committed: &[PathBuf], created: &[PathBuf]) {
        for destination in committed.iter().rev() {
            match self.backend.delete(destination) {
                Ok(()) => self.emit(CommitEvent::RolledBack(destination)),
                Err(err) => tracing::error!(destination = %destination.display(), error = ?err, "Could not roll back"),
            }
        }
        for dir in created.iter().rev() {
            if let Err(err) = self.backend.remove_dir(dir) {
                tracing::error!(directory = %dir.display(), error = ?err, "Could not remove created directory");
            }
        }
    }

    fn scratch(&self, plan: &Plan) -> Result<Scratch> {
        let root = self.scratch_root(plan);
        if self.backend.is_read_only() {
            return Ok(Scratch::Virtual(root.join(".debrother-dry-run")));
        }
        let dir = tempfile::Builder::new()
            .prefix(".debrother-")
            .tempdir_in(&root)
            .or_raise(|| ErrorKind::WriteFailure(root.clone()))?;
        tracing::debug!(scratch = %dir.path().display(), "Created scratch directory");
        Ok(Scratch::Disk(dir))
    }

    /// Nearest existing directory that holds every destination, so that the
    /// final moves stay on one filesystem.
    fn scratch_root(&self, plan: &Plan) -> PathBuf {
        let parents = plan.destinations().iter().filter_map(|destination| destination.parent());
        common_ancestor(parents)
            .and_then(|ancestor| {
                ancestor
                    .ancestors()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .find(|dir| self.backend.exists(dir).unwrap_or(false))
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn emit(&mut self, event: CommitEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}
