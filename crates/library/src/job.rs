use crate::commit::{CommitEvent, Outcome, Plan, Transaction};
use crate::error::{ErrorKind, Result};
use crate::scan::{NamingConvention, Scanner};
use crate::sort::{SortPolicy, Sorter};
use crate::template::PathGenerator;
use debrother_storage::StorageBackend;
use std::path::PathBuf;
use time::Date;
use tracing::instrument;

/// Everything needed to turn one input directory into a renamed batch.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub template: PathGenerator,
    pub policy: SortPolicy,
    pub delete_originals: bool,
}
impl Job {
    /// Discover, reorder and resolve, without checking the destinations.
    ///
    /// Use [`Plan::check`] to find collisions without aborting (previews), or
    /// [`run`](Self::run) to check and commit in one go.
    #[instrument(skip_all, fields(input = %self.input.display(), output = %self.output.display()))]
    pub fn plan(&self, backend: &dyn StorageBackend, date: Date) -> Result<Plan> {
        let files = Scanner::new(backend, NamingConvention::new()).discover(&self.input)?;
        let files = Sorter::new(self.policy).sort(files);
        let destinations = self.template.resolve(&files, &self.output, date).map_err(ErrorKind::template)?;
        Plan::new(files, destinations)
    }

    /// Plan and commit, reporting progress to `observer`.
    pub fn run<'a>(
        &self,
        backend: &'a dyn StorageBackend,
        date: Date,
        observer: impl FnMut(CommitEvent<'_>) + 'a,
    ) -> Result<Outcome> {
        let plan = self.plan(backend, date)?;
        Transaction::new(backend).delete_originals(self.delete_originals).observe(observer).commit(&plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debrother_storage::backend::LocalBackend;
    use std::fs;
    use tempfile::TempDir;
    use time::macros::date;

    fn job(dir: &TempDir, template: &str) -> Job {
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        for name in ["Scan_20190527.jpg", "Scan_20190527_2.jpg", "Scan_20190527_10.jpg", "README.txt"] {
            fs::write(input.join(name), name).unwrap();
        }
        Job {
            input,
            output: dir.path().join("out"),
            template: template.parse().unwrap(),
            policy: SortPolicy { numbering: true, ..Default::default() },
            delete_originals: true,
        }
    }

    #[test]
    fn test_plan() {
        let dir = TempDir::new().unwrap();
        let job = job(&dir, "{yyyy}/{page:02d}-{basename}.{ext}");
        let plan = job.plan(&LocalBackend::default(), date!(2024 - 01 - 31)).unwrap();
        let destinations: Vec<_> =
            plan.destinations().iter().map(|d| d.strip_prefix(&job.output).unwrap().to_path_buf()).collect();
        assert_eq!(destinations, vec![
            PathBuf::from("2024/01-Scan_20190527.jpg"),
            PathBuf::from("2024/02-Scan_20190527_2.jpg"),
            PathBuf::from("2024/03-Scan_20190527_10.jpg"),
        ]);
    }

    #[test]
    fn test_run() {
        let dir = TempDir::new().unwrap();
        let job = job(&dir, "{page:03d}.{ext}");
        let mut committed = 0;
        let outcome = job
            .run(&LocalBackend::default(), date!(2024 - 01 - 31), |event| {
                if let CommitEvent::Committed(_) = event {
                    committed += 1;
                }
            })
            .unwrap();
        assert_eq!(committed, 3);
        assert_eq!(outcome.deleted.len(), 3);
        assert_eq!(fs::read_to_string(job.output.join("003.jpg")).unwrap(), "Scan_20190527_10.jpg");
        // Files outside the naming convention are left alone.
        assert!(job.input.join("README.txt").is_file());
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let job = Job {
            input: dir.path().join("missing"),
            output: dir.path().join("out"),
            template: "{page}.{ext}".parse().unwrap(),
            policy: SortPolicy::default(),
            delete_originals: false,
        };
        let err = job.plan(&LocalBackend::default(), date!(2024 - 01 - 31)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery(_)));
    }
}
