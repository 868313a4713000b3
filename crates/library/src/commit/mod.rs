//! Transactional renaming of a scan batch.

mod plan;
mod transaction;

pub use self::plan::Plan;
pub use self::transaction::{CommitEvent, Outcome, RenameJob, Transaction};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::ScanFile;
    use debrother_storage::backend::{FaultyBackend, LocalBackend, Operation, ReadOnlyBackend};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        sources: Vec<ScanFile>,
    }
    impl Fixture {
        fn new(count: usize) -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("in")).unwrap();
            fs::create_dir(dir.path().join("out")).unwrap();
            let sources = (1..=count)
                .map(|i| {
                    let path = dir.path().join(format!("in/Scan_20190527_{i}.jpg"));
                    fs::write(&path, format!("page {i}")).unwrap();
                    ScanFile::new(path)
                })
                .collect();
            Self { dir, sources }
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("out")
        }

        fn plan(&self, names: &[&str]) -> Plan {
            let destinations = names.iter().map(|name| self.out().join(name)).collect();
            Plan::new(self.sources.clone(), destinations).unwrap()
        }

        fn sources_intact(&self) -> bool {
            self.sources.iter().all(|source| source.path().is_file())
        }

        fn out_entries(&self) -> usize {
            fs::read_dir(self.out()).unwrap().count()
        }
    }

    #[test]
    fn test_commit_copies_in_order() {
        let fixture = Fixture::new(3);
        let plan = fixture.plan(&["001.jpg", "002.jpg", "003.jpg"]);
        let backend = LocalBackend::default();
        let outcome = Transaction::new(&backend).commit(&plan).unwrap();
        assert_eq!(outcome.committed, plan.destinations());
        assert!(outcome.deleted.is_empty());
        assert_eq!(fs::read_to_string(fixture.out().join("002.jpg")).unwrap(), "page 2");
        assert!(fixture.sources_intact());
        // Scratch directory is gone.
        assert_eq!(fixture.out_entries(), 3);
    }

    #[test]
    fn test_commit_creates_subdirectories() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["2024/a/001.jpg", "2024/b/002.jpg"]);
        let backend = LocalBackend::default();
        Transaction::new(&backend).commit(&plan).unwrap();
        assert!(fixture.out().join("2024/a/001.jpg").is_file());
        assert!(fixture.out().join("2024/b/002.jpg").is_file());
    }

    #[test]
    fn test_commit_deletes_originals() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["001.jpg", "002.jpg"]);
        let backend = LocalBackend::default();
        let outcome = Transaction::new(&backend).delete_originals(true).commit(&plan).unwrap();
        assert_eq!(outcome.deleted.len(), 2);
        assert!(fixture.sources.iter().all(|source| !source.path().exists()));
        assert_eq!(fixture.out_entries(), 2);
    }

    #[test]
    fn test_failed_rename_rolls_back_everything() {
        let fixture = Fixture::new(4);
        let plan = fixture.plan(&["001.jpg", "002.jpg", "003.jpg", "004.jpg"]);
        let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Rename, 2);
        let err = Transaction::new(&backend).delete_originals(true).commit(&plan).unwrap_err();
        assert!(matches!(&*err, ErrorKind::WriteFailure(path) if *path == fixture.out().join("002.jpg")));
        assert_eq!(fixture.out_entries(), 0);
        assert!(fixture.sources_intact());
        assert_eq!(backend.calls(Operation::Delete), 1);
    }

    #[test]
    fn test_rollback_removes_created_directories() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["a/001.jpg", "b/c/002.jpg"]);
        let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Rename, 2);
        let err = Transaction::new(&backend).commit(&plan).unwrap_err();
        assert!(matches!(&*err, ErrorKind::WriteFailure(_)));
        assert_eq!(fixture.out_entries(), 0);
    }

    #[test]
    fn test_failed_stage_touches_nothing() {
        let fixture = Fixture::new(3);
        let plan = fixture.plan(&["001.jpg", "002.jpg", "003.jpg"]);
        let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Copy, 3);
        let err = Transaction::new(&backend).commit(&plan).unwrap_err();
        assert!(matches!(&*err, ErrorKind::ReadFailure(path) if path == fixture.sources[2].path()));
        assert_eq!(backend.calls(Operation::Rename), 0);
        assert_eq!(fixture.out_entries(), 0);
        assert!(fixture.sources_intact());
    }

    #[test]
    fn test_failed_delete_is_reported_not_fatal() {
        let fixture = Fixture::new(3);
        let plan = fixture.plan(&["001.jpg", "002.jpg", "003.jpg"]);
        let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Delete, 2);
        let outcome = Transaction::new(&backend).delete_originals(true).commit(&plan).unwrap();
        assert_eq!(outcome.committed.len(), 3);
        assert_eq!(outcome.deleted.len(), 2);
        assert_eq!(outcome.undeleted, vec![fixture.sources[1].path().to_path_buf()]);
        assert!(fixture.sources[1].path().is_file());
    }

    #[test]
    fn test_existing_destination_is_a_collision() {
        let fixture = Fixture::new(2);
        fs::write(fixture.out().join("002.jpg"), "someone else").unwrap();
        let plan = fixture.plan(&["001.jpg", "002.jpg"]);
        let backend = LocalBackend::default();
        let err = Transaction::new(&backend).commit(&plan).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Collision(_)));
        assert_eq!(fs::read_to_string(fixture.out().join("002.jpg")).unwrap(), "someone else");
        assert_eq!(fixture.out_entries(), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["sub/001.jpg", "002.jpg"]);
        let backend = ReadOnlyBackend::new(LocalBackend::default());
        let outcome = Transaction::new(&backend).delete_originals(true).commit(&plan).unwrap();
        assert_eq!(outcome.committed.len(), 2);
        assert_eq!(fixture.out_entries(), 0);
        assert!(fixture.sources_intact());
    }

    #[test]
    fn test_dry_run_creates_no_scratch_directory() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["001.jpg", "002.jpg"]);
        let backend = ReadOnlyBackend::new(LocalBackend::default());
        let out = fixture.out();
        let mut entries_while_staging = Vec::new();
        Transaction::new(&backend)
            .observe(|event| {
                if let CommitEvent::Staged(_) = event {
                    entries_while_staging.push(fs::read_dir(&out).unwrap().count());
                }
            })
            .commit(&plan)
            .unwrap();
        assert_eq!(entries_while_staging, vec![0, 0]);
    }

    #[test]
    fn test_events_in_order() {
        let fixture = Fixture::new(2);
        let plan = fixture.plan(&["001.jpg", "002.jpg"]);
        let backend = LocalBackend::default();
        let mut events = Vec::new();
        Transaction::new(&backend)
            .delete_originals(true)
            .observe(|event| {
                events.push(match event {
                    CommitEvent::Started(n) => format!("started {n}"),
                    CommitEvent::Staged(_) => "staged".to_string(),
                    CommitEvent::Committed(path) => format!("committed {}", path.file_name().unwrap().to_string_lossy()),
                    CommitEvent::RolledBack(_) => "rolled back".to_string(),
                    CommitEvent::Deleted(_) => "deleted".to_string(),
                    CommitEvent::Complete => "complete".to_string(),
                })
            })
            .commit(&plan)
            .unwrap();
        assert_eq!(events, vec![
            "started 2",
            "staged",
            "staged",
            "committed 001.jpg",
            "committed 002.jpg",
            "deleted",
            "deleted",
            "complete",
        ]);
    }

    #[test]
    fn test_rollback_events() {
        let fixture = Fixture::new(3);
        let plan = fixture.plan(&["001.jpg", "002.jpg", "003.jpg"]);
        let backend = FaultyBackend::new(LocalBackend::default()).fail_on(Operation::Rename, 3);
        let mut rolled_back = Vec::new();
        Transaction::new(&backend)
            .observe(|event| {
                if let CommitEvent::RolledBack(path) = event {
                    rolled_back.push(path.to_path_buf());
                }
            })
            .commit(&plan)
            .unwrap_err();
        assert_eq!(rolled_back, vec![fixture.out().join("002.jpg"), fixture.out().join("001.jpg")]);
    }

    #[test]
    fn test_empty_plan() {
        let backend = LocalBackend::default();
        let outcome = Transaction::new(&backend).commit(&Plan::default()).unwrap();
        assert_eq!(outcome, Outcome::default());
    }
}
