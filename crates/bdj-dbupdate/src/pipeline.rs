//! The `INIT -> PREP -> SEND -> PROCESS -> FINISH` state machine that
//! drives a database update or rebuild.
//!
//! This crate only models the pipeline itself; the socket wiring that
//! actually exchanges `DB_FILE_CHK`/`DB_FILE_TAGS` with the tag reader
//! lives in the binary that owns a `bdj-bus` connection. A caller drives
//! the pipeline by calling [`DbUpdatePipeline::prep`] once, then
//! [`DbUpdatePipeline::step`] repeatedly from its own tick loop, feeding
//! tag replies back in through [`DbUpdatePipeline::record_tag_result`].

use crate::blacklist::is_blacklisted;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Filenames handed to the tag reader per [`DbUpdatePipeline::step`] call.
pub const FNAMES_SENT_PER_ITER: usize = 30;

/// Progress is emitted on stdout no more than once per this interval.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbUpdateState {
    Init,
    Prep,
    Send,
    Process,
    Finish,
}

/// Every counter the pipeline tracks, reported in the final summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub found: usize,
    pub sent: usize,
    pub new: usize,
    pub already: usize,
    pub bad: usize,
    pub processed: usize,
    pub null_data: usize,
    pub no_tags: usize,
    pub saved: usize,
}

impl Counters {
    /// `already` + `bad`: files that were never sent to the tag reader
    /// because `SEND` disposed of them on the spot.
    pub fn skipped(&self) -> usize {
        self.already + self.bad
    }
}

/// What the caller should do after a [`DbUpdatePipeline::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Send a `DB_FILE_CHK` for each of these relative paths.
    SendChecks(Vec<PathBuf>),
    /// Nothing to do this tick; call `step` again after the next wakeup.
    Idle,
    /// Emit this fraction as a progress update (rate-limited upstream).
    Progress(f64),
    /// The pipeline is done; this is the final counter snapshot.
    Finished(Counters),
    /// A rebuild finished walking and tagging but couldn't publish the new
    /// database over the live one. Terminal: the live database is untouched.
    SealFailed(String),
}

pub struct DbUpdatePipeline {
    state: DbUpdateState,
    rebuild: bool,
    check_new: bool,
    music_root: PathBuf,
    temp_db_path: Option<PathBuf>,
    live_db_path: PathBuf,
    known_relpaths: HashSet<String>,
    files: Vec<PathBuf>,
    next: usize,
    counters: Counters,
    last_progress: Option<Instant>,
    stop_requested: bool,
}

impl DbUpdatePipeline {
    /// `known_relpaths` is the set of relative paths the live database
    /// already has entries for; only consulted in check-new mode.
    pub fn new(
        music_root: impl Into<PathBuf>,
        live_db_path: impl Into<PathBuf>,
        rebuild: bool,
        check_new: bool,
        known_relpaths: HashSet<String>,
    ) -> Self {
        Self {
            state: DbUpdateState::Init,
            rebuild,
            check_new,
            music_root: music_root.into(),
            temp_db_path: None,
            live_db_path: live_db_path.into(),
            known_relpaths,
            files: Vec::new(),
            next: 0,
            counters: Counters::default(),
            last_progress: None,
            stop_requested: false,
        }
    }

    pub fn state(&self) -> DbUpdateState {
        self.state
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// `DB_STOP_REQ` from the manager UI: short-circuit straight to
    /// `FINISH`, skipping the rename so a rebuild in progress is
    /// abandoned rather than half-published.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Walk the music root and open the rebuild target, if any. Blocking;
    /// call once before the first [`Self::step`].
    pub fn prep(&mut self) -> std::io::Result<()> {
        if self.rebuild {
            let temp = self.live_db_path.with_extension("db.new");
            if let Some(parent) = temp.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(&temp)?;
            self.temp_db_path = Some(temp);
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.music_root)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }

        self.counters.found = files.len();
        self.files = files;
        self.next = 0;
        info!(found = self.counters.found, "files found");
        self.state = DbUpdateState::Send;
        Ok(())
    }

    fn relpath(&self, path: &Path) -> String {
        path.strip_prefix(&self.music_root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// One driver tick: advances the state machine and reports what the
    /// caller needs to do next.
    pub fn step(&mut self) -> StepOutcome {
        if self.stop_requested && self.state != DbUpdateState::Finish {
            self.state = DbUpdateState::Finish;
        }

        match self.state {
            DbUpdateState::Init => {
                self.state = DbUpdateState::Prep;
                StepOutcome::Idle
            }
            DbUpdateState::Prep => StepOutcome::Idle,
            DbUpdateState::Send => self.send_batch(),
            DbUpdateState::Process => self.check_progress(),
            DbUpdateState::Finish => match self.finish() {
                Ok(counters) => StepOutcome::Finished(counters),
                Err(e) => StepOutcome::SealFailed(e.to_string()),
            },
        }
    }

    fn send_batch(&mut self) -> StepOutcome {
        let mut batch = Vec::new();

        while self.next < self.files.len() && batch.len() < FNAMES_SENT_PER_ITER {
            let path = self.files[self.next].clone();
            self.next += 1;
            let relname = self.relpath(&path);

            if self.check_new && self.known_relpaths.contains(&relname) {
                self.counters.already += 1;
                continue;
            }
            if is_blacklisted(&relname) {
                self.counters.bad += 1;
                continue;
            }

            self.counters.sent += 1;
            self.counters.new += 1;
            batch.push(path);
        }

        if self.next >= self.files.len() {
            self.state = DbUpdateState::Process;
        }

        if batch.is_empty() {
            StepOutcome::Idle
        } else {
            StepOutcome::SendChecks(batch)
        }
    }

    /// Feed back a `DB_FILE_TAGS` reply. `tag_data` is `None` for an empty
    /// payload, `Some(&[])` for a payload that parsed to no tags at all.
    pub fn record_tag_result(&mut self, tags: Option<&[(String, String)]>) {
        match tags {
            None => self.counters.null_data += 1,
            Some(t) if t.is_empty() => self.counters.no_tags += 1,
            Some(_) => self.counters.saved += 1,
        }
        self.counters.processed += 1;
    }

    fn check_progress(&mut self) -> StepOutcome {
        if self.counters.processed + self.counters.skipped() >= self.counters.found {
            self.state = DbUpdateState::Finish;
        }

        let now = Instant::now();
        let due = self
            .last_progress
            .map(|t| now.duration_since(t) >= PROGRESS_INTERVAL)
            .unwrap_or(true);
        if !due {
            return StepOutcome::Idle;
        }
        self.last_progress = Some(now);

        let fraction = if self.counters.found == 0 {
            0.0
        } else {
            (self.counters.processed + self.counters.skipped()) as f64 / self.counters.found as f64
        };
        StepOutcome::Progress(fraction)
    }

    fn finish(&mut self) -> std::io::Result<Counters> {
        if self.rebuild && !self.stop_requested {
            if let Some(temp) = &self.temp_db_path {
                crate::seal::seal(temp, &self.live_db_path)?;
            }
        }
        info!(found = self.counters.found, processed = self.counters.processed, "database update finished");
        Ok(self.counters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tree(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"x").unwrap();
        }
    }

    #[test]
    fn prep_counts_files_and_moves_to_send() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["a.mp3", "b.mp3", "c.mp3"]);

        let mut pipeline = DbUpdatePipeline::new(dir.path(), dir.path().join("live.db"), false, false, HashSet::new());
        pipeline.prep().unwrap();

        assert_eq!(pipeline.state(), DbUpdateState::Send);
        assert_eq!(pipeline.counters().found, 3);
    }

    #[test]
    fn send_batch_separates_blacklisted_and_already_known() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["good.mp3", "bad:name.mp3", "known.mp3"]);

        let mut known = HashSet::new();
        known.insert("known.mp3".to_string());

        let mut pipeline = DbUpdatePipeline::new(dir.path(), dir.path().join("live.db"), false, true, known);
        pipeline.prep().unwrap();

        let outcome = pipeline.step();
        match outcome {
            StepOutcome::SendChecks(batch) => assert_eq!(batch.len(), 1),
            other => panic!("expected SendChecks, got {other:?}"),
        }
        assert_eq!(pipeline.counters().already, 1);
        assert_eq!(pipeline.counters().bad, 1);
        assert_eq!(pipeline.counters().sent, 1);
        assert_eq!(pipeline.state(), DbUpdateState::Process);
    }

    #[test]
    fn full_pipeline_reaches_finish_once_every_file_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["a.mp3", "b.mp3"]);

        let mut pipeline = DbUpdatePipeline::new(dir.path(), dir.path().join("live.db"), false, false, HashSet::new());
        pipeline.prep().unwrap();
        pipeline.step(); // SEND -> PROCESS, both files sent

        pipeline.record_tag_result(Some(&[("ARTIST".into(), "x".into())]));
        pipeline.record_tag_result(None);

        let mut outcome = pipeline.step();
        if matches!(outcome, StepOutcome::Progress(_)) {
            outcome = pipeline.step();
        }
        assert!(matches!(outcome, StepOutcome::Finished(_)));
        assert_eq!(pipeline.counters().saved, 1);
        assert_eq!(pipeline.counters().null_data, 1);
    }

    #[test]
    fn rebuild_publishes_temp_database_over_live_one() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["a.mp3"]);
        let live = dir.path().join("live.db");
        fs::write(&live, b"old").unwrap();

        let mut pipeline = DbUpdatePipeline::new(dir.path(), &live, true, false, HashSet::new());
        pipeline.prep().unwrap();
        assert!(dir.path().join("live.db.new").exists());

        pipeline.step(); // SEND -> PROCESS
        pipeline.record_tag_result(Some(&[("ARTIST".into(), "x".into())]));

        let mut outcome = pipeline.step();
        if matches!(outcome, StepOutcome::Progress(_)) {
            outcome = pipeline.step();
        }
        assert!(matches!(outcome, StepOutcome::Finished(_)));
        assert!(live.exists());
        assert!(!dir.path().join("live.db.new").exists());
        assert_ne!(fs::read_to_string(&live).unwrap(), "old");
    }

    #[test]
    fn seal_failure_is_reported_instead_of_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["a.mp3"]);
        let live = dir.path().join("live.db");

        let mut pipeline = DbUpdatePipeline::new(dir.path(), &live, true, false, HashSet::new());
        pipeline.prep().unwrap();
        fs::remove_file(dir.path().join("live.db.new")).unwrap();

        pipeline.step(); // SEND -> PROCESS
        pipeline.record_tag_result(Some(&[("ARTIST".into(), "x".into())]));

        let mut outcome = pipeline.step();
        if matches!(outcome, StepOutcome::Progress(_)) {
            outcome = pipeline.step();
        }
        assert!(matches!(outcome, StepOutcome::SealFailed(_)));
        assert!(!live.exists());
    }

    #[test]
    fn stop_request_short_circuits_to_finish() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &["a.mp3"]);

        let mut pipeline = DbUpdatePipeline::new(dir.path(), dir.path().join("live.db"), true, false, HashSet::new());
        pipeline.prep().unwrap();
        pipeline.request_stop();

        let outcome = pipeline.step();
        assert!(matches!(outcome, StepOutcome::Finished(_)));
    }
}
