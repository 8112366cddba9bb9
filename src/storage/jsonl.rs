//! Durable store backed by one JSONL journal
//!
//! Each line is one record tagged with its type. A commit appends the rows
//! it wrote followed by a marker that closes the batch:
//!
//! ```text
//! {"record":"contestant","id":7,"name":"Ada","rankingPoints":1100,...}
//! {"record":"contestant","id":12,"name":"Grace","rankingPoints":900,...}
//! {"record":"match","id":1,"tournamentId":1,"round":1,"winnerId":7,"completed":true,...}
//! {"record":"tournament","id":1,"currentRound":1,"currentMatch":2,...}
//! {"record":"point_history","id":1,"contestantId":7,"pointsChange":100,...}
//! {"record":"commit","records":5}
//! ```
//!
//! Replay applies batches in order, a later row replacing an earlier one
//! with the same id. Lines after the last marker belong to a commit that
//! never finished; they are dropped on open and the file is compacted.
//!
//! Once the journal holds twice as many lines as live rows (and at least
//! `DEFAULT_MIN_COMPACT_LINES`), the next commit rewrites it as a single
//! batch through write-to-temp + rename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::arena::{Arena, Record, RecordRef};
use super::transaction::Transaction;
use super::{Repository, Store};
use crate::types::{EngineError, EngineResult};
use crate::utils::atomic::{append_synced, atomic_write_with, cleanup_temp_file};

/// Journal length below which compaction never runs
pub const DEFAULT_MIN_COMPACT_LINES: usize = 4096;

#[derive(Debug)]
struct Journal {
    arena: Arena,
    /// Lines in the file, markers included
    lines: usize,
    /// An append failed part-way, so the file tail cannot be trusted
    needs_compaction: bool,
}

#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    min_compact_lines: usize,
    journal: Mutex<Journal>,
}

/// Outcome of replaying a journal file
struct Replay {
    arena: Arena,
    lines: usize,
    discarded: usize,
}

impl JsonlStore {
    /// Open (or create on first commit) the store at `path`
    ///
    /// A committed line that does not parse is fatal: the store refuses to
    /// start rather than silently dropping bracket state.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();

        if cleanup_temp_file(&path)? {
            warn!(path = %path.display(), "Removed temp file left by an interrupted write");
        }

        let replay = Self::replay(&path)?;
        let mut journal = Journal {
            arena: replay.arena,
            lines: replay.lines,
            needs_compaction: false,
        };

        if replay.discarded > 0 {
            warn!(
                path = %path.display(),
                discarded = replay.discarded,
                "Dropped lines of an unfinished commit"
            );
            journal.lines = write_snapshot(&path, &journal.arena)?;
        }

        info!(
            path = %path.display(),
            contestants = journal.arena.contestant_count(),
            tournaments = journal.arena.tournament_count(),
            matches = journal.arena.match_count(),
            journal_lines = journal.lines,
            "Opened bracket store"
        );

        Ok(Self {
            path,
            min_compact_lines: DEFAULT_MIN_COMPACT_LINES,
            journal: Mutex::new(journal),
        })
    }

    /// Set the journal length below which compaction never runs
    pub fn with_min_compact_lines(mut self, lines: usize) -> Self {
        self.min_compact_lines = lines;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> EngineResult<Replay> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Replay {
                    arena: Arena::new(),
                    lines: 0,
                    discarded: 0,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut arena = Arena::new();
        let mut pending: Vec<(usize, Result<Record, String>)> = Vec::new();
        let mut seen = 0;
        let mut committed = 0;

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            seen += 1;

            match serde_json::from_str::<Record>(line) {
                Ok(Record::Commit { records }) => {
                    if records != pending.len() {
                        return Err(EngineError::CorruptRecord {
                            line: line_no,
                            reason: format!(
                                "commit closes {} records but {} precede it",
                                records,
                                pending.len()
                            ),
                        });
                    }
                    for (at, parsed) in pending.drain(..) {
                        let record = parsed
                            .map_err(|reason| EngineError::CorruptRecord { line: at, reason })?;
                        arena.apply(at, record)?;
                    }
                    committed = seen;
                }
                parsed => pending.push((line_no, parsed.map_err(|e| e.to_string()))),
            }
        }

        Ok(Replay {
            arena,
            lines: committed,
            discarded: pending.len(),
        })
    }

    fn should_compact(&self, journal_lines: usize, live_records: usize) -> bool {
        journal_lines >= self.min_compact_lines && journal_lines > 2 * (live_records + 1)
    }
}

/// Encode `records` as one batch closed by its commit marker
fn encode_batch(records: &[RecordRef<'_>]) -> serde_json::Result<Vec<u8>> {
    let mut encoded = Vec::new();
    for record in records {
        serde_json::to_writer(&mut encoded, record)?;
        encoded.push(b'\n');
    }
    serde_json::to_writer(
        &mut encoded,
        &RecordRef::Commit {
            records: records.len(),
        },
    )?;
    encoded.push(b'\n');
    Ok(encoded)
}

/// Replace the file with every live row as one batch, returning its line count
fn write_snapshot(path: &Path, arena: &Arena) -> EngineResult<usize> {
    let records: Vec<RecordRef<'_>> = arena.records().collect();
    let encoded = encode_batch(&records)?;
    atomic_write_with(path, |w: &mut dyn Write| w.write_all(&encoded))?;
    debug!(path = %path.display(), records = records.len(), "Compacted journal");
    Ok(records.len() + 1)
}

impl Store for JsonlStore {
    fn read<T>(&self, f: impl FnOnce(&dyn Repository) -> T) -> T {
        let journal = self.journal.lock();
        f(&journal.arena)
    }

    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut dyn Repository) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut guard = self.journal.lock();
        let Journal {
            arena,
            lines,
            needs_compaction,
        } = &mut *guard;

        let mut tx = Transaction::begin(arena);
        let value = f(&mut tx)?;

        let changes = tx.changes();
        if changes.is_empty() {
            tx.commit();
            return Ok(value);
        }
        let batch = encode_batch(&changes)?;
        let batch_lines = changes.len() + 1;
        drop(changes);

        if *needs_compaction || self.should_compact(*lines + batch_lines, tx.arena().record_count())
        {
            *lines = write_snapshot(&self.path, tx.arena())?;
            *needs_compaction = false;
        } else if let Err(err) = append_synced(&self.path, &batch) {
            *needs_compaction = true;
            return Err(err.into());
        } else {
            *lines += batch_lines;
            debug!(path = %self.path.display(), records = batch_lines - 1, "Appended commit");
        }

        tx.commit();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContestantId, NewContestant};
    use tempfile::TempDir;

    fn line_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::open(dir.path().join("none.jsonl")).unwrap();
        assert_eq!(store.read(|repo| repo.contestants().len()), 0);
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");

        let store = JsonlStore::open(&path).unwrap();
        store
            .transaction(|repo| {
                repo.insert_contestant(NewContestant::new("Ada").with_nationality("PT"));
                repo.insert_contestant(NewContestant::new("Grace"));
                Ok(())
            })
            .unwrap();
        store
            .transaction(|repo| {
                let mut ada = repo.contestant(ContestantId(1)).unwrap();
                ada.ranking_points = 1100;
                repo.update_contestant(ada)
            })
            .unwrap();
        drop(store);

        // Two batches: 2 rows + marker, then 1 row + marker
        assert_eq!(line_count(&path), 5);

        let reopened = JsonlStore::open(&path).unwrap();
        let ada = reopened.read(|repo| repo.contestant(ContestantId(1))).unwrap();
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.nationality.as_deref(), Some("PT"));
        assert_eq!(ada.ranking_points, 1100);
        assert_eq!(reopened.read(|repo| repo.contestants().len()), 2);
    }

    #[test]
    fn test_rolled_back_transaction_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        let store = JsonlStore::open(&path).unwrap();

        let result: EngineResult<()> = store.transaction(|repo| {
            repo.insert_contestant(NewContestant::new("Ada"));
            Err(EngineError::InvalidInput("rejected".to_string()))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(store.read(|repo| repo.contestants().len()), 0);
    }

    #[test]
    fn test_read_only_transaction_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        let store = JsonlStore::open(&path).unwrap();

        let count = store
            .transaction(|repo| Ok(repo.contestants().len()))
            .unwrap();
        assert_eq!(count, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_committed_line_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        fs::write(
            &path,
            "{\"record\":\"contestant\",\"id\":1,\"name\":\"Ada\",\"rankingPoints\":1000}\nnot json\n{\"record\":\"commit\",\"records\":2}\n",
        )
        .unwrap();

        let err = JsonlStore::open(&path).unwrap_err();
        assert!(err.is_fatal());
        match err {
            EngineError::CorruptRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unfinished_commit_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        fs::write(
            &path,
            "{\"record\":\"contestant\",\"id\":1,\"name\":\"Ada\",\"rankingPoints\":1000}\n{\"record\":\"commit\",\"records\":1}\n{\"record\":\"contestant\",\"id\":2,\"name\":\"Gr",
        )
        .unwrap();

        let store = JsonlStore::open(&path).unwrap();
        assert_eq!(store.read(|repo| repo.contestants().len()), 1);
        // Rewritten without the torn tail
        assert_eq!(line_count(&path), 2);
    }

    #[test]
    fn test_journal_is_compacted_once_it_doubles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        let store = JsonlStore::open(&path).unwrap().with_min_compact_lines(0);
        store
            .transaction(|repo| {
                repo.insert_contestant(NewContestant::new("Ada"));
                Ok(())
            })
            .unwrap();

        for points in 1..=20 {
            store
                .transaction(|repo| {
                    let mut ada = repo.contestant(ContestantId(1)).unwrap();
                    ada.ranking_points = points;
                    repo.update_contestant(ada)
                })
                .unwrap();
            // One live row: never more than its marker pair plus one batch
            assert!(line_count(&path) <= 4);
        }

        let reopened = JsonlStore::open(&path).unwrap();
        let ada = reopened.read(|repo| repo.contestant(ContestantId(1))).unwrap();
        assert_eq!(ada.ranking_points, 20);
    }

    #[test]
    fn test_leftover_temp_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bracket.jsonl");
        let temp = dir.path().join("bracket.jsonl.tmp");
        fs::write(&temp, "half a line").unwrap();

        JsonlStore::open(&path).unwrap();
        assert!(!temp.exists());
    }
}
