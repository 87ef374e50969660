//! Content fingerprint log for incremental builds.
//!
//! Rendering is cheap, but rewriting every page on every run churns the
//! output directory and defeats `rsync`'s change detection on publish. This
//! module lets the publish driver skip documents whose exact content has been
//! built before.
//!
//! # Design
//!
//! The store is **content-addressed**: a lookup asks "has this fingerprint
//! ever been built?", not "is this file up to date?". Renames and moves of
//! unchanged files are therefore free, and modification times are never
//! consulted (a `git checkout` resets them).
//!
//! - **Fingerprint**: SHA-1 of the raw file bytes, as 40 lowercase hex
//!   digits. Used for change detection only.
//! - **Record**: one line per build, `<unix-timestamp> <fingerprint> <file>`.
//!
//! ## Append-only
//!
//! Records are only ever appended, never rewritten, deduplicated or
//! compacted. Each append is flushed and synced before
//! [`FingerprintStore::record`] returns, so a crash never loses a record for a
//! page that was reported as written.
//!
//! One consequence is kept on purpose: reverting a file to content that was
//! built at some point in the past is treated as already built, even if the
//! output directory currently holds a later version. `--rebuild` is the
//! escape hatch.
//!
//! ## Storage
//!
//! The log is a plain text file (default `logfile` in the site root) so it
//! can be inspected with `grep` and `tail`. A missing file is an empty store.
//! Lines that do not parse are skipped with a warning rather than failing the
//! build.

use sha1::{Digest, Sha1};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("cannot read fingerprint log {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot append to fingerprint log {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
    #[error("malformed fingerprint record: {0:?}")]
    Malformed(String),
}

/// Hex-encoded SHA-1 of some content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint raw bytes.
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        Self(format!("{:x}", Sha1::digest(bytes.as_ref())))
    }

    /// Fingerprint a file's current contents.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        Ok(Self::of(fs::read(path)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    /// Accepts any non-empty run of hex digits, so logs written with a
    /// different digest length still load.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(FingerprintError::Malformed(s.to_string()))
        }
    }
}

/// One line of the fingerprint log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub timestamp: u64,
    pub fingerprint: Fingerprint,
    /// Path of the built file relative to the site root. May contain spaces.
    pub filename: String,
}

impl fmt::Display for FingerprintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.timestamp, self.fingerprint, self.filename)
    }
}

impl FromStr for FingerprintRecord {
    type Err = FingerprintError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || FingerprintError::Malformed(line.to_string());
        let mut parts = line.splitn(3, ' ');
        let timestamp = parts
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let fingerprint = parts
            .next()
            .ok_or_else(malformed)?
            .parse()
            .map_err(|_| malformed())?;
        let filename = parts.next().unwrap_or_default().to_string();
        Ok(Self {
            timestamp,
            fingerprint,
            filename,
        })
    }
}

/// Append-only store of built fingerprints, backed by a text log.
///
/// Membership is answered from an in-memory set loaded once at
/// [`open`](Self::open) and kept current by [`record`](Self::record). The
/// most recent fingerprint per filename is tracked alongside it.
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    built: HashSet<Fingerprint>,
    latest: HashMap<String, Fingerprint>,
}

impl FingerprintStore {
    /// Load the log at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, FingerprintError> {
        let mut built = HashSet::new();
        let mut latest = HashMap::new();
        for record in read_records(path)? {
            built.insert(record.fingerprint.clone());
            latest.insert(record.filename, record.fingerprint);
        }
        Ok(Self {
            path: path.to_path_buf(),
            built,
            latest,
        })
    }

    /// True iff any record carries this fingerprint, whatever its filename.
    pub fn has_been_built(&self, fingerprint: &Fingerprint) -> bool {
        self.built.contains(fingerprint)
    }

    /// Fingerprint of the last record written under `filename`.
    pub fn latest_for(&self, filename: &str) -> Option<&Fingerprint> {
        self.latest.get(filename)
    }

    /// Append a record and sync it to disk before returning.
    pub fn record(
        &mut self,
        fingerprint: &Fingerprint,
        filename: &str,
        timestamp: u64,
    ) -> Result<(), FingerprintError> {
        let record = FingerprintRecord {
            timestamp,
            fingerprint: fingerprint.clone(),
            filename: filename.to_string(),
        };
        let append = |source| FingerprintError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append)?;
        writeln!(file, "{record}").map_err(append)?;
        file.sync_data().map_err(append)?;

        self.built.insert(record.fingerprint.clone());
        self.latest.insert(record.filename, record.fingerprint);
        Ok(())
    }
}

/// Read every well-formed record from the log, in file order.
pub fn read_records(path: &Path) -> Result<Vec<FingerprintRecord>, FingerprintError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(FingerprintError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let records = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match line.parse::<FingerprintRecord>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(log = %path.display(), "skipping fingerprint record: {e}");
                None
            }
        })
        .collect();
    Ok(records)
}

/// Seconds since the Unix epoch, for record timestamps.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Summary of publish decisions for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub written: u32,
    pub skipped: u32,
}

impl BuildStats {
    pub fn write(&mut self) {
        self.written += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn total(&self) -> u32 {
        self.written + self.skipped
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped > 0 {
            write!(
                f,
                "{} written, {} unchanged ({} total)",
                self.written,
                self.skipped,
                self.total()
            )
        } else {
            write!(f, "{} written", self.written)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(tmp: &TempDir) -> PathBuf {
        tmp.path().join("logfile")
    }

    // =========================================================================
    // Fingerprints
    // =========================================================================

    #[test]
    fn fingerprint_is_sha1_hex() {
        // Well-known SHA-1 of the empty string.
        assert_eq!(
            Fingerprint::of("").as_str(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(Fingerprint::of("hello world").as_str().len(), 40);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        assert_ne!(Fingerprint::of("version 1"), Fingerprint::of("version 2"));
    }

    #[test]
    fn fingerprint_of_file_matches_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.md");
        fs::write(&path, "# Page\n").unwrap();
        assert_eq!(Fingerprint::of_file(&path).unwrap(), Fingerprint::of("# Page\n"));
    }

    #[test]
    fn fingerprint_parse_rejects_non_hex() {
        assert!("xyz".parse::<Fingerprint>().is_err());
        assert!("".parse::<Fingerprint>().is_err());
        assert_eq!("ABC1".parse::<Fingerprint>().unwrap().as_str(), "abc1");
    }

    // =========================================================================
    // Records
    // =========================================================================

    #[test]
    fn record_line_format() {
        let record = FingerprintRecord {
            timestamp: 1700000000,
            fingerprint: Fingerprint::of("x"),
            filename: "pages/index.md".into(),
        };
        assert_eq!(
            record.to_string(),
            format!("1700000000 {} pages/index.md", Fingerprint::of("x"))
        );
    }

    #[test]
    fn record_parse_keeps_spaces_in_filename() {
        let line = "12 abcdef pages/my notes.md";
        let record: FingerprintRecord = line.parse().unwrap();
        assert_eq!(record.timestamp, 12);
        assert_eq!(record.fingerprint.as_str(), "abcdef");
        assert_eq!(record.filename, "pages/my notes.md");
    }

    #[test]
    fn record_parse_rejects_garbage() {
        assert!("not a record".parse::<FingerprintRecord>().is_err());
        assert!("12".parse::<FingerprintRecord>().is_err());
    }

    // =========================================================================
    // Store
    // =========================================================================

    #[test]
    fn missing_log_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        assert!(!store.has_been_built(&Fingerprint::of("anything")));
        assert!(read_records(&log_in(&tmp)).unwrap().is_empty());
    }

    #[test]
    fn record_then_lookup() {
        let tmp = TempDir::new().unwrap();
        let mut store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        let fp = Fingerprint::of("content");

        store.record(&fp, "pages/a.md", 1).unwrap();

        assert!(store.has_been_built(&fp));
    }

    #[test]
    fn lookup_ignores_filename() {
        let tmp = TempDir::new().unwrap();
        let mut store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        let fp = Fingerprint::of("shared content");
        store.record(&fp, "pages/old-name.md", 1).unwrap();

        let reopened = FingerprintStore::open(&log_in(&tmp)).unwrap();
        assert!(reopened.has_been_built(&fp));
    }

    #[test]
    fn records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        store.record(&Fingerprint::of("a"), "a.md", 10).unwrap();
        store.record(&Fingerprint::of("b"), "b.md", 20).unwrap();

        let reopened = FingerprintStore::open(&log_in(&tmp)).unwrap();
        assert!(reopened.has_been_built(&Fingerprint::of("a")));
        assert!(reopened.has_been_built(&Fingerprint::of("b")));
    }

    #[test]
    fn log_is_append_only() {
        let tmp = TempDir::new().unwrap();
        let path = log_in(&tmp);
        let mut store = FingerprintStore::open(&path).unwrap();
        let fp = Fingerprint::of("same");
        store.record(&fp, "a.md", 1).unwrap();
        store.record(&fp, "a.md", 2).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1);
        assert_eq!(records[1].timestamp, 2);
    }

    #[test]
    fn reverted_content_counts_as_built() {
        let tmp = TempDir::new().unwrap();
        let mut store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        let first = Fingerprint::of("# Draft\n");
        let second = Fingerprint::of("# Final\n");
        assert_ne!(first, second);

        store.record(&first, "pages/post.md", 1).unwrap();
        store.record(&second, "pages/post.md", 2).unwrap();

        // Back to the first version: still known, even though the latest
        // build of this file was the second one.
        assert!(store.has_been_built(&Fingerprint::of("# Draft\n")));
    }

    #[test]
    fn latest_for_follows_the_last_record() {
        let tmp = TempDir::new().unwrap();
        let mut store = FingerprintStore::open(&log_in(&tmp)).unwrap();
        let first = Fingerprint::of("one");
        let second = Fingerprint::of("two");
        store.record(&first, "<navigation>", 1).unwrap();
        store.record(&second, "<navigation>", 2).unwrap();
        store.record(&first, "<navigation>", 3).unwrap();
        assert_eq!(store.latest_for("<navigation>"), Some(&first));

        store.record(&second, "<navigation>", 4).unwrap();
        let reopened = FingerprintStore::open(&log_in(&tmp)).unwrap();
        assert_eq!(reopened.latest_for("<navigation>"), Some(&second));
        assert_eq!(reopened.latest_for("other.md"), None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = log_in(&tmp);
        let good = Fingerprint::of("good");
        fs::write(
            &path,
            format!("garbage line\n\n5 {good} pages/good.md\nx y z\n"),
        )
        .unwrap();

        let store = FingerprintStore::open(&path).unwrap();
        assert_eq!(read_records(&path).unwrap().len(), 1);
        assert!(store.has_been_built(&good));
    }

    #[test]
    fn reads_legacy_log_lines() {
        let tmp = TempDir::new().unwrap();
        let path = log_in(&tmp);
        fs::write(
            &path,
            "1650000000 2ef7bde608ce5404e97d5f042f95f89f1c232871 index.md\n",
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records[0].filename, "index.md");
        assert_eq!(records[0].timestamp, 1650000000);
    }

    // =========================================================================
    // BuildStats
    // =========================================================================

    #[test]
    fn build_stats_display_with_skips() {
        let stats = BuildStats {
            written: 2,
            skipped: 5,
        };
        assert_eq!(stats.to_string(), "2 written, 5 unchanged (7 total)");
    }

    #[test]
    fn build_stats_display_all_written() {
        let mut stats = BuildStats::default();
        stats.write();
        stats.write();
        assert_eq!(stats.to_string(), "2 written");
    }

    #[test]
    fn build_stats_counts() {
        let mut stats = BuildStats::default();
        stats.write();
        stats.skip();
        stats.skip();
        assert_eq!(stats.total(), 3);
    }
}
