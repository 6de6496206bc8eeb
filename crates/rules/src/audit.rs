//! Bulk auditing of documents on disk.
//!
//! Line-oriented: every surviving match becomes its own [`LineMatch`], not
//! grouped by rule. Traversal is sequential.

use chrono::{DateTime, Utc};
use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::RuleCatalog;
use crate::scanner::Scanner;

/// Filename patterns audited when none are given.
pub const DEFAULT_PATTERNS: &[&str] = &["*.md", "*.yaml", "*.yml"];

/// Directory names never descended into.
pub const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "venv", ".venv", "__pycache__", "target"];

/// Extensions whose comment lines are ignored.
const CODE_EXTENSIONS: &[&str] = &["py", "js", "ts", "rs"];
const COMMENT_MARKERS: &[&str] = &["#", "//", "/*"];

/// Errors from auditing.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Path does not exist
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid filename pattern
    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern as given
        pattern: String,
        /// Underlying error
        #[source]
        source: glob::PatternError,
    },
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// One forbidden match on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    /// 1-based line number
    pub line: usize,
    /// Rule that matched
    pub rule: String,
    /// Matched text
    pub matched: String,
    /// Trimmed line
    pub context: String,
}

/// Aggregate result of an audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Files with at least one match
    pub files: BTreeMap<PathBuf, Vec<LineMatch>>,
    /// Number of files read
    pub files_scanned: usize,
    /// When the audit ran
    pub scanned_at: DateTime<Utc>,
}

impl AuditReport {
    fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            files_scanned: 0,
            scanned_at: Utc::now(),
        }
    }

    /// Total matches across all files.
    pub fn total_violations(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// No matches anywhere.
    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    /// Process exit status for a bulk check.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

/// Audits files and directory trees.
#[derive(Debug, Clone, Copy)]
pub struct Auditor<'c> {
    scanner: Scanner<'c>,
}

impl<'c> Auditor<'c> {
    /// Create an auditor over `catalog`.
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self {
            scanner: Scanner::new(catalog),
        }
    }

    /// Audit a single file.
    pub fn scan_file(&self, path: impl AsRef<Path>) -> Result<Vec<LineMatch>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AuditError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.scan_text(&text, is_code_file(path)))
    }

    /// Audit in-memory text line by line.
    pub fn scan_text(&self, text: &str, skip_comments: bool) -> Vec<LineMatch> {
        let mut matches = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if skip_comments && COMMENT_MARKERS.iter().any(|m| trimmed.starts_with(m)) {
                continue;
            }

            for hit in self.scanner.scan_line(line) {
                matches.push(LineMatch {
                    line: idx + 1,
                    rule: hit.rule.name().to_string(),
                    matched: hit.matched,
                    context: trimmed.to_string(),
                });
            }
        }

        matches
    }

    /// Recursively audit files under `root` whose names match any pattern.
    ///
    /// Each file is scanned at most once, however many patterns it matches.
    /// Symlinked files are followed; symlinked directories are not.
    /// Unreadable files are logged and skipped.
    pub fn scan_directory(&self, root: impl AsRef<Path>, patterns: &[&str]) -> Result<AuditReport> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(AuditError::NotFound(root.to_path_buf()));
        }

        let patterns = compile_patterns(patterns)?;
        let mut files = Vec::new();
        walk_files(root, &mut files);
        files.sort();

        let mut report = AuditReport::new();
        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !patterns.iter().any(|p| p.matches(name)) {
                continue;
            }

            match self.scan_file(&path) {
                Ok(matches) => {
                    report.files_scanned += 1;
                    if !matches.is_empty() {
                        tracing::debug!(path = %path.display(), matches = matches.len(), "violations found");
                        report.files.insert(path, matches);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable file"),
            }
        }

        Ok(report)
    }

    /// Audit a file or a directory tree.
    pub fn audit_path(&self, path: impl AsRef<Path>, patterns: &[&str]) -> Result<AuditReport> {
        let path = path.as_ref();
        if path.is_file() {
            let mut report = AuditReport::new();
            let matches = self.scan_file(path)?;
            report.files_scanned = 1;
            if !matches.is_empty() {
                report.files.insert(path.to_path_buf(), matches);
            }
            Ok(report)
        } else if path.is_dir() {
            self.scan_directory(path, patterns)
        } else {
            Err(AuditError::NotFound(path.to_path_buf()))
        }
    }
}

fn compile_patterns(patterns: &[&str]) -> Result<Vec<Pattern>> {
    let patterns = if patterns.is_empty() { DEFAULT_PATTERNS } else { patterns };
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| AuditError::Pattern {
                pattern: p.to_string(),
                source,
            })
        })
        .collect()
}

fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| SKIPPED_DIRS.contains(&name));
            if !skipped {
                walk_files(&path, out);
            }
        } else if file_type.is_file() {
            out.push(path);
        } else if file_type.is_symlink() {
            // Links to files are followed, links to directories are not.
            match std::fs::metadata(&path) {
                Ok(target) if target.is_file() => out.push(path),
                Ok(_) => tracing::debug!(path = %path.display(), "not following directory link"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "dangling link"),
            }
        }
    }
}

fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn auditor() -> Auditor<'static> {
        Auditor::new(RuleCatalog::builtin())
    }

    #[test]
    fn test_scan_text_reports_each_match() {
        let text = "# Plan\n\nPhase 1 takes 3 days\nThen Q1 2025 launch, 2 weeks later\n";
        let matches = auditor().scan_text(text, false);

        let found: Vec<(usize, &str)> = matches.iter().map(|m| (m.line, m.matched.as_str())).collect();
        assert_eq!(found, vec![(3, "3 days"), (4, "2 weeks"), (4, "Q1 2025")]);
        assert_eq!(matches[1].context, "Then Q1 2025 launch, 2 weeks later");
    }

    #[test]
    fn test_exception_suppresses_whole_line() {
        let text = "Copyright 2024, delivered in 2 weeks\nDelivered in 2 weeks";
        let matches = auditor().scan_text(text, false);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);
    }

    #[test]
    fn test_comment_lines_skipped_in_code_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.py");
        fs::write(&path, "# retry after 2 days\nSCHEDULE = '3 days'\n").unwrap();

        let matches = auditor().scan_file(&path).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, 2);

        let md = dir.path().join("notes.md");
        fs::write(&md, "# retry after 2 days\n").unwrap();
        assert_eq!(auditor().scan_file(&md).unwrap().len(), 1);
    }

    #[test]
    fn test_directory_scan_reports_only_offending_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("roadmap.md"), "Launch in Q1 2025\n").unwrap();
        fs::write(dir.path().join("clean.md"), "Priority: High\n").unwrap();

        let report = auditor().scan_directory(dir.path(), DEFAULT_PATTERNS).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.files.contains_key(&dir.path().join("roadmap.md")));
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.total_violations(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_directory_scan_skips_housekeeping_and_unmatched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(dir.path().join("docs/nested")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/README.md"), "2 weeks\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "2 weeks\n").unwrap();
        fs::write(dir.path().join("docs/nested/plan.yml"), "timeline: 3\n").unwrap();

        let report = auditor().scan_directory(dir.path(), &[]).unwrap();
        let files: Vec<&PathBuf> = report.files.keys().collect();
        assert_eq!(files, vec![&dir.path().join("docs/nested/plan.yml")]);
    }

    #[test]
    fn test_clean_tree_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "Priority 1: parser\n").unwrap();
        let report = auditor().audit_path(dir.path(), DEFAULT_PATTERNS).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_audit_single_file_and_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.md");
        fs::write(&path, "Due by Friday\n").unwrap();

        let report = auditor().audit_path(&path, DEFAULT_PATTERNS).unwrap();
        assert_eq!(report.total_violations(), 1);

        let missing = auditor().audit_path(dir.path().join("missing"), DEFAULT_PATTERNS);
        assert!(matches!(missing, Err(AuditError::NotFound(_))));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = auditor().scan_directory(dir.path(), &["[*.md"]).unwrap_err();
        assert!(matches!(err, AuditError::Pattern { .. }));
    }

    #[test]
    fn test_unreadable_file_skipped_others_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, b'2', b' ', b'w']).unwrap();
        fs::write(dir.path().join("roadmap.md"), "Ship in 2 weeks\n").unwrap();

        let report = auditor().scan_directory(dir.path(), DEFAULT_PATTERNS).unwrap();
        let files: Vec<&PathBuf> = report.files.keys().collect();
        assert_eq!(files, vec![&dir.path().join("roadmap.md")]);
        assert_eq!(report.files_scanned, 1);
        assert!(matches!(
            auditor().scan_file(dir.path().join("binary.md")),
            Err(AuditError::Read { .. })
        ));
    }

    #[test]
    fn test_file_matching_several_patterns_scanned_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plan.md"), "Launch in 2 weeks\n").unwrap();

        let report = auditor().scan_directory(dir.path(), &["*.md", "plan*"]).unwrap();
        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.total_violations(), 1);
        assert_eq!(report.files[&dir.path().join("plan.md")].len(), 1);
    }

    #[test]
    fn test_skipped_dirs_match_exact_names_only() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["gitnotes", "targets", "target", ".git"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("notes.md"), "Ship in 2 weeks\n").unwrap();
        }

        let report = auditor().scan_directory(dir.path(), DEFAULT_PATTERNS).unwrap();
        let files: Vec<&PathBuf> = report.files.keys().collect();
        assert_eq!(
            files,
            vec![
                &dir.path().join("gitnotes/notes.md"),
                &dir.path().join("targets/notes.md"),
            ]
        );
        assert_eq!(report.files_scanned, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_followed() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("shared.txt");
        fs::write(&target, "Deliver in 3 months\n").unwrap();

        let dir = tempfile::tempdir().unwrap();
        symlink(&target, dir.path().join("linked.md")).unwrap();
        symlink(dir.path(), dir.path().join("loop")).unwrap();
        symlink(outside.path().join("missing.md"), dir.path().join("dangling.md")).unwrap();

        let report = auditor().scan_directory(dir.path(), DEFAULT_PATTERNS).unwrap();
        let files: Vec<&PathBuf> = report.files.keys().collect();
        assert_eq!(files, vec![&dir.path().join("linked.md")]);
        assert_eq!(report.files_scanned, 1);
    }
}
