//! File tree processing
//!
//! Walks a directory tree (or a single file) with walkdir, filters entries
//! through the exclusion list, VCS pruning, and the eligibility policy,
//! then strips emojis from each eligible file, rewriting it in place
//! unless running in dry-run mode.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::core::detector::EmojiDetector;
use crate::core::model::{ProcessError, ProcessResult, WalkError};
use crate::core::paths::{base_name, clean_path};

/// Extensions never processed: executables and libraries, images, media,
/// archives, documents, sockets. Comparison is case-sensitive; everything
/// not listed (unknown extensions included) is eligible.
static SKIP_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "bin", "so", "dll", "jpg", "jpeg", "png", "gif", "bmp", "mp3", "mp4", "avi",
        "mov", "zip", "tar", "gz", "7z", "pdf", "sock",
    ]
    .into_iter()
    .collect()
});

/// Version control directories whose contents are never processed,
/// independent of the exclusion list.
const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Glob matching options: `*`/`?` never cross a path separator, matching
/// the platform glob conventions exclusion patterns are written for.
const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Processes files and directory trees to find and remove emojis.
///
/// Holds the detector and the ordered exclusion list for its lifetime;
/// processing is single-threaded with whole-file reads and writes.
pub struct FileProcessor {
    detector: EmojiDetector,
    excludes: Vec<String>,
}

impl FileProcessor {
    /// Create a processor with no exclusions and no allow list.
    pub fn new() -> Self {
        Self::with_excludes(Vec::new())
    }

    /// Create a processor with exclusion patterns.
    pub fn with_excludes(excludes: Vec<String>) -> Self {
        Self {
            detector: EmojiDetector::new(),
            excludes,
        }
    }

    /// Create a processor with exclusion patterns and allowed emojis.
    pub fn with_excludes_and_allowed(excludes: Vec<String>, allowed: Vec<String>) -> Self {
        Self {
            detector: EmojiDetector::with_allowed(allowed),
            excludes,
        }
    }

    /// The detector this processor classifies with. Callers handling
    /// in-memory content (piped input) use it directly.
    pub fn detector(&self) -> &EmojiDetector {
        &self.detector
    }

    /// Walk the tree rooted at `root` and process every eligible file.
    ///
    /// Results come back in deterministic traversal order and contain only
    /// files where emojis were found; clean files are walked but not
    /// reported. The first read or write failure aborts the whole walk.
    pub fn process_tree(
        &self,
        root: &Path,
        dry_run: bool,
    ) -> Result<Vec<ProcessResult>, WalkError> {
        let mut results = Vec::new();
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;
            let path = entry.path();

            if self.is_excluded(path) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_dir() {
                continue;
            }

            if under_vcs_dir(path) || should_skip(path) {
                continue;
            }

            let result =
                self.process_file(path, dry_run)
                    .map_err(|source| WalkError::File {
                        path: path.display().to_string(),
                        source,
                    })?;

            if result.modified {
                results.push(result);
            }
        }

        Ok(results)
    }

    /// Read one file, detect emojis, and rewrite it without them.
    ///
    /// A file with nothing to remove is never written, regardless of
    /// `dry_run`. When a rewrite does happen, the file is left with
    /// owner-only read/write permission; processed files must never end
    /// up group- or world-readable.
    pub fn process_file(
        &self,
        path: &Path,
        dry_run: bool,
    ) -> Result<ProcessResult, ProcessError> {
        let bytes = fs::read(path).map_err(|source| ProcessError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let emojis = self.detector.find_emojis(&text);
        if emojis.is_empty() {
            return Ok(ProcessResult::clean(
                path.display().to_string(),
                bytes.len() as u64,
            ));
        }

        let cleaned = self.detector.remove_emojis(&text);
        let result = ProcessResult::changed(
            path.display().to_string(),
            emojis,
            bytes.len() as u64,
            cleaned.len() as u64,
        );

        if !dry_run {
            write_cleaned(path, cleaned.as_bytes()).map_err(|source| ProcessError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }

        Ok(result)
    }

    /// First matching pattern wins; matching is OR across the list.
    fn is_excluded(&self, path: &Path) -> bool {
        self.excludes
            .iter()
            .any(|pattern| matches_exclude(path, pattern))
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrite `path` with cleaned bytes and restrict it to owner-only
/// read/write, regardless of its prior permission bits.
fn write_cleaned(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Whether any path segment names a version control internals directory.
fn under_vcs_dir(path: &Path) -> bool {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|segment| VCS_DIRS.contains(&segment))
}

/// Eligibility policy: only regular files outside the extension denylist
/// are read. A failed stat means skip, never a hard error; symlinks and
/// other special files are skipped.
fn should_skip(path: &Path) -> bool {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(_) => return true,
    };

    if !metadata.is_file() {
        return true;
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => SKIP_EXTENSIONS.contains(ext),
        None => false,
    }
}

/// Match one exclusion pattern against a path.
///
/// Both sides are lexically cleaned first. An exact match always wins; an
/// absolute pattern then matches only its own descendants; a relative
/// pattern matches any path segment (directories by name anywhere in the
/// tree, files by exact basename) or, when it carries `*`/`?`, a glob
/// match against the full path or the basename.
fn matches_exclude(path: &Path, pattern: &str) -> bool {
    let path = clean_path(path);
    let pattern = clean_path(Path::new(pattern));

    if path == pattern {
        return true;
    }

    if pattern.starts_with('/') {
        return path
            .strip_prefix(&pattern)
            .is_some_and(|rest| rest.starts_with('/'));
    }

    if path.split('/').any(|segment| segment == pattern) {
        return true;
    }

    if pattern.contains(['*', '?']) {
        if let Ok(glob) = glob::Pattern::new(&pattern) {
            return glob.matches_with(&path, GLOB_OPTIONS)
                || glob.matches_with(base_name(&path), GLOB_OPTIONS);
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn result_basenames(results: &[ProcessResult]) -> Vec<String> {
        results
            .iter()
            .map(|r| base_name(&clean_path(Path::new(&r.file_path))).to_string())
            .collect()
    }

    #[test]
    fn test_process_file_dry_run_never_mutates() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.txt");
        write_file(&path, "Hi 😊");

        let processor = FileProcessor::new();
        let result = processor.process_file(&path, true).unwrap();

        assert!(result.modified);
        assert_eq!(result.emojis_found, vec!["😊"]);
        assert_eq!(result.original_size, "Hi 😊".len() as u64);
        assert_eq!(result.new_size, Some("Hi ".len() as u64));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Hi 😊");
    }

    #[test]
    fn test_process_file_rewrites_in_place() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.txt");
        write_file(&path, "Hi 😊");

        let processor = FileProcessor::new();
        let result = processor.process_file(&path, false).unwrap();

        assert!(result.modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Hi ");
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_restricts_permissions_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("a.txt");
        write_file(&path, "Hi 😊");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let processor = FileProcessor::new();
        processor.process_file(&path, false).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_file_is_never_written() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("clean.txt");
        write_file(&path, "no emojis here");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let processor = FileProcessor::new();
        let result = processor.process_file(&path, false).unwrap();

        assert!(!result.modified);
        assert_eq!(result.new_size, None);
        // Permissions untouched proves no rewrite happened.
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o644);
    }

    #[test]
    fn test_process_file_read_error() {
        let temp = tempdir().unwrap();
        let processor = FileProcessor::new();

        let err = processor
            .process_file(&temp.path().join("missing.txt"), true)
            .unwrap_err();
        assert!(matches!(err, ProcessError::Read { .. }));
    }

    #[test]
    fn test_process_tree_reports_only_files_with_emojis() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("a.txt"), "Hi 😊");
        write_file(&temp.path().join("b.txt"), "clean");

        let processor = FileProcessor::new();
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(result_basenames(&results), vec!["a.txt"]);
        assert_eq!(results[0].emojis_found, vec!["😊"]);
        assert_eq!(results[0].original_size, "Hi 😊".len() as u64);
        assert_eq!(results[0].new_size, Some("Hi ".len() as u64));
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "Hi 😊");
    }

    #[test]
    fn test_process_tree_rewrites_without_dry_run() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("a.txt"), "Hi 😊");
        write_file(&temp.path().join("b.txt"), "clean");

        let processor = FileProcessor::new();
        let results = processor.process_tree(temp.path(), false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "Hi ");
        assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "clean");
    }

    #[test]
    fn test_process_tree_deterministic_order() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("c.txt"), "🎉");
        write_file(&temp.path().join("a.txt"), "😊");
        write_file(&temp.path().join("sub/z.txt"), "🚀");

        let processor = FileProcessor::new();
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(result_basenames(&results), vec!["a.txt", "c.txt", "z.txt"]);
    }

    #[test]
    fn test_process_tree_single_file_root() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("single.txt");
        write_file(&path, "only 🚀 here");

        let processor = FileProcessor::new();
        let results = processor.process_tree(&path, true).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].emojis_found, vec!["🚀"]);
    }

    #[test]
    fn test_process_tree_skips_vcs_directories() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join(".git/objects/ab/xyz"), "😊 in git");
        write_file(&temp.path().join(".svn/entry"), "🚀 in svn");
        write_file(&temp.path().join(".hg/store"), "🎉 in hg");
        write_file(&temp.path().join("tracked.txt"), "😊 tracked");

        let processor = FileProcessor::new();
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(result_basenames(&results), vec!["tracked.txt"]);
    }

    #[test]
    fn test_process_tree_prunes_excluded_directory() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("node_modules/dep/index.js"), "😊 dep");
        write_file(&temp.path().join("src/main.js"), "🚀 main");

        let processor = FileProcessor::with_excludes(vec!["node_modules".to_string()]);
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(result_basenames(&results), vec!["main.js"]);
    }

    #[test]
    fn test_process_tree_glob_exclusion() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("unit.spec.js"), "😊 spec");
        write_file(&temp.path().join("unit.test.js"), "😊 test");

        let processor = FileProcessor::with_excludes(vec!["*.spec.js".to_string()]);
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(result_basenames(&results), vec!["unit.test.js"]);
    }

    #[test]
    fn test_process_tree_with_allowed_emojis() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("notes.txt"), "Go ✅ now 🚀");

        let processor =
            FileProcessor::with_excludes_and_allowed(Vec::new(), vec!["✅".to_string()]);
        let results = processor.process_tree(temp.path(), false).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].emojis_found, vec!["🚀"]);
        assert_eq!(
            fs::read_to_string(temp.path().join("notes.txt")).unwrap(),
            "Go ✅ now "
        );
    }

    #[test]
    fn test_process_tree_skips_denied_extensions() {
        let temp = tempdir().unwrap();
        // Emoji bytes inside a denied extension must not be reported.
        write_file(&temp.path().join("img.png"), "😊 fake image");
        write_file(&temp.path().join("doc.txt"), "😊 real text");

        let processor = FileProcessor::new();
        let results = processor.process_tree(temp.path(), true).unwrap();

        assert_eq!(result_basenames(&results), vec!["doc.txt"]);
    }

    #[test]
    fn test_process_tree_missing_root_is_walk_error() {
        let temp = tempdir().unwrap();
        let processor = FileProcessor::new();

        let err = processor
            .process_tree(&temp.path().join("gone"), true)
            .unwrap_err();
        assert!(matches!(err, WalkError::Traverse(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_tree_aborts_on_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let locked = temp.path().join("locked.txt");
        write_file(&locked, "😊 locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read(&locked).is_ok() {
            // Running as root; permission bits don't apply.
            return;
        }

        let processor = FileProcessor::new();
        let err = processor.process_tree(temp.path(), true).unwrap_err();
        assert!(matches!(err, WalkError::File { .. }));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o600)).unwrap();
    }

    #[test]
    fn test_should_skip_extension_denylist() {
        let temp = tempdir().unwrap();
        for ext in [
            "exe", "bin", "so", "dll", "jpg", "jpeg", "png", "gif", "bmp", "mp3", "mp4", "avi",
            "mov", "zip", "tar", "gz", "7z", "pdf", "sock",
        ] {
            let path = temp.path().join(format!("f.{ext}"));
            File::create(&path).unwrap();
            assert!(should_skip(&path), ".{ext} should be skipped");
        }

        for name in ["f.txt", "f.md", "f.json", "f.go", "Makefile"] {
            let path = temp.path().join(name);
            File::create(&path).unwrap();
            assert!(!should_skip(&path), "{name} should be eligible");
        }
    }

    #[test]
    fn test_should_skip_unstatable_path() {
        assert!(should_skip(Path::new("/nonexistent/definitely/missing")));
    }

    #[cfg(unix)]
    #[test]
    fn test_should_skip_symlink() {
        use std::os::unix::fs::symlink;

        let temp = tempdir().unwrap();
        let target = temp.path().join("real.txt");
        write_file(&target, "😊");
        let link = temp.path().join("link.txt");
        symlink(&target, &link).unwrap();

        assert!(!should_skip(&target));
        assert!(should_skip(&link));
    }

    #[test]
    fn test_under_vcs_dir() {
        assert!(under_vcs_dir(Path::new("project/.git/objects/ab")));
        assert!(under_vcs_dir(Path::new(".svn/entries")));
        assert!(under_vcs_dir(Path::new("/a/.hg/store/data")));
        assert!(!under_vcs_dir(Path::new("project/src/main.rs")));
        assert!(!under_vcs_dir(Path::new("project/.github/workflows")));
    }

    #[test]
    fn test_matches_exclude_segment_and_basename() {
        assert!(matches_exclude(
            Path::new("/project/node_modules/file.js"),
            "node_modules"
        ));
        assert!(matches_exclude(Path::new("/project/config.json"), "config.json"));
        assert!(matches_exclude(
            Path::new("/project/src/config.json"),
            "config.json"
        ));
        assert!(!matches_exclude(
            Path::new("/project/src/file.js"),
            "node_modules"
        ));
    }

    #[test]
    fn test_matches_exclude_glob() {
        assert!(matches_exclude(Path::new("/project/app.test.js"), "*.test.js"));
        assert!(!matches_exclude(Path::new("/project/app.js"), "*.test.js"));
        assert!(matches_exclude(Path::new("report-2.txt"), "report-?.txt"));
    }

    #[test]
    fn test_matches_exclude_absolute_prefix() {
        assert!(matches_exclude(
            Path::new("/home/user/project/build"),
            "/home/user/project/build"
        ));
        assert!(matches_exclude(
            Path::new("/home/user/project/build/output.txt"),
            "/home/user/project/build"
        ));
        // Absolute patterns never fall back to basename matching.
        assert!(!matches_exclude(
            Path::new("/home/user/other/build"),
            "/home/user/project/build"
        ));
        assert!(!matches_exclude(
            Path::new("/home/user/project/build-cache"),
            "/home/user/project/build"
        ));
    }

    #[test]
    fn test_matches_exclude_cleans_both_sides() {
        assert!(matches_exclude(Path::new("./node_modules/x"), "node_modules/"));
        assert!(matches_exclude(Path::new("a//b/skip.txt"), "skip.txt"));
    }
}
