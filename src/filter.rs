//! Entry classification
//!
//! The classifier is a pure predicate over a path and its (already fetched)
//! metadata. Workers stat every entry exactly once and pass the metadata in;
//! the classifier never touches the filesystem itself.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use uzers::{get_group_by_gid, get_user_by_uid};

/// Decides whether a discovered entry is included in the output.
///
/// Unset filters accept everything; all set filters must match. Both files
/// and directories are run through the same predicate.
#[derive(Debug, Clone, Default)]
pub struct FileClassifier {
    /// Allowed extensions, stored without the leading dot
    pub extensions: Vec<String>,

    /// Minimum size in bytes (inclusive)
    pub min_size: Option<u64>,

    /// Maximum size in bytes (inclusive)
    pub max_size: Option<u64>,

    /// Owning user name
    pub owner: Option<String>,

    /// Owning group name
    pub group: Option<String>,

    /// Unix timestamp; entries modified before this are rejected
    pub modified_after: Option<i64>,

    /// Unix timestamp; entries modified after this are rejected
    pub modified_before: Option<i64>,

    /// Exact permission bits (mode & 0o777)
    pub permissions: Option<u32>,
}

impl FileClassifier {
    /// A classifier with no filters set
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Check whether an entry passes every configured filter
    pub fn matches(&self, path: &Path, meta: &Metadata) -> bool {
        self.matches_extension(path)
            && self.matches_size(meta.len())
            && self.matches_owner(meta.uid())
            && self.matches_group(meta.gid())
            && self.matches_mtime(meta.mtime())
            && self.matches_permissions(meta.mode())
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension() {
            Some(ext) => self.extensions.iter().any(|e| ext == e.as_str()),
            // No extension at all - rejected when an allow-list is set
            None => false,
        }
    }

    fn matches_size(&self, size: u64) -> bool {
        if let Some(min) = self.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    fn matches_owner(&self, uid: u32) -> bool {
        match &self.owner {
            Some(wanted) => get_user_by_uid(uid)
                .map(|u| u.name().to_string_lossy() == wanted.as_str())
                .unwrap_or(false),
            None => true,
        }
    }

    fn matches_group(&self, gid: u32) -> bool {
        match &self.group {
            Some(wanted) => get_group_by_gid(gid)
                .map(|g| g.name().to_string_lossy() == wanted.as_str())
                .unwrap_or(false),
            None => true,
        }
    }

    fn matches_mtime(&self, mtime: i64) -> bool {
        if let Some(after) = self.modified_after {
            if mtime < after {
                return false;
            }
        }
        if let Some(before) = self.modified_before {
            if mtime > before {
                return false;
            }
        }
        true
    }

    fn matches_permissions(&self, mode: u32) -> bool {
        match self.permissions {
            Some(wanted) => mode & 0o777 == wanted,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn classifier() -> FileClassifier {
        FileClassifier::accept_all()
    }

    #[test]
    fn test_accept_all_matches_everything() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("anything.bin");
        fs::write(&file, b"data").unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();

        assert!(classifier().matches(&file, &meta));
    }

    #[test]
    fn test_extension_filter() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        let log = dir.path().join("server.log");
        let bare = dir.path().join("README");
        for p in [&txt, &log, &bare] {
            fs::write(p, b"x").unwrap();
        }

        let mut c = classifier();
        c.extensions = vec!["txt".into(), "csv".into()];

        assert!(c.matches(&txt, &fs::symlink_metadata(&txt).unwrap()));
        assert!(!c.matches(&log, &fs::symlink_metadata(&log).unwrap()));
        assert!(!c.matches(&bare, &fs::symlink_metadata(&bare).unwrap()));
    }

    #[test]
    fn test_size_filter() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("ten.bin");
        fs::write(&file, vec![0u8; 10]).unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();

        let mut c = classifier();
        c.min_size = Some(5);
        c.max_size = Some(20);
        assert!(c.matches(&file, &meta));

        c.min_size = Some(11);
        assert!(!c.matches(&file, &meta));

        c.min_size = Some(5);
        c.max_size = Some(9);
        assert!(!c.matches(&file, &meta));
    }

    #[test]
    fn test_permission_filter() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("locked");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();

        let mut c = classifier();
        c.permissions = Some(0o640);
        assert!(c.matches(&file, &meta));

        c.permissions = Some(0o644);
        assert!(!c.matches(&file, &meta));
    }

    #[test]
    fn test_owner_filter() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("mine");
        fs::write(&file, b"x").unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();

        let me = uzers::get_user_by_uid(meta.uid())
            .map(|u| u.name().to_string_lossy().into_owned());
        let Some(me) = me else {
            // uid has no passwd entry in this environment
            return;
        };

        let mut c = classifier();
        c.owner = Some(me);
        assert!(c.matches(&file, &meta));

        c.owner = Some("no-such-user-hopefully".into());
        assert!(!c.matches(&file, &meta));
    }

    #[test]
    fn test_mtime_window() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("now");
        fs::write(&file, b"x").unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();
        let mtime = meta.mtime();

        let mut c = classifier();
        c.modified_after = Some(mtime - 60);
        c.modified_before = Some(mtime + 60);
        assert!(c.matches(&file, &meta));

        c.modified_after = Some(mtime + 60);
        assert!(!c.matches(&file, &meta));

        c.modified_after = None;
        c.modified_before = Some(mtime - 60);
        assert!(!c.matches(&file, &meta));
    }
}
