//! Record serialization for accepted entries
//!
//! All workers share one `OutputSink`; the writer sits behind a single lock
//! so records from different workers are never interleaved at the byte
//! level. The encoding is chosen once at startup, not per record.

use crate::config::OutputFormat;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{File, Metadata};
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::sync::Mutex;
use uzers::{get_group_by_gid, get_user_by_uid};

/// Link-aware entry type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    #[serde(rename = "Directory")]
    Directory,
    #[serde(rename = "Regular File")]
    Regular,
    #[serde(rename = "Symbolic Link")]
    Symlink,
    #[serde(rename = "Other")]
    Other,
}

impl EntryKind {
    /// Derive the kind from a (non-followed) file type
    pub fn from_file_type(ft: &std::fs::FileType) -> Self {
        if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_file() {
            EntryKind::Regular
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }

    /// Label used by the plain and CSV encodings
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::Regular => "Regular File",
            EntryKind::Symlink => "Symbolic Link",
            EntryKind::Other => "Other",
        }
    }
}

/// One accepted entry, ready for serialization
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Octal permission bits, e.g. "644"
    pub permissions: String,
    pub owner: String,
    pub group: String,
    pub last_modified: String,
}

impl FileRecord {
    /// Build a record from a path and its link-aware metadata
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        Self {
            path: path.display().to_string(),
            size: meta.len(),
            kind: EntryKind::from_file_type(&meta.file_type()),
            permissions: format!("{:o}", meta.mode() & 0o777),
            owner: owner_name(meta.uid()),
            group: group_name(meta.gid()),
            last_modified: format_mtime(meta.mtime()),
        }
    }
}

/// Resolve a uid to a user name, falling back to the numeric id
fn owner_name(uid: u32) -> String {
    get_user_by_uid(uid)
        .map(|u| u.name().to_string_lossy().into_owned())
        .unwrap_or_else(|| uid.to_string())
}

/// Resolve a gid to a group name, falling back to the numeric id
fn group_name(gid: u32) -> String {
    get_group_by_gid(gid)
        .map(|g| g.name().to_string_lossy().into_owned())
        .unwrap_or_else(|| gid.to_string())
}

/// Format a Unix mtime for display
fn format_mtime(mtime: i64) -> String {
    DateTime::from_timestamp(mtime, 0)
        .map(|t| {
            t.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| mtime.to_string())
}

/// Serialized, append-only destination for accepted records
pub struct OutputSink {
    format: OutputFormat,
    writer: Mutex<BufWriter<File>>,
}

impl OutputSink {
    /// Create the output file and write any encoding preamble
    pub fn create(path: &Path, format: OutputFormat) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        if format == OutputFormat::Csv {
            writeln!(
                writer,
                "path,size,type,permissions,owner,group,last_modified"
            )?;
        }

        Ok(Self {
            format,
            writer: Mutex::new(writer),
        })
    }

    /// Append one record; the write-and-flush happens under the sink lock
    pub fn write(&self, record: &FileRecord) -> io::Result<()> {
        let mut w = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))?;

        match self.format {
            OutputFormat::Plain => {
                writeln!(w, "Path: {}", record.path)?;
                writeln!(w, "Size: {} bytes", record.size)?;
                writeln!(w, "Type: {}", record.kind.label())?;
                writeln!(w, "Permissions: {}", record.permissions)?;
                writeln!(w, "Owner: {}", record.owner)?;
                writeln!(w, "Group: {}", record.group)?;
                writeln!(w, "Last Modified: {}", record.last_modified)?;
                writeln!(w, "-------------------")?;
            }
            OutputFormat::Csv => {
                writeln!(
                    w,
                    "{},{},{},{},{},{},{}",
                    csv_field(&record.path),
                    csv_field(&record.size.to_string()),
                    csv_field(record.kind.label()),
                    csv_field(&record.permissions),
                    csv_field(&record.owner),
                    csv_field(&record.group),
                    csv_field(&record.last_modified),
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *w, record)?;
                writeln!(w)?;
            }
        }

        w.flush()
    }

    /// Flush any buffered output
    pub fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))?
            .flush()
    }
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_record() -> FileRecord {
        FileRecord {
            path: "/data/a.txt".into(),
            size: 10,
            kind: EntryKind::Regular,
            permissions: "644".into(),
            owner: "alice".into(),
            group: "staff".into(),
            last_modified: "2026-08-01 12:00:00".into(),
        }
    }

    #[test]
    fn test_entry_kind_labels() {
        assert_eq!(EntryKind::Directory.label(), "Directory");
        assert_eq!(EntryKind::Regular.label(), "Regular File");
        assert_eq!(EntryKind::Symlink.label(), "Symbolic Link");
        assert_eq!(EntryKind::Other.label(), "Other");
    }

    #[test]
    fn test_plain_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("scan.out");
        let sink = OutputSink::create(&out, OutputFormat::Plain).unwrap();
        sink.write(&sample_record()).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("Path: /data/a.txt"));
        assert!(text.contains("Size: 10 bytes"));
        assert!(text.contains("Type: Regular File"));
        assert!(text.contains("Permissions: 644"));
        assert!(text.ends_with("-------------------\n"));
    }

    #[test]
    fn test_csv_output_with_header_and_quoting() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("scan.csv");
        let sink = OutputSink::create(&out, OutputFormat::Csv).unwrap();

        let mut record = sample_record();
        record.path = "/data/he said \"hi\".txt".into();
        sink.write(&record).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "path,size,type,permissions,owner,group,last_modified"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"/data/he said \"\"hi\"\".txt\",\"10\""));
        assert!(row.contains("\"Regular File\""));
    }

    #[test]
    fn test_json_output_is_one_object_per_line() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("scan.json");
        let sink = OutputSink::create(&out, OutputFormat::Json).unwrap();
        sink.write(&sample_record()).unwrap();
        sink.write(&sample_record()).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["path"], "/data/a.txt");
        assert_eq!(value["size"], 10);
        assert_eq!(value["type"], "Regular File");
        assert_eq!(value["permissions"], "644");
    }

    #[test]
    fn test_record_from_metadata() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("probe.txt");
        fs::write(&file, vec![0u8; 42]).unwrap();
        let meta = fs::symlink_metadata(&file).unwrap();

        let record = FileRecord::from_metadata(&file, &meta);
        assert_eq!(record.size, 42);
        assert_eq!(record.kind, EntryKind::Regular);
        assert_eq!(record.path, file.display().to_string());
        assert!(!record.owner.is_empty());
        assert!(!record.last_modified.is_empty());
    }
}
