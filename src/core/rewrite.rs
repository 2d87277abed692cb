// Scan, append, and rewrite-pass primitives over newline-delimited record files.
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::codec::RecordCodec;
use crate::core::error::{Error, ErrorKind};

/// Per-record outcome of a rewrite pass.
pub enum Decision<R> {
    /// Re-emit the record unchanged (canonical encoding).
    Keep,
    /// Emit the replacement record instead.
    Replace(R),
    /// Emit nothing.
    Drop,
}

/// Read every decodable record from `path` in file order.
///
/// A missing file reads as an empty store. Lines the codec cannot decode are
/// skipped.
pub fn scan<C>(path: &Path, codec: &C) -> Result<Vec<C::Record>, Error>
where
    C: RecordCodec,
{
    let Some(reader) = open_for_scan(path)? else {
        return Ok(Vec::new());
    };
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|err| read_error(path, err))?;
        if let Some(record) = codec.decode(&line) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Return the first decodable record matching `predicate`, scanning in file
/// order and stopping at the first hit.
pub fn find_first<C, F>(path: &Path, codec: &C, mut predicate: F) -> Result<Option<C::Record>, Error>
where
    C: RecordCodec,
    F: FnMut(&C::Record) -> bool,
{
    let Some(reader) = open_for_scan(path)? else {
        return Ok(None);
    };
    for line in reader.lines() {
        let line = line.map_err(|err| read_error(path, err))?;
        if let Some(record) = codec.decode(&line) {
            if predicate(&record) {
                return Ok(Some(record));
            }
        }
    }
    Ok(None)
}

/// Append one encoded record to `path`, creating the file if needed.
pub fn append<C>(path: &Path, codec: &C, record: &C::Record) -> Result<(), Error>
where
    C: RecordCodec,
{
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    file.write_all(codec.encode(record).as_bytes())
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    Ok(())
}

/// Stream every line of `path` through `decide` into a sibling temp file,
/// then swap the temp file into place.
///
/// Lines the codec cannot decode are copied through verbatim. Returns whether
/// any record was replaced or dropped; when none was, the temp file is
/// discarded and the source is left untouched.
///
/// The swap is two-step: delete the source, then rename the temp over its
/// path. A crash between the two steps loses the store; that window is the
/// durability ceiling of this format (`fs::rename` onto the live path would
/// close it on POSIX targets). If the delete or rename fails the temp file
/// is left behind for manual recovery.
pub fn rewrite<C, F>(path: &Path, codec: &C, mut decide: F) -> Result<bool, Error>
where
    C: RecordCodec,
    F: FnMut(&C::Record) -> Decision<C::Record>,
{
    let source = File::open(path)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    let temp = temp_path(path);
    let temp_file = File::create(&temp)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(&temp).with_source(err))?;
    let mut writer = BufWriter::new(temp_file);

    let mut found = false;
    let mut replaced = 0u32;
    let mut dropped = 0u32;
    for line in BufReader::new(source).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                let _ = fs::remove_file(&temp);
                return Err(read_error(path, err));
            }
        };
        let result = match codec.decode(&line) {
            None => {
                // Unparseable text is someone else's data; never destroy it.
                writer
                    .write_all(line.as_bytes())
                    .and_then(|_| writer.write_all(b"\n"))
            }
            Some(record) => match decide(&record) {
                Decision::Keep => writer.write_all(codec.encode(&record).as_bytes()),
                Decision::Replace(new_record) => {
                    found = true;
                    replaced += 1;
                    writer.write_all(codec.encode(&new_record).as_bytes())
                }
                Decision::Drop => {
                    found = true;
                    dropped += 1;
                    Ok(())
                }
            },
        };
        if let Err(err) = result {
            let _ = fs::remove_file(&temp);
            return Err(Error::new(ErrorKind::Io).with_path(&temp).with_source(err));
        }
    }
    if let Err(err) = writer.flush() {
        let _ = fs::remove_file(&temp);
        return Err(Error::new(ErrorKind::Io).with_path(&temp).with_source(err));
    }
    drop(writer);

    if !found {
        let _ = fs::remove_file(&temp);
        return Ok(false);
    }

    fs::remove_file(path)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    fs::rename(&temp, path)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    debug!(path = %path.display(), replaced, dropped, "store rewritten");
    Ok(true)
}

fn open_for_scan(path: &Path) -> Result<Option<BufReader<File>>, Error> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::new(ErrorKind::Io).with_path(path).with_source(err)),
    }
}

fn read_error(path: &Path, err: io::Error) -> Error {
    Error::new(ErrorKind::Io).with_path(path).with_source(err)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::{append, find_first, rewrite, scan, temp_path, Decision};
    use crate::core::codec::{Student, StudentCodec};
    use crate::core::error::ErrorKind;
    use std::fs;
    use std::path::Path;

    fn student(roll: i32, name: &str, mark: f64) -> Student {
        Student {
            roll,
            name: name.to_string(),
            mark,
        }
    }

    fn write_store(path: &Path, content: &str) {
        fs::write(path, content).expect("seed store");
    }

    #[test]
    fn scan_reads_records_in_file_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.00\n2|Bob|75.50\n");

        let records = scan(&path, &StudentCodec).expect("scan");
        assert_eq!(records, vec![student(1, "Ada", 90.0), student(2, "Bob", 75.5)]);
    }

    #[test]
    fn scan_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.txt");
        assert!(scan(&path, &StudentCodec).expect("scan").is_empty());
    }

    #[test]
    fn scan_skips_undecodable_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.00\nnot a record\n2|Bob|75.50\n");

        let records = scan(&path, &StudentCodec).expect("scan");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn find_first_stops_at_first_match() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "7|First|10.00\n7|Second|20.00\n");

        let hit = find_first(&path, &StudentCodec, |s| s.roll == 7)
            .expect("find")
            .expect("some");
        assert_eq!(hit.name, "First");
    }

    #[test]
    fn append_creates_the_file_on_first_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");

        append(&path, &StudentCodec, &student(3, "Cy", 66.6)).expect("append");
        append(&path, &StudentCodec, &student(4, "Di", 50.0)).expect("append");

        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "3|Cy|66.60\n4|Di|50.00\n");
    }

    #[test]
    fn replace_rewrites_matching_records_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.00\n2|Bob|75.50\n3|Cy|66.60\n");

        let found = rewrite(&path, &StudentCodec, |record| {
            if record.roll == 2 {
                Decision::Replace(student(2, "Bobby", 80.0))
            } else {
                Decision::Keep
            }
        })
        .expect("rewrite");

        assert!(found);
        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "1|Ada|90.00\n2|Bobby|80.00\n3|Cy|66.60\n");
    }

    #[test]
    fn drop_removes_records_and_preserves_the_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.00\n2|Bob|75.50\n3|Cy|66.60\n");

        let found = rewrite(&path, &StudentCodec, |record| {
            if record.roll == 1 {
                Decision::Drop
            } else {
                Decision::Keep
            }
        })
        .expect("rewrite");

        assert!(found);
        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "2|Bob|75.50\n3|Cy|66.60\n");
    }

    #[test]
    fn malformed_lines_survive_a_rewrite_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.00\n# scribbled note ||| keep me\n2|Bob|75.50\n");

        rewrite(&path, &StudentCodec, |record| {
            if record.roll == 2 {
                Decision::Drop
            } else {
                Decision::Keep
            }
        })
        .expect("rewrite");

        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "1|Ada|90.00\n# scribbled note ||| keep me\n");
    }

    #[test]
    fn no_match_discards_the_temp_and_leaves_the_source_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        // Denormalized mark on purpose: a no-op pass must not canonicalize it.
        write_store(&path, "1|Ada|90.5\n");

        let found = rewrite(&path, &StudentCodec, |_| Decision::Keep).expect("rewrite");

        assert!(!found);
        assert_eq!(fs::read_to_string(&path).expect("read"), "1|Ada|90.5\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn surviving_records_are_canonicalized_when_the_pass_lands() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("students.txt");
        write_store(&path, "1|Ada|90.5\n2|Bob|75.50\n");

        rewrite(&path, &StudentCodec, |record| {
            if record.roll == 2 {
                Decision::Drop
            } else {
                Decision::Keep
            }
        })
        .expect("rewrite");

        assert_eq!(fs::read_to_string(&path).expect("read"), "1|Ada|90.50\n");
    }

    #[test]
    fn rewrite_of_missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.txt");

        let err = rewrite(&path, &StudentCodec, |_| Decision::Keep).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn temp_path_is_a_sibling_with_tmp_suffix() {
        let path = Path::new("/data/students.txt");
        assert_eq!(temp_path(path), Path::new("/data/students.txt.tmp"));
    }
}
