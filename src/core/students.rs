// Student store: append, linear search, and rewrite-pass mutations.
use std::path::{Path, PathBuf};

use crate::core::codec::{Student, StudentCodec};
use crate::core::error::{Error, ErrorKind};
use crate::core::rewrite::{self, Decision};

/// One `roll|name|mark` file. Roll numbers are not unique: append never
/// checks, `find` returns the first match, and `update`/`remove` affect
/// every matching record.
#[derive(Clone, Debug)]
pub struct StudentStore {
    path: PathBuf,
}

impl StudentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the store file on first use.
    pub fn append(&self, student: &Student) -> Result<(), Error> {
        check_name(&student.name)?;
        rewrite::append(&self.path, &StudentCodec, student)
    }

    /// First record with `roll`, scanning in file order.
    pub fn find(&self, roll: i32) -> Result<Option<Student>, Error> {
        rewrite::find_first(&self.path, &StudentCodec, |record| record.roll == roll)
    }

    /// Every record, in file order.
    pub fn list(&self) -> Result<Vec<Student>, Error> {
        rewrite::scan(&self.path, &StudentCodec)
    }

    /// Rewrite every record with `roll` to carry the new name and mark.
    pub fn update(&self, roll: i32, name: &str, mark: f64) -> Result<(), Error> {
        check_name(name)?;
        let found = rewrite::rewrite(&self.path, &StudentCodec, |record| {
            if record.roll == roll {
                Decision::Replace(Student {
                    roll,
                    name: name.to_string(),
                    mark,
                })
            } else {
                Decision::Keep
            }
        })?;
        if !found {
            return Err(Error::new(ErrorKind::NotFound)
                .with_path(&self.path)
                .with_key(roll.to_string()));
        }
        Ok(())
    }

    /// Drop every record with `roll`.
    pub fn remove(&self, roll: i32) -> Result<(), Error> {
        let found = rewrite::rewrite(&self.path, &StudentCodec, |record| {
            if record.roll == roll {
                Decision::Drop
            } else {
                Decision::Keep
            }
        })?;
        if !found {
            return Err(Error::new(ErrorKind::NotFound)
                .with_path(&self.path)
                .with_key(roll.to_string()));
        }
        Ok(())
    }
}

// The field delimiter inside a name would shear the record on the next
// decode; reject it before it reaches the file.
fn check_name(name: &str) -> Result<(), Error> {
    if name.contains('|') {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("student name must not contain '|'"));
    }
    Ok(())
}
