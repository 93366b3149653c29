use crate::{
    data::{Error, RecordSet},
    read::read_records,
    write::write_records,
};
use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

/// Where the expenses live between two commands. Every command loads the whole
/// set and, if it changed anything, saves the whole set back.
pub(crate) trait RecordStore {
    fn load(&self) -> Result<RecordSet, Error>;
    fn save(&mut self, records: &RecordSet) -> Result<(), Error>;
}

/// The CSV file on disk. No locking: two processes writing at once means the
/// last one wins.
#[derive(Debug)]
pub(crate) struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the target file, so the final rename stays on one filesystem.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_staged(&self, staging: &Path, records: &RecordSet) -> Result<(), Error> {
        let file = File::create(staging).map_err(|e| Error::storage(staging, e))?;
        let mut writer = BufWriter::new(file);
        write_records(&mut writer, records).map_err(|e| Error::storage(staging, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::storage(staging, e.error()))?;
        file.sync_all().map_err(|e| Error::storage(staging, e))
    }
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<RecordSet, Error> {
        // the file is small, read it whole so I/O errors are told apart from parse errors
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} doesn't exist yet, starting empty", self.path.display());
                return Ok(RecordSet::new());
            }
            Err(e) => return Err(Error::storage(&self.path, e)),
        };
        let records = read_records(&content[..])?;
        tracing::debug!(
            "loaded {} expenses from {}",
            records.len(),
            self.path.display()
        );
        let unlisted = records.iter().filter(|r| !r.category.is_listed()).count();
        if unlisted > 0 {
            tracing::warn!("{unlisted} expenses have a category outside of the usual list");
        }
        Ok(records)
    }

    /// Writes to a staging file first and renames it over the real one, so a
    /// reader sees either the old or the new content, never half of it.
    fn save(&mut self, records: &RecordSet) -> Result<(), Error> {
        let staging = self.staging_path();
        if let Err(e) = self.write_staged(&staging, records) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            Error::storage(&self.path, e)
        })?;
        tracing::debug!("saved {} expenses to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// In-memory stand-in for `CsvStore`, same contract. Also counts saves so tests
/// can check that failed commands don't write anything.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub records: RecordSet,
    pub saves: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with(records: RecordSet) -> Self {
        Self { records, saves: 0 }
    }
}

#[cfg(test)]
impl RecordStore for MemoryStore {
    fn load(&self) -> Result<RecordSet, Error> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &RecordSet) -> Result<(), Error> {
        self.records = records.clone();
        self.saves += 1;
        Ok(())
    }
}
