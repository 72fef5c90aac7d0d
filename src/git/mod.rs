mod repo;

pub use repo::GitRepo;

use crate::error::Result;
use crate::model::{CommitRecord, DateRange, FileSize};

/// Anything that can yield commit records for a date range.
pub trait CommitSource {
    fn list_commits(&self, range: &DateRange) -> Result<Vec<CommitRecord>>;

    /// Files of the current tree, when the source has one.
    fn head_files(&self) -> Result<Option<Vec<FileSize>>> {
        Ok(None)
    }
}

/// Pre-loaded records, e.g. from a previous `export`.
impl CommitSource for [CommitRecord] {
    fn list_commits(&self, range: &DateRange) -> Result<Vec<CommitRecord>> {
        range.validate()?;
        Ok(self
            .iter()
            .filter(|c| range.contains(&c.utc_timestamp()))
            .cloned()
            .collect())
    }
}
