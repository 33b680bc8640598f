//! Traits shared across reslint: resource parsing and the two validator seams.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use crate::{error::Error, report::ReportItem, types::Resource, types::ResourceFamilyView};

/// A trait for parsing a localization resource from one file.
///
/// # Example
///
/// ```rust,no_run
/// use reslint::traits::Parser;
/// let parsed = reslint::properties::PropertiesFile::read_from("messages_fr.properties")?;
/// println!("{} entries", parsed.entries.len());
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }
}

/// Validates a single `(file, key, value)` unit.
///
/// Implementations are stateless with respect to the resource being checked
/// and may be shared across worker threads.
pub trait ResourceValidator: Send + Sync {
    fn validate(&self, resource: &Resource<'_>) -> Vec<ReportItem>;
}

/// Validates one key across every locale of a family.
pub trait FamilyValidator: Send + Sync {
    fn validate(&self, view: &ResourceFamilyView<'_>) -> Vec<ReportItem>;
}
