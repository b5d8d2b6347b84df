//! Import and export of a single flashcard set as JSON or CSV.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use flash_core::ValidationError;
use flash_core::model::FlashcardSet;
use flash_core::stats::recompute_stats;

use crate::records::{SetRecord, TermRow};
use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetFormat {
    Json,
    Csv,
}

impl SetFormat {
    /// Pick the format from a `.json` or `.csv` extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            SetFormat::Json => "json",
            SetFormat::Csv => "csv",
        }
    }

    /// `<set name>.<ext>`, the file name used when exporting.
    #[must_use]
    pub fn file_name(self, set_name: &str) -> String {
        format!("{set_name}.{}", self.extension())
    }
}

impl fmt::Display for SetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSetFormat(pub String);

impl fmt::Display for UnknownSetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported format `{}` (expected json or csv)", self.0)
    }
}

impl std::error::Error for UnknownSetFormat {}

impl FromStr for SetFormat {
    type Err = UnknownSetFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SetFormat::Json),
            "csv" => Ok(SetFormat::Csv),
            other => Err(UnknownSetFormat(other.to_owned())),
        }
    }
}

/// One CSV line: `Term,Definition,Correct,Total`.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Term", default)]
    term: Option<String>,
    #[serde(rename = "Definition", default)]
    definition: Option<String>,
    #[serde(rename = "Correct", default)]
    correct: Option<u32>,
    #[serde(rename = "Total", default)]
    total: Option<u32>,
}

/// Write `set` to `out`.
///
/// # Errors
///
/// Returns `StorageError` if encoding or writing fails.
pub fn export_set<W: Write>(set: &FlashcardSet, format: SetFormat, out: W) -> Result<(), StorageError> {
    match format {
        SetFormat::Json => {
            serde_json::to_writer_pretty(out, &SetRecord::from_set(set)).map_err(ser)
        }
        SetFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for (term, record) in set.terms() {
                wtr.serialize(CsvRow {
                    term: Some(term.clone()),
                    definition: Some(record.definition().to_owned()),
                    correct: Some(record.correct()),
                    total: Some(record.total()),
                })
                .map_err(ser)?;
            }
            wtr.flush()?;
            Ok(())
        }
    }
}

/// Read a set from `input`. Cached stats in the input are ignored and
/// recomputed from the terms.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for undecodable input and
/// `StorageError::Invalid` for records that fail validation.
pub fn import_set<R: Read>(input: R, format: SetFormat) -> Result<FlashcardSet, StorageError> {
    let mut set = match format {
        SetFormat::Json => {
            let record: SetRecord = serde_json::from_reader(input).map_err(ser)?;
            record.into_set().map_err(flash_core::Error::from)?
        }
        SetFormat::Csv => read_csv(input)?,
    };
    recompute_stats(&mut set);
    Ok(set)
}

fn read_csv<R: Read>(input: R) -> Result<FlashcardSet, StorageError> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut terms = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row.map_err(ser)?;
        let term = row
            .term
            .ok_or(ValidationError::MissingField("Term"))
            .map_err(flash_core::Error::from)?;
        let record = TermRow {
            definition: row.definition,
            correct: row.correct,
            total: row.total,
        }
        .into_term()
        .map_err(flash_core::Error::from)?;
        terms.push((term, record));
    }
    let set = FlashcardSet::from_persisted(None, terms, Default::default())
        .map_err(flash_core::Error::from)?;
    Ok(set)
}

/// Export to a file.
///
/// # Errors
///
/// Returns `StorageError` if the file cannot be created or written.
pub fn export_to_path(set: &FlashcardSet, format: SetFormat, path: &Path) -> Result<(), StorageError> {
    let mut out = BufWriter::new(File::create(path)?);
    export_set(set, format, &mut out)?;
    out.flush()?;
    log::info!("exported set to {}", path.display());
    Ok(())
}

/// Import from a file whose extension names the format.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for unsupported extensions, plus
/// the errors of [`import_set`].
pub fn import_from_path(path: &Path) -> Result<FlashcardSet, StorageError> {
    let format = SetFormat::from_path(path).ok_or_else(|| {
        StorageError::Serialization(format!(
            "unsupported file `{}`: expected .json or .csv",
            path.display()
        ))
    })?;
    let set = import_set(BufReader::new(File::open(path)?), format)?;
    log::info!("imported {} term(s) from {}", set.len(), path.display());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::grader::Tier;

    fn practiced_python() -> FlashcardSet {
        let mut set = FlashcardSet::default_python();
        set.term_mut("Loop").unwrap().apply(Tier::Correct);
        set.term_mut("Loop").unwrap().apply(Tier::Incorrect);
        recompute_stats(&mut set);
        set
    }

    #[test]
    fn csv_export_has_expected_header_and_rows() {
        let mut buf = Vec::new();
        export_set(&practiced_python(), SetFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Term,Definition,Correct,Total"));
        assert_eq!(
            lines.next(),
            Some("Python,A high-level programming language.,0,0")
        );
        assert_eq!(
            lines.last(),
            Some("Loop,A programming construct that repeats a block of code.,1,2")
        );
    }

    #[test]
    fn csv_import_recomputes_stats() {
        let input = "Term,Definition,Correct,Total\nOwnership,\"Who frees memory, and when\",3,4\nBorrow,A reference,0,1\n";
        let set = import_set(input.as_bytes(), SetFormat::Csv).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.term("Ownership").unwrap().definition(),
            "Who frees memory, and when"
        );
        assert_eq!(set.stats().correct, 3);
        assert_eq!(set.stats().total, 5);
        assert_eq!(set.category(), "Uncategorized");
    }

    #[test]
    fn csv_import_rejects_missing_definition() {
        let input = "Term,Correct,Total\nLoop,0,0\n";
        let err = import_set(input.as_bytes(), SetFormat::Csv).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Invalid(flash_core::Error::Validation(
                ValidationError::MissingField("definition")
            ))
        ));
    }

    #[test]
    fn json_import_ignores_cached_stats() {
        let input = r#"{
            "category": "Rust",
            "terms": {"Trait": {"definition": "Shared behaviour", "correct": 1, "total": 1}},
            "stats": {"correct": 99, "total": 99, "percentage": 100.0}
        }"#;
        let set = import_set(input.as_bytes(), SetFormat::Json).unwrap();
        assert_eq!(set.category(), "Rust");
        assert_eq!(set.stats().total, 1);
    }

    #[test]
    fn files_round_trip_through_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let original = practiced_python();
        for format in [SetFormat::Json, SetFormat::Csv] {
            let path = dir.path().join(format.file_name("Python (default)"));
            export_to_path(&original, format, &path).unwrap();
            let imported = import_from_path(&path).unwrap();
            assert_eq!(imported.terms(), original.terms());
            assert_eq!(imported.stats(), original.stats());
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert_eq!(SetFormat::from_path(Path::new("cards.txt")), None);
        assert_eq!(SetFormat::from_path(Path::new("cards.CSV")), Some(SetFormat::Csv));
        assert!(import_from_path(Path::new("cards.txt")).is_err());
    }
}
