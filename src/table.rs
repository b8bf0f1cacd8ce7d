//! Result rows and the table assembled from them.
//!
//! Rows carry a heterogeneous set of fields: the fixed `filename`, `path` and
//! `suffix` columns plus whatever named groups and classifier labels a query
//! produced. A table's columns are the union of its rows' fields in order of
//! first appearance.

use crate::utils::{file_name_string, path_suffix};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const FILENAME: &str = "filename";
pub const PATH: &str = "path";
pub const SUFFIX: &str = "suffix";
pub const INFO: &str = "info";

/// One discovered file and the metadata extracted from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    path: PathBuf,
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    /// Row with the fixed `filename`, `path` and `suffix` fields.
    pub fn new(path: &Path) -> Self {
        let mut record = Self {
            path: path.to_path_buf(),
            fields: Vec::with_capacity(4),
        };
        record.set(FILENAME, Some(file_name_string(path)));
        record.set(PATH, Some(path.display().to_string()));
        record.set(SUFFIX, Some(path_suffix(path)));
        record
    }

    /// Set a field, overwriting an existing value in place.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(field) => field.1 = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Value of a field. `None` when the field is absent or null.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether the row has the field at all (possibly null).
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn filename(&self) -> &str {
        self.get(FILENAME).unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn suffix(&self) -> &str {
        self.get(SUFFIX).unwrap_or_default()
    }

    pub fn info(&self) -> Option<&str> {
        self.get(INFO)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> &[(String, Option<String>)] {
        &self.fields
    }
}

/// Ordered rows with a column list.
///
/// [`ResultTable::empty`] is column-less, which is distinct from a table with
/// known columns and zero rows ([`ResultTable::with_columns`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl ResultTable {
    /// Column-less table with no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the given columns and no rows.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Table over `records` in the given order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        Self {
            columns,
            rows: records,
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Row at a zero-based index.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    /// Values of one column across all rows, `None` where a row lacks it.
    /// Empty when the column does not exist.
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        if !self.columns.iter().any(|c| c == name) {
            return Vec::new();
        }
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    /// Write the table as tab-separated values with a leading `index` column.
    /// A column-less table writes nothing.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if !self.has_columns() {
            return Ok(());
        }
        write!(writer, "index")?;
        for column in &self.columns {
            write!(writer, "\t{}", column)?;
        }
        writeln!(writer)?;

        for (index, row) in self.rows.iter().enumerate() {
            write!(writer, "{}", index)?;
            for column in &self.columns {
                write!(writer, "\t{}", row.get(column).unwrap_or_default())?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// Serializes as an array of objects, every column present on every row.
impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    columns: &'a [String],
    row: &'a Record,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, &self.row.get(column))?;
        }
        map.end()
    }
}
