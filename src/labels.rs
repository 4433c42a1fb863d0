//! Label table: the bidirectional mapping between class indices and symbols.
//!
//! The table is built once (typically from a JSON array of symbols) and never mutated, so a
//! single instance can be shared by reference across concurrent decode calls.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Index of the CTC blank unless configured otherwise.
pub const DEFAULT_BLANK_INDEX: usize = 0;

/// An immutable alphabet of `C - 1` symbols plus a reserved blank index.
#[derive(Debug, Clone)]
pub struct LabelTable {
    /// Symbol per class index; `None` at the blank.
    symbols: Vec<Option<String>>,
    index_of: HashMap<String, usize>,
    blank_index: usize,
}

impl LabelTable {
    /// Build a table from the real symbols in order.
    ///
    /// Symbols fill the class indices in order, skipping `blank_index`. The blank may sit at
    /// any position from `0` to `labels.len()` inclusive.
    pub fn new<I, S>(labels: I, blank_index: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if blank_index > labels.len() {
            return Err(Error::BlankOutOfRange {
                blank: blank_index,
                classes: labels.len() + 1,
            });
        }

        let mut symbols = Vec::with_capacity(labels.len() + 1);
        let mut index_of = HashMap::with_capacity(labels.len());

        for (position, label) in labels.into_iter().enumerate() {
            if label.is_empty() {
                return Err(Error::EmptyLabel(position));
            }
            if symbols.len() == blank_index {
                symbols.push(None);
            }

            let index = symbols.len();
            if index_of.insert(label.clone(), index).is_some() {
                return Err(Error::DuplicateLabel(label));
            }
            symbols.push(Some(label));
        }

        if symbols.len() == blank_index {
            symbols.push(None);
        }

        Ok(Self {
            symbols,
            index_of,
            blank_index,
        })
    }

    /// Load a table from a JSON array of symbols.
    pub fn from_json_reader<R: Read>(reader: R, blank_index: usize) -> Result<Self> {
        let labels: Vec<String> = serde_json::from_reader(reader)?;
        Self::new(labels, blank_index)
    }

    /// Load a table from a JSON file holding an array of symbols.
    pub fn from_json_file(path: impl AsRef<Path>, blank_index: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            Error::msg(format!(
                "failed to open label table '{}': {err}",
                path.display()
            ))
        })?;

        let table = Self::from_json_reader(BufReader::new(file), blank_index)?;
        tracing::debug!(
            path = %path.display(),
            classes = table.num_classes(),
            blank_index,
            "loaded label table"
        );
        Ok(table)
    }

    /// Number of classes including the blank (the expected emission column count).
    pub fn num_classes(&self) -> usize {
        self.symbols.len()
    }

    pub fn blank_index(&self) -> usize {
        self.blank_index
    }

    /// Symbol for a class index.
    ///
    /// The blank and out-of-range indices are lookup errors: a decoded sequence should never
    /// contain either.
    pub fn index_to_char(&self, index: usize) -> Result<&str> {
        self.symbols
            .get(index)
            .and_then(Option::as_deref)
            .ok_or(Error::UnknownIndex(index))
    }

    /// Class index of a symbol. The blank has no symbol and is never returned.
    pub fn char_to_index(&self, symbol: &str) -> Option<usize> {
        self.index_of.get(symbol).copied()
    }

    /// Render a decoded sequence to text.
    pub fn render(&self, indices: &[usize]) -> Result<String> {
        indices
            .iter()
            .map(|&index| self.index_to_char(index))
            .collect()
    }

    /// Map a transcript to class indices, one per character.
    ///
    /// Characters the table does not know are skipped.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        let mut buf = [0u8; 4];
        text.chars()
            .filter_map(|c| self.char_to_index(c.encode_utf8(&mut buf)))
            .collect()
    }
}
