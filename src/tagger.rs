//! Lossless read/write of `carddata.txt` for tagging workflows.
//!
//! Values are kept byte-for-byte: no quote handling, tab-delimited, CRLF
//! line endings on write.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Card database is empty")]
    Empty,
    #[error("Card data is missing the '{0}' column")]
    MissingColumn(String),
    #[error("No card with key '{0}'")]
    UnknownCard(String),
}

/// Key of a card row: `Name____OfficialSet`
pub fn card_key(name: &str, official_set: &str) -> String {
    format!("{}____{}", name, official_set)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardDataFile {
    pub headers: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl CardDataFile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TaggerError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_reader(bytes.as_slice())
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, TaggerError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(TaggerError::Empty);
        }
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TaggerError::MissingColumn(name.to_string()))
        };
        let name_col = position("Name")?;
        let set_col = position("OfficialSet")?;

        let mut file = CardDataFile {
            headers: headers.clone(),
            rows: Vec::new(),
            index: HashMap::new(),
        };
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = (0..headers.len())
                .map(|i| record.get(i).unwrap_or("").to_string())
                .collect();
            let key = card_key(&row[name_col], &row[set_col]);
            match file.index.get(&key) {
                // A repeated key replaces the earlier row in place
                Some(&i) => std::mem::swap(&mut file.rows[i], &mut row),
                None => {
                    file.index.insert(key, file.rows.len());
                    file.rows.push(row);
                }
            }
        }

        log::debug!("Read {} card rows", file.rows.len());
        Ok(file)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        let mut keys: Vec<(&String, &usize)> = self.index.iter().collect();
        keys.sort_by_key(|&(_, &i)| i);
        keys.into_iter().map(|(k, _)| k)
    }

    fn column(&self, name: &str) -> Result<usize, TaggerError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TaggerError::MissingColumn(name.to_string()))
    }

    pub fn get(&self, key: &str, column: &str) -> Option<&str> {
        let col = self.column(column).ok()?;
        let row = self.index.get(key)?;
        Some(self.rows[*row][col].as_str())
    }

    pub fn set_field(&mut self, key: &str, column: &str, value: &str) -> Result<(), TaggerError> {
        let col = self.column(column)?;
        let row = *self
            .index
            .get(key)
            .ok_or_else(|| TaggerError::UnknownCard(key.to_string()))?;
        self.rows[row][col] = value.to_string();
        Ok(())
    }

    pub fn write_to<W: std::io::Write>(&self, writer: W) -> Result<(), TaggerError> {
        if self.rows.is_empty() {
            return Err(TaggerError::Empty);
        }
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::CRLF)
            .from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TaggerError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        std::fs::write(path.as_ref(), out)?;
        log::info!("Wrote {} card rows to {}", self.rows.len(), path.as_ref().display());
        Ok(())
    }
}
