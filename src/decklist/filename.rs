//! Decklist file naming conventions.
//!
//! Tournament decklists are saved as `<event>_<place>_<First>_<Last>.txt`,
//! e.g. `t1_1st_Jane_Doe.txt`.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilenameError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Decklist id '{0}' does not follow <event>_<place>_<first>_<last>.txt")]
    TooFewParts(String),
    #[error("Decklist file starting with '{name}' not found in {dir}")]
    NotFound { name: String, dir: String },
}

/// The decklist id is the file name
pub fn decklist_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `First_Last` from the third and fourth `_`-separated parts
pub fn player_name(decklist_id: &str) -> Result<String, FilenameError> {
    let parts: Vec<&str> = decklist_id.split('_').collect();
    if parts.len() < 4 {
        return Err(FilenameError::TooFewParts(decklist_id.to_string()));
    }
    Ok(format!("{}_{}", parts[2], parts[3].replace(".txt", "")))
}

/// Finishing place from the digits of the second part (`1st` -> 1)
pub fn place(decklist_id: &str) -> Option<u32> {
    let part = decklist_id.split('_').nth(1)?;
    let digits: String = part.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e))
        .unwrap_or(false)
}

fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>, FilenameError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// All `.txt` decklists in a folder, sorted by path
pub fn list_decklists(dir: &Path) -> Result<Vec<PathBuf>, FilenameError> {
    let files: Vec<PathBuf> = sorted_files(dir)?
        .into_iter()
        .filter(|p| has_extension(p, &["txt"]))
        .collect();
    log::info!("Found {} decklists in {}", files.len(), dir.display());
    Ok(files)
}

fn starts_with_ignore_case(path: &Path, prefix: &str) -> bool {
    decklist_id(path)
        .to_lowercase()
        .starts_with(&prefix.to_lowercase())
}

/// All `.txt`/`.dek` files whose name starts with `prefix` (case-insensitive)
pub fn find_decks(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, FilenameError> {
    let decks: Vec<PathBuf> = sorted_files(dir)?
        .into_iter()
        .filter(|p| has_extension(p, &["txt", "dek"]) && starts_with_ignore_case(p, prefix))
        .collect();
    if decks.is_empty() {
        log::warn!("No decks found with prefix '{}'", prefix);
    } else {
        log::info!("Found {} deck(s) with prefix '{}'", decks.len(), prefix);
    }
    Ok(decks)
}

/// First deck file matching `name` as a prefix
pub fn find_decklist_file(dir: &Path, name: &str) -> Result<PathBuf, FilenameError> {
    find_decks(dir, name)?
        .into_iter()
        .next()
        .ok_or_else(|| FilenameError::NotFound {
            name: name.to_string(),
            dir: dir.display().to_string(),
        })
}
