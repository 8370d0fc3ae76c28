//! Test Store Manager
//!
//! Provides an isolated on-disk store for persistence tests:
//! - Card records as one JSON file per card
//! - Review logs appended as JSON lines
//! - Automatic cleanup through a temporary directory

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use cadence_core::{Card, CardRecord, ReviewLog};
use tempfile::TempDir;
use uuid::Uuid;

const CARDS_DIR: &str = "cards";
const LOG_FILE: &str = "reviews.jsonl";

/// Manager for a throwaway card store
///
/// Stands in for whatever storage a caller of the scheduler would use. Cards
/// go through [`CardRecord`] so loading exercises record validation.
///
/// # Example
///
/// ```rust,ignore
/// let store = TestStoreManager::new_temp();
/// store.save_card(&card);
/// let loaded = store.load_card(card.id()).unwrap();
/// ```
pub struct TestStoreManager {
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestStoreManager {
    /// Create a new store in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        fs::create_dir_all(root.join(CARDS_DIR)).expect("Failed to create cards directory");

        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn card_path(&self, id: Uuid) -> PathBuf {
        self.root.join(CARDS_DIR).join(format!("{id}.json"))
    }

    // ========================================================================
    // CARDS
    // ========================================================================

    /// Write a card, replacing any previous version
    pub fn save_card(&self, card: &Card) {
        let record = CardRecord::from(card.clone());
        let json = serde_json::to_string_pretty(&record).expect("Failed to serialize card");
        fs::write(self.card_path(card.id()), json).expect("Failed to write card");
    }

    /// Read back the raw record, skipping validation
    pub fn load_record(&self, id: Uuid) -> Option<CardRecord> {
        let json = fs::read_to_string(self.card_path(id)).ok()?;
        serde_json::from_str(&json).ok()
    }

    /// Read back a card; fails if the stored record breaks card invariants
    pub fn load_card(&self, id: Uuid) -> Result<Card, String> {
        let json = fs::read_to_string(self.card_path(id)).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }

    /// Overwrite a stored record verbatim (for corrupt-data tests)
    pub fn write_record(&self, record: &CardRecord) {
        let json = serde_json::to_string(record).expect("Failed to serialize record");
        fs::write(self.card_path(record.id), json).expect("Failed to write record");
    }

    pub fn card_count(&self) -> usize {
        fs::read_dir(self.root.join(CARDS_DIR))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    // ========================================================================
    // REVIEW LOGS
    // ========================================================================

    /// Append one review log line
    pub fn append_log(&self, log: &ReviewLog) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(LOG_FILE))
            .expect("Failed to open review log");
        let line = serde_json::to_string(log).expect("Failed to serialize review log");
        writeln!(file, "{line}").expect("Failed to append review log");
    }

    /// All logged reviews, in append order
    pub fn load_logs(&self) -> Vec<ReviewLog> {
        let Ok(file) = File::open(self.root.join(LOG_FILE)) else {
            return Vec::new();
        };
        BufReader::new(file)
            .lines()
            .map(|line| {
                let line = line.expect("Failed to read review log");
                serde_json::from_str(&line).expect("Failed to parse review log")
            })
            .collect()
    }

    /// Logged reviews for one card
    pub fn logs_for(&self, card_id: Uuid) -> Vec<ReviewLog> {
        self.load_logs()
            .into_iter()
            .filter(|log| log.card_id() == card_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Rating;
    use chrono::Utc;

    #[test]
    fn test_temp_store_creation() {
        let store = TestStoreManager::new_temp();
        assert!(store.path().exists());
        assert_eq!(store.card_count(), 0);
        assert!(store.load_logs().is_empty());
    }

    #[test]
    fn test_card_save_load() {
        let store = TestStoreManager::new_temp();
        let card = Card::new();
        store.save_card(&card);

        assert_eq!(store.card_count(), 1);
        assert_eq!(store.load_card(card.id()).unwrap(), card);
        assert!(store.load_card(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_logs_filtered_by_card() {
        let store = TestStoreManager::new_temp();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        store.append_log(&ReviewLog::new(a, Rating::Good, now, None));
        store.append_log(&ReviewLog::new(b, Rating::Again, now, Some(800)));
        store.append_log(&ReviewLog::new(a, Rating::Easy, now, None));

        assert_eq!(store.load_logs().len(), 3);
        let logs = store.logs_for(a);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].rating(), Rating::Easy);
    }
}
