//! Removal of stored generated content.
//!
//! Clears advice, tarot readings and natal charts for all users so they are
//! regenerated on next request. Tasks and entries are never touched.

use crate::repo::journal_repo::{JournalRepository, SqliteJournalRepository};
use crate::repo::reading_repo::{ReadingRepository, SqliteReadingRepository};
use crate::service::ServiceResult;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Which generated records to delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSelection {
    pub advice: bool,
    pub tarot: bool,
    pub natal: bool,
}

impl CacheSelection {
    pub fn all() -> Self {
        Self {
            advice: true,
            tarot: true,
            natal: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.advice || self.tarot || self.natal)
    }
}

/// Rows deleted per record kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub advice: usize,
    pub tarot: usize,
    pub natal: usize,
}

impl ClearedCounts {
    pub fn total(&self) -> usize {
        self.advice + self.tarot + self.natal
    }
}

/// Deletes the selected record kinds in one transaction.
pub fn clear_ai_cache(conn: &Connection, selection: CacheSelection) -> ServiceResult<ClearedCounts> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let journal = SqliteJournalRepository::new(&tx);
    let readings = SqliteReadingRepository::new(&tx);

    let mut counts = ClearedCounts::default();
    if selection.advice {
        counts.advice = journal.delete_all_advice()?;
    }
    if selection.tarot {
        counts.tarot = readings.delete_all_readings()?;
    }
    if selection.natal {
        counts.natal = readings.delete_all_charts()?;
    }
    tx.commit()?;

    info!(
        "event=clear_ai_cache module=service status=ok advice={} tarot={} natal={}",
        counts.advice, counts.tarot, counts.natal
    );
    Ok(counts)
}
