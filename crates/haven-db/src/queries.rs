//! Common query patterns for the database.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use haven_core::PlayerId;

impl Store {
    /// Get every restriction row.
    pub fn all_restrictions(&self) -> Result<Vec<StoredPlayerRestriction>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayerRestriction>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<StoredPlayerRestriction>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }

    /// Get all rows held by one player.
    pub fn restrictions_for_player(&self, player: PlayerId) -> Result<Vec<StoredPlayerRestriction>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredPlayerRestriction>(StoredPlayerRestrictionKey::player)?;
        let iter = scan.start_with(player.to_string())?;
        let rows: std::result::Result<Vec<StoredPlayerRestriction>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }

    /// Count all restriction rows.
    pub fn count_restrictions(&self) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredPlayerRestriction>()?;
        let iter = scan.all()?;
        Ok(iter.count())
    }
}
