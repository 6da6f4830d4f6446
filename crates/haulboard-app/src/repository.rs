//! Repository adapters for persistence layer

use haulboard_infra::persistence::BoardStore;
use haulboard_types::Result;

use crate::config::Config;

/// Open the board store in the configured directory
pub fn open_board_store(config: &Config) -> Result<BoardStore> {
    let store_dir = config.store_dir()?;
    BoardStore::open(store_dir)
}
