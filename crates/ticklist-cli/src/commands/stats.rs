//! Stats command handler

use anyhow::Result;

use ticklist_core::Store;

use crate::output::Output;

/// Show collection statistics
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.statistics()?;
    output.print_stats(&stats);
    Ok(())
}
