//! Erase command implementation

use super::{open_bank, sector_range, spinner};
use crate::cli::{Bank, RangeArgs};
use crate::error::Result;
use geckoflash_core::bank::SessionRegistry;
use geckoflash_dummy::DummyTarget;

/// Run the erase command
pub fn run_erase(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
    range: RangeArgs,
) -> Result<()> {
    let mut flash = open_bank(registry, target, bank)?;
    let (first, last) = sector_range(&flash, range)?;

    let pb = spinner(format!(
        "Erasing {} sectors of {}...",
        last - first + 1,
        flash.kind()
    ));
    let result = flash.erase(target, first, last);

    match result {
        Ok(()) => {
            pb.finish_with_message(format!("Erased sectors {}..={}", first, last));
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Erase failed!");
            Err(e.into())
        }
    }
}
