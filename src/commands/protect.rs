//! Write protection command implementations

use super::{open_bank, sector_range};
use crate::cli::{Bank, RangeArgs};
use crate::error::Result;
use geckoflash_core::bank::{SessionRegistry, Sector};
use geckoflash_dummy::DummyTarget;

/// Format the protected sectors as runs, e.g. "0-3, 7"
fn format_protected(sectors: &[Sector]) -> String {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for (i, sector) in sectors.iter().enumerate() {
        if sector.protected != Some(true) {
            continue;
        }
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == i => *end = i,
            _ => runs.push((i, i)),
        }
    }

    if runs.is_empty() {
        return "none".to_string();
    }
    if runs.len() == 1 && runs[0] == (0, sectors.len() - 1) {
        return "all".to_string();
    }

    runs.iter()
        .map(|&(start, end)| {
            if start == end {
                format!("{}", start)
            } else {
                format!("{}-{}", start, end)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Set or clear protection of main flash sectors
pub fn run_protect(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    range: RangeArgs,
    set: bool,
) -> Result<()> {
    let mut flash = open_bank(registry, target, Bank::Main)?;
    let (first, last) = sector_range(&flash, range)?;

    flash.protect(target, set, first, last)?;

    println!(
        "{} sectors {}..={}",
        if set { "Protected" } else { "Unprotected" },
        first,
        last
    );
    println!("Protected sectors: {}", format_protected(flash.sectors()));
    Ok(())
}

/// Reload the lock bits and print the protection state
pub fn run_protect_check(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
) -> Result<()> {
    let mut flash = open_bank(registry, target, bank)?;
    flash.protect_check(target)?;

    println!(
        "{}: {} sectors, protected: {}",
        flash.kind(),
        flash.sectors().len(),
        format_protected(flash.sectors())
    );
    println!(
        "Debug interface:   {}",
        if flash.lock_bits().debug_locked() {
            "locked"
        } else {
            "unlocked"
        }
    );
    Ok(())
}

/// Lock the debug interface
pub fn run_debug_lock(registry: &mut SessionRegistry, target: &mut DummyTarget) -> Result<()> {
    let mut flash = open_bank(registry, target, Bank::Main)?;
    flash.debug_lock(target)?;
    println!("Debug interface locked; reset the device to apply");
    Ok(())
}
