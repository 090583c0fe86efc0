//! Probe and info command implementations

use super::open_bank;
use crate::cli::Bank;
use crate::error::Result;
use geckoflash_core::bank::{SessionRegistry, MAIN_FLASH_BASE};
use geckoflash_dummy::DummyTarget;

/// Probe the part and print the geometry of `bank`
pub fn run_probe(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
) -> Result<()> {
    let flash = open_bank(registry, target, bank)?;

    if let Some(profile) = flash.profile() {
        println!("Found: {}", profile);
        println!("  Family:     {}", profile.descriptor.name);
        println!("  Flash:      {} KiB", profile.flash_kib);
        println!("  RAM:        {} KiB", profile.ram_kib);
        println!("  Page size:  {} bytes", profile.page_size);
        println!("  MSC base:   0x{:08X}", profile.msc_base);
    }

    let protected = flash
        .sectors()
        .iter()
        .filter(|s| s.protected == Some(true))
        .count();
    println!();
    println!(
        "{} at 0x{:08X}: {} bytes in {} sectors, {} protected",
        flash.kind(),
        flash.base(),
        flash.size(),
        flash.sectors().len(),
        protected
    );

    if flash.lock_bits().debug_locked() {
        println!("Debug interface is locked");
    }

    Ok(())
}

/// Print the part name
pub fn run_info(registry: &mut SessionRegistry, target: &mut DummyTarget) -> Result<()> {
    let flash = registry.attach(&*target, MAIN_FLASH_BASE)?;
    println!("{}", flash.info(target)?);
    Ok(())
}
