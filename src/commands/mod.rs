//! CLI command implementations
//!
//! Every command attaches the bank it needs to the session registry and
//! probes it before doing anything else, so banks of one run share the
//! controller state and the lock bits mirror.

mod erase;
mod probe;
mod protect;
mod read;
mod write;

pub use erase::run_erase;
pub use probe::{run_info, run_probe};
pub use protect::{run_debug_lock, run_protect, run_protect_check};
pub use read::run_read;
pub use write::run_write;

use crate::cli::{Bank, RangeArgs};
use crate::error::{CliError, Result};
use geckoflash_core::bank::{FlashBank, SessionRegistry};
use geckoflash_dummy::DummyTarget;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Attach `bank` and probe it
fn open_bank(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
) -> Result<FlashBank> {
    let mut flash = registry.attach(&*target, bank.base())?;
    flash.probe(target)?;
    Ok(flash)
}

/// Resolve a sector range against the probed bank
fn sector_range(flash: &FlashBank, range: RangeArgs) -> Result<(u32, u32)> {
    let count = flash.sectors().len() as u32;
    let last = range.last.unwrap_or(count.saturating_sub(1));
    if range.first > last || last >= count {
        return Err(CliError::InvalidParameter(format!(
            "sector range {}..={} outside 0..{}",
            range.first, last, count
        )));
    }
    Ok((range.first, last))
}

fn progress_bar(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
