//! Read command implementation

use super::{open_bank, progress_bar};
use crate::cli::Bank;
use crate::error::{CliError, Result};
use geckoflash_core::bank::SessionRegistry;
use geckoflash_dummy::DummyTarget;
use std::path::Path;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn run_read(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
    output: &Path,
    offset: u32,
    length: Option<u32>,
) -> Result<()> {
    let flash = open_bank(registry, target, bank)?;

    let length = match length {
        Some(length) => length,
        None => flash.size().checked_sub(offset).ok_or_else(|| {
            CliError::InvalidParameter(format!(
                "offset 0x{:X} beyond bank size 0x{:X}",
                offset,
                flash.size()
            ))
        })?,
    };

    let total = length as usize;
    let mut data = vec![0u8; total];
    let pb = progress_bar(total as u64, "Reading");

    let mut done = 0usize;
    while done < total {
        let chunk_size = std::cmp::min(READ_CHUNK_SIZE, total - done);
        flash.read(target, offset + done as u32, &mut data[done..done + chunk_size])?;

        done += chunk_size;
        pb.set_position(done as u64);
    }
    pb.finish_with_message("Read complete");

    std::fs::write(output, &data).map_err(|e| CliError::io(output, e))?;
    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}
