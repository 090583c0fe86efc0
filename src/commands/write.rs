//! Write command implementation

use super::{open_bank, progress_bar, spinner};
use crate::cli::Bank;
use crate::error::{CliError, Result};
use geckoflash_core::bank::{FlashBank, SessionRegistry};
use geckoflash_dummy::DummyTarget;
use std::path::Path;

/// Bytes handed to the driver per write call
const WRITE_CHUNK_SIZE: usize = 4096;
/// Default chunk size for verification
const VERIFY_CHUNK_SIZE: usize = 4096;

/// Run the write command
pub fn run_write(
    registry: &mut SessionRegistry,
    target: &mut DummyTarget,
    bank: Bank,
    input: &Path,
    offset: u32,
    erase: bool,
    verify: bool,
) -> Result<()> {
    let mut flash = open_bank(registry, target, bank)?;

    let data = std::fs::read(input).map_err(|e| CliError::io(input, e))?;
    println!("Read {} bytes from {:?}", data.len(), input);

    if data.is_empty() {
        return Ok(());
    }

    let end = u64::from(offset) + data.len() as u64;
    if end > u64::from(flash.size()) {
        return Err(CliError::InvalidParameter(format!(
            "data ends at 0x{:X}, beyond bank size 0x{:X}",
            end,
            flash.size()
        )));
    }

    if erase {
        let page_size = flash.sectors().first().map(|s| s.size).unwrap_or(1);
        let first = offset / page_size;
        let last = (end as u32 - 1) / page_size;

        let pb = spinner(format!("Erasing sectors {}..={}...", first, last));
        let result = flash.erase(target, first, last);
        pb.finish_and_clear();
        result?;
        println!("Erased sectors {}..={}", first, last);
    }

    write_with_progress(&mut flash, target, offset, &data)?;

    if verify {
        verify_with_progress(&flash, target, offset, &data)?;
    }

    println!("Write complete!");
    Ok(())
}

fn write_with_progress(
    flash: &mut FlashBank,
    target: &mut DummyTarget,
    offset: u32,
    data: &[u8],
) -> Result<()> {
    let pb = progress_bar(data.len() as u64, "Writing");

    let mut done = 0usize;
    for chunk in data.chunks(WRITE_CHUNK_SIZE) {
        if let Err(e) = flash.write(target, offset + done as u32, chunk) {
            pb.abandon_with_message("Write failed!");
            return Err(e.into());
        }
        done += chunk.len();
        pb.set_position(done as u64);
    }

    pb.finish_with_message("Write complete");
    Ok(())
}

fn verify_with_progress(
    flash: &FlashBank,
    target: &mut DummyTarget,
    offset: u32,
    expected: &[u8],
) -> Result<()> {
    let mut buf = vec![0u8; VERIFY_CHUNK_SIZE];
    let pb = progress_bar(expected.len() as u64, "Verifying");

    let mut done = 0usize;
    for expected_chunk in expected.chunks(VERIFY_CHUNK_SIZE) {
        let chunk = &mut buf[..expected_chunk.len()];
        flash.read(target, offset + done as u32, chunk)?;

        if let Some(i) = chunk.iter().zip(expected_chunk).position(|(a, b)| a != b) {
            pb.abandon_with_message("Verification failed!");
            return Err(CliError::Verify {
                offset: offset + (done + i) as u32,
                expected: expected_chunk[i],
                actual: chunk[i],
            });
        }

        done += expected_chunk.len();
        pb.set_position(done as u64);
    }

    pb.finish_with_message("Verification passed");
    Ok(())
}
