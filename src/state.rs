//! Persistence of the simulated flash between runs
//!
//! The state directory holds one raw image per flash region. Missing files
//! leave the region erased.

use crate::error::{CliError, Result};
use geckoflash_dummy::DummyTarget;
use std::fs;
use std::path::Path;

const MAIN_IMAGE: &str = "main.bin";
const USER_DATA_IMAGE: &str = "userdata.bin";
const LOCK_BITS_IMAGE: &str = "lockbits.bin";

fn load_region(dir: &Path, name: &str, region: &mut [u8]) -> Result<()> {
    let path = dir.join(name);
    if !path.is_file() {
        log::debug!("{} not found, region left erased", path.display());
        return Ok(());
    }

    let data = fs::read(&path).map_err(|e| CliError::io(&path, e))?;
    if data.len() != region.len() {
        return Err(CliError::StateSize {
            path,
            expected: region.len(),
            actual: data.len(),
        });
    }
    region.copy_from_slice(&data);
    log::debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(())
}

fn save_region(dir: &Path, name: &str, region: &[u8]) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, region).map_err(|e| CliError::io(&path, e))
}

/// Restore flash contents saved by [`save`]
pub fn load(target: &mut DummyTarget, dir: &Path) -> Result<()> {
    load_region(dir, MAIN_IMAGE, target.main_flash_mut())?;
    load_region(dir, USER_DATA_IMAGE, target.user_data_mut())?;
    load_region(dir, LOCK_BITS_IMAGE, target.lock_bits_page_mut())
}

/// Save the flash contents of `target` into `dir`
pub fn save(target: &DummyTarget, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
    save_region(dir, MAIN_IMAGE, target.main_flash())?;
    save_region(dir, USER_DATA_IMAGE, target.user_data())?;
    save_region(dir, LOCK_BITS_IMAGE, target.lock_bits_page())
}
