//! Device information page reader

use super::families::find_family;
use super::info::{decode_part_info, page_size_from_exponent, DeviceProfile};
use super::regions::di;
use crate::error::{Error, Result};
use crate::msc::regs::MSC_BASE;
use crate::target::Target;

/// Read and decode the device information page
///
/// Only Series 2 parts are accepted; older series are reported by name and
/// rejected with [`Error::UnsupportedSeries`].
pub fn read_device_info<T: Target + ?Sized>(target: &mut T) -> Result<DeviceProfile> {
    let core = target.core();
    if !core.is_supported() {
        log::error!("Target is not a Cortex-M device ({})", core);
        return Err(Error::UnsupportedCore(core.partno()));
    }

    let flash_kib = target.read_u16(di::FLASH_SIZE)?;
    let ram_kib = target.read_u16(di::RAM_SIZE)?;
    let legacy_family = target.read_u8(di::LEGACY_FAMILY)?;
    let prod_rev = target.read_u8(di::PROD_REV)?;

    let descriptor = find_family(legacy_family).ok_or_else(|| {
        log::error!("Unknown MCU family {}", legacy_family);
        Error::UnknownFamily(legacy_family)
    })?;

    if descriptor.series != 2 {
        log::error!(
            "Series {} MCU detected ({}); only series 2 is handled here",
            descriptor.series,
            descriptor.name
        );
        return Err(Error::UnsupportedSeries {
            family: legacy_family,
            series: descriptor.series,
        });
    }

    let part = decode_part_info(target.read_u32(di::PART)?)?;

    let msc_base = if descriptor.msc_regbase != 0 {
        descriptor.msc_regbase
    } else {
        MSC_BASE
    };

    let page_size = if descriptor.discovers_page_size() {
        let exp = target.read_u8(di::PAGE_SIZE)?;
        page_size_from_exponent(exp).map_err(|e| {
            log::error!("Invalid page size (exponent {})", exp);
            e
        })?
    } else {
        descriptor.page_size
    };

    let profile = DeviceProfile {
        descriptor,
        flash_kib,
        ram_kib,
        legacy_family,
        part,
        prod_rev,
        page_size,
        msc_base,
    };

    if profile.main_pages() == 0 {
        return Err(Error::InvalidFlashSize);
    }

    log::debug!(
        "device info: {} KiB flash, {} KiB RAM, family {}, page size {}",
        flash_kib,
        ram_kib,
        legacy_family,
        page_size
    );

    Ok(profile)
}
