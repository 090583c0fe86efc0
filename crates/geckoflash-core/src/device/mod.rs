//! Device identification
//!
//! This module holds the static family catalogue, the decoded per-chip
//! profile and the prober that reads the device information page.

mod families;
mod info;
mod probe;
pub mod regions;

pub use families::{find_family, DeviceDescriptor, FAMILIES, FAMILY_ID_SERIES2V0};
pub use info::{decode_part_info, page_size_from_exponent, DeviceProfile, PartFamily, PartInfo};
pub use probe::read_device_info;
