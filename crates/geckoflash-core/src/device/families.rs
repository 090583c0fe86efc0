//! Static family catalogue
//!
//! Maps the legacy family id found in the device information page to a
//! family name, silicon series and the geometry overrides some families
//! need. Only series 2 parts can be programmed by this crate, but older
//! series are listed so that they are reported by name instead of as
//! unknown ids.

/// Legacy family id reported by all Series 2 parts
pub const FAMILY_ID_SERIES2V0: u8 = 128;

/// Static description of an MCU family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Legacy family id
    pub family_id: u8,
    /// Family display name
    pub name: &'static str,
    /// Silicon series (0, 1 or 2)
    pub series: u8,
    /// Fixed page size in bytes, 0 to read it from the device
    pub page_size: u32,
    /// MSC register base override, 0 for the series default
    pub msc_regbase: u32,
}

impl DeviceDescriptor {
    const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    const fn with_msc_base(mut self, base: u32) -> Self {
        self.msc_regbase = base;
        self
    }

    /// Whether the page size must be read from the device
    pub const fn discovers_page_size(&self) -> bool {
        self.page_size == 0
    }
}

const fn fam(family_id: u8, name: &'static str, series: u8) -> DeviceDescriptor {
    DeviceDescriptor {
        family_id,
        name,
        series,
        page_size: 0,
        msc_regbase: 0,
    }
}

/// All known families, ordered by id
pub static FAMILIES: &[DeviceDescriptor] = &[
    fam(16, "EFR32MG1P Mighty", 1),
    fam(17, "EFR32MG1B Mighty", 1),
    fam(18, "EFR32MG1V Mighty", 1),
    fam(19, "EFR32BG1P Blue", 1),
    fam(20, "EFR32BG1B Blue", 1),
    fam(21, "EFR32BG1V Blue", 1),
    fam(25, "EFR32FG1P Flex", 1),
    fam(26, "EFR32FG1B Flex", 1),
    fam(27, "EFR32FG1V Flex", 1),
    fam(28, "EFR32MG2P Mighty", 1),
    fam(29, "EFR32MG2B Mighty", 1),
    fam(30, "EFR32MG2V Mighty", 1),
    fam(31, "EFR32BG12P Blue", 1),
    fam(32, "EFR32BG12B Blue", 1),
    fam(33, "EFR32BG12V Blue", 1),
    fam(37, "EFR32FG12P Flex", 1),
    fam(38, "EFR32FG12B Flex", 1),
    fam(39, "EFR32FG12V Flex", 1),
    fam(40, "EFR32MG13P Mighty", 1),
    fam(41, "EFR32MG13B Mighty", 1),
    fam(42, "EFR32MG13V Mighty", 1),
    fam(43, "EFR32BG13P Blue", 1),
    fam(44, "EFR32BG13B Blue", 1),
    fam(45, "EFR32BG13V Blue", 1),
    fam(46, "EFR32ZG13P Zen", 1),
    fam(49, "EFR32FG13P Flex", 1),
    fam(50, "EFR32FG13B Flex", 1),
    fam(51, "EFR32FG13V Flex", 1),
    fam(52, "EFR32MG14P Mighty", 1),
    fam(53, "EFR32MG14B Mighty", 1),
    fam(54, "EFR32MG14V Mighty", 1),
    fam(55, "EFR32BG14P Blue", 1),
    fam(56, "EFR32BG14B Blue", 1),
    fam(57, "EFR32BG14V Blue", 1),
    fam(58, "EFR32ZG14P Zen", 1),
    fam(61, "EFR32FG14P Flex", 1),
    fam(62, "EFR32FG14B Flex", 1),
    fam(63, "EFR32FG14V Flex", 1),
    fam(71, "EFM32G", 0).with_page_size(512),
    fam(72, "EFM32GG Giant", 0),
    fam(73, "EFM32TG Tiny", 0).with_page_size(512),
    fam(74, "EFM32LG Leopard", 0),
    fam(75, "EFM32WG Wonder", 0),
    fam(76, "EFM32ZG Zero", 0).with_page_size(1024),
    fam(77, "EFM32HG Happy", 0).with_page_size(1024),
    fam(81, "EFM32PG1B Pearl", 1),
    fam(83, "EFM32JG1B Jade", 1),
    fam(85, "EFM32PG12B Pearl", 1),
    fam(87, "EFM32JG12B Jade", 1),
    fam(89, "EFM32PG13B Pearl", 1),
    fam(91, "EFM32JG13B Jade", 1),
    fam(100, "EFM32GG11B Giant", 1).with_msc_base(0x4000_0000),
    fam(103, "EFM32TG11B Tiny", 1).with_msc_base(0x4000_0000),
    fam(106, "EFM32GG12B Giant", 1).with_msc_base(0x4000_0000),
    fam(120, "EZR32WG Wonder", 0),
    fam(121, "EZR32LG Leopard", 0),
    fam(122, "EZR32HG Happy", 0).with_page_size(1024),
    fam(128, "SERIES2V0", 2),
];

/// Look up a family by its legacy id
pub fn find_family(family_id: u8) -> Option<&'static DeviceDescriptor> {
    FAMILIES.iter().find(|f| f.family_id == family_id)
}
