//! CPU core identification

use core::fmt;

/// Cortex-M core attached to the debug port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreType {
    /// Cortex-M0+
    CortexM0Plus,
    /// Cortex-M3
    CortexM3,
    /// Cortex-M4
    CortexM4,
    /// Cortex-M33
    CortexM33,
    /// Any other core, by CPUID part number
    Other(u16),
}

impl CoreType {
    /// CPUID part number of the Cortex-M0+
    pub const PARTNO_M0P: u16 = 0xC60;
    /// CPUID part number of the Cortex-M3
    pub const PARTNO_M3: u16 = 0xC23;
    /// CPUID part number of the Cortex-M4
    pub const PARTNO_M4: u16 = 0xC24;
    /// CPUID part number of the Cortex-M33
    pub const PARTNO_M33: u16 = 0xD21;

    /// Decode a CPUID part number
    pub const fn from_partno(partno: u16) -> Self {
        match partno {
            Self::PARTNO_M0P => Self::CortexM0Plus,
            Self::PARTNO_M3 => Self::CortexM3,
            Self::PARTNO_M4 => Self::CortexM4,
            Self::PARTNO_M33 => Self::CortexM33,
            other => Self::Other(other),
        }
    }

    /// CPUID part number of this core
    pub const fn partno(&self) -> u16 {
        match self {
            Self::CortexM0Plus => Self::PARTNO_M0P,
            Self::CortexM3 => Self::PARTNO_M3,
            Self::CortexM4 => Self::PARTNO_M4,
            Self::CortexM33 => Self::PARTNO_M33,
            Self::Other(partno) => *partno,
        }
    }

    /// Whether the flash driver can operate with this core
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CortexM0Plus => write!(f, "Cortex-M0+"),
            Self::CortexM3 => write!(f, "Cortex-M3"),
            Self::CortexM4 => write!(f, "Cortex-M4"),
            Self::CortexM33 => write!(f, "Cortex-M33"),
            Self::Other(partno) => write!(f, "unknown core 0x{:03X}", partno),
        }
    }
}
