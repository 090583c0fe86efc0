//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use geckoflash_core::bank::{LOCK_BITS_BASE, MAIN_FLASH_BASE, USER_DATA_BASE};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "geckoflash")]
#[command(author, version, about = "EFM32/EFR32 Series 2 flash programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Simulated target description (RON format)
    #[arg(long, global = true)]
    pub target: Option<PathBuf>,

    /// Flash operation tunables (TOML format)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory keeping the simulated flash contents between runs
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flash region to operate on
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bank {
    /// Main flash array
    #[default]
    Main,
    /// User data page
    UserData,
    /// Lock bits page
    LockBits,
}

impl Bank {
    /// Base address the bank is attached at
    pub fn base(self) -> u32 {
        match self {
            Bank::Main => MAIN_FLASH_BASE,
            Bank::UserData => USER_DATA_BASE,
            Bank::LockBits => LOCK_BITS_BASE,
        }
    }
}

/// Bank selection shared across commands
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct BankArgs {
    /// Flash region
    #[arg(short, long, value_enum, default_value_t = Bank::Main)]
    pub bank: Bank,
}

/// Sector range shared across commands
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// First sector
    #[arg(long, default_value_t = 0)]
    pub first: u32,

    /// Last sector, inclusive (defaults to the last sector of the bank)
    #[arg(long)]
    pub last: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the part and show the bank geometry
    Probe {
        #[command(flatten)]
        bank: BankArgs,
    },

    /// Show the part name
    Info,

    /// Read bank contents to file
    Read {
        #[command(flatten)]
        bank: BankArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Offset from the bank base (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Number of bytes to read (defaults to the rest of the bank)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Write file to flash
    Write {
        #[command(flatten)]
        bank: BankArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Offset from the bank base, must be 4-byte aligned
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Erase the covered sectors first
        #[arg(long)]
        erase: bool,

        /// Skip reading back the written data
        #[arg(long)]
        no_verify: bool,
    },

    /// Erase sectors
    Erase {
        #[command(flatten)]
        bank: BankArgs,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Write protect main flash sectors
    Protect {
        #[command(flatten)]
        range: RangeArgs,

        /// Remove protection instead of setting it
        #[arg(long)]
        clear: bool,
    },

    /// Show the protection state of every sector
    ProtectCheck {
        #[command(flatten)]
        bank: BankArgs,
    },

    /// Lock the debug interface (applied on the next reset)
    Debuglock,
}
