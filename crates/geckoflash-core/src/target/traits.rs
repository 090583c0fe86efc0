//! Target trait definitions

use super::CoreType;
use crate::error::{Error, Result};

/// Identity of a debug target, used to share controller state between banks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// A region of target RAM reserved for host use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkArea {
    /// Start address on the target
    pub address: u32,
    /// Size in bytes
    pub size: u32,
}

impl WorkArea {
    /// One past the last address of the area
    pub const fn end(&self) -> u32 {
        self.address + self.size
    }
}

/// Direction of a register parameter passed to on-target code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    /// Value is loaded into the register before the run
    Out,
    /// Value is loaded before the run and read back afterwards
    InOut,
}

/// A core register binding for an on-target routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegParam {
    /// Core register name (`"r0"` ...)
    pub name: &'static str,
    /// Register value
    pub value: u32,
    /// Whether the value is read back after the run
    pub direction: ParamDirection,
}

impl RegParam {
    /// Create an output-only parameter
    pub const fn out(name: &'static str, value: u32) -> Self {
        Self {
            name,
            value,
            direction: ParamDirection::Out,
        }
    }

    /// Create a parameter whose final value is read back
    pub const fn in_out(name: &'static str, value: u32) -> Self {
        Self {
            name,
            value,
            direction: ParamDirection::InOut,
        }
    }
}

/// Description of an asynchronous flash routine run
///
/// The host streams `data` into the `fifo` work area while the routine
/// drains it. The first two words of the FIFO are the write and read
/// pointers; the payload ring starts right after them.
#[derive(Debug)]
pub struct AlgorithmRun<'a> {
    /// Entry point of the uploaded routine
    pub entry: u32,
    /// Ring buffer work area
    pub fifo: WorkArea,
    /// Payload to stream
    pub data: &'a [u8],
    /// Size of one streamed unit in bytes
    pub block_size: u32,
    /// Register parameters; `InOut` values are updated after the run
    pub params: &'a mut [RegParam],
}

impl AlgorithmRun<'_> {
    /// Look up a register parameter by name
    pub fn param(&self, name: &str) -> Option<u32> {
        self.params.iter().find(|p| p.name == name).map(|p| p.value)
    }

    /// Update an `InOut` parameter by name
    pub fn set_param(&mut self, name: &str, value: u32) {
        if let Some(p) = self
            .params
            .iter_mut()
            .find(|p| p.name == name && p.direction == ParamDirection::InOut)
        {
            p.value = value;
        }
    }
}

/// Debug target trait
///
/// This trait represents a debug host connection with raw access to the
/// target chip. All multi-byte values are little-endian.
///
/// ## Liveness
///
/// Flash operations busy-wait on the controller. Each poll iteration that
/// does not yet satisfy its condition calls [`Target::alive_sleep`], and
/// long word-by-word writes call [`Target::keep_alive`] once per word, so
/// the host can service its connection and check for cancellation.
pub trait Target {
    /// Identity of this target
    fn id(&self) -> TargetId;

    /// CPU core attached to the debug port
    fn core(&self) -> CoreType;

    /// Whether the CPU is halted
    fn is_halted(&self) -> bool;

    /// Read a block of target memory
    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Write a block of target memory
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Read one byte
    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a 16-bit halfword
    fn read_u16(&mut self, addr: u32) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_bytes(addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a 32-bit word
    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Write a 32-bit word
    fn write_u32(&mut self, addr: u32, value: u32) -> Result<()> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    /// Reserve scratch RAM on the target
    ///
    /// Returns [`Error::ResourceExhausted`] when no area of `size` bytes is
    /// available.
    fn alloc_work_area(&mut self, size: u32) -> Result<WorkArea>;

    /// Release scratch RAM obtained from [`Target::alloc_work_area`]
    fn free_work_area(&mut self, area: WorkArea);

    /// Run an uploaded flash routine while streaming data to it
    ///
    /// Returns [`Error::AlgorithmFailed`] when the routine stops on a
    /// hardware error; `InOut` parameters hold the final register values in
    /// both cases.
    fn run_flash_algorithm(&mut self, run: &mut AlgorithmRun<'_>) -> Result<()> {
        let _ = run;
        Err(Error::ResourceExhausted)
    }

    /// Signal that the host is still alive
    fn keep_alive(&mut self) {}

    /// Yield for `ticks` time units while keeping the connection alive
    fn alive_sleep(&mut self, ticks: u32) {
        let _ = ticks;
        self.keep_alive();
    }
}

// Allow trait objects to be used where a generic target is expected
impl<T: Target + ?Sized> Target for alloc::boxed::Box<T> {
    fn id(&self) -> TargetId {
        (**self).id()
    }

    fn core(&self) -> CoreType {
        (**self).core()
    }

    fn is_halted(&self) -> bool {
        (**self).is_halted()
    }

    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(addr, buf)
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        (**self).write_bytes(addr, data)
    }

    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        (**self).read_u8(addr)
    }

    fn read_u16(&mut self, addr: u32) -> Result<u16> {
        (**self).read_u16(addr)
    }

    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        (**self).read_u32(addr)
    }

    fn write_u32(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).write_u32(addr, value)
    }

    fn alloc_work_area(&mut self, size: u32) -> Result<WorkArea> {
        (**self).alloc_work_area(size)
    }

    fn free_work_area(&mut self, area: WorkArea) {
        (**self).free_work_area(area)
    }

    fn run_flash_algorithm(&mut self, run: &mut AlgorithmRun<'_>) -> Result<()> {
        (**self).run_flash_algorithm(run)
    }

    fn keep_alive(&mut self) {
        (**self).keep_alive()
    }

    fn alive_sleep(&mut self, ticks: u32) {
        (**self).alive_sleep(ticks)
    }
}
