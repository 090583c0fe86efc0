//! Page erase

use super::protocol::Msc;
use super::regs::{self, MscStatus};
use crate::error::Result;
use crate::target::Target;

/// Erase the flash page containing `addr`
///
/// Write enable must already be asserted.
pub fn erase_page<T: Target + ?Sized>(msc: &Msc, target: &mut T, addr: u32) -> Result<()> {
    log::debug!("erasing flash page at 0x{:08X}", addr);

    msc.latch_address(target, addr)?;
    msc.set_reg_bits(target, regs::WRITECMD, regs::WRITECMD_ERASEPAGE, true)?;
    msc.wait_status(target, msc.options().erase_timeout, MscStatus::BUSY, false)
}

/// Erase a list of pages, attempting every page even after a failure
///
/// Returns the first error encountered. Write enable must already be
/// asserted.
pub fn erase_pages<T, I>(msc: &Msc, target: &mut T, pages: I) -> Result<()>
where
    T: Target + ?Sized,
    I: IntoIterator<Item = u32>,
{
    let mut first_error = None;

    for (i, addr) in pages.into_iter().enumerate() {
        if let Err(e) = erase_page(msc, target, addr) {
            log::error!("Failed to erase page {} at 0x{:08X}: {}", i, addr, e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
