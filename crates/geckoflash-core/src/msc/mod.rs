//! Memory System Controller (MSC) driver
//!
//! Register-level access to the Series 2 flash controller: the register
//! map, status polling, page erase and the two word programming paths.

pub mod erase;
pub mod loader;
mod protocol;
pub mod regs;
pub mod write;

pub use erase::{erase_page, erase_pages};
pub use protocol::Msc;
pub use regs::MscStatus;
pub use write::{program, write_words, BlockWriter, WordProgrammer, WordWriter};
