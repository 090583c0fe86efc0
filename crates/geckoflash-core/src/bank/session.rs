//! Shared controller state

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use super::flash_bank::FlashBank;
use super::kind::BankKind;
use crate::config::FlashOptions;
use crate::device::DeviceProfile;
use crate::error::Result;
use crate::lockbits::LockBitmap;
use crate::msc::{regs::MSC_BASE, Msc};
use crate::target::{Target, TargetId};

/// Controller state shared by all banks of one target
#[derive(Debug)]
pub struct BankSession {
    target: TargetId,
    pub(crate) profile: Option<DeviceProfile>,
    pub(crate) probed: [bool; BankKind::COUNT],
    pub(crate) lock_bits: LockBitmap,
    pub(crate) msc: Msc,
}

impl BankSession {
    fn new(target: TargetId, options: FlashOptions) -> Self {
        Self {
            target,
            profile: None,
            probed: [false; BankKind::COUNT],
            lock_bits: LockBitmap::new(),
            msc: Msc::new(MSC_BASE, options),
        }
    }

    /// Target this session belongs to
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Profile from the last successful probe
    pub fn profile(&self) -> Option<&DeviceProfile> {
        self.profile.as_ref()
    }

    /// Whether the bank of `kind` has been probed
    pub fn is_probed(&self, kind: BankKind) -> bool {
        self.probed[kind.index()]
    }

    /// Lock bits mirror
    pub fn lock_bits(&self) -> &LockBitmap {
        &self.lock_bits
    }

    /// MSC handle
    pub fn msc(&self) -> Msc {
        self.msc
    }
}

impl Drop for BankSession {
    fn drop(&mut self) {
        log::debug!("releasing flash session for target {:?}", self.target);
    }
}

/// Reference-counted handle to a [`BankSession`]
pub type SharedSession = Rc<RefCell<BankSession>>;

/// Hands out banks, sharing one session per target
///
/// The registry only holds weak references: a session lives exactly as long
/// as the banks using it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    options: FlashOptions,
    sessions: Vec<(TargetId, Weak<RefCell<BankSession>>)>,
}

impl SessionRegistry {
    /// Create a registry whose sessions use `options`
    pub fn new(options: FlashOptions) -> Self {
        Self {
            options,
            sessions: Vec::new(),
        }
    }

    /// Create a bank at `base` on `target`
    ///
    /// Reuses the live session of the target if another bank holds one.
    pub fn attach<T: Target + ?Sized>(&mut self, target: &T, base: u32) -> Result<FlashBank> {
        let kind = BankKind::from_base(base).map_err(|e| {
            log::error!("Flash bank with base address 0x{:08X} is not supported", base);
            e
        })?;

        let id = target.id();
        self.sessions.retain(|(_, weak)| weak.strong_count() > 0);

        let existing = self
            .sessions
            .iter()
            .filter(|(sid, _)| *sid == id)
            .find_map(|(_, weak)| weak.upgrade());

        let session = match existing {
            Some(session) => session,
            None => {
                log::debug!("new flash session for target {:?}", id);
                let session = Rc::new(RefCell::new(BankSession::new(id, self.options)));
                self.sessions.push((id, Rc::downgrade(&session)));
                session
            }
        };

        Ok(FlashBank::new(kind, base, session))
    }

    /// Number of sessions still referenced by a bank
    pub fn live_sessions(&self) -> usize {
        self.sessions
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::target::mock::MockTarget;

    #[test]
    fn test_banks_share_one_session() {
        let target = MockTarget::new();
        let mut registry = SessionRegistry::new(FlashOptions::default());

        let main = registry.attach(&target, 0).unwrap();
        let user = registry.attach(&target, 0x0FE0_0000).unwrap();
        assert_eq!(main.session_refs(), 2);
        assert!(Rc::ptr_eq(main.session(), user.session()));
        assert_eq!(registry.live_sessions(), 1);

        let weak = Rc::downgrade(main.session());
        drop(main);
        assert_eq!(user.session_refs(), 1);
        assert!(weak.upgrade().is_some());

        drop(user);
        assert!(weak.upgrade().is_none());
        assert_eq!(registry.live_sessions(), 0);
    }

    #[test]
    fn test_fresh_session_after_release() {
        let target = MockTarget::new();
        let mut registry = SessionRegistry::new(FlashOptions::default());

        let first = registry.attach(&target, 0).unwrap();
        let weak = Rc::downgrade(first.session());
        drop(first);

        let second = registry.attach(&target, 0).unwrap();
        assert!(weak.upgrade().is_none());
        assert_eq!(second.session_refs(), 1);
        assert_eq!(*second.session().borrow().lock_bits(), LockBitmap::new());
    }

    #[test]
    fn test_unsupported_base() {
        let target = MockTarget::new();
        let mut registry = SessionRegistry::new(FlashOptions::default());
        assert_eq!(
            registry.attach(&target, 0x1000).err(),
            Some(Error::UnsupportedBankBase(0x1000))
        );
        assert_eq!(registry.live_sessions(), 0);
    }
}
