use super::*;

use geckoflash_core::bank::{
    BankKind, FlashBank, SessionRegistry, LOCK_BITS_BASE, MAIN_FLASH_BASE, USER_DATA_BASE,
};
use geckoflash_core::device::FAMILIES;
use geckoflash_core::lockbits::LockBitmap;
use geckoflash_core::FlashOptions;

const PAGE: u32 = 8192;

fn attach(target: &DummyTarget, base: u32) -> (SessionRegistry, FlashBank) {
    let mut registry = SessionRegistry::new(FlashOptions::default());
    let bank = registry.attach(target, base).unwrap();
    (registry, bank)
}

fn probed(config: DummyConfig) -> (DummyTarget, SessionRegistry, FlashBank) {
    let mut target = DummyTarget::new(config);
    let (registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    bank.probe(&mut target).unwrap();
    (target, registry, bank)
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

#[test]
fn test_probe_default_part() {
    let (target, _registry, bank) = probed(DummyConfig::default());

    let profile = bank.profile().unwrap();
    assert_eq!(profile.flash_kib, 512);
    assert_eq!(profile.ram_kib, 32);
    assert_eq!(profile.page_size, PAGE);
    assert_eq!(profile.msc_base, regs::MSC_BASE);
    assert_eq!(profile.legacy_family, 128);
    assert_eq!(profile.part_name().as_str(), "MG22C224, rev 1");

    assert_eq!(bank.base(), 0);
    assert_eq!(bank.size(), 512 * 1024);
    assert_eq!(bank.sectors().len(), 64);
    assert_eq!(bank.sectors()[3].offset, 3 * PAGE);
    assert!(bank
        .sectors()
        .iter()
        .all(|s| s.size == PAGE && s.erased.is_none() && s.protected == Some(false)));
    assert!(target.msc_clock_enabled());
}

#[test]
fn test_probe_every_family() {
    for desc in FAMILIES {
        let config = DummyConfig {
            legacy_family: desc.family_id,
            ..DummyConfig::default()
        };
        let mut target = DummyTarget::new(config);
        let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
        let result = bank.probe(&mut target);

        if desc.series == 2 {
            assert_eq!(result, Ok(()), "{}", desc.name);
            assert_eq!(bank.profile().unwrap().descriptor.name, desc.name);
        } else {
            assert_eq!(
                result,
                Err(Error::UnsupportedSeries {
                    family: desc.family_id,
                    series: desc.series
                }),
                "{}",
                desc.name
            );
            assert!(!bank.is_probed());
        }
    }
}

#[test]
fn test_probe_unknown_family() {
    let config = DummyConfig {
        legacy_family: 22,
        ..DummyConfig::default()
    };
    let mut target = DummyTarget::new(config);
    let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    assert_eq!(bank.probe(&mut target), Err(Error::UnknownFamily(22)));
}

#[test]
fn test_probe_page_size_discovery() {
    for (exp, expected) in [(1u8, 2048u32), (2, 4096), (3, 8192)] {
        let config = DummyConfig {
            page_size_exponent: exp,
            ..DummyConfig::default()
        };
        let (_target, _registry, bank) = probed(config);
        assert_eq!(bank.profile().unwrap().page_size, expected);
        assert_eq!(bank.sectors().len() as u32, 512 * 1024 / expected);
    }

    for exp in [0u8, 4] {
        let config = DummyConfig {
            page_size_exponent: exp,
            ..DummyConfig::default()
        };
        let mut target = DummyTarget::new(config);
        let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
        assert_eq!(bank.probe(&mut target), Err(Error::InvalidPageSize(exp)));
        assert!(bank.sectors().is_empty());
    }
}

#[test]
fn test_probe_rejects_bad_part_info() {
    let config = DummyConfig {
        part_family_code: 3,
        ..DummyConfig::default()
    };
    let mut target = DummyTarget::new(config);
    let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    assert_eq!(bank.probe(&mut target), Err(Error::UnknownPartFamily(3)));

    let config = DummyConfig {
        cpu_partno: 0xC27,
        ..DummyConfig::default()
    };
    let mut target = DummyTarget::new(config);
    let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    assert_eq!(bank.probe(&mut target), Err(Error::UnsupportedCore(0xC27)));
}

#[test]
fn test_probe_xg23_rebases_main_flash() {
    let config = DummyConfig {
        part_family_num: 23,
        device_serial: 1,
        ..DummyConfig::default()
    };
    let (mut target, _registry, mut bank) = probed(config);

    assert_eq!(bank.base(), 0x0800_0000);
    assert!(target.msc_clock_enabled());
    assert_eq!(bank.profile().unwrap().part_name().as_str(), "MG23A001, rev 1");

    bank.erase(&mut target, 0, 0).unwrap();
    bank.write(&mut target, 0, &[0x12, 0x34, 0x56, 0x78]).unwrap();
    assert_eq!(&target.main_flash()[..4], &[0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn test_aux_bank_geometry() {
    let mut target = DummyTarget::new_default();
    let mut registry = SessionRegistry::new(FlashOptions::default());
    let mut user = registry.attach(&target, USER_DATA_BASE).unwrap();
    let mut lock = registry.attach(&target, LOCK_BITS_BASE).unwrap();

    user.probe(&mut target).unwrap();
    lock.probe(&mut target).unwrap();

    for bank in [&user, &lock] {
        assert_eq!(bank.size(), 1024);
        assert_eq!(bank.sectors().len(), 1);
        assert_eq!(bank.sectors()[0].size, 1024);
    }
    assert_eq!(user.kind(), BankKind::UserData);
    assert_eq!(lock.kind(), BankKind::LockBits);
    assert_eq!(user.base(), USER_DATA_BASE);
}

#[test]
fn test_auto_probe_is_idempotent() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.reset_counters();
    bank.auto_probe(&mut target).unwrap();
    assert_eq!(target.counters(), Counters::default());
}

#[test]
fn test_info_string() {
    let (mut target, _registry, bank) = probed(DummyConfig::default());
    assert_eq!(bank.info(&mut target).unwrap().as_str(), "MG22C224, rev 1");
}

#[test]
fn test_erase_reads_back_erased() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.main_flash_mut()[..3 * PAGE as usize].fill(0x00);

    bank.erase(&mut target, 0, 1).unwrap();

    let mut buf = vec![0u8; 2 * PAGE as usize];
    bank.read(&mut target, 0, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0xFF));
    assert!(target.main_flash()[2 * PAGE as usize..3 * PAGE as usize]
        .iter()
        .all(|&b| b == 0x00));
    assert_eq!(bank.sectors()[0].erased, Some(true));
    assert!(!target.msc_unlocked());
    assert!(!target.write_enabled());
}

#[test]
fn test_erase_range_checks() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    assert_eq!(bank.erase(&mut target, 0, 64), Err(Error::SectorOutOfRange));
    assert_eq!(bank.erase(&mut target, 3, 2), Err(Error::SectorOutOfRange));
}

#[test]
fn test_write_round_trip_unaligned_length() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    let data = pattern(13, 7);

    bank.write(&mut target, 0x100, &data).unwrap();

    let mut buf = [0u8; 13];
    bank.read(&mut target, 0x100, &mut buf).unwrap();
    assert_eq!(&buf[..], &data[..]);
    assert_eq!(target.counters().algorithm_runs, 1);
    assert_eq!(target.live_work_areas(), 0);
    assert!(!target.msc_unlocked());
    assert!(!target.write_enabled());
}

#[test]
fn test_write_unaligned_address_has_no_side_effects() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.reset_counters();

    assert_eq!(
        bank.write(&mut target, 0x102, &[1, 2, 3, 4]),
        Err(Error::AlignmentViolation { addr: 0x102 })
    );
    assert_eq!(target.counters(), Counters::default());
    assert!(target.main_flash().iter().all(|&b| b == 0xFF));
}

#[test]
fn test_write_out_of_bounds() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    assert_eq!(
        bank.write(&mut target, 512 * 1024 - 4, &[0u8; 8]),
        Err(Error::AddressOutOfBounds)
    );
}

#[test]
fn test_fallback_matches_block_write() {
    let image = pattern(4099, 3);

    let (mut fast, _r1, mut fast_bank) = probed(DummyConfig::default());
    fast_bank.write(&mut fast, 0x2000, &image).unwrap();

    let config = DummyConfig {
        work_area_size: 200,
        ..DummyConfig::default()
    };
    let (mut slow, _r2, mut slow_bank) = probed(config);
    slow_bank.write(&mut slow, 0x2000, &image).unwrap();

    assert_eq!(fast.main_flash(), slow.main_flash());
    assert_eq!(&slow.main_flash()[0x2000..0x2000 + image.len()], &image[..]);
    assert_eq!(&slow.main_flash()[0x2000 + image.len()..0x2000 + 4100], &[0xFF]);

    assert_eq!(fast.counters().algorithm_runs, 1);
    assert_eq!(fast.counters().keep_alives, 0);
    assert_eq!(slow.counters().algorithm_runs, 0);
    assert_eq!(slow.counters().keep_alives, 1025);
    assert_eq!(fast.live_work_areas(), 0);
    assert_eq!(slow.live_work_areas(), 0);
}

#[test]
fn test_fallback_without_algorithm_support() {
    let config = DummyConfig {
        algorithm_support: false,
        ..DummyConfig::default()
    };
    let (mut target, _registry, mut bank) = probed(config);
    let data = pattern(64, 9);

    bank.write(&mut target, 0, &data).unwrap();
    assert_eq!(&target.main_flash()[..64], &data[..]);
    assert_eq!(target.counters().keep_alives, 16);
    assert_eq!(target.live_work_areas(), 0);
}

#[test]
fn test_lock_round_trip_preserves_page() {
    let mut target = DummyTarget::new_default();
    let trailing = pattern((PAGE - 512) as usize, 42);
    target.lock_bits_page_mut()[512..].copy_from_slice(&trailing);
    // Mass erase lock word set by someone else
    target.lock_bits_page_mut()[125 * 4..126 * 4].copy_from_slice(&0x0000_FFFFu32.to_le_bytes());

    let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    bank.probe(&mut target).unwrap();
    bank.protect(&mut target, true, 5, 5).unwrap();
    assert_eq!(bank.sectors()[5].protected, Some(true));

    assert_eq!(target.lock_word(0), !(1 << 5));
    assert_eq!(target.lock_word(125), 0x0000_FFFF);
    assert_eq!(&target.lock_bits_page()[512..], &trailing[..]);

    // Fresh session reloads from the device
    drop(bank);
    let (_registry, mut bank) = attach(&target, MAIN_FLASH_BASE);
    bank.probe(&mut target).unwrap();
    for (i, sector) in bank.sectors().iter().enumerate() {
        assert_eq!(sector.protected, Some(i == 5), "page {}", i);
    }
}

#[test]
fn test_protected_page_rejects_erase_and_write() {
    for algorithm_support in [true, false] {
        let config = DummyConfig {
            algorithm_support,
            ..DummyConfig::default()
        };
        let (mut target, _registry, mut bank) = probed(config);
        bank.protect(&mut target, true, 3, 3).unwrap();

        assert_eq!(
            bank.erase(&mut target, 3, 3),
            Err(Error::PageLocked { addr: 3 * PAGE })
        );
        assert_eq!(
            bank.write(&mut target, 3 * PAGE + 8, &[0u8; 8]),
            Err(Error::PageLocked { addr: 3 * PAGE + 8 })
        );
        assert!(target.main_flash()[3 * PAGE as usize..4 * PAGE as usize]
            .iter()
            .all(|&b| b == 0xFF));
        assert!(!target.msc_unlocked());
    }
}

#[test]
fn test_unprotect_restores_access() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    bank.protect(&mut target, true, 0, 9).unwrap();
    bank.protect(&mut target, false, 0, 9).unwrap();

    assert_eq!(target.lock_word(0), u32::MAX);
    bank.write(&mut target, 0, &[0xAA; 4]).unwrap();
    assert_eq!(&target.main_flash()[..4], &[0xAA; 4]);
}

#[test]
fn test_erase_continues_past_locked_page() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.main_flash_mut()[..3 * PAGE as usize].fill(0x00);
    bank.protect(&mut target, true, 1, 1).unwrap();
    target.reset_counters();

    assert_eq!(
        bank.erase(&mut target, 0, 2),
        Err(Error::PageLocked { addr: PAGE })
    );
    assert_eq!(target.counters().erases, 2);
    assert_eq!(target.main_flash()[0], 0xFF);
    assert_eq!(target.main_flash()[PAGE as usize], 0x00);
    assert_eq!(target.main_flash()[2 * PAGE as usize], 0xFF);
}

#[test]
fn test_aux_banks_cannot_be_protected() {
    let mut target = DummyTarget::new_default();
    for base in [USER_DATA_BASE, LOCK_BITS_BASE] {
        let (_registry, mut bank) = attach(&target, base);
        bank.probe(&mut target).unwrap();
        target.reset_counters();

        assert_eq!(
            bank.protect(&mut target, true, 0, 0),
            Err(Error::ProtectUnsupported)
        );
        assert_eq!(target.counters().erases, 0);
        assert_eq!(bank.lock_bits(), LockBitmap::new());
    }
}

#[test]
fn test_lock_words_are_read_only() {
    let mut target = DummyTarget::new_default();
    let (_registry, mut bank) = attach(&target, LOCK_BITS_BASE);
    bank.probe(&mut target).unwrap();

    assert_eq!(
        bank.write(&mut target, 0, &[0u8; 4]),
        Err(Error::LockWordsReadOnly)
    );
    assert_eq!(
        bank.write(&mut target, 508, &[0u8; 4]),
        Err(Error::LockWordsReadOnly)
    );
    bank.write(&mut target, 512, &[0x55; 4]).unwrap();
    assert_eq!(&target.lock_bits_page()[512..516], &[0x55; 4]);
}

#[test]
fn test_lock_bits_erase_restores_lock_words() {
    let mut target = DummyTarget::new_default();
    let mut registry = SessionRegistry::new(FlashOptions::default());
    let mut main = registry.attach(&target, MAIN_FLASH_BASE).unwrap();
    let mut lock = registry.attach(&target, LOCK_BITS_BASE).unwrap();

    main.probe(&mut target).unwrap();
    main.protect(&mut target, true, 2, 2).unwrap();
    lock.probe(&mut target).unwrap();

    lock.erase(&mut target, 0, 0).unwrap();
    assert_eq!(target.lock_word(0), !(1 << 2));
    assert_eq!(target.lock_bits_page()[600], 0xFF);
}

#[test]
fn test_user_data_round_trip() {
    let mut target = DummyTarget::new_default();
    let (_registry, mut bank) = attach(&target, USER_DATA_BASE);
    bank.probe(&mut target).unwrap();

    let data = pattern(100, 1);
    bank.erase(&mut target, 0, 0).unwrap();
    bank.write(&mut target, 16, &data).unwrap();
    assert_eq!(&target.user_data()[16..116], &data[..]);
    assert_eq!(
        bank.write(&mut target, 1020, &[0u8; 8]),
        Err(Error::AddressOutOfBounds)
    );
}

#[test]
fn test_debug_lock() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    bank.protect(&mut target, true, 1, 1).unwrap();

    bank.debug_lock(&mut target).unwrap();
    assert_eq!(target.lock_word(127), 0);
    assert_eq!(target.lock_word(0), !(1 << 1));
    assert!(bank.lock_bits().debug_locked());
}

#[test]
fn test_protect_check_reloads_lock_bits() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.lock_bits_page_mut()[0] = !(1 << 7);

    assert_eq!(bank.sectors()[7].protected, Some(false));
    bank.protect_check(&mut target).unwrap();
    assert_eq!(bank.sectors()[7].protected, Some(true));
    assert_eq!(bank.sectors()[6].protected, Some(false));
}

#[test]
fn test_erase_check() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    bank.write(&mut target, PAGE + 4, &[0u8; 4]).unwrap();

    bank.erase_check(&mut target).unwrap();
    assert_eq!(bank.sectors()[0].erased, Some(true));
    assert_eq!(bank.sectors()[1].erased, Some(false));
}

#[test]
fn test_erase_timeout_exact_budget() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.force_status(MscStatus::BUSY);
    target.reset_counters();

    assert_eq!(bank.erase(&mut target, 0, 0), Err(Error::Timeout));
    // One read after latching, then the budget plus the final read
    assert_eq!(target.counters().status_reads, 1 + 101);
    assert_eq!(target.counters().sleeps, 100);
    assert!(!target.write_enabled());
}

#[test]
fn test_busy_within_budget() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.set_busy_cycles(5);
    target.reset_counters();

    bank.erase(&mut target, 0, 0).unwrap();
    assert_eq!(target.counters().sleeps, 5);
}

#[test]
fn test_configured_erase_budget() {
    let mut target = DummyTarget::new_default();
    let options = FlashOptions {
        erase_timeout: 10,
        ..FlashOptions::default()
    };
    let mut registry = SessionRegistry::new(options);
    let mut bank = registry.attach(&target, MAIN_FLASH_BASE).unwrap();
    bank.probe(&mut target).unwrap();
    target.force_status(MscStatus::BUSY);
    target.reset_counters();

    assert_eq!(bank.erase(&mut target, 0, 0), Err(Error::Timeout));
    assert_eq!(target.counters().sleeps, 10);
}

#[test]
fn test_word_write_waits_for_wdataready() {
    let config = DummyConfig {
        algorithm_support: false,
        ..DummyConfig::default()
    };
    let (mut target, _registry, mut bank) = probed(config);
    target.mask_status(MscStatus::WDATAREADY);
    target.reset_counters();

    assert_eq!(bank.write(&mut target, 0, &[0u8; 8]), Err(Error::Timeout));
    assert_eq!(target.counters().sleeps, 100);
    assert_eq!(target.counters().word_writes, 0);
    assert_eq!(target.counters().keep_alives, 1);
}

#[test]
fn test_operations_require_halted_target() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    target.set_halted(false);
    target.reset_counters();

    assert_eq!(bank.erase(&mut target, 0, 0), Err(Error::TargetNotHalted));
    assert_eq!(bank.write(&mut target, 0, &[0; 4]), Err(Error::TargetNotHalted));
    assert_eq!(
        bank.protect(&mut target, true, 0, 0),
        Err(Error::TargetNotHalted)
    );
    assert_eq!(bank.protect_check(&mut target), Err(Error::TargetNotHalted));
    assert_eq!(bank.debug_lock(&mut target), Err(Error::TargetNotHalted));
    assert_eq!(target.counters().register_writes, 0);
    assert_eq!(bank.lock_bits(), LockBitmap::new());
}

#[test]
fn test_banks_share_session() {
    let mut target = DummyTarget::new_default();
    let mut registry = SessionRegistry::new(FlashOptions::default());
    let mut main = registry.attach(&target, MAIN_FLASH_BASE).unwrap();
    let mut user = registry.attach(&target, USER_DATA_BASE).unwrap();
    assert_eq!(main.session_refs(), 2);

    main.probe(&mut target).unwrap();
    user.probe(&mut target).unwrap();
    main.protect(&mut target, true, 4, 4).unwrap();
    assert!(user.lock_bits().page_locked(BankKind::Main, 4));

    let session = alloc::rc::Rc::downgrade(main.session());
    drop(main);
    assert_eq!(user.session_refs(), 1);
    user.write(&mut target, 0, &[0x11; 4]).unwrap();
    assert_eq!(&target.user_data()[..4], &[0x11; 4]);

    drop(user);
    assert!(session.upgrade().is_none());
    assert_eq!(registry.live_sessions(), 0);

    let other = DummyTarget::new_default();
    let a = registry.attach(&target, MAIN_FLASH_BASE).unwrap();
    let b = registry.attach(&other, MAIN_FLASH_BASE).unwrap();
    assert!(!alloc::rc::Rc::ptr_eq(a.session(), b.session()));
    assert_eq!(registry.live_sessions(), 2);
}

#[test]
fn test_msc_ignores_commands_while_locked() {
    let mut target = DummyTarget::new_default();
    target.write_u32(cmu::CLKEN1_SET, cmu::CLKEN1_MSC_G22).unwrap();
    target.main_flash_mut()[0] = 0;

    let base = regs::MSC_BASE;
    target.write_u32(base + regs::WRITECTRL, regs::WRITECTRL_WREN).unwrap();
    target.write_u32(base + regs::ADDRB, 0).unwrap();
    target
        .write_u32(base + regs::WRITECMD, regs::WRITECMD_LADDRIM | regs::WRITECMD_ERASEPAGE)
        .unwrap();
    assert_eq!(target.main_flash()[0], 0);
    assert!(!target.write_enabled());
}

#[test]
fn test_work_area_allocator() {
    let mut target = DummyTarget::new(DummyConfig {
        work_area_size: 1024,
        ..DummyConfig::default()
    });
    let a = target.alloc_work_area(84).unwrap();
    let b = target.alloc_work_area(512).unwrap();
    assert_eq!(a.address, RAM_BASE);
    assert_eq!(b.address, RAM_BASE + 84);
    assert_eq!(target.alloc_work_area(512), Err(Error::ResourceExhausted));

    target.free_work_area(a);
    let c = target.alloc_work_area(64).unwrap();
    assert_eq!(c.address, RAM_BASE);
    assert_eq!(target.live_work_areas(), 2);
}

#[test]
fn test_config_from_ron() {
    let config: DummyConfig =
        ron::from_str("(part_family_num: 23, flash_kib: 256, page_size_exponent: 1)").unwrap();
    assert_eq!(config.part_family_num, 23);
    assert_eq!(config.flash_kib, 256);
    assert_eq!(config.page_size(), 2048);
    assert_eq!(config.legacy_family, 128);
    assert_eq!(config.main_base(), 0x0800_0000);
}

#[test]
fn test_failed_sibling_probe_keeps_lock_mirror() {
    let mut target = DummyTarget::new_default();
    let mut registry = SessionRegistry::new(FlashOptions::default());
    let mut main = registry.attach(&target, MAIN_FLASH_BASE).unwrap();
    let mut user = registry.attach(&target, USER_DATA_BASE).unwrap();

    main.probe(&mut target).unwrap();
    user.probe(&mut target).unwrap();
    main.protect(&mut target, true, 3, 3).unwrap();

    target.set_cpu_partno(0xC27);
    assert_eq!(user.probe(&mut target), Err(Error::UnsupportedCore(0xC27)));
    target.set_cpu_partno(CoreType::PARTNO_M33);

    assert!(!user.is_probed());
    assert!(main.is_probed());
    assert!(main.lock_bits().page_locked(BankKind::Main, 3));

    main.protect(&mut target, true, 5, 5).unwrap();
    assert_eq!(target.lock_word(0), !((1 << 3) | (1 << 5)));
}

#[test]
fn test_rejected_write_keeps_erase_state() {
    let (mut target, _registry, mut bank) = probed(DummyConfig::default());
    bank.erase_check(&mut target).unwrap();
    assert_eq!(bank.sectors()[0].erased, Some(true));

    assert_eq!(
        bank.write(&mut target, 2, &[0u8; 4]),
        Err(Error::AlignmentViolation { addr: 2 })
    );
    target.set_halted(false);
    assert_eq!(bank.write(&mut target, 0, &[0u8; 4]), Err(Error::TargetNotHalted));
    target.set_halted(true);
    assert_eq!(bank.sectors()[0].erased, Some(true));

    bank.write(&mut target, 0, &[0u8; 4]).unwrap();
    assert_eq!(bank.sectors()[0].erased, None);
    assert_eq!(bank.sectors()[1].erased, Some(true));
}
