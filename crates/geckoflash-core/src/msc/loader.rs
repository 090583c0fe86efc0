//! On-target block write routine
//!
//! Thumb code run from target RAM by the block writer. It drains a
//! ring buffer laid out as `[write ptr, read ptr, data...]` into the MSC one
//! word at a time and stops on a breakpoint.
//!
//! Registers on entry:
//!
//! | Reg | Use |
//! |-----|-----|
//! | r0  | MSC base; STATUS on exit |
//! | r1  | number of words |
//! | r2  | ring buffer start |
//! | r3  | ring buffer end |
//! | r4  | flash destination; fault address on exit |
//!
//! On LOCKED or INVADDR after latching an address the routine zeroes the
//! read pointer and exits with the status in r0.

/// Thumb machine code of the block write routine
pub const WRITE_ALGORITHM: [u8; 84] = [
    0x01, 0x26, // movs r6, #1
    0xc6, 0x60, // str r6, [r0, #WRITECTRL]
    // wait_fifo:
    0x16, 0x68, // ldr r6, [r2, #0]
    0x00, 0x2e, // cmp r6, #0
    0x22, 0xd0, // beq.n exit
    0x55, 0x68, // ldr r5, [r2, #4]
    0xb5, 0x42, // cmp r5, r6
    0xf9, 0xd0, // beq.n wait_fifo
    0x44, 0x61, // str r4, [r0, #ADDRB]
    0x01, 0x26, // movs r6, #1
    0x06, 0x61, // str r6, [r0, #WRITECMD]
    0xc6, 0x69, // ldr r6, [r0, #STATUS]
    0x06, 0x27, // movs r7, #6
    0x3e, 0x42, // tst r6, r7
    0x16, 0xd1, // bne.n error
    // wait_wdataready:
    0xc6, 0x69, // ldr r6, [r0, #STATUS]
    0x08, 0x27, // movs r7, #8
    0x3e, 0x42, // tst r6, r7
    0xfb, 0xd0, // beq.n wait_wdataready
    0x2e, 0x68, // ldr r6, [r5, #0]
    0x86, 0x61, // str r6, [r0, #WDATA]
    0x08, 0x26, // movs r6, #8
    0x06, 0x61, // str r6, [r0, #WRITECMD]
    0x04, 0x35, // adds r5, #4
    0x04, 0x34, // adds r4, #4
    // busy:
    0xc6, 0x69, // ldr r6, [r0, #STATUS]
    0x01, 0x27, // movs r7, #1
    0x3e, 0x42, // tst r6, r7
    0xfb, 0xd1, // bne.n busy
    0x9d, 0x42, // cmp r5, r3
    0x01, 0xd3, // bcc.n no_wrap
    0x15, 0x1c, // adds r5, r2, #0
    0x08, 0x35, // adds r5, #8
    // no_wrap:
    0x55, 0x60, // str r5, [r2, #4]
    0x01, 0x39, // subs r1, #1
    0x00, 0x29, // cmp r1, #0
    0x02, 0xd0, // beq.n exit
    0xdb, 0xe7, // b.n wait_fifo
    // error:
    0x00, 0x20, // movs r0, #0
    0x50, 0x60, // str r0, [r2, #4]
    // exit:
    0x30, 0x1c, // adds r0, r6, #0
    0x00, 0xbe, // bkpt 0x0000
];
