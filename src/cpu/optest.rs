use super::reg::Flag;
use super::CPU;
use crate::clock::Clock;
use crate::error::Error;
use crate::mem::{Interrupt, Memory, IE, IF};

fn init() -> (CPU, Memory, Clock) {
  let mut cpu = CPU::new();
  let mem = Memory::new();
  // Set the PC to start in WRAM.
  cpu.regs.pc = 0xc000;
  (cpu, mem, Clock::new())
}

/// Place `code` at PC, step once and return the machine cycles taken.
fn exec(cpu: &mut CPU, mem: &mut Memory, clock: &mut Clock, code: &[u8]) -> u32 {
  mem.write(cpu.regs.pc, code);
  let t = cpu.step(mem, clock).unwrap();
  assert_eq!(t % 4, 0);
  t / 4
}

fn run(
  cpu: &mut CPU,
  mem: &mut Memory,
  clock: &mut Clock,
  code: &[u8],
  len: u16,
  time_expected: u32,
) {
  let start = cpu.regs.pc;
  let before = clock.now();
  let time_actual = exec(cpu, mem, clock, code);
  // Test time.
  assert_eq!(time_actual, time_expected);
  assert_eq!(clock.now() - before, u64::from(time_expected) * 4);
  // Test that the PC was incremented.
  assert_eq!(cpu.regs.pc, start + len);
}

#[test]
fn nop() {
  let (mut cpu, mut mem, mut clock) = init();
  run(&mut cpu, &mut mem, &mut clock, &[0x00], 1, 1);
}

#[test]
fn ld_nn_n() {
  macro_rules! run_test {
    ($reg:ident, $opcode:expr) => {{
      let (mut cpu, mut mem, mut clock) = init();
      let f = cpu.regs.f();
      run(&mut cpu, &mut mem, &mut clock, &[$opcode, 0x42], 2, 2);
      assert_eq!(cpu.regs.f(), f);
      assert_eq!(cpu.regs.$reg, 0x42);
    }};
  }
  run_test!(b, 0x06);
  run_test!(c, 0x0e);
  run_test!(d, 0x16);
  run_test!(e, 0x1e);
  run_test!(h, 0x26);
  run_test!(l, 0x2e);
  run_test!(a, 0x3e);
}

#[test]
fn ld_r1_r2() {
  macro_rules! reg_reg {
    ($r1:ident, $r2:ident, $opcode:expr) => {{
      let (mut cpu, mut mem, mut clock) = init();
      cpu.regs.$r2 = 0x42;
      let f = cpu.regs.f();
      run(&mut cpu, &mut mem, &mut clock, &[$opcode], 1, 1);
      assert_eq!(cpu.regs.f(), f);
      assert_eq!(cpu.regs.$r1, 0x42);
      assert_eq!(cpu.regs.$r2, 0x42);
    }};
  }

  reg_reg!(a, a, 0x7f);
  reg_reg!(a, b, 0x78);
  reg_reg!(a, c, 0x79);
  reg_reg!(a, d, 0x7a);
  reg_reg!(a, e, 0x7b);
  reg_reg!(a, h, 0x7c);
  reg_reg!(a, l, 0x7d);

  reg_reg!(b, c, 0x41);
  reg_reg!(b, a, 0x47);
  reg_reg!(c, d, 0x4a);
  reg_reg!(d, e, 0x53);
  reg_reg!(e, h, 0x5c);
  reg_reg!(h, l, 0x65);
  reg_reg!(l, a, 0x6f);
}

#[test]
fn ld_hl_indirect() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_hl(0xc100);
  cpu.regs.b = 0x99;
  run(&mut cpu, &mut mem, &mut clock, &[0x70], 1, 2);
  assert_eq!(mem.rb(0xc100), 0x99);

  mem.wb(0xc100, 0x17);
  run(&mut cpu, &mut mem, &mut clock, &[0x7e], 1, 2);
  assert_eq!(cpu.regs.a, 0x17);

  run(&mut cpu, &mut mem, &mut clock, &[0x36, 0x5a], 2, 3);
  assert_eq!(mem.rb(0xc100), 0x5a);

  cpu.regs.a = 0x11;
  run(&mut cpu, &mut mem, &mut clock, &[0x22], 1, 2);
  assert_eq!(mem.rb(0xc100), 0x11);
  assert_eq!(cpu.regs.hl(), 0xc101);

  run(&mut cpu, &mut mem, &mut clock, &[0x3a], 1, 2);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.hl(), 0xc100);
}

#[test]
fn ld_high_page() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.a = 0x3c;
  run(&mut cpu, &mut mem, &mut clock, &[0xe0, 0x80], 2, 3);
  assert_eq!(mem.rb(0xff80), 0x3c);

  cpu.regs.c = 0x81;
  run(&mut cpu, &mut mem, &mut clock, &[0xe2], 1, 2);
  assert_eq!(mem.rb(0xff81), 0x3c);

  mem.wb(0xff82, 0x77);
  run(&mut cpu, &mut mem, &mut clock, &[0xf0, 0x82], 2, 3);
  assert_eq!(cpu.regs.a, 0x77);

  run(&mut cpu, &mut mem, &mut clock, &[0xea, 0x00, 0xd0], 3, 4);
  assert_eq!(mem.rb(0xd000), 0x77);
}

#[test]
fn ld_16bit() {
  let (mut cpu, mut mem, mut clock) = init();
  run(&mut cpu, &mut mem, &mut clock, &[0x21, 0x34, 0x12], 3, 3);
  assert_eq!(cpu.regs.hl(), 0x1234);
  run(&mut cpu, &mut mem, &mut clock, &[0x31, 0x00, 0xd0], 3, 3);
  assert_eq!(cpu.regs.sp, 0xd000);
  run(&mut cpu, &mut mem, &mut clock, &[0x08, 0x00, 0xc2], 3, 5);
  assert_eq!(mem.rw(0xc200), 0xd000);
  run(&mut cpu, &mut mem, &mut clock, &[0xf9], 1, 2);
  assert_eq!(cpu.regs.sp, 0x1234);
}

#[test]
fn alu_flags() {
  let (mut cpu, mut mem, mut clock) = init();

  cpu.regs.a = 0x3a;
  cpu.regs.b = 0xc6;
  run(&mut cpu, &mut mem, &mut clock, &[0x80], 1, 1);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.f(), 0xb0);

  cpu.regs.a = 0xe1;
  cpu.regs.set_flag(Flag::C, true);
  run(&mut cpu, &mut mem, &mut clock, &[0xce, 0x0f], 2, 2);
  assert_eq!(cpu.regs.a, 0xf1);
  assert_eq!(cpu.regs.f(), 0x20);

  cpu.regs.a = 0x3e;
  cpu.regs.b = 0x3e;
  run(&mut cpu, &mut mem, &mut clock, &[0x90], 1, 1);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.f(), 0xc0);

  cpu.regs.a = 0x3b;
  cpu.regs.h = 0x2a;
  cpu.regs.set_flag(Flag::C, true);
  run(&mut cpu, &mut mem, &mut clock, &[0x9c], 1, 1);
  assert_eq!(cpu.regs.a, 0x10);
  assert_eq!(cpu.regs.f(), 0x40);

  cpu.regs.a = 0x5a;
  run(&mut cpu, &mut mem, &mut clock, &[0xe6, 0x3f], 2, 2);
  assert_eq!(cpu.regs.a, 0x1a);
  assert_eq!(cpu.regs.f(), 0x20);

  run(&mut cpu, &mut mem, &mut clock, &[0xaf], 1, 1);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.f(), 0x80);

  cpu.regs.a = 0x5a;
  cpu.regs.set_hl(0xc100);
  mem.wb(0xc100, 0x0f);
  run(&mut cpu, &mut mem, &mut clock, &[0xb6], 1, 2);
  assert_eq!(cpu.regs.a, 0x5f);
  assert_eq!(cpu.regs.f(), 0x00);

  cpu.regs.a = 0x3c;
  run(&mut cpu, &mut mem, &mut clock, &[0xfe, 0x40], 2, 2);
  assert_eq!(cpu.regs.a, 0x3c);
  assert_eq!(cpu.regs.f(), 0x50);
}

#[test]
fn inc_dec() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.reset_flags();
  cpu.regs.set_flag(Flag::C, true);
  cpu.regs.b = 0x0f;
  run(&mut cpu, &mut mem, &mut clock, &[0x04], 1, 1);
  assert_eq!(cpu.regs.b, 0x10);
  assert_eq!(cpu.regs.f(), 0x30);

  cpu.regs.reset_flags();
  cpu.regs.set_hl(0xc100);
  mem.wb(0xc100, 0x01);
  run(&mut cpu, &mut mem, &mut clock, &[0x35], 1, 3);
  assert_eq!(mem.rb(0xc100), 0x00);
  assert_eq!(cpu.regs.f(), 0xc0);

  cpu.regs.a = 0x10;
  run(&mut cpu, &mut mem, &mut clock, &[0x3d], 1, 1);
  assert_eq!(cpu.regs.a, 0x0f);
  assert!(cpu.regs.h());
  assert!(cpu.regs.n());

  cpu.regs.set_bc(0xffff);
  let f = cpu.regs.f();
  run(&mut cpu, &mut mem, &mut clock, &[0x03], 1, 2);
  assert_eq!(cpu.regs.bc(), 0x0000);
  assert_eq!(cpu.regs.f(), f);
  run(&mut cpu, &mut mem, &mut clock, &[0x0b], 1, 2);
  assert_eq!(cpu.regs.bc(), 0xffff);
}

#[test]
fn jr_signed() {
  let (mut cpu, mut mem, mut clock) = init();
  // Jump to itself: the offset counts from after the operand.
  run(&mut cpu, &mut mem, &mut clock, &[0x18, 0xfe], 0, 3);
  assert_eq!(cpu.regs.pc, 0xc000);
  run(&mut cpu, &mut mem, &mut clock, &[0x18, 0x05], 7, 3);
  assert_eq!(cpu.regs.pc, 0xc007);
}

#[test]
fn jr_conditional_timing() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_flag(Flag::Z, true);
  run(&mut cpu, &mut mem, &mut clock, &[0x20, 0x05], 2, 2);

  cpu.regs.set_flag(Flag::Z, false);
  run(&mut cpu, &mut mem, &mut clock, &[0x20, 0x05], 7, 3);

  // Full backward reach.
  cpu.regs.set_flag(Flag::C, true);
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0x38, 0x80]), 3);
  assert_eq!(cpu.regs.pc, 0xc00b - 128);
}

#[test]
fn add_hl_flags() {
  let (mut cpu, mut mem, mut clock) = init();
  // Z is preserved from before.
  cpu.regs.set_f(0x80);
  cpu.regs.set_hl(0x0fff);
  cpu.regs.set_bc(0x0001);
  run(&mut cpu, &mut mem, &mut clock, &[0x09], 1, 2);
  assert_eq!(cpu.regs.hl(), 0x1000);
  assert_eq!(cpu.regs.f(), 0xa0);

  cpu.regs.reset_flags();
  cpu.regs.set_hl(0xffff);
  cpu.regs.set_de(0x0001);
  run(&mut cpu, &mut mem, &mut clock, &[0x19], 1, 2);
  assert_eq!(cpu.regs.hl(), 0x0000);
  assert_eq!(cpu.regs.f(), 0x30);

  cpu.regs.set_f(0x40);
  cpu.regs.set_hl(0x0800);
  run(&mut cpu, &mut mem, &mut clock, &[0x29], 1, 2);
  assert_eq!(cpu.regs.hl(), 0x1000);
  assert_eq!(cpu.regs.f(), 0x20);
}

#[test]
fn sp_offset_flags() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_f(0xc0);
  cpu.regs.sp = 0x00ff;
  run(&mut cpu, &mut mem, &mut clock, &[0xe8, 0x01], 2, 4);
  assert_eq!(cpu.regs.sp, 0x0100);
  assert_eq!(cpu.regs.f(), 0x30);

  cpu.regs.sp = 0xfff8;
  run(&mut cpu, &mut mem, &mut clock, &[0xe8, 0xfe], 2, 4);
  assert_eq!(cpu.regs.sp, 0xfff6);
  assert_eq!(cpu.regs.f(), 0x30);

  cpu.regs.sp = 0xfff8;
  run(&mut cpu, &mut mem, &mut clock, &[0xf8, 0x02], 2, 3);
  assert_eq!(cpu.regs.hl(), 0xfffa);
  assert_eq!(cpu.regs.sp, 0xfff8);
  assert_eq!(cpu.regs.f(), 0x00);
}

#[test]
fn daa() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.a = 0x45;
  cpu.regs.set_f(0x20);
  run(&mut cpu, &mut mem, &mut clock, &[0x27], 1, 1);
  assert_eq!(cpu.regs.a, 0x4b);
  assert!(!cpu.regs.c());
  assert!(!cpu.regs.h());

  cpu.regs.a = 0x9a;
  cpu.regs.set_f(0x00);
  run(&mut cpu, &mut mem, &mut clock, &[0x27], 1, 1);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.f(), 0x90);

  // 0x47 - 0x28 = 0x19 in BCD.
  cpu.regs.a = 0x47;
  cpu.regs.b = 0x28;
  run(&mut cpu, &mut mem, &mut clock, &[0x90], 1, 1);
  run(&mut cpu, &mut mem, &mut clock, &[0x27], 1, 1);
  assert_eq!(cpu.regs.a, 0x19);
  assert_eq!(cpu.regs.f(), 0x40);

  // 0x38 + 0x45 = 0x83 in BCD.
  cpu.regs.a = 0x38;
  cpu.regs.b = 0x45;
  run(&mut cpu, &mut mem, &mut clock, &[0x80], 1, 1);
  run(&mut cpu, &mut mem, &mut clock, &[0x27], 1, 1);
  assert_eq!(cpu.regs.a, 0x83);
  assert!(!cpu.regs.c());
}

#[test]
fn misc_flags() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_f(0x80);
  cpu.regs.a = 0x0f;
  run(&mut cpu, &mut mem, &mut clock, &[0x2f], 1, 1);
  assert_eq!(cpu.regs.a, 0xf0);
  assert_eq!(cpu.regs.f(), 0xe0);

  run(&mut cpu, &mut mem, &mut clock, &[0x37], 1, 1);
  assert_eq!(cpu.regs.f(), 0x90);
  run(&mut cpu, &mut mem, &mut clock, &[0x3f], 1, 1);
  assert_eq!(cpu.regs.f(), 0x80);
}

#[test]
fn accumulator_rotates() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_f(0x80);
  cpu.regs.a = 0x80;
  run(&mut cpu, &mut mem, &mut clock, &[0x07], 1, 1);
  assert_eq!(cpu.regs.a, 0x01);
  assert_eq!(cpu.regs.f(), 0x10);

  cpu.regs.reset_flags();
  cpu.regs.a = 0x01;
  run(&mut cpu, &mut mem, &mut clock, &[0x1f], 1, 1);
  assert_eq!(cpu.regs.a, 0x00);
  assert_eq!(cpu.regs.f(), 0x10);

  run(&mut cpu, &mut mem, &mut clock, &[0x17], 1, 1);
  assert_eq!(cpu.regs.a, 0x01);
  assert_eq!(cpu.regs.f(), 0x00);

  run(&mut cpu, &mut mem, &mut clock, &[0x0f], 1, 1);
  assert_eq!(cpu.regs.a, 0x80);
  assert_eq!(cpu.regs.f(), 0x10);
}

#[test]
fn cb_bit_never_writes() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_hl(0xc100);
  for n in 0..8u8 {
    for m in 0..=255u8 {
      cpu.regs.pc = 0xc000;
      mem.wb(0xc100, m);
      run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x46 | (n << 3)], 2, 3);
      assert_eq!(mem.rb(0xc100), m);
      assert_eq!(cpu.regs.z(), m & (1 << n) == 0);
      assert!(cpu.regs.h());
      assert!(!cpu.regs.n());
    }
  }
}

#[test]
fn cb_register_ops() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_flag(Flag::C, true);
  cpu.regs.b = 0x80;
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x78], 2, 2);
  assert!(!cpu.regs.z());
  // BIT leaves carry alone.
  assert!(cpu.regs.c());

  cpu.regs.reset_flags();
  cpu.regs.c = 0x80;
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x11], 2, 2);
  assert_eq!(cpu.regs.c, 0x00);
  assert_eq!(cpu.regs.f(), 0x90);

  cpu.regs.a = 0xf1;
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x37], 2, 2);
  assert_eq!(cpu.regs.a, 0x1f);
  assert_eq!(cpu.regs.f(), 0x00);

  cpu.regs.e = 0x00;
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0xfb], 2, 2);
  assert_eq!(cpu.regs.e, 0x80);
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0xbb], 2, 2);
  assert_eq!(cpu.regs.e, 0x00);
}

#[test]
fn cb_hl_writes() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_hl(0xc100);
  mem.wb(0xc100, 0xff);
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x9e], 2, 4);
  assert_eq!(mem.rb(0xc100), 0xf7);
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0xde], 2, 4);
  assert_eq!(mem.rb(0xc100), 0xff);

  mem.wb(0xc100, 0x81);
  run(&mut cpu, &mut mem, &mut clock, &[0xcb, 0x2e], 2, 4);
  assert_eq!(mem.rb(0xc100), 0xc0);
  assert_eq!(cpu.regs.f(), 0x10);
}

#[test]
fn push_pop_round_trip() {
  for &v in &[0x0000u16, 0x1234, 0xbeef, 0xffff] {
    let (mut cpu, mut mem, mut clock) = init();
    let sp = cpu.regs.sp;
    cpu.regs.set_bc(v);
    run(&mut cpu, &mut mem, &mut clock, &[0xc5], 1, 4);
    assert_eq!(cpu.regs.sp, sp - 2);
    assert_eq!(mem.rb(sp - 1), (v >> 8) as u8);
    assert_eq!(mem.rb(sp - 2), v as u8);
    run(&mut cpu, &mut mem, &mut clock, &[0xd1], 1, 3);
    assert_eq!(cpu.regs.de(), v);
    assert_eq!(cpu.regs.sp, sp);
  }
}

#[test]
fn pop_af_masks_flags() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.set_bc(0x12ff);
  run(&mut cpu, &mut mem, &mut clock, &[0xc5], 1, 4);
  run(&mut cpu, &mut mem, &mut clock, &[0xf1], 1, 3);
  assert_eq!(cpu.regs.af(), 0x12f0);
}

#[test]
fn call_ret() {
  let (mut cpu, mut mem, mut clock) = init();
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xcd, 0x00, 0xd0]), 6);
  assert_eq!(cpu.regs.pc, 0xd000);
  assert_eq!(cpu.regs.sp, 0xfffc);
  assert_eq!(mem.rw(0xfffc), 0xc003);

  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xc9]), 4);
  assert_eq!(cpu.regs.pc, 0xc003);
  assert_eq!(cpu.regs.sp, 0xfffe);
}

#[test]
fn conditional_call_ret_jp() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.reset_flags();
  run(&mut cpu, &mut mem, &mut clock, &[0xcc, 0x00, 0xd0], 3, 3);
  run(&mut cpu, &mut mem, &mut clock, &[0xd8], 1, 2);
  run(&mut cpu, &mut mem, &mut clock, &[0xca, 0x00, 0xd0], 3, 3);

  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xc4, 0x00, 0xd0]), 6);
  assert_eq!(cpu.regs.pc, 0xd000);
  cpu.regs.set_flag(Flag::C, true);
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xd8]), 5);
  assert_eq!(cpu.regs.pc, 0xc00a);

  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xda, 0x34, 0xc2]), 4);
  assert_eq!(cpu.regs.pc, 0xc234);

  cpu.regs.set_hl(0xc300);
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xe9]), 1);
  assert_eq!(cpu.regs.pc, 0xc300);
}

#[test]
fn rst() {
  let (mut cpu, mut mem, mut clock) = init();
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xef]), 4);
  assert_eq!(cpu.regs.pc, 0x0028);
  assert_eq!(mem.rw(cpu.regs.sp), 0xc001);
}

#[test]
fn illegal_opcode_locks() {
  let (mut cpu, mut mem, mut clock) = init();
  mem.wb(0xc000, 0xd3);
  let err = cpu.step(&mut mem, &mut clock).unwrap_err();
  assert_eq!(
    err,
    Error::IllegalOpcode {
      opcode: 0xd3,
      pc: 0xc000
    }
  );
  assert_eq!(clock.now(), 0);
  assert_eq!(cpu.regs.pc, 0xc000);

  // Still stuck even if the byte changes underneath.
  mem.wb(0xc000, 0x00);
  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap_err(), err);
  assert_eq!(clock.now(), 0);
  assert_eq!(cpu.fault(), Some(&err));
}

#[test]
fn ei_takes_effect_after_next() {
  let (mut cpu, mut mem, mut clock) = init();
  mem.wb(IE, 0x01);
  mem.raise_interrupt(Interrupt::VBlank);
  mem.write(0xc000, &[0xfb, 0x00, 0x00]);

  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 4);
  assert!(!cpu.regs.ime);
  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 4);
  assert_eq!(cpu.regs.pc, 0xc002);
  assert!(cpu.regs.ime);

  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 20);
  assert_eq!(cpu.regs.pc, 0x0040);
  assert_eq!(mem.rw(cpu.regs.sp), 0xc002);
  assert_eq!(mem.rb(IF), 0);
  assert!(!cpu.regs.ime);
}

#[test]
fn di_cancels_pending_ei() {
  let (mut cpu, mut mem, mut clock) = init();
  mem.wb(IE, 0x01);
  mem.raise_interrupt(Interrupt::VBlank);
  mem.write(0xc000, &[0xfb, 0xf3, 0x00]);
  for _ in 0..3 {
    cpu.step(&mut mem, &mut clock).unwrap();
  }
  assert_eq!(cpu.regs.pc, 0xc003);
  assert!(!cpu.regs.ime);
}

#[test]
fn reti_enables_immediately() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.push(&mut mem, 0xc123);
  assert_eq!(exec(&mut cpu, &mut mem, &mut clock, &[0xd9]), 4);
  assert_eq!(cpu.regs.pc, 0xc123);
  assert!(cpu.regs.ime);
}

#[test]
fn halt_wakes_without_ime() {
  let (mut cpu, mut mem, mut clock) = init();
  mem.write(0xc000, &[0x76, 0x00]);
  cpu.step(&mut mem, &mut clock).unwrap();
  assert!(cpu.regs.halted);
  assert_eq!(cpu.regs.pc, 0xc001);

  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 4);
  assert_eq!(cpu.regs.pc, 0xc001);

  // Not enabled anywhere, but the request still ends HALT.
  mem.raise_interrupt(Interrupt::Timer);
  cpu.step(&mut mem, &mut clock).unwrap();
  assert!(!cpu.regs.halted);
  assert_eq!(cpu.regs.pc, 0xc002);
  assert_eq!(mem.rb(IF), 0x04);
}

#[test]
fn halt_holds_over_old_request() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.ime = true;
  mem.wb(IE, 0x01);
  // Serial was requested long ago and never enabled.
  mem.raise_interrupt(Interrupt::Serial);
  run(&mut cpu, &mut mem, &mut clock, &[0x00], 1, 1);
  mem.write(0xc001, &[0x76, 0x00]);
  cpu.step(&mut mem, &mut clock).unwrap();
  assert!(cpu.regs.halted);

  for _ in 0..3 {
    assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 4);
    assert!(cpu.regs.halted);
    assert_eq!(cpu.regs.pc, 0xc002);
  }

  mem.raise_interrupt(Interrupt::VBlank);
  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 20);
  assert!(!cpu.regs.halted);
  assert_eq!(cpu.regs.pc, 0x0040);
  assert_eq!(mem.rb(IF), 0x08);
}

#[test]
fn halt_ends_on_enabled_request_without_ime() {
  let (mut cpu, mut mem, mut clock) = init();
  // Enabled and requested before HALT, but IME is off.
  mem.wb(IE, 0x04);
  mem.wb(IF, 0x04);
  mem.write(0xc000, &[0x76, 0x00]);
  cpu.step(&mut mem, &mut clock).unwrap();
  assert!(cpu.regs.halted);

  cpu.step(&mut mem, &mut clock).unwrap();
  assert!(!cpu.regs.halted);
  assert_eq!(cpu.regs.pc, 0xc002);
  assert_eq!(mem.rb(IF), 0x04);
}

#[test]
fn halt_services_enabled_interrupt() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.ime = true;
  mem.wb(IE, 0x04);
  mem.write(0xc000, &[0x76]);
  cpu.step(&mut mem, &mut clock).unwrap();
  cpu.step(&mut mem, &mut clock).unwrap();
  mem.raise_interrupt(Interrupt::Timer);
  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 20);
  assert_eq!(cpu.regs.pc, 0x0050);
  assert_eq!(mem.rw(cpu.regs.sp), 0xc001);
}

#[test]
fn interrupt_priority() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.ime = true;
  mem.wb(IE, 0x05);
  mem.wb(IF, 0x05);
  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 20);
  assert_eq!(cpu.regs.pc, 0x0040);
  assert_eq!(mem.rb(IF), 0x04);
}

#[test]
fn masked_interrupt_not_serviced() {
  let (mut cpu, mut mem, mut clock) = init();
  cpu.regs.ime = true;
  mem.wb(IE, 0x01);
  mem.wb(IF, 0x02);
  run(&mut cpu, &mut mem, &mut clock, &[0x00], 1, 1);
  assert_eq!(mem.rb(IF), 0x02);
}

#[test]
fn stop_waits_for_wake() {
  let (mut cpu, mut mem, mut clock) = init();
  mem.write(0xc000, &[0x10, 0x00, 0x00]);
  cpu.step(&mut mem, &mut clock).unwrap();
  assert_eq!(cpu.regs.pc, 0xc002);
  assert!(cpu.is_stopped());

  assert_eq!(cpu.step(&mut mem, &mut clock).unwrap(), 4);
  assert_eq!(cpu.regs.pc, 0xc002);

  cpu.wake();
  cpu.step(&mut mem, &mut clock).unwrap();
  assert_eq!(cpu.regs.pc, 0xc003);
}
