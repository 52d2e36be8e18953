//! Base-page instruction table.
//!
//! Decode is a lookup into `TABLE` by opcode byte. Each entry says how many
//! operand bytes follow, what the instruction costs and which function
//! carries out its effect. Register and condition selectors are taken from
//! the opcode's bit fields inside the effect functions, so one function
//! serves a whole row or column of the opcode map.

use super::{reg, CPU};
use crate::alu::{self, Alu};
use crate::mem::Memory;

/// Operand bytes following the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Implied,
  /// Immediate byte.
  D8,
  /// Immediate word, little-endian.
  D16,
  /// Offset into the 0xff00 page.
  A8,
  /// Signed displacement.
  R8,
}

impl Operand {
  pub fn len(self) -> u16 {
    match self {
      Operand::Implied => 0,
      Operand::D8 | Operand::A8 | Operand::R8 => 1,
      Operand::D16 => 2,
    }
  }
}

/// Which cost applies to an executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
  Base,
  /// A conditional branch, call or return that was taken.
  Taken,
  /// Full cost in machine cycles, decided by the CB page.
  Extended(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Args {
  pub opcode: u8,
  /// Operand, already fetched. Zero for implied instructions.
  pub imm: u16,
}

impl Args {
  fn d8(self) -> u8 {
    self.imm as u8
  }

  fn r8(self) -> u16 {
    self.imm as u8 as i8 as u16
  }
}

pub type Exec = fn(&mut CPU, &mut Memory, Args) -> Timing;

#[derive(Clone, Copy)]
pub struct Op {
  pub mnemonic: &'static str,
  pub operand: Operand,
  /// Machine cycles, or the not-taken cost of a conditional.
  pub cycles: u32,
  /// Machine cycles when a conditional is taken.
  pub taken: u32,
  /// `None` for the undefined slots.
  pub exec: Option<Exec>,
}

macro_rules! op {
  ($name:expr, $operand:ident, $cycles:expr, $exec:ident) => {
    op!($name, $operand, $cycles, $cycles, $exec)
  };
  ($name:expr, $operand:ident, $cycles:expr, $taken:expr, $exec:ident) => {
    Op {
      mnemonic: $name,
      operand: Operand::$operand,
      cycles: $cycles,
      taken: $taken,
      exec: Some($exec as Exec),
    }
  };
}

macro_rules! undefined {
  () => {
    Op {
      mnemonic: "???",
      operand: Operand::Implied,
      cycles: 0,
      taken: 0,
      exec: None,
    }
  };
}

pub static TABLE: [Op; 256] = [
  // 0x00
  op!("NOP", Implied, 1, nop),
  op!("LD BC,d16", D16, 3, ld_rr_d16),
  op!("LD (BC),A", Implied, 2, ld_mrr_a),
  op!("INC BC", Implied, 2, inc_rr),
  op!("INC B", Implied, 1, inc_r),
  op!("DEC B", Implied, 1, dec_r),
  op!("LD B,d8", D8, 2, ld_r_d8),
  op!("RLCA", Implied, 1, rlca),
  op!("LD (a16),SP", D16, 5, ld_a16_sp),
  op!("ADD HL,BC", Implied, 2, add_hl_rr),
  op!("LD A,(BC)", Implied, 2, ld_a_mrr),
  op!("DEC BC", Implied, 2, dec_rr),
  op!("INC C", Implied, 1, inc_r),
  op!("DEC C", Implied, 1, dec_r),
  op!("LD C,d8", D8, 2, ld_r_d8),
  op!("RRCA", Implied, 1, rrca),
  // 0x10
  op!("STOP", D8, 1, stop),
  op!("LD DE,d16", D16, 3, ld_rr_d16),
  op!("LD (DE),A", Implied, 2, ld_mrr_a),
  op!("INC DE", Implied, 2, inc_rr),
  op!("INC D", Implied, 1, inc_r),
  op!("DEC D", Implied, 1, dec_r),
  op!("LD D,d8", D8, 2, ld_r_d8),
  op!("RLA", Implied, 1, rla),
  op!("JR r8", R8, 3, jr),
  op!("ADD HL,DE", Implied, 2, add_hl_rr),
  op!("LD A,(DE)", Implied, 2, ld_a_mrr),
  op!("DEC DE", Implied, 2, dec_rr),
  op!("INC E", Implied, 1, inc_r),
  op!("DEC E", Implied, 1, dec_r),
  op!("LD E,d8", D8, 2, ld_r_d8),
  op!("RRA", Implied, 1, rra),
  // 0x20
  op!("JR NZ,r8", R8, 2, 3, jr_cc),
  op!("LD HL,d16", D16, 3, ld_rr_d16),
  op!("LD (HL+),A", Implied, 2, ld_hli_a),
  op!("INC HL", Implied, 2, inc_rr),
  op!("INC H", Implied, 1, inc_r),
  op!("DEC H", Implied, 1, dec_r),
  op!("LD H,d8", D8, 2, ld_r_d8),
  op!("DAA", Implied, 1, daa),
  op!("JR Z,r8", R8, 2, 3, jr_cc),
  op!("ADD HL,HL", Implied, 2, add_hl_rr),
  op!("LD A,(HL+)", Implied, 2, ld_a_hli),
  op!("DEC HL", Implied, 2, dec_rr),
  op!("INC L", Implied, 1, inc_r),
  op!("DEC L", Implied, 1, dec_r),
  op!("LD L,d8", D8, 2, ld_r_d8),
  op!("CPL", Implied, 1, cpl),
  // 0x30
  op!("JR NC,r8", R8, 2, 3, jr_cc),
  op!("LD SP,d16", D16, 3, ld_rr_d16),
  op!("LD (HL-),A", Implied, 2, ld_hld_a),
  op!("INC SP", Implied, 2, inc_rr),
  op!("INC (HL)", Implied, 3, inc_r),
  op!("DEC (HL)", Implied, 3, dec_r),
  op!("LD (HL),d8", D8, 3, ld_r_d8),
  op!("SCF", Implied, 1, scf),
  op!("JR C,r8", R8, 2, 3, jr_cc),
  op!("ADD HL,SP", Implied, 2, add_hl_rr),
  op!("LD A,(HL-)", Implied, 2, ld_a_hld),
  op!("DEC SP", Implied, 2, dec_rr),
  op!("INC A", Implied, 1, inc_r),
  op!("DEC A", Implied, 1, dec_r),
  op!("LD A,d8", D8, 2, ld_r_d8),
  op!("CCF", Implied, 1, ccf),
  // 0x40
  op!("LD B,B", Implied, 1, ld_r_r),
  op!("LD B,C", Implied, 1, ld_r_r),
  op!("LD B,D", Implied, 1, ld_r_r),
  op!("LD B,E", Implied, 1, ld_r_r),
  op!("LD B,H", Implied, 1, ld_r_r),
  op!("LD B,L", Implied, 1, ld_r_r),
  op!("LD B,(HL)", Implied, 2, ld_r_r),
  op!("LD B,A", Implied, 1, ld_r_r),
  op!("LD C,B", Implied, 1, ld_r_r),
  op!("LD C,C", Implied, 1, ld_r_r),
  op!("LD C,D", Implied, 1, ld_r_r),
  op!("LD C,E", Implied, 1, ld_r_r),
  op!("LD C,H", Implied, 1, ld_r_r),
  op!("LD C,L", Implied, 1, ld_r_r),
  op!("LD C,(HL)", Implied, 2, ld_r_r),
  op!("LD C,A", Implied, 1, ld_r_r),
  // 0x50
  op!("LD D,B", Implied, 1, ld_r_r),
  op!("LD D,C", Implied, 1, ld_r_r),
  op!("LD D,D", Implied, 1, ld_r_r),
  op!("LD D,E", Implied, 1, ld_r_r),
  op!("LD D,H", Implied, 1, ld_r_r),
  op!("LD D,L", Implied, 1, ld_r_r),
  op!("LD D,(HL)", Implied, 2, ld_r_r),
  op!("LD D,A", Implied, 1, ld_r_r),
  op!("LD E,B", Implied, 1, ld_r_r),
  op!("LD E,C", Implied, 1, ld_r_r),
  op!("LD E,D", Implied, 1, ld_r_r),
  op!("LD E,E", Implied, 1, ld_r_r),
  op!("LD E,H", Implied, 1, ld_r_r),
  op!("LD E,L", Implied, 1, ld_r_r),
  op!("LD E,(HL)", Implied, 2, ld_r_r),
  op!("LD E,A", Implied, 1, ld_r_r),
  // 0x60
  op!("LD H,B", Implied, 1, ld_r_r),
  op!("LD H,C", Implied, 1, ld_r_r),
  op!("LD H,D", Implied, 1, ld_r_r),
  op!("LD H,E", Implied, 1, ld_r_r),
  op!("LD H,H", Implied, 1, ld_r_r),
  op!("LD H,L", Implied, 1, ld_r_r),
  op!("LD H,(HL)", Implied, 2, ld_r_r),
  op!("LD H,A", Implied, 1, ld_r_r),
  op!("LD L,B", Implied, 1, ld_r_r),
  op!("LD L,C", Implied, 1, ld_r_r),
  op!("LD L,D", Implied, 1, ld_r_r),
  op!("LD L,E", Implied, 1, ld_r_r),
  op!("LD L,H", Implied, 1, ld_r_r),
  op!("LD L,L", Implied, 1, ld_r_r),
  op!("LD L,(HL)", Implied, 2, ld_r_r),
  op!("LD L,A", Implied, 1, ld_r_r),
  // 0x70
  op!("LD (HL),B", Implied, 2, ld_r_r),
  op!("LD (HL),C", Implied, 2, ld_r_r),
  op!("LD (HL),D", Implied, 2, ld_r_r),
  op!("LD (HL),E", Implied, 2, ld_r_r),
  op!("LD (HL),H", Implied, 2, ld_r_r),
  op!("LD (HL),L", Implied, 2, ld_r_r),
  op!("HALT", Implied, 1, halt),
  op!("LD (HL),A", Implied, 2, ld_r_r),
  op!("LD A,B", Implied, 1, ld_r_r),
  op!("LD A,C", Implied, 1, ld_r_r),
  op!("LD A,D", Implied, 1, ld_r_r),
  op!("LD A,E", Implied, 1, ld_r_r),
  op!("LD A,H", Implied, 1, ld_r_r),
  op!("LD A,L", Implied, 1, ld_r_r),
  op!("LD A,(HL)", Implied, 2, ld_r_r),
  op!("LD A,A", Implied, 1, ld_r_r),
  // 0x80
  op!("ADD A,B", Implied, 1, alu_r),
  op!("ADD A,C", Implied, 1, alu_r),
  op!("ADD A,D", Implied, 1, alu_r),
  op!("ADD A,E", Implied, 1, alu_r),
  op!("ADD A,H", Implied, 1, alu_r),
  op!("ADD A,L", Implied, 1, alu_r),
  op!("ADD A,(HL)", Implied, 2, alu_r),
  op!("ADD A,A", Implied, 1, alu_r),
  op!("ADC A,B", Implied, 1, alu_r),
  op!("ADC A,C", Implied, 1, alu_r),
  op!("ADC A,D", Implied, 1, alu_r),
  op!("ADC A,E", Implied, 1, alu_r),
  op!("ADC A,H", Implied, 1, alu_r),
  op!("ADC A,L", Implied, 1, alu_r),
  op!("ADC A,(HL)", Implied, 2, alu_r),
  op!("ADC A,A", Implied, 1, alu_r),
  // 0x90
  op!("SUB B", Implied, 1, alu_r),
  op!("SUB C", Implied, 1, alu_r),
  op!("SUB D", Implied, 1, alu_r),
  op!("SUB E", Implied, 1, alu_r),
  op!("SUB H", Implied, 1, alu_r),
  op!("SUB L", Implied, 1, alu_r),
  op!("SUB (HL)", Implied, 2, alu_r),
  op!("SUB A", Implied, 1, alu_r),
  op!("SBC A,B", Implied, 1, alu_r),
  op!("SBC A,C", Implied, 1, alu_r),
  op!("SBC A,D", Implied, 1, alu_r),
  op!("SBC A,E", Implied, 1, alu_r),
  op!("SBC A,H", Implied, 1, alu_r),
  op!("SBC A,L", Implied, 1, alu_r),
  op!("SBC A,(HL)", Implied, 2, alu_r),
  op!("SBC A,A", Implied, 1, alu_r),
  // 0xa0
  op!("AND B", Implied, 1, alu_r),
  op!("AND C", Implied, 1, alu_r),
  op!("AND D", Implied, 1, alu_r),
  op!("AND E", Implied, 1, alu_r),
  op!("AND H", Implied, 1, alu_r),
  op!("AND L", Implied, 1, alu_r),
  op!("AND (HL)", Implied, 2, alu_r),
  op!("AND A", Implied, 1, alu_r),
  op!("XOR B", Implied, 1, alu_r),
  op!("XOR C", Implied, 1, alu_r),
  op!("XOR D", Implied, 1, alu_r),
  op!("XOR E", Implied, 1, alu_r),
  op!("XOR H", Implied, 1, alu_r),
  op!("XOR L", Implied, 1, alu_r),
  op!("XOR (HL)", Implied, 2, alu_r),
  op!("XOR A", Implied, 1, alu_r),
  // 0xb0
  op!("OR B", Implied, 1, alu_r),
  op!("OR C", Implied, 1, alu_r),
  op!("OR D", Implied, 1, alu_r),
  op!("OR E", Implied, 1, alu_r),
  op!("OR H", Implied, 1, alu_r),
  op!("OR L", Implied, 1, alu_r),
  op!("OR (HL)", Implied, 2, alu_r),
  op!("OR A", Implied, 1, alu_r),
  op!("CP B", Implied, 1, alu_r),
  op!("CP C", Implied, 1, alu_r),
  op!("CP D", Implied, 1, alu_r),
  op!("CP E", Implied, 1, alu_r),
  op!("CP H", Implied, 1, alu_r),
  op!("CP L", Implied, 1, alu_r),
  op!("CP (HL)", Implied, 2, alu_r),
  op!("CP A", Implied, 1, alu_r),
  // 0xc0
  op!("RET NZ", Implied, 2, 5, ret_cc),
  op!("POP BC", Implied, 3, pop_rr),
  op!("JP NZ,a16", D16, 3, 4, jp_cc),
  op!("JP a16", D16, 4, jp),
  op!("CALL NZ,a16", D16, 3, 6, call_cc),
  op!("PUSH BC", Implied, 4, push_rr),
  op!("ADD A,d8", D8, 2, alu_d8),
  op!("RST 00H", Implied, 4, rst),
  op!("RET Z", Implied, 2, 5, ret_cc),
  op!("RET", Implied, 4, ret),
  op!("JP Z,a16", D16, 3, 4, jp_cc),
  op!("PREFIX CB", D8, 2, prefix_cb),
  op!("CALL Z,a16", D16, 3, 6, call_cc),
  op!("CALL a16", D16, 6, call),
  op!("ADC A,d8", D8, 2, alu_d8),
  op!("RST 08H", Implied, 4, rst),
  // 0xd0
  op!("RET NC", Implied, 2, 5, ret_cc),
  op!("POP DE", Implied, 3, pop_rr),
  op!("JP NC,a16", D16, 3, 4, jp_cc),
  undefined!(),
  op!("CALL NC,a16", D16, 3, 6, call_cc),
  op!("PUSH DE", Implied, 4, push_rr),
  op!("SUB d8", D8, 2, alu_d8),
  op!("RST 10H", Implied, 4, rst),
  op!("RET C", Implied, 2, 5, ret_cc),
  op!("RETI", Implied, 4, reti),
  op!("JP C,a16", D16, 3, 4, jp_cc),
  undefined!(),
  op!("CALL C,a16", D16, 3, 6, call_cc),
  undefined!(),
  op!("SBC A,d8", D8, 2, alu_d8),
  op!("RST 18H", Implied, 4, rst),
  // 0xe0
  op!("LDH (a8),A", A8, 3, ldh_a8_a),
  op!("POP HL", Implied, 3, pop_rr),
  op!("LD (C),A", Implied, 2, ld_mc_a),
  undefined!(),
  undefined!(),
  op!("PUSH HL", Implied, 4, push_rr),
  op!("AND d8", D8, 2, alu_d8),
  op!("RST 20H", Implied, 4, rst),
  op!("ADD SP,r8", R8, 4, add_sp_r8),
  op!("JP HL", Implied, 1, jp_hl),
  op!("LD (a16),A", D16, 4, ld_a16_a),
  undefined!(),
  undefined!(),
  undefined!(),
  op!("XOR d8", D8, 2, alu_d8),
  op!("RST 28H", Implied, 4, rst),
  // 0xf0
  op!("LDH A,(a8)", A8, 3, ldh_a_a8),
  op!("POP AF", Implied, 3, pop_rr),
  op!("LD A,(C)", Implied, 2, ld_a_mc),
  op!("DI", Implied, 1, di),
  undefined!(),
  op!("PUSH AF", Implied, 4, push_rr),
  op!("OR d8", D8, 2, alu_d8),
  op!("RST 30H", Implied, 4, rst),
  op!("LD HL,SP+r8", R8, 3, ld_hl_sp_r8),
  op!("LD SP,HL", Implied, 2, ld_sp_hl),
  op!("LD A,(a16)", D16, 4, ld_a_a16),
  op!("EI", Implied, 1, ei),
  undefined!(),
  undefined!(),
  op!("CP d8", D8, 2, alu_d8),
  op!("RST 38H", Implied, 4, rst),
];

fn set_flags(cpu: &mut CPU, z: bool, n: bool, h: bool, c: bool) {
  let f = if z { reg::Z } else { 0 };
  cpu.regs.set_f(
    f | if n { reg::N } else { 0 } |
      if h { reg::H } else { 0 } |
      if c { reg::C } else { 0 },
  );
}

fn nop(_: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  Timing::Base
}

// 8-bit loads

fn ld_r_r(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let value = cpu.reg8(mem, args.opcode);
  cpu.set_reg8(mem, args.opcode >> 3, value);
  Timing::Base
}

fn ld_r_d8(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  cpu.set_reg8(mem, args.opcode >> 3, args.d8());
  Timing::Base
}

/// Address in BC for the 0x0_ row, DE for 0x1_.
fn bc_or_de(cpu: &CPU, opcode: u8) -> u16 {
  if opcode & 0x10 == 0 {
    cpu.regs.bc()
  } else {
    cpu.regs.de()
  }
}

fn ld_mrr_a(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  mem.wb(bc_or_de(cpu, args.opcode), cpu.regs.a);
  Timing::Base
}

fn ld_a_mrr(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  cpu.regs.a = mem.rb(bc_or_de(cpu, args.opcode));
  Timing::Base
}

fn ld_hli_a(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  mem.wb(cpu.regs.hl(), cpu.regs.a);
  cpu.regs.hl_inc();
  Timing::Base
}

fn ld_hld_a(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  mem.wb(cpu.regs.hl(), cpu.regs.a);
  cpu.regs.hl_dec();
  Timing::Base
}

fn ld_a_hli(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  cpu.regs.a = mem.rb(cpu.regs.hl());
  cpu.regs.hl_inc();
  Timing::Base
}

fn ld_a_hld(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  cpu.regs.a = mem.rb(cpu.regs.hl());
  cpu.regs.hl_dec();
  Timing::Base
}

fn ldh_a8_a(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  mem.wb(0xff00 | args.imm, cpu.regs.a);
  Timing::Base
}

fn ldh_a_a8(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  cpu.regs.a = mem.rb(0xff00 | args.imm);
  Timing::Base
}

fn ld_mc_a(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  mem.wb(0xff00 | u16::from(cpu.regs.c), cpu.regs.a);
  Timing::Base
}

fn ld_a_mc(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  cpu.regs.a = mem.rb(0xff00 | u16::from(cpu.regs.c));
  Timing::Base
}

fn ld_a16_a(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  mem.wb(args.imm, cpu.regs.a);
  Timing::Base
}

fn ld_a_a16(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  cpu.regs.a = mem.rb(args.imm);
  Timing::Base
}

// 16-bit loads and stack

fn ld_rr_d16(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  cpu.set_rp(args.opcode >> 4, args.imm);
  Timing::Base
}

fn ld_a16_sp(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  mem.ww(args.imm, cpu.regs.sp);
  Timing::Base
}

fn ld_sp_hl(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.regs.sp = cpu.regs.hl();
  Timing::Base
}

fn push_rr(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let value = match (args.opcode >> 4) & 3 {
    3 => cpu.regs.af(),
    i => cpu.rp(i),
  };
  cpu.push(mem, value);
  Timing::Base
}

fn pop_rr(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let value = cpu.pop(mem);
  match (args.opcode >> 4) & 3 {
    3 => cpu.regs.set_af(value),
    i => cpu.set_rp(i, value),
  }
  Timing::Base
}

/// SP plus a signed byte. H and C come from the unsigned add of the low
/// bytes; Z and N are cleared.
fn sp_offset(cpu: &mut CPU, args: Args) -> u16 {
  let sp = cpu.regs.sp;
  let low = alu::add8(sp as u8, args.d8());
  set_flags(cpu, false, false, low.h, low.c);
  alu::add16(sp, args.r8())
}

fn add_sp_r8(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  cpu.regs.sp = sp_offset(cpu, args);
  Timing::Base
}

fn ld_hl_sp_r8(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  let hl = sp_offset(cpu, args);
  cpu.regs.set_hl(hl);
  Timing::Base
}

// 8-bit arithmetic

/// A <- A op value, for the ALU column selected by opcode bits 3-5:
/// ADD ADC SUB SBC AND XOR OR CP.
fn alu_a(cpu: &mut CPU, opcode: u8, value: u8) {
  let a = cpu.regs.a;
  let carry = cpu.regs.c();
  let (result, n): (Alu, bool) = match (opcode >> 3) & 7 {
    0 => (alu::add8(a, value), false),
    1 => (alu::adc8(a, value, carry), false),
    2 => (alu::sub8(a, value), true),
    3 => (alu::sbc8(a, value, carry), true),
    4 => (alu::and8(a, value), false),
    5 => (alu::xor8(a, value), false),
    6 => (alu::or8(a, value), false),
    _ => (alu::sub8(a, value), true),
  };
  cpu.regs.set_f(result.flags(n));
  // CP only compares.
  if (opcode >> 3) & 7 != 7 {
    cpu.regs.a = result.value;
  }
}

fn alu_r(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let value = cpu.reg8(mem, args.opcode);
  alu_a(cpu, args.opcode, value);
  Timing::Base
}

fn alu_d8(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  alu_a(cpu, args.opcode, args.d8());
  Timing::Base
}

fn inc_r(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let r = alu::inc8(cpu.reg8(mem, args.opcode >> 3));
  cpu.set_reg8(mem, args.opcode >> 3, r.value);
  let c = cpu.regs.c();
  set_flags(cpu, r.z, false, r.h, c);
  Timing::Base
}

fn dec_r(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let r = alu::dec8(cpu.reg8(mem, args.opcode >> 3));
  cpu.set_reg8(mem, args.opcode >> 3, r.value);
  let c = cpu.regs.c();
  set_flags(cpu, r.z, true, r.h, c);
  Timing::Base
}

fn daa(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let mut a = u16::from(cpu.regs.a);
  let mut carry = cpu.regs.c();
  if !cpu.regs.n() {
    if cpu.regs.h() || (a & 0xf) > 9 {
      a += 0x06;
    }
    if carry || a > 0x9f {
      a += 0x60;
    }
    carry |= a > 0xff;
  } else {
    if cpu.regs.h() {
      a = a.wrapping_sub(0x06) & 0xff;
    }
    if carry {
      a = a.wrapping_sub(0x60) & 0xff;
    }
  }
  cpu.regs.a = a as u8;
  let (z, n) = (cpu.regs.a == 0, cpu.regs.n());
  set_flags(cpu, z, n, false, carry);
  Timing::Base
}

fn cpl(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.regs.a = !cpu.regs.a;
  cpu.regs.set_flag(reg::Flag::N, true);
  cpu.regs.set_flag(reg::Flag::H, true);
  Timing::Base
}

fn scf(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let z = cpu.regs.z();
  set_flags(cpu, z, false, false, true);
  Timing::Base
}

fn ccf(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let (z, c) = (cpu.regs.z(), cpu.regs.c());
  set_flags(cpu, z, false, false, !c);
  Timing::Base
}

// 16-bit arithmetic

fn inc_rr(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  let i = args.opcode >> 4;
  cpu.set_rp(i, alu::add16(cpu.rp(i), 1));
  Timing::Base
}

fn dec_rr(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  let i = args.opcode >> 4;
  cpu.set_rp(i, alu::sub16(cpu.rp(i), 1));
  Timing::Base
}

/// Added a byte at a time: low bytes, then high bytes with the low carry.
/// H and C come from the high stage, Z is kept.
fn add_hl_rr(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  let hl = cpu.regs.hl();
  let value = cpu.rp(args.opcode >> 4);
  let low = alu::add8(hl as u8, value as u8);
  let high = alu::adc8((hl >> 8) as u8, (value >> 8) as u8, low.c);
  cpu.regs.set_hl((u16::from(high.value) << 8) | u16::from(low.value));
  let z = cpu.regs.z();
  set_flags(cpu, z, false, high.h, high.c);
  Timing::Base
}

// Accumulator rotates. Unlike their CB forms these always clear Z.

fn rlca(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let a = cpu.regs.a;
  cpu.regs.a = a.rotate_left(1);
  set_flags(cpu, false, false, false, a & 0x80 != 0);
  Timing::Base
}

fn rrca(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let a = cpu.regs.a;
  cpu.regs.a = a.rotate_right(1);
  set_flags(cpu, false, false, false, a & 0x01 != 0);
  Timing::Base
}

fn rla(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let a = cpu.regs.a;
  cpu.regs.a = (a << 1) | u8::from(cpu.regs.c());
  set_flags(cpu, false, false, false, a & 0x80 != 0);
  Timing::Base
}

fn rra(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  let a = cpu.regs.a;
  cpu.regs.a = (a >> 1) | if cpu.regs.c() { 0x80 } else { 0 };
  set_flags(cpu, false, false, false, a & 0x01 != 0);
  Timing::Base
}

// Control flow

fn jr(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  // PC already points past the displacement.
  cpu.regs.pc = cpu.regs.pc.wrapping_add(args.r8());
  Timing::Base
}

fn jr_cc(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  if !cpu.condition(args.opcode) {
    return Timing::Base;
  }
  jr(cpu, mem, args);
  Timing::Taken
}

fn jp(cpu: &mut CPU, _: &mut Memory, args: Args) -> Timing {
  cpu.regs.pc = args.imm;
  Timing::Base
}

fn jp_cc(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  if !cpu.condition(args.opcode) {
    return Timing::Base;
  }
  jp(cpu, mem, args);
  Timing::Taken
}

fn jp_hl(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.regs.pc = cpu.regs.hl();
  Timing::Base
}

fn call(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let pc = cpu.regs.pc;
  cpu.push(mem, pc);
  cpu.regs.pc = args.imm;
  Timing::Base
}

fn call_cc(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  if !cpu.condition(args.opcode) {
    return Timing::Base;
  }
  call(cpu, mem, args);
  Timing::Taken
}

fn ret(cpu: &mut CPU, mem: &mut Memory, _: Args) -> Timing {
  cpu.regs.pc = cpu.pop(mem);
  Timing::Base
}

fn ret_cc(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  if !cpu.condition(args.opcode) {
    return Timing::Base;
  }
  ret(cpu, mem, args);
  Timing::Taken
}

fn reti(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  cpu.regs.ime = true;
  ret(cpu, mem, args)
}

fn rst(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  let pc = cpu.regs.pc;
  cpu.push(mem, pc);
  cpu.regs.pc = u16::from(args.opcode & 0x38);
  Timing::Base
}

// Processor control

fn halt(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.regs.halted = true;
  Timing::Base
}

fn stop(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  debug!("STOP at 0x{:04x}", cpu.regs.pc.wrapping_sub(2));
  cpu.stopped = true;
  Timing::Base
}

fn di(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.regs.ime = false;
  cpu.ime_pending = false;
  Timing::Base
}

fn ei(cpu: &mut CPU, _: &mut Memory, _: Args) -> Timing {
  cpu.ime_pending = true;
  Timing::Base
}

fn prefix_cb(cpu: &mut CPU, mem: &mut Memory, args: Args) -> Timing {
  Timing::Extended(super::cb::exec(cpu, mem, args.d8()))
}
