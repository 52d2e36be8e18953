mod cart;
mod key;
pub mod timer;

pub use self::cart::Cartridge;
pub use self::key::{Key, Keypad};
use self::key::KeyData;

const ROM_SIZE: usize = cart::ROM_SIZE;
const VRAM_SIZE: usize = 0x2000;
const ERAM_SIZE: usize = 0x2000;
const WRAM_SIZE: usize = 0x2000;
const IO_SIZE: usize = 0x80;
const ZRAM_SIZE: usize = 0x7f;
pub const OAM_SIZE: usize = 0xa0;

pub const OAM: u16 = 0xfe00;

pub const P1: u16 = 0xff00;
pub const SB: u16 = 0xff01;
pub const SC: u16 = 0xff02;
pub const DIV: u16 = 0xff04;
pub const TIMA: u16 = 0xff05;
pub const TMA: u16 = 0xff06;
pub const TAC: u16 = 0xff07;
pub const IF: u16 = 0xff0f;
pub const LCDC: u16 = 0xff40;
pub const STAT: u16 = 0xff41;
pub const SCY: u16 = 0xff42;
pub const SCX: u16 = 0xff43;
pub const LY: u16 = 0xff44;
pub const LYC: u16 = 0xff45;
pub const DMA: u16 = 0xff46;
pub const BGP: u16 = 0xff47;
pub const OBP0: u16 = 0xff48;
pub const OBP1: u16 = 0xff49;
pub const WY: u16 = 0xff4a;
pub const WX: u16 = 0xff4b;
pub const IE: u16 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
  VBlank = 0,
  LcdStat = 1,
  Timer = 2,
  Serial = 3,
  Joypad = 4,
}

impl Interrupt {
  /// Servicing order. V-Blank wins over everything pending with it, and
  /// the processor walks this front to back, so the order is observable.
  pub const ALL: [Interrupt; 5] = [
    Interrupt::VBlank,
    Interrupt::LcdStat,
    Interrupt::Timer,
    Interrupt::Serial,
    Interrupt::Joypad,
  ];

  pub fn bit(self) -> u8 {
    1 << self as u8
  }

  pub fn vector(self) -> u16 {
    0x40 + 8 * self as u16
  }
}

#[derive(Debug)]
pub struct Memory {
  rom: Vec<u8>,
  vram: Vec<u8>,
  eram: Vec<u8>,
  wram: Vec<u8>,
  oam: Vec<u8>,
  io: Vec<u8>,
  zram: Vec<u8>,
  key: KeyData,

  serial: Vec<u8>,
  div_reset: bool,

  pub interrupt_enable: u8,
  pub interrupt_flags: u8,
}

impl Memory {
  /// Empty address space with its own keypad, for running bare programs.
  pub fn new() -> Memory {
    Memory::with_keypad(Keypad::new())
  }

  pub fn with_keypad(keys: Keypad) -> Memory {
    let mut result = Memory {
      rom: vec![0; ROM_SIZE],
      vram: vec![0; VRAM_SIZE],
      eram: vec![0; ERAM_SIZE],
      wram: vec![0; WRAM_SIZE],
      oam: vec![0; OAM_SIZE],
      io: vec![0; IO_SIZE],
      zram: vec![0; ZRAM_SIZE],
      key: KeyData::new(keys),

      serial: Vec::new(),
      div_reset: false,

      interrupt_enable: 0,
      interrupt_flags: 0,
    };
    result.power_on();
    result
  }

  pub fn with_cartridge(cart: &Cartridge, keys: Keypad) -> Memory {
    let mut result = Memory::with_keypad(keys);
    result.load_rom(cart.bytes());
    result
  }

  fn power_on(&mut self) {
    self.key.wb(0x30); // nothing selected
    self.store(LCDC, 0x91);
  }

  /// Copy a ROM image verbatim into the address space at 0.
  pub fn load_rom(&mut self, rom: &[u8]) {
    let len = rom.len().min(ROM_SIZE);
    self.rom[..len].copy_from_slice(&rom[..len]);
  }

  /// Read a byte at address `addr`.
  pub fn rb(&self, addr: u16) -> u8 {
    match addr >> 12 {
      // ROM 0 and ROM 1 (unbanked)
      0x0..=0x7 => self.rom[addr as usize],
      // VRAM
      0x8..=0x9 => self.vram[(addr & 0x1fff) as usize],
      // ERAM
      0xa..=0xb => self.eram[(addr & 0x1fff) as usize],
      // WRAM
      0xc..=0xd => self.wram[(addr & 0x1fff) as usize],
      // WRAM Shadow
      0xe => self.wram[(addr & 0x1fff) as usize],
      _ => match addr {
        0xf000..=0xfdff => self.wram[(addr & 0x1fff) as usize],
        0xfe00..=0xfe9f => self.oam[(addr & 0xff) as usize],
        // Unusable.
        0xfea0..=0xfeff => 0,
        P1 => self.key.rb(),
        IF => self.interrupt_flags,
        0xff00..=0xff7f => self.io[(addr & 0x7f) as usize],
        IE => self.interrupt_enable,
        // Zero page.
        _ => self.zram[(addr & 0x7f) as usize],
      },
    }
  }

  /// Read a 2-byte little-endian word from `addr`.
  pub fn rw(&self, addr: u16) -> u16 {
    let a = u16::from(self.rb(addr));
    let b = u16::from(self.rb(addr.wrapping_add(1)));
    (b << 8) | a
  }

  /// Write `value` at address `addr`, as the processor sees it.
  pub fn wb(&mut self, addr: u16, value: u8) {
    match addr {
      0x0000..=0x7fff => {
        debug!("ROM write 0x{:04x} <- 0x{:02x} ignored", addr, value);
      }
      0xfea0..=0xfeff => (),
      P1 => self.key.wb(value),
      SC => {
        self.store(SC, value);
        if value == 0x81 {
          self.serial_transfer();
        }
      }
      DIV => {
        self.store(DIV, 0);
        self.div_reset = true;
      }
      STAT => {
        // Mode and coincidence bits belong to the video unit.
        let stat = self.rb(STAT);
        self.store(STAT, (value & 0x78) | (stat & 0x07));
      }
      LY => self.store(LY, 0),
      DMA => {
        self.store(DMA, value);
        self.dma(value);
      }
      _ => self.store(addr, value),
    }
  }

  /// Write a 2-byte little-endian word to `addr`.
  pub fn ww(&mut self, addr: u16, value: u16) {
    self.wb(addr, (value & 0xff) as u8);
    self.wb(addr.wrapping_add(1), (value >> 8) as u8);
  }

  /// Write an arbitrary number of bytes to memory.
  #[cfg(test)]
  pub(crate) fn write(&mut self, addr: u16, values: &[u8]) {
    let mut cur = addr;
    for v in values {
      self.wb(cur, *v);
      cur = cur.wrapping_add(1);
    }
  }

  /// Plain store with no I/O side effects. The timer and video unit use
  /// this to update the registers they drive.
  pub fn store(&mut self, addr: u16, value: u8) {
    match addr >> 12 {
      0x0..=0x7 => (),
      0x8..=0x9 => self.vram[(addr & 0x1fff) as usize] = value,
      0xa..=0xb => self.eram[(addr & 0x1fff) as usize] = value,
      0xc..=0xe => self.wram[(addr & 0x1fff) as usize] = value,
      _ => match addr {
        0xf000..=0xfdff => self.wram[(addr & 0x1fff) as usize] = value,
        0xfe00..=0xfe9f => self.oam[(addr & 0xff) as usize] = value,
        0xfea0..=0xfeff => (),
        P1 => self.key.wb(value),
        IF => self.interrupt_flags = value,
        0xff00..=0xff7f => self.io[(addr & 0x7f) as usize] = value,
        IE => self.interrupt_enable = value,
        _ => self.zram[(addr & 0x7f) as usize] = value,
      },
    }
  }

  fn dma(&mut self, value: u8) {
    let base = u16::from(value) << 8;
    debug!("OAM DMA from 0x{:04x}", base);
    for i in 0..OAM_SIZE as u16 {
      self.oam[i as usize] = self.rb(base.wrapping_add(i));
    }
  }

  fn serial_transfer(&mut self) {
    // No link partner: the byte leaves at once and the transfer completes.
    let data = self.rb(SB);
    debug!("serial: 0x{:02x} {:?}", data, data as char);
    self.serial.push(data);
    self.store(SC, 0x01);
    self.raise_interrupt(Interrupt::Serial);
  }

  /// Bytes sent out over the serial port so far.
  pub fn serial_output(&self) -> &[u8] {
    &self.serial
  }

  pub(crate) fn take_div_reset(&mut self) -> bool {
    std::mem::replace(&mut self.div_reset, false)
  }

  pub fn raise_interrupt(&mut self, int: Interrupt) {
    self.interrupt_flags |= int.bit();
  }

  pub fn clear_interrupt(&mut self, int: Interrupt) {
    self.interrupt_flags &= !int.bit();
  }

  /// Highest-priority interrupt that is both requested and enabled.
  pub fn pending(&self) -> Option<Interrupt> {
    let mask = self.interrupt_enable & self.interrupt_flags;
    Interrupt::ALL.iter().cloned().find(|int| mask & int.bit() != 0)
  }
}

impl Default for Memory {
  fn default() -> Memory {
    Memory::new()
  }
}
