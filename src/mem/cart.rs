use crate::error::Error;

pub const ROM_SIZE: usize = 0x8000;

const TITLE: std::ops::Range<usize> = 0x134..0x144;
const KIND: usize = 0x147;

/// A flat, bank-controller-free ROM image.
#[derive(Debug, Clone)]
pub struct Cartridge {
  rom: Vec<u8>,
}

impl Cartridge {
  pub fn new(rom: Vec<u8>) -> Result<Cartridge, Error> {
    if rom.is_empty() {
      return Err(Error::EmptyRom);
    }
    if rom.len() > ROM_SIZE {
      return Err(Error::RomTooLarge(rom.len()));
    }
    // Short images (hand-assembled test programs) carry no header. A
    // controller type on an image that fits is loaded flat; bank selects
    // land in ROM and are dropped.
    if let Some(&kind) = rom.get(KIND) {
      if kind != 0 {
        warn!("cartridge type 0x{:02x} loaded as flat ROM", kind);
      }
    }
    Ok(Cartridge { rom })
  }

  /// Header title, up to the first NUL.
  pub fn title(&self) -> String {
    self
      .rom
      .get(TITLE)
      .unwrap_or(&[])
      .iter()
      .take_while(|&&b| b != 0)
      .map(|&b| b as char)
      .collect()
  }

  pub fn bytes(&self) -> &[u8] {
    &self.rom
  }
}
