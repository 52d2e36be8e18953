use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// The processor fetched one of the undefined base-page opcodes.
  IllegalOpcode { opcode: u8, pc: u16 },

  EmptyRom,

  /// Image is bigger than the two flat 16 KiB ROM banks.
  RomTooLarge(usize),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Error::IllegalOpcode { opcode, pc } => {
        write!(f, "illegal opcode 0x{:02x} at 0x{:04x}", opcode, pc)
      }
      Error::EmptyRom => write!(f, "ROM image is empty"),
      Error::RomTooLarge(len) => write!(
        f,
        "ROM image is {} bytes, flat cartridges hold at most 32768",
        len
      ),
    }
  }
}

impl std::error::Error for Error {}
