use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
  Right,
  Left,
  Up,
  Down,
  A,
  B,
  Select,
  Start,
}

impl Key {
  /// Bit in the pressed mask: directions in the low nibble, buttons above.
  fn bit(self) -> u8 {
    match self {
      Key::Right => 0x01,
      Key::Left => 0x02,
      Key::Up => 0x04,
      Key::Down => 0x08,
      Key::A => 0x10,
      Key::B => 0x20,
      Key::Select => 0x40,
      Key::Start => 0x80,
    }
  }
}

#[derive(Debug, Default, Clone, Copy)]
struct State {
  pressed: u8,
  // Set on any release-to-press transition, cleared by `take_press`.
  edge: bool,
}

/// Live button state, shared between whoever feeds input and the memory
/// map that exposes it through P1.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
  state: Rc<Cell<State>>,
}

impl Keypad {
  pub fn new() -> Keypad {
    Keypad::default()
  }

  pub fn key_down(&self, key: Key) {
    let mut s = self.state.get();
    if s.pressed & key.bit() == 0 {
      debug!("Pressed {:?}", key);
      s.edge = true;
    }
    s.pressed |= key.bit();
    self.state.set(s);
  }

  pub fn key_up(&self, key: Key) {
    let mut s = self.state.get();
    if s.pressed & key.bit() != 0 {
      debug!("Released {:?}", key);
    }
    s.pressed &= !key.bit();
    self.state.set(s);
  }

  pub fn is_down(&self, key: Key) -> bool {
    self.state.get().pressed & key.bit() != 0
  }

  /// Return whether a key went down since the last call.
  pub fn take_press(&self) -> bool {
    let mut s = self.state.get();
    let edge = s.edge;
    s.edge = false;
    self.state.set(s);
    edge
  }

  fn directions(&self) -> u8 {
    self.state.get().pressed & 0x0f
  }

  fn buttons(&self) -> u8 {
    self.state.get().pressed >> 4
  }
}

/// The P1 register: a select latch written by the program, combined with
/// the live keypad at read time.
#[derive(Debug)]
pub struct KeyData {
  select: u8,
  pad: Keypad,
}

impl KeyData {
  pub fn new(pad: Keypad) -> KeyData {
    KeyData { select: 0x30, pad }
  }

  pub fn rb(&self) -> u8 {
    // Lines are active low: a clear select bit picks the group, a clear
    // low bit means pressed.
    let mut low = 0x0f;
    if self.select & 0x10 == 0 {
      low &= !self.pad.directions() & 0x0f;
    }
    if self.select & 0x20 == 0 {
      low &= !self.pad.buttons() & 0x0f;
    }
    0xc0 | self.select | low
  }

  pub fn wb(&mut self, val: u8) {
    self.select = val & 0x30;
  }
}
