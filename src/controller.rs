/*!
Standard gamepad on $4016 / $4017.

Protocol:
- Button bits in read order: A, B, Select, Start, Up, Down, Left, Right
  (bit 0 through bit 7).
- Writing $4016 sets the strobe from bit 0. While the strobe is high the
  shift position is held at A, so every read returns the A button.
- With the strobe low each read returns the next button and advances;
  after eight reads the register returns 1 until strobed again.
- Bits 1-7 of the value seen by the CPU are not driven by the pad. Bit 6
  keeps the $40 left on the data bus by the address high byte.
*/

const OPEN_BUS_BITS: u8 = 0x40;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    #[inline]
    fn mask(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Clone, Debug, Default)]
pub struct Gamepad {
    buttons: u8,
    strobe: bool,
    shift: u8,
}

impl Gamepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn press(&mut self, button: Button) {
        self.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_button(button, false);
    }

    /// Replace all button states; bit layout follows `Button` order.
    pub fn set_state(&mut self, mask: u8) {
        self.buttons = mask;
    }

    pub fn state(&self) -> u8 {
        self.buttons
    }

    /// CPU write to $4016.
    pub fn write(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.shift = 0;
        }
    }

    /// CPU read of this pad's port.
    pub fn read(&mut self) -> u8 {
        let bit = if self.shift < 8 {
            let b = (self.buttons >> self.shift) & 1;
            self.shift += 1;
            b
        } else {
            1
        };
        if self.strobe {
            self.shift = 0;
        }
        bit | OPEN_BUS_BITS
    }
}
