/*!
vram_addr.rs - The 15-bit "loopy" VRAM address / scroll register.

Bit layout:
```text
yyy NN YYYYY XXXXX
||| || ||||| +++++-- coarse X scroll
||| || +++++-------- coarse Y scroll
||| ++-------------- nametable select
+++----------------- fine Y scroll
```
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    const COARSE_X: u16 = 0x001F;
    const COARSE_Y: u16 = 0x03E0;
    const NAMETABLE_X: u16 = 0x0400;
    const NAMETABLE_Y: u16 = 0x0800;
    const FINE_Y: u16 = 0x7000;

    pub const fn new(raw: u16) -> Self {
        Self(raw & 0x7FFF)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set_raw(&mut self, raw: u16) {
        self.0 = raw & 0x7FFF;
    }

    #[inline]
    pub const fn coarse_x(self) -> u8 {
        (self.0 & Self::COARSE_X) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, v: u8) {
        self.0 = (self.0 & !Self::COARSE_X) | (v as u16 & 0x1F);
    }

    #[inline]
    pub const fn coarse_y(self) -> u8 {
        ((self.0 & Self::COARSE_Y) >> 5) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, v: u8) {
        self.0 = (self.0 & !Self::COARSE_Y) | ((v as u16 & 0x1F) << 5);
    }

    /// Two nametable select bits (bit 0 = X, bit 1 = Y).
    #[inline]
    pub const fn nametable(self) -> u8 {
        ((self.0 >> 10) & 0x3) as u8
    }

    #[inline]
    pub fn set_nametable(&mut self, v: u8) {
        self.0 = (self.0 & !(Self::NAMETABLE_X | Self::NAMETABLE_Y)) | ((v as u16 & 0x3) << 10);
    }

    #[inline]
    pub const fn fine_y(self) -> u8 {
        ((self.0 & Self::FINE_Y) >> 12) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, v: u8) {
        self.0 = (self.0 & !Self::FINE_Y) | ((v as u16 & 0x7) << 12);
    }

    /// Nametable byte address for the tile under the scroll position.
    #[inline]
    pub const fn tile_address(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Attribute byte address covering the tile under the scroll position.
    #[inline]
    pub const fn attribute_address(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Coarse X step; wraps into the horizontally adjacent nametable.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.set_coarse_x(0);
            self.0 ^= Self::NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    /// Fine Y step; coarse Y rolls over at row 30 into the vertically
    /// adjacent nametable, while rows 30/31 wrap without switching.
    pub fn increment_y(&mut self) {
        let fine = self.fine_y();
        if fine < 7 {
            self.set_fine_y(fine + 1);
            return;
        }
        self.set_fine_y(0);
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= Self::NAMETABLE_Y;
            }
            31 => self.set_coarse_y(0),
            y => self.set_coarse_y(y + 1),
        }
    }

    /// Copy coarse X and the horizontal nametable bit from `t`.
    pub fn copy_horizontal(&mut self, t: VramAddr) {
        let mask = Self::COARSE_X | Self::NAMETABLE_X;
        self.0 = (self.0 & !mask) | (t.0 & mask);
    }

    /// Copy fine Y, coarse Y and the vertical nametable bit from `t`.
    pub fn copy_vertical(&mut self, t: VramAddr) {
        let mask = Self::FINE_Y | Self::COARSE_Y | Self::NAMETABLE_Y;
        self.0 = (self.0 & !mask) | (t.0 & mask);
    }
}
