/*!
memory.rs - PPU-internal memories and the single entry point for bus access.

* Palette RAM: 32 bytes; $3F10/$14/$18/$1C alias $3F00/$04/$08/$0C. Every
  internal access goes through `palette_index`, so the aliasing holds for
  the renderer as well as for PPUDATA.
* OAM: one 256-byte buffer. `Sprite` is a by-value view over four bytes.
* `bus_read` / `bus_write` split palette space from everything else and
  record the last address driven onto the external bus.
*/

use super::Ppu;
use crate::ppu_bus::PpuBus;

pub const PALETTE_BASE: u16 = 0x3F00;

/// Fold a palette address into the 32-byte palette RAM.
#[inline]
pub fn palette_index(addr: u16) -> usize {
    let mut a = addr & 0x1F;
    if a & 0x13 == 0x10 {
        a &= !0x10;
    }
    a as usize
}

/// Pattern table byte address for `tile` row `fine_y`, bit plane 0 or 1.
#[inline]
pub fn pattern_address(table: u16, tile: u8, plane: u16, fine_y: u8) -> u16 {
    table | ((tile as u16) << 4) | (plane << 3) | (fine_y as u16 & 0x07)
}

/// One OAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub y: u8,
    pub tile: u8,
    pub attr: u8,
    pub x: u8,
}

impl Sprite {
    /// Secondary OAM contents after the dot-64 clear.
    pub const HIDDEN: Sprite = Sprite {
        y: 0xFF,
        tile: 0xFF,
        attr: 0xFF,
        x: 0xFF,
    };

    #[inline]
    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            y: b[0],
            tile: b[1],
            attr: b[2],
            x: b[3],
        }
    }

    #[inline]
    pub fn palette(self) -> u8 {
        self.attr & 0x03
    }

    #[inline]
    pub fn behind_background(self) -> bool {
        self.attr & 0x20 != 0
    }

    #[inline]
    pub fn flip_horizontal(self) -> bool {
        self.attr & 0x40 != 0
    }

    #[inline]
    pub fn flip_vertical(self) -> bool {
        self.attr & 0x80 != 0
    }
}

impl Ppu {
    #[inline]
    pub(in crate::ppu) fn palette_read(&self, addr: u16) -> u8 {
        self.palette[palette_index(addr)] & 0x3F
    }

    #[inline]
    pub(in crate::ppu) fn bus_read<B: PpuBus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr >= PALETTE_BASE {
            return self.palette_read(addr);
        }
        self.bus_address = addr;
        bus.ppu_read(addr)
    }

    #[inline]
    pub(in crate::ppu) fn bus_write<B: PpuBus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        if addr >= PALETTE_BASE {
            self.palette[palette_index(addr)] = value;
            return;
        }
        self.bus_address = addr;
        bus.ppu_write(addr, value);
    }

    /// Primary OAM entry `index` (0..64).
    #[inline]
    pub fn sprite(&self, index: usize) -> Sprite {
        let base = (index & 63) * 4;
        Sprite::from_bytes(&self.oam[base..base + 4])
    }

    #[inline]
    pub(in crate::ppu) fn secondary_sprite(&self, slot: usize) -> Sprite {
        let base = (slot & 7) * 4;
        Sprite::from_bytes(&self.secondary_oam[base..base + 4])
    }

    #[inline]
    pub(in crate::ppu) fn set_secondary_sprite(&mut self, slot: usize, s: Sprite) {
        let base = (slot & 7) * 4;
        self.secondary_oam[base..base + 4].copy_from_slice(&[s.y, s.tile, s.attr, s.x]);
    }

    /// Raw OAM byte (debug / tests).
    pub fn peek_oam(&self, idx: u8) -> u8 {
        self.oam[idx as usize]
    }

    /// Palette RAM byte after mirroring.
    pub fn peek_palette(&self, addr: u16) -> u8 {
        self.palette_read(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_aliasing() {
        assert_eq!(palette_index(0x3F10), 0x00);
        assert_eq!(palette_index(0x3F14), 0x04);
        assert_eq!(palette_index(0x3F18), 0x08);
        assert_eq!(palette_index(0x3F1C), 0x0C);
        assert_eq!(palette_index(0x3F11), 0x11);
        assert_eq!(palette_index(0x3F3F), 0x1F, "$3F20-$3FFF mirror the 32 bytes");
    }

    #[test]
    fn pattern_address_layout() {
        assert_eq!(pattern_address(0x1000, 0x42, 1, 3), 0x142B);
        assert_eq!(pattern_address(0x0000, 0xFF, 0, 7), 0x0FF7);
    }

    #[test]
    fn sprite_attribute_accessors() {
        let s = Sprite::from_bytes(&[10, 0x33, 0xE2, 40]);
        assert_eq!(s.palette(), 2);
        assert!(s.behind_background());
        assert!(s.flip_horizontal());
        assert!(s.flip_vertical());
    }
}
