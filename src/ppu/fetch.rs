/*!
fetch.rs - Background fetch pipeline.

Every 8 dots the PPU fetches nametable, attribute, pattern-low and
pattern-high bytes for the tile two tiles ahead, latching them in `next`.
The 16-bit shifters move left one bit per dot; at each 8-dot boundary
the low byte is refilled from the latches. Attribute bits are expanded
to full bytes so both shifters stay in lockstep with the pattern ones.

Scroll counter updates (`increment_x`, `increment_y`, the horizontal and
vertical copies from `t`) only happen while rendering is enabled.
*/

use super::Ppu;
use super::memory::pattern_address;
use crate::ppu_bus::PpuBus;

#[derive(Debug, Clone, Copy, Default)]
pub(in crate::ppu) struct TileLatch {
    pub nametable: u8,
    pub palette: u8,
    pub pattern_lo: u8,
    pub pattern_hi: u8,
}

#[derive(Debug, Clone, Default)]
pub(in crate::ppu) struct BackgroundPipeline {
    pub next: TileLatch,
    pub pattern_lo: u16,
    pub pattern_hi: u16,
    pub attr_lo: u16,
    pub attr_hi: u16,
}

impl BackgroundPipeline {
    #[inline]
    pub fn shift(&mut self) {
        self.pattern_lo <<= 1;
        self.pattern_hi <<= 1;
        self.attr_lo <<= 1;
        self.attr_hi <<= 1;
    }

    #[inline]
    pub fn reload(&mut self) {
        self.pattern_lo = (self.pattern_lo & 0xFF00) | self.next.pattern_lo as u16;
        self.pattern_hi = (self.pattern_hi & 0xFF00) | self.next.pattern_hi as u16;
        let fill = |bit: u8| if self.next.palette & bit != 0 { 0x00FF } else { 0 };
        self.attr_lo = (self.attr_lo & 0xFF00) | fill(1);
        self.attr_hi = (self.attr_hi & 0xFF00) | fill(2);
    }

    /// Two-bit pixel value and palette number under the fine-X tap.
    #[inline]
    pub fn pixel(&self, fine_x: u8) -> (u8, u8) {
        let mux = 0x8000u16 >> fine_x;
        let bit = |r: u16| (r & mux != 0) as u8;
        let value = (bit(self.pattern_hi) << 1) | bit(self.pattern_lo);
        let palette = (bit(self.attr_hi) << 1) | bit(self.attr_lo);
        (value, palette)
    }
}

/// Select the 2-bit palette for the tile quadrant from an attribute byte.
#[inline]
pub(in crate::ppu) fn attribute_palette(attr: u8, coarse_x: u8, coarse_y: u8) -> u8 {
    let shift = ((coarse_y & 2) << 1) | (coarse_x & 2);
    (attr >> shift) & 0x03
}

impl Ppu {
    /// Background work for one dot in the 1-256 / 321-336 fetch windows.
    pub(in crate::ppu) fn background_fetch<B: PpuBus>(&mut self, bus: &mut B) {
        self.bg.shift();
        match self.dot & 7 {
            1 => {
                self.bg.reload();
                let addr = self.v.tile_address();
                self.bg.next.nametable = self.bus_read(bus, addr);
            }
            3 => {
                let addr = self.v.attribute_address();
                let attr = self.bus_read(bus, addr);
                self.bg.next.palette = attribute_palette(attr, self.v.coarse_x(), self.v.coarse_y());
            }
            5 => {
                let addr = self.background_pattern_address(0);
                self.bg.next.pattern_lo = self.bus_read(bus, addr);
            }
            7 => {
                let addr = self.background_pattern_address(1);
                self.bg.next.pattern_hi = self.bus_read(bus, addr);
            }
            0 => self.v.increment_x(),
            _ => {}
        }
    }

    /// Nametable / attribute fetches on dots 258-320 whose results are dropped.
    pub(in crate::ppu) fn garbage_fetch<B: PpuBus>(&mut self, bus: &mut B) {
        match self.dot & 7 {
            2 => {
                let addr = self.v.tile_address();
                self.bus_read(bus, addr);
            }
            4 => {
                let addr = self.v.attribute_address();
                self.bus_read(bus, addr);
            }
            _ => {}
        }
    }

    /// The two unused nametable fetches at dots 338 and 340.
    pub(in crate::ppu) fn trailing_nametable_fetch<B: PpuBus>(&mut self, bus: &mut B) {
        let addr = self.v.tile_address();
        self.bg.next.nametable = self.bus_read(bus, addr);
    }

    #[inline]
    fn background_pattern_address(&self, plane: u16) -> u16 {
        pattern_address(
            self.ctrl.background_table(),
            self.bg.next.nametable,
            plane,
            self.v.fine_y(),
        )
    }
}
