/*!
Sprite shifters: loading during dots 257-320 and the per-dot pixel mux.

Each of the eight slots holds the pattern bytes for one sprite of the next
scanline, its attribute byte and an X down-counter. While the counter is
non-zero the slot is inactive; once it reaches zero the pattern bytes
shift out one bit per dot, lowest bit first. Pattern bytes are stored
bit-reversed unless the sprite is flipped horizontally, so "lowest bit
first" is the leftmost pixel either way.
*/

use super::Ppu;
use super::memory::{Sprite, pattern_address};
use crate::ppu_bus::PpuBus;

#[derive(Debug, Clone, Copy, Default)]
pub(in crate::ppu) struct SpriteSlot {
    pub pattern_lo: u8,
    pub pattern_hi: u8,
    pub attr: u8,
    pub x: u8,
}

/// Opaque sprite pixel selected by the mux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::ppu) struct SpritePixel {
    pub slot: usize,
    pub value: u8,
    pub palette: u8,
    pub behind_background: bool,
}

impl Ppu {
    /// Pattern fetch for slot `(dot - 257) / 8`: low plane on dot&7 == 6,
    /// high plane on dot&7 == 0.
    pub(in crate::ppu) fn sprite_fetch<B: PpuBus>(&mut self, bus: &mut B) {
        let plane: u16 = match self.dot & 7 {
            6 => 0,
            0 => 1,
            _ => return,
        };
        let slot = ((self.dot - 257) >> 3) as usize;
        let sprite = self.secondary_sprite(slot);
        let addr = self.sprite_pattern_address(sprite, plane);
        let mut data = self.bus_read(bus, addr);
        if !sprite.flip_horizontal() {
            data = data.reverse_bits();
        }
        if slot >= self.sprites_found {
            data = 0;
        }

        let s = &mut self.sprite_slots[slot];
        s.attr = sprite.attr;
        s.x = sprite.x;
        if plane == 0 {
            s.pattern_lo = data;
        } else {
            s.pattern_hi = data;
        }
    }

    fn sprite_pattern_address(&self, sprite: Sprite, plane: u16) -> u16 {
        let row = (self.scanline as u8).wrapping_sub(sprite.y);
        if self.ctrl.sprite_height() == 8 {
            let row = if sprite.flip_vertical() { 7u8.wrapping_sub(row) } else { row };
            pattern_address(self.ctrl.sprite_table(), sprite.tile, plane, row)
        } else {
            let row = (if sprite.flip_vertical() { 15u8.wrapping_sub(row) } else { row }) & 0x0F;
            let table = if sprite.tile & 1 != 0 { 0x1000 } else { 0 };
            let tile = (sprite.tile & 0xFE) | (row >> 3);
            pattern_address(table, tile, plane, row & 7)
        }
    }

    /// First opaque pixel among the active slots, in slot order.
    pub(in crate::ppu) fn sprite_pixel(&self) -> Option<SpritePixel> {
        self.sprite_slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.x == 0)
            .find_map(|(slot, s)| {
                let value = ((s.pattern_hi & 1) << 1) | (s.pattern_lo & 1);
                (value != 0).then_some(SpritePixel {
                    slot,
                    value,
                    palette: s.attr & 0x03,
                    behind_background: s.attr & 0x20 != 0,
                })
            })
    }

    /// Advance every slot by one dot.
    pub(in crate::ppu) fn shift_sprites(&mut self) {
        for s in &mut self.sprite_slots {
            if s.x > 0 {
                s.x -= 1;
            } else {
                s.pattern_lo >>= 1;
                s.pattern_hi >>= 1;
            }
        }
    }
}
