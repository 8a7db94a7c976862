/*!
oam_eval.rs - Secondary OAM clear and sprite evaluation.

Secondary OAM is filled with $FF at dot 64, then at dot 256 the 64
primary entries are scanned in index order. Sprites whose vertical range
covers the current scanline are copied until eight are found. A ninth
match sets the overflow flag and ends the scan; the hardware's diagonal
scan bug after the eighth sprite is not reproduced.

Whether sprite 0 made it into secondary OAM is latched for the next
scanline, which is when those sprites are actually drawn.
*/

use super::Ppu;
use super::memory::Sprite;
use super::registers::PpuStatus;

pub const MAX_SPRITES_PER_LINE: usize = 8;

impl Ppu {
    pub(in crate::ppu) fn clear_secondary_oam(&mut self) {
        for slot in 0..MAX_SPRITES_PER_LINE {
            self.set_secondary_sprite(slot, Sprite::HIDDEN);
        }
    }

    pub(in crate::ppu) fn evaluate_sprites(&mut self) {
        let height = self.ctrl.sprite_height();
        let line = self.scanline;
        self.sprites_found = 0;
        self.sprite_zero_next = false;

        for index in 0..64 {
            let sprite = self.sprite(index);
            let top = sprite.y as i16;
            if line < top || line >= top + height {
                continue;
            }
            if self.sprites_found == MAX_SPRITES_PER_LINE {
                self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                break;
            }
            if index == 0 {
                self.sprite_zero_next = true;
            }
            self.set_secondary_sprite(self.sprites_found, sprite);
            self.sprites_found += 1;
        }
    }

    /// Sprites copied by the last evaluation, in slot order.
    pub fn line_sprites(&self) -> Vec<Sprite> {
        (0..self.sprites_found)
            .map(|slot| self.secondary_sprite(slot))
            .collect()
    }
}
