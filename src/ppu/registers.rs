#![doc = r#"
PPU registers module

Purpose
- CPU-visible register semantics for $2000-$2007: the PPUCTRL / PPUMASK /
  PPUSTATUS bit types, `read_reg` / `write_reg` side effects, the PPUDATA
  read buffer and the shared two-write latch for PPUSCROLL / PPUADDR.

Notes
- The register index is `addr & 7`; the bus already folds $2008-$3FFF.
- Writes drive all eight open-bus bits. Reads of write-only registers
  return the open-bus latch. PPUSTATUS drives bits 7-5, OAMDATA all eight,
  PPUDATA all eight except palette reads which only drive bits 5-0.
- PPUDATA reads below $3F00 return the previous buffer content. Palette
  reads return immediately while the buffer picks up the nametable byte
  hidden underneath.
"#]

use bitflags::bitflags;

use super::Ppu;
use crate::ppu_bus::PpuBus;

bitflags! {
    /// $2000 PPUCTRL
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_X = 0x01;
        const NAMETABLE_Y = 0x02;
        const INCREMENT_32 = 0x04;
        const SPRITE_TABLE = 0x08;
        const BACKGROUND_TABLE = 0x10;
        const SPRITE_8X16 = 0x20;
        const MASTER_SLAVE = 0x40;
        const NMI_ENABLE = 0x80;
    }
}

bitflags! {
    /// $2001 PPUMASK
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0x01;
        const BACKGROUND_LEFT = 0x02;
        const SPRITES_LEFT = 0x04;
        const SHOW_BACKGROUND = 0x08;
        const SHOW_SPRITES = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

bitflags! {
    /// $2002 PPUSTATUS (only the three driven bits exist)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

impl PpuCtrl {
    #[inline]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::INCREMENT_32) { 32 } else { 1 }
    }

    #[inline]
    pub fn sprite_height(self) -> i16 {
        if self.contains(Self::SPRITE_8X16) { 16 } else { 8 }
    }

    /// Pattern table base ($0000 / $1000) for 8x8 sprites.
    #[inline]
    pub fn sprite_table(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) { 0x1000 } else { 0 }
    }

    #[inline]
    pub fn background_table(self) -> u16 {
        if self.contains(Self::BACKGROUND_TABLE) { 0x1000 } else { 0 }
    }
}

impl PpuMask {
    #[inline]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND | Self::SHOW_SPRITES)
    }
}

pub const PPUCTRL: u16 = 0;
pub const PPUMASK: u16 = 1;
pub const PPUSTATUS: u16 = 2;
pub const OAMADDR: u16 = 3;
pub const OAMDATA: u16 = 4;
pub const PPUSCROLL: u16 = 5;
pub const PPUADDR: u16 = 6;
pub const PPUDATA: u16 = 7;

/// Sprite attribute bits 2-4 are not stored in OAM.
const OAM_ATTR_READ_MASK: u8 = 0xE3;

impl Ppu {
    pub(in crate::ppu) fn read_reg_inner<B: PpuBus>(&mut self, addr: u16, bus: &mut B) -> u8 {
        match addr & 7 {
            PPUSTATUS => {
                self.last_status_read = Some(self.clocks);
                self.open_bus.drive(self.status.bits(), 0xE0);
                self.status.remove(PpuStatus::VBLANK);
                self.pending_nmi = false;
                self.write_latch = false;
            }
            OAMDATA => {
                let mut v = self.oam[self.oam_addr as usize];
                if self.oam_addr & 3 == 2 {
                    v &= OAM_ATTR_READ_MASK;
                }
                self.open_bus.drive(v, 0xFF);
            }
            PPUDATA => {
                let addr = self.v.raw() & 0x3FFF;
                if addr >= 0x3F00 {
                    let color = self.palette_read(addr);
                    self.read_buffer = self.bus_read(bus, addr & 0x2FFF);
                    self.open_bus.drive(color, 0x3F);
                } else {
                    let out = self.read_buffer;
                    self.read_buffer = self.bus_read(bus, addr);
                    self.open_bus.drive(out, 0xFF);
                }
                self.increment_vram_addr();
            }
            _ => {}
        }
        self.open_bus.value()
    }

    pub(in crate::ppu) fn write_reg_inner<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        self.open_bus.drive(value, 0xFF);
        match addr & 7 {
            PPUCTRL => {
                let was_enabled = self.ctrl.contains(PpuCtrl::NMI_ENABLE);
                self.ctrl = PpuCtrl::from_bits_retain(value);
                self.t.set_nametable(value & 0x03);
                if !was_enabled
                    && self.ctrl.contains(PpuCtrl::NMI_ENABLE)
                    && self.status.contains(PpuStatus::VBLANK)
                {
                    self.nmi_request = true;
                }
            }
            PPUMASK => self.mask = PpuMask::from_bits_retain(value),
            PPUSTATUS => {}
            OAMADDR => self.oam_addr = value,
            OAMDATA => {
                if self.is_rendering() {
                    return;
                }
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            PPUSCROLL => {
                if !self.write_latch {
                    self.fine_x = value & 0x07;
                    self.t.set_coarse_x(value >> 3);
                } else {
                    self.t.set_fine_y(value & 0x07);
                    self.t.set_coarse_y(value >> 3);
                }
                self.write_latch = !self.write_latch;
            }
            PPUADDR => {
                if !self.write_latch {
                    let raw = (self.t.raw() & 0x00FF) | ((value as u16 & 0x3F) << 8);
                    self.t.set_raw(raw);
                } else {
                    let raw = (self.t.raw() & 0xFF00) | value as u16;
                    self.t.set_raw(raw);
                    self.v = self.t;
                    self.bus_address = self.v.raw() & 0x3FFF;
                }
                self.write_latch = !self.write_latch;
            }
            _ => {
                let addr = self.v.raw() & 0x3FFF;
                self.bus_write(bus, addr, value);
                self.increment_vram_addr();
            }
        }
    }

    #[inline]
    fn increment_vram_addr(&mut self) {
        let next = self.v.raw().wrapping_add(self.ctrl.vram_increment());
        self.v.set_raw(next);
    }

    /// Visible or pre-render line with rendering switched on.
    #[inline]
    pub(in crate::ppu) fn is_rendering(&self) -> bool {
        self.scanline < 240 && self.mask.rendering_enabled()
    }
}
