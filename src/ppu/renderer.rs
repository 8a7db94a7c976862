/*!
renderer.rs - Per-dot PPU state machine.

`cycle_inner` processes the dot at (`scanline`, `dot`) and then advances
the beam. Scanline -1 is pre-render, 0-239 are visible, 240 is idle and
241-260 are vertical blank.

Vblank / NMI timing at scanline 241:
- dot 1 sets the vblank flag, unless PPUSTATUS was read on the clock just
  before, in which case neither the flag nor the NMI happen this frame;
- dot 3 raises NMI if it is still pending and enabled. A PPUSTATUS read on
  dot 1 or 2 clears the pending NMI.
*/

use super::Ppu;
use super::palette;
use super::registers::{PpuCtrl, PpuMask, PpuStatus};
use super::{NES_HEIGHT, NES_WIDTH};
use crate::cpu::CpuInterruptSink;
use crate::ppu_bus::PpuBus;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const LAST_SCANLINE: i16 = 260;
pub const VBLANK_SCANLINE: i16 = 241;

impl Ppu {
    pub(in crate::ppu) fn cycle_inner<B: PpuBus, I: CpuInterruptSink>(
        &mut self,
        bus: &mut B,
        cpu: &mut I,
    ) {
        if self.nmi_request {
            self.nmi_request = false;
            cpu.raise_nmi();
        }

        if self.scanline < 240 {
            self.render_dot(bus);
        } else if self.scanline == VBLANK_SCANLINE {
            self.vblank_dot(cpu);
        }

        self.advance();
    }

    fn render_dot<B: PpuBus>(&mut self, bus: &mut B) {
        if self.scanline == -1 && self.dot == 1 {
            self.status.remove(
                PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
        }

        if self.mask.rendering_enabled() {
            match self.dot {
                1..=256 | 321..=336 => self.background_fetch(bus),
                258..=320 => self.garbage_fetch(bus),
                338 | 340 => self.trailing_nametable_fetch(bus),
                _ => {}
            }
            match self.dot {
                256 => self.v.increment_y(),
                257 => self.v.copy_horizontal(self.t),
                280..=304 if self.scanline == -1 => self.v.copy_vertical(self.t),
                _ => {}
            }

            match self.dot {
                64 => self.clear_secondary_oam(),
                256 => self.evaluate_sprites(),
                257 => {
                    self.sprite_zero_active = self.sprite_zero_next;
                }
                258..=320 => self.sprite_fetch(bus),
                _ => {}
            }
        }

        if self.scanline >= 0 && (1..=256).contains(&self.dot) {
            self.emit_pixel();
        }
    }

    fn vblank_dot<I: CpuInterruptSink>(&mut self, cpu: &mut I) {
        match self.dot {
            1 => {
                if self.last_status_read != Some(self.clocks) {
                    self.status.insert(PpuStatus::VBLANK);
                    self.pending_nmi = true;
                }
                self.frame_complete = true;
            }
            3 => {
                if self.pending_nmi && self.ctrl.contains(PpuCtrl::NMI_ENABLE) {
                    cpu.raise_nmi();
                }
                self.pending_nmi = false;
            }
            _ => {}
        }
    }

    fn emit_pixel(&mut self) {
        let left_edge = self.dot <= 8;
        let mut index = 0u8;
        let mut bg_opaque = false;

        if self.mask.contains(PpuMask::SHOW_BACKGROUND)
            && (self.mask.contains(PpuMask::BACKGROUND_LEFT) || !left_edge)
        {
            let (value, pal) = self.bg.pixel(self.fine_x);
            if value != 0 {
                index = (pal << 2) | value;
                bg_opaque = true;
            }
        }

        if self.mask.contains(PpuMask::SHOW_SPRITES) {
            let sprites_visible = self.mask.contains(PpuMask::SPRITES_LEFT) || !left_edge;
            if let Some(px) = self.sprite_pixel() {
                if px.slot == 0
                    && self.sprite_zero_active
                    && bg_opaque
                    && sprites_visible
                    && self.dot != 256
                {
                    self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
                }
                if sprites_visible && (!bg_opaque || !px.behind_background) {
                    index = ((px.palette + 4) << 2) | px.value;
                }
            }
            self.shift_sprites();
        }

        let mut color = self.palette_read(0x3F00 | index as u16);
        if self.mask.contains(PpuMask::GRAYSCALE) {
            color &= 0x30;
        }
        self.put_pixel(self.dot as usize - 1, self.scanline as usize, color);
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: u8) {
        if x >= NES_WIDTH || y >= NES_HEIGHT {
            return;
        }
        let offset = (y * NES_WIDTH + x) * 4;
        self.framebuffer[offset..offset + 4].copy_from_slice(&palette::rgba(color));
    }

    fn advance(&mut self) {
        self.clocks += 1;
        if self.scanline == -1
            && self.dot == DOTS_PER_SCANLINE - 2
            && self.frames & 1 == 1
            && self.mask.rendering_enabled()
        {
            // Odd frames drop the last dot of the pre-render line.
            self.dot += 1;
        }
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = -1;
                self.frames += 1;
                if self.frames & 7 == 0 {
                    self.open_bus.decay();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::registers::{PPUMASK, PPUSTATUS};
    use crate::ppu_bus::mock::MockPpuBus;

    #[derive(Default)]
    struct NmiCounter {
        nmis: u32,
    }

    impl CpuInterruptSink for NmiCounter {
        fn raise_nmi(&mut self) {
            self.nmis += 1;
        }
        fn set_irq_line(&mut self, _asserted: bool) {}
    }

    fn run_to(ppu: &mut Ppu, bus: &mut MockPpuBus, sink: &mut NmiCounter, scanline: i16, dot: u16) {
        while !(ppu.scanline() == scanline && ppu.dot() == dot) {
            ppu.cycle(bus, sink);
        }
    }

    #[test]
    fn frame_is_341_by_262_when_rendering_disabled() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        for _ in 0..(341 * 262) {
            ppu.cycle(&mut bus, &mut sink);
        }
        assert_eq!((ppu.scanline(), ppu.dot()), (-1, 0));
        assert_eq!(ppu.frame_count(), 1);
        assert_eq!(bus.reads, 0, "no fetches while rendering is off");
    }

    #[test]
    fn odd_frame_skips_one_dot_when_rendering() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        ppu.write_reg(PPUMASK, PpuMask::SHOW_BACKGROUND.bits(), &mut bus);
        for _ in 0..(341 * 262) {
            ppu.cycle(&mut bus, &mut sink);
        }
        assert_eq!(ppu.frame_count(), 1);
        let start = ppu.clocks();
        run_to(&mut ppu, &mut bus, &mut sink, -1, 0);
        assert_eq!(ppu.clocks() - start, 341 * 262 - 1, "odd frame is one dot short");
    }

    #[test]
    fn vblank_sets_and_raises_nmi() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        ppu.write_reg(0, PpuCtrl::NMI_ENABLE.bits(), &mut bus);
        run_to(&mut ppu, &mut bus, &mut sink, 241, 2);
        assert!(ppu.status().contains(PpuStatus::VBLANK));
        assert_eq!(sink.nmis, 0, "NMI lands two dots after the flag");
        run_to(&mut ppu, &mut bus, &mut sink, 241, 4);
        assert_eq!(sink.nmis, 1);
        assert!(ppu.take_frame_complete());

        run_to(&mut ppu, &mut bus, &mut sink, -1, 2);
        assert!(!ppu.status().contains(PpuStatus::VBLANK), "cleared on pre-render");
    }

    #[test]
    fn status_read_one_clock_early_suppresses_vblank() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        ppu.write_reg(0, PpuCtrl::NMI_ENABLE.bits(), &mut bus);
        run_to(&mut ppu, &mut bus, &mut sink, 241, 1);
        let v = ppu.read_reg(PPUSTATUS, &mut bus);
        assert_eq!(v & 0x80, 0, "flag not yet set");
        run_to(&mut ppu, &mut bus, &mut sink, 241, 10);
        assert!(!ppu.status().contains(PpuStatus::VBLANK));
        assert_eq!(sink.nmis, 0);
    }

    #[test]
    fn status_read_at_set_suppresses_nmi_only() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        ppu.write_reg(0, PpuCtrl::NMI_ENABLE.bits(), &mut bus);
        run_to(&mut ppu, &mut bus, &mut sink, 241, 2);
        let v = ppu.read_reg(PPUSTATUS, &mut bus);
        assert_ne!(v & 0x80, 0, "flag reads as set");
        run_to(&mut ppu, &mut bus, &mut sink, 241, 10);
        assert_eq!(sink.nmis, 0);
    }

    #[test]
    fn enabling_nmi_during_vblank_fires_immediately() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        run_to(&mut ppu, &mut bus, &mut sink, 250, 0);
        ppu.write_reg(0, PpuCtrl::NMI_ENABLE.bits(), &mut bus);
        ppu.cycle(&mut bus, &mut sink);
        assert_eq!(sink.nmis, 1);
    }

    #[test]
    fn backdrop_color_fills_frame() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        let mut sink = NmiCounter::default();
        ppu.write_reg(6, 0x3F, &mut bus);
        ppu.write_reg(6, 0x00, &mut bus);
        ppu.write_reg(7, 0x21, &mut bus);
        run_to(&mut ppu, &mut bus, &mut sink, 241, 0);
        let [r, g, b] = palette::SYSTEM_COLORS[0x21];
        assert_eq!(&ppu.framebuffer()[0..4], &[r, g, b, 0xFF]);
        let last = (NES_WIDTH * NES_HEIGHT - 1) * 4;
        assert_eq!(&ppu.framebuffer()[last..last + 4], &[r, g, b, 0xFF]);
    }
}
