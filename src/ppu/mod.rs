/*!
Dot-accurate 2C02 PPU.

Overview
========
- `registers`: the eight CPU-visible registers and their side effects.
- `vram_addr`: the 15-bit `v` / `t` scroll registers (coarse X/Y, nametable
  select, fine Y) and their increment / copy operations.
- `fetch`: background nametable / attribute / pattern fetches and the
  16-bit shifters.
- `oam_eval` and `sprite`: per-scanline sprite selection, pattern loading
  and the sprite pixel mux.
- `renderer`: the per-dot state machine, vblank / NMI timing and pixel
  output into an RGBA framebuffer.
- `open_bus`: the decaying I/O latch returned by write-only registers.

Bus access
==========
The PPU never owns pattern or nametable memory. Every fetch goes through a
`PpuBus`, so the cartridge and console VRAM stay on the system side. The
last address put on that bus is exposed through `bus_address()` for mappers
that watch PPU A12. Interrupts are signalled through a `CpuInterruptSink`
passed to `cycle`.
*/

pub(crate) mod fetch;
pub(crate) mod memory;
pub(crate) mod oam_eval;
pub(crate) mod open_bus;
pub mod palette;
pub mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;
pub(crate) mod vram_addr;

use crate::cpu::CpuInterruptSink;
use crate::ppu_bus::PpuBus;
use fetch::BackgroundPipeline;
use open_bus::OpenBus;
use registers::{PpuCtrl, PpuMask, PpuStatus};
use sprite::SpriteSlot;
use vram_addr::VramAddr;

pub use memory::Sprite;

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

pub struct Ppu {
    // CPU-visible registers
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    oam_addr: u8,

    // Scrolling: current / temporary address, fine X, shared write latch
    v: VramAddr,
    t: VramAddr,
    fine_x: u8,
    write_latch: bool,
    read_buffer: u8,
    open_bus: OpenBus,

    palette: [u8; 32],
    oam: [u8; 256],
    secondary_oam: [u8; 32],

    // Rendering pipeline
    bg: BackgroundPipeline,
    sprite_slots: [SpriteSlot; 8],
    sprites_found: usize,
    sprite_zero_next: bool,
    sprite_zero_active: bool,

    // Timing
    dot: u16,
    scanline: i16,
    frames: u64,
    clocks: u64,
    last_status_read: Option<u64>,

    // NMI
    pending_nmi: bool,
    nmi_request: bool,

    frame_complete: bool,
    framebuffer: Vec<u8>,
    bus_address: u16,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            v: VramAddr::default(),
            t: VramAddr::default(),
            fine_x: 0,
            write_latch: false,
            read_buffer: 0,
            open_bus: OpenBus::default(),
            palette: [0; 32],
            oam: [0; 256],
            secondary_oam: [0xFF; 32],
            bg: BackgroundPipeline::default(),
            sprite_slots: [SpriteSlot::default(); 8],
            sprites_found: 0,
            sprite_zero_next: false,
            sprite_zero_active: false,
            dot: 0,
            scanline: -1,
            frames: 0,
            clocks: 0,
            last_status_read: None,
            pending_nmi: false,
            nmi_request: false,
            frame_complete: false,
            framebuffer: vec![0; NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL],
            bus_address: 0,
        }
    }

    /// Console reset: registers, latch and beam position are cleared.
    /// OAM and palette RAM keep their contents.
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.write_latch = false;
        self.read_buffer = 0;
        self.fine_x = 0;
        self.t = VramAddr::default();
        self.bg = BackgroundPipeline::default();
        self.sprite_slots = [SpriteSlot::default(); 8];
        self.sprites_found = 0;
        self.dot = 0;
        self.scanline = -1;
        self.frames = 0;
        self.pending_nmi = false;
        self.nmi_request = false;
        self.frame_complete = false;
    }

    /// CPU read of $2000-$2007 (`addr & 7` selects the register).
    pub fn read_reg<B: PpuBus>(&mut self, addr: u16, bus: &mut B) -> u8 {
        self.read_reg_inner(addr, bus)
    }

    /// CPU write of $2000-$2007.
    pub fn write_reg<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        self.write_reg_inner(addr, value, bus);
    }

    /// Process one dot and advance the beam.
    pub fn cycle<B: PpuBus, I: CpuInterruptSink>(&mut self, bus: &mut B, sink: &mut I) {
        self.cycle_inner(bus, sink);
    }

    /// RGBA8 framebuffer, 256x240, row-major.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// True once per frame after the visible lines are drawn; clears on read.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Current VRAM address (`v`).
    pub fn vram_addr(&self) -> u16 {
        self.v.raw()
    }

    /// Last address driven onto the PPU bus.
    pub fn bus_address(&self) -> u16 {
        self.bus_address
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// PPU clocks since power-on.
    pub fn clocks(&self) -> u64 {
        self.clocks
    }

    pub fn status(&self) -> PpuStatus {
        self.status
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ctrl
    }

    pub fn mask(&self) -> PpuMask {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::mock::MockPpuBus;

    #[test]
    fn reset_keeps_oam_and_palette() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::new();
        ppu.write_reg(registers::OAMDATA, 0x42, &mut bus);
        ppu.write_reg(registers::PPUADDR, 0x3F, &mut bus);
        ppu.write_reg(registers::PPUADDR, 0x01, &mut bus);
        ppu.write_reg(registers::PPUDATA, 0x16, &mut bus);
        ppu.write_reg(registers::PPUCTRL, 0x80, &mut bus);

        ppu.reset();
        assert_eq!(ppu.ctrl(), PpuCtrl::empty());
        assert_eq!(ppu.peek_oam(0), 0x42);
        assert_eq!(ppu.peek_palette(0x3F01), 0x16);
        assert_eq!((ppu.scanline(), ppu.dot()), (-1, 0));
    }

    #[test]
    fn framebuffer_has_full_size() {
        let ppu = Ppu::new();
        assert_eq!(ppu.framebuffer().len(), 256 * 240 * 4);
    }
}
