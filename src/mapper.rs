/*!
Mapper subsystem: the trait every cartridge board implements, plus the
routing signals the board reports to the console on each PPU access.

Contract:
- All methods take full, unmasked CPU or PPU addresses.
- Reads return `Some(byte)` when the cartridge drives the data bus and
  `None` when the access falls through to console RAM / VRAM. Writes return
  whether the cartridge claimed the byte.
- ROM/RAM buffers live in the shared `CartridgeData` record and are passed
  in on every call, so a board only stores its own registers.
- Every PPU access updates `CartridgeData::routing` (VRAM_CE / VRAM_A10),
  which the bus consults when the cartridge does not claim the access.

Lifecycle: `init` runs once after the cartridge is loaded, `reset` on a
console reset. Board state is released by `Drop`.
*/

use crate::cartridge::CartridgeData;

/// Nametable routing signals a board reports on each PPU access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuRouting {
    /// Console VRAM chip enable: the access targets the internal 2 KiB.
    pub vram_ce: bool,
    /// Console VRAM A10: which 1 KiB half is selected.
    pub vram_a10: bool,
}

pub trait Mapper {
    /// iNES mapper number.
    fn mapper_id(&self) -> u16;

    /// Board name for diagnostics.
    fn name(&self) -> &'static str;

    fn init(&mut self, _cart: &mut CartridgeData) {}

    fn reset(&mut self, _cart: &mut CartridgeData) {}

    fn cpu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8>;

    fn cpu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool;

    fn ppu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8>;

    fn ppu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool;

    /// Called once per CPU clock with the address currently on the PPU bus.
    fn cpu_clock(&mut self, _cart: &mut CartridgeData, _ppu_addr: u16) {}

    /// Level of the board's IRQ output.
    fn irq_pending(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Shared PPU-side routing
// ---------------------------------------------------------------------------

/// PPU read for boards whose pattern space is a plain CHR window:
/// `chr_offset` maps $0000-$1FFF to a byte offset in CHR-ROM/RAM, and the
/// nametable range is routed by the cartridge's mirroring.
pub(crate) fn ppu_read_via(
    cart: &mut CartridgeData,
    addr: u16,
    chr_offset: impl Fn(u16) -> usize,
) -> Option<u8> {
    match addr & 0x3FFF {
        a @ 0x0000..=0x1FFF => {
            cart.routing = PpuRouting::default();
            cart.chr_read(chr_offset(a))
        }
        a @ 0x2000..=0x3EFF => cart.nametable_read(a),
        _ => None,
    }
}

/// Write counterpart of `ppu_read_via`. CHR-ROM writes are dropped with
/// VRAM_CE low, so nothing on the console side sees them either.
pub(crate) fn ppu_write_via(
    cart: &mut CartridgeData,
    addr: u16,
    value: u8,
    chr_offset: impl Fn(u16) -> usize,
) -> bool {
    match addr & 0x3FFF {
        a @ 0x0000..=0x1FFF => {
            cart.routing = PpuRouting::default();
            cart.chr_write(chr_offset(a), value)
        }
        a @ 0x2000..=0x3EFF => cart.nametable_write(a, value),
        _ => false,
    }
}
