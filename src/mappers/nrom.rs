/*
NROM (mapper 0).

- PRG: 16 KiB mirrored or 32 KiB direct at $8000-$FFFF.
- PRG-RAM at $6000-$7FFF when present (battery-backed on some boards).
- CHR: 8 KiB ROM, or CHR-RAM when the image carries none.
- No registers; writes to $8000+ are ignored.
*/

use crate::cartridge::CartridgeData;
use crate::mapper::{Mapper, ppu_read_via, ppu_write_via};

#[derive(Debug, Clone, Default)]
pub struct Nrom;

impl Mapper for Nrom {
    fn mapper_id(&self) -> u16 {
        0
    }

    fn name(&self) -> &'static str {
        "NROM"
    }

    fn cpu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_read(addr),
            0x8000..=0xFFFF => cart.prg_read((addr - 0x8000) as usize),
            _ => None,
        }
    }

    fn cpu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_write(addr, value),
            _ => false,
        }
    }

    fn ppu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        ppu_read_via(cart, addr, |a| a as usize)
    }

    fn ppu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        ppu_write_via(cart, addr, value, |a| a as usize)
    }
}
