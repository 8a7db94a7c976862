/*
UxROM (mapper 2).

- $8000-$BFFF: switchable 16 KiB PRG bank, selected by any write to
  $8000-$FFFF (taken modulo the bank count).
- $C000-$FFFF: fixed to the last 16 KiB bank.
- CHR: 8 KiB, normally RAM. No IRQ, mirroring from the header.
*/

use crate::cartridge::{CartridgeData, PRG_UNIT};
use crate::mapper::{Mapper, ppu_read_via, ppu_write_via};

#[derive(Debug, Clone, Default)]
pub struct Uxrom {
    bank: usize,
}

impl Uxrom {
    fn bank_count(cart: &CartridgeData) -> usize {
        (cart.prg_rom.len() / PRG_UNIT).max(1)
    }
}

impl Mapper for Uxrom {
    fn mapper_id(&self) -> u16 {
        2
    }

    fn name(&self) -> &'static str {
        "UxROM"
    }

    fn reset(&mut self, _cart: &mut CartridgeData) {
        self.bank = 0;
    }

    fn cpu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        let offset = (addr & 0x3FFF) as usize;
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_read(addr),
            0x8000..=0xBFFF => cart.prg_read(self.bank * PRG_UNIT + offset),
            0xC000..=0xFFFF => {
                let last = Self::bank_count(cart) - 1;
                cart.prg_read(last * PRG_UNIT + offset)
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_write(addr, value),
            0x8000..=0xFFFF => {
                self.bank = value as usize % Self::bank_count(cart);
                true
            }
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
