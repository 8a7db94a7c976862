/*
GxROM (mapper 66).

One register at $8000-$FFFF: bits 4-5 select a 32 KiB PRG bank, bits 0-1
an 8 KiB CHR bank. Banks past the end of ROM are left unclaimed.
*/

use crate::cartridge::{CHR_UNIT, CartridgeData};
use crate::mapper::{Mapper, PpuRouting};

const PRG_BANK: usize = 32 * 1024;

#[derive(Debug, Clone, Default)]
pub struct Gxrom {
    prg_bank: usize,
    chr_bank: usize,
}

impl Gxrom {
    fn prg_offset(&self, addr: u16) -> usize {
        self.prg_bank * PRG_BANK + (addr & 0x7FFF) as usize
    }

    fn chr_offset(&self, addr: u16) -> usize {
        self.chr_bank * CHR_UNIT + (addr & 0x1FFF) as usize
    }
}

impl Mapper for Gxrom {
    fn mapper_id(&self) -> u16 {
        66
    }

    fn name(&self) -> &'static str {
        "GxROM"
    }

    fn reset(&mut self, _cart: &mut CartridgeData) {
        self.prg_bank = 0;
        self.chr_bank = 0;
    }

    fn cpu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_read(addr),
            0x8000..=0xFFFF => cart.prg_rom.get(self.prg_offset(addr)).copied(),
            _ => None,
        }
    }

    fn cpu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => cart.prg_ram_write(addr, value),
            0x8000..=0xFFFF => {
                self.prg_bank = ((value >> 4) & 0x03) as usize;
                self.chr_bank = (value & 0x03) as usize;
                true
            }
            _ => false,
        }
    }

    fn ppu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => {
                cart.routing = PpuRouting::default();
                let offset = self.chr_offset(a);
                (offset < cart.chr_len()).then(|| cart.chr_read(offset)).flatten()
            }
            a @ 0x2000..=0x3EFF => cart.nametable_read(a),
            _ => None,
        }
    }

    fn ppu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => {
                cart.routing = PpuRouting::default();
                let offset = self.chr_offset(a);
                offset < cart.chr_len() && cart.chr_write(offset, value)
            }
            a @ 0x2000..=0x3EFF => cart.nametable_write(a, value),
            _ => false,
        }
    }
}
