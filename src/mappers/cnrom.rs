/*
CNROM (mapper 3).

- PRG: fixed 16 KiB (mirrored) or 32 KiB at $8000-$FFFF.
- CHR: 8 KiB bank selected by bits 0-1 of any write to $8000-$FFFF.
  Offsets past the end of CHR wrap.
- Mirroring from the header; no IRQ.
*/

use crate::cartridge::{CHR_UNIT, CartridgeData};
use crate::mapper::{Mapper, ppu_read_via, ppu_write_via};

#[derive(Debug, Clone, Default)]
pub struct Cnrom {
    chr_bank: usize,
}

impl Cnrom {
    #[cfg(test)]
    pub(crate) fn current_chr_bank(&self) -> usize {
        self.chr_bank
    }

    #[inline]
    fn chr_offset(&self, addr: u16) -> usize {
        self.chr_bank * CHR_UNIT + (addr & 0x1FFF) as usize
    }
}

impl Mapper for Cnrom {
    fn mapper_id(&self) -> u16 {
        3
    }

    fn name(&self) -> &'static str {
        "CNROM"
    }

    fn reset(&mut self, _cart: &mut CartridgeData) {
        self.chr_bank = 0;
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
            0x8000..=0xFFFF => {
                self.chr_bank = (value & 0x03) as usize;
                true
            }
            _ => false,
        }
    }

    fn ppu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        ppu_read_via(cart, addr, |a| self.chr_offset(a))
    }

    fn ppu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        ppu_write_via(cart, addr, value, |a| self.chr_offset(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;

    fn cart(chr_banks: usize) -> CartridgeData {
        let mut chr = vec![0u8; chr_banks * CHR_UNIT];
        for (i, bank) in chr.chunks_mut(CHR_UNIT).enumerate() {
            bank.fill(0x10 + i as u8);
        }
        let mut prg = vec![0xAA; 0x4000];
        prg[0x3FFF] = 0xBB;
        CartridgeData::new(prg, chr, 0x2000, Mirroring::Horizontal)
    }

    #[test]
    fn prg_is_fixed_and_mirrored() {
        let mut c = cart(4);
        let mut m = Cnrom::default();
        assert_eq!(m.cpu_read(&mut c, 0x8000), Some(0xAA));
        assert_eq!(m.cpu_read(&mut c, 0xFFFF), Some(0xBB), "16 KiB mirrored to $C000");
    }

    #[test]
    fn chr_bank_uses_low_two_bits() {
        let mut c = cart(4);
        let mut m = Cnrom::default();
        assert_eq!(m.ppu_read(&mut c, 0x0000), Some(0x10));
        assert!(m.cpu_write(&mut c, 0x8000, 0xFE));
        assert_eq!(m.current_chr_bank(), 2);
        assert_eq!(m.ppu_read(&mut c, 0x1FFF), Some(0x12));
        m.reset(&mut c);
        assert_eq!(m.ppu_read(&mut c, 0x0000), Some(0x10));
    }

    #[test]
    fn chr_bank_wraps_on_small_chr() {
        let mut c = cart(2);
        let mut m = Cnrom::default();
        m.cpu_write(&mut c, 0xC000, 3);
        assert_eq!(m.ppu_read(&mut c, 0x0000), Some(0x11), "bank 3 wraps to bank 1");
    }
}
