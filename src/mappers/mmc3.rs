/*!
MMC3 (mapper 4)

Registers (decoded on `addr & 0xE001`):
- $8000 bank select: bits 0-2 target R0-R7, bit 6 PRG mode, bit 7 CHR inversion
- $8001 bank data: R0/R1 drop bit 0, R6/R7 keep six bits
- $A000 mirroring (0 vertical, 1 horizontal); ignored on four-screen boards
- $A001 PRG-RAM protect: bit 7 chip enable, bit 6 write protect
- $C000 IRQ latch, $C001 IRQ reload
- $E000 IRQ disable + acknowledge, $E001 IRQ enable

PRG layout (8 KiB windows, `-2` / `-1` are the last two banks):

| mode | $8000 | $A000 | $C000 | $E000 |
|------|-------|-------|-------|-------|
| 0    | R6    | R7    | -2    | -1    |
| 1    | -2    | R7    | R6    | -1    |

CHR: 2 KiB windows R0/R1 and 1 KiB windows R2-R5; inversion swaps the
$0000 and $1000 halves.

IRQ: the counter is clocked on rising edges of PPU A12, sampled once per
CPU clock through `cpu_clock`. An edge only counts after A12 has been low
for at least three CPU clocks, which leaves one clock per scanline under
the usual background-at-$0000 / sprites-at-$1000 setup. On a clock the
counter reloads from the latch when zero (or after $C001), otherwise
decrements; reaching zero with IRQs enabled asserts the IRQ output.
*/

use crate::cartridge::{CartridgeData, Mirroring};
use crate::mapper::{Mapper, ppu_read_via, ppu_write_via};

const PRG_WINDOW: usize = 0x2000;
const CHR_WINDOW: usize = 0x0400;
const REGISTER_MASKS: [u8; 8] = [0xFE, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0x3F, 0x3F];
/// CPU clocks A12 must stay low before a rising edge counts.
const A12_LOW_CLOCKS: u32 = 3;

#[derive(Debug, Clone, Default)]
pub struct Mmc3 {
    registers: [u8; 8],
    target: usize,
    prg_mode: bool,
    chr_inversion: bool,

    prg_ram_enabled: bool,
    prg_ram_write_protect: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_out: bool,

    a12_high: bool,
    a12_low_clocks: u32,
}

impl Mmc3 {
    pub fn new() -> Self {
        Self {
            prg_ram_enabled: true,
            ..Self::default()
        }
    }

    fn prg_offset(&self, cart: &CartridgeData, addr: u16) -> usize {
        let banks = (cart.prg_rom.len() / PRG_WINDOW).max(1);
        let second_last = banks.saturating_sub(2);
        let r6 = self.registers[6] as usize;
        let r7 = self.registers[7] as usize;
        let bank = match (addr >> 13) & 0x03 {
            0 if self.prg_mode => second_last,
            0 => r6,
            1 => r7,
            2 if self.prg_mode => r6,
            2 => second_last,
            _ => banks - 1,
        };
        (bank % banks) * PRG_WINDOW + (addr as usize & (PRG_WINDOW - 1))
    }

    fn chr_offset(&self, addr: u16) -> usize {
        let addr = addr & 0x1FFF;
        let inverted = if self.chr_inversion { addr ^ 0x1000 } else { addr };
        let r = &self.registers;
        let bank = match inverted & 0x1C00 {
            0x0000 => r[0],
            0x0400 => r[0] | 1,
            0x0800 => r[1],
            0x0C00 => r[1] | 1,
            0x1000 => r[2],
            0x1400 => r[3],
            0x1800 => r[4],
            _ => r[5],
        };
        bank as usize * CHR_WINDOW + (addr as usize & (CHR_WINDOW - 1))
    }

    fn write_register(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) {
        match addr & 0xE001 {
            0x8000 => {
                self.target = (value & 0x07) as usize;
                self.prg_mode = value & 0x40 != 0;
                self.chr_inversion = value & 0x80 != 0;
            }
            0x8001 => self.registers[self.target] = value & REGISTER_MASKS[self.target],
            0xA000 => {
                if cart.mirroring != Mirroring::FourScreen {
                    cart.mirroring = if value & 1 == 0 {
                        Mirroring::Vertical
                    } else {
                        Mirroring::Horizontal
                    };
                }
            }
            0xA001 => {
                self.prg_ram_enabled = value & 0x80 != 0;
                self.prg_ram_write_protect = value & 0x40 != 0;
            }
            0xC000 => self.irq_latch = value,
            0xC001 => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            0xE000 => {
                self.irq_enabled = false;
                self.irq_out = false;
            }
            _ => self.irq_enabled = true,
        }
    }

    fn clock_irq_counter(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            if !self.irq_out {
                log::trace!("MMC3 IRQ asserted");
            }
            self.irq_out = true;
        }
    }
}

impl Mapper for Mmc3 {
    fn mapper_id(&self) -> u16 {
        4
    }

    fn name(&self) -> &'static str {
        "MMC3"
    }

    fn reset(&mut self, _cart: &mut CartridgeData) {
        *self = Self::new();
    }

    fn cpu_read(&mut self, cart: &mut CartridgeData, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled => cart.prg_ram_read(addr),
            0x8000..=0xFFFF => {
                let offset = self.prg_offset(cart, addr);
                cart.prg_read(offset)
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, cart: &mut CartridgeData, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram_enabled
                    && !self.prg_ram_write_protect
                    && cart.prg_ram_write(addr, value)
            }
            0x8000..=0xFFFF => {
                self.write_register(cart, addr, value);
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

    fn cpu_clock(&mut self, _cart: &mut CartridgeData, ppu_addr: u16) {
        if ppu_addr & 0x1000 != 0 {
            if !self.a12_high && self.a12_low_clocks >= A12_LOW_CLOCKS {
                self.clock_irq_counter();
            }
            self.a12_high = true;
            self.a12_low_clocks = 0;
        } else {
            self.a12_high = false;
            self.a12_low_clocks = self.a12_low_clocks.saturating_add(1);
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 32 PRG banks and 256 CHR windows, each filled with its own index.
    fn cart() -> CartridgeData {
        let mut prg = vec![0u8; 32 * PRG_WINDOW];
        for (i, bank) in prg.chunks_mut(PRG_WINDOW).enumerate() {
            bank.fill(i as u8);
        }
        let mut chr = vec![0u8; 256 * CHR_WINDOW];
        for (i, bank) in chr.chunks_mut(CHR_WINDOW).enumerate() {
            bank.fill(i as u8);
        }
        CartridgeData::new(prg, chr, 0x2000, Mirroring::Vertical)
    }

    fn set(m: &mut Mmc3, c: &mut CartridgeData, select: u8, value: u8) {
        m.cpu_write(c, 0x8000, select);
        m.cpu_write(c, 0x8001, value);
    }

    #[test]
    fn prg_layouts() {
        let mut c = cart();
        let mut m = Mmc3::new();
        set(&mut m, &mut c, 6, 15);
        set(&mut m, &mut c, 7, 21);
        let read = |m: &mut Mmc3, c: &mut CartridgeData, a| m.cpu_read(c, a);
        assert_eq!(read(&mut m, &mut c, 0x8000), Some(15));
        assert_eq!(read(&mut m, &mut c, 0xA000), Some(21));
        assert_eq!(read(&mut m, &mut c, 0xC000), Some(30));
        assert_eq!(read(&mut m, &mut c, 0xE000), Some(31));

        m.cpu_write(&mut c, 0x8000, 0x40);
        assert_eq!(read(&mut m, &mut c, 0x8000), Some(30), "mode 1 swaps $8000/$C000");
        assert_eq!(read(&mut m, &mut c, 0xA000), Some(21));
        assert_eq!(read(&mut m, &mut c, 0xC000), Some(15));
        assert_eq!(read(&mut m, &mut c, 0xFFFF), Some(31));
    }

    #[test]
    fn bank_register_masks() {
        let mut c = cart();
        let mut m = Mmc3::new();
        set(&mut m, &mut c, 6, 0xCF);
        assert_eq!(m.cpu_read(&mut c, 0x8000), Some(15), "R6 keeps six bits");
        set(&mut m, &mut c, 0, 0x0B);
        assert_eq!(m.ppu_read(&mut c, 0x0000), Some(10), "R0 is always even");
        assert_eq!(m.ppu_read(&mut c, 0x0400), Some(11));
    }

    #[test]
    fn chr_windows_and_inversion() {
        let mut c = cart();
        let mut m = Mmc3::new();
        for (reg, value) in [(0, 10), (1, 15), (2, 20), (3, 25), (4, 30), (5, 47)] {
            set(&mut m, &mut c, reg, value);
        }
        let expect = [10, 11, 14, 15, 20, 25, 30, 47];
        for (i, &bank) in expect.iter().enumerate() {
            let addr = i as u16 * 0x400;
            assert_eq!(m.ppu_read(&mut c, addr + 7), Some(bank), "window at {addr:#06x}");
        }

        m.cpu_write(&mut c, 0x8000, 0x80);
        for (i, &bank) in expect.iter().enumerate() {
            let addr = (i as u16 * 0x400) ^ 0x1000;
            assert_eq!(m.ppu_read(&mut c, addr), Some(bank), "inverted window at {addr:#06x}");
        }
    }

    #[test]
    fn mirroring_register() {
        let mut c = cart();
        let mut m = Mmc3::new();
        m.cpu_write(&mut c, 0xA000, 1);
        assert_eq!(c.mirroring, Mirroring::Horizontal);
        m.cpu_write(&mut c, 0xA000, 0);
        assert_eq!(c.mirroring, Mirroring::Vertical);
    }

    #[test]
    fn prg_ram_protect() {
        let mut c = cart();
        let mut m = Mmc3::new();
        assert!(m.cpu_write(&mut c, 0x6000, 0x12));
        assert_eq!(m.cpu_read(&mut c, 0x6000), Some(0x12));

        m.cpu_write(&mut c, 0xA001, 0x00);
        assert_eq!(m.cpu_read(&mut c, 0x6000), None, "chip disabled");

        m.cpu_write(&mut c, 0xA001, 0xC0);
        assert!(!m.cpu_write(&mut c, 0x6000, 0x34), "write protected");
        assert_eq!(m.cpu_read(&mut c, 0x6000), Some(0x12));
    }

    fn scanline(m: &mut Mmc3, c: &mut CartridgeData) {
        // Background fetches keep A12 low, then sprite fetches toggle it.
        for _ in 0..85 {
            m.cpu_clock(c, 0x0000);
        }
        for _ in 0..8 {
            m.cpu_clock(c, 0x1000);
            m.cpu_clock(c, 0x2000);
        }
    }

    #[test]
    fn irq_counts_one_edge_per_scanline() {
        let mut c = cart();
        let mut m = Mmc3::new();
        m.cpu_write(&mut c, 0xC000, 2);
        m.cpu_write(&mut c, 0xC001, 0);
        m.cpu_write(&mut c, 0xE001, 0);

        scanline(&mut m, &mut c);
        assert!(!m.irq_pending(), "first clock reloads to 2");
        scanline(&mut m, &mut c);
        assert!(!m.irq_pending(), "counter at 1");
        scanline(&mut m, &mut c);
        assert!(m.irq_pending(), "counter reached 0");

        m.cpu_write(&mut c, 0xE000, 0);
        assert!(!m.irq_pending(), "$E000 acknowledges");
        scanline(&mut m, &mut c);
        assert!(!m.irq_pending(), "disabled");
    }

    #[test]
    fn short_low_pulses_are_filtered() {
        let mut c = cart();
        let mut m = Mmc3::new();
        m.cpu_write(&mut c, 0xC000, 0);
        m.cpu_write(&mut c, 0xE001, 0);
        for _ in 0..3 {
            m.cpu_clock(&mut c, 0x0000);
        }
        m.cpu_clock(&mut c, 0x1000);
        assert!(m.irq_pending(), "latch 0 fires on every clock");
        m.cpu_write(&mut c, 0xE000, 0);
        m.cpu_write(&mut c, 0xE001, 0);
        m.cpu_clock(&mut c, 0x0000);
        m.cpu_clock(&mut c, 0x1000);
        assert!(!m.irq_pending(), "A12 low for one clock is ignored");
    }
}
