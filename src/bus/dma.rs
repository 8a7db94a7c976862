/*!
OAM DMA: copies one 256-byte CPU page into sprite memory while the CPU is
halted.

Timing
- The transfer starts at the first CPU instruction boundary after $4014 is
  written.
- 1 alignment cycle when it starts on an even CPU cycle, 2 on an odd one.
- Then 256 read/write pairs. Reads go through the CPU bus (side effects
  included), writes land on OAMDATA ($2004), so OAMADDR increments as it
  would for a program-driven copy.
- Total: 513 or 514 stolen CPU cycles.
*/

use crate::cpu::CpuBus;
use crate::ppu::registers::OAMDATA;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DmaPhase {
    Read,
    Write,
}

#[derive(Debug, Clone)]
pub struct DmaController {
    active: bool,
    src_addr: u16,
    index: u16,
    phase: DmaPhase,
    latch: u8,
    align_cycles: u8,
}

impl Default for DmaController {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaController {
    pub fn new() -> Self {
        Self {
            active: false,
            src_addr: 0,
            index: 0,
            phase: DmaPhase::Read,
            latch: 0,
            align_cycles: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Begin copying `$XX00-$XXFF`; `cpu_cycle` parity picks the alignment.
    pub fn start(&mut self, src_page: u8, cpu_cycle: u64) {
        log::debug!("OAM DMA from ${src_page:02X}00 at CPU cycle {cpu_cycle}");
        self.active = true;
        self.src_addr = (src_page as u16) << 8;
        self.index = 0;
        self.phase = DmaPhase::Read;
        self.latch = 0;
        self.align_cycles = 1 + (cpu_cycle & 1) as u8;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// CPU cycles left to steal, alignment included. 0 when idle.
    pub fn stall_remaining(&self) -> u32 {
        if !self.active {
            return 0;
        }
        let bytes_left = 256u32.saturating_sub(self.index as u32);
        let transfer = match self.phase {
            DmaPhase::Read => bytes_left * 2,
            DmaPhase::Write if bytes_left == 0 => 0,
            DmaPhase::Write => 1 + (bytes_left - 1) * 2,
        };
        self.align_cycles as u32 + transfer
    }

    /// One stolen CPU cycle. Returns false (and does nothing) when idle.
    pub fn step<B: CpuBus>(&mut self, bus: &mut B) -> bool {
        if !self.active {
            return false;
        }
        if self.align_cycles > 0 {
            self.align_cycles -= 1;
            return true;
        }
        match self.phase {
            DmaPhase::Read => {
                self.latch = bus.read(self.src_addr.wrapping_add(self.index));
                self.phase = DmaPhase::Write;
            }
            DmaPhase::Write => {
                bus.write(0x2000 | OAMDATA, self.latch);
                self.index += 1;
                self.phase = DmaPhase::Read;
                if self.index >= 256 {
                    self.active = false;
                }
            }
        }
        true
    }
}
