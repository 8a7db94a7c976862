/*!
core::Cpu - Clock-driven 6502 façade wrapping `CpuState`.

Timing model
============
`cycle()` consumes exactly one CPU clock. When no instruction is in flight
it services a pending interrupt or fetches and decodes the next opcode and
loads the descriptor's base cycle count. The operand is resolved and the
operation executed on the last base clock, so a load or store reaches the
bus on the same clock real hardware performs it (PPU register polling
depends on this). Page-cross and branch penalties are appended as idle
clocks after execution. Interrupt entry still performs its pushes on the
first of its seven clocks.

Interrupts
==========
Sampled only at instruction boundaries. NMI is edge-latched and wins over
IRQ; IRQ is a level and is ignored while I is set. Both push PC and the
status byte with B clear, set I and jump through their vector in 7 clocks.
*/

use crate::cpu::execute::execute;
use crate::cpu::regs::CpuRegs;
use crate::cpu::state::{CpuState, IRQ_DISABLE, IRQ_VECTOR, NMI_VECTOR};
use crate::cpu::table::{self, Instruction};
use crate::cpu::{CpuBus, CpuError, CpuInterruptSink};

/// Clocks consumed by reset and by the interrupt sequence.
const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    state: CpuState,
    remaining: u32,
    /// Decoded instruction waiting for its last base clock.
    decoded: Option<&'static Instruction>,
    total_cycles: u64,
    nmi_pending: bool,
    irq_line: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Load PC from the reset vector and charge the 7-clock reset latency.
    pub fn reset<B: CpuBus>(&mut self, bus: &mut B) {
        self.state.reset(bus);
        self.remaining = INTERRUPT_CYCLES;
        self.decoded = None;
        self.nmi_pending = false;
        self.irq_line = false;
    }

    // ---------------------------------------------------------------------
    // Register accessors
    // ---------------------------------------------------------------------
    pub fn a(&self) -> u8 {
        self.state.a
    }
    pub fn x(&self) -> u8 {
        self.state.x
    }
    pub fn y(&self) -> u8 {
        self.state.y
    }
    pub fn sp(&self) -> u8 {
        self.state.sp
    }
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    pub fn status(&self) -> u8 {
        self.state.status
    }
    pub fn set_pc(&mut self, v: u16) {
        self.state.pc = v;
    }
    pub fn get_flag(&self, mask: u8) -> bool {
        self.state.is_flag_set(mask)
    }
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        self.state.assign_flag(mask, on);
    }

    /// Clocks left on the instruction in flight. Zero means the next
    /// `cycle()` starts a new instruction.
    pub fn cycles_remaining(&self) -> u32 {
        self.remaining
    }

    pub fn at_instruction_boundary(&self) -> bool {
        self.remaining == 0
    }

    /// Every clock consumed since construction.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    // ---------------------------------------------------------------------
    // Stepping
    // ---------------------------------------------------------------------

    /// Consume one clock. Returns `Ok(true)` when the instruction in flight
    /// finished on this clock.
    pub fn cycle<B: CpuBus>(&mut self, bus: &mut B) -> Result<bool, CpuError> {
        if self.remaining == 0 {
            self.begin_instruction(bus)?;
        }
        if self.remaining == 1 {
            if let Some(ins) = self.decoded.take() {
                self.remaining += self.execute_decoded(ins, bus);
            }
        }
        self.remaining -= 1;
        self.total_cycles += 1;
        Ok(self.remaining == 0)
    }

    /// Run clocks until the current (or next) instruction completes and
    /// return how many were consumed.
    pub fn run_next_instruction<B: CpuBus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        let mut cycles = 0;
        loop {
            cycles += 1;
            if self.cycle(bus)? {
                return Ok(cycles);
            }
        }
    }

    fn begin_instruction<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, NMI_VECTOR);
            return Ok(());
        }
        if self.irq_line && !self.state.is_flag_set(IRQ_DISABLE) {
            self.interrupt(bus, IRQ_VECTOR);
            return Ok(());
        }

        let pc = self.state.pc;
        let opcode = bus.read(pc);
        let Some(ins) = table::lookup(opcode) else {
            log::warn!("Unknown opcode: {opcode:#04X} at PC: {pc:#06X}");
            return Err(CpuError::UnknownOpcode { opcode, pc });
        };
        self.state.advance_pc(1);
        self.decoded = Some(ins);
        self.remaining = ins.cycles as u32;
        Ok(())
    }

    /// Resolve and run `ins`; returns the penalty clocks it incurred.
    fn execute_decoded<B: CpuBus>(&mut self, ins: &Instruction, bus: &mut B) -> u32 {
        let operand = ins.mode.resolve(&mut self.state, bus);
        let mut extra = 0;
        if ins.page_penalty && operand.page_crossed {
            extra += 1;
        }
        extra + execute(ins.op, ins.mode, operand, &mut self.state, bus) as u32
    }

    fn interrupt<B: CpuBus>(&mut self, bus: &mut B, vector: u16) {
        let pc = self.state.pc;
        self.state.push_u16(bus, pc);
        let p = self.state.compose_status_for_push(false);
        self.state.push_u8(bus, p);
        self.state.assign_flag(IRQ_DISABLE, true);
        self.state.pc = bus.read_word(vector);
        self.remaining = INTERRUPT_CYCLES;
    }
}

impl CpuInterruptSink for Cpu {
    fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }
}
