/*!
cpu::mod - Public façade for the 6502 CPU core.

Layout
======
    state.rs        - Architectural registers, flag masks, stack helpers.
    regs.rs         - `CpuRegs` trait used by the generic instruction helpers.
    addressing.rs   - `AddressingMode` and effective-address resolution.
    table.rs        - Immutable 256-entry instruction descriptor table.
    execute.rs      - `Operation` and the instruction semantics.
    core/           - `Cpu`: clock-by-clock stepping, reset, interrupts.

The CPU never touches memory directly. Every access goes through a type
implementing [`CpuBus`]; the system bus provides one, unit tests provide a
flat 64 KiB double.

Interrupt lines are driven through [`CpuInterruptSink`], which `Cpu`
implements. The PPU raises NMI through it and the bus forwards the
cartridge IRQ level through it.

Usage:
```ignore
use famicore::cpu::Cpu;

let mut cpu = Cpu::new();
cpu.reset(&mut bus);
loop {
    cpu.cycle(&mut bus)?;
}
```
*/

pub mod addressing;
pub mod core;
pub mod execute;
pub mod regs;
pub mod state;
pub mod table;

use thiserror::Error;

pub use crate::cpu::core::Cpu;
pub use crate::cpu::regs::CpuRegs;
pub use crate::cpu::state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};

/// Memory interface consumed by the CPU.
///
/// `write` reports whether some device claimed the access. The CPU ignores
/// the flag; it exists so composite buses can fall through.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8) -> bool;

    /// Little-endian word read at `addr`, `addr + 1`.
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Interrupt inputs of the CPU.
pub trait CpuInterruptSink {
    /// Latch a non-maskable interrupt edge.
    fn raise_nmi(&mut self);

    /// Drive the level-sensitive IRQ line.
    fn set_irq_line(&mut self, asserted: bool);

    fn raise_irq(&mut self) {
        self.set_irq_line(true);
    }
}

/// Fatal decode failure surfaced by [`Cpu::cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unknown opcode ${opcode:02X} at ${pc:04X}")]
    UnknownOpcode { opcode: u8, pc: u16 },
}
