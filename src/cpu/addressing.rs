/*!
addressing.rs - 6502 addressing modes and effective-address resolution.

Overview
========
`AddressingMode::resolve` consumes the operand bytes that follow the opcode
and yields the effective address plus a page-cross indicator. It never
applies cycle penalties itself; `Cpu::cycle` adds one when the descriptor
asks for it.

Hardware quirks reproduced here:
- zero-page indexing wraps inside page zero;
- `(zp,X)` and `(zp),Y` pointer fetches wrap inside page zero;
- `JMP ($xxFF)` reads its high byte from `$xx00`.

Caller Assumptions
==================
- PC points just past the opcode byte when `resolve` is invoked.
- PC is only advanced here (and by control-flow operations).
*/

use crate::cpu::CpuBus;
use crate::cpu::state::CpuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

/// Effective address produced by an addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Operand {
    pub addr: u16,
    pub page_crossed: bool,
}

impl Operand {
    #[inline]
    fn at(addr: u16) -> Self {
        Self {
            addr,
            page_crossed: false,
        }
    }

    #[inline]
    fn indexed(base: u16, index: u8) -> Self {
        let addr = base.wrapping_add(index as u16);
        Self {
            addr,
            page_crossed: pages_differ(base, addr),
        }
    }
}

#[inline]
pub(crate) fn pages_differ(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    #[cfg(test)]
    pub(crate) const fn operand_len(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
            _ => 1,
        }
    }

    pub fn resolve<B: CpuBus>(self, cpu: &mut CpuState, bus: &mut B) -> Operand {
        match self {
            Self::Implied | Self::Accumulator => Operand::default(),
            Self::Immediate => {
                let addr = cpu.pc;
                cpu.advance_pc(1);
                Operand::at(addr)
            }
            Self::ZeroPage => Operand::at(cpu.fetch_u8(bus) as u16),
            Self::ZeroPageX => Operand::at(cpu.fetch_u8(bus).wrapping_add(cpu.x) as u16),
            Self::ZeroPageY => Operand::at(cpu.fetch_u8(bus).wrapping_add(cpu.y) as u16),
            Self::Absolute => Operand::at(cpu.fetch_u16(bus)),
            Self::AbsoluteX => {
                let base = cpu.fetch_u16(bus);
                Operand::indexed(base, cpu.x)
            }
            Self::AbsoluteY => {
                let base = cpu.fetch_u16(bus);
                Operand::indexed(base, cpu.y)
            }
            Self::Indirect => {
                let ptr = cpu.fetch_u16(bus);
                Operand::at(read_word_indirect_bug(bus, ptr))
            }
            Self::IndexedIndirect => {
                let zp = cpu.fetch_u8(bus).wrapping_add(cpu.x);
                Operand::at(read_word_zp(bus, zp))
            }
            Self::IndirectIndexed => {
                let zp = cpu.fetch_u8(bus);
                let base = read_word_zp(bus, zp);
                Operand::indexed(base, cpu.y)
            }
            Self::Relative => {
                let offset = cpu.fetch_u8(bus) as i8;
                Operand::at(cpu.pc.wrapping_add(offset as u16))
            }
        }
    }
}

/// 16-bit pointer from zero page; the high byte wraps to $00.
#[inline]
pub(crate) fn read_word_zp<B: CpuBus>(bus: &mut B, base: u8) -> u16 {
    let lo = bus.read(base as u16) as u16;
    let hi = bus.read(base.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// JMP (indirect) page-wrap bug: the high byte never leaves the pointer's page.
#[inline]
pub(crate) fn read_word_indirect_bug<B: CpuBus>(bus: &mut B, addr: u16) -> u16 {
    let lo = bus.read(addr) as u16;
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = bus.read(hi_addr) as u16;
    (hi << 8) | lo
}
