/*!
table.rs - Immutable 256-entry instruction descriptor table.

Design
======
- Table: `[Option<Instruction>; 256]`, built once in a const block.
- Each entry names an `Operation`, an `AddressingMode`, the base cycle
  count and whether a page cross on the indexed operand costs one more
  cycle.
- `None` marks opcodes the core does not implement (KIL/JAM and the
  unstable unofficial group). Executing one is a decode failure.

Branch penalties are not encoded here; the branch operations report them.
*/

use crate::cpu::addressing::AddressingMode::{self, *};
use crate::cpu::execute::Operation::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Operation,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub page_penalty: bool,
}

const fn ins(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        page_penalty: false,
    })
}

/// Entry that costs an extra cycle when indexing crosses a page.
const fn ins_pb(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        page_penalty: true,
    })
}

static OPCODES: [Option<Instruction>; 256] = {
    let mut t: [Option<Instruction>; 256] = [None; 256];
    t[0x00] = ins(Brk, Implied, 7);
    t[0x01] = ins(Ora, IndexedIndirect, 6);
    t[0x03] = ins(Slo, IndexedIndirect, 8);
    t[0x04] = ins(Nop, ZeroPage, 3);
    t[0x05] = ins(Ora, ZeroPage, 3);
    t[0x06] = ins(Asl, ZeroPage, 5);
    t[0x07] = ins(Slo, ZeroPage, 5);
    t[0x08] = ins(Php, Implied, 3);
    t[0x09] = ins(Ora, Immediate, 2);
    t[0x0A] = ins(Asl, Accumulator, 2);
    t[0x0C] = ins(Nop, Absolute, 4);
    t[0x0D] = ins(Ora, Absolute, 4);
    t[0x0E] = ins(Asl, Absolute, 6);
    t[0x0F] = ins(Slo, Absolute, 6);
    t[0x10] = ins(Bpl, Relative, 2);
    t[0x11] = ins_pb(Ora, IndirectIndexed, 5);
    t[0x13] = ins(Slo, IndirectIndexed, 8);
    t[0x14] = ins(Nop, ZeroPageX, 4);
    t[0x15] = ins(Ora, ZeroPageX, 4);
    t[0x16] = ins(Asl, ZeroPageX, 6);
    t[0x17] = ins(Slo, ZeroPageX, 6);
    t[0x18] = ins(Clc, Implied, 2);
    t[0x19] = ins_pb(Ora, AbsoluteY, 4);
    t[0x1A] = ins(Nop, Implied, 2);
    t[0x1B] = ins(Slo, AbsoluteY, 7);
    t[0x1C] = ins_pb(Nop, AbsoluteX, 4);
    t[0x1D] = ins_pb(Ora, AbsoluteX, 4);
    t[0x1E] = ins(Asl, AbsoluteX, 7);
    t[0x1F] = ins(Slo, AbsoluteX, 7);
    t[0x20] = ins(Jsr, Absolute, 6);
    t[0x21] = ins(And, IndexedIndirect, 6);
    t[0x23] = ins(Rla, IndexedIndirect, 8);
    t[0x24] = ins(Bit, ZeroPage, 3);
    t[0x25] = ins(And, ZeroPage, 3);
    t[0x26] = ins(Rol, ZeroPage, 5);
    t[0x27] = ins(Rla, ZeroPage, 5);
    t[0x28] = ins(Plp, Implied, 4);
    t[0x29] = ins(And, Immediate, 2);
    t[0x2A] = ins(Rol, Accumulator, 2);
    t[0x2C] = ins(Bit, Absolute, 4);
    t[0x2D] = ins(And, Absolute, 4);
    t[0x2E] = ins(Rol, Absolute, 6);
    t[0x2F] = ins(Rla, Absolute, 6);
    t[0x30] = ins(Bmi, Relative, 2);
    t[0x31] = ins_pb(And, IndirectIndexed, 5);
    t[0x33] = ins(Rla, IndirectIndexed, 8);
    t[0x34] = ins(Nop, ZeroPageX, 4);
    t[0x35] = ins(And, ZeroPageX, 4);
    t[0x36] = ins(Rol, ZeroPageX, 6);
    t[0x37] = ins(Rla, ZeroPageX, 6);
    t[0x38] = ins(Sec, Implied, 2);
    t[0x39] = ins_pb(And, AbsoluteY, 4);
    t[0x3A] = ins(Nop, Implied, 2);
    t[0x3B] = ins(Rla, AbsoluteY, 7);
    t[0x3C] = ins_pb(Nop, AbsoluteX, 4);
    t[0x3D] = ins_pb(And, AbsoluteX, 4);
    t[0x3E] = ins(Rol, AbsoluteX, 7);
    t[0x3F] = ins(Rla, AbsoluteX, 7);
    t[0x40] = ins(Rti, Implied, 6);
    t[0x41] = ins(Eor, IndexedIndirect, 6);
    t[0x43] = ins(Sre, IndexedIndirect, 8);
    t[0x44] = ins(Nop, ZeroPage, 3);
    t[0x45] = ins(Eor, ZeroPage, 3);
    t[0x46] = ins(Lsr, ZeroPage, 5);
    t[0x47] = ins(Sre, ZeroPage, 5);
    t[0x48] = ins(Pha, Implied, 3);
    t[0x49] = ins(Eor, Immediate, 2);
    t[0x4A] = ins(Lsr, Accumulator, 2);
    t[0x4C] = ins(Jmp, Absolute, 3);
    t[0x4D] = ins(Eor, Absolute, 4);
    t[0x4E] = ins(Lsr, Absolute, 6);
    t[0x4F] = ins(Sre, Absolute, 6);
    t[0x50] = ins(Bvc, Relative, 2);
    t[0x51] = ins_pb(Eor, IndirectIndexed, 5);
    t[0x53] = ins(Sre, IndirectIndexed, 8);
    t[0x54] = ins(Nop, ZeroPageX, 4);
    t[0x55] = ins(Eor, ZeroPageX, 4);
    t[0x56] = ins(Lsr, ZeroPageX, 6);
    t[0x57] = ins(Sre, ZeroPageX, 6);
    t[0x58] = ins(Cli, Implied, 2);
    t[0x59] = ins_pb(Eor, AbsoluteY, 4);
    t[0x5A] = ins(Nop, Implied, 2);
    t[0x5B] = ins(Sre, AbsoluteY, 7);
    t[0x5C] = ins_pb(Nop, AbsoluteX, 4);
    t[0x5D] = ins_pb(Eor, AbsoluteX, 4);
    t[0x5E] = ins(Lsr, AbsoluteX, 7);
    t[0x5F] = ins(Sre, AbsoluteX, 7);
    t[0x60] = ins(Rts, Implied, 6);
    t[0x61] = ins(Adc, IndexedIndirect, 6);
    t[0x63] = ins(Rra, IndexedIndirect, 8);
    t[0x64] = ins(Nop, ZeroPage, 3);
    t[0x65] = ins(Adc, ZeroPage, 3);
    t[0x66] = ins(Ror, ZeroPage, 5);
    t[0x67] = ins(Rra, ZeroPage, 5);
    t[0x68] = ins(Pla, Implied, 4);
    t[0x69] = ins(Adc, Immediate, 2);
    t[0x6A] = ins(Ror, Accumulator, 2);
    t[0x6C] = ins(Jmp, Indirect, 5);
    t[0x6D] = ins(Adc, Absolute, 4);
    t[0x6E] = ins(Ror, Absolute, 6);
    t[0x6F] = ins(Rra, Absolute, 6);
    t[0x70] = ins(Bvs, Relative, 2);
    t[0x71] = ins_pb(Adc, IndirectIndexed, 5);
    t[0x73] = ins(Rra, IndirectIndexed, 8);
    t[0x74] = ins(Nop, ZeroPageX, 4);
    t[0x75] = ins(Adc, ZeroPageX, 4);
    t[0x76] = ins(Ror, ZeroPageX, 6);
    t[0x77] = ins(Rra, ZeroPageX, 6);
    t[0x78] = ins(Sei, Implied, 2);
    t[0x79] = ins_pb(Adc, AbsoluteY, 4);
    t[0x7A] = ins(Nop, Implied, 2);
    t[0x7B] = ins(Rra, AbsoluteY, 7);
    t[0x7C] = ins_pb(Nop, AbsoluteX, 4);
    t[0x7D] = ins_pb(Adc, AbsoluteX, 4);
    t[0x7E] = ins(Ror, AbsoluteX, 7);
    t[0x7F] = ins(Rra, AbsoluteX, 7);
    t[0x80] = ins(Nop, Immediate, 2);
    t[0x81] = ins(Sta, IndexedIndirect, 6);
    t[0x82] = ins(Nop, Immediate, 2);
    t[0x83] = ins(Sax, IndexedIndirect, 6);
    t[0x84] = ins(Sty, ZeroPage, 3);
    t[0x85] = ins(Sta, ZeroPage, 3);
    t[0x86] = ins(Stx, ZeroPage, 3);
    t[0x87] = ins(Sax, ZeroPage, 3);
    t[0x88] = ins(Dey, Implied, 2);
    t[0x89] = ins(Nop, Immediate, 2);
    t[0x8A] = ins(Txa, Implied, 2);
    t[0x8C] = ins(Sty, Absolute, 4);
    t[0x8D] = ins(Sta, Absolute, 4);
    t[0x8E] = ins(Stx, Absolute, 4);
    t[0x8F] = ins(Sax, Absolute, 4);
    t[0x90] = ins(Bcc, Relative, 2);
    t[0x91] = ins(Sta, IndirectIndexed, 6);
    t[0x94] = ins(Sty, ZeroPageX, 4);
    t[0x95] = ins(Sta, ZeroPageX, 4);
    t[0x96] = ins(Stx, ZeroPageY, 4);
    t[0x97] = ins(Sax, ZeroPageY, 4);
    t[0x98] = ins(Tya, Implied, 2);
    t[0x99] = ins(Sta, AbsoluteY, 5);
    t[0x9A] = ins(Txs, Implied, 2);
    t[0x9D] = ins(Sta, AbsoluteX, 5);
    t[0xA0] = ins(Ldy, Immediate, 2);
    t[0xA1] = ins(Lda, IndexedIndirect, 6);
    t[0xA2] = ins(Ldx, Immediate, 2);
    t[0xA3] = ins(Lax, IndexedIndirect, 6);
    t[0xA4] = ins(Ldy, ZeroPage, 3);
    t[0xA5] = ins(Lda, ZeroPage, 3);
    t[0xA6] = ins(Ldx, ZeroPage, 3);
    t[0xA7] = ins(Lax, ZeroPage, 3);
    t[0xA8] = ins(Tay, Implied, 2);
    t[0xA9] = ins(Lda, Immediate, 2);
    t[0xAA] = ins(Tax, Implied, 2);
    t[0xAC] = ins(Ldy, Absolute, 4);
    t[0xAD] = ins(Lda, Absolute, 4);
    t[0xAE] = ins(Ldx, Absolute, 4);
    t[0xAF] = ins(Lax, Absolute, 4);
    t[0xB0] = ins(Bcs, Relative, 2);
    t[0xB1] = ins_pb(Lda, IndirectIndexed, 5);
    t[0xB3] = ins_pb(Lax, IndirectIndexed, 5);
    t[0xB4] = ins(Ldy, ZeroPageX, 4);
    t[0xB5] = ins(Lda, ZeroPageX, 4);
    t[0xB6] = ins(Ldx, ZeroPageY, 4);
    t[0xB7] = ins(Lax, ZeroPageY, 4);
    t[0xB8] = ins(Clv, Implied, 2);
    t[0xB9] = ins_pb(Lda, AbsoluteY, 4);
    t[0xBA] = ins(Tsx, Implied, 2);
    t[0xBC] = ins_pb(Ldy, AbsoluteX, 4);
    t[0xBD] = ins_pb(Lda, AbsoluteX, 4);
    t[0xBE] = ins_pb(Ldx, AbsoluteY, 4);
    t[0xBF] = ins_pb(Lax, AbsoluteY, 4);
    t[0xC0] = ins(Cpy, Immediate, 2);
    t[0xC1] = ins(Cmp, IndexedIndirect, 6);
    t[0xC2] = ins(Nop, Immediate, 2);
    t[0xC3] = ins(Dcp, IndexedIndirect, 8);
    t[0xC4] = ins(Cpy, ZeroPage, 3);
    t[0xC5] = ins(Cmp, ZeroPage, 3);
    t[0xC6] = ins(Dec, ZeroPage, 5);
    t[0xC7] = ins(Dcp, ZeroPage, 5);
    t[0xC8] = ins(Iny, Implied, 2);
    t[0xC9] = ins(Cmp, Immediate, 2);
    t[0xCA] = ins(Dex, Implied, 2);
    t[0xCC] = ins(Cpy, Absolute, 4);
    t[0xCD] = ins(Cmp, Absolute, 4);
    t[0xCE] = ins(Dec, Absolute, 6);
    t[0xCF] = ins(Dcp, Absolute, 6);
    t[0xD0] = ins(Bne, Relative, 2);
    t[0xD1] = ins_pb(Cmp, IndirectIndexed, 5);
    t[0xD3] = ins(Dcp, IndirectIndexed, 8);
    t[0xD4] = ins(Nop, ZeroPageX, 4);
    t[0xD5] = ins(Cmp, ZeroPageX, 4);
    t[0xD6] = ins(Dec, ZeroPageX, 6);
    t[0xD7] = ins(Dcp, ZeroPageX, 6);
    t[0xD8] = ins(Cld, Implied, 2);
    t[0xD9] = ins_pb(Cmp, AbsoluteY, 4);
    t[0xDA] = ins(Nop, Implied, 2);
    t[0xDB] = ins(Dcp, AbsoluteY, 7);
    t[0xDC] = ins_pb(Nop, AbsoluteX, 4);
    t[0xDD] = ins_pb(Cmp, AbsoluteX, 4);
    t[0xDE] = ins(Dec, AbsoluteX, 7);
    t[0xDF] = ins(Dcp, AbsoluteX, 7);
    t[0xE0] = ins(Cpx, Immediate, 2);
    t[0xE1] = ins(Sbc, IndexedIndirect, 6);
    t[0xE2] = ins(Nop, Immediate, 2);
    t[0xE3] = ins(Isc, IndexedIndirect, 8);
    t[0xE4] = ins(Cpx, ZeroPage, 3);
    t[0xE5] = ins(Sbc, ZeroPage, 3);
    t[0xE6] = ins(Inc, ZeroPage, 5);
    t[0xE7] = ins(Isc, ZeroPage, 5);
    t[0xE8] = ins(Inx, Implied, 2);
    t[0xE9] = ins(Sbc, Immediate, 2);
    t[0xEA] = ins(Nop, Implied, 2);
    t[0xEB] = ins(Sbc, Immediate, 2);
    t[0xEC] = ins(Cpx, Absolute, 4);
    t[0xED] = ins(Sbc, Absolute, 4);
    t[0xEE] = ins(Inc, Absolute, 6);
    t[0xEF] = ins(Isc, Absolute, 6);
    t[0xF0] = ins(Beq, Relative, 2);
    t[0xF1] = ins_pb(Sbc, IndirectIndexed, 5);
    t[0xF3] = ins(Isc, IndirectIndexed, 8);
    t[0xF4] = ins(Nop, ZeroPageX, 4);
    t[0xF5] = ins(Sbc, ZeroPageX, 4);
    t[0xF6] = ins(Inc, ZeroPageX, 6);
    t[0xF7] = ins(Isc, ZeroPageX, 6);
    t[0xF8] = ins(Sed, Implied, 2);
    t[0xF9] = ins_pb(Sbc, AbsoluteY, 4);
    t[0xFA] = ins(Nop, Implied, 2);
    t[0xFB] = ins(Isc, AbsoluteY, 7);
    t[0xFC] = ins_pb(Nop, AbsoluteX, 4);
    t[0xFD] = ins_pb(Sbc, AbsoluteX, 4);
    t[0xFE] = ins(Inc, AbsoluteX, 7);
    t[0xFF] = ins(Isc, AbsoluteX, 7);
    t
};

/// Descriptor for `opcode`, or `None` when it is unmapped.
#[inline]
pub fn lookup(opcode: u8) -> Option<&'static Instruction> {
    OPCODES[opcode as usize].as_ref()
}
