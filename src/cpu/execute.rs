/*!
execute.rs - 6502 instruction semantics (ALU, flags, stack, RMW, branch).

Purpose
=======
`Operation` names every instruction the descriptor table can reference;
`execute` applies one to the CPU state once the addressing mode has
produced an effective address. Register-only helpers are generic over
`CpuRegs`; anything touching memory takes the bus as a generic `CpuBus`.

Read-modify-write instructions write the unmodified value back before the
result, as the 6502 does. Mappers that watch writes (MMC1-style serial
ports, MMC3 registers) see both.

Decimal mode is stored but ignored by ADC/SBC on the NES CPU.
*/

use crate::cpu::CpuBus;
use crate::cpu::addressing::{AddressingMode, Operand, pages_differ};
use crate::cpu::regs::CpuRegs;
use crate::cpu::state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, IRQ_VECTOR, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    // Load / store / transfer
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stack
    Pha,
    Php,
    Pla,
    Plp,
    // Arithmetic / logic
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Bit,
    Cmp,
    Cpx,
    Cpy,
    // Increment / decrement
    Inc,
    Dec,
    Inx,
    Iny,
    Dex,
    Dey,
    // Shifts
    Asl,
    Lsr,
    Rol,
    Ror,
    // Control flow
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
    Bcc,
    Bcs,
    Beq,
    Bne,
    Bmi,
    Bpl,
    Bvc,
    Bvs,
    // Flags
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,
    Nop,
    // Unofficial subset
    Lax,
    Sax,
    Dcp,
    Isc,
    Slo,
    Rla,
    Sre,
    Rra,
}

// ---------------------------------------------------------------------------
// Register / ALU helpers
// ---------------------------------------------------------------------------

#[inline]
pub(crate) fn lda<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_a(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn ldx<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_x(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn ldy<C: CpuRegs>(cpu: &mut C, v: u8) {
    cpu.set_y(v);
    cpu.update_zn(v);
}

#[inline]
pub(crate) fn and<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.a() & v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn ora<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.a() | v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn eor<C: CpuRegs>(cpu: &mut C, v: u8) {
    let r = cpu.a() ^ v;
    lda(cpu, r);
}

#[inline]
pub(crate) fn bit<C: CpuRegs>(cpu: &mut C, v: u8) {
    let a = cpu.a();
    cpu.assign_flag(ZERO, (a & v) == 0);
    cpu.assign_flag(NEGATIVE, (v & 0x80) != 0);
    cpu.assign_flag(OVERFLOW, (v & 0x40) != 0);
}

pub(crate) fn adc<C: CpuRegs>(cpu: &mut C, v: u8) {
    let a = cpu.a();
    let carry_in = cpu.is_flag_set(CARRY) as u16;
    let sum = a as u16 + v as u16 + carry_in;
    let result = sum as u8;
    cpu.update_carry(sum > 0xFF);
    cpu.update_overflow(((a ^ result) & (v ^ result) & 0x80) != 0);
    lda(cpu, result);
}

/// SBC is ADC of the one's complement.
#[inline]
pub(crate) fn sbc<C: CpuRegs>(cpu: &mut C, v: u8) {
    adc(cpu, !v);
}

#[inline]
pub(crate) fn compare<C: CpuRegs>(cpu: &mut C, reg: u8, v: u8) {
    cpu.update_carry(reg >= v);
    cpu.update_zn(reg.wrapping_sub(v));
}

#[inline]
pub(crate) fn asl<C: CpuRegs>(cpu: &mut C, v: u8) -> u8 {
    cpu.update_carry((v & 0x80) != 0);
    let r = v << 1;
    cpu.update_zn(r);
    r
}

#[inline]
pub(crate) fn lsr<C: CpuRegs>(cpu: &mut C, v: u8) -> u8 {
    cpu.update_carry((v & 0x01) != 0);
    let r = v >> 1;
    cpu.update_zn(r);
    r
}

#[inline]
pub(crate) fn rol<C: CpuRegs>(cpu: &mut C, v: u8) -> u8 {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    cpu.update_carry((v & 0x80) != 0);
    let r = (v << 1) | carry_in;
    cpu.update_zn(r);
    r
}

#[inline]
pub(crate) fn ror<C: CpuRegs>(cpu: &mut C, v: u8) -> u8 {
    let carry_in = (cpu.is_flag_set(CARRY) as u8) << 7;
    cpu.update_carry((v & 0x01) != 0);
    let r = (v >> 1) | carry_in;
    cpu.update_zn(r);
    r
}

/// Restore status from a pulled byte. B and the unused bit do not exist as
/// storage, so they keep their current values.
#[inline]
pub(crate) fn pull_status<C: CpuRegs>(cpu: &mut C, pulled: u8) {
    let keep = BREAK | UNUSED;
    let v = (pulled & !keep) | (cpu.status() & keep);
    cpu.set_status(v);
}

// ---------------------------------------------------------------------------
// Memory helpers
// ---------------------------------------------------------------------------

/// Read-modify-write with the 6502 dummy write of the original value.
#[inline]
fn rmw<B: CpuBus>(
    cpu: &mut CpuState,
    bus: &mut B,
    addr: u16,
    f: impl FnOnce(&mut CpuState, u8) -> u8,
) -> u8 {
    let old = bus.read(addr);
    bus.write(addr, old);
    let new = f(cpu, old);
    bus.write(addr, new);
    new
}

/// Shift/rotate either the accumulator or memory.
#[inline]
fn shift<B: CpuBus>(
    cpu: &mut CpuState,
    bus: &mut B,
    mode: AddressingMode,
    addr: u16,
    f: fn(&mut CpuState, u8) -> u8,
) {
    if mode == AddressingMode::Accumulator {
        let a = cpu.a;
        cpu.a = f(cpu, a);
    } else {
        rmw(cpu, bus, addr, f);
    }
}

#[inline]
fn branch(cpu: &mut CpuState, flag: u8, when_set: bool, target: u16) -> u8 {
    if cpu.is_flag_set(flag) != when_set {
        return 0;
    }
    let extra = 1 + pages_differ(cpu.pc, target) as u8;
    cpu.pc = target;
    extra
}

/// Apply `op` and return the cycles it adds beyond the descriptor's base
/// count (branches only).
pub(crate) fn execute<B: CpuBus>(
    op: Operation,
    mode: AddressingMode,
    operand: Operand,
    cpu: &mut CpuState,
    bus: &mut B,
) -> u8 {
    let addr = operand.addr;
    match op {
        Operation::Lda => {
            let v = bus.read(addr);
            lda(cpu, v);
        }
        Operation::Ldx => {
            let v = bus.read(addr);
            ldx(cpu, v);
        }
        Operation::Ldy => {
            let v = bus.read(addr);
            ldy(cpu, v);
        }
        Operation::Sta => {
            bus.write(addr, cpu.a);
        }
        Operation::Stx => {
            bus.write(addr, cpu.x);
        }
        Operation::Sty => {
            bus.write(addr, cpu.y);
        }
        Operation::Tax => {
            let a = cpu.a;
            ldx(cpu, a);
        }
        Operation::Tay => {
            let a = cpu.a;
            ldy(cpu, a);
        }
        Operation::Tsx => {
            let sp = cpu.sp;
            ldx(cpu, sp);
        }
        Operation::Txa => {
            let x = cpu.x;
            lda(cpu, x);
        }
        Operation::Txs => cpu.sp = cpu.x,
        Operation::Tya => {
            let y = cpu.y;
            lda(cpu, y);
        }

        Operation::Pha => {
            let a = cpu.a;
            cpu.push_u8(bus, a);
        }
        Operation::Php => {
            let p = cpu.compose_status_for_push(true);
            cpu.push_u8(bus, p);
        }
        Operation::Pla => {
            let v = cpu.pop_u8(bus);
            lda(cpu, v);
        }
        Operation::Plp => {
            let v = cpu.pop_u8(bus);
            pull_status(cpu, v);
        }

        Operation::Adc => {
            let v = bus.read(addr);
            adc(cpu, v);
        }
        Operation::Sbc => {
            let v = bus.read(addr);
            sbc(cpu, v);
        }
        Operation::And => {
            let v = bus.read(addr);
            and(cpu, v);
        }
        Operation::Ora => {
            let v = bus.read(addr);
            ora(cpu, v);
        }
        Operation::Eor => {
            let v = bus.read(addr);
            eor(cpu, v);
        }
        Operation::Bit => {
            let v = bus.read(addr);
            bit(cpu, v);
        }
        Operation::Cmp => {
            let (a, v) = (cpu.a, bus.read(addr));
            compare(cpu, a, v);
        }
        Operation::Cpx => {
            let (x, v) = (cpu.x, bus.read(addr));
            compare(cpu, x, v);
        }
        Operation::Cpy => {
            let (y, v) = (cpu.y, bus.read(addr));
            compare(cpu, y, v);
        }

        Operation::Inc => {
            rmw(cpu, bus, addr, |c, v| {
                let r = v.wrapping_add(1);
                c.update_zn(r);
                r
            });
        }
        Operation::Dec => {
            rmw(cpu, bus, addr, |c, v| {
                let r = v.wrapping_sub(1);
                c.update_zn(r);
                r
            });
        }
        Operation::Inx => {
            let x = cpu.x.wrapping_add(1);
            ldx(cpu, x);
        }
        Operation::Iny => {
            let y = cpu.y.wrapping_add(1);
            ldy(cpu, y);
        }
        Operation::Dex => {
            let x = cpu.x.wrapping_sub(1);
            ldx(cpu, x);
        }
        Operation::Dey => {
            let y = cpu.y.wrapping_sub(1);
            ldy(cpu, y);
        }

        Operation::Asl => shift(cpu, bus, mode, addr, asl),
        Operation::Lsr => shift(cpu, bus, mode, addr, lsr),
        Operation::Rol => shift(cpu, bus, mode, addr, rol),
        Operation::Ror => shift(cpu, bus, mode, addr, ror),

        Operation::Jmp => cpu.pc = addr,
        Operation::Jsr => {
            let ret = cpu.pc.wrapping_sub(1);
            cpu.push_u16(bus, ret);
            cpu.pc = addr;
        }
        Operation::Rts => {
            cpu.pc = cpu.pop_u16(bus).wrapping_add(1);
        }
        Operation::Rti => {
            let p = cpu.pop_u8(bus);
            pull_status(cpu, p);
            cpu.pc = cpu.pop_u16(bus);
        }
        Operation::Brk => {
            // Signature byte after BRK is skipped.
            cpu.advance_pc(1);
            let pc = cpu.pc;
            cpu.push_u16(bus, pc);
            let p = cpu.compose_status_for_push(true);
            cpu.push_u8(bus, p);
            cpu.assign_flag(IRQ_DISABLE, true);
            cpu.pc = bus.read_word(IRQ_VECTOR);
        }
        Operation::Bcc => return branch(cpu, CARRY, false, addr),
        Operation::Bcs => return branch(cpu, CARRY, true, addr),
        Operation::Beq => return branch(cpu, ZERO, true, addr),
        Operation::Bne => return branch(cpu, ZERO, false, addr),
        Operation::Bmi => return branch(cpu, NEGATIVE, true, addr),
        Operation::Bpl => return branch(cpu, NEGATIVE, false, addr),
        Operation::Bvc => return branch(cpu, OVERFLOW, false, addr),
        Operation::Bvs => return branch(cpu, OVERFLOW, true, addr),

        Operation::Clc => cpu.assign_flag(CARRY, false),
        Operation::Cld => cpu.assign_flag(DECIMAL, false),
        Operation::Cli => cpu.assign_flag(IRQ_DISABLE, false),
        Operation::Clv => cpu.assign_flag(OVERFLOW, false),
        Operation::Sec => cpu.assign_flag(CARRY, true),
        Operation::Sed => cpu.assign_flag(DECIMAL, true),
        Operation::Sei => cpu.assign_flag(IRQ_DISABLE, true),
        Operation::Nop => {
            if !matches!(mode, AddressingMode::Implied | AddressingMode::Immediate) {
                bus.read(addr);
            }
        }

        Operation::Lax => {
            let v = bus.read(addr);
            lda(cpu, v);
            cpu.x = v;
        }
        Operation::Sax => {
            bus.write(addr, cpu.a & cpu.x);
        }
        Operation::Dcp => {
            let m = rmw(cpu, bus, addr, |_, v| v.wrapping_sub(1));
            let a = cpu.a;
            compare(cpu, a, m);
        }
        Operation::Isc => {
            let m = rmw(cpu, bus, addr, |_, v| v.wrapping_add(1));
            sbc(cpu, m);
        }
        Operation::Slo => {
            let m = rmw(cpu, bus, addr, asl::<CpuState>);
            ora(cpu, m);
        }
        Operation::Rla => {
            let m = rmw(cpu, bus, addr, rol::<CpuState>);
            and(cpu, m);
        }
        Operation::Sre => {
            let m = rmw(cpu, bus, addr, lsr::<CpuState>);
            eor(cpu, m);
        }
        Operation::Rra => {
            let m = rmw(cpu, bus, addr, ror::<CpuState>);
            adc(cpu, m);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_sets_overflow_on_signed_wrap() {
        let mut s = CpuState::new();
        s.a = 0x50;
        adc(&mut s, 0x50);
        assert_eq!(s.a, 0xA0);
        assert!(s.is_flag_set(OVERFLOW), "0x50 + 0x50 overflows signed range");
        assert!(!s.is_flag_set(CARRY));
        assert!(s.is_flag_set(NEGATIVE));
    }

    #[test]
    fn sbc_borrow_semantics() {
        let mut s = CpuState::new();
        s.a = 0x10;
        s.assign_flag(CARRY, true);
        sbc(&mut s, 0x20);
        assert_eq!(s.a, 0xF0);
        assert!(!s.is_flag_set(CARRY), "borrow clears carry");

        s.a = 0x05;
        s.assign_flag(CARRY, false);
        sbc(&mut s, 0x01);
        assert_eq!(s.a, 0x03, "clear carry subtracts one more");
        assert!(s.is_flag_set(CARRY));
    }

    #[test]
    fn compare_sets_carry_when_greater_or_equal() {
        let mut s = CpuState::new();
        compare(&mut s, 0x40, 0x40);
        assert!(s.is_flag_set(CARRY));
        assert!(s.is_flag_set(ZERO));
        compare(&mut s, 0x10, 0x20);
        assert!(!s.is_flag_set(CARRY));
        assert!(s.is_flag_set(NEGATIVE));
    }

    #[test]
    fn rotate_through_carry() {
        let mut s = CpuState::new();
        s.assign_flag(CARRY, true);
        assert_eq!(rol(&mut s, 0x80), 0x01);
        assert!(s.is_flag_set(CARRY));
        assert_eq!(ror(&mut s, 0x00), 0x80);
        assert!(!s.is_flag_set(CARRY));
    }

    #[test]
    fn pull_status_preserves_break_and_unused() {
        let mut s = CpuState::new();
        s.status = UNUSED;
        pull_status(&mut s, 0xFF & !UNUSED);
        assert_eq!(s.status & BREAK, 0, "B is not stored by PLP");
        assert_ne!(s.status & UNUSED, 0);
        assert!(s.is_flag_set(CARRY | NEGATIVE));
    }
}
