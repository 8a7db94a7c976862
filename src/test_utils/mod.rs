//! Builders for synthetic iNES (v1) images used across the test suite.
//!
//! Header layout written here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG-ROM size in 16 KiB units
//! - byte 5 = CHR-ROM size in 8 KiB units (0 => CHR-RAM)
//! - byte 6 = flags 6 (mirroring, battery, trainer, four-screen, mapper low nibble)
//! - byte 7 = flags 7 (mapper high nibble)
//! - byte 8 = PRG-RAM size in 8 KiB units (0 => 8 KiB)
//!
//! PRG is filled with $AA and CHR with $CC unless the caller patches it.

use crate::cartridge::{CHR_UNIT, HEADER_LEN, PRG_UNIT};

/// Build an iNES image for `mapper`. The mapper number is split into the
/// flags 6 / flags 7 nibbles; the low nibble of `flags6` is kept as given.
pub fn build_ines(
    mapper: u8,
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        HEADER_LEN + trainer.map_or(0, |_| 512) + prg_16k * PRG_UNIT + chr_8k * CHR_UNIT,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push((flags6 & 0x0F) | (mapper << 4));
    bytes.push(mapper & 0xF0);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.resize(bytes.len() + prg_16k * PRG_UNIT, 0xAA);
    bytes.resize(bytes.len() + chr_8k * CHR_UNIT, 0xCC);
    bytes
}

/// Battery flag in flags 6.
pub const FLAGS6_BATTERY: u8 = 0b0000_0010;

/// NROM-128 image (one 16 KiB PRG bank, CHR-RAM, 8 KiB battery-backed
/// PRG-RAM) with `prg` placed at $8000 and vectors set to
/// `(reset, nmi, irq)`, all $8000 by default.
pub fn build_nrom_with_prg(prg: &[u8], vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(prg.len() <= PRG_UNIT - 6, "program must leave room for the vectors");

    let mut rom = build_ines(0, 1, 0, FLAGS6_BATTERY, 1, None);
    let bank = &mut rom[HEADER_LEN..HEADER_LEN + PRG_UNIT];
    bank[..prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(bank, reset, nmi, irq);
    rom
}

/// Write NMI / RESET / IRQ vectors into the last six bytes of a 16 KiB or
/// 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    assert!(
        prg.len() == PRG_UNIT || prg.len() == 2 * PRG_UNIT,
        "unsupported PRG length {}",
        prg.len()
    );
    let base = prg.len() - 6;
    prg[base..base + 2].copy_from_slice(&nmi.to_le_bytes());
    prg[base + 2..base + 4].copy_from_slice(&reset.to_le_bytes());
    prg[base + 4..base + 6].copy_from_slice(&irq.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_header_and_payload() {
        let rom = build_ines(0x12, 2, 1, 0x01, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(&rom[4..9], &[2, 1, 0x21, 0x10, 1]);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
        assert_eq!(rom[16], 0xAA);
        assert_eq!(rom[rom.len() - 1], 0xCC);
    }

    #[test]
    fn writes_vectors_for_32k_prg() {
        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn nrom_program_lands_at_bank_start() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], Some((0x8000, 0x9000, 0xA000)));
        assert_eq!(&rom[16..18], &[0xA9, 0x01]);
        assert_eq!(rom[6] & FLAGS6_BATTERY, FLAGS6_BATTERY, "battery bit set");
        assert_eq!(rom[8], 1, "one 8 KiB PRG-RAM unit");
        assert_eq!(&rom[16 + 0x3FFA..16 + 0x4000], &[0x00, 0x90, 0x00, 0x80, 0x00, 0xA0]);
    }
}
