/*!
ppu_bus: Trait decoupling the PPU from the concrete system bus.

Address Space Expectations (mirroring applied by the implementor):
- 0x0000-0x1FFF : Pattern tables (CHR ROM/RAM via mapper)
- 0x2000-0x2FFF : Nametables (console VRAM or cartridge VRAM)
- 0x3000-0x3EFF : Mirrors of 0x2000-0x2EFF

Palette RAM ($3F00-$3FFF) never reaches the bus; the PPU services it
internally. Reads may have side effects (MMC3 watches A12), hence
`&mut self`.
*/

/// Memory interface the PPU depends on for every fetch and PPUDATA access.
pub trait PpuBus {
    /// Read from the 14-bit PPU address space.
    fn ppu_read(&mut self, addr: u16) -> u8;

    /// Write to the 14-bit PPU address space. Returns whether a device
    /// accepted the byte (CHR-ROM ignores writes).
    fn ppu_write(&mut self, addr: u16, value: u8) -> bool;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::PpuBus;

    /// Flat PPU space: $0000-$2FFF backed 1:1 (four distinct nametables),
    /// $3000-$3EFF mirrors $2000-$2EFF.
    pub(crate) struct MockPpuBus {
        pub mem: Vec<u8>,
        pub reads: usize,
    }

    impl Default for MockPpuBus {
        fn default() -> Self {
            Self {
                mem: vec![0; 0x3000],
                reads: 0,
            }
        }
    }

    impl MockPpuBus {
        pub fn new() -> Self {
            Self::default()
        }

        fn index(addr: u16) -> usize {
            let a = addr & 0x3FFF;
            let a = if a >= 0x3000 { a - 0x1000 } else { a };
            a as usize
        }
    }

    impl PpuBus for MockPpuBus {
        fn ppu_read(&mut self, addr: u16) -> u8 {
            self.reads += 1;
            self.mem[Self::index(addr)]
        }

        fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
            self.mem[Self::index(addr)] = value;
            true
        }
    }

    #[test]
    fn nametable_mirror_into_3000_region() {
        let mut mock = MockPpuBus::new();
        mock.ppu_write(0x2000, 0x55);
        assert_eq!(mock.ppu_read(0x3000), 0x55);
        assert_eq!(mock.reads, 1);
    }
}
