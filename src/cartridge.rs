/*!
Cartridge: iNES loader, the shared ROM/RAM record and the mapper facade.

Loading:
- Parse the 16-byte iNES header: magic, PRG size (16 KiB units), CHR size
  (8 KiB units, 0 means 8 KiB CHR-RAM), flags 6/7 and the PRG-RAM size
  (8 KiB units, 0 means 8 KiB).
- Skip the 512-byte trainer when present; its content is not used.
- Allocate 4 KiB of cartridge nametable RAM when the four-screen bit is set.
- Build the board with `mappers::create` and run its `init` hook.

Every CPU/PPU access is forwarded to the board together with the
`CartridgeData` it operates on. A `None` read or `false` write means the
access was not claimed and belongs to the console.
*/

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::mapper::{Mapper, PpuRouting};
use crate::mappers;

pub const INES_MAGIC: &[u8; 4] = b"NES\x1A";
pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_UNIT: usize = 16 * 1024;
pub const CHR_UNIT: usize = 8 * 1024;
pub const PRG_RAM_UNIT: usize = 8 * 1024;
const FOUR_SCREEN_VRAM: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM image: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an iNES image (bad magic)")]
    BadMagic,
    #[error("iNES image truncated: {section} needs {needed} bytes, {available} available")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Decoded iNES header fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InesHeader {
    pub prg_rom_units: usize,
    pub chr_rom_units: usize,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub trainer: bool,
    pub mapper: u16,
    pub prg_ram_units: usize,
}

impl InesHeader {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                section: "header",
                needed: HEADER_LEN,
                available: data.len(),
            });
        }
        if &data[0..4] != INES_MAGIC {
            return Err(CartridgeError::BadMagic);
        }
        let flags6 = data[6];
        let flags7 = data[7];
        if flags7 & 0x0C == 0x08 {
            log::warn!("NES 2.0 header: extended fields ignored");
        }
        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        Ok(Self {
            prg_rom_units: data[4] as usize,
            chr_rom_units: data[5] as usize,
            mirroring,
            battery: flags6 & 0x02 != 0,
            trainer: flags6 & 0x04 != 0,
            mapper: ((flags7 & 0xF0) | (flags6 >> 4)) as u16,
            prg_ram_units: (data[8] as usize).max(1),
        })
    }
}

// ---------------------------------------------------------------------------
// Shared record
// ---------------------------------------------------------------------------

/// ROM/RAM buffers and board-independent state shared with the mapper.
#[derive(Clone, Debug)]
pub struct CartridgeData {
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
    pub prg_ram: Vec<u8>,
    /// Allocated (8 KiB) only when the image has no CHR-ROM.
    pub chr_ram: Vec<u8>,
    pub mirroring: Mirroring,
    pub battery: bool,
    /// Cartridge nametable RAM for four-screen boards.
    pub ext_vram: Option<Vec<u8>>,
    /// Routing signals from the most recent PPU access.
    pub routing: PpuRouting,
}

impl CartridgeData {
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, prg_ram_len: usize, mirroring: Mirroring) -> Self {
        let chr_ram = if chr_rom.is_empty() {
            vec![0; CHR_UNIT]
        } else {
            Vec::new()
        };
        let ext_vram = (mirroring == Mirroring::FourScreen).then(|| vec![0; FOUR_SCREEN_VRAM]);
        Self {
            prg_rom,
            chr_rom,
            prg_ram: vec![0; prg_ram_len],
            chr_ram,
            mirroring,
            battery: false,
            ext_vram,
            routing: PpuRouting::default(),
        }
    }

    /// Byte at `offset` into PRG-ROM, wrapped to its size.
    #[inline]
    pub fn prg_read(&self, offset: usize) -> Option<u8> {
        if self.prg_rom.is_empty() {
            return None;
        }
        Some(self.prg_rom[offset % self.prg_rom.len()])
    }

    /// $6000-$7FFF read; `None` without PRG-RAM.
    #[inline]
    pub fn prg_ram_read(&self, addr: u16) -> Option<u8> {
        if self.prg_ram.is_empty() {
            return None;
        }
        let idx = (addr as usize - 0x6000) % self.prg_ram.len();
        Some(self.prg_ram[idx])
    }

    #[inline]
    pub fn prg_ram_write(&mut self, addr: u16, value: u8) -> bool {
        if self.prg_ram.is_empty() {
            return false;
        }
        let idx = (addr as usize - 0x6000) % self.prg_ram.len();
        self.prg_ram[idx] = value;
        true
    }

    /// Size of the active CHR memory (RAM when present, else ROM).
    pub fn chr_len(&self) -> usize {
        if self.chr_ram.is_empty() {
            self.chr_rom.len()
        } else {
            self.chr_ram.len()
        }
    }

    #[inline]
    pub fn chr_read(&self, offset: usize) -> Option<u8> {
        let chr = if self.chr_ram.is_empty() {
            &self.chr_rom
        } else {
            &self.chr_ram
        };
        if chr.is_empty() {
            return None;
        }
        Some(chr[offset % chr.len()])
    }

    /// Only CHR-RAM accepts writes.
    #[inline]
    pub fn chr_write(&mut self, offset: usize, value: u8) -> bool {
        if self.chr_ram.is_empty() {
            return false;
        }
        let len = self.chr_ram.len();
        self.chr_ram[offset % len] = value;
        true
    }

    /// Set the routing signals for a $2000-$3EFF access. Returns the offset
    /// into `ext_vram` when the cartridge supplies the nametables itself.
    fn route_nametable(&mut self, addr: u16) -> Option<usize> {
        if self.ext_vram.is_some() {
            self.routing = PpuRouting::default();
            return Some((addr & 0x0FFF) as usize);
        }
        let vram_a10 = match self.mirroring {
            Mirroring::Horizontal => addr & 0x0800 != 0,
            Mirroring::Vertical | Mirroring::FourScreen => addr & 0x0400 != 0,
        };
        self.routing = PpuRouting {
            vram_ce: true,
            vram_a10,
        };
        None
    }

    pub fn nametable_read(&mut self, addr: u16) -> Option<u8> {
        let idx = self.route_nametable(addr)?;
        self.ext_vram.as_ref().map(|vram| vram[idx])
    }

    pub fn nametable_write(&mut self, addr: u16, value: u8) -> bool {
        match (self.route_nametable(addr), self.ext_vram.as_mut()) {
            (Some(idx), Some(vram)) => {
                vram[idx] = value;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Cartridge
// ---------------------------------------------------------------------------

pub struct Cartridge {
    data: CartridgeData,
    mapper: Box<dyn Mapper>,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper", &self.mapper.name())
            .field("mapper_id", &self.mapper.mapper_id())
            .field("mirroring", &self.data.mirroring)
            .field("prg_rom_len", &self.data.prg_rom.len())
            .field("chr_len", &self.data.chr_len())
            .field("prg_ram_len", &self.data.prg_ram.len())
            .finish()
    }
}

impl Cartridge {
    /// Pair a record with a board and run the board's `init` hook.
    pub fn new(mut data: CartridgeData, mut mapper: Box<dyn Mapper>) -> Self {
        mapper.init(&mut data);
        Self { data, mapper }
    }

    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(bytes)?;

        let mut offset = HEADER_LEN;
        if header.trainer {
            log::warn!("iNES trainer present; skipped");
            offset += TRAINER_LEN;
        }
        let prg_len = header.prg_rom_units * PRG_UNIT;
        let prg_rom = take(bytes, &mut offset, prg_len, "PRG-ROM")?.to_vec();
        let chr_len = header.chr_rom_units * CHR_UNIT;
        let chr_rom = take(bytes, &mut offset, chr_len, "CHR-ROM")?.to_vec();

        let mapper = mappers::create(header.mapper)
            .ok_or(CartridgeError::UnsupportedMapper(header.mapper))?;

        // PRG-RAM only exists on battery-backed boards.
        let prg_ram_len = if header.battery {
            header.prg_ram_units * PRG_RAM_UNIT
        } else {
            0
        };
        let mut data = CartridgeData::new(prg_rom, chr_rom, prg_ram_len, header.mirroring);
        data.battery = header.battery;

        log::info!(
            "loaded {} (mapper {}): {} KiB PRG-ROM, {} KiB CHR-{}, {} KiB PRG-RAM{}, {:?} mirroring",
            mapper.name(),
            header.mapper,
            prg_len / 1024,
            data.chr_len() / 1024,
            if data.chr_ram.is_empty() { "ROM" } else { "RAM" },
            data.prg_ram.len() / 1024,
            if data.battery { " (battery)" } else { "" },
            data.mirroring,
        );

        Ok(Self::new(data, mapper))
    }

    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    #[inline]
    pub fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(&mut self.data, addr)
    }

    #[inline]
    pub fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.cpu_write(&mut self.data, addr, value)
    }

    #[inline]
    pub fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.ppu_read(&mut self.data, addr)
    }

    #[inline]
    pub fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.ppu_write(&mut self.data, addr, value)
    }

    #[inline]
    pub fn cpu_clock(&mut self, ppu_addr: u16) {
        self.mapper.cpu_clock(&mut self.data, ppu_addr);
    }

    #[inline]
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    /// Routing signals from the last PPU access.
    #[inline]
    pub fn routing(&self) -> PpuRouting {
        self.data.routing
    }

    pub fn reset(&mut self) {
        log::debug!("resetting {} board", self.mapper.name());
        self.mapper.reset(&mut self.data);
    }

    pub fn mapper_id(&self) -> u16 {
        self.mapper.mapper_id()
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.data.mirroring
    }

    pub fn data(&self) -> &CartridgeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut CartridgeData {
        &mut self.data
    }
}

fn take<'a>(
    bytes: &'a [u8],
    offset: &mut usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    let end = *offset + len;
    let slice = bytes.get(*offset..end).ok_or(CartridgeError::Truncated {
        section,
        needed: end,
        available: bytes.len(),
    })?;
    *offset = end;
    Ok(slice)
}
