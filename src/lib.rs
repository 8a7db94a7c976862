#![doc = r#"
famicore: cycle-stepped NES core.

Modules:
- cpu: 6502 engine (descriptor table, addressing, execution, interrupts)
- ppu: dot-accurate 2C02 with an RGBA frame buffer
- ppu_bus: memory trait the PPU fetches through
- mapper / mappers: cartridge board contract and the NROM, UxROM, CNROM,
  MMC3 and GxROM boards
- cartridge: iNES loading and the shared cartridge record
- controller: standard gamepad shift register
- bus: the console; owns everything and keeps the 3:1 PPU:CPU ratio
- screenshot (feature `screenshot`): PNG export

Typical use:
```ignore
let cart = famicore::Cartridge::from_ines_file("game.nes")?;
let mut bus = famicore::Bus::with_cartridge(cart);
bus.run_frame()?;
let rgba = bus.framebuffer();
```

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod mapper;
pub mod mappers;
pub mod ppu;
pub mod ppu_bus;
#[cfg(feature = "screenshot")]
pub mod screenshot;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError, Mirroring};
pub use controller::{Button, Gamepad};
pub use cpu::{Cpu, CpuError};
pub use ppu::{NES_HEIGHT, NES_WIDTH, Ppu};

#[cfg(test)]
pub mod test_utils;
