/*
Module: mappers

Concrete cartridge boards and the factory keyed on the iNES mapper number.

Implemented:
- NROM (0)
- UxROM (2)
- CNROM (3)
- MMC3 (4), including the scanline IRQ counter
- GxROM (66)
*/

pub mod cnrom;
pub mod gxrom;
pub mod mmc3;
pub mod nrom;
pub mod uxrom;

pub use cnrom::Cnrom;
pub use gxrom::Gxrom;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use uxrom::Uxrom;

use crate::mapper::Mapper;

/// Board for iNES mapper `id`, or `None` when unsupported.
pub fn create(id: u16) -> Option<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match id {
        0 => Box::new(Nrom),
        2 => Box::new(Uxrom::default()),
        3 => Box::new(Cnrom::default()),
        4 => Box::new(Mmc3::new()),
        66 => Box::new(Gxrom::default()),
        _ => return None,
    };
    Some(mapper)
}

#[cfg(test)]
mod tests {
    use super::create;

    #[test]
    fn factory_covers_supported_boards() {
        for id in [0u16, 2, 3, 4, 66] {
            let m = create(id).expect("supported");
            assert_eq!(m.mapper_id(), id, "{} reports its own number", m.name());
        }
        assert!(create(1).is_none());
        assert!(create(5).is_none());
    }
}
