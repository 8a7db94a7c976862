/*!
views: borrow-split adapters the CPU and PPU run against.

The `Bus` owns every device, so neither processor can take `&mut Bus`
while the bus is clocking it. Instead the bus hands each processor a
view built from disjoint field borrows:

- `CpuBusView` implements `CpuBus`: RAM, PPU registers, gamepads, the OAM
  DMA request slot and the cartridge.
- `PpuBusView` implements `PpuBus`: console VRAM and the cartridge.

Both consult the cartridge first and only fall back to console memory when
the access is not claimed.
*/

use crate::cartridge::Cartridge;
use crate::controller::Gamepad;
use crate::cpu::CpuBus;
use crate::ppu::Ppu;
use crate::ppu_bus::PpuBus;

pub(crate) type Vram = [[u8; 0x400]; 2];

pub(crate) const OAM_DMA: u16 = 0x4014;
pub(crate) const JOY1: u16 = 0x4016;
pub(crate) const JOY2: u16 = 0x4017;

// ---------------------------------------------------------------------------
// PPU side
// ---------------------------------------------------------------------------

pub(crate) struct PpuBusView<'a> {
    vram: &'a mut Vram,
    cart: Option<&'a mut Cartridge>,
}

impl<'a> PpuBusView<'a> {
    #[inline]
    pub(crate) fn from_parts(vram: &'a mut Vram, cart: Option<&'a mut Cartridge>) -> Self {
        Self { vram, cart }
    }

    /// Console VRAM cell for an unclaimed access, if the routing enables it.
    /// Without a cartridge nametables fall back to vertical layout.
    fn vram_cell(&mut self, addr: u16) -> Option<&mut u8> {
        let bank = match self.cart.as_deref() {
            Some(cart) => {
                let routing = cart.routing();
                if !routing.vram_ce {
                    return None;
                }
                routing.vram_a10 as usize
            }
            None if (0x2000..0x3F00).contains(&addr) => ((addr >> 10) & 1) as usize,
            None => return None,
        };
        Some(&mut self.vram[bank][(addr & 0x03FF) as usize])
    }
}

impl PpuBus for PpuBusView<'_> {
    fn ppu_read(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if let Some(cart) = self.cart.as_deref_mut() {
            if let Some(value) = cart.ppu_read(addr) {
                return value;
            }
        }
        self.vram_cell(addr).map_or(0, |cell| *cell)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        let addr = addr & 0x3FFF;
        if let Some(cart) = self.cart.as_deref_mut() {
            if cart.ppu_write(addr, value) {
                return true;
            }
        }
        match self.vram_cell(addr) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// CPU side
// ---------------------------------------------------------------------------

pub(crate) struct CpuBusView<'a> {
    ram: &'a mut [u8; 0x800],
    vram: &'a mut Vram,
    ppu: &'a mut Ppu,
    cart: Option<&'a mut Cartridge>,
    pads: &'a mut [Gamepad; 2],
    dma_request: &'a mut Option<u8>,
}

impl<'a> CpuBusView<'a> {
    #[inline]
    pub(crate) fn from_parts(
        ram: &'a mut [u8; 0x800],
        vram: &'a mut Vram,
        ppu: &'a mut Ppu,
        cart: Option<&'a mut Cartridge>,
        pads: &'a mut [Gamepad; 2],
        dma_request: &'a mut Option<u8>,
    ) -> Self {
        Self {
            ram,
            vram,
            ppu,
            cart,
            pads,
            dma_request,
        }
    }

    #[inline]
    fn ppu_bus(&mut self) -> PpuBusView<'_> {
        PpuBusView::from_parts(self.vram, self.cart.as_deref_mut())
    }
}

impl CpuBus for CpuBusView<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        if let Some(cart) = self.cart.as_deref_mut() {
            if let Some(value) = cart.cpu_read(addr) {
                return value;
            }
        }
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let mut bus = PpuBusView::from_parts(self.vram, self.cart.as_deref_mut());
                self.ppu.read_reg(addr & 7, &mut bus)
            }
            JOY1 => self.pads[0].read(),
            JOY2 => self.pads[1].read(),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> bool {
        if let Some(cart) = self.cart.as_deref_mut() {
            if cart.cpu_write(addr, value) {
                return true;
            }
        }
        match addr {
            0x0000..=0x1FFF => {
                self.ram[(addr & 0x07FF) as usize] = value;
                true
            }
            0x2000..=0x3FFF => {
                let mut bus = PpuBusView::from_parts(self.vram, self.cart.as_deref_mut());
                self.ppu.write_reg(addr & 7, value, &mut bus);
                true
            }
            OAM_DMA => {
                *self.dma_request = Some(value);
                true
            }
            JOY1 => {
                for pad in self.pads.iter_mut() {
                    pad.write(value);
                }
                true
            }
            _ => false,
        }
    }
}

impl CpuBusView<'_> {
    /// PPU-space read without going through PPUDATA (debug / tests).
    pub(crate) fn ppu_peek(&mut self, addr: u16) -> u8 {
        self.ppu_bus().ppu_read(addr)
    }
}
