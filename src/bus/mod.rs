#![doc = r#"
Bus: the console. Owns CPU, PPU, 2 KiB work RAM, 2 KiB nametable VRAM,
the cartridge, both gamepads and the OAM DMA unit, and advances them in
lockstep.

Clocking
- `cycle()` is one PPU dot (master clock / 4).
- Every third call also clocks the CPU first: either one stolen OAM DMA
  cycle or one CPU cycle. After each CPU clock the cartridge sees the PPU
  address bus (M2 edge for the MMC3 A12 filter) and its IRQ output is
  copied onto the CPU IRQ line.
- The PPU then advances one dot and may latch NMI on the CPU.

CPU map (cartridge gets first refusal on every access)
- $0000-$1FFF: work RAM, mirrored every $0800.
- $2000-$3FFF: PPU registers, mirrored every 8 bytes.
- $4014: OAM DMA page (write).
- $4016: gamepad strobe (write) / port 1 (read); $4017: port 2 (read).
- Anything else unclaimed reads 0.

Submodules
- views: `CpuBusView` / `PpuBusView`, the borrow-split adapters.
- dma: `DmaController`.
"#]

pub mod dma;
pub(crate) mod views;

#[cfg(test)]
mod tests;

use crate::cartridge::Cartridge;
use crate::controller::Gamepad;
use crate::cpu::{Cpu, CpuError, CpuInterruptSink};
use crate::ppu::Ppu;
use dma::DmaController;
use views::{CpuBusView, PpuBusView, Vram};

/// PPU dots per CPU cycle (NTSC).
pub const PPU_DOTS_PER_CPU_CYCLE: u8 = 3;

pub struct Bus {
    cpu: Cpu,
    ppu: Ppu,
    ram: [u8; 0x800],
    vram: Vram,
    cartridge: Option<Cartridge>,
    pads: [Gamepad; 2],
    dma: DmaController,
    dma_request: Option<u8>,
    subcycle: u8,
    cpu_cycles: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Console with no cartridge inserted.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            ram: [0; 0x800],
            vram: [[0; 0x400]; 2],
            cartridge: None,
            pads: [Gamepad::new(), Gamepad::new()],
            dma: DmaController::new(),
            dma_request: None,
            subcycle: 0,
            cpu_cycles: 0,
        }
    }

    /// Insert `cart` and power the console on.
    pub fn with_cartridge(cart: Cartridge) -> Self {
        let mut bus = Self::new();
        bus.insert_cartridge(cart);
        bus.reset();
        bus
    }

    /// Swap the cartridge. Does not reset; call `reset` afterwards.
    pub fn insert_cartridge(&mut self, cart: Cartridge) -> Option<Cartridge> {
        log::info!(
            "inserting {} cartridge (mapper {})",
            cart.mapper_name(),
            cart.mapper_id()
        );
        self.cartridge.replace(cart)
    }

    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    /// Reset button. RAM and VRAM contents survive; the CPU reloads PC
    /// from the reset vector.
    pub fn reset(&mut self) {
        self.ppu.reset();
        if let Some(cart) = self.cartridge.as_mut() {
            cart.reset();
        }
        self.dma.reset();
        self.dma_request = None;
        self.subcycle = 0;

        let (cpu, mut view) = self.cpu_split();
        cpu.reset(&mut view);
        log::debug!("reset: PC=${:04X}", self.cpu.pc());
    }

    // ---------------------------------------------------------------------
    // Clocking
    // ---------------------------------------------------------------------

    /// Advance one PPU dot. Returns `Ok(true)` when a CPU instruction
    /// finished during this call.
    pub fn cycle(&mut self) -> Result<bool, CpuError> {
        let mut retired = false;
        self.subcycle += 1;
        if self.subcycle == PPU_DOTS_PER_CPU_CYCLE {
            self.subcycle = 0;
            retired = self.clock_cpu()?;
        }

        let (ppu, cpu, mut view) = self.ppu_split();
        ppu.cycle(&mut view, cpu);
        Ok(retired)
    }

    /// Run until the PPU enters vertical blank (scanline 241, dot 1).
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        loop {
            self.cycle()?;
            if self.ppu.take_frame_complete() {
                return Ok(());
            }
        }
    }

    /// Run until the next CPU instruction boundary is crossed.
    pub fn step_instruction(&mut self) -> Result<(), CpuError> {
        while !self.cycle()? {}
        Ok(())
    }

    fn clock_cpu(&mut self) -> Result<bool, CpuError> {
        let cycle = self.cpu_cycles;
        let mut retired = false;

        if self.cpu.at_instruction_boundary() {
            if let Some(page) = self.dma_request.take() {
                self.dma.start(page, cycle);
            }
        }

        if self.dma.is_active() && self.cpu.at_instruction_boundary() {
            let (dma, mut view) = self.dma_split();
            dma.step(&mut view);
        } else {
            let (cpu, mut view) = self.cpu_split();
            retired = cpu.cycle(&mut view)?;
        }
        self.cpu_cycles += 1;

        if let Some(cart) = self.cartridge.as_mut() {
            cart.cpu_clock(self.ppu.bus_address());
            let irq = cart.irq_pending();
            self.cpu.set_irq_line(irq);
        }
        Ok(retired)
    }

    // ---------------------------------------------------------------------
    // Borrow splitting
    // ---------------------------------------------------------------------

    fn cpu_split(&mut self) -> (&mut Cpu, CpuBusView<'_>) {
        let view = CpuBusView::from_parts(
            &mut self.ram,
            &mut self.vram,
            &mut self.ppu,
            self.cartridge.as_mut(),
            &mut self.pads,
            &mut self.dma_request,
        );
        (&mut self.cpu, view)
    }

    fn dma_split(&mut self) -> (&mut DmaController, CpuBusView<'_>) {
        let view = CpuBusView::from_parts(
            &mut self.ram,
            &mut self.vram,
            &mut self.ppu,
            self.cartridge.as_mut(),
            &mut self.pads,
            &mut self.dma_request,
        );
        (&mut self.dma, view)
    }

    fn ppu_split(&mut self) -> (&mut Ppu, &mut Cpu, PpuBusView<'_>) {
        let view = PpuBusView::from_parts(&mut self.vram, self.cartridge.as_mut());
        (&mut self.ppu, &mut self.cpu, view)
    }

    // ---------------------------------------------------------------------
    // CPU-visible access (side effects included)
    // ---------------------------------------------------------------------

    pub fn read(&mut self, addr: u16) -> u8 {
        use crate::cpu::CpuBus;
        self.cpu_split().1.read(addr)
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        use crate::cpu::CpuBus;
        self.cpu_split().1.write(addr, value);
    }

    /// PPU address space as the PPU would fetch it (mapper and mirroring
    /// applied, palette excluded).
    pub fn ppu_read(&mut self, addr: u16) -> u8 {
        self.cpu_split().1.ppu_peek(addr)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.ppu.framebuffer()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Gamepad on port 1 (`0`) or port 2 (`1`).
    pub fn gamepad_mut(&mut self, port: usize) -> &mut Gamepad {
        &mut self.pads[port & 1]
    }

    pub fn ram(&self) -> &[u8; 0x800] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8; 0x800] {
        &mut self.ram
    }

    /// Console nametable RAM, two 1 KiB banks selected by CIRAM A10.
    pub fn vram(&self) -> &[[u8; 0x400]; 2] {
        &self.vram
    }

    /// CPU cycles elapsed since power-on, DMA stalls included.
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_active()
    }

    /// CPU cycles the OAM DMA in progress will still steal.
    pub fn dma_stall_remaining(&self) -> u32 {
        self.dma.stall_remaining()
    }
}
