use std::path::PathBuf;

use crate::bus::{Bus, PPU_DOTS_PER_CPU_CYCLE};
use crate::cartridge::{Cartridge, HEADER_LEN, PRG_UNIT};
use crate::controller::Button;
use crate::cpu::IRQ_DISABLE;
use crate::ppu::registers::PpuStatus;
use crate::test_utils::{build_ines, build_nrom_with_prg, set_vectors_in_prg};

/// NTSC master clock; the PPU runs at a quarter of it.
const MASTER_CLOCK_HZ: u64 = 21_477_272;

fn nrom_bus(prg: &[u8]) -> Bus {
    let rom = build_nrom_with_prg(prg, None);
    let cart = Cartridge::from_ines_bytes(&rom).expect("synthetic NROM loads");
    Bus::with_cartridge(cart)
}

fn rom_path(rel: &str) -> Option<PathBuf> {
    let dir = std::env::var_os("FAMICORE_TEST_ROMS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("test_roms"));
    let path = dir.join(rel);
    if path.is_file() {
        Some(path)
    } else {
        eprintln!("skipping: {} not found", path.display());
        None
    }
}

// ---------------------------------------------------------------------------
// Clock ratio and reset
// ---------------------------------------------------------------------------

#[test]
fn cpu_runs_once_every_three_bus_cycles() {
    // JMP $8000
    let mut bus = nrom_bus(&[0x4C, 0x00, 0x80]);
    let start = bus.cpu_cycles();
    for _ in 0..300 {
        bus.cycle().expect("no decode failure");
    }
    assert_eq!(bus.cpu_cycles() - start, 100, "3:1 PPU:CPU ratio");
    assert_eq!(bus.ppu().clocks(), 300, "PPU clocked every call");
}

#[test]
fn reset_loads_vector_and_keeps_ram() {
    let mut rom = build_nrom_with_prg(&[0xEA], None);
    set_vectors_in_prg(
        &mut rom[HEADER_LEN..HEADER_LEN + PRG_UNIT],
        0x8123,
        0x8000,
        0x8000,
    );
    let mut bus = Bus::with_cartridge(Cartridge::from_ines_bytes(&rom).expect("loads"));
    assert_eq!(bus.cpu().pc(), 0x8123);

    bus.ram_mut()[0x10] = 0x77;
    bus.reset();
    assert_eq!(bus.ram()[0x10], 0x77, "reset leaves work RAM alone");
    assert!(bus.cpu().get_flag(IRQ_DISABLE));
}

#[test]
fn unknown_opcode_surfaces_from_cycle() {
    // $02 is a KIL slot and stays unmapped.
    let mut bus = nrom_bus(&[0x02]);
    let err = (0..100)
        .find_map(|_| bus.cycle().err())
        .expect("decode failure reported");
    assert_eq!(err.to_string(), "unknown opcode $02 at $8000");
}

// ---------------------------------------------------------------------------
// CPU address map
// ---------------------------------------------------------------------------

#[test]
fn work_ram_mirrors_every_2k() {
    let mut bus = Bus::new();
    bus.write(0x0001, 0xAA);
    for mirror in [0x0801, 0x1001, 0x1801] {
        assert_eq!(bus.read(mirror), 0xAA, "mirror ${mirror:04X}");
    }
    bus.write(0x1FFF, 0x55);
    assert_eq!(bus.read(0x07FF), 0x55);
}

#[test]
fn ppu_registers_mirror_every_8_bytes() {
    let mut bus = nrom_bus(&[0xEA]);
    // PPUADDR through a mirror, PPUDATA through another.
    bus.write(0x3FFE, 0x29);
    bus.write(0x200E, 0x00);
    bus.write(0x2FFF, 0x5C);
    assert_eq!(bus.vram()[1][0x100], 0x5C, "$2900 lands in bank 1 under horizontal");
}

#[test]
fn unmapped_cpu_space_reads_zero() {
    let mut bus = Bus::new();
    assert_eq!(bus.read(0x4018), 0);
    assert_eq!(bus.read(0x5000), 0);
    assert_eq!(bus.read(0x8000), 0, "no cartridge inserted");
}

#[test]
fn prg_ram_round_trips_through_the_bus() {
    let mut bus = nrom_bus(&[0xEA]);
    let data: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(7)).collect();
    for (i, &b) in data.iter().enumerate() {
        bus.write(0x6000 + i as u16, b);
    }
    let back: Vec<u8> = (0..64).map(|i| bus.read(0x6000 + i)).collect();
    assert_eq!(back, data, "battery-backed PRG-RAM keeps writes");
}

#[test]
fn prg_ram_is_absent_without_battery() {
    let mut bus = mirroring_bus(0);
    bus.write(0x6000, 0x5A);
    assert_eq!(bus.read(0x6000), 0, "no PRG-RAM on a non-battery board");
}

#[test]
fn gamepad_ports_shift_out_buttons() {
    let mut bus = Bus::new();
    bus.gamepad_mut(0).press(Button::Start);
    bus.gamepad_mut(1).press(Button::A);
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);

    let port1: Vec<u8> = (0..8).map(|_| bus.read(0x4016) & 1).collect();
    let port2: Vec<u8> = (0..8).map(|_| bus.read(0x4017) & 1).collect();
    assert_eq!(port1, vec![0, 0, 0, 1, 0, 0, 0, 0]);
    assert_eq!(port2, vec![1, 0, 0, 0, 0, 0, 0, 0]);
}

// ---------------------------------------------------------------------------
// PPU address map and mirroring
// ---------------------------------------------------------------------------

fn mirroring_bus(flags6: u8) -> Bus {
    let rom = build_ines(0, 1, 1, flags6, 0, None);
    Bus::with_cartridge(Cartridge::from_ines_bytes(&rom).expect("loads"))
}

fn write_vram(bus: &mut Bus, addr: u16, value: u8) {
    bus.read(0x2002);
    bus.write(0x2006, (addr >> 8) as u8);
    bus.write(0x2006, addr as u8);
    bus.write(0x2007, value);
}

fn bank_of(bus: &mut Bus, addr: u16) -> usize {
    let marker = 0xE0 | (addr >> 10) as u8;
    write_vram(bus, addr, marker);
    let bank = bus
        .vram()
        .iter()
        .position(|b| b[(addr & 0x3FF) as usize] == marker)
        .expect("write reached console VRAM");
    assert_eq!(bus.ppu_read(addr), marker, "read back through the PPU map");
    bank
}

#[test]
fn horizontal_mirroring_pairs_nametables_by_a11() {
    let mut bus = mirroring_bus(0);
    assert_eq!(bank_of(&mut bus, 0x2001), 0);
    assert_eq!(bank_of(&mut bus, 0x2401), 0);
    assert_eq!(bank_of(&mut bus, 0x2801), 1);
    assert_eq!(bank_of(&mut bus, 0x2C01), 1);
}

#[test]
fn vertical_mirroring_pairs_nametables_by_a10() {
    let mut bus = mirroring_bus(1);
    assert_eq!(bank_of(&mut bus, 0x2001), 0);
    assert_eq!(bank_of(&mut bus, 0x2401), 1);
    assert_eq!(bank_of(&mut bus, 0x2801), 0);
    assert_eq!(bank_of(&mut bus, 0x2C01), 1);
}

#[test]
fn nametable_mirror_region_aliases_2000() {
    let mut bus = mirroring_bus(1);
    write_vram(&mut bus, 0x2405, 0x3C);
    assert_eq!(bus.ppu_read(0x3405), 0x3C);
}

#[test]
fn four_screen_keeps_vram_untouched() {
    let mut bus = mirroring_bus(0x08);
    for (i, base) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
        write_vram(&mut bus, base + 3, i as u8 + 1);
    }
    for (i, base) in [0x2000u16, 0x2400, 0x2800, 0x2C00].into_iter().enumerate() {
        assert_eq!(bus.ppu_read(base + 3), i as u8 + 1, "nametable {i} distinct");
    }
    assert!(
        bus.vram().iter().all(|b| b.iter().all(|&x| x == 0)),
        "cartridge claimed every nametable access"
    );
}

#[test]
fn chr_ram_is_writable_through_ppudata() {
    let mut bus = nrom_bus(&[0xEA]);
    write_vram(&mut bus, 0x0010, 0x99);
    assert_eq!(bus.ppu_read(0x0010), 0x99);
}

// ---------------------------------------------------------------------------
// OAM DMA
// ---------------------------------------------------------------------------

/// LDA #$02 / STA $4014 / loop: JMP loop
const DMA_PROGRAM: [u8; 8] = [0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x05, 0x80];

#[test]
fn oam_dma_steals_513_or_514_cycles_and_fills_oam() {
    let mut bus = nrom_bus(&DMA_PROGRAM);
    for i in 0..256 {
        bus.ram_mut()[0x200 + i] = (i as u8).wrapping_mul(3);
    }

    let mut guard = 0;
    while !bus.dma_active() {
        bus.cycle().expect("runs");
        guard += 1;
        assert!(guard < 1000, "DMA never started");
    }
    let first_stolen = bus.cpu_cycles() - 1;
    let expected = if first_stolen & 1 == 1 { 514 } else { 513 };
    assert_eq!(
        bus.dma_stall_remaining() as u64,
        expected - 1,
        "one cycle already stolen"
    );
    let cpu_before = bus.cpu().total_cycles();
    while bus.dma_active() {
        bus.cycle().expect("runs");
    }
    assert_eq!(bus.dma_stall_remaining(), 0);

    let stolen = bus.cpu_cycles() - first_stolen;
    assert_eq!(stolen, expected, "DMA started on CPU cycle {first_stolen}");
    assert_eq!(bus.cpu().total_cycles(), cpu_before, "CPU halted meanwhile");

    for i in 0..=255u8 {
        assert_eq!(bus.ppu().peek_oam(i), i.wrapping_mul(3), "OAM byte {i}");
    }
}

#[test]
fn oam_dma_waits_for_the_writing_instruction() {
    let mut bus = nrom_bus(&DMA_PROGRAM);
    // Reset latency, LDA #imm.
    bus.step_instruction().expect("reset");
    bus.step_instruction().expect("LDA");
    assert!(!bus.dma_active());
    bus.step_instruction().expect("STA");
    assert!(!bus.dma_active(), "STA $4014 completes before the transfer");
    for _ in 0..3 {
        bus.cycle().expect("runs");
    }
    assert!(bus.dma_active(), "transfer starts on the next CPU clock");
}

// ---------------------------------------------------------------------------
// Interrupts and frames
// ---------------------------------------------------------------------------

#[test]
fn run_frame_stops_at_vblank_and_nmi_reaches_the_cpu() {
    // Enable NMI, spin. NMI handler at $8010: INC $00 / RTI.
    let mut prg = vec![0xEA; 0x20];
    prg[..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
    prg[0x10..0x13].copy_from_slice(&[0xE6, 0x00, 0x40]);
    let rom = build_nrom_with_prg(&prg, Some((0x8000, 0x8010, 0x8000)));
    let mut bus = Bus::with_cartridge(Cartridge::from_ines_bytes(&rom).expect("loads"));

    bus.run_frame().expect("first frame");
    assert_eq!(bus.ppu().scanline(), 241);
    for _ in 0..2 {
        bus.run_frame().expect("frame");
    }
    // One NMI per vblank; the handler may still be running for the last.
    let count = bus.ram()[0];
    assert!((2..=3).contains(&count), "NMI handler ran {count} times");
}

// ---------------------------------------------------------------------------
// PPU register timing
// ---------------------------------------------------------------------------

/// $8000: LDA ($20,X) ; $8002: JMP $8002
const STATUS_POLL_PROGRAM: [u8; 5] = [0xA1, 0x20, 0x4C, 0x02, 0x80];

fn status_poll_bus() -> Bus {
    let rom = build_nrom_with_prg(&STATUS_POLL_PROGRAM, Some((0x8002, 0x8002, 0x8002)));
    let mut bus = Bus::with_cartridge(Cartridge::from_ines_bytes(&rom).expect("loads"));
    // ($20) -> $2002
    bus.ram_mut()[0x20] = 0x02;
    bus.ram_mut()[0x21] = 0x20;
    bus
}

#[test]
fn status_read_lands_on_the_last_clock_of_the_instruction() {
    // Bus calls until the first vblank flag is set.
    let mut reference = status_poll_bus();
    let mut vblank_call = 0u64;
    while !reference.ppu().status().contains(PpuStatus::VBLANK) {
        reference.cycle().expect("runs");
        vblank_call += 1;
        assert!(vblank_call < 200_000, "vblank never set");
    }

    // Start the 6-clock LDA ($20,X) at least one dot before vblank. Its
    // operand read happens 15 dots later, after the flag is up.
    let mut bus = status_poll_bus();
    let mut call = 0u64;
    loop {
        bus.cycle().expect("runs");
        call += 1;
        let next_clocks_cpu = bus.subcycle == PPU_DOTS_PER_CPU_CYCLE - 1;
        if bus.cpu().at_instruction_boundary() && next_clocks_cpu && call + 14 >= vblank_call {
            break;
        }
    }
    assert!(call + 1 < vblank_call, "instruction begins before vblank");
    bus.cpu_mut().set_pc(0x8000);
    bus.step_instruction().expect("LDA ($20,X)");
    assert_eq!(bus.cpu().pc(), 0x8002);
    assert_ne!(bus.cpu().a() & 0x80, 0, "$2002 read after the flag was set");
    assert!(
        !bus.ppu().status().contains(PpuStatus::VBLANK),
        "the read cleared the flag"
    );
}

// ---------------------------------------------------------------------------
// ROM-driven
// ---------------------------------------------------------------------------

#[test]
fn nestest_automation_reports_no_errors() {
    let Some(path) = rom_path("nestest.nes") else {
        return;
    };
    let mut bus = Bus::with_cartridge(Cartridge::from_ines_file(&path).expect("nestest loads"));

    // Return address $7FFF on the stack so the final RTS lands on $8000.
    bus.ram_mut()[0x1FE] = 0xFF;
    bus.ram_mut()[0x1FF] = 0x7F;
    bus.cpu_mut().set_pc(0xC000);
    bus.cpu_mut().set_flag(IRQ_DISABLE, true);

    let mut cycles = 0u64;
    while !(bus.cpu().at_instruction_boundary() && bus.cpu().pc() == 0x8000) {
        bus.cycle().expect("nestest decodes");
        cycles += 1;
        assert!(cycles < 1_000_000, "nestest did not return");
    }
    assert_eq!(bus.ram()[0x02], 0x00, "official opcode result code");
    assert_eq!(bus.ram()[0x03], 0x00, "unofficial opcode result code");
}

fn run_vbl_nmi_rom(name: &str) {
    let Some(path) = rom_path(&format!("vbl_nmi_timing/{name}.nes")) else {
        return;
    };
    let mut bus = Bus::new();
    bus.insert_cartridge(Cartridge::from_ines_file(&path).expect("test ROM loads"));
    bus.ram_mut().fill(0xA3);
    bus.reset();

    let seconds = 3;
    for _ in 0..seconds * MASTER_CLOCK_HZ / 4 {
        bus.cycle().expect("test ROM decodes");
    }
    assert_eq!(bus.ram()[0xF8], 1, "{name}: result byte at $F8");
}

#[test]
fn vbl_nmi_frame_basics() {
    run_vbl_nmi_rom("1.frame_basics");
}

#[test]
fn vbl_nmi_vbl_timing() {
    run_vbl_nmi_rom("2.vbl_timing");
}

#[test]
fn vbl_nmi_even_odd_frames() {
    run_vbl_nmi_rom("3.even_odd_frames");
}

#[test]
fn vbl_nmi_vbl_clear_timing() {
    run_vbl_nmi_rom("4.vbl_clear_timing");
}

#[test]
fn vbl_nmi_nmi_suppression() {
    run_vbl_nmi_rom("5.nmi_suppression");
}

#[test]
fn vbl_nmi_nmi_disable() {
    run_vbl_nmi_rom("6.nmi_disable");
}

#[test]
fn vbl_nmi_nmi_timing() {
    run_vbl_nmi_rom("7.nmi_timing");
}
