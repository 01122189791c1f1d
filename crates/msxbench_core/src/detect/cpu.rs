/*
    MSXBench

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    detect::cpu.rs
*/

//! CPU identification by instruction behaviour.
//!
//! The probes rely on opcodes that decode differently across the Z80 family. Each runs
//! with interrupts disabled; register state is passed by value, so nothing else needs
//! restoring.

use crate::{
    bus::{CriticalSection, HardwareBus, IoBus, ProbeRegisters, FLAG_S, FLAG_Z, PORT_VDP_DATA},
    machine_types::CpuVariant,
    vdp,
};

/// `TSET A` on a Z280. A Z80 decodes this as `SLL A`, an R800 as `SLA A`.
const TSET_A: [u8; 2] = [0xCB, 0x37];
/// `MULUB A,C` on an R800. A two-byte no-op on a Z80.
const MULUB_A_C: [u8; 2] = [0xED, 0xC9];
/// `OUT (C),0`. NMOS parts drive 0x00 onto the bus, CMOS parts 0xFF.
const OUT_C_0: [u8; 2] = [0xED, 0x71];

/// VRAM byte used as scratch by the NMOS/CMOS probe. It is saved and put back.
pub const CMOS_PROBE_VRAM_ADDRESS: u16 = 0x3FFF;

/// Returns true if `TSET A` left S clear. Z80 and R800 both shift 0x40 into bit 7.
pub fn probe_extended(bus: &mut dyn HardwareBus) -> bool {
    let mut cs = CriticalSection::enter(bus);
    let out = cs.execute(
        &TSET_A,
        ProbeRegisters {
            a: 0x40,
            ..Default::default()
        },
    );
    out.f & FLAG_S == 0
}

/// Returns true if `MULUB A,C` with A=1, C=0 set Z. Entered with Z clear, so a Z80
/// running it as a no-op leaves Z clear.
pub fn probe_enhanced(bus: &mut dyn HardwareBus) -> bool {
    let mut cs = CriticalSection::enter(bus);
    let out = cs.execute(
        &MULUB_A_C,
        ProbeRegisters {
            a: 1,
            c: 0,
            f: 0,
            ..Default::default()
        },
    );
    out.f & FLAG_Z != 0
}

/// Identify the CPU. Extended takes precedence over Enhanced.
pub fn detect_cpu_variant(bus: &mut dyn HardwareBus) -> CpuVariant {
    let variant = if probe_extended(bus) {
        CpuVariant::Extended
    }
    else if probe_enhanced(bus) {
        CpuVariant::Enhanced
    }
    else {
        CpuVariant::Standard
    };
    log::debug!("cpu variant: {}", variant);
    variant
}

/// Returns true for a CMOS Z80.
///
/// `OUT (C),0` targets the VDP data port; the byte lands in VRAM and in the read-ahead
/// latch, so an immediate data port read returns what the CPU drove.
pub fn detect_cmos(bus: &mut dyn HardwareBus) -> bool {
    let mut cs = CriticalSection::enter(bus);

    vdp::set_vram_read_address(&mut *cs, CMOS_PROBE_VRAM_ADDRESS);
    let saved = cs.io_read_u8(PORT_VDP_DATA);

    vdp::set_vram_write_address(&mut *cs, CMOS_PROBE_VRAM_ADDRESS);
    cs.execute(
        &OUT_C_0,
        ProbeRegisters {
            c: PORT_VDP_DATA,
            ..Default::default()
        },
    );
    let driven = cs.io_read_u8(PORT_VDP_DATA);

    vdp::set_vram_write_address(&mut *cs, CMOS_PROBE_VRAM_ADDRESS);
    cs.io_write_u8(PORT_VDP_DATA, saved);

    log::debug!("OUT (C),0 drove {:02X}", driven);
    driven != 0x00
}
