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

    detect::extensions.rs
*/

//! Clock boost extension detection.

use crate::{
    bus::{HardwareBus, IoBus, ProbeRegisters, BIOS_CHGCPU, BIOS_GETCPU, PORT_EXT_IO_DATA},
    machine_types::ExtensionKind,
    probe::{self, DEVICE_OCM_PLD, DEVICE_PANASONIC},
    profile::BoostExtension,
    rtc,
    speed::{self, PANASONIC_NORMAL_SPEED, PANASONIC_TURBO_ABSENT, TIDES_RIDER_BLOCK, TIDES_RIDER_REGISTER},
};

/// Opcode of `JP nn`, found at each BIOS jump table entry.
const OPCODE_JP: u8 = 0xC3;

/// Current turbo state if the Panasonic switch is fitted.
pub fn detect_panasonic_turbo(bus: &mut dyn HardwareBus) -> Option<bool> {
    let value = probe::with_selected_device(bus, DEVICE_PANASONIC, |bus| bus.io_read_u8(PORT_EXT_IO_DATA))?;
    if value & PANASONIC_TURBO_ABSENT != 0 {
        return None;
    }
    Some(value & PANASONIC_NORMAL_SPEED == 0)
}

/// The turbo R BIOS adds a CHGCPU entry to the jump table.
pub fn detect_turbo_r(bus: &mut dyn HardwareBus) -> bool {
    bus.mem_read_u8(BIOS_CHGCPU) == OPCODE_JP
}

/// Current CPU mode as reported by GETCPU: 0 Z80, 1 R800 ROM, 2 R800 DRAM.
pub fn turbo_r_mode(bus: &mut dyn HardwareBus) -> u8 {
    bus.bios_call(BIOS_GETCPU, ProbeRegisters::default()).a
}

/// Current speed code if a Tides-Rider answers in RTC block 2.
pub fn detect_tides_rider(bus: &mut dyn HardwareBus) -> Option<u8> {
    match rtc::read_register(bus, TIDES_RIDER_BLOCK, TIDES_RIDER_REGISTER) {
        0xFF => None,
        value => Some(value & 0x07),
    }
}

pub fn detect_ocm_pld(bus: &mut dyn HardwareBus) -> bool {
    probe::probe_device(bus, DEVICE_OCM_PLD)
}

/// Probe every extension kind, in a fixed order. `ocm_pld` is the result of the
/// earlier super board check.
pub fn detect_extensions(bus: &mut dyn HardwareBus, ocm_pld: bool) -> Vec<BoostExtension> {
    let mut extensions = Vec::with_capacity(4);

    let levels = speed::levels_for(ExtensionKind::OcmPld);
    extensions.push(BoostExtension::new(ExtensionKind::OcmPld, ocm_pld, levels, 0));

    let levels = speed::levels_for(ExtensionKind::PanasonicTurbo);
    extensions.push(match detect_panasonic_turbo(bus) {
        Some(turbo) => BoostExtension::new(ExtensionKind::PanasonicTurbo, true, levels, turbo as usize),
        None => BoostExtension::absent(ExtensionKind::PanasonicTurbo, levels),
    });

    let levels = speed::levels_for(ExtensionKind::TurboR);
    extensions.push(if detect_turbo_r(bus) {
        let mode = turbo_r_mode(bus);
        BoostExtension::new(ExtensionKind::TurboR, true, levels, mode as usize)
    }
    else {
        BoostExtension::absent(ExtensionKind::TurboR, levels)
    });

    let levels = speed::levels_for(ExtensionKind::TidesRider);
    extensions.push(match detect_tides_rider(bus) {
        Some(speed) => BoostExtension::new(ExtensionKind::TidesRider, true, levels, speed as usize),
        None => BoostExtension::absent(ExtensionKind::TidesRider, levels),
    });

    for ext in extensions.iter().filter(|ext| ext.is_present()) {
        log::debug!(
            "extension {} present at level {}",
            ext.kind(),
            ext.current_level().map_or("?", |level| level.label)
        );
    }
    extensions
}
