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

    speed.rs

    Boost extension speed tables and switching.
*/

//! Speed control for clock boost extensions.
//!
//! Each extension kind has a fixed level table. Cycling sends the hardware command for
//! the next level (wrapping) and only then moves the profile's current level, so a
//! rejected command leaves the profile matching the hardware.

use crate::{
    bus::{HardwareBus, IoBus, ProbeRegisters, BIOS_CHGCPU, PORT_EXT_IO_DATA},
    error::CommandError,
    machine_types::ExtensionKind,
    probe::{self, DEVICE_PANASONIC},
    profile::{BoostExtension, SpeedLevel},
    rtc,
};

/// RTC block and register the Tides-Rider board decodes.
pub const TIDES_RIDER_BLOCK: u8 = 2;
pub const TIDES_RIDER_REGISTER: u8 = 14;
/// Set in a Tides-Rider write to latch a new speed.
pub const TIDES_RIDER_SET: u8 = 0x80;
/// Set in a CHGCPU argument to update the turbo LED along with the CPU mode.
pub const CHGCPU_LED: u8 = 0x80;

/// Bit 0 of the Panasonic switch register. Clear selects turbo.
pub const PANASONIC_NORMAL_SPEED: u8 = 0b0000_0001;
/// Bit 2 of the Panasonic switch register. Clear if the turbo is fitted.
pub const PANASONIC_TURBO_ABSENT: u8 = 0b0000_0100;

pub static PANASONIC_LEVELS: [SpeedLevel; 2] = [
    SpeedLevel {
        label: "Normal 3.58MHz",
        nominal_mhz: 3.579545,
        code: 0,
    },
    SpeedLevel {
        label: "Turbo 5.37MHz",
        nominal_mhz: 5.369318,
        code: 1,
    },
];

pub static TURBO_R_LEVELS: [SpeedLevel; 3] = [
    SpeedLevel {
        label: "Z80",
        nominal_mhz: 3.579545,
        code: 0,
    },
    SpeedLevel {
        label: "R800 ROM",
        nominal_mhz: 7.15909,
        code: 1,
    },
    SpeedLevel {
        label: "R800 DRAM",
        nominal_mhz: 7.15909,
        code: 2,
    },
];

pub static TIDES_RIDER_LEVELS: [SpeedLevel; 5] = [
    SpeedLevel {
        label: "3.57MHz",
        nominal_mhz: 3.579545,
        code: 0,
    },
    SpeedLevel {
        label: "6.66MHz",
        nominal_mhz: 6.66,
        code: 1,
    },
    SpeedLevel {
        label: "10MHz",
        nominal_mhz: 10.0,
        code: 2,
    },
    SpeedLevel {
        label: "20MHz",
        nominal_mhz: 20.0,
        code: 3,
    },
    SpeedLevel {
        label: "3.57MHz (slots)",
        nominal_mhz: 3.579545,
        code: 4,
    },
];

pub static OCM_LEVELS: [SpeedLevel; 9] = [
    SpeedLevel {
        label: "3.58MHz",
        nominal_mhz: 3.579545,
        code: 0x03,
    },
    SpeedLevel {
        label: "Turbo Pana 5.37MHz",
        nominal_mhz: 5.369318,
        code: 0x04,
    },
    SpeedLevel {
        label: "4.10MHz",
        nominal_mhz: 4.10,
        code: 0x05,
    },
    SpeedLevel {
        label: "4.48MHz",
        nominal_mhz: 4.48,
        code: 0x06,
    },
    SpeedLevel {
        label: "4.90MHz",
        nominal_mhz: 4.90,
        code: 0x07,
    },
    SpeedLevel {
        label: "5.39MHz",
        nominal_mhz: 5.39,
        code: 0x08,
    },
    SpeedLevel {
        label: "6.10MHz",
        nominal_mhz: 6.10,
        code: 0x09,
    },
    SpeedLevel {
        label: "6.96MHz",
        nominal_mhz: 6.96,
        code: 0x0A,
    },
    SpeedLevel {
        label: "8.06MHz",
        nominal_mhz: 8.06,
        code: 0x0B,
    },
];

pub fn levels_for(kind: ExtensionKind) -> &'static [SpeedLevel] {
    match kind {
        ExtensionKind::OcmPld => &OCM_LEVELS,
        ExtensionKind::PanasonicTurbo => &PANASONIC_LEVELS,
        ExtensionKind::TurboR => &TURBO_R_LEVELS,
        ExtensionKind::TidesRider => &TIDES_RIDER_LEVELS,
    }
}

/// Command the hardware to the next level of `extension`, then record it.
///
/// An absent extension is left untouched and `Ok(None)` is returned.
pub fn cycle_extension_speed(
    bus: &mut dyn HardwareBus,
    extension: &mut BoostExtension,
) -> Result<Option<&'static SpeedLevel>, CommandError> {
    if !extension.is_present() {
        log::debug!("{} not present, ignoring speed change", extension.kind());
        return Ok(None);
    }
    let Some(next) = extension.next_index() else {
        return Ok(None);
    };
    let Some(level) = extension.levels().get(next) else {
        return Ok(None);
    };
    apply_level(bus, extension.kind(), level)?;
    Ok(extension.set_index(next))
}

/// Jump `extension` straight to level `index`.
pub fn select_extension_level(
    bus: &mut dyn HardwareBus,
    extension: &mut BoostExtension,
    index: usize,
) -> Result<&'static SpeedLevel, CommandError> {
    let kind = extension.kind();
    if !extension.is_present() {
        return Err(CommandError::ExtensionAbsent(kind));
    }
    let level = extension
        .levels()
        .get(index)
        .ok_or(CommandError::LevelOutOfRange(kind, index))?;
    apply_level(bus, kind, level)?;
    extension.set_index(index);
    Ok(level)
}

/// Send the hardware command selecting `level` on an extension of `kind`.
pub fn apply_level(bus: &mut dyn HardwareBus, kind: ExtensionKind, level: &SpeedLevel) -> Result<(), CommandError> {
    log::debug!("{}: selecting {}", kind, level.label);
    match kind {
        ExtensionKind::PanasonicTurbo => {
            set_panasonic_turbo(bus, level.code != 0).ok_or(CommandError::NotAcknowledged(kind))
        }
        ExtensionKind::TurboR => {
            bus.bios_call(
                BIOS_CHGCPU,
                ProbeRegisters {
                    a: level.code | CHGCPU_LED,
                    ..Default::default()
                },
            );
            Ok(())
        }
        ExtensionKind::TidesRider => {
            rtc::write_register(
                bus,
                TIDES_RIDER_BLOCK,
                TIDES_RIDER_REGISTER,
                level.code | TIDES_RIDER_SET,
            );
            Ok(())
        }
        ExtensionKind::OcmPld => {
            if probe::send_smart_command(bus, level.code) {
                Ok(())
            }
            else {
                Err(CommandError::NotAcknowledged(kind))
            }
        }
    }
}

/// Switch the Panasonic turbo on or off. Only bit 0 of the switch register changes.
fn set_panasonic_turbo(bus: &mut dyn HardwareBus, enabled: bool) -> Option<()> {
    probe::with_selected_device(bus, DEVICE_PANASONIC, |bus| {
        let value = bus.io_read_u8(PORT_EXT_IO_DATA);
        let value = if enabled {
            value & !PANASONIC_NORMAL_SPEED
        }
        else {
            value | PANASONIC_NORMAL_SPEED
        };
        bus.io_write_u8(PORT_EXT_IO_DATA, value);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{MachineSpec, SimulatedMsx};

    #[test]
    fn test_absent_extension_is_noop() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        let mut ext = BoostExtension::absent(ExtensionKind::TidesRider, &TIDES_RIDER_LEVELS);
        assert_eq!(cycle_extension_speed(&mut msx, &mut ext), Ok(None));
        assert_eq!(ext.current_index(), 0);
        assert_eq!(msx.cpu_clock_hz(), MachineSpec::default().base_clock_hz);
    }

    #[test]
    fn test_tides_rider_wraps_from_last_level() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            tides_rider: Some(4),
            ..Default::default()
        });
        let mut ext = BoostExtension::new(ExtensionKind::TidesRider, true, &TIDES_RIDER_LEVELS, 4);
        let level = cycle_extension_speed(&mut msx, &mut ext).unwrap();
        assert_eq!(level.map(|l| l.code), Some(0));
        assert_eq!(msx.tides_rider_speed(), Some(0));

        let level = cycle_extension_speed(&mut msx, &mut ext).unwrap();
        assert_eq!(level.map(|l| l.code), Some(1));
        assert_eq!(msx.tides_rider_speed(), Some(1));
    }

    #[test]
    fn test_panasonic_turbo_toggles_bit0_only() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            panasonic_turbo: Some(false),
            ..Default::default()
        });
        let mut ext = BoostExtension::new(ExtensionKind::PanasonicTurbo, true, &PANASONIC_LEVELS, 0);
        cycle_extension_speed(&mut msx, &mut ext).unwrap();
        assert_eq!(msx.panasonic_register(), Some(0b1111_1010));
        cycle_extension_speed(&mut msx, &mut ext).unwrap();
        assert_eq!(msx.panasonic_register(), Some(0b1111_1011));
    }

    #[test]
    fn test_turbo_r_full_cycle_returns_to_start() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            msx_version: 3,
            turbo_r: Some(1),
            ..Default::default()
        });
        let mut ext = BoostExtension::new(ExtensionKind::TurboR, true, &TURBO_R_LEVELS, 1);
        for _ in 0..TURBO_R_LEVELS.len() {
            cycle_extension_speed(&mut msx, &mut ext).unwrap();
        }
        assert_eq!(ext.current_index(), 1);
        assert_eq!(msx.turbo_r_mode(), Some(1));
    }

    #[test]
    fn test_select_level_on_absent_extension() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        let mut ext = BoostExtension::absent(ExtensionKind::OcmPld, &OCM_LEVELS);
        assert_eq!(
            select_extension_level(&mut msx, &mut ext, 2),
            Err(CommandError::ExtensionAbsent(ExtensionKind::OcmPld))
        );
    }

    #[test]
    fn test_select_level_out_of_range() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            tides_rider: Some(2),
            ..Default::default()
        });
        let mut ext = BoostExtension::new(ExtensionKind::TidesRider, true, &TIDES_RIDER_LEVELS, 2);
        assert_eq!(
            select_extension_level(&mut msx, &mut ext, 9),
            Err(CommandError::LevelOutOfRange(ExtensionKind::TidesRider, 9))
        );
        assert_eq!(ext.current_index(), 2);
        assert_eq!(msx.tides_rider_speed(), Some(2));
    }

    #[test]
    fn test_unacknowledged_change_keeps_level() {
        // Panasonic switch without the turbo device selectable.
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        let mut ext = BoostExtension::new(ExtensionKind::PanasonicTurbo, true, &PANASONIC_LEVELS, 0);
        assert_eq!(
            cycle_extension_speed(&mut msx, &mut ext),
            Err(CommandError::NotAcknowledged(ExtensionKind::PanasonicTurbo))
        );
        assert_eq!(ext.current_index(), 0);
    }
}
