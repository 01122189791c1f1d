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

    probe.rs
*/

//! Expanded I/O device probing.
//!
//! Devices behind port 0x40 answer a select with the complement of their ID. Every
//! probe here goes through a [SelectorGuard], so the previous selection is back in
//! place when the probe returns.

use crate::{
    bus::{HardwareBus, IoBus, SelectorGuard, PORT_EXT_IO_DATA},
    machine_types::MAX_MAKER_ID,
};

pub const DEVICE_PANASONIC: u8 = 8;
pub const DEVICE_OCM_PLD: u8 = 0xD4;

/// Returns true if a device with `device_id` is present on the expanded I/O bus.
pub fn probe_device(bus: &mut dyn HardwareBus, device_id: u8) -> bool {
    let mut selector = SelectorGuard::acquire(bus);
    let present = selector.select(device_id);
    log::trace!("probe device {:02X}: {}", device_id, present);
    present
}

/// Select `device_id` and run `f` against it. Returns `None` without calling `f` if the
/// device does not answer.
pub fn with_selected_device<R>(
    bus: &mut dyn HardwareBus,
    device_id: u8,
    f: impl FnOnce(&mut dyn HardwareBus) -> R,
) -> Option<R> {
    let mut selector = SelectorGuard::acquire(bus);
    if !selector.select(device_id) {
        return None;
    }
    Some(f(&mut *selector))
}

/// Scan the maker IDs. Returns the first one that answers, or 0.
pub fn scan_maker_id(bus: &mut dyn HardwareBus) -> u8 {
    let mut selector = SelectorGuard::acquire(bus);
    (1..=MAX_MAKER_ID).find(|&id| selector.select(id)).unwrap_or(0)
}

/// Send an OCM-PLD smart command. The device acknowledges by returning the complement
/// of the command on the data port.
pub fn send_smart_command(bus: &mut dyn HardwareBus, command: u8) -> bool {
    with_selected_device(bus, DEVICE_OCM_PLD, |bus| {
        bus.io_write_u8(PORT_EXT_IO_DATA, command);
        !bus.io_read_u8(PORT_EXT_IO_DATA) == command
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{IoBus, PORT_EXT_IO_SELECT},
        devices::{MachineSpec, SimulatedMsx},
    };

    #[test]
    fn test_probe_restores_selection() {
        let spec = MachineSpec {
            maker_id: 17,
            panasonic_turbo: Some(false),
            ocm_pld: true,
            ..Default::default()
        };
        let mut msx = SimulatedMsx::new(spec);

        // Leave a device selected as resident software might.
        msx.io_write_u8(PORT_EXT_IO_SELECT, 17);
        for device_id in 0..=0xFF {
            let before = msx.io_read_u8(PORT_EXT_IO_SELECT);
            let _ = probe_device(&mut msx, device_id);
            assert_eq!(msx.io_read_u8(PORT_EXT_IO_SELECT), before, "device {:02X}", device_id);
        }
    }

    #[test]
    fn test_probe_answers() {
        let spec = MachineSpec {
            maker_id: 17,
            ..Default::default()
        };
        let mut msx = SimulatedMsx::new(spec);

        assert!(probe_device(&mut msx, 17));
        assert!(!probe_device(&mut msx, DEVICE_PANASONIC));
        assert!(!probe_device(&mut msx, DEVICE_OCM_PLD));
        assert_eq!(scan_maker_id(&mut msx), 17);
        assert!(msx.interrupts_enabled());
    }

    #[test]
    fn test_smart_command_needs_ocm() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        assert!(!send_smart_command(&mut msx, 0x03));

        let mut ocm = SimulatedMsx::new(MachineSpec {
            ocm_pld: true,
            ..Default::default()
        });
        assert!(send_smart_command(&mut ocm, 0x03));
    }
}
