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

    devices::expanded_io.rs
*/

//! Devices behind the expanded I/O selector (ports 0x40-0x4F).

use crate::{
    bus::{NO_IO_BYTE, PORT_EXT_IO_DATA, PORT_EXT_IO_SELECT},
    devices::ClockRequest,
    probe::{DEVICE_OCM_PLD, DEVICE_PANASONIC},
    speed::{PANASONIC_NORMAL_SPEED, PANASONIC_TURBO_ABSENT},
};

pub const PANASONIC_TURBO_HZ: f64 = 5_369_318.0;

/// Effective clock selected by an OCM-PLD smart command, for the speed commands.
pub fn ocm_command_clock(command: u8) -> Option<f64> {
    match command {
        0x03 => Some(3_579_545.0),
        0x04 => Some(PANASONIC_TURBO_HZ),
        0x05 => Some(4_100_000.0),
        0x06 => Some(4_480_000.0),
        0x07 => Some(4_900_000.0),
        0x08 => Some(5_390_000.0),
        0x09 => Some(6_100_000.0),
        0x0A => Some(6_960_000.0),
        0x0B => Some(8_060_000.0),
        _ => None,
    }
}

pub struct ExpandedIo {
    selected: u8,
    maker_id: u8,
    panasonic: Option<u8>,
    ocm_command: Option<u8>,
}

impl ExpandedIo {
    pub fn new(maker_id: u8, panasonic_turbo: Option<bool>, ocm_pld: bool) -> Self {
        let panasonic = panasonic_turbo.map(|turbo| {
            let register = 0xFF & !PANASONIC_TURBO_ABSENT;
            if turbo {
                register & !PANASONIC_NORMAL_SPEED
            }
            else {
                register
            }
        });
        Self {
            selected: 0,
            maker_id,
            panasonic,
            ocm_command: ocm_pld.then_some(0),
        }
    }

    fn answers(&self, device_id: u8) -> bool {
        match device_id {
            0 => false,
            DEVICE_PANASONIC if self.panasonic.is_some() => true,
            DEVICE_OCM_PLD => self.ocm_command.is_some(),
            id => id == self.maker_id,
        }
    }

    pub fn panasonic_register(&self) -> Option<u8> {
        self.panasonic
    }

    pub fn read(&mut self, port: u8) -> u8 {
        match port {
            PORT_EXT_IO_SELECT if self.answers(self.selected) => !self.selected,
            PORT_EXT_IO_DATA => match self.selected {
                DEVICE_PANASONIC => self.panasonic.unwrap_or(NO_IO_BYTE),
                DEVICE_OCM_PLD => self.ocm_command.map_or(NO_IO_BYTE, |command| !command),
                _ => NO_IO_BYTE,
            },
            _ => NO_IO_BYTE,
        }
    }

    pub fn write(&mut self, port: u8, data: u8) -> Option<ClockRequest> {
        match port {
            PORT_EXT_IO_SELECT => {
                self.selected = data;
                None
            }
            PORT_EXT_IO_DATA => match self.selected {
                DEVICE_PANASONIC => {
                    let register = self.panasonic.as_mut()?;
                    *register = (*register & !PANASONIC_NORMAL_SPEED) | (data & PANASONIC_NORMAL_SPEED);
                    if *register & PANASONIC_NORMAL_SPEED == 0 {
                        Some(ClockRequest::Hz(PANASONIC_TURBO_HZ))
                    }
                    else {
                        Some(ClockRequest::Base)
                    }
                }
                DEVICE_OCM_PLD => {
                    let command = self.ocm_command.as_mut()?;
                    *command = data;
                    ocm_command_clock(data).map(ClockRequest::Hz)
                }
                _ => None,
            },
            _ => None,
        }
    }
}
