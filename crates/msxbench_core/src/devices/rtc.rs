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

    devices::rtc.rs
*/

//! RP5C01 clock chip register file, with an optional Tides-Rider board decoding
//! register 14 of block 2.

use crate::{
    bus::{NO_IO_BYTE, PORT_RTC_DATA, PORT_RTC_SELECT},
    devices::ClockRequest,
    rtc::RTC_MODE_REGISTER,
    speed::{TIDES_RIDER_BLOCK, TIDES_RIDER_REGISTER, TIDES_RIDER_SET},
};

pub const TIDES_RIDER_HZ: [f64; 5] = [3_579_545.0, 6_660_000.0, 10_000_000.0, 20_000_000.0, 3_579_545.0];

pub struct SimRtc {
    selected: u8,
    mode: u8,
    blocks: [[u8; 13]; 4],
    tides_rider: Option<u8>,
}

impl SimRtc {
    pub fn new(tides_rider: Option<u8>) -> Self {
        Self {
            selected: 0,
            mode: 0,
            blocks: [[0; 13]; 4],
            tides_rider: tides_rider.map(|speed| speed.min(TIDES_RIDER_HZ.len() as u8 - 1)),
        }
    }

    pub fn tides_rider_speed(&self) -> Option<u8> {
        self.tides_rider
    }

    fn block(&self) -> u8 {
        self.mode & 0x03
    }

    pub fn read(&mut self, port: u8) -> u8 {
        if port != PORT_RTC_DATA {
            return NO_IO_BYTE;
        }
        match self.selected {
            RTC_MODE_REGISTER => self.mode,
            TIDES_RIDER_REGISTER if self.block() == TIDES_RIDER_BLOCK => self.tides_rider.unwrap_or(NO_IO_BYTE),
            reg @ 0..=12 => self.blocks[self.block() as usize][reg as usize] & 0x0F,
            _ => NO_IO_BYTE,
        }
    }

    pub fn write(&mut self, port: u8, data: u8) -> Option<ClockRequest> {
        match port {
            PORT_RTC_SELECT => {
                self.selected = data & 0x0F;
                None
            }
            PORT_RTC_DATA => match self.selected {
                RTC_MODE_REGISTER => {
                    self.mode = data & 0x0F;
                    None
                }
                TIDES_RIDER_REGISTER if self.block() == TIDES_RIDER_BLOCK && data & TIDES_RIDER_SET != 0 => {
                    let speed = self.tides_rider.as_mut()?;
                    let index = (data & 0x07) as usize;
                    let hz = TIDES_RIDER_HZ.get(index)?;
                    *speed = index as u8;
                    Some(ClockRequest::Hz(*hz))
                }
                reg @ 0..=12 => {
                    let block = self.block() as usize;
                    self.blocks[block][reg as usize] = data & 0x0F;
                    None
                }
                _ => None,
            },
            _ => None,
        }
    }
}
