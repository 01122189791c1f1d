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

    rtc.rs
*/

//! Block-switched register access on the RP5C01 clock chip.
//!
//! The Tides-Rider board listens on the clock chip's ports, in block 2 of the
//! register file. Access here saves the mode register (which holds the block
//! selection) and writes it back afterward.

use crate::bus::{CriticalSection, HardwareBus, IoBus, PORT_RTC_DATA, PORT_RTC_SELECT};

pub const RTC_MODE_REGISTER: u8 = 13;

fn with_block<R>(bus: &mut dyn HardwareBus, block: u8, f: impl FnOnce(&mut dyn HardwareBus) -> R) -> R {
    let mut cs = CriticalSection::enter(bus);
    cs.io_write_u8(PORT_RTC_SELECT, RTC_MODE_REGISTER);
    let saved_mode = cs.io_read_u8(PORT_RTC_DATA) & 0x0F;
    cs.io_write_u8(PORT_RTC_DATA, (saved_mode & !0x03) | (block & 0x03));

    let result = f(&mut *cs);

    cs.io_write_u8(PORT_RTC_SELECT, RTC_MODE_REGISTER);
    cs.io_write_u8(PORT_RTC_DATA, saved_mode);
    result
}

pub fn read_register(bus: &mut dyn HardwareBus, block: u8, reg: u8) -> u8 {
    with_block(bus, block, |bus| {
        bus.io_write_u8(PORT_RTC_SELECT, reg);
        bus.io_read_u8(PORT_RTC_DATA)
    })
}

pub fn write_register(bus: &mut dyn HardwareBus, block: u8, reg: u8, value: u8) {
    with_block(bus, block, |bus| {
        bus.io_write_u8(PORT_RTC_SELECT, reg);
        bus.io_write_u8(PORT_RTC_DATA, value);
    })
}
