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

    detect::video.rs
*/

//! Video chip generation detection.
//!
//! Stage one tells a TMS9918A from a V99x8: the TMS9918A has no R#15 and mirrors writes
//! to it onto R#7, so selecting S#2 leaves S#0 readable, and right after a frame
//! interrupt S#0 has bit 6 clear while the V99x8's S#2 has VR set. Stage two reads the
//! chip ID from S#1.

use crate::{
    bus::{CriticalSection, HardwareBus},
    machine_types::VideoChipGeneration,
    vdp::{self, StatusRegister0, StatusRegister1, StatusRegister2, VdpRegisterGuard, REG_COLOR, REG_STATUS_SELECT},
};

/// S#1 chip ID of the V9958.
pub const V9958_ID: u8 = 2;

fn is_tms9918(bus: &mut dyn HardwareBus) -> bool {
    // Drop any stale frame flag before waiting on a fresh one.
    let _ = vdp::read_status(bus);

    let mut cs = CriticalSection::enter(bus);
    // R#7 is restored from its mirror in case the write to R#15 landed on it.
    let mut regs = VdpRegisterGuard::save(&mut *cs, &[REG_COLOR, REG_STATUS_SELECT]);

    loop {
        let s0 = StatusRegister0::from_bytes([vdp::read_status(&mut *regs)]);
        if s0.frame_interrupt() {
            break;
        }
    }

    vdp::select_status(&mut *regs, 2);
    let s2 = StatusRegister2::from_bytes([vdp::read_status(&mut *regs)]);
    log::trace!("S#2 after frame: {:?}", s2);
    !s2.vertical_retrace()
}

pub fn detect_video_generation(bus: &mut dyn HardwareBus) -> VideoChipGeneration {
    if is_tms9918(bus) {
        log::debug!("video chip: TMS9918A");
        return VideoChipGeneration::Gen0;
    }

    let mut cs = CriticalSection::enter(bus);
    let mut regs = VdpRegisterGuard::save(&mut *cs, &[REG_STATUS_SELECT]);
    vdp::select_status(&mut *regs, 1);
    let s1 = StatusRegister1::from_bytes([vdp::read_status(&mut *regs)]);
    drop(regs);

    let generation = match s1.chip_id() {
        0 => VideoChipGeneration::Gen1,
        V9958_ID => VideoChipGeneration::Gen2,
        id => {
            log::warn!("unrecognized V99x8 chip ID {}, treating as V9958", id);
            VideoChipGeneration::Gen2
        }
    };
    log::debug!("video chip: {}", generation);
    generation
}
