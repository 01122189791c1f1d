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

    devices::mod.rs
*/

//! A simulated MSX host.
//!
//! [SimulatedMsx] implements [HardwareBus](crate::bus::HardwareBus) with enough of the
//! machine to exercise detection, timing and speed control end to end: a video chip
//! with frame and line interrupts, the expanded I/O bus, the clock chip, and a CPU that
//! runs the probe opcodes and converts T-states into raster time at its current clock.

pub mod cpu;
pub mod expanded_io;
pub mod msx;
pub mod rtc;
pub mod vdp;

pub use cpu::CpuModel;
pub use msx::{IoPortStats, MachineSpec, SimulatedMsx};

/// Clock change requested by a speed control write.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockRequest {
    /// Back to the machine's base clock.
    Base,
    Hz(f64),
}
