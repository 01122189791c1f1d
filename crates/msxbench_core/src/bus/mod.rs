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

    bus::mod.rs

    Host bus traits.
*/

//! The host bus abstraction.
//!
//! All hardware access performed by detection, timing and speed control goes through
//! [HardwareBus]. Interrupt service routines only ever see the narrower [IoBus], which
//! keeps them from touching memory or the interrupt mask while they run.

pub mod guard;

pub use guard::{CriticalSection, InterruptHook, SelectorGuard};

/// Value read from a port with nothing decoding it.
pub const NO_IO_BYTE: u8 = 0xFF;

pub const PORT_EXT_IO_SELECT: u8 = 0x40;
pub const PORT_EXT_IO_DATA: u8 = 0x41;
pub const PORT_VDP_DATA: u8 = 0x98;
pub const PORT_VDP_CONTROL: u8 = 0x99;
pub const PORT_RTC_SELECT: u8 = 0xB4;
pub const PORT_RTC_DATA: u8 = 0xB5;

// Main ROM entry points and constants
pub const BIOS_WRTVDP: u16 = 0x0047;
pub const BIOS_CHGCPU: u16 = 0x0180;
pub const BIOS_GETCPU: u16 = 0x0183;
pub const ROM_INTERRUPT_FREQ: u16 = 0x002B;
pub const ROM_MSX_VERSION: u16 = 0x002D;

// System variables
pub const RAM_RG0SAV: u16 = 0xF3DF;
pub const RAM_RG8SAV: u16 = 0xFFE7;

pub const FLAG_S: u8 = 0b1000_0000;
pub const FLAG_Z: u8 = 0b0100_0000;

/// Register file handed to and returned from probe code and BIOS calls.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeRegisters {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub h: u8,
    pub l: u8,
}

impl ProbeRegisters {
    pub fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }
}

/// A calibrated busy-wait loop: `iterations` passes of a body costing `t_states`
/// Z80 T-states each, M1 wait state included.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusyLoop {
    pub iterations: u32,
    pub t_states: u32,
}

impl BusyLoop {
    pub fn total_t_states(&self) -> u64 {
        self.iterations as u64 * self.t_states as u64
    }
}

/// Port access and raster position. This is all an interrupt handler may use.
pub trait IoBus {
    fn io_read_u8(&mut self, port: u8) -> u8;
    fn io_write_u8(&mut self, port: u8, data: u8);
    /// The raster line the video chip is currently scanning, counted from the first
    /// active display line.
    fn scanline(&mut self) -> u16;
}

/// Code run from the host's maskable interrupt vector.
pub trait InterruptHandler {
    fn service(&mut self, io: &mut dyn IoBus);
}

pub trait HardwareBus: IoBus {
    fn mem_read_u8(&mut self, address: u16) -> u8;
    fn mem_write_u8(&mut self, address: u16, data: u8);

    /// State of the CPU interrupt flip-flop.
    fn interrupts_enabled(&self) -> bool;
    fn set_interrupts_enabled(&mut self, enabled: bool);

    /// Replace the interrupt hook, returning the previous one. `None` restores the
    /// host's default service routine.
    fn swap_interrupt_handler(&mut self, handler: Option<Box<dyn InterruptHandler>>) -> Option<Box<dyn InterruptHandler>>;

    /// HALT until the next maskable interrupt has been serviced.
    fn wait_for_interrupt(&mut self);

    /// Execute a busy-wait loop. Interrupts taken during the loop are serviced and
    /// stretch its wall-clock duration.
    fn run_busy_loop(&mut self, busy_loop: BusyLoop);

    /// Execute a short instruction sequence and return the resulting registers.
    fn execute(&mut self, code: &[u8], regs: ProbeRegisters) -> ProbeRegisters;

    /// Call a main ROM routine.
    fn bios_call(&mut self, entry: u16, regs: ProbeRegisters) -> ProbeRegisters;
}
