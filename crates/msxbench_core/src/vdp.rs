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

    vdp.rs
*/

//! Video chip register access through the control port, and bit views of the status
//! and mode registers.
//!
//! Two-byte sequences on port 0x99 share a single latch with status reads, so any
//! sequence written here must run with interrupts disabled or from inside an interrupt
//! handler.

use std::ops::{Deref, DerefMut};

use modular_bitfield::prelude::*;

use crate::bus::{HardwareBus, IoBus, PORT_VDP_CONTROL, RAM_RG0SAV, RAM_RG8SAV};

pub const REG_MODE0: u8 = 0;
pub const REG_MODE1: u8 = 1;
pub const REG_COLOR: u8 = 7;
pub const REG_MODE3: u8 = 9;
pub const REG_STATUS_SELECT: u8 = 15;
pub const REG_LINE_INTERRUPT: u8 = 19;

/// R#0 bit enabling the line interrupt (IE1).
pub const MODE0_IE1: u8 = 0b0001_0000;
/// R#1 bit enabling the frame interrupt (IE0).
pub const MODE1_IE0: u8 = 0b0010_0000;

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct StatusRegister0 {
    pub fifth_sprite_number: B5,
    pub collision: bool,
    pub fifth_sprite: bool,
    pub frame_interrupt: bool,
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct StatusRegister1 {
    pub line_interrupt: bool,
    pub chip_id: B5,
    pub light_pen_switch: bool,
    pub light_pen: bool,
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct StatusRegister2 {
    pub command_executing: bool,
    pub even_odd: bool,
    #[skip]
    __: B2,
    pub border_detect: bool,
    pub horizontal_retrace: bool,
    pub vertical_retrace: bool,
    pub transfer_ready: bool,
}

/// R#9
#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct ModeRegister3 {
    pub dot_clock: bool,
    pub pal: bool,
    pub even_odd: bool,
    pub interlace: bool,
    pub simultaneous_mode: B2,
    #[skip]
    __: B1,
    pub lines_212: bool,
}

pub fn write_register<B: IoBus + ?Sized>(io: &mut B, reg: u8, value: u8) {
    io.io_write_u8(PORT_VDP_CONTROL, value);
    io.io_write_u8(PORT_VDP_CONTROL, 0x80 | reg);
}

/// Point status reads at S#`status`.
pub fn select_status<B: IoBus + ?Sized>(io: &mut B, status: u8) {
    write_register(io, REG_STATUS_SELECT, status);
}

pub fn read_status<B: IoBus + ?Sized>(io: &mut B) -> u8 {
    io.io_read_u8(PORT_VDP_CONTROL)
}

pub fn set_vram_write_address<B: IoBus + ?Sized>(io: &mut B, address: u16) {
    io.io_write_u8(PORT_VDP_CONTROL, address as u8);
    io.io_write_u8(PORT_VDP_CONTROL, 0x40 | ((address >> 8) as u8 & 0x3F));
}

/// Set a read address; the chip prefetches the first byte into its read-ahead latch.
pub fn set_vram_read_address<B: IoBus + ?Sized>(io: &mut B, address: u16) {
    io.io_write_u8(PORT_VDP_CONTROL, address as u8);
    io.io_write_u8(PORT_VDP_CONTROL, (address >> 8) as u8 & 0x3F);
}

/// Address of the BIOS RAM copy of a write-only register, if the BIOS keeps one.
pub fn register_mirror_address(reg: u8) -> Option<u16> {
    match reg {
        0..=7 => Some(RAM_RG0SAV + reg as u16),
        8..=23 => Some(RAM_RG8SAV + (reg - 8) as u16),
        _ => None,
    }
}

/// Last value the BIOS wrote to `reg`. Registers without a mirror read as zero, which
/// is the state the BIOS expects them in.
pub fn register_mirror(bus: &mut dyn HardwareBus, reg: u8) -> u8 {
    register_mirror_address(reg).map_or(0, |address| bus.mem_read_u8(address))
}

/// Write a register and keep its BIOS mirror in step.
pub fn write_register_mirrored(bus: &mut dyn HardwareBus, reg: u8, value: u8) {
    write_register(bus, reg, value);
    if let Some(address) = register_mirror_address(reg) {
        bus.mem_write_u8(address, value);
    }
}

/// Saves a set of registers and writes them back, in reverse order, when dropped.
///
/// Saved values come from the BIOS mirrors, since the registers themselves are write
/// only. The write-back runs with interrupts disabled.
pub struct VdpRegisterGuard<'a> {
    bus: &'a mut dyn HardwareBus,
    saved: Vec<(u8, u8)>,
}

impl<'a> VdpRegisterGuard<'a> {
    pub fn save(bus: &'a mut dyn HardwareBus, registers: &[u8]) -> Self {
        let saved = registers.iter().map(|&reg| (reg, register_mirror(bus, reg))).collect();
        Self { bus, saved }
    }
}

impl<'a> Deref for VdpRegisterGuard<'a> {
    type Target = dyn HardwareBus + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.bus
    }
}

impl<'a> DerefMut for VdpRegisterGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.bus
    }
}

impl Drop for VdpRegisterGuard<'_> {
    fn drop(&mut self) {
        let was_enabled = self.bus.interrupts_enabled();
        self.bus.set_interrupts_enabled(false);
        for &(reg, value) in self.saved.iter().rev() {
            log::trace!("restoring R#{} = {:02X}", reg, value);
            write_register(&mut *self.bus, reg, value);
        }
        if was_enabled {
            self.bus.set_interrupts_enabled(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_views() {
        let s0 = StatusRegister0::from_bytes([0x80]);
        assert!(s0.frame_interrupt());
        assert!(!s0.fifth_sprite());

        let s1 = StatusRegister1::from_bytes([0b0000_0101]);
        assert!(s1.line_interrupt());
        assert_eq!(s1.chip_id(), 2);

        let s2 = StatusRegister2::from_bytes([0b0100_1100]);
        assert!(s2.vertical_retrace());
        assert!(!s2.horizontal_retrace());
    }

    #[test]
    fn test_mode_register_pal_bit() {
        let r9 = ModeRegister3::from_bytes([0x80]).with_pal(true);
        assert_eq!(r9.into_bytes()[0], 0x82);
        assert!(!ModeRegister3::from_bytes([0x82]).with_pal(false).pal());
    }

    #[test]
    fn test_mirror_addresses() {
        assert_eq!(register_mirror_address(7), Some(0xF3E6));
        assert_eq!(register_mirror_address(9), Some(0xFFE8));
        assert_eq!(register_mirror_address(19), Some(0xFFF2));
        assert_eq!(register_mirror_address(15), None);
    }
}
