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

    devices::vdp.rs

    Simulated TMS9918A / V9938 / V9958.
*/

//! Register-level model of the TMS9918A / V9938 / V9958 port interface.
//!
//! Timing lives in the machine; this model holds registers, VRAM, the control port
//! latch and the interrupt flags.

use crate::{
    machine_types::VideoChipGeneration,
    vdp::{StatusRegister0, StatusRegister1, StatusRegister2, MODE0_IE1, MODE1_IE0},
};

const TMS_VRAM_SIZE: usize = 0x4000;
const V99X8_VRAM_SIZE: usize = 0x20000;

/// S#1 chip IDs.
const V9938_ID: u8 = 0;
const V9958_ID: u8 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VdpEvent {
    Frame,
    Line,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct RasterPosition {
    pub line: u16,
    pub vblank: bool,
    pub hblank: bool,
}

pub struct SimVdp {
    generation: VideoChipGeneration,
    registers: [u8; 48],
    vram: Vec<u8>,
    address: usize,
    latch: Option<u8>,
    read_ahead: u8,
    frame_flag: bool,
    line_flag: bool,
}

impl SimVdp {
    pub fn new(generation: VideoChipGeneration) -> Self {
        let vram_size = match generation {
            VideoChipGeneration::Gen0 => TMS_VRAM_SIZE,
            _ => V99X8_VRAM_SIZE,
        };
        Self {
            generation,
            registers: [0; 48],
            vram: vec![0; vram_size],
            address: 0,
            latch: None,
            read_ahead: 0,
            frame_flag: false,
            line_flag: false,
        }
    }

    pub fn generation(&self) -> VideoChipGeneration {
        self.generation
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.registers.get(reg as usize).copied().unwrap_or(0)
    }

    pub fn vram_byte(&self, address: usize) -> u8 {
        self.vram[address % self.vram.len()]
    }

    fn register_mask(&self) -> u8 {
        match self.generation {
            VideoChipGeneration::Gen0 => 0x07,
            _ => 0x3F,
        }
    }

    /// Control port write. Returns the register and value if this completed a
    /// register write.
    pub fn write_control(&mut self, data: u8) -> Option<(u8, u8)> {
        let Some(first) = self.latch.take() else {
            self.latch = Some(data);
            return None;
        };
        if data & 0x80 != 0 {
            let reg = data & self.register_mask();
            if let Some(slot) = self.registers.get_mut(reg as usize) {
                *slot = first;
            }
            log::trace!("VDP R#{} = {:02X}", reg, first);
            return Some((reg, first));
        }
        self.address = (first as usize | ((data as usize & 0x3F) << 8)) % self.vram.len();
        if data & 0x40 == 0 {
            // Read setup prefetches.
            self.read_ahead = self.vram[self.address];
            self.address = (self.address + 1) % self.vram.len();
        }
        None
    }

    pub fn read_status(&mut self, raster: RasterPosition) -> u8 {
        self.latch = None;
        let status = match self.generation {
            VideoChipGeneration::Gen0 => 0,
            _ => self.registers[15] & 0x0F,
        };
        match status {
            0 => {
                let s0 = StatusRegister0::new().with_frame_interrupt(self.frame_flag);
                self.frame_flag = false;
                s0.into_bytes()[0]
            }
            1 => {
                let id = match self.generation {
                    VideoChipGeneration::Gen2 => V9958_ID,
                    _ => V9938_ID,
                };
                let s1 = StatusRegister1::new()
                    .with_line_interrupt(self.line_flag)
                    .with_chip_id(id);
                self.line_flag = false;
                s1.into_bytes()[0]
            }
            2 => StatusRegister2::from_bytes([0b0000_1100])
                .with_vertical_retrace(raster.vblank)
                .with_horizontal_retrace(raster.hblank)
                .into_bytes()[0],
            _ => 0,
        }
    }

    pub fn write_data(&mut self, data: u8) {
        self.latch = None;
        self.vram[self.address] = data;
        self.read_ahead = data;
        self.address = (self.address + 1) % self.vram.len();
    }

    pub fn read_data(&mut self) -> u8 {
        self.latch = None;
        let data = self.read_ahead;
        self.read_ahead = self.vram[self.address];
        self.address = (self.address + 1) % self.vram.len();
        data
    }

    pub fn raise(&mut self, event: VdpEvent) {
        match event {
            VdpEvent::Frame => self.frame_flag = true,
            VdpEvent::Line => self.line_flag = true,
        }
    }

    /// State of the INT output.
    pub fn irq(&self) -> bool {
        (self.frame_flag && self.registers[1] & MODE1_IE0 != 0) || (self.line_flag && self.line_interrupt_enabled())
    }

    pub fn any_interrupt_enabled(&self) -> bool {
        self.registers[1] & MODE1_IE0 != 0 || self.line_interrupt_enabled()
    }

    fn line_interrupt_enabled(&self) -> bool {
        self.generation != VideoChipGeneration::Gen0 && self.registers[0] & MODE0_IE1 != 0
    }

    /// Line compared against for the line interrupt, while it is enabled.
    pub fn line_interrupt_target(&self) -> Option<u16> {
        self.line_interrupt_enabled().then(|| self.registers[19] as u16)
    }

    /// PAL timing selected in R#9. Not software controlled on the TMS9918A.
    pub fn pal_selected(&self) -> Option<bool> {
        match self.generation {
            VideoChipGeneration::Gen0 => None,
            _ => Some(self.registers[9] & 0b10 != 0),
        }
    }
}
