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

    video.rs
*/

//! Per-generation video chip behaviour.
//!
//! The TV standard is read differently on the TMS9918A than on the V99x8 chips, and
//! only the V99x8 chips can switch it or raise line interrupts. The switch capability
//! is a [TvSwitch] handed out only by [V99x8Video], and the same goes for the
//! line-interrupt timing engine.

use enum_dispatch::enum_dispatch;

use crate::{
    bus::{HardwareBus, ProbeRegisters, BIOS_WRTVDP, ROM_INTERRUPT_FREQ},
    machine_types::{TvStandard, VideoChipGeneration},
    timing::{InterleavedTicks, TimingEngine},
    vdp::{self, ModeRegister3, REG_MODE3},
};

/// Bit 7 of the ROM interrupt frequency byte. Set on 50Hz machines.
const ROM_FREQ_50HZ: u8 = 0b1000_0000;

#[enum_dispatch]
pub trait VideoOps {
    fn generation(&self) -> VideoChipGeneration;
    fn read_tv_standard(&self, bus: &mut dyn HardwareBus) -> TvStandard;
    fn supports_line_interrupt(&self) -> bool;
    fn tv_switch(&mut self) -> Option<&mut TvSwitch>;
    /// A timing engine driven by the line interrupt, if the chip has one.
    fn interleaved_engine(&self) -> Option<TimingEngine<InterleavedTicks>>;
}

#[enum_dispatch(VideoOps)]
#[derive(Debug)]
pub enum VideoStrategy {
    Tms9918Video,
    V99x8Video,
}

impl VideoStrategy {
    pub fn for_generation(generation: VideoChipGeneration) -> Self {
        match generation {
            VideoChipGeneration::Gen0 => Tms9918Video.into(),
            VideoChipGeneration::Gen1 | VideoChipGeneration::Gen2 => V99x8Video::new(generation).into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Tms9918Video;

impl VideoOps for Tms9918Video {
    fn generation(&self) -> VideoChipGeneration {
        VideoChipGeneration::Gen0
    }

    /// The refresh rate is fixed at manufacture and recorded in the main ROM.
    fn read_tv_standard(&self, bus: &mut dyn HardwareBus) -> TvStandard {
        if bus.mem_read_u8(ROM_INTERRUPT_FREQ) & ROM_FREQ_50HZ != 0 {
            TvStandard::Pal50
        }
        else {
            TvStandard::Ntsc60
        }
    }

    fn supports_line_interrupt(&self) -> bool {
        false
    }

    fn tv_switch(&mut self) -> Option<&mut TvSwitch> {
        None
    }

    fn interleaved_engine(&self) -> Option<TimingEngine<InterleavedTicks>> {
        None
    }
}

#[derive(Debug)]
pub struct V99x8Video {
    generation: VideoChipGeneration,
    switch: TvSwitch,
}

impl V99x8Video {
    pub fn new(generation: VideoChipGeneration) -> Self {
        Self {
            generation,
            switch: TvSwitch { _private: () },
        }
    }
}

impl VideoOps for V99x8Video {
    fn generation(&self) -> VideoChipGeneration {
        self.generation
    }

    /// R#9 is write only, so the BIOS mirror is authoritative.
    fn read_tv_standard(&self, bus: &mut dyn HardwareBus) -> TvStandard {
        let r9 = ModeRegister3::from_bytes([vdp::register_mirror(bus, REG_MODE3)]);
        if r9.pal() {
            TvStandard::Pal50
        }
        else {
            TvStandard::Ntsc60
        }
    }

    fn supports_line_interrupt(&self) -> bool {
        true
    }

    fn tv_switch(&mut self) -> Option<&mut TvSwitch> {
        Some(&mut self.switch)
    }

    fn interleaved_engine(&self) -> Option<TimingEngine<InterleavedTicks>> {
        Some(TimingEngine::<InterleavedTicks>::new())
    }
}

/// Ability to switch the display between 50Hz and 60Hz.
#[derive(Debug)]
pub struct TvSwitch {
    _private: (),
}

impl TvSwitch {
    /// Switch away from `current` and return the new standard.
    pub fn toggle(&mut self, bus: &mut dyn HardwareBus, current: TvStandard) -> TvStandard {
        let next = current.toggled();
        self.set(bus, next);
        next
    }

    /// Update the R#9 mirror and write it through the BIOS.
    pub fn set(&mut self, bus: &mut dyn HardwareBus, tv: TvStandard) {
        let r9 = ModeRegister3::from_bytes([vdp::register_mirror(bus, REG_MODE3)]).with_pal(tv == TvStandard::Pal50);
        let value = r9.into_bytes()[0];
        log::debug!("setting {} (R#9 = {:02X})", tv, value);
        if let Some(address) = vdp::register_mirror_address(REG_MODE3) {
            bus.mem_write_u8(address, value);
        }
        bus.bios_call(
            BIOS_WRTVDP,
            ProbeRegisters {
                b: value,
                c: REG_MODE3,
                ..Default::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::EngineVariant;

    #[test]
    fn test_gen0_has_no_tv_switch() {
        let mut video = VideoStrategy::for_generation(VideoChipGeneration::Gen0);
        assert!(video.tv_switch().is_none());
        assert!(!video.supports_line_interrupt());
    }

    #[test]
    fn test_interleaved_engine_only_on_v99x8() {
        let tms = VideoStrategy::for_generation(VideoChipGeneration::Gen0);
        assert!(tms.interleaved_engine().is_none());

        let v9938 = VideoStrategy::for_generation(VideoChipGeneration::Gen1);
        let engine = v9938.interleaved_engine();
        assert_eq!(engine.map(|e| e.variant()), Some(EngineVariant::Interleaved));
    }

    #[test]
    fn test_v99x8_has_tv_switch() {
        for generation in [VideoChipGeneration::Gen1, VideoChipGeneration::Gen2] {
            let mut video = VideoStrategy::for_generation(generation);
            assert!(video.tv_switch().is_some());
            assert_eq!(video.generation(), generation);
        }
    }
}
