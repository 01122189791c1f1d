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

    timing::mod.rs

    Tick sources and the timing engine.
*/

//! Interrupt-driven timing engine.
//!
//! A measurement installs an interrupt handler that counts ticks into a shared latch,
//! synchronizes on one tick, then runs a fixed busy loop with interrupts enabled. The
//! number of ticks counted during the loop measures how long the loop took.
//!
//! Two tick sources exist. [FrameTicks] counts the vertical blanking interrupt only.
//! [InterleavedTicks] adds a line interrupt halfway between frame interrupts, doubling
//! the resolution on chips that have one.

pub mod frequency;

use std::{
    cell::Cell,
    fmt::Debug,
    marker::PhantomData,
    num::NonZeroU32,
    rc::Rc,
};

use strum_macros::Display;

pub use frequency::{compute_frequency, Calibration, TimingSample};

use crate::{
    bus::{BusyLoop, HardwareBus, InterruptHandler, InterruptHook, IoBus},
    machine_types::TvStandard,
    vdp::{
        self,
        StatusRegister0,
        StatusRegister1,
        VdpRegisterGuard,
        MODE0_IE1,
        MODE1_IE0,
        REG_LINE_INTERRUPT,
        REG_MODE0,
        REG_MODE1,
        REG_STATUS_SELECT,
    },
};

/// The timed loop: `DEC HL / CP H / JP NZ` over HL = 65535, ten times.
pub const BUSY_LOOP: BusyLoop = BusyLoop {
    iterations: 655_350,
    t_states: 23,
};

/// Raster line at which the frame interrupt fires.
pub const FRAME_INTERRUPT_LINE: u16 = 192;

/// Line interrupt targets, swapped at each frame interrupt, placing a tick halfway
/// between frame interrupts. The pair averages out the half line on odd line counts.
pub const NTSC_LINE_TARGETS: [u16; 2] = [61, 62];
pub const PAL_LINE_TARGETS: [u16; 2] = [35, 36];

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum EngineVariant {
    #[strum(to_string = "frame")]
    Frame,
    #[strum(to_string = "interleaved")]
    Interleaved,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum EngineState {
    #[default]
    Idle,
    Armed,
    Measuring,
}

/// Written only by the interrupt handler while a measurement runs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickLatch {
    pub count: u32,
    /// Raster line of the most recent tick.
    pub last_line: u16,
}

pub type SharedLatch = Rc<Cell<TickLatch>>;

fn record_tick(latch: &SharedLatch, line: u16) {
    let mut ticks = latch.get();
    ticks.count = ticks.count.wrapping_add(1);
    ticks.last_line = line;
    latch.set(ticks);
    log::trace!("tick {} at line {}", ticks.count, line);
}

/// An interrupt source the engine can count, with its calibration.
pub trait TickSource: Debug + Sized + 'static {
    const VARIANT: EngineVariant;
    const TICKS_PER_FRAME: u32;

    fn calibration(tv: TvStandard) -> Calibration;

    /// VDP registers the source reprograms, restored after each measurement.
    fn registers_used() -> &'static [u8];

    /// Program the video chip. Called with interrupts disabled.
    fn arm(bus: &mut dyn HardwareBus, tv: TvStandard);

    fn handler(tv: TvStandard, latch: SharedLatch) -> Box<dyn InterruptHandler>;

    fn interrupts_per_second(tv: TvStandard) -> f64 {
        tv.frame_rate() * Self::TICKS_PER_FRAME as f64
    }

    /// Mean raster lines between ticks.
    fn lines_per_tick(tv: TvStandard) -> f64 {
        tv.lines_per_frame() as f64 / Self::TICKS_PER_FRAME as f64
    }
}

/// Frame interrupt only.
#[derive(Copy, Clone, Debug)]
pub struct FrameTicks;

struct FrameTickHandler {
    latch: SharedLatch,
}

impl InterruptHandler for FrameTickHandler {
    fn service(&mut self, io: &mut dyn IoBus) {
        let s0 = StatusRegister0::from_bytes([vdp::read_status(io)]);
        if s0.frame_interrupt() {
            record_tick(&self.latch, FRAME_INTERRUPT_LINE);
        }
    }
}

impl TickSource for FrameTicks {
    const VARIANT: EngineVariant = EngineVariant::Frame;
    const TICKS_PER_FRAME: u32 = 1;

    fn calibration(tv: TvStandard) -> Calibration {
        match tv {
            TvStandard::Ntsc60 => Calibration {
                seconds_reference: 4.210884,
                offset: 0.005513,
            },
            TvStandard::Pal50 => Calibration {
                seconds_reference: 4.210884,
                offset: 0.004615,
            },
        }
    }

    fn registers_used() -> &'static [u8] {
        &[REG_MODE1]
    }

    fn arm(bus: &mut dyn HardwareBus, _tv: TvStandard) {
        // Clear a stale frame flag so the first tick is a fresh one.
        let _ = vdp::read_status(bus);
        let r1 = vdp::register_mirror(bus, REG_MODE1);
        vdp::write_register(bus, REG_MODE1, r1 | MODE1_IE0);
    }

    fn handler(_tv: TvStandard, latch: SharedLatch) -> Box<dyn InterruptHandler> {
        Box::new(FrameTickHandler { latch })
    }
}

/// Frame interrupt plus a line interrupt between frames. V99x8 only.
#[derive(Copy, Clone, Debug)]
pub struct InterleavedTicks;

impl InterleavedTicks {
    pub fn line_targets(tv: TvStandard) -> [u16; 2] {
        match tv {
            TvStandard::Ntsc60 => NTSC_LINE_TARGETS,
            TvStandard::Pal50 => PAL_LINE_TARGETS,
        }
    }
}

struct InterleavedTickHandler {
    latch: SharedLatch,
    targets: [u16; 2],
    armed: usize,
}

impl InterruptHandler for InterleavedTickHandler {
    fn service(&mut self, io: &mut dyn IoBus) {
        vdp::select_status(io, 1);
        let s1 = StatusRegister1::from_bytes([vdp::read_status(io)]);
        vdp::select_status(io, 0);
        let s0 = StatusRegister0::from_bytes([vdp::read_status(io)]);

        if s1.line_interrupt() {
            record_tick(&self.latch, self.targets[self.armed]);
        }
        if s0.frame_interrupt() {
            record_tick(&self.latch, FRAME_INTERRUPT_LINE);
            // The line counter has passed both targets by now.
            self.armed ^= 1;
            vdp::write_register(io, REG_LINE_INTERRUPT, self.targets[self.armed] as u8);
        }
    }
}

impl TickSource for InterleavedTicks {
    const VARIANT: EngineVariant = EngineVariant::Interleaved;
    const TICKS_PER_FRAME: u32 = 2;

    fn calibration(tv: TvStandard) -> Calibration {
        match tv {
            TvStandard::Ntsc60 => Calibration {
                seconds_reference: 4.210884,
                offset: 0.019655,
            },
            TvStandard::Pal50 => Calibration {
                seconds_reference: 4.210884,
                offset: 0.016452,
            },
        }
    }

    fn registers_used() -> &'static [u8] {
        &[REG_MODE1, REG_MODE0, REG_LINE_INTERRUPT, REG_STATUS_SELECT]
    }

    fn arm(bus: &mut dyn HardwareBus, tv: TvStandard) {
        let r1 = vdp::register_mirror(bus, REG_MODE1);
        let r0 = vdp::register_mirror(bus, REG_MODE0);
        vdp::write_register(bus, REG_LINE_INTERRUPT, Self::line_targets(tv)[0] as u8);
        vdp::write_register(bus, REG_MODE0, r0 | MODE0_IE1);
        vdp::write_register(bus, REG_MODE1, r1 | MODE1_IE0);

        vdp::select_status(bus, 1);
        let _ = vdp::read_status(bus);
        vdp::select_status(bus, 0);
        let _ = vdp::read_status(bus);
    }

    fn handler(tv: TvStandard, latch: SharedLatch) -> Box<dyn InterruptHandler> {
        Box::new(InterleavedTickHandler {
            latch,
            targets: Self::line_targets(tv),
            armed: 0,
        })
    }
}

/// Runs measurements with tick source `S`.
///
/// A frame engine can be built anywhere. An interleaved engine comes only from
/// [VideoOps::interleaved_engine](crate::video::VideoOps::interleaved_engine), since
/// on a TMS9918A its R#19 writes would land on R#3:
///
/// ```compile_fail
/// use msxbench_core::timing::{InterleavedTicks, TimingEngine};
///
/// let _engine = TimingEngine::<InterleavedTicks>::new();
/// ```
#[derive(Debug)]
pub struct TimingEngine<S: TickSource> {
    state: Cell<EngineState>,
    _source: PhantomData<S>,
}

impl Default for TimingEngine<FrameTicks> {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingEngine<FrameTicks> {
    pub fn new() -> Self {
        Self::with_source()
    }
}

impl TimingEngine<InterleavedTicks> {
    pub(crate) fn new() -> Self {
        Self::with_source()
    }
}

impl<S: TickSource> TimingEngine<S> {
    fn with_source() -> Self {
        Self {
            state: Cell::new(EngineState::Idle),
            _source: PhantomData,
        }
    }

    pub fn variant(&self) -> EngineVariant {
        S::VARIANT
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    fn set_state(&self, state: EngineState) {
        log::trace!("{} engine: {:?} -> {:?}", S::VARIANT, self.state.get(), state);
        self.state.set(state);
    }

    /// Time one pass of [BUSY_LOOP]. Returns `None` if no tick arrived during the
    /// loop. The interrupt hook, video registers and interrupt mask are restored
    /// before returning.
    pub fn measure_once(&self, bus: &mut dyn HardwareBus, tv: TvStandard) -> Option<TimingSample<S>> {
        let latch: SharedLatch = Rc::new(Cell::new(TickLatch::default()));

        let (ticks, line) = {
            let mut hook = InterruptHook::install(bus, S::handler(tv, Rc::clone(&latch)));
            let mut regs = VdpRegisterGuard::save(&mut *hook, S::registers_used());
            S::arm(&mut *regs, tv);
            self.set_state(EngineState::Armed);

            // Start the loop right behind a tick. The sync tick is not counted.
            regs.set_interrupts_enabled(true);
            regs.wait_for_interrupt();
            regs.set_interrupts_enabled(false);
            let synced = latch.get();
            latch.set(TickLatch {
                count: 0,
                last_line: synced.last_line,
            });

            self.set_state(EngineState::Measuring);
            regs.set_interrupts_enabled(true);
            regs.run_busy_loop(BUSY_LOOP);
            regs.set_interrupts_enabled(false);

            (latch.get(), regs.scanline())
        };
        self.set_state(EngineState::Idle);

        let lines = tv.lines_per_frame();
        let remainder = (line % lines + lines - ticks.last_line % lines) % lines;
        log::debug!(
            "{} engine: {} ticks, {} lines since last tick",
            S::VARIANT,
            ticks.count,
            remainder
        );

        match NonZeroU32::new(ticks.count) {
            Some(raw_count) => Some(TimingSample::new(raw_count, Some(remainder), tv)),
            None => {
                log::warn!("no ticks counted during the timing loop");
                None
            }
        }
    }
}
