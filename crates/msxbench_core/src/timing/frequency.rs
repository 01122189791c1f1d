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

    timing::frequency.rs
*/

//! Conversion of interrupt counts into an effective CPU frequency.
//!
//! The busy loop takes a known number of reference-clock seconds on a stock machine.
//! Counting ticks during the loop gives the elapsed time on this machine, and the ratio
//! gives the clock. Each tick source carries its own calibration per TV standard, and a
//! [TimingSample] can only be converted with the calibration of the source that
//! produced it:
//!
//! ```compile_fail
//! use std::num::NonZeroU32;
//! use msxbench_core::machine_types::TvStandard;
//! use msxbench_core::timing::{compute_frequency, FrameTicks, InterleavedTicks, TimingSample};
//!
//! let sample = TimingSample::<FrameTicks>::new(NonZeroU32::new(252).unwrap(), None, TvStandard::Ntsc60);
//! let _ = compute_frequency::<InterleavedTicks>(&sample);
//! ```

use std::{marker::PhantomData, num::NonZeroU32};

use crate::{
    machine_types::{TvStandard, REFERENCE_CLOCK_MHZ},
    timing::TickSource,
};

/// Empirical constants pairing a tick source with a TV standard.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Duration of the busy loop on a reference machine, in seconds.
    pub seconds_reference: f64,
    /// Added to the estimate to cancel interrupt service overhead, in MHz.
    pub offset: f64,
}

/// Result of one measurement pass by a tick source `S`.
#[derive(Debug)]
pub struct TimingSample<S: TickSource> {
    raw_count: NonZeroU32,
    sub_tick_remainder: Option<u16>,
    tv_standard: TvStandard,
    _source: PhantomData<S>,
}

impl<S: TickSource> Clone for TimingSample<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: TickSource> Copy for TimingSample<S> {}

impl<S: TickSource> TimingSample<S> {
    /// `sub_tick_remainder` is the number of raster lines between the last counted
    /// tick and the end of the loop.
    pub fn new(raw_count: NonZeroU32, sub_tick_remainder: Option<u16>, tv_standard: TvStandard) -> Self {
        Self {
            raw_count,
            sub_tick_remainder,
            tv_standard,
            _source: PhantomData,
        }
    }

    pub fn raw_count(&self) -> u32 {
        self.raw_count.get()
    }

    pub fn sub_tick_remainder(&self) -> Option<u16> {
        self.sub_tick_remainder
    }

    pub fn tv_standard(&self) -> TvStandard {
        self.tv_standard
    }

    /// Tick count including the fraction of a tick elapsed after the last one.
    pub fn fractional_count(&self) -> f64 {
        let fraction = self
            .sub_tick_remainder
            .map_or(0.0, |lines| (lines as f64 / S::lines_per_tick(self.tv_standard)).clamp(0.0, 1.0));
        self.raw_count.get() as f64 + fraction
    }

    pub fn estimated_frequency(&self) -> f64 {
        compute_frequency(self)
    }
}

/// Effective CPU frequency in MHz for `sample`, using `S`'s calibration for the TV
/// standard the sample was taken under.
///
/// A higher count means the loop took longer, so the estimate falls as the count rises.
pub fn compute_frequency<S: TickSource>(sample: &TimingSample<S>) -> f64 {
    let tv = sample.tv_standard;
    let calibration = S::calibration(tv);
    let elapsed_seconds = sample.fractional_count() / S::interrupts_per_second(tv);
    calibration.seconds_reference * REFERENCE_CLOCK_MHZ / elapsed_seconds + calibration.offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{FrameTicks, InterleavedTicks};

    fn frame_sample(raw: u32, remainder: Option<u16>) -> TimingSample<FrameTicks> {
        TimingSample::new(NonZeroU32::new(raw).unwrap(), remainder, TvStandard::Ntsc60)
    }

    #[test]
    fn test_frequency_falls_as_count_rises() {
        let mut last = f64::INFINITY;
        for raw in 50..2000 {
            let mhz = frame_sample(raw, None).estimated_frequency();
            assert!(mhz < last, "raw {} gave {} after {}", raw, mhz, last);
            last = mhz;
        }
    }

    #[test]
    fn test_reference_count_gives_reference_clock() {
        let mhz = frame_sample(252, Some(189)).estimated_frequency();
        assert!((mhz - REFERENCE_CLOCK_MHZ).abs() < 0.01, "got {}", mhz);
    }

    #[test]
    fn test_remainder_adds_fraction() {
        let whole = frame_sample(252, None).fractional_count();
        let half = frame_sample(252, Some(131)).fractional_count();
        assert_eq!(whole, 252.0);
        assert!((half - 252.5).abs() < 1e-9);
    }

    #[test]
    fn test_pal_sample_uses_pal_calibration() {
        let pal = TimingSample::<FrameTicks>::new(NonZeroU32::new(211).unwrap(), Some(152), TvStandard::Pal50);
        let mhz = compute_frequency(&pal);
        assert!((mhz - REFERENCE_CLOCK_MHZ).abs() < 0.01, "got {}", mhz);

        // Same count read as NTSC would be a different machine entirely.
        let ntsc = frame_sample(211, Some(152));
        assert!((compute_frequency(&ntsc) - mhz).abs() > 0.5);
    }

    #[test]
    fn test_interleaved_doubles_resolution() {
        let frame = frame_sample(252, None).estimated_frequency();
        let interleaved =
            TimingSample::<InterleavedTicks>::new(NonZeroU32::new(504).unwrap(), None, TvStandard::Ntsc60)
                .estimated_frequency();
        assert!((frame - interleaved).abs() < 0.05);
    }
}
