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

    bench.rs

    The benchmark session loop.
*/

//! The benchmark session.
//!
//! A [Benchmark] owns the host bus, the detected [MachineProfile] and the video
//! strategy. Its main loop measures, reports to a [MeasurementDisplay], and applies
//! whatever a [CommandSource] asks for between measurements.

use std::str::FromStr;

use crate::{
    bus::HardwareBus,
    detect,
    error::{CommandError, PlatformError},
    machine_types::{EnginePreference, ExtensionKind, TvStandard, REFERENCE_CLOCK_MHZ},
    profile::{MachineProfile, SpeedLevel},
    speed,
    timing::{EngineVariant, FrameTicks, InterleavedTicks, TickSource, TimingEngine, TimingSample},
    video::{VideoOps, VideoStrategy},
};

/// A mode switch requested by the user.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Command {
    #[default]
    None,
    CycleExtension(ExtensionKind),
    ToggleTv,
    Exit,
}

impl FromStr for Command {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "none" | "wait" => Ok(Command::None),
            "toggle_tv" | "tv" => Ok(Command::ToggleTv),
            "exit" | "quit" => Ok(Command::Exit),
            _ => match s.strip_prefix("cycle:") {
                Some(kind) => Ok(Command::CycleExtension(ExtensionKind::from_str(kind)?)),
                None => Err("Bad value for command".to_string()),
            },
        }
    }
}

/// What a display should relabel after a command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapabilityLabel {
    Extension(ExtensionKind),
    TvStandard,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Idle,
    LevelChanged {
        kind: ExtensionKind,
        level: &'static SpeedLevel,
    },
    TvChanged(TvStandard),
    Exit,
}

/// One measurement, engine type erased for display.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleReport {
    pub variant: EngineVariant,
    pub raw_count: u32,
    pub sub_tick_remainder: Option<u16>,
    pub tv_standard: TvStandard,
    pub estimated_mhz: f64,
}

impl SampleReport {
    pub fn percent_of_reference(&self) -> f64 {
        self.estimated_mhz / REFERENCE_CLOCK_MHZ * 100.0
    }
}

impl<S: TickSource> From<&TimingSample<S>> for SampleReport {
    fn from(sample: &TimingSample<S>) -> Self {
        Self {
            variant: S::VARIANT,
            raw_count: sample.raw_count(),
            sub_tick_remainder: sample.sub_tick_remainder(),
            tv_standard: sample.tv_standard(),
            estimated_mhz: sample.estimated_frequency(),
        }
    }
}

/// The timing engine picked for this machine.
#[derive(Debug)]
pub enum MeasurementEngine {
    Frame(TimingEngine<FrameTicks>),
    Interleaved(TimingEngine<InterleavedTicks>),
}

impl MeasurementEngine {
    /// `Auto` takes the interleaved engine where the video chip has a line interrupt.
    pub fn select(preference: EnginePreference, video: &VideoStrategy) -> Self {
        match (preference, video.interleaved_engine()) {
            (EnginePreference::Frame, _) => MeasurementEngine::Frame(TimingEngine::<FrameTicks>::new()),
            (EnginePreference::Auto | EnginePreference::Interleaved, Some(engine)) => {
                MeasurementEngine::Interleaved(engine)
            }
            (EnginePreference::Interleaved, None) => {
                log::warn!(
                    "{} has no line interrupt, using the frame engine",
                    video.generation()
                );
                MeasurementEngine::Frame(TimingEngine::<FrameTicks>::new())
            }
            (EnginePreference::Auto, None) => MeasurementEngine::Frame(TimingEngine::<FrameTicks>::new()),
        }
    }

    pub fn variant(&self) -> EngineVariant {
        match self {
            MeasurementEngine::Frame(engine) => engine.variant(),
            MeasurementEngine::Interleaved(engine) => engine.variant(),
        }
    }

    pub fn measure(&self, bus: &mut dyn HardwareBus, tv: TvStandard) -> Option<SampleReport> {
        match self {
            MeasurementEngine::Frame(engine) => engine.measure_once(bus, tv).as_ref().map(SampleReport::from),
            MeasurementEngine::Interleaved(engine) => engine.measure_once(bus, tv).as_ref().map(SampleReport::from),
        }
    }
}

/// Results panel.
pub trait MeasurementDisplay {
    fn draw_profile(&mut self, profile: &MachineProfile);
    fn draw_measurement(&mut self, report: &SampleReport);
    fn draw_capability_label(&mut self, profile: &MachineProfile, label: CapabilityLabel);
}

/// Polled once per loop iteration.
pub trait CommandSource {
    fn poll_requested_command(&mut self) -> Command;
}

pub struct Benchmark<B: HardwareBus> {
    bus: B,
    profile: MachineProfile,
    video: VideoStrategy,
    engine: MeasurementEngine,
    initial_levels: Vec<(ExtensionKind, usize)>,
    initial_tv: TvStandard,
}

impl<B: HardwareBus> Benchmark<B> {
    /// Profile the host and pick a timing engine.
    pub fn new(mut bus: B, preference: EnginePreference) -> Result<Self, PlatformError> {
        let (profile, video) = detect::detect_profile(&mut bus)?;
        let engine = MeasurementEngine::select(preference, &video);
        log::debug!("using the {} engine", engine.variant());

        let initial_levels = profile
            .present_extensions()
            .map(|ext| (ext.kind(), ext.current_index()))
            .collect();
        let initial_tv = profile.tv_standard();

        Ok(Self {
            bus,
            profile,
            video,
            engine,
            initial_levels,
            initial_tv,
        })
    }

    pub fn profile(&self) -> &MachineProfile {
        &self.profile
    }

    pub fn engine_variant(&self) -> EngineVariant {
        self.engine.variant()
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn measure_once(&mut self) -> Option<SampleReport> {
        self.engine.measure(&mut self.bus, self.profile.tv_standard())
    }

    pub fn apply_command(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::None => Ok(CommandOutcome::Idle),
            Command::Exit => Ok(CommandOutcome::Exit),
            Command::CycleExtension(kind) => {
                let extension = self
                    .profile
                    .extension_mut(kind)
                    .filter(|ext| ext.is_present())
                    .ok_or(CommandError::ExtensionAbsent(kind))?;
                let level =
                    speed::cycle_extension_speed(&mut self.bus, extension)?.ok_or(CommandError::ExtensionAbsent(kind))?;
                Ok(CommandOutcome::LevelChanged { kind, level })
            }
            Command::ToggleTv => {
                let generation = self.video.generation();
                let switch = self
                    .video
                    .tv_switch()
                    .ok_or(CommandError::TvSwitchUnsupported(generation))?;
                let tv = switch.toggle(&mut self.bus, self.profile.tv_standard);
                self.profile.tv_standard = tv;
                Ok(CommandOutcome::TvChanged(tv))
            }
        }
    }

    /// Measure and take commands until an exit command. Returns the number of valid
    /// samples taken.
    pub fn run(&mut self, display: &mut dyn MeasurementDisplay, commands: &mut dyn CommandSource) -> usize {
        display.draw_profile(&self.profile);
        let mut samples = 0;
        loop {
            match self.measure_once() {
                Some(report) => {
                    samples += 1;
                    display.draw_measurement(&report);
                }
                None => log::debug!("invalid sample discarded"),
            }

            match self.apply_command(commands.poll_requested_command()) {
                Ok(CommandOutcome::Exit) => break,
                Ok(CommandOutcome::LevelChanged { kind, .. }) => {
                    display.draw_capability_label(&self.profile, CapabilityLabel::Extension(kind));
                }
                Ok(CommandOutcome::TvChanged(_)) => {
                    display.draw_capability_label(&self.profile, CapabilityLabel::TvStandard);
                }
                Ok(CommandOutcome::Idle) => {}
                Err(e) => log::warn!("{}", e),
            }

            // Let the display settle before the next pass.
            self.bus.wait_for_interrupt();
        }
        samples
    }

    /// Put every extension and the TV standard back the way detection found them and
    /// hand back the bus.
    pub fn shutdown(mut self) -> B {
        for (kind, index) in std::mem::take(&mut self.initial_levels) {
            let Some(extension) = self.profile.extension_mut(kind)
            else {
                continue;
            };
            if extension.current_index() == index {
                continue;
            }
            if let Err(e) = speed::select_extension_level(&mut self.bus, extension, index) {
                log::warn!("restoring {}: {}", kind, e);
            }
        }

        if self.profile.tv_standard != self.initial_tv {
            if let Some(switch) = self.video.tv_switch() {
                switch.set(&mut self.bus, self.initial_tv);
                self.profile.tv_standard = self.initial_tv;
            }
        }
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_str() {
        assert_eq!(Command::from_str("exit"), Ok(Command::Exit));
        assert_eq!(Command::from_str(" Toggle_TV "), Ok(Command::ToggleTv));
        assert_eq!(Command::from_str("wait"), Ok(Command::None));
        assert_eq!(
            Command::from_str("cycle:tides"),
            Ok(Command::CycleExtension(ExtensionKind::TidesRider))
        );
        assert!(Command::from_str("cycle:warp").is_err());
        assert!(Command::from_str("jump").is_err());
    }

    #[test]
    fn test_interleaved_request_on_tms9918_falls_back() {
        let video = VideoStrategy::for_generation(crate::machine_types::VideoChipGeneration::Gen0);
        let engine = MeasurementEngine::select(EnginePreference::Interleaved, &video);
        assert_eq!(engine.variant(), EngineVariant::Frame);
        let engine = MeasurementEngine::select(EnginePreference::Auto, &video);
        assert_eq!(engine.variant(), EngineVariant::Frame);
    }

    #[test]
    fn test_auto_prefers_interleaved_on_v99x8() {
        let video = VideoStrategy::for_generation(crate::machine_types::VideoChipGeneration::Gen1);
        let engine = MeasurementEngine::select(EnginePreference::Auto, &video);
        assert_eq!(engine.variant(), EngineVariant::Interleaved);
        let engine = MeasurementEngine::select(EnginePreference::Frame, &video);
        assert_eq!(engine.variant(), EngineVariant::Frame);
    }
}
