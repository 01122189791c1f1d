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

    console.rs
*/

//! Text display of the machine profile and measurement results.

use colored::*;
use strum::IntoEnumIterator;

use msxbench_core::{
    bench::{CapabilityLabel, MeasurementDisplay, SampleReport},
    machine_types::ExtensionKind,
    profile::{BoostExtension, MachineProfile},
};

pub const BAR_WIDTH: usize = 40;
/// Percent of the reference clock a full bar represents.
pub const BAR_FULL_SCALE: f64 = 400.0;

/// Prints to stdout and keeps the running summary shown at exit.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    pub samples: usize,
    pub last: Option<SampleReport>,
    pub peak_mhz: f64,
}

pub fn speed_bar(percent: f64) -> String {
    let filled = ((percent / BAR_FULL_SCALE) * BAR_WIDTH as f64).round();
    let filled = (filled.max(0.0) as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn extension_line(extension: &BoostExtension) -> String {
    match extension.current_level() {
        Some(level) if extension.is_present() => {
            format!("{:<16} {} ({:.2} MHz)", extension.kind().to_string(), level.label, level.nominal_mhz)
        }
        _ => format!("{:<16} not present", extension.kind().to_string()),
    }
}

pub fn measurement_line(report: &SampleReport) -> String {
    let remainder = match report.sub_tick_remainder {
        Some(lines) => format!("+{} lines", lines),
        None => String::new(),
    };
    format!(
        "{:>9.6} MHz {:>6.1}% {} {:>5} ticks {:<10} {} {}",
        report.estimated_mhz,
        report.percent_of_reference(),
        speed_bar(report.percent_of_reference()),
        report.raw_count,
        remainder,
        report.tv_standard,
        report.variant,
    )
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        match &self.last {
            Some(report) => println!(
                "{} samples, last {:.6} MHz, peak {:.6} MHz",
                self.samples.to_string().bright_blue(),
                report.estimated_mhz,
                self.peak_mhz
            ),
            None => println!("{}", "No valid samples were taken.".red()),
        }
    }
}

impl MeasurementDisplay for ConsoleDisplay {
    fn draw_profile(&mut self, profile: &MachineProfile) {
        println!("{}", "MSXBench".bright_blue().bold());
        println!("Machine:   {}", profile.machine_generation());
        println!("Brand:     {} ({})", profile.brand_name(), profile.machine_brand_id());
        println!("CPU:       {}", profile.cpu_description());
        println!("Video:     {}", profile.video_chip_generation());
        println!("TV:        {}", profile.tv_standard());
        for kind in ExtensionKind::iter() {
            if let Some(extension) = profile.extension(kind) {
                println!("  {}", extension_line(extension));
            }
        }
        println!();
    }

    fn draw_measurement(&mut self, report: &SampleReport) {
        self.samples += 1;
        self.peak_mhz = self.peak_mhz.max(report.estimated_mhz);
        self.last = Some(*report);
        println!("{}", measurement_line(report));
    }

    fn draw_capability_label(&mut self, profile: &MachineProfile, label: CapabilityLabel) {
        match label {
            CapabilityLabel::Extension(kind) => {
                if let Some(extension) = profile.extension(kind) {
                    println!("{} {}", ">>".yellow(), extension_line(extension));
                }
            }
            CapabilityLabel::TvStandard => {
                println!("{} TV standard: {}", ">>".yellow(), profile.tv_standard());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msxbench_core::{machine_types::TvStandard, timing::EngineVariant};

    fn report(estimated_mhz: f64) -> SampleReport {
        SampleReport {
            variant: EngineVariant::Frame,
            raw_count: 252,
            sub_tick_remainder: Some(187),
            tv_standard: TvStandard::Ntsc60,
            estimated_mhz,
        }
    }

    #[test]
    fn test_speed_bar_scale() {
        assert_eq!(speed_bar(0.0), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(speed_bar(100.0).matches('#').count(), BAR_WIDTH / 4);
        assert_eq!(speed_bar(1000.0).matches('#').count(), BAR_WIDTH);
        assert_eq!(speed_bar(-5.0).matches('#').count(), 0);
    }

    #[test]
    fn test_measurement_line() {
        let line = measurement_line(&report(3.579545));
        assert!(line.contains("3.579545 MHz"));
        assert!(line.contains("100.0%"));
        assert!(line.contains("+187 lines"));
        assert!(line.contains("NTSC 60Hz"));
    }

    #[test]
    fn test_display_tracks_peak() {
        let mut display = ConsoleDisplay::new();
        display.draw_measurement(&report(7.15909));
        display.draw_measurement(&report(3.579545));
        assert_eq!(display.samples, 2);
        assert_eq!(display.peak_mhz, 7.15909);
        assert_eq!(display.last.map(|r| r.estimated_mhz), Some(3.579545));
    }
}
