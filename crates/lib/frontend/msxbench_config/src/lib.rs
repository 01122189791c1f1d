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

    msxbench_config::lib.rs
*/

//! msxbench_config reads the TOML configuration file and overlays command line
//! arguments on top of the configuration file settings.
//! We always consider command line arguments to take priority over the configuration
//! file.
//!
//! Features:
//! - `use_bpaf`: Enable BPAF support for command line argument parsing.

mod cmdline;

use std::path::Path;

use cfg_if::cfg_if;
use serde_derive::Deserialize;

pub use cmdline::CmdLineArgs;
#[cfg(feature = "use_bpaf")]
use cmdline::cli_args;

use msxbench_core::{
    devices::{CpuModel, MachineSpec},
    machine_types::{EnginePreference, TvStandard, VideoChipGeneration, REFERENCE_CLOCK_MHZ},
};

const fn _default_samples() -> u32 {
    1
}
const fn _default_clock_mhz() -> f64 {
    REFERENCE_CLOCK_MHZ
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub engine: EnginePreference,
    /// Measurements taken before each scripted command.
    #[serde(default = "_default_samples")]
    pub samples_per_step: u32,
    /// Commands to issue, in order. The session exits when the script runs out.
    #[serde(default)]
    pub script: Vec<String>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            engine: EnginePreference::default(),
            samples_per_step: _default_samples(),
            script: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtensionConfig {
    /// Present, and whether it starts in turbo.
    pub panasonic_turbo: Option<bool>,
    /// Present, and the starting CHGCPU mode.
    pub turbo_r: Option<u8>,
    /// Present, and the starting speed code.
    pub tides_rider: Option<u8>,
    #[serde(default)]
    pub ocm_pld: bool,
}

#[derive(Debug, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub cpu: CpuModel,
    #[serde(default)]
    pub cmos: bool,
    #[serde(default = "_default_clock_mhz")]
    pub clock_mhz: f64,
    #[serde(default)]
    pub video: VideoChipGeneration,
    #[serde(default)]
    pub tv_standard: TvStandard,
    #[serde(default)]
    pub msx_version: u8,
    #[serde(default)]
    pub maker_id: u8,
    #[serde(default)]
    pub extensions: ExtensionConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cpu: CpuModel::default(),
            cmos: false,
            clock_mhz: _default_clock_mhz(),
            video: VideoChipGeneration::default(),
            tv_standard: TvStandard::default(),
            msx_version: 0,
            maker_id: 0,
            extensions: ExtensionConfig::default(),
        }
    }
}

impl MachineConfig {
    /// The simulated machine this section describes.
    pub fn machine_spec(&self) -> MachineSpec {
        MachineSpec {
            cpu: self.cpu,
            cmos: self.cmos,
            base_clock_hz: self.clock_mhz * 1_000_000.0,
            video: self.video,
            tv_standard: self.tv_standard,
            msx_version: self.msx_version,
            maker_id: self.maker_id,
            panasonic_turbo: self.extensions.panasonic_turbo,
            turbo_r: self.extensions.turbo_r,
            tides_rider: self.extensions.tides_rider,
            ocm_pld: self.extensions.ocm_pld,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub machine: MachineConfig,
}

impl ConfigFileParams {
    pub fn overlay(&mut self, shell_args: CmdLineArgs) {
        if let Some(engine) = shell_args.engine {
            self.benchmark.engine = engine;
        }
        if let Some(samples) = shell_args.samples_per_step {
            self.benchmark.samples_per_step = samples;
        }
        if let Some(script_string) = shell_args.script {
            // Split comma-separated list of commands into vector of strings
            self.benchmark.script = script_string
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(cpu) = shell_args.cpu {
            self.machine.cpu = cpu;
        }
        self.machine.cmos |= shell_args.cmos;
        if let Some(clock_mhz) = shell_args.clock_mhz {
            self.machine.clock_mhz = clock_mhz;
        }
        if let Some(video) = shell_args.video {
            self.machine.video = video;
        }
        if let Some(tv_standard) = shell_args.tv_standard {
            self.machine.tv_standard = tv_standard;
        }
        if let Some(msx_version) = shell_args.msx_version {
            self.machine.msx_version = msx_version;
        }
        if let Some(maker_id) = shell_args.maker_id {
            self.machine.maker_id = maker_id;
        }

        let extensions = &mut self.machine.extensions;
        if shell_args.panasonic_turbo && extensions.panasonic_turbo.is_none() {
            extensions.panasonic_turbo = Some(false);
        }
        if let Some(mode) = shell_args.turbo_r {
            extensions.turbo_r = Some(mode);
        }
        if let Some(speed) = shell_args.tides_rider {
            extensions.tides_rider = Some(speed);
        }
        extensions.ocm_pld |= shell_args.ocm_pld;
    }
}

pub fn read_config(toml_string: impl AsRef<str>, shell_args: CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error> {
    let mut toml_args: ConfigFileParams = toml::from_str(toml_string.as_ref())?;
    log::debug!("toml_config: {:?}", toml_args);

    // Command line arguments override config file arguments
    toml_args.overlay(shell_args);
    Ok(toml_args)
}

fn shell_args() -> CmdLineArgs {
    let shell_args: CmdLineArgs;

    cfg_if! {
        if #[cfg(feature = "use_bpaf")] {
            log::debug!("Reading command line arguments...");
            shell_args = cli_args().run();
        } else {
            log::debug!("Argument reading disabled...");
            shell_args = CmdLineArgs::default();
        }
    }
    shell_args
}

/// Read the TOML configuration from a file path, parse and overlay command line arguments.
pub fn read_config_file<P>(default_path: P) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    let shell_args = shell_args();

    // Allow configuration file path to be overridden by command line argument 'config_file'
    let toml_string = if let Some(configfile_path) = shell_args.config_file.as_ref() {
        std::fs::read_to_string(configfile_path)?
    }
    else {
        std::fs::read_to_string(default_path)?
    };

    read_config(toml_string, shell_args)
}

/// Read the TOML configuration from a string, parse and overlay command line arguments.
pub fn read_config_string(toml_string: impl AsRef<str>) -> Result<ConfigFileParams, anyhow::Error> {
    read_config(toml_string, shell_args())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[benchmark]
engine = "interleaved"
samples_per_step = 3
script = ["wait", "cycle:tides", "toggle_tv"]

[machine]
cpu = "Z80"
cmos = true
video = "V9958"
tv_standard = "PAL"
msx_version = 2
maker_id = 8

[machine.extensions]
panasonic_turbo = false
tides_rider = 1
"#;

    #[test]
    fn test_read_config() {
        let config = read_config(SAMPLE_CONFIG, CmdLineArgs::default()).expect("parse failed");
        assert_eq!(config.benchmark.engine, EnginePreference::Interleaved);
        assert_eq!(config.benchmark.samples_per_step, 3);
        assert_eq!(config.benchmark.script.len(), 3);

        let spec = config.machine.machine_spec();
        assert!(spec.cmos);
        assert_eq!(spec.video, VideoChipGeneration::Gen2);
        assert_eq!(spec.tv_standard, TvStandard::Pal50);
        assert_eq!(spec.msx_version, 2);
        assert_eq!(spec.panasonic_turbo, Some(false));
        assert_eq!(spec.tides_rider, Some(1));
        assert_eq!(spec.turbo_r, None);
        assert!((spec.base_clock_hz - 3_579_545.0).abs() < 1.0);
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = read_config("", CmdLineArgs::default()).expect("parse failed");
        assert_eq!(config.benchmark.engine, EnginePreference::Auto);
        assert_eq!(config.benchmark.samples_per_step, 1);
        let spec = config.machine.machine_spec();
        assert_eq!(spec.video, VideoChipGeneration::Gen0);
        assert_eq!(spec.panasonic_turbo, None);
        assert!(!spec.ocm_pld);
        assert!((spec.base_clock_hz - MachineSpec::default().base_clock_hz).abs() < 1.0);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let args = CmdLineArgs {
            engine: Some(EnginePreference::Frame),
            script: Some("cycle:ocm, exit".to_string()),
            tv_standard: Some(TvStandard::Ntsc60),
            ocm_pld: true,
            ..Default::default()
        };
        let config = read_config(SAMPLE_CONFIG, args).expect("parse failed");
        assert_eq!(config.benchmark.engine, EnginePreference::Frame);
        assert_eq!(config.benchmark.script, vec!["cycle:ocm".to_string(), "exit".to_string()]);
        assert_eq!(config.machine.tv_standard, TvStandard::Ntsc60);
        assert!(config.machine.extensions.ocm_pld);
        // Untouched by the command line
        assert_eq!(config.benchmark.samples_per_step, 3);
    }

    #[test]
    fn test_bad_value_is_error() {
        assert!(read_config("[machine]\nvideo = \"V9990\"\n", CmdLineArgs::default()).is_err());
    }
}
