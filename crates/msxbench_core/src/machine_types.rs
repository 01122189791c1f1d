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

    machine_types.rs

    Enums and tables describing MSX hardware.
*/

use serde_derive::Deserialize;
use std::str::FromStr;
use strum_macros::{Display, EnumIter};

/// Nominal clock of a stock MSX Z80, in MHz.
pub const REFERENCE_CLOCK_MHZ: f64 = 3.579545;

/// Video chip master clock divided down to the CPU-equivalent rate, in Hz.
pub const VDP_CPU_CLOCK_HZ: f64 = 3_579_545.0;
/// CPU-equivalent clocks per raster line.
pub const CYCLES_PER_LINE: u32 = 228;

/// Maker names indexed by the expanded I/O maker ID. Index 27 is not a maker ID on
/// the bus; it marks a machine identified as an OCM-PLD super board.
pub const MACHINE_BRANDS: [&str; 28] = [
    "Unknown",
    "ASCII",
    "Canon",
    "Casio",
    "Fujitsu",
    "General",
    "Hitachi",
    "Kyocera",
    "Panasonic",
    "Mitsubishi",
    "NEC",
    "Yamaha",
    "JVC",
    "Philips",
    "Pioneer",
    "Sanyo",
    "Sharp",
    "Sony",
    "Spectravideo",
    "Toshiba",
    "Mitsumi",
    "Telematica",
    "Gradiente",
    "Sharp Brasil",
    "GoldStar",
    "Daewoo",
    "Samsung",
    "OCM/MSX++",
];

/// Highest maker ID answered on the expanded I/O selector.
pub const MAX_MAKER_ID: u8 = 26;
/// Brand code reserved for OCM-PLD based machines.
pub const BRAND_OCM_PLD: u8 = 27;

pub fn brand_name(brand: u8) -> &'static str {
    MACHINE_BRANDS.get(brand as usize).copied().unwrap_or(MACHINE_BRANDS[0])
}

/// The processor family as seen by the instruction probes.
#[derive(Copy, Clone, Debug, Default, Display, Hash, Eq, PartialEq)]
pub enum CpuVariant {
    #[default]
    #[strum(to_string = "Z80")]
    Standard,
    #[strum(to_string = "R800")]
    Enhanced,
    #[strum(to_string = "Z280")]
    Extended,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Display, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum VideoChipGeneration {
    #[default]
    #[strum(to_string = "TMS9918A")]
    #[serde(alias = "TMS9918A", alias = "tms9918a")]
    Gen0,
    #[strum(to_string = "V9938")]
    #[serde(alias = "V9938", alias = "v9938")]
    Gen1,
    #[strum(to_string = "V9958")]
    #[serde(alias = "V9958", alias = "v9958")]
    Gen2,
}

impl FromStr for VideoChipGeneration {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "gen0" | "tms9918" | "tms9918a" | "tms9929" => Ok(VideoChipGeneration::Gen0),
            "gen1" | "v9938" => Ok(VideoChipGeneration::Gen1),
            "gen2" | "v9958" => Ok(VideoChipGeneration::Gen2),
            _ => Err("Bad value for video chip".to_string()),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Display, Hash, Eq, PartialEq)]
pub enum TvStandard {
    #[default]
    #[strum(to_string = "NTSC 60Hz")]
    #[serde(alias = "NTSC", alias = "ntsc")]
    Ntsc60,
    #[strum(to_string = "PAL 50Hz")]
    #[serde(alias = "PAL", alias = "pal")]
    Pal50,
}

impl FromStr for TvStandard {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "ntsc" | "ntsc60" | "60" | "60hz" => Ok(TvStandard::Ntsc60),
            "pal" | "pal50" | "50" | "50hz" => Ok(TvStandard::Pal50),
            _ => Err("Bad value for tv standard".to_string()),
        }
    }
}

impl TvStandard {
    pub fn toggled(&self) -> TvStandard {
        match self {
            TvStandard::Ntsc60 => TvStandard::Pal50,
            TvStandard::Pal50 => TvStandard::Ntsc60,
        }
    }

    pub fn lines_per_frame(&self) -> u16 {
        match self {
            TvStandard::Ntsc60 => 262,
            TvStandard::Pal50 => 313,
        }
    }

    /// Frames per second, derived from the video clock.
    pub fn frame_rate(&self) -> f64 {
        VDP_CPU_CLOCK_HZ / (self.lines_per_frame() as f64 * CYCLES_PER_LINE as f64)
    }
}

/// MSX standard generation, from the version byte in the main ROM.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum MachineGeneration {
    #[strum(to_string = "MSX1")]
    Msx1,
    #[strum(to_string = "MSX2")]
    Msx2,
    #[strum(to_string = "MSX2+")]
    Msx2Plus,
    #[strum(to_string = "MSX turbo R")]
    TurboR,
}

impl TryFrom<u8> for MachineGeneration {
    type Error = u8;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            0 => Ok(MachineGeneration::Msx1),
            1 => Ok(MachineGeneration::Msx2),
            2 => Ok(MachineGeneration::Msx2Plus),
            3 => Ok(MachineGeneration::TurboR),
            _ => Err(version),
        }
    }
}

/// Clock boosting hardware the benchmark knows how to drive.
///
/// Named in command scripts through [FromStr]. Configuration never names one, so there
/// is no serde impl:
///
/// ```compile_fail
/// fn from_config<T: serde::de::DeserializeOwned>() {}
/// from_config::<msxbench_core::machine_types::ExtensionKind>();
/// ```
#[derive(Copy, Clone, Debug, Display, EnumIter, Hash, Eq, PartialEq)]
pub enum ExtensionKind {
    #[strum(to_string = "OCM-PLD")]
    OcmPld,
    #[strum(to_string = "Panasonic turbo")]
    PanasonicTurbo,
    #[strum(to_string = "turbo R")]
    TurboR,
    #[strum(to_string = "Tides-Rider")]
    TidesRider,
}

impl FromStr for ExtensionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "ocm" | "ocm_pld" | "ocmpld" => Ok(ExtensionKind::OcmPld),
            "pana" | "panasonic" | "turbo_pana" | "panasonic_turbo" => Ok(ExtensionKind::PanasonicTurbo),
            "turbo_r" | "turbor" | "r800" => Ok(ExtensionKind::TurboR),
            "tides" | "tides_rider" | "tidesrider" => Ok(ExtensionKind::TidesRider),
            _ => Err("Bad value for extension".to_string()),
        }
    }
}

/// Which tick source the measurement engine should use.
#[derive(Copy, Clone, Debug, Default, Deserialize, Hash, Eq, PartialEq)]
pub enum EnginePreference {
    /// Interleaved ticks when the video chip supports line interrupts, frame ticks otherwise.
    #[default]
    #[serde(alias = "auto")]
    Auto,
    #[serde(alias = "frame")]
    Frame,
    #[serde(alias = "interleaved")]
    Interleaved,
}

impl FromStr for EnginePreference {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "auto" => Ok(EnginePreference::Auto),
            "frame" | "single" => Ok(EnginePreference::Frame),
            "interleaved" | "dual" => Ok(EnginePreference::Interleaved),
            _ => Err("Bad value for engine".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_names() {
        assert_eq!(brand_name(8), "Panasonic");
        assert_eq!(brand_name(BRAND_OCM_PLD), "OCM/MSX++");
        assert_eq!(brand_name(200), "Unknown");
    }

    #[test]
    fn test_frame_rates() {
        assert!((TvStandard::Ntsc60.frame_rate() - 59.9227).abs() < 0.001);
        assert!((TvStandard::Pal50.frame_rate() - 50.1590).abs() < 0.001);
        assert_eq!(TvStandard::Pal50.toggled(), TvStandard::Ntsc60);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("V9958".parse::<VideoChipGeneration>(), Ok(VideoChipGeneration::Gen2));
        assert_eq!("pal".parse::<TvStandard>(), Ok(TvStandard::Pal50));
        assert_eq!("turbo_pana".parse::<ExtensionKind>(), Ok(ExtensionKind::PanasonicTurbo));
        assert!("pentium".parse::<ExtensionKind>().is_err());
        assert_eq!(MachineGeneration::try_from(3), Ok(MachineGeneration::TurboR));
        assert_eq!(MachineGeneration::try_from(4), Err(4));
    }

    #[test]
    fn test_every_extension_kind_has_script_name() {
        use strum::IntoEnumIterator;

        let parsed: Vec<ExtensionKind> = ["ocm_pld", "panasonic_turbo", "turbo_r", "tides_rider"]
            .iter()
            .map(|name| name.parse().unwrap())
            .collect();
        assert_eq!(parsed, ExtensionKind::iter().collect::<Vec<_>>());
    }
}
