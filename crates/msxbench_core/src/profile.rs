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

    profile.rs
*/

//! The detected machine profile.
//!
//! A profile is built once by detection. Afterwards only speed control changes it: the
//! current level of each boost extension, and the TV standard.

use crate::machine_types::{
    brand_name,
    CpuVariant,
    ExtensionKind,
    MachineGeneration,
    TvStandard,
    VideoChipGeneration,
    BRAND_OCM_PLD,
};

/// One selectable speed of a boost extension.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedLevel {
    pub label: &'static str,
    pub nominal_mhz: f64,
    /// Value sent to the hardware to select this level.
    pub code: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoostExtension {
    kind: ExtensionKind,
    present: bool,
    levels: &'static [SpeedLevel],
    current: usize,
}

impl BoostExtension {
    /// `current` is clamped into the level list.
    pub fn new(kind: ExtensionKind, present: bool, levels: &'static [SpeedLevel], current: usize) -> Self {
        let current = current.min(levels.len().saturating_sub(1));
        Self {
            kind,
            present,
            levels,
            current,
        }
    }

    pub fn absent(kind: ExtensionKind, levels: &'static [SpeedLevel]) -> Self {
        Self::new(kind, false, levels, 0)
    }

    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn levels(&self) -> &'static [SpeedLevel] {
        self.levels
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_level(&self) -> Option<&'static SpeedLevel> {
        let levels = self.levels;
        levels.get(self.current)
    }

    /// Index of the level after the current one, wrapping after the last.
    pub(crate) fn next_index(&self) -> Option<usize> {
        if self.levels.is_empty() {
            return None;
        }
        Some((self.current + 1) % self.levels.len())
    }

    pub(crate) fn set_index(&mut self, index: usize) -> Option<&'static SpeedLevel> {
        let levels = self.levels;
        let level = levels.get(index)?;
        self.current = index;
        Some(level)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MachineProfile {
    pub(crate) machine_generation: MachineGeneration,
    pub(crate) cpu_variant: CpuVariant,
    pub(crate) cpu_cmos: bool,
    pub(crate) video_chip_generation: VideoChipGeneration,
    pub(crate) tv_standard: TvStandard,
    pub(crate) machine_brand_id: u8,
    pub(crate) extensions: Vec<BoostExtension>,
}

impl MachineProfile {
    pub fn machine_generation(&self) -> MachineGeneration {
        self.machine_generation
    }

    pub fn cpu_variant(&self) -> CpuVariant {
        self.cpu_variant
    }

    /// True if the CPU is a CMOS part. Only meaningful for a Z80.
    pub fn cpu_cmos(&self) -> bool {
        self.cpu_cmos
    }

    pub fn cpu_description(&self) -> String {
        match self.cpu_variant {
            CpuVariant::Standard if self.cpu_cmos => "Z80 (CMOS)".to_string(),
            CpuVariant::Standard => "Z80 (NMOS)".to_string(),
            variant => variant.to_string(),
        }
    }

    pub fn video_chip_generation(&self) -> VideoChipGeneration {
        self.video_chip_generation
    }

    pub fn tv_standard(&self) -> TvStandard {
        self.tv_standard
    }

    pub fn machine_brand_id(&self) -> u8 {
        self.machine_brand_id
    }

    pub fn brand_name(&self) -> &'static str {
        brand_name(self.machine_brand_id)
    }

    pub fn is_ocm_pld(&self) -> bool {
        self.machine_brand_id == BRAND_OCM_PLD
    }

    pub fn extensions(&self) -> &[BoostExtension] {
        &self.extensions
    }

    pub fn extension(&self, kind: ExtensionKind) -> Option<&BoostExtension> {
        self.extensions.iter().find(|ext| ext.kind == kind)
    }

    pub(crate) fn extension_mut(&mut self, kind: ExtensionKind) -> Option<&mut BoostExtension> {
        self.extensions.iter_mut().find(|ext| ext.kind == kind)
    }

    pub fn present_extensions(&self) -> impl Iterator<Item = &BoostExtension> {
        self.extensions.iter().filter(|ext| ext.present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LEVELS: [SpeedLevel; 4] = [
        SpeedLevel {
            label: "A",
            nominal_mhz: 1.0,
            code: 0,
        },
        SpeedLevel {
            label: "B",
            nominal_mhz: 2.0,
            code: 1,
        },
        SpeedLevel {
            label: "C",
            nominal_mhz: 3.0,
            code: 2,
        },
        SpeedLevel {
            label: "D",
            nominal_mhz: 4.0,
            code: 3,
        },
    ];

    #[test]
    fn test_next_index_wraps() {
        let ext = BoostExtension::new(ExtensionKind::TidesRider, true, &LEVELS, 3);
        assert_eq!(ext.next_index(), Some(0));
        assert_eq!(ext.current_index(), 3);
    }

    #[test]
    fn test_stepping_cycles_back_to_start() {
        let mut ext = BoostExtension::new(ExtensionKind::TidesRider, true, &LEVELS, 1);
        for _ in 0..LEVELS.len() {
            let next = ext.next_index().unwrap();
            ext.set_index(next);
        }
        assert_eq!(ext.current_index(), 1);
    }

    #[test]
    fn test_set_index_out_of_range_keeps_level() {
        let mut ext = BoostExtension::new(ExtensionKind::TidesRider, true, &LEVELS, 2);
        assert_eq!(ext.set_index(LEVELS.len()), None);
        assert_eq!(ext.current_index(), 2);
    }

    #[test]
    fn test_new_clamps_index() {
        let ext = BoostExtension::new(ExtensionKind::OcmPld, true, &LEVELS, 9);
        assert_eq!(ext.current_index(), 3);
    }
}
