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

    detect::mod.rs
*/

//! Machine capability detection.
//!
//! Detection runs once, in a fixed order, and produces a [MachineProfile]. Every probe
//! restores the shared state it touches before returning.

pub mod cpu;
pub mod extensions;
pub mod video;

use crate::{
    bus::{HardwareBus, ROM_MSX_VERSION},
    error::PlatformError,
    machine_types::{CpuVariant, MachineGeneration, BRAND_OCM_PLD},
    probe,
    profile::MachineProfile,
    video::{VideoOps, VideoStrategy},
};

/// Profile the host. Fails only if the main ROM reports an MSX version this program
/// does not know.
pub fn detect_profile(bus: &mut dyn HardwareBus) -> Result<(MachineProfile, VideoStrategy), PlatformError> {
    let version = bus.mem_read_u8(ROM_MSX_VERSION);
    let machine_generation = MachineGeneration::try_from(version).map_err(PlatformError::UnsupportedVersion)?;
    log::debug!("machine generation: {}", machine_generation);

    let cpu_variant = cpu::detect_cpu_variant(bus);
    let cpu_cmos = match cpu_variant {
        CpuVariant::Standard => cpu::detect_cmos(bus),
        _ => false,
    };

    let video_chip_generation = video::detect_video_generation(bus);
    let video = VideoStrategy::for_generation(video_chip_generation);
    let tv_standard = video.read_tv_standard(bus);
    log::debug!("tv standard: {}", tv_standard);

    // A super board answers on its own ID and skips the maker scan.
    let ocm_pld = extensions::detect_ocm_pld(bus);
    let machine_brand_id = if ocm_pld {
        BRAND_OCM_PLD
    }
    else {
        probe::scan_maker_id(bus)
    };
    log::debug!("machine brand id: {}", machine_brand_id);

    let extensions = extensions::detect_extensions(bus, ocm_pld);

    let profile = MachineProfile {
        machine_generation,
        cpu_variant,
        cpu_cmos,
        video_chip_generation,
        tv_standard,
        machine_brand_id,
        extensions,
    };
    Ok((profile, video))
}
