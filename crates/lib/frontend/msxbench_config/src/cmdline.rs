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

    msxbench_config::cmdline.rs
*/

use std::path::PathBuf;

#[cfg(feature = "use_bpaf")]
use bpaf::Bpaf;

use msxbench_core::{
    devices::CpuModel,
    machine_types::{EnginePreference, TvStandard, VideoChipGeneration},
};

#[cfg_attr(feature = "use_bpaf", derive(Bpaf))]
#[cfg_attr(feature = "use_bpaf", bpaf(options, version, generate(cli_args)))]
#[derive(Debug, Default)]
pub struct CmdLineArgs {
    #[cfg_attr(feature = "use_bpaf", bpaf(long("config_file"), long("configfile")))]
    pub config_file: Option<PathBuf>,

    // Benchmark options
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub engine: Option<EnginePreference>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("samples_per_step"), long("samples")))]
    pub samples_per_step: Option<u32>,

    /// Comma separated command list, e.g. "wait,cycle:tides,toggle_tv,exit"
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub script: Option<String>,

    // Machine options
    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub cpu: Option<CpuModel>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long, switch))]
    pub cmos: bool,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("clock_mhz"), long("mhz")))]
    pub clock_mhz: Option<f64>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub video: Option<VideoChipGeneration>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("tv_standard"), long("tv")))]
    pub tv_standard: Option<TvStandard>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub msx_version: Option<u8>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub maker_id: Option<u8>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("panasonic_turbo"), long("pana"), switch))]
    pub panasonic_turbo: bool,

    #[cfg_attr(feature = "use_bpaf", bpaf(long))]
    pub turbo_r: Option<u8>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("tides_rider"), long("tides")))]
    pub tides_rider: Option<u8>,

    #[cfg_attr(feature = "use_bpaf", bpaf(long("ocm_pld"), long("ocm"), switch))]
    pub ocm_pld: bool,
}
