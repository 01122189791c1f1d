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

    msxbench_headless::lib.rs
*/

//! MSXBench headless front-end main library component.

#![forbid(unsafe_code)]

mod console;
mod script;

use msxbench_core::{bench::Benchmark, devices::SimulatedMsx};

use crate::{console::ConsoleDisplay, script::ScriptedCommands};

pub fn run() {
    env_logger::init();

    // Resolve the configuration by parsing the configuration toml and merging it with
    // command line arguments.
    let config = match msxbench_config::read_config_file("./msxbench.toml") {
        Ok(config) => config,
        Err(e) => match e.downcast_ref::<std::io::Error>() {
            Some(e) if e.kind() == std::io::ErrorKind::NotFound => {
                eprintln!(
                    "Configuration file not found! Please create msxbench.toml in the working directory \
                               or provide the path to configuration file with --config_file."
                );
                std::process::exit(1);
            }
            Some(e) => {
                eprintln!("Unknown IO error reading configuration file:\n{}", e);
                std::process::exit(1);
            }
            None => {
                eprintln!(
                    "Failed to parse configuration file. There may be a typo or otherwise invalid toml:\n{}",
                    e
                );
                std::process::exit(1);
            }
        },
    };

    let mut commands = ScriptedCommands::parse(&config.benchmark.script, config.benchmark.samples_per_step)
        .unwrap_or_else(|e| {
            eprintln!("Invalid command script: {:#}", e);
            std::process::exit(1);
        });

    let spec = config.machine.machine_spec();
    log::debug!("Simulated machine: {:?}", spec);
    let msx = SimulatedMsx::new(spec);

    let mut bench = Benchmark::new(msx, config.benchmark.engine).unwrap_or_else(|e| {
        log::error!("Machine detection failed: {}", e);
        eprintln!("Unsupported machine: {}", e);
        std::process::exit(1);
    });
    log::info!("Measuring with the {} engine", bench.engine_variant());

    let mut display = ConsoleDisplay::new();
    let samples = bench.run(&mut display, &mut commands);
    if commands.remaining() > 0 {
        log::warn!("{} scripted commands were not issued", commands.remaining());
    }

    let msx = bench.shutdown();
    log::debug!(
        "Restored host: {:.0} Hz CPU clock, {} frames, {} interrupts serviced",
        msx.cpu_clock_hz(),
        msx.frame_count(),
        msx.interrupts_serviced()
    );

    display.print_summary();
    log::debug!("{} valid samples", samples);
    std::process::exit(0);
}
