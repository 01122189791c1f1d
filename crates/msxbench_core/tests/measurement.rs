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

    tests::measurement.rs

    Measurement and speed control against simulated machines.
*/

use msxbench_core::{
    bench::{Benchmark, CapabilityLabel, Command, CommandOutcome, CommandSource, MeasurementDisplay, SampleReport},
    bus::{BusyLoop, HardwareBus, InterruptHandler, IoBus, ProbeRegisters, PORT_EXT_IO_DATA},
    devices::{MachineSpec, SimulatedMsx},
    error::CommandError,
    machine_types::{EnginePreference, ExtensionKind, TvStandard, VideoChipGeneration, REFERENCE_CLOCK_MHZ},
    profile::MachineProfile,
    timing::{EngineState, EngineVariant},
    vdp,
    video::{V99x8Video, VideoOps, VideoStrategy},
};

fn assert_near(value: f64, expected: f64, tolerance: f64) {
    assert!(
        (value - expected).abs() <= tolerance,
        "{} not within {} of {}",
        value,
        tolerance,
        expected
    );
}

fn benchmark(spec: MachineSpec, preference: EnginePreference) -> Benchmark<SimulatedMsx> {
    let _ = env_logger::builder().is_test(true).try_init();
    Benchmark::new(SimulatedMsx::new(spec), preference).expect("detection failed")
}

fn msx2(tv_standard: TvStandard) -> MachineSpec {
    MachineSpec {
        video: VideoChipGeneration::Gen1,
        tv_standard,
        msx_version: 1,
        ..Default::default()
    }
}

#[test]
fn test_reference_msx1_ntsc() {
    let mut bench = benchmark(MachineSpec::default(), EnginePreference::Auto);
    assert_eq!(bench.engine_variant(), EngineVariant::Frame);

    let report = bench.measure_once().expect("no sample");
    assert_eq!(report.raw_count, 252);
    assert_near(report.estimated_mhz, REFERENCE_CLOCK_MHZ, 0.01);
    assert_near(report.percent_of_reference(), 100.0, 0.3);
}

#[test]
fn test_reference_msx1_pal() {
    let mut bench = benchmark(
        MachineSpec {
            tv_standard: TvStandard::Pal50,
            ..Default::default()
        },
        EnginePreference::Frame,
    );
    let report = bench.measure_once().expect("no sample");
    assert_eq!(report.tv_standard, TvStandard::Pal50);
    assert_eq!(report.raw_count, 211);
    assert_near(report.estimated_mhz, REFERENCE_CLOCK_MHZ, 0.01);
}

#[test]
fn test_reference_msx2_both_engines() {
    for tv in [TvStandard::Ntsc60, TvStandard::Pal50] {
        for preference in [EnginePreference::Frame, EnginePreference::Interleaved] {
            let mut bench = benchmark(msx2(tv), preference);
            let report = bench.measure_once().expect("no sample");
            assert_eq!(report.tv_standard, tv);
            assert_near(report.estimated_mhz, REFERENCE_CLOCK_MHZ, 0.01);
        }
    }
}

#[test]
fn test_interleaved_doubles_tick_count() {
    let mut frame = benchmark(msx2(TvStandard::Ntsc60), EnginePreference::Frame);
    let mut interleaved = benchmark(msx2(TvStandard::Ntsc60), EnginePreference::Interleaved);
    assert_eq!(interleaved.engine_variant(), EngineVariant::Interleaved);

    let frame = frame.measure_once().expect("no sample");
    let interleaved = interleaved.measure_once().expect("no sample");
    assert!(interleaved.raw_count >= 2 * frame.raw_count);
    assert!(interleaved.raw_count <= 2 * frame.raw_count + 4);
}

#[test]
fn test_faster_cpu_counts_fewer_ticks() {
    let mut reference = benchmark(MachineSpec::default(), EnginePreference::Frame);
    let mut fast = benchmark(
        MachineSpec {
            base_clock_hz: 7_159_090.0,
            ..Default::default()
        },
        EnginePreference::Frame,
    );

    let reference = reference.measure_once().expect("no sample");
    let fast = fast.measure_once().expect("no sample");
    assert!(fast.raw_count < reference.raw_count);
    assert!(fast.estimated_mhz > reference.estimated_mhz);
    assert_near(fast.estimated_mhz, 7.159090, 0.02);
}

#[test]
fn test_engine_restores_host_state() {
    let mut msx = SimulatedMsx::new(MachineSpec {
        video: VideoChipGeneration::Gen2,
        msx_version: 2,
        ..Default::default()
    });
    let engine = V99x8Video::new(VideoChipGeneration::Gen2)
        .interleaved_engine()
        .expect("V9958 has a line interrupt");
    let sample = engine.measure_once(&mut msx, TvStandard::Ntsc60).expect("no sample");

    assert!(sample.raw_count() > 500);
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(msx.interrupts_enabled());
    assert!(!msx.has_interrupt_handler());
    assert_eq!(msx.vdp().register(0), 0x00);
    assert_eq!(msx.vdp().register(1), 0xE0);
    assert_eq!(msx.vdp().register(15), 0x00);
    assert_eq!(msx.vdp().register(19), 0x00);
}

#[test]
fn test_interleaved_request_on_tms9918_leaves_r3_alone() {
    let mut msx = SimulatedMsx::new(MachineSpec::default());
    // R#19 writes would alias onto R#3 on this chip.
    vdp::write_register_mirrored(&mut msx, 3, 0xFF);
    assert!(VideoStrategy::for_generation(VideoChipGeneration::Gen0)
        .interleaved_engine()
        .is_none());

    let mut bench = Benchmark::new(msx, EnginePreference::Interleaved).expect("detection failed");
    assert_eq!(bench.engine_variant(), EngineVariant::Frame);
    bench.measure_once().expect("no sample");
    assert_eq!(bench.bus().vdp().register(3), 0xFF);
}

/// Drops every interrupt hook, so the engine never sees a tick.
struct NoHook(SimulatedMsx);

impl IoBus for NoHook {
    fn io_read_u8(&mut self, port: u8) -> u8 {
        self.0.io_read_u8(port)
    }
    fn io_write_u8(&mut self, port: u8, data: u8) {
        self.0.io_write_u8(port, data)
    }
    fn scanline(&mut self) -> u16 {
        self.0.scanline()
    }
}

impl HardwareBus for NoHook {
    fn mem_read_u8(&mut self, address: u16) -> u8 {
        self.0.mem_read_u8(address)
    }
    fn mem_write_u8(&mut self, address: u16, data: u8) {
        self.0.mem_write_u8(address, data)
    }
    fn interrupts_enabled(&self) -> bool {
        self.0.interrupts_enabled()
    }
    fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.0.set_interrupts_enabled(enabled)
    }
    fn swap_interrupt_handler(&mut self, _handler: Option<Box<dyn InterruptHandler>>) -> Option<Box<dyn InterruptHandler>> {
        None
    }
    fn wait_for_interrupt(&mut self) {
        self.0.wait_for_interrupt()
    }
    fn run_busy_loop(&mut self, busy_loop: BusyLoop) {
        self.0.run_busy_loop(busy_loop)
    }
    fn execute(&mut self, code: &[u8], regs: ProbeRegisters) -> ProbeRegisters {
        self.0.execute(code, regs)
    }
    fn bios_call(&mut self, entry: u16, regs: ProbeRegisters) -> ProbeRegisters {
        self.0.bios_call(entry, regs)
    }
}

#[test]
fn test_no_ticks_is_no_sample() {
    let mut bench = Benchmark::new(NoHook(SimulatedMsx::new(MachineSpec::default())), EnginePreference::Frame)
        .expect("detection failed");
    assert_eq!(bench.measure_once(), None);
}

#[test]
fn test_rejected_commands() {
    let mut bench = benchmark(MachineSpec::default(), EnginePreference::Auto);
    assert_eq!(
        bench.apply_command(Command::ToggleTv),
        Err(CommandError::TvSwitchUnsupported(VideoChipGeneration::Gen0))
    );
    assert_eq!(
        bench.apply_command(Command::CycleExtension(ExtensionKind::TurboR)),
        Err(CommandError::ExtensionAbsent(ExtensionKind::TurboR))
    );
    assert_eq!(bench.apply_command(Command::None), Ok(CommandOutcome::Idle));
}

#[test]
fn test_ocm_speed_levels_change_measurement() {
    let mut bench = benchmark(
        MachineSpec {
            video: VideoChipGeneration::Gen1,
            msx_version: 1,
            ocm_pld: true,
            ..Default::default()
        },
        EnginePreference::Auto,
    );

    let outcome = bench
        .apply_command(Command::CycleExtension(ExtensionKind::OcmPld))
        .expect("command failed");
    match outcome {
        CommandOutcome::LevelChanged { kind, level } => {
            assert_eq!(kind, ExtensionKind::OcmPld);
            assert_eq!(level.code, 0x04);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let report = bench.measure_once().expect("no sample");
    assert_near(report.estimated_mhz, 5.369318, 0.02);
}

/// Passes everything through except reads of the expanded I/O data port, which come
/// back as zero. An OCM-PLD behind it never acknowledges a command.
struct SilentDataPort(SimulatedMsx);

impl IoBus for SilentDataPort {
    fn io_read_u8(&mut self, port: u8) -> u8 {
        match port {
            PORT_EXT_IO_DATA => {
                self.0.io_read_u8(port);
                0x00
            }
            _ => self.0.io_read_u8(port),
        }
    }
    fn io_write_u8(&mut self, port: u8, data: u8) {
        self.0.io_write_u8(port, data)
    }
    fn scanline(&mut self) -> u16 {
        self.0.scanline()
    }
}

impl HardwareBus for SilentDataPort {
    fn mem_read_u8(&mut self, address: u16) -> u8 {
        self.0.mem_read_u8(address)
    }
    fn mem_write_u8(&mut self, address: u16, data: u8) {
        self.0.mem_write_u8(address, data)
    }
    fn interrupts_enabled(&self) -> bool {
        self.0.interrupts_enabled()
    }
    fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.0.set_interrupts_enabled(enabled)
    }
    fn swap_interrupt_handler(&mut self, handler: Option<Box<dyn InterruptHandler>>) -> Option<Box<dyn InterruptHandler>> {
        self.0.swap_interrupt_handler(handler)
    }
    fn wait_for_interrupt(&mut self) {
        self.0.wait_for_interrupt()
    }
    fn run_busy_loop(&mut self, busy_loop: BusyLoop) {
        self.0.run_busy_loop(busy_loop)
    }
    fn execute(&mut self, code: &[u8], regs: ProbeRegisters) -> ProbeRegisters {
        self.0.execute(code, regs)
    }
    fn bios_call(&mut self, entry: u16, regs: ProbeRegisters) -> ProbeRegisters {
        self.0.bios_call(entry, regs)
    }
}

#[test]
fn test_unacknowledged_speed_change_is_an_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let msx = SimulatedMsx::new(MachineSpec {
        video: VideoChipGeneration::Gen1,
        msx_version: 1,
        ocm_pld: true,
        ..Default::default()
    });
    let mut bench = Benchmark::new(SilentDataPort(msx), EnginePreference::Auto).expect("detection failed");
    assert!(bench.profile().extension(ExtensionKind::OcmPld).is_some_and(|ext| ext.is_present()));

    assert_eq!(
        bench.apply_command(Command::CycleExtension(ExtensionKind::OcmPld)),
        Err(CommandError::NotAcknowledged(ExtensionKind::OcmPld))
    );
    assert_eq!(
        bench.profile().extension(ExtensionKind::OcmPld).map(|ext| ext.current_index()),
        Some(0)
    );
}

struct Script(Vec<Command>);

impl CommandSource for Script {
    fn poll_requested_command(&mut self) -> Command {
        if self.0.is_empty() {
            Command::Exit
        }
        else {
            self.0.remove(0)
        }
    }
}

#[derive(Default)]
struct Recorder {
    profiles: usize,
    reports: Vec<SampleReport>,
    labels: Vec<CapabilityLabel>,
}

impl MeasurementDisplay for Recorder {
    fn draw_profile(&mut self, _profile: &MachineProfile) {
        self.profiles += 1;
    }
    fn draw_measurement(&mut self, report: &SampleReport) {
        self.reports.push(*report);
    }
    fn draw_capability_label(&mut self, _profile: &MachineProfile, label: CapabilityLabel) {
        self.labels.push(label);
    }
}

#[test]
fn test_scripted_session_and_shutdown() {
    let mut bench = benchmark(
        MachineSpec {
            video: VideoChipGeneration::Gen1,
            msx_version: 1,
            tides_rider: Some(0),
            ..Default::default()
        },
        EnginePreference::Interleaved,
    );

    let mut display = Recorder::default();
    let mut script = Script(vec![
        Command::None,
        Command::CycleExtension(ExtensionKind::TidesRider),
        Command::ToggleTv,
    ]);
    let samples = bench.run(&mut display, &mut script);

    assert_eq!(samples, 4);
    assert_eq!(display.profiles, 1);
    assert_eq!(
        display.labels,
        vec![CapabilityLabel::Extension(ExtensionKind::TidesRider), CapabilityLabel::TvStandard]
    );
    assert_near(display.reports[1].estimated_mhz, REFERENCE_CLOCK_MHZ, 0.01);
    // Tides-Rider level 1 is 6.66MHz.
    assert_near(display.reports[2].estimated_mhz, 6.66, 0.02);
    assert_eq!(display.reports[3].tv_standard, TvStandard::Pal50);
    assert_near(display.reports[3].estimated_mhz, 6.66, 0.02);

    assert_eq!(bench.profile().tv_standard(), TvStandard::Pal50);
    let msx = bench.shutdown();
    assert_eq!(msx.tides_rider_speed(), Some(0));
    assert_eq!(msx.tv_standard(), TvStandard::Ntsc60);
    assert_eq!(msx.cpu_clock_hz(), 3_579_545.0);
}
