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

    devices::msx.rs

    Simulated MSX host bus.
*/

//! The simulated machine.
//!
//! Time is kept in video clock cycles (CPU-equivalent at 3.579545MHz) as a position
//! within the current frame. CPU work is converted at the effective CPU clock, which
//! speed control writes can change. Interrupts are delivered at VDP events while the
//! interrupt flip-flop is set; the installed handler runs instantly and its port
//! accesses are charged as service overhead when it returns.

use fxhash::FxHashMap;

use crate::{
    bus::{
        BusyLoop,
        HardwareBus,
        InterruptHandler,
        IoBus,
        ProbeRegisters,
        BIOS_CHGCPU,
        BIOS_GETCPU,
        BIOS_WRTVDP,
        NO_IO_BYTE,
        PORT_VDP_CONTROL,
        PORT_VDP_DATA,
        ROM_INTERRUPT_FREQ,
        ROM_MSX_VERSION,
    },
    devices::{
        cpu::{self, CpuModel},
        expanded_io::{ExpandedIo, PANASONIC_TURBO_HZ},
        rtc::{SimRtc, TIDES_RIDER_HZ},
        vdp::{RasterPosition, SimVdp, VdpEvent},
        ClockRequest,
    },
    machine_types::{TvStandard, VideoChipGeneration, CYCLES_PER_LINE, VDP_CPU_CLOCK_HZ},
    vdp::{register_mirror_address, REG_MODE3},
};

/// Cost of accepting an interrupt and returning from it, handler body excluded.
pub const INTERRUPT_ACK_T_STATES: f64 = 80.0;
/// Cost of one `IN`/`OUT`, including the surrounding register setup.
pub const IO_ACCESS_T_STATES: f64 = 12.0;
pub const BIOS_CALL_T_STATES: f64 = 200.0;

/// Line at which vertical blanking and the frame interrupt begin.
pub const VBLANK_LINE: u16 = 192;
/// Fraction of a line spent in horizontal retrace, at the end of the line.
const HBLANK_START: f64 = 0.75;

pub const R800_CLOCK_HZ: f64 = 7_159_090.0;
/// Z80-equivalent speedup of the R800 on the timing loop, running from ROM and from
/// DRAM. The loop costs 23 Z80 T-states against 8 and 5 R800 cycles.
pub const R800_ROM_SPEEDUP: f64 = 23.0 / 8.0;
pub const R800_DRAM_SPEEDUP: f64 = 23.0 / 5.0;

const EVENT_EPSILON: f64 = 1e-6;

/// Hardware fitted to a simulated machine.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineSpec {
    pub cpu: CpuModel,
    pub cmos: bool,
    /// Effective clock with no boost selected.
    pub base_clock_hz: f64,
    pub video: VideoChipGeneration,
    pub tv_standard: TvStandard,
    /// Version byte at 0x002D of the main ROM.
    pub msx_version: u8,
    /// Maker ID answered on the expanded I/O bus, 0 for none.
    pub maker_id: u8,
    /// Panasonic turbo switch and whether it starts in turbo.
    pub panasonic_turbo: Option<bool>,
    /// turbo R CPU switch and its starting mode.
    pub turbo_r: Option<u8>,
    /// Tides-Rider board and its starting speed code.
    pub tides_rider: Option<u8>,
    pub ocm_pld: bool,
}

impl Default for MachineSpec {
    fn default() -> Self {
        Self {
            cpu: CpuModel::Z80,
            cmos: false,
            base_clock_hz: VDP_CPU_CLOCK_HZ,
            video: VideoChipGeneration::Gen0,
            tv_standard: TvStandard::Ntsc60,
            msx_version: 0,
            maker_id: 0,
            panasonic_turbo: None,
            turbo_r: None,
            tides_rider: None,
            ocm_pld: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IoPortStats {
    pub last_read: u8,
    pub last_write: u8,
    pub reads: usize,
    pub writes: usize,
}

pub struct SimulatedMsx {
    spec: MachineSpec,
    memory: Vec<u8>,
    vdp: SimVdp,
    ext_io: ExpandedIo,
    rtc: SimRtc,
    turbo_r_mode: Option<u8>,
    cpu_clock_hz: f64,

    frame_count: u64,
    frame_pos: f64,

    iff: bool,
    irq_pending: bool,
    handler: Option<Box<dyn InterruptHandler>>,
    servicing: bool,
    handler_io: u32,
    interrupts_serviced: u64,

    io_stats: FxHashMap<u8, IoPortStats>,
}

impl SimulatedMsx {
    pub fn new(spec: MachineSpec) -> Self {
        let mut memory = vec![0; 0x10000];
        memory[ROM_MSX_VERSION as usize] = spec.msx_version;
        if spec.tv_standard == TvStandard::Pal50 {
            memory[ROM_INTERRUPT_FREQ as usize] |= 0x80;
        }
        if spec.turbo_r.is_some() {
            // JP opcodes at the CHGCPU and GETCPU jump table entries
            memory[BIOS_CHGCPU as usize] = 0xC3;
            memory[BIOS_GETCPU as usize] = 0xC3;
        }

        let mut msx = Self {
            vdp: SimVdp::new(spec.video),
            ext_io: ExpandedIo::new(spec.maker_id, spec.panasonic_turbo, spec.ocm_pld),
            rtc: SimRtc::new(spec.tides_rider),
            turbo_r_mode: spec.turbo_r.map(|mode| mode.min(2)),
            cpu_clock_hz: spec.base_clock_hz,
            memory,
            frame_count: 0,
            frame_pos: 0.0,
            iff: true,
            irq_pending: false,
            handler: None,
            servicing: false,
            handler_io: 0,
            interrupts_serviced: 0,
            io_stats: FxHashMap::default(),
            spec,
        };

        // BIOS initial register set, mirrored in RAM
        let r9 = if msx.spec.tv_standard == TvStandard::Pal50 { 0x02 } else { 0x00 };
        let mut initial = vec![(0, 0x00), (1, 0xE0), (7, 0xF4)];
        if msx.spec.video != VideoChipGeneration::Gen0 {
            initial.extend([(8, 0x08), (9, r9), (19, 0x00)]);
        }
        for (reg, value) in initial {
            msx.vdp_write_register(reg, value);
            if let Some(address) = register_mirror_address(reg) {
                msx.memory[address as usize] = value;
            }
        }

        if let Some(true) = msx.spec.panasonic_turbo {
            msx.apply_clock(ClockRequest::Hz(PANASONIC_TURBO_HZ));
        }
        if let Some(speed) = msx.rtc.tides_rider_speed() {
            msx.apply_clock(ClockRequest::Hz(TIDES_RIDER_HZ[speed as usize]));
        }
        if let Some(mode) = msx.turbo_r_mode {
            msx.set_turbo_r_mode(mode);
        }
        msx.io_stats.clear();
        log::debug!("simulated MSX: {:?}, cpu clock {:.0}Hz", msx.spec, msx.cpu_clock_hz);
        msx
    }

    pub fn spec(&self) -> &MachineSpec {
        &self.spec
    }

    pub fn vdp(&self) -> &SimVdp {
        &self.vdp
    }

    pub fn cpu_clock_hz(&self) -> f64 {
        self.cpu_clock_hz
    }

    pub fn panasonic_register(&self) -> Option<u8> {
        self.ext_io.panasonic_register()
    }

    pub fn tides_rider_speed(&self) -> Option<u8> {
        self.rtc.tides_rider_speed()
    }

    pub fn turbo_r_mode(&self) -> Option<u8> {
        self.turbo_r_mode
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn interrupts_serviced(&self) -> u64 {
        self.interrupts_serviced
    }

    pub fn has_interrupt_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn port_stats(&self, port: u8) -> Option<&IoPortStats> {
        self.io_stats.get(&port)
    }

    /// TV standard the video chip is currently producing.
    pub fn tv_standard(&self) -> TvStandard {
        match self.vdp.pal_selected() {
            Some(true) => TvStandard::Pal50,
            Some(false) => TvStandard::Ntsc60,
            None => self.spec.tv_standard,
        }
    }

    /// The CPU the probes see: the R800 whenever a turbo R has it switched in.
    fn active_cpu(&self) -> CpuModel {
        match self.turbo_r_mode {
            Some(1) | Some(2) => CpuModel::R800,
            _ => self.spec.cpu,
        }
    }

    fn set_turbo_r_mode(&mut self, mode: u8) {
        self.turbo_r_mode = Some(mode);
        self.cpu_clock_hz = match mode {
            1 => R800_CLOCK_HZ * R800_ROM_SPEEDUP,
            2 => R800_CLOCK_HZ * R800_DRAM_SPEEDUP,
            _ => self.spec.base_clock_hz,
        };
        log::debug!("turbo R mode {}: cpu clock {:.0}Hz", mode, self.cpu_clock_hz);
    }

    fn apply_clock(&mut self, request: ClockRequest) {
        self.cpu_clock_hz = match request {
            ClockRequest::Base => self.spec.base_clock_hz,
            ClockRequest::Hz(hz) => hz,
        };
        log::debug!("cpu clock now {:.0}Hz", self.cpu_clock_hz);
    }

    fn frame_cycles(&self) -> f64 {
        self.tv_standard().lines_per_frame() as f64 * CYCLES_PER_LINE as f64
    }

    fn raster(&self) -> RasterPosition {
        let line_pos = self.frame_pos / CYCLES_PER_LINE as f64;
        let line = line_pos as u16;
        RasterPosition {
            line,
            vblank: line >= VBLANK_LINE,
            hblank: line_pos.fract() >= HBLANK_START,
        }
    }

    fn advance(&mut self, video_cycles: f64) {
        self.frame_pos += video_cycles;
        let frame_cycles = self.frame_cycles();
        while self.frame_pos >= frame_cycles {
            self.frame_pos -= frame_cycles;
            self.frame_count += 1;
        }
    }

    /// Video cycles to the next VDP event, and the event.
    fn next_event(&self) -> (f64, VdpEvent) {
        let frame_cycles = self.frame_cycles();
        let until = |line: u16| {
            let delta = line as f64 * CYCLES_PER_LINE as f64 - self.frame_pos;
            if delta <= EVENT_EPSILON {
                delta + frame_cycles
            }
            else {
                delta
            }
        };

        let mut next = (until(VBLANK_LINE), VdpEvent::Frame);
        if let Some(line) = self.vdp.line_interrupt_target() {
            if (line as f64) * (CYCLES_PER_LINE as f64) < frame_cycles {
                let delta = until(line);
                if delta < next.0 {
                    next = (delta, VdpEvent::Line);
                }
            }
        }
        next
    }

    fn raise(&mut self, event: VdpEvent) {
        self.vdp.raise(event);
        if self.vdp.irq() {
            self.irq_pending = true;
        }
    }

    /// Let `video_cycles` of time pass, raising VDP events on the way. Interrupts are
    /// taken at each event if `deliver` is set.
    fn run_video(&mut self, video_cycles: f64, deliver: bool) {
        let mut remaining = video_cycles;
        loop {
            let (delta, event) = self.next_event();
            if remaining < delta {
                self.advance(remaining);
                return;
            }
            self.advance(delta);
            remaining -= delta;
            self.raise(event);
            if deliver {
                self.deliver_interrupts();
            }
        }
    }

    fn run_cpu(&mut self, t_states: f64) {
        let video_cycles = t_states * VDP_CPU_CLOCK_HZ / self.cpu_clock_hz;
        self.run_video(video_cycles, true);
    }

    fn deliver_interrupts(&mut self) {
        while self.iff && self.irq_pending && !self.servicing {
            self.irq_pending = false;
            if !self.vdp.irq() {
                continue;
            }
            self.iff = false;
            self.servicing = true;
            self.handler_io = 0;
            match self.handler.take() {
                Some(mut handler) => {
                    handler.service(self);
                    self.handler = Some(handler);
                }
                None => {
                    // The BIOS handler acknowledges the frame interrupt by reading S#0.
                    let _ = self.io_read_u8(PORT_VDP_CONTROL);
                }
            }
            self.servicing = false;
            if self.vdp.irq() {
                log::trace!("INT still asserted after service at line {}", self.raster().line);
            }

            self.interrupts_serviced += 1;
            let overhead = INTERRUPT_ACK_T_STATES + self.handler_io as f64 * IO_ACCESS_T_STATES;
            let video_cycles = overhead * VDP_CPU_CLOCK_HZ / self.cpu_clock_hz;
            self.run_video(video_cycles, false);
            self.iff = true;
        }
    }

    fn charge_io(&mut self) {
        if self.servicing {
            self.handler_io += 1;
        }
        else {
            self.run_cpu(IO_ACCESS_T_STATES);
        }
    }

    fn vdp_write_register(&mut self, reg: u8, value: u8) {
        self.port_write(PORT_VDP_CONTROL, value);
        self.port_write(PORT_VDP_CONTROL, 0x80 | reg);
    }

    fn port_read(&mut self, port: u8) -> u8 {
        let data = match port {
            0x40..=0x4F => self.ext_io.read(port),
            PORT_VDP_DATA => self.vdp.read_data(),
            PORT_VDP_CONTROL => {
                let raster = self.raster();
                self.vdp.read_status(raster)
            }
            0xB4 | 0xB5 => self.rtc.read(port),
            _ => NO_IO_BYTE,
        };
        let stats = self.io_stats.entry(port).or_default();
        stats.reads += 1;
        stats.last_read = data;
        data
    }

    fn port_write(&mut self, port: u8, data: u8) {
        let stats = self.io_stats.entry(port).or_default();
        stats.writes += 1;
        stats.last_write = data;

        let request = match port {
            0x40..=0x4F => self.ext_io.write(port, data),
            PORT_VDP_DATA => {
                self.vdp.write_data(data);
                None
            }
            PORT_VDP_CONTROL => {
                if let Some((reg, _)) = self.vdp.write_control(data) {
                    self.vdp_register_written(reg);
                }
                None
            }
            0xB4 | 0xB5 => self.rtc.write(port, data),
            _ => None,
        };
        if let Some(request) = request {
            self.apply_clock(request);
        }
    }

    fn vdp_register_written(&mut self, reg: u8) {
        if reg == REG_MODE3 {
            // Frame length may have changed under the current position.
            let frame_cycles = self.frame_cycles();
            if self.frame_pos >= frame_cycles {
                self.frame_pos %= frame_cycles;
            }
        }
        if self.vdp.irq() {
            self.irq_pending = true;
        }
    }
}

impl IoBus for SimulatedMsx {
    fn io_read_u8(&mut self, port: u8) -> u8 {
        self.charge_io();
        self.port_read(port)
    }

    fn io_write_u8(&mut self, port: u8, data: u8) {
        self.charge_io();
        self.port_write(port, data);
    }

    fn scanline(&mut self) -> u16 {
        self.raster().line
    }
}

impl HardwareBus for SimulatedMsx {
    fn mem_read_u8(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn mem_write_u8(&mut self, address: u16, data: u8) {
        // Pages 0 and 1 hold ROM.
        if address >= 0x8000 {
            self.memory[address as usize] = data;
        }
    }

    fn interrupts_enabled(&self) -> bool {
        self.iff
    }

    fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.iff = enabled;
        if enabled && !self.servicing {
            if self.vdp.irq() {
                self.irq_pending = true;
            }
            self.deliver_interrupts();
        }
    }

    fn swap_interrupt_handler(&mut self, handler: Option<Box<dyn InterruptHandler>>) -> Option<Box<dyn InterruptHandler>> {
        std::mem::replace(&mut self.handler, handler)
    }

    fn wait_for_interrupt(&mut self) {
        if !self.iff || !self.vdp.any_interrupt_enabled() {
            log::warn!(
                "HALT with interrupts masked (IFF {}, R#1 {:02X}), skipping a frame",
                self.iff,
                self.vdp.register(1)
            );
            let frame_cycles = self.frame_cycles();
            self.run_video(frame_cycles, false);
            return;
        }

        let target = self.interrupts_serviced + 1;
        self.deliver_interrupts();
        while self.interrupts_serviced < target {
            let (delta, _) = self.next_event();
            self.run_video(delta, true);
        }
    }

    fn run_busy_loop(&mut self, busy_loop: BusyLoop) {
        log::trace!(
            "busy loop: {} x {}T at {:.0}Hz",
            busy_loop.iterations,
            busy_loop.t_states,
            self.cpu_clock_hz
        );
        self.run_cpu(busy_loop.total_t_states() as f64);
    }

    fn execute(&mut self, code: &[u8], regs: ProbeRegisters) -> ProbeRegisters {
        let outcome = cpu::execute(self.active_cpu(), self.spec.cmos, code, regs);
        self.run_cpu(outcome.t_states as f64);
        if let Some((port, data)) = outcome.port_write {
            self.port_write(port, data);
        }
        outcome.regs
    }

    fn bios_call(&mut self, entry: u16, regs: ProbeRegisters) -> ProbeRegisters {
        self.run_cpu(BIOS_CALL_T_STATES);
        let mut out = regs;
        match entry {
            BIOS_WRTVDP => {
                self.vdp_write_register(regs.c, regs.b);
                if let Some(address) = register_mirror_address(regs.c) {
                    self.memory[address as usize] = regs.b;
                }
            }
            BIOS_CHGCPU if self.turbo_r_mode.is_some() => {
                let mode = regs.a & 0x03;
                if mode <= 2 {
                    self.set_turbo_r_mode(mode);
                }
            }
            BIOS_GETCPU if self.turbo_r_mode.is_some() => {
                out.a = self.turbo_r_mode.unwrap_or(0);
            }
            _ => {
                log::warn!("call to {:04X}: no routine at this address", entry);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_registers_mirrored() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            video: VideoChipGeneration::Gen1,
            tv_standard: TvStandard::Pal50,
            msx_version: 1,
            ..Default::default()
        });
        assert_eq!(msx.vdp().register(9), 0x02);
        assert_eq!(msx.mem_read_u8(0xFFE8), 0x02);
        assert_eq!(msx.tv_standard(), TvStandard::Pal50);
    }

    #[test]
    fn test_halt_waits_for_frame() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        let frames = msx.frame_count();
        msx.wait_for_interrupt();
        msx.wait_for_interrupt();
        assert_eq!(msx.interrupts_serviced(), 2);
        assert!(msx.frame_count() >= frames + 1);
    }

    #[test]
    fn test_halt_with_interrupts_masked_returns() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        msx.set_interrupts_enabled(false);
        let frames = msx.frame_count();
        msx.wait_for_interrupt();
        assert_eq!(msx.interrupts_serviced(), 0);
        assert_eq!(msx.frame_count(), frames + 1);
    }

    #[test]
    fn test_busy_loop_duration_at_reference_clock() {
        let mut msx = SimulatedMsx::new(MachineSpec::default());
        msx.set_interrupts_enabled(false);
        msx.run_busy_loop(BusyLoop {
            iterations: 59_736,
            t_states: 1,
        });
        // One NTSC frame of 262 lines x 228 cycles
        assert_eq!(msx.frame_count(), 1);
    }

    #[test]
    fn test_chgcpu_switches_clock() {
        let mut msx = SimulatedMsx::new(MachineSpec {
            msx_version: 3,
            turbo_r: Some(0),
            ..Default::default()
        });
        msx.bios_call(
            BIOS_CHGCPU,
            ProbeRegisters {
                a: 0x82,
                ..Default::default()
            },
        );
        assert_eq!(msx.turbo_r_mode(), Some(2));
        assert!(msx.cpu_clock_hz() > 30_000_000.0);
        let regs = msx.bios_call(BIOS_GETCPU, ProbeRegisters::default());
        assert_eq!(regs.a, 2);
    }
}
