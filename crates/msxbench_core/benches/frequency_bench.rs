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

    benches::frequency_bench.rs
*/

use std::num::NonZeroU32;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use msxbench_core::{
    devices::{MachineSpec, SimulatedMsx},
    machine_types::{TvStandard, VideoChipGeneration},
    timing::{compute_frequency, FrameTicks, TimingEngine, TimingSample},
    video::{V99x8Video, VideoOps},
};

pub fn frequency_compute_bench(c: &mut Criterion) {
    c.bench_function("frequency_compute_bench", |b| {
        let mut count = 1u32;
        b.iter(|| {
            count = count % 1000 + 1;
            let raw_count = NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN);
            let sample = TimingSample::<FrameTicks>::new(raw_count, Some(black_box(100)), TvStandard::Ntsc60);
            black_box(compute_frequency(&sample));
        });
    });
}

pub fn frame_measure_bench(c: &mut Criterion) {
    let mut msx = SimulatedMsx::new(MachineSpec::default());
    let engine = TimingEngine::<FrameTicks>::new();

    c.bench_function("frame_measure_bench", |b| {
        b.iter(|| {
            black_box(engine.measure_once(&mut msx, TvStandard::Ntsc60));
        });
    });
}

pub fn interleaved_measure_bench(c: &mut Criterion) {
    let mut msx = SimulatedMsx::new(MachineSpec {
        video: VideoChipGeneration::Gen2,
        msx_version: 2,
        ..Default::default()
    });
    let Some(engine) = V99x8Video::new(VideoChipGeneration::Gen2).interleaved_engine() else {
        return;
    };

    c.bench_function("interleaved_measure_bench", |b| {
        b.iter(|| {
            black_box(engine.measure_once(&mut msx, TvStandard::Ntsc60));
        });
    });
}

criterion_group!(
    benches,
    frequency_compute_bench,
    frame_measure_bench,
    interleaved_measure_bench
);
criterion_main!(benches);
