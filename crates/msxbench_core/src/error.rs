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
*/

use thiserror::Error;

use crate::machine_types::{ExtensionKind, VideoChipGeneration};

/// Fatal conditions found while profiling the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported platform: MSX version byte {0:#04X}")]
    UnsupportedVersion(u8),
}

/// A user command that cannot be carried out on this machine. The session continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0} is not present on this machine")]
    ExtensionAbsent(ExtensionKind),
    #[error("{0} has no speed level {1}")]
    LevelOutOfRange(ExtensionKind, usize),
    #[error("{0} video cannot switch TV standard")]
    TvSwitchUnsupported(VideoChipGeneration),
    #[error("{0} did not acknowledge the speed change")]
    NotAcknowledged(ExtensionKind),
}
