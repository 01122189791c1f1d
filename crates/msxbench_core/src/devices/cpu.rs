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

    devices::cpu.rs

    Probe opcode model for the Z80, R800 and Z280.
*/

//! Instruction-level model of the probe opcodes on each CPU family.
//!
//! Only the handful of sequences used for identification are decoded. Anything else
//! logs a warning and leaves the registers as they were.

use serde_derive::Deserialize;
use std::str::FromStr;
use strum_macros::Display;

use crate::bus::{ProbeRegisters, FLAG_S, FLAG_Z};

const FLAG_C: u8 = 0b0000_0001;

#[derive(Copy, Clone, Debug, Default, Deserialize, Display, Hash, Eq, PartialEq)]
pub enum CpuModel {
    #[default]
    #[serde(alias = "z80")]
    Z80,
    #[serde(alias = "r800")]
    R800,
    #[serde(alias = "z280")]
    Z280,
}

impl FromStr for CpuModel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s.to_lowercase().as_str() {
            "z80" => Ok(CpuModel::Z80),
            "r800" => Ok(CpuModel::R800),
            "z280" => Ok(CpuModel::Z280),
            _ => Err("Bad value for cpu".to_string()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub regs: ProbeRegisters,
    /// Port and value driven by an output instruction.
    pub port_write: Option<(u8, u8)>,
    pub t_states: u32,
}

fn sz_flags(value: u8) -> u8 {
    let mut f = value & FLAG_S;
    if value == 0 {
        f |= FLAG_Z;
    }
    f
}

pub fn execute(model: CpuModel, cmos: bool, code: &[u8], regs: ProbeRegisters) -> ProbeOutcome {
    let mut out = ProbeOutcome {
        regs,
        port_write: None,
        t_states: 8,
    };
    match (code, model) {
        // TSET A: S reflects bit 7 before the operand is set to FF.
        ([0xCB, 0x37], CpuModel::Z280) => {
            out.regs.f = (regs.f & !FLAG_S) | (regs.a & FLAG_S);
            out.regs.a = 0xFF;
        }
        // SLL A
        ([0xCB, 0x37], CpuModel::Z80) => {
            let result = (regs.a << 1) | 1;
            out.regs.a = result;
            out.regs.f = sz_flags(result) | (regs.a >> 7);
        }
        // SLA A
        ([0xCB, 0x37], CpuModel::R800) => {
            let result = regs.a << 1;
            out.regs.a = result;
            out.regs.f = sz_flags(result) | (regs.a >> 7);
        }
        // MULUB A,C
        ([0xED, 0xC9], CpuModel::R800) => {
            let product = regs.a as u16 * regs.c as u16;
            out.regs.h = (product >> 8) as u8;
            out.regs.l = product as u8;
            out.regs.f = regs.f & !(FLAG_S | FLAG_Z | FLAG_C);
            if product == 0 {
                out.regs.f |= FLAG_Z;
            }
            if product > 0xFF {
                out.regs.f |= FLAG_C;
            }
            out.t_states = 14;
        }
        ([0xED, 0xC9], _) => {}
        // OUT (C),0
        ([0xED, 0x71], _) => {
            let value = match model {
                CpuModel::Z80 if cmos => 0xFF,
                _ => 0x00,
            };
            out.port_write = Some((regs.c, value));
            out.t_states = 12;
        }
        _ => {
            log::warn!("{}: unsupported probe sequence {:02X?}", model, code);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tset_sets_sign_except_on_z280() {
        let regs = ProbeRegisters {
            a: 0x40,
            ..Default::default()
        };
        assert_eq!(execute(CpuModel::Z80, false, &[0xCB, 0x37], regs).regs.a, 0x81);
        assert_ne!(execute(CpuModel::Z80, false, &[0xCB, 0x37], regs).regs.f & FLAG_S, 0);
        assert_ne!(execute(CpuModel::R800, false, &[0xCB, 0x37], regs).regs.f & FLAG_S, 0);
        assert_eq!(execute(CpuModel::Z280, false, &[0xCB, 0x37], regs).regs.f & FLAG_S, 0);
    }

    #[test]
    fn test_mulub_zero_product() {
        let regs = ProbeRegisters {
            a: 1,
            c: 0,
            ..Default::default()
        };
        assert_ne!(execute(CpuModel::R800, false, &[0xED, 0xC9], regs).regs.f & FLAG_Z, 0);
        assert_eq!(execute(CpuModel::Z80, false, &[0xED, 0xC9], regs).regs.f & FLAG_Z, 0);
    }

    #[test]
    fn test_out_c_0() {
        let regs = ProbeRegisters {
            c: 0x98,
            ..Default::default()
        };
        assert_eq!(execute(CpuModel::Z80, false, &[0xED, 0x71], regs).port_write, Some((0x98, 0x00)));
        assert_eq!(execute(CpuModel::Z80, true, &[0xED, 0x71], regs).port_write, Some((0x98, 0xFF)));
    }
}
