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

    script.rs
*/

//! Command source that plays back the configured script.

use std::{collections::VecDeque, str::FromStr};

use anyhow::{anyhow, Context};

use msxbench_core::bench::{Command, CommandSource};

/// Issues each command after `samples_per_step` measurements, then `Exit` once the
/// script is spent.
#[derive(Debug)]
pub struct ScriptedCommands {
    commands: VecDeque<Command>,
    samples_per_step: u32,
    waited: u32,
}

impl ScriptedCommands {
    pub fn parse(script: &[String], samples_per_step: u32) -> Result<Self, anyhow::Error> {
        let commands = script
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Command::from_str(entry)
                    .map_err(|e| anyhow!(e))
                    .with_context(|| format!("script entry {}: '{}'", i + 1, entry))
            })
            .collect::<Result<VecDeque<_>, _>>()?;

        Ok(Self {
            commands,
            samples_per_step: samples_per_step.max(1),
            waited: 0,
        })
    }

    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn poll_requested_command(&mut self) -> Command {
        self.waited += 1;
        if self.waited < self.samples_per_step {
            return Command::None;
        }
        self.waited = 0;
        let command = self.commands.pop_front().unwrap_or(Command::Exit);
        log::debug!("script: {:?}", command);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msxbench_core::machine_types::ExtensionKind;

    fn script(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_commands_follow_sample_count() {
        let mut commands = ScriptedCommands::parse(&script(&["cycle:pana", "toggle_tv"]), 2).unwrap();
        assert_eq!(commands.poll_requested_command(), Command::None);
        assert_eq!(
            commands.poll_requested_command(),
            Command::CycleExtension(ExtensionKind::PanasonicTurbo)
        );
        assert_eq!(commands.poll_requested_command(), Command::None);
        assert_eq!(commands.poll_requested_command(), Command::ToggleTv);
        assert_eq!(commands.remaining(), 0);
        assert_eq!(commands.poll_requested_command(), Command::None);
        assert_eq!(commands.poll_requested_command(), Command::Exit);
    }

    #[test]
    fn test_bad_entry_names_position() {
        let err = ScriptedCommands::parse(&script(&["wait", "warp"]), 1).unwrap_err();
        assert!(format!("{:#}", err).contains("script entry 2"));
    }
}
