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

    bus::guard.rs
*/

//! Scoped guards for shared host state.
//!
//! Each guard borrows the bus for its lifetime and derefs to it, so work done under the
//! guard goes through the guard. Dropping the guard restores what it saved, on every
//! exit path.

use std::ops::{Deref, DerefMut};

use crate::bus::{HardwareBus, InterruptHandler, IoBus, PORT_EXT_IO_SELECT};

/// Interrupts disabled for the guard's lifetime; the previous mask is restored on drop.
pub struct CriticalSection<'a> {
    bus: &'a mut dyn HardwareBus,
    was_enabled: bool,
}

impl<'a> CriticalSection<'a> {
    pub fn enter(bus: &'a mut dyn HardwareBus) -> Self {
        let was_enabled = bus.interrupts_enabled();
        bus.set_interrupts_enabled(false);
        Self { bus, was_enabled }
    }
}

impl<'a> Deref for CriticalSection<'a> {
    type Target = dyn HardwareBus + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.bus
    }
}

impl<'a> DerefMut for CriticalSection<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.bus
    }
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.bus.set_interrupts_enabled(true);
        }
    }
}

/// Exclusive use of the expanded I/O selector at port 0x40.
///
/// The selected device is saved on acquire as the complement of a port 0x40 read and
/// written back on drop. Interrupts stay disabled while the guard is held.
pub struct SelectorGuard<'a> {
    bus: &'a mut dyn HardwareBus,
    saved_selection: u8,
    was_enabled: bool,
}

impl<'a> SelectorGuard<'a> {
    pub fn acquire(bus: &'a mut dyn HardwareBus) -> Self {
        let was_enabled = bus.interrupts_enabled();
        bus.set_interrupts_enabled(false);
        let saved_selection = !bus.io_read_u8(PORT_EXT_IO_SELECT);
        Self {
            bus,
            saved_selection,
            was_enabled,
        }
    }

    /// Select `device_id`. Returns true if a device answered with the complement of
    /// its ID.
    pub fn select(&mut self, device_id: u8) -> bool {
        self.bus.io_write_u8(PORT_EXT_IO_SELECT, device_id);
        !self.bus.io_read_u8(PORT_EXT_IO_SELECT) == device_id
    }

    pub fn saved_selection(&self) -> u8 {
        self.saved_selection
    }
}

impl<'a> Deref for SelectorGuard<'a> {
    type Target = dyn HardwareBus + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.bus
    }
}

impl<'a> DerefMut for SelectorGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.bus
    }
}

impl Drop for SelectorGuard<'_> {
    fn drop(&mut self) {
        self.bus.io_write_u8(PORT_EXT_IO_SELECT, self.saved_selection);
        if self.was_enabled {
            self.bus.set_interrupts_enabled(true);
        }
    }
}

/// An interrupt handler installed for the guard's lifetime.
///
/// Installation happens with interrupts disabled. On drop the previous handler and the
/// previous interrupt mask are put back, again with interrupts disabled in between.
pub struct InterruptHook<'a> {
    bus: &'a mut dyn HardwareBus,
    previous: Option<Box<dyn InterruptHandler>>,
    was_enabled: bool,
}

impl<'a> InterruptHook<'a> {
    pub fn install(bus: &'a mut dyn HardwareBus, handler: Box<dyn InterruptHandler>) -> Self {
        let was_enabled = bus.interrupts_enabled();
        bus.set_interrupts_enabled(false);
        let previous = bus.swap_interrupt_handler(Some(handler));
        log::trace!("interrupt hook installed (previous: {})", previous.is_some());
        Self {
            bus,
            previous,
            was_enabled,
        }
    }
}

impl<'a> Deref for InterruptHook<'a> {
    type Target = dyn HardwareBus + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.bus
    }
}

impl<'a> DerefMut for InterruptHook<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.bus
    }
}

impl Drop for InterruptHook<'_> {
    fn drop(&mut self) {
        self.bus.set_interrupts_enabled(false);
        let _ours = self.bus.swap_interrupt_handler(self.previous.take());
        log::trace!("interrupt hook removed");
        if self.was_enabled {
            self.bus.set_interrupts_enabled(true);
        }
    }
}
