// SPDX-License-Identifier: AGPL-3.0-only

//! Cycle-driven controller.
//!
//! All control signals are a pure function of the cycle counter, the array
//! width `N` and the stream length `L`:
//!
//! ```text
//! cycle:   0 ........ L-1 | L ....... 2N-2+L | 2N-1+L ... 3N-2+L | 3N-1+L
//!          stream X/W rows | fill + skew       | drain Y rows       | idle
//! Y addr:                                      | N-1 ........ 0     |
//! ```

use serde::{Deserialize, Serialize};

/// Fixed timing parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Array width `N`.
    pub array_width: usize,
    /// Rows streamed from each input memory `L` (the reduction length).
    pub stream_length: usize,
}

impl Schedule {
    /// Schedule for an `array_width`-wide array streaming `stream_length` rows.
    pub const fn new(array_width: usize, stream_length: usize) -> Self {
        Self {
            array_width,
            stream_length,
        }
    }

    /// First cycle of the output drain, `2N - 1 + L`.
    ///
    /// For `N == 0` the fill latency is taken as zero.
    pub const fn drain_start(&self) -> usize {
        (2 * self.array_width).saturating_sub(1) + self.stream_length
    }

    /// One past the last cycle that writes output memory.
    pub const fn drain_end(&self) -> usize {
        self.drain_start() + self.array_width
    }

    /// Cycles needed to stream, fill and fully drain: `3N + L`.
    pub const fn total_cycles(&self) -> usize {
        3 * self.array_width + self.stream_length
    }

    /// Control signals for `cycle`.
    pub const fn signals_at(&self, cycle: usize) -> ControlSignals {
        let reading = cycle < self.stream_length;
        let drain_start = self.drain_start();
        let writing = cycle >= drain_start && cycle < self.drain_end();
        ControlSignals {
            x_mem_read_enable: reading,
            x_mem_read_addr: cycle,
            w_mem_read_enable: reading,
            w_mem_read_addr: cycle,
            y_mem_write_enable: writing,
            y_mem_write_addr: if writing {
                self.array_width - 1 - (cycle - drain_start)
            } else {
                0
            },
            moves_output_down: cycle >= drain_start,
        }
    }
}

/// Control signals for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSignals {
    /// Read a row of X memory this cycle.
    pub x_mem_read_enable: bool,
    /// X memory row to read.
    pub x_mem_read_addr: usize,
    /// Read a row of W memory this cycle.
    pub w_mem_read_enable: bool,
    /// W memory row to read.
    pub w_mem_read_addr: usize,
    /// Write the array output into Y memory this cycle.
    pub y_mem_write_enable: bool,
    /// Y memory row to write (meaningful only when enabled).
    pub y_mem_write_addr: usize,
    /// Shift accumulators down out of the array instead of computing.
    pub moves_output_down: bool,
}

/// Owns the cycle counter and hands out each cycle's signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    schedule: Schedule,
    cycle: usize,
}

impl Controller {
    /// Controller at cycle 0.
    pub const fn new(schedule: Schedule) -> Self {
        Self { schedule, cycle: 0 }
    }

    /// Current cycle count.
    pub const fn cycle(&self) -> usize {
        self.cycle
    }

    /// Timing parameters.
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Signals for the current cycle, without advancing.
    pub const fn signals(&self) -> ControlSignals {
        self.schedule.signals_at(self.cycle)
    }

    /// Advance to the next cycle.
    pub fn advance(&mut self) {
        self.cycle += 1;
    }

    /// Signals for the current cycle, then advance.
    pub fn tick(&mut self) -> ControlSignals {
        let signals = self.signals();
        self.advance();
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_arithmetic() {
        let s = Schedule::new(2, 2);
        assert_eq!(s.drain_start(), 5);
        assert_eq!(s.drain_end(), 7);
        assert_eq!(s.total_cycles(), 8);

        let s = Schedule::new(4, 3);
        assert_eq!(s.drain_start(), 10);
        assert_eq!(s.total_cycles(), 15);
    }

    #[test]
    fn reads_for_stream_length_cycles() {
        let s = Schedule::new(2, 3);
        for c in 0..3 {
            let sig = s.signals_at(c);
            assert!(sig.x_mem_read_enable && sig.w_mem_read_enable);
            assert_eq!((sig.x_mem_read_addr, sig.w_mem_read_addr), (c, c));
        }
        assert!(!s.signals_at(3).x_mem_read_enable);
    }

    #[test]
    fn write_address_counts_down() {
        let s = Schedule::new(3, 2);
        let writes: Vec<(usize, usize)> = (0..s.total_cycles())
            .map(|c| (c, s.signals_at(c)))
            .filter(|(_, sig)| sig.y_mem_write_enable)
            .map(|(c, sig)| (c, sig.y_mem_write_addr))
            .collect();
        assert_eq!(writes, vec![(7, 2), (8, 1), (9, 0)]);
    }

    #[test]
    fn eviction_from_drain_start_onwards() {
        let s = Schedule::new(2, 2);
        assert!(!s.signals_at(4).moves_output_down);
        assert!(s.signals_at(5).moves_output_down);
        // stays set past the write window
        assert!(s.signals_at(7).moves_output_down);
        assert!(!s.signals_at(7).y_mem_write_enable);
    }

    #[test]
    fn tick_advances_once() {
        let mut ctl = Controller::new(Schedule::new(2, 2));
        let first = ctl.tick();
        assert_eq!(first.x_mem_read_addr, 0);
        assert_eq!(ctl.cycle(), 1);
        assert_eq!(ctl.signals().x_mem_read_addr, 1);
    }
}
