//! Flow control window accounting (§4.F).
//!
//! One [`FlowController`] tracks either the connection window or a single
//! stream's window, on either the send or the receive side. It does not
//! talk to the wire; callers hand it deltas and ask whether a
//! WINDOW_UPDATE is due.

use crate::error::Error;

pub const DEFAULT_INITIAL_WINDOW_SIZE: i64 = 65_535;
pub const MAX_WINDOW_SIZE: i64 = (1u64 << 31) as i64 - 1;

/// Tracks a receive window and decides when enough of it has been
/// consumed to justify sending a WINDOW_UPDATE back to the peer.
#[derive(Debug, Clone, Copy)]
pub struct FlowController {
    current_window: i64,
    max_window: i64,
    threshold: i64,
}

impl FlowController {
    pub fn new(max_window: i64) -> FlowController {
        FlowController {
            current_window: max_window,
            max_window,
            threshold: max_window / 2,
        }
    }

    pub fn current_window(&self) -> i64 {
        self.current_window
    }

    pub fn max_window(&self) -> i64 {
        self.max_window
    }

    /// Account for `n` bytes of DATA received against this window.
    pub fn receive(&mut self, n: usize) -> Result<(), Error> {
        self.current_window -= n as i64;
        if self.current_window < 0 {
            return Err(Error::protocol("flow control window exceeded"));
        }
        Ok(())
    }

    /// If the consumed fraction of the window has crossed `threshold`,
    /// return the WINDOW_UPDATE increment to send and replenish locally.
    pub fn create_window_update(&mut self) -> Option<u32> {
        let consumed = self.max_window - self.current_window;
        if consumed <= self.threshold || consumed == 0 {
            return None;
        }
        self.current_window += consumed;
        Some(consumed as u32)
    }

    /// Apply an incoming WINDOW_UPDATE increment to a send-side window.
    pub fn apply_window_update(&mut self, increment: u32) -> Result<(), Error> {
        let new_window = self.current_window + increment as i64;
        if new_window > MAX_WINDOW_SIZE {
            return Err(Error::protocol("window update overflows flow control window"));
        }
        self.current_window = new_window;
        Ok(())
    }

    /// Debit `n` bytes from a send-side window before transmitting DATA.
    pub fn debit_send(&mut self, n: usize) -> Result<(), Error> {
        if n as i64 > self.current_window {
            return Err(Error::protocol("insufficient send window"));
        }
        self.current_window -= n as i64;
        Ok(())
    }

    /// A SETTINGS_INITIAL_WINDOW_SIZE change adjusts every open stream's
    /// window by the delta between old and new values (RFC 7540 §6.9.2).
    pub fn adjust_initial_window(&mut self, new_initial: i64) -> Result<(), Error> {
        let delta = new_initial - self.max_window;
        let new_window = self.current_window + delta;
        if !(-MAX_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&new_window) {
            return Err(Error::protocol("initial window adjustment overflows window"));
        }
        self.current_window = new_window;
        self.max_window = new_initial;
        self.threshold = new_initial / 2;
        Ok(())
    }
}
