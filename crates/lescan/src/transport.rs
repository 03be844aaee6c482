//! The transport seam between the scan session and the HCI socket.

use crate::error::HciError;
use crate::hci::command::HciCommand;
use std::time::Duration;

/// Low-level HCI operations the scan session consumes.
///
/// Implemented by [`HciSocket`](crate::hci::HciSocket); tests substitute a
/// scripted fake. Closing the handle is the implementor's `Drop`.
pub trait HciTransport {
    /// Send a command and return the controller's status byte, bounded by
    /// `timeout` for the full round trip.
    fn send_command(&self, command: &HciCommand, timeout: Duration) -> Result<u8, HciError>;

    /// Configure the transport to deliver only LE meta-events.
    fn set_event_filter(&self) -> Result<(), HciError>;

    /// Read one raw HCI packet into `buffer`, waiting at most `timeout`.
    /// Returns the byte count; `Ok(0)` means the slice elapsed with nothing
    /// to read.
    fn read_event(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize, HciError>;
}
