//! lescan - BLE advertisement scanning over the Linux HCI interface
//!
//! This library drives a Bluetooth controller through a raw HCI socket to
//! scan for BLE advertisements: it configures the radio with the LE scan
//! command sequence, decodes advertising-report meta-events, and reports
//! each advertisement to a callback or stops as soon as a configured target
//! address is observed. Every exit path disables scanning and closes the
//! device exactly once.

pub mod cancel;
pub mod error;
pub mod hci;
pub mod session;
pub mod transport;
pub mod types;

// Re-export common types for convenience
pub use cancel::{CancelToken, StopCause};
pub use error::HciError;
pub use hci::{AdvReports, AdvertisingReport, HciCommand, HciEvent, HciSocket};
pub use session::{ScanConfig, ScanOutcome, ScanSession};
pub use transport::HciTransport;
pub use types::{AddressType, BdAddr, ScanType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_hci_socket() {
        // This test will only pass if run with sufficient privileges
        // and if a Bluetooth adapter is available
        let result = HciSocket::open(0);

        // We don't assert here because the test might fail in environments
        // without Bluetooth hardware or sufficient privileges
        if let Ok(socket) = result {
            assert!(socket.as_raw_fd() > 0);
            assert_eq!(socket.dev_id(), 0);
        }
    }
}
