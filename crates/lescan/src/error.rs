//! Error types for the lescan library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors that can occur when working with HCI sockets and scan sessions
#[derive(Error, Debug)]
pub enum HciError {
    #[error("Failed to open HCI socket: {0}")]
    SocketError(std::io::Error),

    #[error("Failed to bind to HCI device: {0}")]
    BindError(std::io::Error),

    #[error("Failed to send HCI command: {0}")]
    SendError(std::io::Error),

    #[error("Failed to receive HCI event: {0}")]
    ReceiveError(std::io::Error),

    #[error("Failed to configure HCI event filter: {0}")]
    FilterError(std::io::Error),

    #[error("Timed out waiting for response to command {opcode:#06x}")]
    CommandTimeout { opcode: u16 },

    #[error("Command {opcode:#06x} failed with status {status:#04x}")]
    CommandFailed { opcode: u16, status: u8 },

    #[error("Invalid HCI packet format")]
    InvalidPacketFormat,

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Scan session already shut down")]
    SessionClosed,
}
