//! Bluetooth HCI (Host Controller Interface) implementation
//!
//! This module provides the command builder, event and advertising-report
//! decoding, and the raw socket transport.

pub mod command;
pub mod constants;
pub mod event;
pub mod socket;

#[cfg(test)]
mod tests;

pub use command::HciCommand;
pub use event::{AdvReports, AdvertisingReport, HciEvent};
pub use socket::HciSocket;
