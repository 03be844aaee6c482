//! HCI socket implementation for Bluetooth communication
//!
//! This module provides a wrapper around the raw HCI socket interface,
//! allowing for communication with Bluetooth controllers.

use crate::error::HciError;
use crate::hci::command::HciCommand;
use crate::hci::constants::*;
use crate::hci::event::HciEvent;
use crate::transport::HciTransport;
use log::warn;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

// Bluetooth socket constants
const AF_BLUETOOTH: i32 = 31;
const BTPROTO_HCI: i32 = 1;
const HCI_CHANNEL_RAW: i32 = 0;

/// Represents an HCI socket
#[derive(Debug)]
pub struct HciSocket {
    fd: RawFd,
    dev_id: u16,
}

// Define the sockaddr_hci structure
#[repr(C)]
struct SockaddrHci {
    hci_family: libc::sa_family_t,
    hci_dev: u16,
    hci_channel: u16,
}

// Kernel struct hci_filter, set via setsockopt(SOL_HCI, HCI_FILTER)
#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

impl HciFilter {
    /// A filter admitting only event packets with the given event codes.
    fn events(codes: &[u8], opcode: u16) -> Self {
        let mut event_mask = [0u32; 2];
        for &code in codes {
            event_mask[(code >> 5) as usize] |= 1 << (code & 0x1f);
        }
        HciFilter {
            type_mask: 1 << HCI_EVENT_PKT,
            event_mask,
            opcode,
        }
    }
}

impl HciSocket {
    /// Opens a new HCI socket
    ///
    /// # Arguments
    ///
    /// * `dev_id` - The device ID to open (0 for the first device)
    ///
    /// # Returns
    ///
    /// A new `HciSocket` instance or an error if the socket could not be opened
    pub fn open(dev_id: u16) -> Result<Self, HciError> {
        // Open a raw HCI socket
        let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_RAW, BTPROTO_HCI) };

        if fd < 0 {
            return Err(HciError::SocketError(std::io::Error::last_os_error()));
        }

        // Bind to the specified device
        let addr = SockaddrHci {
            hci_family: AF_BLUETOOTH as libc::sa_family_t,
            hci_dev: dev_id,
            hci_channel: HCI_CHANNEL_RAW as u16,
        };

        let result = unsafe {
            libc::bind(
                fd,
                &addr as *const _ as *const libc::sockaddr,
                std::mem::size_of::<SockaddrHci>() as libc::socklen_t,
            )
        };

        if result < 0 {
            unsafe { libc::close(fd) };
            return Err(HciError::BindError(std::io::Error::last_os_error()));
        }

        Ok(HciSocket { fd, dev_id })
    }

    /// Opens the preferred HCI device, falling back to device 0.
    pub fn open_preferred(preferred: u16) -> Result<Self, HciError> {
        match Self::open(preferred) {
            Ok(socket) => Ok(socket),
            Err(e) if preferred != 0 => {
                warn!("hci{} unavailable ({}), trying hci0", preferred, e);
                Self::open(0)
            }
            Err(e) => Err(e),
        }
    }

    /// The device index this socket is bound to.
    pub fn dev_id(&self) -> u16 {
        self.dev_id
    }

    /// Gets the raw file descriptor for the socket
    pub fn as_raw_fd(&self) -> RawFd {
        self.fd
    }

    fn set_filter(&self, filter: &HciFilter) -> Result<(), HciError> {
        let result = unsafe {
            libc::setsockopt(
                self.fd,
                SOL_HCI,
                HCI_FILTER,
                filter as *const _ as *const libc::c_void,
                std::mem::size_of::<HciFilter>() as libc::socklen_t,
            )
        };

        if result < 0 {
            return Err(HciError::FilterError(std::io::Error::last_os_error()));
        }

        Ok(())
    }

    /// Wait until the socket is readable or the timeout elapses.
    fn wait_readable(&self, timeout: Duration) -> Result<bool, HciError> {
        let mut read_fds: libc::fd_set = unsafe { std::mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut read_fds);
            libc::FD_SET(self.fd, &mut read_fds);
        }

        let mut timeout_val = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };

        let result = unsafe {
            libc::select(
                self.fd + 1,
                &mut read_fds,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut timeout_val,
            )
        };

        if result < 0 {
            let err = std::io::Error::last_os_error();
            // A signal interrupting the wait is treated like an empty slice
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(HciError::ReceiveError(err));
        }

        Ok(result > 0)
    }

    fn raw_read(&self, buffer: &mut [u8]) -> Result<usize, HciError> {
        let bytes_read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if bytes_read < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(HciError::ReceiveError(err));
        }

        Ok(bytes_read as usize)
    }
}

impl HciTransport for HciSocket {
    /// Send a command and wait for its Command Complete / Command Status
    /// response, returning the status byte.
    ///
    /// The kernel filter is narrowed to the command-response events for the
    /// duration of the round trip; callers that need event traffic afterwards
    /// reconfigure the filter via `set_event_filter`.
    fn send_command(&self, command: &HciCommand, timeout: Duration) -> Result<u8, HciError> {
        let opcode = command.opcode();

        self.set_filter(&HciFilter::events(
            &[EVT_CMD_COMPLETE, EVT_CMD_STATUS],
            opcode,
        ))?;

        let packet = command.to_packet();
        let written = unsafe {
            libc::write(
                self.fd,
                packet.as_ptr() as *const libc::c_void,
                packet.len(),
            )
        };
        if written < 0 {
            return Err(HciError::SendError(std::io::Error::last_os_error()));
        }

        let deadline = Instant::now() + timeout;
        let mut buffer = [0u8; HCI_MAX_EVENT_SIZE];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(HciError::CommandTimeout { opcode });
            }

            if !self.wait_readable(deadline - now)? {
                continue;
            }

            let len = self.raw_read(&mut buffer)?;
            if len < 1 + HCI_EVENT_HDR_SIZE || buffer[0] != HCI_EVENT_PKT {
                continue;
            }

            if let Some(event) = HciEvent::parse(&buffer[1..len]) {
                if let Some(status) = event.command_status(opcode) {
                    return Ok(status);
                }
            }
        }
    }

    /// Configure the kernel filter to deliver only LE meta-events.
    fn set_event_filter(&self) -> Result<(), HciError> {
        self.set_filter(&HciFilter::events(&[EVT_LE_META_EVENT], 0))
    }

    /// Bounded raw read of one HCI packet.
    ///
    /// Returns `Ok(0)` when the timeout slice elapses or the wait is
    /// interrupted by a signal; only hard socket errors are returned as
    /// errors.
    fn read_event(&self, buffer: &mut [u8], timeout: Duration) -> Result<usize, HciError> {
        if !self.wait_readable(timeout)? {
            return Ok(0);
        }
        self.raw_read(buffer)
    }
}

impl AsRawFd for HciSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for HciSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
