//! Device address and scan-mode types.

use crate::error::HciError;
use std::fmt;
use std::str::FromStr;

/// A Bluetooth device address (BD_ADDR).
///
/// Stored in HCI wire order (least-significant byte first), which is the
/// reverse of the human-readable `AA:BB:CC:DD:EE:FF` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

impl FromStr for BdAddr {
    type Err = HciError;

    /// Parse `AA:BB:CC:DD:EE:FF` into HCI byte order (reversed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(HciError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[5 - i] = u8::from_str_radix(part, 16)
                .map_err(|_| HciError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self { bytes })
    }
}

/// Advertiser address type as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
    PublicIdentity,
    RandomIdentity,
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AddressType::Public,
            0x01 => AddressType::Random,
            0x02 => AddressType::PublicIdentity,
            0x03 => AddressType::RandomIdentity,
            _ => AddressType::Public,
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Public => 0x00,
            AddressType::Random => 0x01,
            AddressType::PublicIdentity => 0x02,
            AddressType::RandomIdentity => 0x03,
        }
    }
}

/// Whether the radio only listens or also sends scan requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanType {
    #[default]
    Passive,
    Active,
}

impl From<ScanType> for u8 {
    fn from(value: ScanType) -> Self {
        match value {
            ScanType::Passive => 0x00,
            ScanType::Active => 0x01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bdaddr_parse_and_display_round_trip() {
        let addr: BdAddr = "1C:34:F1:DE:25:74".parse().unwrap();
        // Wire order is reversed relative to the display form
        assert_eq!(addr.bytes, [0x74, 0x25, 0xDE, 0xF1, 0x34, 0x1C]);
        assert_eq!(addr.to_string(), "1C:34:F1:DE:25:74");
    }

    #[test]
    fn test_bdaddr_parse_rejects_malformed() {
        assert!("1C:34:F1:DE:25".parse::<BdAddr>().is_err());
        assert!("1C:34:F1:DE:25:GG".parse::<BdAddr>().is_err());
        assert!("".parse::<BdAddr>().is_err());
    }

    #[test]
    fn test_bdaddr_from_slice() {
        assert!(BdAddr::from_slice(&[1, 2, 3]).is_none());
        let addr = BdAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(addr.bytes, [1, 2, 3, 4, 5, 6]);
    }
}
