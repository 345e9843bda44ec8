//! # Address Codec
//!
//! Textual forms of the addressing data the tool works with:
//! * MAC addresses (`XX:XX:XX:XX:XX:XX`, six two-digit hex groups).
//! * IPv4 broadcast/unicast targets (dotted-quad strings, used verbatim).
//! * UDP ports.
//!
//! Validation here is syntactic. A string that passes `is_valid_ipv4` is
//! stored and handed to the socket layer as-is, without resolution.

use std::fmt;
use std::str::FromStr;

use crate::error::WolError;

/// A six-octet hardware address.
///
/// Canonical text form is uppercase colon-separated hex; parsing accepts
/// either case. Round-trips on value, not on the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    /// The raw octets in address order.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = WolError;

    /// Parses `XX:XX:XX:XX:XX:XX`. Exactly six groups, exactly two hex
    /// digits per group, nothing before or after.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WolError::InvalidMac(s.to_string());

        let mut octets = [0u8; 6];
        let mut groups = s.split(':');

        for octet in &mut octets {
            let group = groups.next().ok_or_else(invalid)?;
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| invalid())?;
        }

        if groups.next().is_some() {
            return Err(invalid());
        }

        Ok(MacAddress(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Checks that `text` is a dotted quad: four groups of 1-3 decimal digits,
/// each with a value of at most 255. Leading zeros are tolerated and kept.
pub fn is_valid_ipv4(text: &str) -> bool {
    let mut groups = 0usize;

    for group in text.split('.') {
        groups += 1;
        if groups > 4 {
            return false;
        }

        let in_range = (1..=3).contains(&group.len())
            && group.bytes().all(|b| b.is_ascii_digit())
            && group.parse::<u16>().is_ok_and(|value| value <= 255);

        if !in_range {
            return false;
        }
    }

    groups == 4
}

/// Checks that `value` is a usable Wake-On-Lan port.
///
/// The upper bound is exclusive: 65535 is rejected. This mirrors the
/// validation the stored registries were written against, so it is kept
/// even though 65535 is a technically valid UDP port.
pub fn is_valid_port(value: i64) -> bool {
    (0..65535).contains(&value)
}
