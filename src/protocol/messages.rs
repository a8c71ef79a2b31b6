// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line protocol used to tune and inspect the balancer over the serial link.
//!
//! ASCII, case insensitive, whitespace insensitive. One request per line:
//!
//! ```text
//! >>> balance-pid.kp          get a property
//! <<< 650.00
//! >>> balance-pid.kp=700      set a property
//! <<< OK
//! >>> balance-pid.kp=abc      unparsable value
//! <<< ERROR
//! >>> foo                     unknown property
//! <<< UNKNOWN
//! >>> angle=1                 property has no setter
//! <<< DENIED
//! >>> x=20=200                malformed request
//! <<< MALFORMED
//! ```

use core::fmt;

use heapless::String;

/// Maximum length of a packet in bytes, delimiter included.
pub const PACKET_LENGTH: usize = 64;

/// Marks the end of a packet.
pub const PACKET_DELIMITER: u8 = b'\n';

/// Separates the property name from the payload.
pub const PAYLOAD_DELIMITER: u8 = b'=';

pub const RESPONSE_OK: &str = "OK";
pub const RESPONSE_ERROR: &str = "ERROR";
pub const RESPONSE_UNKNOWN: &str = "UNKNOWN";
pub const RESPONSE_DENIED: &str = "DENIED";
pub const RESPONSE_MALFORMED: &str = "MALFORMED";

/// Property name, payload or formatted value.
pub type Value = String<PACKET_LENGTH>;

/// A well-formed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub name: Value,
    /// `Some` for a set request, `None` for a get request.
    pub payload: Option<Value>,
}

/// The line could not be split into a name and an optional payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Value(Value),
    Ok,
    Error,
    Unknown,
    Denied,
    Malformed,
}

impl Reply {
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Value(v) => v.as_str(),
            Reply::Ok => RESPONSE_OK,
            Reply::Error => RESPONSE_ERROR,
            Reply::Unknown => RESPONSE_UNKNOWN,
            Reply::Denied => RESPONSE_DENIED,
            Reply::Malformed => RESPONSE_MALFORMED,
        }
    }

    /// Write the reply followed by the packet delimiter.
    pub fn write_to<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        w.write_str(self.as_str())?;
        w.write_char(PACKET_DELIMITER as char)
    }
}

impl From<Malformed> for Reply {
    fn from(_: Malformed) -> Self {
        Reply::Malformed
    }
}
