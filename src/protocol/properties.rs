// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Named properties and request dispatch.

use core::fmt::Write;

use crate::protocol::messages::{Reply, Request, Value};

/// Which requests a property accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    #[inline]
    pub fn readable(self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    #[inline]
    pub fn writable(self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

/// An entry of a property table.
#[derive(Copy, Clone, Debug)]
pub struct Property<K> {
    pub name: &'static str,
    pub key: K,
    pub access: Access,
}

impl<K> Property<K> {
    pub const fn new(name: &'static str, key: K, access: Access) -> Self {
        Self { name, key, access }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// Value was rejected or could not be formatted.
    Invalid,
    /// Value could not be persisted.
    Storage,
}

/// Something that exposes its state as properties keyed by `K`.
pub trait Properties<K> {
    fn get(&mut self, key: K, out: &mut Value) -> Result<(), PropertyError>;

    fn set(&mut self, key: K, value: f32) -> Result<(), PropertyError>;
}

/// Answer a request against `table`. Names are matched case-insensitively.
pub fn dispatch<K, T>(target: &mut T, table: &[Property<K>], request: &Request) -> Reply
where
    K: Copy,
    T: Properties<K>,
{
    let Some(property) = table
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(request.name.as_str()))
    else {
        return Reply::Unknown;
    };

    match &request.payload {
        Some(payload) if property.access.writable() => match parse_number(payload) {
            Some(value) => match target.set(property.key, value) {
                Ok(()) => Reply::Ok,
                Err(_) => Reply::Error,
            },
            None => Reply::Error,
        },
        None if property.access.readable() => {
            let mut out = Value::new();
            match target.get(property.key, &mut out) {
                Ok(()) => Reply::Value(out),
                Err(_) => Reply::Error,
            }
        }
        _ => Reply::Denied,
    }
}

/// Parse a decimal number. Rejects empty input, trailing garbage, NaN, infinities and values
/// that overflow `f32`.
pub fn parse_number(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Format `value` with a fixed number of decimals.
pub fn write_number(out: &mut Value, value: f32, decimals: usize) -> Result<(), PropertyError> {
    write!(out, "{:.*}", decimals, value).map_err(|_| PropertyError::Invalid)
}
