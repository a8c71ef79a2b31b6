// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod messages;
pub mod parser;
pub mod properties;

pub use messages::{Malformed, Reply, Request, Value};
pub use parser::Parser;
pub use properties::{dispatch, Access, Properties, Property, PropertyError};
