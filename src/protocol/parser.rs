// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-wise parser for the tuning protocol.
//!
//! Bytes are fed one at a time as they arrive on the serial link. Whitespace other than the
//! delimiters is dropped. A line that does not fit keeps overwriting its final byte and is
//! reported as malformed once its delimiter arrives.

use heapless::Vec;

use crate::protocol::messages::*;

pub struct Parser {
    buffer: Vec<u8, PACKET_LENGTH>,
    complete: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            complete: false,
        }
    }

    /// Process a single incoming byte. Returns `Some` once a line is complete.
    pub fn push(&mut self, byte: u8) -> Option<Result<Request, Malformed>> {
        if self.complete {
            self.buffer.clear();
            self.complete = false;
        }

        if byte != PACKET_DELIMITER && byte != PAYLOAD_DELIMITER && byte.is_ascii_whitespace() {
            return None;
        }

        if self.buffer.is_full() {
            if let Some(last) = self.buffer.last_mut() {
                *last = byte;
            }
        } else {
            // Cannot fail, the buffer is not full.
            let _ = self.buffer.push(byte);
        }

        if byte != PACKET_DELIMITER {
            return None;
        }

        self.complete = true;
        Some(self.parse())
    }

    fn parse(&self) -> Result<Request, Malformed> {
        if self.buffer.len() >= PACKET_LENGTH {
            return Err(Malformed);
        }

        // Drop the delimiter.
        let line = &self.buffer[..self.buffer.len() - 1];
        if line.is_empty() || !line.is_ascii() {
            return Err(Malformed);
        }

        let mut parts = line.splitn(2, |&b| b == PAYLOAD_DELIMITER);
        let name = parts.next().unwrap_or(&[]);
        let payload = parts.next();

        if payload.is_some_and(|p| p.contains(&PAYLOAD_DELIMITER)) {
            return Err(Malformed);
        }

        Ok(Request {
            name: to_value(name)?,
            payload: payload.map(to_value).transpose()?,
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_value(bytes: &[u8]) -> Result<Value, Malformed> {
    let s = core::str::from_utf8(bytes).map_err(|_| Malformed)?;
    let mut value = Value::new();
    value.push_str(s).map_err(|_| Malformed)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut Parser, bytes: &[u8]) -> Option<Result<Request, Malformed>> {
        let mut last = None;
        for &b in bytes {
            if let Some(r) = parser.push(b) {
                last = Some(r);
            }
        }
        last
    }

    fn request(name: &str, payload: Option<&str>) -> Request {
        Request {
            name: to_value(name.as_bytes()).unwrap(),
            payload: payload.map(|p| to_value(p.as_bytes()).unwrap()),
        }
    }

    #[test]
    fn get_request() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"balance-pid.kp"), None);
        assert_eq!(p.push(b'\n'), Some(Ok(request("balance-pid.kp", None))));
    }

    #[test]
    fn set_request_ignores_whitespace() {
        let mut p = Parser::new();
        assert_eq!(
            feed(&mut p, b" velocity-pid.ki = 0.5\r\n"),
            Some(Ok(request("velocity-pid.ki", Some("0.5"))))
        );
    }

    #[test]
    fn empty_payload_is_a_set() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"s=\n"), Some(Ok(request("s", Some("")))));
    }

    #[test]
    fn two_payload_delimiters_are_malformed() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"x=20=200\n"), Some(Err(Malformed)));
    }

    #[test]
    fn empty_line_is_malformed() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"  \n"), Some(Err(Malformed)));
    }

    #[test]
    fn non_ascii_is_malformed() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, &[b'a', 0xC3, 0xA9, b'\n']), Some(Err(Malformed)));
    }

    #[test]
    fn overlong_line_is_malformed_and_parser_recovers() {
        let mut p = Parser::new();
        let long = [b'a'; 100];
        assert_eq!(feed(&mut p, &long), None);
        assert_eq!(p.push(b'\n'), Some(Err(Malformed)));

        assert_eq!(feed(&mut p, b"angle\n"), Some(Ok(request("angle", None))));
    }

    #[test]
    fn longest_accepted_line() {
        let mut p = Parser::new();
        let name = [b'n'; PACKET_LENGTH - 2];
        assert_eq!(feed(&mut p, &name), None);
        match p.push(b'\n') {
            Some(Ok(req)) => assert_eq!(req.name.len(), PACKET_LENGTH - 2),
            other => panic!("unexpected {:?}", other),
        }

        let name = [b'n'; PACKET_LENGTH - 1];
        assert_eq!(feed(&mut p, &name), None);
        assert_eq!(p.push(b'\n'), Some(Err(Malformed)));
    }

    #[test]
    fn consecutive_lines() {
        let mut p = Parser::new();
        assert_eq!(feed(&mut p, b"a\n"), Some(Ok(request("a", None))));
        assert_eq!(feed(&mut p, b"b=1\n"), Some(Ok(request("b", Some("1")))));
    }
}
