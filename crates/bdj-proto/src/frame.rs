//! The fixed textual header: three zero-padded 4-digit decimal numerics
//! separated by `~`, NUL-terminated: `RRRR~rrrr~mmmm~\0` (15 bytes).
//!
//! Encoding writes the header only; if the caller supplies args the
//! trailing NUL is dropped from the returned length so the args
//! concatenate directly onto the header (the args themselves must carry
//! their own terminating NUL so the combined buffer stays parseable).
//! Decoding never scans for `~` — each field sits at a fixed offset, four
//! digits plus one separator byte, exactly as the upstream parser does.

use crate::message::{MessageCode, MessageRangeError};
use crate::route::{Route, RouteRangeError};

/// Header length including the trailing NUL: three `NNNN~` groups plus NUL.
pub const HEADER_LEN: usize = 15;

const FIELD_LEN: usize = 5; // 4 digits + separator

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("header too short: got {0} bytes, need at least {HEADER_LEN}")]
    Truncated(usize),
    #[error("header field {field} is not 4 ascii digits")]
    BadField { field: &'static str },
    #[error(transparent)]
    Route(#[from] RouteRangeError),
    #[error(transparent)]
    Message(#[from] MessageRangeError),
}

/// A decoded header plus a borrowed view of the remaining args bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub route_from: Route,
    pub route_to: Route,
    pub code: MessageCode,
}

/// Encode a header into `out`, returning the number of bytes written.
///
/// When `has_args` is true, the trailing NUL is omitted from the returned
/// length (but still physically present in `out`) so the caller's args
/// buffer can be appended directly after the prefix.
pub fn encode_header(route_from: Route, route_to: Route, code: MessageCode, has_args: bool) -> ([u8; HEADER_LEN], usize) {
    let mut out = [0u8; HEADER_LEN];
    write_field(&mut out[0..FIELD_LEN], route_from as u16);
    write_field(&mut out[FIELD_LEN..FIELD_LEN * 2], route_to as u16);
    write_field(&mut out[FIELD_LEN * 2..FIELD_LEN * 3], code as u16);
    out[HEADER_LEN - 1] = 0;
    let len = if has_args { HEADER_LEN - 1 } else { HEADER_LEN };
    (out, len)
}

fn write_field(slot: &mut [u8], value: u16) {
    let text = format!("{value:04}~");
    slot.copy_from_slice(text.as_bytes());
}

/// Decode a header from the front of `buf`, returning the header and the
/// remaining bytes (the args region, NUL-terminated or empty).
pub fn decode_header(buf: &[u8]) -> Result<(Header, &[u8]), FrameError> {
    if buf.len() < HEADER_LEN {
        return Err(FrameError::Truncated(buf.len()));
    }
    let route_from = read_field(&buf[0..FIELD_LEN], "route_from")?;
    let route_to = read_field(&buf[FIELD_LEN..FIELD_LEN * 2], "route_to")?;
    let code = read_field(&buf[FIELD_LEN * 2..FIELD_LEN * 3], "code")?;

    let header = Header {
        route_from: Route::try_from(route_from)?,
        route_to: Route::try_from(route_to)?,
        code: MessageCode::try_from(code)?,
    };
    Ok((header, &buf[HEADER_LEN..]))
}

fn read_field(slot: &[u8], field: &'static str) -> Result<u16, FrameError> {
    if slot.len() != FIELD_LEN || slot[4] != b'~' {
        return Err(FrameError::BadField { field });
    }
    std::str::from_utf8(&slot[0..4])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(FrameError::BadField { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_the_scenario_from_the_interop_doc() {
        let (buf, len) = encode_header(Route::ConfigUi, Route::Main, MessageCode::PlayRepeat, false);
        assert_eq!(&buf[..len], b"0003~0006~0042~\0");
    }

    #[test]
    fn round_trip_without_args() {
        let (buf, len) = encode_header(Route::Player, Route::Main, MessageCode::Handshake, false);
        let (header, rest) = decode_header(&buf[..len]).unwrap();
        assert_eq!(header.route_from, Route::Player);
        assert_eq!(header.route_to, Route::Main);
        assert_eq!(header.code, MessageCode::Handshake);
        assert!(rest.is_empty());
    }

    #[test]
    fn round_trip_with_args_drops_header_nul() {
        let (buf, len) = encode_header(Route::ConfigUi, Route::Main, MessageCode::PlayRepeat, true);
        assert_eq!(len, HEADER_LEN - 1);
        let mut frame = buf[..len].to_vec();
        frame.extend_from_slice(b"hello\0");
        assert_eq!(frame.len(), 20);

        let (header, rest) = decode_header(&frame).unwrap();
        assert_eq!(header.route_from, Route::ConfigUi);
        assert_eq!(header.code, MessageCode::PlayRepeat);
        assert_eq!(rest, b"hello\0");
    }

    #[test]
    fn truncated_header_is_an_error() {
        let err = decode_header(b"0003~0006~").unwrap_err();
        assert!(matches!(err, FrameError::Truncated(_)));
    }

    #[test]
    fn non_digit_field_is_an_error() {
        let err = decode_header(b"abcd~0006~0042~\0").unwrap_err();
        assert!(matches!(err, FrameError::BadField { .. }));
    }
}
