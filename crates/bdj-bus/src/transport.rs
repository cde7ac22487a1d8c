//! Wire-level framing: a `u32` big-endian length prefix around a
//! header-plus-args payload built by `bdj-proto`.

use bdj_proto::frame::{decode_header, encode_header, FrameError, Header, HEADER_LEN};
use bdj_proto::{MessageCode, Route};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("frame of {0} bytes exceeds the {1} byte limit")]
    TooLarge(usize, usize),
}

/// Matches the upstream `BDJMSG_MAX` bound enforced on the wire.
pub const MAX_FRAME_LEN: usize = bdj_proto::MAX_FRAME_LEN;

/// Write one message: length prefix, header, then args (if any).
pub async fn write_message<W: AsyncWrite + Unpin>(
    w: &mut W,
    route_from: Route,
    route_to: Route,
    code: MessageCode,
    args: Option<&[u8]>,
) -> Result<(), TransportError> {
    let (header_buf, header_len) = encode_header(route_from, route_to, code, args.is_some());
    let args_len = args.map_or(0, |a| a.len());
    let total = header_len + args_len;
    if total > MAX_FRAME_LEN {
        return Err(TransportError::TooLarge(total, MAX_FRAME_LEN));
    }

    w.write_u32(total as u32).await?;
    w.write_all(&header_buf[..header_len]).await?;
    if let Some(args) = args {
        w.write_all(args).await?;
    }
    w.flush().await?;
    Ok(())
}

/// Read one message: length prefix, then exactly that many bytes, split
/// into a decoded header and the raw args tail.
pub async fn read_message<R: AsyncRead + Unpin>(r: &mut R) -> Result<(Header, Vec<u8>), TransportError> {
    let len = r.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::TooLarge(len, MAX_FRAME_LEN));
    }
    if len < HEADER_LEN {
        return Err(TransportError::Frame(FrameError::Truncated(len)));
    }

    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).await?;

    let (header, rest) = decode_header(&buf)?;
    Ok((header, rest.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdj_proto::ArgsBuilder;

    #[tokio::test]
    async fn round_trips_a_message_without_args() {
        let mut buf = Vec::new();
        write_message(&mut buf, Route::Player, Route::Main, MessageCode::Handshake, None)
            .await
            .unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let (header, rest) = read_message(&mut cursor).await.unwrap();
        assert_eq!(header.route_from, Route::Player);
        assert_eq!(header.route_to, Route::Main);
        assert_eq!(header.code, MessageCode::Handshake);
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn round_trips_a_message_with_args() {
        let args = ArgsBuilder::new().field("dbidx=0").finish();
        let mut buf = Vec::new();
        write_message(&mut buf, Route::ConfigUi, Route::Main, MessageCode::PlayRepeat, Some(&args))
            .await
            .unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let (header, rest) = read_message(&mut cursor).await.unwrap();
        assert_eq!(header.code, MessageCode::PlayRepeat);
        assert_eq!(rest, args);
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let args = vec![0u8; MAX_FRAME_LEN + 1];
        let mut buf = Vec::new();
        let err = write_message(&mut buf, Route::Player, Route::Main, MessageCode::Handshake, Some(&args))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::TooLarge(_, _)));
    }
}
