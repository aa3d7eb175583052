// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Message framing for stream transports
//!
//! Each message is prefixed with a fixed header carrying the message type and
//! payload length, followed by the protobuf-encoded payload.
//!
//! ## Encoding:
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      '#'      |      '#'      |          MESSAGE_TYPE         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          PAYLOAD_LEN                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                     PAYLOAD (PAYLOAD_LEN)                     /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Header fields are big-endian.

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};

use crate::ProtoError;

/// Frame start marker
pub const FRAME_MAGIC: [u8; 2] = *b"##";

/// Encoded header length
pub const HEADER_LEN: usize = 8;

/// Maximum accepted payload length
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// Frame header
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FrameHeader {
    /// Message type identifier, see [MessageType][crate::MessageType]
    pub msg_type: u16,
    /// Payload length in bytes
    pub len: u32,
}

impl FrameHeader {
    /// Create a new frame header
    pub fn new(msg_type: u16, len: usize) -> Result<Self, ProtoError> {
        if len > MAX_PAYLOAD_LEN {
            return Err(ProtoError::FrameTooLarge(len));
        }

        Ok(Self {
            msg_type,
            len: len as u32,
        })
    }
}

impl Encode for FrameHeader {
    type Error = ProtoError;

    fn encode_len(&self) -> Result<usize, ProtoError> {
        Ok(HEADER_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ProtoError> {
        if buff.len() < HEADER_LEN {
            return Err(ProtoError::InvalidLength);
        }

        buff[..2].copy_from_slice(&FRAME_MAGIC);
        BigEndian::write_u16(&mut buff[2..4], self.msg_type);
        BigEndian::write_u32(&mut buff[4..8], self.len);

        Ok(HEADER_LEN)
    }
}

impl DecodeOwned for FrameHeader {
    type Output = Self;

    type Error = ProtoError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ProtoError> {
        if buff.len() < HEADER_LEN {
            return Err(ProtoError::InvalidLength);
        }

        if buff[..2] != FRAME_MAGIC {
            return Err(ProtoError::InvalidMagic);
        }

        let msg_type = BigEndian::read_u16(&buff[2..4]);
        let len = BigEndian::read_u32(&buff[4..8]);

        if len as usize > MAX_PAYLOAD_LEN {
            return Err(ProtoError::FrameTooLarge(len as usize));
        }

        Ok((Self { msg_type, len }, HEADER_LEN))
    }
}

/// Encode a complete frame (header and payload)
pub fn encode_frame(msg_type: u16, payload: &[u8]) -> Result<Vec<u8>, ProtoError> {
    let h = FrameHeader::new(msg_type, payload.len())?;

    let mut buff = vec![0u8; HEADER_LEN + payload.len()];
    let n = h.encode(&mut buff)?;
    buff[n..].copy_from_slice(payload);

    Ok(buff)
}
