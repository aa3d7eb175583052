// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / message definitions for hardware signer transaction construction
//!
//! This module provides the wire message catalogue used between an untrusted host
//! and a hardware signer while co-constructing a transaction. Message payloads are
//! protobuf encoded (via `prost`) and carried in typed, length-prefixed frames
//! (see [frame]).
//!
//! The signer drives the exchange: after the host opens a session with [tx::SignTx]
//! the signer issues [tx::TxRequest] messages, which are classified into typed
//! [request::ProtocolRequest] values for the host to answer.
//!
//! Transaction ids are carried on the wire in little-endian byte order and held
//! in display (big-endian) order everywhere else, see [TxId].

use num_enum::TryFromPrimitive;
use strum::Display;

pub mod auth;
pub mod common;
pub mod frame;
pub mod message;
pub mod request;
pub mod tx;

mod txid;
pub use txid::TxId;

pub use message::{DeviceMessage, HostMessage};
pub use request::{Envelope, ProtocolRequest, SignatureEntry};

/// Wire message type identifiers
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, TryFromPrimitive)]
#[repr(u16)]
pub enum MessageType {
    /// Generic success response
    Success = 2,

    /// Generic failure response
    Failure = 3,

    /// Open a signing session
    SignTx = 15,

    /// Signer request for transaction data
    TxRequest = 21,

    /// Host acknowledgement carrying transaction data
    TxAck = 22,

    /// Signer is waiting for on-device confirmation
    ButtonRequest = 26,

    /// Host acknowledgement of a button request
    ButtonAck = 27,

    /// Host acknowledgement carrying a payment request
    TxAckPaymentRequest = 37,

    /// Request use of a previously authorized operation
    DoPreauthorized = 84,

    /// Signer accepts a preauthorized operation
    PreauthorizedRequest = 85,

    /// Request access to a restricted key path
    UnlockPath = 93,

    /// Signer grants access to a restricted key path
    UnlockedPathRequest = 94,
}

/// Protocol errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum ProtoError {
    /// Buffer too short for the requested operation
    #[error("invalid length")]
    InvalidLength,

    /// Frame did not start with the expected magic
    #[error("invalid frame magic")]
    InvalidMagic,

    /// Frame payload exceeds the configured maximum
    #[error("frame payload too large ({0} bytes)")]
    FrameTooLarge(usize),

    /// Transaction ids must be exactly 32 bytes
    #[error("invalid transaction id length ({0} bytes)")]
    InvalidTxId(usize),

    /// Transaction id is not valid hex
    #[error("invalid transaction id encoding")]
    InvalidTxIdEncoding,

    /// Request type value is not part of the catalogue
    #[error("unknown request type {0}")]
    UnknownRequestType(i32),

    /// Signature type value is not part of the catalogue
    #[error("unknown signature type {0}")]
    UnknownSignatureType(i32),

    /// A field required for this message / request kind is absent
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Protobuf decoding failed
    #[error("decode failed: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl From<encdec::Error> for ProtoError {
    fn from(_e: encdec::Error) -> Self {
        ProtoError::InvalidLength
    }
}
