// Copyright (c) 2022-2023 The MobileCoin Foundation

use hwtx_proto::{common::FailureType, tx::RequestType, ProtoError, TxId};
use tokio::time::error::Elapsed;

/// Signing session error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transaction is not cached or not trusted for this session
    #[error("Unknown transaction {0}")]
    UnknownTransaction(TxId),

    /// Extra data request exceeds the stored blob
    #[error("Extra data out of range (offset: {offset}, len: {len}, available: {available})")]
    OutOfRange {
        offset: u32,
        len: u32,
        available: usize,
    },

    /// Requested input / output / record does not exist
    #[error("{kind} index {index} out of range")]
    IndexOutOfRange { kind: RequestType, index: u32 },

    /// Payment request not provided in the plan
    #[error("Missing payment request {0}")]
    MissingPaymentRequest(u32),

    /// Signer returned a second signature for the same index
    #[error("Duplicate signature for index {0}")]
    DuplicateSignature(u32),

    /// Session finished without signatures for all required inputs
    #[error("Some signatures are missing (inputs: {missing:?})")]
    IncompleteSignatureSet { missing: Vec<u32> },

    /// Transaction id of invalid length
    #[error("Invalid transaction id ({0} bytes)")]
    InvalidTxId(usize),

    /// Cached transaction does not hash to its key
    #[error("Transaction id mismatch (expected: {expected}, actual: {actual})")]
    TxIdMismatch { expected: TxId, actual: TxId },

    /// Transaction plan failed validation
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Signer responded with a message outside the signing flow
    #[error("Unexpected message (type: {0})")]
    UnexpectedMessage(u16),

    /// Signer request breaks the protocol
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Request not valid in the current session phase
    #[error("{0} request out of phase")]
    OutOfPhase(RequestType),

    /// Request kind unsupported by the coin profile
    #[error("{kind} unsupported for coin {coin}")]
    UnsupportedRequestKind { kind: RequestType, coin: String },

    /// Malformed signer message
    #[error("Decode failed: {0}")]
    Decode(ProtoError),

    /// Signer reported a failure
    #[error("Signer failure ({code}): {message}")]
    Remote { code: FailureType, message: String },

    /// Transport error
    #[error("Transport error {0}")]
    Transport(anyhow::Error),

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// User did not confirm the operation in time
    #[error("Timeout waiting for user confirmation")]
    UserTimeout,
}

/// Coarse error classification
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum ErrorClass {
    /// Host-side data is missing or inconsistent
    DataIntegrity,
    /// Signer deviated from the protocol
    ProtocolShape,
    /// Signer rejected the operation
    Remote,
    /// Communication with the signer failed
    Transport,
}

impl Error {
    /// Classify the error
    pub fn class(&self) -> ErrorClass {
        use Error::*;

        match self {
            UnknownTransaction(_)
            | OutOfRange { .. }
            | IndexOutOfRange { .. }
            | MissingPaymentRequest(_)
            | DuplicateSignature(_)
            | IncompleteSignatureSet { .. }
            | InvalidTxId(_)
            | TxIdMismatch { .. }
            | InvalidPlan(_) => ErrorClass::DataIntegrity,
            UnexpectedMessage(_)
            | ProtocolViolation(_)
            | OutOfPhase(_)
            | UnsupportedRequestKind { .. }
            | Decode(_) => ErrorClass::ProtocolShape,
            Remote { .. } => ErrorClass::Remote,
            Transport(_) | RequestTimeout | UserTimeout => ErrorClass::Transport,
        }
    }
}

impl From<ProtoError> for Error {
    fn from(e: ProtoError) -> Self {
        match e {
            ProtoError::InvalidTxId(n) => Error::InvalidTxId(n),
            _ => Error::Decode(e),
        }
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}
