// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Common messages shared across signer operations

/// Generic success response
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Success {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

/// Generic failure response, terminates the current operation
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Failure {
    /// Failure category
    #[prost(enumeration = "FailureType", optional, tag = "1")]
    pub code: Option<i32>,
    /// Human readable failure description
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

impl Failure {
    /// Create a failure with the provided category and message
    pub fn new(code: FailureType, message: &str) -> Self {
        Self {
            code: Some(code as i32),
            message: Some(message.to_string()),
        }
    }

    /// Fetch the failure category, unknown values map to [FailureType::FirmwareError]
    pub fn failure_type(&self) -> FailureType {
        self.code
            .and_then(FailureType::from_i32)
            .unwrap_or(FailureType::FirmwareError)
    }
}

/// Failure categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration, strum::Display)]
#[repr(i32)]
pub enum FailureType {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    PinMismatch = 12,
    WipeCodeMismatch = 13,
    InvalidSession = 14,
    FirmwareError = 99,
}

/// Signer is waiting for on-device user confirmation
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ButtonRequest {
    #[prost(uint32, optional, tag = "1")]
    pub code: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub pages: Option<u32>,
}

/// Host acknowledgement of a [ButtonRequest]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ButtonAck {}

/// BIP-32 node in deserialized form
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HdNodeType {
    #[prost(uint32, required, tag = "1")]
    pub depth: u32,
    #[prost(uint32, required, tag = "2")]
    pub fingerprint: u32,
    #[prost(uint32, required, tag = "3")]
    pub child_num: u32,
    #[prost(bytes = "vec", required, tag = "4")]
    pub chain_code: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub private_key: Option<Vec<u8>>,
    #[prost(bytes = "vec", required, tag = "6")]
    pub public_key: Vec<u8>,
}
