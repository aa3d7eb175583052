// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Host and signer message unions
//!
//! All transaction acknowledgements are encoded with the [MessageType::TxAck]
//! identifier, the signer disambiguates them by the request it has outstanding.
//! Messages flowing from the signer carry distinct identifiers and can be
//! decoded without further context via [DeviceMessage::decode].

use prost::Message;

use crate::{
    auth::{DoPreauthorized, PreauthorizedRequest, UnlockPath, UnlockedPathRequest},
    common::{ButtonAck, ButtonRequest, Failure, Success},
    tx::*,
    MessageType, ProtoError,
};

/// Messages sent by the host
#[derive(Clone, PartialEq, Debug)]
pub enum HostMessage {
    SignTx(SignTx),
    TxAckInput(TxAckInput),
    TxAckOutput(TxAckOutput),
    TxAckPrevMeta(TxAckPrevMeta),
    TxAckPrevInput(TxAckPrevInput),
    TxAckPrevOutput(TxAckPrevOutput),
    TxAckPrevExtraData(TxAckPrevExtraData),
    TxAckPaymentRequest(TxAckPaymentRequest),
    TxAckOrchardInput(TxAckOrchardInput),
    TxAckOrchardOutput(TxAckOrchardOutput),
    /// Empty acknowledgement for a [RequestType::NoOp] request
    TxAckNoOp(TxAck),
    ButtonAck(ButtonAck),
    DoPreauthorized(DoPreauthorized),
    UnlockPath(UnlockPath),
}

impl HostMessage {
    /// Fetch the wire message type
    pub fn message_type(&self) -> MessageType {
        use HostMessage::*;

        match self {
            SignTx(_) => MessageType::SignTx,
            TxAckInput(_) | TxAckOutput(_) | TxAckPrevMeta(_) | TxAckPrevInput(_)
            | TxAckPrevOutput(_) | TxAckPrevExtraData(_) | TxAckOrchardInput(_)
            | TxAckOrchardOutput(_) | TxAckNoOp(_) => MessageType::TxAck,
            TxAckPaymentRequest(_) => MessageType::TxAckPaymentRequest,
            ButtonAck(_) => MessageType::ButtonAck,
            DoPreauthorized(_) => MessageType::DoPreauthorized,
            UnlockPath(_) => MessageType::UnlockPath,
        }
    }

    /// Encode the protobuf payload (without frame header)
    pub fn encode_payload(&self) -> Vec<u8> {
        use HostMessage::*;

        match self {
            SignTx(m) => m.encode_to_vec(),
            TxAckInput(m) => m.encode_to_vec(),
            TxAckOutput(m) => m.encode_to_vec(),
            TxAckPrevMeta(m) => m.encode_to_vec(),
            TxAckPrevInput(m) => m.encode_to_vec(),
            TxAckPrevOutput(m) => m.encode_to_vec(),
            TxAckPrevExtraData(m) => m.encode_to_vec(),
            TxAckPaymentRequest(m) => m.encode_to_vec(),
            TxAckOrchardInput(m) => m.encode_to_vec(),
            TxAckOrchardOutput(m) => m.encode_to_vec(),
            TxAckNoOp(m) => m.encode_to_vec(),
            ButtonAck(m) => m.encode_to_vec(),
            DoPreauthorized(m) => m.encode_to_vec(),
            UnlockPath(m) => m.encode_to_vec(),
        }
    }
}

/// Messages sent by the signer
#[derive(Clone, PartialEq, Debug)]
pub enum DeviceMessage {
    TxRequest(TxRequest),
    Failure(Failure),
    Success(Success),
    ButtonRequest(ButtonRequest),
    PreauthorizedRequest(PreauthorizedRequest),
    UnlockedPathRequest(UnlockedPathRequest),
    /// Message with an identifier outside the signing catalogue
    Unknown { msg_type: u16, payload: Vec<u8> },
}

impl DeviceMessage {
    /// Decode a signer message from its wire type and payload
    pub fn decode(msg_type: u16, payload: &[u8]) -> Result<Self, ProtoError> {
        let t = match MessageType::try_from(msg_type) {
            Ok(v) => v,
            Err(_) => {
                return Ok(Self::Unknown {
                    msg_type,
                    payload: payload.to_vec(),
                })
            }
        };

        let m = match t {
            MessageType::TxRequest => Self::TxRequest(TxRequest::decode(payload)?),
            MessageType::Failure => Self::Failure(Failure::decode(payload)?),
            MessageType::Success => Self::Success(Success::decode(payload)?),
            MessageType::ButtonRequest => Self::ButtonRequest(ButtonRequest::decode(payload)?),
            MessageType::PreauthorizedRequest => {
                Self::PreauthorizedRequest(PreauthorizedRequest::decode(payload)?)
            }
            MessageType::UnlockedPathRequest => {
                Self::UnlockedPathRequest(UnlockedPathRequest::decode(payload)?)
            }
            _ => Self::Unknown {
                msg_type,
                payload: payload.to_vec(),
            },
        };

        Ok(m)
    }

    /// Fetch the wire message type identifier
    pub fn message_type(&self) -> u16 {
        match self {
            DeviceMessage::TxRequest(_) => MessageType::TxRequest as u16,
            DeviceMessage::Failure(_) => MessageType::Failure as u16,
            DeviceMessage::Success(_) => MessageType::Success as u16,
            DeviceMessage::ButtonRequest(_) => MessageType::ButtonRequest as u16,
            DeviceMessage::PreauthorizedRequest(_) => MessageType::PreauthorizedRequest as u16,
            DeviceMessage::UnlockedPathRequest(_) => MessageType::UnlockedPathRequest as u16,
            DeviceMessage::Unknown { msg_type, .. } => *msg_type,
        }
    }

    /// Encode the protobuf payload (without frame header)
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            DeviceMessage::TxRequest(m) => m.encode_to_vec(),
            DeviceMessage::Failure(m) => m.encode_to_vec(),
            DeviceMessage::Success(m) => m.encode_to_vec(),
            DeviceMessage::ButtonRequest(m) => m.encode_to_vec(),
            DeviceMessage::PreauthorizedRequest(m) => m.encode_to_vec(),
            DeviceMessage::UnlockedPathRequest(m) => m.encode_to_vec(),
            DeviceMessage::Unknown { payload, .. } => payload.clone(),
        }
    }
}

impl From<TxRequest> for DeviceMessage {
    fn from(r: TxRequest) -> Self {
        Self::TxRequest(r)
    }
}

impl From<Failure> for DeviceMessage {
    fn from(f: Failure) -> Self {
        Self::Failure(f)
    }
}
