// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Typed signer requests
//!
//! Raw [TxRequest] messages are classified into a closed [ProtocolRequest]
//! union plus an [Envelope] carrying any signature or serialized chunk
//! streamed with the request. Classification checks every field the request
//! kind requires, so a handler receiving a [ProtocolRequest] never has to
//! deal with absent indices or malformed transaction ids.

use crate::{
    tx::{RequestType, SignatureType, TxRequest, TxRequestDetails, TxRequestSerialized},
    ProtoError, TxId,
};

/// Typed signer request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProtocolRequest {
    /// Input `index` of the transaction being signed, or of `origin`
    TxInput { index: u32, origin: Option<TxId> },
    /// Output `index` of the transaction being signed, or of `origin`
    TxOutput { index: u32, origin: Option<TxId> },
    /// Metadata of the previous transaction `origin`
    TxMeta { origin: TxId },
    /// Slice of the extra data of the transaction being signed, or of `origin`
    TxExtraData {
        origin: Option<TxId>,
        offset: u32,
        len: u32,
    },
    /// Input `index` of the original (replaced) transaction `origin`
    TxOrigInput { index: u32, origin: TxId },
    /// Output `index` of the original (replaced) transaction `origin`
    TxOrigOutput { index: u32, origin: TxId },
    /// Payment request `index`
    TxPaymentReq { index: u32 },
    /// Orchard input `index`
    TxOrchardInput { index: u32 },
    /// Orchard output `index`
    TxOrchardOutput { index: u32 },
    /// Signer requires a round-trip with no payload
    NoOp,
    /// Terminal request, signing complete
    TxFinished,
}

impl ProtocolRequest {
    /// Fetch the wire request kind
    pub fn kind(&self) -> RequestType {
        match self {
            ProtocolRequest::TxInput { .. } => RequestType::Txinput,
            ProtocolRequest::TxOutput { .. } => RequestType::Txoutput,
            ProtocolRequest::TxMeta { .. } => RequestType::Txmeta,
            ProtocolRequest::TxExtraData { .. } => RequestType::Txextradata,
            ProtocolRequest::TxOrigInput { .. } => RequestType::Txoriginput,
            ProtocolRequest::TxOrigOutput { .. } => RequestType::Txorigoutput,
            ProtocolRequest::TxPaymentReq { .. } => RequestType::Txpaymentreq,
            ProtocolRequest::TxOrchardInput { .. } => RequestType::Txorchardinput,
            ProtocolRequest::TxOrchardOutput { .. } => RequestType::Txorchardoutput,
            ProtocolRequest::NoOp => RequestType::NoOp,
            ProtocolRequest::TxFinished => RequestType::Txfinished,
        }
    }

    /// Fetch the referenced transaction, if any
    pub fn origin(&self) -> Option<TxId> {
        match self {
            ProtocolRequest::TxInput { origin, .. }
            | ProtocolRequest::TxOutput { origin, .. }
            | ProtocolRequest::TxExtraData { origin, .. } => *origin,
            ProtocolRequest::TxMeta { origin }
            | ProtocolRequest::TxOrigInput { origin, .. }
            | ProtocolRequest::TxOrigOutput { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// Build the wire request for this kind with the provided envelope
    pub fn to_tx_request(&self, envelope: &Envelope) -> TxRequest {
        let mut d = TxRequestDetails::default();

        match *self {
            ProtocolRequest::TxInput { index, origin }
            | ProtocolRequest::TxOutput { index, origin } => {
                d.request_index = Some(index);
                d.tx_hash = origin.map(|o| o.to_wire());
            }
            ProtocolRequest::TxMeta { origin } => {
                d.tx_hash = Some(origin.to_wire());
            }
            ProtocolRequest::TxExtraData {
                origin,
                offset,
                len,
            } => {
                d.tx_hash = origin.map(|o| o.to_wire());
                d.extra_data_offset = Some(offset);
                d.extra_data_len = Some(len);
            }
            ProtocolRequest::TxOrigInput { index, origin }
            | ProtocolRequest::TxOrigOutput { index, origin } => {
                d.request_index = Some(index);
                d.tx_hash = Some(origin.to_wire());
            }
            ProtocolRequest::TxPaymentReq { index }
            | ProtocolRequest::TxOrchardInput { index }
            | ProtocolRequest::TxOrchardOutput { index } => {
                d.request_index = Some(index);
            }
            ProtocolRequest::NoOp | ProtocolRequest::TxFinished => (),
        }

        let details = match d == TxRequestDetails::default() {
            true => None,
            false => Some(d),
        };

        TxRequest {
            request_type: Some(self.kind() as i32),
            details,
            serialized: envelope.to_serialized(),
        }
    }
}

/// Signature streamed with a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEntry {
    /// Transparent input signature or Orchard spend authorization
    pub kind: SignatureType,
    /// Input (or Orchard action) index
    pub index: u32,
    /// Signature bytes, held verbatim
    pub signature: Vec<u8>,
}

/// Signature and serialized transaction data carried with a request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    pub signature: Option<SignatureEntry>,
    pub serialized: Option<Vec<u8>>,
}

impl Envelope {
    /// Check whether the envelope carries nothing
    pub fn is_empty(&self) -> bool {
        self.signature.is_none() && self.serialized.is_none()
    }

    fn from_serialized(s: &TxRequestSerialized) -> Result<Self, ProtoError> {
        let signature = match (s.signature_index, &s.signature) {
            (Some(index), Some(sig)) => {
                let kind = match s.signature_type {
                    None => SignatureType::Transparent,
                    Some(v) => {
                        SignatureType::from_i32(v).ok_or(ProtoError::UnknownSignatureType(v))?
                    }
                };

                Some(SignatureEntry {
                    kind,
                    index,
                    signature: sig.clone(),
                })
            }
            (None, None) => None,
            (Some(_), None) => return Err(ProtoError::MissingField("signature")),
            (None, Some(_)) => return Err(ProtoError::MissingField("signature_index")),
        };

        let serialized = s.serialized_tx.as_ref().filter(|b| !b.is_empty()).cloned();

        Ok(Self {
            signature,
            serialized,
        })
    }

    fn to_serialized(&self) -> Option<TxRequestSerialized> {
        if self.is_empty() {
            return None;
        }

        let mut s = TxRequestSerialized {
            serialized_tx: self.serialized.clone(),
            ..Default::default()
        };

        if let Some(e) = &self.signature {
            s.signature_index = Some(e.index);
            s.signature = Some(e.signature.clone());
            if e.kind != SignatureType::Transparent {
                s.signature_type = Some(e.kind as i32);
            }
        }

        Some(s)
    }
}

impl TxRequest {
    /// Classify a raw signer request, returning the typed request and the
    /// envelope streamed with it
    pub fn parse(&self) -> Result<(ProtocolRequest, Envelope), ProtoError> {
        let envelope = match &self.serialized {
            Some(s) => Envelope::from_serialized(s)?,
            None => Envelope::default(),
        };

        let kind_raw = self
            .request_type
            .ok_or(ProtoError::MissingField("request_type"))?;
        let kind =
            RequestType::from_i32(kind_raw).ok_or(ProtoError::UnknownRequestType(kind_raw))?;

        let details = self.details.clone().unwrap_or_default();

        let origin = match &details.tx_hash {
            Some(h) => Some(TxId::from_wire(h)?),
            None => None,
        };
        let index = || details.request_index.ok_or(ProtoError::MissingField("request_index"));
        let origin_req = || origin.ok_or(ProtoError::MissingField("tx_hash"));

        let r = match kind {
            RequestType::Txinput => ProtocolRequest::TxInput {
                index: index()?,
                origin,
            },
            RequestType::Txoutput => ProtocolRequest::TxOutput {
                index: index()?,
                origin,
            },
            RequestType::Txmeta => ProtocolRequest::TxMeta {
                origin: origin_req()?,
            },
            RequestType::Txextradata => ProtocolRequest::TxExtraData {
                origin,
                offset: details
                    .extra_data_offset
                    .ok_or(ProtoError::MissingField("extra_data_offset"))?,
                len: details
                    .extra_data_len
                    .ok_or(ProtoError::MissingField("extra_data_len"))?,
            },
            RequestType::Txoriginput => ProtocolRequest::TxOrigInput {
                index: index()?,
                origin: origin_req()?,
            },
            RequestType::Txorigoutput => ProtocolRequest::TxOrigOutput {
                index: index()?,
                origin: origin_req()?,
            },
            RequestType::Txpaymentreq => ProtocolRequest::TxPaymentReq { index: index()? },
            RequestType::Txorchardinput => ProtocolRequest::TxOrchardInput { index: index()? },
            RequestType::Txorchardoutput => ProtocolRequest::TxOrchardOutput { index: index()? },
            RequestType::NoOp => ProtocolRequest::NoOp,
            RequestType::Txfinished => ProtocolRequest::TxFinished,
        };

        Ok((r, envelope))
    }
}
