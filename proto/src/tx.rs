// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing messages
//!
//! The host opens a session with [SignTx], the signer then issues [TxRequest]s
//! until [RequestType::Txfinished]. Each request is answered with one of the
//! `TxAck*` messages, all of which are wire-aliases of the legacy [TxAck]
//! (sharing [MessageType::TxAck][crate::MessageType::TxAck]) except
//! [TxAckPaymentRequest].

use crate::common::HdNodeType;

/// Open a signing session
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignTx {
    /// Number of transaction outputs
    #[prost(uint32, required, tag = "1")]
    pub outputs_count: u32,
    /// Number of transaction inputs
    #[prost(uint32, required, tag = "2")]
    pub inputs_count: u32,
    /// Coin to use
    #[prost(string, optional, tag = "3", default = "Bitcoin")]
    pub coin_name: Option<String>,
    /// Transaction version (packed with the special transaction type for Dash)
    #[prost(uint32, optional, tag = "4", default = "1")]
    pub version: Option<u32>,
    /// Transaction lock_time
    #[prost(uint32, optional, tag = "5", default = "0")]
    pub lock_time: Option<u32>,
    /// Decred and Zcash only
    #[prost(uint32, optional, tag = "6")]
    pub expiry: Option<u32>,
    /// Zcash only, derivable from `version`
    #[prost(bool, optional, tag = "7")]
    pub overwintered: Option<bool>,
    /// Zcash only, nVersionGroupId
    #[prost(uint32, optional, tag = "8")]
    pub version_group_id: Option<u32>,
    /// Peercoin only
    #[prost(uint32, optional, tag = "9")]
    pub timestamp: Option<u32>,
    /// Zcash only, BRANCH_ID
    #[prost(uint32, optional, tag = "10")]
    pub branch_id: Option<u32>,
    /// Decred only, signing a ticket purchase
    #[prost(bool, optional, tag = "12")]
    pub decred_staking_ticket: Option<bool>,
    /// Coinjoin round parameters signed by the coordinator
    #[prost(message, optional, tag = "14")]
    pub coinjoin_request: Option<CoinJoinRequest>,
    /// Zcash only, number of Orchard inputs
    #[prost(uint32, optional, tag = "20")]
    pub orchard_inputs_count: Option<u32>,
    /// Zcash only, number of Orchard outputs
    #[prost(uint32, optional, tag = "21")]
    pub orchard_outputs_count: Option<u32>,
    /// Zcash only, Orchard note commitment tree anchor
    #[prost(bytes = "vec", optional, tag = "22")]
    pub orchard_anchor: Option<Vec<u8>>,
    /// Zcash only, ZIP-32 account path for Orchard keys
    #[prost(uint32, repeated, packed = "false", tag = "23")]
    pub z_address_n: Vec<u32>,
    /// Length of extra data appended to the transaction being signed
    #[prost(uint32, optional, tag = "24")]
    pub extra_data_len: Option<u32>,
}

/// Coinjoin round parameters
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CoinJoinRequest {
    /// Coordination fee rate in units of 10^-6 percent
    #[prost(uint32, required, tag = "1")]
    pub fee_rate: u32,
    /// PlebsDontPayThreshold in Wasabi
    #[prost(uint64, required, tag = "2")]
    pub no_fee_threshold: u64,
    /// Minimum registrable output amount
    #[prost(uint64, required, tag = "3")]
    pub min_registrable_amount: u64,
    /// Public key used for masking coinjoin flags
    #[prost(bytes = "vec", required, tag = "4")]
    pub mask_public_key: Vec<u8>,
    /// Coordinator signature over the request
    #[prost(bytes = "vec", required, tag = "5")]
    pub signature: Vec<u8>,
}

/// Signer request for transaction data, optionally carrying serialized output
/// from the previous step
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequest {
    /// Kind of data requested
    #[prost(enumeration = "RequestType", optional, tag = "1")]
    pub request_type: Option<i32>,
    /// Request details
    #[prost(message, optional, tag = "2")]
    pub details: Option<TxRequestDetails>,
    /// Serialized data and signatures from the previous step
    #[prost(message, optional, tag = "3")]
    pub serialized: Option<TxRequestSerialized>,
}

/// Request details
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequestDetails {
    /// Index of the requested input / output / record
    #[prost(uint32, optional, tag = "1")]
    pub request_index: Option<u32>,
    /// Id of the referenced transaction (wire order), absent for the
    /// transaction being signed
    #[prost(bytes = "vec", optional, tag = "2")]
    pub tx_hash: Option<Vec<u8>>,
    /// Length of requested extra data
    #[prost(uint32, optional, tag = "3")]
    pub extra_data_len: Option<u32>,
    /// Offset of requested extra data
    #[prost(uint32, optional, tag = "4")]
    pub extra_data_offset: Option<u32>,
}

/// Serialized data and signatures streamed back to the host
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRequestSerialized {
    /// `signature` field contains the signature for this index
    #[prost(uint32, optional, tag = "1")]
    pub signature_index: Option<u32>,
    /// Signature of the `signature_index` input / action
    #[prost(bytes = "vec", optional, tag = "2")]
    pub signature: Option<Vec<u8>>,
    /// Part of the serialized, signed transaction
    #[prost(bytes = "vec", optional, tag = "3")]
    pub serialized_tx: Option<Vec<u8>>,
    /// Kind of signature carried, transparent where absent
    #[prost(enumeration = "SignatureType", optional, tag = "4")]
    pub signature_type: Option<i32>,
}

/// Kind of data requested by the signer
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, strum::Display,
)]
#[repr(i32)]
pub enum RequestType {
    Txinput = 0,
    Txoutput = 1,
    Txmeta = 2,
    Txfinished = 3,
    Txextradata = 4,
    Txoriginput = 5,
    Txorigoutput = 6,
    Txpaymentreq = 7,
    Txorchardinput = 8,
    Txorchardoutput = 9,
    NoOp = 10,
}

/// Kind of signature streamed in [TxRequestSerialized]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration, strum::Display)]
#[repr(i32)]
pub enum SignatureType {
    /// Signature for a transparent input
    Transparent = 0,
    /// Orchard spend authorization signature, indexed by action
    OrchardSpendAuth = 1,
}

/// Template of input script
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    ::prost::Enumeration,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum InputScriptType {
    /// Standard P2PKH address
    Spendaddress = 0,
    /// P2SH multisig address
    Spendmultisig = 1,
    /// Input owned by another party, signed externally
    External = 2,
    /// Native SegWit
    Spendwitness = 3,
    /// SegWit over P2SH
    Spendp2shwitness = 4,
    /// Taproot
    Spendtaproot = 5,
}

/// Template of output script
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    ::prost::Enumeration,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum OutputScriptType {
    Paytoaddress = 0,
    Paytoscripthash = 1,
    Paytomultisig = 2,
    Paytoopreturn = 3,
    Paytowitness = 4,
    Paytop2shwitness = 5,
    Paytotaproot = 6,
}

/// Multisig redeem script descriptor
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MultisigRedeemScriptType {
    /// Cosigner public nodes (and paths)
    #[prost(message, repeated, tag = "1")]
    pub pubkeys: Vec<HdNodePathType>,
    /// Existing signatures, one slot per cosigner (empty where unsigned)
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signatures: Vec<Vec<u8>>,
    /// Number of signatures required to spend
    #[prost(uint32, required, tag = "3")]
    pub m: u32,
}

/// Public node and path of a multisig cosigner
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HdNodePathType {
    #[prost(message, required, tag = "1")]
    pub node: HdNodeType,
    #[prost(uint32, repeated, packed = "false", tag = "2")]
    pub address_n: Vec<u32>,
}

/// Input of the transaction being signed
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxInput {
    /// BIP-32 path to derive the key from master node
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    /// Id of the previous transaction (wire order)
    #[prost(bytes = "vec", required, tag = "2")]
    pub prev_hash: Vec<u8>,
    /// Index of the previous output
    #[prost(uint32, required, tag = "3")]
    pub prev_index: u32,
    /// Script signature, only set for external inputs
    #[prost(bytes = "vec", optional, tag = "4")]
    pub script_sig: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "5", default = "4294967295")]
    pub sequence: Option<u32>,
    #[prost(enumeration = "InputScriptType", optional, tag = "6", default = "Spendaddress")]
    pub script_type: Option<i32>,
    /// Set when spending a multisig output
    #[prost(message, optional, tag = "7")]
    pub multisig: Option<MultisigRedeemScriptType>,
    /// Amount of the previous output
    #[prost(uint64, required, tag = "8")]
    pub amount: u64,
    /// Decred only
    #[prost(uint32, optional, tag = "9")]
    pub decred_tree: Option<u32>,
    /// Witness data, only set for external inputs
    #[prost(bytes = "vec", optional, tag = "13")]
    pub witness: Option<Vec<u8>>,
    /// SLIP-0019 proof of ownership, only set for external inputs
    #[prost(bytes = "vec", optional, tag = "14")]
    pub ownership_proof: Option<Vec<u8>>,
    /// Commitment data for the proof of ownership
    #[prost(bytes = "vec", optional, tag = "15")]
    pub commitment_data: Option<Vec<u8>>,
    /// Id of the original transaction (replacement only, wire order)
    #[prost(bytes = "vec", optional, tag = "16")]
    pub orig_hash: Option<Vec<u8>>,
    /// Index of the input in the original transaction
    #[prost(uint32, optional, tag = "17")]
    pub orig_index: Option<u32>,
    /// Script pubkey, only set for external inputs
    #[prost(bytes = "vec", optional, tag = "19")]
    pub script_pubkey: Option<Vec<u8>>,
    /// Masked coinjoin flags
    #[prost(uint32, optional, tag = "20")]
    pub coinjoin_flags: Option<u32>,
}

/// Output of the transaction being signed
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxOutput {
    /// Destination address
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    /// BIP-32 path of the destination (change outputs)
    #[prost(uint32, repeated, packed = "false", tag = "2")]
    pub address_n: Vec<u32>,
    #[prost(uint64, required, tag = "3")]
    pub amount: u64,
    #[prost(enumeration = "OutputScriptType", optional, tag = "4", default = "Paytoaddress")]
    pub script_type: Option<i32>,
    /// Multisig change descriptor
    #[prost(message, optional, tag = "5")]
    pub multisig: Option<MultisigRedeemScriptType>,
    /// Null-data payload, amount must be zero
    #[prost(bytes = "vec", optional, tag = "6")]
    pub op_return_data: Option<Vec<u8>>,
    /// Id of the original transaction (replacement only, wire order)
    #[prost(bytes = "vec", optional, tag = "10")]
    pub orig_hash: Option<Vec<u8>>,
    /// Index of the output in the original transaction
    #[prost(uint32, optional, tag = "11")]
    pub orig_index: Option<u32>,
    /// Index of the payment request covering this output
    #[prost(uint32, optional, tag = "12")]
    pub payment_req_index: Option<u32>,
    /// Raw script pubkey, used when rendering outputs of original transactions
    #[prost(bytes = "vec", optional, tag = "13")]
    pub script_pubkey: Option<Vec<u8>>,
}

/// Metadata of a previous transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrevTx {
    #[prost(uint32, required, tag = "1")]
    pub version: u32,
    #[prost(uint32, required, tag = "4")]
    pub lock_time: u32,
    #[prost(uint32, required, tag = "6")]
    pub inputs_count: u32,
    #[prost(uint32, required, tag = "7")]
    pub outputs_count: u32,
    #[prost(uint32, optional, tag = "9", default = "0")]
    pub extra_data_len: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub expiry: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub version_group_id: Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub timestamp: Option<u32>,
    #[prost(uint32, optional, tag = "14")]
    pub branch_id: Option<u32>,
}

/// Input of a previous transaction, public fields only
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrevInput {
    #[prost(bytes = "vec", required, tag = "2")]
    pub prev_hash: Vec<u8>,
    #[prost(uint32, required, tag = "3")]
    pub prev_index: u32,
    #[prost(bytes = "vec", required, tag = "4")]
    pub script_sig: Vec<u8>,
    #[prost(uint32, required, tag = "5")]
    pub sequence: u32,
    #[prost(uint32, optional, tag = "9")]
    pub decred_tree: Option<u32>,
}

/// Output of a previous transaction, amount and script only
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrevOutput {
    #[prost(uint64, required, tag = "1")]
    pub amount: u64,
    #[prost(bytes = "vec", required, tag = "2")]
    pub script_pubkey: Vec<u8>,
    #[prost(uint32, optional, tag = "3")]
    pub decred_script_version: Option<u32>,
}

/// Legacy acknowledgement, used empty to answer [RequestType::NoOp]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAck {}

/// Input of the transaction being signed
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckInput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckInputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckInputWrapper {
    #[prost(message, required, tag = "2")]
    pub input: TxInput,
}

/// Output of the transaction being signed
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOutput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckOutputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOutputWrapper {
    #[prost(message, required, tag = "5")]
    pub output: TxOutput,
}

/// Previous transaction metadata
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevMeta {
    #[prost(message, required, tag = "1")]
    pub tx: PrevTx,
}

/// Previous transaction input
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevInput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckPrevInputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevInputWrapper {
    #[prost(message, required, tag = "2")]
    pub input: PrevInput,
}

/// Previous transaction output
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevOutput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckPrevOutputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevOutputWrapper {
    #[prost(message, required, tag = "3")]
    pub output: PrevOutput,
}

/// Chunk of extra data
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevExtraData {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckPrevExtraDataWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPrevExtraDataWrapper {
    #[prost(bytes = "vec", required, tag = "8")]
    pub extra_data_chunk: Vec<u8>,
}

/// Externally signed payment request covering one or more outputs
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckPaymentRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub nonce: Option<Vec<u8>>,
    #[prost(string, required, tag = "2")]
    pub recipient_name: String,
    #[prost(message, repeated, tag = "3")]
    pub memos: Vec<PaymentRequestMemo>,
    #[prost(uint64, optional, tag = "4")]
    pub amount: Option<u64>,
    #[prost(bytes = "vec", required, tag = "5")]
    pub signature: Vec<u8>,
}

/// Payment request memo
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PaymentRequestMemo {
    #[prost(message, optional, tag = "1")]
    pub text_memo: Option<TextMemo>,
    #[prost(message, optional, tag = "2")]
    pub refund_memo: Option<RefundMemo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TextMemo {
    #[prost(string, required, tag = "1")]
    pub text: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RefundMemo {
    #[prost(string, required, tag = "1")]
    pub address: String,
    #[prost(bytes = "vec", required, tag = "2")]
    pub mac: Vec<u8>,
}

/// Orchard note spent by the transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ZcashOrchardInput {
    /// Raw recipient address of the note
    #[prost(bytes = "vec", required, tag = "1")]
    pub recipient: Vec<u8>,
    #[prost(uint64, required, tag = "2")]
    pub value: u64,
    #[prost(bytes = "vec", required, tag = "3")]
    pub rho: Vec<u8>,
    #[prost(bytes = "vec", required, tag = "4")]
    pub rseed: Vec<u8>,
}

/// Orchard output of the transaction, internal change where `address` is absent
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ZcashOrchardOutput {
    #[prost(string, optional, tag = "1")]
    pub address: Option<String>,
    #[prost(uint64, required, tag = "2")]
    pub amount: u64,
    #[prost(string, optional, tag = "3")]
    pub memo: Option<String>,
}

/// Orchard input acknowledgement
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOrchardInput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckOrchardInputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOrchardInputWrapper {
    #[prost(message, required, tag = "15")]
    pub orchard_input: ZcashOrchardInput,
}

/// Orchard output acknowledgement
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOrchardOutput {
    #[prost(message, required, tag = "1")]
    pub tx: TxAckOrchardOutputWrapper,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxAckOrchardOutputWrapper {
    #[prost(message, required, tag = "16")]
    pub orchard_output: ZcashOrchardOutput,
}
