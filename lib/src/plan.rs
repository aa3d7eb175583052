// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction plan, the host's authoritative description of the
//! transaction being signed
//!
//! Plans serialize with `serde` (byte fields as hex) so they can be stored
//! alongside wallet state or loaded from test vectors.

use serde::{Deserialize, Serialize};

use hwtx_proto::{
    common::HdNodeType,
    tx::{
        CoinJoinRequest, HdNodePathType, InputScriptType, MultisigRedeemScriptType,
        OutputScriptType, PaymentRequestMemo, RefundMemo, TextMemo, TxAckPaymentRequest,
        ZcashOrchardInput, ZcashOrchardOutput,
    },
    TxId,
};

use crate::{serde_hex, Error};

/// Default input sequence number
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Orchard bundles are padded to at least this many actions
pub const MIN_ORCHARD_ACTIONS: u32 = 2;

/// Reference to an output of another transaction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxId,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: TxId, vout: u32) -> Self {
        Self { txid, vout }
    }
}

/// Complete description of the transaction to be signed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionPlan {
    /// Coin name, selects the coin profile
    pub coin: String,

    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub lock_time: u32,

    /// Decred and Zcash only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u32>,

    /// Zcash only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_group_id: Option<u32>,

    /// Zcash only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u32>,

    /// Zcash only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwintered: Option<bool>,

    /// Peercoin only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,

    /// Dash only, special transaction type packed into the upper half of
    /// the version field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_tx_type: Option<u16>,

    /// Decred only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decred_staking_ticket: Option<bool>,

    pub inputs: Vec<InputSpec>,

    pub outputs: Vec<OutputSpec>,

    #[serde(default)]
    pub auxiliary: Auxiliary,
}

fn default_version() -> u32 {
    1
}

fn default_sequence() -> u32 {
    SEQUENCE_FINAL
}

/// Input of the transaction being signed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Output being spent
    pub prev: OutPoint,

    /// Amount of the output being spent
    pub amount: u64,

    #[serde(default = "default_sequence")]
    pub sequence: u32,

    pub script_type: InputScriptType,

    pub signer: InputSigner,

    /// Matching input of the transaction being replaced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<OutPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decred_tree: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinjoin_flags: Option<u32>,
}

/// Ownership of an input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSigner {
    /// Signed by the device with the key at `address_n`
    Path { address_n: Vec<u32> },

    /// Owned by another party, not signed by the device
    External {
        #[serde(with = "hex")]
        script_pubkey: Vec<u8>,
        #[serde(default, with = "serde_hex::opt")]
        script_sig: Option<Vec<u8>>,
        #[serde(default, with = "serde_hex::opt")]
        witness: Option<Vec<u8>>,
        #[serde(default, with = "serde_hex::opt")]
        ownership_proof: Option<Vec<u8>>,
        #[serde(default, with = "serde_hex::opt")]
        commitment_data: Option<Vec<u8>>,
    },

    /// Multisig input, signed by the device with the key at `address_n`
    Multisig {
        address_n: Vec<u32>,
        multisig: MultisigSpec,
    },
}

/// Multisig redeem script descriptor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultisigSpec {
    /// Cosigner keys in script order
    pub pubkeys: Vec<CosignerKey>,

    /// Existing signatures, one slot per cosigner, empty where not yet signed
    #[serde(with = "serde_hex::list")]
    pub signatures: Vec<Vec<u8>>,

    /// Signatures required to spend
    pub m: u32,
}

/// Public node of a multisig cosigner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CosignerKey {
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex")]
    pub chain_code: Vec<u8>,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub fingerprint: u32,
    #[serde(default)]
    pub child_num: u32,
    #[serde(default)]
    pub address_n: Vec<u32>,
}

impl From<&MultisigSpec> for MultisigRedeemScriptType {
    fn from(m: &MultisigSpec) -> Self {
        Self {
            pubkeys: m
                .pubkeys
                .iter()
                .map(|k| HdNodePathType {
                    node: HdNodeType {
                        depth: k.depth,
                        fingerprint: k.fingerprint,
                        child_num: k.child_num,
                        chain_code: k.chain_code.clone(),
                        private_key: None,
                        public_key: k.public_key.clone(),
                    },
                    address_n: k.address_n.clone(),
                })
                .collect(),
            signatures: m.signatures.clone(),
            m: m.m,
        }
    }
}

/// Output of the transaction being signed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub amount: u64,

    pub destination: Destination,

    pub script_type: OutputScriptType,

    /// Payment request covering this output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_req_index: Option<u32>,

    /// Matching output of the transaction being replaced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<OutPoint>,
}

/// Output destination
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// External address
    Address(String),

    /// Change output, script derived by the device
    Path {
        address_n: Vec<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multisig: Option<MultisigSpec>,
    },

    /// Null-data output
    OpReturn(#[serde(with = "hex")] Vec<u8>),
}

/// Auxiliary payloads served on request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Auxiliary {
    /// Extra data appended to the transaction (eg. Dash special transaction payload)
    #[serde(default, with = "serde_hex::opt", skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_requests: Vec<PaymentRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinjoin_request: Option<CoinJoinSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchard: Option<OrchardBundle>,
}

/// Externally signed payment request, served verbatim
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default, with = "serde_hex::opt")]
    pub nonce: Option<Vec<u8>>,
    pub recipient_name: String,
    #[serde(default)]
    pub memos: Vec<PaymentMemo>,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

/// Payment request memo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMemo {
    Text(String),
    Refund {
        address: String,
        #[serde(with = "hex")]
        mac: Vec<u8>,
    },
}

impl From<&PaymentRequest> for TxAckPaymentRequest {
    fn from(p: &PaymentRequest) -> Self {
        Self {
            nonce: p.nonce.clone(),
            recipient_name: p.recipient_name.clone(),
            memos: p
                .memos
                .iter()
                .map(|m| match m {
                    PaymentMemo::Text(text) => PaymentRequestMemo {
                        text_memo: Some(TextMemo { text: text.clone() }),
                        refund_memo: None,
                    },
                    PaymentMemo::Refund { address, mac } => PaymentRequestMemo {
                        text_memo: None,
                        refund_memo: Some(RefundMemo {
                            address: address.clone(),
                            mac: mac.clone(),
                        }),
                    },
                })
                .collect(),
            amount: p.amount,
            signature: p.signature.clone(),
        }
    }
}

/// Coinjoin round parameters, signed by the coordinator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinJoinSpec {
    pub fee_rate: u32,
    pub no_fee_threshold: u64,
    pub min_registrable_amount: u64,
    #[serde(with = "hex")]
    pub mask_public_key: Vec<u8>,
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

impl From<&CoinJoinSpec> for CoinJoinRequest {
    fn from(c: &CoinJoinSpec) -> Self {
        Self {
            fee_rate: c.fee_rate,
            no_fee_threshold: c.no_fee_threshold,
            min_registrable_amount: c.min_registrable_amount,
            mask_public_key: c.mask_public_key.clone(),
            signature: c.signature.clone(),
        }
    }
}

/// Zcash Orchard bundle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchardBundle {
    /// Note commitment tree anchor
    #[serde(with = "hex")]
    pub anchor: Vec<u8>,

    /// ZIP-32 account path
    pub account: Vec<u32>,

    #[serde(default)]
    pub inputs: Vec<OrchardInput>,

    #[serde(default)]
    pub outputs: Vec<OrchardOutput>,
}

impl OrchardBundle {
    /// Number of actions, and so spend authorizations, in the bundle
    pub fn actions(&self) -> u32 {
        (self.inputs.len() as u32)
            .max(self.outputs.len() as u32)
            .max(MIN_ORCHARD_ACTIONS)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchardInput {
    #[serde(with = "hex")]
    pub recipient: Vec<u8>,
    pub value: u64,
    #[serde(with = "hex")]
    pub rho: Vec<u8>,
    #[serde(with = "hex")]
    pub rseed: Vec<u8>,
}

impl From<&OrchardInput> for ZcashOrchardInput {
    fn from(i: &OrchardInput) -> Self {
        Self {
            recipient: i.recipient.clone(),
            value: i.value,
            rho: i.rho.clone(),
            rseed: i.rseed.clone(),
        }
    }
}

/// Orchard output, internal change where `address` is absent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchardOutput {
    #[serde(default)]
    pub address: Option<String>,
    pub amount: u64,
    #[serde(default)]
    pub memo: Option<String>,
}

impl From<&OrchardOutput> for ZcashOrchardOutput {
    fn from(o: &OrchardOutput) -> Self {
        Self {
            address: o.address.clone(),
            amount: o.amount,
            memo: o.memo.clone(),
        }
    }
}

impl TransactionPlan {
    /// Create an empty plan for the provided coin
    pub fn new(coin: &str) -> Self {
        Self {
            coin: coin.to_string(),
            version: default_version(),
            lock_time: 0,
            expiry: None,
            version_group_id: None,
            branch_id: None,
            overwintered: None,
            timestamp: None,
            dash_tx_type: None,
            decred_staking_ticket: None,
            inputs: vec![],
            outputs: vec![],
            auxiliary: Auxiliary::default(),
        }
    }

    /// Check plan invariants
    ///
    /// This covers structural consistency only, coin policy is enforced by
    /// the signer.
    pub fn check(&self) -> Result<(), Error> {
        let n_reqs = self.auxiliary.payment_requests.len();

        for (i, o) in self.outputs.iter().enumerate() {
            if matches!(o.destination, Destination::OpReturn(_)) && o.amount != 0 {
                return Err(Error::InvalidPlan(format!(
                    "null-data output {i} with non-zero amount"
                )));
            }

            if let Some(r) = o.payment_req_index {
                if r as usize >= n_reqs {
                    return Err(Error::InvalidPlan(format!(
                        "output {i} references missing payment request {r}"
                    )));
                }
            }
        }

        for (i, input) in self.inputs.iter().enumerate() {
            if let InputSigner::Multisig { multisig, .. } = &input.signer {
                if multisig.signatures.len() != multisig.pubkeys.len() {
                    return Err(Error::InvalidPlan(format!(
                        "input {i} multisig signature slots do not match cosigners"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Check whether the plan replaces a previously broadcast transaction
    pub fn is_replacement(&self) -> bool {
        self.inputs.iter().any(|i| i.original.is_some())
            || self.outputs.iter().any(|o| o.original.is_some())
    }

    /// Iterate over every transaction referenced by the plan
    pub fn referenced_txids(&self) -> impl Iterator<Item = TxId> + '_ {
        let prev = self.inputs.iter().map(|i| i.prev.txid);
        let orig_in = self.inputs.iter().filter_map(|i| i.original.map(|o| o.txid));
        let orig_out = self.outputs.iter().filter_map(|o| o.original.map(|o| o.txid));

        prev.chain(orig_in).chain(orig_out)
    }

    /// Indices of inputs the device is expected to sign
    pub fn required_signatures(&self) -> Vec<u32> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, i)| !matches!(i.signer, InputSigner::External { .. }))
            .map(|(n, _)| n as u32)
            .collect()
    }

    /// Number of Orchard actions, zero without a bundle
    pub fn orchard_actions(&self) -> u32 {
        self.auxiliary.orchard.as_ref().map(|o| o.actions()).unwrap_or(0)
    }

    /// Inject a cosigner signature into a multisig input, used to pass
    /// partially signed plans between cosigning devices
    pub fn set_multisig_signature(
        &mut self,
        input: usize,
        slot: usize,
        signature: Vec<u8>,
    ) -> Result<(), Error> {
        let i = self
            .inputs
            .get_mut(input)
            .ok_or_else(|| Error::InvalidPlan(format!("no input {input}")))?;

        let m = match &mut i.signer {
            InputSigner::Multisig { multisig, .. } => multisig,
            _ => return Err(Error::InvalidPlan(format!("input {input} is not multisig"))),
        };

        let s = m
            .signatures
            .get_mut(slot)
            .ok_or_else(|| Error::InvalidPlan(format!("no cosigner slot {slot}")))?;
        *s = signature;

        Ok(())
    }
}
