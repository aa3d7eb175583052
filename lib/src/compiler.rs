// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Response compiler
//!
//! Maps each typed signer request onto the payload it asks for, drawn from
//! the [TransactionPlan] for the transaction being signed or from the
//! [Resolver] for previously broadcast transactions.
//!
//! Responses for previously broadcast transactions only ever carry public,
//! committed fields: [PrevInput] and [PrevOutput] have no derivation path
//! and original inputs / outputs are rendered with an empty path.

use std::collections::HashSet;

use log::trace;

use hwtx_proto::{
    tx::*,
    HostMessage, ProtocolRequest, TxId,
};

use crate::{
    coin::CoinProfile,
    plan::{Destination, InputSigner, TransactionPlan},
    resolver::{slice_bounded, CachedTransaction, Resolver},
    Error,
};

/// Response compiler for a single signing session
pub struct Compiler<'a, R: Resolver + ?Sized> {
    plan: &'a TransactionPlan,
    resolver: &'a R,
    profile: &'a dyn CoinProfile,
    trusted: HashSet<TxId>,
}

impl<'a, R: Resolver + ?Sized> Compiler<'a, R> {
    /// Create a compiler, trusting every transaction referenced by the plan
    pub fn new(plan: &'a TransactionPlan, resolver: &'a R, profile: &'a dyn CoinProfile) -> Self {
        Self {
            plan,
            resolver,
            profile,
            trusted: plan.referenced_txids().collect(),
        }
    }

    /// Check whether a transaction may be resolved in this session
    pub fn is_trusted(&self, txid: &TxId) -> bool {
        self.trusted.contains(txid)
    }

    /// Build the session open message
    pub fn sign_tx(&self) -> Result<SignTx, Error> {
        let p = self.plan;

        self.profile.check_plan(p)?;

        let orchard = p.auxiliary.orchard.as_ref();

        Ok(SignTx {
            outputs_count: p.outputs.len() as u32,
            inputs_count: p.inputs.len() as u32,
            coin_name: Some(self.profile.name().to_string()),
            version: Some(self.profile.pack_version(p)),
            lock_time: Some(p.lock_time),
            expiry: p.expiry,
            overwintered: p.overwintered,
            version_group_id: p.version_group_id,
            timestamp: p.timestamp,
            branch_id: p.branch_id,
            decred_staking_ticket: p.decred_staking_ticket,
            coinjoin_request: p.auxiliary.coinjoin_request.as_ref().map(CoinJoinRequest::from),
            orchard_inputs_count: orchard.map(|o| o.inputs.len() as u32),
            orchard_outputs_count: orchard.map(|o| o.outputs.len() as u32),
            orchard_anchor: orchard.map(|o| o.anchor.clone()),
            z_address_n: orchard.map(|o| o.account.clone()).unwrap_or_default(),
            extra_data_len: p.auxiliary.extra_data.as_ref().map(|d| d.len() as u32),
        })
    }

    /// Compile the response to a signer request, `None` for terminal requests
    pub fn compile(&mut self, req: &ProtocolRequest) -> Result<Option<HostMessage>, Error> {
        let kind = req.kind();
        if !self.profile.supports(kind) {
            return Err(Error::UnsupportedRequestKind {
                kind,
                coin: self.profile.name().to_string(),
            });
        }

        let m = match *req {
            ProtocolRequest::TxMeta { origin } => {
                let tx = self.resolve(&origin)?;
                let meta = prev_meta(tx);

                // Inputs of a served transaction may be requested in turn
                let parents: Vec<_> = tx.inputs.iter().map(|i| i.prev_hash).collect();
                self.trusted.extend(parents);

                HostMessage::TxAckPrevMeta(TxAckPrevMeta { tx: meta })
            }
            ProtocolRequest::TxInput {
                index,
                origin: None,
            } => HostMessage::TxAckInput(TxAckInput {
                tx: TxAckInputWrapper {
                    input: self.plan_input(index)?,
                },
            }),
            ProtocolRequest::TxInput {
                index,
                origin: Some(origin),
            } => {
                let i = self
                    .resolve(&origin)?
                    .inputs
                    .get(index as usize)
                    .ok_or(Error::IndexOutOfRange { kind, index })?;

                HostMessage::TxAckPrevInput(TxAckPrevInput {
                    tx: TxAckPrevInputWrapper {
                        input: PrevInput {
                            prev_hash: i.prev_hash.to_wire(),
                            prev_index: i.prev_index,
                            script_sig: i.script_sig.clone(),
                            sequence: i.sequence,
                            decred_tree: i.decred_tree,
                        },
                    },
                })
            }
            ProtocolRequest::TxOutput {
                index,
                origin: None,
            } => HostMessage::TxAckOutput(TxAckOutput {
                tx: TxAckOutputWrapper {
                    output: self.plan_output(index)?,
                },
            }),
            ProtocolRequest::TxOutput {
                index,
                origin: Some(origin),
            } => {
                let o = self
                    .resolve(&origin)?
                    .outputs
                    .get(index as usize)
                    .ok_or(Error::IndexOutOfRange { kind, index })?;

                HostMessage::TxAckPrevOutput(TxAckPrevOutput {
                    tx: TxAckPrevOutputWrapper {
                        output: PrevOutput {
                            amount: o.amount,
                            script_pubkey: o.script_pubkey.clone(),
                            decred_script_version: o.decred_script_version,
                        },
                    },
                })
            }
            ProtocolRequest::TxOrigInput { index, origin } => {
                HostMessage::TxAckInput(TxAckInput {
                    tx: TxAckInputWrapper {
                        input: self.orig_input(index, &origin)?,
                    },
                })
            }
            ProtocolRequest::TxOrigOutput { index, origin } => {
                let o = self
                    .resolve(&origin)?
                    .outputs
                    .get(index as usize)
                    .ok_or(Error::IndexOutOfRange { kind, index })?;

                HostMessage::TxAckOutput(TxAckOutput {
                    tx: TxAckOutputWrapper {
                        output: TxOutput {
                            amount: o.amount,
                            script_pubkey: Some(o.script_pubkey.clone()),
                            ..Default::default()
                        },
                    },
                })
            }
            ProtocolRequest::TxExtraData {
                origin,
                offset,
                len,
            } => {
                let chunk = match origin {
                    Some(o) => {
                        self.check_trusted(&o)?;
                        self.resolver.slice_extra_data(&o, offset, len)?
                    }
                    None => {
                        let data = self.plan.auxiliary.extra_data.as_deref().unwrap_or(&[]);
                        slice_bounded(data, offset, len)?
                    }
                };

                HostMessage::TxAckPrevExtraData(TxAckPrevExtraData {
                    tx: TxAckPrevExtraDataWrapper {
                        extra_data_chunk: chunk.to_vec(),
                    },
                })
            }
            ProtocolRequest::TxPaymentReq { index } => {
                let r = self
                    .plan
                    .auxiliary
                    .payment_requests
                    .get(index as usize)
                    .ok_or(Error::MissingPaymentRequest(index))?;

                HostMessage::TxAckPaymentRequest(r.into())
            }
            ProtocolRequest::TxOrchardInput { index } => {
                let i = self
                    .plan
                    .auxiliary
                    .orchard
                    .as_ref()
                    .and_then(|o| o.inputs.get(index as usize))
                    .ok_or(Error::IndexOutOfRange { kind, index })?;

                HostMessage::TxAckOrchardInput(TxAckOrchardInput {
                    tx: TxAckOrchardInputWrapper {
                        orchard_input: i.into(),
                    },
                })
            }
            ProtocolRequest::TxOrchardOutput { index } => {
                let o = self
                    .plan
                    .auxiliary
                    .orchard
                    .as_ref()
                    .and_then(|o| o.outputs.get(index as usize))
                    .ok_or(Error::IndexOutOfRange { kind, index })?;

                HostMessage::TxAckOrchardOutput(TxAckOrchardOutput {
                    tx: TxAckOrchardOutputWrapper {
                        orchard_output: o.into(),
                    },
                })
            }
            ProtocolRequest::NoOp => HostMessage::TxAckNoOp(TxAck {}),
            ProtocolRequest::TxFinished => return Ok(None),
        };

        trace!("Compiled {kind}: {m:?}");

        Ok(Some(m))
    }

    fn check_trusted(&self, txid: &TxId) -> Result<(), Error> {
        match self.trusted.contains(txid) {
            true => Ok(()),
            false => Err(Error::UnknownTransaction(*txid)),
        }
    }

    /// Resolve a transaction, refusing any not referenced by the session
    fn resolve(&self, txid: &TxId) -> Result<&'a CachedTransaction, Error> {
        self.check_trusted(txid)?;
        self.resolver.resolve(txid)
    }

    fn plan_input(&self, index: u32) -> Result<TxInput, Error> {
        let i = self
            .plan
            .inputs
            .get(index as usize)
            .ok_or(Error::IndexOutOfRange {
                kind: RequestType::Txinput,
                index,
            })?;

        let mut t = TxInput {
            prev_hash: i.prev.txid.to_wire(),
            prev_index: i.prev.vout,
            sequence: Some(i.sequence),
            script_type: Some(i.script_type as i32),
            amount: i.amount,
            decred_tree: i.decred_tree,
            orig_hash: i.original.map(|o| o.txid.to_wire()),
            orig_index: i.original.map(|o| o.vout),
            coinjoin_flags: i.coinjoin_flags,
            ..Default::default()
        };

        match &i.signer {
            InputSigner::Path { address_n } => {
                t.address_n = address_n.clone();
            }
            InputSigner::External {
                script_pubkey,
                script_sig,
                witness,
                ownership_proof,
                commitment_data,
            } => {
                t.script_pubkey = Some(script_pubkey.clone());
                t.script_sig = script_sig.clone();
                t.witness = witness.clone();
                t.ownership_proof = ownership_proof.clone();
                t.commitment_data = commitment_data.clone();
            }
            InputSigner::Multisig {
                address_n,
                multisig,
            } => {
                t.address_n = address_n.clone();
                t.multisig = Some(multisig.into());
            }
        }

        Ok(t)
    }

    fn plan_output(&self, index: u32) -> Result<TxOutput, Error> {
        let o = self
            .plan
            .outputs
            .get(index as usize)
            .ok_or(Error::IndexOutOfRange {
                kind: RequestType::Txoutput,
                index,
            })?;

        let mut t = TxOutput {
            amount: o.amount,
            script_type: Some(o.script_type as i32),
            orig_hash: o.original.map(|o| o.txid.to_wire()),
            orig_index: o.original.map(|o| o.vout),
            payment_req_index: o.payment_req_index,
            ..Default::default()
        };

        match &o.destination {
            Destination::Address(a) => t.address = Some(a.clone()),
            Destination::Path {
                address_n,
                multisig,
            } => {
                t.address_n = address_n.clone();
                t.multisig = multisig.as_ref().map(|m| m.into());
            }
            Destination::OpReturn(d) => t.op_return_data = Some(d.clone()),
        }

        Ok(t)
    }

    /// Render an input of an original transaction, without derivation path
    fn orig_input(&self, index: u32, origin: &TxId) -> Result<TxInput, Error> {
        let i = self
            .resolve(origin)?
            .inputs
            .get(index as usize)
            .ok_or(Error::IndexOutOfRange {
                kind: RequestType::Txoriginput,
                index,
            })?;

        // Fall back to the spent output where the amount was not recorded
        let amount = match i.amount {
            Some(a) => a,
            None => {
                self.resolve(&i.prev_hash)?
                    .outputs
                    .get(i.prev_index as usize)
                    .ok_or(Error::IndexOutOfRange {
                        kind: RequestType::Txoutput,
                        index: i.prev_index,
                    })?
                    .amount
            }
        };

        Ok(TxInput {
            address_n: vec![],
            prev_hash: i.prev_hash.to_wire(),
            prev_index: i.prev_index,
            script_sig: Some(i.script_sig.clone()),
            sequence: Some(i.sequence),
            script_type: i.script_type.map(|t| t as i32),
            amount,
            decred_tree: i.decred_tree,
            ..Default::default()
        })
    }
}

/// Render cached transaction metadata
fn prev_meta(tx: &CachedTransaction) -> PrevTx {
    let extra_data_len = match tx.extra_data_len() {
        0 => None,
        n => Some(n as u32),
    };

    PrevTx {
        version: tx.version,
        lock_time: tx.lock_time,
        inputs_count: tx.inputs.len() as u32,
        outputs_count: tx.outputs.len() as u32,
        extra_data_len,
        expiry: tx.expiry,
        version_group_id: tx.version_group_id,
        timestamp: tx.timestamp,
        branch_id: tx.branch_id,
    }
}
