// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Previous transaction resolution
//!
//! The signer verifies input amounts (and replacement bookkeeping) against
//! previously broadcast transactions, which the host serves from a
//! [Resolver]. [TxCache] provides an in-memory implementation.

use std::{collections::HashMap, sync::Arc};

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use hwtx_proto::{tx::InputScriptType, TxId};

use crate::{serde_hex, Error};

/// Input of a cached transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedInput {
    pub prev_hash: TxId,
    pub prev_index: u32,
    #[serde(with = "hex")]
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decred_tree: Option<u32>,

    /// Amount spent, known for the wallet's own (replaceable) transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,

    /// Script type, known for the wallet's own (replaceable) transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<InputScriptType>,
}

/// Output of a cached transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedOutput {
    pub amount: u64,
    #[serde(with = "hex")]
    pub script_pubkey: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decred_script_version: Option<u32>,
}

/// Previously broadcast transaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedTransaction {
    pub version: u32,
    pub lock_time: u32,
    pub inputs: Vec<CachedInput>,
    pub outputs: Vec<CachedOutput>,
    #[serde(default, with = "serde_hex::opt", skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_group_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
}

impl CachedTransaction {
    /// Length of extra data in bytes
    pub fn extra_data_len(&self) -> usize {
        self.extra_data.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    /// Legacy (non-witness) serialization, extra data appended after
    /// `lock_time`
    pub fn legacy_serialize(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(256);

        put_u32(&mut b, self.version);

        put_compact_size(&mut b, self.inputs.len() as u64);
        for i in &self.inputs {
            b.extend_from_slice(&i.prev_hash.to_wire());
            put_u32(&mut b, i.prev_index);
            put_compact_size(&mut b, i.script_sig.len() as u64);
            b.extend_from_slice(&i.script_sig);
            put_u32(&mut b, i.sequence);
        }

        put_compact_size(&mut b, self.outputs.len() as u64);
        for o in &self.outputs {
            let mut a = [0u8; 8];
            LittleEndian::write_u64(&mut a, o.amount);
            b.extend_from_slice(&a);
            put_compact_size(&mut b, o.script_pubkey.len() as u64);
            b.extend_from_slice(&o.script_pubkey);
        }

        put_u32(&mut b, self.lock_time);

        if let Some(d) = &self.extra_data {
            b.extend_from_slice(d);
        }

        b
    }

    /// Compute the legacy transaction id (double SHA-256 over
    /// [CachedTransaction::legacy_serialize])
    pub fn legacy_txid(&self) -> TxId {
        let h = Sha256::digest(Sha256::digest(self.legacy_serialize()));

        let mut d = [0u8; 32];
        d.copy_from_slice(&h);
        d.reverse();

        TxId::new(d)
    }
}

fn put_u32(b: &mut Vec<u8>, v: u32) {
    let mut a = [0u8; 4];
    LittleEndian::write_u32(&mut a, v);
    b.extend_from_slice(&a);
}

/// Append a Bitcoin compact size integer
pub fn put_compact_size(b: &mut Vec<u8>, v: u64) {
    match v {
        0..=0xfc => b.push(v as u8),
        0xfd..=0xffff => {
            b.push(0xfd);
            b.extend_from_slice(&(v as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            b.push(0xfe);
            b.extend_from_slice(&(v as u32).to_le_bytes());
        }
        _ => {
            b.push(0xff);
            b.extend_from_slice(&v.to_le_bytes());
        }
    }
}

/// Bounds-checked slice of `len` bytes at `offset`
pub fn slice_bounded(data: &[u8], offset: u32, len: u32) -> Result<&[u8], Error> {
    let out_of_range = || Error::OutOfRange {
        offset,
        len,
        available: data.len(),
    };

    let start = offset as usize;
    let end = start.checked_add(len as usize).ok_or_else(out_of_range)?;

    data.get(start..end).ok_or_else(out_of_range)
}

/// Read-only source of previously broadcast transactions
pub trait Resolver: Send + Sync {
    /// Fetch a cached transaction
    fn resolve(&self, txid: &TxId) -> Result<&CachedTransaction, Error>;

    /// Fetch exactly `len` bytes of extra data at `offset`
    fn slice_extra_data(&self, txid: &TxId, offset: u32, len: u32) -> Result<&[u8], Error> {
        let tx = self.resolve(txid)?;
        let data = tx.extra_data.as_deref().unwrap_or(&[]);

        slice_bounded(data, offset, len)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, txid: &TxId) -> Result<&CachedTransaction, Error> {
        (**self).resolve(txid)
    }

    fn slice_extra_data(&self, txid: &TxId, offset: u32, len: u32) -> Result<&[u8], Error> {
        (**self).slice_extra_data(txid, offset, len)
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, txid: &TxId) -> Result<&CachedTransaction, Error> {
        (**self).resolve(txid)
    }

    fn slice_extra_data(&self, txid: &TxId, offset: u32, len: u32) -> Result<&[u8], Error> {
        (**self).slice_extra_data(txid, offset, len)
    }
}

/// In-memory transaction cache
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxCache {
    txs: HashMap<TxId, CachedTransaction>,
}

impl TxCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transaction under the provided id, without verification
    pub fn insert(&mut self, txid: TxId, tx: CachedTransaction) {
        self.txs.insert(txid, tx);
    }

    /// Insert a transaction, checking the id matches its contents
    pub fn insert_checked(&mut self, txid: TxId, tx: CachedTransaction) -> Result<(), Error> {
        let actual = tx.legacy_txid();
        if actual != txid {
            return Err(Error::TxIdMismatch {
                expected: txid,
                actual,
            });
        }

        self.txs.insert(txid, tx);

        Ok(())
    }

    /// Insert a transaction under its computed id, returning the id
    pub fn add(&mut self, tx: CachedTransaction) -> TxId {
        let txid = tx.legacy_txid();
        self.txs.insert(txid, tx);
        txid
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Load a cache from a JSON map of transaction id to transaction
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl Resolver for TxCache {
    fn resolve(&self, txid: &TxId) -> Result<&CachedTransaction, Error> {
        self.txs.get(txid).ok_or(Error::UnknownTransaction(*txid))
    }
}
