// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signature and serialization accumulator
//!
//! Collects signatures and serialized transaction chunks streamed by the
//! signer. Each signature slot is written at most once, chunks are appended
//! in arrival order and never reordered.

use std::collections::BTreeMap;

use hwtx_proto::{tx::SignatureType, Envelope};

use crate::Error;

/// Signatures and serialized transaction collected during a session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Accumulator {
    signatures: BTreeMap<u32, Vec<u8>>,
    orchard_signatures: BTreeMap<u32, Vec<u8>>,
    serialized: Vec<u8>,
    chunks: usize,
}

/// Completed signing session output
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTx {
    /// Transparent input signatures by input index
    pub signatures: BTreeMap<u32, Vec<u8>>,
    /// Orchard spend authorization signatures by action index
    pub orchard_signatures: BTreeMap<u32, Vec<u8>>,
    /// Serialized signed transaction
    pub serialized: Vec<u8>,
}

impl SignedTx {
    /// Fetch the signature for an input
    pub fn signature(&self, index: u32) -> Option<&[u8]> {
        self.signatures.get(&index).map(|s| s.as_slice())
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input signature, rejecting rewrites
    pub fn record_signature(&mut self, index: u32, signature: Vec<u8>) -> Result<(), Error> {
        if self.signatures.contains_key(&index) {
            return Err(Error::DuplicateSignature(index));
        }

        self.signatures.insert(index, signature);

        Ok(())
    }

    /// Record an Orchard spend authorization signature, rejecting rewrites
    pub fn record_orchard_signature(
        &mut self,
        index: u32,
        signature: Vec<u8>,
    ) -> Result<(), Error> {
        if self.orchard_signatures.contains_key(&index) {
            return Err(Error::DuplicateSignature(index));
        }

        self.orchard_signatures.insert(index, signature);

        Ok(())
    }

    /// Append a serialized transaction chunk
    pub fn append_serialized(&mut self, chunk: &[u8]) {
        self.serialized.extend_from_slice(chunk);
        self.chunks += 1;
    }

    /// Record the contents of a request envelope
    pub fn record(&mut self, envelope: Envelope) -> Result<(), Error> {
        if let Some(s) = envelope.signature {
            match s.kind {
                SignatureType::Transparent => self.record_signature(s.index, s.signature)?,
                SignatureType::OrchardSpendAuth => {
                    self.record_orchard_signature(s.index, s.signature)?
                }
            }
        }

        if let Some(c) = envelope.serialized {
            self.append_serialized(&c);
        }

        Ok(())
    }

    /// Check whether any signature or chunk has been received
    pub fn has_output(&self) -> bool {
        !self.signatures.is_empty() || !self.orchard_signatures.is_empty() || self.chunks > 0
    }

    /// Required input indices without a signature
    pub fn missing(&self, required: &[u32]) -> Vec<u32> {
        required
            .iter()
            .filter(|i| !self.signatures.contains_key(*i))
            .copied()
            .collect()
    }

    /// Check every required input has been signed
    pub fn is_complete(&self, required: &[u32]) -> bool {
        required.iter().all(|i| self.signatures.contains_key(i))
    }

    /// Fetch the serialized transaction received so far
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }

    /// Finish collection, failing where required signatures are missing
    pub fn finish(self, required: &[u32]) -> Result<SignedTx, Error> {
        let missing = self.missing(required);
        if !missing.is_empty() {
            return Err(Error::IncompleteSignatureSet { missing });
        }

        Ok(SignedTx {
            signatures: self.signatures,
            orchard_signatures: self.orchard_signatures,
            serialized: self.serialized,
        })
    }
}
