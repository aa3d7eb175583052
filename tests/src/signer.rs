// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated signer
//!
//! [SimSigner] runs the signer side of a signing session as a tokio task.
//! It pulls transaction data in the order a hardware signer does, verifies
//! previous transactions against their ids and amounts, then streams back
//! deterministic signatures and the serialized transaction.
//!
//! Keys and signatures are derived by hashing the configured seed, so results
//! are reproducible but carry no cryptographic meaning.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use log::{debug, trace};
use prost::Message;
use sha2::{Digest, Sha256};
use tokio::{sync::mpsc, task::JoinHandle};

use hwtx::{
    plan::MIN_ORCHARD_ACTIONS,
    resolver::{put_compact_size, CachedInput, CachedOutput, CachedTransaction},
    Transport,
};
use hwtx_proto::{
    auth::{PreauthorizedRequest, UnlockedPathRequest},
    common::{ButtonRequest, Failure, FailureType},
    tx::{
        InputScriptType, PrevInput, PrevOutput, PrevTx, SignTx, SignatureType,
        TxAckPaymentRequest, TxInput, TxOutput, TxRequest, ZcashOrchardInput, ZcashOrchardOutput,
    },
    DeviceMessage, Envelope, HostMessage, ProtocolRequest, SignatureEntry, TxId,
};

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// SLIP-0025 purpose, paths below this are refused until unlocked
pub const RESTRICTED_PURPOSE: u32 = HARDENED | 10025;

/// Button request code for transaction confirmation
pub const BUTTON_SIGN_TX: u32 = 8;

/// Hook applied to every request before it leaves the signer
pub type RequestHook = Arc<dyn Fn(&mut TxRequest) + Send + Sync>;

/// Simulated signer configuration
#[derive(Clone)]
pub struct SimConfig {
    /// Seed all keys and signatures are derived from
    pub seed: Vec<u8>,

    /// Maximum length of requested extra data chunks
    pub chunk_len: u32,

    /// Request on-device confirmation before signing
    pub confirm: bool,

    /// Signer holds a preauthorization (eg. a coinjoin registration)
    pub preauthorized: bool,

    /// Applied to each request before sending, used for fault injection
    pub hook: Option<RequestHook>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: b"hwtx simulated signer".to_vec(),
            chunk_len: 128,
            confirm: true,
            preauthorized: false,
            hook: None,
        }
    }
}

impl SimConfig {
    /// Default configuration using the provided seed
    pub fn with_seed(seed: &[u8]) -> Self {
        Self {
            seed: seed.to_vec(),
            ..Default::default()
        }
    }

    /// Attach a request hook
    pub fn with_hook(mut self, f: impl Fn(&mut TxRequest) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(f));
        self
    }
}

/// Handle to a running simulated signer, usable as a [Transport]
pub struct SimSigner {
    tx: mpsc::Sender<HostMessage>,
    rx: mpsc::Receiver<DeviceMessage>,
    task: JoinHandle<Vec<ProtocolRequest>>,
}

impl SimSigner {
    /// Spawn a signer task, must be called from within a tokio runtime
    pub fn spawn(cfg: SimConfig) -> Self {
        let (host_tx, host_rx) = mpsc::channel(1);
        let (dev_tx, dev_rx) = mpsc::channel(1);

        let d = Device {
            cfg,
            rx: host_rx,
            tx: dev_tx,
            pending: Envelope::default(),
            digest: Sha256::new(),
            authorized: false,
            unlocked: None,
            log: vec![],
        };

        Self {
            tx: host_tx,
            rx: dev_rx,
            task: tokio::spawn(d.run()),
        }
    }

    /// Disconnect and wait for the signer to exit, returning every request
    /// it issued
    pub async fn join(self) -> anyhow::Result<Vec<ProtocolRequest>> {
        let Self { tx, rx, task } = self;

        drop(tx);
        drop(rx);

        Ok(task.await?)
    }
}

#[async_trait]
impl Transport for SimSigner {
    async fn call(&mut self, msg: HostMessage) -> anyhow::Result<DeviceMessage> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| anyhow::anyhow!("simulated signer disconnected"))?;

        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("simulated signer disconnected"))
    }
}

/// Signer-side abort, reported to the host as a [Failure]
#[derive(Debug)]
struct Abort(FailureType, String);

impl Abort {
    fn new(code: FailureType, message: &str) -> Self {
        Self(code, message.to_string())
    }
}

type SimResult<T> = Result<T, Abort>;

fn unexpected(m: &HostMessage) -> Abort {
    Abort(
        FailureType::UnexpectedMessage,
        format!("Unexpected message {}", m.message_type()),
    )
}

fn wire_id(b: &[u8]) -> SimResult<TxId> {
    TxId::from_wire(b).map_err(|_| Abort::new(FailureType::DataError, "Invalid tx hash"))
}

/// Signer task state
struct Device {
    cfg: SimConfig,
    rx: mpsc::Receiver<HostMessage>,
    tx: mpsc::Sender<DeviceMessage>,
    /// Signature and serialized data attached to the next request
    pending: Envelope,
    /// Digest over everything acknowledged by the host
    digest: Sha256,
    authorized: bool,
    unlocked: Option<Vec<u32>>,
    log: Vec<ProtocolRequest>,
}

impl Device {
    async fn run(mut self) -> Vec<ProtocolRequest> {
        match self.session().await {
            Ok(()) => debug!("Simulated signer finished ({} requests)", self.log.len()),
            Err(Abort(code, message)) => {
                debug!("Simulated signer abort: {code} {message}");
                let _ = self.tx.send(Failure::new(code, &message).into()).await;
            }
        }

        self.log
    }

    async fn recv(&mut self) -> SimResult<HostMessage> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| Abort::new(FailureType::ProcessError, "Host disconnected"))
    }

    async fn send(&mut self, m: DeviceMessage) -> SimResult<()> {
        self.tx
            .send(m)
            .await
            .map_err(|_| Abort::new(FailureType::ProcessError, "Host disconnected"))
    }

    /// Send a request carrying the pending envelope
    async fn send_request(&mut self, r: ProtocolRequest) -> SimResult<()> {
        let env = std::mem::take(&mut self.pending);
        let mut m = r.to_tx_request(&env);

        if let Some(h) = &self.cfg.hook {
            h(&mut m);
        }

        trace!("Sim request {:?}", r);
        self.log.push(r);

        self.send(m.into()).await
    }

    async fn request(&mut self, r: ProtocolRequest) -> SimResult<HostMessage> {
        self.send_request(r).await?;
        self.recv().await
    }

    async fn session(&mut self) -> SimResult<()> {
        let sign_tx = loop {
            match self.recv().await? {
                HostMessage::DoPreauthorized(_) => {
                    if !self.cfg.preauthorized {
                        return Err(Abort::new(
                            FailureType::ProcessError,
                            "No preauthorized operation",
                        ));
                    }
                    self.authorized = true;

                    self.send(DeviceMessage::PreauthorizedRequest(PreauthorizedRequest {}))
                        .await?;
                }
                HostMessage::UnlockPath(u) => {
                    let mac = unlock_mac(&self.cfg.seed, &u.address_n);
                    if u.mac.as_ref().map_or(false, |m| m != &mac) {
                        return Err(Abort::new(FailureType::DataError, "Invalid MAC"));
                    }
                    self.unlocked = Some(u.address_n);

                    self.send(DeviceMessage::UnlockedPathRequest(UnlockedPathRequest {
                        mac: Some(mac),
                    }))
                    .await?;
                }
                HostMessage::SignTx(s) => break s,
                m => return Err(unexpected(&m)),
            }
        };

        self.sign(sign_tx).await
    }

    async fn sign(&mut self, s: SignTx) -> SimResult<()> {
        debug!(
            "Sim signing {} ({} inputs, {} outputs)",
            s.coin_name(),
            s.inputs_count,
            s.outputs_count
        );

        if s.coinjoin_request.is_some() && !self.authorized {
            return Err(Abort::new(
                FailureType::ProcessError,
                "Coinjoin not authorized",
            ));
        }

        self.digest.update(s.encode_to_vec());

        let mut origs = HashSet::new();

        // Collect inputs
        let mut inputs = Vec::with_capacity(s.inputs_count as usize);
        for i in 0..s.inputs_count {
            let input = self.input(i).await?;
            self.check_path(&input.address_n)?;

            if let (Some(h), Some(n)) = (&input.orig_hash, input.orig_index) {
                let orig = wire_id(h)?;
                if origs.insert(orig) {
                    self.prev_meta(orig).await?;
                }

                let o = self.orig_input(orig, n).await?;
                if o.prev_hash != input.prev_hash || o.prev_index != input.prev_index {
                    return Err(Abort::new(
                        FailureType::ProcessError,
                        "Input does not match original transaction",
                    ));
                }
            }

            self.digest.update(input.encode_to_vec());
            inputs.push(input);
        }

        // Collect outputs
        let mut payment_req = None;
        let mut outputs = Vec::with_capacity(s.outputs_count as usize);
        for i in 0..s.outputs_count {
            let output = self.output(i).await?;

            if output.op_return_data.is_some() && output.amount != 0 {
                return Err(Abort::new(
                    FailureType::DataError,
                    "OP_RETURN output with non-zero amount",
                ));
            }

            if let Some(r) = output.payment_req_index {
                if payment_req != Some(r) {
                    let req = self.payment_req(r).await?;
                    if req.signature.is_empty() {
                        return Err(Abort::new(
                            FailureType::DataError,
                            "Invalid signature in payment request",
                        ));
                    }

                    self.digest.update(req.encode_to_vec());
                    payment_req = Some(r);
                }
            }

            if let (Some(h), Some(n)) = (&output.orig_hash, output.orig_index) {
                let orig = wire_id(h)?;
                if origs.insert(orig) {
                    self.prev_meta(orig).await?;
                }

                let o = self.orig_output(orig, n).await?;
                if o.script_pubkey.is_none() {
                    return Err(Abort::new(
                        FailureType::DataError,
                        "Missing script in original output",
                    ));
                }
            }

            self.digest.update(output.encode_to_vec());
            outputs.push(output);
        }

        // Extra data of the transaction being signed
        let extra = match s.extra_data_len {
            Some(n) if n > 0 => self.extra_data(None, n).await?,
            _ => vec![],
        };
        self.digest.update(&extra);

        // Shielded bundle
        let n_orchard_in = s.orchard_inputs_count.unwrap_or(0);
        let n_orchard_out = s.orchard_outputs_count.unwrap_or(0);
        let orchard = n_orchard_in + n_orchard_out > 0;

        if orchard {
            if s.orchard_anchor.is_none() {
                return Err(Abort::new(FailureType::DataError, "Missing Orchard anchor"));
            }

            for i in 0..n_orchard_in {
                let o = self.orchard_input(i).await?;
                self.digest.update(o.encode_to_vec());
            }
            for i in 0..n_orchard_out {
                let o = self.orchard_output(i).await?;
                self.digest.update(o.encode_to_vec());
            }

            self.noop().await?;
        }

        if self.cfg.confirm && !self.authorized {
            self.confirm().await?;
        }

        // Verify previous transactions
        for input in &inputs {
            if input.script_type() == InputScriptType::External {
                continue;
            }

            let prev = wire_id(&input.prev_hash)?;
            let tx = self.prev_tx(prev).await?;

            if tx.legacy_txid() != prev {
                return Err(Abort::new(
                    FailureType::DataError,
                    "Encountered invalid prev_hash",
                ));
            }

            let o = tx.outputs.get(input.prev_index as usize).ok_or_else(|| {
                Abort::new(
                    FailureType::DataError,
                    "Not enough outputs in previous transaction.",
                )
            })?;
            if o.amount != input.amount {
                return Err(Abort::new(
                    FailureType::DataError,
                    "Invalid amount specified",
                ));
            }
        }

        // Sign and serialize
        let sighash: [u8; 32] = self.digest.clone().finalize().into();

        let mut header = s.version().to_le_bytes().to_vec();
        put_compact_size(&mut header, s.inputs_count as u64);
        if s.inputs_count == 0 {
            put_compact_size(&mut header, s.outputs_count as u64);
        }
        self.push_serialized(&header);

        for i in 0..s.inputs_count {
            let input = self.input(i).await?;
            if input != inputs[i as usize] {
                return Err(Abort::new(
                    FailureType::ProcessError,
                    "Transaction has changed during signing",
                ));
            }

            let (sig, script_sig) = self.sign_input(&input, &sighash, i)?;
            if let Some(sig) = sig {
                self.push_signature(SignatureType::Transparent, i, sig)
                    .await?;
            }

            let mut b = serialize_input(&input, &script_sig);
            if i + 1 == s.inputs_count {
                put_compact_size(&mut b, s.outputs_count as u64);
            }
            self.push_serialized(&b);
        }

        for i in 0..s.outputs_count {
            let output = self.output(i).await?;
            if output != outputs[i as usize] {
                return Err(Abort::new(
                    FailureType::ProcessError,
                    "Transaction has changed during signing",
                ));
            }

            let b = serialize_output(&self.cfg.seed, &output);
            self.push_serialized(&b);
        }

        let mut trailer = s.lock_time().to_le_bytes().to_vec();
        trailer.extend_from_slice(&extra);
        self.push_serialized(&trailer);

        if orchard {
            let actions = n_orchard_in.max(n_orchard_out).max(MIN_ORCHARD_ACTIONS);
            for k in 0..actions {
                let sig = orchard_signature(&self.cfg.seed, &s.z_address_n, &sighash, k);
                self.push_signature(SignatureType::OrchardSpendAuth, k, sig)
                    .await?;
            }
        }

        self.send_request(ProtocolRequest::TxFinished).await
    }

    /// Refuse restricted paths unless unlocked for this session
    fn check_path(&self, address_n: &[u32]) -> SimResult<()> {
        if address_n.first() != Some(&RESTRICTED_PURPOSE) {
            return Ok(());
        }

        match &self.unlocked {
            Some(p) if address_n.starts_with(p) => Ok(()),
            _ => Err(Abort::new(FailureType::DataError, "Forbidden key path")),
        }
    }

    fn sign_input(
        &self,
        input: &TxInput,
        sighash: &[u8],
        index: u32,
    ) -> SimResult<(Option<Vec<u8>>, Vec<u8>)> {
        if input.script_type() == InputScriptType::External {
            return Ok((None, input.script_sig.clone().unwrap_or_default()));
        }

        let seed = &self.cfg.seed;
        let sig = signature(seed, &input.address_n, sighash, index);
        let pubkey = public_key(seed, &input.address_n);

        let mut script_sig = vec![];
        match &input.multisig {
            None => {
                push_data(&mut script_sig, &with_sighash_type(&sig));
                push_data(&mut script_sig, &pubkey);
            }
            Some(m) => {
                let slot = m
                    .pubkeys
                    .iter()
                    .position(|k| k.node.public_key == pubkey)
                    .ok_or_else(|| {
                        Abort::new(
                            FailureType::DataError,
                            "Pubkey not found in multisig script",
                        )
                    })?;

                // OP_0 then signatures in cosigner order
                script_sig.push(0x00);
                for k in 0..m.pubkeys.len() {
                    let s = match k == slot {
                        true => Some(&sig),
                        false => m.signatures.get(k).filter(|s| !s.is_empty()),
                    };
                    if let Some(s) = s {
                        push_data(&mut script_sig, &with_sighash_type(s));
                    }
                }
            }
        }

        Ok((Some(sig), script_sig))
    }

    fn push_serialized(&mut self, b: &[u8]) {
        self.pending
            .serialized
            .get_or_insert_with(Vec::new)
            .extend_from_slice(b);
    }

    /// Queue a signature, flushing any already pending with a no-op request
    async fn push_signature(
        &mut self,
        kind: SignatureType,
        index: u32,
        signature: Vec<u8>,
    ) -> SimResult<()> {
        if self.pending.signature.is_some() {
            self.noop().await?;
        }

        self.pending.signature = Some(SignatureEntry {
            kind,
            index,
            signature,
        });

        Ok(())
    }

    async fn confirm(&mut self) -> SimResult<()> {
        self.send(DeviceMessage::ButtonRequest(ButtonRequest {
            code: Some(BUTTON_SIGN_TX),
            pages: None,
        }))
        .await?;

        match self.recv().await? {
            HostMessage::ButtonAck(_) => Ok(()),
            m => Err(unexpected(&m)),
        }
    }

    async fn prev_tx(&mut self, txid: TxId) -> SimResult<CachedTransaction> {
        let meta = self.prev_meta(txid).await?;

        let mut inputs = Vec::with_capacity(meta.inputs_count as usize);
        for i in 0..meta.inputs_count {
            let p = self.prev_input(txid, i).await?;
            inputs.push(CachedInput {
                prev_hash: wire_id(&p.prev_hash)?,
                prev_index: p.prev_index,
                script_sig: p.script_sig,
                sequence: p.sequence,
                decred_tree: p.decred_tree,
                amount: None,
                script_type: None,
            });
        }

        let mut outputs = Vec::with_capacity(meta.outputs_count as usize);
        for i in 0..meta.outputs_count {
            let p = self.prev_output(txid, i).await?;
            outputs.push(CachedOutput {
                amount: p.amount,
                script_pubkey: p.script_pubkey,
                decred_script_version: p.decred_script_version,
            });
        }

        let extra_data = match meta.extra_data_len {
            Some(n) if n > 0 => Some(self.extra_data(Some(txid), n).await?),
            _ => None,
        };

        Ok(CachedTransaction {
            version: meta.version,
            lock_time: meta.lock_time,
            inputs,
            outputs,
            extra_data,
            expiry: meta.expiry,
            version_group_id: meta.version_group_id,
            branch_id: meta.branch_id,
            timestamp: meta.timestamp,
        })
    }

    /// Stream extra data in chunks
    async fn extra_data(&mut self, origin: Option<TxId>, len: u32) -> SimResult<Vec<u8>> {
        let chunk_len = self.cfg.chunk_len.max(1);
        let mut data = Vec::with_capacity(len as usize);

        let mut offset = 0;
        while offset < len {
            let n = (len - offset).min(chunk_len);

            let chunk = match self
                .request(ProtocolRequest::TxExtraData {
                    origin,
                    offset,
                    len: n,
                })
                .await?
            {
                HostMessage::TxAckPrevExtraData(a) => a.tx.extra_data_chunk,
                m => return Err(unexpected(&m)),
            };

            if chunk.len() != n as usize {
                return Err(Abort::new(
                    FailureType::DataError,
                    "Invalid extra data chunk",
                ));
            }

            data.extend_from_slice(&chunk);
            offset += n;
        }

        Ok(data)
    }

    async fn input(&mut self, index: u32) -> SimResult<TxInput> {
        match self
            .request(ProtocolRequest::TxInput {
                index,
                origin: None,
            })
            .await?
        {
            HostMessage::TxAckInput(a) => Ok(a.tx.input),
            m => Err(unexpected(&m)),
        }
    }

    async fn output(&mut self, index: u32) -> SimResult<TxOutput> {
        match self
            .request(ProtocolRequest::TxOutput {
                index,
                origin: None,
            })
            .await?
        {
            HostMessage::TxAckOutput(a) => Ok(a.tx.output),
            m => Err(unexpected(&m)),
        }
    }

    async fn orig_input(&mut self, origin: TxId, index: u32) -> SimResult<TxInput> {
        match self
            .request(ProtocolRequest::TxOrigInput { index, origin })
            .await?
        {
            HostMessage::TxAckInput(a) => Ok(a.tx.input),
            m => Err(unexpected(&m)),
        }
    }

    async fn orig_output(&mut self, origin: TxId, index: u32) -> SimResult<TxOutput> {
        match self
            .request(ProtocolRequest::TxOrigOutput { index, origin })
            .await?
        {
            HostMessage::TxAckOutput(a) => Ok(a.tx.output),
            m => Err(unexpected(&m)),
        }
    }

    async fn prev_meta(&mut self, origin: TxId) -> SimResult<PrevTx> {
        match self.request(ProtocolRequest::TxMeta { origin }).await? {
            HostMessage::TxAckPrevMeta(a) => Ok(a.tx),
            m => Err(unexpected(&m)),
        }
    }

    async fn prev_input(&mut self, origin: TxId, index: u32) -> SimResult<PrevInput> {
        match self
            .request(ProtocolRequest::TxInput {
                index,
                origin: Some(origin),
            })
            .await?
        {
            HostMessage::TxAckPrevInput(a) => Ok(a.tx.input),
            m => Err(unexpected(&m)),
        }
    }

    async fn prev_output(&mut self, origin: TxId, index: u32) -> SimResult<PrevOutput> {
        match self
            .request(ProtocolRequest::TxOutput {
                index,
                origin: Some(origin),
            })
            .await?
        {
            HostMessage::TxAckPrevOutput(a) => Ok(a.tx.output),
            m => Err(unexpected(&m)),
        }
    }

    async fn payment_req(&mut self, index: u32) -> SimResult<TxAckPaymentRequest> {
        match self.request(ProtocolRequest::TxPaymentReq { index }).await? {
            HostMessage::TxAckPaymentRequest(r) => Ok(r),
            m => Err(unexpected(&m)),
        }
    }

    async fn orchard_input(&mut self, index: u32) -> SimResult<ZcashOrchardInput> {
        match self
            .request(ProtocolRequest::TxOrchardInput { index })
            .await?
        {
            HostMessage::TxAckOrchardInput(a) => Ok(a.tx.orchard_input),
            m => Err(unexpected(&m)),
        }
    }

    async fn orchard_output(&mut self, index: u32) -> SimResult<ZcashOrchardOutput> {
        match self
            .request(ProtocolRequest::TxOrchardOutput { index })
            .await?
        {
            HostMessage::TxAckOrchardOutput(a) => Ok(a.tx.orchard_output),
            m => Err(unexpected(&m)),
        }
    }

    async fn noop(&mut self) -> SimResult<()> {
        match self.request(ProtocolRequest::NoOp).await? {
            HostMessage::TxAckNoOp(_) => Ok(()),
            m => Err(unexpected(&m)),
        }
    }
}

/// Hash a tag and sequence of parts
fn tagged_hash(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(tag);
    for p in parts {
        h.update(p);
    }
    h.finalize().into()
}

fn path_bytes(path: &[u32]) -> Vec<u8> {
    path.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Compressed public key for `path` under `seed`
pub fn public_key(seed: &[u8], path: &[u32]) -> Vec<u8> {
    let mut k = vec![0x02];
    k.extend_from_slice(&tagged_hash(b"pub", &[seed, &path_bytes(path)]));
    k
}

/// Authentication code returned when unlocking `path`
pub fn unlock_mac(seed: &[u8], path: &[u32]) -> Vec<u8> {
    tagged_hash(b"unlock", &[seed, &path_bytes(path)]).to_vec()
}

/// DER encoded signature over `sighash` for input `index`
pub fn signature(seed: &[u8], path: &[u32], sighash: &[u8], index: u32) -> Vec<u8> {
    let p = path_bytes(path);
    let i = index.to_le_bytes();

    let mut r = tagged_hash(b"sig-r", &[seed, &p, sighash, &i]);
    let mut s = tagged_hash(b"sig-s", &[seed, &p, sighash, &i]);

    // Integers are positive, no padding required
    r[0] &= 0x7f;
    s[0] &= 0x7f;

    let mut der = vec![0x30, 0x44, 0x02, 0x20];
    der.extend_from_slice(&r);
    der.extend_from_slice(&[0x02, 0x20]);
    der.extend_from_slice(&s);
    der
}

/// Spend authorization signature for Orchard action `index`
pub fn orchard_signature(seed: &[u8], account: &[u32], sighash: &[u8], index: u32) -> Vec<u8> {
    let p = path_bytes(account);
    let i = index.to_le_bytes();

    let mut sig = tagged_hash(b"orchard-r", &[seed, &p, sighash, &i]).to_vec();
    sig.extend_from_slice(&tagged_hash(b"orchard-s", &[seed, &p, sighash, &i]));
    sig
}

/// Pay-to-pubkey-hash script for a public key or address
pub fn p2pkh_script(key: &[u8]) -> Vec<u8> {
    let h = tagged_hash(b"hash160", &[key]);

    let mut s = vec![0x76, 0xa9, 0x14];
    s.extend_from_slice(&h[..20]);
    s.extend_from_slice(&[0x88, 0xac]);
    s
}

fn with_sighash_type(sig: &[u8]) -> Vec<u8> {
    let mut s = sig.to_vec();
    s.push(0x01);
    s
}

fn push_data(s: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=0x4b => s.push(data.len() as u8),
        0x4c..=0xff => s.extend_from_slice(&[0x4c, data.len() as u8]),
        _ => {
            s.push(0x4d);
            s.extend_from_slice(&(data.len() as u16).to_le_bytes());
        }
    }
    s.extend_from_slice(data);
}

fn serialize_input(input: &TxInput, script_sig: &[u8]) -> Vec<u8> {
    let mut b = input.prev_hash.clone();
    b.extend_from_slice(&input.prev_index.to_le_bytes());
    put_compact_size(&mut b, script_sig.len() as u64);
    b.extend_from_slice(script_sig);
    b.extend_from_slice(&input.sequence().to_le_bytes());
    b
}

fn serialize_output(seed: &[u8], output: &TxOutput) -> Vec<u8> {
    let script = match (&output.op_return_data, &output.address, &output.script_pubkey) {
        (Some(d), _, _) => {
            let mut s = vec![0x6a];
            push_data(&mut s, d);
            s
        }
        (None, Some(a), _) => p2pkh_script(a.as_bytes()),
        (None, None, Some(s)) => s.clone(),
        (None, None, None) => p2pkh_script(&public_key(seed, &output.address_n)),
    };

    let mut b = output.amount.to_le_bytes().to_vec();
    put_compact_size(&mut b, script.len() as u64);
    b.extend_from_slice(&script);
    b
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn signatures_are_der() {
        let sig = signature(b"seed", &[HARDENED | 44, HARDENED, HARDENED, 0, 0], &[0u8; 32], 0);

        assert_eq!(sig.len(), 70);
        assert_eq!(&sig[..4], &[0x30, 0x44, 0x02, 0x20]);
        assert_eq!(&sig[36..38], &[0x02, 0x20]);
        assert!(sig[4] < 0x80 && sig[38] < 0x80);
    }

    #[test]
    fn keys_depend_on_seed_and_path() {
        let a = public_key(b"a", &[0, 1]);

        assert_eq!(a.len(), 33);
        assert_eq!(a, public_key(b"a", &[0, 1]));
        assert_ne!(a, public_key(b"b", &[0, 1]));
        assert_ne!(a, public_key(b"a", &[1, 0]));
    }
}
