// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol driver
//!
//! [DeviceHandle::sign_tx] runs a complete signing session: optional
//! pre-session authorization, session open, then a strictly synchronous
//! request / response loop where the signer pulls the data it needs and
//! streams back signatures and serialized transaction chunks.

use std::collections::HashMap;

use log::{debug, trace, warn};
use strum::Display;

use hwtx_proto::{
    auth::{DoPreauthorized, UnlockPath},
    common::ButtonAck,
    tx::{RequestType, SignatureType},
    DeviceMessage, Envelope, HostMessage, ProtocolRequest, TxId,
};

use crate::{
    accumulator::{Accumulator, SignedTx},
    coin::{self, CoinProfile},
    compiler::Compiler,
    config::{DriverConfig, SigningOptions},
    plan::TransactionPlan,
    resolver::Resolver,
    transport::Transport,
    Error,
};

/// Handle for a connected signer.
///
/// This is generic over [Transport] types to support different
/// underlying transports and test devices
pub struct DeviceHandle<T: Transport> {
    /// Transport for signer communication
    t: T,
    /// Driver configuration
    config: DriverConfig,
}

/// Create a [DeviceHandle] with the default configuration
impl<T: Transport> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t,
            config: DriverConfig::default(),
        }
    }
}

/// Session state
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
enum SessionState {
    /// Session not yet opened
    Idle,
    /// Session open, awaiting the next signer request
    AwaitingRequest,
    /// Signer finished, output collected
    Finished,
    /// Session terminated with an error
    Aborted,
}

/// Expected session phase, advanced on the first streamed output
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
enum Phase {
    /// Signer is collecting and validating transaction data
    Collecting,
    /// Signer is streaming signatures and serialized data
    Signing,
}

impl<T: Transport> DeviceHandle<T> {
    /// Create a handle with the provided configuration
    pub fn new(t: T, config: DriverConfig) -> Self {
        Self { t, config }
    }

    /// Fetch the driver configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Release the underlying transport
    pub fn into_inner(self) -> T {
        self.t
    }

    /// Sign a transaction using the built-in profile for `plan.coin`
    pub async fn sign_tx<R: Resolver + ?Sized>(
        &mut self,
        plan: &TransactionPlan,
        resolver: &R,
        opts: &SigningOptions,
    ) -> Result<SignedTx, Error> {
        let profile = coin::profile(&plan.coin)
            .ok_or_else(|| Error::InvalidPlan(format!("unknown coin '{}'", plan.coin)))?;

        self.sign_tx_with_profile(plan, resolver, profile, opts)
            .await
    }

    /// Sign a transaction using the provided coin profile
    pub async fn sign_tx_with_profile<R: Resolver + ?Sized>(
        &mut self,
        plan: &TransactionPlan,
        resolver: &R,
        profile: &dyn CoinProfile,
        opts: &SigningOptions,
    ) -> Result<SignedTx, Error> {
        let mut s = Session {
            t: &mut self.t,
            config: &self.config,
            compiler: Compiler::new(plan, resolver, profile),
            acc: Accumulator::new(),
            state: SessionState::Idle,
            phase: Phase::Collecting,
            plan,
            required: plan.required_signatures(),
            orchard_actions: plan.orchard_actions(),
            round_trips: 0,
            buttons: 0,
            extra_data_cursors: HashMap::new(),
        };

        match s.run(opts).await {
            Ok(v) => {
                debug!(
                    "Signing complete ({} round trips, {} signatures, {} bytes)",
                    s.round_trips,
                    v.signatures.len(),
                    v.serialized.len()
                );
                Ok(v)
            }
            Err(e) => {
                s.state = SessionState::Aborted;
                warn!(
                    "Signing {} in {} phase after {} round trips: {}",
                    s.state, s.phase, s.round_trips, e
                );
                Err(e)
            }
        }
    }
}

/// State for a single signing session
struct Session<'a, T: Transport, R: Resolver + ?Sized> {
    t: &'a mut T,
    config: &'a DriverConfig,
    compiler: Compiler<'a, R>,
    acc: Accumulator,
    state: SessionState,
    phase: Phase,
    plan: &'a TransactionPlan,
    /// Inputs the signer must sign, ascending
    required: Vec<u32>,
    orchard_actions: u32,
    round_trips: usize,
    buttons: usize,
    /// End of the last extra data chunk served, per transaction
    extra_data_cursors: HashMap<Option<TxId>, u32>,
}

impl<'a, T: Transport, R: Resolver + ?Sized> Session<'a, T, R> {
    async fn run(&mut self, opts: &SigningOptions) -> Result<SignedTx, Error> {
        self.authorize(opts).await?;

        // Open the session
        let sign_tx = self.compiler.sign_tx()?;

        debug!(
            "Opening {} session ({} inputs, {} outputs)",
            self.plan.coin, sign_tx.inputs_count, sign_tx.outputs_count
        );

        let mut resp = self.exchange(HostMessage::SignTx(sign_tx)).await?;
        self.state = SessionState::AwaitingRequest;

        // Answer requests until the signer finishes
        while self.state == SessionState::AwaitingRequest {
            let req = match resp {
                DeviceMessage::TxRequest(r) => r,
                other => return Err(unexpected(other)),
            };

            let (req, envelope) = req.parse()?;

            trace!("Request {:?}", req);

            self.record(envelope)?;

            if req == ProtocolRequest::TxFinished {
                self.state = SessionState::Finished;
                break;
            }

            self.check_phase(&req)?;
            self.check_extra_data(&req)?;

            let m = match self.compiler.compile(&req)? {
                Some(m) => m,
                None => {
                    return Err(Error::ProtocolViolation(format!(
                        "no response for {}",
                        req.kind()
                    )))
                }
            };

            resp = self.exchange(m).await?;
        }

        let acc = std::mem::take(&mut self.acc);
        acc.finish(&self.required)
    }

    /// Run pre-session authorization exchanges
    async fn authorize(&mut self, opts: &SigningOptions) -> Result<(), Error> {
        if opts.preauthorized {
            debug!("Requesting preauthorized operation");

            match self
                .exchange(HostMessage::DoPreauthorized(DoPreauthorized {}))
                .await?
            {
                DeviceMessage::PreauthorizedRequest(_) => (),
                other => return Err(unexpected(other)),
            }
        }

        if let Some(u) = &opts.unlock_path {
            debug!("Unlocking path {:?}", u.address_n);

            let req = UnlockPath {
                address_n: u.address_n.clone(),
                mac: u.mac.clone(),
            };

            match self.exchange(HostMessage::UnlockPath(req)).await? {
                DeviceMessage::UnlockedPathRequest(_) => (),
                other => return Err(unexpected(other)),
            }
        }

        Ok(())
    }

    /// Record signatures and chunks carried with a request
    fn record(&mut self, envelope: Envelope) -> Result<(), Error> {
        if envelope.is_empty() {
            return Ok(());
        }

        if let Some(s) = &envelope.signature {
            let expected = match s.kind {
                SignatureType::Transparent => self.required.binary_search(&s.index).is_ok(),
                SignatureType::OrchardSpendAuth => s.index < self.orchard_actions,
            };

            if !expected {
                return Err(Error::ProtocolViolation(format!(
                    "unexpected {:?} signature for index {}",
                    s.kind, s.index
                )));
            }
        }

        self.acc.record(envelope)?;

        if self.phase == Phase::Collecting && self.acc.has_output() {
            debug!("Entering signing phase");
            self.phase = Phase::Signing;
        }

        Ok(())
    }

    /// Reject requests that only make sense before signing starts
    fn check_phase(&self, req: &ProtocolRequest) -> Result<(), Error> {
        let collecting_only = matches!(
            req,
            ProtocolRequest::TxOrigInput { .. }
                | ProtocolRequest::TxOrigOutput { .. }
                | ProtocolRequest::TxPaymentReq { .. }
        );

        match (self.phase, collecting_only) {
            (Phase::Signing, true) => Err(Error::OutOfPhase(req.kind())),
            _ => Ok(()),
        }
    }

    /// Extra data must be streamed from the start or continue the previous chunk
    fn check_extra_data(&mut self, req: &ProtocolRequest) -> Result<(), Error> {
        let (origin, offset, len) = match *req {
            ProtocolRequest::TxExtraData {
                origin,
                offset,
                len,
            } => (origin, offset, len),
            _ => return Ok(()),
        };

        let expected = self.extra_data_cursors.get(&origin).copied();
        if offset != 0 && Some(offset) != expected {
            return Err(Error::ProtocolViolation(format!(
                "{} offset {} does not continue previous chunk (expected {})",
                RequestType::Txextradata,
                offset,
                expected.unwrap_or(0)
            )));
        }

        let end = offset.checked_add(len).ok_or_else(|| {
            Error::ProtocolViolation(format!(
                "{} range overflow (offset: {offset}, len: {len})",
                RequestType::Txextradata
            ))
        })?;
        self.extra_data_cursors.insert(origin, end);

        Ok(())
    }

    /// Exchange a message with the signer, acknowledging button requests
    async fn exchange(&mut self, msg: HostMessage) -> Result<DeviceMessage, Error> {
        let mut awaiting_user = false;
        let mut msg = msg;

        loop {
            self.round_trips += 1;
            if self.round_trips > self.config.max_round_trips {
                return Err(Error::ProtocolViolation(format!(
                    "round trip limit ({}) exceeded",
                    self.config.max_round_trips
                )));
            }

            let resp = self.call(msg, awaiting_user).await?;

            match resp {
                DeviceMessage::ButtonRequest(b) => {
                    self.buttons += 1;
                    debug!("Button request {:?} ({} this session)", b.code, self.buttons);

                    // Confirmation may take a while, extend the timeout
                    msg = HostMessage::ButtonAck(ButtonAck {});
                    awaiting_user = true;
                }
                DeviceMessage::Failure(f) => {
                    return Err(Error::Remote {
                        code: f.failure_type(),
                        message: f.message.unwrap_or_default(),
                    })
                }
                _ => return Ok(resp),
            }
        }
    }

    /// Call the transport with a timeout, extended while awaiting user confirmation
    async fn call(
        &mut self,
        msg: HostMessage,
        awaiting_user: bool,
    ) -> Result<DeviceMessage, Error> {
        trace!("Send {:?}", msg.message_type());

        let timeout = match awaiting_user {
            true => self.config.user_timeout,
            false => self.config.request_timeout,
        };

        match tokio::time::timeout(timeout, self.t.call(msg)).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(Error::Transport(e)),
            Err(_e) if awaiting_user => Err(Error::UserTimeout),
            Err(_e) => Err(Error::RequestTimeout),
        }
    }
}

/// Map an out-of-flow signer message to an error
fn unexpected(m: DeviceMessage) -> Error {
    Error::UnexpectedMessage(m.message_type())
}
