// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Host-side driver for hardware signer transaction co-construction
//!
//! The host holds the complete [TransactionPlan][plan::TransactionPlan],
//! the signer pulls the pieces it needs one request at a time, in an order
//! it alone decides, and streams back signatures and serialized transaction
//! data. See [DeviceHandle::sign_tx] to run a signing session.
//!

/// Re-export `hwtx-proto` for consumers
pub use hwtx_proto::{self as proto};

mod error;
pub use error::{Error, ErrorClass};

mod serde_hex;

pub mod accumulator;
pub use accumulator::SignedTx;

pub mod coin;

pub mod compiler;

pub mod config;
pub use config::{DriverConfig, SigningOptions};

mod driver;
pub use driver::DeviceHandle;

pub mod plan;

pub mod resolver;
pub use resolver::{Resolver, TxCache};

/// Transports for signer communication
pub mod transport;
pub use transport::Transport;
