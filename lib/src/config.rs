// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Driver and session configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::serde_hex;

/// Protocol driver configuration
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Timeout for each signer response
    pub request_timeout: Duration,

    /// Timeout for signer responses following a button acknowledgement,
    /// covering on-device user confirmation
    pub user_timeout: Duration,

    /// Maximum number of round-trips in a single session
    pub max_round_trips: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            user_timeout: Duration::from_secs(60),
            max_round_trips: 1_000_000,
        }
    }
}

/// Per-session signing options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningOptions {
    /// Resume a previously authorized operation (eg. a coinjoin round)
    #[serde(default)]
    pub preauthorized: bool,

    /// Unlock a restricted key path before signing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_path: Option<UnlockPathOptions>,
}

/// Restricted path unlock
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnlockPathOptions {
    /// Path prefix to unlock
    pub address_n: Vec<u32>,

    /// Authentication code from a previous unlock
    #[serde(default, with = "serde_hex::opt", skip_serializing_if = "Option::is_none")]
    pub mac: Option<Vec<u8>>,
}
