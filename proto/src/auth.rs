// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Authorization messages, exchanged before a signing session is opened
//!
//! A preauthorized session (eg. a coinjoin round authorized earlier) is
//! requested with [DoPreauthorized], a restricted key path with [UnlockPath].
//! Expiry and session binding of these grants are enforced by the signer.

/// Request use of a previously granted authorization
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DoPreauthorized {}

/// Signer accepted the preauthorized operation and awaits the operation request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreauthorizedRequest {}

/// Request access to a restricted key path prefix
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnlockPath {
    /// Prefix of the BIP-32 path to unlock
    #[prost(uint32, repeated, packed = "false", tag = "1")]
    pub address_n: Vec<u32>,
    /// Authentication code from a previous unlock of the same path
    #[prost(bytes = "vec", optional, tag = "2")]
    pub mac: Option<Vec<u8>>,
}

/// Signer granted access to the path and awaits the operation request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnlockedPathRequest {
    /// Authentication code to reuse the unlock without confirmation
    #[prost(bytes = "vec", optional, tag = "1")]
    pub mac: Option<Vec<u8>>,
}
