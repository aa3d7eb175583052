// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Coin profiles
//!
//! A [CoinProfile] decides which transaction extensions and request kinds a
//! coin supports, and how coin-specific plan fields map onto the session
//! open message. Built-in profiles are selected by name via [profile].

use bitflags::bitflags;

use hwtx_proto::tx::RequestType;

use crate::{plan::TransactionPlan, Error};

bitflags! {
    /// Transaction extensions supported by a coin
    pub struct CoinFeatures: u32 {
        /// Extra data appended to transactions
        const EXTRA_DATA = 1 << 0;
        /// Expiry height
        const EXPIRY = 1 << 1;
        /// Zcash version group id
        const VERSION_GROUP_ID = 1 << 2;
        /// Zcash consensus branch id
        const BRANCH_ID = 1 << 3;
        /// Zcash overwinter flag
        const OVERWINTERED = 1 << 4;
        /// Transaction timestamp
        const TIMESTAMP = 1 << 5;
        /// Zcash shielded Orchard actions
        const ORCHARD = 1 << 6;
        /// Decred input tree and staking tickets
        const DECRED = 1 << 7;
        /// Dash special transaction type packed into the version
        const SPECIAL_TX = 1 << 8;
    }
}

/// Coin-specific signing behaviour
pub trait CoinProfile: Send + Sync {
    /// Coin name, as sent to the signer
    fn name(&self) -> &str;

    /// Supported transaction extensions
    fn features(&self) -> CoinFeatures;

    /// Check whether the coin supports a request kind
    fn supports(&self, kind: RequestType) -> bool {
        match kind {
            RequestType::Txextradata => self.features().contains(CoinFeatures::EXTRA_DATA),
            RequestType::Txorchardinput | RequestType::Txorchardoutput => {
                self.features().contains(CoinFeatures::ORCHARD)
            }
            _ => true,
        }
    }

    /// Compute the version field sent to the signer
    fn pack_version(&self, plan: &TransactionPlan) -> u32 {
        match (plan.dash_tx_type, self.features().contains(CoinFeatures::SPECIAL_TX)) {
            (Some(t), true) => ((t as u32) << 16) | (plan.version & 0xffff),
            _ => plan.version,
        }
    }

    /// Check the plan only uses extensions supported by the coin
    fn check_plan(&self, plan: &TransactionPlan) -> Result<(), Error> {
        let f = self.features();

        let fields = [
            (plan.expiry.is_some(), CoinFeatures::EXPIRY, "expiry"),
            (
                plan.version_group_id.is_some(),
                CoinFeatures::VERSION_GROUP_ID,
                "version_group_id",
            ),
            (plan.branch_id.is_some(), CoinFeatures::BRANCH_ID, "branch_id"),
            (
                plan.overwintered.is_some(),
                CoinFeatures::OVERWINTERED,
                "overwintered",
            ),
            (plan.timestamp.is_some(), CoinFeatures::TIMESTAMP, "timestamp"),
            (plan.dash_tx_type.is_some(), CoinFeatures::SPECIAL_TX, "dash_tx_type"),
            (
                plan.decred_staking_ticket.is_some(),
                CoinFeatures::DECRED,
                "decred_staking_ticket",
            ),
            (
                plan.auxiliary.extra_data.is_some(),
                CoinFeatures::EXTRA_DATA,
                "extra_data",
            ),
            (
                plan.auxiliary.orchard.is_some(),
                CoinFeatures::ORCHARD,
                "orchard",
            ),
        ];

        for (present, feature, name) in fields {
            if present && !f.contains(feature) {
                return Err(Error::InvalidPlan(format!(
                    "{name} not supported for coin {}",
                    self.name()
                )));
            }
        }

        Ok(())
    }
}

/// Built-in coin profile
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coin {
    pub name: &'static str,
    pub features: CoinFeatures,
}

impl CoinProfile for Coin {
    fn name(&self) -> &str {
        self.name
    }

    fn features(&self) -> CoinFeatures {
        self.features
    }
}

const ZCASH: CoinFeatures = CoinFeatures::from_bits_truncate(
    CoinFeatures::EXTRA_DATA.bits()
        | CoinFeatures::EXPIRY.bits()
        | CoinFeatures::VERSION_GROUP_ID.bits()
        | CoinFeatures::BRANCH_ID.bits()
        | CoinFeatures::OVERWINTERED.bits()
        | CoinFeatures::ORCHARD.bits(),
);

const DASH: CoinFeatures = CoinFeatures::from_bits_truncate(
    CoinFeatures::EXTRA_DATA.bits() | CoinFeatures::SPECIAL_TX.bits(),
);

const DECRED: CoinFeatures =
    CoinFeatures::from_bits_truncate(CoinFeatures::EXPIRY.bits() | CoinFeatures::DECRED.bits());

/// Built-in coin profiles
pub const COINS: &[Coin] = &[
    Coin {
        name: "Bitcoin",
        features: CoinFeatures::empty(),
    },
    Coin {
        name: "Testnet",
        features: CoinFeatures::empty(),
    },
    Coin {
        name: "Regtest",
        features: CoinFeatures::empty(),
    },
    Coin {
        name: "Litecoin",
        features: CoinFeatures::empty(),
    },
    Coin {
        name: "Dash",
        features: DASH,
    },
    Coin {
        name: "Dash Testnet",
        features: DASH,
    },
    Coin {
        name: "Zcash",
        features: ZCASH,
    },
    Coin {
        name: "Zcash Testnet",
        features: ZCASH,
    },
    Coin {
        name: "Decred",
        features: DECRED,
    },
    Coin {
        name: "Decred Testnet",
        features: DECRED,
    },
    Coin {
        name: "Peercoin",
        features: CoinFeatures::TIMESTAMP,
    },
];

/// Look up a built-in coin profile by name (case insensitive)
pub fn profile(name: &str) -> Option<&'static Coin> {
    COINS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
