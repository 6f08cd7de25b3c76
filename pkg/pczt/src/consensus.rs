//! Network upgrade activation and the contextual header for new transactions

use primitives::BlockHeight;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        OVERWINTER_TX_VERSION, OVERWINTER_VERSION_GROUP_ID, POST_BLOSSOM_EXPIRY_DELTA,
        PRE_BLOSSOM_EXPIRY_DELTA, SAPLING_TX_VERSION, SAPLING_VERSION_GROUP_ID, SPROUT_TX_VERSION,
        TX_EXPIRY_HEIGHT_THRESHOLD,
    },
    Global, Pczt,
};

/// Network upgrades that change transaction format or signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum NetworkUpgrade {
    Overwinter,
    Sapling,
    Blossom,
    Heartwood,
    Canopy,
}

impl NetworkUpgrade {
    /// Newest first
    const NEWEST_FIRST: [Self; 5] = [
        Self::Canopy,
        Self::Heartwood,
        Self::Blossom,
        Self::Sapling,
        Self::Overwinter,
    ];

    /// The consensus branch this upgrade starts
    pub fn branch_id(self) -> BranchId {
        match self {
            Self::Overwinter => BranchId::Overwinter,
            Self::Sapling => BranchId::Sapling,
            Self::Blossom => BranchId::Blossom,
            Self::Heartwood => BranchId::Heartwood,
            Self::Canopy => BranchId::Canopy,
        }
    }
}

/// Consensus branch, which personalizes the signature hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum BranchId {
    Sprout = 0,
    Overwinter = 0x5ba8_1b19,
    Sapling = 0x76b8_09bb,
    Blossom = 0x2bb4_0e60,
    Heartwood = 0xf5b9_230b,
    Canopy = 0xe9ff_75a6,
}

impl From<BranchId> for u32 {
    fn from(branch: BranchId) -> Self {
        branch as u32
    }
}

/// Activation heights for each network upgrade, `None` if it never activates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ConsensusParams {
    pub overwinter: Option<BlockHeight>,
    pub sapling: Option<BlockHeight>,
    pub blossom: Option<BlockHeight>,
    pub heartwood: Option<BlockHeight>,
    pub canopy: Option<BlockHeight>,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl ConsensusParams {
    /// Zcash mainnet activation heights
    pub fn mainnet() -> Self {
        Self {
            overwinter: Some(BlockHeight::at(347_500)),
            sapling: Some(BlockHeight::at(419_200)),
            blossom: Some(BlockHeight::at(653_600)),
            heartwood: Some(BlockHeight::at(903_000)),
            canopy: Some(BlockHeight::at(1_046_400)),
        }
    }

    /// Zcash testnet activation heights
    pub fn testnet() -> Self {
        Self {
            overwinter: Some(BlockHeight::at(207_500)),
            sapling: Some(BlockHeight::at(280_000)),
            blossom: Some(BlockHeight::at(584_000)),
            heartwood: Some(BlockHeight::at(903_800)),
            canopy: Some(BlockHeight::at(1_028_500)),
        }
    }

    /// Overwinter and Sapling from height 1, later upgrades off
    pub fn regtest() -> Self {
        Self {
            overwinter: Some(BlockHeight::at(1)),
            sapling: Some(BlockHeight::at(1)),
            blossom: None,
            heartwood: None,
            canopy: None,
        }
    }

    /// The height `upgrade` activates at, if it does
    pub fn activation_height(&self, upgrade: NetworkUpgrade) -> Option<BlockHeight> {
        match upgrade {
            NetworkUpgrade::Overwinter => self.overwinter,
            NetworkUpgrade::Sapling => self.sapling,
            NetworkUpgrade::Blossom => self.blossom,
            NetworkUpgrade::Heartwood => self.heartwood,
            NetworkUpgrade::Canopy => self.canopy,
        }
    }

    /// Whether `upgrade` is active at `height`
    pub fn is_active(&self, upgrade: NetworkUpgrade, height: BlockHeight) -> bool {
        self.activation_height(upgrade)
            .is_some_and(|activation| activation <= height)
    }

    /// The newest upgrade active at `height`
    pub fn current_upgrade(&self, height: BlockHeight) -> Option<NetworkUpgrade> {
        NetworkUpgrade::NEWEST_FIRST
            .into_iter()
            .find(|upgrade| self.is_active(*upgrade, height))
    }

    /// The consensus branch at `height`, Sprout if nothing has activated
    pub fn branch_id(&self, height: BlockHeight) -> BranchId {
        self.current_upgrade(height)
            .map_or(BranchId::Sprout, NetworkUpgrade::branch_id)
    }

    /// Blocks a transaction created at `height` stays valid for
    pub fn expiry_delta(&self, height: BlockHeight) -> u32 {
        if self.is_active(NetworkUpgrade::Blossom, height) {
            POST_BLOSSOM_EXPIRY_DELTA
        } else {
            PRE_BLOSSOM_EXPIRY_DELTA
        }
    }
}

impl Pczt {
    /// An empty instance with the header a new transaction at `height` should have
    pub fn new(params: &ConsensusParams, height: BlockHeight) -> Self {
        let mut global = Global {
            tx_version: SPROUT_TX_VERSION,
            ..Global::default()
        };

        if params.is_active(NetworkUpgrade::Overwinter, height) {
            if params.is_active(NetworkUpgrade::Sapling, height) {
                global.tx_version = SAPLING_TX_VERSION;
                global.version_group_id = SAPLING_VERSION_GROUP_ID;
            } else {
                global.tx_version = OVERWINTER_TX_VERSION;
                global.version_group_id = OVERWINTER_VERSION_GROUP_ID;
            }

            global.expiry_height = height
                .saturating_add(params.expiry_delta(height))
                .as_u32()
                .min(TX_EXPIRY_HEIGHT_THRESHOLD - 1);
        }

        Self {
            global,
            spends: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_branches() {
        let params = ConsensusParams::mainnet();

        assert_eq!(params.branch_id(BlockHeight::at(1)), BranchId::Sprout);
        assert_eq!(params.branch_id(BlockHeight::at(347_500)), BranchId::Overwinter);
        assert_eq!(params.branch_id(BlockHeight::at(419_199)), BranchId::Overwinter);
        assert_eq!(params.branch_id(BlockHeight::at(419_200)), BranchId::Sapling);
        assert_eq!(params.branch_id(BlockHeight::at(653_600)), BranchId::Blossom);
        assert_eq!(params.branch_id(BlockHeight::at(903_000)), BranchId::Heartwood);
        assert_eq!(params.branch_id(BlockHeight::at(2_000_000)), BranchId::Canopy);
        assert_eq!(u32::from(BranchId::Sapling), 0x76b8_09bb);
    }

    #[test]
    fn regtest_is_sapling_from_one() {
        let params = ConsensusParams::regtest();
        assert_eq!(params.branch_id(BlockHeight::at(0)), BranchId::Sprout);
        assert_eq!(params.branch_id(BlockHeight::at(1)), BranchId::Sapling);
        assert_eq!(params.branch_id(BlockHeight::at(1_000_000)), BranchId::Sapling);
    }

    #[test]
    fn contextual_header() {
        let params = ConsensusParams::mainnet();

        let sapling = Pczt::new(&params, BlockHeight::at(500_000));
        assert_eq!(sapling.global.tx_version, SAPLING_TX_VERSION);
        assert_eq!(sapling.global.version_group_id, SAPLING_VERSION_GROUP_ID);
        assert_eq!(sapling.global.expiry_height, 500_020);

        let blossom = Pczt::new(&params, BlockHeight::at(700_000));
        assert_eq!(blossom.global.expiry_height, 700_040);

        let overwinter = Pczt::new(&params, BlockHeight::at(400_000));
        assert_eq!(overwinter.global.tx_version, OVERWINTER_TX_VERSION);
        assert_eq!(overwinter.global.version_group_id, OVERWINTER_VERSION_GROUP_ID);

        let sprout = Pczt::new(&params, BlockHeight::at(100));
        assert_eq!(sprout.global.tx_version, SPROUT_TX_VERSION);
        assert_eq!(sprout.global.version_group_id, 0);
        assert_eq!(sprout.global.expiry_height, 0);

        assert_eq!(sapling.global.value_balance, 0);
        assert_eq!(sapling.global.sapling_anchor, None);
        assert_eq!(sapling.global.accumulator(), None);
    }

    #[test]
    fn expiry_saturates_below_threshold() {
        let params = ConsensusParams::regtest();
        let pczt = Pczt::new(&params, BlockHeight::at(TX_EXPIRY_HEIGHT_THRESHOLD - 5));
        assert_eq!(pczt.global.expiry_height, TX_EXPIRY_HEIGHT_THRESHOLD - 1);
    }

    #[test]
    fn params_from_json_default_missing_to_mainnet() {
        let params: ConsensusParams = serde_json::from_str(r#"{"canopy": null}"#).unwrap();
        assert_eq!(params.sapling, Some(BlockHeight::at(419_200)));
        assert_eq!(params.canopy, None);
    }
}
