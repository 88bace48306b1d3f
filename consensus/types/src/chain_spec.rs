use crate::{Epoch, ForkName, Slot};
use serde::{Deserialize, Serialize};

/// The subset of the consensus configuration needed to reason about blob availability.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    pub slots_per_epoch: u64,

    /*
     * Fork schedule
     */
    pub altair_fork_epoch: Option<Epoch>,
    pub bellatrix_fork_epoch: Option<Epoch>,
    pub capella_fork_epoch: Option<Epoch>,
    pub deneb_fork_epoch: Option<Epoch>,
    pub electra_fork_epoch: Option<Epoch>,

    /*
     * Blobs
     */
    pub max_blobs_per_block: u64,
    pub max_blobs_per_block_electra: u64,
    /// Number of epochs that peers must be able to serve blobs for.
    pub min_epochs_for_blob_sidecars_requests: u64,
}

impl ChainSpec {
    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: 32,
            altair_fork_epoch: Some(Epoch::new(74_240)),
            bellatrix_fork_epoch: Some(Epoch::new(144_896)),
            capella_fork_epoch: Some(Epoch::new(194_048)),
            deneb_fork_epoch: Some(Epoch::new(269_568)),
            electra_fork_epoch: Some(Epoch::new(364_032)),
            max_blobs_per_block: 6,
            max_blobs_per_block_electra: 9,
            min_epochs_for_blob_sidecars_requests: 4096,
        }
    }

    /// The minimal preset with no forks scheduled.
    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: 8,
            altair_fork_epoch: None,
            bellatrix_fork_epoch: None,
            capella_fork_epoch: None,
            deneb_fork_epoch: None,
            electra_fork_epoch: None,
            ..Self::mainnet()
        }
    }

    /// Returns the name of the fork which is active at `slot`.
    pub fn fork_name_at_slot(&self, slot: Slot) -> ForkName {
        self.fork_name_at_epoch(slot.epoch(self.slots_per_epoch))
    }

    /// Returns the name of the fork which is active at `epoch`.
    pub fn fork_name_at_epoch(&self, epoch: Epoch) -> ForkName {
        let activated = |fork_epoch: Option<Epoch>| fork_epoch.is_some_and(|e| epoch >= e);

        if activated(self.electra_fork_epoch) {
            ForkName::Electra
        } else if activated(self.deneb_fork_epoch) {
            ForkName::Deneb
        } else if activated(self.capella_fork_epoch) {
            ForkName::Capella
        } else if activated(self.bellatrix_fork_epoch) {
            ForkName::Bellatrix
        } else if activated(self.altair_fork_epoch) {
            ForkName::Altair
        } else {
            ForkName::Base
        }
    }

    /// The maximum number of blobs a block may commit to at `fork`.
    pub fn max_blobs_per_block(&self, fork: ForkName) -> u64 {
        if fork.electra_enabled() {
            self.max_blobs_per_block_electra
        } else if fork.deneb_enabled() {
            self.max_blobs_per_block
        } else {
            0
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_schedule_boundaries() {
        let spec = ChainSpec::mainnet();
        let deneb_slot = Epoch::new(269_568).start_slot(spec.slots_per_epoch);

        assert_eq!(spec.fork_name_at_slot(deneb_slot - 1), ForkName::Capella);
        assert_eq!(spec.fork_name_at_slot(deneb_slot), ForkName::Deneb);
        assert_eq!(spec.fork_name_at_slot(Slot::new(0)), ForkName::Base);
    }

    #[test]
    fn genesis_spec_activates_all_prior_forks() {
        let spec = ForkName::Deneb.make_genesis_spec(ChainSpec::minimal());
        assert_eq!(spec.fork_name_at_slot(Slot::new(0)), ForkName::Deneb);
        assert_eq!(spec.electra_fork_epoch, None);

        let spec = ForkName::Capella.make_genesis_spec(ChainSpec::mainnet());
        assert_eq!(spec.fork_name_at_slot(Slot::new(1_000_000_000)), ForkName::Capella);
    }

    #[test]
    fn blob_limits_per_fork() {
        let spec = ChainSpec::mainnet();
        assert_eq!(spec.max_blobs_per_block(ForkName::Capella), 0);
        assert_eq!(spec.max_blobs_per_block(ForkName::Deneb), 6);
        assert_eq!(spec.max_blobs_per_block(ForkName::Electra), 9);
    }
}
