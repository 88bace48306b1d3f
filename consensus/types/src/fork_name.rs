use crate::{ChainSpec, Epoch};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    strum::IntoStaticStr,
)]
#[serde(try_from = "String")]
#[serde(into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum ForkName {
    Base,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
}

impl ForkName {
    pub fn list_all() -> Vec<ForkName> {
        vec![
            ForkName::Base,
            ForkName::Altair,
            ForkName::Bellatrix,
            ForkName::Capella,
            ForkName::Deneb,
            ForkName::Electra,
        ]
    }

    pub fn latest() -> ForkName {
        ForkName::Electra
    }

    /// Set the activation epochs in the given `ChainSpec` so that the fork named by `self`
    /// is the only fork in effect from genesis.
    pub fn make_genesis_spec(&self, mut spec: ChainSpec) -> ChainSpec {
        // Assumes GENESIS_EPOCH = 0, which is safe because it's a constant.
        spec.altair_fork_epoch = (*self >= ForkName::Altair).then_some(Epoch::new(0));
        spec.bellatrix_fork_epoch = (*self >= ForkName::Bellatrix).then_some(Epoch::new(0));
        spec.capella_fork_epoch = (*self >= ForkName::Capella).then_some(Epoch::new(0));
        spec.deneb_fork_epoch = (*self >= ForkName::Deneb).then_some(Epoch::new(0));
        spec.electra_fork_epoch = (*self >= ForkName::Electra).then_some(Epoch::new(0));
        spec
    }

    /// Return the name of the fork immediately prior to the current one.
    ///
    /// If `self` is `ForkName::Base` then `None` is returned.
    pub fn previous_fork(self) -> Option<ForkName> {
        match self {
            ForkName::Base => None,
            ForkName::Altair => Some(ForkName::Base),
            ForkName::Bellatrix => Some(ForkName::Altair),
            ForkName::Capella => Some(ForkName::Bellatrix),
            ForkName::Deneb => Some(ForkName::Capella),
            ForkName::Electra => Some(ForkName::Deneb),
        }
    }

    /// Return the name of the fork immediately after the current one.
    ///
    /// If `self` is the last known fork and has no successor, `None` is returned.
    pub fn next_fork(self) -> Option<ForkName> {
        match self {
            ForkName::Base => Some(ForkName::Altair),
            ForkName::Altair => Some(ForkName::Bellatrix),
            ForkName::Bellatrix => Some(ForkName::Capella),
            ForkName::Capella => Some(ForkName::Deneb),
            ForkName::Deneb => Some(ForkName::Electra),
            ForkName::Electra => None,
        }
    }

    /// Blocks at or after Deneb carry `blob_kzg_commitments`.
    pub fn deneb_enabled(self) -> bool {
        self >= ForkName::Deneb
    }

    pub fn electra_enabled(self) -> bool {
        self >= ForkName::Electra
    }
}

impl FromStr for ForkName {
    type Err = String;

    fn from_str(fork_name: &str) -> Result<Self, String> {
        Ok(match fork_name.to_lowercase().as_ref() {
            "phase0" | "base" => ForkName::Base,
            "altair" => ForkName::Altair,
            "bellatrix" | "merge" => ForkName::Bellatrix,
            "capella" => ForkName::Capella,
            "deneb" => ForkName::Deneb,
            "electra" => ForkName::Electra,
            _ => return Err(format!("unknown fork name: {}", fork_name)),
        })
    }
}

impl Display for ForkName {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            ForkName::Base => "phase0".fmt(f),
            other => <&'static str>::from(*other).fmt(f),
        }
    }
}

impl From<ForkName> for String {
    fn from(fork: ForkName) -> String {
        fork.to_string()
    }
}

impl TryFrom<String> for ForkName {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn previous_and_next_fork_consistent() {
        assert_eq!(ForkName::latest().next_fork(), None);
        assert_eq!(ForkName::Base.previous_fork(), None);

        for (prev_fork, fork) in ForkName::list_all().into_iter().tuple_windows() {
            assert_eq!(prev_fork.next_fork(), Some(fork));
            assert_eq!(fork.previous_fork(), Some(prev_fork));
        }
    }

    #[test]
    fn fork_name_case_insensitive_parse() {
        for fork in ForkName::list_all() {
            let fork_name = fork.to_string();
            assert_eq!(fork_name.to_uppercase().parse::<ForkName>(), Ok(fork));
            assert_eq!(fork_name.to_lowercase().parse::<ForkName>(), Ok(fork));
        }
        assert_eq!(ForkName::from_str("merge"), Ok(ForkName::Bellatrix));
        assert!(ForkName::from_str("nonexistent").is_err());
    }

    #[test]
    fn deneb_enabled_only_from_deneb() {
        assert!(!ForkName::Capella.deneb_enabled());
        assert!(ForkName::Deneb.deneb_enabled());
        assert!(ForkName::Electra.deneb_enabled());
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&ForkName::Base).unwrap();
        assert_eq!(json, "\"phase0\"");
        let fork: ForkName = serde_json::from_str("\"deneb\"").unwrap();
        assert_eq!(fork, ForkName::Deneb);
    }
}
