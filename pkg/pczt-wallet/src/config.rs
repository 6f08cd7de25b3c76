use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Fee paid by funded transactions unless configured otherwise
pub const DEFAULT_FEE: i64 = 10_000;

/// Settings for [`fund_pczt`][crate::fund_pczt]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Value balance to leave as the miner fee
    pub fee: i64,
    /// Confirmations a note needs before it is selected
    pub min_confirmations: u32,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            fee: DEFAULT_FEE,
            min_confirmations: 1,
        }
    }
}

impl FundingConfig {
    /// Defaults, overridden by the TOML file at `path` if given, then by `PCZT_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed("PCZT_")).extract()?)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn defaults() {
        let config = FundingConfig::default();
        assert_eq!(config.fee, 10_000);
        assert_eq!(config.min_confirmations, 1);
    }

    #[test]
    fn toml_overrides_defaults() {
        let dir = TempDir::new("pczt-config").unwrap();
        let path = dir.path().join("funding.toml");
        std::fs::write(&path, "fee = 2500\n").unwrap();

        let config = FundingConfig::load(Some(&path)).unwrap();
        assert_eq!(config.fee, 2500);
        assert_eq!(config.min_confirmations, 1);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let dir = TempDir::new("pczt-config").unwrap();
        let path = dir.path().join("funding.toml");
        std::fs::write(&path, "fee = \"lots\"\n").unwrap();

        assert!(matches!(
            FundingConfig::load(Some(&path)),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = FundingConfig {
            fee: 1,
            min_confirmations: 6,
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<FundingConfig>(&text).unwrap(), config);
    }
}
