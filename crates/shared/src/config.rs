//! Configuration types for solve provisioning

use serde::{Deserialize, Serialize};
use solve_domain::{Address, Chain, Network, NetworkId};
use std::path::Path;

use crate::ProvisionError;

/// Default solver top-up target: 10 ether, in wei
pub const DEFAULT_SOLVER_MIN_BALANCE: u128 = 10_000_000_000_000_000_000;

/// One chain entry in a network manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Chain id
    pub id: u64,

    /// Display name
    pub name: String,
}

/// Solver account settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Solver account, `0x`-prefixed hex. Derived from the network id if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Balance the solver is topped up to, in wei. A number, or a decimal
    /// string for amounts beyond 64 bits.
    #[serde(default = "default_min_balance", with = "wei")]
    pub min_balance: u128,
}

fn default_min_balance() -> u128 {
    DEFAULT_SOLVER_MIN_BALANCE
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            address: None,
            min_balance: DEFAULT_SOLVER_MIN_BALANCE,
        }
    }
}

/// Wei amounts as a number when they fit in 64 bits, as a string otherwise
mod wei {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match u64::try_from(*amount) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&amount.to_string()),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WeiVisitor)
    }

    struct WeiVisitor;

    impl<'de> Visitor<'de> for WeiVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer amount of wei, or one as a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative wei amount {}", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u128, E> {
            Err(E::custom(format!(
                "wei amount {} is not an exact integer, write it as a decimal string",
                v
            )))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim()
                .replace('_', "")
                .parse()
                .map_err(|e| E::custom(format!("wei amount '{}': {}", v, e)))
        }
    }
}

/// Network manifest format (network.yaml / network.json)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkManifest {
    /// Network id
    pub network: String,

    /// Explicit eligibility flag; derived from the network id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,

    /// Chains in provisioning order
    #[serde(default)]
    pub chains: Vec<ChainConfig>,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl NetworkManifest {
    /// Load a manifest from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            other => Err(ProvisionError::Config(format!(
                "unsupported manifest extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Example manifest written by `init`
    pub fn example() -> Self {
        Self {
            network: "devnet".to_string(),
            ephemeral: Some(true),
            chains: vec![
                ChainConfig {
                    id: 1655,
                    name: "mock_l1".to_string(),
                },
                ChainConfig {
                    id: 1656,
                    name: "mock_l2".to_string(),
                },
            ],
            solver: SolverConfig::default(),
        }
    }

    /// Eligibility: the explicit flag wins, otherwise the id convention
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
            .unwrap_or_else(|| NetworkId::new(self.network.as_str()).is_ephemeral_by_convention())
    }

    /// Parsed solver address, if one is configured
    pub fn solver_address(&self) -> crate::Result<Option<Address>> {
        let Some(raw) = &self.solver.address else {
            return Ok(None);
        };

        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(digits).map_err(|e| {
            ProvisionError::Config(format!("solver address '{}': {}", raw, e))
        })?;
        Address::from_slice(&bytes)
            .map(Some)
            .ok_or_else(|| {
                ProvisionError::Config(format!("solver address '{}' is not 20 bytes", raw))
            })
    }

    /// Build the validated domain Network
    pub fn to_network(&self) -> crate::Result<Network> {
        let chains = self
            .chains
            .iter()
            .map(|c| Chain::new(c.id, c.name.as_str()))
            .collect();
        Ok(Network::new(self.network.as_str(), self.is_ephemeral(), chains)?)
    }
}
