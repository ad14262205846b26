//! Engine configuration.
//!
//! Parameters for the randomized and fixed-capacity containers. Everything
//! else is parameter-free.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for every container the engine can build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parameters for skip lists.
    pub skip_list: SkipListConfig,
    /// Parameters for hash tables.
    pub hash_table: HashTableConfig,
}

impl EngineConfig {
    /// Validates every nested section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first rejected parameter.
    pub fn validate(&self) -> Result<()> {
        self.skip_list.validate()?;
        self.hash_table.validate()
    }
}

/// Skip list parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipListConfig {
    /// Number of levels a node may participate in.
    pub max_level: usize,
    /// Chance that a node linked at level `k` is also linked at level `k + 1`.
    pub promotion_probability: f64,
    /// Seed for the level generator. `None` seeds from the process.
    pub seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_level: 16,
            promotion_probability: 0.5,
            seed: None,
        }
    }
}

impl SkipListConfig {
    /// Checks that `max_level` is positive and `promotion_probability` lies
    /// strictly between 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            return Err(Error::invalid_config("skip list max_level must be at least 1"));
        }

        // Written so that NaN is rejected too.
        if !(self.promotion_probability > 0.0 && self.promotion_probability < 1.0) {
            return Err(Error::invalid_config(format!(
                "promotion probability must be in (0, 1), got {}",
                self.promotion_probability
            )));
        }

        Ok(())
    }
}

/// Hash table parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashTableConfig {
    /// Fixed number of buckets (chaining) or slots (open addressing). A prime
    /// keeps double-hashing probe sequences covering the whole table.
    pub capacity: usize,
    /// How colliding keys are placed.
    pub policy: CollisionPolicy,
}

impl Default for HashTableConfig {
    fn default() -> Self {
        Self {
            capacity: 11,
            policy: CollisionPolicy::Chaining,
        }
    }
}

impl HashTableConfig {
    /// Checks that `capacity` is positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero capacity.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::invalid_config("hash table capacity must be at least 1"));
        }

        Ok(())
    }
}

/// Collision resolution strategy of a hash table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Every bucket holds a list of entries.
    Chaining,
    /// Open addressing, stepping one slot at a time.
    LinearProbing,
    /// Open addressing, stepping by a second, key-dependent hash.
    DoubleHashing,
}

impl CollisionPolicy {
    /// Returns the kebab-case name used in configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CollisionPolicy::Chaining => "chaining",
            CollisionPolicy::LinearProbing => "linear-probing",
            CollisionPolicy::DoubleHashing => "double-hashing",
        }
    }

    /// Returns `true` for the strategies that store at most one entry per slot.
    pub const fn is_open_addressing(&self) -> bool {
        !matches!(self, CollisionPolicy::Chaining)
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "chaining" => Ok(CollisionPolicy::Chaining),
            "linear-probing" | "linear" => Ok(CollisionPolicy::LinearProbing),
            "double-hashing" | "double" => Ok(CollisionPolicy::DoubleHashing),
            other => Err(Error::invalid_config(format!(
                "unknown collision policy `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_skip_list_params() {
        let mut config = SkipListConfig::default();
        config.max_level = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        for p in [0.0, 1.0, -0.5, f64::NAN] {
            let config = SkipListConfig {
                promotion_probability: p,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "p = {p} accepted");
        }
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = HashTableConfig {
            capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("chaining".parse(), Ok(CollisionPolicy::Chaining));
        assert_eq!("Linear_Probing".parse(), Ok(CollisionPolicy::LinearProbing));
        assert_eq!("double".parse(), Ok(CollisionPolicy::DoubleHashing));
        assert!("cuckoo".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"hash_table": {"policy": "double-hashing"}}"#).unwrap();
        assert_eq!(config.hash_table.capacity, 11);
        assert_eq!(config.hash_table.policy, CollisionPolicy::DoubleHashing);
        assert_eq!(config.skip_list, SkipListConfig::default());
    }
}
