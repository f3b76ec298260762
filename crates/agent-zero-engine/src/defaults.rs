//! Baseline prices and demand used when the assumptions say nothing

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::commodity::{CARBON, ELECTRICITY, HYDROGEN};

/// Fallback market levels handed to [`init_world`](crate::init::init_world).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDefaults {
    /// Commodity prices in arbitrary units, including `carbon`.
    pub prices: BTreeMap<String, f64>,
    /// Demand for the traded commodities.
    pub demand: BTreeMap<String, f64>,
}

impl Default for MarketDefaults {
    fn default() -> Self {
        let prices = BTreeMap::from([
            (ELECTRICITY.to_string(), 50.0),
            (HYDROGEN.to_string(), 3.0),
            (CARBON.to_string(), 0.0),
        ]);
        let demand = BTreeMap::from([
            (ELECTRICITY.to_string(), 100.0),
            (HYDROGEN.to_string(), 10.0),
        ]);
        Self { prices, demand }
    }
}
