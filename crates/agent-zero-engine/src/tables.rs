//! Assumption and policy tables
//!
//! Both tables are row-oriented and keyed by (region, sector, tech, year,
//! param). They are resolved before a run starts and then shared read-only
//! by every world state of the run.

use serde::{Deserialize, Serialize};

/// One exogenous assumption, e.g. the capex of electricity capacity in 2030.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionRow {
    pub region: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub tech: Option<String>,
    pub year: i32,
    pub param: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub uncertainty_band: Option<String>,
}

impl AssumptionRow {
    /// Shorthand for a row with no sector, unit or uncertainty band.
    pub fn new(
        region: impl Into<String>,
        tech: impl Into<String>,
        year: i32,
        param: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            region: region.into(),
            sector: None,
            tech: Some(tech.into()),
            year,
            param: param.into(),
            value,
            unit: None,
            uncertainty_band: None,
        }
    }
}

/// One policy setting, e.g. the carbon price for a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRow {
    pub region: String,
    #[serde(default)]
    pub sector: Option<String>,
    pub year: i32,
    pub policy_type: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

impl PolicyRow {
    pub fn new(
        region: impl Into<String>,
        year: i32,
        policy_type: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            region: region.into(),
            sector: None,
            year,
            policy_type: policy_type.into(),
            value,
            unit: None,
        }
    }
}

/// Ordered assumption rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssumptionsTable {
    rows: Vec<AssumptionRow>,
}

impl AssumptionsTable {
    pub fn new(rows: Vec<AssumptionRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AssumptionRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AssumptionRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First value matching `tech`, `year` and `param` exactly. Region is
    /// not part of the key.
    pub fn lookup(&self, tech: &str, year: i32, param: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| {
                row.year == year && row.param == param && row.tech.as_deref() == Some(tech)
            })
            .map(|row| row.value)
    }

    /// Like [`lookup`](Self::lookup) with a fallback when no row matches.
    pub fn value_or(&self, tech: &str, year: i32, param: &str, default: f64) -> f64 {
        self.lookup(tech, year, param).unwrap_or(default)
    }
}

impl FromIterator<AssumptionRow> for AssumptionsTable {
    fn from_iter<I: IntoIterator<Item = AssumptionRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ordered policy rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTable {
    rows: Vec<PolicyRow>,
}

impl PolicyTable {
    pub fn new(rows: Vec<PolicyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PolicyRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<PolicyRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First value for `policy_type` in `year`, any region.
    pub fn lookup(&self, year: i32, policy_type: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.year == year && row.policy_type == policy_type)
            .map(|row| row.value)
    }
}

impl FromIterator<PolicyRow> for PolicyTable {
    fn from_iter<I: IntoIterator<Item = PolicyRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
