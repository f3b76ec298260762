//! Scenario patches over assumption and policy tables
//!
//! A patch selects rows by the dimensions it names (unset dimensions match
//! anything) and rewrites their values. Policy rows match `param` against
//! their `policy_type` and carry no tech, so a policy patch naming a tech
//! matches nothing.

use agent_zero_engine::{AssumptionRow, AssumptionsTable, PolicyRow, PolicyTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SimulationError, SimulationResult};

/// Which table a patch applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchTarget {
    Assumptions,
    Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Overwrite matching values; insert a row when nothing matches.
    Replace,
    /// Multiply matching values.
    Scale,
    /// Add to matching values.
    Add,
}

impl PatchOp {
    fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            PatchOp::Replace => value,
            PatchOp::Scale => current * value,
            PatchOp::Add => current + value,
        }
    }
}

/// One row of `patches.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub target: PatchTarget,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub tech: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub param: Option<String>,
    pub operation: PatchOp,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl Patch {
    pub fn new(target: PatchTarget, operation: PatchOp, value: f64) -> Self {
        Self {
            target,
            region: None,
            sector: None,
            tech: None,
            year: None,
            param: None,
            operation,
            value,
            unit: None,
            rationale: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_tech(mut self, tech: impl Into<String>) -> Self {
        self.tech = Some(tech.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    fn matches_assumption(&self, row: &AssumptionRow) -> bool {
        dim_matches(self.region.as_deref(), Some(row.region.as_str()))
            && dim_matches(self.sector.as_deref(), row.sector.as_deref())
            && dim_matches(self.tech.as_deref(), row.tech.as_deref())
            && self.year.map_or(true, |year| year == row.year)
            && dim_matches(self.param.as_deref(), Some(row.param.as_str()))
    }

    fn matches_policy(&self, row: &PolicyRow) -> bool {
        self.tech.is_none()
            && dim_matches(self.region.as_deref(), Some(row.region.as_str()))
            && dim_matches(self.sector.as_deref(), row.sector.as_deref())
            && self.year.map_or(true, |year| year == row.year)
            && dim_matches(self.param.as_deref(), Some(row.policy_type.as_str()))
    }

    fn insert_key(&self, index: usize) -> SimulationResult<(i32, &str)> {
        let year = self.year.ok_or(SimulationError::IncompletePatch {
            index,
            missing: "year",
        })?;
        let param = self
            .param
            .as_deref()
            .ok_or(SimulationError::IncompletePatch {
                index,
                missing: "param",
            })?;
        Ok((year, param))
    }
}

fn dim_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Apply patches in order, returning new tables and leaving the inputs untouched.
pub fn apply_patches(
    assumptions: &AssumptionsTable,
    policy: &PolicyTable,
    patches: &[Patch],
) -> SimulationResult<(AssumptionsTable, PolicyTable)> {
    let mut assumption_rows = assumptions.rows().to_vec();
    let mut policy_rows = policy.rows().to_vec();

    for (index, patch) in patches.iter().enumerate() {
        let matched = match patch.target {
            PatchTarget::Assumptions => {
                patch_assumptions(&mut assumption_rows, patch, index)?
            }
            PatchTarget::Policy => patch_policy(&mut policy_rows, patch, index)?,
        };
        debug!(index, target = ?patch.target, op = ?patch.operation, matched, "applied patch");
    }

    Ok((
        AssumptionsTable::new(assumption_rows),
        PolicyTable::new(policy_rows),
    ))
}

fn patch_assumptions(
    rows: &mut Vec<AssumptionRow>,
    patch: &Patch,
    index: usize,
) -> SimulationResult<usize> {
    let mut matched = 0;
    for row in rows.iter_mut().filter(|row| patch.matches_assumption(row)) {
        row.value = patch.operation.apply(row.value, patch.value);
        if patch.unit.is_some() {
            row.unit = patch.unit.clone();
        }
        matched += 1;
    }

    if matched == 0 {
        match patch.operation {
            PatchOp::Replace => {
                let (year, param) = patch.insert_key(index)?;
                rows.push(AssumptionRow {
                    region: patch.region.clone().unwrap_or_default(),
                    sector: patch.sector.clone(),
                    tech: patch.tech.clone(),
                    year,
                    param: param.to_string(),
                    value: patch.value,
                    unit: patch.unit.clone(),
                    uncertainty_band: None,
                });
            }
            PatchOp::Scale | PatchOp::Add => {
                warn!(index, op = ?patch.operation, "assumptions patch matched no rows");
            }
        }
    }
    Ok(matched)
}

fn patch_policy(rows: &mut Vec<PolicyRow>, patch: &Patch, index: usize) -> SimulationResult<usize> {
    let mut matched = 0;
    for row in rows.iter_mut().filter(|row| patch.matches_policy(row)) {
        row.value = patch.operation.apply(row.value, patch.value);
        if patch.unit.is_some() {
            row.unit = patch.unit.clone();
        }
        matched += 1;
    }

    if matched == 0 {
        match patch.operation {
            PatchOp::Replace => {
                let (year, policy_type) = patch.insert_key(index)?;
                rows.push(PolicyRow {
                    region: patch.region.clone().unwrap_or_default(),
                    sector: patch.sector.clone(),
                    year,
                    policy_type: policy_type.to_string(),
                    value: patch.value,
                    unit: patch.unit.clone(),
                });
            }
            PatchOp::Scale | PatchOp::Add => {
                warn!(index, op = ?patch.operation, "policy patch matched no rows");
            }
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> (AssumptionsTable, PolicyTable) {
        let assumptions = AssumptionsTable::new(vec![
            AssumptionRow::new("AUS", "electricity", 2025, "capex", 1000.0),
            AssumptionRow::new("AUS", "electricity", 2026, "capex", 900.0),
            AssumptionRow::new("AUS", "hydrogen", 2025, "capex", 500.0),
        ]);
        let policy = PolicyTable::new(vec![PolicyRow::new("AUS", 2025, "carbon_price", 20.0)]);
        (assumptions, policy)
    }

    #[test]
    fn test_scale_matches_every_year_when_year_unset() {
        let (assumptions, policy) = baseline();
        let patch = Patch::new(PatchTarget::Assumptions, PatchOp::Scale, 0.5)
            .with_tech("electricity")
            .with_param("capex");

        let (patched, _) = apply_patches(&assumptions, &policy, &[patch]).unwrap();
        assert_eq!(patched.lookup("electricity", 2025, "capex"), Some(500.0));
        assert_eq!(patched.lookup("electricity", 2026, "capex"), Some(450.0));
        assert_eq!(patched.lookup("hydrogen", 2025, "capex"), Some(500.0));
        // inputs are not modified
        assert_eq!(assumptions.lookup("electricity", 2025, "capex"), Some(1000.0));
    }

    #[test]
    fn test_add_to_policy() {
        let (assumptions, policy) = baseline();
        let patch = Patch::new(PatchTarget::Policy, PatchOp::Add, 15.0).with_param("carbon_price");

        let (_, patched) = apply_patches(&assumptions, &policy, &[patch]).unwrap();
        assert_eq!(patched.lookup(2025, "carbon_price"), Some(35.0));
    }

    #[test]
    fn test_policy_patch_with_tech_matches_nothing() {
        let (assumptions, policy) = baseline();
        let patch = Patch::new(PatchTarget::Policy, PatchOp::Scale, 2.0)
            .with_tech("electricity")
            .with_param("carbon_price");

        let (_, patched) = apply_patches(&assumptions, &policy, &[patch]).unwrap();
        assert_eq!(patched, policy);
    }

    #[test]
    fn test_replace_inserts_missing_row() {
        let (assumptions, policy) = baseline();
        let patches = vec![
            Patch::new(PatchTarget::Policy, PatchOp::Replace, 80.0)
                .with_region("AUS")
                .with_year(2030)
                .with_param("carbon_price"),
            Patch::new(PatchTarget::Assumptions, PatchOp::Replace, 42.0)
                .with_region("AUS")
                .with_tech("hydrogen")
                .with_year(2026)
                .with_param("demand"),
        ];

        let (a, p) = apply_patches(&assumptions, &policy, &patches).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.lookup(2030, "carbon_price"), Some(80.0));
        assert_eq!(a.len(), 4);
        assert_eq!(a.lookup("hydrogen", 2026, "demand"), Some(42.0));
    }

    #[test]
    fn test_replace_without_year_cannot_insert() {
        let (assumptions, policy) = baseline();
        let patch =
            Patch::new(PatchTarget::Assumptions, PatchOp::Replace, 1.0).with_param("unknown");

        let err = apply_patches(&assumptions, &policy, &[patch]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::IncompletePatch { index: 0, missing: "year" }
        ));
    }

    #[test]
    fn test_patches_apply_in_order() {
        let (assumptions, policy) = baseline();
        let patches = vec![
            Patch::new(PatchTarget::Policy, PatchOp::Replace, 10.0).with_param("carbon_price"),
            Patch::new(PatchTarget::Policy, PatchOp::Scale, 3.0).with_param("carbon_price"),
        ];

        let (_, p) = apply_patches(&assumptions, &policy, &patches).unwrap();
        assert_eq!(p.lookup(2025, "carbon_price"), Some(30.0));
    }

    #[test]
    fn test_parse_patch_csv_with_blank_dimensions() {
        let data = "target,region,sector,tech,year,param,operation,value,unit,rationale\n\
                    assumptions,,,electricity,,capex,scale,0.8,,cheaper panels\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let patches: Vec<Patch> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(patches.len(), 1);
        let patch = &patches[0];
        assert_eq!(patch.target, PatchTarget::Assumptions);
        assert_eq!(patch.operation, PatchOp::Scale);
        assert_eq!(patch.region, None);
        assert_eq!(patch.year, None);
        assert_eq!(patch.tech.as_deref(), Some("electricity"));
        assert_eq!(patch.rationale.as_deref(), Some("cheaper panels"));
    }
}
