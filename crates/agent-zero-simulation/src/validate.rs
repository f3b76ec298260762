//! Pack validation
//!
//! Validation collects every problem it finds instead of stopping at the
//! first, so `agent-zero validate` can report them together. Structural
//! problems (missing files, unreadable CSV) surface as a single message.

use std::path::Path;

use crate::packs::{
    load_assumptions_pack, load_manifest, load_scenario_pack, AssumptionsPack, PackKind,
    ScenarioPack,
};
use crate::patches::PatchOp;

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn validate_assumptions(pack: &AssumptionsPack) -> Vec<String> {
    let mut errors = Vec::new();
    let rows = pack.assumptions.rows();

    if rows.iter().any(|row| blank(row.unit.as_deref())) {
        errors.push("assumptions table has empty unit values".to_string());
    }
    if rows.iter().any(|row| row.param.trim().is_empty()) {
        errors.push("assumptions table has empty param values".to_string());
    }
    for row in rows.iter().filter(|row| !row.value.is_finite()) {
        // an infinite max_capacity is how "no cap" is written
        if row.param != "max_capacity" || row.value.is_nan() {
            errors.push(format!(
                "assumptions value for {} {} in {} is not finite",
                row.tech.as_deref().unwrap_or("-"),
                row.param,
                row.year
            ));
        }
    }

    let policy = pack.policy.rows();
    if policy.iter().any(|row| blank(row.unit.as_deref())) {
        errors.push("policy table has empty unit values".to_string());
    }
    if policy.iter().any(|row| !row.value.is_finite()) {
        errors.push("policy table has non-finite values".to_string());
    }
    errors
}

pub fn validate_scenario(pack: &ScenarioPack) -> Vec<String> {
    let mut errors = Vec::new();
    if !pack.scenario.is_mapping() {
        errors.push("scenario.yaml must be a mapping".to_string());
    }
    if pack.patches.iter().any(|patch| blank(patch.unit.as_deref())) {
        errors.push("patches table has empty unit values".to_string());
    }
    for (index, patch) in pack.patches.iter().enumerate() {
        if !patch.value.is_finite() {
            errors.push(format!("patch {index} has a non-finite value"));
        }
        if patch.operation == PatchOp::Replace && (patch.year.is_none() || patch.param.is_none()) {
            errors.push(format!(
                "patch {index} replaces without year and param; it cannot insert rows"
            ));
        }
    }
    errors
}

/// Validate the pack at `pack_dir`, dispatching on its manifest type.
pub fn validate_pack(pack_dir: &Path) -> Vec<String> {
    let manifest = match load_manifest(pack_dir) {
        Ok(manifest) => manifest,
        Err(e) => return vec![e.to_string()],
    };
    let kind = match manifest.kind() {
        Ok(kind) => kind,
        Err(e) => return vec![e.to_string()],
    };
    match kind {
        PackKind::Assumptions => match load_assumptions_pack(pack_dir) {
            Ok(pack) => validate_assumptions(&pack),
            Err(e) => vec![e.to_string()],
        },
        PackKind::Scenario => match load_scenario_pack(pack_dir) {
            Ok(pack) => validate_scenario(&pack),
            Err(e) => vec![e.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_assumptions_pack(dir: &Path, assumptions_csv: &str) {
        fs::write(dir.join("manifest.yaml"), "type: assumptions\nhash: base1\n").unwrap();
        fs::write(dir.join("assumptions.csv"), assumptions_csv).unwrap();
        fs::write(
            dir.join("policy.csv"),
            "region,sector,year,policy_type,value,unit\nAUS,,2025,carbon_price,20,AUD/t\n",
        )
        .unwrap();
    }

    #[test]
    fn test_valid_assumptions_pack() {
        let dir = tempfile::tempdir().unwrap();
        write_assumptions_pack(
            dir.path(),
            "region,sector,tech,year,param,value,unit,uncertainty_band\n\
             AUS,,electricity,2025,capex,1000,AUD/kW,\n\
             AUS,,electricity,2025,max_capacity,inf,MW,\n",
        );
        assert_eq!(validate_pack(dir.path()), Vec::<String>::new());
    }

    #[test]
    fn test_empty_units_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_assumptions_pack(
            dir.path(),
            "region,sector,tech,year,param,value,unit,uncertainty_band\n\
             AUS,,electricity,2025,capex,1000,,\n",
        );
        assert_eq!(
            validate_pack(dir.path()),
            vec!["assumptions table has empty unit values".to_string()]
        );
    }

    #[test]
    fn test_unknown_pack_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.yaml"), "type: results\n").unwrap();
        let errors = validate_pack(dir.path());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unknown pack type 'results'"));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let errors = validate_pack(dir.path());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("manifest.yaml"));
    }

    #[test]
    fn test_empty_patch_units_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.yaml"), "type: scenario\n").unwrap();
        fs::write(dir.path().join("scenario.yaml"), "name: cheap capex\n").unwrap();
        fs::write(
            dir.path().join("patches.csv"),
            "target,region,sector,tech,year,param,operation,value,unit,rationale\n\
             assumptions,AUS,,electricity,2025,capex,replace,800,,\n",
        )
        .unwrap();

        assert_eq!(
            validate_pack(dir.path()),
            vec!["patches table has empty unit values".to_string()]
        );
    }

    #[test]
    fn test_scenario_replace_without_year() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("manifest.yaml"), "type: scenario\n").unwrap();
        fs::write(dir.path().join("scenario.yaml"), "name: cheap capex\n").unwrap();
        fs::write(
            dir.path().join("patches.csv"),
            "target,region,sector,tech,year,param,operation,value,unit,rationale\n\
             assumptions,,,electricity,,capex,scale,0.5,AUD/kW,\n\
             policy,AUS,,,,carbon_price,replace,80,AUD/t,\n",
        )
        .unwrap();

        let errors = validate_pack(dir.path());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("patch 1 replaces without year"));
    }
}
