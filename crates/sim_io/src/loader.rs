//! Loader: read the reference-data and scenario JSON files, check their shape,
//! and build the typed values the engine consumes. No network I/O.
//!
//! Pairings have exactly one accepted shape: an array of `[unitA, unitB]`
//! string pairs. Anything else is a schema error pointing at the offending
//! element; nothing is sniffed or coerced.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use sim_core::{
    ids::{PartyId, RegionId, UnitName},
    parties::{Bloc, HistoricalRelation, HistoricalTable, PartyClass, PartyInfo, PartyRegistry},
    reference::ReferenceData,
    scenario::{Pairing, Scenario},
    variables::SimulationOptions,
    votes::VoteDistribution,
};

use crate::{canonical_json, hasher, IoError, IoResult};

/// Inputs larger than this are refused before parsing.
pub const MAX_INPUT_BYTES: u64 = 16 * 1024 * 1024;

// ----------------------------- Wire-facing types -----------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParty {
    id: PartyId,
    #[serde(default)]
    name: Option<String>,
    ideology: f64,
    #[serde(default)]
    class: PartyClass,
    #[serde(default)]
    bloc: Option<Bloc>,
    /// Defaults to the row's position in the file.
    #[serde(default)]
    order_index: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnit {
    name: UnitName,
    #[serde(default)]
    electors: Option<u64>,
    #[serde(default)]
    region: Option<RegionId>,
    baseline: VoteDistribution,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReference {
    parties: Vec<RawParty>,
    #[serde(default)]
    history: Vec<HistoricalRelation>,
    #[serde(default)]
    principal_rivals: Option<(PartyId, PartyId)>,
    national_baseline: VoteDistribution,
    units: Vec<RawUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    national_votes: VoteDistribution,
    pairings: Value,
    #[serde(default)]
    options: SimulationOptions,
}

/// sha256 of the canonical bytes of each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDigests {
    pub reference_sha256: String,
    pub scenario_sha256: String,
}

/// Everything a run needs, loaded and checked.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub reference: ReferenceData,
    pub scenario: Scenario,
    pub digests: InputDigests,
}

// ----------------------------- Orchestration -----------------------------

/// Load both inputs and their digests.
pub fn load_inputs(reference_path: &Path, scenario_path: &Path) -> IoResult<LoadedInputs> {
    let ref_value = read_json_value_with_limits(reference_path)?;
    let scen_value = read_json_value_with_limits(scenario_path)?;
    let digests = InputDigests {
        reference_sha256: hasher::sha256_hex(&canonical_json::to_canonical_json_bytes(&ref_value)),
        scenario_sha256: hasher::sha256_hex(&canonical_json::to_canonical_json_bytes(&scen_value)),
    };
    let reference = reference_from_value(ref_value)?;
    let scenario = scenario_from_value(scen_value)?;
    tracing::debug!(
        parties = reference.parties.len(),
        units = reference.baselines.len(),
        pairings = scenario.pairings.len(),
        "inputs loaded"
    );
    Ok(LoadedInputs { reference, scenario, digests })
}

// ----------------------------- Builders -----------------------------

pub fn reference_from_value(v: Value) -> IoResult<ReferenceData> {
    let raw: RawReference = serde_json::from_value(v)?;

    let parties: Vec<PartyInfo> = raw
        .parties
        .into_iter()
        .enumerate()
        .map(|(i, p)| PartyInfo {
            name: p.name.unwrap_or_else(|| p.id.to_string()),
            id: p.id,
            ideology: p.ideology,
            class: p.class,
            bloc: p.bloc,
            order_index: p.order_index.unwrap_or(i as u16),
        })
        .collect();
    let registry = PartyRegistry::new(parties).map_err(|e| IoError::Invalid(format!("parties: {e}")))?;
    let history =
        HistoricalTable::try_from(raw.history).map_err(|e| IoError::Invalid(format!("history: {e}")))?;

    if let Some((a, b)) = &raw.principal_rivals {
        if a == b || !registry.contains(a) || !registry.contains(b) {
            return Err(IoError::Invalid(format!(
                "principal_rivals must name two distinct registered parties, got '{a}' and '{b}'"
            )));
        }
    }

    let mut reference = ReferenceData::new(registry, raw.national_baseline).with_history(history);
    if let Some((a, b)) = raw.principal_rivals {
        reference = reference.with_principal_rivals(a, b);
    }

    let mut seen: BTreeSet<UnitName> = BTreeSet::new();
    let mut regions: BTreeMap<RegionId, Vec<UnitName>> = BTreeMap::new();
    for (i, u) in raw.units.into_iter().enumerate() {
        if !seen.insert(u.name.clone()) {
            return Err(IoError::schema(format!("/units/{i}/name"), format!("duplicate unit '{}'", u.name)));
        }
        if let Some(region) = u.region {
            regions.entry(region).or_default().push(u.name.clone());
        }
        if let Some(n) = u.electors {
            reference.electors.insert(u.name.clone(), n);
        }
        reference.baselines.insert(u.name, u.baseline);
    }
    reference.regions = regions;
    Ok(reference)
}

pub fn scenario_from_value(v: Value) -> IoResult<Scenario> {
    let raw: RawScenario = serde_json::from_value(v)?;
    let pairings = parse_pairings(&raw.pairings)?;
    Ok(Scenario { national_votes: raw.national_votes, pairings, options: raw.options })
}

/// `[[a, b], ...]` with both entries valid unit names.
pub fn parse_pairings(v: &Value) -> IoResult<Vec<Pairing>> {
    let Value::Array(items) = v else {
        return Err(IoError::schema("/pairings", "expected an array of [unitA, unitB] pairs"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item.as_array().map(Vec::as_slice) {
            Some([Value::String(a), Value::String(b)]) => {
                let name = |s: &str, j: usize| {
                    s.parse::<UnitName>().map_err(|e| {
                        IoError::schema(format!("/pairings/{i}/{j}"), format!("bad unit name '{s}': {e}"))
                    })
                };
                Ok((name(a, 0)?, name(b, 1)?))
            }
            _ => Err(IoError::schema(
                format!("/pairings/{i}"),
                "expected a two-element array of unit names",
            )),
        })
        .collect()
}

// ----------------------------- Raw reading -----------------------------

fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Limit(format!("{} exceeds {MAX_INPUT_BYTES} bytes", path.display())));
    }
    serde_json::from_slice(&buf).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}
