//! CSV course-plan loader.
//!
//! # CSV format
//!
//! One row per stage, in course order:
//!
//! ```csv
//! stage,resources,timeout_ms
//! obstacle,unreg-pilot|touch,120000
//! line-code,diff-pilot|color,
//! labyrinth,unreg-pilot|touch|distance|head,300000
//! ```
//!
//! **`resources`** is a `|`-separated list of capability labels
//! (see [`Capability::label`]); `none` declares an empty set.
//! **`timeout_ms`** empty means the stage gets no time budget.
//!
//! Each row's capability combination is validated at load time, so an
//! impossible plan is rejected before any stage runs.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use rally_core::{Capability, ResourceFlags};

use crate::{StageError, StageResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlanRecord {
    stage:      String,
    resources:  String,
    timeout_ms: Option<u64>,
}

// ── StagePlan ─────────────────────────────────────────────────────────────────

/// One course entry: stage name, its resource needs, optional time budget.
#[derive(Clone, Debug, PartialEq)]
pub struct StagePlan {
    pub name:      String,
    pub resources: ResourceFlags,
    pub timeout:   Option<Duration>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a course plan from a CSV file.
pub fn load_course_csv(path: &Path) -> StageResult<Vec<StagePlan>> {
    let file = std::fs::File::open(path)?;
    load_course_reader(file)
}

/// Like [`load_course_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedded plans.
pub fn load_course_reader<R: Read>(reader: R) -> StageResult<Vec<StagePlan>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut plans = Vec::new();

    for result in csv_reader.deserialize::<PlanRecord>() {
        let row = result.map_err(|e| StageError::Parse(e.to_string()))?;
        let resources = parse_resources(&row.resources)?;
        resources.validate()?;
        plans.push(StagePlan {
            name:      row.stage,
            resources,
            timeout:   row.timeout_ms.map(Duration::from_millis),
        });
    }

    Ok(plans)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_resources(s: &str) -> StageResult<ResourceFlags> {
    let s = s.trim();
    if s.is_empty() || s == "none" {
        return Ok(ResourceFlags::NONE);
    }

    let mut flags = ResourceFlags::NONE;
    for token in s.split('|') {
        let token = token.trim();
        let cap = Capability::ALL
            .into_iter()
            .find(|c| c.label() == token)
            .ok_or_else(|| {
                StageError::Parse(format!(
                    "unknown capability {token:?}: expected one of {}",
                    Capability::ALL.map(|c| c.label()).join(", ")
                ))
            })?;
        flags |= cap.flag();
    }
    Ok(flags)
}
