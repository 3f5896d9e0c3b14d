//! Batch unification plans.
//!
//! A plan is a TOML file listing operations to apply in order:
//!
//! ```toml
//! [[op]]
//! kind = "unify"
//! from = "zero-hour"
//! file = "GameEngine/Include/Common/crc.h"
//!
//! [[op]]
//! kind = "move"
//! from = "generals"
//! file = "GameEngine/Source/Common/Old.cpp"
//! to_file = "GameEngine/Source/Common/New.cpp"
//! ```
//!
//! The destination is always Core. `to_file` defaults to `file`.

use std::path::Path;

use serde::Deserialize;

use super::{unify_file, unify_move_file, Layout, Tree};
use crate::error::{DevtoolsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// File exists in both variants.
    Unify,
    /// File exists in one variant only.
    Move,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanOp {
    pub kind: OpKind,
    pub from: Tree,
    pub file: String,
    #[serde(default)]
    pub to_file: Option<String>,
}

impl PlanOp {
    #[must_use]
    pub fn destination(&self) -> &str {
        self.to_file.as_deref().unwrap_or(&self.file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Plan {
    #[serde(default, rename = "op")]
    pub ops: Vec<PlanOp>,
}

/// Parse a plan file.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|e| DevtoolsError::Config(format!("invalid plan {}: {e}", path.display())))
}

/// Apply every operation in order. Stops at the first failure.
/// Returns the number of operations applied.
pub fn run_plan(layout: &Layout, plan: &Plan) -> Result<usize> {
    for (index, op) in plan.ops.iter().enumerate() {
        let result = match op.kind {
            OpKind::Unify => unify_file(layout, op.from, &op.file, Tree::Core, op.destination()),
            OpKind::Move => {
                unify_move_file(layout, op.from, &op.file, Tree::Core, op.destination())
            }
        };
        if let Err(e) = result {
            tracing::error!(op = index + 1, file = %op.file, error = %e, "plan step failed");
            return Err(e);
        }
    }
    Ok(plan.ops.len())
}
