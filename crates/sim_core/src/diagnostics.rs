//! Diagnostics channel for non-fatal findings.
//!
//! Data-quality problems (unknown unit, missing electorate, vote totals far
//! from 100, a district that failed to compute) never abort a run. They are
//! pushed here, returned with the result, and sorted stably so two runs over
//! the same inputs produce byte-identical lists.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{PartyId, RegionId, UnitName};

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred (kept small & deterministic).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum Subject {
    Root,
    Option(String),
    Party(PartyId),
    Unit(UnitName),
    Region(RegionId),
    /// District by its position in the pairing list.
    District(usize),
}

/// One finding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub subject: Subject,
}

/// Collected findings for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, code: &str, subject: Subject, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            code: code.to_string(),
            message: message.into(),
            subject,
        });
    }

    pub fn error(&mut self, code: &str, subject: Subject, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            code: code.to_string(),
            message: message.into(),
            subject,
        });
    }

    pub fn push(&mut self, d: Diagnostic) {
        self.0.push(d);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any finding carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    /// Deterministic order: code, then subject, then message.
    pub fn sort_stably(&mut self) {
        self.0.sort_by(|a, b| match a.code.cmp(&b.code) {
            Ordering::Equal => match a.subject.cmp(&b.subject) {
                Ordering::Equal => a.message.cmp(&b.message),
                o => o,
            },
            o => o,
        });
    }
}
