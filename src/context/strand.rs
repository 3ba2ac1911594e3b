//! Main-strand detection.
//!
//! A call belongs to the "main strand" when it originates from the
//! designated entry-point function of the calling unit. Which name is
//! compared (the caller's parent function or the caller itself) is a single
//! configured rule, applied the same way for every dispatch.

use serde::{Deserialize, Serialize};

use crate::context::caller::CallingUnit;

pub const DEFAULT_ENTRY_POINT: &str = "onMessage";

/// Which of the caller's names is compared with the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MainStrandRule {
    /// Compare the function that started the calling unit.
    #[default]
    ParentFunction,
    /// Compare the calling unit's own name.
    CurrentTask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainStrandDetector {
    rule: MainStrandRule,
    entry_point: String,
}

impl MainStrandDetector {
    pub fn new(rule: MainStrandRule, entry_point: impl Into<String>) -> Self {
        Self {
            rule,
            entry_point: entry_point.into(),
        }
    }

    pub fn rule(&self) -> MainStrandRule {
        self.rule
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Returns true if the caller is on the main strand. Exact, case-sensitive match.
    pub fn is_main_strand<U: CallingUnit + ?Sized>(&self, unit: &U) -> bool {
        let name = match self.rule {
            MainStrandRule::ParentFunction => unit.parent_function_name(),
            MainStrandRule::CurrentTask => unit.name(),
        };
        name == Some(self.entry_point.as_str())
    }
}

impl Default for MainStrandDetector {
    fn default() -> Self {
        Self::new(MainStrandRule::default(), DEFAULT_ENTRY_POINT)
    }
}
