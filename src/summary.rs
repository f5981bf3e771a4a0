use std::collections::HashMap;
use std::io::{self, Write};

use crate::operation::{Action, RunResult, Status};

/// Latest outcome per operation, in first-run order.
///
/// An operation appears in the order at most once; re-running it only
/// replaces its status.
#[derive(Debug, Default)]
pub struct Summary {
    order: Vec<Action>,
    latest: HashMap<Action, RunResult>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: RunResult) {
        if !self.latest.contains_key(&result.action) {
            self.order.push(result.action);
        }
        self.latest.insert(result.action, result);
    }

    /// Forget everything. Only a full cleanup does this.
    pub fn reset(&mut self) {
        self.order.clear();
        self.latest.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(operation, status)` pairs in first-run order.
    pub fn entries(&self) -> Vec<(Action, Status)> {
        self.order
            .iter()
            .filter_map(|action| self.latest.get(action).map(|r| (*action, r.status)))
            .collect()
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (action, status) in self.entries() {
            writeln!(out, "  {}: {}", action.name(), status.label())?;
        }
        Ok(())
    }
}
