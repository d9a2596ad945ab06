// Scenario Replay - apply a JSON list of account operations to a registry
//
// Operations address accounts by name. A rejected operation is recorded in
// the report and replay moves on, unless the caller asked to stop early.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::entities::{Account, AccountRegistry};
use crate::error::{RegistryResult, ScenarioError};

// ============================================================================
// SCENARIO INPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Open { name: String, balance: f64 },
    Deposit { account: String, amount: f64 },
    Withdraw { account: String, amount: f64 },
    Transfer {
        from: String,
        to: String,
        amount: f64,
    },
}

impl Operation {
    fn apply(&self, registry: &AccountRegistry) -> RegistryResult<()> {
        match self {
            Operation::Open { name, balance } => {
                registry.open(name, *balance)?;
            }
            Operation::Deposit { account, amount } => {
                registry.deposit(account, *amount)?;
            }
            Operation::Withdraw { account, amount } => {
                registry.withdraw(account, *amount)?;
            }
            Operation::Transfer { from, to, amount } => {
                registry.transfer(from, to, *amount)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub operations: Vec<Operation>,
}

impl Scenario {
    pub fn from_json(input: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let input = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&input)
    }

    /// Apply every operation in order to `registry`.
    pub fn replay(&self, registry: &AccountRegistry, stop_on_error: bool) -> ReplayReport {
        let mut applied = 0;
        let mut rejections = Vec::new();
        let mut stopped_early = false;

        for (step, operation) in self.operations.iter().enumerate() {
            match operation.apply(registry) {
                Ok(()) => applied += 1,
                Err(err) => {
                    warn!(step, ?operation, %err, "operation rejected");
                    rejections.push(Rejection {
                        step,
                        operation: operation.clone(),
                        message: err.to_string(),
                    });
                    if stop_on_error {
                        stopped_early = step + 1 < self.operations.len();
                        break;
                    }
                }
            }
        }

        info!(
            applied,
            rejected = rejections.len(),
            stopped_early,
            "scenario replayed"
        );

        ReplayReport {
            applied,
            rejections,
            stopped_early,
            total_balance: registry.total_balance(),
            accounts: registry.all_accounts(),
            replayed_at: Utc::now(),
        }
    }
}

// ============================================================================
// REPLAY REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub operation: Operation,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejections: Vec<Rejection>,
    pub stopped_early: bool,
    pub total_balance: f64,
    pub accounts: Vec<Account>,
    pub replayed_at: DateTime<Utc>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Replayed {} operations ({} rejected), {} accounts holding {:.2}",
            self.applied + self.rejections.len(),
            self.rejections.len(),
            self.accounts.len(),
            self.total_balance
        )
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("{:<24} {:>14}", "ACCOUNT", "BALANCE")];
        for account in &self.accounts {
            let row = format!("{:<24} {:>14.2}", account.name(), account.balance());
            lines.push(row);
        }
        lines.push(format!("{:<24} {:>14.2}", "TOTAL", self.total_balance));

        if !self.rejections.is_empty() {
            lines.push(String::new());
            lines.push("Rejected operations:".to_string());
            for rejection in &self.rejections {
                lines.push(format!("  #{} {}", rejection.step, rejection.message));
            }
        }
        if self.stopped_early {
            lines.push(String::new());
            lines.push("Replay stopped at the first rejection.".to_string());
        }

        lines.push(String::new());
        lines.push(self.summary());
        lines.join("\n") + "\n"
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
