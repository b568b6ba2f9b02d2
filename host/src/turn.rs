//! Per-session movement budget installed by the external turn engine.
//!
//! The host never decides whose turn it is; it only enforces the budget it
//! was handed. Tokens without an active budget move unconstrained, which is
//! how out-of-combat play works.

#[cfg(test)]
#[path = "turn_test.rs"]
mod turn_test;

use tabletop::world::TokenId;

/// Movement budget for the token whose turn it is, in feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnBudget {
    pub token_id: TokenId,
    pub remaining_ft: f64,
    pub max_ft: f64,
}

/// The session's active turn, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnState {
    budget: Option<TurnBudget>,
}

impl TurnState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh budget, replacing any previous turn.
    pub fn set(&mut self, token_id: TokenId, max_ft: f64) {
        let max_ft = max_ft.max(0.0);
        self.budget = Some(TurnBudget { token_id, remaining_ft: max_ft, max_ft });
    }

    /// End the active turn.
    pub fn clear(&mut self) {
        self.budget = None;
    }

    /// Remaining movement for a token. Unbudgeted tokens are unconstrained.
    #[must_use]
    pub fn remaining_for(&self, token_id: TokenId) -> f64 {
        match self.budget {
            Some(budget) if budget.token_id == token_id => budget.remaining_ft,
            _ => f64::INFINITY,
        }
    }

    /// Debit an accepted move and return the new remainder, or `None` when
    /// the token is not the one on turn.
    pub fn debit(&mut self, token_id: TokenId, cost_ft: f64) -> Option<f64> {
        let budget = self.budget.as_mut().filter(|b| b.token_id == token_id)?;
        budget.remaining_ft = (budget.remaining_ft - cost_ft).max(0.0);
        Some(budget.remaining_ft)
    }

    /// The active budget, if any.
    #[must_use]
    pub fn active(&self) -> Option<TurnBudget> {
        self.budget
    }
}
