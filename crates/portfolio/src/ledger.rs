use serde::Serialize;
use thiserror::Error;
use tracing::info;

use common::models::UserState;

/// Amount the deposit and withdraw forms start with.
pub const DEFAULT_FORM_AMOUNT: &str = "1000";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("{0:?} is not a valid amount")]
    Unparseable(String),
    #[error("amount must be a positive number")]
    NotPositive,
    #[error("deposit of ${amount} exceeds current balance of ${balance}")]
    ExceedsBalance { amount: f64, balance: f64 },
    #[error("withdrawal of ${amount} exceeds available ${available}")]
    ExceedsPortfolioValue { amount: f64, available: f64 },
}

impl LedgerError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Whether `text` is acceptable while typing an amount: digits with at
/// most one decimal point, or nothing at all.
pub fn is_amount_input(text: &str) -> bool {
    let mut seen_dot = false;
    text.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_dot => {
            seen_dot = true;
            true
        }
        _ => false,
    })
}

/// Parses a submitted amount. Only strictly positive finite values pass.
pub fn parse_amount(text: &str) -> Result<f64, LedgerError> {
    let text = text.trim();
    if text.is_empty() || !is_amount_input(text) {
        return Err(LedgerError::Unparseable(text.to_string()));
    }
    let amount: f64 = text
        .parse()
        .map_err(|_| LedgerError::Unparseable(text.to_string()))?;
    check_positive(amount)
}

fn check_positive(amount: f64) -> Result<f64, LedgerError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(LedgerError::NotPositive)
    }
}

/// Owner of the user's portfolio state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    state: UserState,
}

impl Ledger {
    pub fn new(state: UserState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &UserState {
        &self.state
    }

    /// Moves `delta` from the balance into the invested amount. Negative
    /// deltas move it back. No bounds are checked here.
    pub fn apply_investment(&mut self, delta: f64) {
        self.state.invested_amount += delta;
        self.state.balance -= delta;
    }

    pub fn update_portfolio_value(&mut self, value: f64) {
        self.state.portfolio_value = value;
    }

    pub fn can_deposit(&self, amount: f64) -> bool {
        amount <= self.state.balance
    }

    pub fn can_withdraw(&self, amount: f64) -> bool {
        amount <= self.state.portfolio_value
    }

    pub fn deposit(&mut self, amount: f64) -> Result<&UserState, LedgerError> {
        let amount = check_positive(amount)?;
        if !self.can_deposit(amount) {
            return Err(LedgerError::ExceedsBalance {
                amount,
                balance: self.state.balance,
            });
        }
        self.apply_investment(amount);
        info!("Deposited ${:.2}, invested now ${:.2}", amount, self.state.invested_amount);
        Ok(&self.state)
    }

    pub fn withdraw(&mut self, amount: f64) -> Result<&UserState, LedgerError> {
        let amount = check_positive(amount)?;
        if !self.can_withdraw(amount) {
            return Err(LedgerError::ExceedsPortfolioValue {
                amount,
                available: self.state.portfolio_value,
            });
        }
        self.apply_investment(-amount);
        info!("Withdrew ${:.2}, invested now ${:.2}", amount, self.state.invested_amount);
        Ok(&self.state)
    }

    /// Gain of the portfolio over what was invested, in percent.
    pub fn return_percentage(&self) -> f64 {
        if self.state.invested_amount == 0.0 {
            return 0.0;
        }
        (self.state.portfolio_value - self.state.invested_amount) / self.state.invested_amount
            * 100.0
    }
}
