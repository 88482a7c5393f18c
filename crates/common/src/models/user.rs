use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub balance: f64,
    pub invested_amount: f64,
    pub portfolio_value: f64,
    pub join_date: NaiveDate,
    pub next_distribution: NaiveDate,
    pub monthly_return: f64,
    pub all_time_return: f64,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            balance: 25_000.0,
            invested_amount: 25_000.0,
            portfolio_value: 32_450.0,
            join_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap_or_default(),
            next_distribution: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap_or_default(),
            monthly_return: 18.7,
            all_time_return: 142.3,
        }
    }
}
