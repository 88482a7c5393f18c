pub mod ledger;

pub use ledger::{Ledger, LedgerError, is_amount_input, parse_amount};
