// ABOUTME: Affiliate payout requests
// ABOUTME: pending -> approved -> paid, with rejected as a terminal branch

pub mod storage;
pub mod types;

pub use storage::PayoutStorage;
pub use types::{Payout, PayoutCreateInput, PayoutFilter, PayoutStatus};
