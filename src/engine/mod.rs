//! Pure computation engine(s) for overhead, horizon, entry and exit planning.
//!
//! Every function is deterministic and side-effect free apart from the
//! [`IdGenerator`](crate::ids::IdGenerator) passed to exit-order creation.

pub mod entry;
pub mod entry_exit;
pub mod exit;
pub mod horizon;
pub mod overhead;
pub mod profit;
pub mod sigmoid;

pub use entry::EntryPlanner;
pub use entry_exit::EntryExitPlanner;
pub use exit::ExitPlanner;
pub use horizon::HorizonEngine;
pub use overhead::OverheadModel;
pub use profit::{gross_profit, prorated_buy_fee, ProfitCalculator};
