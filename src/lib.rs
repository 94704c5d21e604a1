// Child Allowance Distributional Impact - Core Library
// Exposes the pipeline stages for use in the CLI and tests

pub mod loader;
pub mod household;
pub mod stats;
pub mod deciles;
pub mod taxprice;
pub mod report;

// Re-export commonly used types
pub use loader::{fetch_persons, read_persons, PersonRecord, DATA_URL};
pub use household::{aggregate, HouseholdUnit};
pub use deciles::{assign_by_state, assign_national};
pub use taxprice::{
    apply_tax_prices, check_revenue_neutrality, national_base, state_bases, Funding, TaxBase,
};
pub use report::{build_rows, sweep, write_csv, DecileRow, ScenarioRow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
