// market-core: market parameter validation and margin engine.
// every function is pure: no I/O, no clock reads, no shared state.
// callers pass block time in explicitly.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: MarketType, Timestamp, Amount
//   2.x  fees.rs: maker/taker fee pair and fee validation
//   3.x  margin.rs: IM/MM by risk step, fee margin, step size bounds
//   4.x  expiry.rs: expiry checks and settlement filters
//   5.x  market.rs: market definition, sparse patch, merge
//   6.x  validation.rs: ordered market rules, first violation wins
//   7.x  params.rs: venue defaults, per-field validators, env presets
//   8.x  decimal.rs: integrality checks and untrusted numeric input

pub mod decimal;
pub mod expiry;
pub mod fees;
pub mod margin;
pub mod market;
pub mod params;
pub mod types;
pub mod validation;

// re exports for convenience
pub use expiry::*;
pub use fees::*;
pub use margin::*;
pub use market::*;
pub use params::{Environment, Params};
pub use types::*;
pub use validation::{validate, validate_update, ValidationError};
