#![deny(warnings)]

//! World market computation: per-unit supply/demand contributions,
//! whole-world aggregation and the TTL-cached price snapshot.
//!
//! The flow mirrors how the engine is invoked from the outside:
//! [`MarketCache::get`] serves a cached [`MarketSnapshot`] or lazily
//! recomputes it by aggregating every sector's business units
//! ([`compute_supply_demand`]) and quoting every resource and product
//! through `sim_econ::quote`.

mod aggregate;
mod snapshot;
mod units;

pub use aggregate::{compute_supply_demand, MarketVolumes};
pub use snapshot::{default_ttl, Clock, ManualClock, MarketCache, MarketSnapshot, SystemClock};
pub use units::SectorEconomics;
