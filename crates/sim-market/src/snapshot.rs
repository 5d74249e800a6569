//! TTL-cached market price snapshot.

use crate::aggregate::compute_supply_demand;
use chrono::{DateTime, Duration, Utc};
use persistence::{StoreError, UnitCountStore};
use serde::Serialize;
use sim_config::ConfigService;
use sim_core::{Product, Resource};
use sim_econ::PriceQuote;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// How long a computed snapshot stays valid.
pub fn default_ttl() -> Duration {
    Duration::seconds(60)
}

/// Injectable time source so TTL behavior is testable without the
/// wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock(RwLock<DateTime<Utc>>);

impl ManualClock {
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self(RwLock::new(at))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.write().expect("clock poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.read().expect("clock poisoned")
    }
}

/// Current computed prices for every resource and product, timestamped
/// at computation. Values are derived from live unit counts and never
/// persisted as authoritative state.
#[derive(Clone, Debug, Serialize)]
pub struct MarketSnapshot {
    pub commodity_prices: BTreeMap<Resource, PriceQuote>,
    pub product_prices: BTreeMap<Product, PriceQuote>,
    pub computed_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Current price of a resource, if quoted.
    pub fn resource_price(&self, resource: Resource) -> Option<f64> {
        self.commodity_prices.get(&resource).map(|q| q.current_price)
    }

    /// Current price of a product, if quoted.
    pub fn product_price(&self, product: Product) -> Option<f64> {
        self.product_prices.get(&product).map(|q| q.current_price)
    }
}

/// Process-wide snapshot cell. Reads within the TTL return the cached
/// `Arc`; a stale read recomputes synchronously and overwrites the
/// cell. Concurrent misses may recompute redundantly; whichever write
/// lands last wins, and every returned snapshot comes from a single
/// computation pass.
pub struct MarketCache {
    units: Arc<dyn UnitCountStore>,
    config: Arc<ConfigService>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cell: RwLock<Option<Arc<MarketSnapshot>>>,
}

impl MarketCache {
    pub fn new(
        units: Arc<dyn UnitCountStore>,
        config: Arc<ConfigService>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            units,
            config,
            clock,
            ttl,
            cell: RwLock::new(None),
        }
    }

    /// The current snapshot, recomputed when absent or older than the
    /// TTL.
    pub fn get(&self) -> Result<Arc<MarketSnapshot>, StoreError> {
        let now = self.clock.now();
        let previous = {
            let cell = self.cell.read().expect("snapshot cell poisoned");
            if let Some(snapshot) = cell.as_ref() {
                if now - snapshot.computed_at < self.ttl {
                    debug!(computed_at = %snapshot.computed_at, "snapshot cache hit");
                    return Ok(Arc::clone(snapshot));
                }
            }
            cell.clone()
        };

        let fresh = Arc::new(self.recompute(now, previous.as_deref())?);
        *self.cell.write().expect("snapshot cell poisoned") = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// One full pricing pass: aggregate the world's unit counts, then
    /// quote every resource and product. The previous snapshot only
    /// feeds the displayed price change.
    fn recompute(
        &self,
        now: DateTime<Utc>,
        previous: Option<&MarketSnapshot>,
    ) -> Result<MarketSnapshot, StoreError> {
        let counts = self.units.world_unit_counts()?;
        let params = self.config.params()?;
        let volumes = compute_supply_demand(&params, &counts);

        let commodity_prices = Resource::ALL
            .into_iter()
            .map(|resource| {
                let quote = sim_econ::quote(
                    resource.base_price(),
                    resource.min_price(),
                    volumes.resource_supply[&resource],
                    volumes.resource_demand[&resource],
                    previous.and_then(|s| s.resource_price(resource)),
                );
                (resource, quote)
            })
            .collect();
        let product_prices = Product::ALL
            .into_iter()
            .map(|product| {
                let quote = sim_econ::quote(
                    product.reference_value(),
                    product.min_price(),
                    volumes.product_supply[&product],
                    volumes.product_demand[&product],
                    previous.and_then(|s| s.product_price(product)),
                );
                (product, quote)
            })
            .collect();

        info!(sectors = counts.len(), %now, "recomputed market snapshot");
        Ok(MarketSnapshot {
            commodity_prices,
            product_prices,
            computed_at: now,
        })
    }
}
