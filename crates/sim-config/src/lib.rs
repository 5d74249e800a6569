#![deny(warnings)]

//! Per-sector economic parameters with a three-tier precedence chain
//! and an invalidatable cache.
//!
//! Every rate resolves through: administrative override (config store
//! record, merged over the built-in named-sector rule table) → per-
//! category default → hard fallback constant. A missing tier is never
//! an error; this chain is how administrators retune the economy
//! without code changes. Admin writers must call
//! [`ConfigService::invalidate`] after mutating records.

use persistence::{ConfigStore, RateKind, StoreError};
use serde::Serialize;
use sim_core::{Sector, SectorCategory};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Hard fallback constants, the last tier of the precedence chain.
pub fn fallback_rate(rate: RateKind) -> f64 {
    match rate {
        RateKind::ExtractionOutput => 3.0,
        RateKind::ProductionOutput => 2.0,
        RateKind::ResourceConsumption => 1.5,
        RateKind::RetailConsumption => 2.0,
        RateKind::ServiceConsumption => 0.5,
        RateKind::ElectricityPerProduction => 0.5,
        RateKind::ElectricityPerExtraction => 0.25,
        RateKind::RetailRevenue => 450.0,
        RateKind::ServiceRevenue => 380.0,
        RateKind::UnitUpkeep => 25.0,
    }
}

/// Per-category defaults, the middle tier. Sparse on purpose: anything
/// not listed falls through to the fallback constant.
pub fn category_default(category: SectorCategory, rate: RateKind) -> Option<f64> {
    match (category, rate) {
        (SectorCategory::Extraction, RateKind::UnitUpkeep) => Some(30.0),
        (SectorCategory::Production, RateKind::UnitUpkeep) => Some(40.0),
        (SectorCategory::Service, RateKind::UnitUpkeep) => Some(20.0),
        (SectorCategory::Service, RateKind::RetailRevenue) => Some(480.0),
        _ => None,
    }
}

/// Built-in named-sector rules, part of the override tier. Admin
/// records for the same (sector, rate) key win over these.
pub fn sector_rule(sector: Sector, rate: RateKind) -> Option<f64> {
    match (sector, rate) {
        // Defense outlets move equipment one unit per hour, both
        // retail and service.
        (Sector::Defense, RateKind::RetailConsumption) => Some(1.0),
        (Sector::Defense, RateKind::ServiceConsumption) => Some(1.0),
        // Power plants burn through both of their input resources fast.
        (Sector::Energy, RateKind::ResourceConsumption) => Some(2.0),
        (Sector::Mining, RateKind::ExtractionOutput) => Some(4.0),
        // Data centers draw double the universal electricity amount.
        (Sector::Technology, RateKind::ElectricityPerProduction) => Some(1.0),
        _ => None,
    }
}

/// The three-tier resolver, testable in isolation. Non-finite or
/// negative candidates are treated as absent.
pub fn resolve(override_value: Option<f64>, default_value: Option<f64>, fallback: f64) -> f64 {
    let usable = |v: &f64| v.is_finite() && *v >= 0.0;
    override_value
        .filter(usable)
        .or(default_value.filter(usable))
        .unwrap_or(fallback)
}

/// Fully resolved parameters for one sector.
#[derive(Clone, Debug, Serialize)]
pub struct SectorParams {
    pub enabled: bool,
    rates: BTreeMap<RateKind, f64>,
}

impl SectorParams {
    pub fn rate(&self, rate: RateKind) -> f64 {
        self.rates.get(&rate).copied().unwrap_or_else(|| fallback_rate(rate))
    }
}

/// Resolved parameters for the whole economy, built in one pass over
/// the config store and shared immutably until invalidated.
#[derive(Clone, Debug, Serialize)]
pub struct EconomyParams {
    sectors: BTreeMap<Sector, SectorParams>,
}

impl EconomyParams {
    /// Resolve all sectors against one set of admin records.
    fn build(
        overrides: &[persistence::RateOverrideRecord],
        disabled: &[Sector],
    ) -> Self {
        let mut sectors = BTreeMap::new();
        for sector in Sector::ALL {
            let mut rates = BTreeMap::new();
            for rate in RateKind::ALL {
                let admin = overrides
                    .iter()
                    .rev()
                    .find(|r| r.sector == sector && r.rate == rate)
                    .map(|r| r.value);
                let override_tier = admin.or_else(|| sector_rule(sector, rate));
                let value = resolve(
                    override_tier,
                    category_default(sector.category(), rate),
                    fallback_rate(rate),
                );
                rates.insert(rate, value);
            }
            sectors.insert(
                sector,
                SectorParams {
                    enabled: !disabled.contains(&sector),
                    rates,
                },
            );
        }
        Self { sectors }
    }

    pub fn sector(&self, sector: Sector) -> &SectorParams {
        // Every sector is materialized in `build`.
        &self.sectors[&sector]
    }

    pub fn rate(&self, sector: Sector, rate: RateKind) -> f64 {
        self.sector(sector).rate(rate)
    }

    pub fn enabled(&self, sector: Sector) -> bool {
        self.sector(sector).enabled
    }
}

/// Caching facade over a [`ConfigStore`]. Reads are served from the
/// cached [`EconomyParams`] until an admin write invalidates it; the
/// next read rebuilds synchronously. Last write wins under concurrent
/// rebuilds, and each returned `Arc` is internally consistent.
pub struct ConfigService {
    store: Arc<dyn ConfigStore>,
    cache: RwLock<Option<Arc<EconomyParams>>>,
}

impl ConfigService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(None),
        }
    }

    /// Current resolved parameters, rebuilding from the store on miss.
    pub fn params(&self) -> Result<Arc<EconomyParams>, StoreError> {
        if let Some(params) = self.cache.read().expect("config cache poisoned").as_ref() {
            return Ok(Arc::clone(params));
        }
        let overrides = self.store.rate_overrides()?;
        let disabled = self.store.disabled_sectors()?;
        let params = Arc::new(EconomyParams::build(&overrides, &disabled));
        info!(
            overrides = overrides.len(),
            disabled = disabled.len(),
            "rebuilt economy parameters"
        );
        *self.cache.write().expect("config cache poisoned") = Some(Arc::clone(&params));
        Ok(params)
    }

    /// Drop the cached parameters. Admin writers call this after
    /// mutating config records.
    pub fn invalidate(&self) {
        debug!("economy parameter cache invalidated");
        *self.cache.write().expect("config cache poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn resolver_prefers_override_then_default_then_fallback() {
        assert_eq!(resolve(Some(1.0), Some(2.0), 3.0), 1.0);
        assert_eq!(resolve(None, Some(2.0), 3.0), 2.0);
        assert_eq!(resolve(None, None, 3.0), 3.0);
    }

    #[test]
    fn resolver_skips_unusable_candidates() {
        assert_eq!(resolve(Some(f64::NAN), Some(2.0), 3.0), 2.0);
        assert_eq!(resolve(Some(-1.0), None, 3.0), 3.0);
        assert_eq!(resolve(Some(f64::INFINITY), Some(-2.0), 3.0), 3.0);
        // Zero is a legitimate override (e.g. free electricity).
        assert_eq!(resolve(Some(0.0), Some(2.0), 3.0), 0.0);
    }

    #[test]
    fn defense_consumption_comes_from_the_sector_rule_table() {
        let service = ConfigService::new(Arc::new(MemoryStore::new()));
        let params = service.params().unwrap();
        assert_eq!(params.rate(Sector::Defense, RateKind::RetailConsumption), 1.0);
        assert_eq!(params.rate(Sector::Defense, RateKind::ServiceConsumption), 1.0);
        // Unnamed sectors keep the fallback.
        assert_eq!(params.rate(Sector::Retail, RateKind::RetailConsumption), 2.0);
    }

    #[test]
    fn category_defaults_fill_the_middle_tier() {
        let service = ConfigService::new(Arc::new(MemoryStore::new()));
        let params = service.params().unwrap();
        assert_eq!(params.rate(Sector::Mining, RateKind::UnitUpkeep), 30.0);
        assert_eq!(params.rate(Sector::Energy, RateKind::UnitUpkeep), 40.0);
        assert_eq!(params.rate(Sector::Finance, RateKind::UnitUpkeep), 20.0);
    }

    #[test]
    fn admin_record_wins_over_built_in_rule() {
        let mut store = MemoryStore::new();
        store.set_rate(Sector::Defense, RateKind::RetailConsumption, 0.25);
        let service = ConfigService::new(Arc::new(store));
        let params = service.params().unwrap();
        assert_eq!(params.rate(Sector::Defense, RateKind::RetailConsumption), 0.25);
    }

    #[test]
    fn invalidate_makes_new_records_visible() {
        let store = Arc::new({
            let mut s = MemoryStore::new();
            s.set_rate(Sector::Retail, RateKind::RetailRevenue, 500.0);
            s
        });
        let service = ConfigService::new(Arc::clone(&store) as Arc<dyn ConfigStore>);
        assert_eq!(
            service.params().unwrap().rate(Sector::Retail, RateKind::RetailRevenue),
            500.0
        );

        // Cached value survives until the admin writer invalidates.
        let cached = service.params().unwrap();
        assert_eq!(cached.rate(Sector::Retail, RateKind::RetailRevenue), 500.0);
        service.invalidate();
        // Rebuild happens on next read (same store contents here).
        assert_eq!(
            service.params().unwrap().rate(Sector::Retail, RateKind::RetailRevenue),
            500.0
        );
    }

    #[test]
    fn disabled_sector_is_a_flag_not_a_removal() {
        let mut store = MemoryStore::new();
        store.disable_sector(Sector::Media);
        let service = ConfigService::new(Arc::new(store));
        let params = service.params().unwrap();
        assert!(!params.enabled(Sector::Media));
        // Rates still resolve for a disabled sector.
        assert!(params.rate(Sector::Media, RateKind::ServiceRevenue) > 0.0);
    }

    #[test]
    fn offline_store_propagates_unavailability() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let service = ConfigService::new(Arc::clone(&store) as Arc<dyn ConfigStore>);
        assert!(matches!(service.params(), Err(StoreError::Unavailable(_))));
    }

    proptest! {
        #[test]
        fn every_rate_resolves_finite_and_non_negative(
            idx in 0usize..Sector::ALL.len(),
            ridx in 0usize..RateKind::ALL.len(),
        ) {
            let service = ConfigService::new(Arc::new(MemoryStore::new()));
            let params = service.params().unwrap();
            let v = params.rate(Sector::ALL[idx], RateKind::ALL[ridx]);
            prop_assert!(v.is_finite());
            prop_assert!(v >= 0.0);
        }
    }
}
