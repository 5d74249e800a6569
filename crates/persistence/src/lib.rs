#![deny(warnings)]

//! Data-store contracts the engine reads through, plus an in-memory
//! implementation used by tests and the headless CLI.
//!
//! The engine never writes: business-unit counts, market entries and
//! configuration records are owned by the surrounding web application.
//! Store unavailability is the only failure class that surfaces as a
//! hard error; everything else degrades with documented defaults.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{Sector, UnitCounts};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Identifies a corporation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CorporationId(pub i64);

/// Identifies one of the state markets (e.g. "CA", "TX").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub String);

/// One corporation's business-unit holdings in one (sector, state) market.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketEntry {
    pub corporation: CorporationId,
    pub sector: Sector,
    pub state: StateId,
    pub counts: UnitCounts,
}

/// Economic rate kinds administrators can override per sector.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RateKind {
    /// Resource units one extraction unit pulls per hour.
    ExtractionOutput,
    /// Product units one production unit outputs per hour.
    ProductionOutput,
    /// Input units (required resources or demanded products) one
    /// production unit consumes per hour.
    ResourceConsumption,
    /// Product units one retail unit consumes per hour, per demanded product.
    RetailConsumption,
    /// Product units one service unit consumes per hour, per demanded product.
    ServiceConsumption,
    /// Electricity drawn per production unit per hour (universal rule).
    ElectricityPerProduction,
    /// Electricity drawn per extraction unit per hour (universal rule).
    ElectricityPerExtraction,
    /// Flat hourly revenue of one retail unit.
    RetailRevenue,
    /// Flat hourly revenue of one service unit.
    ServiceRevenue,
    /// Flat hourly upkeep cost per unit, any kind.
    UnitUpkeep,
}

impl RateKind {
    pub const ALL: [RateKind; 10] = [
        RateKind::ExtractionOutput,
        RateKind::ProductionOutput,
        RateKind::ResourceConsumption,
        RateKind::RetailConsumption,
        RateKind::ServiceConsumption,
        RateKind::ElectricityPerProduction,
        RateKind::ElectricityPerExtraction,
        RateKind::RetailRevenue,
        RateKind::ServiceRevenue,
        RateKind::UnitUpkeep,
    ];
}

/// One administrative rate override, keyed by sector and rate kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateOverrideRecord {
    pub sector: Sector,
    pub rate: RateKind,
    pub value: f64,
}

/// Informational record of the last special dividend a corporation paid.
/// Carried through financial statements untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialDividend {
    pub amount: Decimal,
    pub per_share: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Corporation-level financial parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorporationRecord {
    pub id: CorporationId,
    pub name: String,
    /// CEO salary, already expressed per display period.
    pub ceo_salary: Decimal,
    /// Share of positive operating income paid out, in percent.
    pub dividend_percentage: Decimal,
    pub total_shares: i64,
    pub last_special_dividend: Option<SpecialDividend>,
}

/// Store failures. Unavailability is the single hard-error class the
/// engine propagates; no computation is meaningful without the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to business-unit counts.
pub trait UnitCountStore: Send + Sync {
    /// Aggregate unit counts grouped by sector across the whole world.
    /// This is the expensive query the market snapshot cache memoizes.
    fn world_unit_counts(&self) -> Result<BTreeMap<Sector, UnitCounts>, StoreError>;

    /// All market entries held by one corporation. An unknown
    /// corporation simply has no entries.
    fn corporation_entries(&self, corp: CorporationId) -> Result<Vec<MarketEntry>, StoreError>;
}

/// Read access to configuration records.
pub trait ConfigStore: Send + Sync {
    fn rate_overrides(&self) -> Result<Vec<RateOverrideRecord>, StoreError>;

    fn disabled_sectors(&self) -> Result<Vec<Sector>, StoreError>;

    fn corporation_record(
        &self,
        corp: CorporationId,
    ) -> Result<Option<CorporationRecord>, StoreError>;
}

/// In-memory store backing tests and the headless CLI. `set_offline`
/// simulates an outage so callers can exercise the hard-failure path.
#[derive(Default)]
pub struct MemoryStore {
    entries: Vec<MarketEntry>,
    overrides: Vec<RateOverrideRecord>,
    disabled: Vec<Sector>,
    corporations: BTreeMap<CorporationId, CorporationRecord>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entry(&mut self, entry: MarketEntry) {
        self.entries.push(entry);
    }

    pub fn set_rate(&mut self, sector: Sector, rate: RateKind, value: f64) {
        self.overrides.retain(|r| !(r.sector == sector && r.rate == rate));
        self.overrides.push(RateOverrideRecord { sector, rate, value });
    }

    pub fn disable_sector(&mut self, sector: Sector) {
        if !self.disabled.contains(&sector) {
            self.disabled.push(sector);
        }
    }

    pub fn upsert_corporation(&mut self, record: CorporationRecord) {
        self.corporations.insert(record.id, record);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl UnitCountStore for MemoryStore {
    fn world_unit_counts(&self) -> Result<BTreeMap<Sector, UnitCounts>, StoreError> {
        self.guard()?;
        let mut by_sector: BTreeMap<Sector, UnitCounts> = BTreeMap::new();
        for entry in &self.entries {
            by_sector
                .entry(entry.sector)
                .or_default()
                .accumulate(&entry.counts);
        }
        Ok(by_sector)
    }

    fn corporation_entries(&self, corp: CorporationId) -> Result<Vec<MarketEntry>, StoreError> {
        self.guard()?;
        Ok(self
            .entries
            .iter()
            .filter(|e| e.corporation == corp)
            .cloned()
            .collect())
    }
}

impl ConfigStore for MemoryStore {
    fn rate_overrides(&self) -> Result<Vec<RateOverrideRecord>, StoreError> {
        self.guard()?;
        Ok(self.overrides.clone())
    }

    fn disabled_sectors(&self) -> Result<Vec<Sector>, StoreError> {
        self.guard()?;
        Ok(self.disabled.clone())
    }

    fn corporation_record(
        &self,
        corp: CorporationId,
    ) -> Result<Option<CorporationRecord>, StoreError> {
        self.guard()?;
        Ok(self.corporations.get(&corp).cloned())
    }
}
