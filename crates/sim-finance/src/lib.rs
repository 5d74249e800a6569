#![deny(warnings)]

//! Corporation income statements derived from live holdings and the
//! current market snapshot.
//!
//! Hourly unit economics run in `f64` against snapshot prices; the
//! statement itself is carried in `Decimal` so the ordering-sensitive
//! deductions (CEO salary before dividends, dividends only from
//! positive income) hold exactly. Nothing here is persisted: the
//! source of truth is always unit counts plus the price snapshot, and
//! every request recomputes from scratch.

use persistence::{
    ConfigStore, CorporationId, CorporationRecord, RateKind, SpecialDividend, StoreError,
    UnitCountStore,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sim_config::{ConfigService, EconomyParams};
use sim_core::{
    extractable_resources, produced_product, product_demands, required_resources, Product, Sector,
    UnitCounts, UnitKind,
};
use sim_market::{MarketCache, MarketSnapshot};
use std::sync::Arc;
use tracing::debug;

/// Hours in the reporting window hourly figures are projected onto.
pub const DISPLAY_PERIOD_HOURS: i64 = 96;

/// Full derived income statement for one corporation. Recomputed on
/// every request, never stored.
#[derive(Clone, Debug, Serialize)]
pub struct CorporationFinancials {
    pub corporation: CorporationId,
    pub name: String,
    pub hourly_revenue: Decimal,
    pub hourly_costs: Decimal,
    pub hourly_profit: Decimal,
    /// Hourly profit projected over the display period.
    pub gross_profit: Decimal,
    /// CEO salary per display period.
    pub ceo_salary: Decimal,
    pub operating_income: Decimal,
    pub dividend_payout: Decimal,
    /// Retained earnings.
    pub net_income: Decimal,
    pub dividend_per_share: Decimal,
    /// Historical, carried through without recomputation.
    pub last_special_dividend: Option<SpecialDividend>,
}

impl CorporationFinancials {
    fn zeroed(corp: CorporationId, record: &CorporationRecord) -> Self {
        Self {
            corporation: corp,
            name: record.name.clone(),
            hourly_revenue: Decimal::ZERO,
            hourly_costs: Decimal::ZERO,
            hourly_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            ceo_salary: Decimal::ZERO,
            operating_income: Decimal::ZERO,
            dividend_payout: Decimal::ZERO,
            net_income: Decimal::ZERO,
            dividend_per_share: Decimal::ZERO,
            last_special_dividend: record.last_special_dividend.clone(),
        }
    }
}

/// The ordered tail of the statement: salary, dividend guard, retained
/// earnings, per-share value. Isolated so the invariants are testable
/// without a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncomeStatement {
    pub operating_income: Decimal,
    pub dividend_payout: Decimal,
    pub net_income: Decimal,
    pub dividend_per_share: Decimal,
}

/// Derive the statement tail from period gross profit.
///
/// `operating_income = gross_profit - ceo_salary`; dividends are paid
/// only from positive operating income, never from a loss;
/// `net_income = operating_income - dividend_payout`.
pub fn derive_income_statement(
    gross_profit: Decimal,
    ceo_salary: Decimal,
    dividend_percentage: Decimal,
    total_shares: i64,
) -> IncomeStatement {
    let operating_income = gross_profit - ceo_salary;
    let dividend_payout = if operating_income > Decimal::ZERO {
        operating_income * dividend_percentage / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let net_income = operating_income - dividend_payout;
    let dividend_per_share = if total_shares > 0 && dividend_payout > Decimal::ZERO {
        dividend_payout / Decimal::from(total_shares)
    } else {
        Decimal::ZERO
    };
    IncomeStatement {
        operating_income,
        dividend_payout,
        net_income,
        dividend_per_share,
    }
}

/// Hourly revenue and cost of one market entry's units, priced from
/// the snapshot. A price missing from the snapshot contributes zero to
/// that leg; computation never fails on partial market data.
pub fn holding_hourly(
    params: &EconomyParams,
    sector: Sector,
    counts: &UnitCounts,
    snapshot: &MarketSnapshot,
) -> (f64, f64) {
    if !params.enabled(sector) || counts.is_empty() {
        return (0.0, 0.0);
    }
    let rate = |kind| params.rate(sector, kind);
    let resource_price = |r| snapshot.resource_price(r).unwrap_or(0.0);
    let product_price = |p| snapshot.product_price(p).unwrap_or(0.0);

    let mut revenue = 0.0;
    let mut costs = counts.total() as f64 * rate(RateKind::UnitUpkeep);

    let extraction = counts.extraction as f64;
    if extraction > 0.0 {
        let per_unit: f64 = extractable_resources(sector)
            .iter()
            .map(|&r| resource_price(r))
            .sum::<f64>()
            * rate(RateKind::ExtractionOutput);
        revenue += extraction * per_unit;
        costs += extraction
            * rate(RateKind::ElectricityPerExtraction)
            * product_price(Product::Electricity);
    }

    let production = counts.production as f64;
    if production > 0.0 {
        if let Some(product) = produced_product(sector) {
            revenue += production * rate(RateKind::ProductionOutput) * product_price(product);
        }
        let resource_inputs: f64 = required_resources(sector)
            .iter()
            .map(|&r| resource_price(r))
            .sum();
        let product_inputs: f64 = product_demands(sector, UnitKind::Production)
            .iter()
            .filter(|&&p| p != Product::Electricity)
            .map(|&p| product_price(p))
            .sum();
        costs += production * rate(RateKind::ResourceConsumption) * (resource_inputs + product_inputs);
        costs += production
            * rate(RateKind::ElectricityPerProduction)
            * product_price(Product::Electricity);
    }

    let retail = counts.retail as f64;
    if retail > 0.0 {
        revenue += retail * rate(RateKind::RetailRevenue);
        let inputs: f64 = product_demands(sector, UnitKind::Retail)
            .iter()
            .map(|&p| product_price(p))
            .sum();
        costs += retail * rate(RateKind::RetailConsumption) * inputs;
    }

    let service = counts.service as f64;
    if service > 0.0 {
        revenue += service * rate(RateKind::ServiceRevenue);
        let inputs: f64 = product_demands(sector, UnitKind::Service)
            .iter()
            .map(|&p| product_price(p))
            .sum();
        costs += service * rate(RateKind::ServiceConsumption) * inputs;
    }

    (revenue, costs)
}

fn default_record(corp: CorporationId) -> CorporationRecord {
    CorporationRecord {
        id: corp,
        name: String::new(),
        ceo_salary: Decimal::ZERO,
        dividend_percentage: Decimal::ZERO,
        total_shares: 0,
        last_special_dividend: None,
    }
}

/// Money conversion from unit-economics space; non-finite intermediates
/// degrade to zero instead of propagating.
fn to_money(v: f64) -> Decimal {
    if v.is_finite() {
        Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Derives full income statements on demand. Stateless apart from the
/// shared stores and caches it reads through.
pub struct FinancialCalculator {
    units: Arc<dyn UnitCountStore>,
    corporations: Arc<dyn ConfigStore>,
    config: Arc<ConfigService>,
    market: Arc<MarketCache>,
}

impl FinancialCalculator {
    pub fn new(
        units: Arc<dyn UnitCountStore>,
        corporations: Arc<dyn ConfigStore>,
        config: Arc<ConfigService>,
        market: Arc<MarketCache>,
    ) -> Self {
        Self {
            units,
            corporations,
            config,
            market,
        }
    }

    /// Compute a corporation's financial statement.
    ///
    /// `snapshot` and `record` override the cache/store lookups when
    /// supplied; callers doing bulk passes (e.g. the leaderboard) reuse
    /// one snapshot across corporations that way.
    pub fn calculate(
        &self,
        corp: CorporationId,
        snapshot: Option<Arc<MarketSnapshot>>,
        record: Option<CorporationRecord>,
    ) -> Result<CorporationFinancials, StoreError> {
        let entries = self.units.corporation_entries(corp)?;
        let record = match record {
            Some(r) => r,
            None => self
                .corporations
                .corporation_record(corp)?
                .unwrap_or_else(|| default_record(corp)),
        };
        if entries.is_empty() {
            return Ok(CorporationFinancials::zeroed(corp, &record));
        }
        let snapshot = match snapshot {
            Some(s) => s,
            None => self.market.get()?,
        };
        let params = self.config.params()?;

        let mut hourly_revenue = 0.0;
        let mut hourly_costs = 0.0;
        for entry in &entries {
            let (rev, cost) = holding_hourly(&params, entry.sector, &entry.counts, &snapshot);
            hourly_revenue += rev;
            hourly_costs += cost;
        }

        let hourly_revenue = to_money(hourly_revenue);
        let hourly_costs = to_money(hourly_costs);
        let hourly_profit = hourly_revenue - hourly_costs;
        let gross_profit = hourly_profit * Decimal::from(DISPLAY_PERIOD_HOURS);
        let statement = derive_income_statement(
            gross_profit,
            record.ceo_salary,
            record.dividend_percentage,
            record.total_shares,
        );

        debug!(corp = corp.0, %gross_profit, "derived income statement");
        Ok(CorporationFinancials {
            corporation: corp,
            name: record.name.clone(),
            hourly_revenue,
            hourly_costs,
            hourly_profit,
            gross_profit,
            ceo_salary: record.ceo_salary,
            operating_income: statement.operating_income,
            dividend_payout: statement.dividend_payout,
            net_income: statement.net_income,
            dividend_per_share: statement.dividend_per_share,
            last_special_dividend: record.last_special_dividend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use persistence::{MarketEntry, MemoryStore, StateId};
    use proptest::prelude::*;
    use sim_market::{default_ttl, Clock, ManualClock};
    use std::collections::BTreeMap;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn profitable_quarter_pays_dividends_in_order() {
        let s = derive_income_statement(dec(100_000), dec(20_000), dec(25), 10_000);
        assert_eq!(s.operating_income, dec(80_000));
        assert_eq!(s.dividend_payout, dec(20_000));
        assert_eq!(s.net_income, dec(60_000));
        assert_eq!(s.dividend_per_share, dec(2));
    }

    #[test]
    fn losses_never_pay_dividends() {
        let s = derive_income_statement(dec(10_000), dec(20_000), dec(25), 10_000);
        assert_eq!(s.operating_income, dec(-10_000));
        assert_eq!(s.dividend_payout, Decimal::ZERO);
        assert_eq!(s.net_income, dec(-10_000));
        assert_eq!(s.dividend_per_share, Decimal::ZERO);
    }

    #[test]
    fn zero_or_negative_share_count_yields_no_per_share_value() {
        let s = derive_income_statement(dec(100_000), dec(0), dec(50), 0);
        assert!(s.dividend_payout > Decimal::ZERO);
        assert_eq!(s.dividend_per_share, Decimal::ZERO);
        let s = derive_income_statement(dec(100_000), dec(0), dec(50), -5);
        assert_eq!(s.dividend_per_share, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn statement_identities_hold_exactly(
            gross in -1_000_000i64..1_000_000,
            salary in 0i64..100_000,
            pct in 0i64..=100,
            shares in 0i64..1_000_000,
        ) {
            let s = derive_income_statement(dec(gross), dec(salary), dec(pct), shares);
            prop_assert_eq!(s.operating_income, dec(gross) - dec(salary));
            prop_assert_eq!(s.net_income, s.operating_income - s.dividend_payout);
            if s.operating_income <= Decimal::ZERO {
                prop_assert_eq!(s.dividend_payout, Decimal::ZERO);
                prop_assert_eq!(s.net_income, s.operating_income);
            } else {
                prop_assert!(s.dividend_payout >= Decimal::ZERO);
                prop_assert!(s.dividend_payout <= s.operating_income);
            }
        }
    }

    // --- end-to-end fixtures ---

    struct Fixture {
        calc: FinancialCalculator,
        market: Arc<MarketCache>,
        store: Arc<MemoryStore>,
    }

    fn fixture(build: impl FnOnce(&mut MemoryStore)) -> Fixture {
        let mut store = MemoryStore::new();
        build(&mut store);
        let store = Arc::new(store);
        let config = Arc::new(ConfigService::new(
            Arc::clone(&store) as Arc<dyn ConfigStore>
        ));
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let market = Arc::new(MarketCache::new(
            Arc::clone(&store) as Arc<dyn UnitCountStore>,
            Arc::clone(&config),
            clock as Arc<dyn Clock>,
            default_ttl(),
        ));
        let calc = FinancialCalculator::new(
            Arc::clone(&store) as Arc<dyn UnitCountStore>,
            Arc::clone(&store) as Arc<dyn ConfigStore>,
            config,
            Arc::clone(&market),
        );
        Fixture { calc, market, store }
    }

    fn corp_record(id: i64, salary: i64, pct: i64, shares: i64) -> CorporationRecord {
        CorporationRecord {
            id: CorporationId(id),
            name: format!("Corp {id}"),
            ceo_salary: dec(salary),
            dividend_percentage: dec(pct),
            total_shares: shares,
            last_special_dividend: None,
        }
    }

    #[test]
    fn zero_holdings_is_an_all_zero_statement_not_an_error() {
        let fx = fixture(|store| {
            store.upsert_corporation(corp_record(1, 20_000, 25, 1000));
        });
        let fin = fx.calc.calculate(CorporationId(1), None, None).unwrap();
        assert_eq!(fin.gross_profit, Decimal::ZERO);
        assert_eq!(fin.operating_income, Decimal::ZERO);
        assert_eq!(fin.dividend_payout, Decimal::ZERO);
        assert_eq!(fin.name, "Corp 1");
    }

    #[test]
    fn retail_units_earn_flat_revenue_minus_input_costs() {
        let fx = fixture(|store| {
            store.upsert_corporation(corp_record(1, 0, 0, 1000));
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::Retail,
                state: StateId("NY".into()),
                counts: UnitCounts::clamped(0, 5, 0, 0),
            });
        });
        let fin = fx.calc.calculate(CorporationId(1), None, None).unwrap();
        // 5 units x 480/h flat revenue (Service-category default).
        assert_eq!(fin.hourly_revenue, dec(5) * dec(480));
        assert!(fin.hourly_costs > Decimal::ZERO);
        assert_eq!(
            fin.hourly_profit,
            fin.hourly_revenue - fin.hourly_costs
        );
        assert_eq!(
            fin.gross_profit,
            fin.hourly_profit * dec(DISPLAY_PERIOD_HOURS)
        );
    }

    #[test]
    fn missing_snapshot_prices_degrade_to_zero_legs() {
        let fx = fixture(|store| {
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::Mining,
                state: StateId("NV".into()),
                counts: UnitCounts::clamped(0, 0, 0, 4),
            });
        });
        let empty = Arc::new(sim_market::MarketSnapshot {
            commodity_prices: BTreeMap::new(),
            product_prices: BTreeMap::new(),
            computed_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        });
        let fin = fx.calc.calculate(CorporationId(1), Some(empty), None).unwrap();
        // No prices: no extraction revenue, no electricity cost, only
        // upkeep (4 units x 30/h for the Extraction category).
        assert_eq!(fin.hourly_revenue, Decimal::ZERO);
        assert_eq!(fin.hourly_costs, dec(4) * dec(30));
    }

    #[test]
    fn extraction_revenue_follows_snapshot_prices() {
        let fx = fixture(|store| {
            store.upsert_corporation(corp_record(1, 0, 0, 100));
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::OilAndGas,
                state: StateId("TX".into()),
                counts: UnitCounts::clamped(0, 0, 0, 2),
            });
            // Someone must demand the oil for the price to hold up.
            store.insert_entry(MarketEntry {
                corporation: CorporationId(2),
                sector: Sector::Chemicals,
                state: StateId("LA".into()),
                counts: UnitCounts::clamped(6, 0, 0, 0),
            });
        });
        let snapshot = fx.market.get().unwrap();
        let oil = snapshot.resource_price(sim_core::Resource::CrudeOil).unwrap();
        let gas = snapshot
            .resource_price(sim_core::Resource::NaturalGas)
            .unwrap();
        let fin = fx
            .calc
            .calculate(CorporationId(1), Some(Arc::clone(&snapshot)), None)
            .unwrap();
        // 2 units x 3.0/h output x (oil + gas prices).
        let expected = to_money(2.0 * 3.0 * (oil + gas));
        assert_eq!(fin.hourly_revenue, expected);
    }

    #[test]
    fn special_dividend_fields_are_carried_not_recomputed() {
        let paid_at = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let fx = fixture(|store| {
            let mut record = corp_record(1, 0, 0, 100);
            record.last_special_dividend = Some(SpecialDividend {
                amount: dec(5_000),
                per_share: dec(50),
                paid_at,
            });
            store.upsert_corporation(record);
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::Finance,
                state: StateId("NY".into()),
                counts: UnitCounts::clamped(0, 0, 1, 0),
            });
        });
        let fin = fx.calc.calculate(CorporationId(1), None, None).unwrap();
        let special = fin.last_special_dividend.expect("carried through");
        assert_eq!(special.amount, dec(5_000));
        assert_eq!(special.paid_at, paid_at);
    }

    #[test]
    fn store_outage_propagates_as_the_only_hard_failure() {
        let fx = fixture(|store| {
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::Retail,
                state: StateId("NY".into()),
                counts: UnitCounts::clamped(0, 1, 0, 0),
            });
        });
        fx.store.set_offline(true);
        assert!(matches!(
            fx.calc.calculate(CorporationId(1), None, None),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn statement_serializes_for_the_api_layer() {
        let fx = fixture(|store| {
            store.upsert_corporation(corp_record(1, 1_000, 10, 500));
            store.insert_entry(MarketEntry {
                corporation: CorporationId(1),
                sector: Sector::Hospitality,
                state: StateId("FL".into()),
                counts: UnitCounts::clamped(0, 0, 3, 0),
            });
        });
        let fin = fx.calc.calculate(CorporationId(1), None, None).unwrap();
        let json = serde_json::to_value(&fin).unwrap();
        assert!(json["gross_profit"].is_string() || json["gross_profit"].is_number());
        assert_eq!(json["name"], "Corp 1");
    }
}
