#![deny(warnings)]

//! Headless CLI: seeds a demo world, computes a market snapshot and
//! prints one corporation's income statement.

use anyhow::Result;
use persistence::{
    ConfigStore, CorporationId, CorporationRecord, MarketEntry, MemoryStore, StateId,
    UnitCountStore,
};
use rust_decimal::Decimal;
use sim_config::ConfigService;
use sim_core::{Product, Resource, Sector, UnitCounts};
use sim_finance::FinancialCalculator;
use sim_market::{Clock, MarketCache, SystemClock};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (i64, i64) {
    let mut corp: i64 = 1;
    let mut ttl_secs: i64 = 60;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--corp" => corp = it.next().and_then(|s| s.parse().ok()).unwrap_or(corp),
            "--ttl-secs" => {
                ttl_secs = it.next().and_then(|s| s.parse().ok()).unwrap_or(ttl_secs)
            }
            _ => {}
        }
    }
    (corp, ttl_secs)
}

fn demo_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let entry = |corp: i64, sector: Sector, state: &str, c: (i64, i64, i64, i64)| MarketEntry {
        corporation: CorporationId(corp),
        sector,
        state: StateId(state.into()),
        counts: UnitCounts::clamped(c.0, c.1, c.2, c.3),
    };

    // Corp 1: vertically integrated heavy industry.
    store.insert_entry(entry(1, Sector::Mining, "NV", (0, 0, 0, 12)));
    store.insert_entry(entry(1, Sector::Manufacturing, "OH", (8, 2, 0, 0)));
    store.insert_entry(entry(1, Sector::Energy, "PA", (4, 0, 0, 0)));
    // Corp 2: consumer-facing.
    store.insert_entry(entry(2, Sector::Retail, "NY", (0, 10, 0, 0)));
    store.insert_entry(entry(2, Sector::Hospitality, "FL", (0, 0, 6, 0)));
    store.insert_entry(entry(2, Sector::Agriculture, "IA", (3, 0, 0, 5)));
    // Corp 3: oil patch.
    store.insert_entry(entry(3, Sector::OilAndGas, "TX", (4, 0, 0, 9)));
    store.insert_entry(entry(3, Sector::Transport, "TX", (0, 0, 4, 0)));

    store.upsert_corporation(CorporationRecord {
        id: CorporationId(1),
        name: "Ferrum Holdings".into(),
        ceo_salary: Decimal::from(20_000),
        dividend_percentage: Decimal::from(25),
        total_shares: 10_000,
        last_special_dividend: None,
    });
    store.upsert_corporation(CorporationRecord {
        id: CorporationId(2),
        name: "Mainstreet Group".into(),
        ceo_salary: Decimal::from(12_000),
        dividend_percentage: Decimal::from(40),
        total_shares: 5_000,
        last_special_dividend: None,
    });
    store.upsert_corporation(CorporationRecord {
        id: CorporationId(3),
        name: "Permian Ventures".into(),
        ceo_salary: Decimal::from(30_000),
        dividend_percentage: Decimal::from(10),
        total_shares: 25_000,
        last_special_dividend: None,
    });
    store
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (corp, ttl_secs) = parse_args();
    info!(corp, ttl_secs, "starting corpsim CLI");

    let store = Arc::new(demo_store());
    let config = Arc::new(ConfigService::new(
        Arc::clone(&store) as Arc<dyn ConfigStore>
    ));
    let market = Arc::new(MarketCache::new(
        Arc::clone(&store) as Arc<dyn UnitCountStore>,
        Arc::clone(&config),
        Arc::new(SystemClock) as Arc<dyn Clock>,
        chrono::Duration::seconds(ttl_secs),
    ));
    let calculator = FinancialCalculator::new(
        Arc::clone(&store) as Arc<dyn UnitCountStore>,
        Arc::clone(&store) as Arc<dyn ConfigStore>,
        config,
        Arc::clone(&market),
    );

    let snapshot = market.get()?;
    println!("Market snapshot @ {}", snapshot.computed_at);
    for resource in Resource::ALL {
        let q = &snapshot.commodity_prices[&resource];
        println!(
            "  {:<14} {:>8.2} ({:+.1}%)  supply {:>8.1}  scarcity {:.2}",
            resource.name(),
            q.current_price,
            q.price_change_pct,
            q.total_supply,
            q.scarcity
        );
    }
    for product in Product::ALL {
        let q = &snapshot.product_prices[&product];
        println!(
            "  {:<14} {:>8.2} ({:+.1}%)  supply {:>8.1}  scarcity {:.2}",
            product.name(),
            q.current_price,
            q.price_change_pct,
            q.total_supply,
            q.scarcity
        );
    }

    let fin = calculator.calculate(CorporationId(corp), Some(snapshot), None)?;
    println!();
    println!("Income statement | corp {} ({})", fin.corporation.0, fin.name);
    println!("  hourly revenue    {:>14}", fin.hourly_revenue.round_dp(2));
    println!("  hourly costs      {:>14}", fin.hourly_costs.round_dp(2));
    println!("  hourly profit     {:>14}", fin.hourly_profit.round_dp(2));
    println!(
        "  gross profit ({}h) {:>13}",
        sim_finance::DISPLAY_PERIOD_HOURS,
        fin.gross_profit.round_dp(2)
    );
    println!("  CEO salary        {:>14}", fin.ceo_salary.round_dp(2));
    println!("  operating income  {:>14}", fin.operating_income.round_dp(2));
    println!("  dividend payout   {:>14}", fin.dividend_payout.round_dp(2));
    println!("  net income        {:>14}", fin.net_income.round_dp(2));
    println!("  dividend/share    {:>14}", fin.dividend_per_share.round_dp(4));

    Ok(())
}
