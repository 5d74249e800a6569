//! World-wide supply/demand aggregation over all sectors.

use crate::units::SectorEconomics;
use serde::Serialize;
use sim_config::EconomyParams;
use sim_core::{Product, Resource, Sector, UnitCounts};
use std::collections::BTreeMap;

/// Total supply and demand per resource and per product. Every key of
/// the closed resource/product sets is present, zero-filled when no
/// sector contributes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MarketVolumes {
    pub resource_supply: BTreeMap<Resource, f64>,
    pub resource_demand: BTreeMap<Resource, f64>,
    pub product_supply: BTreeMap<Product, f64>,
    pub product_demand: BTreeMap<Product, f64>,
}

impl MarketVolumes {
    fn zeroed() -> Self {
        Self {
            resource_supply: Resource::ALL.into_iter().map(|r| (r, 0.0)).collect(),
            resource_demand: Resource::ALL.into_iter().map(|r| (r, 0.0)).collect(),
            product_supply: Product::ALL.into_iter().map(|p| (p, 0.0)).collect(),
            product_demand: Product::ALL.into_iter().map(|p| (p, 0.0)).collect(),
        }
    }
}

/// Sum every sector's per-unit contributions into world totals.
///
/// Sectors absent from the count map contribute zero. Accumulation is
/// plain commutative addition, so iteration order only matters up to
/// floating-point rounding.
pub fn compute_supply_demand(
    params: &EconomyParams,
    counts_by_sector: &BTreeMap<Sector, UnitCounts>,
) -> MarketVolumes {
    let mut volumes = MarketVolumes::zeroed();
    for (&sector, counts) in counts_by_sector {
        if counts.is_empty() {
            continue;
        }
        let econ = SectorEconomics::new(sector, params);
        for resource in Resource::ALL {
            *volumes.resource_supply.entry(resource).or_insert(0.0) +=
                econ.commodity_supply(resource, counts);
            *volumes.resource_demand.entry(resource).or_insert(0.0) +=
                econ.commodity_demand(resource, counts);
        }
        for product in Product::ALL {
            *volumes.product_supply.entry(product).or_insert(0.0) +=
                econ.product_supply(product, counts);
            *volumes.product_demand.entry(product).or_insert(0.0) +=
                econ.product_demand(product, counts);
        }
    }
    volumes
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryStore;
    use proptest::prelude::*;
    use sim_config::ConfigService;
    use std::sync::Arc;

    fn default_params() -> Arc<EconomyParams> {
        ConfigService::new(Arc::new(MemoryStore::new()))
            .params()
            .unwrap()
    }

    #[test]
    fn empty_world_aggregates_to_zero_everywhere() {
        let volumes = compute_supply_demand(&default_params(), &BTreeMap::new());
        assert!(volumes.resource_supply.values().all(|v| *v == 0.0));
        assert!(volumes.product_demand.values().all(|v| *v == 0.0));
        // Zero-filled, not missing.
        assert_eq!(volumes.resource_supply.len(), Resource::ALL.len());
        assert_eq!(volumes.product_supply.len(), Product::ALL.len());
    }

    #[test]
    fn supply_and_demand_meet_across_sectors() {
        let params = default_params();
        let mut world = BTreeMap::new();
        // 5 mining extraction units at 4.0 -> 20 iron ore supplied.
        world.insert(Sector::Mining, UnitCounts::clamped(0, 0, 0, 5));
        // 2 manufacturing production units at 1.5 -> 3 iron ore demanded.
        world.insert(Sector::Manufacturing, UnitCounts::clamped(2, 0, 0, 0));

        let volumes = compute_supply_demand(&params, &world);
        assert_eq!(volumes.resource_supply[&Resource::IronOre], 20.0);
        assert_eq!(volumes.resource_demand[&Resource::IronOre], 3.0);
        // The same pass also records manufactured-goods supply (2 x 2.0)
        // and the universal electricity draw (2 x 0.5 + 5 x 0.25).
        assert_eq!(volumes.product_supply[&Product::ManufacturedGoods], 4.0);
        assert_eq!(volumes.product_demand[&Product::Electricity], 2.25);
    }

    #[test]
    fn sectors_with_no_units_are_skipped_without_error() {
        let params = default_params();
        let mut world = BTreeMap::new();
        world.insert(Sector::Defense, UnitCounts::default());
        let volumes = compute_supply_demand(&params, &world);
        assert!(volumes.product_demand.values().all(|v| *v == 0.0));
    }

    proptest! {
        #[test]
        fn aggregation_is_order_independent(
            mining_ext in 0i64..500,
            manu_prod in 0i64..500,
            retail_units in 0i64..500,
        ) {
            let params = default_params();
            let mut forward = BTreeMap::new();
            forward.insert(Sector::Mining, UnitCounts::clamped(0, 0, 0, mining_ext));
            forward.insert(Sector::Manufacturing, UnitCounts::clamped(manu_prod, 0, 0, 0));
            forward.insert(Sector::Retail, UnitCounts::clamped(0, retail_units, 0, 0));

            // BTreeMap fixes iteration order, so emulate a different
            // order by splitting the world and summing the halves.
            let mut half_a = BTreeMap::new();
            half_a.insert(Sector::Retail, UnitCounts::clamped(0, retail_units, 0, 0));
            let mut half_b = BTreeMap::new();
            half_b.insert(Sector::Manufacturing, UnitCounts::clamped(manu_prod, 0, 0, 0));
            half_b.insert(Sector::Mining, UnitCounts::clamped(0, 0, 0, mining_ext));

            let whole = compute_supply_demand(&params, &forward);
            let a = compute_supply_demand(&params, &half_a);
            let b = compute_supply_demand(&params, &half_b);

            for product in Product::ALL {
                let split = a.product_demand[&product] + b.product_demand[&product];
                prop_assert!((whole.product_demand[&product] - split).abs() < 1e-9);
            }
            for resource in Resource::ALL {
                let split = a.resource_supply[&resource] + b.resource_supply[&resource];
                prop_assert!((whole.resource_supply[&resource] - split).abs() < 1e-9);
            }
        }
    }
}
