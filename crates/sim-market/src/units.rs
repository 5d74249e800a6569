//! Per-unit supply and demand contributions for one sector.

use persistence::RateKind;
use sim_config::EconomyParams;
use sim_core::{
    extractable_resources, produced_product, product_demands, required_resources, Product,
    Resource, Sector, SectorCategory, UnitCounts, UnitKind,
};

/// Behavioral variant, selected from the sector's category when the
/// calculator is built. Each variant carries its own supply/demand
/// code path; service-oriented sectors never touch the commodity side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CategoryKind {
    /// Sectors that pull raw resources (and may refine them too).
    Extractor,
    /// Pure manufacturers.
    Producer,
    /// Retail/service storefronts; no extraction, no production output.
    Outlet,
}

impl CategoryKind {
    fn of(sector: Sector) -> Self {
        match sector.category() {
            SectorCategory::Extraction => CategoryKind::Extractor,
            SectorCategory::Production => CategoryKind::Producer,
            SectorCategory::Service => CategoryKind::Outlet,
        }
    }
}

/// Supply/demand calculator for one sector, with all rates resolved
/// up front. Construction is cheap; callers build one per sector per
/// aggregation pass.
#[derive(Clone, Debug)]
pub struct SectorEconomics {
    sector: Sector,
    kind: CategoryKind,
    enabled: bool,
    extraction_output: f64,
    production_output: f64,
    input_consumption: f64,
    retail_consumption: f64,
    service_consumption: f64,
    electricity_per_production: f64,
    electricity_per_extraction: f64,
}

impl SectorEconomics {
    pub fn new(sector: Sector, params: &EconomyParams) -> Self {
        let rate = |kind| params.rate(sector, kind);
        Self {
            sector,
            kind: CategoryKind::of(sector),
            enabled: params.enabled(sector),
            extraction_output: rate(RateKind::ExtractionOutput),
            production_output: rate(RateKind::ProductionOutput),
            input_consumption: rate(RateKind::ResourceConsumption),
            retail_consumption: rate(RateKind::RetailConsumption),
            service_consumption: rate(RateKind::ServiceConsumption),
            electricity_per_production: rate(RateKind::ElectricityPerProduction),
            electricity_per_extraction: rate(RateKind::ElectricityPerExtraction),
        }
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    /// Raw commodity put on the market by extraction units.
    pub fn commodity_supply(&self, resource: Resource, counts: &UnitCounts) -> f64 {
        if !self.enabled || self.kind != CategoryKind::Extractor {
            return 0.0;
        }
        if extractable_resources(self.sector).contains(&resource) {
            counts.extraction as f64 * self.extraction_output
        } else {
            0.0
        }
    }

    /// Raw commodity consumed by production units. In the dual-resource
    /// case (Energy) each required resource receives the same per-unit
    /// demand.
    pub fn commodity_demand(&self, resource: Resource, counts: &UnitCounts) -> f64 {
        if !self.enabled || self.kind == CategoryKind::Outlet {
            return 0.0;
        }
        if required_resources(self.sector).contains(&resource) {
            counts.production as f64 * self.input_consumption
        } else {
            0.0
        }
    }

    /// Product put on the market by production units. Only the sector's
    /// own product counts; outlets always supply zero.
    pub fn product_supply(&self, product: Product, counts: &UnitCounts) -> f64 {
        if !self.enabled || self.kind == CategoryKind::Outlet {
            return 0.0;
        }
        if produced_product(self.sector) == Some(product) {
            counts.production as f64 * self.production_output
        } else {
            0.0
        }
    }

    /// Product demand across all four unit kinds: explicit demand
    /// lists at each kind's consumption rate, plus the universal
    /// electricity draw of production and extraction units. An
    /// Electricity entry in a production demand list is superseded by
    /// the universal rule so it is never counted twice.
    pub fn product_demand(&self, product: Product, counts: &UnitCounts) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let mut total = 0.0;
        for kind in UnitKind::ALL {
            if !product_demands(self.sector, kind).contains(&product) {
                continue;
            }
            if product == Product::Electricity
                && matches!(kind, UnitKind::Production | UnitKind::Extraction)
            {
                continue;
            }
            total += counts.count(kind) as f64 * self.list_consumption_rate(kind);
        }
        if product == Product::Electricity {
            total += counts.production as f64 * self.electricity_per_production
                + counts.extraction as f64 * self.electricity_per_extraction;
        }
        total
    }

    fn list_consumption_rate(&self, kind: UnitKind) -> f64 {
        match kind {
            UnitKind::Production => self.input_consumption,
            UnitKind::Retail => self.retail_consumption,
            UnitKind::Service => self.service_consumption,
            // Extraction units carry no explicit demand lists.
            UnitKind::Extraction => 0.0,
        }
    }
}
