#![deny(warnings)]

//! Core domain model for the corporate simulation.
//!
//! This crate defines the closed sets of sectors, raw resources,
//! manufactured products and business-unit kinds, plus the static
//! sector graph describing which sector extracts, produces and
//! consumes what. All lookups are pure functions over static tables;
//! nothing here performs I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod catalog;

pub use catalog::{
    extractable_resources, produced_product, product_demands, required_resources,
    ELECTRICITY_UNIVERSAL,
};

/// The fixed set of business sectors corporations can operate in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Sector {
    Agriculture,
    Fishing,
    Forestry,
    Mining,
    OilAndGas,
    Energy,
    Chemicals,
    Manufacturing,
    Automotive,
    Construction,
    Defense,
    Technology,
    Telecom,
    Media,
    Retail,
    Finance,
    Healthcare,
    Hospitality,
    Transport,
    RealEstate,
}

impl Sector {
    /// Every sector, in declaration order.
    pub const ALL: [Sector; 20] = [
        Sector::Agriculture,
        Sector::Fishing,
        Sector::Forestry,
        Sector::Mining,
        Sector::OilAndGas,
        Sector::Energy,
        Sector::Chemicals,
        Sector::Manufacturing,
        Sector::Automotive,
        Sector::Construction,
        Sector::Defense,
        Sector::Technology,
        Sector::Telecom,
        Sector::Media,
        Sector::Retail,
        Sector::Finance,
        Sector::Healthcare,
        Sector::Hospitality,
        Sector::Transport,
        Sector::RealEstate,
    ];

    /// Behavioral category driving default economic parameters.
    pub fn category(self) -> SectorCategory {
        match self {
            Sector::Agriculture
            | Sector::Fishing
            | Sector::Forestry
            | Sector::Mining
            | Sector::OilAndGas => SectorCategory::Extraction,
            Sector::Energy
            | Sector::Chemicals
            | Sector::Manufacturing
            | Sector::Automotive
            | Sector::Construction
            | Sector::Defense
            | Sector::Technology => SectorCategory::Production,
            Sector::Telecom
            | Sector::Media
            | Sector::Retail
            | Sector::Finance
            | Sector::Healthcare
            | Sector::Hospitality
            | Sector::Transport
            | Sector::RealEstate => SectorCategory::Service,
        }
    }

    /// Stable display name, also the persistence key for config records.
    pub fn name(self) -> &'static str {
        match self {
            Sector::Agriculture => "Agriculture",
            Sector::Fishing => "Fishing",
            Sector::Forestry => "Forestry",
            Sector::Mining => "Mining",
            Sector::OilAndGas => "Oil & Gas",
            Sector::Energy => "Energy",
            Sector::Chemicals => "Chemicals",
            Sector::Manufacturing => "Manufacturing",
            Sector::Automotive => "Automotive",
            Sector::Construction => "Construction",
            Sector::Defense => "Defense",
            Sector::Technology => "Technology",
            Sector::Telecom => "Telecom",
            Sector::Media => "Media",
            Sector::Retail => "Retail",
            Sector::Finance => "Finance",
            Sector::Healthcare => "Healthcare",
            Sector::Hospitality => "Hospitality",
            Sector::Transport => "Transport",
            Sector::RealEstate => "Real Estate",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a persisted sector key no longer matches the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sector name: {0}")]
pub struct UnknownSector(pub String);

impl FromStr for Sector {
    type Err = UnknownSector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sector::ALL
            .into_iter()
            .find(|sec| sec.name() == s)
            .ok_or_else(|| UnknownSector(s.to_string()))
    }
}

/// Behavioral grouping of sectors. Defaults for economic rates are
/// keyed by category; individual sectors may override them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SectorCategory {
    Extraction,
    Production,
    Service,
}

/// Raw extractable commodities.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Resource {
    Grain,
    Fish,
    Timber,
    IronOre,
    Copper,
    Coal,
    CrudeOil,
    NaturalGas,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Grain,
        Resource::Fish,
        Resource::Timber,
        Resource::IronOre,
        Resource::Copper,
        Resource::Coal,
        Resource::CrudeOil,
        Resource::NaturalGas,
    ];

    /// Reference price when supply and demand are balanced.
    pub fn base_price(self) -> f64 {
        match self {
            Resource::Grain => 40.0,
            Resource::Fish => 55.0,
            Resource::Timber => 35.0,
            Resource::IronOre => 60.0,
            Resource::Copper => 80.0,
            Resource::Coal => 45.0,
            Resource::CrudeOil => 70.0,
            Resource::NaturalGas => 50.0,
        }
    }

    /// Hard floor for the computed price.
    pub fn min_price(self) -> f64 {
        // Raw commodities floor at 40% of their base price.
        self.base_price() * 0.4
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Grain => "Grain",
            Resource::Fish => "Fish",
            Resource::Timber => "Timber",
            Resource::IronOre => "Iron Ore",
            Resource::Copper => "Copper",
            Resource::Coal => "Coal",
            Resource::CrudeOil => "Crude Oil",
            Resource::NaturalGas => "Natural Gas",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Manufactured goods.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Product {
    Electricity,
    Fuel,
    Chemicals,
    ManufacturedGoods,
    Vehicles,
    BuildingMaterials,
    DefenseEquipment,
    Software,
    ProcessedFood,
}

impl Product {
    pub const ALL: [Product; 9] = [
        Product::Electricity,
        Product::Fuel,
        Product::Chemicals,
        Product::ManufacturedGoods,
        Product::Vehicles,
        Product::BuildingMaterials,
        Product::DefenseEquipment,
        Product::Software,
        Product::ProcessedFood,
    ];

    /// Reference value when supply and demand are balanced.
    pub fn reference_value(self) -> f64 {
        match self {
            Product::Electricity => 100.0,
            Product::Fuel => 120.0,
            Product::Chemicals => 150.0,
            Product::ManufacturedGoods => 200.0,
            Product::Vehicles => 450.0,
            Product::BuildingMaterials => 90.0,
            Product::DefenseEquipment => 600.0,
            Product::Software => 160.0,
            Product::ProcessedFood => 75.0,
        }
    }

    /// Configured price floor.
    pub fn min_price(self) -> f64 {
        match self {
            Product::Electricity => 40.0,
            Product::Fuel => 50.0,
            Product::Chemicals => 60.0,
            Product::ManufacturedGoods => 80.0,
            Product::Vehicles => 180.0,
            Product::BuildingMaterials => 35.0,
            Product::DefenseEquipment => 240.0,
            Product::Software => 60.0,
            Product::ProcessedFood => 30.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Product::Electricity => "Electricity",
            Product::Fuel => "Fuel",
            Product::Chemicals => "Chemicals",
            Product::ManufacturedGoods => "Manufactured Goods",
            Product::Vehicles => "Vehicles",
            Product::BuildingMaterials => "Building Materials",
            Product::DefenseEquipment => "Defense Equipment",
            Product::Software => "Software",
            Product::ProcessedFood => "Processed Food",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four operational modes a business unit can take.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UnitKind {
    Production,
    Retail,
    Service,
    Extraction,
}

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Production,
        UnitKind::Retail,
        UnitKind::Service,
        UnitKind::Extraction,
    ];
}

/// Non-negative unit counts for one (sector, state) market entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    pub production: u32,
    pub retail: u32,
    pub service: u32,
    pub extraction: u32,
}

impl UnitCounts {
    /// Build counts from possibly dirty persisted values. Negative
    /// inputs clamp to zero so aggregate sums stay well-defined.
    pub fn clamped(production: i64, retail: i64, service: i64, extraction: i64) -> Self {
        let clamp = |v: i64| v.clamp(0, u32::MAX as i64) as u32;
        Self {
            production: clamp(production),
            retail: clamp(retail),
            service: clamp(service),
            extraction: clamp(extraction),
        }
    }

    pub fn count(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Production => self.production,
            UnitKind::Retail => self.retail,
            UnitKind::Service => self.service,
            UnitKind::Extraction => self.extraction,
        }
    }

    pub fn total(&self) -> u64 {
        self.production as u64 + self.retail as u64 + self.service as u64 + self.extraction as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Merge another entry into this one, saturating on overflow.
    pub fn accumulate(&mut self, other: &UnitCounts) {
        self.production = self.production.saturating_add(other.production);
        self.retail = self.retail.saturating_add(other.retail);
        self.service = self.service.saturating_add(other.service);
        self.extraction = self.extraction.saturating_add(other.extraction);
    }
}

/// Read-only description of a sector's commodity flows, served to the
/// API layer for display.
#[derive(Clone, Debug, Serialize)]
pub struct SectorFlows {
    pub sector: Sector,
    pub category: SectorCategory,
    pub extracts: &'static [Resource],
    pub produces: Option<Product>,
    pub consumes_resources: &'static [Resource],
    /// Explicit product demand lists per unit kind. The universal
    /// electricity demand of production and extraction units is not
    /// listed here.
    pub demands: Vec<(UnitKind, &'static [Product])>,
}

/// Describe one sector's position in the input/output graph.
pub fn sector_unit_flows(sector: Sector) -> SectorFlows {
    SectorFlows {
        sector,
        category: sector.category(),
        extracts: extractable_resources(sector),
        produces: produced_product(sector),
        consumes_resources: required_resources(sector),
        demands: UnitKind::ALL
            .into_iter()
            .map(|kind| (kind, product_demands(sector, kind)))
            .filter(|(_, products)| !products.is_empty())
            .collect(),
    }
}

/// Sectors whose production units output the given product.
pub fn product_suppliers(product: Product) -> Vec<Sector> {
    Sector::ALL
        .into_iter()
        .filter(|&s| produced_product(s) == Some(product))
        .collect()
}

/// (sector, unit kind) pairs whose explicit demand list contains the product.
pub fn product_consumers(product: Product) -> Vec<(Sector, UnitKind)> {
    let mut out = Vec::new();
    for sector in Sector::ALL {
        for kind in UnitKind::ALL {
            if product_demands(sector, kind).contains(&product) {
                out.push((sector, kind));
            }
        }
    }
    out
}

/// Sectors whose extraction units can supply the given resource.
pub fn resource_suppliers(resource: Resource) -> Vec<Sector> {
    Sector::ALL
        .into_iter()
        .filter(|&s| extractable_resources(s).contains(&resource))
        .collect()
}

/// Sectors whose production units consume the given resource.
pub fn resource_consumers(resource: Resource) -> Vec<Sector> {
    Sector::ALL
        .into_iter()
        .filter(|&s| required_resources(s).contains(&resource))
        .collect()
}
