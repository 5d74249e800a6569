//! Static sector graph tables: what each sector extracts, produces
//! and consumes. These are the base-game definitions; numeric rates
//! live in `sim-config` and can be retuned without touching this file.

use crate::{Product, Resource, Sector, UnitKind};

/// Electricity is demandable by every sector: each production unit and
/// each extraction unit consumes a configurable amount on top of the
/// sector's explicit demand lists. When Electricity also appears in an
/// explicit list, the universal amount replaces the list entry for
/// those unit kinds so it is never counted twice.
pub const ELECTRICITY_UNIVERSAL: Product = Product::Electricity;

/// Resources the sector's extraction units can pull from the ground.
pub fn extractable_resources(sector: Sector) -> &'static [Resource] {
    match sector {
        Sector::Agriculture => &[Resource::Grain],
        Sector::Fishing => &[Resource::Fish],
        Sector::Forestry => &[Resource::Timber],
        Sector::Mining => &[Resource::IronOre, Resource::Copper, Resource::Coal],
        Sector::OilAndGas => &[Resource::CrudeOil, Resource::NaturalGas],
        _ => &[],
    }
}

/// The single product the sector's production units output, if any.
pub fn produced_product(sector: Sector) -> Option<Product> {
    match sector {
        Sector::Agriculture => Some(Product::ProcessedFood),
        Sector::OilAndGas => Some(Product::Fuel),
        Sector::Energy => Some(Product::Electricity),
        Sector::Chemicals => Some(Product::Chemicals),
        Sector::Manufacturing => Some(Product::ManufacturedGoods),
        Sector::Automotive => Some(Product::Vehicles),
        Sector::Construction => Some(Product::BuildingMaterials),
        Sector::Defense => Some(Product::DefenseEquipment),
        Sector::Technology => Some(Product::Software),
        _ => None,
    }
}

/// Resources the sector's production units consume. Zero or one entry
/// for every sector except Energy, which burns both Coal and Natural
/// Gas (the documented dual-resource special case).
pub fn required_resources(sector: Sector) -> &'static [Resource] {
    match sector {
        Sector::Agriculture => &[Resource::Grain],
        Sector::OilAndGas => &[Resource::CrudeOil],
        Sector::Energy => &[Resource::Coal, Resource::NaturalGas],
        Sector::Chemicals => &[Resource::CrudeOil],
        Sector::Manufacturing => &[Resource::IronOre],
        Sector::Automotive => &[Resource::IronOre],
        Sector::Construction => &[Resource::Timber],
        Sector::Defense => &[Resource::IronOre],
        Sector::Technology => &[Resource::Copper],
        _ => &[],
    }
}

/// Explicit product demand list for one unit kind of one sector.
/// Extraction units never carry an explicit list; their electricity
/// draw comes from the universal rule.
pub fn product_demands(sector: Sector, kind: UnitKind) -> &'static [Product] {
    match (sector, kind) {
        (Sector::Agriculture, UnitKind::Production) => &[Product::Chemicals],
        (Sector::Fishing, UnitKind::Service) => &[Product::Fuel],
        (Sector::Manufacturing, UnitKind::Production) => &[Product::Chemicals],
        (Sector::Automotive, UnitKind::Production) => &[Product::ManufacturedGoods],
        (Sector::Automotive, UnitKind::Retail) => &[Product::Vehicles],
        (Sector::Construction, UnitKind::Service) => &[Product::Fuel],
        (Sector::Defense, UnitKind::Retail) => &[Product::DefenseEquipment],
        (Sector::Defense, UnitKind::Service) => &[Product::DefenseEquipment],
        // Technology lists Electricity explicitly; the universal rule
        // supersedes it for production units (no double count).
        (Sector::Technology, UnitKind::Production) => &[Product::Electricity],
        (Sector::Technology, UnitKind::Retail) => &[Product::Software],
        (Sector::Technology, UnitKind::Service) => &[Product::Software],
        (Sector::Telecom, UnitKind::Service) => &[Product::Software],
        (Sector::Media, UnitKind::Service) => &[Product::Software],
        (Sector::Retail, UnitKind::Retail) => {
            &[Product::ManufacturedGoods, Product::ProcessedFood]
        }
        (Sector::Finance, UnitKind::Service) => &[Product::Software],
        (Sector::Healthcare, UnitKind::Service) => &[Product::Chemicals],
        (Sector::Hospitality, UnitKind::Service) => &[Product::ProcessedFood],
        (Sector::Transport, UnitKind::Service) => &[Product::Fuel, Product::Vehicles],
        (Sector::RealEstate, UnitKind::Service) => &[Product::BuildingMaterials],
        _ => &[],
    }
}
