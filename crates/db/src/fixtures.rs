//! Production rate card seed.
//!
//! The catalog is normally maintained out-of-band by the content management
//! side; this dataset bootstraps a fresh database with the launch rate card
//! so the configurator, CLI, and tests have real reference data.

use rust_decimal::Decimal;
use tarifa_core::{
    Bundle, BundleId, CatalogSnapshot, FiberTier, FiberTierId, GbAllowance, LocalizedText,
    MobileTier, MobileTierId, Technology,
};

use crate::repositories::{RepositoryError, SqlCatalogRepository};
use crate::DbPool;

pub struct RateCardSeed;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub fiber_tiers: usize,
    pub mobile_tiers: usize,
    pub bundles: usize,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub checks: Vec<(&'static str, bool)>,
    pub all_present: bool,
}

impl RateCardSeed {
    /// Replaces the persisted rate card with the production dataset.
    /// Safe to rerun; the load is a full replace.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let snapshot = production_rate_card()?;
        SqlCatalogRepository::new(pool.clone()).replace_rate_card(&snapshot).await?;
        Ok(SeedResult {
            fiber_tiers: snapshot.fiber_tiers().len(),
            mobile_tiers: snapshot.mobile_tiers().len(),
            bundles: snapshot.bundles().len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let snapshot = SqlCatalogRepository::new(pool.clone()).load_snapshot().await;
        let checks = match snapshot {
            Ok(snapshot) => vec![
                ("fiber_tiers_present", snapshot.fiber_tiers().len() == 7),
                ("mobile_tiers_present", snapshot.mobile_tiers().len() == 5),
                ("bundles_present", snapshot.bundles().len() == 6),
                (
                    "unlimited_bundle_present",
                    snapshot
                        .bundles()
                        .iter()
                        .any(|bundle| bundle.id.0 == "p3" && bundle.mobile_gb_per_line.is_unlimited()),
                ),
            ],
            Err(_) => vec![("catalog_loads", false)],
        };
        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { checks, all_present })
    }
}

/// Launch rate card as published on the marketing site.
pub fn production_rate_card() -> Result<CatalogSnapshot, tarifa_core::DomainError> {
    CatalogSnapshot::new(production_fiber_tiers()?, production_mobile_tiers()?, production_bundles()?)
}

fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn production_fiber_tiers() -> Result<Vec<FiberTier>, tarifa_core::DomainError> {
    let mut tiers = vec![
        fiber("f0", 0, Technology::Fiber, 0, "Sense Fibra / Sin Fibra", None),
        fiber("f1", 100, Technology::Fiber, 2490, "Fibra 100Mb", None),
        fiber("f2", 300, Technology::Fiber, 2590, "Fibra 300Mb", None),
        fiber("f4", 600, Technology::Fiber, 2990, "Fibra 600Mb", None),
        fiber("f3", 1000, Technology::Fiber, 3290, "Fibra 1000Mb", None),
    ];
    tiers.push(fiber(
        "r1",
        30,
        Technology::Radio,
        2490,
        "Radio 30Mb (Opció 1 - S.P.)",
        Some(LocalizedText::new("+ Instal·lació", "+ Instalación")?),
    ));
    tiers.push(fiber(
        "r2",
        30,
        Technology::Radio,
        3490,
        "Radio 30Mb (Opció 2)",
        Some(LocalizedText::new("Instal·lació inclosa", "Instalación incluida")?),
    ));
    Ok(tiers)
}

fn fiber(
    id: &str,
    speed_mb: u32,
    technology: Technology,
    cents: i64,
    name: &str,
    description: Option<LocalizedText>,
) -> FiberTier {
    FiberTier {
        id: FiberTierId(id.to_owned()),
        speed_mb,
        technology,
        price: price(cents),
        name: name.to_owned(),
        description,
    }
}

fn production_mobile_tiers() -> Result<Vec<MobileTier>, tarifa_core::DomainError> {
    let card = [("m1", 3, 590), ("m2", 50, 790), ("m3", 100, 990), ("m4", 200, 1590), ("m5", 350, 2390)];
    Ok(card
        .iter()
        .map(|(id, gb, cents)| MobileTier {
            id: MobileTierId((*id).to_owned()),
            gb: GbAllowance::limited(*gb),
            price: price(*cents),
            name: format!("{gb}GB"),
        })
        .collect())
}

fn production_bundles() -> Result<Vec<Bundle>, tarifa_core::DomainError> {
    Ok(vec![
        bundle(
            "p1",
            ("Paquet Express", "Paquete Express"),
            100,
            1,
            GbAllowance::limited(25),
            false,
            2990,
            ("Fibra 100Mb + 25GB", "Fibra 100Mb + 25GB"),
        )?,
        bundle(
            "p2",
            ("Paquet Econòmic", "Paquete Económico"),
            300,
            1,
            GbAllowance::limited(50),
            true,
            3590,
            ("Fibra 300Mb + Fix + 50GB", "Fibra 300Mb + Fijo + 50GB"),
        )?,
        bundle(
            "p3",
            ("Paquet Extraordinària", "Paquete Extraordinario"),
            300,
            1,
            GbAllowance::UNLIMITED,
            false,
            3290,
            ("Fibra 300Mb + GB Il·limitats", "Fibra 300Mb + GB Ilimitados"),
        )?,
        bundle(
            "p4",
            ("Paquet Eficient", "Paquete Eficiente"),
            1000,
            1,
            GbAllowance::limited(100),
            false,
            3990,
            ("Fibra 1000Mb + 100GB", "Fibra 1000Mb + 100GB"),
        )?,
        bundle(
            "p5",
            ("Paquet Evolutiu", "Paquete Evolutivo"),
            1000,
            2,
            GbAllowance::limited(100),
            false,
            4690,
            ("Fibra 1000Mb + 2x 100GB", "Fibra 1000Mb + 2x 100GB"),
        )?,
        bundle(
            "p6",
            ("Paquet Emprenedor", "Paquete Emprendedor"),
            600,
            1,
            GbAllowance::limited(150),
            true,
            4490,
            ("Fibra 600Mb + Centraleta + 150GB", "Fibra 600Mb + Centralita + 150GB"),
        )?,
    ])
}

#[allow(clippy::too_many_arguments)]
fn bundle(
    id: &str,
    name: (&str, &str),
    speed_mb: u32,
    mobile_lines: u32,
    mobile_gb_per_line: GbAllowance,
    has_landline: bool,
    cents: i64,
    description: (&str, &str),
) -> Result<Bundle, tarifa_core::DomainError> {
    Ok(Bundle {
        id: BundleId(id.to_owned()),
        name: LocalizedText::new(name.0, name.1)?,
        speed_mb,
        mobile_lines,
        mobile_gb_per_line,
        has_landline,
        price: price(cents),
        description: LocalizedText::new(description.0, description.1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::production_rate_card;

    #[test]
    fn production_rate_card_passes_catalog_validation() {
        let snapshot = production_rate_card().expect("valid rate card");
        assert_eq!(snapshot.fiber_tiers().len(), 7);
        assert_eq!(snapshot.mobile_tiers().len(), 5);
        assert_eq!(snapshot.bundles().len(), 6);
    }
}
