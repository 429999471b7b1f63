use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Bundle, FiberTier, FiberTierId, GbAllowance, MobileTier, MobileTierId};
use crate::errors::DomainError;

/// Synthesized tier returned by `resolve_mobile(-1)` when the catalog has no
/// unlimited entry. Keeps the resolver total instead of failing.
const UNLIMITED_FALLBACK_ID: &str = "custom_unlimited";
const UNLIMITED_FALLBACK_NAME: &str = "Il·limitat (Est.)";

fn unlimited_fallback_price() -> Decimal {
    Decimal::new(2500, 2)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogViolation {
    pub code: String,
    pub message: String,
}

impl CatalogViolation {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self { code: code.to_owned(), message: message.into() }
    }
}

/// Immutable per-session view of the rate catalog. Construction validates
/// the reference data and fails fast on malformed entries; a snapshot that
/// exists is safe to price against.
///
/// Known limitation: the "cheapest tier covering N GB" rule is only optimal
/// when sorting tiers by price also sorts them by capacity. A catalog that
/// violates that is accepted and the resolver still returns *a* covering
/// tier, just not necessarily the smallest one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    fiber_tiers: Vec<FiberTier>,
    mobile_tiers: Vec<MobileTier>,
    bundles: Vec<Bundle>,
}

impl CatalogSnapshot {
    pub fn new(
        fiber_tiers: Vec<FiberTier>,
        mobile_tiers: Vec<MobileTier>,
        bundles: Vec<Bundle>,
    ) -> Result<Self, DomainError> {
        let violations = validate(&fiber_tiers, &mobile_tiers, &bundles);
        if !violations.is_empty() {
            return Err(DomainError::CatalogValidation { violations });
        }
        Ok(Self { fiber_tiers, mobile_tiers, bundles })
    }

    pub fn fiber_tiers(&self) -> &[FiberTier] {
        &self.fiber_tiers
    }

    pub fn mobile_tiers(&self) -> &[MobileTier] {
        &self.mobile_tiers
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn fiber_tier(&self, id: &FiberTierId) -> Option<&FiberTier> {
        self.fiber_tiers.iter().find(|tier| &tier.id == id)
    }

    /// Cheapest catalog tier covering the requested allowance.
    ///
    /// For `-1` returns the catalog's unlimited tier, or a synthesized
    /// estimate when none exists. Otherwise scans tiers in ascending price
    /// order and takes the first non-unlimited tier with enough capacity;
    /// if every tier is too small, falls back to the most expensive tier in
    /// that order. Total and deterministic for any validated snapshot.
    pub fn resolve_mobile(&self, gb_needed: GbAllowance) -> MobileTier {
        if gb_needed.is_unlimited() {
            return match self.mobile_tiers.iter().find(|tier| tier.gb.is_unlimited()) {
                Some(tier) => tier.clone(),
                None => MobileTier {
                    id: MobileTierId(UNLIMITED_FALLBACK_ID.to_owned()),
                    gb: GbAllowance::UNLIMITED,
                    price: unlimited_fallback_price(),
                    name: UNLIMITED_FALLBACK_NAME.to_owned(),
                },
            };
        }

        let mut by_price: Vec<&MobileTier> = self.mobile_tiers.iter().collect();
        by_price.sort_by(|a, b| a.price.cmp(&b.price));

        by_price
            .iter()
            .find(|tier| !tier.gb.is_unlimited() && tier.gb.raw() >= gb_needed.raw())
            .or(by_price.last())
            .map(|tier| (*tier).clone())
            .expect("validated snapshot has at least one mobile tier")
    }
}

fn validate(
    fiber_tiers: &[FiberTier],
    mobile_tiers: &[MobileTier],
    bundles: &[Bundle],
) -> Vec<CatalogViolation> {
    let mut violations = Vec::new();

    if fiber_tiers.is_empty() {
        violations.push(CatalogViolation::new(
            "EMPTY_FIBER_TIERS",
            "catalog must contain at least one fiber tier",
        ));
    }
    if mobile_tiers.is_empty() {
        violations.push(CatalogViolation::new(
            "EMPTY_MOBILE_TIERS",
            "catalog must contain at least one mobile tier",
        ));
    }

    let mut fiber_ids = HashSet::new();
    for tier in fiber_tiers {
        if tier.id.0.trim().is_empty() {
            violations.push(CatalogViolation::new("MISSING_ID", "fiber tier is missing an id"));
        } else if !fiber_ids.insert(tier.id.0.clone()) {
            violations.push(CatalogViolation::new(
                "DUPLICATE_ID",
                format!("duplicate fiber tier id: {}", tier.id.0),
            ));
        }
        if tier.price < Decimal::ZERO {
            violations.push(CatalogViolation::new(
                "NEGATIVE_PRICE",
                format!("fiber tier {} has a negative price", tier.id.0),
            ));
        }
        if let Some(description) = &tier.description {
            if description.ca.trim().is_empty() || description.es.trim().is_empty() {
                violations.push(CatalogViolation::new(
                    "PARTIAL_LOCALIZATION",
                    format!("fiber tier {} has a partially localized description", tier.id.0),
                ));
            }
        }
    }

    let mut mobile_ids = HashSet::new();
    for tier in mobile_tiers {
        if tier.id.0.trim().is_empty() {
            violations.push(CatalogViolation::new("MISSING_ID", "mobile tier is missing an id"));
        } else if !mobile_ids.insert(tier.id.0.clone()) {
            violations.push(CatalogViolation::new(
                "DUPLICATE_ID",
                format!("duplicate mobile tier id: {}", tier.id.0),
            ));
        }
        if tier.price < Decimal::ZERO {
            violations.push(CatalogViolation::new(
                "NEGATIVE_PRICE",
                format!("mobile tier {} has a negative price", tier.id.0),
            ));
        }
    }

    let mut bundle_ids = HashSet::new();
    for bundle in bundles {
        if bundle.id.0.trim().is_empty() {
            violations.push(CatalogViolation::new("MISSING_ID", "bundle is missing an id"));
        } else if !bundle_ids.insert(bundle.id.0.clone()) {
            violations.push(CatalogViolation::new(
                "DUPLICATE_ID",
                format!("duplicate bundle id: {}", bundle.id.0),
            ));
        }
        if bundle.price < Decimal::ZERO {
            violations.push(CatalogViolation::new(
                "NEGATIVE_PRICE",
                format!("bundle {} has a negative price", bundle.id.0),
            ));
        }
        for text in [&bundle.name, &bundle.description] {
            if text.ca.trim().is_empty() || text.es.trim().is_empty() {
                violations.push(CatalogViolation::new(
                    "PARTIAL_LOCALIZATION",
                    format!("bundle {} has partially localized text", bundle.id.0),
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::CatalogSnapshot;
    use crate::domain::catalog::{
        FiberTier, FiberTierId, GbAllowance, MobileTier, MobileTierId, Technology,
    };
    use crate::errors::DomainError;

    fn fiber(id: &str, speed_mb: u32, cents: i64) -> FiberTier {
        FiberTier {
            id: FiberTierId(id.to_owned()),
            speed_mb,
            technology: Technology::Fiber,
            price: Decimal::new(cents, 2),
            name: format!("Fibra {speed_mb}Mb"),
            description: None,
        }
    }

    fn mobile(id: &str, gb: i64, cents: i64) -> MobileTier {
        MobileTier {
            id: MobileTierId(id.to_owned()),
            gb: GbAllowance::new(gb).expect("gb"),
            price: Decimal::new(cents, 2),
            name: if gb == -1 { "Il·limitat".to_owned() } else { format!("{gb}GB") },
        }
    }

    fn rate_card() -> CatalogSnapshot {
        CatalogSnapshot::new(
            vec![fiber("f2", 300, 2590)],
            vec![
                mobile("m1", 3, 590),
                mobile("m2", 50, 790),
                mobile("m3", 100, 990),
                mobile("m4", 200, 1590),
                mobile("m5", 350, 2390),
            ],
            Vec::new(),
        )
        .expect("valid catalog")
    }

    #[test]
    fn resolves_cheapest_tier_covering_the_request() {
        let catalog = rate_card();
        for needed in [0i64, 1, 3, 30, 50, 80, 100, 350] {
            let tier = catalog.resolve_mobile(GbAllowance::new(needed).expect("gb"));
            assert!(tier.gb.raw() >= needed, "tier {} must cover {needed}GB", tier.name);
        }
        assert_eq!(catalog.resolve_mobile(GbAllowance::limited(3)).id.0, "m1");
        assert_eq!(catalog.resolve_mobile(GbAllowance::limited(4)).id.0, "m2");
    }

    #[test]
    fn falls_back_to_most_expensive_tier_when_nothing_covers() {
        let catalog = rate_card();
        let tier = catalog.resolve_mobile(GbAllowance::limited(500));
        assert_eq!(tier.id.0, "m5");
    }

    #[test]
    fn unlimited_request_prefers_the_catalog_unlimited_tier() {
        let catalog = CatalogSnapshot::new(
            vec![fiber("f2", 300, 2590)],
            vec![mobile("m2", 50, 790), mobile("m9", -1, 1990)],
            Vec::new(),
        )
        .expect("valid catalog");

        let tier = catalog.resolve_mobile(GbAllowance::UNLIMITED);
        assert_eq!(tier.id.0, "m9");
        assert!(tier.gb.is_unlimited());
    }

    #[test]
    fn unlimited_request_synthesizes_an_estimate_when_absent() {
        let tier = rate_card().resolve_mobile(GbAllowance::UNLIMITED);
        assert_eq!(tier.id.0, "custom_unlimited");
        assert!(tier.gb.is_unlimited());
        assert_eq!(tier.price, Decimal::new(2500, 2));
        assert_eq!(tier.name, "Il·limitat (Est.)");
    }

    #[test]
    fn unlimited_tiers_are_skipped_in_the_finite_scan() {
        // Cheap unlimited tier must not absorb finite requests.
        let catalog = CatalogSnapshot::new(
            vec![fiber("f2", 300, 2590)],
            vec![mobile("m9", -1, 100), mobile("m2", 50, 790)],
            Vec::new(),
        )
        .expect("valid catalog");

        assert_eq!(catalog.resolve_mobile(GbAllowance::limited(10)).id.0, "m2");
    }

    #[test]
    fn non_monotonic_catalog_returns_the_cheaper_larger_tier() {
        // 20GB priced above 50GB: the price-ordered scan picks the 50GB
        // tier for a 10GB request. Cheaper-and-larger wins by construction.
        let catalog = CatalogSnapshot::new(
            vec![fiber("f2", 300, 2590)],
            vec![mobile("small-pricey", 20, 1200), mobile("big-cheap", 50, 790)],
            Vec::new(),
        )
        .expect("valid catalog");

        assert_eq!(catalog.resolve_mobile(GbAllowance::limited(10)).id.0, "big-cheap");
    }

    #[test]
    fn rejects_malformed_reference_data() {
        let error = CatalogSnapshot::new(
            vec![fiber("f2", 300, -100), fiber("f2", 300, 2590)],
            vec![mobile("m1", 3, 590), mobile("m1", 3, 590)],
            Vec::new(),
        )
        .expect_err("must fail fast");

        let DomainError::CatalogValidation { violations } = error else {
            panic!("expected catalog validation error");
        };
        assert!(violations.iter().any(|v| v.code == "NEGATIVE_PRICE"));
        assert_eq!(violations.iter().filter(|v| v.code == "DUPLICATE_ID").count(), 2);
    }

    #[test]
    fn rejects_empty_tier_lists() {
        let error = CatalogSnapshot::new(Vec::new(), Vec::new(), Vec::new())
            .expect_err("empty catalog is a precondition violation");
        let DomainError::CatalogValidation { violations } = error else {
            panic!("expected catalog validation error");
        };
        assert!(violations.iter().any(|v| v.code == "EMPTY_FIBER_TIERS"));
        assert!(violations.iter().any(|v| v.code == "EMPTY_MOBILE_TIERS"));
    }
}
