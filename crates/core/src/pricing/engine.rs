//! Tariff recommendation engine.
//!
//! Prices a fiber + mobile-line selection à la carte, then searches the
//! bundle catalog for the cheapest bundle scenario (bundle plus any extra
//! à-la-carte lines) that beats it. Pure and synchronous: the caller holds
//! the selection and invokes `recommend` after every mutation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;
use crate::domain::catalog::{Bundle, GbAllowance, Technology};
use crate::domain::selection::{MobileLineRequest, TariffSelection};
use crate::errors::DomainError;
use crate::i18n::Language;

/// A bundle only wins when it is cheaper than the running best by at least
/// one cent. Hard contract: a scenario exactly 0.01 cheaper is accepted, one
/// 0.005 cheaper is not.
fn price_epsilon() -> Decimal {
    Decimal::new(1, 2)
}

fn custom_selection_label(language: Language) -> &'static str {
    match language {
        Language::Ca => "La teva selecció",
        Language::Es => "Tu selección",
    }
}

fn line_label(language: Language) -> &'static str {
    match language {
        Language::Ca => "Línia",
        Language::Es => "Línea",
    }
}

fn extra_line_label(language: Language) -> &'static str {
    match language {
        Language::Ca => "+ Línia Extra",
        Language::Es => "+ Línea Extra",
    }
}

/// Comparison between the user's à-la-carte selection and the best bundle
/// scenario. When no bundle wins, the recommended side mirrors the custom
/// side and `is_savings` is false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub custom_price: Decimal,
    pub custom_name: String,
    pub recommended_price: Decimal,
    pub recommended_name: String,
    pub recommended_details: Vec<String>,
    pub is_savings: bool,
    pub savings_amount: Decimal,
    /// Recommended speed minus selected speed, in Mb. Positive is an upgrade.
    pub speed_diff_mb: i64,
    /// Recommended aggregate GB minus requested aggregate GB, with unlimited
    /// normalized to 999.
    pub gb_diff: i64,
}

pub trait RecommendationEngine: Send + Sync {
    fn recommend(
        &self,
        catalog: &CatalogSnapshot,
        selection: &TariffSelection,
        language: Language,
    ) -> Result<Recommendation, DomainError>;
}

#[derive(Default)]
pub struct GreedyRecommendationEngine;

impl RecommendationEngine for GreedyRecommendationEngine {
    fn recommend(
        &self,
        catalog: &CatalogSnapshot,
        selection: &TariffSelection,
        language: Language,
    ) -> Result<Recommendation, DomainError> {
        recommend(catalog, selection, language)
    }
}

pub fn recommend(
    catalog: &CatalogSnapshot,
    selection: &TariffSelection,
    language: Language,
) -> Result<Recommendation, DomainError> {
    let fiber = catalog
        .fiber_tier(&selection.fiber_id)
        .ok_or_else(|| DomainError::UnknownFiberTier { id: selection.fiber_id.0.clone() })?;

    let mut mobile_total = Decimal::ZERO;
    let mut requested_gb: i64 = 0;
    let mut baseline_details = vec![fiber.name.clone()];
    for (index, line) in selection.mobile_lines.iter().enumerate() {
        let tier = catalog.resolve_mobile(line.gb);
        mobile_total += tier.price;
        requested_gb += line.gb.normalized();
        baseline_details.push(format!("{} {}: {}", line_label(language), index + 1, tier.name));
    }
    let custom_price = fiber.price + mobile_total;
    let custom_name = custom_selection_label(language).to_owned();

    let mut best_price = custom_price;
    let mut best_name = custom_name.clone();
    let mut best_speed = fiber.speed_mb;
    let mut best_total_gb = requested_gb;
    let mut best_details = baseline_details;
    let mut found_better_bundle = false;

    // Bundles upgrade fiber selections only; radio stays à la carte.
    if fiber.technology == Technology::Fiber {
        for bundle in catalog.bundles() {
            // A bundle must not under-deliver speed. 0 is the wildcard.
            if bundle.speed_mb < fiber.speed_mb && bundle.speed_mb != 0 {
                continue;
            }

            let scenario = price_bundle_scenario(catalog, bundle, &selection.mobile_lines, language);
            if scenario.price + price_epsilon() <= best_price {
                best_price = scenario.price;
                best_name = bundle.name.get(language).to_owned();
                best_speed = bundle.speed_mb;
                best_total_gb = scenario.total_gb;
                best_details = scenario.details;
                found_better_bundle = true;
            }
        }
    }

    Ok(Recommendation {
        custom_price,
        custom_name,
        recommended_price: best_price,
        recommended_name: best_name,
        recommended_details: best_details,
        is_savings: found_better_bundle,
        savings_amount: custom_price - best_price,
        speed_diff_mb: i64::from(best_speed) - i64::from(fiber.speed_mb),
        gb_diff: best_total_gb - requested_gb,
    })
}

struct BundleScenario {
    price: Decimal,
    total_gb: i64,
    details: Vec<String>,
}

fn price_bundle_scenario(
    catalog: &CatalogSnapshot,
    bundle: &Bundle,
    lines: &[MobileLineRequest],
    language: Language,
) -> BundleScenario {
    let slots = vec![bundle.mobile_gb_per_line; bundle.mobile_lines as usize];
    // Slot capacity counts toward the scenario total whether or not a user
    // line ends up consuming it.
    let mut total_gb: i64 = slots.iter().map(|slot| slot.normalized()).sum();

    let assignment = assign_lines_to_slots(slots, lines);

    let mut details = vec![bundle.description.get(language).to_owned()];
    let mut extra_cost = Decimal::ZERO;
    for line in &assignment.uncovered {
        let tier = catalog.resolve_mobile(line.gb);
        extra_cost += tier.price;
        total_gb += tier.gb.normalized();
        details.push(format!("{}: {}", extra_line_label(language), tier.name));
    }

    BundleScenario { price: bundle.price + extra_cost, total_gb, details }
}

pub(crate) struct SlotAssignment {
    /// Covered lines paired with the slot each one consumed.
    pub covered: Vec<(MobileLineRequest, GbAllowance)>,
    /// Lines left to price à la carte, in assignment order.
    pub uncovered: Vec<MobileLineRequest>,
}

/// Greedy largest-request-first, first-fit slot assignment. Not an optimal
/// matching; bundle slot counts are one or two in practice and the exact
/// assignment order is pinned by tests because changing it changes prices.
pub(crate) fn assign_lines_to_slots(
    mut slots: Vec<GbAllowance>,
    lines: &[MobileLineRequest],
) -> SlotAssignment {
    let mut requested = lines.to_vec();
    // Raw descending order: unlimited requests (-1) sort last.
    requested.sort_by(|a, b| b.gb.cmp(&a.gb));

    let mut covered = Vec::new();
    let mut uncovered = Vec::new();
    for line in requested {
        // Raw comparison makes any slot fit an unlimited request; preserved
        // behavior, not an accident.
        match slots.iter().position(|slot| slot.is_unlimited() || slot.raw() >= line.gb.raw()) {
            Some(index) => covered.push((line, slots.remove(index))),
            None => uncovered.push(line),
        }
    }

    SlotAssignment { covered, uncovered }
}
