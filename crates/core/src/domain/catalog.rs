use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::i18n::LocalizedText;

/// Finite stand-in for an unlimited allowance when aggregating GB totals.
pub const NORMALIZED_UNLIMITED_GB: i64 = 999;

/// Mobile data allowance in GB. `-1` is the sole unlimited sentinel; the
/// raw ordering (unlimited below every finite allowance) is load-bearing for
/// the slot-fitting heuristic and must not be "fixed".
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct GbAllowance(i64);

impl GbAllowance {
    pub const UNLIMITED: GbAllowance = GbAllowance(-1);

    pub fn new(gb: i64) -> Result<Self, DomainError> {
        if gb < -1 {
            return Err(DomainError::InvariantViolation(format!(
                "invalid data allowance {gb}: only -1 (unlimited) or >= 0 is allowed"
            )));
        }
        Ok(Self(gb))
    }

    pub fn limited(gb: u32) -> Self {
        Self(i64::from(gb))
    }

    pub fn is_unlimited(self) -> bool {
        self.0 == -1
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    /// GB value used in aggregate arithmetic, with unlimited mapped to the
    /// finite sentinel.
    pub fn normalized(self) -> i64 {
        if self.is_unlimited() {
            NORMALIZED_UNLIMITED_GB
        } else {
            self.0
        }
    }
}

impl TryFrom<i64> for GbAllowance {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GbAllowance> for i64 {
    fn from(value: GbAllowance) -> Self {
        value.0
    }
}

impl std::fmt::Display for GbAllowance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{}GB", self.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiberTierId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MobileTierId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Technology {
    Fiber,
    Radio,
}

/// Purchasable internet connectivity product. `speed_mb == 0` means "no
/// fiber" (mobile-only selections).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiberTier {
    pub id: FiberTierId,
    pub speed_mb: u32,
    pub technology: Technology,
    pub price: Decimal,
    pub name: String,
    pub description: Option<LocalizedText>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobileTier {
    pub id: MobileTierId,
    pub gb: GbAllowance,
    pub price: Decimal,
    pub name: String,
}

/// Pre-priced fiber + mobile combination sold as a single SKU.
/// `speed_mb == 0` is the any-speed wildcard for eligibility.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: BundleId,
    pub name: LocalizedText,
    pub speed_mb: u32,
    pub mobile_lines: u32,
    pub mobile_gb_per_line: GbAllowance,
    pub has_landline: bool,
    pub price: Decimal,
    pub description: LocalizedText,
}

#[cfg(test)]
mod tests {
    use super::{GbAllowance, NORMALIZED_UNLIMITED_GB};

    #[test]
    fn unlimited_sentinel_is_the_only_negative_allowance() {
        assert!(GbAllowance::new(-1).is_ok());
        assert!(GbAllowance::new(0).is_ok());
        assert!(GbAllowance::new(-2).is_err());
        assert!(GbAllowance::new(-999).is_err());
    }

    #[test]
    fn unlimited_normalizes_to_finite_sentinel() {
        assert_eq!(GbAllowance::UNLIMITED.normalized(), NORMALIZED_UNLIMITED_GB);
        assert_eq!(GbAllowance::limited(50).normalized(), 50);
    }

    #[test]
    fn raw_order_puts_unlimited_below_every_finite_allowance() {
        assert!(GbAllowance::UNLIMITED < GbAllowance::limited(0));
        assert!(GbAllowance::limited(50) < GbAllowance::limited(100));
    }

    #[test]
    fn serde_round_trips_through_raw_values() {
        let unlimited: GbAllowance = serde_json::from_str("-1").expect("unlimited");
        assert!(unlimited.is_unlimited());
        assert!(serde_json::from_str::<GbAllowance>("-3").is_err());
        assert_eq!(serde_json::to_string(&GbAllowance::limited(50)).expect("json"), "50");
    }
}
