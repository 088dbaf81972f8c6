//! Replenishment policy: the single value object that parameterizes the engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::models::Rank;

/// How the lot selector turns a need quantity into an offer choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSelectionMode {
    /// Banding ladder: lot closest to the need without excess, then the
    /// near-excess band, then a unit lot, then the smallest lot
    ClosestFit,
    /// Smallest lot that covers the need, else the largest lot
    RoundUpSufficient,
    /// Lowest total order cost across all offers, ignoring lot fit
    MinTotalCost,
}

impl LotSelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotSelectionMode::ClosestFit => "closest_fit",
            LotSelectionMode::RoundUpSufficient => "round_up_sufficient",
            LotSelectionMode::MinTotalCost => "min_total_cost",
        }
    }
}

impl std::fmt::Display for LotSelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a SKU that needs stock but has no purchasable offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingOfferPolicy {
    /// Leave the SKU out of the report
    #[default]
    Drop,
    /// Keep the SKU with empty order fields for manual review
    EmitBlank,
}

/// One value per rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTable<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub test: T,
    pub unclassified: T,
}

impl<T> RankTable<T> {
    pub fn get(&self, rank: Rank) -> &T {
        match rank {
            Rank::A => &self.a,
            Rank::B => &self.b,
            Rank::C => &self.c,
            Rank::Test => &self.test,
            Rank::Unclassified => &self.unclassified,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rank, &T)> {
        Rank::ALL.into_iter().map(move |rank| (rank, self.get(rank)))
    }
}

impl<T: Clone> RankTable<T> {
    pub fn uniform(value: T) -> Self {
        Self {
            a: value.clone(),
            b: value.clone(),
            c: value.clone(),
            test: value.clone(),
            unclassified: value,
        }
    }
}

/// Engine parameters.
///
/// Every rule difference between report screens is expressed here, so a
/// single engine serves all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Shown on every report so readers know which rules were active
    pub name: String,
    /// Safety margin applied to period sales
    pub multipliers: RankTable<Decimal>,
    /// Reorder point as a fraction of period sales; `None` disables the gate
    pub reorder_fractions: Option<RankTable<Decimal>>,
    pub lot_selection: RankTable<LotSelectionMode>,
    /// Upper bound of the closest-fit near-excess band, relative to need
    pub near_excess_factor: Decimal,
    /// Available stock at or below this forces a need of at least 1
    pub floor_stock_threshold: u64,
    /// On-order quantities routed through these channels are not coverage
    pub excluded_channels: Vec<String>,
    /// Skip SKUs ordered within this many days before the run date
    pub recent_order_window_days: Option<u32>,
    pub missing_offer: MissingOfferPolicy,
}

impl Policy {
    pub const STANDARD: &'static str = "standard";
    pub const ROUND_UP_TOP_TIER: &'static str = "round_up_top_tier";
    pub const CLASSIC: &'static str = "classic";

    /// Upper bound for rank multipliers, reorder fractions and the
    /// near-excess factor
    pub const MAX_FACTOR: Decimal = Decimal::ONE_HUNDRED;

    /// Rank-weighted closest-fit policy with reorder-point hysteresis
    pub fn standard() -> Self {
        Self {
            name: Self::STANDARD.to_string(),
            multipliers: RankTable {
                a: Decimal::new(15, 1),
                b: Decimal::new(12, 1),
                c: Decimal::ONE,
                test: Decimal::new(15, 1),
                unclassified: Decimal::ONE,
            },
            reorder_fractions: Some(RankTable {
                a: Decimal::new(12, 1),
                b: Decimal::ONE,
                c: Decimal::new(7, 1),
                test: Decimal::ONE,
                unclassified: Decimal::ONE,
            }),
            lot_selection: RankTable {
                a: LotSelectionMode::RoundUpSufficient,
                ..RankTable::uniform(LotSelectionMode::ClosestFit)
            },
            near_excess_factor: Decimal::new(15, 1),
            floor_stock_threshold: 1,
            excluded_channels: Vec::new(),
            recent_order_window_days: Some(1),
            missing_offer: MissingOfferPolicy::Drop,
        }
    }

    /// Standard rules, but A and B ranks never order less than the need
    pub fn round_up_top_tier() -> Self {
        Self {
            name: Self::ROUND_UP_TOP_TIER.to_string(),
            lot_selection: RankTable {
                a: LotSelectionMode::RoundUpSufficient,
                b: LotSelectionMode::RoundUpSufficient,
                ..RankTable::uniform(LotSelectionMode::ClosestFit)
            },
            ..Self::standard()
        }
    }

    /// Pure cost minimization with no rank margins and no reorder gate
    pub fn classic() -> Self {
        Self {
            name: Self::CLASSIC.to_string(),
            multipliers: RankTable::uniform(Decimal::ONE),
            reorder_fractions: None,
            lot_selection: RankTable::uniform(LotSelectionMode::MinTotalCost),
            near_excess_factor: Decimal::new(15, 1),
            floor_stock_threshold: 1,
            excluded_channels: Vec::new(),
            recent_order_window_days: None,
            missing_offer: MissingOfferPolicy::Drop,
        }
    }

    /// Look up a preset by name (`standard`, `round_up_top_tier`, `classic`)
    pub fn preset(name: &str) -> Result<Self, PolicyError> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            Self::STANDARD | "" => Ok(Self::standard()),
            Self::ROUND_UP_TOP_TIER => Ok(Self::round_up_top_tier()),
            Self::CLASSIC => Ok(Self::classic()),
            _ => Err(PolicyError::UnknownPreset(name.to_string())),
        }
    }

    pub fn with_excluded_channels(mut self, channels: Vec<String>) -> Self {
        self.excluded_channels = channels;
        self
    }

    pub fn with_missing_offer(mut self, missing_offer: MissingOfferPolicy) -> Self {
        self.missing_offer = missing_offer;
        self
    }

    pub fn with_recent_order_window(mut self, days: Option<u32>) -> Self {
        self.recent_order_window_days = days;
        self
    }

    pub fn multiplier(&self, rank: Rank) -> Decimal {
        *self.multipliers.get(rank)
    }

    pub fn reorder_fraction(&self, rank: Rank) -> Option<Decimal> {
        self.reorder_fractions.as_ref().map(|t| *t.get(rank))
    }

    pub fn lot_mode(&self, rank: Rank) -> LotSelectionMode {
        *self.lot_selection.get(rank)
    }

    /// Check parameter ranges and reject mixed cost modes
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (rank, value) in self.multipliers.iter() {
            if *value <= Decimal::ZERO {
                return Err(PolicyError::NonPositiveMultiplier {
                    rank: rank.to_string(),
                    value: value.to_string(),
                });
            }
            if *value > Self::MAX_FACTOR {
                return Err(PolicyError::MultiplierTooLarge {
                    rank: rank.to_string(),
                    value: value.to_string(),
                    max: Self::MAX_FACTOR.to_string(),
                });
            }
        }

        if let Some(fractions) = &self.reorder_fractions {
            for (rank, value) in fractions.iter() {
                if value.is_sign_negative() && !value.is_zero() {
                    return Err(PolicyError::NegativeReorderFraction {
                        rank: rank.to_string(),
                        value: value.to_string(),
                    });
                }
                if *value > Self::MAX_FACTOR {
                    return Err(PolicyError::ReorderFractionTooLarge {
                        rank: rank.to_string(),
                        value: value.to_string(),
                        max: Self::MAX_FACTOR.to_string(),
                    });
                }
            }
        }

        let factor = self.near_excess_factor;
        if factor < Decimal::ONE || factor > Self::MAX_FACTOR {
            return Err(PolicyError::NearExcessFactorOutOfRange {
                value: factor.to_string(),
                max: Self::MAX_FACTOR.to_string(),
            });
        }

        let cost_ranks = self
            .lot_selection
            .iter()
            .filter(|(_, mode)| **mode == LotSelectionMode::MinTotalCost)
            .count();
        if cost_ranks != 0 && cost_ranks != Rank::ALL.len() {
            return Err(PolicyError::MixedCostMode);
        }

        Ok(())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for name in ["standard", "round-up-top-tier", "CLASSIC", ""] {
            let policy = Policy::preset(name).unwrap();
            assert!(policy.validate().is_ok(), "preset {} should validate", name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            Policy::preset("aggressive"),
            Err(PolicyError::UnknownPreset("aggressive".to_string()))
        );
    }

    #[test]
    fn test_standard_rank_tables() {
        let policy = Policy::standard();
        assert_eq!(policy.multiplier(Rank::B), Decimal::new(12, 1));
        assert_eq!(policy.multiplier(Rank::Unclassified), Decimal::ONE);
        assert_eq!(policy.reorder_fraction(Rank::C), Some(Decimal::new(7, 1)));
        assert_eq!(policy.lot_mode(Rank::A), LotSelectionMode::RoundUpSufficient);
        assert_eq!(policy.lot_mode(Rank::B), LotSelectionMode::ClosestFit);
    }

    #[test]
    fn test_round_up_top_tier() {
        let policy = Policy::round_up_top_tier();
        assert_eq!(policy.lot_mode(Rank::B), LotSelectionMode::RoundUpSufficient);
        assert_eq!(policy.lot_mode(Rank::C), LotSelectionMode::ClosestFit);
        assert_eq!(policy.multipliers, Policy::standard().multipliers);
    }

    #[test]
    fn test_classic_has_no_gate() {
        let policy = Policy::classic();
        assert_eq!(policy.reorder_fraction(Rank::A), None);
        assert_eq!(policy.lot_mode(Rank::Test), LotSelectionMode::MinTotalCost);
    }

    #[test]
    fn test_rejects_mixed_cost_mode() {
        let mut policy = Policy::standard();
        policy.lot_selection.c = LotSelectionMode::MinTotalCost;
        assert_eq!(policy.validate(), Err(PolicyError::MixedCostMode));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut policy = Policy::standard();
        policy.multipliers.b = Decimal::ZERO;
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NonPositiveMultiplier { .. })
        ));

        let mut policy = Policy::standard();
        policy.reorder_fractions.as_mut().unwrap().a = Decimal::from(-1);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NegativeReorderFraction { .. })
        ));

        let mut policy = Policy::standard();
        policy.near_excess_factor = Decimal::new(9, 1);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NearExcessFactorOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_factors() {
        let mut policy = Policy::standard();
        policy.multipliers.c = Decimal::from(u64::MAX);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::MultiplierTooLarge { .. })
        ));

        let mut policy = Policy::standard();
        policy.reorder_fractions.as_mut().unwrap().b = Decimal::new(1001, 1);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ReorderFractionTooLarge { .. })
        ));

        let mut policy = Policy::standard();
        policy.near_excess_factor = Decimal::from(1_000);
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::NearExcessFactorOutOfRange { .. })
        ));

        let mut policy = Policy::standard();
        policy.multipliers.a = Policy::MAX_FACTOR;
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_serde_roundtrip_shape() {
        let json = serde_json::to_value(Policy::standard()).unwrap();
        assert_eq!(json["lot_selection"]["a"], "round_up_sufficient");
        assert_eq!(json["missing_offer"], "drop");
    }
}
