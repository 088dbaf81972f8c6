//! Lot selector: which offer to buy from, and how many lots

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LotSelectionMode, Policy};
use crate::models::{OfferRecord, Rank};
use crate::types::SkuId;

/// The chosen offer and the order it implies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSelection {
    pub supplier_name: String,
    pub lot_size: u64,
    pub unit_price: Decimal,
    pub order_quantity: u64,
    pub total_cost: Decimal,
    pub mode: LotSelectionMode,
}

/// Round a need up to a whole number of lots
pub fn round_up_to_lot(need: u64, lot_size: u64) -> u64 {
    if lot_size == 0 {
        return 0;
    }
    need.div_ceil(lot_size).saturating_mul(lot_size)
}

/// A purchasable offer with its position in the input and the order it
/// implies for the current need
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    position: usize,
    supplier: &'a str,
    lot: u64,
    price: Decimal,
    quantity: u64,
    cost: Decimal,
}

impl<'a> Candidate<'a> {
    /// `None` when the offer is not purchasable or its cost is not
    /// representable
    fn for_need(position: usize, offer: &'a OfferRecord, need: u64) -> Option<Self> {
        let (lot, price) = offer.purchasable_terms()?;
        let quantity = round_up_to_lot(need, lot);
        let cost = Decimal::from(quantity).checked_mul(price)?;
        Some(Self {
            position,
            supplier: offer.supplier_name.as_str(),
            lot,
            price,
            quantity,
            cost,
        })
    }

    /// Price, then supplier name, then input order
    fn tie_break(&self, other: &Self) -> Ordering {
        self.price
            .cmp(&other.price)
            .then_with(|| self.supplier.cmp(other.supplier))
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// Picks an offer for a need quantity under one selection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotSelector {
    mode: LotSelectionMode,
    near_excess_factor: Decimal,
}

impl LotSelector {
    pub fn new(mode: LotSelectionMode) -> Self {
        Self {
            mode,
            near_excess_factor: Decimal::new(15, 1),
        }
    }

    /// The selector a policy prescribes for a rank
    pub fn for_rank(policy: &Policy, rank: Rank) -> Self {
        Self {
            mode: policy.lot_mode(rank),
            near_excess_factor: policy.near_excess_factor,
        }
    }

    pub fn with_near_excess_factor(mut self, factor: Decimal) -> Self {
        self.near_excess_factor = factor;
        self
    }

    pub fn mode(&self) -> LotSelectionMode {
        self.mode
    }

    /// Select an offer for `need` units of `sku_id`.
    ///
    /// Offers for other SKUs, offers without a positive lot and a valid
    /// price, and offers whose total cost overflows are ignored. Returns `None` when nothing purchasable remains or
    /// when there is nothing to order.
    pub fn select<'a>(
        &self,
        sku_id: &SkuId,
        need: u64,
        offers: impl IntoIterator<Item = &'a OfferRecord>,
    ) -> Option<LotSelection> {
        if need == 0 {
            return None;
        }

        let candidates: Vec<Candidate<'a>> = offers
            .into_iter()
            .filter(|offer| offer.sku_id == *sku_id)
            .enumerate()
            .filter_map(|(position, offer)| Candidate::for_need(position, offer, need))
            .collect();

        let chosen = match self.mode {
            LotSelectionMode::ClosestFit => self.closest_fit(need, &candidates),
            LotSelectionMode::RoundUpSufficient => round_up_sufficient(need, &candidates),
            LotSelectionMode::MinTotalCost => min_total_cost(&candidates),
        };

        let Some(chosen) = chosen else {
            tracing::debug!(sku = %sku_id, need, "no purchasable offer");
            return None;
        };

        Some(LotSelection {
            supplier_name: chosen.supplier.to_string(),
            lot_size: chosen.lot,
            unit_price: chosen.price,
            order_quantity: chosen.quantity,
            total_cost: chosen.cost,
            mode: self.mode,
        })
    }

    fn closest_fit<'a>(&self, need: u64, candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
        // Fits within the need: the largest such lot wastes the least
        let within = candidates
            .iter()
            .filter(|c| c.lot <= need)
            .min_by(|a, b| (need - a.lot).cmp(&(need - b.lot)).then_with(|| a.tie_break(b)));
        if let Some(c) = within {
            return Some(*c);
        }

        let ceiling = Decimal::from(need)
            .checked_mul(self.near_excess_factor)
            .unwrap_or(Decimal::MAX);
        // A unit lot always fits within a need of at least 1, so the guard
        // here and the unit-lot step below only keep the ladder complete
        let near_excess = candidates
            .iter()
            .filter(|c| c.lot > need && Decimal::from(c.lot) <= ceiling && c.lot != 1)
            .min_by(|a, b| (a.lot - need).cmp(&(b.lot - need)).then_with(|| a.tie_break(b)));
        if let Some(c) = near_excess {
            return Some(*c);
        }

        let unit_lot = candidates
            .iter()
            .filter(|c| c.lot == 1)
            .min_by(|a, b| a.tie_break(b));
        if let Some(c) = unit_lot {
            return Some(*c);
        }

        candidates
            .iter()
            .min_by(|a, b| a.lot.cmp(&b.lot).then_with(|| a.tie_break(b)))
            .copied()
    }
}

fn round_up_sufficient<'a>(need: u64, candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    let covering = candidates
        .iter()
        .filter(|c| c.lot >= need)
        .min_by(|a, b| a.lot.cmp(&b.lot).then_with(|| a.tie_break(b)));
    if let Some(c) = covering {
        return Some(*c);
    }

    candidates
        .iter()
        .min_by(|a, b| b.lot.cmp(&a.lot).then_with(|| a.tie_break(b)))
        .copied()
}

fn min_total_cost<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    candidates
        .iter()
        .min_by(|a, b| {
            a.cost
                .cmp(&b.cost)
                .then_with(|| a.quantity.cmp(&b.quantity))
                .then_with(|| a.lot.cmp(&b.lot))
                .then_with(|| a.supplier.cmp(b.supplier))
                .then_with(|| a.position.cmp(&b.position))
        })
        .copied()
}

/// Select with the default near-excess factor
pub fn select_offer<'a>(
    sku_id: &SkuId,
    need: u64,
    offers: impl IntoIterator<Item = &'a OfferRecord>,
    mode: LotSelectionMode,
) -> Option<LotSelection> {
    LotSelector::new(mode).select(sku_id, need, offers)
}
