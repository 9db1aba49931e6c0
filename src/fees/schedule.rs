use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::money::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("fee schedule has no tiers")]
    Empty,
    #[error("tier {index} upper bound {bound} is not above the previous bound {previous}")]
    NotAscending {
        index: usize,
        bound: Decimal,
        previous: Decimal,
    },
    #[error("tier {index} has no upper bound but is not the last tier")]
    UnboundedBeforeEnd { index: usize },
    #[error("last tier must have no upper bound, found {bound}")]
    BoundedCatchAll { bound: Decimal },
    #[error("tier {index} has negative upper bound {bound}")]
    NegativeBound { index: usize, bound: Decimal },
    #[error("tier {index} percentage {percent} is outside 0..=100")]
    PercentOutOfRange { index: usize, percent: Decimal },
}

/// One band of the escrow fee table.
///
/// A tier covers principals above the previous tier's upper bound up to and
/// including its own. `upper_bound == None` marks the catch-all tier.
///
/// `total_fee_percent` is stored rather than derived from the two shares. The
/// current table splits every fee evenly, but nothing here assumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTier {
    pub upper_bound: Option<Decimal>,
    pub buyer_fee_percent: Decimal,
    pub seller_fee_percent: Decimal,
    pub total_fee_percent: Decimal,
}

impl FeeTier {
    pub fn bounded(upper_bound: Decimal, buyer: Decimal, seller: Decimal, total: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            buyer_fee_percent: buyer,
            seller_fee_percent: seller,
            total_fee_percent: total,
        }
    }

    pub fn catch_all(buyer: Decimal, seller: Decimal, total: Decimal) -> Self {
        Self {
            upper_bound: None,
            buyer_fee_percent: buyer,
            seller_fee_percent: seller,
            total_fee_percent: total,
        }
    }

    /// Inclusive upper-bound test.
    pub fn covers(&self, amount: Decimal) -> bool {
        self.upper_bound.map_or(true, |upper| amount <= upper)
    }

    fn percents(&self) -> [Decimal; 3] {
        [
            self.buyer_fee_percent,
            self.seller_fee_percent,
            self.total_fee_percent,
        ]
    }
}

/// Ordered fee tiers, evaluated ascending, first match wins.
///
/// Construction guarantees that every non-negative principal matches exactly
/// one tier: bounded tiers are strictly ascending and the list ends with a
/// catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    bounded: Vec<FeeTier>,
    catch_all: FeeTier,
}

static STANDARD: OnceLock<FeeSchedule> = OnceLock::new();

impl FeeSchedule {
    pub fn new(tiers: Vec<FeeTier>) -> Result<Self, ScheduleError> {
        let mut tiers = tiers;
        let catch_all = tiers.pop().ok_or(ScheduleError::Empty)?;
        if let Some(bound) = catch_all.upper_bound {
            return Err(ScheduleError::BoundedCatchAll { bound });
        }

        let mut previous: Option<Decimal> = None;
        for (index, tier) in tiers.iter().enumerate() {
            let bound = tier
                .upper_bound
                .ok_or(ScheduleError::UnboundedBeforeEnd { index })?;
            if bound.is_sign_negative() {
                return Err(ScheduleError::NegativeBound { index, bound });
            }
            if let Some(previous) = previous {
                if bound <= previous {
                    return Err(ScheduleError::NotAscending {
                        index,
                        bound,
                        previous,
                    });
                }
            }
            previous = Some(bound);
        }

        for (index, tier) in tiers.iter().chain(std::iter::once(&catch_all)).enumerate() {
            if let Some(percent) = tier
                .percents()
                .into_iter()
                .find(|p| p.is_sign_negative() || *p > Decimal::ONE_HUNDRED)
            {
                return Err(ScheduleError::PercentOutOfRange { index, percent });
            }
        }

        Ok(Self {
            bounded: tiers,
            catch_all,
        })
    }

    /// The marketplace's fee table. Every quote in the crate goes through this
    /// one instance.
    pub fn standard() -> &'static FeeSchedule {
        STANDARD.get_or_init(|| FeeSchedule {
            bounded: vec![
                FeeTier::bounded(dec!(1000000), dec!(5.0), dec!(5.0), dec!(10.0)),
                FeeTier::bounded(dec!(5000000), dec!(2.5), dec!(2.5), dec!(5.0)),
                FeeTier::bounded(dec!(50000000), dec!(2.0), dec!(2.0), dec!(4.0)),
                FeeTier::bounded(dec!(200000000), dec!(1.5), dec!(1.5), dec!(3.0)),
                FeeTier::bounded(dec!(1000000000), dec!(1.0), dec!(1.0), dec!(2.0)),
            ],
            catch_all: FeeTier::catch_all(dec!(0.5), dec!(0.5), dec!(1.0)),
        })
    }

    pub fn tier_for(&self, principal: Principal) -> &FeeTier {
        let amount = principal.amount();
        self.bounded
            .iter()
            .find(|tier| tier.covers(amount))
            .unwrap_or(&self.catch_all)
    }

    /// Position of the matching tier, zero-based.
    pub fn tier_index(&self, principal: Principal) -> usize {
        let amount = principal.amount();
        self.bounded
            .iter()
            .position(|tier| tier.covers(amount))
            .unwrap_or(self.bounded.len())
    }

    pub fn tiers(&self) -> impl Iterator<Item = &FeeTier> {
        self.bounded.iter().chain(std::iter::once(&self.catch_all))
    }

    /// Tiers paired with their exclusive lower bound (`None` for the first).
    pub fn bands(&self) -> impl Iterator<Item = (Option<Decimal>, &FeeTier)> {
        let lowers = std::iter::once(None).chain(self.bounded.iter().map(|t| t.upper_bound));
        lowers.zip(self.tiers())
    }
}

impl Serialize for FeeSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            tiers: Vec<&'a FeeTier>,
        }

        View {
            tiers: self.tiers().collect(),
        }
        .serialize(serializer)
    }
}
