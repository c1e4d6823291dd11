//! Fee schedule for maker and taker settlement fees.

use serde::{Deserialize, Serialize};

/// Upper bound on fee rates: 10_000 bps = 100%.
pub const MAX_FEE_BPS: u32 = 10_000;

/// Configurable fee schedule for maker and taker fees.
///
/// Fees are expressed in basis points (bps), where 1 bps = 0.01% = 0.0001,
/// and are always denominated in the quote asset. Rates are non-negative and
/// at most [`MAX_FEE_BPS`]; division truncates, so the computed fee never
/// exceeds `quote_amount * rate_bps / 10_000`.
///
/// # Examples
///
/// ```
/// use clob_engine::FeeSchedule;
///
/// // 10 bps maker fee, 20 bps taker fee
/// let schedule = FeeSchedule::new(10, 20);
///
/// // Fees on a 1_000_000_000 quote amount
/// assert_eq!(schedule.calculate_fee(1_000_000_000, true), 1_000_000);
/// assert_eq!(schedule.calculate_fee(1_000_000_000, false), 2_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Maker fee in basis points.
    pub maker_fee_bps: u32,

    /// Taker fee in basis points.
    pub taker_fee_bps: u32,
}

impl FeeSchedule {
    /// Create a new fee schedule.
    ///
    /// Rates above [`MAX_FEE_BPS`] are rejected by the facade's
    /// configuration surface; this constructor itself does not validate.
    #[must_use = "FeeSchedule does nothing unless used"]
    pub fn new(maker_fee_bps: u32, taker_fee_bps: u32) -> Self {
        Self {
            maker_fee_bps,
            taker_fee_bps,
        }
    }

    /// Calculate the fee for one settlement leg.
    ///
    /// # Arguments
    ///
    /// * `quote_amount` - The quote value of the settlement
    ///   (`quantity * price / 10^base_decimals`)
    /// * `is_maker` - true for the maker leg, false for the taker leg
    ///
    /// # Returns
    ///
    /// The fee in quote units, truncated toward zero.
    #[must_use = "Fee calculation result must be used"]
    #[inline]
    pub fn calculate_fee(&self, quote_amount: u128, is_maker: bool) -> u128 {
        let bps = if is_maker {
            self.maker_fee_bps
        } else {
            self.taker_fee_bps
        };
        quote_amount
            .checked_mul(bps as u128)
            .map(|product| product / 10_000)
            .unwrap_or(u128::MAX)
    }

    /// Whether both rates are within `[0, MAX_FEE_BPS]`.
    #[must_use]
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.maker_fee_bps <= MAX_FEE_BPS && self.taker_fee_bps <= MAX_FEE_BPS
    }

    /// Whether both rates are zero.
    #[must_use]
    #[inline]
    pub fn is_zero_fee(&self) -> bool {
        self.maker_fee_bps == 0 && self.taker_fee_bps == 0
    }

    /// A schedule with zero fees on both legs.
    #[must_use]
    pub fn zero_fee() -> Self {
        Self::new(0, 0)
    }

    /// A schedule charging only takers (common in some venues).
    #[must_use]
    pub fn taker_only(taker_fee_bps: u32) -> Self {
        Self::new(0, taker_fee_bps)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::zero_fee()
    }
}
