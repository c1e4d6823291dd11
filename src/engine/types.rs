//! Core vocabulary types shared across the engine components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a trading principal.
///
/// Traders own orders, hold asset balances behind the transfer capability,
/// and may appear in the admin principal set or as the fee recipient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TraderId(pub u64);

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trader-{}", self.0)
    }
}

/// Identity of an order.
///
/// Order ids are produced by a single monotonic counter owned by the
/// [`crate::OrderRegistry`]; arrival order of ids is the FIFO tie-break
/// within a price level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order-{}", self.0)
    }
}

/// Identity of a transferable asset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset identity from its symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// The asset symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// A market pair: the base asset priced in the quote asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// The asset being bought and sold; quantities are denominated in it.
    pub base: AssetId,
    /// The pricing asset; prices and fees are denominated in it.
    pub quote: AssetId,
}

impl Pair {
    /// Create a pair from base and quote asset identities.
    pub fn new(base: impl Into<AssetId>, quote: impl Into<AssetId>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Conventional `BASE/QUOTE` display symbol.
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Configuration of a pair accepted by the engine facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// The market pair.
    pub pair: Pair,
    /// Number of fixed-point decimals of the base asset. Quantities are
    /// expressed in these units and the quote amount of a settlement is
    /// `quantity * price / 10^base_decimals` (truncating).
    pub base_decimals: u32,
}

impl PairConfig {
    /// Create a pair configuration.
    pub fn new(pair: Pair, base_decimals: u32) -> Self {
        Self {
            pair,
            base_decimals,
        }
    }

    /// One whole base asset in fixed-point units (`10^base_decimals`).
    #[must_use]
    #[inline]
    pub fn base_unit(&self) -> u128 {
        10u128.pow(self.base_decimals)
    }
}

/// Side of an order or a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side: buying the base asset.
    Buy,
    /// Ask side: selling the base asset.
    Sell,
}

impl Side {
    /// The opposite side of the book.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Construct from the wire-level `is_buy` flag.
    #[must_use]
    #[inline]
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy { Side::Buy } else { Side::Sell }
    }

    /// The wire-level `is_buy` flag.
    #[must_use]
    #[inline]
    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order kinds accepted by the engine facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Match what crosses, rest the remainder.
    Limit,
    /// Match against the book unconditionally; the remainder never rests.
    Market,
    /// Immediate-or-cancel: match what crosses now, cancel the rest.
    Ioc,
    /// Fill-or-kill: fully fill or abort with no observable effect.
    Fok,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Ioc => write!(f, "IOC"),
            OrderKind::Fok => write!(f, "FOK"),
        }
    }
}

/// Lifecycle status of an order.
///
/// The progression is one-way: `Open -> PartiallyFilled -> Filled`, or
/// `Open`/`PartiallyFilled` -> `Canceled`. Terminal states are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, nothing executed yet.
    Open,
    /// Some quantity executed, some remaining.
    PartiallyFilled,
    /// Fully executed. Terminal.
    Filled,
    /// Canceled with whatever had executed preserved. Terminal.
    Canceled,
}

impl OrderStatus {
    /// Whether this status is terminal (`Filled` or `Canceled`).
    #[must_use]
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}
