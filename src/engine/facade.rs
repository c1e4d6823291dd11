//! Engine facade: validation, authorization, and the per-order transaction.
//!
//! Every public trading operation runs as one unit of commit: validate the
//! arguments, stage the order in the registry, plan the match, settle every
//! produced fill through the vault, apply the order-kind post-condition, and
//! only then flush the buffered events. Any failure unwinds the journal and
//! nothing is observable.

use crate::engine::assets::AssetTransfer;
use crate::engine::book::Book;
use crate::engine::error::EngineError;
use crate::engine::events::{EngineEvent, EventBuffer, EventListener};
use crate::engine::fees::FeeSchedule;
use crate::engine::journal::{JournalEntry, TxJournal};
use crate::engine::order::Order;
use crate::engine::registry::OrderRegistry;
use crate::engine::settlement::Settlement;
use crate::engine::snapshot::{BookSnapshot, EngineSnapshot, LevelSnapshot};
use crate::engine::types::{OrderId, OrderKind, Pair, PairConfig, Side, TraderId};
use crate::engine::vault::Vault;
use crate::utils::current_time_millis;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Initial configuration of an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maker/taker fee rates in basis points.
    pub fee_schedule: FeeSchedule,
    /// Principal credited with all fees.
    pub fee_recipient: TraderId,
    /// Initial admin principal set. Must not be empty.
    pub admins: Vec<TraderId>,
}

impl EngineConfig {
    /// Configuration with a single initial admin.
    pub fn new(fee_schedule: FeeSchedule, fee_recipient: TraderId, admin: TraderId) -> Self {
        Self {
            fee_schedule,
            fee_recipient,
            admins: vec![admin],
        }
    }
}

/// The user-facing engine for a set of authorized market pairs.
///
/// One registry and one vault are shared by all pairs; each pair gets its
/// own [`Book`]. Calls on the same pair must be serialized by the host
/// (single-threaded cooperative scheduling per pair); the facade itself
/// never blocks or suspends inside the matching + settlement critical
/// section.
///
/// # Examples
///
/// ```
/// use clob_engine::prelude::*;
/// use std::sync::Arc;
///
/// let ledger = Arc::new(InMemoryLedger::new());
/// let admin = TraderId(1);
/// let engine = Engine::new(
///     EngineConfig::new(FeeSchedule::new(10, 20), TraderId(99), admin),
///     ledger.clone(),
/// );
///
/// let pair = Pair::new("ETH", "USDC");
/// engine
///     .add_pair(admin, PairConfig::new(pair.clone(), 18))
///     .unwrap();
///
/// let maker = TraderId(2);
/// ledger
///     .deposit(maker, &pair.base, 10_u128.pow(19))
///     .unwrap();
/// let order_id = engine
///     .place_limit(maker, &pair, false, 100_000_000, 10_u128.pow(19))
///     .unwrap();
/// assert_eq!(engine.order(order_id).unwrap().status, OrderStatus::Open);
/// ```
pub struct Engine {
    registry: Arc<OrderRegistry>,
    vault: Vault,
    books: DashMap<Pair, Arc<Book>>,
    pairs: DashMap<Pair, PairConfig>,
    admins: DashMap<TraderId, ()>,
    event_listener: Option<EventListener>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine with no event listener.
    pub fn new(config: EngineConfig, assets: Arc<dyn AssetTransfer>) -> Self {
        Self::build(config, assets, None)
    }

    /// Create an engine that forwards every committed event to `listener`.
    pub fn with_event_listener(
        config: EngineConfig,
        assets: Arc<dyn AssetTransfer>,
        listener: EventListener,
    ) -> Self {
        Self::build(config, assets, Some(listener))
    }

    fn build(
        config: EngineConfig,
        assets: Arc<dyn AssetTransfer>,
        event_listener: Option<EventListener>,
    ) -> Self {
        let registry = Arc::new(OrderRegistry::new());
        let vault = Vault::new(
            registry.clone(),
            assets,
            config.fee_schedule,
            config.fee_recipient,
        );
        let admins = DashMap::new();
        for principal in config.admins {
            admins.insert(principal, ());
        }
        Self {
            registry,
            vault,
            books: DashMap::new(),
            pairs: DashMap::new(),
            admins,
            event_listener,
        }
    }

    // === Admin surface ===

    /// Whether `principal` holds the admin capability.
    #[must_use]
    pub fn is_admin(&self, principal: TraderId) -> bool {
        self.admins.contains_key(&principal)
    }

    /// Grant the admin capability to `principal`.
    pub fn add_admin(&self, caller: TraderId, principal: TraderId) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if self.admins.insert(principal, ()).is_none() {
            debug!("Admin added: {}", principal);
            self.flush(vec![EngineEvent::AdminAdded { principal }]);
        }
        Ok(())
    }

    /// Revoke the admin capability from `principal`. The last admin cannot
    /// be removed.
    pub fn remove_admin(&self, caller: TraderId, principal: TraderId) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if self.admins.len() == 1 && self.admins.contains_key(&principal) {
            return Err(EngineError::InvalidOrder {
                message: "cannot remove the last admin".to_string(),
            });
        }
        if self.admins.remove(&principal).is_some() {
            debug!("Admin removed: {}", principal);
            self.flush(vec![EngineEvent::AdminRemoved { principal }]);
        }
        Ok(())
    }

    /// Hand the caller's admin capability to `to`.
    pub fn transfer_admin(&self, caller: TraderId, to: TraderId) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if caller == to {
            return Ok(());
        }
        let mut events = Vec::new();
        if self.admins.insert(to, ()).is_none() {
            events.push(EngineEvent::AdminAdded { principal: to });
        }
        self.admins.remove(&caller);
        events.push(EngineEvent::AdminRemoved { principal: caller });
        debug!("Admin transferred: {} -> {}", caller, to);
        self.flush(events);
        Ok(())
    }

    /// Authorize a pair for trading and create its book.
    pub fn add_pair(&self, caller: TraderId, config: PairConfig) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        if config.pair.base == config.pair.quote {
            return Err(EngineError::InvalidOrder {
                message: "base and quote must differ".to_string(),
            });
        }
        if self.pairs.contains_key(&config.pair) {
            return Err(EngineError::InvalidOrder {
                message: format!("pair {} already supported", config.pair),
            });
        }

        let pair = config.pair.clone();
        self.books.insert(
            pair.clone(),
            Arc::new(Book::new(pair.clone(), self.registry.clone())),
        );
        self.pairs.insert(pair.clone(), config.clone());
        debug!("Pair added: {} ({} base decimals)", pair, config.base_decimals);
        self.flush(vec![EngineEvent::PairAdded {
            base: pair.base,
            quote: pair.quote,
            base_decimals: config.base_decimals,
        }]);
        Ok(())
    }

    /// The currently supported pairs.
    #[must_use]
    pub fn supported_pairs(&self) -> Vec<Pair> {
        self.pairs.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Update the maker/taker fee rates. Rates above 10_000 bps are
    /// rejected.
    pub fn set_fee_rates(
        &self,
        caller: TraderId,
        maker_fee_bps: u32,
        taker_fee_bps: u32,
    ) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        let schedule = FeeSchedule::new(maker_fee_bps, taker_fee_bps);
        if !schedule.is_valid() {
            return Err(EngineError::InvalidOrder {
                message: format!(
                    "fee rates must be at most 10000 bps (got {maker_fee_bps}/{taker_fee_bps})"
                ),
            });
        }
        self.vault.set_fee_schedule(schedule);
        debug!("Fee rates updated: {}/{} bps", maker_fee_bps, taker_fee_bps);
        self.flush(vec![EngineEvent::FeeRateUpdated {
            maker_fee_bps,
            taker_fee_bps,
        }]);
        Ok(())
    }

    /// Update the fee recipient.
    pub fn set_fee_recipient(
        &self,
        caller: TraderId,
        recipient: TraderId,
    ) -> Result<(), EngineError> {
        self.require_admin(caller)?;
        self.vault.set_fee_recipient(recipient);
        self.flush(vec![EngineEvent::FeeRecipientUpdated { recipient }]);
        Ok(())
    }

    /// The active fee schedule.
    #[must_use]
    pub fn fee_schedule(&self) -> FeeSchedule {
        self.vault.fee_schedule()
    }

    /// The active fee recipient.
    #[must_use]
    pub fn fee_recipient(&self) -> TraderId {
        self.vault.fee_recipient()
    }

    // === Trading surface ===

    /// Place a limit order: match what crosses, rest the remainder.
    pub fn place_limit(
        &self,
        trader: TraderId,
        pair: &Pair,
        is_buy: bool,
        price: u128,
        quantity: u128,
    ) -> Result<OrderId, EngineError> {
        self.execute(
            trader,
            pair,
            Side::from_is_buy(is_buy),
            OrderKind::Limit,
            price,
            quantity,
            None,
        )
    }

    /// Place a market order.
    ///
    /// A market sell (and a quantity-bounded market buy) specifies
    /// `quantity` and no budget. A quote-funded market buy specifies
    /// `quantity == 0` and `quote_budget`; the walk stops once the budget
    /// cannot buy another unit, and unspent budget is never debited.
    pub fn place_market(
        &self,
        trader: TraderId,
        pair: &Pair,
        is_buy: bool,
        quantity: u128,
        quote_budget: Option<u128>,
    ) -> Result<OrderId, EngineError> {
        self.execute(
            trader,
            pair,
            Side::from_is_buy(is_buy),
            OrderKind::Market,
            0,
            quantity,
            quote_budget,
        )
    }

    /// Place an immediate-or-cancel order: match what crosses now, cancel
    /// the rest.
    pub fn place_ioc(
        &self,
        trader: TraderId,
        pair: &Pair,
        is_buy: bool,
        price: u128,
        quantity: u128,
    ) -> Result<OrderId, EngineError> {
        self.execute(
            trader,
            pair,
            Side::from_is_buy(is_buy),
            OrderKind::Ioc,
            price,
            quantity,
            None,
        )
    }

    /// Place a fill-or-kill order: fully fill at acceptable prices or abort
    /// with [`EngineError::FokNotFillable`] and no observable effect.
    pub fn place_fok(
        &self,
        trader: TraderId,
        pair: &Pair,
        is_buy: bool,
        price: u128,
        quantity: u128,
    ) -> Result<OrderId, EngineError> {
        self.execute(
            trader,
            pair,
            Side::from_is_buy(is_buy),
            OrderKind::Fok,
            price,
            quantity,
            None,
        )
    }

    /// Cancel a resting order. Only the order's trader may cancel, and only
    /// while the order is OPEN or PARTIALLY_FILLED.
    pub fn cancel(&self, caller: TraderId, order_id: OrderId) -> Result<(), EngineError> {
        let order = self.registry.get(order_id)?;
        if order.trader != caller {
            return Err(EngineError::NotOwner { order_id, caller });
        }
        if order.is_terminal() {
            return Err(EngineError::NotCancellable {
                order_id,
                status: order.status,
            });
        }

        let book = self.book_for(&order.pair)?;
        let mut events = Vec::new();
        self.registry.cancel(order_id, &mut events)?;
        let canceled = self.registry.get(order_id)?;
        book.remove(&canceled)?;
        events.push(EngineEvent::OrderCanceled {
            order_id,
            trader: caller,
        });
        trace!("Canceled order {} for {}", order_id, caller);
        self.flush(events);
        Ok(())
    }

    // === Read views ===

    /// Read-only view of an order.
    pub fn order(&self, order_id: OrderId) -> Result<Order, EngineError> {
        self.registry.get(order_id)
    }

    /// Ids of every order created by `trader`.
    #[must_use]
    pub fn orders_of(&self, trader: TraderId) -> Vec<OrderId> {
        self.registry.orders_of(trader)
    }

    /// The book for `pair`, if the pair is supported.
    #[must_use]
    pub fn book(&self, pair: &Pair) -> Option<Arc<Book>> {
        self.books.get(pair).map(|entry| entry.value().clone())
    }

    /// The shared order registry (read-only surface).
    #[must_use]
    pub fn registry(&self) -> &Arc<OrderRegistry> {
        &self.registry
    }

    /// The settlement vault (read-only surface).
    #[must_use]
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Compute the `(maker_fee, taker_fee)` a settlement would incur under
    /// the active schedule, without touching any state.
    pub fn preview_fees(&self, settlement: &Settlement) -> Result<(u128, u128), EngineError> {
        let taker = self.registry.get(settlement.taker_order_id)?;
        let config = self.pair_config(&taker.pair)?;
        self.vault.calculate_fees(&config, settlement)
    }

    // === Internals ===

    fn require_admin(&self, caller: TraderId) -> Result<(), EngineError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized { principal: caller })
        }
    }

    fn pair_config(&self, pair: &Pair) -> Result<PairConfig, EngineError> {
        self.pairs
            .get(pair)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::UnsupportedPair {
                base: pair.base.clone(),
                quote: pair.quote.clone(),
            })
    }

    fn book_for(&self, pair: &Pair) -> Result<Arc<Book>, EngineError> {
        self.books
            .get(pair)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::UnsupportedPair {
                base: pair.base.clone(),
                quote: pair.quote.clone(),
            })
    }

    fn validate(
        side: Side,
        kind: OrderKind,
        price: u128,
        quantity: u128,
        quote_budget: Option<u128>,
        config: &PairConfig,
    ) -> Result<(), EngineError> {
        let invalid = |message: &str| EngineError::InvalidOrder {
            message: message.to_string(),
        };

        match kind {
            OrderKind::Limit | OrderKind::Ioc | OrderKind::Fok => {
                if price == 0 {
                    return Err(invalid("price must be positive"));
                }
                if quantity == 0 {
                    return Err(invalid("quantity must be positive"));
                }
                if quote_budget.is_some() {
                    return Err(invalid("quote budget is only valid for market buys"));
                }
                // Guards the quote-amount arithmetic downstream
                if quantity.checked_mul(price).is_none() {
                    return Err(invalid("quantity times price overflows"));
                }
            }
            OrderKind::Market => match (side, quantity, quote_budget) {
                (_, q, None) if q > 0 => {}
                (Side::Buy, 0, Some(budget)) => {
                    if budget == 0 {
                        return Err(invalid("quote budget must be positive"));
                    }
                    if budget.checked_mul(config.base_unit()).is_none() {
                        return Err(invalid("quote budget overflows"));
                    }
                }
                (Side::Sell, _, Some(_)) => {
                    return Err(invalid("quote budget is only valid for market buys"));
                }
                (Side::Buy, q, Some(_)) if q > 0 => {
                    return Err(invalid(
                        "market buy takes either a quantity or a quote budget, not both",
                    ));
                }
                _ => return Err(invalid("quantity must be positive")),
            },
        }
        Ok(())
    }

    /// Run one order end-to-end as a single unit of commit.
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        trader: TraderId,
        pair: &Pair,
        side: Side,
        kind: OrderKind,
        price: u128,
        quantity: u128,
        quote_budget: Option<u128>,
    ) -> Result<OrderId, EngineError> {
        let config = self.pair_config(pair)?;
        Self::validate(side, kind, price, quantity, quote_budget, &config)?;
        let book = self.book_for(pair)?;

        let mut events: EventBuffer = Vec::new();
        let mut journal = TxJournal::new();

        // Stage the order
        let order_id = self.registry.create(
            trader,
            pair.clone(),
            side,
            kind,
            price,
            quantity,
            quote_budget,
            &mut events,
        );
        journal.record(JournalEntry::OrderCreated { order_id });
        events.push(EngineEvent::OrderPlaced {
            order_id,
            trader,
            is_buy: side.is_buy(),
            price,
            quantity,
        });
        trace!("Placing {} {} {} on {}", kind, side, order_id, pair);

        // Plan the match; the walk is pure so a failed call leaves no trace
        let taker = self.registry.get(order_id)?;
        let plan = match book.plan_match(&taker, config.base_unit()) {
            Ok(plan) => plan,
            Err(err) => {
                journal.rollback(&self.registry, self.vault.assets(), &self.vault);
                return Err(err);
            }
        };

        // FOK: the plan is the pre-simulation; abort before settling
        if kind == OrderKind::Fok && plan.executed < quantity {
            let available = plan.executed;
            journal.rollback(&self.registry, self.vault.assets(), &self.vault);
            return Err(EngineError::FokNotFillable {
                order_id,
                requested: quantity,
                available,
            });
        }

        // Settle every planned fill, or unwind the whole call
        if let Err(err) =
            self.vault
                .settle_batch(&config, &plan.settlements, &mut journal, &mut events)
        {
            journal.rollback(&self.registry, self.vault.assets(), &self.vault);
            return Err(err);
        }

        // Past this point nothing can fail: apply the plan to the book
        for settlement in &plan.settlements {
            book.commit_fill(settlement.maker_order_id, settlement.quantity)?;
        }

        // Order-kind post-condition
        let taker = self.registry.get(order_id)?;
        match kind {
            OrderKind::Limit => {
                if taker.remaining() > 0 {
                    book.insert(&taker)?;
                }
            }
            OrderKind::Market => {
                if taker.is_quote_funded() {
                    self.registry.close_funded(order_id, &mut events)?;
                } else if taker.remaining() > 0 {
                    self.registry.cancel(order_id, &mut events)?;
                }
            }
            OrderKind::Ioc => {
                if taker.remaining() > 0 {
                    self.registry.cancel(order_id, &mut events)?;
                }
            }
            OrderKind::Fok => {
                // Fully filled by construction
            }
        }

        self.flush(events);
        Ok(order_id)
    }

    fn flush(&self, events: EventBuffer) {
        if let Some(listener) = &self.event_listener {
            for event in &events {
                listener(event);
            }
        }
    }

    // === Snapshot / restore ===

    /// Capture the engine's logical state.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut orders = self.registry.all_orders();
        orders.sort_by_key(|order| order.id);

        let mut pairs: Vec<PairConfig> = self
            .pairs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        pairs.sort_by_key(|config| config.pair.symbol());

        let mut admins: Vec<TraderId> = self.admins.iter().map(|entry| *entry.key()).collect();
        admins.sort();

        let mut processed = self.vault.processed_keys();
        processed.sort();

        let mut books = Vec::new();
        for entry in self.books.iter() {
            let book = entry.value();
            books.push(BookSnapshot {
                pair: book.pair().clone(),
                bids: Self::level_snapshots(book, Side::Buy),
                asks: Self::level_snapshots(book, Side::Sell),
            });
        }
        books.sort_by_key(|snapshot| snapshot.pair.symbol());

        EngineSnapshot {
            timestamp: current_time_millis(),
            orders,
            pairs,
            admins,
            fee_schedule: self.vault.fee_schedule(),
            fee_recipient: self.vault.fee_recipient(),
            processed_settlements: processed,
            books,
        }
    }

    fn level_snapshots(book: &Book, side: Side) -> Vec<LevelSnapshot> {
        book.side_level_ids(side)
            .into_iter()
            .map(|(price, order_ids)| LevelSnapshot { price, order_ids })
            .collect()
    }

    /// Rebuild an engine from a snapshot and a fresh asset capability.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidSnapshot`] when the snapshot references
    /// orders that do not exist or rests terminal orders.
    pub fn restore(
        snapshot: EngineSnapshot,
        assets: Arc<dyn AssetTransfer>,
        event_listener: Option<EventListener>,
    ) -> Result<Self, EngineError> {
        if snapshot.admins.is_empty() {
            return Err(EngineError::InvalidSnapshot {
                message: "snapshot has no admin principals".to_string(),
            });
        }

        let registry = Arc::new(OrderRegistry::from_orders(snapshot.orders));
        let vault = Vault::new(
            registry.clone(),
            assets,
            snapshot.fee_schedule,
            snapshot.fee_recipient,
        );
        for key in snapshot.processed_settlements {
            vault.mark_processed(key);
        }

        let admins = DashMap::new();
        for principal in snapshot.admins {
            admins.insert(principal, ());
        }

        let engine = Self {
            registry: registry.clone(),
            vault,
            books: DashMap::new(),
            pairs: DashMap::new(),
            admins,
            event_listener,
        };

        for config in snapshot.pairs {
            let pair = config.pair.clone();
            engine.books.insert(
                pair.clone(),
                Arc::new(Book::new(pair.clone(), registry.clone())),
            );
            engine.pairs.insert(pair, config);
        }

        for book_snapshot in snapshot.books {
            let book =
                engine
                    .book(&book_snapshot.pair)
                    .ok_or_else(|| EngineError::InvalidSnapshot {
                        message: format!("book for unsupported pair {}", book_snapshot.pair),
                    })?;
            for level in book_snapshot.bids.iter().chain(book_snapshot.asks.iter()) {
                for order_id in &level.order_ids {
                    let order =
                        registry
                            .get(*order_id)
                            .map_err(|_| EngineError::InvalidSnapshot {
                                message: format!("resting order {order_id} not in the registry"),
                            })?;
                    book.insert(&order)
                        .map_err(|err| EngineError::InvalidSnapshot {
                            message: format!("cannot rest order {order_id}: {err}"),
                        })?;
                }
            }
        }

        Ok(engine)
    }
}
