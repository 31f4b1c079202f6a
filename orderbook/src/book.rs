//! In-memory order book
//!
//! One indexed heap per traded pair, guarded by a single mutex, plus an
//! id-to-pair map so removals and resizes never need the pair restated. The
//! book is derived state: it can always be rebuilt from the open order
//! records in the ledger view.

use crate::heap::{IndexedHeap, IndexedOrder};
use energy_ledger::ids::ID_LEN;
use energy_ledger::keys::ORDER_TAG;
use energy_ledger::records::Order;
use energy_ledger::{AssetId, Error, Id, Result, StateScan};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A traded pair: the asset an order accepts and the asset it escrows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    /// Asset the order accepts
    pub input: AssetId,
    /// Asset the order escrows
    pub output: AssetId,
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.input, self.output)
    }
}

impl FromStr for Pair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (input, output) = s
            .split_once('/')
            .ok_or_else(|| Error::Config(format!("pair {:?} is not input/output", s)))?;
        Ok(Pair {
            input: input.parse()?,
            output: output.parse()?,
        })
    }
}

/// Which pairs the book indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedPairs {
    /// Index every pair
    All,
    /// Index only the listed pairs
    Only(HashSet<Pair>),
}

impl TrackedPairs {
    /// Parse the configured pair list; a single `"*"` entry tracks all
    pub fn from_config(pairs: &[String]) -> Result<Self> {
        if pairs.iter().any(|p| p == "*") {
            return Ok(TrackedPairs::All);
        }
        let mut only = HashSet::with_capacity(pairs.len());
        for pair in pairs {
            only.insert(pair.parse()?);
        }
        Ok(TrackedPairs::Only(only))
    }

    /// True if orders on this pair should be indexed
    pub fn tracks(&self, pair: &Pair) -> bool {
        match self {
            TrackedPairs::All => true,
            TrackedPairs::Only(set) => set.contains(pair),
        }
    }
}

struct Inner {
    books: HashMap<Pair, IndexedHeap>,
    pairs: HashMap<Id, Pair>,
}

/// Thread-safe order index over the tracked pairs
pub struct OrderBook {
    inner: Mutex<Inner>,
    tracked: TrackedPairs,
}

impl fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBook")
            .field("tracked", &self.tracked)
            .finish_non_exhaustive()
    }
}

impl OrderBook {
    /// Empty book over the given pair filter
    pub fn new(tracked: TrackedPairs) -> Self {
        Self {
            inner: Mutex::new(Inner {
                books: HashMap::new(),
                pairs: HashMap::new(),
            }),
            tracked,
        }
    }

    /// Price rank of an order: output units per input unit. Higher ranks
    /// give a taker more output per input, so the max-heap surfaces the
    /// best rate first.
    pub fn rank(in_tick: u64, out_tick: u64) -> Decimal {
        Decimal::from(out_tick) / Decimal::from(in_tick)
    }

    /// Index a newly created order. Untracked pairs are ignored.
    pub fn add(&self, pair: Pair, order: IndexedOrder) {
        if !self.tracked.tracks(&pair) {
            return;
        }
        let mut inner = self.inner.lock();
        inner.pairs.insert(order.id, pair);
        inner.books.entry(pair).or_default().push(order);
    }

    /// Drop an order from the index, if it was ever tracked
    pub fn remove(&self, id: &Id) {
        let mut inner = self.inner.lock();
        if let Some(pair) = inner.pairs.remove(id) {
            if let Some(heap) = inner.books.get_mut(&pair) {
                heap.remove(id);
                if heap.is_empty() {
                    inner.books.remove(&pair);
                }
            }
        }
    }

    /// Shrink an order's indexed remaining after a partial fill
    pub fn update_remaining(&self, id: &Id, remaining: u64) {
        let inner = &mut *self.inner.lock();
        if let Some(pair) = inner.pairs.get(id) {
            if let Some(heap) = inner.books.get_mut(pair) {
                heap.update_remaining(id, remaining);
            }
        }
    }

    /// The highest-ranked order on a pair
    pub fn best(&self, pair: &Pair) -> Option<IndexedOrder> {
        self.inner.lock().books.get(pair)?.peek().copied()
    }

    /// Look up one indexed order by id
    pub fn get(&self, id: &Id) -> Option<IndexedOrder> {
        let inner = self.inner.lock();
        let pair = inner.pairs.get(id)?;
        inner.books.get(pair)?.get(id).copied()
    }

    /// Up to `limit` orders for a pair, in heap-iteration order. Only the
    /// first entry is guaranteed globally best; callers wanting a fully
    /// sorted view must sort the result.
    pub fn orders(&self, pair: &Pair, limit: usize) -> Vec<IndexedOrder> {
        let inner = self.inner.lock();
        match inner.books.get(pair) {
            Some(heap) => heap.iter().take(limit).copied().collect(),
            None => Vec::new(),
        }
    }

    /// How many orders the index holds for a pair
    pub fn pair_len(&self, pair: &Pair) -> usize {
        self.inner.lock().books.get(pair).map_or(0, IndexedHeap::len)
    }

    /// Total orders held across all pairs
    pub fn len(&self) -> usize {
        self.inner.lock().pairs.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.inner.lock().pairs.is_empty()
    }

    /// Discard the index and rebuild it from the open order records in
    /// `state`. Used at startup and after the view is replaced wholesale.
    pub fn rebuild(&self, state: &dyn StateScan) -> Result<()> {
        let records = state.scan_prefix(&[ORDER_TAG])?;
        let mut inner = self.inner.lock();
        inner.books.clear();
        inner.pairs.clear();

        let mut indexed = 0usize;
        for (key, value) in records {
            let id = order_id_from_key(&key)?;
            let order = Order::decode(&value)?;
            let pair = Pair {
                input: order.input,
                output: order.output,
            };
            if !self.tracked.tracks(&pair) {
                continue;
            }
            inner.pairs.insert(id, pair);
            inner.books.entry(pair).or_default().push(IndexedOrder {
                id,
                rank: Self::rank(order.in_tick, order.out_tick),
                in_tick: order.in_tick,
                out_tick: order.out_tick,
                remaining: order.remaining,
                owner: order.owner,
            });
            indexed += 1;
        }
        tracing::info!(orders = indexed, "rebuilt order index");
        Ok(())
    }
}

fn order_id_from_key(key: &[u8]) -> Result<Id> {
    if key.len() != 1 + ID_LEN || key[0] != ORDER_TAG {
        return Err(Error::Codec(format!(
            "malformed order key of {} bytes",
            key.len()
        )));
    }
    let mut raw = [0u8; ID_LEN];
    raw.copy_from_slice(&key[1..]);
    Ok(Id::new(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_ledger::records;
    use energy_ledger::state::MemState;
    use energy_ledger::Identity;

    fn pair() -> Pair {
        Pair {
            input: AssetId::Native,
            output: AssetId::Issued(Id::from_data(b"asset")),
        }
    }

    fn indexed(seed: u8, in_tick: u64, out_tick: u64, remaining: u64) -> IndexedOrder {
        IndexedOrder {
            id: Id::from_data(&[seed]),
            rank: OrderBook::rank(in_tick, out_tick),
            in_tick,
            out_tick,
            remaining,
            owner: Identity::new([seed; 32]),
        }
    }

    #[test]
    fn test_tracked_pair_accepts_orders() {
        let mut only = HashSet::new();
        only.insert(pair());
        let book = OrderBook::new(TrackedPairs::Only(only));

        book.add(pair(), indexed(1, 2, 10, 100));
        assert_eq!(book.pair_len(&pair()), 1);
        assert_eq!(book.best(&pair()).unwrap().id, Id::from_data(&[1]));
    }

    #[test]
    fn test_untracked_pair_ignored() {
        let book = OrderBook::new(TrackedPairs::Only(HashSet::new()));
        book.add(pair(), indexed(1, 2, 10, 100));
        assert!(book.is_empty());
    }

    #[test]
    fn test_remove_by_id_alone() {
        let book = OrderBook::new(TrackedPairs::All);
        book.add(pair(), indexed(1, 2, 10, 100));
        book.remove(&Id::from_data(&[1]));
        assert!(book.is_empty());
        assert!(book.best(&pair()).is_none());
    }

    #[test]
    fn test_best_follows_rank() {
        let book = OrderBook::new(TrackedPairs::All);
        book.add(pair(), indexed(1, 2, 10, 100)); // rank 5
        book.add(pair(), indexed(2, 6, 10, 100)); // rank 10/6
        book.add(pair(), indexed(3, 4, 10, 100)); // rank 2.5
        assert_eq!(book.best(&pair()).unwrap().id, Id::from_data(&[1]));

        book.remove(&Id::from_data(&[1]));
        assert_eq!(book.best(&pair()).unwrap().id, Id::from_data(&[3]));
    }

    #[test]
    fn test_orders_respects_limit_and_leads_with_best() {
        let book = OrderBook::new(TrackedPairs::All);
        for (seed, in_tick) in [(1u8, 2u64), (2, 6), (3, 4), (4, 8)] {
            book.add(pair(), indexed(seed, in_tick, 10, 100));
        }

        let top = book.orders(&pair(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, Id::from_data(&[1]));

        assert_eq!(book.orders(&pair(), 10).len(), 4);
        assert!(book
            .orders(
                &Pair {
                    input: AssetId::Native,
                    output: AssetId::Issued(Id::from_data(b"other")),
                },
                10
            )
            .is_empty());
    }

    #[test]
    fn test_tracked_pairs_from_config() {
        assert_eq!(
            TrackedPairs::from_config(&["*".to_string()]).unwrap(),
            TrackedPairs::All
        );

        let spec = format!("native/{}", AssetId::Issued(Id::from_data(b"asset")));
        let tracked = TrackedPairs::from_config(&[spec]).unwrap();
        assert!(tracked.tracks(&pair()));
        assert!(!tracked.tracks(&Pair {
            input: AssetId::Native,
            output: AssetId::Issued(Id::from_data(b"other")),
        }));

        assert!(TrackedPairs::from_config(&["nonsense".to_string()]).is_err());
    }

    #[test]
    fn test_rebuild_from_state() {
        let mut state = MemState::new();
        let owner = Identity::new([7u8; 32]);
        for (seed, in_tick) in [(1u8, 2u64), (2, 6)] {
            records::set_order(
                &mut state,
                &Id::from_data(&[seed]),
                &records::Order {
                    input: AssetId::Native,
                    in_tick,
                    output: AssetId::Issued(Id::from_data(b"asset")),
                    out_tick: 10,
                    remaining: 50,
                    owner,
                },
            )
            .unwrap();
        }
        // An unrelated record under another tag must not confuse the scan.
        records::add_balance(&mut state, &owner, &AssetId::Native, 9).unwrap();

        let book = OrderBook::new(TrackedPairs::All);
        book.rebuild(&state).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.best(&pair()).unwrap().id, Id::from_data(&[1]));
    }
}
