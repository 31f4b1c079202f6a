//! Indexed binary heap
//!
//! A max-heap of resting orders ranked by price, paired with an id-to-slot
//! map so any order can be removed or resized in O(log n) without scanning.
//! The slot map is updated inside every sift, so it always mirrors the
//! array.

use energy_ledger::{Id, Identity};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One resting order as the in-memory index sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedOrder {
    /// Transaction id that created the order
    pub id: Id,
    /// Price rank, output ticks over input ticks; higher ranks first
    pub rank: Decimal,
    /// Input units per tick
    pub in_tick: u64,
    /// Output units per tick
    pub out_tick: u64,
    /// Escrow left to fill
    pub remaining: u64,
    /// Order creator
    pub owner: Identity,
}

/// Max-heap over [`IndexedOrder`] with O(log n) removal by id
#[derive(Debug, Default)]
pub struct IndexedHeap {
    entries: Vec<IndexedOrder>,
    slots: HashMap<Id, usize>,
}

impl IndexedHeap {
    /// Empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no orders are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if an order with this id is present
    pub fn contains(&self, id: &Id) -> bool {
        self.slots.contains_key(id)
    }

    /// The highest-ranked order, if any
    pub fn peek(&self) -> Option<&IndexedOrder> {
        self.entries.first()
    }

    /// Look up an order by id
    pub fn get(&self, id: &Id) -> Option<&IndexedOrder> {
        self.slots.get(id).map(|&slot| &self.entries[slot])
    }

    /// Insert an order. A duplicate id replaces the existing entry.
    pub fn push(&mut self, order: IndexedOrder) {
        if let Some(&slot) = self.slots.get(&order.id) {
            self.entries[slot] = order;
            self.restore(slot);
            return;
        }
        let slot = self.entries.len();
        self.slots.insert(order.id, slot);
        self.entries.push(order);
        self.sift_up(slot);
    }

    /// Remove an order by id, returning it if present
    pub fn remove(&mut self, id: &Id) -> Option<IndexedOrder> {
        let slot = self.slots.remove(id)?;
        let last = self.entries.len() - 1;
        let removed = self.entries.swap_remove(slot);
        if slot < last {
            self.slots.insert(self.entries[slot].id, slot);
            self.restore(slot);
        }
        Some(removed)
    }

    /// Shrink an order's remaining escrow in place. The rank is unchanged,
    /// so the heap shape holds. Returns false for an unknown id.
    pub fn update_remaining(&mut self, id: &Id, remaining: u64) -> bool {
        match self.slots.get(id) {
            Some(&slot) => {
                self.entries[slot].remaining = remaining;
                true
            }
            None => false,
        }
    }

    /// Iterate in heap-array order; the first entry is the highest rank
    pub fn iter(&self) -> impl Iterator<Item = &IndexedOrder> {
        self.entries.iter()
    }

    /// Drain the heap in rank order, highest first
    pub fn into_sorted(mut self) -> Vec<IndexedOrder> {
        let mut out = Vec::with_capacity(self.entries.len());
        while let Some(best) = self.peek().copied() {
            self.remove(&best.id);
            out.push(best);
        }
        out
    }

    fn restore(&mut self, slot: usize) {
        let parent = slot.checked_sub(1).map(|s| s / 2);
        match parent {
            Some(p) if self.entries[slot].rank > self.entries[p].rank => self.sift_up(slot),
            _ => self.sift_down(slot),
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries[slot].rank <= self.entries[parent].rank {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            if left >= self.entries.len() {
                break;
            }
            let right = left + 1;
            let mut largest = slot;
            if self.entries[left].rank > self.entries[largest].rank {
                largest = left;
            }
            if right < self.entries.len() && self.entries[right].rank > self.entries[largest].rank {
                largest = right;
            }
            if largest == slot {
                break;
            }
            self.swap(slot, largest);
            slot = largest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots.insert(self.entries[a].id, a);
        self.slots.insert(self.entries[b].id, b);
    }
}
