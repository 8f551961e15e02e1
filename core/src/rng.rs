//! Deterministic random number generation for synthetic snapshots.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed passed to the generator.
//!
//! Each generator slot gets its own stream, seeded from
//! (master_seed XOR slot_index * golden-ratio constant). This means:
//!   - Adding a new slot never changes existing slots' streams.
//!   - Changing the agent roster never perturbs daily metrics.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one generator slot.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi). Returns `lo` when the range is empty.
    pub fn int_between(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_u64_below(u64::from(hi - lo)) as u32
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Roll a float inside a `(lo, hi)` profile range.
    pub fn in_range(&mut self, range: (f64, f64)) -> f64 {
        self.uniform(range.0, range.1)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample a Poisson-distributed count (Knuth's method; fine for small lambda).
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k = 0u32;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Pick one element uniformly. `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// Pick an index by cumulative weight. Falls back to the last index
    /// when weights do not sum to 1.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let roll = self.next_f64();
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Choose `k` distinct elements, preserving the draw order.
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let mut pool: Vec<T> = items.to_vec();
        let mut out = Vec::with_capacity(k.min(pool.len()));
        while out.len() < k && !pool.is_empty() {
            let idx = self.next_u64_below(pool.len() as u64) as usize;
            out.push(pool.swap_remove(idx));
        }
        out
    }

    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }
}

/// All generator streams for a single snapshot, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: GeneratorSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable generator slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every slot's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum GeneratorSlot {
    Snapshot = 0,
    DailyMetrics = 1,
    Agents = 2,
    Inventory = 3,
    Customers = 4,
}

impl GeneratorSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot     => "snapshot",
            Self::DailyMetrics => "daily_metrics",
            Self::Agents       => "agents",
            Self::Inventory    => "inventory",
            Self::Customers    => "customers",
        }
    }
}
