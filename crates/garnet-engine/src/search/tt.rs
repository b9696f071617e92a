//! Bucketed transposition table with depth-preferring replacement.

use garnet_core::Move;

use crate::search::negamax::MATE_BOUND;

/// Bound kind stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// The stored score is exact (PV node).
    Exact = 1,
    /// The stored score is a lower bound (failed high / beta cutoff).
    Lower = 2,
    /// The stored score is an upper bound (failed low / all-node).
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Self {
        match bits & 0x03 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            _ => Bound::Upper,
        }
    }
}

/// Entries per bucket. The bucket is selected by the low bits of the hash;
/// its entries are scanned linearly.
const BUCKET_ENTRIES: usize = 2;

/// One table slot: the full 64-bit key beside the packed payload — 16 bytes.
#[derive(Clone, Copy, Default)]
#[repr(C)]
struct Slot {
    key: u64,
    data: u64,
}

/// A packed transposition entry.
///
/// Payload layout:
/// ```text
/// bits  0-15: best move (raw u16)
/// bits 16-23: depth
/// bits 24-25: bound kind
/// bits 32-47: score (i16, mate-adjusted by ply at store time)
/// bits 48-63: static eval (i16)
/// ```
/// All accessors are pure projections of the stored bits and round-trip
/// every field written by [`TranspositionTable::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry(u64);

impl TtEntry {
    fn pack(depth: i32, score: i16, bound: Bound, mv: Move, eval: i16) -> TtEntry {
        debug_assert!((0..256).contains(&depth));
        let bits = (mv.raw() as u64)
            | ((depth as u64 & 0xFF) << 16)
            | ((bound as u64) << 24)
            | ((score as u16 as u64) << 32)
            | ((eval as u16 as u64) << 48);
        TtEntry(bits)
    }

    /// Search depth of the stored result.
    pub fn depth(self) -> i32 {
        ((self.0 >> 16) & 0xFF) as i32
    }

    /// Bound kind of the stored score.
    pub fn bound(self) -> Bound {
        Bound::from_bits(self.0 >> 24)
    }

    /// Best move found when this entry was written (null for fail-low nodes
    /// that never raised alpha).
    pub fn best_move(self) -> Move {
        Move::from_raw((self.0 & 0xFFFF) as u16)
    }

    /// Stored score converted back to search-usable form at `ply`.
    ///
    /// Reverses the mate-distance adjustment applied at store time, so a
    /// mate found deep in one branch keeps an absolute distance when the
    /// position recurs at a different ply.
    pub fn score(self, ply: usize) -> i32 {
        score_from_tt(((self.0 >> 32) & 0xFFFF) as u16 as i16, ply)
    }

    /// Static evaluation recorded for the position.
    pub fn eval(self) -> i32 {
        (((self.0 >> 48) & 0xFFFF) as u16 as i16) as i32
    }
}

/// Convert a search score to TT-storable form.
///
/// Mate scores are path-dependent (`CHECKMATE - ply`); stored as
/// distance-from-node instead of distance-from-root they become
/// path-independent.
fn score_to_tt(score: i32, ply: usize) -> i16 {
    let adjusted = if score > MATE_BOUND {
        score + ply as i32
    } else if score < -MATE_BOUND {
        score - ply as i32
    } else {
        score
    };
    debug_assert!(adjusted >= i16::MIN as i32 && adjusted <= i16::MAX as i32);
    adjusted as i16
}

/// Convert a TT-stored score back to search-usable form.
///
/// Inverse of [`score_to_tt`]. Ordinary scores pass through unmodified.
fn score_from_tt(score: i16, ply: usize) -> i32 {
    let score = score as i32;
    if score > MATE_BOUND {
        score - ply as i32
    } else if score < -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

/// Fixed-capacity, lossy cache of search results keyed by Zobrist hash.
///
/// An array of `2^P` buckets of [`BUCKET_ENTRIES`] 16-byte slots, where `P`
/// is the largest value whose total allocation fits the requested size in
/// MiB. A zero key marks an empty slot. Owned by the `Searcher`, so separate
/// engine instances never share state.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    bucket_mask: u64,
}

impl TranspositionTable {
    /// Allocate a table with the largest power-of-two bucket count whose
    /// total byte size does not exceed `mb` MiB. All entries start zeroed.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let max_buckets = bytes / (BUCKET_ENTRIES * std::mem::size_of::<Slot>());
        let buckets = 1usize << max_buckets.ilog2();

        Self {
            slots: vec![Slot::default(); buckets * BUCKET_ENTRIES].into_boxed_slice(),
            bucket_mask: (buckets - 1) as u64,
        }
    }

    /// Drop the current allocation and reallocate at the new size.
    pub fn resize(&mut self, mb: usize) {
        *self = Self::new(mb);
    }

    /// Zero every entry. Called at the start of each `Search`.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::default());
    }

    /// Total entry capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn first_slot(&self, hash: u64) -> usize {
        (hash & self.bucket_mask) as usize * BUCKET_ENTRIES
    }

    /// Hint that the bucket for `hash` will be probed shortly.
    #[inline]
    pub fn prefetch(&self, hash: u64) {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            use std::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};
            let base = self.first_slot(hash);
            _mm_prefetch(self.slots.as_ptr().add(base).cast::<i8>(), _MM_HINT_T0);
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            let _ = hash;
        }
    }

    /// Look up a position. Returns the first entry in the bucket whose key
    /// matches, or `None`. Never mutates.
    pub fn probe(&self, hash: u64) -> Option<TtEntry> {
        let base = self.first_slot(hash);
        for slot in &self.slots[base..base + BUCKET_ENTRIES] {
            if slot.key == hash && slot.data != 0 {
                return Some(TtEntry(slot.data));
            }
        }
        None
    }

    /// Store a search result and return the entry that now occupies the slot.
    ///
    /// Slot selection within the bucket:
    /// 1. any empty slot;
    /// 2. the slot already holding this hash — unless it is strictly deeper
    ///    and the incoming bound is not [`Bound::Exact`], in which case the
    ///    write is aborted and the existing entry returned unchanged;
    /// 3. otherwise the shallowest slot is evicted.
    pub fn put(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Move,
        ply: usize,
        eval: i32,
    ) -> TtEntry {
        let base = self.first_slot(hash);

        let mut victim = base;
        let mut victim_depth = i32::MAX;
        for i in base..base + BUCKET_ENTRIES {
            let slot = self.slots[i];
            if slot.data == 0 {
                victim = i;
                break;
            }

            if slot.key == hash {
                let existing = TtEntry(slot.data);
                if existing.depth() > depth && bound != Bound::Exact {
                    return existing;
                }
                victim = i;
                break;
            }

            let d = TtEntry(slot.data).depth();
            if d < victim_depth {
                victim = i;
                victim_depth = d;
            }
        }

        debug_assert!(eval >= i16::MIN as i32 && eval <= i16::MAX as i32);
        let entry = TtEntry::pack(depth, score_to_tt(score, ply), bound, best_move, eval as i16);
        self.slots[victim] = Slot { key: hash, data: entry.0 };
        entry
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("entries", &self.slots.len())
            .finish()
    }
}
