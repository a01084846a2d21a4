// Match-finder tables for the PalmDOC compressor.
//
// Two flat arrays, both scratch space owned by a single compress call:
//   - **Head table** (`heads`): hash of 3 bytes -> most recent position with
//     that hash.  Stored as `pos | 0x8000` so that 0 means "empty".
//   - **Distance ring** (`next_distances`): `pos & 0x7FF` -> distance back to
//     the previous position sharing the hash of `pos`.
//
// Distances live in `1..=0x800`; 0x800 is one past the largest encodable
// distance and marks the end of a chain.

use super::{CHAIN_SIZE, HASH_SIZE, MAX_DISTANCE};

/// Marker bit distinguishing a stored position from an empty bucket.
const OCCUPIED: u16 = 0x8000;

/// Chain terminator: first distance that cannot be encoded.
pub const NO_MATCH: u16 = MAX_DISTANCE as u16 + 1;

/// Hash of the three bytes at a window position (12 bits).
#[inline(always)]
pub fn hash3(s0: u8, s1: u8, s2: u8) -> usize {
    let (s0, s1, s2) = (s0 as u32, s1 as u32, s2 as u32);
    (((s0 << 8) ^ (s1 << 4) ^ s2 ^ (s0 >> 4)) & (HASH_SIZE as u32 - 1)) as usize
}

/// Head table plus distance ring.
pub struct MatchFinder {
    heads: Box<[u16; HASH_SIZE]>,
    next_distances: Box<[u16; CHAIN_SIZE]>,
}

impl MatchFinder {
    pub fn new() -> Self {
        Self {
            heads: Box::new([0; HASH_SIZE]),
            next_distances: Box::new([0; CHAIN_SIZE]),
        }
    }

    /// Record `pos` as the newest position for the hash of `(s0, s1, s2)`
    /// and return the distance back to the previous one (or [`NO_MATCH`]).
    ///
    /// Positions are stored modulo 0x8000; since the distance is reduced
    /// modulo 0x800 afterwards, the truncation never changes the result for
    /// predecessors within range.  Stale predecessors yield some distance in
    /// range whose bytes are verified by the caller anyway.
    #[inline(always)]
    pub fn swap_head(&mut self, s0: u8, s1: u8, s2: u8, pos: usize) -> u16 {
        let bucket = hash3(s0, s1, s2);
        let old = self.heads[bucket];
        self.heads[bucket] = (pos as u16) | OCCUPIED;
        distance_to(pos, old)
    }

    /// Store the chain link for `pos`.
    #[inline(always)]
    pub fn link(&mut self, pos: usize, distance: u16) {
        self.next_distances[pos & (CHAIN_SIZE - 1)] = distance;
    }

    /// Distance from the candidate at `pos` to the next older candidate.
    #[inline(always)]
    pub fn next_distance(&self, pos: usize) -> u16 {
        self.next_distances[pos & (CHAIN_SIZE - 1)]
    }
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance from `pos` back to a stored head, reduced into `1..=0x800`.
#[inline(always)]
fn distance_to(pos: usize, stored: u16) -> u16 {
    if stored & OCCUPIED == 0 {
        return NO_MATCH;
    }
    let raw = (pos as u32).wrapping_sub(stored as u32);
    ((raw.wrapping_sub(1) & MAX_DISTANCE as u32) + 1) as u16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
