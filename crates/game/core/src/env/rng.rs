//! RNG oracle for deterministic random rolls.
//!
//! Every roll in the game (room assignment, loot, encounters, traps) goes
//! through [`RngOracle`] with an explicit seed, so a session replays exactly
//! from its base seed and tests can script the values they need.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must produce the same value for the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Value in `[0, bound)`. A zero bound yields zero.
    fn below(&self, seed: u64, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32(seed) % bound
    }

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        self.below(seed, 100) + 1
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: the seed is the state, advanced once per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a seed for one roll.
///
/// # Arguments
///
/// * `game_seed` - Base seed of the session
/// * `nonce` - Sequence number of the operation doing the rolling
/// * `unit` - Raw id of the unit the roll is for
/// * `context` - Index of the roll within the operation
pub fn compute_seed(game_seed: u64, nonce: u64, unit: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (unit as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Cumulative weighted pick.
///
/// Walks the entries adding up weights and returns the first entry for which
/// `roll < running_total`. A roll of zero therefore always lands on the first
/// entry with a non-zero weight. Returns `None` when `roll` is not below the
/// total weight.
pub fn pick_weighted<T>(entries: &[T], weight: impl Fn(&T) -> u32, roll: u32) -> Option<&T> {
    pick_weighted_index(entries, weight, roll).map(|index| &entries[index])
}

/// Index form of [`pick_weighted`].
pub fn pick_weighted_index<T>(entries: &[T], weight: impl Fn(&T) -> u32, roll: u32) -> Option<usize> {
    let mut running: u64 = 0;
    for (index, entry) in entries.iter().enumerate() {
        running += u64::from(weight(entry));
        if u64::from(roll) < running {
            return Some(index);
        }
    }
    None
}

/// Sum of all weights, saturating at `u32::MAX`.
pub fn total_weight<T>(entries: &[T], weight: impl Fn(&T) -> u32) -> u32 {
    entries
        .iter()
        .fold(0u32, |acc, entry| acc.saturating_add(weight(entry)))
}

/// Rolls against the total weight and picks an entry.
pub fn roll_weighted<'a, T, R>(
    entries: &'a [T],
    weight: impl Fn(&T) -> u32 + Copy,
    rng: &R,
    seed: u64,
) -> Option<&'a T>
where
    R: RngOracle + ?Sized,
{
    let total = total_weight(entries, weight);
    if total == 0 {
        return None;
    }
    pick_weighted(entries, weight, rng.below(seed, total))
}
