//! Sequencing policy
//!
//! Pure mapping from (queue length, current index, mode) to the next or
//! previous index. `None` means "no index": the caller treats it as a no-op,
//! never as index 0.

use nwp_common::PlaybackMode;
use rand::Rng;

/// Index to play after `current`
///
/// - Sequential: wraps past the end
/// - Random: independent uniform draw (may repeat `current`)
/// - Loop: `current` again
/// - PersonalRadio: always `None` (the radio feed decides)
///
/// With no current index, Sequential and Loop start from the first entry.
pub fn next_index<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match mode {
        PlaybackMode::Sequential => Some(current.map_or(0, |c| (c + 1) % len)),
        PlaybackMode::Random => Some(rng.gen_range(0..len)),
        PlaybackMode::Loop => Some(current.filter(|&c| c < len).unwrap_or(0)),
        PlaybackMode::PersonalRadio => None,
    }
}

/// Index to play before `current`
///
/// Mirrors [`next_index`]; Sequential wraps to the last entry.
pub fn prev_index<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match mode {
        PlaybackMode::Sequential => Some(match current {
            Some(c) if c < len => (c + len - 1) % len,
            _ => len - 1,
        }),
        PlaybackMode::Random => Some(rng.gen_range(0..len)),
        PlaybackMode::Loop => Some(current.filter(|&c| c < len).unwrap_or(len - 1)),
        PlaybackMode::PersonalRadio => None,
    }
}

/// Index for an automatic advance that avoids failed entries
///
/// `failed[i]` flags queue entries known to be unplayable this session.
/// Sequential (and Loop, which would otherwise retry the same entry) walk
/// forward from `current` and take the first playable entry, wrapping once.
/// Random draws uniformly among playable entries. Returns `None` when no
/// playable entry remains.
pub fn next_playable<R: Rng + ?Sized>(
    failed: &[bool],
    current: Option<usize>,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    let len = failed.len();
    if len == 0 {
        return None;
    }
    match mode {
        PlaybackMode::Random => {
            let playable: Vec<usize> = (0..len).filter(|&i| !failed[i]).collect();
            if playable.is_empty() {
                None
            } else {
                Some(playable[rng.gen_range(0..playable.len())])
            }
        }
        PlaybackMode::Sequential | PlaybackMode::Loop => {
            let start = current.map_or(0, |c| c + 1);
            (0..len)
                .map(|step| (start + step) % len)
                .find(|&i| !failed[i])
        }
        PlaybackMode::PersonalRadio => None,
    }
}
