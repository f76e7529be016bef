//! Which neighbours of the current image are worth decoding ahead

/// Indices to preload around `current`, nearest first, forward before
/// backward at equal distance: `+1, -1, +2, -2, ...` up to `count` on each
/// side, clipped to `0..len`.
pub fn preload_targets(len: usize, current: usize, count: usize) -> Vec<usize> {
    if current >= len {
        return Vec::new();
    }

    let mut targets = Vec::with_capacity(count * 2);
    for distance in 1..=count {
        if let Some(next) = current.checked_add(distance).filter(|i| *i < len) {
            targets.push(next);
        }
        if let Some(prev) = current.checked_sub(distance) {
            targets.push(prev);
        }
    }
    targets
}
