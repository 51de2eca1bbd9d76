//! Stable elevation ordering for sibling lists.
//!
//! Siblings are kept sorted ascending by elevation, so the last child is the
//! topmost one. Elevation changes usually move a view by only a few slots
//! (press and hover feedback), so a changed entry is walked into place by
//! shifting its neighbours instead of re-sorting the whole list. Equal
//! elevations are never swapped, which keeps insertion order among ties.

/// Offset added to negative elevations.
///
/// A negative elevation means "counted from the top of elevation space", so
/// such views paint above every view with a regular elevation.
pub const NEGATIVE_ELEVATION_OFFSET: f32 = 1_000_000.0;

/// Map a requested elevation to the value used for ordering.
///
/// Negative values land in the upper half of `[0, NEGATIVE_ELEVATION_OFFSET)`;
/// anything below `-NEGATIVE_ELEVATION_OFFSET / 2` shares the lowest of those
/// slots.
pub fn normalize(elevation: f32) -> f32 {
    if elevation.is_nan() {
        0.0
    } else if elevation < 0.0 {
        NEGATIVE_ELEVATION_OFFSET + elevation.max(-NEGATIVE_ELEVATION_OFFSET / 2.0)
    } else {
        elevation
    }
}

/// Move `items[index]` to its ordered slot and return the new index.
///
/// Only entries between the old and new index are shifted, each by one slot.
pub fn settle<T: Copy>(items: &mut [T], index: usize, elevation: impl Fn(T) -> f32) -> usize {
    let item = items[index];
    let value = elevation(item);
    let mut slot = index;

    if slot > 0 && elevation(items[slot - 1]) > value {
        while slot > 0 && elevation(items[slot - 1]) > value {
            items[slot] = items[slot - 1];
            slot -= 1;
        }
    } else {
        while slot + 1 < items.len() && elevation(items[slot + 1]) < value {
            items[slot] = items[slot + 1];
            slot += 1;
        }
    }

    items[slot] = item;
    slot
}

/// Check the sibling invariant: elevations never decrease.
pub fn is_ordered<T: Copy>(items: &[T], elevation: impl Fn(T) -> f32) -> bool {
    items
        .windows(2)
        .all(|pair| elevation(pair[0]) <= elevation(pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // (id, elevation)
    fn key(entry: (u32, f32)) -> f32 {
        entry.1
    }

    fn ids(items: &[(u32, f32)]) -> Vec<u32> {
        items.iter().map(|e| e.0).collect()
    }

    #[test]
    fn test_settle_already_ordered() {
        let mut items = vec![(0, 0.0), (1, 1.0), (2, 2.0)];
        assert_eq!(settle(&mut items, 1, key), 1);
        assert_eq!(ids(&items), vec![0, 1, 2]);
    }

    #[test]
    fn test_settle_moves_backward() {
        let mut items = vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 0.5)];
        let slot = settle(&mut items, 3, key);
        assert_eq!(slot, 0);
        assert_eq!(ids(&items), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_settle_moves_forward() {
        let mut items = vec![(0, 5.0), (1, 1.0), (2, 2.0), (3, 9.0)];
        let slot = settle(&mut items, 0, key);
        assert_eq!(slot, 2);
        assert_eq!(ids(&items), vec![1, 2, 0, 3]);
        assert!(is_ordered(&items, key));
    }

    #[test]
    fn test_settle_keeps_ties_in_insertion_order() {
        // New entry appended with an elevation equal to an existing one
        let mut items = vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 2.0)];
        let slot = settle(&mut items, 3, key);
        assert_eq!(slot, 2);
        assert_eq!(ids(&items), vec![0, 1, 3, 2]);

        // Raising to an equal elevation does not jump past the tie
        let mut items = vec![(0, 0.0), (1, 2.0), (2, 2.0)];
        items[0].1 = 2.0;
        assert_eq!(settle(&mut items, 0, key), 0);
        assert_eq!(ids(&items), vec![0, 1, 2]);
    }

    #[test]
    fn test_normalize_negative_elevation() {
        assert_eq!(normalize(3.0), 3.0);
        assert_eq!(normalize(-1.0), NEGATIVE_ELEVATION_OFFSET - 1.0);
        assert_eq!(normalize(f32::NAN), 0.0);
        assert!(normalize(-1.0) > normalize(10_000.0));
    }

    #[test]
    fn test_normalize_huge_negative_stays_on_top() {
        assert_eq!(normalize(-2_000_000.0), NEGATIVE_ELEVATION_OFFSET / 2.0);
        assert_eq!(normalize(f32::MIN), NEGATIVE_ELEVATION_OFFSET / 2.0);
        assert!(normalize(-2_000_000.0) > normalize(10_000.0));
        assert!(normalize(-1.0) > normalize(-2_000_000.0));
    }
}
