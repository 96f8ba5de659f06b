//! Read-only metrics over a snapshot's occupied cells, for evaluators.
//! The active piece is never counted. Not used by movegen.

use crate::Snapshot;

/// Number of occupied cells.
pub fn cell_count(snapshot: &Snapshot) -> usize {
    snapshot.occupied().count()
}

/// Top-most occupied row, or `height` for an empty board.
pub fn min_occupied_row(snapshot: &Snapshot) -> usize {
    let cells = snapshot.occupied();
    // iter() is ascending, so the first index is on the top-most row
    cells
        .iter()
        .next()
        .map_or(cells.height(), |i| i / cells.width())
}

/// Per column: empty cells from the top down to the first occupied cell
/// (`height` for an empty column).
pub fn top_empty_counts(snapshot: &Snapshot) -> Vec<usize> {
    let cells = snapshot.occupied();
    (0..cells.width() as i32)
        .map(|x| {
            (0..cells.height() as i32)
                .position(|y| cells.contains_cell(x, y))
                .unwrap_or(cells.height())
        })
        .collect()
}

/// Occupied or off the board.
#[inline]
pub fn is_blocked(snapshot: &Snapshot, col: i32, row: i32) -> bool {
    let cells = snapshot.occupied();
    match cells.index(col, row) {
        Some(i) => cells.contains(i),
        None => true,
    }
}

/// Per row: empty cells boxed in horizontally (left and right blocked)
/// or vertically (above and below blocked). Board edges count as blocked.
pub fn boxed_empty_counts(snapshot: &Snapshot) -> Vec<usize> {
    let cells = snapshot.occupied();
    (0..cells.height() as i32)
        .map(|y| {
            (0..cells.width() as i32)
                .filter(|&x| !cells.contains_cell(x, y) && is_boxed(snapshot, x, y))
                .count()
        })
        .collect()
}

fn is_boxed(snapshot: &Snapshot, col: i32, row: i32) -> bool {
    let horizontal = is_blocked(snapshot, col - 1, row) && is_blocked(snapshot, col + 1, row);
    let vertical = is_blocked(snapshot, col, row - 1) && is_blocked(snapshot, col, row + 1);
    horizontal || vertical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellSet;

    fn snapshot_with(cells: &[(i32, i32)]) -> Snapshot {
        let mut set = CellSet::new(10, 20);
        for &(x, y) in cells {
            set.insert_cell(x, y);
        }
        Snapshot::from_occupied(set)
    }

    #[test]
    fn test_empty_board() {
        let s = Snapshot::default();
        assert_eq!(cell_count(&s), 0);
        assert_eq!(min_occupied_row(&s), 20);
        assert_eq!(top_empty_counts(&s), vec![20; 10]);
        assert!(boxed_empty_counts(&s).iter().all(|&n| n == 0));
    }

    #[test]
    fn test_single_cell() {
        let s = snapshot_with(&[(5, 16)]);
        assert_eq!(cell_count(&s), 1);
        assert_eq!(min_occupied_row(&s), 16);
        let tops = top_empty_counts(&s);
        assert_eq!(tops[5], 16);
        assert_eq!(tops[4], 20);
    }

    #[test]
    fn test_boxed_cells() {
        // row 19: (4,19) between two cells, (1,19) between (1,18) and the floor
        // row 18: (0,18) pinned between the wall and (1,18)
        let s = snapshot_with(&[(3, 19), (5, 19), (1, 18)]);
        let boxed = boxed_empty_counts(&s);
        assert_eq!(boxed[19], 2);
        assert_eq!(boxed[18], 1);
        assert_eq!(boxed[17], 0);
    }

    #[test]
    fn test_vertical_box() {
        let s = snapshot_with(&[(2, 17), (2, 19)]);
        assert_eq!(boxed_empty_counts(&s)[18], 1);
    }

    #[test]
    fn test_blocked_edges() {
        let s = Snapshot::default();
        assert!(is_blocked(&s, -1, 0));
        assert!(is_blocked(&s, 10, 0));
        assert!(is_blocked(&s, 0, 20));
        assert!(!is_blocked(&s, 0, 0));
    }
}
