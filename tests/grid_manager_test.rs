//! Grid Manager Tests
//!
//! End-to-end behavior of every tier through the public API.

use rastercache::common::config::{chunk_capacity, MB_BYTES};
use rastercache::{Error, GridConfig, GridManager, Tier, TierMode};
use tempfile::tempdir;

const TIERS: [Tier; 3] = Tier::ORDER;

fn create_grid<T: rastercache::Element>(
    config: GridConfig<T>,
) -> (GridManager<T>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let grid = GridManager::new(config.backing_dir(dir.path())).unwrap();
    (grid, dir)
}

// ============================================================================
// Fill value and element access
// ============================================================================

/// 10×10 i32, fill 5, in-memory: set (3,3)=42, everything else stays 5.
#[test]
fn test_in_memory_scenario() {
    let (mut grid, _dir) = create_grid(
        GridConfig::<i32>::new(10, 10)
            .init_value(5)
            .tier(TierMode::IN_MEMORY),
    );

    for i in 0..100 {
        assert_eq!(grid.get(i).unwrap(), 5);
    }

    grid.set_at(3, 3, 42).unwrap();
    let all = grid.to_vec().unwrap();
    assert_eq!(all.len(), 100);
    assert_eq!(all[33], 42);
    for (i, &v) in all.iter().enumerate() {
        if i != 33 {
            assert_eq!(v, 5, "offset {}", i);
        }
    }
}

#[test]
fn test_fill_value_every_cell_every_tier() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(
            GridConfig::<f64>::new(9, 11)
                .init_value(2.5)
                .tier(tier),
        );
        for row in 0..9 {
            for col in 0..11 {
                assert_eq!(grid.get_at(row, col).unwrap(), 2.5, "{} ({}, {})", tier, row, col);
            }
        }
        assert!(grid.get_rect(0, 0, 9, 11).unwrap().unwrap().iter().all(|&v| v == 2.5));
    }
}

#[test]
fn test_zero_fill_default() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<u16>::new(4, 4).tier(tier));
        assert_eq!(grid.to_vec().unwrap(), vec![0; 16]);
    }
}

#[test]
fn test_read_after_write_every_tier() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(12, 12).tier(tier));
        for i in (0..144).step_by(7) {
            grid.set(i, i as i32 * 3).unwrap();
            assert_eq!(grid.get(i).unwrap(), i as i32 * 3, "{} index {}", tier, i);
        }
    }
}

#[test]
fn test_out_of_range_index_is_an_error() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(5, 5).tier(tier));
        match grid.set(25, 1) {
            Err(Error::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 25);
                assert_eq!(len, 25);
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
        // The grid stays usable.
        grid.set(24, 1).unwrap();
        assert_eq!(grid.get(24).unwrap(), 1);
    }
}

// ============================================================================
// Bulk get/set
// ============================================================================

#[test]
fn test_bulk_round_trip_every_tier() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(13, 17).tier(tier));
        let data: Vec<i32> = (0..13 * 17).map(|i| i * 31 - 500).collect();

        grid.set_all(&data).unwrap();
        assert_eq!(grid.to_vec().unwrap(), data, "tier {}", tier);
    }
}

#[test]
fn test_bulk_get_is_independent_copy() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(
            GridConfig::<i32>::new(4, 4)
                .init_value(1)
                .need_sync(true)
                .tier(tier),
        );
        let snapshot = grid.to_vec().unwrap();
        grid.set(0, 99).unwrap();
        grid.flush().unwrap();

        assert_eq!(snapshot[0], 1);
        assert_eq!(grid.to_vec().unwrap()[0], 99);
    }
}

#[test]
fn test_bulk_set_rejects_wrong_length() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(4, 4).init_value(7).tier(tier));
        assert!(matches!(
            grid.set_all(&[0; 17]),
            Err(Error::LengthMismatch {
                expected: 16,
                actual: 17
            })
        ));
        assert_eq!(grid.to_vec().unwrap(), vec![7; 16]);
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// 5×5 grid: a 6×6 request is out of bounds on every tier.
#[test]
fn test_oversized_rect_returns_none() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(5, 5).tier(tier));
        assert!(grid.get_rect(0, 0, 6, 6).unwrap().is_none(), "tier {}", tier);
        assert!(grid.get_rect(3, 0, 3, 1).unwrap().is_none());
        assert!(grid.get_rect(0, 4, 1, 2).unwrap().is_none());
    }
}

#[test]
fn test_rect_matches_bulk_every_tier() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(8, 10).tier(tier));
        let data: Vec<i32> = (0..80).collect();
        grid.set_all(&data).unwrap();

        let rect = grid.get_rect(2, 3, 4, 5).unwrap().unwrap();
        let expected: Vec<i32> = (2..6)
            .flat_map(|r| (3..8).map(move |c| r * 10 + c))
            .collect();
        assert_eq!(rect, expected, "tier {}", tier);
    }
}

#[test]
fn test_empty_rect() {
    for tier in TIERS {
        let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(5, 5).tier(tier));
        assert_eq!(grid.get_rect(5, 5, 0, 0).unwrap(), Some(vec![]));
        grid.set_rect(2, 2, 0, 3, &[]).unwrap();
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_tier_code() {
    for code in [-5, 3, 100] {
        assert!(matches!(
            GridConfig::<i32>::new(2, 2).tier_code(code),
            Err(Error::InvalidTier(c)) if c == code
        ));
    }
}

#[test]
fn test_legacy_tier_codes() {
    for (code, tier) in [(0, Tier::InMemory), (1, Tier::Paged), (2, Tier::Disk)] {
        let dir = tempdir().unwrap();
        let config = GridConfig::<i32>::new(4, 4)
            .tier_code(code)
            .unwrap()
            .backing_dir(dir.path());
        assert_eq!(GridManager::new(config).unwrap().tier(), tier);
    }
}

// ============================================================================
// Paged tier addressing
// ============================================================================

#[test]
fn test_paged_chunk_boundary() {
    let c = chunk_capacity(4);
    // Just over one chunk's worth of i32 cells.
    let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(1100, 1000).tier(TierMode::PAGED));
    assert_eq!(grid.tier(), Tier::Paged);
    assert!(grid.len() > c + 1);

    grid.set(c - 1, -1).unwrap();
    grid.set(c, -2).unwrap();
    grid.set(c + 1, -3).unwrap();

    assert_eq!(grid.get(c - 2).unwrap(), 0);
    assert_eq!(grid.get(c - 1).unwrap(), -1);
    assert_eq!(grid.get(c).unwrap(), -2);
    assert_eq!(grid.get(c + 1).unwrap(), -3);
    assert_eq!(grid.get(c + 2).unwrap(), 0);

    let all = grid.to_vec().unwrap();
    assert_eq!(&all[c - 1..c + 2], &[-1, -2, -3]);
}

#[test]
fn test_paged_rect_straddles_chunks() {
    let c = chunk_capacity(4);
    let cols = 1000;
    let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(1100, cols).tier(TierMode::PAGED));

    // Row containing the chunk boundary.
    let row = c / cols;
    grid.set_rect(row, 0, 2, cols, &vec![8; 2 * cols]).unwrap();
    let rect = grid.get_rect(row, 0, 2, cols).unwrap().unwrap();
    assert!(rect.iter().all(|&v| v == 8));
    assert_eq!(grid.get(c).unwrap(), 8);
}

#[test]
fn test_paged_exact_chunk_multiple_round_trip() {
    let c = chunk_capacity(4);
    // Exactly two chunks: the last one is full.
    let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(2, c).tier(TierMode::PAGED));
    let data: Vec<i32> = (0..2 * c as i32).collect();
    grid.set_all(&data).unwrap();
    assert_eq!(grid.to_vec().unwrap(), data);
}

// ============================================================================
// Tier thresholds (large; run with --ignored)
// ============================================================================

fn threshold_round_trip(mb: usize, expected: Tier) {
    let cols = 1024;
    let rows = mb * MB_BYTES / 4 / cols;
    let (mut grid, _dir) = create_grid(GridConfig::<i32>::new(rows, cols));
    assert_eq!(grid.tier(), expected);

    let data: Vec<i32> = (0..(rows * cols) as i32).collect();
    grid.set_all(&data).unwrap();
    assert_eq!(grid.to_vec().unwrap(), data);
}

#[test]
#[ignore = "allocates ~100 MB"]
fn test_threshold_99mb_in_memory() {
    threshold_round_trip(99, Tier::InMemory);
}

#[test]
#[ignore = "allocates ~100 MB"]
fn test_threshold_101mb_paged() {
    threshold_round_trip(101, Tier::Paged);
}

#[test]
#[ignore = "allocates ~300 MB"]
fn test_threshold_299mb_paged() {
    threshold_round_trip(299, Tier::Paged);
}

#[test]
#[ignore = "writes ~300 MB to disk"]
fn test_threshold_301mb_disk() {
    threshold_round_trip(301, Tier::Disk);
}
