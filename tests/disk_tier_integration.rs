//! Integration tests for the disk tier.
//!
//! These tests verify cache window refit, write-back, and backing file
//! ownership across the grid and the persisted raster.

use rastercache::{DataType, GridConfig, GridManager, RasterFile, Tier, TierMode, WindowRect};
use tempfile::tempdir;

fn create_disk_grid(
    rows: usize,
    cols: usize,
    need_sync: bool,
) -> (GridManager<i32>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let config = GridConfig::new(rows, cols)
        .need_sync(need_sync)
        .tier(TierMode::DISK)
        .backing_dir(dir.path());
    (GridManager::new(config).unwrap(), dir)
}

/// 5×5, sync on: (4,4)=99 survives a refit to (0,0).
#[test]
fn test_write_back_survives_refit() {
    let (mut grid, _dir) = create_disk_grid(5, 5, true);

    grid.set_at(4, 4, 99).unwrap();
    grid.get_at(0, 0).unwrap();
    assert!(!grid.window().unwrap().contains(4, 4));

    assert_eq!(grid.get_at(4, 4).unwrap(), 99);
    assert!(grid.stats().write_backs >= 1);
}

/// With sync off, edits inside the window are dropped when it moves.
#[test]
fn test_unsynced_write_lost_on_refit() {
    let (mut grid, _dir) = create_disk_grid(5, 5, false);

    grid.set_at(4, 4, 99).unwrap();
    assert_eq!(grid.get_at(4, 4).unwrap(), 99);

    grid.get_at(0, 0).unwrap();
    assert_eq!(grid.get_at(4, 4).unwrap(), 0);
    assert_eq!(grid.stats().write_backs, 0);
}

#[test]
fn test_sync_toggle_takes_effect_at_next_refit() {
    let (mut grid, _dir) = create_disk_grid(40, 40, false);

    grid.set_at(0, 0, 1).unwrap();
    grid.set_need_sync(true);
    // Window still resident: flipping the flag now saves the pending edit.
    grid.get_at(39, 39).unwrap();
    assert_eq!(grid.get_at(0, 0).unwrap(), 1);
}

#[test]
fn test_window_geometry() {
    let (mut grid, _dir) = create_disk_grid(40, 80, false);
    assert!(grid.window().is_none());

    grid.get_at(20, 40).unwrap();
    assert_eq!(
        grid.window(),
        Some(WindowRect {
            brow: 15,
            bcol: 30,
            rows: 10,
            cols: 20
        })
    );

    // Near the far corner the window is clamped inside the grid.
    grid.get_at(39, 79).unwrap();
    assert_eq!(
        grid.window(),
        Some(WindowRect {
            brow: 30,
            bcol: 60,
            rows: 10,
            cols: 20
        })
    );

    // Near the origin as well.
    grid.get_at(1, 2).unwrap();
    let w = grid.window().unwrap();
    assert_eq!((w.brow, w.bcol), (0, 0));
}

#[test]
fn test_accesses_inside_window_are_hits() {
    let (mut grid, _dir) = create_disk_grid(40, 40, false);

    grid.get_at(20, 20).unwrap();
    for r in 16..24 {
        for c in 16..24 {
            grid.get_at(r, c).unwrap();
        }
    }

    let stats = grid.stats();
    assert_eq!(stats.refits, 1);
    assert_eq!(stats.hits, 64);
}

#[test]
fn test_rect_get_bypasses_window() {
    let (mut grid, _dir) = create_disk_grid(20, 20, false);

    grid.set_at(10, 10, 5).unwrap();
    let before = grid.window();

    // Unflushed window edit is not visible to a raster read.
    let rect = grid.get_rect(10, 10, 1, 1).unwrap().unwrap();
    assert_eq!(rect, vec![0]);
    assert_eq!(grid.window(), before);

    grid.flush().unwrap();
    assert_eq!(grid.get_rect(10, 10, 1, 1).unwrap().unwrap(), vec![5]);
}

#[test]
fn test_rect_set_goes_through_window() {
    let (mut grid, _dir) = create_disk_grid(16, 16, true);

    let patch: Vec<i32> = (1..=16).collect();
    grid.set_rect(0, 0, 4, 4, &patch).unwrap();
    assert!(grid.stats().refits >= 1);

    grid.flush().unwrap();
    assert_eq!(grid.get_rect(0, 0, 4, 4).unwrap().unwrap(), patch);
}

#[test]
fn test_set_all_then_index_reads_new_data() {
    let (mut grid, _dir) = create_disk_grid(8, 8, true);

    grid.set_at(0, 0, 123).unwrap();
    grid.set_all(&[4; 64]).unwrap();

    // A stale window must not overwrite the fresh raster on refit.
    assert_eq!(grid.get_at(0, 0).unwrap(), 4);
    grid.get_at(7, 7).unwrap();
    assert_eq!(grid.to_vec().unwrap(), vec![4; 64]);
}

// ============================================================================
// Backing file ownership
// ============================================================================

#[test]
fn test_owned_backing_file_removed_on_drop() {
    let (grid, dir) = create_disk_grid(10, 10, false);
    let path = grid.backing_path().unwrap().to_path_buf();
    assert!(path.starts_with(dir.path()));
    assert!(path.exists());

    drop(grid);
    assert!(!path.exists());
}

#[test]
fn test_default_backing_dir_is_working_directory() {
    let grid = GridManager::new(GridConfig::<u8>::new(4, 4).tier(TierMode::DISK)).unwrap();
    let path = grid.backing_path().unwrap().to_path_buf();
    assert_eq!(path.parent(), Some(std::path::Path::new(".")));
    assert!(path.exists());

    drop(grid);
    assert!(!path.exists());
}

#[test]
fn test_external_raster_kept_on_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("external.grd");
    {
        let mut rf = RasterFile::create(&path, 6, 4, DataType::Int32).unwrap();
        let data: Vec<i32> = (0..24).collect();
        rf.write_rect(&data, 0, 0, 4, 6).unwrap();
    }

    {
        let mut grid = GridManager::<i32>::open_disk(&path, true).unwrap();
        assert_eq!(grid.tier(), Tier::Disk);
        assert_eq!((grid.rows(), grid.cols()), (4, 6));
        assert_eq!(grid.get_at(2, 3).unwrap(), 15);

        grid.set_at(3, 5, -1).unwrap();
        grid.flush().unwrap();
    }

    assert!(path.exists());
    let mut rf = RasterFile::open(&path).unwrap();
    let mut cell = [0i32];
    rf.read_rect(&mut cell, 3, 5, 1, 1).unwrap();
    assert_eq!(cell[0], -1);
}

#[test]
fn test_open_wrong_element_type() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("floats.grd");
    RasterFile::create(&path, 2, 2, DataType::Float32).unwrap();

    assert!(GridManager::<i32>::open_disk(&path, false).is_err());
    assert!(GridManager::<f32>::open_disk(&path, false).is_ok());
}

#[test]
fn test_two_grids_have_separate_files() {
    let dir = tempdir().unwrap();
    let config = || {
        GridConfig::<i32>::new(8, 8)
            .tier(TierMode::DISK)
            .need_sync(true)
            .backing_dir(dir.path())
    };
    let mut a = GridManager::new(config().init_value(1)).unwrap();
    let mut b = GridManager::new(config().init_value(2)).unwrap();
    assert_ne!(a.backing_path(), b.backing_path());

    a.set_at(0, 0, 10).unwrap();
    a.flush().unwrap();
    assert_eq!(b.get_at(0, 0).unwrap(), 2);
    assert_eq!(a.get_at(0, 0).unwrap(), 10);
}
