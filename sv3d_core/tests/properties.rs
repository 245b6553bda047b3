//! Property tests for the geometry primitives.
//!
//! 1. **Chamfer** - identity, symmetry and monotonicity under displacement
//! 2. **Projection** - the orthographic basis preserves lengths
//! 3. **Voxel grids** - occupied cells agree with the stored values

use proptest::prelude::*;
use sv3d_core::prelude::*;

fn point_strategy() -> impl Strategy<Value = Point3> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn cloud_strategy() -> impl Strategy<Value = Vec<Point3>> {
    prop::collection::vec(point_strategy(), 1..64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chamfer_of_identical_sets_is_zero(cloud in cloud_strategy()) {
        let d = chamfer_distance(&cloud, &cloud).unwrap();
        prop_assert_eq!(d, 0.0);
    }

    #[test]
    fn chamfer_is_symmetric(a in cloud_strategy(), b in cloud_strategy()) {
        let ab = chamfer_distance(&a, &b).unwrap();
        let ba = chamfer_distance(&b, &a).unwrap();
        prop_assert!((ab - ba).abs() <= 1e-5 * ab.max(1.0));
        prop_assert!(ab >= 0.0 && ab.is_finite());
    }

    #[test]
    fn chamfer_of_shifted_copy_is_bounded(cloud in cloud_strategy(), dz in 0.01f32..0.5) {
        let shifted: Vec<Point3> = cloud.iter().map(|p| *p + Point3::new(0.0, 0.0, dz)).collect();
        let d = chamfer_distance(&cloud, &shifted).unwrap();
        // Every point has its own copy at dz^2; the highest shifted point has nothing closer than dz.
        prop_assert!(d <= 2.0 * dz * dz + 1e-5, "d={} dz={}", d, dz);
        prop_assert!(d >= dz * dz / cloud.len() as f32 - 1e-6, "d={} dz={}", d, dz);
    }

    #[test]
    fn projection_preserves_length(p in point_strategy(), elev in -89.0f32..89.0, azim in -180.0f32..180.0) {
        let view = OrthoView::new(elev, azim);
        let q = view.project(p);
        let len_sq = q.x * q.x + q.y * q.y + q.depth * q.depth;
        prop_assert!((len_sq - p.length_squared()).abs() < 1e-4);
    }

    #[test]
    fn occupied_cells_are_above_threshold(
        values in prop::collection::vec(0.0f32..1.0, 27),
        threshold in 0.0f32..1.0,
    ) {
        let grid = VoxelGrid::new([3, 3, 3], values).unwrap();
        let cells = grid.occupied(threshold);
        let expected = grid.values().iter().filter(|v| **v > threshold).count();
        prop_assert_eq!(cells.len(), expected);
        for [i, j, k] in cells {
            prop_assert!(grid.get(i, j, k).unwrap() > threshold);
        }
    }
}
