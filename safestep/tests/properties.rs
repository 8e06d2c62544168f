use proptest::prelude::*;
use safestep::navigate::instruction::{decide, Instruction};
use safestep::navigate::lane::{lane_bounds, Lane};
use safestep::navigate::obstacle::ObstacleClassSet;
use safestep::navigate::occupancy::{compute_occupancy, intersection_fraction, OccupancyVector};
use safestep_inference::Detection;

proptest! {
    #[test]
    fn lanes_partition_the_frame(frame_width in 0u32..10_000) {
        let [left, center, right] = lane_bounds(frame_width);

        prop_assert_eq!(left.x1, 0);
        prop_assert_eq!(left.x2, center.x1);
        prop_assert_eq!(center.x2, right.x1);
        prop_assert_eq!(right.x2, frame_width as i64);
        prop_assert_eq!(left.width(), center.width());
        prop_assert!(right.width() >= center.width());
        prop_assert!(right.width() - center.width() < 3);

        for x in [0, frame_width / 2, frame_width.saturating_sub(1)] {
            if x < frame_width {
                let owners = [left, center, right]
                    .iter()
                    .filter(|lane| lane.x1 <= x as i64 && (x as i64) < lane.x2)
                    .count();
                prop_assert_eq!(owners, 1);
            }
        }
    }

    #[test]
    fn fractions_stay_in_unit_range(
        frame_width in 3u32..4_000,
        x1 in -500i32..4_500,
        width in -50i32..4_000,
    ) {
        let detection = Detection::new((x1, 0, x1 + width, 10), 0.9, 0, "person");
        let mut total = 0.0f64;
        for lane in Lane::ALL {
            let fraction = intersection_fraction(&detection, lane.bounds(frame_width));
            prop_assert!((0.0..=1.0).contains(&fraction));
            total += fraction;
        }
        prop_assert!(total <= 1.0 + 1e-4);
    }

    #[test]
    fn box_inside_a_lane_blocks_only_that_lane(offset in 0i32..300, width in 1i32..20) {
        let center_x1 = 320 + offset;
        let detection = Detection::new((center_x1, 0, center_x1 + width, 10), 0.9, 0, "person");

        let occupancy = compute_occupancy(960, 540, &[detection], &ObstacleClassSet::default(), 1.0);
        prop_assert_eq!(occupancy, OccupancyVector::new(false, true, false));
    }

    #[test]
    fn center_clear_always_moves_forward(left: bool, right: bool) {
        let occupancy = OccupancyVector::new(left, false, right);
        prop_assert_eq!(decide(occupancy), Instruction::MoveForward);
    }
}
