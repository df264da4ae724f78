//! Tests for rail mask + SlotAllocator.

#[cfg(test)]
mod tests {
    use super::super::node::NodeId;
    use super::super::rail::{make_mask, RailPath, SlotAllocator, SlotRange};
    use bevy::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn id(index: u32) -> NodeId {
        NodeId { index, generation: 0 }
    }

    fn rail(num_slots: i32) -> SlotAllocator {
        SlotAllocator::new(num_slots, 10.0, RailPath::straight(num_slots as f32 * 10.0))
    }

    #[test]
    fn test_make_mask_edges() {
        for size in -5..=0 {
            for start in -3..70 {
                assert_eq!(make_mask(start, size), 0);
            }
        }
        for size in 64..80 {
            for start in 0..70 {
                assert_eq!(make_mask(start, size), u64::MAX);
            }
        }
    }

    #[test]
    fn test_make_mask_runs() {
        assert_eq!(make_mask(0, 1), 0b1);
        assert_eq!(make_mask(2, 3), 0b11100);
        assert_eq!(make_mask(60, 4), 0xF000_0000_0000_0000);
        assert_eq!(make_mask(0, 63).count_ones(), 63);
    }

    #[test]
    fn test_can_place_bounds() {
        let allocator = rail(10);
        assert!(allocator.can_place(0, 10));
        assert!(allocator.can_place(7, 3));
        assert!(!allocator.can_place(8, 3));
        assert!(!allocator.can_place(-1, 2));
        assert!(!rail(0).can_place(0, 1));
    }

    #[test]
    fn test_place_rejects_overlap_without_mutation() {
        let mut allocator = rail(10);
        assert!(allocator.place(id(1), SlotRange::new(2, 3)));
        let before = allocator.occupancy();

        assert!(!allocator.place(id(2), SlotRange::new(4, 2)));
        assert_eq!(allocator.occupancy(), before);
        assert!(!allocator.is_mounted(id(2)));

        assert!(allocator.place(id(2), SlotRange::new(5, 2)));
    }

    #[test]
    fn test_place_same_node_twice() {
        let mut allocator = rail(10);
        assert!(allocator.place(id(1), SlotRange::new(0, 1)));
        assert!(!allocator.place(id(1), SlotRange::new(5, 1)));
        assert_eq!(allocator.range_of(id(1)), Some(SlotRange::new(0, 1)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut allocator = rail(10);
        allocator.place(id(1), SlotRange::new(1, 2));
        let before = allocator.occupancy();
        allocator.remove(id(9));
        allocator.remove(id(9));
        assert_eq!(allocator.occupancy(), before);
    }

    #[test]
    fn test_slot_transform_clamped() {
        let allocator = rail(5);
        assert_eq!(allocator.slot_transform(-3).translation, Vec3::ZERO);
        assert_eq!(allocator.slot_transform(2).translation, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(allocator.slot_transform(99).translation, Vec3::new(0.0, 0.0, 40.0));
    }

    #[test]
    fn test_slot_from_distance() {
        let allocator = rail(5);
        assert_eq!(allocator.slot_from_distance(0.0), 0);
        assert_eq!(allocator.slot_from_distance(14.0), 1);
        assert_eq!(allocator.slot_from_distance(16.0), 2);
        assert_eq!(allocator.slot_from_distance(500.0), 4);
    }

    #[test]
    fn test_rail_path_polyline() {
        let path = RailPath::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(10.0, 0.0, 10.0)]);
        assert_eq!(path.length(), 20.0);
        assert_eq!(path.location_at(5.0), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(path.location_at(15.0), Vec3::new(5.0, 0.0, 10.0));
        assert_eq!(path.location_at(100.0), Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(RailPath::new(Vec::new()).length(), 0.0);
    }

    #[test]
    fn test_find_slot_skips_occupied_and_rejected() {
        let mut allocator = rail(10);
        allocator.place(id(1), SlotRange::new(0, 3));

        // Слот 3 свободен, но предикат его отбрасывает
        let candidate = allocator.find_slot(2, 10.0, |slot, _| slot != 3).unwrap();
        assert_eq!(candidate.slot, 4);
        assert_eq!(candidate.distance, 40.0);
    }

    #[test]
    fn test_find_slot_exhausted_terminates() {
        let allocator = rail(10);
        let mut calls = 0;
        let result = allocator.find_slot(1, 2.5, |_, _| {
            calls += 1;
            false
        });

        assert!(result.is_none());
        // floor(100 / 2.5) + 1 кандидатов, все в пределах планки
        assert_eq!(calls, 41);
        assert!(allocator.find_slot(1, 0.0, |_, _| true).is_none());
    }

    #[test]
    fn test_random_placements_preserve_mask_invariant() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut allocator = rail(64);
        let mut expected: Vec<(NodeId, SlotRange)> = Vec::new();

        for step in 0..2000u32 {
            if rng.gen_bool(0.6) {
                let range = SlotRange::new(rng.gen_range(-2..66), rng.gen_range(0..8));
                let node = id(step);
                let overlaps = expected.iter().any(|(_, r)| r.mask() & range.mask() != 0);
                let in_bounds = range.start >= 0 && range.start + range.size <= 64;

                // can_place обязан отказать на любом пересечении
                if overlaps {
                    assert!(!allocator.can_place(range.start, range.size));
                }
                let placed = allocator.place(node, range);
                assert_eq!(placed, in_bounds && !overlaps);
                if placed {
                    expected.push((node, range));
                }
            } else if !expected.is_empty() {
                let index = rng.gen_range(0..expected.len());
                let (node, _) = expected.swap_remove(index);
                allocator.remove(node);
            }

            let mask = expected.iter().fold(0u64, |acc, (_, r)| acc | r.mask());
            assert_eq!(allocator.occupancy(), mask);
        }
    }

    #[test]
    fn test_place_remove_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..200 {
            let mut allocator = rail(32);
            for i in 0..rng.gen_range(0..6) {
                allocator.place(id(i), SlotRange::new(rng.gen_range(0..32), rng.gen_range(1..5)));
            }
            let before = allocator.occupancy();

            let range = SlotRange::new(rng.gen_range(0..32), rng.gen_range(1..5));
            if allocator.place(id(100), range) {
                allocator.remove(id(100));
            }
            assert_eq!(allocator.occupancy(), before);
        }
    }
}
