//! Tests for FireController (fire + staged reload).

#[cfg(test)]
mod tests {
    use super::super::fire::{FireController, ReloadStage};
    use crate::ammo::{BulletType, Magazine, MagazineType};

    fn rifle(rounds: usize) -> FireController {
        let mut controller = FireController::default();
        controller.install_barrel(1);
        let mut magazine = Magazine::with_capacity(30);
        for _ in 0..rounds {
            magazine.add_bullet(BulletType::StandardFmj);
        }
        controller.reload_magazine(Some(magazine));
        controller
    }

    #[test]
    fn test_dry_fire_no_durability_change() {
        let mut controller = rifle(0);
        let before = controller.durability();

        assert!(controller.fire().is_empty());
        assert_eq!(controller.durability(), before);
    }

    #[test]
    fn test_three_rounds_then_empty() {
        let mut controller = rifle(3);

        for _ in 0..3 {
            assert_eq!(controller.fire(), vec![BulletType::StandardFmj]);
        }
        assert_eq!(controller.ammo_count(), 0);
        assert!(!controller.is_chambered());
        assert!(controller.fire().is_empty());
    }

    #[test]
    fn test_fire_chambers_next_round() {
        let mut controller = rifle(2);
        controller.fire();

        // Второй патрон уже в патроннике, магазин пуст
        assert!(controller.is_chambered());
        assert_eq!(controller.ammo_count(), 0);
    }

    #[test]
    fn test_fire_without_barrel_or_magazine() {
        let mut no_barrel = FireController::default();
        no_barrel.reload_magazine(Some(Magazine::with_capacity(5).filled(BulletType::Tracer)));
        assert!(no_barrel.fire().is_empty());
        assert_eq!(no_barrel.ammo_count(), 5);

        let mut no_magazine = FireController::default();
        no_magazine.install_barrel(1);
        assert!(!no_magazine.try_chamber_from_magazine());
        assert!(no_magazine.fire().is_empty());
    }

    #[test]
    fn test_durability_per_shot_clamped() {
        let mut controller = rifle(3);
        controller.set_durability(0.7);

        controller.fire();
        assert!((controller.durability() - 0.2).abs() < 1e-6);
        controller.fire();
        assert_eq!(controller.durability(), 0.0);
    }

    #[test]
    fn test_modify_durability_clamps() {
        let mut controller = FireController::default();
        assert_eq!(controller.modify_durability(25.0), 100.0);
        assert_eq!(controller.modify_durability(-250.0), 0.0);
    }

    #[test]
    fn test_shotgun_pellets() {
        let mut controller = FireController::default();
        controller.install_barrel(8);
        controller.reload_magazine(Some(Magazine::with_capacity(2).filled(BulletType::HuntingJsp)));

        let fired = controller.fire();
        assert_eq!(fired.len(), 8);
        assert!(fired.iter().all(|b| *b == BulletType::HuntingJsp));
        // Одна гильза = один патрон из магазина
        assert_eq!(controller.ammo_count(), 0);
        assert_eq!(controller.chamber().map(|c| c.rounds().len()), Some(8));
    }

    #[test]
    fn test_remove_barrel_distinct_from_empty_chamber() {
        let mut controller = rifle(1);
        assert!(controller.try_chamber_from_magazine());

        assert_eq!(controller.remove_barrel(), vec![BulletType::StandardFmj]);
        assert!(!controller.has_barrel());
        assert!(controller.chamber().is_none());
    }

    #[test]
    fn test_begin_reload_table() {
        // (chambered, magazine) → stage
        let cases = [
            (true, true, ReloadStage::RemoveMagazine),
            (true, false, ReloadStage::InsertMagazine),
            (false, true, ReloadStage::RemoveMagazine),
            (false, false, ReloadStage::InsertMagazine),
        ];

        for (chambered, attached, expected) in cases {
            let mut controller = rifle(5);
            if chambered {
                assert!(controller.try_chamber_from_magazine());
            }
            if !attached {
                controller.reload_magazine(None);
            }

            assert_eq!(controller.is_chambered(), chambered);
            assert_eq!(controller.begin_staged_reload(), expected);
            assert_eq!(controller.reload_stage(), expected);
        }
    }

    #[test]
    fn test_full_staged_reload() {
        let mut controller = rifle(0);

        assert_eq!(controller.begin_staged_reload(), ReloadStage::RemoveMagazine);

        let removed = controller.process_stage(ReloadStage::RemoveMagazine, None);
        assert_eq!(removed.next, ReloadStage::InsertMagazine);
        assert!(removed.ejected.is_some());
        assert!(!controller.is_magazine_attached());

        let fresh = Magazine::new(MagazineType::MagpulMoe30).filled(BulletType::Tracer);
        let inserted = controller.process_stage(ReloadStage::InsertMagazine, Some(fresh));
        assert_eq!(inserted.next, ReloadStage::RackHandle);
        assert!(inserted.ejected.is_none());
        assert_eq!(controller.ammo_count(), 30);

        let racked = controller.process_stage(ReloadStage::RackHandle, None);
        assert_eq!(racked.next, ReloadStage::None);
        assert!(controller.is_chambered());
        assert_eq!(controller.ammo_count(), 29);
        assert_eq!(controller.reload_stage(), ReloadStage::None);
    }

    #[test]
    fn test_insert_with_chambered_round_skips_rack() {
        let mut controller = rifle(3);
        assert!(controller.try_chamber_from_magazine());
        controller.process_stage(ReloadStage::RemoveMagazine, None);

        let outcome = controller.process_stage(
            ReloadStage::InsertMagazine,
            Some(Magazine::with_capacity(10).filled(BulletType::Subsonic)),
        );
        assert_eq!(outcome.next, ReloadStage::None);
    }

    #[test]
    fn test_rack_failure_still_finishes() {
        let mut controller = rifle(0);
        let outcome = controller.process_stage(ReloadStage::RackHandle, None);

        assert_eq!(outcome.next, ReloadStage::None);
        assert!(!controller.is_chambered());
    }

    #[test]
    fn test_magazine_on_wrong_stage_returned() {
        let mut controller = rifle(0);
        let spare = Magazine::with_capacity(10);

        let outcome = controller.process_stage(ReloadStage::RackHandle, Some(spare.clone()));
        assert_eq!(outcome.unused, Some(spare));
    }

    #[test]
    fn test_cancel_reload() {
        let mut controller = rifle(4);
        controller.begin_staged_reload();
        controller.cancel_reload();

        assert_eq!(controller.reload_stage(), ReloadStage::None);
        assert!(controller.is_magazine_attached());
        assert_eq!(controller.ammo_count(), 4);

        // Повторный cancel безопасен
        controller.cancel_reload();
        assert_eq!(controller.reload_stage(), ReloadStage::None);
    }
}
