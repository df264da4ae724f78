//! Tests for WeaponAssembly (build → indexer → fire/reload, authority gate).

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::ammo::{BulletType, Magazine};
    use crate::attachment::*;
    use crate::config::WeaponConfig;

    struct Host {
        templates: AttachmentTemplates,
        sockets: MeshSockets,
        obstacles: StaticObstacles,
        config: WeaponConfig,
    }

    impl Host {
        fn rifle() -> Self {
            Self {
                templates: AttachmentTemplates::default(),
                sockets: MeshSockets::rifle(),
                obstacles: StaticObstacles::new(),
                config: WeaponConfig::default(),
            }
        }

        fn ctx(&self) -> BuildContext<'_> {
            BuildContext::new(&self.templates, &self.sockets, &self.obstacles, &self.config)
        }

        fn built(&self) -> WeaponAssembly {
            let mut weapon = WeaponAssembly::authority(self.config.clone());
            weapon.build(&AttachmentTemplates::rifle_roots(), &self.ctx());
            weapon
        }
    }

    #[test]
    fn test_build_indexes_barrel_and_magazine() {
        let host = Host::rifle();
        let mut weapon = host.built();

        assert!(weapon.fire_controller().has_barrel());
        assert!(!weapon.fire_controller().is_chambered());

        let view = weapon.view();
        assert!(view.magazine_attached);
        assert_eq!(view.ammo_count, 30);
        assert_eq!(view.reload_stage, ReloadStage::None);

        let events = weapon.drain_events();
        assert!(matches!(&events[..], [WeaponEvent::GraphBuilt(nodes)] if nodes.len() == 11));
        assert!(weapon.drain_events().is_empty());
    }

    #[test]
    fn test_durability_modes_over_parts() {
        let host = Host::rifle();
        let weapon = host.built();

        assert_eq!(weapon.durability(Some(DurabilityMode::Minimum)), 70.0);
        assert_eq!(weapon.durability(Some(DurabilityMode::Maximum)), 100.0);

        // Рабочая durability засеяна из aggregate в режиме по умолчанию
        let average = weapon.durability(None);
        assert!((average - 1020.0 / 11.0).abs() < 1e-3);
        assert_eq!(weapon.weapon_durability(), average);
    }

    #[test]
    fn test_durability_zero_without_parts() {
        let weapon = WeaponAssembly::authority(WeaponConfig::default());
        assert_eq!(weapon.durability(None), 0.0);
        assert_eq!(weapon.durability(Some(DurabilityMode::Maximum)), 0.0);
    }

    #[test]
    fn test_fire_emits_event_and_wears() {
        let host = Host::rifle();
        let mut weapon = host.built();
        weapon.drain_events();
        let before = weapon.weapon_durability();

        assert_eq!(weapon.fire(), vec![BulletType::StandardFmj]);
        assert_eq!(weapon.view().ammo_count, 28);
        assert!((before - weapon.weapon_durability() - 0.5).abs() < 1e-4);
        assert_eq!(
            weapon.drain_events(),
            vec![WeaponEvent::Fired(vec![BulletType::StandardFmj])]
        );
    }

    #[test]
    fn test_dry_fire_keeps_revision() {
        let mut weapon = WeaponAssembly::authority(WeaponConfig::default());
        let revision = weapon.revision();

        assert!(weapon.fire().is_empty());
        assert_eq!(weapon.revision(), revision);
        assert!(weapon.drain_events().is_empty());
    }

    #[test]
    fn test_clear_removes_barrel() {
        let host = Host::rifle();
        let mut weapon = host.built();
        weapon.fire();

        assert_eq!(weapon.clear(), 11);
        assert!(!weapon.fire_controller().has_barrel());
        assert!(weapon.fire().is_empty());
        assert_eq!(weapon.durability(None), 0.0);

        // Clear повторно безопасен
        assert_eq!(weapon.clear(), 0);
    }

    #[test]
    fn test_rebuild_keeps_attached_magazine() {
        let host = Host::rifle();
        let mut weapon = host.built();
        weapon.fire();
        weapon.fire();

        weapon.build(&AttachmentTemplates::rifle_roots(), &host.ctx());
        // Магазин уже стоит: индексатор не подменяет его полным
        assert_eq!(weapon.view().ammo_count, 27);
    }

    #[test]
    fn test_magazine_without_type_uses_config_capacity() {
        let mut host = Host::rifle();
        host.config.magazine_capacity = 20;
        host.config.preload_bullet = BulletType::Subsonic;

        let generic = AttachmentTemplate::new("pmag_30", "Generic Mag", AttachmentCategory::Magazine, meshes::MAGAZINE)
            .with_kind(PartKind::Magazine { magazine_type: None });
        host.templates.add(generic);

        let mut weapon = host.built();
        assert_eq!(weapon.view().ammo_count, 20);
        assert_eq!(weapon.fire(), vec![BulletType::Subsonic]);
    }

    #[test]
    fn test_shotgun_barrel_fires_pellets() {
        let mut host = Host::rifle();
        let mut upper = host.templates.get(&"ar_upper".into()).unwrap().clone();
        upper.links[0] = ChildLinkTemplate::to(&["barrel_shotgun"]);
        host.templates.add(upper);

        let mut weapon = host.built();
        assert_eq!(weapon.fire_controller().pellets_per_shell(), 8);
        assert_eq!(weapon.fire().len(), 8);
    }

    #[test]
    fn test_stats_apply_part_modifiers() {
        let host = Host::rifle();
        let weapon = host.built();

        let stats = weapon.stats(&WeaponStats::rifle_base());
        // 40 - 2 (red dot) + 6 (stock) + 3 (grip)
        assert_eq!(stats.get(WeaponStat::Ergonomics), 47.0);
        // 120 * 0.95 (flash hider)
        assert!((stats.get(WeaponStat::VerticalRecoil) - 114.0).abs() < 1e-3);
    }

    #[test]
    fn test_staged_reload_through_assembly() {
        let host = Host::rifle();
        let mut weapon = host.built();
        weapon.drain_events();

        assert_eq!(weapon.begin_staged_reload(), Some(ReloadStage::RemoveMagazine));
        let removed = weapon.process_stage(ReloadStage::RemoveMagazine, None).unwrap();
        assert_eq!(removed.ejected.map(|m| m.ammo_count()), Some(30));
        assert!(!weapon.view().magazine_attached);

        let fresh = Magazine::with_capacity(10).filled(BulletType::Tracer);
        let inserted = weapon.process_stage(ReloadStage::InsertMagazine, Some(fresh)).unwrap();
        assert_eq!(inserted.next, ReloadStage::RackHandle);

        weapon.process_stage(ReloadStage::RackHandle, None);
        let view = weapon.view();
        assert_eq!(view.ammo_count, 9);
        assert_eq!(view.reload_stage, ReloadStage::None);

        let events = weapon.drain_events();
        assert!(events.contains(&WeaponEvent::MagazineChanged { attached: false }));
        assert!(events.contains(&WeaponEvent::MagazineChanged { attached: true }));
        assert_eq!(events.last(), Some(&WeaponEvent::ReloadStageChanged(ReloadStage::None)));
    }

    #[test]
    fn test_proxy_forwards_instead_of_mutating() {
        let host = Host::rifle();
        let mut proxy = WeaponAssembly::proxy(WeaponConfig::default());

        assert!(proxy.build(&AttachmentTemplates::rifle_roots(), &host.ctx()).is_none());
        assert!(proxy.fire().is_empty());
        assert_eq!(proxy.modify_durability(-10.0), None);
        assert_eq!(proxy.submit(WeaponIntent::CancelReload, &host.ctx()), IntentOutcome::Pending);

        // Ничего не изменилось локально
        assert!(proxy.spawned().is_empty());
        assert_eq!(proxy.revision(), 0);
        assert!(proxy.graph_mut().is_none());
        assert!(proxy.build_connected(&[], &host.ctx()).is_none());

        let pending = proxy.drain_pending();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[1], WeaponIntent::Fire);
        assert!(!proxy.has_pending());
    }

    #[test]
    fn test_proxy_observes_authority_snapshot() {
        let host = Host::rifle();
        let mut authority = WeaponAssembly::authority(host.config.clone());
        let mut proxy = WeaponAssembly::proxy(host.config.clone());

        proxy.build(&AttachmentTemplates::rifle_roots(), &host.ctx());
        proxy.fire();
        proxy.fire();

        for intent in proxy.drain_pending() {
            authority.submit(intent, &host.ctx());
        }

        let snapshot = authority.snapshot();
        assert!(proxy.apply_snapshot(snapshot));
        assert_eq!(proxy.view(), snapshot);
        assert_eq!(proxy.view().ammo_count, 27);

        // Повтор / stale не применяется; authority snapshot'ы не принимает
        assert!(!proxy.apply_snapshot(snapshot));
        assert!(!authority.apply_snapshot(snapshot));
    }

    #[test]
    fn test_submit_outcomes_on_authority() {
        let host = Host::rifle();
        let mut weapon = WeaponAssembly::authority(host.config.clone());
        let ctx = host.ctx();

        let built = weapon.submit(
            WeaponIntent::Build {
                roots: AttachmentTemplates::rifle_roots(),
            },
            &ctx,
        );
        assert!(matches!(built, IntentOutcome::Built(ref b) if b.nodes.len() == 11));

        assert!(matches!(weapon.submit(WeaponIntent::Fire, &ctx), IntentOutcome::Fired(ref r) if r.len() == 1));
        assert_eq!(
            weapon.submit(WeaponIntent::ModifyDurability(500.0), &ctx),
            IntentOutcome::Durability(100.0)
        );
        assert_eq!(
            weapon.submit(WeaponIntent::BeginReload, &ctx),
            IntentOutcome::ReloadBegun(ReloadStage::RemoveMagazine)
        );
        assert_eq!(weapon.submit(WeaponIntent::CancelReload, &ctx), IntentOutcome::Cancelled);
        assert!(matches!(
            weapon.submit(WeaponIntent::ReloadMagazine(None), &ctx),
            IntentOutcome::MagazineSwapped(Some(_))
        ));
        assert_eq!(weapon.submit(WeaponIntent::Clear, &ctx), IntentOutcome::Cleared(11));
    }

    #[test]
    fn test_connected_build_through_assembly() {
        let host = Host::rifle();
        let mut weapon = WeaponAssembly::authority(host.config.clone());

        let graph = weapon.graph_mut().unwrap();
        let lower = graph.instantiate(&"ar_lower".into(), &host.templates).unwrap();

        let built = weapon.build_connected(&[lower], &host.ctx()).unwrap();
        assert_eq!(built.nodes.len(), 4);
        // Магазин есть, ствола нет
        assert!(weapon.view().magazine_attached);
        assert!(!weapon.fire_controller().has_barrel());
        assert!(weapon.fire().is_empty());
    }
}
