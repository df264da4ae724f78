//! Headless демо GUNSMITH
//!
//! Собирает винтовку из шаблонов по умолчанию, стреляет, делает staged
//! reload и печатает snapshot (RON).

use gunsmith_simulation::*;

fn main() {
    let config = WeaponConfig::default();
    let templates = AttachmentTemplates::default();
    let sockets = MeshSockets::rifle();
    let obstacles = StaticObstacles::new();
    let ctx = BuildContext::new(&templates, &sockets, &obstacles, &config);

    init_logger();
    set_log_level(LogLevel::Info);

    let mut rifle = WeaponAssembly::authority(config.clone());
    println!("Fresh weapon dry fire: {:?}", rifle.fire());

    let Some(built) = rifle.build(&AttachmentTemplates::rifle_roots(), &ctx) else {
        eprintln!("Build refused");
        return;
    };
    println!("Assembled {} parts", built.nodes.len());

    for id in rifle.spawned() {
        if let Some(node) = rifle.graph().node(*id) {
            println!("  {:<16} {:?}", node.template.to_string(), node.category);
        }
    }

    let stats = rifle.stats(&WeaponStats::rifle_base());
    for (stat, value) in stats.iter() {
        println!("  {:?}: {:.2}", stat, value);
    }

    for shot in 1..=3 {
        println!("Shot {}: {:?}", shot, rifle.fire());
    }

    // Staged reload: снять → вставить новый → передёрнуть
    let mut stage = rifle.begin_staged_reload().unwrap_or_default();
    while stage != ReloadStage::None {
        let magazine = (stage == ReloadStage::InsertMagazine)
            .then(|| Magazine::new(MagazineType::MagpulMoe30).filled(BulletType::Tracer));
        let Some(outcome) = rifle.process_stage(stage, magazine) else {
            break;
        };
        if let Some(ejected) = outcome.ejected {
            println!("Ejected magazine with {} rounds", ejected.ammo_count());
        }
        stage = outcome.next;
    }

    match rifle.snapshot().to_ron() {
        Ok(text) => println!("Snapshot: {}", text),
        Err(e) => eprintln!("Snapshot serialization failed: {}", e),
    }
}
