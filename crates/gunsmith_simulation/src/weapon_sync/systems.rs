//! Weapon sync system implementations
//!
//! # Systems
//!
//! - `process_weapon_intents` - локальные intents → `WeaponAssembly::submit`
//! - `forward_proxy_intents` - pending proxy → `ForwardedIntent`
//! - `apply_forwarded_intents` - authority применяет forwarded intents
//! - `emit_weapon_events` - outbox → `WeaponGraphBuilt` / `WeaponFired` / `WeaponStateChanged`
//! - `publish_snapshots` - authority revision изменилась → `SnapshotPublished`
//! - `apply_snapshots` - proxies принимают snapshot как есть

use bevy::prelude::*;

use super::{
    ForwardedIntent, SnapshotPublished, Weapon, WeaponFired, WeaponGraphBuilt, WeaponIntentEvent, WeaponNetId,
    WeaponStateChanged,
};
use crate::attachment::{AttachmentTemplates, BuildContext, MeshSockets, StaticObstacles};
use crate::config::WeaponConfig;
use crate::logger::{log, log_error, log_warning};
use crate::weapon::{IntentOutcome, WeaponEvent};

fn build_context<'a>(
    templates: &'a AttachmentTemplates,
    sockets: &'a MeshSockets,
    obstacles: &'a StaticObstacles,
    config: &'a WeaponConfig,
) -> BuildContext<'a> {
    BuildContext::new(templates, sockets, obstacles, config)
}

// ============================================================================
// Intents
// ============================================================================

/// Process local weapon intents
pub fn process_weapon_intents(
    mut events: EventReader<WeaponIntentEvent>,
    mut weapons: Query<&mut Weapon>,
    templates: Res<AttachmentTemplates>,
    sockets: Res<MeshSockets>,
    obstacles: Res<StaticObstacles>,
    config: Res<WeaponConfig>,
) {
    let ctx = build_context(&templates, &sockets, &obstacles, &config);

    for event in events.read() {
        let Ok(mut weapon) = weapons.get_mut(event.entity) else {
            log_error(&format!("Entity {:?} missing Weapon", event.entity));
            continue;
        };

        let outcome = weapon.assembly.submit(event.intent.clone(), &ctx);
        if outcome != IntentOutcome::Pending {
            log(&format!("Weapon {:?}: {:?}", event.entity, outcome));
        }
    }
}

/// Proxy intents → транспорт
pub fn forward_proxy_intents(
    mut weapons: Query<(Entity, &mut Weapon, Option<&WeaponNetId>)>,
    mut forwarded: EventWriter<ForwardedIntent>,
) {
    for (entity, mut weapon, net_id) in weapons.iter_mut() {
        if !weapon.assembly.has_pending() {
            continue;
        }

        let pending = weapon.assembly.drain_pending();
        let Some(net_id) = net_id else {
            log_warning(&format!(
                "Proxy {:?} has no WeaponNetId, dropping {} intents",
                entity,
                pending.len()
            ));
            continue;
        };

        for intent in pending {
            forwarded.write(ForwardedIntent {
                net_id: *net_id,
                intent,
            });
        }
    }
}

/// Authority применяет intents, пришедшие от proxies
pub fn apply_forwarded_intents(
    mut events: EventReader<ForwardedIntent>,
    mut weapons: Query<(&mut Weapon, &WeaponNetId)>,
    templates: Res<AttachmentTemplates>,
    sockets: Res<MeshSockets>,
    obstacles: Res<StaticObstacles>,
    config: Res<WeaponConfig>,
) {
    let ctx = build_context(&templates, &sockets, &obstacles, &config);

    for event in events.read() {
        let authority = weapons
            .iter_mut()
            .find(|(weapon, net_id)| **net_id == event.net_id && weapon.assembly.is_authority());

        let Some((mut weapon, _)) = authority else {
            log_warning(&format!("No authority for {:?}, intent {:?} dropped", event.net_id, event.intent));
            continue;
        };

        let outcome = weapon.assembly.submit(event.intent.clone(), &ctx);
        log(&format!("Authority {:?} applied forwarded intent: {:?}", event.net_id, outcome));
    }
}

// ============================================================================
// Outbox
// ============================================================================

/// Outbox `WeaponAssembly` → Bevy events
pub fn emit_weapon_events(
    mut weapons: Query<(Entity, &mut Weapon)>,
    mut built: EventWriter<WeaponGraphBuilt>,
    mut fired: EventWriter<WeaponFired>,
    mut changed: EventWriter<WeaponStateChanged>,
) {
    for (entity, mut weapon) in weapons.iter_mut() {
        for change in weapon.assembly.drain_events() {
            match &change {
                WeaponEvent::GraphBuilt(nodes) => {
                    built.write(WeaponGraphBuilt {
                        entity,
                        nodes: nodes.clone(),
                    });
                }
                WeaponEvent::Fired(rounds) => {
                    fired.write(WeaponFired {
                        entity,
                        rounds: rounds.clone(),
                    });
                }
                _ => {}
            }
            changed.write(WeaponStateChanged { entity, change });
        }
    }
}

// ============================================================================
// Replication
// ============================================================================

/// Authority: опубликовать snapshot, если revision изменилась
pub fn publish_snapshots(
    mut weapons: Query<(&mut Weapon, &WeaponNetId)>,
    mut published: EventWriter<SnapshotPublished>,
) {
    for (mut weapon, net_id) in weapons.iter_mut() {
        if !weapon.needs_publish() {
            continue;
        }

        let snapshot = weapon.assembly.snapshot();
        weapon.published_revision = snapshot.revision;
        published.write(SnapshotPublished {
            net_id: *net_id,
            snapshot,
        });
    }
}

/// Proxies: применить snapshot своей authority
pub fn apply_snapshots(mut events: EventReader<SnapshotPublished>, mut weapons: Query<(&mut Weapon, &WeaponNetId)>) {
    for event in events.read() {
        for (mut weapon, net_id) in weapons.iter_mut() {
            if *net_id != event.net_id || weapon.assembly.is_authority() {
                continue;
            }
            weapon.assembly.apply_snapshot(event.snapshot);
        }
    }
}
