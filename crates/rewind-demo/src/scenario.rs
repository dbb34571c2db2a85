//! Scripted one-second match driving every part of the rewind stack.
//!
//! A server-authoritative victim runs along +X and is teleported halfway
//! through. A locally controlled shooter strafes along +Y and fires once; the
//! shot effect is realized a few ticks later from the flagged pose. The
//! server validates hits against rewound victim poses, and a remote proxy of
//! the victim is kept up to date with 20 Hz authoritative updates whose
//! snaps land in the proxy's own history as teleports.

use std::time::Duration;

use bevy_ecs::prelude::*;
use glam::Vec3;
use rewind_config::Config;
use rewind_history::{
    AuthoritativeUpdate, Kinematics, LatencyEstimator, MovementReplication, MovementSolver,
    NetRole, PendingFire, RemotePredictor, Rotator, ShotSynchronizer, SimClock, UpdateContext,
    UpdateOutcome, apply_pending_fire, record_position_history, rewind_location, rewind_point,
};
use tracing::{debug, info, warn};

const TICK_RATE: u32 = 60;
const TICKS: u32 = 60;
const VICTIM_SPEED: f32 = 300.0;
const SHOOTER_SPEED: f32 = 100.0;
const TELEPORT_TICK: u32 = 30;
const TELEPORT_DESTINATION: Vec3 = Vec3::new(2000.0, 500.0, 0.0);
const FIRE_TICK: u32 = 20;
/// Weapon wind-up between the fire input and the projectile spawn.
const SHOT_DELAY_TICKS: u32 = 3;
/// Hit validation every 6 ticks (10 Hz).
const VALIDATION_INTERVAL: u32 = 6;
/// Authoritative updates every 3 ticks (20 Hz).
const UPDATE_INTERVAL: u32 = 3;
/// Head offset from the body origin, used for rewound headshot checks.
const HEAD_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 64.0);

/// What happened during the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioReport {
    /// Server-side hit validations performed.
    pub hits_validated: usize,
    /// Sum of distances between live and rewound victim positions.
    pub total_rewind_distance: f32,
    /// Authoritative updates that snapped the remote proxy.
    pub remote_snaps: usize,
    /// Proxy history samples recorded with the teleport flag.
    pub proxy_teleported_samples: usize,
    /// Rewinds skipped because the entity's history was not authoritative.
    pub validations_deferred: usize,
    /// Spawn location of the delayed shot, if it was resolved.
    pub shot_position: Option<Vec3>,
    /// Spawn rotation of the delayed shot, if it was resolved.
    pub shot_rotation: Option<Rotator>,
    /// Unit aim direction of the delayed shot.
    pub shot_direction: Option<Vec3>,
}

impl ScenarioReport {
    /// Average rewind distance per validation.
    pub fn mean_rewind_distance(&self) -> f32 {
        if self.hits_validated == 0 {
            return 0.0;
        }
        self.total_rewind_distance / self.hits_validated as f32
    }
}

/// Deterministic round trips jittering between 80 and 100 ms.
fn scripted_rtt(tick: u32) -> Duration {
    Duration::from_millis(80 + u64::from((tick * 7) % 21))
}

/// Runs the scripted match with `config` and reports what the stack did.
pub fn run(config: &Config) -> ScenarioReport {
    let tick_seconds = 1.0 / f64::from(TICK_RATE);
    let mut report = ScenarioReport::default();

    let mut world = World::new();
    world.insert_resource(SimClock::default());
    let victim = world
        .spawn((
            Kinematics {
                velocity: Vec3::new(VICTIM_SPEED, 0.0, 0.0),
                ..Default::default()
            },
            MovementReplication::new(NetRole::ServerAuthoritative, &config.history),
        ))
        .id();
    let shooter = world
        .spawn((
            Kinematics {
                velocity: Vec3::new(0.0, SHOOTER_SPEED, 0.0),
                ..Default::default()
            },
            MovementReplication::new(NetRole::LocallyControlled, &config.history),
        ))
        .id();
    let proxy = world
        .spawn((
            Kinematics::default(),
            MovementReplication::new(NetRole::RemotelySimulated, &config.history),
        ))
        .id();

    let mut schedule = Schedule::default();
    schedule.add_systems((record_position_history, apply_pending_fire).chain());

    let sync = ShotSynchronizer::from_config(&config.history);
    let mut latency = LatencyEstimator::default();
    let mut predictor = RemotePredictor::from_config(&config.prediction);
    let mut proxy_spawned = false;

    for tick in 0..TICKS {
        let now = f64::from(tick) * tick_seconds;
        world.resource_mut::<SimClock>().now = now;
        latency.record_sample(scripted_rtt(tick));
        let prediction_time = latency.prediction_time(&config.prediction);

        // Movement solver pass.
        for (entity, yaw_rate) in [(victim, 0.0), (shooter, 90.0)] {
            if let Some(mut kinematics) = world.get_mut::<Kinematics>(entity) {
                let step = kinematics.velocity * tick_seconds as f32;
                kinematics.position += step;
                kinematics.rotation.yaw += yaw_rate * tick_seconds as f32;
                kinematics.rotation = kinematics.rotation.normalized();
                kinematics.synch_time = now;
            }
        }
        // The proxy only extrapolates between authoritative updates.
        if let Some(mut kinematics) = world.get_mut::<Kinematics>(proxy) {
            kinematics.simulate_movement(tick_seconds);
        }
        if tick == TELEPORT_TICK
            && let Some(mut kinematics) = world.get_mut::<Kinematics>(victim)
        {
            kinematics.position = TELEPORT_DESTINATION;
            kinematics.just_teleported = true;
            info!(tick, destination = ?TELEPORT_DESTINATION, "victim teleported");
        }
        if tick == FIRE_TICK {
            world.entity_mut(shooter).insert(PendingFire);
            debug!(tick, "shooter pressed fire");
        }

        // Validation must reach back at least one prediction window.
        if let Some(mut replication) = world.get_mut::<MovementReplication>(victim) {
            replication
                .history
                .raise_max_age(prediction_time + tick_seconds);
        }

        schedule.run(&mut world);

        if tick == FIRE_TICK + SHOT_DELAY_TICKS {
            resolve_delayed_shot(&world, shooter, &sync, now, &mut report);
        }
        if tick % VALIDATION_INTERVAL == 0 {
            validate_hit(&world, victim, now, prediction_time, &mut report);
            validate_hit(&world, proxy, now, prediction_time, &mut report);
        }
        if let Some(replication) = world.get::<MovementReplication>(proxy)
            && replication.history.latest().is_some_and(|s| s.teleported)
        {
            report.proxy_teleported_samples += 1;
        }

        predictor.update(tick_seconds as f32);
        if tick % UPDATE_INTERVAL == 0
            && let Some(kinematics) = world.get::<Kinematics>(victim).copied()
            && let Some(mut proxy_kinematics) = world.get_mut::<Kinematics>(proxy)
        {
            let update = AuthoritativeUpdate {
                position: kinematics.position,
                rotation: kinematics.rotation,
                velocity: kinematics.velocity,
            };
            let ctx = UpdateContext {
                role: NetRole::RemotelySimulated,
                prediction_time,
                is_view_target: false,
                spawned_this_tick: !proxy_spawned,
            };
            proxy_spawned = true;
            let outcome =
                predictor.apply_authoritative_update(&mut *proxy_kinematics, &update, &ctx);
            if matches!(outcome, UpdateOutcome::Snapped { .. }) {
                report.remote_snaps += 1;
            }
            debug!(
                tick,
                ?outcome,
                drawn = ?predictor.render_position(proxy_kinematics.position),
                "remote proxy updated"
            );
        }
    }

    info!(
        rtt_ms = latency.ewma_rtt().as_secs_f64() * 1000.0,
        median_ms = latency.median_rtt().as_secs_f64() * 1000.0,
        samples = latency.sample_count(),
        "latency estimate"
    );
    report
}

fn resolve_delayed_shot(
    world: &World,
    shooter: Entity,
    sync: &ShotSynchronizer,
    now: f64,
    report: &mut ScenarioReport,
) {
    let (Some(kinematics), Some(replication)) = (
        world.get::<Kinematics>(shooter),
        world.get::<MovementReplication>(shooter),
    ) else {
        return;
    };
    if !sync.delayed_shot_found(&replication.history, now) {
        warn!(now, "no flagged shot within the synch window, using live pose");
    }
    let position = sync.delayed_shot_position(&replication.history, now, kinematics.position);
    let rotation = sync.delayed_shot_rotation(&replication.history, now, kinematics.rotation);
    info!(
        ?position,
        direction = ?rotation.forward(),
        live = ?kinematics.position,
        "shot spawned from fire pose"
    );
    report.shot_position = Some(position);
    report.shot_rotation = Some(rotation);
    report.shot_direction = Some(rotation.forward());
}

fn validate_hit(
    world: &World,
    entity: Entity,
    now: f64,
    prediction_time: f64,
    report: &mut ScenarioReport,
) {
    let (Some(kinematics), Some(replication)) = (
        world.get::<Kinematics>(entity),
        world.get::<MovementReplication>(entity),
    ) else {
        return;
    };
    if !replication.role().history_is_ground_truth() {
        debug!(?entity, role = %replication.role(), "hit validation deferred to the authority");
        report.validations_deferred += 1;
        return;
    }
    let live = kinematics.position;
    let rewound = rewind_location(&replication.history, now, live, prediction_time);
    let head = rewind_point(
        live + HEAD_OFFSET,
        &replication.history,
        now,
        live,
        prediction_time,
    );
    let distance = live.distance(rewound);
    debug!(now, ?live, ?rewound, ?head, distance, "validated hit");

    report.hits_validated += 1;
    report.total_rewind_distance += distance;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_validates_hits_at_10hz() {
        let report = run(&Config::default());
        assert_eq!(report.hits_validated, 10);
        assert!(report.mean_rewind_distance() > 0.0);
    }

    #[test]
    fn test_shot_spawns_from_fire_tick_pose() {
        let report = run(&Config::default());
        let shot = report.shot_position.unwrap();
        let fire_y = SHOOTER_SPEED * (FIRE_TICK + 1) as f32 / TICK_RATE as f32;
        assert!((shot.y - fire_y).abs() < 1e-3, "shot at {shot:?}");

        let fire_yaw = 90.0 * (FIRE_TICK + 1) as f32 / TICK_RATE as f32;
        let rotation = report.shot_rotation.unwrap();
        assert!((rotation.yaw - fire_yaw).abs() < 1e-3);
        assert!(report.shot_direction.unwrap().is_normalized());
    }

    #[test]
    fn test_remote_proxy_snaps_on_every_moving_update() {
        let report = run(&Config::default());
        assert_eq!(report.remote_snaps, (TICKS / UPDATE_INTERVAL) as usize);
    }

    #[test]
    fn test_every_snap_lands_in_proxy_history_as_teleport() {
        let report = run(&Config::default());
        assert_eq!(report.proxy_teleported_samples, report.remote_snaps);
    }

    #[test]
    fn test_proxy_is_never_validated_locally() {
        let report = run(&Config::default());
        assert_eq!(report.validations_deferred, report.hits_validated);
    }

    #[test]
    fn test_disabled_prediction_never_rewinds() {
        let mut config = Config::default();
        config.prediction.max_prediction_ping_ms = 0.0;
        let report = run(&config);
        assert_eq!(report.total_rewind_distance, 0.0);
    }

    #[test]
    fn test_mean_rewind_distance_without_hits() {
        assert_eq!(ScenarioReport::default().mean_rewind_distance(), 0.0);
    }
}
