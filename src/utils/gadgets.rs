//! Scene gadgets around the doll: rides, the blaster and its projectiles,
//! balloons and the dead zone.
use std::collections::HashSet;
use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::utils::objects::{
    inside_box, Balloon, Blaster, DeadZone, Firecracker, LightCycle, PlayerRig, Projectile,
    RespawnPoint, Ride, RideMotion,
};
use shared::constants::gadget_constants::{BALLOON_RADIUS, PROJECTILE_LIFETIME_SECS, PROJECTILE_RADIUS};
use shared::gadgets::{spheres_touch, RideAction};

/// Carries out what a ride asked for.
fn apply_ride_action(
    commands: &mut Commands,
    action: RideAction,
    ride: (Entity, &GlobalTransform),
    rig: (Entity, &GlobalTransform),
    motion: &mut RideMotion,
    firecrackers: &mut Query<(&Firecracker, &mut Visibility)>,
) {
    let (ride_entity, ride_transform) = ride;
    let (rig_entity, rig_transform) = rig;
    match action {
        RideAction::AttachPlayer => {
            let local = rig_transform.reparented_to(ride_transform);
            commands.entity(rig_entity).insert((local, ChildOf(ride_entity)));
        }
        RideAction::DetachPlayer => {
            commands
                .entity(rig_entity)
                .remove::<ChildOf>()
                .insert(rig_transform.compute_transform());
        }
        RideAction::StartAnimation => motion.elapsed = Some(0.0),
        RideAction::ActivateFirecracker | RideAction::DeactivateFirecracker => {
            let visible = action == RideAction::ActivateFirecracker;
            for (firecracker, mut visibility) in firecrackers.iter_mut() {
                if firecracker.ride == ride_entity {
                    *visibility = if visible { Visibility::Visible } else { Visibility::Hidden };
                }
            }
            debug!("Firecracker on {:?}: {}", ride_entity, visible);
        }
    }
}

/// Ticks the ride fuses, then attaches or detaches the player when they cross
/// a ride's trigger volume.
pub fn update_rides(
    mut commands: Commands,
    time: Res<Time>,
    rig_query: Query<(Entity, &GlobalTransform), With<PlayerRig>>,
    mut rides: Query<(Entity, &mut Ride, &mut RideMotion, &GlobalTransform)>,
    mut firecrackers: Query<(&Firecracker, &mut Visibility)>,
) {
    let Ok((rig_entity, rig_transform)) = rig_query.single() else {
        return;
    };
    let player_position = rig_transform.translation();

    for (ride_entity, mut ride, mut motion, ride_transform) in &mut rides {
        // Pending fuses run before new ones are armed this frame
        let mut actions = ride.zone.tick(time.delta_secs());
        // Rides keep swinging while someone is aboard
        if motion.elapsed.is_none() {
            actions.extend(ride.zone.start_animation());
        }

        let inside = inside_box(player_position, ride_transform.translation(), ride.half_extents);
        if inside && !ride.zone.is_player_inside() {
            info!("Player boarded ride {:?}", ride_entity);
            actions.extend(ride.zone.player_entered());
        } else if !inside && ride.zone.is_player_inside() {
            info!("Player left ride {:?}", ride_entity);
            actions.extend(ride.zone.player_exited());
        }

        for action in actions {
            apply_ride_action(
                &mut commands,
                action,
                (ride_entity, ride_transform),
                (rig_entity, rig_transform),
                &mut motion,
                &mut firecrackers,
            );
        }
    }
}

/// Swings a started ride around its anchor and back.
pub fn animate_rides(time: Res<Time>, mut rides: Query<(&mut RideMotion, &mut Transform)>) {
    for (mut motion, mut transform) in &mut rides {
        let Some(elapsed) = motion.elapsed else {
            continue;
        };
        let elapsed = elapsed + time.delta_secs();
        if elapsed >= motion.duration {
            motion.elapsed = None;
            transform.translation = motion.anchor;
            continue;
        }
        motion.elapsed = Some(elapsed);

        let angle = elapsed / motion.duration * TAU;
        transform.translation = motion.anchor
            + Vec3::new(motion.radius * angle.sin(), 0.0, motion.radius * (angle.cos() - 1.0));
    }
}

/// F fires every blaster: a projectile leaves the muzzle and the slider kicks back.
pub fn fire_blaster(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    light_cycle: Res<LightCycle>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut projectile_assets: Local<Option<(Handle<Mesh>, Handle<StandardMaterial>)>>,
    mut blasters: Query<&mut Blaster>,
    muzzles: Query<&GlobalTransform>,
) {
    if !keyboard.just_pressed(KeyCode::KeyF) {
        return;
    }

    let (mesh, material) = projectile_assets
        .get_or_insert_with(|| {
            (
                meshes.add(Sphere::new(PROJECTILE_RADIUS)),
                materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 0.9, 0.2),
                    emissive: LinearRgba::rgb(3.0, 2.5, 0.5),
                    ..default()
                }),
            )
        })
        .clone();
    let speed = light_cycle.0.config().gadgets.projectile_speed;

    for mut blaster in &mut blasters {
        let Ok(muzzle) = muzzles.get(blaster.muzzle) else {
            continue;
        };
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(muzzle.translation()),
            Projectile {
                velocity: muzzle.forward() * speed,
                lifetime: PROJECTILE_LIFETIME_SECS,
            },
        ));
        blaster.recoil.kick();
    }
}

/// Moves blaster sliders through their recoil.
pub fn animate_recoil(
    time: Res<Time>,
    mut blasters: Query<&mut Blaster>,
    mut sliders: Query<&mut Transform>,
) {
    for mut blaster in &mut blasters {
        if !blaster.recoil.is_recoiling() {
            continue;
        }
        let position = blaster.recoil.tick(time.delta_secs());
        if let Ok(mut slider) = sliders.get_mut(blaster.slider) {
            slider.translation = position;
        }
    }
}

/// Straight line flight, despawned when the lifetime runs out.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile, mut transform) in &mut projectiles {
        transform.translation += projectile.velocity * dt;
        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            commands.entity(entity).try_despawn();
        }
    }
}

/// A projectile touching a balloon pops it and is spent.
pub fn pop_balloons(
    mut commands: Commands,
    projectiles: Query<(Entity, &Transform), With<Projectile>>,
    balloons: Query<(Entity, &Transform), With<Balloon>>,
) {
    let mut popped = HashSet::new();
    for (projectile, projectile_transform) in &projectiles {
        let hit = balloons.iter().find(|(balloon, balloon_transform)| {
            !popped.contains(balloon)
                && spheres_touch(
                    projectile_transform.translation,
                    PROJECTILE_RADIUS,
                    balloon_transform.translation,
                    BALLOON_RADIUS,
                )
        });
        if let Some((balloon, _)) = hit {
            popped.insert(balloon);
            commands.entity(balloon).try_despawn();
            commands.entity(projectile).try_despawn();
            info!("Balloon popped");
        }
    }
}

/// Sends a player standing in a dead zone back to the respawn point.
pub fn dead_zone_teleport(
    mut rig_query: Query<(&GlobalTransform, &mut Transform, Option<&ChildOf>), With<PlayerRig>>,
    dead_zones: Query<(&DeadZone, &GlobalTransform)>,
    respawn: Query<&Transform, (With<RespawnPoint>, Without<PlayerRig>)>,
) {
    let Ok((rig_global, mut rig_transform, parent)) = rig_query.single_mut() else {
        return;
    };
    // Riders are carried by their ride
    if parent.is_some() {
        return;
    }
    let Ok(target) = respawn.single() else {
        return;
    };

    let position = rig_global.translation();
    let fell_in = dead_zones
        .iter()
        .any(|(zone, transform)| inside_box(position, transform.translation(), zone.half_extents));
    if fell_in {
        rig_transform.translation = target.translation;
        info!("Player fell into a dead zone, respawning");
    }
}
