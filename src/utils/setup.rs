//! Setup logic for the doll game: the field, the player rig with its tracked
//! points, the doll, the gadgets and the UI.
use bevy::prelude::*;
use rand::Rng;

use crate::log;
use crate::utils::objects::*;
use shared::constants::gadget_constants::BALLOON_RADIUS;
use shared::gadgets::{RecoilSlider, RideZone};
use shared::{AudioClips, SoundCue, TrackedPoint};

// Layout of the field (meters)
const FIELD_LENGTH: f32 = 40.0;
const FIELD_WIDTH: f32 = 20.0;
const DOLL_Z: f32 = -18.0;
const START_LINE_Z: f32 = 15.0;
const HEAD_HEIGHT: f32 = 1.7;
const BALLOON_COUNT: usize = 8;

/// Ground, lights and the start/finish lines.
pub fn setup_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Sand field
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FIELD_WIDTH, FIELD_LENGTH))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.76, 0.64, 0.45),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::default(),
    ));

    // Finish line in front of the doll, start line behind the players
    for (z, color) in [
        (DOLL_Z + 4.0, Color::srgb(0.9, 0.1, 0.1)),
        (START_LINE_Z - 1.0, Color::WHITE),
    ] {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(FIELD_WIDTH, 0.01, 0.2))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
            Transform::from_xyz(0.0, 0.005, z),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: 200.0,
        affects_lightmapped_meshes: true,
    });

    log!("🌍 Environment Setup Complete");
}

/// Player rig with the head camera and both hands, each one a tracked point.
/// The right hand carries the blaster.
pub fn setup_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    light_cycle: Res<LightCycle>,
) {
    let gadgets = &light_cycle.0.config().gadgets;
    let hand_mesh = meshes.add(Cuboid::new(0.08, 0.08, 0.15));
    let hand_material = materials.add(Color::srgb(0.9, 0.75, 0.6));
    let blaster_material = materials.add(Color::srgb(0.15, 0.15, 0.2));

    let rig = commands
        .spawn((PlayerRig, Transform::from_xyz(0.0, 0.0, START_LINE_Z), Visibility::default()))
        .id();

    let head = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(0.0, HEAD_HEIGHT, 0.0).looking_at(Vec3::new(0.0, HEAD_HEIGHT, DOLL_Z), Vec3::Y),
            TrackedPointMarker(TrackedPoint::Head),
            ChildOf(rig),
        ))
        .id();

    for (point, x) in [(TrackedPoint::LeftHand, -0.3), (TrackedPoint::RightHand, 0.3)] {
        commands.spawn((
            Mesh3d(hand_mesh.clone()),
            MeshMaterial3d(hand_material.clone()),
            Transform::from_xyz(x, -0.45, -0.4),
            TrackedPointMarker(point),
            ChildOf(head),
        ));
    }

    // Blaster: body under the head, slider on top, muzzle in front
    let body = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(0.05, 0.1, 0.25))),
            MeshMaterial3d(blaster_material.clone()),
            Transform::from_xyz(0.3, -0.35, -0.55),
            ChildOf(head),
        ))
        .id();
    let slider_rest = Vec3::new(0.0, 0.07, 0.0);
    let slider = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(0.05, 0.04, 0.22))),
            MeshMaterial3d(blaster_material),
            Transform::from_translation(slider_rest),
            ChildOf(body),
        ))
        .id();
    let muzzle = commands
        .spawn((Transform::from_xyz(0.0, 0.0, -0.15), Visibility::default(), ChildOf(body)))
        .id();

    commands.entity(body).insert(Blaster {
        recoil: RecoilSlider::new(slider_rest, gadgets.recoil_distance, gadgets.recoil_speed),
        slider,
        muzzle,
    });
}

/// Doll on its stand at the far end of the field, initially facing the players.
pub fn setup_doll(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    light_cycle: Res<LightCycle>,
) {
    let dress = materials.add(Color::srgb(1.0, 0.55, 0.0));
    let skin = materials.add(Color::srgb(1.0, 0.85, 0.7));
    let hair = materials.add(Color::srgb(0.1, 0.05, 0.02));
    let eyes = materials.add(StandardMaterial {
        base_color: Color::BLACK,
        emissive: LinearRgba::rgb(4.0, 0.0, 0.0),
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(0.6, 1.8))),
        MeshMaterial3d(dress),
        Transform::from_xyz(0.0, 1.5, DOLL_Z),
    ));

    let head = commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(0.5))),
            MeshMaterial3d(skin),
            Transform::from_xyz(0.0, 3.4, DOLL_Z).with_rotation(light_cycle.0.doll_rotation()),
            DollHead,
        ))
        .id();

    // Hair on the back, eyes on the front (+Z faces the players)
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(0.52))),
        MeshMaterial3d(hair),
        Transform::from_xyz(0.0, 0.05, -0.08).with_scale(Vec3::new(1.0, 1.0, 0.9)),
        ChildOf(head),
    ));
    for x in [-0.17, 0.17] {
        commands.spawn((
            Mesh3d(meshes.add(Sphere::new(0.07))),
            MeshMaterial3d(eyes.clone()),
            Transform::from_xyz(x, 0.08, 0.45),
            ChildOf(head),
        ));
    }
}

/// Rides along the side of the field, the dead zone pit, the respawn point
/// and a cloud of balloons to shoot.
pub fn setup_gadgets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut random_gen: ResMut<RandomGen>,
    light_cycle: Res<LightCycle>,
) {
    let firecracker_delay = light_cycle.0.config().gadgets.firecracker_delay;

    let cabin_size = Vec3::new(2.0, 2.5, 2.0);
    let cabin_mesh = meshes.add(Cuboid::from_size(cabin_size));

    // Plain cabin on the left, roller car with a firecracker on the right
    for (x, zone, color) in [
        (-8.0, RideZone::cabin(), Color::srgba(0.2, 0.4, 0.9, 0.5)),
        (8.0, RideZone::with_firecracker(firecracker_delay), Color::srgba(0.9, 0.2, 0.6, 0.5)),
    ] {
        let has_firecracker = zone.has_firecracker();
        let anchor = Vec3::new(x, cabin_size.y / 2.0, 8.0);
        let ride = commands
            .spawn((
                Mesh3d(cabin_mesh.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                })),
                Transform::from_translation(anchor),
                Ride {
                    zone,
                    half_extents: cabin_size / 2.0,
                },
                RideMotion {
                    anchor,
                    radius: 1.5,
                    duration: 6.0,
                    elapsed: None,
                },
            ))
            .id();

        if has_firecracker {
            commands.spawn((
                Mesh3d(meshes.add(Cylinder::new(0.05, 0.4))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 0.1, 0.1),
                    emissive: LinearRgba::rgb(6.0, 2.0, 0.0),
                    ..default()
                })),
                Transform::from_xyz(0.0, cabin_size.y / 2.0 + 0.2, 0.0),
                Visibility::Hidden,
                Firecracker { ride },
                ChildOf(ride),
            ));
        }
    }

    // Pit on the left edge of the field
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(3.0, 0.02, 3.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.05, 0.05, 0.05))),
        Transform::from_xyz(-6.0, 0.01, -2.0),
        DeadZone {
            half_extents: Vec3::new(1.5, 1.0, 1.5),
        },
    ));
    commands.spawn((Transform::from_xyz(0.0, 0.0, START_LINE_Z), RespawnPoint));

    let balloon_mesh = meshes.add(Sphere::new(BALLOON_RADIUS));
    let rng = &mut random_gen.random_gen;
    for _ in 0..BALLOON_COUNT {
        let position = Vec3::new(
            rng.random_range(-FIELD_WIDTH / 2.0..FIELD_WIDTH / 2.0),
            rng.random_range(2.0..5.0),
            rng.random_range(DOLL_Z + 6.0..START_LINE_Z - 4.0),
        );
        let color = Color::hsl(rng.random_range(0.0..360.0), 0.8, 0.55);
        commands.spawn((
            Mesh3d(balloon_mesh.clone()),
            MeshMaterial3d(materials.add(color)),
            Transform::from_translation(position),
            Balloon,
        ));
    }

    log!("🎈 {} balloons up", BALLOON_COUNT);
}

/// Timer, phase banner, the start panel and the (hidden) conclusion panel.
pub fn setup_ui(mut commands: Commands, light_cycle: Res<LightCycle>) {
    commands.spawn((
        Text::new(shared::controller::format_timer(light_cycle.0.remaining_time())),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(20.0),
            ..default()
        },
        TimerText,
        UIEntity,
    ));

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 36.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(20.0),
            ..default()
        },
        PhaseText,
        UIEntity,
    ));

    let start_visibility = if light_cycle.0.config().auto_start {
        Visibility::Hidden
    } else {
        Visibility::Visible
    };
    spawn_panel(
        &mut commands,
        "RED LIGHT, GREEN LIGHT\n\nFreeze while the doll is watching.\nPress ENTER to start",
        start_visibility,
        StartPanel,
    );

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            Visibility::Hidden,
            ConclusionPanel,
            UIEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                ConclusionText,
            ));
        });
}

/// Spawns a full screen panel with centered text.
fn spawn_panel(commands: &mut Commands, text: &str, visibility: Visibility, marker: impl Component) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
            visibility,
            marker,
            UIEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(text),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Loads the configured clip of every cue.
pub fn setup_sounds(mut commands: Commands, asset_server: Res<AssetServer>, light_cycle: Res<LightCycle>) {
    let AudioClips {
        green_light,
        red_light,
        rotation,
        elimination,
        gunshot,
        timer_end,
        timer_tick,
    } = light_cycle.0.config().audio.clone();

    let mut sounds = DollSounds::default();
    for (cue, path) in [
        (SoundCue::GreenLight, green_light),
        (SoundCue::RedLight, red_light),
        (SoundCue::Rotation, rotation),
        (SoundCue::Elimination, elimination),
        (SoundCue::Gunshot, gunshot),
        (SoundCue::TimerEnd, timer_end),
        (SoundCue::TimerTick, timer_tick),
    ] {
        match path {
            Some(path) => {
                sounds.clips.insert(cue, asset_server.load(path));
            }
            None => debug!("No clip configured for {:?}", cue),
        }
    }
    info!("{} of 7 sound cues have a clip", sounds.clips.len());
    commands.insert_resource(sounds);
}

/// Starts the first round right away unless the config asks for the start panel.
pub fn auto_start(mut light_cycle: ResMut<LightCycle>) {
    if light_cycle.0.config().auto_start {
        light_cycle.0.start_game();
        log!("🎮 Red light, green light! Don't move while the doll is watching");
    }
}
