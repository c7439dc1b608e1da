//! Core game logic and UI functions: feed the light cycle with poses and frame
//! time, then turn its events into sound, text and panels.
use bevy::prelude::*;

use crate::utils::objects::{
    ConclusionPanel, ConclusionText, DollHead, DollSounds, LightCycle, MainAudioChannel,
    PendingGameEvents, PhaseText, TimerText, TrackedPointMarker,
};
use shared::constants::game_constants::UI_REFERENCE_HEIGHT;
use shared::{GameEvent, LightPhase, Outcome, PoseSample, SoundCue, TrackedPose};

/// Samples every tracked point from its global transform.
pub fn sample_poses(points: &Query<(&TrackedPointMarker, &GlobalTransform)>) -> PoseSample {
    let mut sample = PoseSample::default();
    for (marker, transform) in points {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        sample.set(marker.0, Some(TrackedPose::new(translation, rotation)));
    }
    sample
}

/// Ticks the controller once per frame and queues what it produced.
pub fn drive_light_cycle(
    time: Res<Time>,
    mut light_cycle: ResMut<LightCycle>,
    mut pending: ResMut<PendingGameEvents>,
    points: Query<(&TrackedPointMarker, &GlobalTransform)>,
) {
    let poses = sample_poses(&points);
    let events = light_cycle.0.tick(time.delta_secs(), &poses);
    pending.0.extend(events);
}

/// Plays a cue. Interrupting cues replace whatever the main channel is playing.
fn play_cue(
    commands: &mut Commands,
    sounds: &DollSounds,
    main_channel: &Query<Entity, With<MainAudioChannel>>,
    cue: SoundCue,
    interrupt: bool,
) {
    let Some(clip) = sounds.clips.get(&cue) else {
        debug!("No clip for {:?}, skipping", cue);
        return;
    };

    if interrupt {
        for entity in main_channel {
            commands.entity(entity).try_despawn();
        }
        commands.spawn((
            AudioPlayer::new(clip.clone()),
            PlaybackSettings::DESPAWN,
            MainAudioChannel,
        ));
    } else {
        commands.spawn((AudioPlayer::new(clip.clone()), PlaybackSettings::DESPAWN));
    }
}

/// Drains the queued game events into audio and UI.
pub fn apply_game_events(
    mut commands: Commands,
    mut pending: ResMut<PendingGameEvents>,
    sounds: Res<DollSounds>,
    main_channel: Query<Entity, With<MainAudioChannel>>,
    mut timer_text: Query<&mut Text, (With<TimerText>, Without<PhaseText>, Without<ConclusionText>)>,
    mut phase_text: Query<(&mut Text, &mut TextColor), (With<PhaseText>, Without<TimerText>, Without<ConclusionText>)>,
    mut conclusion_text: Query<&mut Text, (With<ConclusionText>, Without<TimerText>, Without<PhaseText>)>,
    mut conclusion_panel: Query<&mut Visibility, With<ConclusionPanel>>,
) {
    let mut interrupting = None;
    for event in pending.0.drain(..) {
        match event {
            GameEvent::PlaySound(cue) => interrupting = Some(cue),
            GameEvent::PlaySoundOverlapped(cue) => {
                play_cue(&mut commands, &sounds, &main_channel, cue, false)
            }
            GameEvent::TimerDisplay(display) => {
                if let Ok(mut text) = timer_text.single_mut() {
                    text.0 = display;
                }
            }
            GameEvent::PhaseChanged(phase) => {
                if let Ok((mut text, mut color)) = phase_text.single_mut() {
                    let (label, tint) = match phase {
                        LightPhase::Green => ("GREEN LIGHT", Color::srgb(0.2, 0.9, 0.3)),
                        LightPhase::Red => ("RED LIGHT", Color::srgb(0.95, 0.15, 0.15)),
                    };
                    text.0 = label.to_string();
                    color.0 = tint;
                }
            }
            GameEvent::GameEnded(outcome) => {
                info!("Round over: {:?}", outcome);
                if let Ok(mut text) = conclusion_text.single_mut() {
                    text.0 = match outcome {
                        Outcome::Win => "YOU SURVIVED!\n\nPress ENTER to play again".to_string(),
                        Outcome::Lose => "ELIMINATED\n\nPress ENTER to play again".to_string(),
                    };
                }
            }
            GameEvent::ShowConclusionPanel => {
                if let Ok(mut visibility) = conclusion_panel.single_mut() {
                    *visibility = Visibility::Visible;
                }
            }
            GameEvent::HideConclusionPanel => {
                if let Ok(mut visibility) = conclusion_panel.single_mut() {
                    *visibility = Visibility::Hidden;
                }
            }
        }
    }

    // Each interrupting cue cuts the previous one, so only the last of the frame plays
    if let Some(cue) = interrupting {
        play_cue(&mut commands, &sounds, &main_channel, cue, true);
    }
}

/// Copies the animated doll rotation onto the doll head.
pub fn apply_doll_rotation(
    light_cycle: Res<LightCycle>,
    mut doll_head: Query<&mut Transform, With<DollHead>>,
) {
    let Ok(mut transform) = doll_head.single_mut() else {
        return;
    };
    transform.rotation = light_cycle.0.doll_rotation();
}

/// Updates UI scale based on window size to keep the UI responsive.
pub fn update_ui_scale(mut ui_scale: ResMut<UiScale>, window_query: Query<&Window>) {
    let Ok(window) = window_query.single() else {
        return;
    };

    // Calculate scale based on window height (reference: 1080p)
    let scale = window.height() / UI_REFERENCE_HEIGHT;
    ui_scale.0 = scale.clamp(0.5, 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;

    use shared::{LightCycleConfig, LightCycleController, TrackedPoint};

    fn test_config() -> LightCycleConfig {
        LightCycleConfig {
            min_green_time: 2.0,
            max_green_time: 2.0,
            min_red_time: 10.0,
            max_red_time: 10.0,
            game_duration: 60.0,
            grace_time: 0.5,
            rotation_rate: 3600.0,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(LightCycle(LightCycleController::new(test_config())))
            .init_resource::<PendingGameEvents>()
            .init_resource::<DollSounds>()
            .add_systems(
                Update,
                (drive_light_cycle, apply_game_events, apply_doll_rotation).chain(),
            );

        app.world_mut().spawn((TimerText, Text::new("")));
        app.world_mut()
            .spawn((PhaseText, Text::new(""), TextColor(Color::WHITE)));
        app.world_mut().spawn((ConclusionText, Text::new("")));
        app.world_mut().spawn((ConclusionPanel, Visibility::Hidden));
        app.world_mut().spawn((DollHead, Transform::default()));
        app
    }

    fn step(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    fn timer_display(app: &mut App) -> String {
        let mut query = app.world_mut().query_filtered::<&Text, With<TimerText>>();
        query.single(app.world()).map(|text| text.0.clone()).unwrap_or_default()
    }

    fn panel_visibility(app: &mut App) -> Visibility {
        let mut query = app
            .world_mut()
            .query_filtered::<&Visibility, With<ConclusionPanel>>();
        *query.single(app.world()).unwrap()
    }

    #[test]
    fn timer_text_follows_the_countdown() {
        let mut app = test_app();
        app.world_mut().resource_mut::<LightCycle>().0.start_game();

        step(&mut app, 1.0);
        assert_eq!(timer_display(&mut app), "00:59");

        let mut phase = app.world_mut().query_filtered::<&Text, With<PhaseText>>();
        assert_eq!(phase.single(app.world()).unwrap().0, "GREEN LIGHT");
        assert!(app.world().resource::<PendingGameEvents>().0.is_empty());
    }

    #[test]
    fn moving_a_hand_during_red_shows_the_conclusion_panel() {
        let mut app = test_app();
        let hand = app
            .world_mut()
            .spawn((
                TrackedPointMarker(TrackedPoint::RightHand),
                GlobalTransform::from_translation(Vec3::new(0.3, 1.2, 0.0)),
            ))
            .id();
        app.world_mut().resource_mut::<LightCycle>().0.start_game();

        // Through green into red, then past the grace window
        for _ in 0..5 {
            step(&mut app, 0.5);
        }
        assert_eq!(app.world().resource::<LightCycle>().0.phase(), LightPhase::Red);
        step(&mut app, 0.5);
        assert!(app.world().resource::<LightCycle>().0.is_active());

        app.world_mut()
            .entity_mut(hand)
            .insert(GlobalTransform::from_translation(Vec3::new(0.5, 1.2, 0.0)));
        step(&mut app, 0.1);

        let light_cycle = &app.world().resource::<LightCycle>().0;
        assert_eq!(light_cycle.outcome(), Some(Outcome::Lose));
        assert_eq!(panel_visibility(&mut app), Visibility::Hidden);

        // Elimination cue, gunshot after 3s, panel one second later
        for _ in 0..41 {
            step(&mut app, 0.1);
        }
        assert_eq!(panel_visibility(&mut app), Visibility::Visible);
        let mut text = app.world_mut().query_filtered::<&Text, With<ConclusionText>>();
        assert!(text.single(app.world()).unwrap().0.starts_with("ELIMINATED"));
    }

    #[test]
    fn only_the_last_interrupting_cue_of_a_frame_plays() {
        let mut app = test_app();
        let (red_light, rotation, tick) = {
            let mut clips = Assets::<AudioSource>::default();
            let mut clip = || {
                clips.add(AudioSource {
                    bytes: Vec::new().into(),
                })
            };
            (clip(), clip(), clip())
        };
        let mut sounds = DollSounds::default();
        sounds.clips.insert(SoundCue::RedLight, red_light);
        sounds.clips.insert(SoundCue::Rotation, rotation.clone());
        sounds.clips.insert(SoundCue::TimerTick, tick);
        app.insert_resource(sounds);

        app.world_mut().resource_mut::<PendingGameEvents>().0.extend([
            GameEvent::PlaySound(SoundCue::RedLight),
            GameEvent::PlaySoundOverlapped(SoundCue::TimerTick),
            GameEvent::PlaySound(SoundCue::Rotation),
        ]);
        app.world_mut()
            .run_system_once(apply_game_events)
            .unwrap();

        let mut main = app
            .world_mut()
            .query_filtered::<&AudioPlayer, With<MainAudioChannel>>();
        let playing: Vec<_> = main.iter(app.world()).map(|player| player.0.id()).collect();
        assert_eq!(playing, vec![rotation.id()]);

        let mut all = app.world_mut().query::<&AudioPlayer>();
        assert_eq!(all.iter(app.world()).count(), 2);
    }

    #[test]
    fn doll_head_turns_with_the_controller() {
        let mut app = test_app();
        app.world_mut().resource_mut::<LightCycle>().0.start_game();
        for _ in 0..5 {
            step(&mut app, 0.5);
        }

        let expected = app.world().resource::<LightCycle>().0.doll_rotation();
        let mut head = app.world_mut().query_filtered::<&Transform, With<DollHead>>();
        let rotation = head.single(app.world()).unwrap().rotation;
        assert!(rotation.angle_between(expected) < 1e-4);
    }
}
