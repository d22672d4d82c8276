use super::*;
use crate::melody::{parse_melody_text, ChordMelody, ChordTrack};
use crate::transport::{TickSegment, Transport};

const SPACE: u8 = 32;

fn track(label: &str, text: &str) -> ChordTrack {
    let decoded = parse_melody_text(text);
    ChordTrack {
        label: label.to_string(),
        events: decoded.events,
        total_wait_ms: decoded.total_wait_ms,
    }
}

/// Two chords: C plays 60, 62, 64; G plays 67, 71
fn loaded_player(transport: Transport) -> LeadNotePlayer {
    let melody = ChordMelody::from_tracks(vec![
        track("C", "60 500 250 100\n62 500 250 90\n64 500 250 80\n"),
        track("G", "67 500 250 70\n71 500 250 60\n"),
    ]);
    let mut player = LeadNotePlayer::new(transport);
    player.load(melody);
    player.set_active_chord(Some(0));
    player
}

fn down(source: InputSource, key: u8) -> InputEvent {
    InputEvent::KeyDown { source, key }
}

fn up(source: InputSource, key: u8) -> InputEvent {
    InputEvent::KeyUp { source, key }
}

fn attacks(commands: &[SynthCommand]) -> Vec<u8> {
    commands
        .iter()
        .filter_map(|c| match c {
            SynthCommand::Attack { pitch, .. } => Some(*pitch),
            _ => None,
        })
        .collect()
}

#[test]
fn test_key_down_attacks_and_key_up_releases() {
    let mut player = loaded_player(Transport::default());

    let commands = player.handle(down(InputSource::Keyboard, SPACE), 10);
    assert_eq!(
        commands,
        vec![SynthCommand::Attack {
            pitch: 60,
            velocity: 100,
            tick: 10
        }]
    );
    assert_eq!(player.state(), PlayerState::Sounding);

    let commands = player.handle(up(InputSource::Keyboard, SPACE), 50);
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        SynthCommand::Release { pitch, tick, sounded } => {
            assert_eq!(*pitch, 60);
            assert_eq!(*tick, 50);
            assert_eq!(sounded.attack_tick, 10);
            assert_eq!(sounded.duration_ticks, 40);
        }
        other => panic!("expected release, got {:?}", other),
    }
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn test_cursor_advances_and_wraps() {
    let mut player = loaded_player(Transport::default());
    let mut pitches = Vec::new();

    for i in 0..5 {
        pitches.extend(attacks(&player.handle(down(InputSource::Button, 0), i * 10)));
        player.handle(up(InputSource::Button, 0), i * 10 + 5);
    }
    assert_eq!(pitches, vec![60, 62, 64, 60, 62]);
}

#[test]
fn test_chord_change_resets_cursor() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Button, 0), 0);
    player.handle(up(InputSource::Button, 0), 1);
    assert_eq!(player.cursor(), 1);

    player.set_active_chord(Some(1));
    assert_eq!(player.cursor(), 0);
    let commands = player.handle(down(InputSource::Button, 0), 2);
    assert_eq!(attacks(&commands), vec![67]);

    // Re-selecting the same chord keeps the cursor
    player.set_active_chord(Some(1));
    assert_eq!(player.cursor(), 1);
}

#[test]
fn test_overlapping_note_on_retriggers() {
    let mut player = loaded_player(Transport::default());

    player.handle(down(InputSource::Keyboard, SPACE), 0);
    let commands = player.handle(down(InputSource::Keyboard, b'1'), 20);

    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], SynthCommand::Release { pitch: 60, .. }));
    assert!(matches!(commands[1], SynthCommand::Attack { pitch: 62, .. }));
    assert_eq!(player.sounding_pitch(), Some(62));
}

#[test]
fn test_never_two_attacks_without_release() {
    let mut player = loaded_player(Transport::default());
    let mut log = Vec::new();

    let events = [
        down(InputSource::Keyboard, SPACE),
        down(InputSource::Midi, 60),
        down(InputSource::Button, 0),
        up(InputSource::Midi, 60),
        down(InputSource::Keyboard, b'2'),
        up(InputSource::Keyboard, SPACE),
        up(InputSource::Button, 0),
        up(InputSource::Keyboard, b'2'),
    ];
    for (tick, event) in events.into_iter().enumerate() {
        log.extend(player.handle(event, tick as u64));
    }

    let mut sounding = false;
    for command in &log {
        match command {
            SynthCommand::Attack { .. } => {
                assert!(!sounding, "attack while a note was sounding");
                sounding = true;
            }
            SynthCommand::Release { .. } => {
                assert!(sounding, "release with nothing sounding");
                sounding = false;
            }
            SynthCommand::Modulate { .. } => {}
        }
    }
    assert!(!sounding);
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn test_release_waits_for_last_held_input() {
    let mut player = loaded_player(Transport::default());
    let inputs = [
        (InputSource::Keyboard, SPACE),
        (InputSource::Keyboard, b'1'),
        (InputSource::Midi, 64),
        (InputSource::Button, 0),
    ];

    for (source, key) in inputs {
        player.handle(down(source, key), 0);
    }
    for (source, key) in &inputs[..inputs.len() - 1] {
        let commands = player.handle(up(*source, *key), 1);
        assert!(commands.is_empty());
        assert_eq!(player.state(), PlayerState::Sounding);
    }

    let (source, key) = inputs[inputs.len() - 1];
    let commands = player.handle(up(source, key), 2);
    assert!(matches!(commands[0], SynthCommand::Release { .. }));
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn test_auto_repeat_is_ignored() {
    let mut player = loaded_player(Transport::default());

    player.handle(down(InputSource::Keyboard, SPACE), 0);
    let repeat = player.handle(down(InputSource::Keyboard, SPACE), 1);
    assert!(repeat.is_empty());
    assert_eq!(player.held_count(InputSource::Keyboard), 1);

    let commands = player.handle(up(InputSource::Keyboard, SPACE), 2);
    assert_eq!(commands.len(), 1);
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn test_stray_key_up_is_ignored() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Keyboard, SPACE), 0);

    let commands = player.handle(up(InputSource::Midi, 60), 1);
    assert!(commands.is_empty());
    assert_eq!(player.state(), PlayerState::Sounding);
}

#[test]
fn test_all_notes_off_forces_idle() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Midi, 60), 0);
    player.handle(down(InputSource::Midi, 62), 0);
    player.handle(down(InputSource::Keyboard, SPACE), 0);

    let commands = player.handle(InputEvent::AllNotesOff, 5);
    assert_eq!(commands.len(), 1);
    assert_eq!(player.state(), PlayerState::Idle);
    for source in InputSource::ALL {
        assert_eq!(player.held_count(source), 0);
    }

    // Late note-offs after the reset do nothing
    assert!(player.handle(up(InputSource::Midi, 60), 6).is_empty());
}

#[test]
fn test_device_lost_forces_idle() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Midi, 60), 0);

    let commands = player.handle(InputEvent::DeviceLost, 3);
    assert!(matches!(commands[0], SynthCommand::Release { pitch: 60, .. }));
    assert_eq!(player.held_count(InputSource::Midi), 0);
}

#[test]
fn test_all_notes_off_when_idle_is_silent() {
    let mut player = loaded_player(Transport::default());
    assert!(player.handle(InputEvent::AllNotesOff, 0).is_empty());
}

#[test]
fn test_no_active_chord_is_noop() {
    let mut player = LeadNotePlayer::new(Transport::default());
    assert!(player.handle(down(InputSource::Keyboard, SPACE), 0).is_empty());
    assert_eq!(player.state(), PlayerState::Idle);

    let mut player = loaded_player(Transport::default());
    player.set_active_chord(None);
    assert!(player.handle(down(InputSource::Keyboard, SPACE), 0).is_empty());
}

#[test]
fn test_empty_chord_is_noop() {
    let melody = ChordMelody::from_tracks(vec![track("C", "bad line\n")]);
    let mut player = LeadNotePlayer::new(Transport::default());
    player.load(melody);
    player.set_active_chord(Some(0));

    assert!(player.handle(down(InputSource::Button, 0), 0).is_empty());
    assert_eq!(player.state(), PlayerState::Idle);
}

#[test]
fn test_midi_velocity_applies_to_midi_attacks() {
    let mut player = loaded_player(Transport::default());

    for event in InputEvent::from_midi(&[0x90, 60, 33]) {
        let commands = player.handle(event, 0);
        if let Some(SynthCommand::Attack { velocity, .. }) = commands.last() {
            assert_eq!(*velocity, 33);
        }
    }
    player.handle(up(InputSource::Midi, 60), 1);

    // Keyboard attacks keep the decoded velocity (second note: 90)
    let commands = player.handle(down(InputSource::Keyboard, SPACE), 2);
    assert!(matches!(commands[0], SynthCommand::Attack { velocity: 90, .. }));
}

#[test]
fn test_aftertouch_modulates_sounding_note() {
    let mut player = loaded_player(Transport::default());
    assert!(player.handle(InputEvent::Aftertouch { value: 40 }, 0).is_empty());

    player.handle(down(InputSource::Midi, 60), 0);
    let commands = player.handle(InputEvent::Aftertouch { value: 40 }, 1);
    assert_eq!(
        commands,
        vec![SynthCommand::Modulate {
            pitch: 60,
            pressure: 40
        }]
    );
}

#[test]
fn test_stop_releases_and_clears() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Keyboard, SPACE), 0);
    player.handle(down(InputSource::Button, 0), 0);

    let commands = player.stop(9);
    assert_eq!(commands.len(), 1);
    assert_eq!(player.state(), PlayerState::Idle);
    assert_eq!(player.held_count(InputSource::Keyboard), 0);
    assert_eq!(player.held_count(InputSource::Button), 0);
    assert!(player.stop(10).is_empty());
}

#[test]
fn test_release_across_loop_boundary_is_split() {
    // 5 ticks per measure, two chords: a 10-tick loop
    let transport = Transport::new(120.0, 5, 1);
    let mut player = loaded_player(transport);

    player.handle(down(InputSource::Keyboard, SPACE), 8);
    let commands = player.handle(up(InputSource::Keyboard, SPACE), 3);

    match &commands[0] {
        SynthCommand::Release { sounded, .. } => {
            assert_eq!(sounded.duration_ticks, 5);
            assert_eq!(
                sounded.segments,
                vec![TickSegment { start: 8, end: 10 }, TickSegment { start: 0, end: 3 }]
            );
        }
        other => panic!("expected release, got {:?}", other),
    }
}

#[test]
fn test_load_keeps_sounding_note_releasable() {
    let mut player = loaded_player(Transport::default());
    player.handle(down(InputSource::Keyboard, SPACE), 0);

    player.load(ChordMelody::from_tracks(vec![track("F", "65 500 250 100\n")]));
    assert_eq!(player.active_chord(), None);
    assert_eq!(player.state(), PlayerState::Sounding);

    let commands = player.handle(up(InputSource::Keyboard, SPACE), 4);
    assert!(matches!(commands[0], SynthCommand::Release { pitch: 60, .. }));
}

#[test]
fn test_release_after_reload_uses_attack_loop() {
    // Attacked in a 10-tick loop, released after a one-chord (5-tick) melody loads
    let transport = Transport::new(120.0, 5, 1);
    let mut player = loaded_player(transport);
    player.handle(down(InputSource::Keyboard, SPACE), 8);

    player.load(ChordMelody::from_tracks(vec![track("F", "65 500 250 100\n")]));
    let commands = player.handle(up(InputSource::Keyboard, SPACE), 3);

    match &commands[0] {
        SynthCommand::Release { sounded, .. } => {
            assert_eq!(sounded.duration_ticks, 5);
            assert_eq!(
                sounded.segments,
                vec![TickSegment { start: 8, end: 10 }, TickSegment { start: 0, end: 3 }]
            );
        }
        other => panic!("expected release, got {:?}", other),
    }
}

#[test]
fn test_from_midi_messages() {
    assert_eq!(
        InputEvent::from_midi(&[0x91, 64, 0]),
        vec![up(InputSource::Midi, 64)]
    );
    assert_eq!(
        InputEvent::from_midi(&[0x80, 64, 12]),
        vec![up(InputSource::Midi, 64)]
    );
    assert_eq!(
        InputEvent::from_midi(&[0xd0, 90]),
        vec![InputEvent::Aftertouch { value: 90 }]
    );
    assert_eq!(
        InputEvent::from_midi(&[0xa2, 60, 45]),
        vec![InputEvent::Aftertouch { value: 45 }]
    );
    assert_eq!(
        InputEvent::from_midi(&[0xbf, ALL_NOTES_OFF_CC, 0]),
        vec![InputEvent::AllNotesOff]
    );
    assert!(InputEvent::from_midi(&[0xb0, 7, 100]).is_empty());
    assert!(InputEvent::from_midi(&[0x90, 60]).is_empty());
    assert!(InputEvent::from_midi(&[]).is_empty());
}
