use std::collections::BTreeMap;

use super::*;
use crate::selection::GroupId;
use crate::transform::PitchRange;

fn editor() -> Editor {
    Editor::new(EditorConfig::default())
}

/// Client position of a pitch/time on the default view.
fn at(editor: &Editor, pitch: u8, time: f64) -> PointerEvent {
    let transform = editor.transform();
    PointerEvent::at(
        transform.pitch_to_pixel_x(pitch),
        transform.time_to_pixel_y(time, editor.view().scroll_position),
    )
}

fn note(id: u64, pitch: u8, start: f64, duration: f64) -> Note {
    Note {
        id: NoteId(id),
        pitch,
        start_time: start,
        duration,
        velocity: 0.8,
        is_left_hand: false,
    }
}

fn loaded(notes: Vec<Note>) -> Editor {
    let mut editor = editor();
    editor
        .load(Document {
            notes,
            ..Document::default()
        })
        .unwrap();
    editor.take_events();
    editor
}

fn click(editor: &mut Editor, event: PointerEvent) {
    editor.pointer_down(event);
    editor.pointer_up(event);
}

fn get(editor: &Editor, id: u64) -> Note {
    editor.notes().get(NoteId(id)).cloned().unwrap()
}

#[test]
fn test_add_note_snaps_and_assigns_hand() {
    let mut editor = editor();
    editor.set_tool(ToolKind::AddNote);
    let event = at(&editor, 62, 1.1);
    click(&mut editor, event);
    let event = at(&editor, 55, 2.0);
    click(&mut editor, event);

    let notes = editor.notes().as_slice();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].pitch, 62);
    assert_eq!(notes[0].start_time, 1.0);
    assert_eq!(notes[0].duration, 0.5);
    assert!(!notes[0].is_left_hand);
    assert!(notes[1].is_left_hand);
    // Adding a note does not select it
    assert!(editor.selection().is_empty());
}

#[test]
fn test_add_chord_is_one_selected_group() {
    let mut editor = editor();
    editor.set_tool(ToolKind::AddChord);
    editor.set_chord_type("maj7").unwrap();
    let event = at(&editor, 60, 0.0);
    click(&mut editor, event);

    let pitches: Vec<u8> = editor.notes().iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![60, 64, 67, 71]);
    let groups: Vec<_> = editor
        .notes()
        .iter()
        .map(|n| editor.selection().group_of(n.id))
        .collect();
    assert!(groups[0].is_some());
    assert!(groups.iter().all(|g| *g == groups[0]));
}

#[test]
fn test_capacity_overflow_emits_warning_and_changes_nothing() {
    let config = EditorConfig {
        note_cap: 4,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    editor.add_note_at(60, 0.0).unwrap();
    editor.add_note_at(62, 1.0).unwrap();
    let before = editor.notes().as_slice().to_vec();
    editor.take_events();

    let result = editor.add_chord_at(60, 2.0, ChordType::Major);
    assert_eq!(
        result,
        Err(EditError::CapacityExceeded {
            requested: 3,
            available: 2,
            cap: 4
        })
    );
    assert_eq!(editor.notes().as_slice(), before.as_slice());
    let events = editor.take_events();
    assert!(matches!(events.as_slice(), [EditorEvent::Warning(_)]));
    assert!(!editor.can_redo());
}

#[test]
fn test_second_marquee_replaces_first() {
    let mut editor = loaded(vec![
        note(1, 60, 0.5, 0.5),
        note(2, 64, 0.5, 0.5),
        note(3, 72, 3.0, 0.5),
    ]);

    let from = at(&editor, 57, 1.2);
    let to = at(&editor, 67, 0.1);
    editor.pointer_down(from);
    editor.pointer_move(to);
    editor.pointer_up(to);
    assert!(editor.selection().is_selected(NoteId(1)));
    assert!(editor.selection().is_selected(NoteId(2)));
    assert!(!editor.selection().is_selected(NoteId(3)));

    let from = at(&editor, 70, 3.7);
    let to = at(&editor, 74, 2.5);
    editor.pointer_down(from);
    editor.pointer_move(to);
    editor.pointer_up(to);
    assert!(!editor.selection().is_selected(NoteId(1)));
    assert!(!editor.selection().is_selected(NoteId(2)));
    assert!(editor.selection().is_selected(NoteId(3)));
    let (groups, colors) = editor.selection().to_maps();
    assert_eq!(groups.len(), 1);
    assert_eq!(colors.len(), 1);
}

#[test]
fn test_shift_marquee_keeps_previous_group() {
    let mut editor = loaded(vec![note(1, 60, 0.5, 0.5), note(2, 72, 3.0, 0.5)]);
    let from = at(&editor, 58, 1.2);
    let to = at(&editor, 62, 0.1);
    editor.pointer_down(from);
    editor.pointer_up(to);

    let from = at(&editor, 70, 3.7).with_modifiers(Modifiers::shift());
    let to = at(&editor, 74, 2.5).with_modifiers(Modifiers::shift());
    editor.pointer_down(from);
    editor.pointer_up(to);

    let first = editor.selection().group_of(NoteId(1)).unwrap();
    let second = editor.selection().group_of(NoteId(2)).unwrap();
    assert_ne!(first, second);
}

fn grouped(notes: Vec<Note>, members: &[u64]) -> Editor {
    let mut editor = editor();
    let groups: BTreeMap<NoteId, GroupId> = members.iter().map(|id| (NoteId(*id), GroupId(1))).collect();
    editor
        .load(Document {
            notes,
            groups,
            ..Document::default()
        })
        .unwrap();
    editor.take_events();
    editor
}

#[test]
fn test_group_move_is_rigid() {
    let mut editor = grouped(
        vec![
            note(1, 60, 1.0, 0.5),
            note(2, 64, 0.25, 0.5),
            note(3, 67, 2.0, 0.5),
        ],
        &[1, 2],
    );
    editor.pointer_down(at(&editor, 60, 1.2));
    assert!(editor.is_dragging());
    editor.pointer_move(at(&editor, 61, 0.9));
    editor.pointer_move(at(&editor, 62, 0.7));
    editor.pointer_up(at(&editor, 62, 0.7));

    // Δp = +2, Δt = -0.5
    assert_eq!((get(&editor, 1).pitch, get(&editor, 1).start_time), (62, 0.5));
    assert_eq!((get(&editor, 2).pitch, get(&editor, 2).start_time), (66, 0.0));
    assert_eq!(get(&editor, 3), note(3, 67, 2.0, 0.5));

    assert!(editor.undo());
    assert_eq!(get(&editor, 1), note(1, 60, 1.0, 0.5));
    assert_eq!(get(&editor, 2), note(2, 64, 0.25, 0.5));
}

#[test]
fn test_move_of_unselected_note_selects_it_alone() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5), note(2, 64, 1.0, 0.5)], &[1]);
    editor.pointer_down(at(&editor, 64, 1.2));
    editor.pointer_move(at(&editor, 65, 1.2));
    editor.pointer_up(at(&editor, 65, 1.2));

    assert_eq!(get(&editor, 1).pitch, 60);
    assert_eq!(get(&editor, 2).pitch, 65);
    assert!(!editor.selection().is_selected(NoteId(1)));
}

#[test]
fn test_bottom_handle_keeps_end_fixed() {
    let mut editor = loaded(vec![note(1, 60, 2.0, 1.0)]);
    // The start edge sits at y = 400
    let transform = editor.transform();
    let x = transform.pitch_to_pixel_x(60);
    editor.pointer_down(PointerEvent::at(x, 398.0));
    editor.pointer_move(at(&editor, 60, 2.5));
    editor.pointer_up(at(&editor, 60, 2.5));

    let resized = get(&editor, 1);
    assert_eq!(resized.duration, 0.5);
    assert_eq!(resized.start_time, 2.5);
    assert_eq!(resized.end_time(), 3.0);
}

#[test]
fn test_top_handle_keeps_start_fixed_for_whole_group() {
    let mut editor = grouped(vec![note(1, 60, 2.0, 1.0), note(2, 64, 1.0, 0.5)], &[1, 2]);
    let x = editor.transform().pitch_to_pixel_x(60);
    // The end edge sits at y = 300
    editor.pointer_down(PointerEvent::at(x, 302.0));
    editor.pointer_up(at(&editor, 60, 3.5));

    assert_eq!(get(&editor, 1).start_time, 2.0);
    assert_eq!(get(&editor, 1).duration, 1.5);
    assert_eq!(get(&editor, 2).start_time, 1.0);
    assert_eq!(get(&editor, 2).duration, 1.5);
}

#[test]
fn test_resize_never_below_one_grid_unit() {
    let mut editor = loaded(vec![note(1, 60, 2.0, 1.0)]);
    let x = editor.transform().pitch_to_pixel_x(60);
    editor.pointer_down(PointerEvent::at(x, 302.0));
    editor.pointer_up(at(&editor, 60, 1.0));
    assert_eq!(get(&editor, 1).duration, 0.25);
    assert_eq!(get(&editor, 1).start_time, 2.0);
}

#[test]
fn test_chromatic_run_by_drag() {
    let mut editor = editor();
    editor.set_tool(ToolKind::Run);
    editor.set_run("chromatic", "C").unwrap();
    editor.pointer_down(at(&editor, 60, 1.0));
    editor.pointer_move(at(&editor, 66, 1.5));
    assert_eq!(editor.preview_notes().len(), 7);
    assert!(editor.notes().is_empty());
    editor.pointer_move(at(&editor, 72, 2.0));
    editor.pointer_up(at(&editor, 72, 2.0));

    let notes = editor.notes().as_slice();
    let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, (60..=72).collect::<Vec<u8>>());
    assert!(notes.windows(2).all(|w| w[1].start_time > w[0].start_time));
    assert_eq!(notes[0].start_time, 1.0);
    assert_eq!(notes[1].start_time - notes[0].start_time, 0.125);
    assert!(notes.iter().all(|n| n.duration == 0.125));
    assert_eq!(editor.selection().len(), 13);
    assert!(editor.preview_notes().is_empty());
}

#[test]
fn test_run_walks_backward_in_time() {
    let mut editor = editor();
    editor.set_tool(ToolKind::Run);
    editor.set_run("major", "C").unwrap();
    editor.pointer_down(at(&editor, 72, 2.0));
    editor.pointer_up(at(&editor, 60, 1.0));

    let notes = editor.notes().as_slice();
    // Sorted by time, so the lowest pitch comes first
    let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![60, 62, 64, 65, 67, 69, 71, 72]);
    assert_eq!(notes[7].start_time, 2.0);
    assert_eq!(notes[0].start_time, 2.0 - 7.0 * 0.125);
}

#[test]
fn test_arpeggio_run() {
    let mut editor = editor();
    editor.set_tool(ToolKind::Run);
    editor.set_run("min-arp", "A").unwrap();
    editor.add_run(57, 0.0, 69, 1.0).unwrap();
    let pitches: Vec<u8> = editor.notes().iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![57, 60, 64, 69]);
}

#[test]
fn test_paste_preview_follows_cursor_then_commits() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5), note(2, 64, 1.5, 0.5)], &[1, 2]);
    assert_eq!(editor.copy(), 2);

    editor.pointer_move(at(&editor, 70, 3.0));
    editor.paste();
    assert!(editor.is_pasting());
    let preview = editor.preview_notes();
    assert_eq!(preview.iter().map(|n| n.pitch).min(), Some(70));
    assert_eq!(
        preview.iter().map(|n| n.start_time).fold(f64::INFINITY, f64::min),
        3.0
    );

    editor.pointer_move(at(&editor, 48, 4.0));
    let pitches: Vec<u8> = editor.preview_notes().iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![48, 52]);
    assert_eq!(editor.notes().len(), 2);

    let event = at(&editor, 48, 4.0);
    click(&mut editor, event);
    assert!(!editor.is_pasting());
    assert_eq!(editor.notes().len(), 4);
    let pasted: Vec<&Note> = editor.notes().iter().filter(|n| n.start_time >= 4.0).collect();
    assert_eq!(pasted.len(), 2);
    assert_eq!((pasted[0].pitch, pasted[0].start_time), (48, 4.0));
    assert_eq!((pasted[1].pitch, pasted[1].start_time), (52, 4.5));
    // Only the pasted notes are selected, as a fresh group
    assert!(!editor.selection().is_selected(NoteId(1)));
    assert!(pasted.iter().all(|n| editor.selection().is_selected(n.id)));
}

#[test]
fn test_escape_discards_paste_preview() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5)], &[1]);
    editor.copy();
    editor.pointer_move(at(&editor, 70, 3.0));
    editor.paste();
    assert!(editor.key_down(KeyEvent::new(Key::Escape)));
    assert!(!editor.is_pasting());
    assert_eq!(editor.notes().len(), 1);
}

#[test]
fn test_space_and_second_paste_commit() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5)], &[1]);
    editor.copy();
    editor.pointer_move(at(&editor, 62, 2.0));
    editor.key_down(KeyEvent::with_modifiers(Key::Char('v'), Modifiers::command()));
    assert!(editor.key_down(KeyEvent::new(Key::Space)));
    assert_eq!(editor.notes().len(), 2);

    editor.paste();
    editor.paste();
    assert_eq!(editor.notes().len(), 3);
}

#[test]
fn test_delete_clears_groups() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5), note(2, 64, 1.0, 0.5)], &[1]);
    assert!(editor.key_down(KeyEvent::new(Key::Delete)));
    assert_eq!(editor.notes().len(), 1);
    assert!(editor.notes().contains(NoteId(2)));
    let (groups, colors) = editor.selection().to_maps();
    assert!(groups.is_empty());
    assert!(colors.is_empty());

    assert!(editor.undo());
    assert_eq!(editor.notes().len(), 2);
}

#[test]
fn test_delete_without_selection_is_noop() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5)]);
    assert_eq!(editor.delete_selection(), 0);
    assert!(editor.take_events().is_empty());
    assert!(!editor.can_undo());
}

#[test]
fn test_delete_during_drag_leaves_one_undo_step() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5)], &[1]);
    editor.pointer_down(at(&editor, 60, 1.2));
    editor.pointer_move(at(&editor, 62, 1.7));
    assert_eq!(get(&editor, 1).pitch, 62);

    assert!(editor.key_down(KeyEvent::new(Key::Delete)));
    assert!(!editor.is_dragging());
    assert!(editor.notes().is_empty());
    editor.pointer_move(at(&editor, 64, 2.2));
    editor.pointer_up(at(&editor, 64, 2.2));
    assert!(editor.notes().is_empty());

    // The note comes back where it was before the drag
    assert!(editor.undo());
    assert_eq!(get(&editor, 1), note(1, 60, 1.0, 0.5));
    assert!(!editor.can_undo());
}

#[test]
fn test_double_click_deselects_group() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5), note(2, 64, 1.0, 0.5)], &[1, 2]);
    let event = at(&editor, 60, 1.2).double();
    editor.pointer_down(event);
    editor.pointer_up(event);
    assert!(editor.selection().is_empty());
    assert!(editor.selection().color_of(GroupId(1)).is_none());
    assert_eq!(editor.notes().len(), 2);
}

#[test]
fn test_tool_switch_cancels_drag() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5)]);
    editor.pointer_down(at(&editor, 60, 1.2));
    editor.pointer_move(at(&editor, 67, 3.2));
    assert_eq!(get(&editor, 1).pitch, 67);

    editor.set_tool(ToolKind::AddNote);
    assert!(!editor.is_dragging());
    assert_eq!(get(&editor, 1), note(1, 60, 1.0, 0.5));
    editor.pointer_up(at(&editor, 67, 3.2));
    assert_eq!(editor.notes().len(), 1);
    assert!(!editor.can_undo());
}

#[test]
fn test_stale_gesture_is_cancelled() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5)]);
    editor.pointer_down(at(&editor, 60, 1.2));
    editor.pointer_move(at(&editor, 64, 1.2));
    // Bypass set_tool so the gesture survives with an old epoch
    editor.tools.activate(ToolKind::Run);
    editor.pointer_move(at(&editor, 65, 1.2));

    assert!(!editor.is_dragging());
    assert_eq!(get(&editor, 1).pitch, 60);
}

#[test]
fn test_inverted_pitch_range_from_host_is_reordered() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5)]);
    editor.set_view(ViewState {
        pitch_range: PitchRange { min: 72, max: 60 },
        ..ViewState::default()
    });
    assert_eq!(editor.view().pitch_range, PitchRange { min: 60, max: 72 });

    editor.pointer_down(at(&editor, 60, 1.2));
    assert!(editor.is_dragging());
    editor.pointer_up(at(&editor, 60, 1.2));

    let other = Editor::with_view(
        EditorConfig::default(),
        ViewState {
            pitch_range: PitchRange { min: 100, max: 255 },
            ..ViewState::default()
        },
    );
    assert_eq!(other.view().pitch_range, PitchRange { min: 100, max: 127 });
}

#[test]
fn test_hand_built_config_is_validated() {
    let config = EditorConfig {
        reference_tempo: 0.0,
        ..EditorConfig::default()
    };
    let result = Editor::try_with_view(config, ViewState::default());
    assert!(matches!(result, Err(EditError::InvalidConfig(_))));
    assert!(Editor::try_with_view(EditorConfig::default(), ViewState::default()).is_ok());
}

#[test]
fn test_press_outside_surface_resets_tools() {
    let mut editor = editor();
    editor.set_tool(ToolKind::AddChord);
    editor.take_events();
    editor.pointer_down(PointerEvent::at(-10.0, -10.0));
    assert_eq!(editor.tool_kind(), ToolKind::Select);
    assert!(editor
        .take_events()
        .contains(&EditorEvent::ToolChanged(ToolKind::Select)));
    assert!(editor.notes().is_empty());
}

#[test]
fn test_tool_params_survive_switches() {
    let mut editor = editor();
    editor.set_tool(ToolKind::Run);
    editor.set_chord_type("dim").unwrap();
    editor.set_tool(ToolKind::AddChord);
    assert_eq!(
        editor.tool(),
        &Tool::AddChord {
            chord: ChordType::Diminished
        }
    );
    assert!(editor.set_chord_type("nope").is_err());
    assert!(editor.set_tool_by_name("lasso").is_err());
}

#[test]
fn test_keyboard_nudges_selection() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5)], &[1]);
    editor.key_down(KeyEvent::new(Key::ArrowUp));
    assert_eq!(get(&editor, 1).start_time, 1.25);
    editor.key_down(KeyEvent::new(Key::ArrowRight));
    assert_eq!(get(&editor, 1).pitch, 61);
    editor.key_down(KeyEvent::with_modifiers(Key::ArrowLeft, Modifiers::shift()));
    assert_eq!(get(&editor, 1).pitch, 49);
    for _ in 0..10 {
        editor.key_down(KeyEvent::new(Key::ArrowDown));
    }
    assert_eq!(get(&editor, 1).start_time, 0.0);
}

#[test]
fn test_duration_cycling() {
    let mut editor = editor();
    editor.key_down(KeyEvent::new(Key::Comma));
    assert_eq!(editor.tool_parameters().duration, NoteDuration::Eighth);
    for _ in 0..6 {
        editor.key_down(KeyEvent::new(Key::Period));
    }
    assert_eq!(editor.tool_parameters().duration, NoteDuration::Whole);
}

#[test]
fn test_keyboard_cursor_adds_notes() {
    let mut editor = editor();
    editor.key_down(KeyEvent::new(Key::Char('n')));
    assert_eq!(editor.tool_kind(), ToolKind::AddNote);
    editor.key_down(KeyEvent::new(Key::ArrowRight));
    assert_eq!(editor.cursor(), Some(Cursor { pitch: 61, time: 0.0 }));
    assert_eq!(editor.preview_notes().len(), 1);
    assert!(editor.key_down(KeyEvent::new(Key::Enter)));
    assert_eq!(editor.notes().as_slice()[0].pitch, 61);
}

#[test]
fn test_keyboard_run_takes_two_enters() {
    let mut editor = editor();
    editor.set_tool(ToolKind::Run);
    editor.set_run("chromatic", "C").unwrap();
    editor.move_cursor(0, 0);
    editor.key_down(KeyEvent::new(Key::Enter));
    assert!(editor.notes().is_empty());
    for _ in 0..4 {
        editor.key_down(KeyEvent::new(Key::ArrowRight));
    }
    editor.key_down(KeyEvent::new(Key::ArrowUp));
    editor.key_down(KeyEvent::new(Key::Enter));
    let pitches: Vec<u8> = editor.notes().iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![60, 61, 62, 63, 64]);
}

#[test]
fn test_spacer_shifts_later_notes_only() {
    let mut editor = loaded(vec![
        note(1, 60, 0.5, 0.5),
        note(2, 62, 1.0, 0.5),
        note(3, 64, 2.0, 0.5),
    ]);
    assert!(editor.insert_space(1.0, 1.0));
    assert_eq!(get(&editor, 1).start_time, 0.5);
    assert_eq!(get(&editor, 2).start_time, 2.0);
    assert_eq!(get(&editor, 3).start_time, 3.0);

    assert!(editor.insert_space(1.0, -1.5));
    assert_eq!(get(&editor, 2).start_time, 1.0);
    assert_eq!(get(&editor, 3).start_time, 1.5);
    assert_eq!(get(&editor, 1).start_time, 0.5);
}

#[test]
fn test_text_tool_annotation_undo() {
    let mut editor = editor();
    editor.set_text("dolce", "serif");
    editor.set_tool(ToolKind::Text);
    let event = at(&editor, 72, 2.0);
    click(&mut editor, event);
    assert_eq!(editor.annotations().len(), 1);
    assert_eq!(editor.annotations()[0].text, "dolce");
    assert_eq!(editor.annotations()[0].pitch, 72);

    assert!(editor.undo());
    assert!(editor.annotations().is_empty());
    assert!(editor.redo());
    assert_eq!(editor.annotations().len(), 1);
}

#[test]
fn test_velocity_and_hand_edits() {
    let mut editor = grouped(vec![note(1, 60, 1.0, 0.5), note(2, 64, 1.0, 0.5)], &[1]);
    assert!(editor.set_velocity(1.4));
    assert_eq!(get(&editor, 1).velocity, 1.0);
    assert_eq!(get(&editor, 2).velocity, 0.8);
    assert!(editor.adjust_velocity(-0.25));
    assert_eq!(get(&editor, 1).velocity, 0.75);
    assert!(editor.set_left_hand(true));
    assert!(get(&editor, 1).is_left_hand);

    editor.clear_selection();
    assert!(!editor.set_velocity(0.1));
}

#[test]
fn test_drag_changes_are_coalesced() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5)]);
    editor.pointer_down(at(&editor, 60, 1.2));
    editor.take_events();
    for pitch in 61..66 {
        editor.pointer_move(at(&editor, pitch, 1.2));
    }
    let events = editor.take_events();
    let changed = events
        .iter()
        .filter(|e| matches!(e, EditorEvent::Changed(_)))
        .count();
    assert_eq!(changed, 1);
    match events.last() {
        Some(EditorEvent::Status(status)) => assert_eq!(status.note_count, 1),
        other => panic!("expected status last, got {:?}", other),
    }
}

#[test]
fn test_autoscroll_during_marquee() {
    let mut editor = loaded(vec![note(1, 60, 7.0, 0.5)]);
    let x = editor.transform().pitch_to_pixel_x(60);
    editor.pointer_down(PointerEvent::at(x, 300.0));
    editor.pointer_move(PointerEvent::at(x, 10.0));
    assert!(editor.is_autoscrolling());

    editor.tick(0.0, None);
    assert!((editor.view().scroll_position - 0.1).abs() < 1e-9);
    editor.tick(5.0, None);
    assert!((editor.view().scroll_position - 0.1).abs() < 1e-9);
    editor.tick(16.0, None);
    assert!((editor.view().scroll_position - 0.2).abs() < 1e-9);

    editor.pointer_move(PointerEvent::at(x, 300.0));
    assert!(!editor.is_autoscrolling());
    editor.pointer_up(PointerEvent::at(x, 300.0));
    assert!(!editor.is_dragging());
}

#[test]
fn test_marquee_keeps_press_time_while_autoscrolling() {
    let mut editor = loaded(vec![note(1, 60, 1.0, 0.5), note(2, 60, 7.0, 0.5)]);
    let x = editor.transform().pitch_to_pixel_x(60);
    // Press on empty space at 0.5s, then hold the pointer in the top band
    editor.pointer_down(PointerEvent::at(x, 550.0));
    editor.pointer_move(PointerEvent::at(x, 10.0));
    assert!(editor.is_autoscrolling());
    assert!(editor.selection().is_selected(NoteId(1)));
    assert!(!editor.selection().is_selected(NoteId(2)));

    for step in 0..15 {
        editor.tick(step as f64 * 16.0, None);
    }
    assert!((editor.view().scroll_position - 1.5).abs() < 1e-9);

    // The pointer now sits at 7.4s; the band still starts at 0.5s
    assert!(editor.selection().is_selected(NoteId(2)));
    assert!(editor.selection().is_selected(NoteId(1)));

    editor.pointer_up(PointerEvent::at(x, 10.0));
    assert!(!editor.is_autoscrolling());
    assert_eq!(editor.selection().len(), 2);
}

#[test]
fn test_frame_is_throttled_and_reports_active_pitches() {
    let mut editor = loaded(vec![note(1, 60, 0.0, 1.0), note(2, 64, 2.0, 1.0)]);
    editor.tick(0.0, Some(0.5));
    let events = editor.take_events();
    match events.as_slice() {
        [EditorEvent::Frame(frame)] => {
            assert_eq!(frame.active_pitches, vec![60]);
            assert_eq!(frame.visible, vec![NoteId(1), NoteId(2)]);
        }
        other => panic!("unexpected events {:?}", other),
    }
    editor.tick(5.0, Some(2.5));
    assert!(editor.take_events().is_empty());
    editor.tick(20.0, Some(2.5));
    assert!(matches!(
        editor.take_events().as_slice(),
        [EditorEvent::Frame(frame)] if frame.active_pitches == vec![64]
    ));
}

#[test]
fn test_playback_follow_pages_the_view() {
    let mut editor = loaded(vec![note(1, 60, 0.0, 1.0)]);
    // Six seconds are visible on the default view
    editor.tick(0.0, Some(7.0));
    assert_eq!(editor.view().scroll_position, 7.0);
}

#[test]
fn test_document_round_trip_continues_ids() {
    let mut editor = grouped(vec![note(4, 60, 1.0, 0.5), note(9, 64, 1.0, 0.5)], &[4]);
    let id = editor.add_note_at(67, 2.0).unwrap();
    assert_eq!(id, NoteId(10));

    let document = editor.document();
    assert_eq!(document.notes.len(), 3);
    assert_eq!(document.groups.get(&NoteId(4)), Some(&GroupId(1)));

    let mut other = Editor::new(EditorConfig::default());
    other.load(document.clone()).unwrap();
    assert_eq!(other.document(), document);
}

#[test]
fn test_status_counts_bars() {
    let mut editor = loaded(vec![note(1, 60, 4.0, 0.5)]);
    editor.select_all();
    let status = editor.status();
    assert_eq!(status.note_count, 1);
    assert_eq!(status.bar_count, 3);
    assert_eq!(status.selected_count, 1);
}

#[test]
fn test_chord_labels_over_collection() {
    let editor = loaded(vec![
        note(1, 60, 0.0, 1.0),
        note(2, 64, 0.01, 1.0),
        note(3, 67, 0.02, 1.0),
        note(4, 62, 1.0, 1.0),
        note(5, 65, 1.0, 1.0),
        note(6, 69, 1.0, 1.0),
    ]);
    let labels = editor.chord_labels();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].chord.root, 60);
    assert_eq!(labels[0].chord.label, "Major");
    assert_eq!(labels[1].chord.root, 62);
    assert_eq!(labels[1].chord.label, "Minor");
}
