//! End-to-end scenarios across windows, streams, and styles.

use fictui_core::Rect;
use fictui_runtime::{
    Division, FileMode, HostEvent, LeafKind, RecordingHost, SeekMode, Session, SplitDir,
    SplitMethod, WindowType,
};
use fictui_style::{Hint, HintScope, Rgb, StyleClass, SurfaceKind};

fn root_buffer(session: &mut Session) -> fictui_runtime::WindowId {
    session
        .open_window(
            None,
            SplitMethod::new(SplitDir::Above, Division::Fixed),
            0,
            None,
            LeafKind::TextBuffer,
            0,
        )
        .expect("root window")
}

#[test]
fn overlong_write_truncates_and_counts_attempts() {
    let mut session = Session::new(80, 24);
    let stream = session
        .open_memory_stream(Some(vec![0; 8]), FileMode::Write, 0)
        .unwrap();

    session.put_string_stream(stream, "HELLOWORLD");

    session.set_position(stream, 0, SeekMode::End);
    assert_eq!(session.get_position(stream), 8);

    // A further write is dropped but still counted as attempted.
    session.put_char_stream(stream, b'!');

    let result = session.close_stream(stream).unwrap();
    assert_eq!(result.write_count, 11);
    assert_eq!(result.buffer.unwrap(), b"HELLOWOR".to_vec());
}

#[test]
fn fixed_grid_split_above_a_buffer() {
    let mut session = Session::new(80, 24);
    let buffer = root_buffer(&mut session);
    let grid = session
        .open_window(
            Some(buffer),
            SplitMethod::new(SplitDir::Above, Division::Fixed),
            3,
            None,
            LeafKind::TextGrid,
            0,
        )
        .unwrap();

    let pair = session.window_get_parent(grid).unwrap();
    assert_eq!(session.root_window(), Some(pair));
    assert_eq!(session.window_get_type(pair), Some(WindowType::Pair));
    assert_eq!(session.window_get_type(grid), Some(WindowType::TextGrid));

    // Grid takes the top 3 rows, a 1-row border divides, the buffer
    // gets the remainder.
    assert_eq!(session.window_get_rect(grid), Some(Rect::new(0, 0, 80, 3)));
    assert_eq!(
        session.window_get_rect(buffer),
        Some(Rect::new(0, 4, 80, 20))
    );
}

#[test]
fn all_types_hint_reaches_both_tables_and_clears_independently() {
    let mut session = Session::new(80, 24);
    session.set_style_hint(HintScope::AllTypes, 0, Hint::BackColor, 0x102030);

    let want = Rgb::new(0x10, 0x20, 0x30);
    assert_eq!(
        session
            .styles()
            .record(SurfaceKind::TextGrid, StyleClass::Normal)
            .bg,
        want
    );
    assert_eq!(
        session
            .styles()
            .record(SurfaceKind::TextBuffer, StyleClass::Normal)
            .bg,
        want
    );

    session.clear_style_hint(HintScope::TextGrid, 0, Hint::BackColor);
    assert_ne!(
        session
            .styles()
            .record(SurfaceKind::TextGrid, StyleClass::Normal)
            .bg,
        want
    );
    assert_eq!(
        session
            .styles()
            .record(SurfaceKind::TextBuffer, StyleClass::Normal)
            .bg,
        want
    );
}

#[test]
fn closing_the_current_windows_stream_clears_it() {
    let host = RecordingHost::new();
    let mut session = Session::with_host(80, 24, host.clone());
    let buffer = root_buffer(&mut session);
    let grid = session
        .open_window(
            Some(buffer),
            SplitMethod::new(SplitDir::Above, Division::Fixed),
            3,
            None,
            LeafKind::TextGrid,
            0,
        )
        .unwrap();

    let grid_stream = session.window_get_stream(grid).unwrap();
    session.set_current_stream(Some(grid_stream));
    session.put_string("on screen");
    assert_eq!(host.chars_for(grid), b"on screen");

    session.close_window(grid).unwrap();
    assert_eq!(session.current_stream(), None);

    // The no-argument write entry points become silent no-ops.
    host.clear();
    session.put_char(b'x');
    session.put_string("more");
    assert!(host.events().is_empty());
}

#[test]
fn echo_stream_receives_identical_bytes_and_counters_advance_in_lockstep() {
    let host = RecordingHost::new();
    let mut session = Session::with_host(80, 24, host.clone());
    let win = root_buffer(&mut session);
    let echo = session
        .open_memory_stream(Some(vec![0; 32]), FileMode::Write, 0)
        .unwrap();
    session.window_set_echo_stream(win, Some(echo));

    let win_stream = session.window_get_stream(win).unwrap();
    session.put_string_stream(win_stream, "look");
    session.put_char_stream(win_stream, b' ');
    session.put_buffer_stream(win_stream, b"around");

    assert_eq!(host.chars_for(win), b"look around");

    let result = session.close_stream(echo).unwrap();
    assert_eq!(result.write_count, 11);
    assert_eq!(&result.buffer.unwrap()[..11], b"look around");
}

#[test]
fn style_changes_interleave_with_window_output() {
    let host = RecordingHost::new();
    let mut session = Session::with_host(80, 24, host.clone());
    let win = root_buffer(&mut session);
    let stream = session.window_get_stream(win).unwrap();
    session.set_current_stream(Some(stream));

    session.put_string("plain ");
    session.set_style(StyleClass::Emphasized as u32);
    session.put_string("loud");

    assert_eq!(host.chars_for(win), b"plain loud");
    assert!(session.style_distinguish(win, 0, 1));
    assert_eq!(session.style_measure(win, 1, Hint::Oblique), Some(1));
    assert_eq!(session.style_measure(win, 1, Hint::Proportional), Some(0));
}

#[test]
fn file_stream_round_trip_through_a_fileref() {
    let dir = std::env::temp_dir().join("fictui-file-stream-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("transcript.txt");

    let mut session = Session::new(80, 24);
    let fref = session.create_fileref(&path, true, 5).unwrap();
    assert_eq!(session.fileref_get_rock(fref), 5);

    let out = session.open_file_stream(fref, FileMode::Write, 0).unwrap();
    session.put_string_stream(out, "saved line");
    let result = session.close_stream(out).unwrap();
    assert_eq!(result.write_count, 10);

    let input = session.open_file_stream(fref, FileMode::Read, 0).unwrap();
    let mut contents = Vec::new();
    while let Some(ch) = session.get_char_stream(input) {
        contents.push(ch);
    }
    assert_eq!(contents, b"saved line");
    let result = session.close_stream(input).unwrap();
    assert_eq!(result.read_count, 10);

    session.destroy_fileref(fref);
    std::fs::remove_file(&path).ok();
}

#[test]
fn shutdown_sweep_closes_only_file_streams() {
    let dir = std::env::temp_dir().join("fictui-shutdown-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("log.txt");

    let mut session = Session::new(80, 24);
    let win = root_buffer(&mut session);
    let memory = session
        .open_memory_stream(Some(vec![0; 4]), FileMode::Write, 1)
        .unwrap();
    let fref = session.create_fileref(&path, false, 0).unwrap();
    let file = session.open_file_stream(fref, FileMode::Write, 2).unwrap();

    session.close_all_file_streams();

    assert!(session.stream_get_rock(file) == 0);
    assert_eq!(session.stream_get_rock(memory), 1);
    assert!(session.window_get_stream(win).is_some());
    std::fs::remove_file(&path).ok();
}

#[test]
fn deep_split_tree_survives_resize_and_redraw() {
    let host = RecordingHost::new();
    let mut session = Session::with_host(80, 24, host.clone());
    let buffer = root_buffer(&mut session);
    let status = session
        .open_window(
            Some(buffer),
            SplitMethod::new(SplitDir::Above, Division::Fixed),
            1,
            None,
            LeafKind::TextGrid,
            0,
        )
        .unwrap();
    let side = session
        .open_window(
            Some(buffer),
            SplitMethod::new(SplitDir::Right, Division::Proportional),
            30,
            None,
            LeafKind::TextBuffer,
            0,
        )
        .unwrap();

    session.resize(120, 40);

    let status_rect = session.window_get_rect(status).unwrap();
    assert_eq!(status_rect, Rect::new(0, 0, 120, 1));
    let side_rect = session.window_get_rect(side).unwrap();
    let buffer_rect = session.window_get_rect(buffer).unwrap();
    assert_eq!(side_rect.width, 36);
    assert_eq!(buffer_rect.right() + 1, side_rect.left());
    assert_eq!(side_rect.right(), 120);

    host.clear();
    session.redraw();
    let borders = host
        .events()
        .iter()
        .filter(|e| matches!(e, HostEvent::Border { .. }))
        .count();
    assert_eq!(borders, 2);
}
