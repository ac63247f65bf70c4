use super::*;
use crate::config::UiSettings;
use ratatui::layout::Rect;

fn app() -> App {
    App::new(&UiSettings::default())
}

#[test]
fn new_takes_panel_visibility_from_settings() {
    assert!(app().show_track_info);

    let ui = UiSettings {
        show_track_info: false,
        ..UiSettings::default()
    };
    let mut a = App::new(&ui);
    assert!(!a.show_track_info);
    a.toggle_track_info();
    assert!(a.show_track_info);
}

#[test]
fn open_prompt_collects_and_trims_input() {
    let mut a = app();
    a.set_notice("old message");
    a.enter_open_mode();
    assert!(a.open_mode);
    assert!(a.notice.is_none());

    for c in "  /tmp/a.mp3x ".chars() {
        a.push_open_char(c);
    }
    a.pop_open_char();
    a.pop_open_char();
    a.push_open_char(' ');

    assert_eq!(a.submit_open_input().as_deref(), Some("/tmp/a.mp3"));
    assert!(!a.open_mode);
    assert!(a.open_input.is_empty());
}

#[test]
fn blank_or_cancelled_prompt_yields_nothing() {
    let mut a = app();
    a.enter_open_mode();
    a.push_open_char(' ');
    assert_eq!(a.submit_open_input(), None);

    a.enter_open_mode();
    a.push_open_char('x');
    a.cancel_open_mode();
    assert!(!a.open_mode);
    assert!(a.open_input.is_empty());
}

#[test]
fn click_inside_progress_bar_maps_to_fraction() {
    let mut a = app();
    assert_eq!(a.seek_fraction_at(5, 5), None);

    a.set_progress_area(Rect::new(10, 4, 40, 1));
    assert_eq!(a.seek_fraction_at(10, 4), Some(0.0));
    assert_eq!(a.seek_fraction_at(30, 4), Some(0.5));
    assert_eq!(a.seek_fraction_at(40, 4), Some(0.75));

    assert_eq!(a.seek_fraction_at(9, 4), None);
    assert_eq!(a.seek_fraction_at(50, 4), None);
    assert_eq!(a.seek_fraction_at(20, 5), None);
}

#[test]
fn empty_progress_area_is_ignored() {
    let mut a = app();
    a.set_progress_area(Rect::new(0, 0, 0, 1));
    assert_eq!(a.seek_fraction_at(0, 0), None);
}

#[test]
fn digits_seek_to_tenths() {
    assert_eq!(digit_seek_fraction('0'), Some(0.0));
    assert_eq!(digit_seek_fraction('5'), Some(0.5));
    assert_eq!(digit_seek_fraction('9'), Some(0.9));
    assert_eq!(digit_seek_fraction('x'), None);
}
