use super::{Dispatcher, EventKind, PageEvent};
use crate::config::Config;
use crate::highlighter::Highlighter;
use crate::page::Page;

fn test_config() -> Config {
    Config {
        top_threshold_px: 2.0,
        visibility_top_slack_px: 4.0,
        near_top_slack_px: 16.0,
        override_ms: 800,
        resize_debounce_ms: 150,
        scroll_step_px: 40.0,
        active_classes: vec!["is-active".to_string()],
    }
}

fn highlighter() -> Highlighter {
    Highlighter::new(Page::demo(), test_config(), None)
}

#[test]
fn test_unsubscribed_kind_is_dropped() {
    let mut hl = highlighter();
    let (mut dispatcher, mut handles) = Dispatcher::wired(150);

    dispatcher.dispatch(&mut hl, PageEvent::Scroll { y: 900.0 });
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 0 });
    assert_eq!(hl.active_id(), Some("servicios"));

    // Handles come back in EventKind::ALL order; the first is Scroll.
    let scroll_handle = handles.remove(0);
    assert!(dispatcher.unsubscribe(scroll_handle));
    assert!(!dispatcher.is_subscribed(EventKind::Scroll));

    // A scroll to the page top would force "inicio" if it were delivered.
    dispatcher.dispatch(&mut hl, PageEvent::Scroll { y: 0.0 });
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 16 });
    assert_eq!(
        hl.active_id(),
        Some("servicios"),
        "torn-down subscription must stop the event flow"
    );
}

#[test]
fn test_same_kind_subscriptions_tear_down_independently() {
    let mut dispatcher = Dispatcher::new(150);
    let first = dispatcher.subscribe(EventKind::Scroll);
    let second = dispatcher.subscribe(EventKind::Scroll);

    assert!(dispatcher.unsubscribe(first));
    assert!(
        dispatcher.is_subscribed(EventKind::Scroll),
        "the second subscription keeps the kind flowing"
    );
    assert!(dispatcher.unsubscribe(second));
    assert!(!dispatcher.is_subscribed(EventKind::Scroll));
}

#[test]
fn test_frame_ticks_always_deliver() {
    let mut hl = highlighter();
    let mut dispatcher = Dispatcher::new(150);

    // Nothing subscribed: scrolls are dropped...
    dispatcher.dispatch(&mut hl, PageEvent::Scroll { y: 900.0 });
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 0 });
    assert_eq!(hl.active_id(), Some("inicio"));

    // ...but a directly recorded offset still runs on the next tick.
    hl.on_scroll(900.0);
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 16 });
    assert_eq!(hl.active_id(), Some("servicios"));
}

#[test]
fn test_resize_waits_out_the_debounce_window() {
    let mut hl = highlighter();
    let (mut dispatcher, _handles) = Dispatcher::wired(150);

    dispatcher.dispatch(
        &mut hl,
        PageEvent::Resize {
            header_height: 120.0,
            viewport_height: 900.0,
            now_ms: 0,
        },
    );
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 100 });
    assert!(
        (hl.page().header_height - 80.0).abs() < f64::EPSILON,
        "geometry applied before the quiet window elapsed"
    );

    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 160 });
    assert!((hl.page().header_height - 120.0).abs() < f64::EPSILON);
    assert!((hl.page().viewport_height - 900.0).abs() < f64::EPSILON);
}

#[test]
fn test_rapid_resizes_keep_only_the_newest_geometry() {
    let mut hl = highlighter();
    let (mut dispatcher, _handles) = Dispatcher::wired(150);

    dispatcher.dispatch(
        &mut hl,
        PageEvent::Resize {
            header_height: 100.0,
            viewport_height: 800.0,
            now_ms: 0,
        },
    );
    dispatcher.dispatch(
        &mut hl,
        PageEvent::Resize {
            header_height: 140.0,
            viewport_height: 900.0,
            now_ms: 50,
        },
    );

    // The second measurement reset the deadline to 200.
    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 160 });
    assert!((hl.page().header_height - 80.0).abs() < f64::EPSILON);

    dispatcher.dispatch(&mut hl, PageEvent::Frame { now_ms: 210 });
    assert!((hl.page().header_height - 140.0).abs() < f64::EPSILON);
}
