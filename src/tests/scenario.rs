use super::{Scenario, Step, Trace};
use crate::config::Config;
use crate::page::Page;
use std::io::Write;
use tempfile::NamedTempFile;

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

#[test]
fn test_replay_records_activation_transitions() {
    let scenario = Scenario {
        fragment: None,
        steps: vec![
            Step::Scroll {
                at_ms: 100,
                y: 900.0,
            },
            Step::Click {
                at_ms: 200,
                target: "ubicacion".to_string(),
            },
            // Within the override window: must not produce a transition.
            Step::Scroll {
                at_ms: 300,
                y: 900.0,
            },
            // Past expiry (200 + 800): computed state returns.
            Step::Scroll {
                at_ms: 1200,
                y: 900.0,
            },
        ],
    };

    let trace = scenario.replay(Page::demo(), test_config());

    assert_eq!(trace.initial.as_deref(), Some("inicio"));
    let tos: Vec<Option<&str>> = trace.transitions.iter().map(|t| t.to.as_deref()).collect();
    assert_eq!(
        tos,
        vec![Some("servicios"), Some("ubicacion"), Some("servicios")],
        "unexpected transition sequence: {:?}",
        trace.transitions
    );
    assert!(
        trace.transitions[2].at_ms >= 1000,
        "the override must hold until it expires"
    );
    assert_eq!(trace.final_active(), Some("servicios"));
}

#[test]
fn test_steps_fire_in_timestamp_order() {
    // Listed out of order on purpose.
    let scenario = Scenario {
        fragment: None,
        steps: vec![
            Step::Click {
                at_ms: 300,
                target: "inicio".to_string(),
            },
            Step::Scroll {
                at_ms: 100,
                y: 900.0,
            },
        ],
    };

    let trace = scenario.replay(Page::demo(), test_config());
    let tos: Vec<Option<&str>> = trace.transitions.iter().map(|t| t.to.as_deref()).collect();
    assert_eq!(tos, vec![Some("servicios"), Some("inicio")]);
}

#[test]
fn test_scenario_loads_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
  "fragment": "servicios",
  "steps": [
    {{ "event": "scroll", "at_ms": 100, "y": 900.0 }},
    {{ "event": "visibility", "at_ms": 150,
       "entries": [{{ "id": "ubicacion", "ratio": 0.9, "intersecting": true }}] }},
    {{ "event": "click", "at_ms": 200, "target": "ubicacion" }}
  ]
}}"#
    )
    .unwrap();

    let scenario = Scenario::load(file.path()).unwrap();
    assert_eq!(scenario.fragment.as_deref(), Some("servicios"));
    assert_eq!(scenario.steps.len(), 3);
    assert_eq!(scenario.steps[0].at_ms(), 100);

    let trace = scenario.replay(Page::demo(), test_config());
    assert_eq!(trace.initial.as_deref(), Some("servicios"));
    assert_eq!(trace.final_active(), Some("ubicacion"));
}

#[test]
fn test_invalid_scenario_reports_invalid_data() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not a scenario").unwrap();

    let err = Scenario::load(file.path()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn test_trace_round_trips_as_json() {
    let scenario = Scenario {
        fragment: None,
        steps: vec![Step::Scroll {
            at_ms: 100,
            y: 900.0,
        }],
    };
    let trace = scenario.replay(Page::demo(), test_config());

    let json = serde_json::to_string_pretty(&trace).unwrap();
    let parsed: Trace = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.initial, trace.initial);
    assert_eq!(parsed.transitions.len(), trace.transitions.len());
}
