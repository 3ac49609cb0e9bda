//! Pipeline settings tests

use strata::settings::DEFAULT_EASE_OUT_SECONDS;
use strata::{PipelineSettings, StrataError};

#[test]
fn defaults() {
    let settings = PipelineSettings::default();
    assert_eq!((settings.width, settings.height), (1280, 720));
    assert_eq!(settings.shadow_map_size, 2048);
    assert_eq!(settings.ease_out_seconds, DEFAULT_EASE_OUT_SECONDS);
    assert!(settings.validate().is_ok());
    assert!((settings.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
}

#[test]
fn missing_json_fields_fall_back_to_defaults() {
    let settings = PipelineSettings::from_json(r#"{ "width": 1920, "height": 1080 }"#).unwrap();
    assert_eq!(settings.width, 1920);
    assert_eq!(settings.height, 1080);
    assert_eq!(settings.shadow_map_size, PipelineSettings::default().shadow_map_size);
}

#[test]
fn json_round_trip() {
    let settings = PipelineSettings {
        shadow_distance: 55.0,
        ..PipelineSettings::default()
    };
    let json = settings.to_json().unwrap();
    assert_eq!(PipelineSettings::from_json(&json).unwrap(), settings);
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{ "width": 0 }"#,
        r#"{ "shadow_map_size": 0 }"#,
        r#"{ "shadow_distance": -1.0 }"#,
        r#"{ "ease_out_seconds": 0.0 }"#,
    ] {
        assert!(
            matches!(PipelineSettings::from_json(json), Err(StrataError::Precondition { .. })),
            "{json} was accepted"
        );
    }
}

#[test]
fn unparsable_json_is_reported() {
    let err = PipelineSettings::from_json("{ width: ").unwrap_err();
    assert!(matches!(err, StrataError::InvalidSettings(_)));
    assert!(err.to_string().starts_with("Invalid settings"));
}
