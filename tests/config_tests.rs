//! Configuration files and device-class sizing.

use petalfall::{
    ConfigError, DeviceClass, FieldConfig, FieldError, LayerConfig, LayerKind, MotionConfig,
    ParticleField, Viewport,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_then_load_preserves_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("petals.json");

    let config = FieldConfig::default()
        .with_seed(42)
        .with_front(LayerConfig::front().with_count(80, 30).with_opacity(0.5))
        .with_motion(MotionConfig::default().with_fall_speed(0.02, 0.05));
    config.save(&path).unwrap();

    let loaded = FieldConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = FieldConfig::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_malformed_json_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ \"seed\": ").unwrap();

    let err = FieldConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty_layer.json");
    let json = r#"{
        "back": {
            "count": 0,
            "constrained_count": 0,
            "depth": { "min": -15.0, "max": -10.0 },
            "opacity": 0.7,
            "scale_base": 0.4
        }
    }"#;
    fs::write(&path, json).unwrap();

    let err = FieldConfig::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid(FieldError::EmptyLayer { layer: "back" })
    ));
}

fn standard_field() -> ParticleField {
    ParticleField::new(&FieldConfig::default(), Viewport::new(16.0, 9.0), None).unwrap()
}

#[test]
fn test_standard_viewport_uses_full_counts() {
    let field = standard_field();
    assert_eq!(field.device_class(), DeviceClass::Standard);
    assert_eq!(field.layer(LayerKind::Back).len(), 120);
    assert_eq!(field.layer(LayerKind::Front).len(), 100);
    assert_eq!(field.instance_count(), 221);
}

#[test]
fn test_narrow_viewport_uses_constrained_counts() {
    let viewport = Viewport::new(4.5, 9.0);
    let field = ParticleField::new(&FieldConfig::default(), viewport, None).unwrap();
    assert_eq!(field.device_class(), DeviceClass::Constrained);
    assert_eq!(field.layer(LayerKind::Back).len(), 60);
    assert_eq!(field.layer(LayerKind::Front).len(), 50);
}

#[test]
fn test_layers_keep_their_depth_and_opacity() {
    let field = standard_field();

    let back = field.layer(LayerKind::Back);
    assert_eq!(back.opacity(), 0.7);
    assert!(back
        .particles()
        .iter()
        .all(|p| (-15.0..=-10.0).contains(&p.position().z)));

    let front = field.layer(LayerKind::Front);
    assert_eq!(front.opacity(), 0.85);
    assert!(front
        .particles()
        .iter()
        .all(|p| (-3.0..=2.0).contains(&p.position().z)));
}

#[test]
fn test_field_refuses_negative_sway_amplitude() {
    let config = FieldConfig::default()
        .with_motion(MotionConfig::default().with_sway_amplitude(-1.0, -0.5));
    let err = ParticleField::new(&config, Viewport::new(16.0, 9.0), None).unwrap_err();
    assert!(matches!(
        err,
        FieldError::InvalidRange {
            name: "sway_amplitude",
            ..
        }
    ));
}
