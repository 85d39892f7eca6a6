//! Configuration file handling as seen by the binary.

use std::fs;

use rubberstamp_engine::{Engine, GamePhase, LossCheck, RubberstampConfig};
use tempfile::tempdir;

fn env_overrides_present() -> bool {
    std::env::var_os("RUBBERSTAMP_SEED").is_some() || std::env::var_os("RUBBERSTAMP_PACE").is_some()
}

#[tokio::test]
async fn config_file_drives_engine_setup() {
    if env_overrides_present() {
        return;
    }
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[app]
ascii_only = true
reduced_motion = true

[simulation]
seed = 77
pace = 0.25
loss_check = "lagged"
"#,
    )
    .expect("write config");

    let config = RubberstampConfig::load_from(&path)
        .expect("readable config")
        .expect("config present");
    assert_eq!(config.seed(), Some(77));
    let rules = config.rules();
    assert!((rules.pace - 0.25).abs() < f64::EPSILON);
    assert_eq!(rules.loss_check, LossCheck::Lagged);

    let mut engine = Engine::from_config(Some(&config));
    assert!(engine.ui_options().ascii_only);
    assert!(engine.ui_options().reduced_motion);
    assert!(!engine.ui_options().high_contrast);
    assert_eq!(engine.state().loss_check(), LossCheck::Lagged);

    engine.start();
    engine.confirm_briefing();
    assert_eq!(engine.phase(), GamePhase::Playing);
    assert!(engine.has_pending_spawn());
}

#[tokio::test]
async fn missing_config_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let loaded =
        RubberstampConfig::load_from(&dir.path().join("absent.toml")).expect("missing is fine");
    assert!(loaded.is_none());

    let engine = Engine::from_config(loaded.as_ref());
    assert_eq!(engine.phase(), GamePhase::Idle);
    assert_eq!(engine.ui_options(), Default::default());
    assert_eq!(engine.state().loss_check(), LossCheck::Immediate);
}
