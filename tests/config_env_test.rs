//! Environment overrides live in their own test binary: the process
//! environment is shared by every test in a binary.

use std::env;
use std::fs;

use tempfile::TempDir;

use litestone::config::Settings;

#[test]
fn given_env_override_when_loading_then_env_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("persistent.json");
    fs::write(&path, r#"{ "default_font_size": 10, "default_font": "Courier" }"#).unwrap();
    env::set_var("LITESTONE_DEFAULT_FONT_SIZE", "18");

    let settings = Settings::load(&path);
    env::remove_var("LITESTONE_DEFAULT_FONT_SIZE");

    assert_eq!(settings.default_font_size, 18);
    assert_eq!(settings.default_font, "Courier");
}
