use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use scan_overlay::config::ScannerConfig;
use scan_overlay::ViewportGeometry;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SCAN_OVERLAY_CONFIG",
        "SCAN_OVERLAY_INACTIVITY_MS",
        "SCAN_OVERLAY_VIEWPORT",
    ] {
        std::env::remove_var(key);
    }
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "inactivity_ms": 3000,
            "viewport": { "width": 720.0, "height": 1280.0 },
            "style": {
                "padding": 24.0,
                "content_text_size": 40.0,
                "line_spacing_mult": 1.0
            }
        }"#,
    );

    std::env::set_var("SCAN_OVERLAY_CONFIG", file.path());
    std::env::set_var("SCAN_OVERLAY_VIEWPORT", "1080x1920");

    let cfg = ScannerConfig::load().expect("load config");

    assert_eq!(cfg.inactivity, Duration::from_millis(3000));
    assert_eq!(cfg.check_interval(), Duration::from_millis(1500));
    assert_eq!(cfg.viewport, ViewportGeometry::new(1080.0, 1920.0));
    assert_eq!(cfg.style.padding, 24.0);
    assert_eq!(cfg.style.content_text_size, 40.0);
    assert_eq!(cfg.style.line_spacing_mult, 1.0);
    assert_eq!(cfg.style.category_text_size, 38.0);
    assert_eq!(cfg.style.corner_radius, 16.0);

    clear_env();
}

#[test]
fn defaults_without_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ScannerConfig::load().expect("load defaults");
    assert_eq!(cfg.inactivity, Duration::from_millis(2000));
    assert_eq!(cfg.check_interval(), Duration::from_millis(1000));
    assert_eq!(cfg.viewport, ViewportGeometry::new(1080.0, 2400.0));
    assert_eq!(cfg.style.padding, 32.0);
    assert_eq!(cfg.style.highlight_stroke, 8.0);

    clear_env();
}

#[test]
fn env_inactivity_override_wins_over_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(r#"{ "inactivity_ms": 5000 }"#);
    std::env::set_var("SCAN_OVERLAY_CONFIG", file.path());
    std::env::set_var("SCAN_OVERLAY_INACTIVITY_MS", "1200");

    let cfg = ScannerConfig::load().expect("load config");
    assert_eq!(cfg.inactivity, Duration::from_millis(1200));
    assert_eq!(cfg.check_interval(), Duration::from_millis(600));

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SCAN_OVERLAY_INACTIVITY_MS", "soon");
    assert!(ScannerConfig::load().is_err());
    clear_env();

    std::env::set_var("SCAN_OVERLAY_VIEWPORT", "wide");
    assert!(ScannerConfig::load().is_err());
    clear_env();

    let file = write_config(r#"{ "style": { "content_text_size": 0.0 } }"#);
    std::env::set_var("SCAN_OVERLAY_CONFIG", file.path());
    assert!(ScannerConfig::load().is_err());
    clear_env();

    let file = write_config("{ not json");
    assert!(ScannerConfig::from_path(file.path()).is_err());

    std::env::set_var("SCAN_OVERLAY_CONFIG", "/nonexistent/scan-overlay.json");
    assert!(ScannerConfig::load().is_err());

    clear_env();
}
