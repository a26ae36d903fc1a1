use clap::CommandFactory;
use tui_sketchbook::config::{Config, RendererMode};
use tui_sketchbook::prefs::{AppPrefs, PrefsError};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("sketchbook-prefs-{}-{name}", std::process::id()))
}

#[test]
fn cli_definition_is_valid() {
    Config::command().debug_assert();
}

#[test]
fn renderer_cell_ratios() {
    assert_eq!(RendererMode::Ascii.cell_pixels(), (1, 1));
    assert_eq!(RendererMode::HalfBlock.cell_pixels(), (1, 2));
    assert_eq!(RendererMode::Braille.cell_pixels(), (2, 4));
}

#[test]
fn prefs_roundtrip_through_disk() {
    let path = temp_path("roundtrip.txt");
    let prefs = AppPrefs {
        sketch: Some("Wave Field: Pinch Surf".to_string()),
        renderer: Some("braille".to_string()),
        show_hud: false,
    };
    prefs.save(Some(&path)).expect("save prefs");
    let loaded = AppPrefs::load(Some(&path)).expect("load prefs");
    assert_eq!(loaded, prefs);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn prefs_missing_file_yields_defaults() {
    let path = temp_path("does-not-exist.txt");
    let loaded = AppPrefs::load(Some(&path)).expect("missing file is not an error");
    assert_eq!(loaded, AppPrefs::default());
    assert!(loaded.show_hud);
}

#[test]
fn prefs_ignore_comments_and_unknown_keys() {
    let path = temp_path("extras.txt");
    std::fs::write(
        &path,
        "# comment\n\nfuture_key=whatever\nsketch=Cross Bloom\nshow_hud=off\n",
    )
    .expect("write fixture");
    let loaded = AppPrefs::load(Some(&path)).expect("load prefs");
    assert_eq!(loaded.sketch.as_deref(), Some("Cross Bloom"));
    assert!(!loaded.show_hud);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn prefs_reject_malformed_lines() {
    let path = temp_path("broken.txt");
    std::fs::write(&path, "sketch=ok\nthis line has no equals\n").expect("write fixture");
    let err = AppPrefs::load(Some(&path)).expect_err("malformed line must fail");
    assert!(matches!(err, PrefsError::Parse { line: 2, .. }));

    std::fs::write(&path, "show_hud=maybe\n").expect("write fixture");
    let err = AppPrefs::load(Some(&path)).expect_err("bad bool must fail");
    assert!(matches!(err, PrefsError::Parse { line: 1, .. }));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn prefs_without_a_path_are_a_no_op() {
    assert_eq!(AppPrefs::load(None).expect("no path"), AppPrefs::default());
    AppPrefs::default().save(None).expect("no path save");
}
