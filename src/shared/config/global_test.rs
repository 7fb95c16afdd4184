use crate::shared::config::global::settings;
use std::path::Path;

#[test]
fn settings_load_once_and_are_shared() {
    let first = settings(Some(Path::new("/nonexistent/mlt_decoder_global"))).unwrap();
    let second = settings(None).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.logging.stdout_level, "info");
    assert!(!first.logging.span_timings);
}
