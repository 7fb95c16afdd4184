use once_cell::sync::OnceCell;
use std::path::Path;

use crate::shared::config::model::{Settings, load_settings, load_settings_from};

static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Process-wide settings, loaded on the first call. `path` replaces the
/// `MLT_CONFIG` lookup for that first load and is ignored afterwards.
pub fn settings(path: Option<&Path>) -> Result<&'static Settings, config::ConfigError> {
    SETTINGS.get_or_try_init(|| match path {
        Some(path) => load_settings_from(&path.to_string_lossy()),
        None => load_settings(),
    })
}
