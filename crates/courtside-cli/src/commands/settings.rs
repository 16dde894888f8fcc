use std::path::Path;

use anyhow::Result;
use courtside_core::AnalyticsSettings;

/// Prints the settings stored at `path`, writing the defaults first when the file is
/// missing or `reset` is set.
pub fn show_settings(path: &Path, reset: bool) -> Result<()> {
    let settings = if reset {
        let settings = AnalyticsSettings::default();
        settings.store(path)?;
        tracing::info!("Reset settings in {}", path.display());
        settings
    } else {
        AnalyticsSettings::load_or_insert(path)?
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courtside-settings.json");
        std::fs::write(&path, r#"{ "frame_rate": 60.0 }"#).unwrap();

        show_settings(&path, false).unwrap();
        let loaded = AnalyticsSettings::load_or_insert(&path).unwrap();
        assert_eq!(loaded.frame_rate, 60.0);

        show_settings(&path, true).unwrap();
        let loaded = AnalyticsSettings::load_or_insert(&path).unwrap();
        assert_eq!(loaded, AnalyticsSettings::default());
    }
}
