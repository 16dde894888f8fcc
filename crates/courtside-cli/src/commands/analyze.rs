use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use courtside_analytics::{MatchAnalysis, MatchAnalyzer};
use courtside_core::{AnalyticsSettings, MatchDetections, PlayerSlot};

pub fn analyze(settings_file: &Path, input: &Path, output: &Path) -> Result<()> {
    let settings = AnalyticsSettings::load_or_insert(settings_file)?;
    let detections = MatchDetections::load(input)?;
    let analysis = MatchAnalyzer::new(&settings)?
        .analyze(&detections)
        .context("Failed to analyze detections")?;

    log_summary(&analysis);
    write_report(&analysis, output)?;
    tracing::info!("Report written to {}", output.display());
    Ok(())
}

fn write_report(analysis: &MatchAnalysis, output: &Path) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create report {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, analysis).context("Failed to serialize report")?;
    writer.flush()?;
    Ok(())
}

fn log_summary(analysis: &MatchAnalysis) {
    tracing::info!(
        "{} frames, {} shots detected",
        analysis.num_frames,
        analysis.shot_frames.len()
    );
    let Some(last) = analysis.stats.per_frame.last() else {
        return;
    };
    for slot in PlayerSlot::ALL {
        let Some(id) = analysis.stats.slots[slot.index()] else {
            tracing::warn!("No track for {}", slot);
            continue;
        };
        let stats = last.player(slot);
        tracing::info!(
            "{} (track {}): {} shots, average shot speed {}, average movement speed {}",
            slot,
            id,
            stats.shots,
            format_speed(stats.average_shot_speed),
            format_speed(stats.average_movement_speed)
        );
    }
}

fn format_speed(speed: Option<f64>) -> String {
    match speed {
        Some(speed) => format!("{:.1} km/h", speed),
        None => "n/a".to_string(),
    }
}
