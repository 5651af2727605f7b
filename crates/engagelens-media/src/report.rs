//! Plain-text rendering of an [`EngagementReport`].

use std::fmt::Write;

use engagelens_models::timestamp::format_clock;
use engagelens_models::EngagementReport;

/// Render the report as the human-readable summary printed by the CLI.
pub fn render_text_report(report: &EngagementReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn write_report(out: &mut String, report: &EngagementReport) -> std::fmt::Result {
    let summary = &report.engagement.summary;

    writeln!(out, "Engagement Analysis Results:")?;
    for entry in &report.engagement.combined_history {
        writeln!(
            out,
            "Time {} - Score: {} (Base: {} + Nod: {})",
            format_clock(entry.timestamp),
            entry.final_score,
            entry.base_score,
            entry.nod_boost
        )?;
    }

    if !report.nods.nod_history.is_empty() {
        writeln!(out)?;
        writeln!(out, "Nodding Timeline:")?;
        for (i, nod) in report.nods.nod_history.iter().enumerate() {
            writeln!(out, "Nod {} at {}", i + 1, format_clock(nod.timestamp))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Summary Statistics:")?;
    writeln!(out, "Average Score: {:.2}", summary.average_score)?;
    writeln!(out, "Maximum Score: {}", summary.max_score)?;
    writeln!(out, "Minimum Score: {}", summary.min_score)?;
    writeln!(out, "Total Nods: {}", summary.total_nods)?;
    if let Some(intervals) = report.nods.intervals {
        writeln!(out, "Average time between nods: {:.2} seconds", intervals.average)?;
        writeln!(out, "Shortest interval: {:.2} seconds", intervals.shortest)?;
        writeln!(out, "Longest interval: {:.2} seconds", intervals.longest)?;
    }
    writeln!(out, "Average People Detected: {}", summary.average_people)?;

    match &report.transcription {
        Some(transcription) => {
            writeln!(out)?;
            writeln!(out, "Transcript:")?;
            writeln!(out, "{}", transcription.full_text.trim())?;
        }
        None => {
            writeln!(out)?;
            writeln!(out, "Transcript: unavailable")?;
        }
    }

    if !report.low_engagement_segments.is_empty() {
        writeln!(out)?;
        writeln!(out, "Low Engagement Segments:")?;
        for segment in &report.low_engagement_segments {
            writeln!(
                out,
                "[{}] {} (engagement {:.2})",
                segment.timestamp, segment.text, segment.engagement_score
            )?;
        }
    }

    Ok(())
}
