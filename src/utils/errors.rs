//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    // Header
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    // Match against the whole context chain, not just the outermost message
    let error_msg = format!("{:#}", error);

    if error_msg.contains("report rate") {
        format_report_rate_error(&mut output, &error_msg);
    } else if error_msg.contains("trace") {
        format_trace_error(&mut output, &error_msg);
    } else if error_msg.contains("config") || error_msg.contains("Invalid") {
        format_config_error(&mut output, &error_msg);
    } else {
        format_generic_error(&mut output, &error_msg);
    }

    // Technical details
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: lamco-motion-predict -vv"
    )
    .ok();

    output
}

fn format_report_rate_error(output: &mut String, _error: &str) {
    writeln!(output, "Report Rate Error").ok();
    writeln!(output).ok();
    writeln!(output, "The report rate must be a positive number of milliseconds.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Typical stylus digitizers report every 4-8ms").ok();
    writeln!(
        output,
        "  → Omit --report-rate to estimate it from event timestamps"
    )
    .ok();
}

fn format_trace_error(output: &mut String, _error: &str) {
    writeln!(output, "Trace Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem reading the motion event trace.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Trace file not found").ok();
    writeln!(output, "     → Specify: lamco-motion-predict --trace stroke.json").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid JSON").ok();
    writeln!(output, "     → The trace must be a JSON array of motion events").ok();
    writeln!(output, "     → See demos/straight_stroke.json for reference").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Malformed event").ok();
    writeln!(
        output,
        "     → Every sample needs one coordinate set per pointer id"
    )
    .ok();
}

fn format_config_error(output: &mut String, _error: &str) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Configuration file not found").ok();
    writeln!(
        output,
        "     → Specify: lamco-motion-predict -c /path/to/predictor.toml"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Out of range values").ok();
    writeln!(output, "     → Noise values must be positive").ok();
    writeln!(output, "     → Smoothing factors must be in (0, 1]").ok();
    writeln!(output, "     → See demos/predictor.toml for reference").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Prediction Error").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_format_user_error() {
        let error = anyhow::anyhow!("something unexpected");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Prediction Error"));
    }

    #[test]
    fn test_trace_error_formatting() {
        let error: anyhow::Error = Err::<(), _>(anyhow::anyhow!("expected value at line 1"))
            .context("Failed to parse trace file")
            .unwrap_err();
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Trace Error"));
        assert!(formatted.contains("expected value at line 1"));
    }

    #[test]
    fn test_report_rate_error_formatting() {
        let error = anyhow::Error::new(crate::PredictionError::InvalidReportRate(-2));
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Report Rate Error"));
    }

    #[test]
    fn test_config_error_formatting() {
        let error = anyhow::anyhow!("Failed to read config file: /nope.toml");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Configuration Error"));
    }
}
