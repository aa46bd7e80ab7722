//! Human-readable error descriptions and structured JSON error formatting.

use pantilt_core::error::{BuildError, TrackerError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingCapture => {
                "What happened: No capture geometry was given to the tracker.\nLikely causes: The [capture] section did not reach the builder.\nHow to fix: Set [capture] width and height in the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TrackerError>() {
        return match te {
            TrackerError::Detector(msg) => format!(
                "What happened: The motion detector failed ({msg}).\nLikely causes: A script region lies outside the capture, or the camera stopped delivering frames.\nHow to fix: Check the detection script against [capture] width/height, then rerun."
            ),
            TrackerError::Actuator(msg) => format!(
                "What happened: The pan-tilt mount rejected a move ({msg}).\nLikely causes: Servo driver not running or mount disconnected.\nHow to fix: Check servo power and wiring, then rerun."
            ),
            TrackerError::ActuatorFault(msg) => format!(
                "What happened: Servo hardware fault ({msg}).\nLikely causes: Wrong [mechanism] pan_pin/tilt_pin, missing GPIO permissions, or pulse limits outside the servo's range.\nHow to fix: Fix the [mechanism] values; ensure the process may access GPIO."
            ),
            TrackerError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [capture] section or out-of-range values.\nHow to fix: Edit the TOML config and try again."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from script loading
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("detection script must have headers") {
        return "Invalid headers in detection script. Expected 'frame,x,y,width,height'.".to_string();
    }
    if lower.contains("open detection script") {
        return format!(
            "What happened: The detection script could not be opened.\nHow to fix: Check the --script path. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 detector, 3 actuator, 4 config/build, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::Detector(_)) => 2,
        Some(TrackerError::Actuator(_) | TrackerError::ActuatorFault(_)) => 3,
        Some(TrackerError::Config(_)) => 4,
        _ => 1,
    }
}

/// Short machine-readable name for the error class.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::Detector(_)) => "Detector",
        Some(TrackerError::Actuator(_)) => "Actuator",
        Some(TrackerError::ActuatorFault(_)) => "ActuatorFault",
        Some(TrackerError::Config(_)) => "Config",
        Some(TrackerError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "event": "error",
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
