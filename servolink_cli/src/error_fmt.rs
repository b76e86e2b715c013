//! Human-readable error descriptions and structured JSON error formatting.

use servolink_core::error::{BuildError, RegistryError};

/// First typed registry error anywhere in the report chain.
fn registry_error(err: &eyre::Report) -> Option<&RegistryError> {
    err.chain().find_map(|e| e.downcast_ref::<RegistryError>())
}

fn build_error(err: &eyre::Report) -> Option<&BuildError> {
    err.chain().find_map(|e| e.downcast_ref::<BuildError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = build_error(err) {
        return match be {
            BuildError::MissingInput => {
                "What happened: No analog input was provided to the registry.\nLikely causes: The ADC backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the input is created successfully and passed via with_input(...).".to_string()
            }
            BuildError::MissingDriver => {
                "What happened: No actuator driver was provided to the registry.\nLikely causes: The servo backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the driver is created successfully and passed via with_driver(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/servolink.toml for a sample."
            ),
        };
    }

    if let Some(re) = registry_error(err) {
        return match re {
            RegistryError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("sample trace csv must have headers") {
                    return "Invalid headers in sample trace CSV. Expected 'channel,raw'.".to_string();
                }
                if lower.contains("no samples for channel") {
                    return format!(
                        "What happened: {msg}.\nLikely causes: The sample trace has no rows for a configured sensor channel.\nHow to fix: Record samples for every [[pairs]] sensor or remove the pair."
                    );
                }
                format!(
                    "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [[pairs]], duplicate sensor channels, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
                )
            }
            RegistryError::HardwareFault(msg) => format!(
                "What happened: Hardware fault ({msg}).\nLikely causes: SPI/GPIO not enabled, insufficient permissions, or a pin used twice.\nHow to fix: Check wiring and [[pairs]] actuator pins; ensure the process can access /dev/spidev0.0 and GPIO."
            ),
            RegistryError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: A sensor or servo stopped responding.\nHow to fix: Check power and connections, then re-run with --log-level=debug."
            ),
        };
    }

    let msg = err.to_string();

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for configuration problems, 3 for hardware failures, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if build_error(err).is_some() {
        return 2;
    }
    match registry_error(err) {
        Some(RegistryError::Config(_)) => 2,
        Some(RegistryError::Hardware(_) | RegistryError::HardwareFault(_)) => 3,
        None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if build_error(err).is_some() {
        return "InvalidConfig";
    }
    match registry_error(err) {
        Some(RegistryError::Config(_)) => "InvalidConfig",
        Some(RegistryError::Hardware(_)) => "Hardware",
        Some(RegistryError::HardwareFault(_)) => "HardwareFault",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
