use crate::source::PrinterTarget;

/// Turn a failure from the printer API into text for the splash screen.
///
/// The API key itself never appears in the output, only whether one is set.
pub fn describe_error(error: &str, target: &PrinterTarget) -> String {
    if error.to_ascii_lowercase().contains("connection refused") {
        return format!(
            "Unable to connect to {:?} (Key: {}), \nmaybe OctoPrint not running?",
            target.endpoint,
            target.has_api_key()
        );
    }

    format!("Unexpected error: {error}")
}
