/// ANSI color codes for console output formatting
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub timestamp: &'static str,   // Dim for the leading timestamp
    pub message: &'static str,     // Bold for the event message
    pub logger: &'static str,      // Blue for the logger name
    pub key: &'static str,         // Cyan for field names
    pub level_error: &'static str, // Red for error levels
    pub level_warn: &'static str,  // Yellow for warn levels
    pub level_info: &'static str,  // Green for info levels
    pub level_debug: &'static str, // Gray for debug levels
    pub level_trace: &'static str, // Cyan for trace levels
    pub exception: &'static str,   // Red for the traceback block header
    pub reset: &'static str,       // Reset to default color
}

impl ColorScheme {
    /// Create color scheme for console output
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                timestamp: "\x1b[2m",    // Dim for timestamps
                message: "\x1b[1m",      // Bold for messages
                logger: "\x1b[34m",      // Blue for logger names
                key: "\x1b[36m",         // Cyan for field names
                level_error: "\x1b[31m", // Red for error levels
                level_warn: "\x1b[33m",  // Yellow for warning levels
                level_info: "\x1b[32m",  // Green for info levels
                level_debug: "\x1b[90m", // Gray for debug levels
                level_trace: "\x1b[36m", // Cyan for trace levels
                exception: "\x1b[31m",   // Red for traceback headers
                reset: "\x1b[0m",        // Reset
            }
        } else {
            // All empty strings for no-color mode
            Self {
                timestamp: "",
                message: "",
                logger: "",
                key: "",
                level_error: "",
                level_warn: "",
                level_info: "",
                level_debug: "",
                level_trace: "",
                exception: "",
                reset: "",
            }
        }
    }

    /// Wrap text in a color code; identity when the code is empty.
    pub fn paint(&self, code: &'static str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", code, text, self.reset)
        }
    }

    /// Color for a lowercase log level label.
    pub fn level_color(&self, level: &str) -> &'static str {
        match level {
            "error" | "critical" | "fatal" => self.level_error,
            "warn" | "warning" => self.level_warn,
            "info" => self.level_info,
            "debug" => self.level_debug,
            "trace" => self.level_trace,
            _ => "",
        }
    }
}
