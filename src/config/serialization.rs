//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# cola configuration

# Component specification (terminals, components, grammar path)
spec_path = "{spec_path}"

# Working document used by add / update / render
snapshot_path = "{snapshot_path}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            spec_path = toml_path(&self.spec_path),
            snapshot_path = toml_path(&self.snapshot_path),
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = toml_path(&self.logging.file_dir),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}

/// Paths go into basic strings, so backslashes (Windows) need escaping
fn toml_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
