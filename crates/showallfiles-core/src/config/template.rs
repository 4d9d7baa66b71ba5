//! Commented default `config.toml` written by `showallfiles init`.

use super::Config;

/// Generates the default config file with comments for every option.
pub fn generate_config() -> String {
    let defaults = Config::default();
    let hotkey_modifiers = defaults
        .hotkey
        .modifiers
        .iter()
        .map(|m| format!("\"{}\"", m.to_string().to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"# ShowAllFiles configuration
# Changes take effect the next time the daemon starts.

[hotkey]
# Key that toggles hidden files: a letter, a digit, F1-F12, or a
# named key such as "Period", "Comma", "Space", "Enter".
key = "{key}"
# Any of "alt", "shift", "ctrl", "win".
modifiers = [{hotkey_modifiers}]

[refresh]
# Delay in milliseconds between a new Explorer window taking focus
# and refreshing it.
settle_delay_ms = {settle}

[logging]
# Write logs to a file as well as stderr.
enabled = {enabled}
# One of "debug", "info", "warn", "error".
level = "{level}"
# Log file path. Defaults to ~/.config/showallfiles/logs/showallfiles.log.
# file = "C:/Users/me/showallfiles.log"
# Rotate the file once it reaches this size.
max_file_mb = {max_file_mb}
# Rotated files to keep.
max_backups = {max_backups}
"#,
        key = defaults.hotkey.key,
        settle = defaults.refresh.settle_delay_ms,
        enabled = defaults.logging.enabled,
        level = defaults.logging.level,
        max_file_mb = defaults.logging.max_file_mb,
        max_backups = defaults.logging.max_backups,
    )
}
