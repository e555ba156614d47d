//! Default settings values
//!
//! Embedded in the binary and printed by `sitecfg default-settings`.

/// Default settings as TOML
pub const DEFAULT_SETTINGS_TOML: &str = r##"
# sitecfg settings

[cache]
# Delay between background refresh cycles
update_interval_ms = 10000
# Pause before each refresh so repository notifications can settle
settle_delay_ms = 250

[watcher]
enabled = true
debounce_ms = 200

[repository]
# root = "/srv/site"
"##;
