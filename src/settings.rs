//! Per-user cooking mode settings.
//!
//! A configuration value object read by the session manager to decide
//! default behavior. The engine never mutates it; the host app owns the
//! stored copy and pushes updates.

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Settings shared between the session manager and the timer engine.
/// Each command reads the values current at that moment.
pub type SharedSettings = Arc<RwLock<CookingModeSettings>>;

/// Wraps settings for sharing across engine components.
pub fn shared_settings(settings: CookingModeSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CookingModeSettings {
    pub behavior: BehaviorSettings,
    pub voice: VoiceSettings,
    pub feedback: FeedbackSettings,
    pub display: DisplaySettings,
}

/// Step and timer automation behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Advance to the next step automatically after marking one complete.
    pub auto_advance_steps: bool,
    /// Delay before the automatic advance fires, in milliseconds.
    pub auto_advance_delay_ms: u64,
    /// Start analyzer-suggested timers without asking.
    pub auto_start_timers: bool,
    /// Duration used when a voice command asks for a timer with no number.
    pub default_timer_seconds: u32,
    /// Annotate steps with analyzer output when a session starts.
    pub analyze_steps: bool,
}

/// Voice command interpretation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    /// Recognition confidence below this is treated as unrecognized.
    pub confidence_threshold: f32,
    /// Locale of the active command table.
    pub locale: String,
}

/// Audio, speech and haptic feedback toggles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackSettings {
    /// Speak confirmations and instructions aloud.
    pub voice_feedback: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

/// Visual preferences, passed through to the host UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    pub text_size: TextSize,
    pub theme: Theme,
    pub keep_screen_on: bool,
}

/// Text size preference for cooking mode screens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

/// Theme preference for cooking mode screens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_advance_steps: true,
            auto_advance_delay_ms: defaults::AUTO_ADVANCE_DELAY_MS,
            auto_start_timers: false,
            default_timer_seconds: defaults::DEFAULT_TIMER_SECONDS,
            analyze_steps: true,
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: defaults::VOICE_CONFIDENCE_THRESHOLD,
            locale: defaults::DEFAULT_LOCALE.to_string(),
        }
    }
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            voice_feedback: true,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            text_size: TextSize::Medium,
            theme: Theme::System,
            keep_screen_on: true,
        }
    }
}

impl CookingModeSettings {
    /// Load settings from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings: CookingModeSettings = toml::from_str(&contents)?;
        Ok(settings)
    }

    /// Load settings from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load settings from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SOUSCHEF_LOCALE → voice.locale
    /// - SOUSCHEF_AUTO_ADVANCE → behavior.auto_advance_steps
    /// - SOUSCHEF_VOICE → voice.enabled
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(locale) = std::env::var("SOUSCHEF_LOCALE")
            && !locale.is_empty()
        {
            self.voice.locale = locale;
        }

        if let Ok(auto) = std::env::var("SOUSCHEF_AUTO_ADVANCE")
            && let Some(value) = parse_bool(&auto)
        {
            self.behavior.auto_advance_steps = value;
        }

        if let Ok(voice) = std::env::var("SOUSCHEF_VOICE")
            && let Some(value) = parse_bool(&voice)
        {
            self.voice.enabled = value;
        }

        self
    }

    /// Get the default settings file path
    ///
    /// Returns ~/.config/souschef/settings.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("souschef")
            .join("settings.toml")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_souschef_env() {
        remove_env("SOUSCHEF_LOCALE");
        remove_env("SOUSCHEF_AUTO_ADVANCE");
        remove_env("SOUSCHEF_VOICE");
    }

    #[test]
    fn test_default_settings_have_correct_values() {
        let settings = CookingModeSettings::default();

        // Behavior defaults
        assert!(settings.behavior.auto_advance_steps);
        assert_eq!(settings.behavior.auto_advance_delay_ms, 1500);
        assert!(!settings.behavior.auto_start_timers);
        assert_eq!(settings.behavior.default_timer_seconds, 300);
        assert!(settings.behavior.analyze_steps);

        // Voice defaults
        assert!(settings.voice.enabled);
        assert_eq!(settings.voice.confidence_threshold, 0.5);
        assert_eq!(settings.voice.locale, "pt-BR");

        // Feedback defaults
        assert!(settings.feedback.voice_feedback);
        assert!(settings.feedback.sound_enabled);
        assert!(settings.feedback.vibration_enabled);

        // Display defaults
        assert_eq!(settings.display.text_size, TextSize::Medium);
        assert_eq!(settings.display.theme, Theme::System);
        assert!(settings.display.keep_screen_on);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [behavior]
            auto_advance_steps = false
            auto_advance_delay_ms = 3000
            auto_start_timers = true
            default_timer_seconds = 600

            [voice]
            enabled = true
            confidence_threshold = 0.7
            locale = "en-US"

            [feedback]
            sound_enabled = false

            [display]
            text_size = "large"
            theme = "dark"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = CookingModeSettings::load(temp_file.path()).unwrap();

        assert!(!settings.behavior.auto_advance_steps);
        assert_eq!(settings.behavior.auto_advance_delay_ms, 3000);
        assert!(settings.behavior.auto_start_timers);
        assert_eq!(settings.behavior.default_timer_seconds, 600);

        assert_eq!(settings.voice.confidence_threshold, 0.7);
        assert_eq!(settings.voice.locale, "en-US");

        assert!(!settings.feedback.sound_enabled);
        // Unset feedback fields fall back to defaults
        assert!(settings.feedback.vibration_enabled);

        assert_eq!(settings.display.text_size, TextSize::Large);
        assert_eq!(settings.display.theme, Theme::Dark);
    }

    #[test]
    fn test_load_partial_settings_uses_defaults() {
        let toml_content = r#"
            [voice]
            locale = "es-ES"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = CookingModeSettings::load(temp_file.path()).unwrap();

        assert_eq!(settings.voice.locale, "es-ES");

        // Everything else should be defaults
        assert!(settings.behavior.auto_advance_steps);
        assert_eq!(settings.behavior.default_timer_seconds, 300);
        assert_eq!(settings.voice.confidence_threshold, 0.5);
        assert_eq!(settings.display.theme, Theme::System);
    }

    #[test]
    fn test_env_override_locale() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_souschef_env();

        set_env("SOUSCHEF_LOCALE", "en-US");
        let settings = CookingModeSettings::default().with_env_overrides();

        assert_eq!(settings.voice.locale, "en-US");
        assert!(settings.voice.enabled); // Not overridden

        clear_souschef_env();
    }

    #[test]
    fn test_env_override_booleans() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_souschef_env();

        set_env("SOUSCHEF_AUTO_ADVANCE", "off");
        set_env("SOUSCHEF_VOICE", "0");
        let settings = CookingModeSettings::default().with_env_overrides();

        assert!(!settings.behavior.auto_advance_steps);
        assert!(!settings.voice.enabled);

        clear_souschef_env();
    }

    #[test]
    fn test_env_override_invalid_bool_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_souschef_env();

        set_env("SOUSCHEF_AUTO_ADVANCE", "maybe");
        let settings = CookingModeSettings::default().with_env_overrides();

        // Unparseable value should not override the default
        assert!(settings.behavior.auto_advance_steps);

        clear_souschef_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [behavior
            auto_advance_steps = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = CookingModeSettings::load(temp_file.path());

        assert!(result.is_err());
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = CookingModeSettings::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("souschef"));
        assert!(path_str.ends_with("settings.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_souschef_settings_12345.toml");
        let settings = CookingModeSettings::load_or_default(missing_path);

        assert_eq!(settings, CookingModeSettings::default());
    }

    #[test]
    #[should_panic(expected = "Failed to load settings")]
    fn test_load_or_default_panics_on_invalid_toml() {
        let invalid_toml = r#"
            [voice
            locale = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        CookingModeSettings::load_or_default(temp_file.path());
    }

    #[test]
    fn test_parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("banana"), None);
    }
}
