//! Runtime settings read from the environment.

use tracing::warn;

use crate::maze::DEFAULT_MAX_ATTEMPTS;

const DEFAULT_RENDER_FPS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Frames drawn per second by the terminal host (`LIGHTNING_FPS`).
    pub render_fps: u64,
    /// Fixed maze seed (`LIGHTNING_SEED`); entropy when unset.
    pub seed: Option<u64>,
    /// Retry cap for maze generation (`LIGHTNING_MAX_ATTEMPTS`).
    pub max_attempts: usize,
    /// Advance this many steps without a terminal (`LIGHTNING_HEADLESS`).
    pub headless_frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            headless_frames: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Values that do not
    /// parse, or are zero where zero makes no sense, keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            render_fps: positive(&lookup, "LIGHTNING_FPS").unwrap_or(defaults.render_fps),
            seed: parsed(&lookup, "LIGHTNING_SEED"),
            max_attempts: positive(&lookup, "LIGHTNING_MAX_ATTEMPTS")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_attempts),
            headless_frames: positive(&lookup, "LIGHTNING_HEADLESS"),
        }
    }
}

fn parsed(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(key, value = %raw, %err, "ignoring invalid setting");
            None
        }
    }
}

fn positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let value = parsed(lookup, key)?;
    if value == 0 {
        warn!(key, "ignoring zero setting");
        return None;
    }
    Some(value)
}
