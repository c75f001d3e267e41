use crate::logging::LogLevel;

pub const DEFAULT_THEME_STORAGE_KEY: &str = "theme";
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const DEFAULT_SPY_MARGIN: f64 = 100.0;
const DEFAULT_HEADER_SHADOW_THRESHOLD: f64 = 50.0;
const DEFAULT_ANCHOR_OFFSET: f64 = 80.0;
const DEFAULT_SCROLL_TOP_THRESHOLD: f64 = 300.0;
const DEFAULT_TYPE_INTERVAL_MS: u32 = 100;
const DEFAULT_DELETE_INTERVAL_MS: u32 = 50;
const DEFAULT_HOLD_FULL_MS: u32 = 2_000;
const DEFAULT_HOLD_EMPTY_MS: u32 = 500;
const DEFAULT_TYPING_START_DELAY_MS: u32 = 1_000;
const DEFAULT_COUNTER_DURATION_MS: u32 = 2_000;
const DEFAULT_COUNTER_STEPS: u32 = 60;

const SPY_MARGIN_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const HEADER_SHADOW_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const ANCHOR_OFFSET_BOUNDS: (f64, f64) = (0.0, 500.0);
const SCROLL_TOP_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const COUNTER_DURATION_MS_BOUNDS: (u32, u32) = (100, 30_000);
const COUNTER_STEPS_BOUNDS: (u32, u32) = (1, 600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingTimings {
    pub type_interval_ms: u32,
    pub delete_interval_ms: u32,
    pub hold_full_ms: u32,
    pub hold_empty_ms: u32,
    pub start_delay_ms: u32,
}

impl Default for TypingTimings {
    fn default() -> Self {
        Self {
            type_interval_ms: DEFAULT_TYPE_INTERVAL_MS,
            delete_interval_ms: DEFAULT_DELETE_INTERVAL_MS,
            hold_full_ms: DEFAULT_HOLD_FULL_MS,
            hold_empty_ms: DEFAULT_HOLD_EMPTY_MS,
            start_delay_ms: DEFAULT_TYPING_START_DELAY_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub theme_storage_key: String,
    pub spy_margin: f64,
    pub header_shadow_threshold: f64,
    pub anchor_offset: f64,
    pub scroll_top_threshold: f64,
    pub typing: TypingTimings,
    pub counter_duration_ms: u32,
    pub counter_steps: u32,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_storage_key: DEFAULT_THEME_STORAGE_KEY.to_string(),
            spy_margin: DEFAULT_SPY_MARGIN,
            header_shadow_threshold: DEFAULT_HEADER_SHADOW_THRESHOLD,
            anchor_offset: DEFAULT_ANCHOR_OFFSET,
            scroll_top_threshold: DEFAULT_SCROLL_TOP_THRESHOLD,
            typing: TypingTimings::default(),
            counter_duration_ms: DEFAULT_COUNTER_DURATION_MS,
            counter_steps: DEFAULT_COUNTER_STEPS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl Config {
    /// Builds a config from page attributes such as `data-anchor-offset`.
    /// Missing, unparsable or out-of-range values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            spy_margin: parse_f64_with_bounds(
                &lookup,
                "data-spy-margin",
                defaults.spy_margin,
                SPY_MARGIN_BOUNDS,
            ),
            header_shadow_threshold: parse_f64_with_bounds(
                &lookup,
                "data-header-shadow-threshold",
                defaults.header_shadow_threshold,
                HEADER_SHADOW_THRESHOLD_BOUNDS,
            ),
            anchor_offset: parse_f64_with_bounds(
                &lookup,
                "data-anchor-offset",
                defaults.anchor_offset,
                ANCHOR_OFFSET_BOUNDS,
            ),
            scroll_top_threshold: parse_f64_with_bounds(
                &lookup,
                "data-scroll-top-threshold",
                defaults.scroll_top_threshold,
                SCROLL_TOP_THRESHOLD_BOUNDS,
            ),
            counter_duration_ms: parse_u32_with_bounds(
                &lookup,
                "data-counter-duration-ms",
                defaults.counter_duration_ms,
                COUNTER_DURATION_MS_BOUNDS,
            ),
            counter_steps: parse_u32_with_bounds(
                &lookup,
                "data-counter-steps",
                defaults.counter_steps,
                COUNTER_STEPS_BOUNDS,
            ),
            log_level: lookup("data-log-level")
                .and_then(|value| LogLevel::parse(&value))
                .unwrap_or(defaults.log_level),
            ..defaults
        }
    }

    pub fn counter_interval_ms(&self) -> u32 {
        (self.counter_duration_ms / self.counter_steps.max(1)).max(1)
    }
}

fn parse_f64_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: f64,
    bounds: (f64, f64),
) -> f64 {
    lookup(name)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_u32_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
    bounds: (u32, u32),
) -> u32 {
    lookup(name)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
