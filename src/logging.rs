use serde_json::{Map, Number, Value};
use std::{cmp::Ordering, rc::Rc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
                LogLevel::Error => 3,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Destination for rendered log lines.
pub trait LogSink {
    fn write(&self, level: LogLevel, line: &str);
}

pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, _level: LogLevel, line: &str) {
        println!("{line}");
    }
}

/// Levelled structured event log. Each event is one JSON object per line.
#[derive(Clone)]
pub struct Logger {
    level: LogLevel,
    sink: Rc<dyn LogSink>,
}

impl Logger {
    pub fn new(level: LogLevel, sink: Rc<dyn LogSink>) -> Self {
        Self { level, sink }
    }

    pub fn event(&self, level: LogLevel, event: &str, fields: Value) {
        if level < self.level {
            return;
        }

        let mut payload = Map::new();
        payload.insert("ts".to_string(), Value::Number(Number::from(now_unix_seconds())));
        payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
        payload.insert("event".to_string(), Value::String(event.to_string()));

        if let Value::Object(extra) = fields {
            for (key, value) in extra {
                payload.insert(key, value);
            }
        }

        self.sink.write(level, &Value::Object(payload).to_string());
    }
}

#[cfg(target_arch = "wasm32")]
fn now_unix_seconds() -> u64 {
    (js_sys::Date::now() / 1000.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}
