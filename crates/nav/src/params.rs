use serde_json::{Map, Value};

/// Loosely-typed planner/engine parameters.
///
/// The map mirrors whatever the client last sent through `set_params`; every
/// read goes through a typed getter that falls back to the caller's default
/// when the entry is missing, non-numeric, or fails a positivity requirement.
/// Bad parameters never abort a session.
///
/// `tick` is engine-owned and deliberately kept out of the client map.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub tick: u64,
    map: Map<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a client patch over the current values (last write wins per key).
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            self.map.insert(k.clone(), v.clone());
        }
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }

    /// Finite numeric value, else `default`.
    pub fn f64(&self, key: &str, default: f64) -> f64 {
        match self.map.get(key).and_then(Value::as_f64) {
            Some(v) if v.is_finite() => v,
            _ => default,
        }
    }

    /// Finite, strictly positive numeric value, else `default`.
    pub fn f64_pos(&self, key: &str, default: f64) -> f64 {
        let v = self.f64(key, default);
        if v > 0.0 {
            v
        } else {
            default
        }
    }

    /// Non-negative integer value, else `default`. Float-typed numbers
    /// truncate, matching the tolerant read the rest of the map gets.
    pub fn usize(&self, key: &str, default: usize) -> usize {
        match self.map.get(key) {
            Some(v) => match v.as_u64() {
                Some(n) => n as usize,
                None => match v.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => f as usize,
                    _ => default,
                },
            },
            None => default,
        }
    }

    /// Strictly positive integer value, else `default`.
    pub fn usize_pos(&self, key: &str, default: usize) -> usize {
        match self.usize(key, default) {
            0 => default,
            v => v,
        }
    }

    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.map.get(key).and_then(Value::as_bool).unwrap_or(default)
    }
}
