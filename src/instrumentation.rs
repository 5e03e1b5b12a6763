//! Build timing and log setup
//!
//! `Instrumentation` collects named timing spans for one load call. It is
//! switched on through the `DEBUG` environment variable, the same switch the
//! rest of the Tailwind tooling honours, and reports when dropped.

use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Namespace matched against `DEBUG`
const DEBUG_NAMESPACE: &str = "tailwindcss";

/// Whether a `DEBUG` value enables instrumentation
///
/// `1`, `true` and `*` enable it, `0` and `false` disable it. Otherwise the
/// value is a comma separated list of namespaces, where `-tailwindcss` wins
/// over `tailwindcss`.
pub fn debug_enabled(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };

    match value.trim() {
        "1" | "true" | "*" => return true,
        "" | "0" | "false" => return false,
        _ => {}
    }

    let namespaces: Vec<&str> = value
        .split(',')
        .map(|d| d.split(':').next().unwrap_or_default().trim())
        .collect();

    if namespaces.contains(&"-tailwindcss") {
        return false;
    }
    namespaces.contains(&DEBUG_NAMESPACE)
}

/// One finished or running span
#[derive(Debug, Clone)]
pub struct Timing {
    pub label: String,
    pub depth: usize,
    pub elapsed: Option<Duration>,
}

/// Timing spans for a single compile
#[derive(Debug)]
pub struct Instrumentation {
    enabled: bool,
    open: Vec<(usize, Instant)>,
    timings: Vec<Timing>,
}

impl Instrumentation {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            open: Vec::new(),
            timings: Vec::new(),
        }
    }

    /// Enabled according to the `DEBUG` environment variable
    pub fn from_env() -> Self {
        let value = std::env::var("DEBUG").ok();
        Self::new(debug_enabled(value.as_deref()))
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open a span; spans nest until the matching `end`
    pub fn start(&mut self, label: &str) {
        if !self.enabled {
            return;
        }
        self.timings.push(Timing {
            label: label.to_string(),
            depth: self.open.len(),
            elapsed: None,
        });
        self.open.push((self.timings.len() - 1, Instant::now()));
    }

    /// Close the innermost open span called `label`
    pub fn end(&mut self, label: &str) {
        if !self.enabled {
            return;
        }
        let Some(pos) = self
            .open
            .iter()
            .rposition(|(idx, _)| self.timings[*idx].label == label)
        else {
            debug!("Instrumentation span {:?} ended without start", label);
            return;
        };

        let (idx, started) = self.open.remove(pos);
        let elapsed = started.elapsed();
        self.timings[idx].elapsed = Some(elapsed);
        debug!("{} took {:.2?}", label, elapsed);
    }

    /// Spans in the order they were started
    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    /// Indented, human readable summary of all spans
    pub fn report(&self) -> String {
        let mut out = String::new();
        for timing in &self.timings {
            let elapsed = match timing.elapsed {
                Some(d) => format!("{:>10.2?}", d),
                None => format!("{:>10}", "running"),
            };
            let _ = writeln!(
                out,
                "[{}] {}{}",
                elapsed,
                "  ".repeat(timing.depth),
                timing.label
            );
        }
        out
    }
}

impl Drop for Instrumentation {
    fn drop(&mut self) {
        if self.enabled && !self.timings.is_empty() {
            debug!("Timings:\n{}", self.report());
        }
    }
}

/// Log output format for `init_tracing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install a global subscriber for hosts embedding the plugin
///
/// 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` overrides the level when set.
/// Returns false if a subscriber was already installed.
pub fn init_tracing(verbosity: u8, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("windcache=warn"),
        1 => EnvFilter::new("windcache=info"),
        _ => EnvFilter::new("windcache=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Text => builder.without_time().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
