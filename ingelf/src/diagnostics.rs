/*!
Self-diagnostics for the GELF input.

Diagnostic events are written to `stderr` as CLEF-formatted JSON, so they can be
told apart from the events written to `stdout`.
*/

use std::{
    fmt::Display,
    sync::{
        mpsc,
        Mutex,
        RwLock,
    },
    thread,
    time::Duration,
};

use chrono::{
    DateTime,
    Utc,
};

use serde_json::{
    Map,
    Value,
};

use crate::Error;

/**
Declare a set of counters for the current module.

The counters can be bumped with `increment!(module.counter)`.
*/
macro_rules! metrics {
    ($($metric:ident),+) => {
        #[allow(non_upper_case_globals)]
        pub(crate) mod metrics {
            use std::sync::atomic::{AtomicUsize, Ordering};

            $(
                pub(crate) static $metric: AtomicUsize = AtomicUsize::new(0);
            )+

            /**
            Take the current value of each counter, resetting it to zero.
            */
            pub(crate) fn take() -> Vec<(&'static str, usize)> {
                vec![
                    $(
                        (stringify!($metric), $metric.swap(0, Ordering::Relaxed)),
                    )+
                ]
            }
        }
    };
}

macro_rules! increment {
    ($module:ident . $metric:ident) => {
        $crate::$module::metrics::$metric.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

/**
Diagnostics configuration.
*/
#[derive(Debug, Clone)]
pub struct Config {
    /**
    The minimum level of events to write.
    */
    pub min_level: Level,
    /**
    The interval between reporting counters.

    Counters are only reported at the `Debug` level.
    */
    pub metrics_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_level: Level::Info,
            metrics_interval_ms: 1 * 60 * 1000, // 1 minute
        }
    }
}

lazy_static! {
    static ref MIN_LEVEL: RwLock<Level> = RwLock::new(Level::Info);
    static ref METRICS: Mutex<Option<MetricsReporter>> = Mutex::new(None);
}

struct MetricsReporter {
    stop: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/**
Start diagnostics.

Any previously started diagnostics will be stopped first.
*/
pub fn init(config: Config) {
    if let Err(err) = stop() {
        emit_err(&err, "GELF diagnostics failed to stop");
    }

    if let Ok(mut min_level) = MIN_LEVEL.write() {
        *min_level = config.min_level;
    }

    // Counters are only ever written at the debug level
    if config.min_level > Level::Debug {
        return;
    }

    let interval = Duration::from_millis(config.metrics_interval_ms);
    let (stop, rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || loop {
        match rx.recv_timeout(interval) {
            Err(mpsc::RecvTimeoutError::Timeout) => emit_metrics(),
            // Either a stop signal or the sender was dropped
            _ => break,
        }
    });

    if let Ok(mut metrics) = METRICS.lock() {
        *metrics = Some(MetricsReporter { stop, handle });
    }
}

/**
Stop diagnostics, writing any counters that haven't been reported yet.
*/
pub fn stop() -> Result<(), Error> {
    let reporter = METRICS
        .lock()
        .map_err(|_| anyhow!("diagnostics state is poisoned"))?
        .take();

    if let Some(MetricsReporter { stop, handle }) = reporter {
        let _ = stop.send(());
        handle
            .join()
            .map_err(|_| anyhow!("the metrics reporter panicked"))?;

        emit_metrics();
    }

    Ok(())
}

/**
Write an informational event.
*/
pub fn emit(message_template: &'static str) {
    emit_event(Level::Info, message_template, None, Map::new());
}

/**
Write a debug event with some extra properties.
*/
pub fn emit_debug(
    message_template: &'static str,
    properties: impl IntoIterator<Item = (&'static str, Value)>,
) {
    if !is_enabled(Level::Debug) {
        return;
    }

    let properties = properties
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

    emit_event(Level::Debug, message_template, None, properties);
}

/**
Write an error event.
*/
pub fn emit_err(error: &impl Display, message_template: &'static str) {
    let err_str = format!("{:#}", error);

    emit_event(Level::Error, message_template, Some(&err_str), Map::new());
}

fn emit_metrics() {
    let collected = [
        ("process", crate::process::metrics::take()),
        ("dispatch", crate::dispatch::metrics::take()),
        ("server", crate::server::metrics::take()),
    ];

    let mut properties = Map::new();
    for (module, metrics) in collected.iter() {
        let counters = metrics
            .iter()
            .map(|(name, value)| ((*name).to_owned(), Value::from(*value)))
            .collect::<Map<_, _>>();

        properties.insert((*module).to_owned(), Value::Object(counters));
    }

    emit_event(Level::Debug, "Collected GELF input metrics", None, properties);
}

fn is_enabled(level: Level) -> bool {
    MIN_LEVEL
        .read()
        .map(|min_level| level >= *min_level)
        .unwrap_or(true)
}

#[derive(Serialize)]
struct DiagnosticEvent<'a> {
    #[serde(rename = "@t")]
    timestamp: DateTime<Utc>,

    #[serde(rename = "@l")]
    level: &'static str,

    #[serde(rename = "@mt")]
    message_template: &'static str,

    #[serde(rename = "@x")]
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,

    #[serde(flatten)]
    additional: Map<String, Value>,
}

fn emit_event(
    level: Level,
    message_template: &'static str,
    error: Option<&str>,
    additional: Map<String, Value>,
) {
    if !is_enabled(level) {
        return;
    }

    let evt = DiagnosticEvent {
        timestamp: Utc::now(),
        level: level.as_str(),
        message_template,
        error,
        additional,
    };

    if let Ok(json) = serde_json::to_string(&evt) {
        eprintln!("{}", json);
    }
}
