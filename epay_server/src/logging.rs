//! Log output. `RUST_LOG` controls filtering (default `info`). The format is fixed at start-up by [`LogFormat`].
use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use env_logger::Env;
use log::Record;
use serde_json::json;

use crate::config::LogFormat;

pub fn init_logging(format: LogFormat) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if format == LogFormat::Json {
        builder.format(|buf, record| writeln!(buf, "{}", json_line(record, Utc::now())));
    }
    // Tests may have installed a logger already
    let _ = builder.try_init();
}

/// One log record as a single line of JSON.
pub fn json_line(record: &Record, timestamp: DateTime<Utc>) -> String {
    json!({
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": record.level().to_string(),
        "target": record.target(),
        "message": record.args().to_string(),
    })
    .to_string()
}
