use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Function to set up logging and return the guard
pub fn setup_logging(suffix: Option<String>) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_directory = Path::new("logs");

    // Create the log directory if it doesn't exist
    if !log_directory.exists() {
        fs::create_dir_all(log_directory)?;
    }

    let suffix = suffix.unwrap_or_else(|| {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("{epoch}")
    });

    let log_filename = format!("sim_run_{}.log", suffix);
    let log_file_path = log_directory.join(log_filename);

    let file_appender = match fs::File::create(&log_file_path) {
        Ok(file) => file,
        Err(e) => {
            // Fallback to stderr if file creation fails
            eprintln!("Failed to create log file {:?}: {}", log_file_path, e);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            let subscriber = tracing_subscriber::registry()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
                .with(fmt::Layer::new().with_writer(non_blocking_writer));
            tracing::subscriber::set_global_default(subscriber)?;
            return Ok(guard);
        }
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking_writer)
                .without_time()
                .with_ansi(false), // ANSI colors don't make sense in a file
        )
        .with(fmt::Layer::new().with_writer(std::io::stdout));

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Logging initialized. Log file: {:?}", log_file_path);

    Ok(guard)
}
