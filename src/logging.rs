// File logger with an explicit init/flush lifecycle

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    sync::Arc,
};

/// Handle to the process-wide log sink. Created once at startup; call
/// `flush` before exit so buffered lines reach the file.
pub struct LogHandle {
    sink: Arc<File>,
}

impl LogHandle {
    pub fn flush(&self) {
        let _ = (&*self.sink).flush();
    }
}

/// Install a subscriber writing plain-text lines (timestamp, level,
/// message) to the given file. Replaces ad-hoc global logging setup
/// with an explicit lifecycle owned by `main`.
pub fn init(path: &Path) -> Result<LogHandle, io::Error> {
    let sink = Arc::new(File::create(path)?);

    tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .init();

    Ok(LogHandle { sink })
}
