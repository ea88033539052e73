//! Append-only JSONL file shared by every Inkleaf process on the machine.

use crate::jsonl::JsonlLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// `~/.inkleaf/logs/inkleaf.jsonl`, under the temp dir when there is no home.
pub fn default_log_path() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    base.join(".inkleaf").join("logs").join("inkleaf.jsonl")
}

/// Cloneable handle to a file opened in append mode.
///
/// Writes are unbuffered so each line lands in a single `write(2)`, which
/// keeps lines from concurrent processes from interleaving.
#[derive(Clone)]
pub struct AppendFile {
    file: Arc<Mutex<File>>,
}

impl AppendFile {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl Write for AppendFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for AppendFile {
    type Writer = AppendFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the file subscriber. Returns false when the file cannot be
/// opened so the caller can fall back to stderr.
pub(crate) fn install(config: &LogConfig) -> bool {
    let path = config.log_path.clone().unwrap_or_else(default_log_path);
    let file = match AppendFile::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("inkleaf: cannot open log file {}: {e}", path.display());
            return false;
        }
    };

    let to_file = JsonlLayer::new(config.service_name.as_str(), file, config.mode)
        .with_filter(config.filter());
    let to_stderr = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    if tracing_subscriber::registry()
        .with(to_file)
        .with(to_stderr)
        .try_init()
        .is_ok()
    {
        tracing::debug!(path = %path.display(), service = %config.service_name, "file logging ready");
    }
    true
}
