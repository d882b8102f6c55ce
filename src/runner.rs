//! Input runner feeding text into a queue
//!
//! Reads a file or stdin line by line, hands every line to the queue as a
//! chunk, and waits for the queue to drain once the input ends.

use crate::config::{load_secret, Config, Secret};
use crate::processor::HttpUrlProcessor;
use crate::queue::{FetchJobQueue, QueueOptions, StdioSink};
use crate::Result;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Drives a [`FetchJobQueue`] from a text source
pub struct Runner {
    queue: FetchJobQueue,
}

impl Runner {
    pub fn new(queue: FetchJobQueue) -> Self {
        Self { queue }
    }

    /// Builds a stdio-backed runner from `config`, reading the secret from
    /// the environment
    ///
    /// # Returns
    ///
    /// * `Err(BracketFetchError::Config(ConfigError::MissingSecret))` - `SECRET` is unset or blank
    /// * `Err(BracketFetchError::Fetch(_))` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let secret = load_secret()?;
        Self::with_secret(config, secret)
    }

    /// Builds a stdio-backed runner from `config` with an explicit secret
    pub fn with_secret(config: &Config, secret: Secret) -> Result<Self> {
        let processor = HttpUrlProcessor::new(&config.http, secret)?;
        let queue = FetchJobQueue::with_options(
            Arc::new(processor),
            Arc::new(StdioSink),
            QueueOptions::from(&config.queue),
        );
        Ok(Self::new(queue))
    }

    pub fn queue(&self) -> &FetchJobQueue {
        &self.queue
    }

    /// Processes every bracketed URL in the file at `path`
    pub async fn run_file(&self, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        tracing::info!("Reading {}", path.display());

        let lines = self.pump(file, false).await?;
        tracing::info!("Finished {} ({} lines)", path.display(), lines);
        Ok(())
    }

    /// Processes stdin
    ///
    /// When stdin is a terminal, every entered line is drained before the next
    /// prompt so results show up as the user types. Piped input is drained once
    /// at the end.
    pub async fn run_stdin(&self) -> Result<()> {
        let interactive = std::io::stdin().is_terminal();
        if interactive {
            eprintln!("Enter text and press Enter to run (Ctrl-D to finish):");
        }

        self.pump(tokio::io::stdin(), interactive).await?;
        Ok(())
    }

    /// Feeds `reader` into the queue line by line
    ///
    /// Line endings are kept so tokens on adjacent lines never merge. Invalid
    /// UTF-8 is replaced rather than rejected.
    ///
    /// # Returns
    ///
    /// The number of lines read
    pub async fn pump<R>(&self, reader: R, drain_each_line: bool) -> Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut lines = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            lines += 1;

            self.queue.handle_chunk(&String::from_utf8_lossy(&buf));

            if drain_each_line {
                self.queue.wait_until_drained().await;
                eprintln!("Done.");
            }
        }

        self.queue.wait_until_drained().await;
        Ok(lines)
    }
}
