//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::pagination::ItemStream;
use futures::StreamExt;
use serde_json::{json, Value};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { source, max_items } => self.fetch(source, *max_items).await,
            Commands::Validate { source } => self.validate(source),
        }
    }

    /// Fetch every record, cancelling the traversal on Ctrl-C
    async fn fetch(&self, source: &Path, max_items: Option<usize>) -> Result<()> {
        let config = SourceConfig::from_file(source)?;
        let handler = config.build_handler()?;

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));
        let started = Instant::now();

        let mut out = BufWriter::new(io::stdout());
        let result = write_items(
            handler.get_all_items(cancel),
            &mut out,
            self.cli.format,
            max_items,
        )
        .await;
        interrupt.abort();

        let written = result?;
        info!(
            records = written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetch complete"
        );
        Ok(())
    }

    /// Validate a source definition
    fn validate(&self, source: &Path) -> Result<()> {
        let config = SourceConfig::from_file(source)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Source '{}' is valid with {} pagination",
                    source.display(),
                    config.pagination.kind()
                )
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted, cancelling traversal");
        cancel.cancel();
    }
}

/// Write records to `out` until the stream ends or `max_items` is reached
///
/// Returns the number of records written. Output is flushed even when the
/// stream ends with an error.
pub async fn write_items<W: Write>(
    mut items: ItemStream<'_, Value>,
    out: &mut W,
    format: OutputFormat,
    max_items: Option<usize>,
) -> Result<usize> {
    let mut written = 0;

    while max_items.map_or(true, |max| written < max) {
        let Some(item) = items.next().await else {
            break;
        };

        let line = match item {
            Ok(item) => match format {
                OutputFormat::Json => serde_json::to_string(&item)?,
                OutputFormat::Pretty => serde_json::to_string_pretty(&item)?,
            },
            Err(e) => {
                out.flush()?;
                return Err(e);
            }
        };

        writeln!(out, "{line}")?;
        written += 1;
    }

    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use clap::Parser;
    use futures::stream;
    use pretty_assertions::assert_eq;

    fn items(values: Vec<Result<Value>>) -> ItemStream<'static, Value> {
        Box::pin(stream::iter(values))
    }

    #[test]
    fn test_parse_fetch_command() {
        let cli = Cli::try_parse_from([
            "pagewalk",
            "fetch",
            "--source",
            "albums.yaml",
            "--max-items",
            "10",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Fetch { source, max_items } => {
                assert_eq!(source, Path::new("albums.yaml"));
                assert_eq!(max_items, Some(10));
            }
            other => panic!("Expected Fetch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_source() {
        assert!(Cli::try_parse_from(["pagewalk", "validate"]).is_err());
    }

    #[tokio::test]
    async fn test_write_items_as_json_lines() {
        let mut out = Vec::new();
        let written = write_items(
            items(vec![Ok(json!({"id": 1})), Ok(json!({"id": 2}))]),
            &mut out,
            OutputFormat::Json,
            None,
        )
        .await
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"id\":1}\n{\"id\":2}\n");
    }

    #[tokio::test]
    async fn test_write_items_stops_at_max() {
        let mut out = Vec::new();
        let written = write_items(
            items(vec![Ok(json!(1)), Ok(json!(2)), Ok(json!(3))]),
            &mut out,
            OutputFormat::Json,
            Some(2),
        )
        .await
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n");
    }

    #[tokio::test]
    async fn test_write_items_keeps_output_before_error() {
        let mut out = Vec::new();
        let err = write_items(
            items(vec![Ok(json!("a")), Err(Error::Cancelled)]),
            &mut out,
            OutputFormat::Json,
            None,
        )
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(String::from_utf8(out).unwrap(), "\"a\"\n");
    }
}
