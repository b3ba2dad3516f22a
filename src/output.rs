//! Output selection for the simulator binary.
//!
//! Outputs are chosen with a short spec string:
//!
//! | Spec | Dispatcher |
//! |---|---|
//! | `console` | [`ConsoleDispatcher`] |
//! | `file:<dir>` | [`FileDispatcher`] writing `<dir>/<label>.txt` |
//! | `tcp:<port>` | [`StreamSocketDispatcher`] serving one client |
//! | `websocket:<port>` | [`BroadcastSocketDispatcher`] serving every client |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use cardio_sdk::{
    BroadcastSocketDispatcher, ConsoleDispatcher, Dispatcher, FileDispatcher,
    StreamSocketDispatcher,
};
use serde::Deserialize;

/// Where readings go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputSpec {
    /// Print to stdout.
    #[default]
    Console,
    /// Append to one file per label under a directory.
    File(PathBuf),
    /// Stream to the first TCP client on a port.
    Tcp(u16),
    /// Broadcast to all WebSocket clients on a port.
    WebSocket(u16),
}

impl OutputSpec {
    /// Build the dispatcher this spec describes.
    ///
    /// Socket outputs bind here; a port that cannot be bound is an error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cardio_sdk::Dispatcher;
    /// use cardio_sim::OutputSpec;
    ///
    /// tokio_test::block_on(async {
    ///     let spec: OutputSpec = "console".parse().unwrap();
    ///     let dispatcher = spec.into_dispatcher().await.unwrap();
    ///     dispatcher.output(1, 1_700_000_000_000, "Saturation", "98%");
    /// });
    /// ```
    pub async fn into_dispatcher(self) -> Result<Arc<dyn Dispatcher>> {
        let dispatcher: Arc<dyn Dispatcher> = match self {
            OutputSpec::Console => Arc::new(ConsoleDispatcher::new()),
            OutputSpec::File(dir) => Arc::new(FileDispatcher::new(dir)),
            OutputSpec::Tcp(port) => Arc::new(
                StreamSocketDispatcher::bind(port)
                    .await
                    .with_context(|| format!("starting TCP output on port {}", port))?,
            ),
            OutputSpec::WebSocket(port) => Arc::new(
                BroadcastSocketDispatcher::bind(port)
                    .await
                    .with_context(|| format!("starting WebSocket output on port {}", port))?,
            ),
        };
        Ok(dispatcher)
    }
}

fn parse_port(kind: &str, value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|_| anyhow!("Invalid port for {} output: {:?}", kind, value))
}

impl FromStr for OutputSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "console" {
            return Ok(OutputSpec::Console);
        }

        let Some((kind, value)) = s.split_once(':') else {
            bail!(
                "Unknown output {:?}: expected console, file:<dir>, tcp:<port> or websocket:<port>",
                s
            );
        };

        match kind {
            "file" if !value.is_empty() => Ok(OutputSpec::File(PathBuf::from(value))),
            "file" => bail!("File output needs a directory, e.g. file:./output"),
            "tcp" => Ok(OutputSpec::Tcp(parse_port(kind, value)?)),
            "websocket" => Ok(OutputSpec::WebSocket(parse_port(kind, value)?)),
            other => bail!("Unknown output kind {:?}", other),
        }
    }
}

impl TryFrom<String> for OutputSpec {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSpec::Console => write!(f, "console"),
            OutputSpec::File(dir) => write!(f, "file:{}", dir.display()),
            OutputSpec::Tcp(port) => write!(f, "tcp:{}", port),
            OutputSpec::WebSocket(port) => write!(f, "websocket:{}", port),
        }
    }
}
