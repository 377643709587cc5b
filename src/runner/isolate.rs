//! Isolated execution units
//!
//! An isolated unit runs one test file with no shared memory; it talks
//! back over a one-directional message stream and an exit signal. The
//! `Spawner` trait keeps the orchestration algorithm independent of the
//! backing (subprocesses by default, in-process tasks in tests).

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::models::{SuiteMessage, ISOLATE_ENV};

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("failed to start isolated unit for {}: {source}", .file.display())]
    Launch {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("isolated unit for {} exited abnormally ({status})", .file.display())]
    Crashed { file: PathBuf, status: String },
}

/// A live isolated unit: its suite-message stream and its exit signal.
/// Messages arrive in emission order; the exit resolves once, after the
/// stream ends.
pub struct UnitHandle {
    pub messages: mpsc::Receiver<SuiteMessage>,
    pub exit: oneshot::Receiver<Result<(), UnitError>>,
}

pub trait Spawner: Send + Sync {
    fn spawn(&self, file: &Path) -> Result<UnitHandle, UnitError>;
}

/// Default backend: each test file is an executable run as a subprocess
/// with the isolate marker in its environment. Protocol lines on its
/// stdout become messages; everything else is forwarded verbatim as user
/// output.
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, file: &Path) -> Result<UnitHandle, UnitError> {
        let mut child = Command::new(file)
            .env(ISOLATE_ENV, "1")
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| UnitError::Launch {
                file: file.to_path_buf(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| UnitError::Launch {
            file: file.to_path_buf(),
            source: std::io::Error::other("stdout pipe unavailable"),
        })?;

        let (message_tx, messages) = mpsc::channel(16);
        let (exit_tx, exit) = oneshot::channel();
        let file = file.to_path_buf();

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match SuiteMessage::decode(&line) {
                    Some(Ok(message)) => {
                        if message_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(error)) => {
                        warn!(
                            "discarding malformed message from {}: {error}",
                            file.display()
                        );
                    }
                    None => println!("{line}"),
                }
            }
            drop(message_tx);

            let outcome = match child.wait().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(UnitError::Crashed {
                    file,
                    status: status.to_string(),
                }),
                Err(source) => Err(UnitError::Launch { file, source }),
            };
            let _ = exit_tx.send(outcome);
        });

        Ok(UnitHandle { messages, exit })
    }
}
