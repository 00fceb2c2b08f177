// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Client for the reasoner bridge process.
//!
//! The OWL library and the reasoners live in a child process that answers a
//! line-oriented, tab-separated protocol on stdin/stdout:
//!
//! | request                      | reply            |
//! |------------------------------|------------------|
//! | `LOAD\t<path>`               | `OK`             |
//! | `CREATE\t<factory>`          | `OK`             |
//! | `COUNT\t<axiom type>`        | `OK\t<n>`        |
//! | `ADD\t<axiom>`               | `OK`             |
//! | `CLASSIFY`, `FLUSH`, `SYNC`  | `OK`             |
//! | `QUIT`                       | (none)           |
//!
//! Any request may be answered with `ERR\t<message>`.
use crate::command::CommandArgs;
use crate::error::BridgeError;
use crate::expression::AxiomKind;
use crate::expression::EquivalenceAxiom;
use crate::reasoner::OntologyStore;
use crate::reasoner::Reasoner;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::io::BufWriter;
use tokio::io::Lines;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::Instrument;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// A running bridge session: one ontology, one reasoner.
pub struct ReasonerBridge {
  child: Child,
  stdin: BufWriter<ChildStdin>,
  stdout: Lines<BufReader<ChildStdout>>,
  stderr_task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ReasonerBridge {
  /// Spawns the bridge. The child is killed if the session is dropped
  /// without [`ReasonerBridge::shutdown`].
  pub async fn spawn(bridge: &CommandArgs) -> Result<Self, BridgeError> {
    let mut cmd = Command::new(&bridge.command);
    cmd
      .args(&bridge.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    tracing::debug!(cmd = ?cmd, "Spawning reasoner bridge");
    let mut child = cmd.spawn().map_err(|source| BridgeError::Spawn {
      command: bridge.command.clone(),
      source,
    })?;

    let stdin = child.stdin.take().ok_or(BridgeError::Pipe("stdin"))?;
    let stdout = child.stdout.take().ok_or(BridgeError::Pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(BridgeError::Pipe("stderr"))?;

    let stderr_task = tokio::spawn(
      read_and_log_stderr(stderr).instrument(tracing::info_span!("stderr_handler", target = "bridge")),
    );

    Ok(ReasonerBridge {
      child,
      stdin: BufWriter::new(stdin),
      stdout: BufReader::new(stdout).lines(),
      stderr_task: Some(stderr_task),
    })
  }

  pub async fn load_ontology(&mut self, path: &Path) -> Result<(), BridgeError> {
    self.request(format!("LOAD\t{}", path.display())).await?;
    Ok(())
  }

  /// Instantiates the reasoner from a factory reference. A rejection here
  /// means the factory cannot be resolved.
  pub async fn create_reasoner(&mut self, factory: &str) -> Result<(), BridgeError> {
    match self.request(format!("CREATE\t{factory}")).await {
      Ok(_) => Ok(()),
      Err(BridgeError::Rejected { message, .. }) => Err(BridgeError::Factory {
        factory: factory.to_string(),
        message,
      }),
      Err(e) => Err(e),
    }
  }

  /// Ends the session and waits for the child to exit.
  pub async fn shutdown(mut self) {
    if let Err(e) = self.send("QUIT").await {
      tracing::debug!(error = %e, "Bridge did not accept QUIT");
    }
    drop(self.stdin);

    match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
      Ok(Ok(status)) if !status.success() => {
        tracing::warn!(code = ?status.code(), "Reasoner bridge exited with failure");
      }
      Ok(Ok(_)) => {}
      Ok(Err(e)) => tracing::warn!(error = %e, "Failed to wait for reasoner bridge"),
      Err(_) => {
        tracing::warn!("Reasoner bridge did not exit in time, killing it");
        let _ = self.child.kill().await;
      }
    }

    if let Some(handle) = self.stderr_task.take() {
      match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Failed to read bridge stderr"),
        Err(e) => tracing::warn!(error = %e, "Bridge stderr task failed"),
      }
    }
  }

  async fn send(&mut self, request: &str) -> Result<(), BridgeError> {
    self
      .write_line(request)
      .await
      .map_err(|source| BridgeError::Send {
        request: request.to_string(),
        source,
      })
  }

  async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
    self.stdin.write_all(line.as_bytes()).await?;
    self.stdin.write_all(b"\n").await?;
    self.stdin.flush().await
  }

  /// Sends one request and waits for its reply, returning the reply payload.
  async fn request(&mut self, request: String) -> Result<Option<String>, BridgeError> {
    self.send(&request).await?;

    let reply = self
      .stdout
      .next_line()
      .await
      .map_err(|source| BridgeError::Receive {
        request: request.clone(),
        source,
      })?
      .ok_or_else(|| BridgeError::Closed {
        request: request.clone(),
      })?;

    parse_reply(&request, &reply)
  }
}

impl OntologyStore for ReasonerBridge {
  type Error = BridgeError;

  async fn axiom_count(&mut self, kind: AxiomKind) -> Result<u64, BridgeError> {
    let request = format!("COUNT\t{}", kind.as_str());
    let payload = self.request(request.clone()).await?.unwrap_or_default();
    payload
      .trim()
      .parse::<u64>()
      .map_err(|_| BridgeError::MalformedReply {
        request,
        reply: payload,
      })
  }

  async fn add_axiom(&mut self, axiom: &EquivalenceAxiom) -> Result<(), BridgeError> {
    self.request(format!("ADD\t{axiom}")).await?;
    Ok(())
  }
}

impl Reasoner for ReasonerBridge {
  type Error = BridgeError;

  async fn precompute_inferences(&mut self) -> Result<(), BridgeError> {
    self.request("CLASSIFY".to_string()).await?;
    Ok(())
  }

  async fn flush(&mut self) -> Result<(), BridgeError> {
    self.request("FLUSH".to_string()).await?;
    Ok(())
  }

  async fn synchronize(&mut self) -> Result<(), BridgeError> {
    self.request("SYNC".to_string()).await?;
    Ok(())
  }
}

/// Splits `OK`, `OK\t<payload>` and `ERR\t<message>` replies.
fn parse_reply(request: &str, reply: &str) -> Result<Option<String>, BridgeError> {
  let (status, payload) = match reply.split_once('\t') {
    Some((status, payload)) => (status, Some(payload)),
    None => (reply.trim_end(), None),
  };

  match status {
    "OK" => Ok(payload.map(str::to_string)),
    "ERR" => Err(BridgeError::Rejected {
      request: request.to_string(),
      message: payload.unwrap_or("unspecified error").to_string(),
    }),
    _ => Err(BridgeError::MalformedReply {
      request: request.to_string(),
      reply: reply.to_string(),
    }),
  }
}

/// Reads lines from the bridge's stderr and logs them.
async fn read_and_log_stderr<R: AsyncRead + Unpin>(stream: R) -> std::io::Result<()> {
  let mut reader = BufReader::new(stream).lines();

  while let Some(line) = reader.next_line().await? {
    tracing::warn!(target: "bridge", "{}", line);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn parses_replies() {
    assert_eq!(parse_reply("FLUSH", "OK").unwrap(), None);
    assert_eq!(
      parse_reply("COUNT\tSubClassOf", "OK\t42").unwrap(),
      Some("42".to_string())
    );
    assert!(matches!(
      parse_reply("CREATE\tx", "ERR\tno such class"),
      Err(BridgeError::Rejected { message, .. }) if message == "no such class"
    ));
    assert!(matches!(
      parse_reply("FLUSH", "done"),
      Err(BridgeError::MalformedReply { .. })
    ));
  }

  #[cfg(unix)]
  fn fixture_bridge(added_log: &Path) -> CommandArgs {
    CommandArgs {
      command: PathBuf::from("sh"),
      args: vec![
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fake_bridge.sh").to_string(),
        added_log.display().to_string(),
      ],
    }
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn talks_to_a_bridge_process() {
    let temp = tempfile::tempdir().unwrap();
    let added_log = temp.path().join("added.txt");

    let mut bridge = ReasonerBridge::spawn(&fixture_bridge(&added_log)).await.unwrap();
    bridge.load_ontology(Path::new("snomed.owl")).await.unwrap();
    bridge.create_reasoner("org.example.Factory").await.unwrap();

    assert_eq!(bridge.axiom_count(AxiomKind::SubClassOf).await.unwrap(), 60);
    assert_eq!(bridge.axiom_count(AxiomKind::EquivalentClasses).await.unwrap(), 40);

    bridge.precompute_inferences().await.unwrap();
    bridge.flush().await.unwrap();
    bridge.synchronize().await.unwrap();
    bridge.shutdown().await;
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn unknown_factory_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let mut bridge = ReasonerBridge::spawn(&fixture_bridge(&temp.path().join("added.txt")))
      .await
      .unwrap();

    let err = bridge.create_reasoner("no.such.Factory").await.unwrap_err();
    assert!(matches!(err, BridgeError::Factory { factory, .. } if factory == "no.such.Factory"));
    bridge.shutdown().await;
  }

  #[tokio::test]
  async fn missing_executable_fails_to_spawn() {
    let bridge = CommandArgs {
      command: PathBuf::from("/nonexistent/owl-bridge"),
      args: vec![],
    };
    assert!(matches!(
      ReasonerBridge::spawn(&bridge).await,
      Err(BridgeError::Spawn { .. })
    ));
  }
}
