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
use crate::error::SinkError;
use chrono::DateTime;
use chrono::TimeZone;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

/// One measurement pass: tracked ontology size and best classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
  pub size: u64,
  pub min_time_ms: u64,
}

impl BenchmarkRecord {
  /// `<size>\t<ms>\n`
  pub fn to_line(&self) -> String {
    format!("{}\t{}\n", self.size, self.min_time_ms)
  }
}

/// `<tag>_<reasoner>_<timestamp>`
pub fn output_path<Tz: TimeZone>(tag: &str, reasoner: &str, started: &DateTime<Tz>) -> PathBuf
where
  Tz::Offset: std::fmt::Display,
{
  PathBuf::from(format!(
    "{tag}_{reasoner}_{}",
    started.format("%Y%m%dT%H%M%S")
  ))
}

/// Append-only, flushed-per-record result log.
pub struct ResultSink<W> {
  writer: Option<W>,
}

impl ResultSink<File> {
  pub async fn create(path: &Path) -> Result<Self, SinkError> {
    let file = File::create(path).await.map_err(|source| SinkError::Create {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(ResultSink::new(file))
  }
}

impl<W: AsyncWrite + Unpin> ResultSink<W> {
  pub fn new(writer: W) -> Self {
    ResultSink {
      writer: Some(writer),
    }
  }

  /// Writes one record and flushes it so an interrupted run keeps every
  /// finished iteration.
  pub async fn append(&mut self, record: &BenchmarkRecord) -> Result<(), SinkError> {
    let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
    writer
      .write_all(record.to_line().as_bytes())
      .await
      .map_err(SinkError::Write)?;
    writer.flush().await.map_err(SinkError::Write)
  }

  /// Flushes and releases the writer. Closing twice is a no-op.
  pub async fn close(&mut self) -> Result<(), SinkError> {
    if let Some(mut writer) = self.writer.take() {
      writer.shutdown().await.map_err(SinkError::Write)?;
    }
    Ok(())
  }
}
