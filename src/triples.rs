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
use crate::error::InputError;
use crate::expression::Triple;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;

/// Outcome of pulling one line from the triples file.
#[derive(Debug, PartialEq, Eq)]
pub enum NextTriple {
  Triple(Triple),
  /// A line with fewer than three usable fields, or one that is not valid
  /// UTF-8 (shown lossily). The line is consumed.
  Malformed { line_no: usize, line: String },
  Exhausted,
}

/// Sequential reader over a tab-separated triples file with one header line.
pub struct TripleSource<R> {
  reader: BufReader<R>,
  buf: Vec<u8>,
  line_no: usize,
}

impl TripleSource<File> {
  /// Opens `path` and reads past the header line.
  pub async fn open(path: &Path) -> Result<Self, InputError> {
    let file = File::open(path).await.map_err(|source| InputError::Open {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_reader(file).await
  }
}

impl<R: AsyncRead + Unpin> TripleSource<R> {
  pub async fn from_reader(reader: R) -> Result<Self, InputError> {
    let mut source = TripleSource {
      reader: BufReader::new(reader),
      buf: Vec::new(),
      line_no: 0,
    };

    if let Some(header) = source.next_line().await? {
      tracing::debug!(header = %header.unwrap_or_else(|lossy| lossy), "Skipped triples header");
    }

    Ok(source)
  }

  /// Reads the next line and parses it. Each line is consumed exactly once.
  pub async fn next_triple(&mut self) -> Result<NextTriple, InputError> {
    let Some(line) = self.next_line().await? else {
      return Ok(NextTriple::Exhausted);
    };

    let parsed = match &line {
      Ok(text) => Triple::parse(text),
      Err(_) => None,
    };

    Ok(match parsed {
      Some(triple) => NextTriple::Triple(triple),
      None => NextTriple::Malformed {
        line_no: self.line_no,
        line: line.unwrap_or_else(|lossy| lossy),
      },
    })
  }

  /// Reads one raw line. Undecodable bytes are not an I/O failure: they
  /// come back as `Err` holding the lossy text.
  async fn next_line(&mut self) -> Result<Option<Result<String, String>>, InputError> {
    self.buf.clear();
    let read = self
      .reader
      .read_until(b'\n', &mut self.buf)
      .await
      .map_err(InputError::Read)?;
    if read == 0 {
      return Ok(None);
    }
    self.line_no += 1;

    let bytes = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    Ok(Some(
      String::from_utf8(bytes.to_vec())
        .map_err(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
    ))
  }
}
