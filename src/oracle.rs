//! Running the external `oracle` tool.
//!
//! One invocation per request, decoded either from the complete stdout
//! buffer (`Buffered`) or straight from the live pipe while the process runs
//! (`Streamed`). Both share spawn, deadline and exit-status handling so they
//! fail the same way.

use crate::resolve::PhysicalPosition;
use crate::util;
use serde::de::DeserializeOwned;
use std::io::{self, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const STDERR_LOG_BYTES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Implements,
    Referrers,
    Callers,
    Peers,
}

impl QueryKind {
    pub const ALL: [QueryKind; 4] = [
        QueryKind::Implements,
        QueryKind::Referrers,
        QueryKind::Callers,
        QueryKind::Peers,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Implements => "implements",
            QueryKind::Referrers => "referrers",
            QueryKind::Callers => "callers",
            QueryKind::Peers => "peers",
        }
    }

    /// Implements output is bounded; the other kinds can be large.
    pub fn exec_mode(self) -> ExecMode {
        match self {
            QueryKind::Implements => ExecMode::Buffered,
            QueryKind::Referrers | QueryKind::Callers | QueryKind::Peers => ExecMode::Streamed,
        }
    }
}

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to start {program}: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("oracle stdout pipe was not established")]
    PipeSetup,
    #[error("oracle exited with {status}")]
    NoResult { status: ExitStatus, stderr: String },
    #[error("oracle did not finish within {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("waiting on oracle failed: {0}")]
    Wait(#[source] io::Error),
}

/// A fully specified oracle command line.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program: &'a str,
    pub kind: QueryKind,
    pub position: &'a PhysicalPosition,
}

impl Invocation<'_> {
    /// `-format=json -pos=<file>:#<offset> <kind> [<scope>]`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-format=json".to_string(),
            format!("-pos={}", self.position.pos_arg()),
            self.kind.as_str().to_string(),
        ];
        if !self.position.scope.is_empty() {
            args.push(self.position.scope.clone());
        }
        args
    }

    fn spawn(&self) -> Result<Child, OracleError> {
        let args = self.args();
        tracing::debug!(program = self.program, args = ?args, "running oracle");
        Command::new(self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OracleError::ToolUnavailable {
                program: self.program.to_string(),
                source,
            })
    }
}

/// One way of running an invocation to completion and decoding its output.
///
/// Decode failures never surface: a malformed or empty stdout yields
/// `T::default()`.
pub trait Runner {
    fn run<T>(&self, invocation: &Invocation<'_>, timeout: Duration) -> Result<T, OracleError>
    where
        T: DeserializeOwned + Default + Send + 'static;
}

/// Collect all of stdout, then decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buffered;

/// Decode from the pipe while the process is still writing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streamed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Buffered,
    Streamed,
}

impl ExecMode {
    pub fn run<T>(self, invocation: &Invocation<'_>, timeout: Duration) -> Result<T, OracleError>
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        match self {
            ExecMode::Buffered => Buffered.run(invocation, timeout),
            ExecMode::Streamed => Streamed.run(invocation, timeout),
        }
    }
}

impl Runner for Buffered {
    fn run<T>(&self, invocation: &Invocation<'_>, timeout: Duration) -> Result<T, OracleError>
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        let mut child = invocation.spawn()?;
        let Some(stdout) = child.stdout.take() else {
            kill_and_reap(&mut child);
            return Err(OracleError::PipeSetup);
        };
        let stdout = drain(stdout);
        let stderr = child.stderr.take().map(drain);

        let status = wait_with_deadline(&mut child, timeout)?;
        let output = stdout.join().unwrap_or_default();
        check_exit(status, stderr)?;

        Ok(match serde_json::from_slice::<T>(&output) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(kind = invocation.kind.as_str(), "oracle output decode error: {err}");
                T::default()
            }
        })
    }
}

impl Runner for Streamed {
    fn run<T>(&self, invocation: &Invocation<'_>, timeout: Duration) -> Result<T, OracleError>
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        let mut child = invocation.spawn()?;
        let Some(stdout) = child.stdout.take() else {
            kill_and_reap(&mut child);
            return Err(OracleError::PipeSetup);
        };
        let kind = invocation.kind;
        let decoder = thread::spawn(move || decode_stream::<T, _>(stdout, kind));
        let stderr = child.stderr.take().map(drain);

        let status = wait_with_deadline(&mut child, timeout)?;
        let value = decoder.join().unwrap_or_default();
        check_exit(status, stderr)?;
        Ok(value)
    }
}

/// Decode the first JSON value from `reader`, then discard whatever follows
/// so the writer never stalls on a full pipe.
fn decode_stream<T, R>(reader: R, kind: QueryKind) -> T
where
    T: DeserializeOwned + Default,
    R: Read,
{
    let mut reader = BufReader::new(reader);
    let value = match serde_json::Deserializer::from_reader(&mut reader)
        .into_iter::<T>()
        .next()
    {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            tracing::debug!(kind = kind.as_str(), "oracle stream decode error: {err}");
            T::default()
        }
        None => T::default(),
    };
    let _ = io::copy(&mut reader, &mut io::sink());
    value
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, OracleError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(err) => {
                kill_and_reap(child);
                return Err(OracleError::Wait(err));
            }
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                pid = child.id(),
                "oracle exceeded {}s, terminating",
                timeout.as_secs()
            );
            kill_and_reap(child);
            return Err(OracleError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn check_exit(status: ExitStatus, stderr: Option<JoinHandle<Vec<u8>>>) -> Result<(), OracleError> {
    if status.success() {
        return Ok(());
    }
    let raw = stderr
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default();
    let stderr = util::first_line(&raw, STDERR_LOG_BYTES);
    tracing::debug!(%status, stderr = %stderr, "oracle reported no result");
    Err(OracleError::NoResult { status, stderr })
}
