// src/mcp.rs - single-shot client for stdio tool servers

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use wait_timeout::ChildExt;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// After closing stdin, how long the server gets to exit on its own
/// before Drop falls back to kill.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The step of the exchange a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialize,
    ToolCall,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialize => write!(f, "waiting for the initialize response"),
            Phase::ToolCall => write!(f, "waiting for the tool call response"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("failed to launch tool server {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to tool server: {0}")]
    Io(#[from] io::Error),

    #[error("tool server closed its output while {phase}")]
    ServerClosed { phase: Phase },

    #[error("no response from tool server within {timeout:?} while {phase}")]
    Timeout { phase: Phase, timeout: Duration },

    #[error("tool server sent invalid JSON while {phase}: {source}")]
    BadResponse {
        phase: Phase,
        #[source]
        source: serde_json::Error,
    },
}

/// The final response plus wall-clock time for the whole exchange,
/// spawn through response.
#[derive(Debug)]
pub struct ToolCallOutcome {
    pub response: Value,
    pub elapsed: Duration,
}

/// Spawn `server`, run the initialize handshake, invoke one tool, and
/// return its response. The exchange is newline-delimited JSON-RPC
/// over the server's stdio; stderr stays inherited so server
/// diagnostics reach the terminal. The server is terminated and
/// reaped on every path out of this function.
pub fn call_tool(
    server: &Path,
    tool: &str,
    arguments: &Value,
    timeout: Duration,
) -> Result<ToolCallOutcome, McpError> {
    let start = Instant::now();

    let mut child = Command::new(server)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| McpError::Spawn {
            program: server.to_path_buf(),
            source,
        })?;

    let mut stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let mut guard = ServerGuard { child };

    // Response lines arrive through a channel so reads can time out.
    // The thread ends at EOF, dropping the sender; the receiver then
    // sees Disconnected, which is the "server went away" signal.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Some(stdout) = stdout {
            for line in BufReader::new(stdout).lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        }
    });

    let initialize = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        },
    });
    send(&mut stdin, &initialize)?;
    await_response(&rx, Phase::Initialize, timeout)?;

    send(&mut stdin, &json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))?;

    let call = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments},
    });
    send(&mut stdin, &call)?;
    let response = await_response(&rx, Phase::ToolCall, timeout)?;

    let elapsed = start.elapsed();
    guard.shutdown(stdin);
    Ok(ToolCallOutcome { response, elapsed })
}

/// Write one message as a line and flush it, so the server sees the
/// request before we block on its answer.
fn send(stdin: &mut Option<ChildStdin>, message: &Value) -> Result<(), McpError> {
    let stdin = stdin
        .as_mut()
        .ok_or_else(|| McpError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))?;
    let mut line = message.to_string();
    line.push('\n');
    stdin.write_all(line.as_bytes())?;
    stdin.flush()?;
    Ok(())
}

fn await_response(
    responses: &Receiver<io::Result<String>>,
    phase: Phase,
    timeout: Duration,
) -> Result<Value, McpError> {
    match responses.recv_timeout(timeout) {
        Ok(Ok(line)) => {
            serde_json::from_str(&line).map_err(|source| McpError::BadResponse { phase, source })
        }
        Ok(Err(source)) => Err(McpError::Io(source)),
        Err(RecvTimeoutError::Timeout) => Err(McpError::Timeout { phase, timeout }),
        Err(RecvTimeoutError::Disconnected) => Err(McpError::ServerClosed { phase }),
    }
}

/// Keeps the server from outliving the exchange. Drop kills and reaps
/// unconditionally; both are no-ops once the child has exited and
/// been waited on.
struct ServerGuard {
    child: Child,
}

impl ServerGuard {
    /// Close the server's stdin and give it a moment to exit on its
    /// own. Whatever is still running after that, Drop kills.
    fn shutdown(&mut self, stdin: Option<ChildStdin>) {
        drop(stdin);
        let _ = self.child.wait_timeout(SHUTDOWN_GRACE);
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
