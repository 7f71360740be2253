//! Interruptible child process execution.

use std::collections::VecDeque;
use std::io::{BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use super::runner::{ToolError, ToolOutput, ToolResult};
use crate::orchestrator::Interrupt;

/// Render a command the way it would be typed in a shell.
pub fn describe_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| {
        let arg = a.to_string_lossy();
        if arg.contains(' ') || arg.is_empty() {
            format!("'{}'", arg)
        } else {
            arg.into_owned()
        }
    }));
    parts.join(" ")
}

/// Run `cmd` to completion, polling `interrupt` every `poll_interval`.
///
/// stderr is collected on a reader thread so a chatty tool can never
/// block on a full pipe. On interruption the child is killed and reaped
/// before returning. Only the last `tail_lines` lines of stderr are kept,
/// both in the output and in the report for a non-zero exit. Carriage
/// returns end a line too, so progress redraws never merge into one.
pub fn run_interruptible(
    tool: &str,
    mut cmd: Command,
    interrupt: &Interrupt,
    poll_interval: Duration,
    tail_lines: usize,
) -> ToolResult<ToolOutput> {
    let command = describe_command(&cmd);
    tracing::debug!("Running: {}", command);

    if let Some(reason) = interrupt.reason() {
        return Err(ToolError::interrupted(tool, reason));
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ToolError::spawn(tool, e))?;

    let reader = child
        .stderr
        .take()
        .map(|stderr| thread::spawn(move || collect_tail(stderr, tail_lines)));

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if let Some(reason) = interrupt.reason() {
                    kill_and_reap(&mut child);
                    tracing::debug!("{} killed: {}", tool, reason);
                    return Err(ToolError::interrupted(tool, reason));
                }
                thread::sleep(poll_interval);
            }
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(ToolError::io(format!("waiting for {}", tool), e));
            }
        }
    };

    let log_lines = join_lines(reader);

    if !status.success() {
        return Err(ToolError::exit(tool, status.code(), log_lines.join("\n")));
    }

    Ok(ToolOutput { command, log_lines })
}

/// The stderr reader is not joined after a kill: a grandchild may still
/// hold the pipe open, and the thread ends on its own once it closes.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn collect_tail<R: Read>(stream: R, limit: usize) -> Vec<String> {
    let mut tail = VecDeque::with_capacity(limit.min(64));
    let mut buf = Vec::new();
    for byte in BufReader::new(stream).bytes() {
        match byte {
            Ok(b'\n') | Ok(b'\r') => push_line(&mut tail, &mut buf, limit),
            Ok(b) => buf.push(b),
            Err(_) => break,
        }
    }
    push_line(&mut tail, &mut buf, limit);
    tail.into()
}

fn push_line(tail: &mut VecDeque<String>, buf: &mut Vec<u8>, limit: usize) {
    let line = String::from_utf8_lossy(buf).trim().to_string();
    buf.clear();
    if line.is_empty() || limit == 0 {
        return;
    }
    if tail.len() == limit {
        tail.pop_front();
    }
    tail.push_back(line);
}

fn join_lines(reader: Option<thread::JoinHandle<Vec<String>>>) -> Vec<String> {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}
