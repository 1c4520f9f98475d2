// src/exec/executor.rs

//! Launching descriptors as OS processes.
//!
//! [`SystemExecutor`] is the production backend built on
//! `tokio::process::Command`. Tests can provide their own
//! [`ProcessExecutor`] that never spawns anything.

use std::fmt;
use std::fs::File;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::channel::{CaptureBuffer, Channel};
use super::descriptor::{LifecycleState, ProcessDescriptor, Termination, log_termination};
use super::error::ExecError;

/// Trait abstracting how a descriptor is turned into a running process.
pub trait ProcessExecutor: Send + Sync + fmt::Debug {
    /// Launch `descriptor`.
    ///
    /// On return the descriptor is `Executing` (or already `Terminated` when
    /// `wait` is true). A non-zero exit is not an error here; spawn failures
    /// are, and leave the descriptor `Pending`.
    fn launch<'a>(
        &'a self,
        descriptor: &'a mut ProcessDescriptor,
        wait: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + 'a>>;
}

/// Real executor used in production.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessExecutor for SystemExecutor {
    fn launch<'a>(
        &'a self,
        descriptor: &'a mut ProcessDescriptor,
        wait: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + 'a>> {
        Box::pin(launch_process(descriptor, wait))
    }
}

async fn launch_process(descriptor: &mut ProcessDescriptor, wait: bool) -> Result<(), ExecError> {
    if descriptor.state() != LifecycleState::Pending {
        return Err(ExecError::InvalidTransition {
            from: descriptor.state().to_string(),
            to: LifecycleState::Executing.to_string(),
        });
    }

    let program = descriptor.name().to_string();
    debug!(
        tool = %program,
        command = %descriptor.command_line(),
        cwd = ?descriptor.current_dir,
        "launching process"
    );

    let mut cmd = Command::new(descriptor.executable().path());
    cmd.args(descriptor.arguments.process_values())
        .envs(&descriptor.environment)
        .stdin(input_stdio(&descriptor.io.input)?)
        .stdout(output_stdio(&descriptor.io.output)?)
        .stderr(output_stdio(&descriptor.io.error)?);
    if let Some(dir) = &descriptor.current_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;
    descriptor.transition(LifecycleState::Executing)?;
    info!(tool = %program, pid = ?child.id(), "process started");

    if let Some(stdin) = child.stdin.take() {
        if let Channel::Bytes(bytes) = &descriptor.io.input {
            tokio::spawn(feed_stdin(stdin, bytes.clone(), program.clone()));
        }
    }

    let mut drains = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        let capture = descriptor.io.output.capture().cloned();
        drains.push(tokio::spawn(drain(stdout, capture)));
    }
    if let Some(stderr) = child.stderr.take() {
        let capture = descriptor.io.error.capture().cloned();
        drains.push(tokio::spawn(drain(stderr, capture)));
    }

    // Owns the child: waits for exit, then for the drains so captured output
    // is complete once the termination is published.
    let (exit_tx, exit_rx) = watch::channel(None);
    tokio::spawn(async move {
        let outcome = match child.wait().await {
            Ok(status) => {
                for handle in drains {
                    if let Err(e) = handle.await {
                        warn!(error = %e, "output drain task failed");
                    }
                }
                let termination = Termination::from_status(status);
                log_termination(&program, termination);
                Ok(termination)
            }
            Err(e) => {
                warn!(tool = %program, error = %e, "failed to wait for process");
                Err(e.to_string())
            }
        };
        exit_tx.send_replace(Some(outcome));
    });
    descriptor.attach_exit(exit_rx);

    if wait {
        descriptor.wait().await?;
    }
    Ok(())
}

fn input_stdio(channel: &Channel) -> Result<Stdio, ExecError> {
    Ok(match channel {
        Channel::Inherit => Stdio::inherit(),
        Channel::Null => Stdio::null(),
        Channel::File(path) => File::open(path)
            .map_err(|source| ExecError::File {
                path: path.clone(),
                source,
            })?
            .into(),
        // An input pipe with nothing to feed is closed as soon as it is taken.
        Channel::Pipe { .. } | Channel::Bytes(_) => Stdio::piped(),
    })
}

fn output_stdio(channel: &Channel) -> Result<Stdio, ExecError> {
    Ok(match channel {
        Channel::Inherit => Stdio::inherit(),
        Channel::Null => Stdio::null(),
        Channel::File(path) => File::create(path)
            .map_err(|source| ExecError::File {
                path: path.clone(),
                source,
            })?
            .into(),
        Channel::Pipe { .. } => Stdio::piped(),
        Channel::Bytes(_) => {
            warn!("byte channels are input-only; discarding output");
            Stdio::null()
        }
    })
}

async fn feed_stdin(mut stdin: ChildStdin, bytes: Vec<u8>, program: String) {
    if let Err(e) = stdin.write_all(&bytes).await {
        debug!(tool = %program, error = %e, "child closed stdin early");
    }
    // Dropping `stdin` closes the pipe.
}

/// Read until EOF, keeping the bytes only if a capture buffer is attached.
async fn drain<R>(mut reader: R, capture: Option<CaptureBuffer>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if let Some(buffer) = &capture {
                    buffer.append(&chunk[..n]);
                }
            }
            Err(e) => {
                debug!(error = %e, "reading child output failed");
                break;
            }
        }
    }
}
