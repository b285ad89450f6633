//! Running external programs with a deadline

use std::{
    io::Read,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::error::CollaboratorError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `command` to completion, killing it if it runs longer than `timeout`.
///
/// Succeeds only if the program exits successfully. Standard error is
/// captured for the failure report.
pub(crate) fn run(mut command: Command, timeout: Duration) -> Result<(), CollaboratorError> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("running {command:?}");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CollaboratorError::Spawn {
            program: program.clone(),
            source,
        })?;

    // drained on its own thread while we poll
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    // a timeout too long to represent never expires
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if deadline.is_some_and(|deadline| Instant::now() >= deadline) => {
                log::warn!("'{program}' timed out after {timeout:?}, killing it");
                let _ = child.kill();
                let _ = child.wait();
                // the stderr reader is detached, a grandchild may still hold the pipe
                return Err(CollaboratorError::Timeout {
                    program,
                    after: timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(CollaboratorError::Wait { program, source });
            }
        }
    };

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();
    if status.success() {
        Ok(())
    } else {
        Err(CollaboratorError::Failed {
            program,
            status,
            stderr,
        })
    }
}
