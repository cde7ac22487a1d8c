//! A wrapper around a spawned child process that knows how to ask it to
//! leave, then insist.

use std::io;
use tokio::process::{Child, Command};

#[derive(Debug, thiserror::Error)]
pub enum ChildError {
    #[error("io error controlling child: {0}")]
    Io(#[from] io::Error),
    #[error("child has no pid (already reaped)")]
    NoPid,
    #[cfg(unix)]
    #[error("signal delivery failed: {0}")]
    Signal(#[from] nix::Error),
}

/// One supervised process, normal-terminated with SIGTERM and force-killed
/// with SIGKILL, mirroring `PROCUTIL_NORM_TERM` / `PROCUTIL_FORCE_TERM`.
pub struct ManagedChild {
    child: Child,
}

impl ManagedChild {
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        let child = command.spawn()?;
        Ok(Self { child })
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking liveness check. Reaps the child if it has already
    /// exited, same as the underlying `try_wait`.
    pub fn is_alive(&mut self) -> io::Result<bool> {
        Ok(self.child.try_wait()?.is_none())
    }

    /// Ask the child to exit (SIGTERM on unix, `Child::kill` elsewhere).
    #[cfg(unix)]
    pub fn terminate(&mut self) -> Result<(), ChildError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let pid = self.pid().ok_or(ChildError::NoPid)?;
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub async fn terminate(&mut self) -> Result<(), ChildError> {
        self.child.start_kill()?;
        Ok(())
    }

    /// Force-kill the child (SIGKILL on unix).
    pub async fn force_kill(&mut self) -> Result<(), ChildError> {
        self.child.start_kill()?;
        Ok(())
    }

    /// Wait for the child to exit.
    pub async fn wait(&mut self) -> io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawns_and_waits() {
        let cmd = Command::new("true");
        let mut child = ManagedChild::spawn(cmd).unwrap();
        let status = child.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn terminate_stops_a_sleeping_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let mut child = ManagedChild::spawn(cmd).unwrap();
        assert!(child.is_alive().unwrap());
        child.terminate().unwrap();
        let status = child.wait().await.unwrap();
        assert!(!status.success());
    }
}
