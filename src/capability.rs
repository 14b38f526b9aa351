//! Optional and privileged features behind explicit capability checks.
//!
//! Callers ask for a [`PermissionState`] before acting instead of catching
//! failures after the fact. Optional modules are plain trait objects with a
//! no-op stand-in, chosen when the [`Capabilities`] value is built.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    NotInstalled,
}

/// Barcode / QR scanning.
pub trait Scanner: Send + Sync {
    fn permission(&self) -> PermissionState;
    /// Decoded payload of one scan.
    fn scan(&self) -> Result<String>;
}

/// Stand-in when no scanner module is linked.
pub struct NoScanner;

impl Scanner for NoScanner {
    fn permission(&self) -> PermissionState {
        PermissionState::NotInstalled
    }

    fn scan(&self) -> Result<String> {
        Err(Error::Unavailable("scanner".into()))
    }
}

pub trait ProcessControl: Send + Sync {
    fn permission(&self, pid: i32) -> Result<PermissionState>;
    fn terminate(&self, pid: i32) -> Result<()>;
}

/// Plain POSIX signals. Permission is probed with signal 0.
pub struct SignalProcessControl;

impl ProcessControl for SignalProcessControl {
    fn permission(&self, pid: i32) -> Result<PermissionState> {
        if pid <= 0 {
            return Err(Error::NotFound(format!("process {pid}")));
        }
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => Ok(PermissionState::Granted),
            Err(Errno::EPERM) => Ok(PermissionState::Denied),
            Err(Errno::ESRCH) => Err(Error::NotFound(format!("process {pid}"))),
            Err(e) => Err(Error::Io(e.into())),
        }
    }

    fn terminate(&self, pid: i32) -> Result<()> {
        kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| Error::Io(e.into()))
    }
}

/// Application-scoped capability set, handed to whoever needs it.
pub struct Capabilities {
    pub scanner: Box<dyn Scanner>,
    pub processes: Box<dyn ProcessControl>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            scanner: Box::new(NoScanner),
            processes: Box::new(SignalProcessControl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scanner_reports_not_installed() {
        let caps = Capabilities::default();
        assert_eq!(caps.scanner.permission(), PermissionState::NotInstalled);
        assert!(matches!(caps.scanner.scan(), Err(Error::Unavailable(_))));
    }

    #[test]
    fn own_process_is_signalable() {
        let pid = std::process::id() as i32;
        assert_eq!(SignalProcessControl.permission(pid).unwrap(), PermissionState::Granted);
    }

    #[test]
    fn invalid_pid_is_not_found() {
        assert!(matches!(SignalProcessControl.permission(0), Err(Error::NotFound(_))));
        assert!(matches!(SignalProcessControl.permission(-4), Err(Error::NotFound(_))));
    }
}
