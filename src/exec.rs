//! Replacing the launcher with the chosen command.
//!
//! There is no fork here. If execvp works the launcher is gone and whatever the command exits with is what our parent sees.

use std::convert::Infallible;
use std::ffi::{CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use log::trace;
use nix::errno::Errno;

use crate::dispatch::Invocation;

#[derive(Debug)]
pub enum ExecError {
    InvalidArgument(String),
    Exec { cmd: String, err: Errno },
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            ExecError::InvalidArgument(msg) => format!("invalid argument: {}", msg),
            ExecError::Exec { cmd, err } => format!("could not exec {}: {}", cmd, err),
        };
        fmt.write_str(msg.as_str())
    }
}

impl ExecError {
    /// Exit codes follow the shell: 127 if the command is not there, 126 if it is there but can't be run
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::InvalidArgument(_) => 1,
            ExecError::Exec { err, .. } => match err {
                Errno::ENOENT | Errno::ENOTDIR => 127,
                _ => 126,
            },
        }
    }
}

fn to_cstring(word: &OsStr) -> Result<CString, ExecError> {
    CString::new(word.as_bytes()).map_err(|_| {
        ExecError::InvalidArgument(format!("contains a nul byte: {:?}", word))
    })
}

fn prepare_exec_args(invocation: &Invocation) -> Result<(CString, Vec<CString>), ExecError> {
    let cmd = to_cstring(&invocation.cmd)?;

    let exec_name = Path::new(&invocation.cmd)
        .file_name()
        .ok_or_else(|| ExecError::InvalidArgument(format!("no command name in: {:?}", invocation.cmd)))?;

    let mut args = Vec::new();
    args.push(to_cstring(exec_name)?);

    for word in &invocation.args {
        args.push(to_cstring(word)?);
    }

    Ok((cmd, args))
}

/// Never returns on success
pub fn exec_invocation(invocation: &Invocation) -> Result<Infallible, ExecError> {
    let (cmd, args) = prepare_exec_args(invocation)?;

    trace!("EXECVP: {:?} {:?}", &cmd, &args);
    nix::unistd::execvp(&cmd, &args).map_err(|err| ExecError::Exec {
        cmd: invocation.cmd.to_string_lossy().into_owned(),
        err,
    })
}

/// Where the search path lookup of execvp would find the command, if anywhere
pub fn resolve(cmd: &OsStr) -> Option<PathBuf> {
    which::which(cmd).ok()
}
