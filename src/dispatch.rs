//! Decides what the launcher turns into. Nothing in here touches the process, see exec for that.

use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::config::Config;

/// The only argument value that selects the batch submission
pub const CONDOR_ARG: &str = "condor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Submit the job description to the batch queue
    Condor,
    /// Run the macro in the local interpreter
    Macro,
}

impl Mode {
    /// Only the first argument is looked at. It has to match exactly, everything else runs the macro.
    pub fn from_args<S: AsRef<OsStr>>(args: &[S]) -> Mode {
        match args.first() {
            Some(arg) if arg.as_ref() == OsStr::new(CONDOR_ARG) => Mode::Condor,
            _ => Mode::Macro,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Condor => f.write_str("condor"),
            Mode::Macro => f.write_str("macro"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Looked up on the search path if it does not contain a slash
    pub cmd: OsString,
    /// Everything after argv[0]
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn for_mode(mode: Mode, conf: &Config) -> Invocation {
        match mode {
            Mode::Condor => Invocation {
                cmd: OsString::from(&conf.condor_cmd),
                args: vec![conf.job_file.clone().into_os_string()],
            },
            Mode::Macro => {
                let mut args: Vec<OsString> = conf.root_args.iter().map(OsString::from).collect();
                args.push(conf.macro_file.clone().into_os_string());
                Invocation {
                    cmd: OsString::from(&conf.root_cmd),
                    args,
                }
            }
        }
    }

    /// The invocation as it would be typed into a shell. Only meant for humans.
    pub fn command_line(&self) -> String {
        let words = std::iter::once(&self.cmd)
            .chain(self.args.iter())
            .map(|word| word.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        match shlex::try_join(words.iter().map(|w| w.as_str())) {
            Ok(line) => line,
            Err(_) => format!("{:?}", words),
        }
    }
}
