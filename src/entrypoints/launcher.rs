use clap::Parser;
use log::{debug, trace};
use std::ffi::OsString;

use crate::config;
use crate::dispatch::{Invocation, Mode};
use crate::exec;
use crate::logging;

pub fn run_launcher() {
    let cli_args = CliArgs::from_os_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let (log_conf, conf) = config::load_config();

    if let Err(e) = logging::setup_logging(&log_conf) {
        unrecoverable_error(e, 1);
    }
    let conf = match conf {
        Ok(conf) => conf,
        Err(e) => {
            unrecoverable_error(format!("Error while loading the conf: {}", e), 1);
        }
    };
    trace!("Loaded conf: {:?}", conf);

    let mode = Mode::from_args(&cli_args.args);
    let invocation = Invocation::for_mode(mode, &conf);
    debug!("Dispatching in {} mode: {}", mode, invocation.command_line());

    if conf.dry_run {
        report_dry_run(&invocation);
        return;
    }

    match exec::exec_invocation(&invocation) {
        Ok(never) => match never {},
        Err(e) => {
            let code = e.exit_code();
            unrecoverable_error(format!("{}", e), code);
        }
    }
}

fn report_dry_run(invocation: &Invocation) {
    println!("{}", invocation.command_line());
    match exec::resolve(&invocation.cmd) {
        Some(path) => eprintln!("{:?} resolves to {:?}", invocation.cmd, path),
        None => eprintln!("{:?} was not found on the search path", invocation.cmd),
    }
}

fn unrecoverable_error(error: String, code: i32) -> ! {
    eprintln!("Unrecoverable error: {}", error);
    std::process::exit(code);
}

/// Everything after the program name. Only the first value decides what runs, the rest is ignored.
#[derive(Parser, Debug)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub(crate) struct CliArgs {
    #[clap(value_parser, trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) args: Vec<OsString>,
}

impl CliArgs {
    /// clap would eat a leading "--" as end of options. Putting our own in front of the user args
    /// means every user arg, including "--", ends up as a plain value.
    pub(crate) fn from_os_args<I>(os_args: I) -> Result<CliArgs, clap::Error>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut os_args = os_args.into_iter();
        let exec_name = os_args.next().unwrap_or_else(|| OsString::from("correlator-launcher"));
        CliArgs::try_parse_from(
            std::iter::once(exec_name)
                .chain(std::iter::once(OsString::from("--")))
                .chain(os_args),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::from_os_args(args.iter().map(OsString::from)).unwrap()
    }

    #[test]
    fn cli_keeps_all_args() {
        let cli_args = parse(&["correlator-launcher", "run", "condor"]);
        assert_eq!(
            cli_args.args,
            vec![OsString::from("run"), OsString::from("condor")]
        );
        assert_eq!(Mode::from_args(&cli_args.args), Mode::Macro);

        let cli_args = parse(&["correlator-launcher", "--", "condor"]);
        assert_eq!(
            cli_args.args,
            vec![OsString::from("--"), OsString::from("condor")]
        );
        assert_eq!(Mode::from_args(&cli_args.args), Mode::Macro);

        let cli_args = parse(&["correlator-launcher", "-b", "--help", "--"]);
        assert_eq!(
            cli_args.args,
            vec![
                OsString::from("-b"),
                OsString::from("--help"),
                OsString::from("--")
            ]
        );
    }

    #[test]
    fn cli_without_args() {
        let cli_args = parse(&["correlator-launcher"]);
        assert!(cli_args.args.is_empty());
        assert_eq!(Mode::from_args(&cli_args.args), Mode::Macro);
    }

    #[test]
    fn cli_condor() {
        let cli_args = parse(&["correlator-launcher", "condor"]);
        assert_eq!(Mode::from_args(&cli_args.args), Mode::Condor);
    }
}
