use std::env;

use rungs::config::parse_bool;
use rungs::Mode;

pub const DEFAULT_CYCLES: u32 = 2;
pub const DEFAULT_IO_MODE: Mode = Mode::IoAsync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Full Started/Resumed/Paused/Stopped cycles to run.
    pub cycles: u32,
    pub io_mode: Mode,
    pub log_lifecycle: bool,
    pub show_help: bool,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    /// Parse `--flag value` / `--flag=value` arguments over env defaults.
    ///
    /// The first item is the program name. Unknown flags and malformed
    /// values are ignored.
    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cycles = env::var("RUNGS_SIM_CYCLES")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_CYCLES);
        let mut io_mode = env::var("RUNGS_SIM_IO_MODE")
            .ok()
            .and_then(|value| Mode::parse(&value))
            .unwrap_or(DEFAULT_IO_MODE);
        let mut log_lifecycle = env::var("RUNGS_LOG_LIFECYCLE")
            .ok()
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);
        let mut show_help = false;

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => show_help = true,
                "--cycles" => {
                    if let Some(value) = args.next() {
                        cycles = value.as_ref().trim().parse().unwrap_or(cycles);
                    }
                }
                "--io-mode" => {
                    if let Some(value) = args.next() {
                        io_mode = Mode::parse(value.as_ref()).unwrap_or(io_mode);
                    }
                }
                "--log-lifecycle" => log_lifecycle = true,
                _ if arg.starts_with("--cycles=") => {
                    cycles = arg["--cycles=".len()..].trim().parse().unwrap_or(cycles);
                }
                _ if arg.starts_with("--io-mode=") => {
                    io_mode = Mode::parse(&arg["--io-mode=".len()..]).unwrap_or(io_mode);
                }
                _ => {}
            }
        }

        Self {
            cycles,
            io_mode,
            log_lifecycle,
            show_help,
        }
    }
}

pub fn usage() -> &'static str {
    "rungs_lifecycle_sim [--cycles N] [--io-mode io-sync|io-async|ui-sync|ui-async] [--log-lifecycle]"
}
