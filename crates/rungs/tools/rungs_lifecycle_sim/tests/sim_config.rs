use std::env;
use std::sync::{Mutex, OnceLock};

use rungs::{Mode, State};
use rungs_lifecycle_sim::config::{Config, DEFAULT_CYCLES};
use rungs_lifecycle_sim::simulate;

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for var in ["RUNGS_SIM_CYCLES", "RUNGS_SIM_IO_MODE", "RUNGS_LOG_LIFECYCLE"] {
        env::remove_var(var);
    }
}

#[test]
fn defaults_without_args_or_env() {
    let _guard = env_lock();
    clear_env();

    let config = Config::from_args_iter(["bin"]);
    assert_eq!(config.cycles, DEFAULT_CYCLES);
    assert_eq!(config.io_mode, Mode::IoAsync);
    assert!(!config.log_lifecycle);
    assert!(!config.show_help);
}

#[test]
fn args_accept_both_flag_forms() {
    let _guard = env_lock();
    clear_env();

    let config = Config::from_args_iter(["bin", "--cycles", "5", "--io-mode=io_sync"]);
    assert_eq!(config.cycles, 5);
    assert_eq!(config.io_mode, Mode::IoSync);

    let config = Config::from_args_iter(["bin", "--cycles=3", "--io-mode", "ui-async", "-h"]);
    assert_eq!(config.cycles, 3);
    assert_eq!(config.io_mode, Mode::UiAsync);
    assert!(config.show_help);
}

#[test]
fn env_sets_defaults_and_args_override() {
    let _guard = env_lock();
    clear_env();
    env::set_var("RUNGS_SIM_CYCLES", "7");
    env::set_var("RUNGS_LOG_LIFECYCLE", "on");

    let config = Config::from_args_iter(["bin", "--cycles", "1"]);
    clear_env();

    assert_eq!(config.cycles, 1);
    assert!(config.log_lifecycle);
}

#[test]
fn malformed_values_keep_the_previous_setting() {
    let _guard = env_lock();
    clear_env();

    let config = Config::from_args_iter(["bin", "--cycles", "many", "--io-mode=fast"]);
    assert_eq!(config.cycles, DEFAULT_CYCLES);
    assert_eq!(config.io_mode, Mode::IoAsync);
}

#[test]
fn one_cycle_settles_every_signal_and_tears_down() {
    let _guard = env_lock();
    clear_env();

    let report = simulate(&Config::from_args_iter(["bin", "--cycles", "1"])).unwrap();

    let settled: Vec<(State, State)> = report
        .steps
        .iter()
        .map(|step| (step.presenter, step.gateway))
        .collect();
    assert_eq!(
        settled,
        vec![
            (State::Inactive, State::Inactive),
            (State::Active, State::Active),
            (State::Inactive, State::Inactive),
            (State::Background, State::Background),
        ]
    );
    assert_eq!(report.shown, 1);
    assert_eq!(report.polls, 1);
    assert_eq!(report.remaining, 0);
}
