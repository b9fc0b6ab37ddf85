pub mod components;
pub mod config;

use anyhow::{Context, Result};
use rungs::{
    run_if_active, ComponentOptions, HostLifecycle, HostSignal, Params, Registry, RuntimeConfig,
    State,
};
use tracing::info;

use crate::components::{Gateway, Presenter, ENDPOINT_PARAM};
use crate::config::Config;

pub const TAG: &str = "main";
pub const ENDPOINT: &str = "sim://gateway";

const CYCLE: [HostSignal; 4] = [
    HostSignal::Started,
    HostSignal::Resumed,
    HostSignal::Paused,
    HostSignal::Stopped,
];

/// Settled states after one host signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub signal: HostSignal,
    pub presenter: State,
    pub gateway: State,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub steps: Vec<Step>,
    pub shown: usize,
    pub polls: usize,
    /// Components still registered after teardown.
    pub remaining: usize,
}

/// Register the sample components, run `config.cycles` host cycles and
/// tear everything down.
pub fn simulate(config: &Config) -> Result<Report> {
    let runtime = RuntimeConfig {
        log_lifecycle: config.log_lifecycle,
        ..RuntimeConfig::from_env().context("read runtime config")?
    };
    let registry = Registry::with_config(runtime).context("start registry")?;
    let host = HostLifecycle::new(registry.clone());

    registry
        .set_up::<Presenter>(TAG, ComponentOptions::new().follow_global_lifecycle(true))
        .context("set up presenter")?;
    registry
        .set_up::<Gateway>(
            TAG,
            ComponentOptions::new()
                .mode(config.io_mode)
                .params(Params::new().with(ENDPOINT_PARAM, ENDPOINT.to_string()))
                .follow_global_lifecycle(true),
        )
        .context("set up gateway")?;

    let presenter = registry
        .lookup::<Presenter>(TAG)
        .context("presenter not registered")?;
    let gateway = registry
        .lookup::<Gateway>(TAG)
        .context("gateway not registered")?;
    let gate = registry
        .activation_gate(gateway.as_ref())
        .context("gateway has no activation gate")?;

    let mut steps = Vec::with_capacity(CYCLE.len() * config.cycles as usize);
    for cycle in 0..config.cycles {
        for signal in CYCLE {
            host.signal(signal);
            registry.await_all();
            run_if_active(&gate, || gateway.poll());

            let step = Step {
                signal,
                presenter: registry.state_of(presenter.as_ref()),
                gateway: registry.state_of(gateway.as_ref()),
            };
            info!(
                cycle,
                signal = ?step.signal,
                presenter = %step.presenter,
                gateway = %step.gateway,
                "settled"
            );
            steps.push(step);
        }
    }

    registry.tear_down::<Presenter>(TAG);
    registry.tear_down::<Gateway>(TAG);
    registry.await_all();

    Ok(Report {
        steps,
        shown: presenter.shown(),
        polls: gateway.polls(),
        remaining: registry.len(),
    })
}
