use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Command, FromArgMatches as _};

use crate::context::Context;
use crate::error::ModelError;
use crate::log::{set_log_level, set_module_filter, LevelFilter};
use crate::random::ContextRandomExt;
use crate::simulation::ContextSimulationExt;

/// Default cli arguments for the model runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed. Overrides the seed in the configuration file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Path to the model configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable logging at the given level (error, warn, info, debug, trace),
    /// optionally followed by module filters: `info,ixa_hospital_model::rules=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the number of ticks from the configuration file
    #[arg(short, long)]
    pub ticks: Option<usize>,
}

fn create_cli() -> Command {
    let cli = Command::new("hospital-model");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation with the default cli arguments.
///
/// `setup_fn` receives a context whose random module is already seeded from
/// `--random-seed`, or from 0 when no seed was given. It should build the
/// model and schedule its ticks; the context is then executed and returned.
///
/// # Errors
///
/// Returns an error if argument parsing or the setup function fails, or if
/// the run was stopped by a fatal model error.
pub fn run_with_args<F>(setup_fn: F) -> Result<Context, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), ModelError>,
{
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(&args, setup_fn)
}

/// Splits a `--log-level` value into the global level and per-module
/// filters. Without a bare level, only the named modules log.
fn parse_log_levels(spec: &str) -> Result<(LevelFilter, Vec<(&str, LevelFilter)>), ModelError> {
    let parse_level = |level: &str| {
        LevelFilter::from_str(level.trim())
            .map_err(|_| ModelError::ConfigurationError(format!("invalid log level: {level}")))
    };

    let mut global = LevelFilter::Off;
    let mut module_filters = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.split_once('=') {
            Some((module, level)) => module_filters.push((module.trim(), parse_level(level)?)),
            None => global = parse_level(item)?,
        }
    }
    Ok((global, module_filters))
}

fn run_with_args_internal<F>(
    args: &BaseArgs,
    setup_fn: F,
) -> Result<Context, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), ModelError>,
{
    if let Some(spec) = &args.log_level {
        let (level, module_filters) = parse_log_levels(spec)?;
        set_log_level(level);
        for (module, level) in module_filters {
            set_module_filter(module, level);
        }
    }

    let mut context = Context::new();
    context.init_random(args.random_seed.unwrap_or_default());

    setup_fn(&mut context, args)?;

    context.execute();
    if let Some(e) = context.take_fatal_error() {
        return Err(Box::new(e));
    }
    Ok(context)
}
