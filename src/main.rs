use std::path::{Path, PathBuf};

use anyhow::anyhow;
use ixa_hospital_model::config::{init_model, ModelConfig};
use ixa_hospital_model::random::ContextRandomExt;
use ixa_hospital_model::runner::run_with_args;
use ixa_hospital_model::simulation::ContextSimulationExt;
use ixa_hospital_model::summary::{
    format_infection_log, format_model_overview, StateLocationCounts,
};

fn default_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/config.json")
}

fn main() -> anyhow::Result<()> {
    let context = run_with_args(|context, args| {
        let path = args.config.clone().unwrap_or_else(default_config_path);
        let config = ModelConfig::load(&path)?;
        if let (None, Some(seed)) = (args.random_seed, config.random_seed) {
            context.init_random(seed);
        }
        init_model(context, &config)?;
        context.schedule_ticks(args.ticks.unwrap_or(config.ticks))
    })
    .map_err(|e| anyhow!("{e}"))?;

    print!("{}", format_model_overview(&context));
    println!("\n{}", format_infection_log(&context));
    print!("{}", StateLocationCounts::from_context(&context));
    Ok(())
}
