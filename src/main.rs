use std::{env, process};

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use waste_predictor::{
    cli::{self, Cli, Commands},
    predict,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    if let Some(values) = cli::caller_args(&args) {
        predict::run_caller(values, 2)?;
        process::exit(0);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(cmd) => cmd.run(),
        Commands::Predict(cmd) => cmd.run(),
    }
}
