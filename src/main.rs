use clap::Parser;
use file_sorter::cli::{Args, run};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    run(Args::parse())
}
