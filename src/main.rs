mod cli;
mod config;
mod logging;
mod platform;
mod process;
mod project;
mod runner;
mod target;

fn main() -> anyhow::Result<()> {
    let app = cli::parse();
    logging::init(app.verbose);
    runner::run(app)
}
