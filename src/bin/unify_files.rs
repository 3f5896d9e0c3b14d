use clap::Parser;

use engine_devtools::cli::commands::{UnifyCli, UnifyCommand};
use engine_devtools::cli::{logging, output};
use engine_devtools::config::Config;
use engine_devtools::error::Result;
use engine_devtools::unify::{self, plan, Layout, Tree};

fn main() {
    let cli = UnifyCli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

fn run(cli: UnifyCli) -> Result<()> {
    let config = Config::resolve(cli.root.as_deref())?;
    let layout = Layout::from_config(&config);

    match cli.command {
        UnifyCommand::File { from, file, to_file } => {
            let to_file = to_file.unwrap_or_else(|| file.clone());
            unify::unify_file(&layout, from, &file, Tree::Core, &to_file)?;
            println!("Unified {file} -> {}/{to_file}", config.settings.unify.core_dir);
        }
        UnifyCommand::Move { from, file, to_file } => {
            let to_file = to_file.unwrap_or_else(|| file.clone());
            unify::unify_move_file(&layout, from, &file, Tree::Core, &to_file)?;
            println!("Moved {file} -> {}/{to_file}", config.settings.unify.core_dir);
        }
        UnifyCommand::Plan { path } => {
            let plan = plan::load_plan(&path)?;
            let applied = plan::run_plan(&layout, &plan)?;
            println!("Applied {applied} operation(s)");
        }
    }
    Ok(())
}
