//! Main entry point for the posekit CLI

mod cli;
mod commands;
mod config;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};
use crate::config::Settings;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    let settings = Settings::resolve(cli.storage_dir, cli.output_dir);

    match cli.command {
        Commands::New { file, name } => commands::scene::execute_new(&file, &name),
        Commands::Info { file } => commands::scene::execute_info(&file),
        Commands::Tree {
            file,
            depth,
            no_color,
        } => commands::scene::execute_tree(&file, depth, no_color),
        Commands::Pose { file, frame, all } => commands::scene::execute_pose(&file, frame, all),
        Commands::Convert { input, output } => commands::scene::execute_convert(&input, &output),
        Commands::Validate { file } => commands::scene::execute_validate(&file),
        Commands::Edit {
            file,
            script,
            output,
        } => commands::edit::execute(&file, &script, output.as_deref()),
        Commands::List { xml } => commands::store::execute_list(&settings, xml),
        Commands::Save { file, name, xml } => {
            commands::store::execute_save(&settings, &file, &name, xml)
        }
        Commands::Load { name, output } => commands::store::execute_load(&settings, &name, &output),
        Commands::Export {
            file,
            fps,
            no_png,
            no_gif,
            onion_prev,
            onion_next,
            workers,
        } => commands::export::execute(
            &settings,
            &file,
            commands::export::ExportArgs {
                fps,
                png: !no_png,
                gif: !no_gif,
                onion_prev,
                onion_next,
                workers,
            },
        ),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
