use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use depscout::handlers::{handle_crawl, handle_extract};
use depscout_core::print_banner;
use tracing::Level;

mod commands;

fn init_tracing(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    init_tracing(&chosen_command);

    let outcome = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("extract", primary_command)) => handle_extract(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
