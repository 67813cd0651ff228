use clap::Parser;
use colored::*;
use textshift::api;
use textshift::error::Result;
use textshift::readers::text_expander::TextExpanderReader;
use textshift::writers::auto_key::AutoKeyWriter;

mod args;
use args::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let report = api::convert(
        &TextExpanderReader,
        &AutoKeyWriter,
        &cli.source,
        &cli.target,
    )?;

    println!(
        "{} {} of {} snippets across {} groups ({} wrappers, {} skipped)",
        "Converted".green().bold(),
        report.written,
        report.snippets,
        report.groups,
        report.wrappers,
        report.skipped,
    );

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}
