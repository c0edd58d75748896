use catalog::Catalog;
use clap::error::ErrorKind;
use clap::Parser;
use clap::Subcommand;
use commands::analyze::Analyze;
use commands::generate_commands::GenerateCommands;
use commands::test_low_risk::TestLowRisk;
use commands::validate::Validate;
use commands::Context;
use std::io::Write;
use std::path::PathBuf;
use validator::JudgeMode;

mod catalog;
mod commands;
mod errors;
mod git;
mod report;
mod toolchain;
mod validator;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "depmerge", version)]
#[command(about = "Triage, test and merge dependency-update pull requests", long_about = None)]
struct Cli {
    /// Repository to test pull requests in
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Catalog of pull requests [default: ./.depmerge.toml, else built-in]
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// How a finished test run is judged
    #[arg(long, global = true, value_enum, default_value_t = JudgeMode::Marker)]
    judge: JudgeMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    TestLowRisk(TestLowRisk),
    Validate(Validate),
    GenerateCommands(GenerateCommands),
    Analyze(Analyze),
}

fn run(cli: Cli) -> errors::Result<()> {
    let ctx = Context {
        catalog: Catalog::discover(cli.catalog.as_deref())?,
        repo: cli.repo,
        judge: cli.judge,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::TestLowRisk(cmd)) => cmd.execute(&ctx, &mut out),
        Some(Commands::Validate(cmd)) => cmd.execute(&ctx, &mut out),
        Some(Commands::GenerateCommands(cmd)) => cmd.execute(&ctx, &mut out),
        Some(Commands::Analyze(cmd)) => cmd.execute(&ctx, &mut out),
        None => {
            out.write_all(report::usage(&ctx.catalog).as_bytes())?;
            Ok(())
        }
    }
}

fn falls_back_to_usage(e: &clap::Error) -> bool {
    e.kind() == ErrorKind::InvalidSubcommand
}

/// `--catalog` from raw arguments that clap rejected.
fn catalog_arg(args: &[String]) -> Option<PathBuf> {
    let mut args = args.iter().skip(1).take_while(|arg| *arg != "--");
    while let Some(arg) = args.next() {
        if arg == "--catalog" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--catalog=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let raw: Vec<String> = std::env::args().collect();
    let args = match Cli::try_parse_from(&raw) {
        Ok(args) => args,
        // An unknown action falls back to the usage overview
        Err(e) if falls_back_to_usage(&e) => {
            log::warn!("{}", e.render().to_string().lines().next().unwrap_or_default());
            Cli {
                repo: PathBuf::from("."),
                catalog: catalog_arg(&raw),
                judge: JudgeMode::default(),
                command: None,
            }
        }
        Err(e) => e.exit(),
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
