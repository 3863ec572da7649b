use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flaky_sim::navigator::{HttpNavigator, Navigator, OfflineNavigator};
use flaky_sim::report::{self, ReportStatus};
use flaky_sim::{FlakySuite, SuiteConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn config_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with targets and run settings"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for the trial log and reports"),
        )
}

fn cli() -> Command {
    Command::new("flaky-sim")
        .version(flaky_sim::VERSION)
        .about("Flaky navigation check simulator")
        .arg_required_else_help(true)
        .subcommand(
            config_args(Command::new("run").about("Run every target through the flaky check"))
                .arg(
                    Arg::new("repetitions")
                        .long("repetitions")
                        .value_parser(value_parser!(u32))
                        .help("Checks per target (default 5)"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("min-latency-ms")
                        .long("min-latency-ms")
                        .value_parser(value_parser!(u64))
                        .help("Lower bound of the simulated load delay"),
                )
                .arg(
                    Arg::new("max-latency-ms")
                        .long("max-latency-ms")
                        .value_parser(value_parser!(u64))
                        .help("Upper bound of the simulated load delay"),
                )
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .action(ArgAction::SetTrue)
                        .help("Skip opening pages over HTTP"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .action(ArgAction::SetTrue)
                        .help("Generate reports after the run"),
                ),
        )
        .subcommand(config_args(
            Command::new("report").about("Generate pass/fail and stability reports from the log"),
        ))
        .subcommand(
            Command::new("targets").about("List configured targets").arg(
                Arg::new("config")
                    .long("config")
                    .value_parser(value_parser!(PathBuf))
                    .help("TOML file with targets and run settings"),
            ),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<SuiteConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => SuiteConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SuiteConfig::new(),
    };

    if let Ok(Some(dir)) = args.try_get_one::<PathBuf>("output-dir") {
        config.output_dir = dir.clone();
    }
    if let Ok(Some(repetitions)) = args.try_get_one::<u32>("repetitions") {
        config.repetitions = *repetitions;
    }
    if let Ok(Some(seed)) = args.try_get_one::<u64>("seed") {
        config.seed = Some(*seed);
    }
    if let Ok(Some(min_ms)) = args.try_get_one::<u64>("min-latency-ms") {
        config.latency.min_ms = *min_ms;
    }
    if let Ok(Some(max_ms)) = args.try_get_one::<u64>("max-latency-ms") {
        config.latency.max_ms = *max_ms;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run_suite<N: Navigator>(config: SuiteConfig, navigator: N) -> anyhow::Result<bool> {
    let mut suite = FlakySuite::new(config, navigator).context("opening trial log")?;
    let summary = suite.run().await.context("running suite")?;
    println!("{}", summary.generate_text());
    Ok(summary.all_passed())
}

fn print_report(config: &SuiteConfig) -> bool {
    match report::generate_best_effort(config) {
        ReportStatus::Generated(summary) => {
            println!("{}", summary.generate_text());
            true
        }
        ReportStatus::Failed { error, preview } => {
            println!("Error generating reports: {error}");
            if error.is_input_error() {
                println!("Run `flaky-sim run` to record trials first, or repair the log.");
            }
            println!("Debugging trial log contents:");
            for row in preview {
                println!("  {row}");
            }
            false
        }
    }
}

async fn execute(matches: ArgMatches) -> anyhow::Result<i32> {
    match matches.subcommand() {
        Some(("run", args)) => {
            let config = load_config(args)?;
            println!("Running flaky suite...");
            println!("Targets: {}", config.targets.len());
            println!("Repetitions: {}", config.repetitions);
            println!("Trials: {}", config.planned_trials());
            match config.seed {
                Some(seed) => println!("Seed: {seed}"),
                None => println!("Seed: (entropy)"),
            }
            println!();

            let all_passed = if args.get_flag("offline") {
                run_suite(config.clone(), OfflineNavigator).await?
            } else {
                let navigator = HttpNavigator::new().context("building HTTP navigator")?;
                run_suite(config.clone(), navigator).await?
            };

            let reported = !args.get_flag("report") || print_report(&config);
            Ok(if all_passed && reported { 0 } else { 1 })
        }
        Some(("report", args)) => {
            let config = load_config(args)?;
            Ok(if print_report(&config) { 0 } else { 1 })
        }
        Some(("targets", args)) => {
            let config = load_config(args)?;
            for target in &config.targets {
                println!("{} (expects {})", target.url, target.expected_status);
            }
            Ok(0)
        }
        _ => Ok(0),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let code = match execute(matches).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            2
        }
    };
    std::process::exit(code);
}
