use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use norsat::config::{SolverConfig, SolverConfigUpdate};
use norsat::solver::{SolveResult, Solver};
use norsat_dimacs::write_solution;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    // All log output is prefixed with "c " to keep the overall output valid DIMACS solver
    // output.
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("NORSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is norsat {}", env!("CARGO_PKG_VERSION"));
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("norsat")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'norsat -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
        .get_matches();

    if values_t!(matches, "config-option", String)
        .unwrap_or_default()
        .iter()
        .any(|option| option == "help")
    {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let mut config_update = SolverConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in values_t!(matches, "config-option", String).unwrap_or_default() {
        config_update.merge(toml::from_str(&config_option)?);
    }

    let mut solver = Solver::new();

    solver.config(&config_update)?;

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    let result = solver.solve();

    let stats = solver.stats();
    info!(
        "{} conflicts, {} decisions, {} propagations, {} restarts",
        stats.conflicts, stats.decisions, stats.propagations, stats.restarts
    );
    info!(
        "{} learned clauses ({} glue), {} deleted in {} reductions",
        stats.learned_clauses, stats.glue_clauses, stats.deleted_clauses, stats.reductions
    );

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    match result {
        SolveResult::Sat => {
            let model = solver.model().unwrap();
            write_solution(&mut stdout, Some(&model[..]))?;
            Ok(10)
        }
        SolveResult::Unsat => {
            write_solution(&mut stdout, None)?;
            Ok(20)
        }
        SolveResult::Unknown => {
            writeln!(stdout, "s UNKNOWN")?;
            Ok(0)
        }
    }
}
