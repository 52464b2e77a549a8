use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use kcoloring::encode::{AtMostOne, ConstraintSystem, Encoding, Metadata, Strategy, encode};
use kcoloring::io::{Format, read_file};
use kcoloring::palette::Palette;
use kcoloring::pipeline::solve_encoding;
use kcoloring::solver::SatSolver;
use kcoloring::solver::ground::Grounding;
use kcoloring::{ColorCount, Outcome};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Decides whether a graph can be colored with K colors, and if so, prints the colored graph.
///
/// Exits with status 0 if a coloring was found, 1 if the graph is not K-colorable and 2 on error.
#[derive(Debug, Clone, Parser)]
#[command(name = "kcolor", version, rename_all = "kebab-case")]
struct Opt {
    /// Graph file, in the DOT language or in the DIMACS graph format (.col).
    file: PathBuf,

    /// Number of colors.
    #[arg(short, allow_negative_numbers = true)]
    k: i64,

    /// If set, the colored graph is written to this file instead of the standard output.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Encoding of the problem: "one-hot" or "quantified"
    #[arg(long, default_value = "one-hot")]
    strategy: Strategy,

    /// At-most-one encoding of the one-hot strategy: "pairwise", "sequential" or "commander".
    /// Defaults to the value of the KCOLOR_AMO environment variable, or "pairwise".
    #[arg(long)]
    amo: Option<AtMostOne>,

    /// Maximal solving time, in seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// Writes the propositional formula handed to the SAT solver to this file, in DIMACS format.
    #[arg(long)]
    emit_dimacs: Option<PathBuf>,

    /// Writes the quantified encoding to this file as an SMT-LIB 2 script.
    #[arg(long)]
    emit_smt2: Option<PathBuf>,

    /// Format of the graph file. If "auto", `.col` files are DIMACS and other files are DOT.
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,

    /// Logging level to use: one of "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Auto,
    Dot,
    Col,
}

fn main() -> ExitCode {
    let opt = Opt::parse();

    // set up logger
    let subscriber = tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::Uptime::from(Instant::now()))
        .with_writer(std::io::stderr)
        .with_max_level(opt.log_level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Could not install the logger: {e}");
    }

    match run(&opt) {
        Ok(Outcome::Colored(_)) => ExitCode::SUCCESS,
        Ok(Outcome::Uncolorable) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(opt: &Opt) -> Result<Outcome> {
    let k = ColorCount::new(opt.k)?;
    let strategy = match (opt.strategy, opt.amo) {
        (Strategy::OneHot(mut config), Some(amo)) => {
            config.amo = amo;
            Strategy::OneHot(config)
        }
        (Strategy::Quantified, Some(_)) => {
            tracing::warn!("--amo is ignored by the quantified strategy");
            Strategy::Quantified
        }
        (strategy, None) => strategy,
    };
    let deadline = match opt.timeout {
        Some(secs) => {
            let timeout = Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid timeout: {secs}"))?;
            Some(Instant::now() + timeout)
        }
        None => None,
    };

    let format = match opt.format {
        FormatArg::Auto => Format::of_path(&opt.file),
        FormatArg::Dot => Format::Dot,
        FormatArg::Col => Format::Col,
    };
    let document = read_file(&opt.file, format)?;
    let graph = document.to_graph();

    let encoding = encode(&graph, k, &strategy);
    if let Some(path) = &opt.emit_dimacs {
        emit_dimacs(&encoding, path)?;
    }
    if let Some(path) = &opt.emit_smt2 {
        emit_smt2(&encoding, path)?;
    }

    let mut solver = SatSolver::new();
    let outcome = solve_encoding(&graph, &encoding, &mut solver, deadline)?;
    match &outcome {
        Outcome::Colored(assignment) => {
            let palette = Palette::pastel(k.get());
            let colored = document.colored(&graph, assignment, &palette).to_string();
            match &opt.output {
                Some(path) => {
                    std::fs::write(path, colored).with_context(|| format!("Could not write {}", path.display()))?
                }
                None => print!("{colored}"),
            }
        }
        Outcome::Uncolorable => eprintln!("The graph is not {k}-colorable."),
    }
    Ok(outcome)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn emit_dimacs(encoding: &Encoding, path: &Path) -> Result<()> {
    let mut out = create(path)?;
    match &encoding.system {
        ConstraintSystem::Cnf(cnf) => cnf.write_dimacs(&mut out)?,
        ConstraintSystem::Quantified(theory) => Grounding::new(theory)?.cnf().write_dimacs(&mut out)?,
    }
    out.flush()?;
    tracing::info!("DIMACS formula written to {}", path.display());
    Ok(())
}

fn emit_smt2(encoding: &Encoding, path: &Path) -> Result<()> {
    let (ConstraintSystem::Quantified(theory), Metadata::Function(symbols)) = (&encoding.system, &encoding.metadata)
    else {
        bail!("--emit-smt2 requires the quantified strategy");
    };
    let mut out = create(path)?;
    out.write_all(theory.to_smt2(Some((symbols.color, symbols.constants.as_slice()))).as_bytes())?;
    out.flush()?;
    tracing::info!("SMT-LIB script written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line() {
        Opt::command().debug_assert();
        let opt = Opt::try_parse_from(["kcolor", "g.dot", "-k", "3", "--strategy", "quantified"]).unwrap();
        assert_eq!(opt.k, 3);
        assert_eq!(opt.strategy, Strategy::Quantified);
        assert_eq!(opt.format, FormatArg::Auto);
        assert_eq!(opt.log_level, tracing::Level::WARN);
        assert!(Opt::try_parse_from(["kcolor", "g.dot", "-k", "3", "--strategy", "smt"]).is_err());
        let opt = Opt::try_parse_from(["kcolor", "g.col", "-k", "-1"]).unwrap();
        assert!(run(&opt).is_err());
    }
}
