mod debug_report;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use factum::rules::address::AddressGrammar;
use factum::rules::date::DateGrammar;
use factum::rules::tokenizer::SimpleTokenizer;
use factum::{Extractor, Tokenizer};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GrammarKind {
    Address,
    Date,
    All,
}

/// Extract addresses and dates from Russian text.
///
/// Set RUST_LOG=factum=debug (or trace) to follow the matcher.
#[derive(Parser, Debug)]
#[command(
    name = "factum",
    version,
    after_help = "Exit codes:\n  0  Success.\n  1  Grammar assembly error.\n  2  Invalid arguments or missing input."
)]
struct Args {
    /// Which grammar to run.
    #[arg(short, long, value_enum, default_value_t = GrammarKind::All)]
    grammar: GrammarKind,

    /// Input text. If omitted, the trailing arguments are used, or stdin when there are none.
    #[arg(short, long, conflicts_with = "text")]
    input: Option<String>,

    /// Print run counters and timing.
    #[arg(long)]
    metrics: bool,

    /// Force ANSI color output.
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Disable ANSI color output.
    #[arg(long, overrides_with = "color")]
    no_color: bool,

    /// Date used to fill in a missing year when resolving dates (YYYY-MM-DD). Default: today.
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let input = match read_input(&args) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let extractors = match build_extractors(args.grammar) {
        Ok(extractors) => extractors,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let color = !args.no_color && (args.color || io::stdout().is_terminal());
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let report = debug_report::Report { color, metrics: args.metrics, today };

    let tokens = SimpleTokenizer.tokenize(&input);
    report.print_input(&input, &tokens);
    for (label, extractor) in &extractors {
        let run = extractor.extract_with_metrics(&tokens);
        report.print_run(label, extractor, &tokens, &run);
    }
}

fn build_extractors(kind: GrammarKind) -> factum::Result<Vec<(&'static str, Extractor)>> {
    let mut extractors = Vec::new();
    if matches!(kind, GrammarKind::Address | GrammarKind::All) {
        extractors.push(("address", AddressGrammar::new()?.extractor()?));
    }
    if matches!(kind, GrammarKind::Date | GrammarKind::All) {
        extractors.push(("date", DateGrammar::new()?.extractor()?));
    }
    Ok(extractors)
}

fn read_input(args: &Args) -> Result<String, String> {
    let input = match (&args.input, args.text.is_empty()) {
        (Some(value), _) => value.clone(),
        (None, false) => args.text.join(" "),
        (None, true) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
            buffer
        }
    };

    if input.trim().is_empty() {
        return Err("error: no input provided (see --help)".to_string());
    }
    Ok(input)
}
