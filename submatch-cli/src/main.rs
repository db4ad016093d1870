use clap::{Parser, Subcommand};
use colored::Colorize;
use submatch::{CompiledExpression, Match, ModeFlags, Options, Range, Registry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "submatch")]
#[command(about = "Submatch - composable regular expressions with sub-match extraction")]
#[command(version)]
struct Cli {
    /// Register a sub-expression variant as ID=PATTERN (repeatable)
    #[arg(short, long = "define", value_name = "ID=PATTERN", global = true)]
    define: Vec<String>,

    /// Mode flags prepended to compiled patterns, e.g. "is" or "m"
    #[arg(long, global = true)]
    flags: Option<String>,

    /// Maximum sub-expression nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log compilation details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a pattern and show the flat pattern and its tables
    Compile {
        /// The pattern, with ${ID} references
        pattern: String,
    },
    /// Find matches and show their sub-matches
    Find {
        /// The pattern, with ${ID} references
        pattern: String,
        /// The input string
        input: String,
        /// Show every match instead of the first
        #[arg(short, long)]
        all: bool,
    },
    /// Check if pattern matches; exits with 1 when it does not
    Test {
        /// The pattern, with ${ID} references
        pattern: String,
        /// The input string
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = build_registry(&cli);

    match &cli.command {
        Commands::Compile { pattern } => cmd_compile(&registry, pattern),
        Commands::Find {
            pattern,
            input,
            all,
        } => cmd_find(&registry, pattern, input, *all),
        Commands::Test { pattern, input } => cmd_test(&registry, pattern, input),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_registry(cli: &Cli) -> Registry {
    let mut options = Options::default();
    if let Some(flags) = &cli.flags {
        options = options.with_flags(ModeFlags::from_string(flags));
    }
    if let Some(max_depth) = cli.max_depth {
        options = options.with_max_depth(max_depth);
    }

    let mut registry = Registry::with_options(options);
    registry.add_function("range", Range);

    for definition in &cli.define {
        match definition.split_once('=') {
            Some((id, pattern)) if !id.is_empty() => {
                registry.add(id, pattern);
            }
            _ => fail(format!("invalid definition '{}', expected ID=PATTERN", definition)),
        }
    }
    registry
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn compile(registry: &Registry, pattern: &str) -> CompiledExpression {
    match registry.compile(pattern) {
        Ok(compiled) => compiled,
        Err(e) => fail(e),
    }
}

fn cmd_compile(registry: &Registry, pattern: &str) {
    println!("{}", "Compiling pattern...".bold());
    println!("  Input:  {}", pattern.cyan());
    println!();

    let compiled = compile(registry, pattern);

    println!("{}", "Output:".bold());
    println!("  {}", compiled.pattern().green());
    println!("  Groups: {}", compiled.group_count() - 1);

    if !compiled.group_names().is_empty() {
        println!();
        println!("{}", "Named groups:".bold());
        for (index, name) in compiled.group_names().iter() {
            println!("  Group {}: {}", index, name.cyan());
        }
    }

    if !compiled.anchors().is_empty() {
        println!();
        println!("{}", "Sub-expressions:".bold());
        for (index, anchor) in compiled.anchors().iter() {
            let variants = compiled.variants(&anchor.id).map_or(0, <[_]>::len);
            println!(
                "  Group {}: {}#{} ({} variant(s))",
                index,
                anchor.id.cyan(),
                anchor.occurrence,
                variants
            );
        }
    }
}

fn cmd_find(registry: &Registry, pattern: &str, input: &str, all: bool) {
    let compiled = compile(registry, pattern);

    let matches: Vec<Match> = if all {
        compiled.find_iter(input).collect()
    } else {
        compiled.find(input).into_iter().collect()
    };

    if matches.is_empty() {
        println!("{}", "No matches found".red());
        return;
    }

    println!(
        "{} {}",
        "Found".bold(),
        format!("{} match(es)", matches.len()).green()
    );
    for (i, m) in matches.iter().enumerate() {
        println!();
        let range = m.range();
        println!(
            "  {} {}..{} = {}",
            format!("Match {}:", i + 1).bold(),
            range.start,
            range.end,
            m.as_str().green()
        );
        print_match(m, 2);
    }
}

/// Print named groups and the sub-match tree of `m`
fn print_match(m: &Match, indent: usize) {
    let pad = "  ".repeat(indent);

    for (name, value) in m.named_groups() {
        println!("{}{} = {}", pad, name.cyan(), value.green());
    }

    for id in m.sub_expression_ids() {
        let occurrences = m.expression().anchors().occurrences(id);
        for occurrence in 0..occurrences {
            let Some(sub) = m.sub_match_nth(id, occurrence) else {
                continue;
            };
            let range = sub.range();
            let label = if occurrences > 1 {
                format!("${{{}}}#{}", id, occurrence)
            } else {
                format!("${{{}}}", id)
            };
            println!(
                "{}{} {}..{} = {}",
                pad,
                label.yellow(),
                range.start,
                range.end,
                sub.as_str().green()
            );
            print_match(&sub, indent + 1);
        }
    }
}

fn cmd_test(registry: &Registry, pattern: &str, input: &str) {
    let compiled = compile(registry, pattern);

    if compiled.is_match(input) {
        println!("{}", "✓ Matches".green().bold());
    } else {
        println!("{}", "✗ Does not match".red().bold());
        std::process::exit(1);
    }
}
