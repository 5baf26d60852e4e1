use anyhow::{Context, Result, bail};
use inkline_config::Config;
use inkline_syntax::{RuleTable, outline, parse};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::{env, fs, process};

#[derive(Debug, Default, PartialEq)]
struct Args {
    rules_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Args::default();
        let mut rest = args.iter();
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--rules" => {
                    let Some(path) = rest.next() else {
                        bail!("--rules needs a path");
                    };
                    let path = PathBuf::from(path);
                    parsed.rules_path = Some(Config::expand_path(&path).unwrap_or(path));
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ if parsed.input_path.is_some() => bail!("only one input file is supported"),
                _ => parsed.input_path = Some(PathBuf::from(arg)),
            }
        }
        Ok(parsed)
    }
}

fn load_rules(rules_path: Option<&PathBuf>) -> Result<RuleTable> {
    let config = match rules_path {
        Some(path) => {
            log::info!("Loading rules from {}", path.display());
            match Config::load_from_path(path)? {
                Some(config) => config,
                None => bail!("rules file {} not found", path.display()),
            }
        }
        None => {
            let config_path = Config::config_path();
            log::info!("Config path: {}", config_path.display());
            Config::load()?.unwrap_or_else(|| {
                log::info!("No rules file found, using the reference rules");
                Config::default()
            })
        }
    };
    let rules = config.rule_table()?;
    log::info!("{} rules loaded", rules.len());
    Ok(rules)
}

/// Parses each non-empty line as one block and dumps its tree.
fn render(input: &str, rules: &RuleTable) -> Result<String> {
    let mut out = String::new();
    for (number, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let nodes = parse(line, rules).with_context(|| format!("line {}", number + 1))?;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("# {line}\n"));
        out.push_str(&outline(&nodes));
    }
    Ok(out)
}

fn run(args: Args) -> Result<()> {
    let rules = load_rules(args.rules_path.as_ref())?;

    let input = match &args.input_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let rendered = render(&input, &rules)?;
    io::stdout().write_all(rendered.as_bytes())?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("inkline", String::as_str);
    let parsed = match Args::parse(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} [--rules <rules.toml>] [file]");
            process::exit(2);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
