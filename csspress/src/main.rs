mod format;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use csspress_lib::press::css_press::{self, PressOptions};
use csspress_lib::style::optimizer::OptimizerOptions;
use csspress_lib::usage::cleaner::{CleanerOptions, ScanStrategy};
use format::{readable_size, readable_time};
use log::info;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

const CSSPRESS_INTRO: &str = r#"
      ___________ ____  ________  ________  ________
     / ____/ ___// ___// __ \/ _ \/ ___/ / ___/ ___/
    / /    \__ \ \__ \/ /_/ /  __/ /  (__  |__  )
    \____/____/ /____/ .___/\___/_/  /____/____/
                    /_/

    csspress - optimize, prefix and clean stylesheets
"#;

#[derive(Parser, Debug)]
#[command(name = "csspress")]
#[command(about = "Optimize, compress, prefix and clean CSS")]
struct Args {
    /// Input file, or the literal CSS source with --stdin.
    input: Option<String>,

    /// Output file. Prints to stdout when omitted.
    output: Option<PathBuf>,

    /// Compress the output.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    compress: bool,

    /// Optimize colors, units and shorthands.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    optimize: bool,

    /// Merge rules with identical bodies (may change cascade order).
    #[arg(short = 'x', long)]
    extra: bool,

    /// Remove IE-only hacks.
    #[arg(long)]
    remove_ie_hacks: bool,

    /// Vendor prefixes to add: "all", a list like "webkit,msie", or "" for none.
    #[arg(short, long, default_value = "all")]
    vendors: String,

    /// Read the stylesheet from stdin.
    #[arg(short = 'r', long)]
    stdin: bool,

    /// Remove selectors unused by the project sources.
    #[arg(short = 'u', long)]
    clean: bool,

    /// Project source paths, joined with the platform path separator.
    #[arg(short, long)]
    paths: Option<String>,

    /// Clean mode: safe or best.
    #[arg(short, long, default_value = "safe")]
    mode: String,

    /// Comma-separated extensions to scan.
    #[arg(short, long)]
    extensions: Option<String>,

    /// Write a selector usage report to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log progress.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args: Args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("FATAL ERROR: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let start = Instant::now();
    let source = read_input(&args)?;
    let options = press_options(&args)?;

    let pressed = css_press::generate(&source, &options)?;
    if let Some(summary) = &pressed.clean {
        info!(
            "Scanned {} files, removed {} selectors",
            summary.files_scanned,
            summary.removed_selectors.len()
        );
    }

    let Some(output) = &args.output else {
        print!("{}", pressed.css);
        return Ok(());
    };

    println!("{}", CSSPRESS_INTRO);
    println!("Optimized in {}", readable_time(start.elapsed()));
    println!("Input size {}", readable_size(source.len()));
    let ratio = if source.is_empty() {
        100.0
    } else {
        (pressed.css.len() as f64 / source.len() as f64 * 100.0).round()
    };
    println!(
        "Output size {} ({}% of original)",
        readable_size(pressed.css.len()),
        ratio
    );

    fs::write(output, &pressed.css)
        .with_context(|| format!("could not write to file {}", output.display()))?;
    Ok(())
}

fn read_input(args: &Args) -> anyhow::Result<String> {
    if args.stdin {
        if let Some(literal) = &args.input {
            return Ok(literal.clone());
        }
        let mut data = String::new();
        io::stdin()
            .read_to_string(&mut data)
            .context("could not read from stdin")?;
        return Ok(data);
    }

    let Some(input) = &args.input else {
        bail!("no input file given, see --help");
    };
    fs::read_to_string(input).with_context(|| format!("could not read file {}", input))
}

fn press_options(args: &Args) -> anyhow::Result<PressOptions> {
    let optimizer = OptimizerOptions {
        compress: args.compress,
        optimize: args.optimize,
        extra_optimize: args.extra,
        remove_ie_hacks: args.remove_ie_hacks,
        prefixes: args.vendors.clone(),
        ..Default::default()
    };

    let cleaner = if args.clean {
        let Some(paths) = &args.paths else {
            bail!("please indicate the project source path with --paths; join multiple paths with the platform path separator");
        };
        let mut options = CleanerOptions {
            project_paths: env::split_paths(paths).collect(),
            strategy: args.mode.parse::<ScanStrategy>()?,
            report: args.report.clone(),
            ..Default::default()
        };
        if let Some(extensions) = &args.extensions {
            options.extensions = extensions.split(',').map(|e| e.trim().to_string()).collect();
        }
        Some(options)
    } else {
        None
    };

    Ok(PressOptions { optimizer, cleaner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["csspress", "in.css"]);
        let options = press_options(&args).unwrap();

        assert!(options.optimizer.compress);
        assert!(options.optimizer.optimize);
        assert_eq!(options.optimizer.prefixes, "all");
        assert!(options.cleaner.is_none());
    }

    #[test]
    fn test_bool_flags_take_values() {
        let args = Args::parse_from(["csspress", "-c", "false", "-o", "false", "-v", "", "in.css"]);
        let options = press_options(&args).unwrap();

        assert!(!options.optimizer.compress);
        assert!(!options.optimizer.optimize);
        assert_eq!(options.optimizer.prefixes, "");
    }

    #[test]
    fn test_clean_requires_paths() {
        let args = Args::parse_from(["csspress", "-u", "in.css"]);

        assert!(press_options(&args).is_err());
    }

    #[test]
    fn test_clean_options() {
        let joined = env::join_paths(["src", "templates"]).unwrap();
        let joined = joined.to_str().unwrap();
        let args = Args::parse_from(["csspress", "-u", "-p", joined, "-m", "best", "-e", "html, vue", "in.css"]);
        let cleaner = press_options(&args).unwrap().cleaner.unwrap();

        assert_eq!(cleaner.project_paths, vec![PathBuf::from("src"), PathBuf::from("templates")]);
        assert_eq!(cleaner.strategy, ScanStrategy::BestEffort);
        assert_eq!(cleaner.extensions, vec!["html", "vue"]);
    }

    #[test]
    fn test_invalid_mode_is_fatal() {
        let args = Args::parse_from(["csspress", "-u", "-p", "src", "-m", "fast", "in.css"]);
        let err = press_options(&args).unwrap_err();

        assert!(err.to_string().contains("fast"));
    }

    #[test]
    fn test_stdin_literal_source() {
        let args = Args::parse_from(["csspress", "-r", "a{color:red}"]);

        assert_eq!(read_input(&args).unwrap(), "a{color:red}");
    }
}
