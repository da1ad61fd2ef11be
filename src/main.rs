//! sourcegen - C# source generators for Unity projects
//!
//! # Usage
//!
//! ```bash
//! # Generate into ./Generated from every .cs file under Assets/Scripts
//! sourcegen generate Assets/Scripts
//!
//! # Only the enum extensions, printed instead of written
//! sourcegen generate --only enum --stdout Assets/Scripts/Enums.cs
//!
//! # Report diagnostics and the units a run would produce
//! sourcegen check -v Assets/Scripts
//! ```
//!
//! Settings come from `--config`, else from `sourcegen.toml` in the
//! working directory, else the defaults.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use diagnostics::{Diagnostics, ErrorFormatter};
use generator::{logging, GeneratorConfig, GeneratorDriver, GeneratorRunResult};
use parser::{Compilation, ConstantFolder};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "sourcegen")]
#[command(version = "0.1.0")]
#[command(about = "Generate ToFastString extensions and native cleanup for Unity C# code", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print diagnostics without colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generators and write the generated units
    Generate {
        /// C# files, or directories searched recursively for *.cs
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory the generated units are written to
        #[arg(short, long, default_value = "Generated")]
        output: PathBuf,

        /// Configuration file (defaults to ./sourcegen.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run a single pipeline
        #[arg(long, value_enum)]
        only: Option<Pipeline>,

        /// Print the generated units instead of writing them
        #[arg(long)]
        stdout: bool,
    },

    /// Run the generators and report, without writing anything
    Check {
        /// C# files, or directories searched recursively for *.cs
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Configuration file (defaults to ./sourcegen.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run a single pipeline
        #[arg(long, value_enum)]
        only: Option<Pipeline>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Pipeline {
    /// EnumFastString only
    Enum,
    /// AutoDispose only
    Dispose,
}

/// Outcome of a run that got as far as running the generators
struct Run {
    compilation: Compilation,
    result: GeneratorRunResult,
    diagnostics: Diagnostics,
}

fn main() {
    let cli = Cli::parse();

    match logging::level_for_verbosity(cli.verbose) {
        Some(level) => logging::init_with_level(level),
        None => logging::init_from_env(),
    }

    let result = match cli.command {
        Commands::Generate {
            inputs,
            output,
            config,
            only,
            stdout,
        } => generate(&inputs, &output, config.as_deref(), only, stdout, cli.no_color),
        Commands::Check {
            inputs,
            config,
            only,
        } => check(&inputs, config.as_deref(), only, cli.no_color),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the run was free of errors
fn generate(
    inputs: &[PathBuf],
    output: &Path,
    config: Option<&Path>,
    only: Option<Pipeline>,
    stdout: bool,
    no_color: bool,
) -> Result<bool, String> {
    let run = run_generators(inputs, config, only)?;
    report(&run, no_color);

    if stdout {
        for source in &run.result.sources {
            println!("// {}", source.hint_name);
            print!("{}", source.text);
        }
    } else if !run.result.sources.is_empty() {
        fs::create_dir_all(output)
            .map_err(|e| format!("Failed to create {}: {}", output.display(), e))?;
        for source in &run.result.sources {
            let path = output.join(&source.hint_name);
            fs::write(&path, &source.text)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            log::info!("wrote {}", path.display());
        }
        println!(
            "Generated {} file(s) in {}",
            run.result.sources.len(),
            output.display()
        );
    } else {
        println!("Nothing to generate");
    }

    Ok(!run.diagnostics.has_errors())
}

fn check(
    inputs: &[PathBuf],
    config: Option<&Path>,
    only: Option<Pipeline>,
    no_color: bool,
) -> Result<bool, String> {
    let run = run_generators(inputs, config, only)?;
    report(&run, no_color);

    for source in &run.result.sources {
        println!("would generate {}", source.hint_name);
    }
    println!(
        "{} file(s) parsed, {} error(s), {} warning(s)",
        run.compilation.source_map().len(),
        run.diagnostics.errors().count(),
        run.diagnostics.warnings().count()
    );

    Ok(!run.diagnostics.has_errors())
}

fn run_generators(
    inputs: &[PathBuf],
    config: Option<&Path>,
    only: Option<Pipeline>,
) -> Result<Run, String> {
    let config = load_config(config, only)?;
    let files = collect_sources(inputs)?;
    log::info!("{} source file(s)", files.len());

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        let text = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
        sources.push((file.display().to_string(), text));
    }

    let (compilation, mut diagnostics) = Compilation::from_sources(sources);
    let driver = GeneratorDriver::from_config(&config);
    log::info!("running {}", driver.generator_names().join(", "));
    let result = driver.run(&compilation, &ConstantFolder::new());
    diagnostics.extend(result.diagnostics.clone());

    Ok(Run {
        compilation,
        result,
        diagnostics,
    })
}

fn load_config(path: Option<&Path>, only: Option<Pipeline>) -> Result<GeneratorConfig, String> {
    let default_path = Path::new(GeneratorConfig::FILE_NAME);
    let mut config = match path {
        Some(path) => GeneratorConfig::from_file(path).map_err(|e| e.to_string())?,
        None if default_path.is_file() => {
            GeneratorConfig::from_file(default_path).map_err(|e| e.to_string())?
        }
        None => GeneratorConfig::default(),
    };

    match only {
        Some(Pipeline::Enum) => config.auto_dispose.enabled = false,
        Some(Pipeline::Dispose) => config.enum_strings.enabled = false,
        None => {}
    }
    Ok(config)
}

/// Input files in a stable order. Directories contribute every `*.cs`
/// file below them except previously generated `*.g.cs` units.
fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;
                let path = entry.path();
                if entry.file_type().is_file() && is_source_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(format!("File not found: {}", input.display()));
        }
    }
    Ok(files)
}

fn is_source_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    name.ends_with(".cs") && !name.ends_with(".g.cs")
}

fn report(run: &Run, no_color: bool) {
    if run.diagnostics.is_empty() {
        return;
    }
    let formatter = if no_color || !std::io::stderr().is_terminal() {
        ErrorFormatter::new()
    } else {
        ErrorFormatter::with_colors()
    };
    eprint!(
        "{}",
        formatter.format_diagnostics(&run.diagnostics, run.compilation.source_map())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_filter() {
        assert!(is_source_file(Path::new("Assets/Scripts/Player.cs")));
        assert!(!is_source_file(Path::new("Generated/Player.AutoDispose.g.cs")));
        assert!(!is_source_file(Path::new("notes.md")));
    }

    #[test]
    fn test_only_disables_the_other_pipeline() {
        let config = load_config(None, Some(Pipeline::Enum)).unwrap();
        assert!(config.enum_strings.enabled);
        assert!(!config.auto_dispose.enabled);

        let config = load_config(None, Some(Pipeline::Dispose)).unwrap();
        assert!(!config.enum_strings.enabled);
        assert!(config.auto_dispose.enabled);
    }
}
