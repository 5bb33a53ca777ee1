//! bidocx CLI - markup-annotated text to right-to-left DOCX

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use bidocx::{
    convert, convert_many, convert_with_assets, render, AssetMap, Conversion, Direction,
    JsonFormat, RenderConfig, RenderWarning, TextOptions,
};

#[derive(Parser)]
#[command(name = "bidocx")]
#[command(version)]
#[command(about = "Convert markup-annotated Persian/Latin text to right-to-left DOCX", long_about = None)]
struct Cli {
    /// Input text file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output .docx file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct ConfigArgs {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long, global = true, value_name = "FILE", env = "BIDOCX_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum heading level (1-9)
    #[arg(long, global = true, value_name = "N")]
    max_heading: Option<u8>,

    /// Keep blank lines as empty paragraphs
    #[arg(long, global = true)]
    keep_blank_lines: bool,

    /// Direction used when a block has no majority script
    #[arg(long, global = true, value_enum)]
    direction: Option<DirectionArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert text files to DOCX
    Convert {
        /// Input text files
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output file (single input) or directory (several inputs)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// JSON file mapping placeholder ids to assets
        #[arg(long, value_name = "FILE")]
        assets: Option<PathBuf>,
    },

    /// Dump the assembled document tree as JSON
    Json {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Render the assembled document as plain text
    Text {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Reorder lines to visual order for terminals without bidi support
        #[arg(long)]
        visual: bool,
    },

    /// Show document statistics
    Info {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    /// Right-to-left
    Rtl,
    /// Left-to-right
    Ltr,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Rtl => Direction::Rtl,
            DirectionArg::Ltr => Direction::Ltr,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = build_config(&cli.config).and_then(|config| match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            assets,
        }) => cmd_convert(&inputs, output.as_deref(), assets.as_deref(), &config),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &config),
        Some(Commands::Text {
            input,
            output,
            visual,
        }) => cmd_text(&input, output.as_deref(), visual, &config),
        Some(Commands::Info { input }) => cmd_info(&input, &config),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&[input], cli.output.as_deref(), None, &config)
            } else {
                println!("{}", "Usage: bidocx <FILE> [OUTPUT]".yellow());
                println!("       bidocx --help for more information");
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_config(args: &ConfigArgs) -> CliResult<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };

    if let Some(level) = args.max_heading {
        config = config.with_max_heading(level);
    }
    if args.keep_blank_lines {
        config = config.with_blank_lines(true);
    }
    if let Some(direction) = args.direction {
        config = config.with_base_direction(direction.into());
    }

    config.validate()?;
    Ok(config)
}

fn load_assets(path: &Path) -> CliResult<AssetMap> {
    let json = fs::read_to_string(path)?;
    let assets: AssetMap = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid asset file {}: {}", path.display(), e))?;
    log::debug!("loaded {} asset(s) from {}", assets.len(), path.display());
    Ok(assets)
}

fn read_and_convert(input: &Path, config: &RenderConfig) -> CliResult<Conversion> {
    let text = fs::read_to_string(input)?;
    Ok(convert(&text, config)?)
}

fn print_warnings(source: &Path, warnings: &[RenderWarning]) {
    for warning in warnings {
        eprintln!(
            "{} {}: {}",
            "Warning".yellow().bold(),
            source.display(),
            warning
        );
    }
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    assets: Option<&Path>,
    config: &RenderConfig,
) -> CliResult<()> {
    let assets = assets.map(load_assets).transpose()?;

    let texts = inputs
        .iter()
        .map(fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let results = match &assets {
        Some(assets) => texts
            .iter()
            .map(|text| convert_with_assets(text, config, assets))
            .collect(),
        None => convert_many(&texts, config),
    };

    let single = inputs.len() == 1;
    if let (false, Some(dir)) = (single, output) {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(results) {
        pb.set_message(input.display().to_string());
        let target = output_path(input, output, single);

        match result.and_then(|c| render::to_docx_bytes(&c.tree, config).map(|b| (c, b))) {
            Ok((conversion, bytes)) => {
                fs::write(&target, bytes)?;
                print_warnings(input, &conversion.warnings);
                written.push(target);
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }

    if failed > 0 {
        return Err(format!("{} of {} input(s) failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn output_path(input: &Path, output: Option<&Path>, single: bool) -> PathBuf {
    match output {
        Some(path) if single => path.to_path_buf(),
        Some(dir) => {
            let name = input.file_stem().unwrap_or_default();
            dir.join(name).with_extension("docx")
        }
        None => input.with_extension("docx"),
    }
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    config: &RenderConfig,
) -> CliResult<()> {
    let conversion = read_and_convert(input, config)?;
    print_warnings(input, &conversion.warnings);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&conversion.tree, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    visual: bool,
    config: &RenderConfig,
) -> CliResult<()> {
    let conversion = read_and_convert(input, config)?;
    print_warnings(input, &conversion.warnings);

    let mut options = TextOptions::new();
    if visual {
        options = options.visual();
    }
    let text = render::to_text(&conversion.tree, &options)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_info(input: &Path, config: &RenderConfig) -> CliResult<()> {
    let conversion = read_and_convert(input, config)?;
    let tree = &conversion.tree;
    let stats = &conversion.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = tree.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    let direction = match tree.section.direction {
        Some(Direction::Ltr) => "left-to-right",
        _ => "right-to-left",
    };
    println!("{}: {}", "Direction".bold(), direction);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Formulas".bold(), stats.formula_count);
    println!("{}: {}", "Captions".bold(), stats.caption_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Runs".bold(), stats.run_count);
    println!("{}: {}", "RTL blocks".bold(), stats.rtl_block_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    if conversion.has_warnings() {
        println!();
        println!("{}", "Warnings".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        for warning in &conversion.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "bidocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Bidirectional rich-text to DOCX converter");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let input = Path::new("notes/report.txt");
        assert_eq!(output_path(input, None, true), PathBuf::from("notes/report.docx"));
        assert_eq!(
            output_path(input, Some(Path::new("out.docx")), true),
            PathBuf::from("out.docx")
        );
        assert_eq!(
            output_path(input, Some(Path::new("dist")), false),
            PathBuf::from("dist/report.docx")
        );
    }

    #[test]
    fn test_build_config_overrides() {
        let args = ConfigArgs {
            max_heading: Some(5),
            keep_blank_lines: true,
            direction: Some(DirectionArg::Ltr),
            ..Default::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_heading_level, 5);
        assert!(config.preserve_blank_lines);
        assert_eq!(config.base_direction, Direction::Ltr);
    }

    #[test]
    fn test_build_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_table_columns": 10}"#).unwrap();

        let args = ConfigArgs {
            config: Some(path),
            ..Default::default()
        };
        assert_eq!(build_config(&args).unwrap().max_table_columns, 10);
    }

    #[test]
    fn test_convert_writes_docx() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        fs::write(&input, "# عنوان\nمتن").unwrap();

        cmd_convert(&[input.clone()], None, None, &RenderConfig::default()).unwrap();
        let bytes = fs::read(input.with_extension("docx")).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["bidocx", "convert", "a.txt", "b.txt", "-o", "out", "--keep-blank-lines"]);
        assert!(cli.config.keep_blank_lines);
        match cli.command {
            Some(Commands::Convert { inputs, output, .. }) => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected convert"),
        }
    }
}
