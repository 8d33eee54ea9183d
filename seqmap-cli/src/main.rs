//! seqmap CLI - Command-line tool for lazy sequence transformations
//!
//! This binary reads a JSON document (file or stdin), narrows it with an
//! optional JSON pointer and provides:
//! - flatten: path-keyed entries, inner nodes included
//! - leaves: path-keyed leaf values
//! - group: bucket elements by member values
//! - sort: stable multi-column sort
//! - tree: branch-marked text rendering

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use seqmap_core::{Assoc, Key, Limits, MappedValue, Source};
use seqmap_engine::{Chain, Criterion, Extractor, Pipeline, SortFlags, SortSpec, Transform};
use seqmap_io::{select_from_reader, PointerLimits};
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seqmap")]
#[command(about = "Lazy sequence transformations over JSON documents")]
#[command(version)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a nested sequence into path-keyed entries
    ///
    /// Examples:
    ///   seqmap flatten data.json
    ///   seqmap flatten data.json --pointer /config --glue .
    Flatten {
        #[command(flatten)]
        input: InputArgs,
        /// Separator joining key paths
        #[arg(long)]
        glue: Option<String>,
    },
    /// Keep only leaf values, keyed by their joined key path
    ///
    /// Examples:
    ///   seqmap leaves data.json --glue .
    Leaves {
        #[command(flatten)]
        input: InputArgs,
        /// Separator joining key paths
        #[arg(long)]
        glue: Option<String>,
    },
    /// Group elements into nested buckets by member values
    ///
    /// Examples:
    ///   seqmap group orders.json --pointer /orders --by customer
    ///   seqmap group orders.json --pointer /orders --by region --by customer
    Group {
        #[command(flatten)]
        input: InputArgs,
        /// Member naming one group level (repeat for nested levels)
        #[arg(long = "by", value_name = "MEMBER")]
        by: Vec<String>,
    },
    /// Sort elements, preserving their keys
    ///
    /// Examples:
    ///   seqmap sort numbers.json
    ///   seqmap sort orders.json --pointer /orders --by total --desc
    ///   seqmap sort files.json --mode natural --case-insensitive
    Sort {
        #[command(flatten)]
        input: InputArgs,
        /// Member to sort by (repeat for tie-breaking columns)
        #[arg(long = "by", value_name = "MEMBER")]
        by: Vec<String>,
        /// Comparison mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Fold case before comparing strings
        #[arg(long)]
        case_insensitive: bool,
        /// Order by key instead of value (ignored with --by)
        #[arg(long, conflicts_with = "by")]
        by_key: bool,
        /// Sort in descending order
        #[arg(long)]
        desc: bool,
        /// Emit `[key, value]` pairs instead of bare values
        #[arg(long)]
        with_keys: bool,
    },
    /// Render the tree with branch markers
    ///
    /// Examples:
    ///   seqmap tree data.json
    ///   seqmap tree data.json --indent "    "
    Tree {
        #[command(flatten)]
        input: InputArgs,
        /// Indentation unit per depth level
        #[arg(long)]
        indent: Option<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input JSON document (reads stdin when omitted or "-")
    input: Option<PathBuf>,
    /// JSON Pointer to the sequence to process
    #[arg(long)]
    pointer: Option<String>,
    /// TOML file with defaults for pointer, separators, grouping, sorting and limits
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ModeArg {
    #[default]
    Regular,
    Numeric,
    String,
    Locale,
    Natural,
}

impl ModeArg {
    fn flags(self) -> SortFlags {
        match self {
            ModeArg::Regular => SortFlags::REGULAR,
            ModeArg::Numeric => SortFlags::NUMERIC,
            ModeArg::String => SortFlags::STRING,
            ModeArg::Locale => SortFlags::LOCALE_STRING,
            ModeArg::Natural => SortFlags::NATURAL,
        }
    }
}

/// Contents of a `--config` file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RunConfig {
    pointer: Option<String>,
    glue: Option<String>,
    indent: Option<String>,
    group_by: Vec<String>,
    sort: Vec<ColumnConfig>,
    limits: LimitsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnConfig {
    member: String,
    #[serde(default)]
    descending: bool,
    #[serde(default)]
    mode: ModeArg,
    #[serde(default)]
    case_insensitive: bool,
}

impl ColumnConfig {
    fn criterion(&self) -> Criterion {
        let criterion = Criterion::member(self.member.as_str())
            .with_flags(column_flags(self.mode, self.case_insensitive));
        if self.descending {
            criterion.desc()
        } else {
            criterion
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LimitsConfig {
    max_tree_depth: Option<usize>,
    max_group_depth: Option<usize>,
    max_pointer_depth: Option<usize>,
    max_pointer_length: Option<usize>,
    max_buffer_bytes: Option<usize>,
}

impl LimitsConfig {
    fn engine(&self) -> Result<Limits, Box<dyn Error>> {
        let mut limits = Limits::default();
        if let Some(depth) = self.max_tree_depth {
            limits.max_tree_depth = depth;
        }
        if let Some(depth) = self.max_group_depth {
            limits.max_group_depth = depth;
        }
        limits.validate()?;
        Ok(limits)
    }

    fn pointer(&self) -> Result<PointerLimits, Box<dyn Error>> {
        let mut limits = PointerLimits::default();
        if let Some(depth) = self.max_pointer_depth {
            limits.max_depth = depth;
        }
        if let Some(length) = self.max_pointer_length {
            limits.max_pointer_length = length;
        }
        if let Some(bytes) = self.max_buffer_bytes {
            limits.max_buffer_bytes = bytes;
        }
        limits.validate()?;
        Ok(limits)
    }
}

/// Selected source plus everything the subcommands need to process it
struct Loaded {
    source: Source,
    config: RunConfig,
    limits: Limits,
    compact: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Flatten { input, glue } => handle_paths(input, glue, false)?,
        Commands::Leaves { input, glue } => handle_paths(input, glue, true)?,
        Commands::Group { input, by } => handle_group(input, by)?,
        Commands::Sort {
            input,
            by,
            mode,
            case_insensitive,
            by_key,
            desc,
            with_keys,
        } => {
            let options = SortOptions {
                by,
                mode,
                case_insensitive,
                by_key,
                desc,
                with_keys,
            };
            handle_sort(input, options)?;
        }
        Commands::Tree { input, indent } => handle_tree(input, indent)?,
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when embedded; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load(args: InputArgs) -> Result<Loaded, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    let limits = config.limits.engine()?;
    let pointer_limits = config.limits.pointer()?;
    let pointer = args
        .pointer
        .or_else(|| config.pointer.clone())
        .unwrap_or_default();

    let selection = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            select_from_reader(fs::File::open(path)?, &pointer, &pointer_limits)?
        }
        _ => {
            let mut buffer = Vec::new();
            io::stdin().lock().read_to_end(&mut buffer)?;
            select_from_reader(buffer.as_slice(), &pointer, &pointer_limits)?
        }
    };
    info!(
        pointer = %selection.pointer,
        bytes = selection.bytes_read,
        elements = selection.elements,
        elapsed = ?selection.duration,
        "loaded input"
    );

    Ok(Loaded {
        source: selection.source,
        config,
        limits,
        compact: args.compact,
    })
}

fn load_config(path: &Path) -> Result<RunConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let config: RunConfig = toml::from_str(&text)
        .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

fn handle_paths(args: InputArgs, glue: Option<String>, leaves_only: bool) -> Result<(), Box<dyn Error>> {
    let loaded = load(args)?;
    let glue = glue
        .or_else(|| loaded.config.glue.clone())
        .unwrap_or_else(|| seqmap_core::constants::DEFAULT_PATH_GLUE.to_string());

    let pipeline = Pipeline::new(loaded.source).with_limits(loaded.limits);
    let result = if leaves_only {
        pipeline.leaves(&glue)?
    } else {
        pipeline.flatten(&glue)?
    };
    write_json(&result.to_json(), loaded.compact)
}

fn handle_group(args: InputArgs, by: Vec<String>) -> Result<(), Box<dyn Error>> {
    let loaded = load(args)?;
    let members = if by.is_empty() {
        loaded.config.group_by.clone()
    } else {
        by
    };
    if members.is_empty() {
        return Err("group needs at least one --by member (or group_by in the config)".into());
    }

    let chain = Chain::from(group_by_members(members));
    let result = seqmap_engine::traverse(&loaded.source, &chain, &loaded.limits)?;
    write_json(&result.to_json(), loaded.compact)
}

/// Group path made of each member's value, in order
fn group_by_members(members: Vec<String>) -> Transform {
    let extractors: Vec<Extractor> = members
        .into_iter()
        .map(|member| Extractor::Member(Key::from(member)))
        .collect();
    Transform::new(move |value, key, _| {
        let path = extractors
            .iter()
            .map(|extractor| extractor.extract(&value, key).map(|v| Key::from_value(&v)))
            .collect::<seqmap_core::Result<Vec<Key>>>()?;
        Ok(MappedValue::group(path).into())
    })
}

struct SortOptions {
    by: Vec<String>,
    mode: Option<ModeArg>,
    case_insensitive: bool,
    by_key: bool,
    desc: bool,
    with_keys: bool,
}

fn column_flags(mode: ModeArg, case_insensitive: bool) -> SortFlags {
    if case_insensitive {
        mode.flags() | SortFlags::CASE_INSENSITIVE
    } else {
        mode.flags()
    }
}

fn sort_spec(options: &SortOptions, config: &RunConfig) -> SortSpec {
    let flags = column_flags(options.mode.unwrap_or_default(), options.case_insensitive);

    if !options.by.is_empty() {
        let columns = options
            .by
            .iter()
            .map(|member| {
                let criterion = Criterion::member(member.as_str()).with_flags(flags);
                if options.desc {
                    criterion.desc()
                } else {
                    criterion
                }
            })
            .collect::<Vec<_>>();
        return SortSpec::Columns(columns);
    }
    if !options.by_key && !config.sort.is_empty() {
        return SortSpec::Columns(config.sort.iter().map(ColumnConfig::criterion).collect());
    }

    let mut flags = flags;
    if options.by_key {
        flags = flags | SortFlags::BY_KEY;
    }
    if options.desc {
        flags = flags | SortFlags::DESC;
    }
    SortSpec::Flags(flags)
}

fn handle_sort(args: InputArgs, options: SortOptions) -> Result<(), Box<dyn Error>> {
    let loaded = load(args)?;
    let spec = sort_spec(&options, &loaded.config);
    debug!(?spec, "sorting");

    let sorted = seqmap_engine::sort(&loaded.source, &spec, &loaded.limits)?;
    write_json(&sorted_json(&sorted, options.with_keys), loaded.compact)
}

/// Sorted entries as a JSON array; keys travel along as `[key, value]` pairs on request
fn sorted_json(sorted: &Assoc, with_keys: bool) -> serde_json::Value {
    let items = sorted
        .iter()
        .map(|(key, value)| {
            if with_keys {
                serde_json::Value::Array(vec![key.to_value().to_json(), value.to_json()])
            } else {
                value.to_json()
            }
        })
        .collect();
    serde_json::Value::Array(items)
}

fn handle_tree(args: InputArgs, indent: Option<String>) -> Result<(), Box<dyn Error>> {
    let loaded = load(args)?;
    let unit = indent
        .or_else(|| loaded.config.indent.clone())
        .unwrap_or_else(|| seqmap_core::constants::DEFAULT_INDENT.to_string());

    let lines = Pipeline::new(loaded.source)
        .with_limits(loaded.limits)
        .tree_lines(&unit)?;
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}

fn write_json(value: &serde_json::Value, compact: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    if compact {
        serde_json::to_writer(&mut stdout, value)?;
    } else {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}
