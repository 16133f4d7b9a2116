use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use scspell::checker::{Mode, SpellChecker};
use scspell::cli::{output, TerminalConsole};
use scspell::config::Overrides;
use scspell::dict::manager::{self, WordKind};
use scspell::dict::DictStore;
use scspell::{Config, ScspellError};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "scspell")]
#[command(version, about = "A conservative interactive spell checker for source code", long_about = None)]
struct Cli {
    /// Source files to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Report unmatched words on stderr and exit 1 instead of prompting
    #[arg(long)]
    report_only: bool,

    /// Treat backslash as ordinary punctuation
    #[arg(long)]
    no_c_escapes: bool,

    /// Use this dictionary file for this session only
    #[arg(long, value_name = "FILE", global = true)]
    override_dictionary: Option<PathBuf>,

    /// Read-only dictionary consulted in addition to the active one
    #[arg(long = "base-dict", value_name = "FILE", global = true)]
    base_dicts: Vec<PathBuf>,

    /// Use the builtin dictionary as a read-only base dictionary
    #[arg(long, global = true)]
    use_builtin_base_dict: bool,

    /// Root directory for the file ID mapping
    #[arg(long, value_name = "DIR", global = true)]
    relative_to: Option<PathBuf>,

    /// Lines of surrounding source shown by the context action
    #[arg(long, value_name = "N")]
    context_lines: Option<usize>,

    /// Print debug logging
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary and file ID maintenance
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// Print a new `scspell-id:` marker to paste into a file
    GenId,
    /// Permanently use FILE as the dictionary
    SetDictionary { file: PathBuf },
    /// Copy the dictionary to FILE
    Export { file: PathBuf },
    /// Remove words that the base dictionaries already contain
    FilterBase,
    /// Merge the file-specific dictionary of FROM into TO (ids or files)
    Merge { from: String, to: String },
    /// Give TO the same file ID as FROM
    Copy { from: PathBuf, to: PathBuf },
    /// Move the file ID of FROM to TO
    Rename { from: PathBuf, to: PathBuf },
    /// Forget the file IDs of FILES
    Delete {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Add WORD to a dictionary (natural, programming or file)
    Add {
        kind: WordKind,
        word: String,
        /// File that selects the language or file ID
        file: Option<PathBuf>,
    },
    /// Summarize the active dictionary
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            if matches!(e.downcast_ref::<ScspellError>(), Some(ScspellError::Aborted)) {
                eprintln!("User abort.");
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "scspell", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(Commands::Dict { action: DictCommands::GenId }) = &cli.command {
        println!("{}", manager::gen_id());
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(Commands::Dict {
        action: DictCommands::SetDictionary { file },
    }) = &cli.command
    {
        manager::set_dictionary(file)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load(Overrides {
        dictionary: cli.override_dictionary.clone(),
        base_dicts: cli.base_dicts.clone(),
        use_builtin_base_dict: cli.use_builtin_base_dict,
        relative_to: cli.relative_to.clone(),
        no_c_escapes: cli.no_c_escapes,
        context_lines: cli.context_lines,
    })?;
    let dictionary = config.dictionary_path()?;
    log::debug!("using dictionary {}", dictionary.display());
    let store = DictStore::open(&dictionary, &config)
        .with_context(|| format!("Failed to open dictionary {}", dictionary.display()))?;

    if let Some(Commands::Dict { action }) = cli.command {
        handle_dict_command(action, store)?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let mode = if cli.report_only {
        Mode::ReportOnly
    } else {
        Mode::Interactive
    };
    let colored = !cli.no_color;
    let report = SpellChecker::new(store, TerminalConsole::new(), mode)
        .with_escapes(config.c_escapes())
        .with_context_lines(config.context_lines())
        .with_color(colored)
        .run(&cli.files)?;

    if mode == Mode::Interactive {
        output::print_fix_summary(report.corrections, report.files_changed, colored);
    }

    if report.has_unmatched() || report.failed_files > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_dict_command(action: DictCommands, mut store: DictStore) -> Result<()> {
    match action {
        DictCommands::GenId | DictCommands::SetDictionary { .. } => {}
        DictCommands::Export { file } => manager::export_dictionary(&store, &file)?,
        DictCommands::FilterBase => {
            manager::filter_out_base_dicts(&mut store)?;
        }
        DictCommands::Merge { from, to } => manager::merge(&mut store, &from, &to)?,
        DictCommands::Copy { from, to } => manager::copy_file(&mut store, &from, &to)?,
        DictCommands::Rename { from, to } => manager::rename_file(&mut store, &from, &to)?,
        DictCommands::Delete { files } => manager::delete_files(&mut store, &files)?,
        DictCommands::Add { kind, word, file } => {
            manager::add_to_dict(&mut store, kind, &word, file.as_deref())?
        }
        DictCommands::Info => manager::show_info(&store)?,
    }
    Ok(())
}
