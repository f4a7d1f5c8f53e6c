use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cipher::Keyring;
use crate::config::PASSWORD_ENV;
use crate::container::TrailerFormat;
use crate::file::{self, Discovery, Rewriter};
use crate::report;
use crate::secret::Password;
use crate::types::ProcessorMode;
use crate::ui::display;
use crate::ui::progress::Bar;
use crate::ui::prompt;
use crate::worker::Orchestrator;

#[derive(Args)]
pub struct BatchArgs {
    /// Files or directories to rewrite in place.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    #[arg(short, long, env = PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,

    /// Worker threads [default: min(32, 2 x CPUs)].
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Glob pattern for paths to skip; matches the full path or any component.
    #[arg(short, long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Where the failure log goes.
    #[arg(long, value_name = "DIR", default_value = ".")]
    log_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    Encrypt {
        #[command(flatten)]
        args: BatchArgs,

        /// Write the JSON trailer read by older tools instead of the binary one.
        #[arg(long)]
        legacy: bool,
    },

    Decrypt {
        #[command(flatten)]
        args: BatchArgs,
    },

    Interactive,
}

#[derive(Parser)]
#[command(name = "sealdir", version, about = "Encrypt directory trees in place with ChaCha20-Poly1305.")]
pub struct App {
    #[command(subcommand)]
    command: Option<Commands>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();

        let level = match app.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        Ok(app)
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::Encrypt { args, legacy }) => {
                let format = if legacy { TrailerFormat::Legacy } else { TrailerFormat::Binary };
                Self::run_batch(args, ProcessorMode::Encrypt, format)
            }
            Some(Commands::Decrypt { args }) => Self::run_batch(args, ProcessorMode::Decrypt, TrailerFormat::Binary),
            Some(Commands::Interactive) | None => Self::run_interactive(),
        }
    }

    fn run_batch(args: BatchArgs, mode: ProcessorMode, format: TrailerFormat) -> Result<()> {
        let orchestrator = Orchestrator::new(args.workers)?;
        let paths = Discovery::new(args.exclude).collect(&args.paths)?;
        if paths.is_empty() {
            display::show_no_files();
            return Ok(());
        }

        let password = match args.password {
            Some(password) => Password::from_string(password),
            None => Self::get_password(mode)?,
        };

        Self::process(mode, format, paths, password, &orchestrator, &args.log_dir)
    }

    fn run_interactive() -> Result<()> {
        display::clear_screen()?;
        display::print_banner();

        let mode = prompt::select_processing_mode()?;
        let root = PathBuf::from(prompt::input_path()?);
        let orchestrator = Orchestrator::new(Some(prompt::worker_count(Orchestrator::default_workers())?))?;

        let paths = Discovery::default().collect(std::slice::from_ref(&root))?;
        if paths.is_empty() {
            bail!("no files found under {}", root.display());
        }
        display::show_discovered(paths.len(), file::total_size(&paths));

        if !prompt::confirm(&format!("{} {} file(s) in place?", mode.label(), paths.len()))? {
            bail!("operation canceled");
        }

        let password = Self::get_password(mode)?;
        Self::process(mode, TrailerFormat::Binary, paths, password, &orchestrator, Path::new("."))
    }

    fn process(mode: ProcessorMode, format: TrailerFormat, paths: Vec<PathBuf>, password: Password, orchestrator: &Orchestrator, log_dir: &Path) -> Result<()> {
        let keyring = Keyring::new(password).context("cannot use password")?;
        let rewriter = Rewriter::new(&keyring, format);

        let bar = Bar::new(paths.len() as u64, mode.progress_label())?;
        let started = Instant::now();
        let result = orchestrator.run(paths, mode, &rewriter, Some(&bar)).with_context(|| format!("{mode} failed"))?;
        bar.finish();

        display::show_summary(mode, &result, started.elapsed());

        if let Some(path) = report::write_failure_log(log_dir, mode, &result)? {
            display::show_log_written(&path);
            bail!("{} of {} file(s) failed", result.failed.len(), result.total());
        }

        Ok(())
    }

    fn get_password(mode: ProcessorMode) -> Result<Password> {
        let password = match mode {
            ProcessorMode::Encrypt => prompt::encryption_password()?,
            ProcessorMode::Decrypt => prompt::decryption_password()?,
        };
        Ok(Password::from_string(password))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_encrypt() {
        let app = App::try_parse_from(["sealdir", "-vv", "encrypt", "a", "b", "-j", "4", "--legacy", "-e", "*.log", "-p", "pw"]).unwrap();
        assert_eq!(app.verbose, 2);

        let Some(Commands::Encrypt { args, legacy }) = app.command else { panic!("expected encrypt") };
        assert!(legacy);
        assert_eq!(args.paths, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.workers, Some(4));
        assert_eq!(args.exclude, ["*.log"]);
        assert_eq!(args.password.as_deref(), Some("pw"));
        assert_eq!(args.log_dir, PathBuf::from("."));
    }

    #[test]
    fn test_decrypt_requires_paths() {
        assert!(App::try_parse_from(["sealdir", "decrypt"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        assert!(App::try_parse_from(["sealdir"]).unwrap().command.is_none());
    }
}
