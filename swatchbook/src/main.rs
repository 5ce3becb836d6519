use std::path::PathBuf;
use std::process::ExitCode;

use swatch::error::Result;
use swatch::templating::minijinja::MiniJinjaEngine;

use crate::project::Swatchbook;

mod config;
mod copy;
mod project;
mod util;

pub const CONFIG_FILE: &str = "swatch.toml";
pub const LOG_ENV: &str = "SWATCH_LOG";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Build a pattern-library site.
        cmd swatchbook {
            /// Project root. Defaults to the current directory.
            optional root: PathBuf
            /// Configuration file, relative to the project root.
            optional -c, --config path: PathBuf
            /// Log debugging output.
            optional -v, --verbose
            /// Print the resolved template data as JSON instead of building.
            optional --print-data
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        true => EnvFilter::new("debug"),
        false => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(flags: flags::Swatchbook) -> Result<()> {
    let root = flags.root.unwrap_or_else(|| PathBuf::from("."));
    let config = flags.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let project = Swatchbook::new(&root, &config)?;

    if flags.print_data {
        let assembler = project.assembler::<MiniJinjaEngine>()?;
        println!("{}", serde_json::to_string_pretty(&assembler.overlay)?);
        return Ok(());
    }

    let start = std::time::Instant::now();
    let summary = project.build::<MiniJinjaEngine>()?;
    tracing::info!(
        patterns = summary.patterns,
        view_alls = summary.view_alls,
        public = %project.public.display(),
        "build finished in {}ms", start.elapsed().as_millis()
    );

    Ok(())
}

pub fn main() -> ExitCode {
    let flags = flags::Swatchbook::from_env_or_exit();
    init_logging(flags.verbose);

    match run(flags) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
