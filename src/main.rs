use clap::Parser;
use leafpress::{config, output, publish, remote};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "leafpress")]
#[command(about = "Static site generator for markup pages with category indexes")]
#[command(long_about = "\
Static site generator for markup pages with category indexes

Every file under pages/ becomes one HTML page under output/, wrapped in
templates/template.html. Directories become categories: a page named like
its directory (recipes/recipes.md) is the category's landing page and gets
a nested index of everything below it.

Site structure:

  site/
  ├── config.toml              # Optional, see --gen-config
  ├── pages/
  │   ├── index.md             # Home page
  │   ├── about.md             # Top-level page (in navigation)
  │   └── recipes/             # Category (in navigation)
  │       ├── recipes.md       # Landing page with category index
  │       └── nut-roast.md
  ├── templates/
  │   ├── template.html        # Page template
  │   └── style.css            # Copied to output/
  └── logfile                  # Fingerprints of everything built so far

Only pages whose content has never been built are written. A changed
template or navigation rebuilds every page; --rebuild forces it.")]
#[command(version)]
struct Cli {
    /// Site root directory (defaults to the current directory)
    directory: Option<PathBuf>,

    /// Log every build decision
    #[arg(short, long, conflicts_with = "silent")]
    verbose: bool,

    /// Print nothing, not even errors
    #[arg(short, long)]
    silent: bool,

    /// Transfer the output directory to the configured remote after building
    #[arg(short, long)]
    publish: bool,

    /// Build every page, ignoring the fingerprint log
    #[arg(long)]
    rebuild: bool,

    /// Discover and index the site, print the structure, write nothing
    #[arg(long, conflicts_with_all = ["publish", "rebuild"])]
    check: bool,

    /// Print a stock config.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose enables DEBUG, --silent disables logging, otherwise RUST_LOG or WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.silent {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !cli.silent {
                eprintln!("Error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let root = match &cli.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let site_config = config::load_config(&root)?;
    let paths = config::SitePaths::resolve(&root, &site_config);

    if cli.check {
        let (site, index) = publish::survey(&paths, &site_config)?;
        if !cli.silent {
            output::print_scan_output(&site, &index);
        }
        return Ok(());
    }

    let options = publish::PublishOptions {
        rebuild: cli.rebuild,
    };
    let report = publish::build(&paths, &site_config, options)?;
    if !cli.silent {
        output::print_publish_output(&report);
    }

    if cli.publish {
        remote::sync(&paths.output, &site_config.publish)?;
    }
    Ok(())
}
