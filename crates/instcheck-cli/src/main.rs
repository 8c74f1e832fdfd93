mod commands;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_INPUT_ERROR};
use instcheck_core::CheckConfig;
use instcheck_schema::{load_profile_file, parse_bool_flag, CheckProfile, LibSuffixScope};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "instcheck",
    version,
    about = "Verify an installed file layout against a reference install manifest"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a generated install manifest against the reference manifest.
    Check {
        /// Manifest produced by the build-and-install run.
        generated: PathBuf,
        /// Checked-in reference manifest.
        reference: PathBuf,
        #[command(flatten)]
        profile: ProfileArgs,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Print a manifest in normalized, sorted form.
    Normalize {
        /// Manifest file to normalize.
        manifest: PathBuf,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

/// Profile file and normalization overrides.
#[derive(Debug, Args)]
struct ProfileArgs {
    /// Check profile (TOML) with build options, layout, and normalization settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Install prefix to strip from each manifest line.
    #[arg(long)]
    install_prefix: Option<String>,
    /// Directory name marking the install root inside absolute build paths.
    #[arg(long)]
    root_marker: Option<String>,
    /// Ignore manifest lines containing this token (repeatable).
    #[arg(long = "exclude", value_name = "TOKEN")]
    exclude: Vec<String>,
    /// Library-name suffix inserted before the shared-library extension.
    #[arg(long)]
    lib_suffix: Option<String>,
    /// Where the library-name suffix is removed: library-dir or anywhere.
    #[arg(long, value_parser = parse_scope)]
    lib_suffix_scope: Option<LibSuffixScope>,
}

/// Build configuration of the package under test. Accepts ON/OFF style values.
#[derive(Debug, Args)]
struct BuildArgs {
    /// Shared libraries are the only library type built.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    shared_libs: Option<bool>,
    /// pkg-config files are installed.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    pkg_config: Option<bool>,
    /// Documentation is installed.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    docs: Option<bool>,
    /// Example assets are built.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    examples: Option<bool>,
    /// Command-line tools are built.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    tools: Option<bool>,
    /// The language binding is built.
    #[arg(long, value_name = "BOOL", value_parser = parse_bool_flag)]
    bindings: Option<bool>,
    /// Directory that holds example assets [default: share/docs/examples].
    #[arg(long, value_name = "DIR")]
    examples_dir: Option<String>,
    /// Directory that holds command-line tools [default: bin].
    #[arg(long, value_name = "DIR")]
    tools_dir: Option<String>,
    /// Directory that holds installed documentation [default: share/doc].
    #[arg(long, value_name = "DIR")]
    docs_dir: Option<String>,
    /// Directory that holds the language binding [default: python].
    #[arg(long, value_name = "DIR")]
    binding_dir: Option<String>,
}

fn parse_scope(value: &str) -> Result<LibSuffixScope, String> {
    value.parse()
}

impl ProfileArgs {
    /// Load the profile file (if any) and apply the normalization overrides.
    fn load(&self) -> Result<CheckProfile, String> {
        let mut profile = match &self.config {
            Some(path) => load_profile_file(path)
                .map_err(|e| format!("config error: {}: {e}", path.display()))?,
            None => CheckProfile::default(),
        };
        let n = &mut profile.normalize;
        if self.install_prefix.is_some() {
            n.install_prefix.clone_from(&self.install_prefix);
        }
        if self.root_marker.is_some() {
            n.root_marker.clone_from(&self.root_marker);
        }
        n.exclude.extend(self.exclude.iter().cloned());
        if self.lib_suffix.is_some() {
            n.library_suffix.clone_from(&self.lib_suffix);
        }
        if self.lib_suffix_scope.is_some() {
            n.library_suffix_scope = self.lib_suffix_scope;
        }
        Ok(profile)
    }
}

impl BuildArgs {
    fn apply(&self, profile: &mut CheckProfile) {
        let o = &mut profile.options;
        for (target, value) in [
            (&mut o.shared_libs, self.shared_libs),
            (&mut o.pkg_config, self.pkg_config),
            (&mut o.docs, self.docs),
            (&mut o.examples, self.examples),
            (&mut o.tools, self.tools),
            (&mut o.bindings, self.bindings),
        ] {
            if value.is_some() {
                *target = value;
            }
        }
        let l = &mut profile.layout;
        for (target, value) in [
            (&mut l.examples_dir, &self.examples_dir),
            (&mut l.tools_dir, &self.tools_dir),
            (&mut l.docs_dir, &self.docs_dir),
            (&mut l.binding_dir, &self.binding_dir),
        ] {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }
    }
}

fn resolve_config(profile: &ProfileArgs, build: Option<&BuildArgs>) -> Result<CheckConfig, String> {
    let mut resolved = profile.load()?;
    if let Some(build) = build {
        build.apply(&mut resolved);
    }
    let config = CheckConfig::from_profile(&resolved).map_err(|e| e.to_string())?;
    debug!("load options: {:?}", config.load);
    debug!("normalize options: {:?}", config.normalize);
    debug!("build options: {:?}", config.build);
    Ok(config)
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("INSTCHECK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Check {
            generated,
            reference,
            profile,
            build,
        } => resolve_config(&profile, Some(&build))
            .and_then(|config| commands::check::run(&generated, &reference, &config, json_output)),
        Commands::Normalize { manifest, profile } => resolve_config(&profile, None)
            .and_then(|config| commands::normalize::run(&manifest, &config, json_output)),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:") || msg.starts_with("config error:") {
                EXIT_INPUT_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
