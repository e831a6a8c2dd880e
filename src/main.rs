use clap::Parser;
use creator_desk::cli::{self, Cli};
use creator_desk::core::config::{self, CliOverrides, ResolvedConfig};
use creator_desk::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};

fn init_logging(resolved: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let (level, unknown_level) = match resolved.log_level.parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::Debug, true),
    };

    let Some(path) = resolved.log_file.clone().or_else(config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(log_file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
    if unknown_level {
        log::warn!("Unknown log level '{}', using debug", resolved.log_level);
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("creator-desk: {e}");
            std::process::exit(2);
        }
    };
    let overrides = CliOverrides {
        project_root: args.root.clone(),
        platform: args.platform.clone(),
    };
    let resolved = match config::resolve(&file_config, &overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("creator-desk: {e}");
            std::process::exit(2);
        }
    };

    // Config is read before the logger exists; record what it resolved to.
    init_logging(&resolved);
    let source = args.config.clone().or_else(config::config_path);
    log::info!(
        "creator-desk starting, config {}",
        source.map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string())
    );
    log::info!("Effective settings: {}", resolved.summary());

    let code = match args.command {
        Some(command) => match cli::execute(command, &resolved, &mut std::io::stdout()).await {
            Ok(code) => code,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("creator-desk: {e}");
                1
            }
        },
        None => match tui::run(resolved) {
            Ok(()) => 0,
            Err(e) => {
                log::error!("TUI error: {}", e);
                eprintln!("creator-desk: {e}");
                1
            }
        },
    };
    std::process::exit(code);
}
