use cutgraph_config::{ManagerSetup, load_cut_config};
use cutgraph_kernel::{CutFactory, Manager};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CUTGRAPH_LOG";

/// Log to stderr, filtered by `CUTGRAPH_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build a manager from a cut file, or from a setup file when `setup` is set.
pub fn build_manager_or_exit(config: &str, setup: bool) -> Manager {
    let path = Path::new(config);
    let built = if setup {
        ManagerSetup::load(path).and_then(|setup| setup.build())
    } else {
        load_cut_config(path).and_then(|config| {
            let mut manager = Manager::new(CutFactory::with_builtins());
            manager.initialize(&config)?;
            Ok(manager)
        })
    };
    built.unwrap_or_else(|e| {
        eprintln!("error: {config}: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: json serialization: {e}");
            std::process::exit(1);
        }
    }
}

pub fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}
