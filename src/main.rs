mod bridge;
mod config;
mod error;
mod native_messaging;
mod socket_ipc;
mod tabs;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "rofi-chrome-tab")]
#[command(about = "Native-messaging host that serves browser tabs over a Unix socket")]
struct Cli {
    /// Log to the log file and use the fixed debug socket path
    #[arg(long)]
    debug: bool,

    /// Listen on this socket instead of the default path
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Log file used in debug mode
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Arguments passed by the browser (caller origin, manifest path); ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    browser_args: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::resolve(cli.debug, cli.socket, cli.log_file);

    config::init_logging(&config);
    tracing::debug!("Browser arguments: {:?}", cli.browser_args);

    let code = match bridge::run(&config).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Fatal: {e}");
            eprintln!("Error: {e}");
            1
        }
    };

    // stdin is read on a blocking thread that would hold up runtime shutdown
    std::process::exit(code);
}
