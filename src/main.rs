use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

mod app;
mod clipboard;
mod config;
mod error;
mod form;
mod graphics;
mod logging;
mod math;
mod opener;
mod plans;
mod spring;
mod state;
mod submission;
mod tilt;
mod ui;
mod widget;

use clipboard::Clipboard;
use config::{Args, Config};
use opener::SystemOpener;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::try_from(Args::parse())?;
    logging::init(config.log_file.as_deref())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        clipboard = ?config.clipboard,
        theme = ?config.theme,
        max_tilt = config.tilt.max_angle,
        "starting"
    );

    let clipboard = Clipboard::from_backend(config.clipboard);
    app::run(config, clipboard, SystemOpener).await
}
