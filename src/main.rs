use clap::Parser;
use relm4::prelude::*;
use std::path::PathBuf;
use whirl::config;
use whirl::gui::app::AppModel;
use whirl::gui::menu::Session;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an alternative config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the example config to the default location and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.init_config {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let cfg = config::load_or_default(args.config.as_ref());
    if cfg.items.is_empty() {
        log::warn!("No items configured; the menu will open empty");
    }

    let session = Session::new(cfg.items, cfg.menu);

    let app = RelmApp::new("org.whirl.whirl");
    // Our own flags are already parsed; keep GTK from seeing them.
    app.with_args(Vec::new()).run::<AppModel>(session);
    Ok(())
}
