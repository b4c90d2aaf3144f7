mod api;
mod app;
mod graph;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::{GraphSource, SociogramApp};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the social-graph API
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Start from the synthetic sample graph instead of the API
    #[arg(long)]
    synthetic: bool,

    /// Seed for the synthetic graph and the 3D placements
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sociogram=info")),
        )
        .init();

    let args = Args::parse();
    let source = if args.synthetic {
        GraphSource::Synthetic
    } else {
        GraphSource::Api
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "sociogram",
        options,
        Box::new(move |cc| {
            Ok(Box::new(SociogramApp::new(
                cc,
                args.api_url.clone(),
                source,
                args.seed,
            )))
        }),
    )
}
