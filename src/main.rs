use anyhow::Result;
use clap::Parser;
use tui_sketchbook::sketch::Sketch as _;

fn main() -> Result<()> {
    let cfg = tui_sketchbook::config::Config::parse();
    if cfg.list_sketches {
        let seed = cfg.seed.unwrap_or(0);
        for (i, sketch) in tui_sketchbook::sketch::make_sketches(seed).iter().enumerate() {
            println!("{}. {}", i + 1, sketch.name());
        }
        return Ok(());
    }

    tui_sketchbook::app::run(cfg)
}
