use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = level_loader::load_level_json_from_path(args.path)?;
    println!("id={}", level.id);
    println!("title={}", level.title);
    println!("bpm={}", level.bpm);
    println!("events={}", level.events.len());
    Ok(())
}
