//! Load one map from a WAD and print what the core decoded.
//!
//! ```bash
//! cargo run --release -- <doom.wad> --map E1M1
//! cargo run --release -- <doom.wad> --list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

use diydoom_rs::{
    config::{self, MapConfig},
    wad::{Wad, load_map},
};

#[derive(Parser, Debug)]
#[command(version, about = "Doom WAD map inspector")]
struct Cli {
    /// Path to an IWAD or PWAD
    wad: PathBuf,

    /// Map marker to load
    #[arg(short, long, default_value = "E1M1")]
    map: String,

    /// List every map marker and exit
    #[arg(short, long)]
    list: bool,

    /// Automap surface width in pixels
    #[arg(long, default_value_t = config::DEFAULT_RENDER_WIDTH)]
    width: i32,

    /// Automap surface height in pixels
    #[arg(long, default_value_t = config::DEFAULT_RENDER_HEIGHT)]
    height: i32,

    /// Map units per automap pixel
    #[arg(long, default_value_t = config::DEFAULT_SCALE)]
    scale: i32,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        ConfigBuilder::default().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    // ─────────── load WAD ───────────
    let wad = Wad::from_file(&cli.wad)
        .with_context(|| format!("loading archive {}", cli.wad.display()))?;

    if cli.list {
        for idx in wad.level_indices() {
            println!("{idx:5}  {}", Wad::lump_name(&wad.lumps()[idx].name));
        }
        return Ok(());
    }

    // ─────────── load map ───────────
    let cfg = MapConfig::default()
        .with_surface(cli.width, cli.height)
        .with_scale(cli.scale);
    let lvl = load_map(&wad, &cli.map, cfg)
        .with_context(|| format!("loading map {} from {}", cli.map, cli.wad.display()))?;

    let b = lvl.bounds();
    println!("map        {}", lvl.name());
    println!("vertices   {}", lvl.vertices().len());
    println!("linedefs   {}", lvl.linedefs().len());
    println!("things     {}", lvl.things().len());
    println!("nodes      {}", lvl.nodes().len());
    println!("subsectors {}", lvl.subsectors().len());
    println!("segs       {}", lvl.segs().len());
    println!("bounds     {} .. {}", b.min, b.max);

    if let Some(start) = lvl.player_start() {
        let ss = lvl
            .locate_subsector(start.pos)
            .context("walking the BSP to the player start")?;
        println!(
            "player     {} facing {}°, subsector {ss}, automap {}",
            start.pos,
            start.angle,
            lvl.to_screen(start.pos)
        );
    }

    let off_screen = lvl
        .automap_walls()
        .filter(|(a, b)| {
            [a, b].iter().any(|p| {
                !(0..cfg.render_width).contains(&p.x) || !(0..cfg.render_height).contains(&p.y)
            })
        })
        .count();
    println!(
        "automap    {} walls, {off_screen} partly off a {}x{} surface at 1:{}",
        lvl.linedefs().len(),
        cfg.render_width,
        cfg.render_height,
        cfg.scale
    );
    Ok(())
}
