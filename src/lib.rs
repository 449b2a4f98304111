//! Doom WAD archive reader and the map store it fills.
//!
//! ```text
//!  wad::decode  ─▶  wad::raw (Wad)  ─▶  wad::level / wad::loader  ─▶  world::Level
//!  LE fields        header+directory    lump slots, records            bounds, BSP, automap
//! ```
//!
//! ```no_run
//! use diydoom_rs::{config::MapConfig, wad::{Wad, load_map}};
//!
//! let wad = Wad::from_file("DOOM.WAD")?;
//! let level = load_map(&wad, "E1M1", MapConfig::default())?;
//! for (a, b) in level.automap_walls() {
//!     println!("{a} -> {b}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod wad;
pub mod world;
