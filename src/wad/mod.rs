pub mod decode;
pub mod level;
pub mod loader;
pub mod raw;

#[cfg(test)]
pub(crate) mod fixture;

pub use decode::{DecodeError, Record};
pub use level::{LevelError, LumpKind};
pub use loader::{load_level, load_map};
pub use raw::{Header, LumpInfo, Wad, WadError, WadKind};
