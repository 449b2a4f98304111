//! View / load settings handed to the core by the presentation layer.

/// Logical render surface the automap projects onto.
pub const DEFAULT_RENDER_WIDTH: i32 = 320;
pub const DEFAULT_RENDER_HEIGHT: i32 = 200;

/// Map units per automap pixel (larger = more zoomed out).
pub const DEFAULT_SCALE: i32 = 15;

/// `Thing::type_id` of the player 1 start.
pub const PLAYER1_START: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapConfig {
    pub render_width: i32,
    pub render_height: i32,
    /// Always ≥ 1.
    pub scale: i32,
    pub player_thing_type: u16,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            scale: DEFAULT_SCALE,
            player_thing_type: PLAYER1_START,
        }
    }
}

impl MapConfig {
    pub fn with_surface(mut self, width: i32, height: i32) -> Self {
        self.render_width = width.max(1);
        self.render_height = height.max(1);
        self
    }

    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn with_player_thing(mut self, type_id: u16) -> Self {
        self.player_thing_type = type_id;
        self
    }

    /// Largest addressable screen X.
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.render_width - 1
    }

    /// Largest addressable screen Y.
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.render_height - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MapConfig::default();
        assert_eq!((cfg.max_x(), cfg.max_y()), (319, 199));
        assert_eq!(cfg.scale, 15);
        assert_eq!(cfg.player_thing_type, 1);
    }

    #[test]
    fn setters_clamp() {
        let cfg = MapConfig::default().with_scale(0).with_surface(-4, 480);
        assert_eq!(cfg.scale, 1);
        assert_eq!((cfg.render_width, cfg.render_height), (1, 480));
        assert_eq!(cfg.with_player_thing(2).player_thing_type, 2);
    }
}
