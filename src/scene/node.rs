use glam::Vec2;

/// An 8-bit RGB color, as displayed properties store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Optional sprite capability of a [`Node`].
///
/// Actions that flip or re-frame a sprite (`FlipX`, `FlipY`, `Animate`)
/// require this component and treat its absence on a live node as a
/// programming error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteState {
    /// Index of the currently displayed frame.
    pub frame: usize,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// A target node holding the properties tween actions interpolate.
///
/// This is deliberately flat data: the action core only ever reads a property
/// at `start` and writes it during `step`. Hierarchy, rendering and layout
/// belong to the host scene graph, not to this crate.
#[derive(Debug, Clone)]
pub struct Node {
    pub position: Vec2,
    /// Rotation in degrees, clockwise positive.
    pub rotation: f32,
    pub scale: Vec2,
    /// Skew in degrees, per axis.
    pub skew: Vec2,
    /// Display opacity, 0 (transparent) to 255 (opaque).
    pub opacity: u8,
    pub color: Color,
    pub visible: bool,
    pub content_size: Vec2,
    /// Sprite capability, present only on sprite-like targets.
    pub sprite: Option<SpriteState>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            skew: Vec2::ZERO,
            opacity: 255,
            color: Color::WHITE,
            visible: true,
            content_size: Vec2::ZERO,
            sprite: None,
        }
    }

    /// Creates a node that carries the sprite capability.
    #[must_use]
    pub fn with_sprite() -> Self {
        Self {
            sprite: Some(SpriteState::default()),
            ..Self::new()
        }
    }

    /// Returns the sprite state, panicking if this node has none.
    ///
    /// Sprite actions use this as their fail-fast capability check.
    #[inline]
    pub fn sprite_mut(&mut self) -> &mut SpriteState {
        self.sprite
            .as_mut()
            .expect("this action requires a sprite-capable target node")
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
