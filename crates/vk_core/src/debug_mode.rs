/// What the debug view draws. Debug visuals never change simulation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugMode {
    #[default]
    Off,
    /// Normal sprites with hitboxes drawn on top.
    SpritesAndHitboxes,
    /// Hitboxes only; sprites are hidden.
    OnlyHitboxes,
}

impl DebugMode {
    pub const ALL: &'static [DebugMode] = &[
        DebugMode::Off,
        DebugMode::SpritesAndHitboxes,
        DebugMode::OnlyHitboxes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::SpritesAndHitboxes => "Sprites + hitboxes",
            Self::OnlyHitboxes => "Hitboxes only",
        }
    }

    /// Cycle to the next mode (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::SpritesAndHitboxes,
            Self::SpritesAndHitboxes => Self::OnlyHitboxes,
            Self::OnlyHitboxes => Self::Off,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    pub fn draws_sprites(self) -> bool {
        self != Self::OnlyHitboxes
    }

    pub fn draws_hitboxes(self) -> bool {
        self != Self::Off
    }
}

impl std::fmt::Display for DebugMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
