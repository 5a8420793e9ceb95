// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Green2,
    Gold,
    Red,
    Blue,
    Cyan,
    Purple,
    Neon,
    Fire,
    Ocean,
    Gray,
    Snow,
    Rainbow,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffsetPreset {
    #[value(name = "none")]
    None,
    #[value(name = "wave")]
    Wave,
    #[value(name = "zigzag")]
    Zigzag,
}

impl OffsetPreset {
    pub fn next(self) -> Self {
        match self {
            OffsetPreset::None => OffsetPreset::Wave,
            OffsetPreset::Wave => OffsetPreset::Zigzag,
            OffsetPreset::Zigzag => OffsetPreset::None,
        }
    }
}
