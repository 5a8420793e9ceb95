// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng};

const ALPHABET: [char; 66] = [
    '\u{FF61}', '\u{FF62}', '\u{FF63}', '\u{FF64}', '\u{FF65}', '\u{FF66}', '\u{FF67}', '\u{FF68}',
    '\u{FF69}', '\u{FF6A}', '\u{FF6B}', '\u{FF6C}', '\u{FF6D}', '\u{FF6D}', '\u{FF6E}', '\u{FF6F}',
    '\u{FF71}', '\u{FF72}', '\u{FF73}', '\u{FF74}', '\u{FF75}', '\u{FF76}', '\u{FF77}', '\u{FF78}',
    '\u{FF79}', '\u{FF7A}', '\u{FF7B}', '\u{FF7C}', '\u{FF7D}', '\u{FF7D}', '\u{FF7E}', '\u{FF7F}',
    '\u{FF81}', '\u{FF82}', '\u{FF83}', '\u{FF84}', '\u{FF85}', '\u{FF86}', '\u{FF87}', '\u{FF88}',
    '\u{FF89}', '\u{FF8A}', '\u{FF8B}', '\u{FF8C}', '\u{FF8D}', '\u{FF8D}', '\u{FF8E}', '\u{FF8F}',
    '\u{FF91}', '\u{FF92}', '\u{FF93}', '\u{FF94}', '\u{FF95}', '\u{FF96}', '\u{FF97}', '\u{FF98}',
    '\u{FF99}', '\u{FF9A}', '\u{FF9B}', '\u{FF9C}', '\u{FF9D}', '\u{FF9E}', '\u{FF9F}', '0', '7',
    '8',
];

// Stand-ins for terminals without UTF-8, one per alphabet slot.
const ASCII_STAND_INS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz*+=$";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph(u8);

impl Glyph {
    pub const COUNT: usize = ALPHABET.len();

    pub fn random(rng: &mut StdRng) -> Self {
        Glyph(rng.random_range(0..Self::COUNT) as u8)
    }

    #[cfg(test)]
    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Glyph(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn ch(self) -> char {
        ALPHABET[self.index()]
    }

    pub fn ascii(self) -> char {
        ASCII_STAND_INS
            .as_bytes()
            .get(self.index())
            .map(|&b| b as char)
            .unwrap_or('0')
    }

    pub fn all() -> impl Iterator<Item = Glyph> {
        (0..Self::COUNT).map(|i| Glyph(i as u8))
    }
}
