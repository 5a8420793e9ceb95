// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, ColorScheme};

pub type Rgb = (u8, u8, u8);

const LEAD_RGB: Rgb = (255, 255, 255);

#[derive(Clone, Debug)]
pub struct Palette {
    pub colors: Vec<Color>,
    pub lead: Color,
    pub bg: Option<Color>,
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.0 as i32) - (b.0 as i32);
    let dg = (a.1 as i32) - (b.1 as i32);
    let db = (a.2 as i32) - (b.2 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2((r, g, b), cube);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let gray = match gray_idx {
        16 => (0, 0, 0),
        231 => (255, 255, 255),
        _ => {
            let v = 8 + 10 * (gray_idx - 232);
            (v, v, v)
        }
    };

    if dist2((r, g, b), gray) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, rgb) in TABLE {
        let d = dist2((r, g, b), rgb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

pub fn convert(mode: ColorMode, (r, g, b): Rgb) -> Color {
    match mode {
        ColorMode::Mono => Color::Grey,
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 => rgb_to_color16(r, g, b),
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn gradient_from_stops(stops: &[Rgb], steps: usize) -> Vec<Rgb> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segs = stops.len() - 1;
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = (i as f32) / ((steps - 1) as f32);
        let pos = t * (segs as f32);
        let seg = (pos.floor() as usize).min(segs - 1);
        let lt = pos - (seg as f32);
        let (r0, g0, b0) = stops[seg];
        let (r1, g1, b1) = stops[seg + 1];
        out.push((lerp_u8(r0, r1, lt), lerp_u8(g0, g1, lt), lerp_u8(b0, b1, lt)));
    }
    out
}

pub fn scheme_rgb(scheme: ColorScheme) -> Vec<Rgb> {
    match scheme {
        ColorScheme::Green => gradient_from_stops(&[(0, 70, 0), (0, 255, 65)], 5),
        ColorScheme::Green2 => gradient_from_stops(&[(20, 90, 20), (120, 255, 120), (200, 255, 200)], 6),
        ColorScheme::Gold => gradient_from_stops(&[(90, 60, 0), (255, 200, 40), (255, 235, 150)], 6),
        ColorScheme::Red => gradient_from_stops(&[(80, 0, 0), (255, 30, 30), (255, 150, 150)], 6),
        ColorScheme::Blue => gradient_from_stops(&[(0, 0, 90), (40, 80, 255), (140, 200, 255)], 6),
        ColorScheme::Cyan => gradient_from_stops(&[(0, 70, 90), (0, 220, 255), (160, 250, 255)], 6),
        ColorScheme::Purple => gradient_from_stops(&[(60, 0, 90), (160, 60, 255), (220, 170, 255)], 6),
        ColorScheme::Neon => vec![(255, 0, 200), (0, 255, 255), (120, 0, 255), (255, 60, 160), (0, 200, 255)],
        ColorScheme::Fire => gradient_from_stops(&[(120, 0, 0), (255, 80, 0), (255, 200, 0)], 7),
        ColorScheme::Ocean => gradient_from_stops(&[(0, 20, 80), (0, 120, 200), (80, 230, 255)], 7),
        ColorScheme::Gray => gradient_from_stops(&[(60, 60, 60), (200, 200, 200)], 5),
        ColorScheme::Snow => gradient_from_stops(&[(150, 170, 190), (230, 240, 255)], 4),
        ColorScheme::Rainbow => vec![
            (255, 0, 0),
            (255, 128, 0),
            (255, 255, 0),
            (0, 255, 0),
            (0, 128, 255),
            (75, 0, 255),
            (200, 0, 255),
        ],
    }
}

pub fn build_palette(rain: &[Rgb], mode: ColorMode, default_background: bool) -> Palette {
    let bg = if default_background {
        None
    } else {
        Some(match mode {
            ColorMode::Color16 | ColorMode::Mono => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            ColorMode::Color256 => Color::AnsiValue(16),
        })
    };
    let lead = match mode {
        ColorMode::Mono => Color::White,
        _ => convert(mode, LEAD_RGB),
    };

    let mut colors: Vec<Color> = Vec::with_capacity(rain.len());
    for &rgb in rain {
        let c = convert(mode, rgb);
        if c != lead && !colors.contains(&c) {
            colors.push(c);
        }
    }
    if colors.is_empty() {
        // everything collapsed onto the lead color
        colors.push(Color::Grey);
    }

    Palette { colors, lead, bg }
}

pub fn parse_rgb_list(s: &str) -> Result<Vec<Rgb>, String> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let hex = part.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color {:?} (expected RRGGBB)", part.trim()));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        out.push((byte(0)?, byte(2)?, byte(4)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scheme_has_rain_colors_in_every_mode() {
        let schemes = [
            ColorScheme::Green,
            ColorScheme::Green2,
            ColorScheme::Gold,
            ColorScheme::Red,
            ColorScheme::Blue,
            ColorScheme::Cyan,
            ColorScheme::Purple,
            ColorScheme::Neon,
            ColorScheme::Fire,
            ColorScheme::Ocean,
            ColorScheme::Gray,
            ColorScheme::Snow,
            ColorScheme::Rainbow,
        ];
        let modes = [
            ColorMode::Mono,
            ColorMode::Color16,
            ColorMode::Color256,
            ColorMode::TrueColor,
        ];
        for s in schemes {
            for m in modes {
                let p = build_palette(&scheme_rgb(s), m, false);
                assert!(!p.colors.is_empty(), "{:?} {:?}", s, m);
                assert!(!p.colors.contains(&p.lead));
            }
        }
    }

    #[test]
    fn converted_duplicates_collapse() {
        let p = build_palette(&[(0, 250, 0), (0, 255, 0)], ColorMode::Color16, true);
        assert_eq!(p.colors, vec![Color::Green]);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn ansi256_picks_cube_and_gray_entries() {
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
    }

    #[test]
    fn gradient_hits_both_ends() {
        let g = gradient_from_stops(&[(0, 0, 0), (100, 200, 50)], 3);
        assert_eq!(g, vec![(0, 0, 0), (50, 100, 25), (100, 200, 50)]);
    }

    #[test]
    fn rgb_lists_parse_and_reject_garbage() {
        assert_eq!(
            parse_rgb_list("00ff41, #102030").unwrap(),
            vec![(0, 255, 65), (16, 32, 48)]
        );
        assert!(parse_rgb_list("00ff4").is_err());
        assert!(parse_rgb_list("zzzzzz").is_err());
        assert!(parse_rgb_list("").is_err());
    }
}
