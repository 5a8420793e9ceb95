// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::runtime::OffsetPreset;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  rainpane --color green --color-bg black --fps 60 --update-ms 16 --speed 0.2 --glyph-width 9 --glyph-height 16 --max-cells 300 --offset none";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix("  rainpane") {
            out.push_str("  \x1b[1;34mrainpane\x1b[0m");
            out.push_str(rest);
        } else if line.ends_with(':') && line == line.to_ascii_uppercase() {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rainpane", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colors",
        help_heading = "APPEARANCE",
        help = "Custom rain colors as RRGGBB,RRGGBB,... (overrides --color)"
    )]
    pub colors: Option<String>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "ascii",
        help_heading = "APPEARANCE",
        help = "Render ASCII stand-ins instead of katakana (default when LANG is not UTF-8)"
    )]
    pub ascii: bool,

    #[arg(
        short = 'F',
        long = "fullwidth",
        help_heading = "APPEARANCE",
        help = "One terminal column per rain column (no gaps)"
    )]
    pub fullwidth: bool,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "TIMING",
        help = "Target render FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        short = 'u',
        long = "update-ms",
        default_value_t = 16,
        help_heading = "TIMING",
        help = "Update clock period in ms (min 1 max 1000)"
    )]
    pub update_ms: u64,

    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = 0.2,
        help_heading = "TIMING",
        help = "Fall velocity in units per ms (min 0 max 1)"
    )]
    pub speed: f32,

    #[arg(
        long = "duration",
        help_heading = "TIMING",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "glyph-width",
        default_value_t = 9,
        help_heading = "FIELD",
        help = "Glyph width in units (min 1 max 64)"
    )]
    pub glyph_width: i32,

    #[arg(
        long = "glyph-height",
        default_value_t = 16,
        help_heading = "FIELD",
        help = "Glyph height in units (min 1 max 64)"
    )]
    pub glyph_height: i32,

    #[arg(
        long = "max-cells",
        default_value_t = 300,
        help_heading = "FIELD",
        help = "Max cells per column (min 1 max 10000)"
    )]
    pub max_cells: usize,

    #[arg(
        long = "smooth",
        help_heading = "FIELD",
        help = "Continuous motion instead of snapping cells to rows"
    )]
    pub smooth: bool,

    #[arg(
        long = "seed",
        help_heading = "FIELD",
        help = "Seed for a reproducible first scene"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'o',
        long = "offset",
        default_value_t = OffsetPreset::None,
        value_enum,
        help_heading = "OFFSETS",
        help = "Built-in offset animation (none, wave, zigzag)"
    )]
    pub offset: OffsetPreset,

    #[arg(
        long = "offset-script",
        help_heading = "OFFSETS",
        help = "Lua file defining compute_offsets(y) returning x, y offsets"
    )]
    pub offset_script: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "debug",
        help_heading = "GENERAL",
        help = "Start with debug outlines visible"
    )]
    pub debug: bool,

    #[arg(
        long = "status",
        help_heading = "GENERAL",
        help = "Start with the status line visible"
    )]
    pub status: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR THEMES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --color.\x1b[0m");
    } else {
        println!("AVAILABLE COLOR THEMES:");
        println!("NOTE: Use only the VALUE (left side) with --color.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("green        Classic green");
    println!("green2       Paler green");
    println!("gold         Gold");
    println!("red          Red");
    println!("blue         Blue");
    println!("cyan         Cyan");
    println!("purple       Purple");
    println!("neon         Neon pink and cyan (alias: synthwave)");
    println!("fire         Fire (alias: inferno)");
    println!("ocean        Ocean (alias: deep-sea)");
    println!("gray         Gray (alias: grey)");
    println!("snow         Snow / ice");
    println!("rainbow      Rainbow");
}
