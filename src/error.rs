// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Debug, thiserror::Error)]
pub enum RainError {
    #[error("cannot remove the lead cell of a column, it must always stay in the ordered stack")]
    LeadCellRemoval,
    #[error("none of the cells to remove exist in the ordered stack")]
    CellsNotInStack,
    #[error("column length ({requested}) must not exceed the max length allowed ({max})")]
    LengthExceedsMax { requested: usize, max: usize },
    #[error("max cells per column must be greater than 0 ({0} was supplied)")]
    InvalidMaxCells(usize),
    #[error("glyph metrics must be positive (width {width}, height {height})")]
    InvalidGlyphMetrics { width: i32, height: i32 },
    #[error("a rain field needs at least one color")]
    EmptyPalette,
    #[error("no glyph image for color {color:?}")]
    MissingColor { color: Color },
    #[error("no glyph image for glyph #{index} in color {color:?}")]
    MissingGlyph { color: Color, index: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum OffsetError {
    #[error("{0}")]
    Lua(#[from] mlua::Error),
    #[error("expected compute_offsets to return 2 values, got {0}")]
    WrongArity(usize),
    #[error("expected compute_offsets return value #{position} ({axis} offset) to be a number")]
    NotANumber { position: usize, axis: &'static str },
    #[error("compute_offsets return value #{position} ({axis} offset) is out of range: {value}")]
    OutOfRange {
        position: usize,
        axis: &'static str,
        value: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Lua(#[from] mlua::Error),
    #[error("expected to find a function called {0}")]
    MissingFunction(&'static str),
    #[error("expected to find a function called {0}, but found something else with that name")]
    NotAFunction(&'static str),
}

pub type RainResult<T> = Result<T, RainError>;
