// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::frame::{Frame, Tile};
use crate::sprite::{Bounds, Canvas};
use crate::store::{GlyphImage, GlyphMetrics};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    units_per_col: f32,
    units_per_line: f32,
}

impl Viewport {
    pub fn new(metrics: GlyphMetrics, fullwidth: bool) -> Self {
        let footprint = metrics.footprint() as f32;
        Self {
            units_per_col: if fullwidth { footprint } else { footprint / 2.0 },
            units_per_line: metrics.units_per_row() as f32,
        }
    }

    pub fn pane_size(&self, cols: u16, lines: u16) -> (i32, i32) {
        (
            (cols as f32 * self.units_per_col).round() as i32,
            (lines as f32 * self.units_per_line).round() as i32,
        )
    }

    pub fn col(&self, x: i32) -> i32 {
        (x as f32 / self.units_per_col).floor() as i32
    }

    pub fn line(&self, y: i32) -> i32 {
        (y as f32 / self.units_per_line).floor() as i32
    }
}

const DEBUG_FG: Color = Color::DarkGrey;

pub struct FrameCanvas<'a> {
    frame: &'a mut Frame,
    viewport: Viewport,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut Frame, viewport: Viewport) -> Self {
        Self { frame, viewport }
    }

    fn tile_coords(&self, col: i32, line: i32) -> Option<(u16, u16)> {
        if col < 0 || line < 0 || col >= self.frame.width as i32 || line >= self.frame.height as i32
        {
            return None;
        }
        Some((col as u16, line as u16))
    }

    fn mark_if_blank(&mut self, col: i32, line: i32, ch: char) {
        let Some((x, y)) = self.tile_coords(col, line) else {
            return;
        };
        if self.frame.get(x, y).is_some_and(|t| t.is_blank()) {
            let bg = self.frame.background();
            self.frame.set(
                x,
                y,
                Tile {
                    ch,
                    fg: Some(DEBUG_FG),
                    bg,
                    bold: false,
                },
            );
        }
    }
}

impl Canvas for FrameCanvas<'_> {
    fn blit(&mut self, x: i32, y: i32, image: &GlyphImage) {
        let col = self.viewport.col(x);
        let line = self.viewport.line(y);
        if let Some((tx, ty)) = self.tile_coords(col, line) {
            let bg = self.frame.background();
            self.frame.set(
                tx,
                ty,
                Tile {
                    ch: image.ch,
                    fg: image.fg,
                    bg,
                    bold: image.bold,
                },
            );
        }
    }

    fn outline(&mut self, bounds: Bounds) {
        let left = self.viewport.col(bounds.x);
        let top = self.viewport.line(bounds.y);
        let bottom = self.viewport.line(bounds.y + bounds.height);
        self.mark_if_blank(left, top, '┌');
        self.mark_if_blank(left, bottom, '└');
    }

    fn vertical_rule(&mut self, x: i32) {
        let col = self.viewport.col(x);
        for line in 0..self.frame.height as i32 {
            self.mark_if_blank(col, line, '│');
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Status {
    pub fps: f64,
    pub ups: f64,
    pub velocity: f32,
    pub columns: usize,
    pub offset: String,
    pub paused: bool,
    pub last_error: Option<String>,
}

impl Status {
    pub fn line(&self) -> String {
        let mut s = format!(
            " fps {:.0}  ups {:.0}  v {:.2}  cols {}  offset {}",
            self.fps, self.ups, self.velocity, self.columns, self.offset
        );
        if self.paused {
            s.push_str("  [paused]");
        }
        if let Some(e) = &self.last_error {
            s.push_str("  ");
            s.push_str(e);
        }
        s
    }
}

pub fn draw_status(frame: &mut Frame, status: &Status) {
    if frame.height == 0 {
        return;
    }
    let y = frame.height - 1;
    let bg = frame.background();
    for x in 0..frame.width {
        frame.set(x, y, Tile::blank(bg));
    }
    frame.put_str(0, y, &status.line(), Some(Color::White), true);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> GlyphMetrics {
        GlyphMetrics::new(9, 16).unwrap()
    }

    fn image(ch: char) -> GlyphImage {
        GlyphImage {
            ch,
            fg: Some(Color::Green),
            bold: false,
        }
    }

    #[test]
    fn viewport_maps_rows_to_lines() {
        let v = Viewport::new(metrics(), false);
        assert_eq!(v.pane_size(80, 24), (400, 408));
        assert_eq!(v.col(0), 0);
        assert_eq!(v.col(10), 2);
        assert_eq!(v.line(16), 0);
        assert_eq!(v.line(17), 1);
        assert_eq!(v.line(-1), -1);

        let full = Viewport::new(metrics(), true);
        assert_eq!(full.pane_size(80, 24), (800, 408));
        assert_eq!(full.col(10), 1);
    }

    #[test]
    fn blits_outside_the_frame_are_clipped() {
        let mut frame = Frame::new(4, 2, None);
        let v = Viewport::new(metrics(), true);
        let mut canvas = FrameCanvas::new(&mut frame, v);
        canvas.blit(-17, 0, &image('a'));
        canvas.blit(0, -1, &image('b'));
        canvas.blit(10, 17, &image('c'));
        canvas.blit(40, 0, &image('d'));
        assert_eq!(frame.get(1, 1).unwrap().ch, 'c');
        assert_eq!((0..8).filter(|&i| !frame.tile_at_index(i).is_blank()).count(), 1);
    }

    #[test]
    fn debug_marks_never_cover_glyphs() {
        let mut frame = Frame::new(3, 3, None);
        let v = Viewport::new(metrics(), true);
        let mut canvas = FrameCanvas::new(&mut frame, v);
        canvas.blit(10, 17, &image('x'));
        canvas.vertical_rule(10);
        assert_eq!(frame.get(1, 0).unwrap().ch, '│');
        assert_eq!(frame.get(1, 1).unwrap().ch, 'x');
        assert_eq!(frame.get(1, 2).unwrap().ch, '│');
    }

    #[test]
    fn status_line_includes_the_latest_error() {
        let mut frame = Frame::new(200, 2, None);
        let status = Status {
            fps: 59.6,
            ups: 62.0,
            velocity: 0.2,
            columns: 40,
            offset: "wave".into(),
            paused: true,
            last_error: Some("Error: boom".into()),
        };
        draw_status(&mut frame, &status);
        let text: String = (200..400).map(|i| frame.tile_at_index(i).ch).collect();
        assert!(text.contains("fps 60"));
        assert!(text.contains("cols 40"));
        assert!(text.contains("[paused]"));
        assert!(text.trim_end().ends_with("Error: boom"));
    }
}
