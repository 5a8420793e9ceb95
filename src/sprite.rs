// Copyright (c) 2026 rezky_nightky

use crate::error::RainResult;
use crate::offset::OffsetAnimationMap;
use crate::store::{GlyphImage, GlyphImageStore};

pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn translated(self, origin: Point) -> Self {
        Self {
            x: self.x + origin.x,
            y: self.y + origin.y,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub velocity_y: f32,
}

impl Motion {
    pub fn integrate(&mut self, elapsed_ms: u64) {
        self.y += self.velocity_y * elapsed_ms as f32;
    }

    pub fn rounded_x(&self) -> i32 {
        round_half_up(self.x)
    }

    pub fn rounded_y(&self) -> i32 {
        round_half_up(self.y)
    }
}

pub trait Canvas {
    fn blit(&mut self, x: i32, y: i32, image: &GlyphImage);
    fn outline(&mut self, bounds: Bounds);
    fn vertical_rule(&mut self, x: i32);
}

pub struct DrawContext<'a> {
    pub store: &'a GlyphImageStore,
    pub offsets: &'a OffsetAnimationMap,
}

pub trait Sprite {
    fn bounds(&self) -> Bounds;

    fn draw(&self, ctx: &DrawContext<'_>, origin: Point, canvas: &mut dyn Canvas)
        -> RainResult<()>;

    fn draw_debug(&self, origin: Point, canvas: &mut dyn Canvas) {
        canvas.outline(self.bounds().translated(origin));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Mark {
        Blit { x: i32, y: i32, ch: char },
        Outline(Bounds),
        Rule(i32),
    }

    #[derive(Default)]
    pub struct RecordingCanvas {
        pub marks: Vec<Mark>,
    }

    impl RecordingCanvas {
        pub fn blits(&self) -> Vec<(i32, i32, char)> {
            self.marks
                .iter()
                .filter_map(|m| match m {
                    Mark::Blit { x, y, ch } => Some((*x, *y, *ch)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn blit(&mut self, x: i32, y: i32, image: &GlyphImage) {
            self.marks.push(Mark::Blit { x, y, ch: image.ch });
        }

        fn outline(&mut self, bounds: Bounds) {
            self.marks.push(Mark::Outline(bounds));
        }

        fn vertical_rule(&mut self, x: i32) {
            self.marks.push(Mark::Rule(x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_on_both_sides_of_zero() {
        assert_eq!(round_half_up(16.5), 17);
        assert_eq!(round_half_up(16.49), 16);
        assert_eq!(round_half_up(-16.5), -16);
        assert_eq!(round_half_up(-16.51), -17);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn motion_integrates_velocity_over_time() {
        let mut m = Motion {
            x: 3.0,
            y: -10.0,
            velocity_y: 0.2,
        };
        m.integrate(16);
        assert!((m.y - (-6.8)).abs() < 1e-4);
        assert_eq!(m.rounded_y(), -7);
        assert_eq!(m.rounded_x(), 3);
    }
}
