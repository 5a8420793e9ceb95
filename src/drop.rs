// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use rand::{rngs::StdRng, Rng};

use crate::error::RainResult;
use crate::glyph::Glyph;
use crate::sprite::{Bounds, Canvas, DrawContext, Point, Sprite};
use crate::store::GlyphMetrics;

const SHORTEST_REPICK_MS: u64 = 1000;
const LONGEST_REPICK_MS: u64 = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepickTimer {
    elapsed_ms: u64,
    target_ms: u64,
}

impl RepickTimer {
    pub fn first(rng: &mut StdRng) -> Self {
        Self {
            elapsed_ms: 0,
            target_ms: rng.random_range(0..=LONGEST_REPICK_MS),
        }
    }

    pub fn add(&mut self, elapsed_ms: u64, rng: &mut StdRng) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms < self.target_ms {
            return false;
        }
        self.elapsed_ms -= self.target_ms;
        self.target_ms = rng.random_range(SHORTEST_REPICK_MS..=LONGEST_REPICK_MS);
        true
    }

    #[cfg(test)]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    #[cfg(test)]
    pub fn target_ms(&self) -> u64 {
        self.target_ms
    }
}

#[derive(Clone, Debug)]
pub struct RainDropCell {
    glyph: Glyph,
    color: Color,
    metrics: GlyphMetrics,
    rel_y: i32,
    render_offset: i32,
    timer: RepickTimer,
}

impl RainDropCell {
    pub fn new(color: Color, metrics: GlyphMetrics, rng: &mut StdRng) -> Self {
        Self {
            glyph: Glyph::random(rng),
            color,
            metrics,
            rel_y: 0,
            render_offset: 0,
            timer: RepickTimer::first(rng),
        }
    }

    pub fn advance(&mut self, elapsed_ms: u64, rng: &mut StdRng) {
        if self.timer.add(elapsed_ms, rng) {
            self.glyph = Glyph::random(rng);
        }
    }

    pub fn glyph(&self) -> Glyph {
        self.glyph
    }

    pub fn set_glyph(&mut self, glyph: Glyph) {
        self.glyph = glyph;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn rel_y(&self) -> i32 {
        self.rel_y
    }

    pub fn set_rel_y(&mut self, y: i32) {
        self.rel_y = y;
    }

    pub fn render_offset(&self) -> i32 {
        self.render_offset
    }

    pub fn set_render_offset(&mut self, offset: i32) {
        self.render_offset = offset;
    }

    #[cfg(test)]
    pub fn timer(&self) -> &RepickTimer {
        &self.timer
    }
}

impl Sprite for RainDropCell {
    fn bounds(&self) -> Bounds {
        Bounds {
            x: 0,
            y: self.rel_y,
            width: self.metrics.width,
            height: self.metrics.height,
        }
    }

    fn draw(
        &self,
        ctx: &DrawContext<'_>,
        origin: Point,
        canvas: &mut dyn Canvas,
    ) -> RainResult<()> {
        let mut y = origin
            .y
            .saturating_add(self.rel_y)
            .saturating_add(self.render_offset);
        let x = origin.x.saturating_add(ctx.offsets.x_offset(y));
        y = y.saturating_add(ctx.offsets.y_offset(y));
        let image = ctx.store.image_for(self.color, self.glyph)?;
        canvas.blit(x, y, image);
        Ok(())
    }
}
