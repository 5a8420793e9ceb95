// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use rand::{rngs::StdRng, Rng};

use crate::cascade::RowOffsetCascade;
use crate::drop::RainDropCell;
use crate::error::{RainError, RainResult};
use crate::glyph::Glyph;
use crate::sprite::{Bounds, Canvas, DrawContext, Motion, Point, Sprite};
use crate::stack::{CellId, OrderedCellStack};
use crate::store::GlyphMetrics;

#[derive(Clone, Copy, Debug)]
pub struct ColumnParams {
    pub metrics: GlyphMetrics,
    pub lead_color: Color,
    pub max_cells: usize,
    pub velocity: f32,
    pub row_mode: bool,
}

// A cell is always in exactly one of `live` and `pool`.
pub struct RainColumn {
    params: ColumnParams,
    motion: Motion,
    height: i32,
    pane_height: i32,
    color: Color,
    cells: Vec<RainDropCell>,
    live: Vec<CellId>,
    pool: Vec<CellId>,
    stack: OrderedCellStack,
    cascade: RowOffsetCascade,
    rng: StdRng,
}

impl RainColumn {
    pub fn new(
        x: i32,
        color: Color,
        pane_height: i32,
        params: ColumnParams,
        mut rng: StdRng,
    ) -> RainResult<Self> {
        if params.max_cells == 0 {
            return Err(RainError::InvalidMaxCells(params.max_cells));
        }

        let lead_cell = RainDropCell::new(params.lead_color, params.metrics, &mut rng);
        let lead = CellId(0);
        let mut cells = Vec::with_capacity(params.max_cells.min(64));
        cells.push(lead_cell);

        let mut column = Self {
            params,
            motion: Motion {
                x: x as f32,
                y: 0.0,
                velocity_y: params.velocity,
            },
            height: 0,
            pane_height,
            color,
            cells,
            live: vec![lead],
            pool: Vec::new(),
            stack: OrderedCellStack::new(lead, params.max_cells),
            cascade: RowOffsetCascade::new(params.metrics.units_per_row()),
            rng,
        };
        column.update_height();

        let target = column.random_cell_count();
        column.grow(color, target);
        column.reposition_lead();
        Ok(column)
    }

    fn units_per_row(&self) -> i32 {
        self.params.metrics.units_per_row()
    }

    fn rows_that_fit(&self) -> i32 {
        self.pane_height / self.units_per_row()
    }

    fn random_cell_count(&mut self) -> usize {
        let fit = self.rows_that_fit().max(1) as usize;
        let upper = fit.min(self.params.max_cells);
        self.rng.random_range(1..=upper)
    }

    fn height_for(&self, count: usize) -> i32 {
        count as i32 * self.units_per_row() - 1
    }

    fn update_height(&mut self) {
        self.height = self.height_for(self.live.len());
    }

    pub fn max_height(&self) -> i32 {
        let fit = self.rows_that_fit().max(0) as usize;
        fit.min(self.params.max_cells) as i32 * self.units_per_row()
    }

    fn lead(&self) -> CellId {
        self.stack.lead()
    }

    fn reposition_lead(&mut self) {
        let y = (self.live.len() as i32 - 1) * self.units_per_row();
        let lead = self.lead();
        self.cells[lead.index()].set_rel_y(y);
    }

    fn grow(&mut self, color: Color, target: usize) {
        while self.live.len() < target {
            self.add_cell(color);
        }
    }

    fn add_cell(&mut self, color: Color) {
        let id = match self.pool.pop() {
            Some(id) => id,
            None => {
                self.cells
                    .push(RainDropCell::new(color, self.params.metrics, &mut self.rng));
                CellId(self.cells.len() - 1)
            }
        };
        let y = (self.live.len() as i32 - 1) * self.units_per_row();
        let glyph = Glyph::random(&mut self.rng);
        let cell = &mut self.cells[id.index()];
        cell.set_glyph(glyph);
        cell.set_color(color);
        cell.set_rel_y(y);

        self.stack.insert_second_from_top(id);
        self.live.push(id);
        self.update_height();
    }

    fn shrink(&mut self, count: usize) -> RainResult<()> {
        let lead = self.lead();
        let removed: Vec<CellId> = self
            .stack
            .iter()
            .filter(|&id| id != lead)
            .take(count)
            .collect();
        self.stack.remove_all(&removed)?;
        self.live.retain(|id| !removed.contains(id));
        self.pool.extend(removed);
        self.update_height();
        Ok(())
    }

    fn recolor(&mut self, color: Color) {
        let lead = self.lead();
        for id in self.stack.iter().filter(|&id| id != lead) {
            self.cells[id.index()].set_color(color);
        }
    }

    pub fn resize(&mut self, pane_height: i32, color: Color) -> RainResult<()> {
        self.pane_height = pane_height;
        let target = self.random_cell_count();
        if target > self.params.max_cells {
            return Err(RainError::LengthExceedsMax {
                requested: target,
                max: self.params.max_cells,
            });
        }

        let current = self.live.len();
        if target < current {
            self.shrink(current - target)?;
        } else if target > current {
            self.grow(color, target);
        }
        self.recolor(color);
        self.color = color;

        self.reposition_lead();
        self.motion.y = -self.height as f32;
        Ok(())
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        self.motion.integrate(elapsed_ms);
        for &id in &self.live {
            self.cells[id.index()].advance(elapsed_ms, &mut self.rng);
        }
        if self.params.row_mode {
            self.cascade
                .update(self.motion.y, &self.stack, &mut self.cells, &mut self.rng);
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    #[cfg(test)]
    pub fn allocated(&self) -> usize {
        self.cells.len()
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn x(&self) -> i32 {
        self.motion.rounded_x()
    }

    #[cfg(test)]
    pub fn y(&self) -> f32 {
        self.motion.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.motion.y = y;
    }

    pub fn rounded_y(&self) -> i32 {
        self.motion.rounded_y()
    }

    pub fn velocity(&self) -> f32 {
        self.motion.velocity_y
    }

    pub fn set_velocity(&mut self, v: f32) {
        self.motion.velocity_y = v;
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn cells(&self) -> impl Iterator<Item = &RainDropCell> + '_ {
        self.stack.iter().map(move |id| &self.cells[id.index()])
    }

    #[cfg(test)]
    pub fn lead_cell(&self) -> &RainDropCell {
        &self.cells[self.lead().index()]
    }
}

impl Sprite for RainColumn {
    fn bounds(&self) -> Bounds {
        Bounds {
            x: self.motion.rounded_x(),
            y: self.motion.rounded_y(),
            width: self.params.metrics.width,
            height: self.height,
        }
    }

    fn draw(
        &self,
        ctx: &DrawContext<'_>,
        origin: Point,
        canvas: &mut dyn Canvas,
    ) -> RainResult<()> {
        let at = origin.offset(self.motion.rounded_x(), self.motion.rounded_y());
        for cell in self.cells() {
            cell.draw(ctx, at, canvas)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;
    use crate::offset::{NoOffset, OffsetAnimationMap, OffsetErrorLog};
    use crate::sprite::testing::RecordingCanvas;
    use crate::store::{GlyphImageStore, StoreOptions};

    const UPR: i32 = 17;

    fn params(max_cells: usize, row_mode: bool) -> ColumnParams {
        ColumnParams {
            metrics: GlyphMetrics::new(9, 16).unwrap(),
            lead_color: Color::White,
            max_cells,
            velocity: 0.2,
            row_mode,
        }
    }

    fn column(seed: u64, pane_height: i32, max_cells: usize) -> RainColumn {
        RainColumn::new(
            0,
            Color::Green,
            pane_height,
            params(max_cells, true),
            StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn check_layout(c: &RainColumn) {
        let n = c.len();
        assert_eq!(c.height(), n as i32 * UPR - 1);
        assert_eq!(c.stack.len(), n);
        assert_eq!(c.lead_cell().rel_y(), (n as i32 - 1) * UPR);
        assert_eq!(c.lead_cell().color(), Color::White);

        let live: HashSet<CellId> = c.live.iter().copied().collect();
        let stacked: HashSet<CellId> = c.stack.iter().collect();
        assert_eq!(live, stacked);
        assert!(c.pool.iter().all(|id| !live.contains(id)));
        assert_eq!(live.len() + c.pool.len(), c.allocated());

        let mut ys: Vec<i32> = c.cells().map(|cell| cell.rel_y()).collect();
        ys.sort_unstable();
        let expected: Vec<i32> = (0..n as i32).map(|i| i * UPR).collect();
        assert_eq!(ys, expected);
    }

    #[test]
    fn zero_max_cells_is_rejected() {
        let err = RainColumn::new(
            0,
            Color::Green,
            500,
            params(0, true),
            StdRng::seed_from_u64(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, RainError::InvalidMaxCells(0)));
    }

    #[test]
    fn cell_count_is_bounded_by_rows_that_fit() {
        for seed in 0..200 {
            let c = column(seed, 3 * UPR, 10);
            assert!((1..=3).contains(&c.len()), "len {}", c.len());
            check_layout(&c);
        }
    }

    #[test]
    fn tiny_panes_still_get_one_cell() {
        for seed in 0..20 {
            let c = column(seed, 5, 10);
            assert_eq!(c.len(), 1);
            assert_eq!(c.max_height(), 0);
        }
    }

    #[test]
    fn cell_count_never_exceeds_max_cells() {
        for seed in 0..100 {
            let mut c = column(seed, 10_000, 4);
            assert!((1..=4).contains(&c.len()));
            c.resize(10_000, Color::Red).unwrap();
            assert!((1..=4).contains(&c.len()));
        }
    }

    #[test]
    fn resize_moves_the_column_above_the_pane_and_recolors() {
        let mut c = column(7, 40 * UPR, 40);
        c.set_y(900.0);
        c.resize(40 * UPR, Color::Red).unwrap();
        assert_eq!(c.y(), -(c.height() as f32));
        assert_eq!(c.color(), Color::Red);
        for cell in c.cells().skip(1) {
            assert_eq!(cell.color(), Color::Red);
        }
        check_layout(&c);
    }

    #[test]
    fn repeated_resizes_reuse_pooled_cells() {
        let mut c = column(3, 30 * UPR, 30);
        let mut high_water = c.allocated();
        for i in 0..300 {
            let color = if i % 2 == 0 { Color::Red } else { Color::Blue };
            c.resize(30 * UPR, color).unwrap();
            check_layout(&c);
            // a new allocation only happens once the pool ran dry
            if c.allocated() > high_water {
                assert_eq!(c.pooled(), 0);
                high_water = c.allocated();
            }
        }
        assert!(c.allocated() <= 30);
    }

    #[test]
    fn shrinking_detaches_the_cells_next_to_the_lead() {
        let mut c = column(5, 30 * UPR, 30);
        while c.len() < 5 {
            c.resize(30 * UPR, Color::Green).unwrap();
        }
        let order: Vec<CellId> = c.stack.iter().collect();
        let before = c.len();
        c.shrink(2).unwrap();
        assert_eq!(c.len(), before - 2);
        assert_eq!(&c.pool[c.pool.len() - 2..], &order[1..3]);
        assert_eq!(c.stack.iter().collect::<Vec<_>>()[1..], order[3..]);
    }

    #[test]
    fn advance_integrates_velocity() {
        let mut c = column(9, 20 * UPR, 20);
        c.set_y(0.0);
        c.advance(100);
        assert!((c.y() - 20.0).abs() < 1e-3);
        c.set_velocity(0.5);
        c.advance(10);
        assert!((c.y() - 25.0).abs() < 1e-3);
    }

    #[test]
    fn row_mode_snaps_cells_to_rows() {
        let mut c = column(10, 20 * UPR, 20);
        c.set_y(3.0);
        c.advance(0);
        assert!(c.cells().all(|cell| cell.render_offset() == -3));

        let mut smooth = RainColumn::new(
            0,
            Color::Green,
            20 * UPR,
            params(20, false),
            StdRng::seed_from_u64(10),
        )
        .unwrap();
        smooth.set_y(3.0);
        smooth.advance(0);
        assert!(smooth.cells().all(|cell| cell.render_offset() == 0));
    }

    #[test]
    fn draw_blits_every_cell_at_its_row() {
        let c = column(12, 20 * UPR, 20);
        let store = GlyphImageStore::new(
            &[Color::Green],
            Color::White,
            GlyphMetrics::new(9, 16).unwrap(),
            StoreOptions::default(),
        );
        let offsets = OffsetAnimationMap::new(Arc::new(NoOffset), Arc::new(OffsetErrorLog::new()));
        let ctx = DrawContext {
            store: &store,
            offsets: &offsets,
        };
        let mut canvas = RecordingCanvas::default();
        c.draw(&ctx, Point::new(40, 0), &mut canvas).unwrap();
        let blits = canvas.blits();
        assert_eq!(blits.len(), c.len());
        assert!(blits.iter().all(|&(x, y, _)| x == 40 && y % UPR == 0));
        assert_eq!(blits[0].1, (c.len() as i32 - 1) * UPR);
    }
}
