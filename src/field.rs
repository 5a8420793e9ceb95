// Copyright (c) 2026 rezky_nightky

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::style::Color;
use log::{debug, info, trace};
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::column::{ColumnParams, RainColumn};
use crate::error::{RainError, RainResult};
use crate::offset::OffsetAnimationMap;
use crate::sprite::{Canvas, DrawContext, Point, Sprite};
use crate::store::{GlyphImageStore, GlyphMetrics};

pub const DEFAULT_VELOCITY: f32 = 0.2;
pub const DEFAULT_MAX_CELLS: usize = 300;

#[derive(Clone, Debug)]
pub struct RainPalette {
    colors: Vec<Color>,
    lead: Color,
}

impl RainPalette {
    pub fn new(colors: &[Color], lead: Color) -> RainResult<Self> {
        let mut unique: Vec<Color> = Vec::with_capacity(colors.len());
        for &c in colors {
            if c != lead && !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.is_empty() {
            return Err(RainError::EmptyPalette);
        }
        Ok(Self {
            colors: unique,
            lead,
        })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn lead(&self) -> Color {
        self.lead
    }

    pub fn pick(&self, rng: &mut StdRng) -> Color {
        self.colors[rng.random_range(0..self.colors.len())]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldOptions {
    pub width: i32,
    pub height: i32,
    pub max_cells: usize,
    pub velocity: f32,
    pub row_mode: bool,
    pub seed: Option<u64>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            max_cells: DEFAULT_MAX_CELLS,
            velocity: DEFAULT_VELOCITY,
            row_mode: true,
            seed: None,
        }
    }
}

type SharedColumn = Arc<Mutex<RainColumn>>;

struct FieldState {
    width: i32,
    height: i32,
    velocity: f32,
    closest_uncovered_x: i32,
    columns: Vec<SharedColumn>,
    rng: StdRng,
}

// Lock order: the field, then a column.
pub struct RainField {
    state: Mutex<FieldState>,
    palette: RainPalette,
    metrics: GlyphMetrics,
    max_cells: usize,
    row_mode: bool,
    store: Arc<GlyphImageStore>,
    offsets: Arc<OffsetAnimationMap>,
    debug: AtomicBool,
}

impl RainField {
    pub fn new(
        opts: FieldOptions,
        palette: RainPalette,
        store: Arc<GlyphImageStore>,
        offsets: Arc<OffsetAnimationMap>,
    ) -> RainResult<Self> {
        if opts.max_cells == 0 {
            return Err(RainError::InvalidMaxCells(opts.max_cells));
        }
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let field = Self {
            state: Mutex::new(FieldState {
                width: opts.width.max(0),
                height: opts.height.max(0),
                velocity: opts.velocity,
                closest_uncovered_x: 0,
                columns: Vec::new(),
                rng,
            }),
            palette,
            metrics: store.metrics(),
            max_cells: opts.max_cells,
            row_mode: opts.row_mode,
            store,
            offsets,
            debug: AtomicBool::new(false),
        };
        {
            let mut st = field.state.lock();
            field.add_columns_to_the_right(&mut st)?;
            info!(
                "new rain field {}x{} with {} columns",
                st.width,
                st.height,
                st.columns.len()
            );
        }
        Ok(field)
    }

    fn footprint(&self) -> i32 {
        self.metrics.footprint()
    }

    fn column_params(&self, velocity: f32) -> ColumnParams {
        ColumnParams {
            metrics: self.metrics,
            lead_color: self.palette.lead(),
            max_cells: self.max_cells,
            velocity,
            row_mode: self.row_mode,
        }
    }

    fn spawn_column(&self, st: &mut FieldState, x: i32) -> RainResult<RainColumn> {
        let color = self.palette.pick(&mut st.rng);
        let column_rng = StdRng::from_rng(&mut st.rng);
        let mut column =
            RainColumn::new(x, color, st.height, self.column_params(st.velocity), column_rng)?;
        let max_height = column.max_height();
        let spread = if max_height > 0 {
            st.rng.random_range(0..max_height)
        } else {
            0
        };
        column.set_y((-max_height + (2 * -spread + 1)) as f32);
        Ok(column)
    }

    fn add_columns_to_the_right(&self, st: &mut FieldState) -> RainResult<()> {
        let footprint = self.footprint();
        while st.closest_uncovered_x + footprint <= st.width {
            let x = st.closest_uncovered_x;
            let column = self.spawn_column(st, x)?;
            debug!("added column at x {} with {} cells", x, column.len());
            st.columns.push(Arc::new(Mutex::new(column)));
            st.closest_uncovered_x += footprint;
        }
        Ok(())
    }

    fn remove_columns_past(&self, st: &mut FieldState) {
        let footprint = self.footprint();
        let width = st.width;
        let before = st.columns.len();
        st.columns.retain(|c| c.lock().x() + footprint <= width);
        let removed = before - st.columns.len();
        if removed > 0 {
            st.closest_uncovered_x -= removed as i32 * footprint;
            debug!("removed {} columns past x {}", removed, width);
        }
    }

    pub fn resize(&self, width: i32, height: i32) -> RainResult<()> {
        let mut st = self.state.lock();
        let old_width = st.width;
        st.width = width.max(0);
        st.height = height.max(0);
        if st.width > old_width {
            self.add_columns_to_the_right(&mut st)?;
        } else if st.width < old_width {
            self.remove_columns_past(&mut st);
        }
        Ok(())
    }

    pub fn advance(&self, elapsed_ms: u64) -> RainResult<()> {
        let (columns, height) = {
            let st = self.state.lock();
            (st.columns.clone(), st.height)
        };
        for shared in &columns {
            let mut column = shared.lock();
            if column.rounded_y() > height {
                let color = self.palette.pick(column.rng_mut());
                column.resize(height, color)?;
                trace!("recycled column at x {} ({} cells)", column.x(), column.len());
            }
            column.advance(elapsed_ms);
        }
        Ok(())
    }

    pub fn change_velocity(&self, velocity: f32) {
        let mut st = self.state.lock();
        st.velocity = velocity;
        for c in &st.columns {
            c.lock().set_velocity(velocity);
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) -> RainResult<()> {
        let (columns, uncovered_x) = {
            let st = self.state.lock();
            (st.columns.clone(), st.closest_uncovered_x)
        };
        let ctx = DrawContext {
            store: &self.store,
            offsets: &self.offsets,
        };
        let debug = self.debug();
        for shared in &columns {
            let column = shared.lock();
            column.draw(&ctx, Point::ORIGIN, canvas)?;
            if debug {
                column.draw_debug(Point::ORIGIN, canvas);
            }
        }
        if debug {
            canvas.vertical_rule(uncovered_x);
        }
        Ok(())
    }

    pub fn velocity(&self) -> f32 {
        self.state.lock().velocity
    }

    pub fn column_count(&self) -> usize {
        self.state.lock().columns.len()
    }

    #[cfg(test)]
    pub fn closest_uncovered_x(&self) -> i32 {
        self.state.lock().closest_uncovered_x
    }

    #[cfg(test)]
    pub fn column_xs(&self) -> Vec<i32> {
        let st = self.state.lock();
        st.columns.iter().map(|c| c.lock().x()).collect()
    }

    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, on: bool) {
        self.debug.store(on, Ordering::Relaxed);
    }

    #[cfg(test)]
    fn columns(&self) -> Vec<SharedColumn> {
        self.state.lock().columns.clone()
    }
}
