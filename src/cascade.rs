// Copyright (c) 2026 rezky_nightky

use rand::rngs::StdRng;

use crate::drop::RainDropCell;
use crate::sprite::round_half_up;
use crate::stack::OrderedCellStack;

// `%` keeps the sign of `y`, so negative positions count up from `-upr`.
pub fn units_until_next_row(y: f32, units_per_row: i32) -> i32 {
    let rem = round_half_up(y % units_per_row as f32);
    if y >= 0.0 {
        rem
    } else {
        units_per_row + rem
    }
}

#[derive(Clone, Debug)]
pub struct RowOffsetCascade {
    units_per_row: i32,
    last_lead_draw_y: i32,
}

impl RowOffsetCascade {
    pub fn new(units_per_row: i32) -> Self {
        Self {
            units_per_row,
            last_lead_draw_y: 0,
        }
    }

    pub fn update(
        &mut self,
        column_y: f32,
        stack: &OrderedCellStack,
        cells: &mut [RainDropCell],
        rng: &mut StdRng,
    ) -> u32 {
        let lead = &cells[stack.lead().index()];
        let old_offset = lead.render_offset();
        let lead_draw_y = round_half_up(column_y) + lead.rel_y();

        let offset = -units_until_next_row(column_y, self.units_per_row);
        for id in stack.iter() {
            cells[id.index()].set_render_offset(offset);
        }

        let previous = old_offset + self.last_lead_draw_y;
        let current = offset + lead_draw_y;
        self.last_lead_draw_y = lead_draw_y;
        if previous == current {
            return 0;
        }

        let crossings = ((current - previous) / self.units_per_row).max(0) as u32;
        for _ in 0..crossings {
            stack.cascade_glyphs_upward(cells, rng);
        }
        crossings
    }
}
