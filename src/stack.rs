// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

use rand::rngs::StdRng;

use crate::drop::RainDropCell;
use crate::error::{RainError, RainResult};
use crate::glyph::Glyph;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

// The back of the deque is the lead cell.
#[derive(Clone, Debug)]
pub struct OrderedCellStack {
    order: VecDeque<CellId>,
    lead: CellId,
}

impl OrderedCellStack {
    pub fn new(lead: CellId, capacity: usize) -> Self {
        let mut order = VecDeque::with_capacity(capacity);
        order.push_back(lead);
        Self { order, lead }
    }

    pub fn lead(&self) -> CellId {
        self.lead
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn insert_second_from_top(&mut self, id: CellId) {
        let lead = self.order.pop_back();
        self.order.push_back(id);
        if let Some(lead) = lead {
            self.order.push_back(lead);
        }
    }

    pub fn remove_all(&mut self, ids: &[CellId]) -> RainResult<()> {
        if ids.contains(&self.lead) {
            return Err(RainError::LeadCellRemoval);
        }
        let before = self.order.len();
        self.order.retain(|id| !ids.contains(id));
        if self.order.len() == before {
            return Err(RainError::CellsNotInStack);
        }
        Ok(())
    }

    pub fn cascade_glyphs_upward(&self, cells: &mut [RainDropCell], rng: &mut StdRng) {
        let mut handed = Glyph::random(rng);
        for id in self.iter() {
            let cell = &mut cells[id.index()];
            let previous = cell.glyph();
            cell.set_glyph(handed);
            handed = previous;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        self.order.iter().rev().copied()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::style::Color;
    use rand::SeedableRng;

    use super::*;
    use crate::store::GlyphMetrics;

    fn cells(n: usize, rng: &mut StdRng) -> Vec<RainDropCell> {
        let m = GlyphMetrics::new(9, 16).unwrap();
        (0..n).map(|_| RainDropCell::new(Color::Green, m, rng)).collect()
    }

    #[test]
    fn fresh_stack_yields_only_the_lead() {
        let stack = OrderedCellStack::new(CellId(0), 4);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![CellId(0)]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn inserted_cells_sit_right_above_the_lead() {
        let mut stack = OrderedCellStack::new(CellId(0), 4);
        stack.insert_second_from_top(CellId(1));
        stack.insert_second_from_top(CellId(2));
        assert_eq!(
            stack.iter().collect::<Vec<_>>(),
            vec![CellId(0), CellId(2), CellId(1)]
        );
        // restartable
        assert_eq!(stack.iter().count(), 3);
    }

    #[test]
    fn removing_the_lead_is_rejected() {
        let mut stack = OrderedCellStack::new(CellId(0), 4);
        stack.insert_second_from_top(CellId(1));
        let err = stack.remove_all(&[CellId(1), CellId(0)]).unwrap_err();
        assert!(matches!(err, RainError::LeadCellRemoval));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn removing_absent_cells_is_rejected() {
        let mut stack = OrderedCellStack::new(CellId(0), 4);
        stack.insert_second_from_top(CellId(1));
        let err = stack.remove_all(&[CellId(7)]).unwrap_err();
        assert!(matches!(err, RainError::CellsNotInStack));

        stack.remove_all(&[CellId(1), CellId(7)]).unwrap();
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![CellId(0)]);
    }

    #[test]
    fn cascade_hands_glyphs_up_one_cell() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cells = cells(3, &mut rng);
        let mut stack = OrderedCellStack::new(CellId(0), 3);
        stack.insert_second_from_top(CellId(2));
        stack.insert_second_from_top(CellId(1));
        // bottom to top: 0, 1, 2
        for (i, c) in cells.iter_mut().enumerate() {
            c.set_glyph(Glyph::from_index(i).unwrap());
        }

        stack.cascade_glyphs_upward(&mut cells, &mut rng);
        assert_eq!(cells[1].glyph(), Glyph::from_index(0).unwrap());
        assert_eq!(cells[2].glyph(), Glyph::from_index(1).unwrap());
        assert!(cells[0].glyph().index() < Glyph::COUNT);
    }
}
