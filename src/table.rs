use strum::VariantArray;

use crate::world::{Action, Pos};

/// Dense value table over every (position, action) pair
///
/// Backed by a flat `size * size * 4` array, zero initialized, with O(1)
/// lookup. This is the only learned state in a run and it lives only for the
/// process lifetime.
pub struct QTable {
    size: usize,
    values: Vec<f32>,
}

impl QTable {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size * Action::VARIANTS.len()],
        }
    }

    fn index(&self, pos: Pos, action: Action) -> usize {
        debug_assert!(
            pos.x >= 0 && (pos.x as usize) < self.size && pos.y >= 0 && (pos.y as usize) < self.size,
            "position {pos} outside the table"
        );
        (pos.y as usize * self.size + pos.x as usize) * Action::VARIANTS.len() + action as usize
    }

    pub fn get(&self, pos: Pos, action: Action) -> f32 {
        self.values[self.index(pos, action)]
    }

    pub fn set(&mut self, pos: Pos, action: Action, value: f32) {
        let i = self.index(pos, action);
        self.values[i] = value;
    }

    /// Highest value over all actions at `pos`
    pub fn max(&self, pos: Pos) -> f32 {
        Action::VARIANTS
            .iter()
            .map(|&a| self.get(pos, a))
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Argmax action at `pos`, ties broken by the fixed variant order
    pub fn best_action(&self, pos: Pos) -> Action {
        let mut best = Action::VARIANTS[0];
        let mut best_value = self.get(pos, best);
        for &action in &Action::VARIANTS[1..] {
            let value = self.get(pos, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let table = QTable::new(5);
        assert_eq!(table.get(Pos::new(4, 4), Action::Right), 0.0);
        assert_eq!(table.max(Pos::new(2, 3)), 0.0);
    }

    #[test]
    fn set_and_get_are_per_pair() {
        let mut table = QTable::new(5);
        table.set(Pos::new(1, 2), Action::Left, 3.5);

        assert_eq!(table.get(Pos::new(1, 2), Action::Left), 3.5);
        assert_eq!(table.get(Pos::new(1, 2), Action::Right), 0.0);
        assert_eq!(table.get(Pos::new(2, 1), Action::Left), 0.0);
        assert_eq!(table.max(Pos::new(1, 2)), 3.5);
    }

    #[test]
    fn best_action_tie_breaks_in_variant_order() {
        let mut table = QTable::new(3);
        let pos = Pos::new(1, 1);

        assert_eq!(table.best_action(pos), Action::Up, "All-zero table");

        table.set(pos, Action::Down, 1.0);
        table.set(pos, Action::Right, 1.0);
        assert_eq!(table.best_action(pos), Action::Down, "First variant wins ties");

        table.set(pos, Action::Right, 2.0);
        assert_eq!(table.best_action(pos), Action::Right);
    }
}
