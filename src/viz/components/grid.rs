use std::collections::HashSet;

use crossterm::event::Event;
use ratatui::{prelude::*, widgets::*};

use crate::{
    agent::{Rollout, RolloutOutcome},
    world::{Action, Pos, WorldLayout},
};

use super::Component;

/// Renders the static world layout with the live agent, the best-action
/// hint, and eventually the replayed trajectory
pub struct GridView {
    layout: WorldLayout,
    agent: Option<Pos>,
    hint: Option<Action>,
    rollout: Option<Rollout>,
    path_cells: HashSet<Pos>,
}

impl GridView {
    pub fn new(layout: WorldLayout) -> Self {
        Self {
            layout,
            agent: None,
            hint: None,
            rollout: None,
            path_cells: HashSet::new(),
        }
    }

    pub fn set_agent(&mut self, pos: Pos, hint: Option<Action>) {
        self.agent = Some(pos);
        self.hint = hint;
    }

    pub fn set_rollout(&mut self, rollout: Rollout) {
        self.agent = rollout.path.last().copied();
        self.hint = None;
        self.path_cells = rollout.path.iter().copied().collect();
        self.rollout = Some(rollout);
    }

    fn title(&self) -> String {
        if let Some(rollout) = &self.rollout {
            let verdict = match rollout.outcome {
                RolloutOutcome::ReachedGoal => "goal reached",
                RolloutOutcome::Stuck => "agent stuck",
                RolloutOutcome::Looped => "cycle cut short",
                RolloutOutcome::OutOfSteps => "out of steps",
            };
            format!(
                "World [replay: {verdict}, {} steps, score {}]",
                rollout.path.len() - 1,
                rollout.score
            )
        } else if let Some(hint) = self.hint {
            format!("World [best {}]", arrow(hint))
        } else {
            String::from("World")
        }
    }

    fn cell(&self, pos: Pos) -> (String, Style) {
        if self.agent == Some(pos) {
            return (String::from("● "), Style::default().light_blue().bold());
        }
        if self.path_cells.contains(&pos) {
            return (String::from("• "), Style::default().blue());
        }
        if self.layout.starts.contains(&pos) {
            return (String::from("S "), Style::default().green().bold());
        }
        if pos == self.layout.goal {
            return (String::from("G "), Style::default().light_red().bold());
        }
        if self.layout.obstacles.contains(&pos) {
            return (String::from("██"), Style::default().dark_gray());
        }
        if self.layout.traps.contains(&pos) {
            return (String::from("x "), Style::default().red());
        }
        if self.layout.treasures.contains(&pos) {
            return (String::from("♦ "), Style::default().yellow());
        }
        if let Some(i) = self
            .layout
            .teleports
            .iter()
            .position(|&(a, b)| a == pos || b == pos)
        {
            return (format!("T{i}"), Style::default().magenta());
        }
        (String::from("· "), Style::default().dim())
    }
}

impl WidgetRef for GridView {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title());
        let inner = block.inner(area);
        block.render(area, buf);

        let size = self.layout.size as u16;
        let x0 = inner.x + inner.width.saturating_sub(size * 2) / 2;
        let y0 = inner.y + inner.height.saturating_sub(size) / 2;

        for y in 0..size {
            let row = y0 + y;
            if row >= inner.bottom() {
                break;
            }
            for x in 0..size {
                let col = x0 + x * 2;
                if col + 1 >= inner.right() {
                    break;
                }
                let (symbol, style) = self.cell(Pos::new(x as i32, y as i32));
                buf.set_string(col, row, symbol, style);
            }
        }
    }
}

impl Component for GridView {
    fn handle_ui_event(&mut self, _event: &Event) -> bool {
        false
    }
}

const fn arrow(action: Action) -> char {
    match action {
        Action::Up => '↑',
        Action::Down => '↓',
        Action::Left => '←',
        Action::Right => '→',
    }
}
