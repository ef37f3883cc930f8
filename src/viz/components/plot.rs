use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, style::Stylize, widgets::*};

use crate::viz::util::event_keycode;

use super::Component;

/// One metric's scatter data over episodes
struct Plot {
    name: &'static str,
    data: Vec<(f64, f64)>,
    x_max: f64,
}

impl Plot {
    fn new(name: &'static str, episodes: u32) -> Self {
        Self {
            name,
            data: Vec::new(),
            x_max: episodes.into(),
        }
    }

    fn y_bounds(&self) -> [f64; 2] {
        let (min, max) = self
            .data
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), &(_, y)| {
                (min.min(y), max.max(y))
            });
        if min > max {
            [0.0, 1.0]
        } else if min == max {
            [min - 1.0, max + 1.0]
        } else {
            [min, max]
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let x_bounds = [0.0, self.x_max];
        let y_bounds = self.y_bounds();

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(x_bounds.iter().map(|x| format!("{x:.0}").bold()).collect())
            .bounds(x_bounds);

        let y_axis = Axis::default()
            .title(self.name)
            .dark_gray()
            .labels(y_bounds.iter().map(|y| format!("{y:.2}").bold()).collect())
            .bounds(y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .padding(Padding::uniform(2)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// Tabbed per-episode metric plots
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: Vec<&'static str>, episodes: u32) -> Self {
        Self {
            plots: names.iter().map(|n| Plot::new(n, episodes)).collect(),
            selected: 0,
        }
    }

    /// Append one row of metrics, in the same order the names were given
    pub fn update(&mut self, episode: u32, data: Vec<f64>) {
        for (plot, value) in self.plots.iter_mut().zip(data) {
            plot.data.push((episode.into(), value));
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [tabs_area, chart_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Tabs::new(self.plots.iter().map(|p| p.name))
            .white()
            .highlight_style(Style::default().yellow())
            .select(self.selected)
            .render(tabs_area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render(chart_area, buf);
        }
    }
}

impl Component for Plots {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let len = self.plots.len();
        match event_keycode(event) {
            Some(KeyCode::Left) => {
                self.selected = (self.selected + len - 1) % len;
                true
            }
            Some(KeyCode::Right) => {
                self.selected = (self.selected + 1) % len;
                true
            }
            _ => false,
        }
    }
}
