use std::{
    io,
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossterm::event;
use ratatui::{prelude::*, widgets::*};

use crate::{
    agent::Rollout,
    world::{Action, Pos, WorldLayout},
};

use self::components::{help::render_help, Component, GridView, Logs, Plots};

mod components;
mod tui;
mod util;

const TABS: [&str; 3] = ["World", "Plots", "Logs"];

#[derive(Default)]
pub enum State {
    #[default]
    Run,
    Quit,
}

/// Messages from the training loop to the renderer
pub enum Update {
    /// Live agent position and best-action hint for the world view
    Step { pos: Pos, hint: Option<Action> },
    /// End of episode, with a metric row in report-key order
    Episode {
        episode: u32,
        epsilon: f32,
        data: Vec<f64>,
    },
    /// Final greedy rollout to display
    Rollout(Rollout),
}

/// Initialize the logger and spawn the renderer on its own thread
///
/// The renderer owns the terminal until the user quits with `q`. Training
/// sends [`Update`]s over the returned channel; a send error means the
/// renderer is gone and the run should wind down.
pub fn init(
    layout: WorldLayout,
    plots: &[&'static str],
    episodes: u32,
) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    let _ = tui_logger::init_logger(log::LevelFilter::Trace);
    tui_logger::set_default_level(log::LevelFilter::Trace);

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(layout, plots, episodes);
    let handle = thread::spawn(move || app.run(rx));

    (handle, tx)
}

/// The root TUI component which holds the main app state and runs the render loop
pub struct App {
    state: State,
    episode: u32,
    total_episodes: u32,
    epsilon: f32,
    selected_tab: usize,
    show_help: bool,
    grid: GridView,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(layout: WorldLayout, plots: &[&'static str], episodes: u32) -> Self {
        Self {
            state: Default::default(),
            episode: 0,
            total_episodes: episodes,
            epsilon: 0.0,
            selected_tab: 0,
            show_help: false,
            grid: GridView::new(layout),
            plots: Plots::new(plots.to_vec(), episodes),
            logs: Logs::new(),
        }
    }

    /// Initialize the terminal and run the main loop
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        loop {
            match self.state {
                State::Run => {
                    loop {
                        match rx.try_recv() {
                            Ok(Update::Step { pos, hint }) => self.grid.set_agent(pos, hint),
                            Ok(Update::Episode {
                                episode,
                                epsilon,
                                data,
                            }) => {
                                self.episode = episode;
                                self.epsilon = epsilon;
                                self.plots.update(episode, data);
                            }
                            Ok(Update::Rollout(rollout)) => self.grid.set_rollout(rollout),
                            // sender gone: training is done, keep showing the result
                            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                        };
                    }

                    terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

                    if event::poll(Duration::from_millis(16))? {
                        let ev = event::read()?;
                        if let Some(key) = util::event_keycode(&ev) {
                            use crossterm::event::KeyCode;
                            match key {
                                KeyCode::Char('q') => self.state = State::Quit,
                                KeyCode::Char('h') => self.show_help = !self.show_help,
                                KeyCode::Tab => {
                                    self.selected_tab = (self.selected_tab + 1) % TABS.len();
                                }
                                _ => {
                                    match self.selected_tab {
                                        0 => self.grid.handle_ui_event(&ev),
                                        1 => self.plots.handle_ui_event(&ev),
                                        2 => self.logs.handle_ui_event(&ev),
                                        _ => false,
                                    };
                                }
                            }
                        }
                    }
                }
                State::Quit => break,
            }
        }

        tui::restore()
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => self.grid.render_ref(main_area, buf),
            1 => self.plots.render_ref(main_area, buf),
            2 => self.logs.render_ref(main_area, buf),
            _ => {}
        }

        let done = self.episode + 1 >= self.total_episodes;
        let label = if done {
            String::from("training complete, q to quit")
        } else {
            format!(
                "episode {} / {}, epsilon {:.3}",
                self.episode + 1,
                self.total_episodes,
                self.epsilon
            )
        };
        Gauge::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Progress"),
            )
            .gauge_style(Color::Cyan)
            .label(label)
            .ratio(((self.episode + 1) as f64 / self.total_episodes as f64).min(1.0))
            .render(progress_area, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
