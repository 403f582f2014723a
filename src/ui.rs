use crate::task::TaskId;
use crate::task_list::{Confirm, TaskList, DELETE_PROMPT};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tokio::runtime::Runtime;
use tracing::debug;

const HELP: &str = "a add | d done | x delete | r refresh | q quit";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Editing,
    Confirming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    Submit,
    MarkDone(TaskId),
    Delete(TaskId),
}

#[derive(Debug, Default)]
pub struct View {
    pub selected: usize,
    pub mode: Mode,
}

impl View {
    /// Keeps the selection inside the current rows after a refresh.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn selected_id(&self, list: &TaskList) -> Option<TaskId> {
        list.rows().get(self.selected).map(|r| r.id.clone())
    }

    /// Maps a key press to an action; edits to the input field and
    /// selection moves are applied directly.
    pub fn on_key(&mut self, code: KeyCode, list: &mut TaskList) -> Option<Action> {
        match self.mode {
            Mode::Editing => match code {
                KeyCode::Enter => {
                    self.mode = Mode::Browse;
                    Some(Action::Submit)
                }
                KeyCode::Esc => {
                    self.mode = Mode::Browse;
                    None
                }
                KeyCode::Backspace => {
                    list.input.pop();
                    None
                }
                KeyCode::Char(c) => {
                    list.input.push(c);
                    None
                }
                _ => None,
            },
            Mode::Confirming => None,
            Mode::Browse => match code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('r') => Some(Action::Refresh),
                KeyCode::Char('a') => {
                    self.mode = Mode::Editing;
                    None
                }
                KeyCode::Char('d') | KeyCode::Enter => {
                    self.selected_id(list).map(Action::MarkDone)
                }
                KeyCode::Char('x') | KeyCode::Delete => self.selected_id(list).map(Action::Delete),
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                    None
                }
                KeyCode::Down => {
                    if self.selected + 1 < list.rows().len() {
                        self.selected += 1;
                    }
                    None
                }
                _ => None,
            },
        }
    }
}

/// Answers a confirmation with the next `y` or `n` key press.
struct KeyConfirm;

impl Confirm for KeyConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        debug!(%message, "waiting for confirmation");
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return true,
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return false,
                    _ => {}
                },
                Ok(_) => {}
                Err(_) => return false,
            }
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    list: &mut TaskList,
    runtime: &Runtime,
) -> io::Result<()> {
    let mut view = View::default();
    // failures are logged and shown on the status line by the task list
    let _ = runtime.block_on(list.refresh());
    loop {
        view.clamp(list.rows().len());
        terminal.draw(|f| draw(f, list, &view))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match view.on_key(key.code, list) {
            Some(Action::Quit) => return Ok(()),
            Some(Action::Refresh) => {
                let _ = runtime.block_on(list.refresh());
            }
            Some(Action::Submit) => {
                let _ = runtime.block_on(list.submit_input());
            }
            Some(Action::MarkDone(id)) => {
                let _ = runtime.block_on(list.mark_done(&id));
            }
            Some(Action::Delete(id)) => {
                view.mode = Mode::Confirming;
                terminal.draw(|f| draw(f, list, &view))?;
                let _ = runtime.block_on(list.delete(&id, &mut KeyConfirm));
                view.mode = Mode::Browse;
            }
            None => {}
        }
    }
}

pub fn draw(f: &mut Frame, list: &TaskList, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Row::new(["Task", "Status", "Created", "Completed"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = list
        .rows()
        .iter()
        .map(|r| {
            let status_style = if r.status == "DONE" {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Row::new(vec![
                Cell::from(r.task.as_str()),
                Cell::from(Span::styled(r.status.as_str(), status_style)),
                Cell::from(r.created.as_str()),
                Cell::from(r.completed.as_str()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(8),
            Constraint::Length(20),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(Block::default().title("Tasks").borders(Borders::ALL))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state =
        TableState::default().with_selected((!list.rows().is_empty()).then_some(view.selected));
    f.render_stateful_widget(table, chunks[0], &mut state);

    let input = Paragraph::new(list.input.as_str()).block(
        Block::default()
            .title("New task")
            .borders(Borders::ALL)
            .border_style(if view.mode == Mode::Editing {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    f.render_widget(input, chunks[1]);

    let status = match list.notice() {
        Some(notice) => Line::from(Span::styled(notice, Style::default().fg(Color::Red))),
        None => Line::from(HELP),
    };
    f.render_widget(Paragraph::new(status), chunks[2]);

    if view.mode == Mode::Confirming {
        let area = centered(f.area(), 30, 3);
        let prompt = Paragraph::new(format!("{DELETE_PROMPT} (y/n)")).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        f.render_widget(Clear, area);
        f.render_widget(prompt, area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
