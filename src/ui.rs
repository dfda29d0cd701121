//! Layout and drawing: hex board, sidebar (stats, options tray, controls),
//! level-complete overlay.

use crate::animation::{FxColors, TerminalPresenter};
use crate::theme::Theme;
use hexstack::board::run_length;
use hexstack::presenter::SoundKind;
use hexstack::{Axial, Board, Cell, Session, Slot, Unit};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::time::Instant;

/// Terminal columns per hex cell, and rows per board row (3 drawn + 1 gap).
pub const CELL_WIDTH: u16 = 8;
pub const CELL_HEIGHT: u16 = 4;
const CELL_ROWS: u16 = 3;
const SIDEBAR_WIDTH: u16 = 28;
const SIDEBAR_HEIGHT: u16 = 24;
/// Units shown along the bottom edge of a hex.
const STRIP_LEN: usize = 4;

/// Everything the frame shows apart from running effects.
pub struct View<'a> {
    pub session: &'a Session,
    pub theme: &'a Theme,
    pub cursor: Axial,
    pub selected: usize,
    pub message: Option<&'a str>,
}

/// Board size in terminal cells (without border) for a radius.
pub fn board_size(radius: u32) -> (u16, u16) {
    let r = radius as u16;
    (2 * CELL_WIDTH * r + CELL_WIDTH, 2 * CELL_HEIGHT * r + CELL_ROWS)
}

/// Maps axial coordinates onto screen rects inside the board area.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    area: Rect,
    radius: i32,
    clip: Rect,
}

impl Geometry {
    pub fn new(area: Rect, radius: u32, clip: Rect) -> Self {
        Self {
            area,
            radius: radius as i32,
            clip,
        }
    }

    /// Screen rect of a cell; `None` when any part would fall off `clip`.
    pub fn cell_rect(&self, at: Axial) -> Option<Rect> {
        let half = (CELL_WIDTH / 2) as i32;
        let x = self.area.x as i32 + (2 * at.q + at.r + 2 * self.radius) * half;
        let y = self.area.y as i32 + (at.r + self.radius) * CELL_HEIGHT as i32;
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        let rect = Rect::new(x, y, CELL_WIDTH, CELL_ROWS);
        (self.clip.contains(rect.as_position())
            && rect.right() <= self.clip.right()
            && rect.bottom() <= self.clip.bottom())
        .then_some(rect)
    }
}

pub fn draw(frame: &mut Frame, view: &View<'_>, presenter: &mut TerminalPresenter, now: Instant) {
    let area = frame.area();
    let theme = view.theme;
    let (bw, bh) = board_size(view.session.board().radius());
    let total_w = bw + 2 + SIDEBAR_WIDTH;
    let total_h = (bh + 2).max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw + 2), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (board_area, sidebar_area) = (inner[0], inner[1]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(
            format!(" hexstack  Level {} ", view.session.progress().level),
            Style::default().fg(theme.title),
        ));
    let board_inner = block.inner(board_area);
    block.render(board_area, frame.buffer_mut());

    let radius = view.session.board().radius();
    let geometry = Geometry::new(board_inner, radius, board_inner.intersection(area));
    draw_board(frame.buffer_mut(), view, presenter, &geometry);
    presenter.render(
        frame,
        |at| geometry.cell_rect(at),
        FxColors {
            bg: theme.bg,
            flash: theme.hi_fg,
        },
        now,
    );

    draw_sidebar(frame, view, presenter, sidebar_area);

    if view.session.progress().is_complete() {
        let level = presenter.level_complete.unwrap_or(view.session.progress().level);
        draw_level_overlay(frame, view, level, area);
    }
}

fn draw_board(buf: &mut Buffer, view: &View<'_>, presenter: &TerminalPresenter, geometry: &Geometry) {
    let board: &Board = view.session.board();
    for cell in board.cells() {
        let Some(rect) = geometry.cell_rect(cell.coord) else {
            continue;
        };
        let incoming = presenter.incoming(cell.coord);
        draw_cell(buf, rect, cell, incoming, view.theme, cell.coord == view.cursor);
    }
}

/// ```text
///  ╱‾‾‾‾╲
/// ▕ 3/7  ▏
///  ╲▀▀▀▀╱
/// ```
/// Middle row: top run / stack height. Bottom edge: the topmost units.
fn draw_cell(
    buf: &mut Buffer,
    rect: Rect,
    cell: &Cell,
    incoming: Option<&[Unit]>,
    theme: &Theme,
    cursor: bool,
) {
    let stack = incoming.unwrap_or(cell.stack.as_slice());
    let top = stack.last().map(|u| theme.tile(u.color));
    let outline = if cursor {
        theme.hi_fg
    } else if cell.locked {
        theme.inactive_fg
    } else {
        top.unwrap_or(theme.div_line)
    };
    let mut edge = Style::default().fg(outline).bg(theme.bg);
    if cursor {
        edge = edge.add_modifier(Modifier::BOLD);
    }
    let (x, y) = (rect.x, rect.y);

    buf.set_string(x, y, " ╱‾‾‾‾╲ ", edge);
    buf.set_string(x, y + 1, "▕", edge);
    buf.set_string(x + CELL_WIDTH - 1, y + 1, "▏", edge);
    buf.set_string(x, y + 2, " ╲    ╱ ", edge);

    let Some(top) = top else {
        let dot = if cell.pending_placement { "··" } else { "  " };
        let style = Style::default().fg(theme.div_line).bg(theme.bg);
        buf.set_string(x + 1, y + 1, format!("{dot:^6}"), style);
        return;
    };

    let run = stack.last().map_or(0, |u| run_length(stack, u.color));
    let label = format!("{run}/{}", stack.len());
    buf.set_string(
        x + 1,
        y + 1,
        format!("{label:^6}"),
        Style::default().fg(theme.bg).bg(top).add_modifier(Modifier::BOLD),
    );

    let shown = &stack[stack.len().saturating_sub(STRIP_LEN)..];
    for (i, unit) in shown.iter().enumerate() {
        let color = theme.tile(unit.color);
        buf.set_string(x + 2 + i as u16, y + 2, "▀", Style::default().fg(color).bg(theme.bg));
    }
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, presenter: &TerminalPresenter, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let progress = view.session.progress();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats (score, level, progress bar)
            Constraint::Length(view.session.slots().len() as u16 + 3), // Options
            Constraint::Length(8), // Controls
            Constraint::Fill(1),   // Status
        ])
        .split(area);

    // --- Stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stats_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Length(1)])
        .split(stats_inner);
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(progress.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Level: ", title_style),
            Span::styled(progress.level.to_string(), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_layout[0], frame.buffer_mut());
    Paragraph::new(Line::from(Span::styled(
        format!("Target {}/{}", progress.progress, progress.target),
        title_style,
    )))
    .render(stats_layout[1], frame.buffer_mut());
    Gauge::default()
        .ratio(f64::from(progress.fraction()))
        .gauge_style(Style::default().fg(theme.tile(0)).bg(theme.div_line))
        .render(stats_layout[2], frame.buffer_mut());

    // --- Options tray ---
    let options_block = sidebar_block(theme).title(Span::styled(" Options ", title_style));
    let options_inner = options_block.inner(chunks[1]);
    options_block.render(chunks[1], frame.buffer_mut());
    let option_lines: Vec<Line> = view
        .session
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot)| slot_line(i, slot, i == view.selected, theme))
        .collect();
    Paragraph::new(option_lines).render(options_inner, frame.buffer_mut());

    // --- Controls ---
    let controls_block = sidebar_block(theme).title(Span::styled(" Controls ", title_style));
    let controls_inner = controls_block.inner(chunks[2]);
    controls_block.render(chunks[2], frame.buffer_mut());
    let controls = [
        ("←↑↓→/hjkl", "move"),
        ("1-3/Tab", "option"),
        ("Enter", "place"),
        ("n", "next level"),
        ("q", "quit"),
    ];
    let control_lines: Vec<Line> = controls
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<10}"), title_style),
                Span::styled(*what, fg_style),
            ])
        })
        .collect();
    Paragraph::new(control_lines).render(controls_inner, frame.buffer_mut());

    // --- Status: last sound cue and any rejection message ---
    let mut status = Vec::new();
    if let Some((kind, pitch)) = presenter.last_sound {
        let name = match kind {
            SoundKind::Place => "place",
            SoundKind::Sort => "sort",
            SoundKind::Merge => "merge",
        };
        status.push(Line::from(Span::styled(
            format!("♪ {name} {pitch:.0} Hz"),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    if let Some(message) = view.message {
        status.push(Line::from(Span::styled(message.to_string(), Style::default().fg(theme.tile(3)))));
    }
    Paragraph::new(status)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(Block::default().style(Style::default().bg(theme.bg)))
        .render(chunks[3], frame.buffer_mut());
}

/// `>[1] ████▀▀ 6`: key, units bottom to top, height.
fn slot_line(index: usize, slot: &Slot, selected: bool, theme: &Theme) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let key_style = if selected {
        Style::default().fg(theme.hi_fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.title)
    };
    let mut spans = vec![Span::styled(format!("{marker}[{}] ", index + 1), key_style)];
    match slot {
        Slot::Empty => spans.push(Span::styled("-", Style::default().fg(theme.inactive_fg))),
        Slot::Placing(units) => spans.push(Span::styled(
            "▒".repeat(units.len()),
            Style::default().fg(theme.inactive_fg),
        )),
        Slot::Ready(units) => {
            spans.extend(
                units
                    .iter()
                    .map(|u| Span::styled("█", Style::default().fg(theme.tile(u.color)))),
            );
            spans.push(Span::styled(format!(" {}", units.len()), Style::default().fg(theme.main_fg)));
        }
    }
    Line::from(spans)
}

fn draw_level_overlay(frame: &mut Frame, view: &View<'_>, level: u32, area: Rect) {
    let theme = view.theme;
    let popup_w = 34u16;
    let popup_h = 6u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let progress = view.session.progress();
    let hint = if view.session.is_idle() {
        " n: next level    q: quit "
    } else {
        " settling... "
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" Level {level} complete "),
            Style::default().fg(theme.bg).bg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Score {}", progress.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(hint, Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
