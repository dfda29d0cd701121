//! Terminal presenter: one tachyonfx effect per ticket. When an effect is
//! done its ticket is queued as finished and the app acknowledges it.

use hexstack::{Axial, Presenter, Session, SoundKind, Ticket, Unit};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;
use std::collections::VecDeque;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Drop fade-in length.
const PLACE_MS: u32 = 220;
/// Per-unit stagger on transfers, capped so long runs stay snappy.
const TRANSFER_UNIT_MS: u32 = 60;
const TRANSFER_MAX_MS: u32 = 480;
/// Pop flash; longer runs linger a little.
const POP_MS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Motion {
    Drop { at: Axial, units: Vec<Unit> },
    Transfer { source: Axial, units: Vec<Unit> },
    Pop { at: Axial, units: Vec<Unit> },
}

impl Motion {
    /// Cell the effect plays over.
    fn anchor(&self) -> Axial {
        match self {
            Self::Drop { at, .. } | Self::Pop { at, .. } => *at,
            Self::Transfer { source, .. } => *source,
        }
    }

    fn duration_ms(&self) -> u32 {
        match self {
            Self::Drop { .. } => PLACE_MS,
            Self::Transfer { units, .. } => {
                (TRANSFER_UNIT_MS * units.len() as u32).clamp(TRANSFER_UNIT_MS, TRANSFER_MAX_MS)
            }
            Self::Pop { units, .. } => POP_MS + 10 * units.len().min(20) as u32,
        }
    }
}

struct Running {
    ticket: Ticket,
    motion: Motion,
    /// Built on first render, once the cell's screen rect is known.
    effect: Option<Effect>,
}

/// Colours the effects fade between.
#[derive(Debug, Clone, Copy)]
pub struct FxColors {
    pub bg: Color,
    pub flash: Color,
}

pub struct TerminalPresenter {
    animate: bool,
    running: Vec<Running>,
    finished: VecDeque<Ticket>,
    last_render: Option<Instant>,
    /// Most recent sound cue, shown in the sidebar in place of audio.
    pub last_sound: Option<(SoundKind, f32)>,
    pub level_complete: Option<u32>,
}

impl TerminalPresenter {
    pub fn new(animate: bool) -> Self {
        Self {
            animate,
            running: Vec::new(),
            finished: VecDeque::new(),
            last_render: None,
            last_sound: None,
            level_complete: None,
        }
    }

    /// Every request finishes as soon as it is made.
    pub fn instant() -> Self {
        Self::new(false)
    }

    fn start(&mut self, ticket: Ticket, motion: Motion) {
        if self.animate {
            self.running.push(Running {
                ticket,
                motion,
                effect: None,
            });
        } else {
            self.finished.push_back(ticket);
        }
    }

    /// Units dropping onto `at` that the board does not hold yet.
    pub fn incoming(&self, at: Axial) -> Option<&[Unit]> {
        self.running.iter().find_map(|r| match &r.motion {
            Motion::Drop { at: a, units } if *a == at => Some(units.as_slice()),
            _ => None,
        })
    }

    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    /// Acknowledge finished tickets until none are left. Acknowledging can
    /// start new animations, which in instant mode finish right away too.
    pub fn settle(&mut self, session: &mut Session) {
        while let Some(ticket) = self.finished.pop_front() {
            if let Err(err) = session.acknowledge(ticket, self) {
                tracing::warn!(%ticket, %err, "acknowledgment rejected");
            }
        }
    }

    /// Advance every running effect by the time since the last frame.
    /// `cell_rect` maps a board cell to its screen rect; cells that are off
    /// screen finish immediately.
    pub fn render(
        &mut self,
        frame: &mut Frame,
        cell_rect: impl Fn(Axial) -> Option<Rect>,
        colors: FxColors,
        now: Instant,
    ) {
        let delta_ms = self
            .last_render
            .map(|t| now.saturating_duration_since(t).as_millis().min(u32::MAX as u128) as u32)
            .unwrap_or(0);
        self.last_render = Some(now);
        let delta = TfxDuration::from_millis(delta_ms);

        let mut still_running = Vec::with_capacity(self.running.len());
        for mut running in self.running.drain(..) {
            let Some(area) = cell_rect(running.motion.anchor()) else {
                self.finished.push_back(running.ticket);
                continue;
            };
            let effect = running
                .effect
                .get_or_insert_with(|| build_effect(&running.motion, area, colors));
            frame.render_effect(effect, area, delta);
            if effect.done() {
                tracing::trace!(ticket = %running.ticket, "animation settled");
                self.finished.push_back(running.ticket);
            } else {
                still_running.push(running);
            }
        }
        self.running = still_running;
    }
}

fn build_effect(motion: &Motion, area: Rect, colors: FxColors) -> Effect {
    let timer = (motion.duration_ms(), Interpolation::Linear);
    let effect = match motion {
        Motion::Drop { .. } => fx::fade_from(colors.bg, colors.bg, timer),
        Motion::Transfer { .. } => {
            fx::fade_to(colors.bg, colors.bg, (motion.duration_ms(), Interpolation::QuadIn))
        }
        Motion::Pop { .. } => fx::fade_to(colors.flash, colors.bg, timer),
    };
    let filter = CellFilter::PositionFn(ref_count(move |pos: Position| in_hex(area, pos)));
    effect.with_filter(filter).with_area(area)
}

/// Whether `pos` lies on the hex glyph drawn in `area`: corner columns of the
/// top and bottom rows are blank.
pub fn in_hex(area: Rect, pos: Position) -> bool {
    if !area.contains(pos) {
        return false;
    }
    let (dx, dy) = (pos.x - area.x, pos.y - area.y);
    let edge_row = dy == 0 || dy + 1 == area.height;
    !(edge_row && (dx == 0 || dx + 1 == area.width))
}

impl Presenter for TerminalPresenter {
    fn animate_placement(&mut self, ticket: Ticket, at: Axial, units: &[Unit]) {
        self.start(ticket, Motion::Drop { at, units: units.to_vec() });
    }

    fn animate_transfer(&mut self, ticket: Ticket, source: Axial, _target: Axial, units: &[Unit]) {
        self.start(
            ticket,
            Motion::Transfer {
                source,
                units: units.to_vec(),
            },
        );
    }

    fn animate_pop(&mut self, ticket: Ticket, at: Axial, units: &[Unit]) {
        self.start(ticket, Motion::Pop { at, units: units.to_vec() });
    }

    fn notify_sound(&mut self, kind: SoundKind, pitch: f32, _volume: f32) {
        self.last_sound = Some((kind, pitch));
    }

    fn notify_level_complete(&mut self, level: u32) {
        self.level_complete = Some(level);
    }
}
