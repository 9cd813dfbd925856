//! Presentation projector.
//!
//! Maps a SessionState onto two views:
//! - `TextSummary`: hypothesis line plus one block per log entry
//! - `ChartSeries`: ten fixed slots, 0/1 by membership, with highlight flags
//!
//! The chart surface is created lazily on first projection and updated in
//! place afterwards.

mod terminal;

pub use terminal::*;

use crate::models::{Literal, NUM_LITERALS, SessionState};

/// Shown instead of an empty hypothesis.
pub const EMPTY_HYPOTHESIS: &str = "[Empty hypothesis]";

/// Separator between literals in the summary line.
pub const LITERAL_SEPARATOR: &str = ", ";

/// Text view of a session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSummary {
    /// Literals joined in hypothesis order, or the empty sentinel
    pub hypothesis: String,
    /// One display block per log entry, untruncated
    pub log: Vec<String>,
}

/// One bar of the hypothesis chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSlot {
    pub literal: Literal,
    /// 1 if the literal is in the hypothesis, else 0
    pub value: u8,
    /// Drives the bar colour; same membership test as `value`
    pub highlighted: bool,
}

/// Chart data in canonical literal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSeries {
    slots: [ChartSlot; NUM_LITERALS],
}

impl ChartSeries {
    pub fn from_state(state: &SessionState) -> Self {
        let slots = Literal::ALL.map(|literal| {
            let present = state.contains(literal);
            ChartSlot {
                literal,
                value: u8::from(present),
                highlighted: present,
            }
        });
        Self { slots }
    }

    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    pub fn values(&self) -> [u8; NUM_LITERALS] {
        self.slots.map(|slot| slot.value)
    }

    pub fn highlights(&self) -> [bool; NUM_LITERALS] {
        self.slots.map(|slot| slot.highlighted)
    }

    pub fn labels(&self) -> [Literal; NUM_LITERALS] {
        self.slots.map(|slot| slot.literal)
    }
}

/// Both views of one session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub summary: TextSummary,
    pub chart: ChartSeries,
}

/// Project a session state into its text and chart views.
///
/// Pure and deterministic: equal states give equal projections.
pub fn project(state: &SessionState) -> Projection {
    let hypothesis = if state.hypothesis().is_empty() {
        EMPTY_HYPOTHESIS.to_string()
    } else {
        state
            .hypothesis()
            .iter()
            .map(|lit| lit.as_str())
            .collect::<Vec<_>>()
            .join(LITERAL_SEPARATOR)
    };

    Projection {
        summary: TextSummary {
            hypothesis,
            log: state.log().to_vec(),
        },
        chart: ChartSeries::from_state(state),
    }
}

/// A display surface holding chart data between redraws.
pub trait ChartSurface {
    /// Replace the series data of the existing chart in place.
    fn update(&mut self, series: &ChartSeries);
}

/// Owns the chart surface and applies projections to it.
///
/// The surface starts as `None` and is built by `make_surface` on the
/// first `apply`; later calls only update its data.
pub struct Projector<S, F> {
    surface: Option<S>,
    make_surface: F,
    surfaces_created: usize,
    last: Option<Projection>,
}

impl<S, F> Projector<S, F>
where
    S: ChartSurface,
    F: FnMut(&ChartSeries) -> S,
{
    pub fn new(make_surface: F) -> Self {
        Self {
            surface: None,
            make_surface,
            surfaces_created: 0,
            last: None,
        }
    }

    /// Project `state` and push the chart data to the surface.
    pub fn apply(&mut self, state: &SessionState) -> &Projection {
        let projection = project(state);

        match self.surface.as_mut() {
            Some(surface) => surface.update(&projection.chart),
            None => {
                self.surface = Some((self.make_surface)(&projection.chart));
                self.surfaces_created += 1;
            }
        }

        self.last.insert(projection)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Most recently applied projection.
    pub fn last(&self) -> Option<&Projection> {
        self.last.as_ref()
    }

    pub fn surfaces_created(&self) -> usize {
        self.surfaces_created
    }
}
