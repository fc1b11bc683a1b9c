//! The frame-driven editing loop: debounced re-interpretation of the command
//! text and timed transitions between laid-out snapshots.
//!
//! Times are plain milliseconds from any monotonic clock, so the loop can be
//! driven by a browser's animation callback, a terminal timer, or a test.

use crate::animate::animate;
use crate::config::Config;
use crate::icons::IconResolver;
use crate::ir::DiagramState;
use crate::layout::{Layout, compute_layout};
use crate::parser::replay;
use crate::visibility::filter_visible;
use tracing::debug;

/// One animated blend. Cancelling a transition is dropping it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub before: Layout,
    pub after: Layout,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Transition {
    pub fn new(before: Layout, after: Layout, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            before,
            after,
            start_ms,
            duration_ms,
        }
    }

    pub fn fraction(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.fraction(now_ms) >= 1.0
    }

    pub fn frame(&self, now_ms: f64) -> Layout {
        animate(&self.before, &self.after, self.fraction(now_ms))
    }
}

/// The command text up to the end of the line holding `cursor` (a byte
/// offset). Lines below the cursor are not yet part of the diagram.
pub fn text_through_cursor(text: &str, cursor: usize) -> &str {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    match text.get(cursor..).and_then(|rest| rest.find('\n')) {
        Some(eol) => &text[..cursor + eol],
        None => text,
    }
}

/// Replays `text` from an empty state and lays the result out.
pub fn build_layout(text: &str, config: &Config, icons: &dyn IconResolver) -> Layout {
    let mut state = DiagramState::new(config.layout.depth);
    replay(&mut state, text);
    let scene = filter_visible(&state);
    compute_layout(&scene, config.render.viewport(), icons, &config.layout)
}

#[derive(Debug, Clone)]
struct PendingEdit {
    text: String,
    due_ms: f64,
}

/// Drives a live editor: call [`Session::edit`] on every change and
/// [`Session::tick`] on every animation frame.
///
/// A new edit that cancels a running transition starts from that
/// transition's target, not from the frame on screen when it was cancelled.
pub struct Session<'a> {
    config: Config,
    icons: &'a dyn IconResolver,
    pending: Option<PendingEdit>,
    transition: Option<Transition>,
    /// The most recent target layout; the `before` of the next transition.
    settled: Option<Layout>,
}

impl<'a> Session<'a> {
    pub fn new(config: Config, icons: &'a dyn IconResolver) -> Self {
        Self {
            config,
            icons,
            pending: None,
            transition: None,
            settled: None,
        }
    }

    /// Records an edit. Re-interpretation waits until no further edit has
    /// arrived for the debounce delay.
    pub fn edit(&mut self, text: &str, cursor: usize, now_ms: f64) {
        self.pending = Some(PendingEdit {
            text: text_through_cursor(text, cursor).to_string(),
            due_ms: now_ms + self.config.animation.debounce_ms,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Advances the loop. Returns the layout to draw this frame, or `None`
    /// when nothing is moving.
    pub fn tick(&mut self, now_ms: f64) -> Option<Layout> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.due_ms)
            && let Some(pending) = self.pending.take()
        {
            self.start_transition(&pending.text, now_ms);
        }

        let transition = self.transition.as_ref()?;
        let frame = transition.frame(now_ms);
        if transition.is_complete(now_ms) {
            debug!("transition complete");
            self.transition = None;
        }
        Some(frame)
    }

    fn start_transition(&mut self, text: &str, now_ms: f64) {
        let after = build_layout(text, &self.config, self.icons);
        let before = match self.settled.take() {
            Some(layout) => layout,
            None => build_layout("", &self.config, self.icons),
        };
        debug!(
            lines = text.lines().count(),
            nodes = after.nodes.len(),
            cancelled = self.transition.is_some(),
            "starting transition"
        );
        self.settled = Some(after.clone());
        self.transition = Some(Transition::new(
            before,
            after,
            now_ms,
            self.config.animation.duration_ms,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::BlankIcons;

    #[test]
    fn cursor_truncates_at_end_of_its_line() {
        let text = "add a\nadd b\nadd c";
        assert_eq!(text_through_cursor(text, 0), "add a");
        assert_eq!(text_through_cursor(text, 7), "add a\nadd b");
        assert_eq!(text_through_cursor(text, 5), "add a");
        assert_eq!(text_through_cursor(text, 100), text);
    }

    #[test]
    fn cursor_inside_a_multibyte_char_rounds_down() {
        let text = "add caf\u{e9}\nadd b";
        // byte 8 is the second byte of the two-byte 'é'
        assert!(!text.is_char_boundary(8));
        assert_eq!(text_through_cursor(text, 8), "add caf\u{e9}");
    }

    #[test]
    fn fraction_is_clamped_elapsed_over_duration() {
        let layout = build_layout("add a", &Config::default(), &BlankIcons);
        let transition = Transition::new(layout.clone(), layout, 1000.0, 500.0);
        assert_eq!(transition.fraction(900.0), 0.0);
        assert_eq!(transition.fraction(1250.0), 0.5);
        assert_eq!(transition.fraction(2000.0), 1.0);
        assert!(!transition.is_complete(1499.0));
        assert!(transition.is_complete(1500.0));
    }

    #[test]
    fn debounced_edit_starts_a_transition() {
        let icons = BlankIcons;
        let mut session = Session::new(Config::default(), &icons);
        session.edit("add a", 0, 0.0);
        assert!(session.tick(100.0).is_none());

        let first = session.tick(500.0).expect("transition started");
        assert_eq!(first.nodes["a"].opacity, 0.0);
        let mid = session.tick(750.0).expect("animating");
        assert_eq!(mid.nodes["a"].opacity, 0.5);
        let last = session.tick(1000.0).expect("final frame");
        assert_eq!(last.nodes["a"].opacity, 1.0);
        assert!(!session.is_animating());
        assert!(session.tick(1100.0).is_none());
    }

    #[test]
    fn later_edits_reset_the_debounce() {
        let icons = BlankIcons;
        let mut session = Session::new(Config::default(), &icons);
        session.edit("add a", 0, 0.0);
        session.edit("add a\nadd b", 8, 300.0);
        assert!(session.tick(600.0).is_none());
        let frame = session.tick(800.0).expect("fires after the second edit");
        assert!(frame.nodes.contains_key("b"));
    }

    #[test]
    fn new_edit_cancels_and_blends_from_previous_target() {
        let icons = BlankIcons;
        let mut session = Session::new(Config::default(), &icons);
        session.edit("add a", 0, 0.0);
        session.tick(500.0);
        session.edit("add b", 0, 600.0);
        let frame = session.tick(1100.0).expect("second transition");
        let transition = session.transition().expect("in flight");
        assert!(transition.before.nodes.contains_key("a"));
        assert!(transition.after.nodes.contains_key("b"));
        assert_eq!(frame.nodes["a"].opacity, 1.0);
        assert_eq!(frame.nodes["b"].opacity, 0.0);
    }
}
