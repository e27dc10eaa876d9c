//! The text area owned by the runtime loop: value, edit engine, viewport and
//! painter wired together.
//!
//! One frame is a two-phase cycle. `apply_key` (or a focus / resize change)
//! updates the value and returns a fresh `Measurement` from `layout_pass`; the
//! loop posts it back as `Event::Measured`, and `on_measured` feeds it to the
//! viewport before `paint` prints the visible window.

use anyhow::Result;
use core_actions::{EditEngine, EditOptions, EditOutcome, KeyBindings};
use core_events::{KeyInput, Measurement};
use core_render::{
    Painter, RenderSegments, RowLayout, ScrollChange, SegmentOptions, StyleSet, ViewportController,
    measure, segment,
};
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaSettings {
    pub rows: Option<usize>,
    pub max_rows: Option<usize>,
    pub tab_size: usize,
    pub mask: Option<String>,
    pub placeholder: Option<String>,
    pub focus: bool,
    pub show_cursor: bool,
    pub highlight_pasted_text: bool,
}

impl From<&core_config::AreaConfig> for AreaSettings {
    fn from(cfg: &core_config::AreaConfig) -> Self {
        Self {
            rows: cfg.rows,
            max_rows: cfg.max_rows,
            tab_size: cfg.tab_size.max(1),
            mask: cfg.mask.clone(),
            placeholder: cfg.placeholder.clone(),
            focus: cfg.focus,
            show_cursor: cfg.show_cursor,
            highlight_pasted_text: cfg.highlight_pasted_text,
        }
    }
}

impl AreaSettings {
    fn edit_options(&self) -> EditOptions {
        EditOptions {
            focus: self.focus,
            show_cursor: self.show_cursor,
            highlight_pasted_text: self.highlight_pasted_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    Submit(String),
    /// Value or cursor changed; the carried measurement must be delivered back.
    Remeasure(Measurement),
    Unchanged,
}

pub struct TextArea {
    value: String,
    engine: EditEngine,
    viewport: ViewportController,
    painter: Painter,
    styles: StyleSet,
    settings: AreaSettings,
    width: usize,
    layout: RowLayout,
    dirty: bool,
}

impl TextArea {
    pub fn new(
        initial: &str,
        settings: AreaSettings,
        bindings: KeyBindings,
        styles: StyleSet,
        width: usize,
    ) -> Self {
        let engine = EditEngine::new(initial, settings.edit_options(), bindings);
        Self {
            value: initial.to_string(),
            engine,
            viewport: ViewportController::new(settings.rows, settings.max_rows),
            painter: Painter::new(),
            styles,
            settings,
            width,
            layout: RowLayout::default(),
            dirty: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.engine.cursor()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn segments(&self) -> RenderSegments {
        let opts = SegmentOptions {
            focus: self.settings.focus,
            show_cursor: self.settings.show_cursor,
            placeholder: self.settings.placeholder.as_deref(),
            mask: self.settings.mask.as_deref(),
            highlight: self.engine.highlight(),
            tab_size: self.settings.tab_size,
        };
        segment(&self.value, self.engine.cursor(), &opts)
    }

    /// Re-segment and lay out the current value, marking the viewport stale.
    pub fn layout_pass(&mut self) -> Measurement {
        let segs = self.segments();
        self.layout = RowLayout::build(segs.content(), self.width);
        self.viewport.invalidate();
        self.dirty = true;
        measure(&segs, self.width)
    }

    pub fn apply_key(&mut self, key: &KeyInput) -> KeyResult {
        match self.engine.handle(&self.value, key) {
            EditOutcome::Submit(value) => KeyResult::Submit(value),
            EditOutcome::Changed { value, .. } => {
                self.value = value;
                KeyResult::Remeasure(self.layout_pass())
            }
            EditOutcome::Moved { .. } => KeyResult::Remeasure(self.layout_pass()),
            EditOutcome::Ignored => KeyResult::Unchanged,
        }
    }

    pub fn on_measured(&mut self, measurement: Measurement) -> ScrollChange {
        let change = self.viewport.on_measured(measurement);
        if change.needs_repaint() {
            self.dirty = true;
        }
        change
    }

    pub fn set_focus(&mut self, focus: bool) -> Measurement {
        self.settings.focus = focus;
        self.engine.set_options(self.settings.edit_options());
        debug!(target: "runtime", focus, "focus_changed");
        self.layout_pass()
    }

    pub fn set_width(&mut self, width: usize) -> Measurement {
        self.width = width;
        self.layout_pass()
    }

    pub fn needs_paint(&self) -> bool {
        self.dirty && !self.viewport.needs_measurement()
    }

    /// Paint the visible window if anything changed since the last frame.
    pub fn paint<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        if !self.needs_paint() {
            return Ok(false);
        }
        self.painter.paint(
            out,
            &self.layout,
            self.viewport.window(),
            &self.styles,
            self.settings.show_cursor,
            self.settings.focus,
        )?;
        self.dirty = false;
        Ok(true)
    }

    /// Leave the painted area so later output starts on its own line.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.painter.finish(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn settings() -> AreaSettings {
        AreaSettings::from(&core_config::AreaConfig::default())
    }

    fn area(initial: &str, settings: AreaSettings) -> TextArea {
        TextArea::new(initial, settings, KeyBindings::default(), StyleSet::default(), 40)
    }

    fn row_texts(a: &TextArea) -> Vec<String> {
        let w = a.viewport().window();
        a.layout()
            .window(w.start, w.len())
            .iter()
            .map(|r| r.text())
            .collect()
    }

    #[test]
    fn typing_cycle_scrolls_to_cursor() {
        let mut s = settings();
        s.max_rows = Some(2);
        let mut a = area("", s);
        let m = a.layout_pass();
        a.on_measured(m);
        for key in [
            KeyInput::char('a'),
            KeyInput::key(KeyCode::Enter, KeyModifiers::empty()),
            KeyInput::char('b'),
            KeyInput::key(KeyCode::Enter, KeyModifiers::empty()),
            KeyInput::char('c'),
        ] {
            match a.apply_key(&key) {
                KeyResult::Remeasure(m) => {
                    assert!(!a.needs_paint(), "paint waits for the measurement");
                    a.on_measured(m);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(a.value(), "a\nb\nc");
        assert_eq!(a.viewport().window(), 1..3);
        assert_eq!(row_texts(&a), vec!["b", "c "]);
        assert!(a.needs_paint());
    }

    #[test]
    fn paint_happens_once_per_change() {
        let mut a = area("hi", settings());
        let m = a.layout_pass();
        a.on_measured(m);
        let mut out = Vec::new();
        assert!(a.paint(&mut out).unwrap());
        assert!(!a.paint(&mut out).unwrap());
        assert!(String::from_utf8_lossy(&out).contains("hi"));
    }

    #[test]
    fn submit_returns_value_without_repaint() {
        let mut a = area("done", settings());
        let ctrl_enter = KeyInput::key(KeyCode::Enter, KeyModifiers::CTRL);
        assert_eq!(a.apply_key(&ctrl_enter), KeyResult::Submit("done".into()));
    }

    #[test]
    fn blur_ignores_keys_until_focus_returns() {
        let mut a = area("x", settings());
        let m = a.set_focus(false);
        a.on_measured(m);
        assert_eq!(a.apply_key(&KeyInput::char('y')), KeyResult::Unchanged);
        let m = a.set_focus(true);
        a.on_measured(m);
        assert!(matches!(
            a.apply_key(&KeyInput::char('y')),
            KeyResult::Remeasure(_)
        ));
        assert_eq!(a.value(), "xy");
    }

    #[test]
    fn narrow_width_wraps_rows() {
        let mut s = settings();
        s.max_rows = Some(5);
        let mut a = area("abcdef", s);
        let m = a.set_width(3);
        assert_eq!(m.content_height, 3);
        a.on_measured(m);
        assert_eq!(row_texts(&a), vec!["abc", "def", " "]);
    }
}
