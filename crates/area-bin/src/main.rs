//! `textarea` entrypoint: an inline multi-line text input.
//!
//! Submit (Ctrl+Enter by default) restores the terminal and prints the value to
//! stdout. Esc quits without output.
use anyhow::{Result, bail};
use clap::Parser;
use core_actions::KeyBindings;
use core_config::{Config, KeyChord, load_from};
use core_events::{
    ASYNC_INPUT_STARTS, CHANNEL_SEND_FAILURES, EVENT_CHANNEL_CAP, Event, InputEvent,
    KEYPRESS_TOTAL, KeyCode, PASTE_CHARS, PASTE_SESSIONS,
};
use core_render::StyleSet;
use core_terminal::{CrosstermBackend, TerminalCapabilities, TerminalGuard};
use crossterm::style::ContentStyle;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod area;

use area::{AreaSettings, KeyResult, TextArea};

/// CLI arguments. Values given here override `textarea.toml`.
#[derive(Parser, Debug)]
#[command(name = "textarea", version, about = "Inline multi-line text input")]
struct Args {
    /// Optional configuration file path (overrides discovery of `textarea.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Minimum visible rows.
    #[arg(long)]
    pub rows: Option<usize>,
    /// Maximum visible rows before the area scrolls.
    #[arg(long = "max-rows")]
    pub max_rows: Option<usize>,
    /// Render every char as this string (newlines kept).
    #[arg(long)]
    pub mask: Option<String>,
    /// Shown dimmed while the value is empty and unfocused.
    #[arg(long)]
    pub placeholder: Option<String>,
    #[arg(long = "tab-size")]
    pub tab_size: Option<usize>,
    /// Initial value; the cursor starts at its end.
    #[arg(long)]
    pub initial: Option<String>,
    /// Highlight the most recent multi-char paste.
    #[arg(long = "highlight-paste")]
    pub highlight_paste: bool,
}

impl Args {
    fn apply_to(&self, settings: &mut AreaSettings) {
        if self.rows.is_some() {
            settings.rows = self.rows;
        }
        if self.max_rows.is_some() {
            settings.max_rows = self.max_rows;
        }
        if let Some(mask) = &self.mask {
            settings.mask = Some(mask.clone());
        }
        if let Some(placeholder) = &self.placeholder {
            settings.placeholder = Some(placeholder.clone());
        }
        if let Some(tab_size) = self.tab_size {
            settings.tab_size = tab_size.max(1);
        }
        if self.highlight_paste {
            settings.highlight_pasted_text = true;
        }
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("textarea.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "textarea.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
        .ok()
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn key_bindings(config: &Config) -> KeyBindings {
    let submit: KeyChord = config.submit_chord();
    let newline: KeyChord = config.newline_chord();
    KeyBindings::default()
        .with_submit(move |k| submit.matches(k))
        .with_newline(move |k| newline.matches(k))
}

fn style_set(config: &Config, caps: TerminalCapabilities) -> StyleSet {
    if !caps.color {
        return StyleSet::default();
    }
    let mut text = ContentStyle::new();
    text.foreground_color = config.text_color();
    let (fg, bg) = (config.highlight_color(), config.highlight_background());
    let highlight = (fg.is_some() || bg.is_some()).then(|| {
        let mut style = text;
        style.foreground_color = fg.or(text.foreground_color);
        style.background_color = bg;
        style
    });
    StyleSet::new(text, highlight)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExitReason {
    Submitted(String),
    Escaped,
    ChannelClosed,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Submitted(_) => "submitted",
            ExitReason::Escaped => "escaped",
            ExitReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LoopControl {
    Continue,
    Break(ExitReason),
}

struct AreaRuntime {
    area: TextArea,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    out: io::Stdout,
}

impl AreaRuntime {
    async fn run(&mut self) -> Result<ExitReason> {
        let initial = self.area.layout_pass();
        self.area.on_measured(initial);
        self.area.paint(&mut self.out)?;

        let mut reason = ExitReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = match event {
                Event::Input(input) => self.handle_input(input),
                Event::Measured(m) => {
                    let change = self.area.on_measured(m);
                    trace!(target: "runtime", ?change, "measured");
                    self.paint()
                }
            };
            if let LoopControl::Break(r) = control {
                reason = r;
                break;
            }
        }
        self.rx.close();
        Ok(reason)
    }

    fn handle_input(&mut self, input: InputEvent) -> LoopControl {
        match input {
            InputEvent::Key(key) if key.code == KeyCode::Esc => {
                LoopControl::Break(ExitReason::Escaped)
            }
            InputEvent::Key(key) => match self.area.apply_key(&key) {
                KeyResult::Submit(value) => LoopControl::Break(ExitReason::Submitted(value)),
                KeyResult::Remeasure(m) => self.post_measurement(m),
                KeyResult::Unchanged => LoopControl::Continue,
            },
            InputEvent::Resize(w, _h) => {
                let m = self.area.set_width(usize::from(w));
                self.post_measurement(m)
            }
            InputEvent::FocusGained => {
                let m = self.area.set_focus(true);
                self.post_measurement(m)
            }
            InputEvent::FocusLost => {
                let m = self.area.set_focus(false);
                self.post_measurement(m)
            }
        }
    }

    /// Deliver the layout result back through the event channel. A full channel
    /// applies it in place so the frame still converges.
    fn post_measurement(&mut self, m: core_events::Measurement) -> LoopControl {
        if let Err(e) = self.tx.try_send(Event::Measured(m)) {
            warn!(target: "runtime", error = %e, "measurement_applied_inline");
            self.area.on_measured(m);
            return self.paint();
        }
        LoopControl::Continue
    }

    fn paint(&mut self) -> LoopControl {
        if let Err(e) = self.area.paint(&mut self.out) {
            error!(target: "runtime", ?e, "paint_error");
        }
        LoopControl::Continue
    }
}

fn log_counters() {
    info!(
        target: "runtime",
        input_starts = ASYNC_INPUT_STARTS.load(Ordering::Relaxed),
        keypresses = KEYPRESS_TOTAL.load(Ordering::Relaxed),
        paste_sessions = PASTE_SESSIONS.load(Ordering::Relaxed),
        paste_chars = PASTE_CHARS.load(Ordering::Relaxed),
        send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
        "input_counters"
    );
}

async fn run_area(
    guard: TerminalGuard<'_>,
    settings: AreaSettings,
    initial: &str,
    bindings: KeyBindings,
    styles: StyleSet,
) -> Result<ExitReason> {
    let (width, _) = guard.size()?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());

    let area = TextArea::new(initial, settings, bindings, styles, usize::from(width));
    let mut runtime = AreaRuntime {
        area,
        tx,
        rx,
        out: io::stdout(),
    };
    let reason = runtime.run().await;

    input_shutdown.signal();
    if let Err(err) = input_task.await {
        error!(target: "runtime", ?err, "input_task_join_failed");
    }
    runtime.area.finish(&mut runtime.out)?;
    guard.release()?;
    reason
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let caps = TerminalCapabilities::detect();
    if !caps.interactive {
        bail!("textarea needs an interactive terminal on stdin and stdout");
    }

    let config = load_from(args.config.clone())?;
    let mut settings = AreaSettings::from(&config.file.area);
    args.apply_to(&mut settings);
    info!(
        target: "runtime",
        config_override = args.config.is_some(),
        config_loaded = config.raw.is_some(),
        rows = ?settings.rows,
        max_rows = ?settings.max_rows,
        masked = settings.mask.is_some(),
        "bootstrap_complete"
    );

    let bindings = key_bindings(&config);
    let styles = style_set(&config, caps);
    let initial = args.initial.clone().unwrap_or_default();

    let mut backend = CrosstermBackend::new();
    let guard = backend.enter_guard()?;
    let reason = run_area(guard, settings, &initial, bindings, styles).await?;
    log_counters();
    info!(target: "runtime", reason = reason.as_str(), "shutdown");

    if let ExitReason::Submitted(value) = reason {
        let mut stdout = io::stdout();
        writeln!(stdout, "{value}")?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{ConfigFile, StyleConfig};
    use crossterm::style::Color;

    fn runtime(initial: &str) -> AreaRuntime {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let area = TextArea::new(
            initial,
            AreaSettings::from(&core_config::AreaConfig::default()),
            KeyBindings::default(),
            StyleSet::default(),
            80,
        );
        AreaRuntime {
            area,
            tx,
            rx,
            out: io::stdout(),
        }
    }

    #[test]
    fn layout_changes_post_measurement_back() {
        let mut rt = runtime("ab");
        let control = rt.handle_input(InputEvent::Resize(40, 10));
        assert!(matches!(control, LoopControl::Continue));
        assert!(matches!(rt.rx.try_recv(), Ok(Event::Measured(_))));

        rt.handle_input(InputEvent::Key(core_events::KeyInput::char('c')));
        assert_eq!(rt.area.value(), "abc");
        assert!(matches!(
            rt.rx.try_recv(),
            Ok(Event::Measured(m)) if m.content_height == 1 && m.marker_height == 1
        ));
        assert!(rt.rx.try_recv().is_err());
    }

    #[test]
    fn esc_and_submit_end_the_loop() {
        let mut rt = runtime("done");
        let esc = core_events::KeyInput::key(KeyCode::Esc, core_events::KeyModifiers::empty());
        assert!(matches!(
            rt.handle_input(InputEvent::Key(esc)),
            LoopControl::Break(ExitReason::Escaped)
        ));
        let submit = core_events::KeyInput::key(KeyCode::Enter, core_events::KeyModifiers::CTRL);
        assert!(matches!(
            rt.handle_input(InputEvent::Key(submit)),
            LoopControl::Break(ExitReason::Submitted(v)) if v == "done"
        ));
        assert!(rt.rx.try_recv().is_err());
    }

    #[test]
    fn cli_values_override_config() {
        let args = Args::parse_from([
            "textarea",
            "--rows",
            "2",
            "--tab-size",
            "0",
            "--mask",
            "*",
            "--highlight-paste",
        ]);
        let mut settings = AreaSettings::from(&core_config::AreaConfig::default());
        settings.max_rows = Some(6);
        args.apply_to(&mut settings);
        assert_eq!(settings.rows, Some(2));
        assert_eq!(settings.max_rows, Some(6));
        assert_eq!(settings.tab_size, 1);
        assert_eq!(settings.mask.as_deref(), Some("*"));
        assert!(settings.highlight_pasted_text);
    }

    #[test]
    fn styles_follow_config_and_no_color() {
        let config = Config {
            file: ConfigFile {
                style: StyleConfig {
                    text: Some("white".into()),
                    highlight_background: Some("darkgrey".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let styles = style_set(&config, TerminalCapabilities::from_parts(true, false));
        assert_eq!(styles.text.foreground_color, Some(Color::White));
        let hl = styles.highlight.unwrap();
        assert_eq!(hl.background_color, Some(Color::DarkGrey));
        assert_eq!(hl.foreground_color, Some(Color::White));

        let plain = style_set(&config, TerminalCapabilities::from_parts(true, true));
        assert_eq!(plain, StyleSet::default());
    }

    #[test]
    fn configured_chords_drive_bindings() {
        let mut config = Config::default();
        config.file.keys.submit = "enter".into();
        config.file.keys.newline = "alt+enter".into();
        let mut area = TextArea::new(
            "a",
            AreaSettings::from(&config.file.area),
            key_bindings(&config),
            StyleSet::default(),
            80,
        );
        let alt_enter = core_events::KeyInput::key(KeyCode::Enter, core_events::KeyModifiers::ALT);
        assert!(matches!(area.apply_key(&alt_enter), KeyResult::Remeasure(_)));
        assert_eq!(area.value(), "a\n");
        let enter = core_events::KeyInput::key(KeyCode::Enter, core_events::KeyModifiers::empty());
        assert_eq!(area.apply_key(&enter), KeyResult::Submit("a\n".into()));
    }
}
