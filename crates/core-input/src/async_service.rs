use crate::key_token::translate_key;
use crate::log_paste;
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_CHANNEL, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL,
    ASYNC_INPUT_STOP_STREAM, CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_TOTAL, KeyInput,
    PASTE_CHARS, PASTE_SESSIONS,
};
use core_text::normalize;
use crossterm::event::{Event as CEvent, EventStream, KeyEvent as CKeyEvent};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{Instrument, info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn a Tokio task that forwards `EventStream` events into `sender`.
///
/// Bracketed paste and focus reporting are enabled by the terminal guard; this
/// task only consumes the resulting `Paste` / `Focus*` events.
pub(crate) fn spawn_async_event_task(
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let span = tracing::debug_span!(target: "input.thread", "input_async_task");
    let handle = task::spawn(
        AsyncEventStreamTask::new(sender, EventStream::new(), listener)
            .run()
            .instrument(span),
    );

    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
    stream_error: Option<io::ErrorKind>,
}

impl<S> AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
            exit_reason: ExitReason::Running,
            stream_error: None,
        }
    }

    pub async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
        self.exit_reason = ExitReason::StreamEnded;
        loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                result = self.stream.next() => result,
            };

            let Some(result) = maybe_result else {
                break;
            };

            let forwarded = match result {
                Ok(CEvent::Key(key)) => self.handle_key_event(key).await,
                Ok(CEvent::Resize(w, h)) => {
                    trace!(target: "input.event", w, h, "resize");
                    self.send_event(Event::Input(InputEvent::Resize(w, h)))
                        .await
                }
                Ok(CEvent::FocusGained) => {
                    self.send_event(Event::Input(InputEvent::FocusGained))
                        .await
                }
                Ok(CEvent::FocusLost) => self.send_event(Event::Input(InputEvent::FocusLost)).await,
                Ok(CEvent::Paste(data)) => self.handle_paste(data).await,
                // mouse
                Ok(_) => true,
                Err(err) => {
                    self.exit_reason = ExitReason::StreamError;
                    self.stream_error = Some(err.kind());
                    break;
                }
            };
            if !forwarded {
                break;
            }
        }

        let reason = match self.exit_reason {
            ExitReason::Running => ExitReason::StreamEnded,
            other => other,
        };

        match reason {
            ExitReason::ShutdownSignal => {
                ASYNC_INPUT_STOP_SIGNAL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::ChannelClosed => {
                ASYNC_INPUT_STOP_CHANNEL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamEnded => {
                ASYNC_INPUT_STOP_STREAM.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamError => {
                ASYNC_INPUT_STOP_ERROR.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::Running => {}
        }

        if matches!(reason, ExitReason::StreamError) {
            if let Some(kind) = self.stream_error {
                warn!(target: "input.thread", error_kind = ?kind, "async_input_task_stream_error");
            } else {
                warn!(target: "input.thread", "async_input_task_stream_error");
            }
        }

        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }

    async fn handle_key_event(&mut self, key: CKeyEvent) -> bool {
        let Some(input) = translate_key(&key) else {
            return true;
        };
        trace!(
            target: "input.event",
            kind = "keypress",
            code = ?input.code,
            mods = ?input.mods,
            text_len = input.text_len()
        );
        let sent = self.send_event(Event::Input(InputEvent::Key(input))).await;
        if sent {
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
        }
        sent
    }

    /// Bracketed paste arrives as one payload; forward it as a single key
    /// input with LF line endings.
    async fn handle_paste(&mut self, data: String) -> bool {
        if data.is_empty() {
            return true;
        }
        let text = normalize(&data).into_owned();
        log_paste(&text);
        let chars = text.chars().count() as u64;
        let sent = self
            .send_event(Event::Input(InputEvent::Key(KeyInput::paste(text))))
            .await;
        if sent {
            PASTE_SESSIONS.fetch_add(1, Ordering::Relaxed);
            PASTE_CHARS.fetch_add(chars, Ordering::Relaxed);
        }
        sent
    }

    async fn send_event(&mut self, event: Event) -> bool {
        match self.sender.send(event).await {
            Ok(_) => true,
            Err(_) => {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                if !matches!(self.exit_reason, ExitReason::ShutdownSignal) {
                    self.exit_reason = ExitReason::ChannelClosed;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyModifiers};
    use crossterm::event::{KeyCode as CKeyCode, KeyModifiers as CKeyModifiers};
    use std::sync::Mutex;
    use tokio::sync::{Mutex as TokioMutex, mpsc};
    use tokio::time::{Duration, timeout};
    use tokio_stream::wrappers::UnboundedReceiverStream;
    use tracing::{Metadata, Subscriber, subscriber::Interest};

    use tracing::field::{Field, Visit};
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    static LOG_CAPTURE_GUARD: TokioMutex<()> = TokioMutex::const_new(());

    #[derive(Clone, Default)]
    struct LogCapture {
        events: Arc<Mutex<Vec<CapturedLog>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedLog {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct LogVisitor {
        fields: Vec<(String, String)>,
    }

    impl Visit for LogVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for LogCapture
    where
        S: Subscriber,
    {
        fn register_callsite(
            &self,
            _metadata: &'static tracing::Metadata<'static>,
        ) -> tracing::subscriber::Interest {
            Interest::always()
        }

        fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
            metadata.target().starts_with("input.")
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = LogVisitor::default();
            event.record(&mut visitor);
            let meta = event.metadata();
            self.events.lock().unwrap().push(CapturedLog {
                target: meta.target().to_string(),
                fields: visitor.fields,
            });
        }
    }

    fn key(code: CKeyCode, mods: CKeyModifiers) -> CEvent {
        CEvent::Key(CKeyEvent::new(code, mods))
    }

    async fn run_scenario(events: Vec<CEvent>) -> Vec<Event> {
        let (tx, mut rx) = mpsc::channel(64);
        let stream = tokio_stream::iter(events.into_iter().map(Ok));
        let (_shutdown, listener) = ShutdownListener::new_pair();
        AsyncEventStreamTask::new(tx, stream, listener).run().await;

        let mut outputs = Vec::new();
        while let Some(evt) = rx.recv().await {
            outputs.push(evt);
        }
        outputs
    }

    #[tokio::test]
    async fn forwards_basic_key_events() {
        let base_total = KEYPRESS_TOTAL.load(Ordering::Relaxed);

        let outputs = run_scenario(vec![key(CKeyCode::Char('a'), CKeyModifiers::NONE)]).await;

        assert_eq!(outputs, vec![Event::Input(InputEvent::Key(KeyInput::char('a')))]);
        assert!(KEYPRESS_TOTAL.load(Ordering::Relaxed) > base_total);
    }

    #[tokio::test]
    async fn forwards_ctrl_c_without_payload() {
        let outputs = run_scenario(vec![key(CKeyCode::Char('c'), CKeyModifiers::CONTROL)]).await;

        match outputs.as_slice() {
            [Event::Input(InputEvent::Key(k))] => {
                assert!(k.is_ctrl_c());
                assert!(k.text.is_empty());
            }
            other => panic!("unexpected output sequence: {other:?}"),
        }
    }

    #[tokio::test]
    async fn forwards_resize_and_focus_events() {
        let outputs = run_scenario(vec![
            CEvent::Resize(120, 48),
            CEvent::FocusLost,
            CEvent::FocusGained,
        ])
        .await;

        assert_eq!(
            outputs,
            vec![
                Event::Input(InputEvent::Resize(120, 48)),
                Event::Input(InputEvent::FocusLost),
                Event::Input(InputEvent::FocusGained),
            ]
        );
    }

    #[tokio::test]
    async fn bracketed_paste_becomes_one_normalized_input() {
        let base_sessions = PASTE_SESSIONS.load(Ordering::Relaxed);

        let outputs = run_scenario(vec![
            key(CKeyCode::Char('x'), CKeyModifiers::NONE),
            CEvent::Paste("one\r\ntwo\rthree".into()),
            CEvent::Paste(String::new()),
        ])
        .await;

        assert_eq!(
            outputs,
            vec![
                Event::Input(InputEvent::Key(KeyInput::char('x'))),
                Event::Input(InputEvent::Key(KeyInput::paste("one\ntwo\nthree"))),
            ]
        );
        match &outputs[1] {
            Event::Input(InputEvent::Key(k)) => assert_eq!(k.code, KeyCode::Paste),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(PASTE_SESSIONS.load(Ordering::Relaxed) > base_sessions);
    }

    #[tokio::test]
    async fn keypress_logging_omits_text() {
        let _log_guard = LOG_CAPTURE_GUARD.lock().await;
        let capture = LogCapture::default();
        let events_handle = capture.events.clone();
        let subscriber = Registry::default().with(capture.with_filter(LevelFilter::TRACE));
        let dispatch = tracing::Dispatch::new(subscriber);
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let outputs = run_scenario(vec![
            key(CKeyCode::Char('q'), CKeyModifiers::NONE),
            CEvent::Paste("top secret 💣".into()),
        ])
        .await;
        assert_eq!(outputs.len(), 2);

        let logs = events_handle.lock().unwrap();
        let keypress_log = logs
            .iter()
            .find(|entry| entry.target == "input.event")
            .unwrap_or_else(|| panic!("missing input.event log, captured: {logs:?}"));
        assert!(
            keypress_log
                .fields
                .iter()
                .any(|(k, v)| k == "kind" && v == "\"keypress\"")
        );
        assert!(
            keypress_log
                .fields
                .iter()
                .any(|(k, v)| k == "text_len" && v == "1")
        );
        let paste_log = logs
            .iter()
            .find(|entry| entry.target == "input.paste")
            .unwrap_or_else(|| panic!("missing input.paste log, captured: {logs:?}"));
        // Length counts chars, not bytes.
        assert!(paste_log.fields.iter().any(|(k, v)| k == "len" && v == "12"));
        for entry in logs.iter() {
            for (_, v) in &entry.fields {
                assert!(!v.contains("secret"), "payload leaked: {entry:?}");
                assert!(!v.contains('💣'), "payload leaked: {entry:?}");
            }
        }
    }

    #[tokio::test]
    async fn logs_startup_and_shutdown_reason_on_signal() {
        let _log_guard = LOG_CAPTURE_GUARD.lock().await;
        let capture = LogCapture::default();
        let events_handle = capture.events.clone();
        let subscriber = Registry::default().with(capture.with_filter(LevelFilter::TRACE));
        let dispatch = tracing::Dispatch::new(subscriber);
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let base_start = ASYNC_INPUT_STARTS.load(Ordering::Relaxed);
        let base_signal = ASYNC_INPUT_STOP_SIGNAL.load(Ordering::Relaxed);

        let (tx, rx) = mpsc::channel(1);
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<io::Result<CEvent>>();
        let stream = UnboundedReceiverStream::new(event_rx);
        let (shutdown, listener) = ShutdownListener::new_pair();

        let notifier = shutdown.clone();
        let signal_task = tokio::spawn(async move {
            tokio::task::yield_now().await;
            notifier.signal();
        });

        let _keep_alive = event_tx;
        AsyncEventStreamTask::new(tx, stream, listener).run().await;
        signal_task.await.unwrap();
        drop(rx);

        let logged = events_handle.lock().unwrap();
        assert!(
            logged.iter().any(|entry| {
                entry.target == "input.thread"
                    && entry
                        .fields
                        .iter()
                        .any(|(k, v)| k == "message" && v == "async_input_task_started")
            }),
            "missing async_input_task_started log, captured events: {:?}",
            *logged
        );

        let stop_event = logged
            .iter()
            .find(|entry| {
                entry.target == "input.thread"
                    && entry
                        .fields
                        .iter()
                        .any(|(k, v)| k == "message" && v == "async_input_task_stopped")
            })
            .unwrap_or_else(|| {
                panic!(
                    "missing async_input_task_stopped log, captured events: {:?}",
                    *logged
                )
            });
        let reason_field = stop_event
            .fields
            .iter()
            .find(|(k, _)| k == "reason")
            .map(|(_, v)| v.trim_matches('"'))
            .unwrap_or_default();
        assert_eq!(reason_field, "shutdown_signal");

        assert!(ASYNC_INPUT_STARTS.load(Ordering::Relaxed) > base_start);
        assert!(ASYNC_INPUT_STOP_SIGNAL.load(Ordering::Relaxed) > base_signal);
    }

    #[tokio::test]
    async fn channel_closed_increments_telemetry() {
        let base_channel = ASYNC_INPUT_STOP_CHANNEL.load(Ordering::Relaxed);

        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let stream = tokio_stream::iter(vec![Ok(CEvent::Resize(10, 10))]);
        let (_shutdown, listener) = ShutdownListener::new_pair();

        AsyncEventStreamTask::new(tx, stream, listener).run().await;

        assert!(
            ASYNC_INPUT_STOP_CHANNEL.load(Ordering::Relaxed) > base_channel,
            "channel closed counter did not advance"
        );
    }

    #[tokio::test]
    async fn stream_error_stops_task() {
        let base_error = ASYNC_INPUT_STOP_ERROR.load(Ordering::Relaxed);

        let (tx, mut rx) = mpsc::channel(4);
        let stream = tokio_stream::iter(vec![
            Ok(CEvent::Resize(1, 1)),
            Err(io::Error::other("tty gone")),
            Ok(CEvent::Resize(2, 2)),
        ]);
        let (_shutdown, listener) = ShutdownListener::new_pair();

        AsyncEventStreamTask::new(tx, stream, listener).run().await;

        assert_eq!(rx.recv().await, Some(Event::Input(InputEvent::Resize(1, 1))));
        assert_eq!(rx.recv().await, None);
        assert!(ASYNC_INPUT_STOP_ERROR.load(Ordering::Relaxed) > base_error);
    }

    #[tokio::test]
    async fn stream_end_is_counted() {
        let base_stream = ASYNC_INPUT_STOP_STREAM.load(Ordering::Relaxed);
        let outputs = run_scenario(Vec::new()).await;
        assert!(outputs.is_empty());
        assert!(ASYNC_INPUT_STOP_STREAM.load(Ordering::Relaxed) > base_stream);
    }

    #[tokio::test]
    async fn shutdown_signal_exits_immediately() {
        let (tx, mut rx) = mpsc::channel(1);
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<io::Result<CEvent>>();
        let stream = UnboundedReceiverStream::new(event_rx);
        let (shutdown, listener) = ShutdownListener::new_pair();

        let task = tokio::spawn(async move {
            let _keep_alive = event_tx;
            AsyncEventStreamTask::new(tx, stream, listener).run().await;
        });

        shutdown.signal();

        timeout(Duration::from_millis(50), task)
            .await
            .expect("shutdown should resolve promptly")
            .expect("task join failed");

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn release_events_are_not_forwarded() {
        let release = CKeyEvent::new_with_kind_and_state(
            CKeyCode::Char('a'),
            CKeyModifiers::NONE,
            crossterm::event::KeyEventKind::Release,
            crossterm::event::KeyEventState::NONE,
        );
        let outputs = run_scenario(vec![
            CEvent::Key(release),
            key(CKeyCode::Enter, CKeyModifiers::CONTROL),
        ])
        .await;
        assert_eq!(
            outputs,
            vec![Event::Input(InputEvent::Key(KeyInput::key(
                KeyCode::Enter,
                KeyModifiers::CTRL
            )))]
        );
    }
}
