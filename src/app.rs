use crate::config::Config;
use crate::form::{self, FormCommand};
use crate::state::{AppState, Banner, BannerKind, BannerSlot};
use crate::submission::{ClipboardSink, DestinationOpener, InterestSubmissionFlow, Notifier};
use crate::ui::{self, Layout};
use crate::widget::CardWidget;
use anyhow::Context;
use crossterm::cursor;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::style::ResetColor;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Repaint cadence while the card is animating
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Longest step handed to the spring after a stall
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Shows notifications as a modal banner
pub struct BannerNotifier {
    slot: BannerSlot,
}

impl Notifier for BannerNotifier {
    fn notify(&self, message: &str) {
        *self.slot.borrow_mut() = Some(Banner {
            kind: BannerKind::Notice,
            text: message.to_string(),
        });
    }
}

pub struct App<C, O> {
    state: AppState,
    card: CardWidget,
    flow: InterestSubmissionFlow<C, O, BannerNotifier>,
    last_frame: Instant,
    dirty: bool,
    should_quit: bool,
}

impl<C: ClipboardSink, O: DestinationOpener> App<C, O> {
    pub fn new(config: &Config, clipboard: C, opener: O) -> Self {
        let state = AppState::new(config.theme, config.debug);
        let notifier = BannerNotifier {
            slot: state.banner.clone(),
        };
        App {
            card: CardWidget::new(config.tilt, config.cell),
            flow: InterestSubmissionFlow::new(
                clipboard,
                opener,
                notifier,
                config.destination.clone(),
                config.clipboard_timeout,
            ),
            state,
            last_frame: Instant::now(),
            dirty: true,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn card(&self) -> &CardWidget {
        &self.card
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Advances the card animation. Returns whether a repaint is due.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).min(MAX_FRAME_STEP);
        self.last_frame = now;
        let moved = self.card.tick(dt);
        std::mem::take(&mut self.dirty) || moved
    }

    /// Handles one terminal event. `layout` places the card for pointer events.
    pub async fn handle_event(&mut self, event: Event, layout: Option<&Layout>) {
        match event {
            Event::Key(key) => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse, layout),
            Event::FocusLost => {
                self.card.pointer_left();
                self.dirty = true;
            }
            Event::Resize(columns, rows) => {
                debug!(columns, rows, "terminal resized");
                self.dirty = true;
            }
            _ => {}
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.dirty = true;
        if self.state.dismiss_banner() {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('t') if ctrl => {
                self.state.theme.toggle();
                debug!(theme = ?self.state.theme, "theme toggled");
            }
            KeyCode::F(2) => self.state.debug = !self.state.debug,
            _ => match form::handle_key(&mut self.state.draft, &mut self.state.focus, key) {
                FormCommand::Submit => self.submit().await,
                FormCommand::OpenSheet => self.flow.open_destination(),
                FormCommand::Reset => debug!("form reset"),
                FormCommand::Changed => {}
                FormCommand::Ignored => self.dirty = false,
            },
        }
    }

    async fn submit(&mut self) {
        if let Err(err) = self.state.draft.validate() {
            debug!(error = %err, "form rejected");
            self.state.show_banner(BannerKind::Error, err.to_string());
            return;
        }
        let report = self.flow.submit(&self.state.draft).await;
        debug!(phases = ?report.phases, now = ?self.flow.phase(), "submit finished");
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, layout: Option<&Layout>) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let area = layout.and_then(|layout| layout.card);
                if self.card.pointer_moved(mouse.column, mouse.row, area) {
                    self.dirty = true;
                }
            }
            _ => {}
        }
    }

    pub fn render<W: Write>(&mut self, out: &mut W, layout: &Layout) -> io::Result<()> {
        ui::render(out, layout, &self.state, &mut self.card, self.flow.destination())
    }
}

/// Raw mode and the alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(out, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if let Err(err) = execute!(
            out,
            cursor::Show,
            DisableFocusChange,
            DisableMouseCapture,
            ResetColor,
            LeaveAlternateScreen
        ) {
            warn!(error = %err, "restoring the terminal");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(error = %err, "leaving raw mode");
        }
    }
}

/// Runs the page until the visitor quits.
pub async fn run<C: ClipboardSink, O: DestinationOpener>(config: Config, clipboard: C, opener: O) -> anyhow::Result<()> {
    let mut app = App::new(&config, clipboard, opener);
    let mut stdout = io::stdout();
    let _terminal = TerminalGuard::enter(&mut stdout).context("preparing the terminal")?;

    let mut events = EventStream::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !app.should_quit() {
        tokio::select! {
            _ = frames.tick() => {
                if app.tick() {
                    if let Some(layout) = Layout::measure() {
                        app.render(&mut stdout, &layout).context("drawing the page")?;
                    }
                }
            }
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let layout = Layout::measure();
                    app.handle_event(event, layout.as_ref()).await;
                }
                Some(Err(err)) => return Err(err).context("reading terminal events"),
                None => break,
            },
        }
    }

    info!("leaving");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{Clipboard, Osc52Clipboard};
    use crate::config::Args;
    use crate::submission::{MockDestinationOpener, CONFIRMATION, DEFAULT_SHEET_URL};
    use clap::Parser;
    use crossterm::event::KeyEventState;

    fn config() -> Config {
        let args = Args::try_parse_from(["shred-studio", "--log-file", "-"]).unwrap();
        Config::try_from(args).unwrap()
    }

    fn opener(times: usize) -> MockDestinationOpener {
        let mut opener = MockDestinationOpener::new();
        opener
            .expect_open()
            .withf(|url| url == DEFAULT_SHEET_URL)
            .times(times)
            .return_const(());
        opener
    }

    fn app(times: usize) -> App<Osc52Clipboard<Vec<u8>>, MockDestinationOpener> {
        App::new(&config(), Osc52Clipboard::new(Vec::new()), opener(times))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text<C: ClipboardSink, O: DestinationOpener>(app: &mut App<C, O>, text: &str) {
        for c in text.chars() {
            app.handle_event(key(KeyCode::Char(c)), None).await;
        }
    }

    async fn fill_form<C: ClipboardSink, O: DestinationOpener>(app: &mut App<C, O>) {
        type_text(app, "Asha").await;
        app.handle_event(key(KeyCode::Tab), None).await;
        type_text(app, "asha@example.com").await;
    }

    #[tokio::test]
    async fn invalid_form_shows_an_error_and_opens_nothing() {
        let mut app = app(0);
        app.handle_event(key(KeyCode::Enter), None).await;
        let banner = app.state().banner().expect("banner shown");
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.text, "Please enter your full name.");
    }

    #[tokio::test]
    async fn valid_form_copies_confirms_and_opens() {
        let mut app = app(1);
        fill_form(&mut app).await;
        app.handle_event(key(KeyCode::Enter), None).await;

        let banner = app.state().banner().expect("confirmation shown");
        assert_eq!(banner.kind, BannerKind::Notice);
        assert_eq!(banner.text, CONFIRMATION);
        // The draft survives so the visitor can submit again
        assert_eq!(app.state().draft.name, "Asha");
    }

    #[tokio::test]
    async fn failed_clipboard_opens_the_sheet_without_a_banner() {
        let mut app = App::new(&config(), Clipboard::Disabled, opener(1));
        fill_form(&mut app).await;
        app.handle_event(key(KeyCode::Enter), None).await;
        assert_eq!(app.state().banner(), None);
    }

    #[tokio::test]
    async fn banner_swallows_the_next_key() {
        let mut app = app(0);
        app.state().show_banner(BannerKind::Notice, "hello");
        app.handle_event(key(KeyCode::Char('x')), None).await;
        assert_eq!(app.state().banner(), None);
        assert!(app.state().draft.name.is_empty());
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn global_keys() {
        let mut app = app(1);
        app.handle_event(ctrl('t'), None).await;
        assert_eq!(app.state().theme, crate::state::Theme::Light);
        app.handle_event(key(KeyCode::F(2)), None).await;
        assert!(app.state().debug);
        app.handle_event(ctrl('o'), None).await;
        app.handle_event(key(KeyCode::Esc), None).await;
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn key_releases_are_ignored() {
        let mut app = app(0);
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        app.handle_event(Event::Key(release), None).await;
        assert!(app.state().draft.name.is_empty());
    }

    #[tokio::test]
    async fn pointer_tilts_the_card_and_focus_loss_relaxes_it() {
        let mut app = app(0);
        let layout = Layout::for_size(120, 40);
        let card = layout.card.unwrap();
        let moved = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: card.x + card.width - 1,
            row: card.y,
            modifiers: KeyModifiers::NONE,
        });
        app.handle_event(moved, Some(&layout)).await;
        assert!(app.card().is_hovered());
        assert!(app.card().tilt().rotate_y > 0.0);

        app.handle_event(Event::FocusLost, Some(&layout)).await;
        assert!(!app.card().is_hovered());
        assert!(app.card().controller().is_relaxing());
    }

    #[tokio::test]
    async fn render_after_a_tick_draws_the_page() {
        let mut app = app(0);
        assert!(app.tick());
        assert!(!app.tick());
        let mut out = Vec::new();
        app.render(&mut out, &Layout::for_size(100, 40)).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Shred Studio"));
    }
}
