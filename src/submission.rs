//! Interest form hand-off.
//!
//! There is no write-capable backend behind the form. Submitting copies the
//! lead as JSON to the clipboard and opens the interest sheet so the visitor
//! can paste it there. The sheet is opened exactly once per submit, after
//! the clipboard write has settled, whatever its outcome.

use crate::error::ClipboardError;
use crate::state::FormDraft;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1qL-8JgQc8M085DjIrHZZzsRX4AMnf7C2p-kJJTHmdHY/edit?usp=sharing";

pub const CONFIRMATION: &str =
    "Your details are copied to clipboard. Click “Open Interest Sheet” to paste and submit.";

/// Lead record placed on the clipboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterestPayload {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
}

impl InterestPayload {
    pub fn from_draft(draft: &FormDraft, at: DateTime<Utc>) -> Self {
        InterestPayload {
            timestamp: iso_timestamp(at),
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            plan: draft.plan.label().to_string(),
        }
    }

    /// Pretty-printed JSON, two-space indented
    pub fn to_clipboard_text(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hands out strictly increasing millisecond timestamps, even when the clock
/// stalls or steps backwards between two submits.
pub struct TimestampSource<K> {
    clock: K,
    last: Option<DateTime<Utc>>,
}

impl<K: Clock> TimestampSource<K> {
    pub fn new(clock: K) -> Self {
        TimestampSource { clock, last: None }
    }

    pub fn next(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let issued = match self.last {
            Some(last) if now <= last => last + TimeDelta::milliseconds(1),
            _ => now,
        };
        self.last = Some(issued);
        issued
    }
}

/// Destination for the serialized payload
#[allow(async_fn_in_trait)]
pub trait ClipboardSink {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Opens a URL in a new browsing context. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub trait DestinationOpener {
    fn open(&self, url: &str);
}

/// Shows a blocking message to the visitor
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, message: &str);
}

#[derive(Debug)]
pub enum ClipboardOutcome {
    Copied,
    Failed(ClipboardError),
}

impl ClipboardOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, ClipboardOutcome::Copied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Serializing,
    ClipboardPending,
    ClipboardSettled {
        copied: bool,
    },
    DestinationOpened,
}

#[derive(Debug)]
pub struct SubmissionReport {
    pub payload: InterestPayload,
    pub clipboard: ClipboardOutcome,
    /// Phases entered during the submit, ending in `Idle`
    pub phases: Vec<SubmissionPhase>,
}

pub struct InterestSubmissionFlow<C, O, N, K = SystemClock> {
    clipboard: C,
    opener: O,
    notifier: N,
    timestamps: TimestampSource<K>,
    destination: String,
    clipboard_timeout: Duration,
    phase: SubmissionPhase,
}

impl<C, O, N> InterestSubmissionFlow<C, O, N, SystemClock>
where
    C: ClipboardSink,
    O: DestinationOpener,
    N: Notifier,
{
    pub fn new(
        clipboard: C,
        opener: O,
        notifier: N,
        destination: impl Into<String>,
        clipboard_timeout: Duration,
    ) -> Self {
        InterestSubmissionFlow {
            clipboard,
            opener,
            notifier,
            timestamps: TimestampSource::new(SystemClock),
            destination: destination.into(),
            clipboard_timeout,
            phase: SubmissionPhase::Idle,
        }
    }
}

impl<C, O, N, K> InterestSubmissionFlow<C, O, N, K>
where
    C: ClipboardSink,
    O: DestinationOpener,
    N: Notifier,
    K: Clock,
{
    #[cfg(test)]
    pub fn with_clock<K2: Clock>(self, clock: K2) -> InterestSubmissionFlow<C, O, N, K2> {
        InterestSubmissionFlow {
            clipboard: self.clipboard,
            opener: self.opener,
            notifier: self.notifier,
            timestamps: TimestampSource::new(clock),
            destination: self.destination,
            clipboard_timeout: self.clipboard_timeout,
            phase: self.phase,
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Opens the sheet without copying anything, as the page's direct link does.
    pub fn open_destination(&self) {
        info!(url = %self.destination, "opening interest sheet");
        self.opener.open(&self.destination);
    }

    /// Copies the draft to the clipboard, then opens the sheet.
    ///
    /// Never fails: a clipboard failure is logged and the sheet is opened
    /// anyway. The draft is left untouched.
    pub async fn submit(&mut self, draft: &FormDraft) -> SubmissionReport {
        let mut phases = Vec::with_capacity(6);

        self.enter(SubmissionPhase::Serializing, &mut phases);
        let payload = InterestPayload::from_draft(draft, self.timestamps.next());

        let clipboard = match payload.to_clipboard_text() {
            Ok(text) => {
                self.enter(SubmissionPhase::ClipboardPending, &mut phases);
                self.write_clipboard(&text).await
            }
            Err(err) => ClipboardOutcome::Failed(ClipboardError::Encode(err.to_string())),
        };
        self.enter(
            SubmissionPhase::ClipboardSettled {
                copied: clipboard.is_copied(),
            },
            &mut phases,
        );

        match &clipboard {
            ClipboardOutcome::Copied => self.notifier.notify(CONFIRMATION),
            ClipboardOutcome::Failed(err) => {
                warn!(error = %err, "clipboard write failed, opening the sheet anyway")
            }
        }

        self.opener.open(&self.destination);
        self.enter(SubmissionPhase::DestinationOpened, &mut phases);
        self.enter(SubmissionPhase::Idle, &mut phases);

        info!(
            timestamp = %payload.timestamp,
            plan = %payload.plan,
            copied = clipboard.is_copied(),
            "interest submitted"
        );
        SubmissionReport {
            payload,
            clipboard,
            phases,
        }
    }

    async fn write_clipboard(&self, text: &str) -> ClipboardOutcome {
        match tokio::time::timeout(self.clipboard_timeout, self.clipboard.write_text(text)).await {
            Ok(Ok(())) => ClipboardOutcome::Copied,
            Ok(Err(err)) => ClipboardOutcome::Failed(err),
            Err(_) => ClipboardOutcome::Failed(ClipboardError::TimedOut(self.clipboard_timeout)),
        }
    }

    fn enter(&mut self, phase: SubmissionPhase, trail: &mut Vec<SubmissionPhase>) {
        debug!(from = ?self.phase, to = ?phase, "submission phase");
        self.phase = phase;
        trail.push(phase);
    }
}
