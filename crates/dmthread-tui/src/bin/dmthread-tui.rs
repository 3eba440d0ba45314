use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event as TerminalEvent, KeyCode as TerminalKeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use dmthread_core::conversation::ConversationOptions;
use dmthread_core::feed::{demo_conversation, load_feed};
use dmthread_core::model::RawMessage;
use dmthread_tui::app::{App, InputEvent, Key};
use dmthread_tui::frame::{Frame, TextRole};

const DEFAULT_FEED: &str = "dm_messages.rich.json";

/// Tick cadence; one render batch is pumped per tick at most.
const TICK_INTERVAL: Duration = Duration::from_millis(33);

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("dmthread-tui: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let feed_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_FEED), PathBuf::from);
    let raw = load_feed_or_demo(&feed_path);

    let mut session =
        TerminalSession::enter().map_err(|err| format!("enter terminal mode: {err}"))?;
    let (width, height) = terminal_size().map_err(|err| format!("read terminal size: {err}"))?;

    let mut app = App::new(width, height);
    app.open(raw, ConversationOptions::default());

    let mut dirty = true;
    let mut next_tick = Instant::now() + TICK_INTERVAL;

    loop {
        if dirty {
            let frame = app.render();
            paint_frame(&mut session.stdout, &frame)
                .map_err(|err| format!("paint frame: {err}"))?;
            dirty = false;
        }

        if app.quitting() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            dirty |= app.update(InputEvent::Tick);
            next_tick = Instant::now() + TICK_INTERVAL;
            continue;
        }

        let timeout = next_tick.saturating_duration_since(now);
        let has_event =
            event::poll(timeout).map_err(|err| format!("poll terminal event: {err}"))?;
        if !has_event {
            continue;
        }

        let terminal_event =
            event::read().map_err(|err| format!("read terminal event: {err}"))?;
        if is_interrupt(&terminal_event) {
            break;
        }
        if let Some(input) = map_terminal_event(terminal_event) {
            dirty |= app.update(input);
        }
    }

    Ok(())
}

fn load_feed_or_demo(path: &std::path::Path) -> Vec<RawMessage> {
    match load_feed(path) {
        Ok(messages) if !messages.is_empty() => messages,
        Ok(_) => {
            log::warn!("feed {} is empty, showing demo conversation", path.display());
            demo_conversation(now_ms())
        }
        Err(err) => {
            log::warn!(
                "cannot load feed {}: {err}, showing demo conversation",
                path.display()
            );
            demo_conversation(now_ms())
        }
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn terminal_size() -> io::Result<(usize, usize)> {
    let (width, height) = terminal::size()?;
    Ok((usize::from(width), usize::from(height)))
}

fn map_terminal_event(event: TerminalEvent) -> Option<InputEvent> {
    match event {
        TerminalEvent::Resize(width, height) => Some(InputEvent::Resize {
            width: usize::from(width),
            height: usize::from(height),
        }),
        TerminalEvent::Key(key_event) => {
            if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return None;
            }
            let key = match key_event.code {
                TerminalKeyCode::Char(ch) => Key::Char(ch),
                TerminalKeyCode::Enter => Key::Enter,
                TerminalKeyCode::Esc => Key::Escape,
                TerminalKeyCode::Up => Key::Up,
                TerminalKeyCode::Down => Key::Down,
                TerminalKeyCode::PageUp => Key::PageUp,
                TerminalKeyCode::PageDown => Key::PageDown,
                _ => return None,
            };
            Some(InputEvent::Key(key))
        }
        _ => None,
    }
}

fn is_interrupt(event: &TerminalEvent) -> bool {
    let TerminalEvent::Key(key_event) = event else {
        return false;
    };
    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return false;
    }
    matches!(key_event.code, TerminalKeyCode::Char('c'))
        && key_event.modifiers.contains(KeyModifiers::CONTROL)
}

fn role_color(role: TextRole) -> Color {
    match role {
        TextRole::Primary => Color::Reset,
        TextRole::Muted | TextRole::Separator => Color::DarkGrey,
        TextRole::Accent => Color::Cyan,
        TextRole::BubbleIn => Color::White,
        TextRole::BubbleOut => Color::Green,
    }
}

fn paint_frame<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (y, line) in frame.lines().iter().enumerate() {
        queue!(out, MoveTo(0, to_u16(y)))?;
        let mut remaining = frame.width();
        for span in &line.spans {
            if remaining == 0 {
                break;
            }
            let text: String = span.text.chars().take(remaining).collect();
            remaining -= text.chars().count();
            queue!(out, SetForegroundColor(role_color(span.role)), Print(text))?;
        }
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}

fn to_u16(value: usize) -> u16 {
    value.min(usize::from(u16::MAX)) as u16
}

struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            LeaveAlternateScreen,
            Show,
            MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}
