//! Interactive terminal swap form.
//!
//! Every key press is replayed into the focused selector as key-down, text
//! input and key-up, so the selectors see the same event stream a GUI text
//! box would produce. Key presses, settle tickets and catalog refreshes are
//! all handled on one task.

use super::{convert, ui};
use crate::core::form::{FieldError, FormField};
use crate::core::session::{Side, SwapSession};
use crate::providers::CatalogFeed;
use anyhow::{Context, Result, bail};
use console::{Key, Term};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const MAX_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    From,
    To,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Amount => Focus::From,
            Focus::From => Focus::To,
            Focus::To => Focus::Amount,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Amount => Focus::To,
            Focus::From => Focus::Amount,
            Focus::To => Focus::From,
        }
    }

    fn side(self) -> Option<Side> {
        match self {
            Focus::Amount => None,
            Focus::From => Some(Side::From),
            Focus::To => Some(Side::To),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn move_focus(session: &mut SwapSession, focus: &mut Focus, forward: bool) {
    match focus.side() {
        Some(side) => session.blur(side),
        None => session.blur_amount(),
    }
    *focus = if forward { focus.next() } else { focus.prev() };
}

fn edit(session: &mut SwapSession, focus: Focus, change: impl FnOnce(&mut String)) {
    match focus.side() {
        Some(side) => {
            session.key_down(side);
            let mut text = session.selector(side).display_value().to_string();
            change(&mut text);
            session.text_input(side, &text);
            session.key_up(side);
        }
        None => {
            let mut text = session.form().amount().to_string();
            change(&mut text);
            session.set_amount(&text);
        }
    }
}

/// Applies one key press to the session.
pub fn handle_key(session: &mut SwapSession, focus: &mut Focus, key: Key) -> Flow {
    match key {
        Key::Escape => return Flow::Quit,
        Key::Tab | Key::ArrowDown => move_focus(session, focus, true),
        Key::BackTab | Key::ArrowUp => move_focus(session, focus, false),
        Key::Char('/') => session.swap(),
        Key::Enter => {
            if let Some(side) = focus.side() {
                let pick = session
                    .selector(side)
                    .suggestions()
                    .first()
                    .map(|code| code.to_string());
                if let Some(code) = pick {
                    session.select(side, &code);
                }
            }
        }
        Key::Backspace => edit(session, *focus, |text| {
            text.pop();
        }),
        Key::Char(c) if !c.is_control() => edit(session, *focus, |text| text.push(c)),
        other => debug!(key = ?other, "Ignoring key"),
    }
    Flow::Continue
}

fn field_line(label: &str, value: &str, focused: bool, error: Option<FieldError>) -> String {
    let value = if focused {
        ui::style_text(&format!(" {value}_ "), ui::StyleType::Focused)
    } else {
        format!(" {value} ")
    };
    let mut line = format!("{:>8} {value}", ui::style_text(label, ui::StyleType::Label));
    if let Some(error) = error {
        line.push_str(&format!("  {}", ui::style_text(&error.to_string(), ui::StyleType::Error)));
    }
    line
}

/// Renders the whole form as text.
pub fn render_lines(session: &SwapSession, focus: Focus) -> Vec<String> {
    let form = session.form();
    let mut lines = vec![
        ui::style_text("Currency swap", ui::StyleType::Title),
        String::new(),
        field_line(
            "Amount",
            form.amount(),
            focus == Focus::Amount,
            form.visible_error(FormField::Amount),
        ),
    ];

    for (label, side, field_focus) in [("From", Side::From, Focus::From), ("To", Side::To, Focus::To)] {
        let selector = session.selector(side);
        lines.push(field_line(
            label,
            selector.display_value(),
            focus == field_focus,
            form.visible_error(side.field()),
        ));
        if focus == field_focus {
            let suggestions = selector.suggestions();
            let shown = suggestions
                .iter()
                .take(MAX_SUGGESTIONS)
                .copied()
                .collect::<Vec<_>>()
                .join("  ");
            let more = suggestions.len().saturating_sub(MAX_SUGGESTIONS);
            let text = if more > 0 {
                format!("{shown}  (+{more} more)")
            } else if shown.is_empty() {
                "no matching currency".to_string()
            } else {
                shown
            };
            lines.push(format!("{:>8} {}", "", ui::style_text(&text, ui::StyleType::Subtle)));
        }
    }

    lines.push(String::new());
    match session.quote() {
        Some(quote) => lines.push(convert::display(&quote)),
        None => lines.push(ui::style_text(
            "Fill in the form to see a quote.",
            ui::StyleType::Subtle,
        )),
    }
    lines.push(String::new());
    lines.push(ui::style_text(
        "Tab/↓ next  Shift-Tab/↑ previous  Enter pick  / swap  Esc quit",
        ui::StyleType::Subtle,
    ));
    lines
}

fn render(term: &Term, session: &SwapSession, focus: Focus) -> Result<()> {
    term.clear_screen()?;
    term.write_line(&render_lines(session, focus).join("\n"))?;
    Ok(())
}

/// Reads keys on a plain thread; the blocking read cannot be cancelled, so
/// the thread is left to die with the process.
fn spawn_key_reader(term: Term) -> mpsc::UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(key) = term.read_key() {
            if tx.send(key).is_err() {
                break;
            }
        }
    });
    rx
}

async fn event_loop(term: &Term, feed: &CatalogFeed, settle_delay: Duration) -> Result<()> {
    let catalog = feed.first().await?;
    let mut catalog_rx = feed.subscribe();
    let _ = catalog_rx.borrow_and_update();

    let (settle_tx, mut settle_rx) = mpsc::unbounded_channel();
    let mut session = SwapSession::new(catalog, settle_delay, settle_tx);
    let mut keys = spawn_key_reader(term.clone());
    let mut focus = Focus::Amount;

    loop {
        render(term, &session, focus)?;
        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else {
                    debug!("Key reader stopped");
                    break;
                };
                if handle_key(&mut session, &mut focus, key) == Flow::Quit {
                    break;
                }
            }
            Some(ticket) = settle_rx.recv() => session.on_settled(ticket),
            changed = catalog_rx.changed() => {
                changed.context("Price refresh stopped")?;
                let latest = catalog_rx.borrow_and_update().clone();
                if let Some(catalog) = latest {
                    session.on_catalog_update(catalog);
                }
            }
        }
    }
    Ok(())
}

pub async fn run(feed: CatalogFeed, settle_delay: Duration) -> Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        bail!("The swap command needs an interactive terminal");
    }

    info!("Starting interactive swap");
    term.hide_cursor()?;
    let result = event_loop(&term, &feed, settle_delay).await;
    term.show_cursor()?;
    term.clear_screen()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settle::DEFAULT_SETTLE_DELAY;
    use crate::core::{PriceCatalog, PriceObservation};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn session() -> SwapSession {
        let t = Utc.with_ymd_and_hms(2023, 8, 29, 7, 10, 40).unwrap();
        let catalog: PriceCatalog = [("USD", 1.0), ("ETH", 2500.0), ("EUR", 1.07)]
            .into_iter()
            .map(|(c, p)| PriceObservation::new(c, t, p))
            .collect();
        let (tx, _rx) = mpsc::unbounded_channel();
        SwapSession::new(Arc::new(catalog), DEFAULT_SETTLE_DELAY, tx)
    }

    fn press(session: &mut SwapSession, focus: &mut Focus, keys: &str) {
        for c in keys.chars() {
            handle_key(session, focus, Key::Char(c));
        }
    }

    #[tokio::test]
    async fn test_typing_and_tabbing_commits_currency() {
        let mut session = session();
        let mut focus = Focus::Amount;

        handle_key(&mut session, &mut focus, Key::Backspace);
        press(&mut session, &mut focus, "2");
        assert_eq!(session.form().amount(), "2");

        handle_key(&mut session, &mut focus, Key::Tab);
        handle_key(&mut session, &mut focus, Key::Tab);
        assert_eq!(focus, Focus::To);
        for _ in 0..3 {
            handle_key(&mut session, &mut focus, Key::Backspace);
        }
        press(&mut session, &mut focus, "USD");
        assert_eq!(session.selector(Side::To).display_value(), "USD");

        handle_key(&mut session, &mut focus, Key::Tab);
        assert_eq!(focus, Focus::Amount);
        assert_eq!(session.form().to_currency(), "USD");
        assert_eq!(
            session.quote().unwrap().to_string(),
            "2 ETH = 5000.000000 USD"
        );
    }

    #[tokio::test]
    async fn test_enter_picks_first_suggestion() {
        let mut session = session();
        let mut focus = Focus::From;
        for _ in 0..3 {
            handle_key(&mut session, &mut focus, Key::Backspace);
        }
        press(&mut session, &mut focus, "us");
        handle_key(&mut session, &mut focus, Key::Enter);
        assert_eq!(session.form().from_currency(), "USD");
        assert_eq!(session.selector(Side::From).display_value(), "USD");
    }

    #[tokio::test]
    async fn test_enter_on_committed_code_clears_partial_text() {
        let mut session = session();
        let mut focus = Focus::From;
        for _ in 0..3 {
            handle_key(&mut session, &mut focus, Key::Backspace);
        }
        press(&mut session, &mut focus, "et");
        assert_eq!(session.selector(Side::From).suggestions(), vec!["ETH"]);

        handle_key(&mut session, &mut focus, Key::Enter);
        assert_eq!(session.form().from_currency(), "ETH");
        assert_eq!(session.selector(Side::From).display_value(), "ETH");
    }

    #[tokio::test]
    async fn test_swap_and_quit_keys() {
        let mut session = session();
        let mut focus = Focus::Amount;
        handle_key(&mut session, &mut focus, Key::Char('/'));
        assert_eq!(session.form().from_currency(), "EUR");
        assert_eq!(session.form().to_currency(), "ETH");
        assert_eq!(
            handle_key(&mut session, &mut focus, Key::Escape),
            Flow::Quit
        );
    }

    #[tokio::test]
    async fn test_render_shows_errors_and_suggestions() {
        console::set_colors_enabled(false);
        let mut session = session();
        let mut focus = Focus::Amount;
        handle_key(&mut session, &mut focus, Key::Backspace);
        handle_key(&mut session, &mut focus, Key::Tab);
        assert_eq!(
            session.form().visible_error(FormField::Amount),
            Some(FieldError::MissingAmount)
        );

        let text = render_lines(&session, focus).join("\n");
        assert!(text.contains("Please enter the amount to convert."));
        assert!(text.contains("ETH  EUR  USD"));
        assert!(text.contains("Fill in the form to see a quote."));
    }
}
