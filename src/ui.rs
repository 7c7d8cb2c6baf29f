use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{format_clock, App},
    game::SessionSnapshot,
    session::{MatchMode, Phase},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const WARNING_SECS: u32 = 10;
const ACCENT: Color = Color::Rgb(237, 134, 7);

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.game.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2), // title
                    Constraint::Length(3), // clock and stats
                    Constraint::Length(1), // progress
                    Constraint::Min(3),    // words
                    Constraint::Length(3), // input
                    Constraint::Length(1), // help
                ]
                .as_ref(),
            )
            .split(area);

        Paragraph::new(Span::styled(
            "Speed Typer!",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        stats_line(&snap).render(chunks[1], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::LightMagenta))
            .ratio((snap.progress_value / 100.0).clamp(0.0, 1.0))
            .label("")
            .render(chunks[2], buf);

        Paragraph::new(word_spans(&snap, chunks[3].width))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left)
            .render(chunks[3], buf);

        let input_style = if self.input_enabled() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        Paragraph::new(Span::styled(snap.input_buffer.clone(), input_style))
            .block(Block::default().borders(Borders::ALL).border_style(input_style))
            .render(chunks[4], buf);

        Paragraph::new(help_text(snap.phase, self.game.config().match_mode))
            .style(Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

fn stats_line(snap: &SessionSnapshot) -> Paragraph<'static> {
    let clock_style = if snap.display_seconds <= WARNING_SECS {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let value = Style::default().fg(ACCENT);

    Paragraph::new(vec![
        Line::from(Span::styled(format_clock(snap.display_seconds), clock_style)),
        Line::from(vec![
            Span::raw("WPM: "),
            Span::styled(snap.metrics.wpm_display(), value),
            Span::raw("   Words Typed: "),
            Span::styled(snap.correct_words_count.to_string(), value),
            Span::raw("   Characters Typed: "),
            Span::styled(snap.total_characters_typed.to_string(), value),
            Span::raw("   Characters Per Second: "),
            Span::styled(snap.metrics.cps_display(), value),
        ]),
    ])
    .alignment(Alignment::Center)
}

fn word_spans(snap: &SessionSnapshot, width: u16) -> Line<'static> {
    let done = Style::default().fg(Color::Green).add_modifier(Modifier::DIM);
    let current = Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let pending = Style::default().add_modifier(Modifier::DIM);

    // Start the visible window a little before the current word so it stays on screen
    let budget = width as usize * 2;
    let mut start = snap.current_word_index.min(snap.words.len());
    let mut used = 0;
    while start > 0 && used + snap.words[start - 1].width() + 1 < budget / 2 {
        used += snap.words[start - 1].width() + 1;
        start -= 1;
    }

    let mut spans = Vec::new();
    for (idx, word) in snap.words.iter().enumerate().skip(start) {
        let style = match idx.cmp(&snap.current_word_index) {
            std::cmp::Ordering::Less => done,
            std::cmp::Ordering::Equal => current,
            std::cmp::Ordering::Greater => pending,
        };
        spans.push(Span::styled(word.clone(), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn help_text(phase: Phase, mode: MatchMode) -> &'static str {
    match (phase, mode) {
        (Phase::Idle, _) => "(enter) start timer | (esc)ape",
        (Phase::Running, MatchMode::Live) => {
            "type the highlighted word | (ctrl+r) restart | (esc)ape"
        }
        (Phase::Running, MatchMode::Submit) => {
            "type the highlighted word | (enter) submit | (ctrl+r) restart | (esc)ape"
        }
        (Phase::Expired, _) => "time! (enter) restart game | (esc)ape",
    }
}
