//! Terminal rendering: status bar, keyboard, participants

use keyjam::{dsp::OscillatorKind, io::converter::KEYBOARD_NOTES};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::app::SessionView;
use super::keyboard::key_for;

pub fn render(frame: &mut Frame, view: &SessionView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Length(5), // Keyboard
            Constraint::Min(3),    // Participants
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status(frame, chunks[0], view);
    render_keyboard(frame, chunks[1], view);
    render_participants(frame, chunks[2], view);

    let help = if view.key_release {
        " [a-k] Play  [1-4] Sine/Saw/Square/Triangle  [Space] Release  [Q] Quit"
    } else {
        " [a-k] Play  [1-4] Sine/Saw/Square/Triangle  [Space] Release (no key-up support)  [Q] Quit"
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn render_status(frame: &mut Frame, area: Rect, view: &SessionView) {
    let (link, link_color) = if view.connected {
        ("connected", Color::Green)
    } else {
        ("offline", Color::Red)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", view.server), Style::default().fg(Color::Cyan)),
        Span::styled(format!("[{link}]  "), Style::default().fg(link_color)),
        Span::raw("sound: "),
        Span::styled(
            view.sound.name(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default().title(" keyjam ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_keyboard(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut names = Vec::with_capacity(KEYBOARD_NOTES.len());
    let mut keys = Vec::with_capacity(KEYBOARD_NOTES.len());

    for (note, name) in KEYBOARD_NOTES {
        let style = if view.local_note == Some(note) {
            Style::default().bg(Color::Cyan).fg(Color::Black)
        } else if view.remote_notes.values().any(|n| *n == note) {
            Style::default().bg(Color::Magenta).fg(Color::Black)
        } else if name.contains('s') {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::White)
        };

        names.push(Span::styled(format!("{name:^5}"), style));
        let label = key_for(note).map(|k| k.to_string()).unwrap_or_default();
        keys.push(Span::styled(
            format!("{label:^5}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(vec![Line::from(names), Line::from(keys)]).block(block),
        area,
    );
}

fn render_participants(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut lines = Vec::new();
    for (id, sound) in &view.remote_sounds {
        lines.push(participant_line(id.as_str(), *sound, view.remote_notes.get(id)));
    }
    for (id, note) in &view.remote_notes {
        if !view.remote_sounds.contains_key(id) {
            lines.push(participant_line(id.as_str(), OscillatorKind::Sine, Some(note)));
        }
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            " nobody else is playing",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default().title(" Participants ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn participant_line(id: &str, sound: OscillatorKind, note: Option<&i32>) -> Line<'static> {
    let playing = match note {
        Some(note) => keyjam::io::note_name(*note)
            .map(str::to_owned)
            .unwrap_or_else(|| note.to_string()),
        None => "-".to_owned(),
    };
    Line::from(vec![
        Span::styled(format!(" {id:<12}"), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:<10}", sound.name())),
        Span::styled(playing, Style::default().fg(Color::Magenta)),
    ])
}
