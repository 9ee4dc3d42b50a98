use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Esc", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("Enter", 9, "Send goal"),
        key_line("Tab", 11, "Next field"),
        key_line("Shift-Tab", 5, "Previous field"),
        key_line("↑/↓", 11, "Step X/Y by 0.1 (moves focus on the map field)"),
        key_line("PgUp/PgDn", 5, "Step X/Y by 1.0"),
        key_line("Ctrl-U", 8, "Clear field"),
        key_line("Ctrl-Y", 8, "Copy payload preview to clipboard"),
        key_line("F1", 12, "Show/hide this help"),
        Line::from(""),
        Line::from("Fields:"),
        Line::from("  Target Map   map identifier, surrounding whitespace is ignored"),
        Line::from("  Target X/Y   -1000.00 to 1000.00, two decimals"),
        Line::from(""),
        Line::from("A goal counts as sent once the publisher has been launched."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
