use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, FocusPane, InputMode};
use crate::chat::{Message, Role};
use crate::history::HistoryStatus;
use crate::monitor::ConnectionStatus;
use crate::settings::SettingsField;
use crate::toast::ToastKind;

const SIDEBAR_WIDTH: u16 = 36;

/// Palette for the two display modes.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub system: Color,
    pub header_bg: Color,
}

impl Theme {
    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self {
                bg: Color::Black,
                fg: Color::Gray,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Cyan,
                assistant: Color::Yellow,
                system: Color::Magenta,
                header_bg: Color::DarkGray,
            }
        } else {
            Self {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                user: Color::Blue,
                assistant: Color::Rgb(160, 90, 0),
                system: Color::Magenta,
                header_bg: Color::Gray,
            }
        }
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let theme = Theme::for_mode(app.dark_mode);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &theme, frame, header_area);

    let sidebar_width = SIDEBAR_WIDTH.min(body_area.width / 2);
    let [chat_area, sidebar_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(sidebar_width),
    ])
    .areas(body_area);

    render_chat(app, &theme, frame, chat_area);
    render_sidebar(app, &theme, frame, sidebar_area);
    render_footer(app, &theme, frame, footer_area);

    if app.show_confirm_clear {
        render_confirm(&theme, frame, area);
    } else if app.settings.open {
        render_settings(app, &theme, frame, area);
    }
}

fn render_header(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let speak_style = if app.auto_speak_button_active() {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    } else {
        Style::default().fg(Color::White).bg(Color::Black)
    };

    let title = Line::from(vec![
        Span::styled(" AI Assistant ", Style::default().fg(theme.accent).bold()),
        Span::raw(" "),
        Span::styled(
            if app.auto_speak_button_active() { " 🔊 Auto-speak " } else { " 🔇 Auto-speak " },
            speak_style,
        ),
        Span::raw(" "),
        Span::raw(if app.dark_mode { "🌙" } else { "☀️" }),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.dim),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(theme.header_bg));
    frame.render_widget(header, area);
}

/// Transcript lines for one message: role label, paragraphs, blank line.
fn message_lines(msg: &Message, theme: &Theme, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (label, color) = match msg.role {
        Role::User => ("You:", theme.user),
        Role::Assistant => ("Assistant:", theme.assistant),
        Role::System => ("System:", theme.system),
    };
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    if msg.is_loading {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(usize::from(animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", msg.text, dots),
            Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC),
        )));
    } else {
        let style = if msg.role == Role::System {
            Style::default().fg(theme.system).add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        };
        for (i, paragraph) in msg.paragraphs().into_iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            for line in paragraph {
                lines.push(Line::styled(line.to_string(), style));
            }
        }
    }

    lines.push(Line::default());
    lines
}

/// Rows the lines occupy once wrapped to `width`.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn render_chat(app: &mut App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let [transcript_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    app.transcript_area = Some(transcript_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dim))
        .title(" Conversation ");
    let inner = block.inner(transcript_area);

    let text = if app.transcript.is_empty() {
        Text::from(Span::styled(
            "Type a message, press Ctrl+R to speak, or F1-F9 for a quick prompt.",
            Style::default().fg(theme.dim),
        ))
    } else {
        let lines: Vec<Line> = app
            .transcript
            .messages()
            .iter()
            .flat_map(|msg| message_lines(msg, theme, app.animation_frame))
            .collect();
        Text::from(lines)
    };

    let max_scroll = wrapped_height(&text.lines, inner.width).saturating_sub(inner.height);
    if app.transcript.stick_to_bottom || app.transcript.scroll >= max_scroll {
        app.transcript.scroll = max_scroll;
        app.transcript.stick_to_bottom = true;
    }

    let transcript = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript.scroll, 0));
    frame.render_widget(transcript, transcript_area);

    render_input(app, theme, frame, input_area);

    let status = Paragraph::new(app.voice_status.as_str()).style(Style::default().fg(theme.accent));
    frame.render_widget(status, status_area);
}

fn render_input(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let editing = app.focus == FocusPane::Input && app.input_mode == InputMode::Editing;
    let border_color = if !app.input_enabled {
        theme.dim
    } else if editing {
        Color::Yellow
    } else {
        theme.dim
    };

    let title = if app.input_enabled {
        " Message (Enter to send) "
    } else {
        " Waiting for reply... "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || app.cursor < inner_width {
        0
    } else {
        app.cursor - inner_width + 1
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input_style = if app.input_enabled {
        Style::default().fg(theme.user)
    } else {
        Style::default().fg(theme.dim)
    };
    let input = Paragraph::new(visible_text).style(input_style).block(block);
    frame.render_widget(input, area);

    if editing && app.input_enabled {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Lines and border color of the connection status block.
fn status_block(status: &ConnectionStatus) -> (Vec<Line<'static>>, Color) {
    match status {
        ConnectionStatus::Unknown => (
            vec![Line::from("Checking connection...")],
            Color::DarkGray,
        ),
        ConnectionStatus::Connected { model, auto_speak } => (
            vec![
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(Color::Green)),
                    Span::styled("Connected", Style::default().bold()),
                ]),
                Line::from(format!("Model: {model}")),
                Line::from(format!("Auto-speak: {}", if *auto_speak { "✓" } else { "✗" })),
            ],
            Color::Green,
        ),
        ConnectionStatus::Disconnected => (
            vec![
                Line::from(Span::styled("⚠️ Disconnected", Style::default().fg(Color::Red).bold())),
                Line::from("Cannot reach backend"),
            ],
            Color::Red,
        ),
    }
}

fn render_sidebar(app: &mut App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let quick_height = (app.quick_prompts.len().min(9) as u16) + 2;
    let [status_area, history_area, tooltip_area, quick_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(3),
        Constraint::Length(4),
        Constraint::Length(quick_height),
    ])
    .areas(area);

    let (status_lines, status_color) = status_block(&app.connection);
    let status = Paragraph::new(status_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(status_color))
            .title(" Status "),
    );
    frame.render_widget(status, status_area);

    // History list
    app.history_area = Some(history_area);
    let focused = app.focus == FocusPane::History;
    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { theme.accent } else { theme.dim }))
        .title(" History (Ctrl+L clear) ");

    let placeholder = match app.history.status {
        HistoryStatus::Loading => Some("Loading..."),
        HistoryStatus::Unavailable => Some("History unavailable"),
        HistoryStatus::Ready if app.history.entries.is_empty() => Some("No history"),
        HistoryStatus::Ready => None,
    };

    if let Some(text) = placeholder {
        let empty = Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))).block(history_block);
        frame.render_widget(empty, history_area);
    } else {
        let items: Vec<ListItem> = app.history.labels().into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(history_block)
            .highlight_style(
                Style::default()
                    .bg(theme.accent)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, history_area, &mut app.history.state);
    }

    // Tooltip: full text of the highlighted entry
    let tooltip = Paragraph::new(app.history.tooltip().unwrap_or("").to_string())
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.dim))
                .title(" Prompt "),
        );
    frame.render_widget(tooltip, tooltip_area);

    let quick_items: Vec<ListItem> = app
        .quick_prompts
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, prompt)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("F{} ", i + 1), Style::default().fg(theme.accent)),
                Span::raw(prompt.clone()),
            ]))
        })
        .collect();
    let quick = List::new(quick_items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.dim))
            .title(" Quick prompts "),
    );
    frame.render_widget(quick, quick_area);
}

fn render_footer(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    if let Some(toast) = &app.toast {
        let (fg, bg) = match toast.kind {
            ToastKind::Info => (Color::White, Color::Blue),
            ToastKind::Success => (Color::Black, Color::Green),
            ToastKind::Warning => (Color::Black, Color::Yellow),
            ToastKind::Error => (Color::White, Color::Red),
        };
        let line = Paragraph::new(format!(" {} ", toast.message)).style(Style::default().fg(fg).bg(bg));
        frame.render_widget(line, area);
        return;
    }

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mode = match app.input_mode {
        InputMode::Editing => Span::styled(" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::Normal => Span::styled(" NORMAL ", Style::default().bg(theme.accent).fg(Color::White)),
    };

    let mut hints = vec![mode];
    if app.focus == FocusPane::History {
        hints.extend(vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" resend ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" ^R ", key_style),
        Span::styled(if app.is_listening() { " stop " } else { " speak " }, label_style),
        Span::styled(" ^S ", key_style),
        Span::styled(" settings ", label_style),
        Span::styled(" ^A ", key_style),
        Span::styled(" auto-speak ", label_style),
        Span::styled(" ^T ", key_style),
        Span::styled(" theme ", label_style),
        Span::styled(" ^C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_settings(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 60, 11);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(theme.bg).fg(theme.fg))
        .title(" Settings (Esc to close) ");

    let settings = &app.settings;
    let mut lines: Vec<Line> = SettingsField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                SettingsField::Rate => format!("◀ {} ▶", settings.rate),
                SettingsField::Volume => format!("◀ {} ▶", settings.volume),
                SettingsField::Voice => format!("◀ {} ▶  Enter to apply", settings.voices.display()),
                SettingsField::AutoSpeak => {
                    format!("[{}]", if app.auto_speak_checkbox_checked() { "x" } else { " " })
                }
                SettingsField::Model => format!("◀ {} ▶  Enter to apply", settings.models.display()),
            };
            let style = if *field == settings.field {
                Style::default().bg(theme.accent).fg(Color::Black).bold()
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!(" {:<13}", field.label()), style),
                Span::raw(" "),
                Span::raw(value),
            ])
        })
        .collect();

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        " ↑/↓ select  ←/→ adjust  Enter/Space apply",
        Style::default().fg(theme.dim),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn render_confirm(theme: &Theme, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 46, 5);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(theme.bg).fg(theme.fg))
        .title(" Confirm ");

    let text = vec![
        Line::from("Clear all conversation history?"),
        Line::from(Span::styled("y = yes   n/Esc = no", Style::default().fg(theme.dim))),
    ];
    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}
