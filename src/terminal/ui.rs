use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::compose::{ComposeField, ComposeForm};
use crate::app::state::{AppState, Screen, Tab};
use crate::app::{filter, stats};
use crate::domain::chat::ChatSender;
use crate::domain::email::{Email, Priority};
use crate::domain::meeting::Meeting;

pub fn render(f: &mut Frame, state: &mut AppState) {
    match state.screen {
        Screen::Landing => render_landing(f, state),
        Screen::Help => render_help(f),
        Screen::Dashboard => render_dashboard(f, state),
    }

    if state.screen == Screen::Dashboard {
        if let Some(form) = state.compose.clone() {
            render_compose(f, &form);
        }
    }
}

// ----- landing -----

fn render_landing(f: &mut Frame, state: &AppState) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(8),
        Constraint::Fill(1),
    ])
    .areas(f.area());

    let lines = vec![
        Line::from(Span::styled(
            "inbox_triage",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("Your inbox, mastered. Real-time AI analysis of your mail."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("l", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" log in   "),
            Span::styled("?", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" help   "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), middle);

    render_status(f, state, footer_area(f.area()));
}

// ----- help -----

fn render_help(f: &mut Frame) {
    let text = Text::from(vec![
        Line::styled(
            "Getting started",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw("1. Press l on the landing screen. Your browser opens the"),
        Line::raw("   provider's consent page; approve mail and calendar access."),
        Line::raw("2. Back in the terminal, press s to sync. The backend analyzes"),
        Line::raw("   your recent mail and assigns priority, intent and drafts."),
        Line::raw("3. Meeting reminders arrive as desktop notifications while the"),
        Line::raw("   app is running (1 day, 2 hours and at start time)."),
        Line::raw(""),
        Line::styled("Keys", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::raw("  1-4        switch tab (overview, inbox, assistant, calendar)"),
        Line::raw("  j/k        move selection        Enter  expand email"),
        Line::raw("  f          cycle inbox filter    s      sync mailbox"),
        Line::raw("  c          compose               r/a    reply / AI reply"),
        Line::raw("  d          cancel meeting        R      refresh list"),
        Line::raw("  Ctrl-d     clear chat history    L      log out"),
        Line::raw(""),
        Line::raw("  Compose: Tab next field, Ctrl-s send, Esc discard,"),
        Line::raw("  Ctrl-f/l/k/g rewrite (formal / casual / shorten / grammar)"),
        Line::raw(""),
        Line::raw("Press any key to go back."),
    ]);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let [area] = Layout::vertical([Constraint::Fill(1)])
        .margin(1)
        .areas(f.area());
    f.render_widget(Paragraph::new(text).block(block), area);
}

// ----- dashboard -----

fn render_dashboard(f: &mut Frame, state: &mut AppState) {
    let [header, content, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(f.area());

    render_header(f, state, header);

    match state.tab {
        Tab::Overview => render_overview(f, state, content),
        Tab::Inbox => render_inbox(f, state, content),
        Tab::Assistant => render_assistant(f, state, content),
        Tab::Calendar => render_calendar(f, state, content),
    }

    render_status(f, state, footer);
}

fn render_header(f: &mut Frame, state: &AppState, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let style = if *tab == state.tab {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[{}] {}", i + 1, tab.title()), style));
        spans.push(Span::raw("  "));
    }
    if let Some(user) = &state.user {
        spans.push(Span::raw("· "));
        spans.push(Span::styled(
            user.name.clone(),
            Style::default().fg(Color::Gray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(f: &mut Frame, state: &AppState, area: Rect) {
    let widget = match &state.status {
        Some(status) => {
            let color = if status.is_error {
                Color::Red
            } else {
                Color::Green
            };
            Paragraph::new(Span::styled(
                status.text.clone(),
                Style::default().fg(color),
            ))
        }
        None => Paragraph::new(Line::from(vec![
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" sync  "),
            Span::styled("c", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" compose  "),
            Span::styled("f", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" filter  "),
            Span::styled("?", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" help  "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" quit"),
        ])),
    };
    f.render_widget(widget, area);
}

fn footer_area(area: Rect) -> Rect {
    let [_, footer] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    footer
}

// ----- overview tab -----

fn render_overview(f: &mut Frame, state: &AppState, area: Rect) {
    let [tiles, charts] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);

    let [t1, t2, t3] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(tiles);
    render_tile(f, t1, "Total emails", state.emails.len(), Color::White);
    render_tile(
        f,
        t2,
        "Urgent (P1)",
        stats::urgent_count(&state.emails),
        Color::Red,
    );
    render_tile(
        f,
        t3,
        "Action items",
        stats::action_count(&state.emails),
        Color::Green,
    );

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(charts);

    let priority_bars: Vec<Bar> = stats::priority_counts(&state.emails)
        .into_iter()
        .map(|(label, count)| Bar::default().label(Line::from(label)).value(count))
        .collect();
    let priority_chart = BarChart::default()
        .block(
            Block::default()
                .title(" Priority distribution ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .data(BarGroup::default().bars(&priority_bars));
    f.render_widget(priority_chart, left);

    let intent_bars: Vec<Bar> = stats::intent_counts(&state.emails, 5)
        .into_iter()
        .map(|(label, count)| {
            let short: String = label.chars().take(8).collect();
            Bar::default().label(Line::from(short)).value(count)
        })
        .collect();
    let intent_chart = BarChart::default()
        .block(
            Block::default()
                .title(" Intent categories ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .data(BarGroup::default().bars(&intent_bars));
    f.render_widget(intent_chart, right);

    if state.emails.is_empty() {
        let hint = Paragraph::new("No data available. Press s to sync your email.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        let [_, mid, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(charts);
        f.render_widget(hint, mid);
    }
}

fn render_tile(f: &mut Frame, area: Rect, label: &str, value: usize, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let line = Line::from(vec![
        Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(label.to_string(), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

// ----- inbox tab -----

fn render_inbox(f: &mut Frame, state: &mut AppState, area: Rect) {
    let [filters, rest] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let mut chips: Vec<Span> = vec![Span::raw("Filter: ")];
    for cat in filter::CATEGORIES {
        let style = if *cat == state.filter_name() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        chips.push(Span::styled(format!(" {cat} "), style));
        chips.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(chips)), filters);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(rest);

    let visible: Vec<Email> = state.visible_emails().into_iter().cloned().collect();

    let items: Vec<ListItem> = visible.iter().map(email_list_item).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Inbox ({}) ", visible.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, left, &mut state.inbox_list);

    render_email_detail(f, state, &visible, right);
}

fn email_list_item(email: &Email) -> ListItem<'static> {
    let mut header = vec![Span::styled(
        email.subject.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if email.priority == Priority::P1 {
        header.push(Span::styled(" [URGENT]", Style::default().fg(Color::Red)));
    }
    if email.requires_action {
        header.push(Span::styled(" [ACTION]", Style::default().fg(Color::Green)));
    }
    let meta = Span::styled(
        format!(
            "{} · {}",
            email.sender,
            email.received_time.format("%b %d %H:%M")
        ),
        Style::default().fg(Color::Gray),
    );
    ListItem::new(Text::from(vec![Line::from(header), Line::from(meta)]))
}

fn render_email_detail(f: &mut Frame, state: &AppState, visible: &[Email], area: Rect) {
    let block = Block::default()
        .title(" Email ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(email) = state.inbox_list.selected().and_then(|idx| visible.get(idx)) else {
        let empty = if state.emails.is_empty() {
            "Inbox zero.\nPress s to sync your mailbox."
        } else {
            "No email matches this filter."
        };
        f.render_widget(Paragraph::new(empty).block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                email.sender.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", email.received_time.format("%Y-%m-%d %H:%M")),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            email.subject.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        tag_line(email),
        Line::raw(""),
        Line::from(vec![
            Span::styled("✦ ", Style::default().fg(Color::Blue)),
            Span::styled(
                email.insight().to_string(),
                Style::default().fg(Color::Blue),
            ),
        ]),
        Line::raw(""),
    ];

    if state.expanded_email_id == Some(email.id) {
        for body_line in email.display_body().lines() {
            lines.push(Line::raw(body_line.to_string()));
        }
        if let Some(reply) = &email.suggested_reply {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                "Suggested reply:",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("\"{reply}\""),
                Style::default().fg(Color::Magenta),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to expand · r reply · a AI reply",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn tag_line(email: &Email) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", email.priority.label()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", email.intent),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
    ];
    if let Some(sentiment) = email.sentiment {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} ", sentiment.label()),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

// ----- assistant tab -----

fn render_assistant(f: &mut Frame, state: &AppState, area: Rect) {
    let [transcript_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    if state.chat.messages.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "I have read your recent emails. Ask me anything!",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Try: \"What was the last email from Google?\"",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for msg in &state.chat.messages {
        let (prefix, style) = match msg.sender {
            ChatSender::User => ("you   ", Style::default().fg(Color::Cyan)),
            ChatSender::Agent => ("agent ", Style::default().fg(Color::White)),
            ChatSender::System => ("  !   ", Style::default().fg(Color::Red)),
        };
        for (i, part) in msg.text.lines().enumerate() {
            let head = if i == 0 { prefix } else { "      " };
            lines.push(Line::from(vec![
                Span::styled(head, style.add_modifier(Modifier::BOLD)),
                Span::styled(part.to_string(), style),
            ]));
        }
    }

    let transcript = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" AI Manager ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(transcript, transcript_area);

    let input = Paragraph::new(format!("{}▏", state.chat.input)).block(
        Block::default()
            .title(" Message (Enter send · Ctrl-d clear history · Esc back) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(input, input_area);
}

// ----- calendar tab -----

fn render_calendar(f: &mut Frame, state: &mut AppState, area: Rect) {
    let now = Utc::now();
    let ordered: Vec<Meeting> = state.ordered_meetings(now).into_iter().cloned().collect();
    let upcoming_count = ordered.iter().filter(|m| m.is_upcoming(now)).count();

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let items: Vec<ListItem> = ordered
        .iter()
        .map(|m| {
            let past = !m.is_upcoming(now);
            let style = if past {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let when = m
                .start_time
                .with_timezone(&chrono::Local)
                .format("%a %b %d %H:%M");
            let status = if past { "completed" } else { m.status.as_str() };
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(
                    m.title.clone(),
                    style.add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(format!("{when} · {status}"), style)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(
                    " Calendar ({upcoming_count} upcoming, {} past) ",
                    ordered.len() - upcoming_count
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, left, &mut state.calendar_list);

    let block = Block::default()
        .title(" Meeting ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let detail = match state
        .calendar_list
        .selected()
        .and_then(|idx| ordered.get(idx))
    {
        Some(m) => {
            let start = m.start_time.with_timezone(&chrono::Local);
            let end = m.end_time.with_timezone(&chrono::Local);
            Text::from(vec![
                Line::from(Span::styled(
                    m.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::raw(""),
                Line::raw(format!(
                    "{} – {}",
                    start.format("%A %B %d, %H:%M"),
                    end.format("%H:%M")
                )),
                Line::raw(format!("Participants: {}", m.participants)),
                Line::raw(format!("Status: {}", m.status)),
                Line::raw(""),
                Line::from(Span::styled(
                    "d cancel meeting · R refresh",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        }
        None => Text::raw("No meetings found.\nAsk the assistant to schedule one!"),
    };
    f.render_widget(
        Paragraph::new(detail).wrap(Wrap { trim: false }).block(block),
        right,
    );
}

// ----- compose overlay -----

fn render_compose(f: &mut Frame, form: &ComposeForm) {
    let area = centered_rect(f.area(), 70, 70);
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Compose (Ctrl-s send · Esc discard · Ctrl-f/l/k/g rewrite) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(block, area);

    let [inner] = Layout::vertical([Constraint::Fill(1)]).margin(1).areas(area);
    let [to_area, subject_area, body_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(inner);

    render_compose_field(f, to_area, "To", &form.to, form.field == ComposeField::To);
    render_compose_field(
        f,
        subject_area,
        "Subject",
        &form.subject,
        form.field == ComposeField::Subject,
    );
    render_compose_field(
        f,
        body_area,
        "Message",
        &form.body,
        form.field == ComposeField::Body,
    );
}

fn render_compose_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let shown = if focused {
        format!("{value}▏")
    } else {
        value.to_string()
    };
    let widget = Paragraph::new(shown).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(widget, area);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vert, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, horiz, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vert);
    horiz
}
