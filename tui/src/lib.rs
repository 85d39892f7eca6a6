//! TUI rendering for Rubberstamp using ratatui.

mod format;
mod input;
mod theme;

pub use input::{InputPump, KeyCommand, apply_command, handle_events, key_command};
pub use theme::{
    Glyphs, LOAD_ALERT_ABOVE, Palette, TRUST_ALERT_BELOW, glyphs, palette, spinner_frame, styles,
};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use rubberstamp_engine::{Card, CardSource, Engine, GamePhase, GameSnapshot, Stats};

use self::format::{format_amount, meter, spread};

const CARD_HEIGHT: u16 = 6;
const CARD_MAX_WIDTH: u16 = 52;
const STAT_ROW_WIDTH: usize = 28;
const CLOSING_QUOTE: &str =
    "\"Scaling requires Alignment Engineering, not just more human oversight.\"";

/// Main draw function. `tick` drives the spinner.
pub fn draw<S: CardSource>(frame: &mut Frame, engine: &Engine<S>, tick: usize) {
    let options = engine.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let snapshot = engine.snapshot();

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Meters
            Constraint::Min(8),    // Game area
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], &palette);
    draw_meters(frame, &snapshot, chunks[1], &palette, &glyphs);

    let block = game_block(&snapshot, &palette);
    let body = block.inner(chunks[2]);
    frame.render_widget(block, chunks[2]);

    match snapshot.phase {
        GamePhase::Idle => draw_idle(frame, body, &palette),
        GamePhase::Briefing => draw_briefing(frame, body, &palette, &glyphs),
        GamePhase::Playing => {
            let spinner = spinner_frame(tick, options);
            draw_cards(frame, &snapshot, body, &palette, &glyphs, spinner);
        }
        GamePhase::RoundResults => {
            draw_round_results(frame, &snapshot, body, &palette, &glyphs);
        }
        GamePhase::RoundTransition => {
            draw_round_transition(frame, &snapshot, body, &palette, &glyphs);
        }
        GamePhase::GameOver => draw_game_over(frame, &snapshot, body, &palette, &glyphs),
    }

    draw_key_hints(frame, snapshot.phase, chunks[3], &palette, &glyphs);
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled("Monitoring AI Agents", styles::heading(palette))),
        Line::from(Span::styled(
            "A Human-in-the-Loop Simulation of the Rubber Stamp Effect",
            styles::key_hint(palette),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_meters(
    frame: &mut Frame,
    snapshot: &GameSnapshot,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    // Idle dims the whole row.
    let idle = snapshot.phase == GamePhase::Idle;
    let dim = |style: Style| {
        if idle {
            style.fg(palette.text_muted)
        } else {
            style
        }
    };

    let trust = snapshot.trust_score;
    let load = snapshot.cognitive_load;
    let width = usize::from(columns[0].width.saturating_sub(2));

    let trust_lines = vec![
        Line::from(Span::styled(
            spread("System Trust", &format!("{trust}%"), width),
            dim(styles::section(palette)),
        )),
        Line::from(Span::styled(
            meter(trust, width, glyphs),
            dim(styles::trust_meter(palette, trust)),
        )),
    ];
    frame.render_widget(Paragraph::new(trust_lines), inset(columns[0]));

    let agent_lines = vec![
        Line::from(Span::styled("ACTIVE AGENTS", dim(styles::key_hint(palette)))),
        Line::from(Span::styled(
            snapshot.active_round.agent_count.to_string(),
            dim(styles::heading(palette)),
        )),
        Line::from(Span::styled(
            format!("Round {}", snapshot.round),
            dim(styles::key_hint(palette)),
        )),
    ];
    frame.render_widget(
        Paragraph::new(agent_lines).alignment(Alignment::Center),
        columns[1],
    );

    let load_lines = vec![
        Line::from(Span::styled(
            spread("Cognitive Load", &format!("{load}%"), width),
            dim(Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD)),
        )),
        Line::from(Span::styled(
            meter(load, width, glyphs),
            dim(styles::load_meter(palette, load)),
        )),
    ];
    frame.render_widget(Paragraph::new(load_lines), inset(columns[2]));
}

fn game_block<'a>(snapshot: &GameSnapshot, palette: &Palette) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel));
    if snapshot.phase == GamePhase::Playing {
        block = block
            .title(Line::from(Span::styled(
                format!(" Round {} · {} ", snapshot.round, snapshot.active_round.title),
                styles::section(palette),
            )))
            .title(
                Line::from(Span::styled(
                    format!(" Backlog {} ", snapshot.cards.len()),
                    styles::key_hint(palette),
                ))
                .right_aligned(),
            );
    }
    block
}

fn draw_idle(frame: &mut Frame, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled(
            "[ Enter ]  Initialize Simulation",
            styles::key_highlight(palette),
        )),
    ];
    draw_centered(frame, area, lines);
}

fn draw_briefing(frame: &mut Frame, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let body = styles::body(palette);
    let key = styles::heading(palette);
    let bullet = format!(" {} ", glyphs.bullet);

    let lines = vec![
        Line::from(Span::styled("Simulation Briefing", styles::heading(palette))),
        Line::from(""),
        Line::from(Span::styled("OBJECTIVE", styles::section(palette))),
        Line::from(Span::styled(
            "You are an operations manager overseeing a Multi-Agent-System.",
            body,
        )),
        Line::from(Span::styled(
            "The agents generate fulfillment orders which you need to validate.",
            body,
        )),
        Line::from(""),
        Line::from(Span::styled("THE RULES", styles::section(palette))),
        Line::from(vec![
            Span::styled(bullet.clone(), body),
            Span::styled("SCAN", key),
            Span::styled(" the decision cards.", body),
        ]),
        Line::from(vec![
            Span::styled(bullet.clone(), body),
            Span::styled("SPACE", key),
            Span::styled(" to VALIDATE correct data.", body),
        ]),
        Line::from(vec![
            Span::styled(bullet, body),
            Span::styled("SHIFT+SPACE", key),
            Span::styled(
                " to INTERVENE on errors (Logic, Unit mismatches, Invalid Data).",
                body,
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "SCALING PROTOCOL",
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "As you succeed, we will scale the agent count. Throughput will accelerate.",
            body,
        )),
        Line::from(Span::styled("Monitor your Cognitive Load.", body)),
        Line::from(""),
        Line::from(Span::styled(
            "[ Enter ]  INITIATE ROUND 1",
            styles::key_highlight(palette),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inset(area),
    );
}

fn draw_cards(
    frame: &mut Frame,
    snapshot: &GameSnapshot,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
    spinner: &str,
) {
    if snapshot.cards.is_empty() {
        let lines = vec![Line::from(Span::styled(
            format!("{spinner} Agents are working..."),
            styles::key_hint(palette),
        ))];
        draw_centered(frame, area, lines);
        return;
    }

    let width = area.width.min(CARD_MAX_WIDTH);
    let x = area.x + (area.width - width) / 2;
    // Keep one row for the overflow line.
    let capacity = usize::from(area.height.saturating_sub(1) / CARD_HEIGHT).max(1);
    let shown = snapshot.cards.len().min(capacity);

    let mut y = area.y;
    for (index, card) in snapshot.cards.iter().take(shown).enumerate() {
        let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        let card_area = Rect {
            x,
            y,
            width,
            height,
        };
        draw_card(frame, card, index == 0, card_area, palette, glyphs);
        y += height;
    }

    let hidden = snapshot.cards.len() - shown;
    if hidden > 0 && y < area.bottom() {
        let more = Paragraph::new(Line::from(Span::styled(
            format!("+{hidden} more in backlog"),
            styles::key_hint(palette),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(
            more,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }
}

fn draw_card(
    frame: &mut Frame,
    card: &Card,
    is_head: bool,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let (border, title) = if is_head {
        (
            styles::head_card_border(palette),
            format!(" {} {} ", glyphs.selected, card.customer_ref),
        )
    } else {
        (
            styles::queued_card_border(palette),
            format!(" {} ", card.customer_ref),
        )
    };
    let text = if is_head {
        Style::default().fg(palette.text_primary)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let background = if is_head {
        palette.bg_highlight
    } else {
        palette.bg_panel
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(background))
        .title(Line::from(Span::styled(title, border)))
        .title(Line::from(Span::styled(format!(" {} ", card.spawned_at), text)).right_aligned());

    let address_style = if card.has_invalid_address() {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    } else {
        text
    };
    let amount_style = if is_head {
        styles::section(palette)
    } else {
        text
    };

    let lines = vec![
        Line::from(Span::styled(card.address.clone(), address_style)),
        Line::from(Span::styled(format!("Due {}", card.due_date), text)),
        Line::from(vec![
            Span::styled(card.item_name.clone(), text),
            Span::styled(format!(" {} ", glyphs.bullet), text),
            Span::styled(card.quantity.to_string(), text.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("$ {}", format_amount(card.total_amount)),
            amount_style,
        ))
        .right_aligned(),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn stat_lines<'a>(stats: Stats, palette: &Palette) -> Vec<Line<'a>> {
    let row = |label: &str, value: u32, style: Style| {
        Line::from(Span::styled(
            spread(label, &value.to_string(), STAT_ROW_WIDTH),
            style,
        ))
    };
    vec![
        row("Processed:", stats.processed, styles::heading(palette)),
        row(
            "Errors Caught:",
            stats.caught_errors,
            Style::default().fg(palette.success),
        ),
        row(
            "Missed Errors:",
            stats.missed_errors,
            Style::default().fg(palette.error),
        ),
        row(
            "False Alarms:",
            stats.false_positives,
            Style::default().fg(palette.warning),
        ),
    ]
}

fn draw_round_results(
    frame: &mut Frame,
    snapshot: &GameSnapshot,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut lines = vec![
        Line::from(Span::styled(glyphs.ok, styles::section(palette))),
        Line::from(Span::styled(
            format!("ROUND {} COMPLETE", snapshot.round),
            styles::heading(palette),
        )),
        Line::from(Span::styled("Performance Summary", styles::body(palette))),
        Line::from(""),
    ];
    lines.extend(stat_lines(snapshot.round_stats, palette));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[ Enter ]  Continue",
        styles::key_highlight(palette),
    )));
    draw_centered(frame, area, lines);
}

fn draw_round_transition(
    frame: &mut Frame,
    snapshot: &GameSnapshot,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("ROUND {} COMPLETE", snapshot.round),
            styles::section(palette),
        )),
        Line::from(Span::styled(
            "SCALING INFRASTRUCTURE",
            styles::heading(palette),
        )),
        Line::from(""),
    ];

    match snapshot.next_round {
        Some(next) => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("Previous Agents {}", snapshot.active_round.agent_count),
                    styles::body(palette),
                ),
                Span::styled(format!("  {}  ", glyphs.arrow), styles::section(palette)),
                Span::styled(
                    format!("New Agents {}", next.agent_count),
                    styles::section(palette),
                ),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(next.title, styles::heading(palette))));
            lines.push(Line::from(Span::styled(
                next.description,
                styles::body(palette),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("[ Enter ]  START ROUND {}", next.id),
                styles::key_highlight(palette),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "[ Enter ]  Finish",
                styles::key_highlight(palette),
            )));
        }
    }
    draw_centered(frame, area, lines);
}

fn draw_game_over(
    frame: &mut Frame,
    snapshot: &GameSnapshot,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let alert = Style::default()
        .fg(palette.error)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(glyphs.alert, alert)),
        Line::from(Span::styled("SIMULATION ENDED", alert)),
        Line::from(""),
    ];
    lines.extend(stat_lines(snapshot.stats, palette));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(CLOSING_QUOTE, styles::body(palette))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[ Enter ]  Reboot System",
        styles::key_highlight(palette),
    )));
    draw_centered(frame, area, lines);
}

fn draw_key_hints(
    frame: &mut Frame,
    phase: GamePhase,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let hints: &[(&str, &str)] = match phase {
        GamePhase::Idle => &[("Enter", "start"), ("q", "quit")],
        GamePhase::Briefing => &[("Enter", "initiate round 1"), ("q", "quit")],
        GamePhase::Playing => &[
            ("Space", "validate"),
            ("Shift+Space/x", "intervene"),
            ("q", "quit"),
        ],
        GamePhase::RoundResults => &[("Enter", "continue"), ("q", "quit")],
        GamePhase::RoundTransition => &[("Enter", "start round"), ("q", "quit")],
        GamePhase::GameOver => &[("Enter", "reboot"), ("q", "quit")],
    };

    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(
                format!(" {} ", glyphs.bullet),
                styles::key_hint(palette),
            ));
        }
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Render `lines` horizontally and vertically centered in `area`.
fn draw_centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .min(area.height);
    let top = area.y + (area.height - height) / 2;
    let target = Rect {
        x: area.x,
        y: top,
        width: area.width,
        height: area.height - (top - area.y),
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        target,
    );
}

fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y,
        width: area.width.saturating_sub(2),
        height: area.height,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};
    use rubberstamp_engine::{CardGenerator, Engine, GamePhase, Rules, UiOptions};

    use super::draw;

    fn render(engine: &Engine, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| draw(frame, engine, 0))
            .expect("draw frame");
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn engine() -> Engine {
        Engine::new(CardGenerator::seeded(11), Rules::default())
    }

    /// Wait out one round-1 spawn interval per card.
    async fn spawn_cards(engine: &mut Engine, count: usize) {
        for _ in 0..count {
            tokio::time::sleep(Duration::from_millis(4_010)).await;
            tokio::task::yield_now().await;
            engine.tick();
        }
    }

    #[test]
    fn idle_screen_offers_to_initialize() {
        let screen = render(&engine(), 100, 30);
        assert!(screen.contains("Monitoring AI Agents"));
        assert!(screen.contains("Initialize Simulation"));
        assert!(screen.contains("System Trust"));
        assert!(screen.contains("100%"));
    }

    #[test]
    fn briefing_lists_objective_rules_and_protocol() {
        let mut engine = engine();
        engine.start();
        let screen = render(&engine, 110, 40);
        assert!(screen.contains("OBJECTIVE"));
        assert!(screen.contains("THE RULES"));
        assert!(screen.contains("SCALING PROTOCOL"));
        assert!(screen.contains("INITIATE ROUND 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn playing_screen_stacks_cards_with_head_first() {
        let mut engine = engine();
        engine.start();
        engine.confirm_briefing();
        let waiting = render(&engine, 100, 40);
        assert!(waiting.contains("Agents are working"));

        spawn_cards(&mut engine, 2).await;
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.cards.len(), 2);

        let screen = render(&engine, 100, 40);
        let head = &snapshot.cards[0].customer_ref;
        let second = &snapshot.cards[1].customer_ref;
        let head_at = screen.find(&format!("▸ {head} ")).expect("head rendered");
        let second_at = screen.find(&format!(" {second} ")).expect("second rendered");
        assert!(head_at < second_at);
        assert!(screen.contains("Round 1 · Pilot Phase"));
        assert!(screen.contains("Backlog 2"));
        assert!(screen.contains("validate"));
    }

    #[tokio::test(start_paused = true)]
    async fn tiny_terminal_renders_every_reachable_phase() {
        let mut engine = engine();
        for (width, height) in [(20, 6), (1, 1), (40, 12)] {
            render(&engine, width, height);
        }
        engine.start();
        render(&engine, 20, 6);
        engine.confirm_briefing();
        spawn_cards(&mut engine, 3).await;
        for (width, height) in [(20, 6), (12, 14), (1, 1)] {
            render(&engine, width, height);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn small_terminal_reports_hidden_backlog() {
        let mut engine = engine();
        engine.start();
        engine.confirm_briefing();
        spawn_cards(&mut engine, 5).await;

        let screen = render(&engine, 80, 24);
        assert!(screen.contains("more in backlog"));
    }

    #[tokio::test(start_paused = true)]
    async fn round_screens_show_stats_and_scaling() {
        let mut engine = engine();
        engine.start();
        engine.confirm_briefing();
        for _ in 0..5 {
            spawn_cards(&mut engine, 1).await;
            let head_has_error = engine.snapshot().head().is_some_and(|card| card.has_error());
            if head_has_error {
                engine.reject();
            } else {
                engine.approve();
            }
            if engine.phase() != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(engine.phase(), GamePhase::RoundResults);

        let results = render(&engine, 100, 40);
        assert!(results.contains("ROUND 1 COMPLETE"));
        assert!(results.contains("Processed:"));
        assert!(results.contains("False Alarms:"));

        engine.acknowledge_round_result();
        let transition = render(&engine, 100, 40);
        assert!(transition.contains("SCALING INFRASTRUCTURE"));
        assert!(transition.contains("Previous Agents 2"));
        assert!(transition.contains("New Agents 4"));
        assert!(transition.contains("Scaling Up"));
        assert!(transition.contains("START ROUND 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn game_over_shows_quote_in_ascii_mode() {
        let mut engine = engine().with_ui_options(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        });
        engine.start();
        engine.confirm_briefing();
        while engine.phase() != GamePhase::GameOver {
            match engine.phase() {
                GamePhase::RoundResults => engine.acknowledge_round_result(),
                GamePhase::RoundTransition => engine.advance_round(),
                _ => {
                    spawn_cards(&mut engine, 1).await;
                    let head_has_error =
                        engine.snapshot().head().is_some_and(|card| card.has_error());
                    if head_has_error {
                        engine.approve();
                    } else {
                        engine.reject();
                    }
                }
            }
        }

        let screen = render(&engine, 110, 40);
        assert!(screen.contains("SIMULATION ENDED"));
        assert!(screen.contains("Scaling requires Alignment Engineering"));
        assert!(screen.contains("Reboot System"));
        assert!(!screen.contains('█'));
    }
}
