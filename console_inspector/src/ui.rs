use std::collections::VecDeque;

use console_core::screens::{
    DroneConsole, DroneScreen, ImageSource, IntegrityBand, SlotView, TravelPlanningScreen,
};
use console_core::selection::ListingAction;
use console_core::ConsoleView;
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Frame;

pub struct UiState {
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    /// Highlighted row in whichever list the current screen shows.
    pub cursor: usize,
    pub slot_cursor: usize,
    /// Reason the last intent was refused.
    pub status: Option<String>,
    pub connected: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logs: VecDeque::new(),
            max_logs: 8,
            cursor: 0,
            slot_cursor: 0,
            status: None,
            connected: false,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn move_cursor(&mut self, step: i32, view: &ConsoleView) {
        self.cursor = step_index(self.cursor, step, list_len(view));
    }

    pub fn move_slot(&mut self, step: i32, view: &ConsoleView) {
        self.slot_cursor = step_index(self.slot_cursor, step, slot_len(view));
    }

    /// Keep cursors inside the lists of a freshly built view.
    pub fn clamp_cursors(&mut self, view: &ConsoleView) {
        self.cursor = self.cursor.min(list_len(view).saturating_sub(1));
        self.slot_cursor = self.slot_cursor.min(slot_len(view).saturating_sub(1));
    }
}

fn step_index(current: usize, step: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + step as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn list_len(view: &ConsoleView) -> usize {
    match view {
        ConsoleView::SignalLost => 0,
        ConsoleView::Selection { drones } => drones.len(),
        ConsoleView::Drone(console) => {
            if let Some(picker) = &console.tool_picker {
                return picker.tools.len();
            }
            match &console.screen {
                DroneScreen::PlanningTravel(planning) => planning.destinations.len(),
                DroneScreen::Exploration(Some(site)) => site.events.len(),
                DroneScreen::Adventure(Some(node)) => node.choices.len(),
                _ => 0,
            }
        }
    }
}

fn slot_len(view: &ConsoleView) -> usize {
    match view {
        ConsoleView::Drone(console) => console.equipment.slots.len(),
        _ => 0,
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState, view: &ConsoleView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(10),
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], state, view);
    match view {
        ConsoleView::SignalLost => draw_signal_lost(frame, chunks[1]),
        ConsoleView::Selection { .. } => draw_selection(frame, chunks[1], state, view),
        ConsoleView::Drone(console) => draw_drone(frame, chunks[1], state, console),
    }
    draw_status(frame, chunks[2], state);
    draw_logs(frame, chunks[3], state);
}

fn bordered(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn key(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::Yellow))
}

fn row(selected: bool, text: String) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            format!("> {text}"),
            Style::default().add_modifier(Modifier::REVERSED),
        ))
    } else {
        Line::from(Span::raw(format!("  {text}")))
    }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState, view: &ConsoleView) {
    let (label, color) = if state.connected {
        ("Connected", Color::Green)
    } else {
        ("Waiting for snapshot", Color::DarkGray)
    };
    let mode = view.mode().map_or("signal_lost", |mode| mode.as_str());
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(color)),
        Span::raw(format!(" | screen {mode} | ")),
        key("q"),
        Span::raw(" exit"),
    ]);
    bordered(frame, area, "Exodrone Console", vec![line]);
}

fn draw_signal_lost(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "DRONE SIGNAL LOST",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![key("enter"), Span::raw(" acknowledge")]),
    ];
    bordered(frame, area, "Alert", lines);
}

fn draw_selection(frame: &mut Frame, area: Rect, state: &UiState, view: &ConsoleView) {
    let ConsoleView::Selection { drones } = view else {
        return;
    };
    let mut lines: Vec<Line> = Vec::new();
    if drones.is_empty() {
        lines.push(Line::from("No drones available."));
    }
    for (index, entry) in drones.iter().enumerate() {
        let suffix = match entry.action {
            ListingAction::AssumeControl => "",
            ListingAction::ControlledElsewhere => "  (controlled by another console)",
        };
        lines.push(row(
            index == state.cursor,
            format!("{} - {}{suffix}", entry.name, entry.description),
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![key("enter"), Span::raw(" assume control")]));
    bordered(frame, area, "Drones", lines);
}

fn draw_drone(frame: &mut Frame, area: Rect, state: &UiState, console: &DroneConsole) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4), Constraint::Length(6)])
        .split(columns[0]);

    let color = match console.integrity.band {
        IntegrityBand::Good => Color::Green,
        IntegrityBand::Average => Color::Yellow,
        IntegrityBand::Bad => Color::Red,
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} integrity", console.name)),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(console.integrity.ratio())
        .label(format!(
            "{:.0}/{:.0}",
            console.integrity.current, console.integrity.max
        ));
    frame.render_widget(gauge, left[0]);

    draw_equipment(frame, left[1], state, console);
    let log: Vec<Line> = console
        .log
        .iter()
        .rev()
        .map(|entry| Line::from(format!("{}: {}", entry.label, entry.text)))
        .collect();
    bordered(frame, left[2], "Drone log", log);

    draw_screen(frame, columns[1], state, &console.screen);

    if let Some(picker) = &console.tool_picker {
        let popup = columns[1].inner(&Margin {
            vertical: 2,
            horizontal: 4,
        });
        let mut lines: Vec<Line> = picker
            .tools
            .iter()
            .enumerate()
            .map(|(index, tool)| {
                row(
                    index == state.cursor,
                    format!("{} - {}", tool.name, tool.description),
                )
            })
            .collect();
        lines.push(Line::from(vec![
            key("enter"),
            Span::raw(" install  "),
            key("esc"),
            Span::raw(" close"),
        ]));
        frame.render_widget(Clear, popup);
        bordered(frame, popup, "Choose tool", lines);
    }
}

fn draw_equipment(frame: &mut Frame, area: Rect, state: &UiState, console: &DroneConsole) {
    let equipment = &console.equipment;
    let mut lines: Vec<Line> = equipment
        .slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let text = match slot {
                SlotView::Tool { label, .. } => format!("[tool] {label}"),
                SlotView::Cargo { label, .. } => format!("[cargo] {label}"),
                SlotView::Empty => "[empty]".to_string(),
            };
            row(index == state.slot_cursor, text)
        })
        .collect();
    let mut keys = vec![key("[ ]"), Span::raw(" slot ")];
    if equipment.configurable {
        keys.extend([key(" t"), Span::raw(" add "), key(" r"), Span::raw(" remove")]);
    }
    keys.extend([key(" d"), Span::raw(" jettison")]);
    lines.push(Line::from(keys));
    lines.push(if equipment.self_destruct_armed {
        Line::from(vec![
            Span::styled("Self-destruct armed: ", Style::default().fg(Color::Red)),
            key("x"),
            Span::raw(" confirm  "),
            key("esc"),
            Span::raw(" cancel"),
        ])
    } else {
        Line::from(vec![
            key("x"),
            Span::raw(" self-destruct  "),
            key("u"),
            Span::raw(" release control"),
        ])
    });
    bordered(frame, area, "Equipment", lines);
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &UiState, screen: &DroneScreen) {
    match screen {
        DroneScreen::Busy { message, time_left } => bordered(
            frame,
            area,
            "Busy",
            vec![Line::from(message.clone()), Line::from(time_left.clone())],
        ),
        DroneScreen::TravelInProgress {
            time_left,
            progress,
        } => {
            let mut lines = vec![Line::from(format!("Time left: {time_left}"))];
            if let Some(progress) = progress {
                lines.push(Line::from(format!("{:.0}% of the route", progress * 100.0)));
            }
            bordered(frame, area, "Travel in progress", lines);
        }
        DroneScreen::PlanningTravel(planning) => draw_planning(frame, area, state, planning),
        DroneScreen::Exploration(None) => bordered(
            frame,
            area,
            "Exploration",
            vec![Line::from("Awaiting site report.")],
        ),
        DroneScreen::Exploration(Some(site)) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    site.site_name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(site.coordinates.clone()),
                Line::from(site.description.clone()),
                Line::from(""),
            ];
            for (index, event) in site.events.iter().enumerate() {
                lines.push(row(index == state.cursor, event.label.clone()));
            }
            lines.push(Line::from(vec![
                key("enter"),
                Span::raw(" investigate  "),
                key("e"),
                Span::raw(" explore  "),
                key("p"),
                Span::raw(" travel"),
            ]));
            bordered(frame, area, "Exploration", lines);
        }
        DroneScreen::Event(event) => {
            let mut lines = vec![
                Line::from(format!("[{}]", event.image)),
                Line::from(event.description.clone()),
                Line::from(""),
            ];
            let action_style = if event.action_enabled {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut keys = vec![
                Span::styled("enter", action_style),
                Span::raw(format!(" {}", event.action_label)),
            ];
            if let Some(skip) = &event.skip_label {
                keys.extend([Span::raw("  "), key("i"), Span::raw(format!(" {skip}"))]);
            }
            lines.push(Line::from(keys));
            bordered(frame, area, "Event", lines);
        }
        DroneScreen::Adventure(None) => bordered(
            frame,
            area,
            "Adventure",
            vec![Line::from("Awaiting adventure state.")],
        ),
        DroneScreen::Adventure(Some(node)) => {
            let image = match &node.image {
                ImageSource::Raw(_) => "[inline image]".to_string(),
                ImageSource::Asset(name) => format!("[{name}]"),
            };
            let mut lines = vec![
                Line::from(image),
                Line::from(node.description.clone()),
                Line::from(""),
            ];
            for (index, choice) in node.choices.iter().enumerate() {
                lines.push(row(index == state.cursor, choice.text.clone()));
            }
            bordered(frame, area, "Adventure", lines);
        }
    }
}

fn draw_planning(frame: &mut Frame, area: Rect, state: &UiState, planning: &TravelPlanningScreen) {
    let mut lines: Vec<Line> = Vec::new();
    if planning.no_destinations {
        lines.push(Line::from(Span::styled(
            "No known sites. Explore to reveal more.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (index, entry) in planning.destinations.iter().enumerate() {
        let mut text = format!("{}  ETA {}", entry.title, entry.eta);
        if let Some(coordinates) = &entry.coordinates {
            text.push_str(&format!("  @ {coordinates}"));
        }
        lines.push(row(index == state.cursor, text));
        if !entry.bands.is_empty() {
            let bands: Vec<String> = entry
                .bands
                .iter()
                .map(|band| format!("{} {}", band.label, band.value))
                .collect();
            lines.push(Line::from(format!("    {}", bands.join(", "))));
        }
    }
    let launch_style = if planning.launch.enabled {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red)
    };
    let mut keys = vec![
        key("enter"),
        Span::raw(" "),
        Span::styled(planning.launch.label.clone(), launch_style),
    ];
    if planning.cancellable {
        keys.extend([Span::raw("  "), key("esc"), Span::raw(" back")]);
    }
    lines.push(Line::from(keys));
    bordered(frame, area, "Travel", lines);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &UiState) {
    let line = match &state.status {
        Some(reason) => Line::from(Span::styled(reason.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    };
    bordered(frame, area, "Status", vec![line]);
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    bordered(frame, area, "Logs", lines);
}
