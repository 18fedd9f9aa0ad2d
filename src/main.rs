use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs};

use ipl_insights::config::{self, AppConfig};
use ipl_insights::dataset::{InMemorySource, MatchSource, SqliteStore};
use ipl_insights::demo_league;
use ipl_insights::state::{AppState, Insights, Mode, ResultTab, Screen, SelectField, tabs_for};

const DEMO_SEED: u64 = 2008;
const DEMO_SEASONS: u32 = 6;

struct App {
    state: AppState,
    source: Box<dyn MatchSource>,
    should_quit: bool,
}

impl App {
    fn new(source: Box<dyn MatchSource>, config: &AppConfig) -> Self {
        let mut logs = Vec::new();
        let teams = source.teams().unwrap_or_else(|err| {
            logs.push(format!("[ERROR] Team list unavailable: {err}"));
            Vec::new()
        });
        let seasons = source.seasons().unwrap_or_else(|err| {
            logs.push(format!("[ERROR] Season list unavailable: {err}"));
            Vec::new()
        });
        let mut state = AppState::new(teams, seasons, &config.default_season);
        for line in logs {
            state.push_log(line);
        }
        Self {
            state,
            source,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('m') => {
                self.state.toggle_mode();
                self.state.screen = Screen::Select;
                let label = match self.state.mode {
                    Mode::HeadToHead => "head-to-head",
                    Mode::SingleTeam => "single team",
                };
                self.state.push_log(format!("[INFO] Mode: {label}"));
            }
            KeyCode::Enter | KeyCode::Char('/') => self.search(),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Select,
            KeyCode::Tab => {
                if self.state.screen == Screen::Select {
                    self.state.cycle_field();
                } else {
                    self.state.next_tab();
                }
            }
            KeyCode::BackTab => self.state.prev_tab(),
            KeyCode::Char('l') | KeyCode::Right => self.state.next_tab(),
            KeyCode::Char('h') | KeyCode::Left => self.state.prev_tab(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('t') => self.state.toggle_side(),
            _ => {}
        }
    }

    fn search(&mut self) {
        let started = Instant::now();
        self.state.search(self.source.as_ref());
        log::info!("search finished in {:?}", started.elapsed());
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let config = AppConfig::from_env();
    let log_path = init_file_logger(config.log_file.as_deref());

    let demo = std::env::args().skip(1).any(|arg| arg == "--demo");
    let db_path = parse_db_path_arg().or_else(|| config.db_path.clone());
    let (source, startup_log) = open_source(demo, db_path.as_deref(), &config);

    let mut app = App::new(source, &config);
    for line in startup_log {
        app.state.push_log(line);
    }
    if let Some(path) = log_path {
        app.state
            .push_log(format!("[INFO] Logging to {}", path.display()));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn open_source(
    demo: bool,
    db_path: Option<&Path>,
    config: &AppConfig,
) -> (Box<dyn MatchSource>, Vec<String>) {
    if demo {
        let league = demo_league::generate(DEMO_SEED, DEMO_SEASONS);
        let line = format!(
            "[INFO] Demo league: {} matches, {} deliveries",
            league.matches.len(),
            league.deliveries.len()
        );
        return (Box::new(league), vec![line]);
    }
    let Some(path) = db_path else {
        return (
            Box::new(InMemorySource::default()),
            vec!["[WARN] No database path resolved; set IPL_DB_PATH or run with --demo".to_string()],
        );
    };
    match SqliteStore::open(path, config.db_timeout) {
        Ok(store) => (
            Box::new(store),
            vec![format!("[INFO] Database: {}", path.display())],
        ),
        Err(err) => (
            Box::new(InMemorySource::default()),
            vec![
                format!("[ERROR] {err}"),
                "[WARN] Falling back to an empty dataset; try --demo".to_string(),
            ],
        ),
    }
}

/// Routes `log` output to a file so it does not draw over the alternate screen.
fn init_file_logger(path: Option<&Path>) -> Option<PathBuf> {
    let path = path?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .ok()?;
    Some(path.to_path_buf())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Select => render_select(frame, chunks[1], &app.state),
        Screen::Results => render_results(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let mode = match state.mode {
        Mode::HeadToHead => "Head-to-head",
        Mode::SingleTeam => "Single team",
    };
    let title = match state.screen {
        Screen::Select => format!("IPL INSIGHTS | {mode} | Select"),
        Screen::Results => format!("IPL INSIGHTS | {mode} | {}", state.tab.label()),
    };
    let line1 = format!("  ( )  {title}");
    let line2 = "  /|\\".to_string();
    let line3 = "   |".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Select => {
            "Tab Field | j/k/↑/↓ Change | m Mode | Enter Search | ? Help | q Quit".to_string()
        }
        Screen::Results => match state.mode {
            Mode::HeadToHead => {
                "h/l/←/→ Tab | j/k Scroll | t Switch side | b/Esc Back | ? Help | q Quit"
                    .to_string()
            }
            Mode::SingleTeam => {
                "h/l/←/→ Tab | j/k Scroll | b/Esc Back | ? Help | q Quit".to_string()
            }
        },
    }
}

fn render_select(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = match state.mode {
        Mode::HeadToHead => vec![
            Constraint::Percentage(38),
            Constraint::Percentage(38),
            Constraint::Percentage(24),
        ],
        Mode::SingleTeam => vec![Constraint::Percentage(70), Constraint::Percentage(30)],
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(area);

    let visible = area.height.saturating_sub(2) as usize;
    let mut panes = vec![(
        "Team 1",
        &state.teams,
        state.team1_idx,
        SelectField::Team1,
    )];
    if state.mode == Mode::HeadToHead {
        panes.push(("Team 2", &state.teams, state.team2_idx, SelectField::Team2));
    }
    panes.push(("Season", &state.seasons, state.season_idx, SelectField::Season));

    for (pane, rect) in panes.into_iter().zip(cols.iter()) {
        let (title, items, selected, field) = pane;
        let focused = state.field == field;
        let (start, end) = visible_range(selected, items.len(), visible);
        let lines: Vec<Line> = items[start..end]
            .iter()
            .enumerate()
            .map(|(offset, item)| {
                let style = if start + offset == selected {
                    let base = Style::default().add_modifier(Modifier::BOLD);
                    if focused {
                        base.bg(Color::DarkGray).fg(Color::Yellow)
                    } else {
                        base.fg(Color::Yellow)
                    }
                } else {
                    Style::default()
                };
                Line::styled(item.clone(), style)
            })
            .collect();
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border);
        frame.render_widget(Paragraph::new(lines).block(block), *rect);
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let tabs = tabs_for(state.mode);
    let selected = tabs.iter().position(|t| *t == state.tab).unwrap_or(0);
    let titles: Vec<&str> = tabs.iter().map(|t| t.label()).collect();
    let tab_bar = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tab_bar, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    let text = state.report_lines().join("\n");
    let report = Paragraph::new(text)
        .scroll((state.scroll, 0))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(report, body[0]);

    let (title, bars) = chart_bars(state);
    if bars.is_empty() {
        let empty = Paragraph::new("Nothing to chart")
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, body[1]);
    } else {
        frame.render_widget(bar_chart(title, &bars), body[1]);
    }
}

fn bar_chart(title: String, bars: &[(String, u64)]) -> BarChart<'static> {
    let palette = [Color::Green, Color::Red, Color::Yellow, Color::Cyan, Color::Magenta];
    let bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(palette[idx % palette.len()]))
        })
        .collect();
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
}

fn short_name(team: &str) -> String {
    team.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

fn chart_bars(state: &AppState) -> (String, Vec<(String, u64)>) {
    let Some(results) = state.results.as_ref() else {
        return (String::new(), Vec::new());
    };
    let n = |v: usize| v as u64;
    match (results, state.tab) {
        (Insights::HeadToHead(h), ResultTab::Overview) => (
            "Results".to_string(),
            vec![
                (short_name(&h.team1), n(h.record.won_by_team1)),
                (short_name(&h.team2), n(h.record.won_by_team2)),
                ("NR".to_string(), n(h.record.drawn)),
            ],
        ),
        (Insights::Team(t), ResultTab::Overview) => (
            "Results".to_string(),
            vec![
                ("Won".to_string(), n(t.record.matches_won.len())),
                ("Lost".to_string(), n(t.record.matches_lost.len())),
            ],
        ),
        (Insights::HeadToHead(h), ResultTab::HomeAway) => {
            let (a, b) = (short_name(&h.team1), short_name(&h.team2));
            (
                "Wins home / away".to_string(),
                vec![
                    (format!("{a} H"), n(h.home_away.team1.home_wins)),
                    (format!("{a} A"), n(h.home_away.team1.away_wins)),
                    (format!("{b} H"), n(h.home_away.team2.home_wins)),
                    (format!("{b} A"), n(h.home_away.team2.away_wins)),
                ],
            )
        }
        (Insights::Team(t), ResultTab::HomeAway) => (
            "Home / away".to_string(),
            vec![
                ("Home W".to_string(), n(t.home_away.home_wins)),
                ("Home L".to_string(), n(t.home_away.home_losses)),
                ("Away W".to_string(), n(t.home_away.away_wins)),
                ("Away L".to_string(), n(t.home_away.away_losses)),
            ],
        ),
        (Insights::HeadToHead(h), ResultTab::Toss) => (
            "Won match after toss".to_string(),
            vec![
                (format!("{} TW", short_name(&h.team1)), n(h.toss_team1.toss_won_match_won)),
                (format!("{} TL", short_name(&h.team1)), n(h.toss_team1.toss_lost_match_won)),
                (format!("{} TW", short_name(&h.team2)), n(h.toss_team2.toss_won_match_won)),
                (format!("{} TL", short_name(&h.team2)), n(h.toss_team2.toss_lost_match_won)),
            ],
        ),
        (Insights::Team(t), ResultTab::Toss) => (
            "Toss outcome".to_string(),
            vec![
                ("TW MW".to_string(), n(t.toss.toss_won_match_won)),
                ("TW ML".to_string(), n(t.toss.toss_won_match_lost())),
                ("TL MW".to_string(), n(t.toss.toss_lost_match_won)),
                ("TL ML".to_string(), n(t.toss.toss_lost_match_lost())),
            ],
        ),
        (Insights::Team(t), ResultTab::Scores) => (
            "Highest score".to_string(),
            t.highest_scores
                .iter()
                .map(|r| (short_scenario(r.scenario.label()), r.score.max(0) as u64))
                .collect(),
        ),
        (Insights::Team(t), ResultTab::Knockouts) => (
            "Knockouts".to_string(),
            vec![
                ("Titles".to_string(), n(t.knockouts.trophies())),
                ("Finals L".to_string(), n(t.knockouts.finals_lost(&t.team).count())),
                ("Other KO".to_string(), n(t.knockouts.non_final_matches.len())),
            ],
        ),
        (Insights::Team(t), ResultTab::Batting) => (
            "Most runs".to_string(),
            t.batting
                .most_runs
                .iter()
                .take(5)
                .map(|r| (r.batter.clone(), r.count as u64))
                .collect(),
        ),
        (Insights::Team(t), ResultTab::Bowling) => (
            "Most wickets".to_string(),
            t.bowling
                .wickets_total
                .iter()
                .take(5)
                .map(|r| (r.bowler.clone(), r.wickets as u64))
                .collect(),
        ),
        (Insights::HeadToHead(_), ResultTab::Batting) => match state.current_side() {
            Some(side) => (
                format!("{} most runs", short_name(&side.team)),
                side.batting
                    .most_runs
                    .iter()
                    .take(5)
                    .map(|r| (r.batter.clone(), r.count as u64))
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        },
        (Insights::HeadToHead(_), ResultTab::Bowling) => match state.current_side() {
            Some(side) => (
                format!("{} most wickets", short_name(&side.team)),
                side.bowling
                    .wickets_total
                    .iter()
                    .take(5)
                    .map(|r| (r.bowler.clone(), r.wickets as u64))
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        },
        (Insights::HeadToHead(_), ResultTab::Scores | ResultTab::Knockouts) => {
            (String::new(), Vec::new())
        }
    }
}

fn short_scenario(label: &str) -> String {
    label
        .split([' ', ','])
        .filter(|w| !w.is_empty())
        .filter_map(|w| w.chars().next())
        .collect::<String>()
        .to_uppercase()
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = state.logs.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(start)
        .map(|line| {
            let color = if line.starts_with("[ERROR]") {
                Color::Red
            } else if line.starts_with("[WARN]") {
                Color::Yellow
            } else {
                Color::Gray
            };
            Line::styled(line.clone(), Style::default().fg(color))
        })
        .collect();
    let console =
        Paragraph::new(lines).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "IPL Insights - Help",
        "",
        "Select:",
        "  Tab          Next field",
        "  j/k or ↑/↓   Change team or season",
        "  m            Head-to-head / single team",
        "  Enter or /   Search",
        "",
        "Results:",
        "  h/l or ←/→   Switch tab",
        "  j/k or ↑/↓   Scroll",
        "  t            Switch side (head-to-head)",
        "  b / Esc      Back to select",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
