use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};

use oddbet::analysis_export;
use oddbet::betting::betting_recommendations;
use oddbet::config::EngineConfig;
use oddbet::fake_feed;
use oddbet::metrics::{head_to_head, league_insights, season_summary, team_metrics};
use oddbet::state::{ActionOutcome, MatchResult, SeasonState, SessionAction, apply_action};
use oddbet::streaks::{counter_alerts, counter_board, AlertLevel};
use oddbet::teams::{Team, TEAM_COUNT};
use oddbet::win_prob::predict_outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Counters,
    Predictor,
}

struct App {
    state: SeasonState,
    screen: Screen,
    paste_path: Option<PathBuf>,
    export_dir: PathBuf,
    demo_week: u32,
    home_idx: usize,
    away_idx: usize,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(config: EngineConfig, paste_path: Option<PathBuf>) -> Self {
        let export_dir = env::var("ODDBET_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Self {
            state: SeasonState::new(config),
            screen: Screen::Dashboard,
            paste_path,
            export_dir,
            demo_week: 1,
            home_idx: 0,
            away_idx: 1,
            help_overlay: false,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.screen = match self.screen {
                    Screen::Dashboard => Screen::Counters,
                    Screen::Counters => Screen::Predictor,
                    Screen::Predictor => Screen::Dashboard,
                }
            }
            KeyCode::Char('p') => self.ingest_paste_file(),
            KeyCode::Char('g') => self.ingest_demo_round(),
            KeyCode::Char('r') => {
                apply_action(&mut self.state, SessionAction::ManualReset);
            }
            KeyCode::Char('c') => {
                apply_action(&mut self.state, SessionAction::ClearAll);
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.home_idx = (self.home_idx + 1) % TEAM_COUNT
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.home_idx = (self.home_idx + TEAM_COUNT - 1) % TEAM_COUNT
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.away_idx = (self.away_idx + 1) % TEAM_COUNT
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.away_idx = (self.away_idx + TEAM_COUNT - 1) % TEAM_COUNT
            }
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn ingest_paste_file(&mut self) {
        let Some(path) = self.paste_path.clone() else {
            self.log("[INFO] No paste file given on the command line");
            return;
        };
        match fs::read_to_string(&path) {
            Ok(text) => self.ingest(text),
            Err(err) => self.log(format!("[WARN] Cannot read {}: {err}", path.display())),
        }
    }

    fn ingest_demo_round(&mut self) {
        let text = fake_feed::generate_round(&mut rand::thread_rng(), self.demo_week);
        self.demo_week += 1;
        self.ingest(text);
    }

    fn ingest(&mut self, text: String) {
        if let ActionOutcome::Ingested(report) =
            apply_action(&mut self.state, SessionAction::IngestText(text))
        {
            if report.blank_input {
                self.log("[INFO] Paste is empty");
            }
        }
    }

    fn export(&mut self) {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let csv_path = self.export_dir.join(format!("oddbet_matches_{stamp}.csv"));
        let xlsx_path = self.export_dir.join(format!("oddbet_{stamp}.xlsx"));

        match analysis_export::export_history_csv(&csv_path, &self.state) {
            Ok(rows) => self.log(format!(
                "[INFO] Exported {rows} matches to {}",
                csv_path.display()
            )),
            Err(err) => self.log(format!("[WARN] CSV export failed: {err:#}")),
        }
        match analysis_export::export_workbook(&xlsx_path, &self.state) {
            Ok(report) => self.log(format!(
                "[INFO] Workbook {} ({} matches, {} table rows)",
                xlsx_path.display(),
                report.matches,
                report.league_rows
            )),
            Err(err) => self.log(format!("[WARN] Workbook export failed: {err:#}")),
        }
    }

    fn log(&mut self, msg: impl Into<String>) {
        apply_action(&mut self.state, SessionAction::Log(msg.into()));
    }

    fn selected_pair(&self) -> (Team, Team) {
        let teams: Vec<Team> = Team::all().collect();
        (teams[self.home_idx], teams[self.away_idx])
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = EngineConfig::from_env_or_file().unwrap_or_else(|err| {
        eprintln!("warning: {err:#}; using environment/defaults");
        EngineConfig::from_env()
    });
    let paste_path = env::args().nth(1).map(PathBuf::from);

    let mut app = App::new(config, paste_path);
    if app.paste_path.is_some() {
        app.ingest_paste_file();
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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(app))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::Counters => render_counters(frame, chunks[1], &app.state),
        Screen::Predictor => render_predictor(frame, chunks[1], app),
    }

    render_logs(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(app: &App) -> String {
    let (played, cap) = app.state.season_progress();
    let screen = match app.screen {
        Screen::Dashboard => "Dashboard",
        Screen::Counters => "Counters",
        Screen::Predictor => "Predictor",
    };
    format!(
        " ODDBET | {} | {played}/{cap} matches | {} matches logged | {screen}",
        app.state.season_label(),
        app.state.history().len()
    )
}

fn footer_text() -> String {
    "Tab Screen | p Paste file | g Demo round | r Reset season | c Clear all | e Export | j/k Home | h/l Away | ? Help | q Quit".to_string()
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &SeasonState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_league_table(frame, cols[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(9)])
        .split(cols[1]);

    let recent: Vec<Line> = state
        .recent_matches()
        .into_iter()
        .map(|m| {
            let (home_style, away_style) = match m.result {
                MatchResult::HomeWin => (win_style(), loss_style()),
                MatchResult::AwayWin => (loss_style(), win_style()),
                MatchResult::Draw => (draw_style(), draw_style()),
            };
            Line::from(vec![
                Span::styled(format!("{}. {}", m.home_rank, m.home_team), home_style),
                Span::raw(format!(" {}-{} ", m.home_score, m.away_score)),
                Span::styled(format!("{} ({}.)", m.away_team, m.away_rank), away_style),
            ])
        })
        .collect();
    let recent = if recent.is_empty() {
        Paragraph::new("No matches added yet. Press p or g.")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(recent)
    };
    frame.render_widget(
        recent.block(Block::default().title("Recent Matches").borders(Borders::ALL)),
        right[0],
    );

    let mut quick: Vec<String> = Vec::new();
    match season_summary(state) {
        Some(s) => {
            quick.push(format!("Season matches: {}", s.matches));
            quick.push(format!("Avg goals/match: {:.2}", s.avg_goals));
            quick.push(format!("Home/Draw/Away: {}/{}/{}", s.home_wins, s.draws, s.away_wins));
        }
        None => quick.push(format!("All-time matches: {}", state.history().len())),
    }
    if let Some(ins) = league_insights(state).filter(|_| !state.history().is_empty()) {
        quick.push(format!(
            "Best attack: {} ({} GF)",
            ins.best_attack.team, ins.best_attack.goals_for
        ));
        quick.push(format!(
            "Best defense: {} ({} GA)",
            ins.best_defense.team, ins.best_defense.goals_against
        ));
        quick.push(format!(
            "Best GD: {} ({:+})",
            ins.best_goal_difference.team, ins.best_goal_difference.goal_difference
        ));
        quick.push(format!("Leader: {} ({} Pts)", ins.leader.team, ins.leader.points));
    }
    frame.render_widget(
        Paragraph::new(quick.join("\n"))
            .block(Block::default().title("Quick Stats").borders(Borders::ALL)),
        right[1],
    );
}

fn render_league_table(frame: &mut Frame, area: Rect, state: &SeasonState) {
    let header = Row::new(["Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Form"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .league_table()
        .into_iter()
        .map(|r| {
            Row::new(vec![
                r.pos.to_string(),
                r.team.to_string(),
                r.played.to_string(),
                r.won.to_string(),
                r.drawn.to_string(),
                r.lost.to_string(),
                r.goals_for.to_string(),
                r.goals_against.to_string(),
                format!("{:+}", r.goal_difference),
                r.points.to_string(),
                r.form,
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Length(16),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!("{} League Table", state.season_label()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_counters(frame: &mut Frame, area: Rect, state: &SeasonState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(rows[0]);

    let board = counter_board(state);
    let line_for = |home: Team, hs: u32, aw: u32, away: Team, display: &str| {
        format!("{home} {hs} | {away} {aw} - {display}")
    };
    let four: Vec<String> = board
        .iter()
        .map(|r| {
            line_for(r.home_team, r.home_score, r.away_score, r.away_team, &r.four_goal_display)
        })
        .collect();
    let three: Vec<String> = board
        .iter()
        .map(|r| {
            line_for(r.home_team, r.home_score, r.away_score, r.away_team, &r.three_goal_display)
        })
        .collect();
    let summary: Vec<String> = board.iter().map(|r| r.three_goal_home.to_string()).collect();

    frame.render_widget(
        Paragraph::new(four.join("\n"))
            .block(Block::default().title("4-goal counters (latest pairs)").borders(Borders::ALL)),
        cols[0],
    );
    frame.render_widget(
        Paragraph::new(three.join("\n"))
            .block(Block::default().title("3-goal counters (latest pairs)").borders(Borders::ALL)),
        cols[1],
    );
    frame.render_widget(
        Paragraph::new(summary.join("\n"))
            .block(Block::default().title("Home 3-goal").borders(Borders::ALL)),
        cols[2],
    );

    let alerts: Vec<Line> = counter_alerts(state)
        .into_iter()
        .map(|a| {
            let style = match a.level {
                AlertLevel::Critical => {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                }
                AlertLevel::Warning => Style::default().fg(Color::Yellow),
            };
            Line::styled(a.message, style)
        })
        .collect();
    let alerts = if alerts.is_empty() {
        Paragraph::new("No counters above their warning thresholds")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(alerts)
    };
    frame.render_widget(
        alerts.block(Block::default().title("Counter Alerts").borders(Borders::ALL)),
        rows[1],
    );
}

fn render_predictor(frame: &mut Frame, area: Rect, app: &App) {
    let (home, away) = app.selected_pair();
    let state = &app.state;
    let mut lines: Vec<String> = vec![format!("Home: {home}   Away: {away}"), String::new()];

    if home == away {
        lines.push("Please select two different teams".to_string());
    } else {
        let metrics = team_metrics(state);
        let h2h = head_to_head(state, home, away);
        if let (Some(prediction), Some(hm), Some(am)) =
            (predict_outcome(&metrics, home, away), metrics.get(&home), metrics.get(&away))
        {
            lines.push(format!(
                "Home win {:.1}% | Draw {:.1}% | Away win {:.1}%",
                prediction.home_win, prediction.draw, prediction.away_win
            ));
            lines.push(format!(
                "Expected goals {:.2} | Predicted score {} | BTS {:.1}%",
                prediction.expected_goals, prediction.predicted_score, prediction.both_teams_score
            ));
            lines.push(format!(
                "Over 2.5 {:.1}% | Over 3.5 {:.1}% | Over 4.5 {:.1}%",
                prediction.over_2_5, prediction.over_3_5, prediction.over_4_5
            ));
            lines.push(String::new());

            match &h2h {
                Some(h) => {
                    lines.push(format!(
                        "Head to head: {} played | {home} {} - {} draws - {away} {} | avg goals {:.2}",
                        h.total_matches, h.home_wins, h.draws, h.away_wins, h.avg_goals
                    ));
                    lines.push(format!(
                        "  Over 2.5 {:.1}% | Over 3.5 {:.1}% | BTS {:.1}%",
                        h.over_2_5_pct, h.over_3_5_pct, h.both_teams_score_pct
                    ));
                    for m in &h.recent {
                        lines.push(format!(
                            "  {}: {} {}-{} {}",
                            m.season_label, m.home_team, m.home_score, m.away_score, m.away_team
                        ));
                    }
                }
                None => lines.push("Head to head: no previous meetings".to_string()),
            }
            lines.push(String::new());

            let advice = betting_recommendations(home, away, &prediction, hm, am, h2h.as_ref());
            lines.push("Best bets:".to_string());
            for bet in &advice.best_bets {
                lines.push(format!("  {} - {}", bet.market, bet.reason));
            }
            lines.push("Avoid:".to_string());
            for bet in &advice.avoid_bets {
                lines.push(format!("  {bet}"));
            }
            lines.push("Insights:".to_string());
            for insight in &advice.insights {
                lines.push(format!("  {insight}"));
            }
        }
    }

    frame.render_widget(
        Paragraph::new(lines.join("\n"))
            .block(Block::default().title("Match Predictor").borders(Borders::ALL)),
        area,
    );
}

fn render_logs(frame: &mut Frame, area: Rect, state: &SeasonState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.logs.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(skip)
        .map(|line| {
            let style = if line.contains("[WARN]") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(line.clone(), style)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Log").borders(Borders::ALL)),
        area,
    );
}

fn win_style() -> Style {
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
}

fn loss_style() -> Style {
    Style::default().fg(Color::LightRed)
}

fn draw_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Oddbet - Help",
        "",
        "Data:",
        "  p            Parse and add the paste file",
        "  g            Add a generated demo matchweek",
        "  r            Start a new season (keeps history)",
        "  c            Clear all match data",
        "  e            Export matches (CSV) and workbook (XLSX)",
        "",
        "Views:",
        "  Tab          Dashboard / Counters / Predictor",
        "  j/k or ↑/↓   Predictor home team",
        "  h/l or ←/→   Predictor away team",
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

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
