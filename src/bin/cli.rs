use chrono::{NaiveDate, NaiveTime};
use std::io::{self, Write};
use study_planner::calendar::parse_weekday;
use study_planner::hebrew_date::weekday_name;
use study_planner::persistence::{
    IcsOptions, PlanSnapshot, load_calendar_config, load_tractate_map, load_tree_from_json,
    save_bookmark_html, save_calendar_config, save_plan_to_csv, save_plan_to_ics,
    save_plan_to_json,
};
use study_planner::schedule::{projected_finish, required_daily_pace};
use study_planner::summary::{file_name, summary_label};
use study_planner::tree::{display_path, parse_path};
use study_planner::{
    ContentTree, CountingMode, HebrewDate, PlanMetadata, PlanRequest, ReferenceBuilder,
    StudyCalendar, StudyPlan, StudyPlanner, TractateMap,
};

const TREE_ENV: &str = "STUDY_PLANNER_TREE";
const TRACTATES_ENV: &str = "STUDY_PLANNER_TRACTATES";

#[derive(Default)]
struct Session {
    tree: Option<ContentTree>,
    tractates: TractateMap,
    selection: Vec<String>,
    mode: Option<CountingMode>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    pace: Option<i64>,
    alarm: Option<NaiveTime>,
    calendar: StudyCalendar,
    last_plan: Option<StudyPlan>,
}

impl Session {
    fn request(&self) -> Result<PlanRequest, String> {
        let mode = self.mode.ok_or("No counting mode. Use: mode <chapters|units|pages|leaves>")?;
        let start = self.start.ok_or("No start date. Use: start <YYYY-MM-DD>")?;
        if self.selection.is_empty() {
            return Err("Nothing selected. Use: select <path>".to_string());
        }
        match (self.pace, self.end) {
            (Some(pace), _) => Ok(PlanRequest::fixed_pace(self.selection.clone(), mode, start, pace)),
            (None, Some(end)) if end < start => {
                Err("Start date is after the end date.".to_string())
            }
            (None, Some(end)) => Ok(PlanRequest::until(self.selection.clone(), mode, start, end)),
            (None, None) => Err("Set an end date (end) or a daily pace (pace).".to_string()),
        }
    }

    fn build_plan(&self) -> Result<StudyPlan, String> {
        let tree = self.tree.as_ref().ok_or("No content tree loaded. Use: load <file>")?;
        let request = self.request()?;
        let references = ReferenceBuilder::new(tree, &self.tractates);
        StudyPlanner::new(tree, &self.calendar)
            .with_references(references)
            .plan(&request)
            .map_err(|e| format!("Error: {e}"))
    }

    fn label(&self, plan: &StudyPlan) -> String {
        match &self.tree {
            Some(tree) => summary_label(&self.selection, tree, plan.start, plan.finish),
            None => plan.title.clone(),
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <tree.json> [tractates.json]  Load a content tree (and tractate map)\n  tractates <file>                   Load the tractate name map\n  search <text>                      List tree paths containing text\n  select <path>                      Add a path (parts separated by /)\n  clear                              Clear the selection\n  show                               Show current settings\n  modes                              Counting modes available for the selection\n  mode <chapters|units|pages|leaves> Set counting mode\n  start <YYYY-MM-DD>                 Set start date\n  end <YYYY-MM-DD>                   Finish by date (clears pace)\n  pace <n>                           Fixed units per day (clears end)\n  exclude <day...>|none              Weekdays without study (e.g. Sat Fri)\n  holidays <on|off>                  Skip holidays\n  alarm <HH:MM>|off                  Reminder time for calendar export\n  length                             Total length and pace preview\n  plan                               Build and print the plan\n  label                              Summary label for output names\n  hebrew <YYYY-MM-DD>                Hebrew date and holiday of a day\n  save <ics|json|csv|html> [path]    Export the last plan\n  calendar show|set <file>|save <file>\n                                     Study calendar settings\n  quit|exit                          Exit"
    );
}

fn print_plan(plan: &StudyPlan) {
    if let Some(notice) = plan.notice {
        println!("Empty plan: {notice}");
        return;
    }
    println!("{} ({} units, {} days)", plan.title, plan.total_units, plan.days.len());
    for day in &plan.days {
        let hebrew = HebrewDate::from_gregorian(day.date);
        print!("{}  {}  {}", day.date, hebrew, day.description);
        if !day.references.is_empty() {
            print!("  [{}]", day.references.join(" | "));
        }
        println!();
    }
    println!("Finish: {}", plan.finish);
}

fn load_tree(session: &mut Session, path: &str) {
    match load_tree_from_json(path) {
        Ok(tree) => {
            println!("Loaded {} top-level entries.", tree.top_level().len());
            session.tree = Some(tree);
            session.selection.clear();
            session.last_plan = None;
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn load_tractates(session: &mut Session, path: &str) {
    match load_tractate_map(path) {
        Ok(map) => {
            println!("Loaded {} tractate names.", map.len());
            session.tractates = map;
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn save(session: &Session, format: &str, path: Option<&str>) -> Result<String, String> {
    let plan = session
        .last_plan
        .as_ref()
        .ok_or("No plan yet. Use: plan")?;
    if plan.is_empty() {
        return Err("The last plan is empty; nothing to export.".to_string());
    }
    let path = match path {
        Some(path) => path.to_string(),
        None => file_name(&session.label(plan), format),
    };
    let result = match format {
        "ics" => {
            let options = IcsOptions {
                alarm: session.alarm,
                ..IcsOptions::default()
            };
            save_plan_to_ics(plan, &path, &options)
        }
        "json" => {
            let metadata = PlanMetadata::for_plan(plan, &session.selection, session.label(plan));
            save_plan_to_json(&PlanSnapshot::new(metadata, plan.clone()), &path)
        }
        "csv" => save_plan_to_csv(plan, &path),
        "html" => save_bookmark_html(plan, &path),
        other => return Err(format!("Unknown format '{other}' (ics|json|csv|html)")),
    };
    result.map(|_| path).map_err(|e| format!("Error: {e}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut session = Session::default();
    if let Ok(path) = std::env::var(TREE_ENV) {
        load_tree(&mut session, &path);
    }
    if let Ok(path) = std::env::var(TRACTATES_ENV) {
        load_tractates(&mut session, &path);
    }

    println!("Study Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => match (parts.next(), parts.next()) {
                (Some(tree_path), tractates) => {
                    load_tree(&mut session, tree_path);
                    if let Some(path) = tractates {
                        load_tractates(&mut session, path);
                    }
                }
                _ => println!("Usage: load <tree.json> [tractates.json]"),
            },
            "tractates" => match parts.next() {
                Some(path) => load_tractates(&mut session, path),
                None => println!("Usage: tractates <file>"),
            },
            "search" => {
                let Some(tree) = session.tree.as_ref() else {
                    println!("No content tree loaded.");
                    continue;
                };
                let found = tree.search(rest);
                if found.is_empty() {
                    println!("No matches.");
                }
                for path in found {
                    println!("  {path}");
                }
            }
            "select" => {
                let Some(tree) = session.tree.as_ref() else {
                    println!("No content tree loaded.");
                    continue;
                };
                if rest.is_empty() {
                    println!("Usage: select <path>");
                    continue;
                }
                match tree.node_at_path(rest) {
                    Some(_) => {
                        let path = display_path(&parse_path(rest));
                        println!("Selected: {path}");
                        session.selection.push(path);
                    }
                    None => println!("Path not found: {rest}"),
                }
            }
            "clear" => {
                session.selection.clear();
                println!("Selection cleared.");
            }
            "show" => {
                println!("Selection:");
                for path in &session.selection {
                    println!("  {path}");
                }
                println!("Mode: {}", session.mode.map_or("-".to_string(), |m| m.to_string()));
                println!("Start: {}", session.start.map_or("-".to_string(), |d| d.to_string()));
                match session.pace {
                    Some(pace) => println!("Pace: {pace} per day"),
                    None => println!("End: {}", session.end.map_or("-".to_string(), |d| d.to_string())),
                }
                let mut excluded: Vec<_> = session.calendar.excluded_weekdays().iter().copied().collect();
                excluded.sort_by_key(|d| d.num_days_from_sunday());
                let names: Vec<&str> = excluded.into_iter().map(weekday_name).collect();
                println!("Excluded days: {}", if names.is_empty() { "-".to_string() } else { names.join(", ") });
                println!("Skip holidays: {}", session.calendar.skip_holidays());
            }
            "modes" => {
                let Some(tree) = session.tree.as_ref() else {
                    println!("No content tree loaded.");
                    continue;
                };
                let modes = tree.available_modes(&session.selection);
                if modes.is_empty() {
                    println!("No counting mode applies to the selection.");
                }
                for mode in modes {
                    println!("  {} ({})", mode, mode.hebrew_name());
                }
            }
            "mode" => match rest.parse::<CountingMode>() {
                Ok(mode) => {
                    session.mode = Some(mode);
                    println!("Mode set: {mode}");
                }
                Err(e) => println!("{e}"),
            },
            "start" | "end" => match parse_date(rest) {
                Some(date) => {
                    if cmd == "start" {
                        session.start = Some(date);
                    } else {
                        session.end = Some(date);
                        session.pace = None;
                    }
                    println!("{cmd} set: {date} ({})", HebrewDate::from_gregorian(date));
                }
                None => println!("Invalid date (YYYY-MM-DD)"),
            },
            "pace" => match rest.parse::<i64>() {
                Ok(pace) if pace > 0 => {
                    session.pace = Some(pace);
                    session.end = None;
                    println!("Pace set: {pace} per day");
                }
                _ => println!("Pace must be a positive whole number"),
            },
            "exclude" => {
                if rest == "none" {
                    session.calendar.set_excluded_weekdays(Vec::new());
                    println!("No excluded weekdays.");
                    continue;
                }
                let parsed: Option<Vec<_>> = parts.map(parse_weekday).collect();
                match parsed {
                    Some(days) if !days.is_empty() => {
                        session.calendar.set_excluded_weekdays(days);
                        println!("Excluded weekdays updated.");
                    }
                    _ => println!("Usage: exclude <day...>|none (e.g. Sat, שבת)"),
                }
            }
            "holidays" => match rest {
                "on" => {
                    session.calendar.set_skip_holidays(true);
                    println!("Holidays skipped.");
                }
                "off" => {
                    session.calendar.set_skip_holidays(false);
                    println!("Holidays are study days.");
                }
                _ => println!("Usage: holidays <on|off>"),
            },
            "alarm" => {
                if rest == "off" {
                    session.alarm = None;
                    println!("Alarm off.");
                } else {
                    match NaiveTime::parse_from_str(rest, "%H:%M") {
                        Ok(time) => {
                            session.alarm = Some(time);
                            println!("Alarm set: {}", time.format("%H:%M"));
                        }
                        Err(_) => println!("Invalid time (HH:MM)"),
                    }
                }
            }
            "length" => {
                let (Some(tree), Some(mode)) = (session.tree.as_ref(), session.mode) else {
                    println!("Load a tree and set a mode first.");
                    continue;
                };
                let total = tree.aggregate_length(&session.selection, mode);
                println!("Total: {total} {}", mode.hebrew_name());
                match (session.start, session.pace, session.end) {
                    (Some(start), Some(pace), _) => {
                        match projected_finish(start, total, pace, &session.calendar) {
                            Ok(finish) => println!("Projected finish: {finish}"),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    (Some(start), None, Some(end)) => {
                        match required_daily_pace(total, start, end, &session.calendar) {
                            Some(pace) => println!("Daily pace: {pace:.2}"),
                            None => println!("No study days in range."),
                        }
                    }
                    _ => {}
                }
            }
            "plan" => match session.build_plan() {
                Ok(plan) => {
                    print_plan(&plan);
                    session.last_plan = Some(plan);
                }
                Err(e) => println!("{e}"),
            },
            "label" => match session.last_plan.as_ref() {
                Some(plan) => println!("{}", session.label(plan)),
                None => println!("No plan yet. Use: plan"),
            },
            "hebrew" => match parse_date(rest) {
                Some(date) => {
                    let hebrew = HebrewDate::from_gregorian(date);
                    match session.calendar.holidays().holiday_on(date) {
                        Some(obs) => println!("{hebrew} ({})", obs.name),
                        None => println!("{hebrew}"),
                    }
                }
                None => println!("Invalid date (YYYY-MM-DD)"),
            },
            "save" => match parts.next() {
                Some(format) => match save(&session, format, parts.next()) {
                    Ok(path) => println!("Saved: {path}"),
                    Err(e) => println!("{e}"),
                },
                None => println!("Usage: save <ics|json|csv|html> [path]"),
            },
            "calendar" => match (parts.next(), parts.next()) {
                (Some("show"), _) => match serde_json::to_string_pretty(&session.calendar.to_config()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {e}"),
                },
                (Some("set"), Some(path)) => match load_calendar_config(path) {
                    Ok(config) => {
                        session.calendar = StudyCalendar::from_config(&config);
                        println!("Calendar loaded.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                (Some("save"), Some(path)) => {
                    match save_calendar_config(&session.calendar.to_config(), path) {
                        Ok(()) => println!("Calendar saved: {path}"),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: calendar show|set <file>|save <file>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
