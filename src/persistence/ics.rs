//! iCalendar export: one all-day event per schedule day.

use super::PersistenceResult;
use crate::reference::reference_url;
use crate::schedule::{ScheduleDay, StudyPlan};
use chrono::{Days, NaiveTime, Timelike};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// RFC 5545 limit on line length, in octets, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsOptions {
    /// Time of day for a display reminder on each event.
    pub alarm: Option<NaiveTime>,
    /// Append reference links to each event description.
    pub include_links: bool,
    pub product_id: String,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            alarm: None,
            include_links: true,
            product_id: "-//study-planner//Study Plan//HE".to_string(),
        }
    }
}

impl IcsOptions {
    pub fn with_alarm(mut self, alarm: NaiveTime) -> Self {
        self.alarm = Some(alarm);
        self
    }
}

pub fn render_ics(plan: &StudyPlan, options: &IcsOptions) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", options.product_id),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(&plan.title)),
    ];
    let stamp = format!("{}T000000Z", plan.start.format("%Y%m%d"));
    for (index, day) in plan.days.iter().enumerate() {
        event_lines(&mut lines, plan, day, index, &stamp, options);
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        for physical in fold_line(&line) {
            out.push_str(&physical);
            out.push_str("\r\n");
        }
    }
    out
}

fn event_lines(
    lines: &mut Vec<String>,
    plan: &StudyPlan,
    day: &ScheduleDay,
    index: usize,
    stamp: &str,
    options: &IcsOptions,
) {
    let start = day.date.format("%Y%m%d");
    let end = day
        .date
        .checked_add_days(Days::new(1))
        .unwrap_or(day.date)
        .format("%Y%m%d");

    let mut description = day.description.clone();
    if options.include_links {
        for reference in &day.references {
            description.push('\n');
            description.push_str(&reference_url(reference));
        }
    }

    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{start}-{index}@study-planner"));
    lines.push(format!("DTSTAMP:{stamp}"));
    lines.push(format!("DTSTART;VALUE=DATE:{start}"));
    lines.push(format!("DTEND;VALUE=DATE:{end}"));
    lines.push(format!("SUMMARY:{}", escape_text(&plan.title)));
    lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
    lines.push("TRANSP:TRANSPARENT".to_string());
    if let Some(alarm) = options.alarm {
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push(format!("TRIGGER:PT{}M", alarm.hour() * 60 + alarm.minute()));
        lines.push(format!("DESCRIPTION:{}", escape_text(&day.description)));
        lines.push("END:VALARM".to_string());
    }
    lines.push("END:VEVENT".to_string());
}

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Split a content line into physical lines of at most 75 octets, never
/// breaking a UTF-8 sequence. Continuation lines start with a space.
pub fn fold_line(line: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        if current.len() + c.len_utf8() > MAX_LINE_OCTETS {
            lines.push(std::mem::take(&mut current));
            current.push(' ');
        }
        current.push(c);
    }
    lines.push(current);
    lines
}

pub fn write_ics<W: Write>(
    plan: &StudyPlan,
    options: &IcsOptions,
    mut writer: W,
) -> PersistenceResult<()> {
    writer.write_all(render_ics(plan, options).as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn save_plan_to_ics<P: AsRef<Path>>(
    plan: &StudyPlan,
    path: P,
    options: &IcsOptions,
) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    write_ics(plan, options, BufWriter::new(file))?;
    info!(path = %path.as_ref().display(), events = plan.days.len(), "saved calendar file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_line_respects_octet_limit_and_char_boundaries() {
        let line = format!("DESCRIPTION:{}", "ברכות ".repeat(20));
        let folded = fold_line(&line);
        assert!(folded.len() > 1);
        for physical in &folded {
            assert!(physical.len() <= MAX_LINE_OCTETS);
        }
        for continuation in &folded[1..] {
            assert!(continuation.starts_with(' '));
        }
        let joined: String = folded
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { l.as_str() } else { &l[1..] })
            .collect();
        assert_eq!(joined, line);
    }

    #[test]
    fn escape_text_handles_separators() {
        assert_eq!(escape_text("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
    }
}
