//! Date patterns in the `yyyy/MM/dd HH:mm` style.
//!
//! Letters repeat to select width or text form: `yyyy`/`yy`, `M`/`MM`/
//! `MMM`/`MMMM`, `d`/`dd`, `D` (day of year), `E`..`EEEE`, `a`, `H`/`HH`,
//! `h`/`hh`, `m`/`mm`, `s`/`ss`, `S..` (fraction), and `X`/`XXX`/`Z` for the
//! offset of zoned values. Text in single quotes is literal, `''` is a quote.
//! Month and weekday names are English.

use std::fmt::Write;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The fields a pattern can draw from.
#[derive(Copy, Clone, Debug)]
pub(crate) struct DateParts {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub offset: Option<FixedOffset>,
}

pub(crate) fn format_pattern(parts: &DateParts, pattern: &str) -> Result<String, String> {
    let mut out = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let Some(close) = chars[i + 1..].iter().position(|&q| q == '\'') else {
                return Err(format!("Unterminated quote in date pattern \"{pattern}\"."));
            };
            out.extend(&chars[i + 1..i + 1 + close]);
            i += close + 2;
            continue;
        }
        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let mut count = 1;
        while chars.get(i + count) == Some(&c) {
            count += 1;
        }
        field(&mut out, parts, c, count)?;
        i += count;
    }
    Ok(out)
}

fn field(out: &mut String, parts: &DateParts, letter: char, count: usize) -> Result<(), String> {
    let date = parts.date;
    let time = || {
        parts
            .time
            .ok_or_else(|| format!("Pattern letter '{letter}' needs a time of day."))
    };
    let offset = || {
        parts
            .offset
            .ok_or_else(|| format!("Pattern letter '{letter}' needs a zone offset."))
    };

    match letter {
        'y' | 'u' => {
            if count == 2 {
                pad(out, date.year().rem_euclid(100), 2);
            } else {
                pad(out, date.year(), count);
            }
        }
        'M' | 'L' => {
            let month = date.month0() as usize;
            match count {
                1 | 2 => pad(out, date.month(), count),
                3 => out.push_str(&MONTHS[month][..3]),
                _ => out.push_str(MONTHS[month]),
            }
        }
        'd' => pad(out, date.day(), count),
        'D' => pad(out, date.ordinal(), count),
        'E' => {
            let day = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
            if count >= 4 {
                out.push_str(day);
            } else {
                out.push_str(&day[..3]);
            }
        }
        'a' => out.push_str(if time()?.hour() < 12 { "AM" } else { "PM" }),
        'H' => pad(out, time()?.hour(), count),
        'k' => pad(out, if time()?.hour() == 0 { 24 } else { time()?.hour() }, count),
        'h' => {
            let hour = time()?.hour() % 12;
            pad(out, if hour == 0 { 12 } else { hour }, count);
        }
        'K' => pad(out, time()?.hour() % 12, count),
        'm' => pad(out, time()?.minute(), count),
        's' => pad(out, time()?.second(), count),
        'S' => {
            let nanos = format!("{:09}", time()?.nanosecond() % 1_000_000_000);
            let digits = count.min(9);
            out.push_str(&nanos[..digits]);
            for _ in digits..count {
                out.push('0');
            }
        }
        'X' | 'x' | 'Z' => write_offset(out, offset()?, letter, count),
        other => return Err(format!("Unknown pattern letter '{other}'.")),
    }
    Ok(())
}

fn pad(out: &mut String, value: impl Into<i64>, width: usize) {
    let value = value.into();
    if value < 0 {
        let _ = write!(out, "-{:0width$}", -value);
    } else {
        let _ = write!(out, "{value:0width$}");
    }
}

fn write_offset(out: &mut String, offset: FixedOffset, letter: char, count: usize) {
    let seconds = offset.local_minus_utc();
    if seconds == 0 && letter == 'X' {
        out.push('Z');
        return;
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let hours = seconds.abs() / 3600;
    let minutes = seconds.abs() % 3600 / 60;
    let _ = match (letter, count) {
        ('Z', _) | (_, 2) => write!(out, "{sign}{hours:02}{minutes:02}"),
        (_, 1) if minutes == 0 => write!(out, "{sign}{hours:02}"),
        (_, 1) => write!(out, "{sign}{hours:02}{minutes:02}"),
        _ => write!(out, "{sign}{hours:02}:{minutes:02}"),
    };
}
