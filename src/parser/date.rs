//! Date-phrase recognition
//!
//! The parser only needs one thing from a date recognizer: given some text,
//! report which spans of it read as dates. [`DateRecognizer`] is that seam;
//! [`NaturalDateRecognizer`] is the built-in English implementation.
//!
//! Recognized phrases (case-insensitive):
//!
//! | Kind | Examples |
//! |------|----------|
//! | Day words | `today`, `tomorrow`, `tmr`, `yesterday`, `tonight` |
//! | Weekdays | `fri`, `friday`, `this friday`, `next fri`, `last monday` |
//! | Offsets | `next week`, `next month`, `in 3 days`, `in 2 hours` |
//! | Calendar dates | `2026-10-20`, `10/20`, `10/20/2026`, `20 oct`, `oct 20th, 2026` |
//! | Times | `5pm`, `5:30 pm`, `17:00`, `noon`, `midnight`, `at 9am` |
//! | Periods | `morning`, `afternoon`, `evening`, `night`, `this evening` |
//! | Ranges | `<phrase> to <phrase>` (also `till`, `until`, `-`) |

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// One recognized date phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// The matched text, exactly as it appears in the input
    pub text: String,
    /// 1-based character column where the match starts
    pub position: usize,
    /// True when the phrase named no clock time
    pub time_inferred: bool,
    /// One instant, or two for a range
    pub dates: Vec<NaiveDateTime>,
}

/// Finds date phrases in free text
pub trait DateRecognizer {
    /// Returns every date phrase in `text`, left to right, non-overlapping
    fn recognize(&self, text: &str) -> Vec<DateMatch>;
}

impl<R: DateRecognizer + ?Sized> DateRecognizer for &R {
    fn recognize(&self, text: &str) -> Vec<DateMatch> {
        (**self).recognize(text)
    }
}

impl<R: DateRecognizer + ?Sized> DateRecognizer for Box<R> {
    fn recognize(&self, text: &str) -> Vec<DateMatch> {
        (**self).recognize(text)
    }
}

const RANGE_SEPARATORS: [&str; 4] = ["to", "till", "until", "-"];

/// English date recognizer relative to a reference time
///
/// Without a fixed reference the local clock is read on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalDateRecognizer {
    reference: Option<NaiveDateTime>,
}

impl NaturalDateRecognizer {
    /// Creates a recognizer that resolves relative phrases against the local clock
    pub fn new() -> Self {
        Self { reference: None }
    }

    /// Creates a recognizer pinned to a fixed "now"
    pub fn with_reference(now: NaiveDateTime) -> Self {
        Self {
            reference: Some(now),
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.reference
            .unwrap_or_else(|| Local::now().naive_local())
    }
}

impl DateRecognizer for NaturalDateRecognizer {
    fn recognize(&self, text: &str) -> Vec<DateMatch> {
        let now = self.now();
        let tokens = tokenize(text);
        let scanner = Scanner {
            tokens: &tokens,
            now,
        };

        let mut matches = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match scanner.phrase(i) {
                Some((phrase, end)) => {
                    let start_byte = tokens[i].start;
                    let end_byte = tokens[end - 1].end;
                    matches.push(DateMatch {
                        text: text[start_byte..end_byte].to_string(),
                        position: text[..start_byte].chars().count() + 1,
                        time_inferred: phrase.time_inferred(),
                        dates: phrase.resolve(now),
                    });
                    i = end;
                }
                None => i += 1,
            }
        }
        matches
    }
}

/// A whitespace-delimited word with its byte span
#[derive(Debug)]
struct Token {
    start: usize,
    end: usize,
    word: String,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(make_token(text, s, idx));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(make_token(text, s, text.len()));
    }
    tokens
}

fn make_token(text: &str, start: usize, end: usize) -> Token {
    let raw = &text[start..end];
    let word = raw.strip_suffix(',').unwrap_or(raw).to_lowercase();
    Token { start, end, word }
}

/// A single point in a phrase; either half may be missing
#[derive(Debug, Clone, Copy, Default)]
struct Moment {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy)]
enum Phrase {
    Single(Moment),
    Range(Moment, Moment),
}

impl Phrase {
    fn time_inferred(&self) -> bool {
        match self {
            Phrase::Single(m) => m.time.is_none(),
            Phrase::Range(a, b) => a.time.is_none() && b.time.is_none(),
        }
    }

    fn resolve(&self, now: NaiveDateTime) -> Vec<NaiveDateTime> {
        let today = now.date();
        let clock = now.time();

        match *self {
            Phrase::Single(m) => {
                vec![m.date.unwrap_or(today).and_time(m.time.unwrap_or(clock))]
            }
            Phrase::Range(a, b) => {
                let start_day = a.date.or(b.date).unwrap_or(today);
                let end_day = b.date.unwrap_or(start_day);
                let start = start_day.and_time(a.time.unwrap_or(clock));
                let mut end = end_day.and_time(b.time.unwrap_or(clock));

                // "10pm to 2am" runs past midnight
                if b.date.is_none() && end < start {
                    end = end.checked_add_signed(Duration::days(1)).unwrap_or(end);
                }
                vec![start, end]
            }
        }
    }
}

struct Scanner<'a> {
    tokens: &'a [Token],
    now: NaiveDateTime,
}

impl Scanner<'_> {
    fn word(&self, i: usize) -> Option<&str> {
        self.tokens.get(i).map(|t| t.word.as_str())
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// A moment, optionally followed by a range separator and a second moment
    fn phrase(&self, i: usize) -> Option<(Phrase, usize)> {
        let (first, j) = self.moment(i)?;

        if let Some(sep) = self.word(j) {
            if RANGE_SEPARATORS.contains(&sep) {
                if let Some((second, k)) = self.moment(j + 1) {
                    return Some((Phrase::Range(first, second), k));
                }
            }
        }
        Some((Phrase::Single(first), j))
    }

    fn moment(&self, i: usize) -> Option<(Moment, usize)> {
        if let Some(found) = self.offset(i) {
            return Some(found);
        }

        if let Some((date, j)) = self.day(i) {
            let (time, k) = self.time_after(j);
            return Some((
                Moment {
                    date: Some(date),
                    time,
                },
                k,
            ));
        }

        let (time, j) = self.time_at(i)?;
        let day_start = if self.word(j) == Some("on") { j + 1 } else { j };
        match self.day(day_start) {
            Some((date, k)) => Some((
                Moment {
                    date: Some(date),
                    time: Some(time),
                },
                k,
            )),
            None => Some((
                Moment {
                    date: None,
                    time: Some(time),
                },
                j,
            )),
        }
    }

    /// `in N <unit>`
    fn offset(&self, i: usize) -> Option<(Moment, usize)> {
        if self.word(i)? != "in" {
            return None;
        }
        let amount: i64 = self.word(i + 1)?.parse().ok()?;
        let unit = self.word(i + 2)?;
        let unit = unit.strip_suffix('s').unwrap_or(unit);

        // Amounts that leave the calendar yield no date
        let moment = match unit {
            "minute" | "min" => {
                at_instant(self.now.checked_add_signed(Duration::try_minutes(amount)?)?)
            }
            "hour" | "hr" => at_instant(self.now.checked_add_signed(Duration::try_hours(amount)?)?),
            "day" => on_day(self.today().checked_add_signed(Duration::try_days(amount)?)?),
            "week" => on_day(self.today().checked_add_signed(Duration::try_weeks(amount)?)?),
            "month" => on_day(
                self.today()
                    .checked_add_months(Months::new(u32::try_from(amount).ok()?))?,
            ),
            _ => return None,
        };
        Some((moment, i + 3))
    }

    /// A time, optionally introduced by `at`
    fn time_after(&self, j: usize) -> (Option<NaiveTime>, usize) {
        match self.time_at(j) {
            Some((time, k)) => (Some(time), k),
            None => (None, j),
        }
    }

    fn time_at(&self, i: usize) -> Option<(NaiveTime, usize)> {
        if self.word(i)? == "at" {
            return self.time(i + 1);
        }
        self.time(i)
    }

    fn time(&self, i: usize) -> Option<(NaiveTime, usize)> {
        let word = self.word(i)?;

        if let Some(time) = period_time(word) {
            return Some((time, i + 1));
        }

        // "5 pm", "5:30 am"
        if let Some(meridiem) = self.word(i + 1).filter(|w| *w == "am" || *w == "pm") {
            if let Some(time) = parse_clock(&format!("{word}{meridiem}")) {
                return Some((time, i + 2));
            }
        }

        parse_clock(word).map(|time| (time, i + 1))
    }

    fn day(&self, i: usize) -> Option<(NaiveDate, usize)> {
        let today = self.today();
        let word = self.word(i)?;

        match word {
            "today" => return Some((today, i + 1)),
            "tomorrow" | "tmr" | "tmrw" => return Some((today + Duration::days(1), i + 1)),
            "yesterday" => return Some((today - Duration::days(1), i + 1)),
            "this" => {
                let next = self.word(i + 1)?;
                if let Some(weekday) = parse_weekday(next) {
                    return Some((upcoming(today, weekday), i + 2));
                }
                // "this evening": the period is read as the time
                if period_time(next).is_some() {
                    return Some((today, i + 1));
                }
                return None;
            }
            "next" => {
                let next = self.word(i + 1)?;
                let date = match next {
                    "week" => today + Duration::weeks(1),
                    "month" => today.checked_add_months(Months::new(1))?,
                    "year" => today.checked_add_months(Months::new(12))?,
                    other => upcoming(today, parse_weekday(other)?) + Duration::weeks(1),
                };
                return Some((date, i + 2));
            }
            "last" => {
                let weekday = parse_weekday(self.word(i + 1)?)?;
                return Some((previous(today, weekday), i + 2));
            }
            _ => {}
        }

        if let Some(weekday) = parse_weekday(word) {
            return Some((upcoming(today, weekday), i + 1));
        }

        if let Ok(date) = NaiveDate::parse_from_str(word, "%Y-%m-%d") {
            return Some((date, i + 1));
        }

        if let Some(date) = self.slash_date(word) {
            return Some((date, i + 1));
        }

        // "oct 20", "oct 20th, 2026"
        if let Some(month) = parse_month(word) {
            let day = parse_day_of_month(self.word(i + 1)?)?;
            return self.calendar_date(month, day, i + 2);
        }

        // "20 oct", "20th october 2026"
        if let Some(day) = parse_day_of_month(word) {
            let month = parse_month(self.word(i + 1)?)?;
            return self.calendar_date(month, day, i + 2);
        }

        None
    }

    /// Month/day with an optional trailing year token at `j`
    fn calendar_date(&self, month: u32, day: u32, j: usize) -> Option<(NaiveDate, usize)> {
        if let Some(year) = self.word(j).and_then(parse_year) {
            return NaiveDate::from_ymd_opt(year, month, day).map(|d| (d, j + 1));
        }
        self.nearest_future(month, day).map(|d| (d, j))
    }

    /// `M/D` or `M/D/YYYY` (also two-digit years)
    fn slash_date(&self, word: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = word.split('/').collect();
        match parts.as_slice() {
            [m, d] => self.nearest_future(m.parse().ok()?, d.parse().ok()?),
            [m, d, y] => {
                let year = match y.len() {
                    2 => 2000 + y.parse::<i32>().ok()?,
                    4 => y.parse().ok()?,
                    _ => return None,
                };
                NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
            }
            _ => None,
        }
    }

    /// This year's occurrence, or next year's if it already passed
    fn nearest_future(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let today = self.today();
        let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
        match this_year {
            Some(date) if date >= today => Some(date),
            _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
        }
    }
}

fn at_instant(instant: NaiveDateTime) -> Moment {
    Moment {
        date: Some(instant.date()),
        time: Some(instant.time()),
    }
}

fn on_day(date: NaiveDate) -> Moment {
    Moment {
        date: Some(date),
        time: None,
    }
}

/// Next occurrence of `weekday` on or after `from`
fn upcoming(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + Duration::days(i64::from(ahead))
}

/// Most recent occurrence of `weekday` strictly before `from`
fn previous(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let behind = (7 + from.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    let behind = if behind == 0 { 7 } else { behind };
    from - Duration::days(i64::from(behind))
}

fn period_time(word: &str) -> Option<NaiveTime> {
    let (hour, minute) = match word {
        "morning" => (8, 0),
        "noon" | "midday" => (12, 0),
        "afternoon" => (13, 0),
        "evening" => (19, 0),
        "night" | "tonight" => (20, 0),
        "midnight" => (0, 0),
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// `5pm`, `5:30pm`, `17:00`
fn parse_clock(word: &str) -> Option<NaiveTime> {
    let (digits, meridiem) = if let Some(rest) = word.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = word.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (word, None)
    };

    let (hour, minute) = match digits.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        Some(_) => return None,
        // A bare number is only a time with am/pm attached
        None if meridiem.is_some() => (digits.parse::<u32>().ok()?, 0),
        None => return None,
    };

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn parse_month(word: &str) -> Option<u32> {
    let month = match word.trim_end_matches('.') {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// `20`, `20th`, `1st`
fn parse_day_of_month(word: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))
        .unwrap_or(word);
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_year(word: &str) -> Option<i32> {
    if word.len() != 4 {
        return None;
    }
    word.parse().ok()
}
