use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::model::{Election, ElectionDate};

const UNSCHEDULED: &str = "unscheduled";
const UNTITLED: &str = "Untitled election";
const NO_DATE: &str = "TBD";

/// How an election is progressing, as far as its badge is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCategory {
    Ongoing,
    Upcoming,
    Done,
    /// Anything else the container passes in. Rendered, but unstyled.
    Other(String),
}

impl StatusCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "ongoing" => Self::Ongoing,
            "upcoming" => Self::Upcoming,
            "done" => Self::Done,
            other => Self::Other(other.to_string()),
        }
    }

    /// Derive a category from the election's dates, both ends inclusive.
    /// An election without readable dates is `unscheduled`.
    pub fn classify(election: &Election, today: NaiveDate) -> Self {
        let (Some(start), Some(end)) = (election.start_date(), election.end_date()) else {
            return Self::Other(UNSCHEDULED.to_string());
        };
        if today < start.date() {
            Self::Upcoming
        } else if today > end.date() {
            Self::Done
        } else {
            Self::Ongoing
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Upcoming => "upcoming",
            Self::Done => "done",
            Self::Other(other) => other,
        }
    }

    /// Badge colour; `None` means the badge is left unstyled.
    pub fn color(&self) -> Option<BadgeColor> {
        match self {
            Self::Ongoing => Some(BadgeColor::Green),
            Self::Upcoming => Some(BadgeColor::Blue),
            Self::Done => Some(BadgeColor::Gray),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Blue,
    Gray,
}

impl BadgeColor {
    /// ANSI foreground colour code for terminal output.
    fn ansi(self) -> u8 {
        match self {
            Self::Green => 32,
            Self::Blue => 34,
            Self::Gray => 90,
        }
    }
}

/// A status badge: label plus optional colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<BadgeColor>,
}

impl Badge {
    pub fn for_status(status: &StatusCategory) -> Self {
        let mut chars = status.as_str().chars();
        let text = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            text,
            color: status.color(),
        }
    }
}

/// Render a date the way cards show it, e.g. `Jan 1, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn format_card_date(date: Option<ElectionDate>) -> String {
    date.map_or_else(|| NO_DATE.to_string(), |date| format_date(date.date()))
}

/// Everything a card displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub date_range: String,
    pub badge: Badge,
    pub position_count: usize,
}

impl CardView {
    fn positions_label(&self) -> String {
        match self.position_count {
            1 => "1 position".to_string(),
            n => format!("{n} positions"),
        }
    }

    /// Plain text with the badge coloured for a terminal.
    pub fn to_ansi_string(&self) -> String {
        let badge = match self.badge.color {
            Some(color) => format!("\x1b[{}m[{}]\x1b[0m", color.ansi(), self.badge.text),
            None => format!("[{}]", self.badge.text),
        };
        format!(
            "{} {badge}\n  {}\n  {}",
            self.title,
            self.date_range,
            self.positions_label()
        )
    }
}

impl Display for CardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]\n  {}\n  {}",
            self.title,
            self.badge.text,
            self.date_range,
            self.positions_label()
        )
    }
}

/// A summary card for one election.
///
/// The badge comes from the supplied `status`, never from the dates; the
/// container decides what state the election is in.
pub struct ElectionCard<'a, F> {
    election: &'a Election,
    on_click: F,
    status: StatusCategory,
}

impl<'a, F> ElectionCard<'a, F>
where
    F: FnMut(&Election),
{
    pub fn new(election: &'a Election, on_click: F, status: StatusCategory) -> Self {
        Self {
            election,
            on_click,
            status,
        }
    }

    pub fn render(&self) -> CardView {
        CardView {
            title: self.election.title().unwrap_or(UNTITLED).to_string(),
            date_range: format!(
                "{} - {}",
                format_card_date(self.election.start_date()),
                format_card_date(self.election.end_date())
            ),
            badge: Badge::for_status(&self.status),
            position_count: self.election.position_count(),
        }
    }

    /// The user clicked the card.
    pub fn click(&mut self) {
        (self.on_click)(self.election)
    }
}
