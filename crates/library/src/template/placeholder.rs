//! Placeholder resolution and format specs.

use crate::models::ScanFile;
use std::borrow::Cow;
use std::fmt::Write;
use time::Date;

/// The closed set of values a naming template can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// 0-based position in the final order.
    Index,
    /// 1-based position in the final order.
    Page,
    Year,
    Month,
    Day,
    /// Full source path.
    Original,
    Filename,
    Basename,
    Extension,
}

impl Placeholder {
    pub const ALL: [Placeholder; 9] = [
        Self::Index,
        Self::Page,
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Original,
        Self::Filename,
        Self::Basename,
        Self::Extension,
    ];

    /// Name as written between braces.
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Page => "page",
            Self::Year => "yyyy",
            Self::Month => "mm",
            Self::Day => "dd",
            Self::Original => "original",
            Self::Filename => "filename",
            Self::Basename => "basename",
            Self::Extension => "ext",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Index => "position in the final order, starting at 0",
            Self::Page => "position in the final order, starting at 1",
            Self::Year => "current year",
            Self::Month => "current month (1-12)",
            Self::Day => "current day of the month",
            Self::Original => "full path of the scanned file",
            Self::Filename => "file name with extension",
            Self::Basename => "file name without extension",
            Self::Extension => "extension without the leading dot",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Index | Self::Page | Self::Year | Self::Month | Self::Day)
    }

    /// Value of this placeholder for the file at `position` on `date`.
    pub fn resolve(self, file: &ScanFile, position: usize, date: Date) -> Value<'_> {
        match self {
            Self::Index => Value::Integer(position as i64),
            Self::Page => Value::Integer(position as i64 + 1),
            Self::Year => Value::Integer(i64::from(date.year())),
            Self::Month => Value::Integer(i64::from(u8::from(date.month()))),
            Self::Day => Value::Integer(i64::from(date.day())),
            Self::Original => Value::Text(file.path().to_string_lossy()),
            Self::Filename => Value::Text(file.filename()),
            Self::Basename => Value::Text(file.basename()),
            Self::Extension => Value::Text(file.extension()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    Integer(i64),
    Text(Cow<'a, str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}
impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            '^' => Some(Self::Center),
            _ => None,
        }
    }
}

/// Widest padding a field may ask for; no path component is longer.
pub const MAX_WIDTH: usize = 255;

/// `[[fill]align][0][width][type]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    zero: bool,
    width: usize,
    kind: Option<char>,
}

impl FormatSpec {
    /// Parse the part of a field after the colon. `None` if it is malformed,
    /// wider than [`MAX_WIDTH`], or uses features outside of the supported
    /// subset (sign, grouping, precision).
    pub fn parse(spec: &str) -> Option<Self> {
        let mut format = Self::default();
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            format.fill = Some(chars[0]);
            format.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            format.align = Some(align);
            i = 1;
        }
        if chars.get(i) == Some(&'0') {
            format.zero = true;
            i += 1;
        }
        let digits: String = chars[i..].iter().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            format.width = digits.parse().ok().filter(|width| *width <= MAX_WIDTH)?;
            i += digits.len();
        }
        match &chars[i..] {
            [] => {},
            [kind @ ('d' | 'x' | 'X' | 'o' | 'b' | 's')] => format.kind = Some(*kind),
            _ => return None,
        }
        Some(format)
    }

    /// Whether this spec can format the given placeholder.
    pub fn accepts(&self, placeholder: Placeholder) -> bool {
        match (self.kind, placeholder.is_integer()) {
            (None, _) => true,
            (Some('s'), integer) => !integer,
            (Some(_), integer) => integer,
        }
    }

    pub fn render(&self, value: &Value<'_>, out: &mut String) {
        let (body, default_align) = match value {
            Value::Integer(n) => (self.integer(*n), Align::Right),
            Value::Text(s) => (s.to_string(), Align::Left),
        };
        let length = body.chars().count();
        if length >= self.width {
            out.push_str(&body);
            return;
        }
        let (fill, align) = match (self.zero, self.fill, self.align) {
            (_, Some(fill), align) => (fill, align.unwrap_or(default_align)),
            (true, None, align) => ('0', align.unwrap_or(default_align)),
            (false, None, align) => (' ', align.unwrap_or(default_align)),
        };
        let padding = self.width - length;
        let (before, after) = match align {
            Align::Left => (0, padding),
            Align::Right => (padding, 0),
            Align::Center => (padding / 2, padding - padding / 2),
        };
        out.extend(std::iter::repeat_n(fill, before));
        out.push_str(&body);
        out.extend(std::iter::repeat_n(fill, after));
    }

    fn integer(&self, n: i64) -> String {
        let mut body = String::new();
        // Writing to a String cannot fail.
        let _ = match self.kind {
            Some('x') => write!(body, "{n:x}"),
            Some('X') => write!(body, "{n:X}"),
            Some('o') => write!(body, "{n:o}"),
            Some('b') => write!(body, "{n:b}"),
            _ => write!(body, "{n}"),
        };
        body
    }
}
