//! Leading `-flag` extraction

/// Option switches understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `-a`, `-all`: return every row, ignoring `maxrows`
    All,
    /// `-d`, `-delim`: split statements on `@` instead of `;`
    Delim,
    /// `-e`, `-echo`: report each statement after substitution
    Echo,
    /// `-h`, `-help`
    Help,
    /// `-j`: parse the first column of each row as JSON
    PrettyJson,
    /// `-json`: return rows as records
    Json,
    /// `-q`, `-quiet`: suppress messages
    Quiet,
    /// `-r`, `-array`: return rows as arrays with a header row
    Array,
    /// `-t`, `-time`: time the statement
    Time,
    /// `-grid`
    Grid,
    /// `-sampledata`
    SampleData,
}

impl Flag {
    /// Spellings that switch this flag on
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::All => &["-a", "-all"],
            Self::Delim => &["-d", "-delim"],
            Self::Echo => &["-e", "-echo"],
            Self::Help => &["-h", "-help"],
            Self::PrettyJson => &["-j"],
            Self::Json => &["-json"],
            Self::Quiet => &["-q", "-quiet"],
            Self::Array => &["-r", "-array"],
            Self::Time => &["-t", "-time"],
            Self::Grid => &["-grid"],
            Self::SampleData => &["-sampledata"],
        }
    }
}

/// Flags found in front of one top-level input
///
/// Kept in input order; duplicates are allowed and membership is what counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flag: impl Into<String>) {
        self.flags.push(flag.into());
    }

    /// Exact membership test for a raw flag string
    pub fn contains(&self, raw: &str) -> bool {
        self.flags.iter().any(|f| f == raw)
    }

    /// Any alias of `flag` is present
    pub fn is_set(&self, flag: Flag) -> bool {
        flag.aliases().iter().any(|alias| self.contains(alias))
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }
}

/// Strip the leading run of `-flag` tokens from a line
///
/// A flag runs from `-` to the next space. The first character that is
/// neither a space nor part of a flag switches to copy mode: the rest of the
/// line is the residual statement, verbatim. Flags are only recognised as a
/// contiguous prefix.
pub fn extract_flags(line: &str) -> (String, FlagSet) {
    let mut flags = FlagSet::new();
    let mut residual = String::with_capacity(line.len());
    let mut current: Option<String> = None;
    let mut copying = false;

    for ch in line.chars() {
        if copying {
            residual.push(ch);
            continue;
        }

        if ch == ' ' {
            if let Some(flag) = current.take() {
                flags.push(flag);
            }
        } else if let Some(flag) = current.as_mut() {
            flag.push(ch);
        } else if ch == '-' {
            current = Some(String::from('-'));
        } else {
            residual.push(ch);
            copying = true;
        }
    }

    if let Some(flag) = current {
        flags.push(flag);
    }

    (residual, flags)
}
