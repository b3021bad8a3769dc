//! A single declared package resource and its line syntax.
use std::fmt;

/// Kind of resource a manifest line declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// Third-party Homebrew repository (`tap`).
    Tap,
    /// Homebrew formula (`brew`).
    Formula,
    /// Homebrew cask (`cask`).
    Cask,
    /// Mac App Store application (`mas`).
    AppStoreApp,
    /// VS Code extension (`vscode`).
    EditorExtension,
}

impl EntryKind {
    /// Every kind, in the order entries are written to a manifest.
    pub const ALL: [Self; 5] = [
        Self::Tap,
        Self::Formula,
        Self::Cask,
        Self::AppStoreApp,
        Self::EditorExtension,
    ];

    /// Manifest keyword introducing this kind.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Formula => "brew",
            Self::Cask => "cask",
            Self::AppStoreApp => "mas",
            Self::EditorExtension => "vscode",
        }
    }

    /// Look up a kind by its manifest keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    /// Plural noun used in summaries.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Tap => "taps",
            Self::Formula => "formulae",
            Self::Cask => "casks",
            Self::AppStoreApp => "app store apps",
            Self::EditorExtension => "editor extensions",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One declared package resource, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// What kind of resource this is.
    pub kind: EntryKind,
    /// Quoted name from the manifest (formula name, tap, app name, extension id).
    pub identifier: String,
    /// Everything after the identifier's trailing comma, e.g. `id: 497799835`.
    pub metadata: Option<String>,
}

/// Identity used to compare declared and installed entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    /// Resource kind.
    pub kind: EntryKind,
    /// Normalized identifier.
    pub name: String,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl Entry {
    /// Create an entry without metadata.
    #[must_use]
    pub fn new(kind: EntryKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            metadata: None,
        }
    }

    /// Attach a metadata suffix.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Parse a manifest line.
    ///
    /// Returns `None` for comments, blanks, and anything that does not start
    /// with a recognized keyword followed by a quoted identifier.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (keyword, rest) = line.split_once(char::is_whitespace)?;
        let kind = EntryKind::from_keyword(keyword)?;

        let rest = rest.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = rest.get(1..)?;
        let end = body.find(quote)?;
        let identifier = body.get(..end)?;
        if identifier.is_empty() {
            return None;
        }

        let tail = body.get(end + 1..).unwrap_or_default().trim();
        let metadata = match tail.strip_prefix(',') {
            Some(meta) => Some(strip_comment(meta).trim().to_string()).filter(|m| !m.is_empty()),
            None if tail.is_empty() || tail.starts_with('#') => None,
            None => return None,
        };

        Some(Self {
            kind,
            identifier: identifier.to_string(),
            metadata,
        })
    }

    /// Identity key: formulae and casks compare on their final path segment
    /// (so tap-qualified names match bare ones); extensions compare
    /// case-insensitively.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        let name = match self.kind {
            EntryKind::Formula | EntryKind::Cask => self
                .identifier
                .rsplit('/')
                .next()
                .unwrap_or(&self.identifier)
                .to_string(),
            EntryKind::EditorExtension => self.identifier.to_lowercase(),
            EntryKind::Tap | EntryKind::AppStoreApp => self.identifier.clone(),
        };
        EntryKey {
            kind: self.kind,
            name,
        }
    }

    /// Tap a tap-qualified formula or cask (`user/repo/name`) depends on.
    #[must_use]
    pub fn required_tap(&self) -> Option<EntryKey> {
        if !matches!(self.kind, EntryKind::Formula | EntryKind::Cask) {
            return None;
        }
        let mut parts = self.identifier.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(user), Some(repo), Some(name), None)
                if !user.is_empty() && !repo.is_empty() && !name.is_empty() =>
            {
                Some(EntryKey {
                    kind: EntryKind::Tap,
                    name: format!("{user}/{repo}"),
                })
            }
            _ => None,
        }
    }

    /// Numeric App Store id from `id: <n>` metadata, if present.
    #[must_use]
    pub fn store_id(&self) -> Option<&str> {
        let meta = self.metadata.as_deref()?;
        meta.split(',').find_map(|part| {
            let value = part.trim().strip_prefix("id:")?.trim();
            value
                .chars()
                .all(|c| c.is_ascii_digit())
                .then_some(value)
                .filter(|v| !v.is_empty())
        })
    }
}

/// Drop a trailing `# comment` that is not inside a quoted string.
fn strip_comment(s: &str) -> &str {
    let mut in_quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (c, in_quote) {
            ('"' | '\'', None) => in_quote = Some(c),
            (c, Some(q)) if c == q => in_quote = None,
            ('#', None) => return s.get(..i).unwrap_or(s),
            _ => {}
        }
    }
    s
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind, self.identifier)?;
        if let Some(meta) = &self.metadata {
            write!(f, ", {meta}")?;
        }
        Ok(())
    }
}
