//! Compilation options
//!
//! `ModeFlags` selects the matching options every compiled pattern is
//! prefixed with; `Options` bundles them with the nesting limit used while
//! inlining sub-expressions.

/// Default limit on nested sub-expression references
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Mode flags applied to every compiled pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    /// Case insensitive matching (i)
    pub case_insensitive: bool,
    /// Multiline mode - ^ and $ match line boundaries (m)
    pub multiline: bool,
    /// Dot matches newline (s)
    pub dotall: bool,
    /// Unicode-aware classes and case folding (u)
    pub unicode: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        ModeFlags {
            case_insensitive: true,
            multiline: false,
            dotall: true,
            unicode: true,
        }
    }
}

impl ModeFlags {
    /// Flags with every option disabled
    pub fn none() -> Self {
        ModeFlags {
            case_insensitive: false,
            multiline: false,
            dotall: false,
            unicode: false,
        }
    }

    /// Parse mode flags from a string like "imsu"
    ///
    /// Unknown characters are ignored.
    pub fn from_string(flags: &str) -> Self {
        let mut mode = ModeFlags::none();
        for c in flags.chars() {
            match c {
                'i' => mode.case_insensitive = true,
                'm' => mode.multiline = true,
                's' => mode.dotall = true,
                'u' => mode.unicode = true,
                _ => {}
            }
        }
        mode
    }

    /// Merge with another set of flags
    pub fn merge(&mut self, other: &ModeFlags) {
        self.case_insensitive = self.case_insensitive || other.case_insensitive;
        self.multiline = self.multiline || other.multiline;
        self.dotall = self.dotall || other.dotall;
        self.unicode = self.unicode || other.unicode;
    }

    /// The enabled flags as letters, in "imsu" order
    pub fn letters(&self) -> String {
        [
            (self.case_insensitive, 'i'),
            (self.multiline, 'm'),
            (self.dotall, 's'),
            (self.unicode, 'u'),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|&(_, c)| c)
        .collect()
    }

    /// The inline flag group prepended to compiled patterns
    ///
    /// Empty when no flag is enabled.
    pub fn prefix(&self) -> String {
        let letters = self.letters();
        if letters.is_empty() {
            String::new()
        } else {
            format!("(?{})", letters)
        }
    }
}

/// Options shared by every expression compiled against a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Matching options for compiled patterns
    pub flags: ModeFlags,
    /// Maximum depth of nested sub-expression references
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            flags: ModeFlags::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Replace the mode flags
    pub fn with_flags(mut self, flags: ModeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
