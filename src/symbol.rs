/// The label of an NFA edge.
///
/// `Epsilon` orders before every character, so epsilon edges come first when the edges of a
/// state are iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// The edge can be taken without consuming input.
    Epsilon,
    /// The edge consumes exactly this character.
    Char(char),
}

impl Symbol {
    /// The text used for epsilon labels in projections.
    pub const EPSILON_LABEL: &'static str = "epsilon";

    /// Returns true for the epsilon label.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Returns the character of a non-epsilon label.
    #[inline]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(*c),
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Char(c)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "{}", Self::EPSILON_LABEL),
            Symbol::Char(c) => write!(f, "{}", c),
        }
    }
}
