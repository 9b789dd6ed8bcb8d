macro_rules! impl_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);

        impl $name {
            /// Create a new id.
            #[inline]
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            /// Get the id as usize.
            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0
            }
        }

        impl core::ops::Add<usize> for $name {
            type Output = $name;

            #[inline]
            fn add(self, rhs: usize) -> Self::Output {
                $name(self.0 + rhs)
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name::new(index)
            }
        }
    };
}

impl_id!(
    StateID,
    "The id of an NFA state. Ids are dense and unique within one compilation."
);
impl_id!(
    DfaStateID,
    "The index of a DFA state in the state arena of its `Dfa`."
);

/// Hands out NFA state ids during the construction of one NFA.
///
/// Each independent compilation must use its own generator, either a fresh one or one that was
/// [reset](StateIdGenerator::reset) right before. Sharing a generator between two NFAs that are
/// built at the same time breaks the density of the ids in both of them.
#[derive(Debug, Clone, Default)]
pub struct StateIdGenerator {
    next: usize,
}

impl StateIdGenerator {
    /// Create a generator that starts at id 0.
    pub fn new() -> Self {
        StateIdGenerator::default()
    }

    /// Create a generator that starts at the given id.
    pub fn starting_at(first: usize) -> Self {
        StateIdGenerator { next: first }
    }

    /// Returns the next id and advances the generator.
    pub fn next_id(&mut self) -> StateID {
        let id = StateID::new(self.next);
        self.next += 1;
        id
    }

    /// Restart the generator at id 0.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}
