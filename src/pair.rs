//! src/pair.rs
use std::fmt;

/// Two independently typed values held side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pair<L, R> {
    left: L,
    right: R,
}

impl<L, R> Pair<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Pair { left, right }
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut L {
        &mut self.left
    }

    pub fn set(&mut self, left: L, right: R) {
        self.left = left;
        self.right = right;
    }

    pub fn set_left(&mut self, left: L) {
        self.left = left;
    }

    pub fn set_right(&mut self, right: R) {
        self.right = right;
    }

    pub fn into_inner(self) -> (L, R) {
        (self.left, self.right)
    }
}

impl<L, R> From<(L, R)> for Pair<L, R> {
    fn from((left, right): (L, R)) -> Self {
        Pair::new(left, right)
    }
}

impl<L: fmt::Display, R: fmt::Display> fmt::Display for Pair<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::Pair;

    #[test]
    fn default_pair_holds_empty_values() {
        let pair: Pair<String, u32> = Pair::default();
        assert_eq!(pair.left(), "");
        assert_eq!(*pair.right(), 0);
    }

    #[test]
    fn setters_replace_each_slot_independently() {
        let mut pair = Pair::new("a".to_string(), 1u32);
        pair.set_right(7);
        assert_eq!(pair, Pair::new("a".to_string(), 7));

        pair.set_left("b".to_string());
        assert_eq!(pair.left(), "b");

        pair.set("c".to_string(), 9);
        assert_eq!(pair.into_inner(), ("c".to_string(), 9));
    }

    #[test]
    fn displays_as_parenthesised_tuple() {
        let pair = Pair::from(("LA010189-0001", 42));
        assert_eq!(pair.to_string(), "(LA010189-0001, 42)");
    }
}
