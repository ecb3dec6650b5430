/// Index bookkeeping for a linear run of cards where exactly one is active.
///
/// Shared by the input wizard (step cards) and the result carousel (movie
/// cards). Moving past either end is inert rather than an error, and there is
/// no wraparound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: usize,
}

/// The pair of positions touched by a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

impl Navigator {
    /// Returns `None` for an empty collection, since no card can be active.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(Self { len, current: 0 })
        }
    }

    /// Starts at the first card already carrying the active marker, or at the
    /// first card when none does.
    pub fn with_active<I>(marks: I) -> Option<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut len = 0;
        let mut start = None;
        for (index, marked) in marks.into_iter().enumerate() {
            if marked && start.is_none() {
                start = Some(index);
            }
            len = index + 1;
        }

        let mut navigator = Self::new(len)?;
        navigator.current = start.unwrap_or(0);
        Some(navigator)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.len
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.current
    }

    pub fn advance(&mut self) -> Option<Transition> {
        if self.is_last() {
            return None;
        }
        let from = self.current;
        self.current += 1;
        Some(Transition {
            from,
            to: self.current,
        })
    }

    pub fn retreat(&mut self) -> Option<Transition> {
        if self.is_first() {
            return None;
        }
        let from = self.current;
        self.current -= 1;
        Some(Transition {
            from,
            to: self.current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_flags(navigator: &Navigator) -> Vec<bool> {
        (0..navigator.len()).map(|i| navigator.is_active(i)).collect()
    }

    #[test]
    fn empty_collection_has_no_navigator() {
        assert!(Navigator::new(0).is_none());
        assert!(Navigator::with_active(Vec::<bool>::new()).is_none());
    }

    #[test]
    fn advancing_to_the_end_then_past_it_is_inert() {
        for len in 1..6 {
            let mut navigator = Navigator::new(len).unwrap();
            for _ in 0..len - 1 {
                assert!(navigator.advance().is_some());
            }
            assert!(navigator.is_last());

            let flags = active_flags(&navigator);
            assert_eq!(flags.iter().filter(|flag| **flag).count(), 1);
            assert!(flags[len - 1]);

            assert_eq!(navigator.advance(), None);
            assert_eq!(navigator.current(), len - 1);
        }
    }

    #[test]
    fn retreat_at_start_is_inert() {
        let mut navigator = Navigator::new(4).unwrap();
        let before = navigator.clone();
        assert_eq!(navigator.retreat(), None);
        assert_eq!(navigator, before);
    }

    #[test]
    fn three_step_walkthrough() {
        let mut navigator = Navigator::new(3).unwrap();
        assert_eq!(navigator.advance(), Some(Transition { from: 0, to: 1 }));
        assert_eq!(navigator.advance(), Some(Transition { from: 1, to: 2 }));
        assert_eq!(navigator.advance(), None);
        assert_eq!(navigator.current(), 2);
        assert_eq!(navigator.retreat(), Some(Transition { from: 2, to: 1 }));
        assert_eq!(navigator.current(), 1);
    }

    #[test]
    fn single_card_never_moves() {
        let mut navigator = Navigator::new(1).unwrap();
        assert!(navigator.is_first() && navigator.is_last());
        assert_eq!(navigator.advance(), None);
        assert_eq!(navigator.retreat(), None);
    }

    #[test]
    fn starts_at_first_premarked_card() {
        let navigator = Navigator::with_active([false, true, true]).unwrap();
        assert_eq!(navigator.current(), 1);
        assert_eq!(navigator.len(), 3);

        let navigator = Navigator::with_active([false, false]).unwrap();
        assert_eq!(navigator.current(), 0);
    }
}
