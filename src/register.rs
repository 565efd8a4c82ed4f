// Current-page register. Single writer (section visibility changes), many readers.
// Last "entered" event wins; leaving a page never moves the register by itself.

use crate::types::PageIndex;

#[derive(Debug, Clone)]
pub struct CurrentPageRegister {
    current: PageIndex,
    page_count: u32,
}

impl CurrentPageRegister {
    pub fn new(page_count: u32) -> Self {
        CurrentPageRegister {
            current: PageIndex::FIRST,
            page_count: page_count.max(1),
        }
    }

    pub fn current(&self) -> PageIndex {
        self.current
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Apply a section visibility change. Returns `true` only when the
    /// current page actually moved. Out-of-range pages are ignored.
    pub fn on_visibility_change(&mut self, page: PageIndex, active: bool) -> bool {
        if !active || page.get() > self.page_count || page == self.current {
            return false;
        }
        tracing::debug!(from = %self.current, to = %page, "current page changed");
        self.current = page;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn page(n: u32) -> PageIndex {
        PageIndex::new(n).unwrap()
    }

    #[test]
    fn starts_on_first_page() {
        assert_eq!(CurrentPageRegister::new(12).current(), PageIndex::FIRST);
    }

    #[test]
    fn entering_sets_current() {
        let mut reg = CurrentPageRegister::new(12);
        assert!(reg.on_visibility_change(page(4), true));
        assert_eq!(reg.current(), page(4));
    }

    #[test]
    fn leaving_does_not_move() {
        let mut reg = CurrentPageRegister::new(12);
        reg.on_visibility_change(page(4), true);
        assert!(!reg.on_visibility_change(page(4), false));
        assert_eq!(reg.current(), page(4));
    }

    #[test]
    fn same_value_is_a_no_op() {
        let mut reg = CurrentPageRegister::new(12);
        reg.on_visibility_change(page(2), true);
        assert!(!reg.on_visibility_change(page(2), true));
    }

    #[test]
    fn later_callback_wins() {
        let mut reg = CurrentPageRegister::new(12);
        reg.on_visibility_change(page(5), true);
        reg.on_visibility_change(page(6), true);
        assert_eq!(reg.current(), page(6));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut reg = CurrentPageRegister::new(3);
        assert!(!reg.on_visibility_change(page(9), true));
        assert_eq!(reg.current(), PageIndex::FIRST);
    }

    proptest! {
        #[test]
        fn register_stays_in_range(
            events in proptest::collection::vec((1u32..20, any::<bool>()), 0..64)
        ) {
            let mut reg = CurrentPageRegister::new(12);
            for (p, active) in events {
                reg.on_visibility_change(page(p), active);
                prop_assert!(reg.current().get() >= 1 && reg.current().get() <= 12);
            }
        }
    }
}
