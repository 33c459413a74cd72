//! Pageable item collections (tracks, devices, sends, scenes)
//!
//! Banks are owned by the host adapter. The core only scrolls them and asks
//! what is in view.

use std::rc::Rc;

/// An addressable item inside a bank
pub trait BankItem {
    /// Position inside the current page
    fn index(&self) -> usize;

    /// Absolute position in the whole collection
    fn position(&self) -> usize;

    fn name(&self) -> String;

    fn does_exist(&self) -> bool;

    fn is_selected(&self) -> bool;

    fn select(&self);
}

/// A pageable, ordered collection of items
pub trait Bank {
    /// Number of items on one page
    fn page_size(&self) -> usize;

    /// Item at `index` on the current page
    fn item(&self, index: usize) -> Option<Rc<dyn BankItem>>;

    fn select_previous_item(&self);

    fn select_next_item(&self);

    fn select_previous_page(&self);

    fn select_next_page(&self);

    fn can_scroll_backwards(&self) -> bool;

    fn can_scroll_forwards(&self) -> bool;

    fn can_scroll_page_backwards(&self) -> bool;

    fn can_scroll_page_forwards(&self) -> bool;

    /// Scroll so that the page starts at `position`
    fn scroll_to(&self, position: usize);

    /// First selected item on the current page
    fn selected_item(&self) -> Option<Rc<dyn BankItem>> {
        (0..self.page_size())
            .filter_map(|i| self.item(i))
            .find(|item| item.does_exist() && item.is_selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ListBank;

    #[test]
    fn test_selected_item() {
        let bank = ListBank::new(&["Kick", "Snare", "Hats", "Bass", "Pad"], 4);
        assert!(bank.selected_item().is_none());

        bank.select(1);
        let selected = bank.selected_item().unwrap();
        assert_eq!(selected.name(), "Snare");
        assert_eq!(selected.position(), 1);
    }

    #[test]
    fn test_paging() {
        let bank = ListBank::new(&["1", "2", "3", "4", "5", "6"], 4);
        assert!(!bank.can_scroll_page_backwards());
        assert!(bank.can_scroll_page_forwards());

        bank.select_next_page();
        assert_eq!(bank.item(0).unwrap().name(), "5");
        assert!(!bank.item(2).unwrap().does_exist());
        assert!(bank.can_scroll_page_backwards());

        bank.scroll_to(0);
        assert_eq!(bank.item(0).unwrap().name(), "1");
    }
}
