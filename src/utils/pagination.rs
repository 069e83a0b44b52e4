use serde::Serialize;

pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageWindow {
    /// Clamps the requested page into `1..=total_pages`. Non-numeric pages
    /// fall back to the first page and `"last"` selects the final one. A page
    /// number too large for `i64` is still past the end and gets the last page.
    pub fn clamp(requested: Option<&str>, per_page: i64, total: i64) -> Self {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let total = total.max(0);
        let total_pages = ((total + per_page - 1) / per_page).max(1);
        let page = match requested.map(str::trim) {
            Some("last") => total_pages,
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) => page.clamp(1, total_pages),
                Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => total_pages,
                Err(_) => 1,
            },
            None => 1,
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            total: window.total,
            page: window.page,
            per_page: window.per_page,
            total_pages: window.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_pages_clamp_to_nearest_valid() {
        let window = PageWindow::clamp(Some("99"), 9, 20);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.page, 3);
        assert_eq!(window.offset(), 18);

        let window = PageWindow::clamp(Some("-4"), 9, 20);
        assert_eq!(window.page, 1);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn garbage_and_last_pages() {
        assert_eq!(PageWindow::clamp(Some("abc"), 9, 20).page, 1);
        assert_eq!(PageWindow::clamp(Some("last"), 9, 20).page, 3);
        assert_eq!(PageWindow::clamp(None, 9, 20).page, 1);
    }

    #[test]
    fn overflowing_page_numbers_clamp_to_the_nearest_end() {
        assert_eq!(PageWindow::clamp(Some("99999999999999999999"), 9, 20).page, 3);
        assert_eq!(PageWindow::clamp(Some("-99999999999999999999"), 9, 20).page, 1);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let window = PageWindow::clamp(Some("2"), 9, 0);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.page, 1);
    }

    #[test]
    fn per_page_is_bounded() {
        assert_eq!(PageWindow::clamp(None, 0, 5).per_page, 1);
        assert_eq!(PageWindow::clamp(None, 1000, 5).per_page, MAX_PER_PAGE);
    }
}
