//! Page slicing for list views.
//!
//! Out-of-range requests never fail: a missing or unparsable page number
//! means the first page, numbers below one clamp to the first page, and
//! numbers past the end clamp to the last one. An empty collection still
//! has one (empty) page.

use serde::Serialize;

/// Page geometry for a collection of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Turn a raw `?page=` value into a valid page number.
    /// `last` names the final page.
    pub fn resolve(&self, requested: Option<&str>) -> i64 {
        let Some(raw) = requested.map(str::trim) else {
            return 1;
        };
        if raw == "last" {
            return self.num_pages();
        }
        match raw.parse::<i64>() {
            Ok(number) => number.clamp(1, self.num_pages()),
            // Too many digits for i64 is still past the end
            Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) && !raw.is_empty() => {
                self.num_pages()
            }
            Err(_) => 1,
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self, number: i64) -> i64 {
        (number - 1) * self.per_page
    }

    pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            items,
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

/// One slice of a paginated collection.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_items_make_three_pages() {
        let paginator = Paginator::new(7, 3);
        assert_eq!(paginator.num_pages(), 3);
        assert_eq!(paginator.offset(3), 6);
    }

    #[test]
    fn empty_collection_has_one_page() {
        let paginator = Paginator::new(0, 3);
        assert_eq!(paginator.num_pages(), 1);
        assert_eq!(paginator.resolve(Some("5")), 1);

        let page = paginator.page::<i64>(1, vec![]);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn out_of_range_numbers_clamp() {
        let paginator = Paginator::new(7, 3);
        assert_eq!(paginator.resolve(Some("4")), 3);
        assert_eq!(paginator.resolve(Some("0")), 1);
        assert_eq!(paginator.resolve(Some("-2")), 1);
        assert_eq!(paginator.resolve(Some("99999999999999999999")), 3);
        assert_eq!(paginator.resolve(Some("-99999999999999999999")), 1);
    }

    #[test]
    fn garbage_falls_back_to_first_page() {
        let paginator = Paginator::new(7, 3);
        assert_eq!(paginator.resolve(None), 1);
        assert_eq!(paginator.resolve(Some("abc")), 1);
        assert_eq!(paginator.resolve(Some("")), 1);
        assert_eq!(paginator.resolve(Some(" 2 ")), 2);
        assert_eq!(paginator.resolve(Some("last")), 3);
    }

    #[test]
    fn page_flags_follow_position() {
        let paginator = Paginator::new(7, 3);
        let middle = paginator.page(2, vec!['d', 'e', 'f']);
        assert!(middle.has_next && middle.has_previous);
        assert_eq!(middle.count, 7);
        assert_eq!(middle.per_page, 3);

        let last = paginator.page(3, vec!['g']);
        assert!(!last.has_next);
    }
}
