//! Splits an ordered result set into fixed-size pages.

use schemars::JsonSchema;
use serde::Serialize;

/// Number of posts shown on a single listing page.
pub const PAGE_SIZE: i64 = 10;

/// A requested page number, as given by the client.
///
/// Anything that is not an integer resolves to the first page. Integers too
/// large for an `i64` are still out of range, and resolve to the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(i64);

impl PageNumber {
	pub const FIRST: Self = Self(1);
	const OUT_OF_RANGE: Self = Self(i64::MAX);

	pub fn parse(input: Option<&str>) -> Self {
		let Some(input) = input.map(str::trim) else {
			return Self::FIRST;
		};

		match input.parse() {
			Ok(number) => Self(number),
			Err(..) if is_integer(input) => Self::OUT_OF_RANGE,
			Err(..) => Self::FIRST,
		}
	}
}

fn is_integer(input: &str) -> bool {
	let digits = input.strip_prefix(['-', '+']).unwrap_or(input);

	!digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

impl Default for PageNumber {
	fn default() -> Self {
		Self::FIRST
	}
}

/// Page arithmetic over a result set of `count` items.
#[derive(Debug, Clone, Copy)]
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

	/// The number of pages. An empty result set still has one (empty) page.
	pub fn num_pages(&self) -> i64 {
		if self.count == 0 {
			1
		} else {
			(self.count + self.per_page - 1) / self.per_page
		}
	}

	/// Resolves a requested page to a valid one; out-of-range requests get the last page.
	pub fn clamp(&self, number: PageNumber) -> i64 {
		let num_pages = self.num_pages();

		if (1..=num_pages).contains(&number.0) {
			number.0
		} else {
			num_pages
		}
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	pub fn offset(&self, number: i64) -> i64 {
		(number - 1) * self.per_page
	}

	/// Wraps the items of page `number` together with the page metadata.
	pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
		let num_pages = self.num_pages();
		let has_next = number < num_pages;
		let has_previous = number > 1;

		Page {
			items,
			number,
			num_pages,
			count: self.count,
			has_next,
			has_previous,
			next_page_number: has_next.then_some(number + 1),
			previous_page_number: has_previous.then_some(number - 1),
		}
	}
}

/// A single page of an ordered result set.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The 1-indexed number of this page.
	pub number: i64,
	pub num_pages: i64,
	/// Total number of items across all pages.
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
	pub next_page_number: Option<i64>,
	pub previous_page_number: Option<i64>,
}

#[cfg(test)]
mod test {
	use super::{PageNumber, Paginator, PAGE_SIZE};

	#[test]
	fn test_page_number_parse() {
		assert_eq!(PageNumber::parse(None), PageNumber::FIRST);
		assert_eq!(PageNumber::parse(Some("abc")), PageNumber::FIRST);
		assert_eq!(PageNumber::parse(Some("")), PageNumber::FIRST);
		assert_eq!(PageNumber::parse(Some("3")), PageNumber(3));
		assert_eq!(PageNumber::parse(Some("-2")), PageNumber(-2));
		assert_eq!(PageNumber::parse(Some("-")), PageNumber::FIRST);
		assert_eq!(PageNumber::parse(Some("1e3")), PageNumber::FIRST);
	}

	#[test]
	fn test_huge_page_number_clamps_to_last_page() {
		let paginator = Paginator::new(35, PAGE_SIZE);

		for input in ["9223372036854775808", "99999999999999999999", "-99999999999999999999"] {
			assert_eq!(paginator.clamp(PageNumber::parse(Some(input))), 4);
		}
	}

	#[test]
	fn test_num_pages() {
		assert_eq!(Paginator::new(0, PAGE_SIZE).num_pages(), 1);
		assert_eq!(Paginator::new(1, PAGE_SIZE).num_pages(), 1);
		assert_eq!(Paginator::new(10, PAGE_SIZE).num_pages(), 1);
		assert_eq!(Paginator::new(11, PAGE_SIZE).num_pages(), 2);
		assert_eq!(Paginator::new(35, PAGE_SIZE).num_pages(), 4);
	}

	#[test]
	fn test_out_of_range_clamps_to_last_page() {
		let paginator = Paginator::new(35, PAGE_SIZE);

		assert_eq!(paginator.clamp(PageNumber(2)), 2);
		assert_eq!(paginator.clamp(PageNumber(4)), 4);
		assert_eq!(paginator.clamp(PageNumber(5)), 4);
		assert_eq!(paginator.clamp(PageNumber(1000)), 4);
		assert_eq!(paginator.clamp(PageNumber(0)), 4);
		assert_eq!(paginator.clamp(PageNumber(-1)), 4);
	}

	#[test]
	fn test_page_slices_ordered_items() {
		let items = (0..35).collect::<Vec<i64>>();
		let paginator = Paginator::new(items.len() as i64, PAGE_SIZE);

		for number in 1..=paginator.num_pages() {
			let offset = paginator.offset(number) as usize;
			let limit = paginator.limit() as usize;
			let slice = items.iter().copied().skip(offset).take(limit).collect::<Vec<_>>();

			let expected = ((number - 1) * 10..(number * 10).min(35)).collect::<Vec<_>>();
			assert_eq!(slice, expected);
		}
	}

	#[test]
	fn test_page_metadata() {
		let paginator = Paginator::new(25, PAGE_SIZE);

		let first = paginator.page(1, vec![(); 10]);
		assert!(first.has_next);
		assert!(!first.has_previous);
		assert_eq!(first.next_page_number, Some(2));
		assert_eq!(first.previous_page_number, None);

		let last = paginator.page(3, vec![(); 5]);
		assert!(!last.has_next);
		assert!(last.has_previous);
		assert_eq!(last.num_pages, 3);
		assert_eq!(last.count, 25);
		assert_eq!(last.previous_page_number, Some(2));
	}

	#[test]
	fn test_empty_result_has_one_page() {
		let paginator = Paginator::new(0, PAGE_SIZE);
		let page = paginator.page::<()>(paginator.clamp(PageNumber(7)), Vec::new());

		assert_eq!(page.number, 1);
		assert!(!page.has_next);
		assert!(!page.has_previous);
	}
}
