use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
pub(crate) fn one() -> i64 {
	1
}

#[inline]
pub(crate) fn nine() -> i64 {
	9
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "nine")]
	pub limit: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.limit
	}
}

/// Pagination summary included in listing responses.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Pagination {
	/// The page this response holds (1-indexed).
	pub current: i64,
	/// Total number of pages.
	pub pages: i64,
	/// Total number of matching records.
	pub total: i64,
}

impl Pagination {
	pub fn new(current: i64, total: i64, limit: i64) -> Self {
		Self {
			current,
			pages: (total + limit - 1) / limit,
			total,
		}
	}
}

#[cfg(test)]
mod test {
	#[test]
	fn test_paginate_offset() {
		let mut paginate = super::Paginate { page: 1, limit: 9 };

		assert_eq!(paginate.offset(), 0);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 9);

		paginate.limit = 5;

		assert_eq!(paginate.offset(), 5);

		paginate.page = 3;

		assert_eq!(paginate.offset(), 10);
	}

	#[test]
	fn test_pagination_rounds_up() {
		let pagination = super::Pagination::new(1, 10, 9);

		assert_eq!(pagination.pages, 2);
		assert_eq!(pagination.total, 10);
	}

	#[test]
	fn test_pagination_exact_multiple() {
		assert_eq!(super::Pagination::new(1, 18, 9).pages, 2);
	}

	#[test]
	fn test_pagination_empty() {
		let pagination = super::Pagination::new(1, 0, 9);

		assert_eq!(pagination.pages, 0);
		assert_eq!(pagination.total, 0);
	}
}
