//! Visibility and ownership rules for blogs.
//!
//! Single-item handlers call these directly; the listing handlers
//! apply the equivalent query-level filter (`is_public = true` for the
//! public feed, unrestricted for the author's own listing). Keep both
//! call sites in agreement with these functions.

use uuid::Uuid;

pub fn is_owner(author: Uuid, viewer: Option<Uuid>) -> bool {
	viewer == Some(author)
}

/// A public blog is readable by anyone, a private one only by its
/// author.
pub fn can_read(is_public: bool, author: Uuid, viewer: Option<Uuid>) -> bool {
	is_public || is_owner(author, viewer)
}

/// Only the author may mutate or delete a blog.
pub fn can_write(author: Uuid, viewer: Option<Uuid>) -> bool {
	is_owner(author, viewer)
}

/// Reads by anyone but the author count towards the view counter.
pub fn counts_view(author: Uuid, viewer: Option<Uuid>) -> bool {
	!is_owner(author, viewer)
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::{can_read, can_write, counts_view};

	#[test]
	fn test_private_blog_is_owner_only() {
		let author = Uuid::new_v4();
		let stranger = Uuid::new_v4();

		assert!(can_read(false, author, Some(author)));
		assert!(!can_read(false, author, Some(stranger)));
		assert!(!can_read(false, author, None));
	}

	#[test]
	fn test_public_blog_is_readable_by_anyone() {
		let author = Uuid::new_v4();

		assert!(can_read(true, author, Some(author)));
		assert!(can_read(true, author, Some(Uuid::new_v4())));
		assert!(can_read(true, author, None));
	}

	#[test]
	fn test_only_the_author_can_write() {
		let author = Uuid::new_v4();

		assert!(can_write(author, Some(author)));
		assert!(!can_write(author, Some(Uuid::new_v4())));
		assert!(!can_write(author, None));
	}

	#[test]
	fn test_owner_reads_never_count() {
		let author = Uuid::new_v4();

		assert!(!counts_view(author, Some(author)));
		assert!(counts_view(author, Some(Uuid::new_v4())));
		assert!(counts_view(author, None));
	}
}
