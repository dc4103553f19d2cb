// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source locations.
//!
//! Declarations and references carry the byte range the front end parsed
//! them from. Resolution only ever compares start offsets (declaration-point
//! visibility of locals, issue ordering); the full range is kept for
//! diagnostics.

use serde::{Deserialize, Serialize};

/// Byte offsets `start..end` into one source file.
///
/// # Examples
///
/// ```
/// use scopegraph_core::source_analysis::Span;
///
/// let decl = Span::new(4, 9);
/// assert_eq!(decl.len(), 5);
/// assert!(decl.starts_no_later_than(Span::new(20, 21)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// Exclusive end offset.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// A local declared at `self` is visible to a reference at `other`.
    #[must_use]
    pub const fn starts_no_later_than(self, other: Self) -> bool {
        self.start <= other.start
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}
