//! Byte spans into path expression text.

use std::ops::Range;

/// A byte range in a path expression such as `lines.product.name`.
pub type Span = Range<usize>;

/// A value paired with the span it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Maps the inner value while preserving the span.
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T> AsRef<T> for Spanned<T> {
    fn as_ref(&self) -> &T {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanned_map_keeps_span() {
        let segment = Spanned::new("lines", 0..5);
        let mapped = segment.map(str::len);
        assert_eq!(mapped.node, 5);
        assert_eq!(mapped.span, 0..5);
    }

    #[test]
    fn spanned_into_inner() {
        assert_eq!(Spanned::new(42, 3..4).into_inner(), 42);
        assert_eq!(*Spanned::new("x", 0..1).as_ref(), "x");
    }
}
