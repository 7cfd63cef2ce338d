use super::{Formatter, Params};

/// Writes each fragment into the formatter, left to right.
macro_rules! fmt {
    ($f:expr, $( $piece:expr )*) => {{
        $( ToSql::to_sql($piece, $f); )*
    }};
}

/// A fragment of rendered SQL. Takes `self` by value so borrowed and
/// owned pieces serialize through the same `fmt!` call.
pub(super) trait ToSql {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>);
}

impl ToSql for &str {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(self);
    }
}

impl ToSql for u64 {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(f.dst, "{self}");
    }
}

/// Renders the wrapped fragments separated by `", "`.
pub(super) struct Comma<I>(pub(super) I);

impl<I> ToSql for Comma<I>
where
    I: IntoIterator,
    I::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        for (index, item) in self.0.into_iter().enumerate() {
            if index > 0 {
                f.dst.push_str(", ");
            }
            item.to_sql(f);
        }
    }
}
