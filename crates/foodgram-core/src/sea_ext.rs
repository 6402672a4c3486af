use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// Case-insensitive prefix match: `LOWER(column) LIKE lower(term) || '%'`.
///
/// LIKE metacharacters in `term` are escaped, so user input only ever matches literally.
/// `LOWER` folds by the database ctype, which under a `C` locale (and on SQLite) covers
/// ASCII only. Callers match non-ASCII terms with [`has_prefix_ci`] instead.
pub fn starts_with_ci<C>(column: C, term: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let pattern = format!("{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Unicode-aware counterpart of [`starts_with_ci`] evaluated in process.
pub fn has_prefix_ci(value: &str, term: &str) -> bool {
    value.to_lowercase().starts_with(&term.to_lowercase())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
