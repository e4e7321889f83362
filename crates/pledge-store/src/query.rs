//! Typed predicate builder for filtered reads.
//!
//! Read paths that assemble their WHERE clause conditionally (scoped vs.
//! global analytics, optional `since` cursors, substring search) compose a
//! [`Predicate`] tree instead of concatenating SQL strings.  Rendering
//! produces a fragment with `?` placeholders plus the positional parameter
//! list, suitable for [`rusqlite::params_from_iter`].
//!
//! All bound values are TEXT: ids are UUID strings and timestamps are
//! RFC-3339, which compare correctly as strings.

/// A single filter condition or combinator.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `column = value`
    Eq(&'static str, String),
    /// `column > value`
    Gt(&'static str, String),
    /// `column >= value`
    Ge(&'static str, String),
    /// `column IN (v1, v2, ...)`.  An empty set renders as `1 = 0`.
    InSet(&'static str, Vec<String>),
    /// `column LIKE pattern` (caller supplies `%` wildcards).
    Like(&'static str, String),
    /// Conjunction.  Empty renders as `1 = 1`.
    All(Vec<Predicate>),
    /// Disjunction.  Empty renders as `1 = 0`.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Render to a SQL fragment and its positional parameters.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        match self {
            Predicate::Eq(col, v) => (format!("{col} = ?"), vec![v.clone()]),
            Predicate::Gt(col, v) => (format!("{col} > ?"), vec![v.clone()]),
            Predicate::Ge(col, v) => (format!("{col} >= ?"), vec![v.clone()]),
            Predicate::InSet(col, vs) => {
                if vs.is_empty() {
                    return ("1 = 0".to_string(), Vec::new());
                }
                let placeholders = vec!["?"; vs.len()].join(", ");
                (format!("{col} IN ({placeholders})"), vs.clone())
            }
            Predicate::Like(col, pattern) => {
                (format!("{col} LIKE ?"), vec![pattern.clone()])
            }
            Predicate::All(parts) => Self::render_combined(parts, " AND ", "1 = 1"),
            Predicate::Any(parts) => Self::render_combined(parts, " OR ", "1 = 0"),
        }
    }

    fn render_combined(
        parts: &[Predicate],
        joiner: &str,
        empty: &str,
    ) -> (String, Vec<String>) {
        if parts.is_empty() {
            return (empty.to_string(), Vec::new());
        }
        let mut fragments = Vec::with_capacity(parts.len());
        let mut params = Vec::new();
        for part in parts {
            let (sql, mut p) = part.to_sql();
            fragments.push(format!("({sql})"));
            params.append(&mut p);
        }
        (fragments.join(joiner), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_renders_placeholder() {
        let (sql, params) = Predicate::Eq("status", "active".into()).to_sql();
        assert_eq!(sql, "status = ?");
        assert_eq!(params, vec!["active"]);
    }

    #[test]
    fn in_set_renders_placeholders() {
        let (sql, params) =
            Predicate::InSet("solution_id", vec!["a".into(), "b".into()]).to_sql();
        assert_eq!(sql, "solution_id IN (?, ?)");
        assert_eq!(params, vec!["a", "b"]);
    }

    #[test]
    fn empty_in_set_matches_nothing() {
        let (sql, params) = Predicate::InSet("solution_id", vec![]).to_sql();
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn nested_all_any() {
        let pred = Predicate::All(vec![
            Predicate::Eq("status", "active".into()),
            Predicate::Any(vec![
                Predicate::Like("name", "%peace%".into()),
                Predicate::Like("email", "%peace%".into()),
            ]),
        ]);
        let (sql, params) = pred.to_sql();
        assert_eq!(sql, "(status = ?) AND ((name LIKE ?) OR (email LIKE ?))");
        assert_eq!(params, vec!["active", "%peace%", "%peace%"]);
    }

    #[test]
    fn empty_all_matches_everything() {
        let (sql, params) = Predicate::All(vec![]).to_sql();
        assert_eq!(sql, "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn range_predicates() {
        let (sql, _) = Predicate::Gt("created_at", "2026-01-01T00:00:00Z".into()).to_sql();
        assert_eq!(sql, "created_at > ?");
        let (sql, _) = Predicate::Ge("created_at", "2026-01-01T00:00:00Z".into()).to_sql();
        assert_eq!(sql, "created_at >= ?");
    }
}
