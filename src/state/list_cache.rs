//! Pure operations on the in-memory row lists.
//!
//! The CRUD layer is the only writer, and only after a confirmed backend
//! response, never in anticipation of one; a failed write simply leaves the
//! cache untouched.

/// New rows go first; lists mirror the backend's created-at-descending order
/// without a re-fetch.
pub(crate) fn prepend_item<T>(mut items: Vec<T>, item: T) -> Vec<T> {
    items.insert(0, item);
    items
}

/// Replace the first matching row in place, preserving order.
pub(crate) fn replace_where<T>(
    mut items: Vec<T>,
    replacement: T,
    same_key: impl Fn(&T, &T) -> bool,
) -> Vec<T> {
    if let Some(slot) = items.iter_mut().find(|x| same_key(x, &replacement)) {
        *slot = replacement;
    }
    items
}

pub(crate) fn remove_where<T>(mut items: Vec<T>, matches: impl Fn(&T) -> bool) -> Vec<T> {
    items.retain(|x| !matches(x));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: &'static str,
        title: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: "b", title: "second" },
            Row { id: "a", title: "first" },
        ]
    }

    #[test]
    fn created_row_appears_first_without_refetch() {
        let out = prepend_item(rows(), Row { id: "c", title: "newest" });
        assert_eq!(out[0].id, "c");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn replace_keeps_position_and_order() {
        let out = replace_where(
            rows(),
            Row { id: "a", title: "edited" },
            |x, y| x.id == y.id,
        );
        assert_eq!(out[1], Row { id: "a", title: "edited" });
        assert_eq!(out[0].id, "b");
    }

    #[test]
    fn replace_without_match_changes_nothing() {
        let out = replace_where(
            rows(),
            Row { id: "zz", title: "ghost" },
            |x, y| x.id == y.id,
        );
        assert_eq!(out, rows());
    }

    #[test]
    fn deleted_row_never_reappears() {
        let out = remove_where(rows(), |x| x.id == "b");
        assert!(out.iter().all(|x| x.id != "b"));
        assert_eq!(out.len(), 1);
    }
}
