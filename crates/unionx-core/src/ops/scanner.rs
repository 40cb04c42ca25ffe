//! Namespace scanning
//!
//! Pure enumeration of what a namespace declares right now. No filtering and
//! no caching happen here.

use unionx_core_types::Snapshot;

use crate::model::Namespace;

/// Names currently declared in `namespace`, in declaration order
pub fn list_declared(namespace: &Namespace) -> Vec<String> {
    namespace.enumerate_declared_names()
}

/// The namespace's current member list as a cache key
pub fn snapshot(namespace: &Namespace) -> Snapshot {
    namespace.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Constant;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_list_declared_reflects_live_state() {
        let ns = Namespace::new("Group");
        assert!(list_declared(&ns).is_empty());

        ns.declare("A", Arc::new(Constant::new(json!(1))));
        ns.declare("B", Arc::new(Constant::new(json!(2))));
        assert_eq!(list_declared(&ns), vec!["A", "B"]);

        ns.remove("A").unwrap();
        assert_eq!(list_declared(&ns), vec!["B"]);
    }

    #[test]
    fn test_snapshot_names_match_list_declared() {
        let ns = Namespace::new("Group");
        ns.declare("Z", Arc::new(Constant::new(json!(1))));
        ns.declare("A", Arc::new(Constant::new(json!(2))));

        let snap = snapshot(&ns);
        let names: Vec<&str> = snap.names().collect();
        assert_eq!(names, list_declared(&ns));
    }
}
