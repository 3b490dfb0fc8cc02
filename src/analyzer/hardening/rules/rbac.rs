//! Predicates for operator RBAC hardening.

use crate::analyzer::hardening::rules::extract::{PolicyRule, lookup, policy_rules};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Namespaces an operator should never be deployed into.
const SHARED_NAMESPACES: &[&str] = &["default", "kube-system"];

/// Verbs that allow writing or removing objects.
const WRITE_VERBS: &[&str] = &[
    "create",
    "update",
    "patch",
    "delete",
    "deletecollection",
];

static CLUSTER_ADMIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(system:)?cluster-admin$").unwrap());

fn count_rules(document: &Value, test: impl Fn(&PolicyRule) -> bool) -> usize {
    policy_rules(document).iter().filter(|r| test(r)).count()
}

fn has_any_verb(rule: &PolicyRule, verbs: &[&str]) -> bool {
    verbs.iter().any(|v| rule.has_verb(v))
}

/// Binding grants the cluster-admin role.
pub fn cluster_admin(document: &Value) -> usize {
    usize::from(
        lookup(document, &["roleRef", "name"])
            .and_then(Value::as_str)
            .is_some_and(|name| CLUSTER_ADMIN.is_match(name)),
    )
}

/// Full access to every resource of the core API group.
pub fn star_all_core_api(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_core_group()
            && r.resources.iter().any(|res| res == "*")
            && r.has_wildcard_verb()
    })
}

/// Wildcard resources and verbs in any API group.
pub fn star_all_role_rule(document: &Value) -> usize {
    count_rules(document, |r| {
        r.resources.iter().any(|res| res == "*") && r.has_wildcard_verb()
    })
}

/// Can exec into or create pods.
pub fn exec_pods(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_core_group()
            && (r.covers_resource("pods/exec") || r.covers_resource("pods"))
            && (r.has_wildcard_verb() || (r.has_verb("get") && r.has_verb("create")))
    })
}

/// Can delete Kubernetes events and hide activity.
pub fn remove_events(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_core_group()
            && r.covers_resource("events")
            && (r.has_wildcard_verb() || r.has_verb("delete") || r.has_verb("deletecollection"))
    })
}

/// Can create or modify custom resource definitions.
pub fn custom_resource_definitions(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_group("apiextensions.k8s.io")
            && r.covers_resource("customresourcedefinitions")
            && has_any_verb(r, WRITE_VERBS)
    })
}

/// Can read secrets across its scope.
pub fn secrets_access(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_core_group()
            && r.covers_resource("secrets")
            && has_any_verb(r, &["get", "list", "watch"])
    })
}

/// Full control of persistent volumes or claims.
pub fn persistent_volumes(document: &Value) -> usize {
    count_rules(document, |r| {
        r.covers_core_group()
            && (r.covers_resource("persistentvolumeclaims")
                || r.covers_resource("persistentvolumes"))
            && (r.has_wildcard_verb() || WRITE_VERBS.iter().all(|v| r.has_verb(v)))
    })
}

/// Can impersonate users, groups or service accounts.
pub fn impersonate(document: &Value) -> usize {
    count_rules(document, |r| r.has_verb("impersonate"))
}

/// Resource lives in, or binds subjects from, a shared namespace.
pub fn default_namespace(document: &Value) -> usize {
    let in_shared = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .is_some_and(|ns| SHARED_NAMESPACES.contains(&ns))
    };

    let mut matches = 0;
    match document.get("kind").and_then(Value::as_str) {
        Some("Namespace") => {
            if in_shared(lookup(document, &["metadata", "name"])) {
                matches += 1;
            }
        }
        // Cluster-scoped: only the subjects carry a namespace.
        Some("ClusterRoleBinding") => {}
        _ => {
            let namespace = lookup(document, &["metadata", "namespace"]);
            if namespace.is_none() || in_shared(namespace) {
                matches += 1;
            }
        }
    }

    if let Some(subjects) = document.get("subjects").and_then(Value::as_array) {
        matches += subjects
            .iter()
            .filter(|s| in_shared(s.get("namespace")))
            .count();
    }
    matches
}
