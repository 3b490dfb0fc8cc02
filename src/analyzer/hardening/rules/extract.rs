//! Helpers for pulling pod specs, containers and RBAC rules out of a
//! JSON document.

use serde_json::Value;

/// Kinds that embed a pod spec.
pub const WORKLOAD_KINDS: &[&str] = &[
    "Pod",
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "CronJob",
];

/// Kinds that carry RBAC policy rules.
pub const ROLE_KINDS: &[&str] = &["Role", "ClusterRole"];

/// Kinds that bind a role to subjects.
pub const BINDING_KINDS: &[&str] = &["RoleBinding", "ClusterRoleBinding"];

/// Extract the pod spec of a workload, if it has one.
pub fn pod_spec(document: &Value) -> Option<&Value> {
    let spec = document.get("spec")?;
    match document.get("kind")?.as_str()? {
        "Pod" => Some(spec),
        "CronJob" => spec
            .get("jobTemplate")?
            .get("spec")?
            .get("template")?
            .get("spec"),
        _ => spec.get("template")?.get("spec"),
    }
}

/// All containers of a workload, init containers last.
pub fn all_containers(document: &Value) -> Vec<&Value> {
    let Some(spec) = pod_spec(document) else {
        return Vec::new();
    };
    ["containers", "initContainers"]
        .iter()
        .filter_map(|key| spec.get(*key).and_then(Value::as_array))
        .flatten()
        .collect()
}

/// Count containers whose value at `path` satisfies `test`.
pub fn count_containers(document: &Value, path: &[&str], test: impl Fn(&Value) -> bool) -> usize {
    all_containers(document)
        .into_iter()
        .filter(|c| lookup(c, path).is_some_and(&test))
        .count()
}

/// Walk a sequence of object keys.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Whether the value is a string array containing `needle`.
pub fn array_contains(value: &Value, needle: &str) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(needle)))
}

/// One RBAC policy rule, with missing fields as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub verbs: Vec<String>,
}

impl PolicyRule {
    /// Whether the rule covers the core API group.
    pub fn covers_core_group(&self) -> bool {
        self.api_groups.iter().any(|g| g.is_empty() || g == "*")
    }

    pub fn covers_group(&self, group: &str) -> bool {
        self.api_groups.iter().any(|g| g == group || g == "*")
    }

    pub fn covers_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource || r == "*")
    }

    pub fn has_verb(&self, verb: &str) -> bool {
        self.verbs.iter().any(|v| v == verb || v == "*")
    }

    pub fn has_wildcard_verb(&self) -> bool {
        self.verbs.iter().any(|v| v == "*")
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Extract the policy rules of a Role or ClusterRole.
pub fn policy_rules(document: &Value) -> Vec<PolicyRule> {
    document
        .get("rules")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .map(|rule| PolicyRule {
                    api_groups: string_list(rule.get("apiGroups")),
                    resources: string_list(rule.get("resources")),
                    verbs: string_list(rule.get("verbs")),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_spec_locations() {
        let pod = json!({"kind": "Pod", "spec": {"containers": [{"name": "a"}]}});
        assert_eq!(all_containers(&pod).len(), 1);

        let deploy = json!({"kind": "Deployment", "spec": {"template": {"spec": {
            "containers": [{"name": "a"}],
            "initContainers": [{"name": "b"}]
        }}}});
        assert_eq!(all_containers(&deploy).len(), 2);

        let cron = json!({"kind": "CronJob", "spec": {"jobTemplate": {"spec": {"template": {"spec": {
            "containers": [{"name": "a"}]
        }}}}}});
        assert_eq!(all_containers(&cron).len(), 1);

        let role = json!({"kind": "Role", "rules": []});
        assert!(all_containers(&role).is_empty());
    }

    #[test]
    fn test_count_containers() {
        let pod = json!({"kind": "Pod", "spec": {"containers": [
            {"securityContext": {"privileged": true}},
            {"securityContext": {"privileged": false}},
            {}
        ]}});
        let count = count_containers(&pod, &["securityContext", "privileged"], |v| {
            v.as_bool() == Some(true)
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn test_policy_rules() {
        let role = json!({"kind": "ClusterRole", "rules": [
            {"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"]}
        ]});
        let rules = policy_rules(&role);
        assert_eq!(rules.len(), 1);
        assert!(rules[0].covers_core_group());
        assert!(rules[0].covers_resource("pods"));
        assert!(rules[0].has_verb("get"));
        assert!(!rules[0].has_verb("delete"));
    }
}
