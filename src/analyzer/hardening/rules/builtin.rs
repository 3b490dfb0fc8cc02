//! Built-in rule catalog.
//!
//! Catalog order is the order results appear in a report's `Rules` list.

use crate::analyzer::hardening::rules::Rule;
use crate::analyzer::hardening::rules::extract::{BINDING_KINDS, ROLE_KINDS, WORKLOAD_KINDS};
use crate::analyzer::hardening::rules::{rbac, workload};

const DOCS: &str = "https://kubernetes.io/docs/concepts/security";

/// Get all built-in rules.
pub fn builtin_rules() -> Vec<Rule> {
    let mut rules = workload_rules();
    rules.extend(rbac_rules());
    rules
}

fn workload_rules() -> Vec<Rule> {
    vec![
        // Critical
        Rule::new(
            "Privileged",
            "containers[] .securityContext .privileged == true",
            "Privileged containers can allow almost completely unrestricted host access",
            -30,
            workload::privileged,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_link(format!("{}/pod-security-standards/", DOCS)),
        Rule::new(
            "CapSysAdmin",
            "containers[] .securityContext .capabilities .add == SYS_ADMIN",
            "CAP_SYS_ADMIN is the most privileged capability and should always be avoided",
            -30,
            workload::cap_sys_admin,
        )
        .with_kinds(WORKLOAD_KINDS),
        Rule::new(
            "DockerSock",
            ".spec .volumes[] .hostPath .path == /var/run/docker.sock",
            "Mounting the container runtime socket or host root grants control of the node",
            -9,
            workload::host_path_docker_sock,
        )
        .with_kinds(WORKLOAD_KINDS),
        Rule::new(
            "HostNetwork",
            ".spec .hostNetwork == true",
            "Sharing the host's network namespace permits processes in the pod to communicate with processes bound to the host's loopback adapter",
            -9,
            workload::host_network,
        )
        .with_kinds(WORKLOAD_KINDS),
        Rule::new(
            "HostPID",
            ".spec .hostPID == true",
            "Sharing the host's PID namespace allows visibility of processes on the host, potentially leaking information such as environment variables and configuration",
            -9,
            workload::host_pid,
        )
        .with_kinds(WORKLOAD_KINDS),
        Rule::new(
            "HostIPC",
            ".spec .hostIPC == true",
            "Sharing the host's IPC namespace allows container processes to communicate with processes on the host",
            -9,
            workload::host_ipc,
        )
        .with_kinds(WORKLOAD_KINDS),
        Rule::new(
            "AllowPrivilegeEscalation",
            "containers[] .securityContext .allowPrivilegeEscalation == true",
            "Allowing privilege escalation lets a process gain more privileges than its parent",
            -7,
            workload::allow_privilege_escalation,
        )
        .with_kinds(WORKLOAD_KINDS),
        // Advise
        Rule::new(
            "ServiceAccountName",
            ".spec .serviceAccountName",
            "Service accounts restrict Kubernetes API access and should be configured with least privilege",
            3,
            workload::service_account_name,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(100),
        Rule::new(
            "RunAsNonRoot",
            "containers[] .securityContext .runAsNonRoot == true",
            "Force the running image to run as a non-root user to ensure least privilege",
            1,
            workload::run_as_non_root,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(10),
        Rule::new(
            "RunAsUser",
            "containers[] .securityContext .runAsUser -gt 10000",
            "Run as a high-UID user to avoid conflicts with the host's user table",
            1,
            workload::run_as_user,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(4),
        Rule::new(
            "ReadOnlyRootFilesystem",
            "containers[] .securityContext .readOnlyRootFilesystem == true",
            "An immutable root filesystem can prevent malicious binaries being added to PATH and increase attack cost",
            1,
            workload::read_only_root_filesystem,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(3),
        Rule::new(
            "CapDropAll",
            "containers[] .securityContext .capabilities .drop | index(\"ALL\")",
            "Drop all capabilities and add only those required to reduce syscall attack surface",
            1,
            workload::cap_drop_all,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(3),
        Rule::new(
            "LimitsMemory",
            "containers[] .resources .limits .memory",
            "Enforcing memory limits prevents DOS via resource exhaustion",
            1,
            workload::limits_memory,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(2),
        Rule::new(
            "LimitsCPU",
            "containers[] .resources .limits .cpu",
            "Enforcing CPU limits prevents DOS via resource exhaustion",
            1,
            workload::limits_cpu,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(2),
        Rule::new(
            "RequestsMemory",
            "containers[] .resources .requests .memory",
            "Enforcing memory requests aids a fair balancing of resources across the cluster",
            1,
            workload::requests_memory,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(1),
        Rule::new(
            "RequestsCPU",
            "containers[] .resources .requests .cpu",
            "Enforcing CPU requests aids a fair balancing of resources across the cluster",
            1,
            workload::requests_cpu,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(1),
        Rule::new(
            "AutomountServiceAccountToken",
            ".spec .automountServiceAccountToken == false",
            "Disabling the automounting of Service Account tokens reduces the attack surface of the API server",
            1,
            workload::automount_service_account_token,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(1),
        Rule::new(
            "SeccompProfile",
            ".spec .securityContext .seccompProfile .type",
            "Seccomp profiles set minimum privilege and secure against unknown threats",
            1,
            workload::seccomp_profile,
        )
        .with_kinds(WORKLOAD_KINDS)
        .with_advise_weight(1),
    ]
}

fn rbac_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "ClusterAdmin",
            ".roleRef .name == cluster-admin",
            "The Operator SA is bound to the cluster-admin role",
            -30,
            rbac::cluster_admin,
        )
        .with_kinds(BINDING_KINDS),
        Rule::new(
            "StarAllCoreAPIClusterRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role has full permissions on all resources against the Core API Group",
            -30,
            rbac::star_all_core_api,
        )
        .with_kinds(&["ClusterRole"]),
        Rule::new(
            "StarAllRoleRule",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role has full permissions on all resources in its API groups",
            -9,
            rbac::star_all_role_rule,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "ExecPodsRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role can exec into pods",
            -9,
            rbac::exec_pods,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "RemoveEventsRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role can remove Kubernetes events and hide its activity",
            -9,
            rbac::remove_events,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "CustomResourceClusterRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role can create or modify custom resource definitions",
            -9,
            rbac::custom_resource_definitions,
        )
        .with_kinds(&["ClusterRole"]),
        Rule::new(
            "SecretsRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role can read secrets",
            -9,
            rbac::secrets_access,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "PersistentVolumesRole",
            ".rules .apiGroups .resources .verbs",
            "The Operator SA role has full permissions over persistent volumes",
            -9,
            rbac::persistent_volumes,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "ImpersonateRole",
            ".rules .verbs == impersonate",
            "The Operator SA role can impersonate other users and service accounts",
            -9,
            rbac::impersonate,
        )
        .with_kinds(ROLE_KINDS),
        Rule::new(
            "DefaultNamespace",
            ".metadata .name == kube-system .name == default .namespace == kube-system .namespace == default .subjects",
            "Operators should be deployed into a dedicated namespace",
            -9,
            rbac::default_namespace,
        )
        .with_kinds(&["Namespace", "Deployment", "ClusterRoleBinding", "RoleBinding"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let rules = builtin_rules();
        assert!(rules.len() > 20);
        assert!(rules.iter().any(|r| r.points < 0));
        assert!(rules.iter().any(|r| r.points > 0));
        assert!(rules
            .iter()
            .filter(|r| r.points < 0)
            .all(|r| r.advise_weight == 0));
    }
}
