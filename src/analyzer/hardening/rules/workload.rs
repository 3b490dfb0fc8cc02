//! Predicates for workload (pod spec) hardening.

use crate::analyzer::hardening::rules::extract::{
    all_containers, array_contains, count_containers, lookup, pod_spec,
};
use serde_json::Value;

/// UIDs above this are unlikely to collide with a host user.
const HIGH_UID: i64 = 10000;

fn is_true(value: &Value) -> bool {
    value.as_bool() == Some(true)
}

fn pod_flag(document: &Value, key: &str) -> usize {
    usize::from(pod_spec(document).and_then(|s| s.get(key)).is_some_and(is_true))
}

/// Containers running privileged.
pub fn privileged(document: &Value) -> usize {
    count_containers(document, &["securityContext", "privileged"], is_true)
}

/// Pod shares the host network namespace.
pub fn host_network(document: &Value) -> usize {
    pod_flag(document, "hostNetwork")
}

/// Pod shares the host PID namespace.
pub fn host_pid(document: &Value) -> usize {
    pod_flag(document, "hostPID")
}

/// Pod shares the host IPC namespace.
pub fn host_ipc(document: &Value) -> usize {
    pod_flag(document, "hostIPC")
}

/// Containers explicitly allowing privilege escalation.
pub fn allow_privilege_escalation(document: &Value) -> usize {
    count_containers(
        document,
        &["securityContext", "allowPrivilegeEscalation"],
        is_true,
    )
}

/// Containers adding CAP_SYS_ADMIN.
pub fn cap_sys_admin(document: &Value) -> usize {
    count_containers(document, &["securityContext", "capabilities", "add"], |v| {
        array_contains(v, "SYS_ADMIN")
    })
}

/// Containers mounting the Docker socket or the host root.
pub fn host_path_docker_sock(document: &Value) -> usize {
    pod_spec(document)
        .and_then(|s| s.get("volumes"))
        .and_then(Value::as_array)
        .map(|volumes| {
            volumes
                .iter()
                .filter(|v| {
                    lookup(v, &["hostPath", "path"])
                        .and_then(Value::as_str)
                        .is_some_and(|p| p == "/var/run/docker.sock" || p == "/")
                })
                .count()
        })
        .unwrap_or(0)
}

/// Containers (or the pod) requiring a non-root user.
pub fn run_as_non_root(document: &Value) -> usize {
    let pod_level = pod_spec(document)
        .and_then(|s| lookup(s, &["securityContext", "runAsNonRoot"]))
        .is_some_and(is_true);
    if pod_level {
        return all_containers(document).len().max(1);
    }
    count_containers(document, &["securityContext", "runAsNonRoot"], is_true)
}

/// Containers running as a high UID.
pub fn run_as_user(document: &Value) -> usize {
    count_containers(document, &["securityContext", "runAsUser"], |v| {
        v.as_i64().is_some_and(|uid| uid > HIGH_UID)
    })
}

/// Containers with a read-only root filesystem.
pub fn read_only_root_filesystem(document: &Value) -> usize {
    count_containers(
        document,
        &["securityContext", "readOnlyRootFilesystem"],
        is_true,
    )
}

/// Containers dropping all capabilities.
pub fn cap_drop_all(document: &Value) -> usize {
    count_containers(document, &["securityContext", "capabilities", "drop"], |v| {
        array_contains(v, "ALL") || array_contains(v, "all")
    })
}

/// Containers with a memory limit.
pub fn limits_memory(document: &Value) -> usize {
    count_containers(document, &["resources", "limits", "memory"], |v| !v.is_null())
}

/// Containers with a CPU limit.
pub fn limits_cpu(document: &Value) -> usize {
    count_containers(document, &["resources", "limits", "cpu"], |v| !v.is_null())
}

/// Containers with a memory request.
pub fn requests_memory(document: &Value) -> usize {
    count_containers(document, &["resources", "requests", "memory"], |v| !v.is_null())
}

/// Containers with a CPU request.
pub fn requests_cpu(document: &Value) -> usize {
    count_containers(document, &["resources", "requests", "cpu"], |v| !v.is_null())
}

/// Pod uses a dedicated service account.
pub fn service_account_name(document: &Value) -> usize {
    usize::from(
        pod_spec(document)
            .and_then(|s| s.get("serviceAccountName"))
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty() && name != "default"),
    )
}

/// Pod opts out of automounting the service account token.
pub fn automount_service_account_token(document: &Value) -> usize {
    usize::from(
        pod_spec(document)
            .and_then(|s| s.get("automountServiceAccountToken"))
            .is_some_and(|v| v.as_bool() == Some(false)),
    )
}

/// Pod or containers set a seccomp profile.
pub fn seccomp_profile(document: &Value) -> usize {
    let pod_level = pod_spec(document)
        .and_then(|s| lookup(s, &["securityContext", "seccompProfile", "type"]))
        .is_some();
    if pod_level {
        return 1;
    }
    count_containers(
        document,
        &["securityContext", "seccompProfile", "type"],
        |v| v.is_string(),
    )
}
