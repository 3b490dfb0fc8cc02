use k8s_harden::analyzer::hardening::{Report, Ruleset, SchemaConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct PodShape {
    containers: Vec<ContainerShape>,
    host_network: bool,
    host_pid: bool,
    service_account: Option<String>,
}

#[derive(Debug, Clone)]
struct ContainerShape {
    privileged: bool,
    run_as_non_root: bool,
    read_only: bool,
    limits: bool,
}

fn container_strategy() -> impl Strategy<Value = ContainerShape> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(privileged, run_as_non_root, read_only, limits)| ContainerShape {
            privileged,
            run_as_non_root,
            read_only,
            limits,
        },
    )
}

fn pod_strategy() -> impl Strategy<Value = PodShape> {
    (
        prop::collection::vec(container_strategy(), 1..4),
        any::<bool>(),
        any::<bool>(),
        prop::option::of("sa-[a-z]{3,8}"),
    )
        .prop_map(|(containers, host_network, host_pid, service_account)| PodShape {
            containers,
            host_network,
            host_pid,
            service_account,
        })
}

fn render(pod: &PodShape) -> String {
    let mut yaml = String::from("apiVersion: v1\nkind: Pod\nmetadata:\n  name: generated\nspec:\n");
    if pod.host_network {
        yaml.push_str("  hostNetwork: true\n");
    }
    if pod.host_pid {
        yaml.push_str("  hostPID: true\n");
    }
    if let Some(account) = &pod.service_account {
        yaml.push_str(&format!("  serviceAccountName: {}\n", account));
    }
    yaml.push_str("  containers:\n");
    for (i, c) in pod.containers.iter().enumerate() {
        yaml.push_str(&format!("    - name: c{}\n      image: nginx\n", i));
        yaml.push_str("      securityContext:\n");
        yaml.push_str(&format!("        privileged: {}\n", c.privileged));
        yaml.push_str(&format!("        runAsNonRoot: {}\n", c.run_as_non_root));
        yaml.push_str(&format!("        readOnlyRootFilesystem: {}\n", c.read_only));
        if c.limits {
            yaml.push_str("      resources:\n        limits:\n          cpu: 100m\n          memory: 64Mi\n");
        }
    }
    yaml
}

fn scan(input: &str) -> Vec<Report> {
    let schemas = SchemaConfig::new()
        .with_schema_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schemas"));
    Ruleset::new()
        .run("generated.yaml", input.as_bytes(), &schemas)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identical_input_yields_identical_reports(pod in pod_strategy()) {
        let input = render(&pod);
        prop_assert_eq!(scan(&input), scan(&input));
    }

    #[test]
    fn score_is_sum_of_passed_and_critical(pod in pod_strategy()) {
        let report = &scan(&render(&pod))[0];
        prop_assert!(report.valid);

        let expected: i32 = report
            .scoring
            .critical
            .iter()
            .chain(&report.scoring.passed)
            .map(|r| r.points)
            .sum();
        prop_assert_eq!(report.score, expected);
        prop_assert!(report.scoring.advise.iter().all(|r| r.containers == 0 && r.points >= 0));
        prop_assert!(report.rules.iter().all(|r| r.containers > 0 || r.points >= 0));
        prop_assert_eq!(report.rules.len(), report.scoring.len());
    }

    #[test]
    fn privileged_containers_are_counted(pod in pod_strategy()) {
        let report = &scan(&render(&pod))[0];
        let privileged = pod.containers.iter().filter(|c| c.privileged).count();
        let found = report.scoring.critical.iter().find(|r| r.id == "Privileged");

        if privileged == 0 {
            prop_assert!(found.is_none());
        } else {
            prop_assert_eq!(found.map(|r| r.containers), Some(privileged));
            prop_assert!(report.score <= -30);
        }
    }

    #[test]
    fn buckets_are_in_priority_order(pod in pod_strategy()) {
        let report = &scan(&render(&pod))[0];
        for bucket in [&report.scoring.critical, &report.scoring.passed, &report.scoring.advise] {
            for pair in bucket.windows(2) {
                prop_assert!(
                    pair[0].weight > pair[1].weight
                        || (pair[0].weight == pair[1].weight && pair[0].id <= pair[1].id)
                );
            }
        }
    }

    #[test]
    fn documents_are_reported_in_source_order(count in 1usize..6) {
        let input: Vec<String> = (0..count)
            .map(|i| format!("apiVersion: v1\nkind: Pod\nmetadata:\n  name: pod{}\nspec:\n  containers: []\n", i))
            .collect();
        let reports = scan(&input.join("---\n"));
        prop_assert_eq!(reports.len(), count);
        for (i, report) in reports.iter().enumerate() {
            prop_assert_eq!(&report.object, &format!("Pod/pod{}.default", i));
        }
    }
}
