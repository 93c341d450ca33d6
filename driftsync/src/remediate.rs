//! Teardown planning and per-host remediation.
//!
//! Active OSPF processes are read off the device, negated one by one,
//! and the desired state is reapplied afterwards. Reapplication always
//! follows teardown; a transport failure during teardown aborts the
//! host before anything is reapplied.

use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexSet;
use log::debug;
use regex::Regex;

use crate::desired;
use crate::error::Result;
use crate::inventory::Host;
use crate::report::{HostReport, StepReport};
use crate::session::Session;

/// Operational query for the OSPF slice of the running configuration.
pub const SHOW_RUNNING_OSPF: &str = "show run | s ospf";

/// `router ospf <id>` at the start of a line, any indentation.
///
/// Matching the directive keeps integers embedded in other parameters
/// (`network ... area 0`, timers, costs) out of the process-id set.
fn process_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)^[ \t]*router ospf ([0-9]+)").expect("static pattern")
    })
}

/// Extract active OSPF process ids from running-configuration text.
///
/// Ids are deduplicated, first-occurrence order is preserved, and 0 is
/// excluded (reserved, never a real process).
pub fn extract_process_ids(config: &str) -> IndexSet<u32> {
    let mut ids = IndexSet::new();
    for captures in process_directive().captures_iter(config) {
        if let Ok(id) = captures[1].parse::<u32>() {
            if id != 0 {
                ids.insert(id);
            }
        }
    }
    ids
}

/// Negation commands for the given process ids, one per id, in order.
pub fn teardown_commands(ids: &IndexSet<u32>) -> Vec<String> {
    ids.iter().map(|id| format!("no router ospf {id}")).collect()
}

/// Tear down every active OSPF process on the host, then reapply the
/// desired state.
pub async fn remediate_host<S: Session>(
    session: &mut S,
    host: &mut Host,
    host_vars_dir: &Path,
    template_path: &Path,
) -> Result<HostReport> {
    let mut steps = Vec::new();

    let current = session.send_command(SHOW_RUNNING_OSPF).await?;
    let ids = extract_process_ids(&current.output);
    debug!("{}: active OSPF process ids {:?}", host.name, ids);
    steps.push(StepReport::with_output("Identifying current OSPF", current));

    for command in teardown_commands(&ids) {
        let output = session.send_config(std::slice::from_ref(&command)).await?;
        steps.push(StepReport::with_output("Removing current OSPF", output));
    }

    let applied = desired::apply_desired(session, host, host_vars_dir, template_path).await?;
    steps.extend(applied);

    Ok(HostReport::new(host.name.clone(), steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_skips_zero_dedupes_and_keeps_order() {
        let config = "\
router ospf 1
 network 10.0.0.0 0.0.0.255 area 0
router ospf 65000
 network 10.1.0.0 0.0.255.255 area 0
router ospf 1
router ospf 0
router ospf 65000
";
        let ids = extract_process_ids(config);
        let ids: Vec<u32> = ids.into_iter().collect();
        assert_eq!(ids, [1, 65000]);
    }

    #[test]
    fn teardown_plan_for_the_reference_config() {
        let config = "router ospf 1\nrouter ospf 65000\nrouter ospf 1\nrouter ospf 0\nrouter ospf 65000\n";
        let commands = teardown_commands(&extract_process_ids(config));
        assert_eq!(commands, ["no router ospf 1", "no router ospf 65000"]);
    }

    #[test]
    fn integers_in_other_parameters_are_ignored() {
        let config = "\
router ospf 10
 router-id 1.1.1.1
 network 10.0.0.0 0.0.0.255 area 0
 network 172.16.0.0 0.0.255.255 area 51
 auto-cost reference-bandwidth 100000
";
        let ids: Vec<u32> = extract_process_ids(config).into_iter().collect();
        assert_eq!(ids, [10]);
    }

    #[test]
    fn negation_lines_do_not_count_as_processes() {
        let ids = extract_process_ids("no router ospf 7\nrouter ospf 8\n");
        let ids: Vec<u32> = ids.into_iter().collect();
        assert_eq!(ids, [8]);
    }

    #[test]
    fn directive_match_is_case_insensitive_and_indent_tolerant() {
        let ids: Vec<u32> = extract_process_ids("  Router OSPF 3\n").into_iter().collect();
        assert_eq!(ids, [3]);
    }

    #[test]
    fn empty_config_plans_nothing() {
        assert!(extract_process_ids("").is_empty());
        assert!(teardown_commands(&IndexSet::new()).is_empty());
    }

    mod remediation {
        use super::*;
        use crate::session::{Connector, MockConnector};
        use std::fs;
        use std::path::PathBuf;

        fn scratch(tag: &str) -> PathBuf {
            let dir =
                std::env::temp_dir().join(format!("driftsync-{tag}-{}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        #[tokio::test]
        async fn teardown_runs_before_reapply() {
            let dir = scratch("remediate-order");
            fs::write(
                dir.join("r1.yaml"),
                "OSPF:\n  process: 10\n  area: 0\n  networks: [10.0.0.0/24]\n",
            )
            .unwrap();
            let template = dir.join("ospf.j2");
            fs::write(
                &template,
                "router ospf {{ process }}\n{%- for net in networks %}\n network {{ net.address }} {{ net.wildcard }} area {{ net.area }}\n{%- endfor %}",
            )
            .unwrap();

            let connector = MockConnector::new();
            connector.set_command_output("r1", "router ospf 1\nrouter ospf 20\nrouter ospf 1\n");
            let mut host = Host::new("r1", "10.0.0.1");
            let mut session = connector.connect(&host).await.unwrap();

            let report = remediate_host(&mut session, &mut host, &dir, &template)
                .await
                .unwrap();
            assert!(report.ok());

            let lines = connector.config_lines_for("r1");
            assert_eq!(
                lines,
                [
                    "no router ospf 1",
                    "no router ospf 20",
                    "router ospf 10",
                    " network 10.0.0.0 0.0.0.255 area 0",
                ]
            );

            fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn teardown_failure_aborts_before_reapply() {
            let dir = scratch("remediate-abort");
            fs::write(
                dir.join("r1.yaml"),
                "OSPF:\n  process: 10\n  area: 0\n  networks: [10.0.0.0/24]\n",
            )
            .unwrap();
            let template = dir.join("ospf.j2");
            fs::write(&template, "router ospf {{ process }}").unwrap();

            let connector = MockConnector::new();
            connector.set_command_output("r1", "router ospf 1\n");
            connector.fail_config("r1");
            let mut host = Host::new("r1", "10.0.0.1");
            let mut session = connector.connect(&host).await.unwrap();

            let err = remediate_host(&mut session, &mut host, &dir, &template)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Executor"));
            // nothing was pushed and the desired state was never loaded
            assert!(connector.config_lines().is_empty());
            assert!(host.get("OSPF").is_none());

            fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn hosts_with_no_live_ospf_only_get_the_desired_state() {
            let dir = scratch("remediate-clean");
            fs::write(
                dir.join("r2.yaml"),
                "OSPF:\n  process: 7\n  area: 0\n  networks: [10.2.0.0/16]\n",
            )
            .unwrap();
            let template = dir.join("ospf.j2");
            fs::write(&template, "router ospf {{ process }}").unwrap();

            let connector = MockConnector::new();
            let mut host = Host::new("r2", "10.0.0.2");
            let mut session = connector.connect(&host).await.unwrap();

            remediate_host(&mut session, &mut host, &dir, &template)
                .await
                .unwrap();
            assert_eq!(connector.config_lines_for("r2"), ["router ospf 7"]);

            fs::remove_dir_all(&dir).unwrap();
        }
    }
}
