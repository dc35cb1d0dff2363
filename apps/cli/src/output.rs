//! Console output: right-aligned uppercase labels, then the message.
//!
//! ```text
//!   CAVEMARK: starting deployment to https://deploy.cavemark.com
//!    SECRETS: deployed secret (PG_CONNECTION)
//! ```

use std::fmt::Display;

use cavemark_deploy::DeployEvent;
use cavemark_protocol::DeploymentSummary;

/// Formats one labelled console line.
pub fn format_line(label: &str, message: impl Display) -> String {
    format!("{:>10}: {message}", label.to_uppercase())
}

pub fn line(label: &str, message: impl Display) {
    println!("{}", format_line(label, message));
}

pub fn render_event(event: &DeployEvent) -> String {
    match event {
        DeployEvent::ChangeDetected => {
            format!("\n{}", format_line("watch", "detected file system change"))
        }
        DeployEvent::Started { key } => format_line("deploy", format!("deploying to {key}")),
        DeployEvent::StageStarted { stage, detail } => format_line(stage.name(), detail),
        DeployEvent::Uploaded { stage, artifact } => {
            format_line(stage.name(), format!("deployed {artifact}"))
        }
        DeployEvent::StageSkipped { stage } => format_line(stage.name(), "nothing to deploy"),
        DeployEvent::StageCompleted { stage } => format_line(stage.name(), "done"),
        DeployEvent::Completed { key } => {
            format_line("deploy", format!("deployment {key} is active"))
        }
    }
}

/// Tab-separated deployment table, in the order given.
pub fn format_deploy_list(list: &[DeploymentSummary]) -> String {
    let mut out = String::from("Timestamp                    \tStatus\tDeployment Key\n");
    out.push_str("-----------------------------\t------\t--------------\n");
    for summary in list {
        let status = if summary.active { "Active" } else { "" };
        out.push_str(&format!(
            "{}\t{status}\t{}\n",
            summary.timestamp.format("%a, %d %b %Y %H:%M:%S UTC"),
            summary.deploy_key
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavemark_protocol::{DeployKey, DeployStage};
    use chrono::{TimeZone, Utc};

    #[test]
    fn labels_are_right_aligned() {
        assert_eq!(format_line("watch", "ready"), "     WATCH: ready");
        assert_eq!(format_line("cavemark", "version 1"), "  CAVEMARK: version 1");
        assert_eq!(format_line("longerthanten", "x"), "LONGERTHANTEN: x");
    }

    #[test]
    fn events_use_stage_names() {
        let key = DeployKey::new("green").unwrap();
        assert_eq!(
            render_event(&DeployEvent::Uploaded {
                stage: DeployStage::Secrets,
                artifact: "secret (PG)".into()
            }),
            "   SECRETS: deployed secret (PG)"
        );
        assert_eq!(
            render_event(&DeployEvent::StageSkipped {
                stage: DeployStage::Function
            }),
            " FUNCTIONS: nothing to deploy"
        );
        assert_eq!(
            render_event(&DeployEvent::ChangeDetected),
            "\n     WATCH: detected file system change"
        );
        assert_eq!(
            render_event(&DeployEvent::Completed { key }),
            "    DEPLOY: deployment green is active"
        );
    }

    #[test]
    fn deploy_list_table() {
        let list = vec![
            DeploymentSummary {
                deploy_key: "green".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                active: true,
            },
            DeploymentSummary {
                deploy_key: "blue".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 5).unwrap(),
                active: false,
            },
        ];
        let table = format_deploy_list(&list);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "Thu, 01 Feb 2024 00:00:00 UTC\tActive\tgreen");
        assert_eq!(lines[3], "Mon, 01 Jan 2024 12:30:05 UTC\t\tblue");
    }
}
