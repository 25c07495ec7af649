//! Menu command: prints the next actions for every activity type.

use std::io::Write;

use al_core::{derive_menu_v1_at, derive_menu_v2_at};
use al_db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::MenuLayout;

pub fn run<W: Write>(writer: &mut W, db: &Database, layout: MenuLayout, json: bool) -> Result<()> {
    run_at(writer, db, layout, json, Utc::now())
}

/// Renders the menu with elapsed times measured from `now`.
pub fn run_at<W: Write>(
    writer: &mut W,
    db: &Database,
    layout: MenuLayout,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let types = db
        .list_activity_types()
        .context("failed to list activity types")?;
    if types.is_empty() && !json {
        writeln!(writer, "No activity types defined.")?;
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to initialize tokio runtime")?;

    let labels = match layout {
        MenuLayout::V1 => {
            let menu = runtime
                .block_on(derive_menu_v1_at(&types, db, now))
                .context("failed to derive menu")?;
            if json {
                return write_json(writer, &menu);
            }
            menu.items
        }
        MenuLayout::V2 => {
            let menu = runtime
                .block_on(derive_menu_v2_at(&types, db, now))
                .context("failed to derive menu")?;
            if json {
                return write_json(writer, &menu);
            }
            menu.labels
        }
    };
    tracing::debug!(?layout, items = labels.len(), "rendering menu");

    for label in labels {
        writeln!(writer, "{label}")?;
    }
    Ok(())
}

fn write_json<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use al_core::{ActivityStatus, NewActivity, NewActivityType};
    use insta::assert_snapshot;

    const HOUR: i64 = 3_600_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn toggle(name: &str, start: &str, end: &str) -> NewActivityType {
        NewActivityType {
            name: name.to_string(),
            toggle: true,
            start_label: Some(start.to_string()),
            end_label: Some(end.to_string()),
            ..Default::default()
        }
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let ids = db
            .create_activity_types(&[
                toggle("work", "Start work", "End work"),
                toggle("gaming", "Start gaming", "Stop gaming"),
                NewActivityType {
                    name: "water".to_string(),
                    ..Default::default()
                },
                toggle("reading", "Start reading", "Stop reading"),
                NewActivityType {
                    name: "stretch".to_string(),
                    ..Default::default()
                },
            ])
            .unwrap();
        let mut log = |index: usize, hours_ago: i64, status: Option<&str>, description: &str| {
            db.log_activity(&NewActivity {
                type_id: ids[index],
                timestamp: now().timestamp_millis() - hours_ago * HOUR,
                status: status.map(ActivityStatus::from),
                description: Some(description.to_string()),
            })
            .unwrap();
        };
        log(0, 5, Some("start"), "");
        log(1, 2, Some("start"), "Game: Chess");
        log(2, 26, None, "");
        log(3, 1, Some("end"), "");
        db
    }

    fn render(db: &Database, layout: MenuLayout, json: bool) -> String {
        let mut output = Vec::new();
        run_at(&mut output, db, layout, json, now()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn v2_menu_groups_and_names_the_active_game() {
        let output = render(&seeded_db(), MenuLayout::V2, false);
        assert_snapshot!(output, @r"
        Stop gaming - Chess (2h)
        End work (5h)
        Start reading (1h)
        stretch (N/A)
        water (1d 2h)
        ");
    }

    #[test]
    fn v1_menu_keeps_type_order() {
        let output = render(&seeded_db(), MenuLayout::V1, false);
        assert_snapshot!(output, @r"
        End work (5h)
        Stop gaming (2h)
        water (1d 2h)
        Start reading (1h)
        stretch (N/A)
        ");
    }

    #[test]
    fn v1_json_includes_id_pairs() {
        let output = render(&seeded_db(), MenuLayout::V1, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value["ids"],
            serde_json::json!(["1,end", "2,end", "3,none", "4,start", "5,none"])
        );
    }

    #[test]
    fn v2_json_carries_full_items() {
        let output = render(&seeded_db(), MenuLayout::V2, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let first = &value["ids"][0];
        assert_eq!(first["name"], "End work");
        assert_eq!(first["status"], "end");
        assert_eq!(first["timeElapsed"], "5h");
        assert_eq!(value["labels"][0], "Stop gaming - Chess (2h)");
    }

    #[test]
    fn empty_database_prints_hint() {
        let db = Database::open_in_memory().unwrap();
        let output = render(&db, MenuLayout::V2, false);
        assert_eq!(output, "No activity types defined.\n");
    }
}
