//! End-to-end CLI integration tests for the `fnl` binary.
//!
//! Each test creates its own temporary directory, initializes a funnel
//! project, and exercises the `fnl` binary as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a `Command` targeting the cargo-built `fnl` binary.
fn fnl() -> Command {
    Command::cargo_bin("fnl").unwrap()
}

/// Initialize a fresh funnel project in a temp directory and return the handle.
fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fnl().args(["init", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp
}

/// Create a lead and return its ID (parsed from `--json` output).
fn create_lead(tmp: &TempDir, name: &str, extra_args: &[&str]) -> String {
    let mut args = vec!["create", name, "--json"];
    args.extend_from_slice(extra_args);
    let output = fnl().args(&args).current_dir(tmp.path()).output().unwrap();
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

/// Create a follow-up rule and return its ID.
fn create_rule(tmp: &TempDir, message: &str, delay_hours: &str, stage: &str) -> String {
    let output = fnl()
        .args([
            "rule",
            "add",
            message,
            "--delay-hours",
            delay_hours,
            "--stage",
            stage,
            "--json",
        ])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "rule add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

/// Run a command expecting success and parse stdout as JSON.
fn json_output(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = fnl().args(args).current_dir(tmp.path()).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// Flow 1: Init and lead lifecycle
// ---------------------------------------------------------------------------

#[test]
fn flow1_init_and_lead_lifecycle() {
    let tmp = init_project();

    let id1 = create_lead(&tmp, "Marta Ruiz", &["--handle", "marta.r"]);
    let id2 = create_lead(&tmp, "Luis Vega", &["--stage", "mensaje_conexion"]);

    assert!(id1.starts_with("ld-"), "lead id should start with ld-: {}", id1);
    assert!(id2.starts_with("ld-"));

    // New leads land in the entry stage unless told otherwise.
    let list = json_output(&tmp, &["list", "--json"]);
    let arr = list.as_array().expect("list --json should return array");
    assert_eq!(arr.len(), 2);
    let marta = arr
        .iter()
        .find(|l| l["id"].as_str() == Some(id1.as_str()))
        .unwrap();
    assert_eq!(marta["stage"].as_str().unwrap(), "nuevo");
    assert_eq!(marta["handle"].as_str().unwrap(), "marta.r");

    // Stage filter
    let filtered = json_output(&tmp, &["list", "--stage", "mensaje_conexion", "--json"]);
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["id"].as_str().unwrap(), id2);

    // show includes the lead and its (empty) call history
    let show = json_output(&tmp, &["show", &id1, "--json"]);
    assert_eq!(show["lead"]["id"].as_str().unwrap(), id1);
    assert_eq!(show["calls"].as_array().unwrap().len(), 0);

    // board groups by catalog order with counts
    let board = json_output(&tmp, &["board", "--json"]);
    let columns = board.as_array().unwrap();
    assert_eq!(columns[0]["stage"].as_str().unwrap(), "nuevo");
    assert_eq!(columns[0]["count"].as_i64().unwrap(), 1);
    assert_eq!(columns[1]["stage"].as_str().unwrap(), "mensaje_conexion");
    assert_eq!(columns[1]["count"].as_i64().unwrap(), 1);

    // delete removes from the board
    fnl().args(["delete", &id2])
        .current_dir(tmp.path())
        .assert()
        .success();
    let list = json_output(&tmp, &["list", "--json"]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // unknown stage at create time is rejected
    fnl().args(["create", "Bad", "--stage", "no_such_stage"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stage"));
}

#[test]
fn init_refuses_to_clobber_existing_database() {
    let tmp = init_project();
    fnl().args(["init"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    fnl().args(["init", "--force", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Flow 2: Transitions, calls, conversion
// ---------------------------------------------------------------------------

#[test]
fn flow2_transitions_and_call_requirement() {
    let tmp = init_project();
    let id = create_lead(&tmp, "Ana Soto", &[]);

    // Plain transition
    fnl().args(["move", &id, "respuesta_recibida"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("respuesta_recibida"));

    // Call-required stage without --call-at: rejected, lead does not move
    fnl().args(["move", &id, "llamada_agendada"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("call time"));
    let show = json_output(&tmp, &["show", &id, "--json"]);
    assert_eq!(show["lead"]["stage"].as_str().unwrap(), "respuesta_recibida");

    // With --call-at: moves and creates the call
    let call_at = (Utc::now() + Duration::hours(48)).to_rfc3339();
    fnl().args(["move", &id, "llamada_agendada", "--call-at", &call_at])
        .current_dir(tmp.path())
        .assert()
        .success();
    let show = json_output(&tmp, &["show", &id, "--json"]);
    assert_eq!(show["lead"]["stage"].as_str().unwrap(), "llamada_agendada");
    let calls = show["calls"].as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0]["id"].as_str().unwrap().starts_with("ca-"));

    // Unknown target stage is rejected
    fnl().args(["move", &id, "no_such_stage"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_stage"));
}

#[test]
fn flow2_call_add_and_list() {
    let tmp = init_project();
    let id = create_lead(&tmp, "Ana Soto", &[]);

    let at = (Utc::now() + Duration::hours(2)).to_rfc3339();
    let call = json_output(
        &tmp,
        &["call", "add", &id, "--at", &at, "--notes", "intro call", "--json"],
    );
    assert!(call["id"].as_str().unwrap().starts_with("ca-"));
    assert_eq!(call["notes"].as_str().unwrap(), "intro call");

    let calls = json_output(&tmp, &["call", "list", &id, "--json"]);
    assert_eq!(calls.as_array().unwrap().len(), 1);

    // Calls for a missing lead are an error, not an empty list
    fnl().args(["call", "list", "ld-zzzzz"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn flow3_conversion_is_one_way() {
    let tmp = init_project();
    let id = create_lead(&tmp, "Carla Mejia", &["--handle", "carla.m"]);

    // Moving into the conversion stage commits and reports the pending
    // conversion.
    let outcome = json_output(&tmp, &["move", &id, "cliente_cerrado", "--json"]);
    assert_eq!(outcome["status"].as_str().unwrap(), "pending_conversion");
    assert_eq!(outcome["lead"]["id"].as_str().unwrap(), id);
    assert_eq!(outcome["lead"]["stage"].as_str().unwrap(), "cliente_cerrado");

    // The lead is still on the board until converted.
    let list = json_output(&tmp, &["list", "--json"]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Convert: client carries operator fields plus the lead's handle.
    let client = json_output(
        &tmp,
        &["convert", &id, "--email", "carla@example.com", "--json"],
    );
    assert!(client["id"].as_str().unwrap().starts_with("cl-"));
    assert_eq!(client["name"].as_str().unwrap(), "Carla Mejia");
    assert_eq!(client["email"].as_str().unwrap(), "carla@example.com");
    assert_eq!(client["handle"].as_str().unwrap(), "carla.m");
    assert_eq!(client["source_lead_id"].as_str().unwrap(), id);

    // Converted leads leave the board.
    let list = json_output(&tmp, &["list", "--json"]);
    assert_eq!(list.as_array().unwrap().len(), 0);

    // A second convert is rejected and creates no second client.
    fnl().args(["convert", &id])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already converted"));

    // Moving a converted lead is rejected too.
    fnl().args(["move", &id, "nuevo"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already converted"));
}

// ---------------------------------------------------------------------------
// Flow 4: Follow-up rules, due, mark-sent
// ---------------------------------------------------------------------------

#[test]
fn flow4_followups_due_and_mark_sent() {
    let tmp = init_project();
    let lead_id = create_lead(&tmp, "Diego Paz", &["--stage", "mensaje_conexion"]);
    let rule_id = create_rule(&tmp, "¿Seguimos en contacto?", "24", "mensaje_conexion");

    // Not due yet: the lead just entered the stage.
    let due = json_output(&tmp, &["due", "--json"]);
    assert_eq!(due.as_array().unwrap().len(), 0);

    // Time-travel 25 hours forward: due, with elapsed hours annotated.
    let later = (Utc::now() + Duration::hours(25)).to_rfc3339();
    let due = json_output(&tmp, &["due", "--at", &later, "--json"]);
    let arr = due.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["rule_id"].as_str().unwrap(), rule_id);
    let leads = arr[0]["leads"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["lead_id"].as_str().unwrap(), lead_id);
    assert_eq!(leads[0]["elapsed_hours"].as_i64().unwrap(), 25);

    // Acknowledge; the rule stops firing for this stay.
    let ack = json_output(&tmp, &["mark-sent", &rule_id, &lead_id, "--json"]);
    assert_eq!(ack["status"].as_str().unwrap(), "acknowledged");
    let due = json_output(&tmp, &["due", "--at", &later, "--json"]);
    assert_eq!(due.as_array().unwrap().len(), 0);

    // Double-click is a no-op, not an error.
    let ack = json_output(&tmp, &["mark-sent", &rule_id, &lead_id, "--json"]);
    assert_eq!(ack["status"].as_str().unwrap(), "already_acknowledged");

    // Leaving and re-entering the stage resets the clock AND the ack.
    fnl().args(["move", &lead_id, "respuesta_recibida"])
        .current_dir(tmp.path())
        .assert()
        .success();
    fnl().args(["move", &lead_id, "mensaje_conexion"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let due = json_output(&tmp, &["due", "--at", &later, "--json"]);
    assert_eq!(
        due.as_array().unwrap().len(),
        1,
        "old ack must not suppress the new stage entry"
    );

    // Deactivated rules never fire.
    fnl().args(["rule", "disable", &rule_id])
        .current_dir(tmp.path())
        .assert()
        .success();
    let due = json_output(&tmp, &["due", "--at", &later, "--json"]);
    assert_eq!(due.as_array().unwrap().len(), 0);

    // mark-sent for a missing rule is an error.
    fnl().args(["mark-sent", "fr-zzzzz", &lead_id])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn rule_management() {
    let tmp = init_project();
    let rule_id = create_rule(&tmp, "Follow up", "48", "propuesta_enviada");

    let rules = json_output(&tmp, &["rule", "list", "--json"]);
    let arr = rules.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"].as_str().unwrap(), rule_id);
    assert_eq!(arr[0]["delay_hours"].as_i64().unwrap(), 48);
    assert_eq!(arr[0]["active"].as_bool().unwrap(), true);

    fnl().args(["rule", "disable", &rule_id])
        .current_dir(tmp.path())
        .assert()
        .success();
    let rules = json_output(&tmp, &["rule", "list", "--json"]);
    assert_eq!(rules[0]["active"].as_bool().unwrap(), false);

    fnl().args(["rule", "rm", &rule_id])
        .current_dir(tmp.path())
        .assert()
        .success();
    let rules = json_output(&tmp, &["rule", "list", "--json"]);
    assert_eq!(rules.as_array().unwrap().len(), 0);

    // Rules referencing unknown stages are rejected.
    fnl().args([
        "rule",
        "add",
        "Bad rule",
        "--delay-hours",
        "24",
        "--stage",
        "no_such_stage",
    ])
    .current_dir(tmp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown stage"));
}

// ---------------------------------------------------------------------------
// Flow 5: Stale view and misc
// ---------------------------------------------------------------------------

#[test]
fn stale_lists_parked_conversion_leads() {
    let tmp = init_project();
    let id = create_lead(&tmp, "Pedro Gil", &[]);
    fnl().args(["move", &id, "cliente_cerrado"])
        .current_dir(tmp.path())
        .assert()
        .success();

    // Freshly parked: not stale at the default threshold.
    let stale = json_output(&tmp, &["stale", "--json"]);
    assert_eq!(stale.as_array().unwrap().len(), 0);

    // With a zero-day threshold the parked lead shows up.
    let stale = json_output(&tmp, &["stale", "--days", "0", "--json"]);
    let arr = stale.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["lead"]["id"].as_str().unwrap(), id);

    // Converting clears the view even at zero days.
    fnl().args(["convert", &id])
        .current_dir(tmp.path())
        .assert()
        .success();
    let stale = json_output(&tmp, &["stale", "--days", "0", "--json"]);
    assert_eq!(stale.as_array().unwrap().len(), 0);
}

#[test]
fn version_outputs_json() {
    let tmp = TempDir::new().unwrap();
    let version = json_output(&tmp, &["version", "--json"]);
    assert!(version["version"].as_str().is_some());
    assert!(version["os"].as_str().is_some());
}

#[test]
fn commands_fail_cleanly_without_project() {
    let tmp = TempDir::new().unwrap();
    fnl().args(["list"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("fnl init"));
}
