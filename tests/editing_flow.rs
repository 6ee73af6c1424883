// tests/editing_flow.rs
// Edit-mode ingress, revert and selection housekeeping

mod common;

use common::{id, observation, Harness};

use tablesync::{EditEvent, RowState, TableError, TableSchema, Value};

#[tokio::test]
async fn test_revert_all_restores_last_committed_state() {
    let h = Harness::new(
        TableSchema::observations(),
        vec![observation("1"), observation("2")],
    );
    let c = &h.controller;
    let added = c.add_record().unwrap();
    c.set_cell_text(&id("1"), "count", "12").unwrap();
    c.handle_edit_event(EditEvent::Exited {
        row_id: id("1"),
        discard: false,
    });
    c.set_cell_text(&id("2"), "notes", "pending").unwrap();
    assert_eq!(c.row_state(&id("1")), Some(RowState::PersistedEdited));

    let touched = c.revert_all().unwrap();

    assert_eq!(touched, 3);
    assert!(c.row(&added).is_none());
    assert_eq!(c.row(&id("1")).unwrap(), observation("1"));
    assert_eq!(c.row(&id("2")).unwrap(), observation("2"));
    assert!(c.modified_ids().is_empty());
    assert!(c.editing_ids().is_empty());
    assert!(h
        .surface
        .exit_requests
        .borrow()
        .contains(&(id("2"), true)));
    assert_eq!(c.error_indicator(), "0/0");
}

#[tokio::test]
async fn test_discarding_an_added_row_removes_it() {
    let h = Harness::new(TableSchema::observations(), vec![]);
    let c = &h.controller;
    let added = c.add_record().unwrap();
    c.select(&added);

    c.handle_edit_event(EditEvent::Exited {
        row_id: added.clone(),
        discard: true,
    });

    assert_eq!(c.row_count(), 0);
    assert!(c.selected_ids().is_empty());
}

#[tokio::test]
async fn test_editing_back_to_committed_values_clears_modified_state() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;

    c.set_cell_text(&id("1"), "count", "9").unwrap();
    c.handle_edit_event(EditEvent::Exited {
        row_id: id("1"),
        discard: false,
    });
    assert_eq!(c.modified_ids(), vec![id("1")]);

    c.set_cell_text(&id("1"), "count", "3").unwrap();
    c.handle_edit_event(EditEvent::Exited {
        row_id: id("1"),
        discard: false,
    });
    assert_eq!(c.row_state(&id("1")), Some(RowState::Persisted));
    assert!(c.modified_ids().is_empty());
}

#[tokio::test]
async fn test_uncoercible_text_is_kept_and_fails_validation() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;

    c.set_cell_text(&id("1"), "observed_on", "31/02/2024").unwrap();
    assert_eq!(
        c.row(&id("1")).unwrap().get("observed_on"),
        Some(&Value::Unparsable("31/02/2024".into()))
    );

    let err = c.commit().await.unwrap_err();
    assert_eq!(err, TableError::LocalValidation(1));
    let report = c.validation_report();
    let errors = report.errors_for(&id("1")).unwrap();
    assert!(errors[0].message.contains("could not be parsed"));
}

#[tokio::test]
async fn test_enum_text_matches_choice_case_insensitively() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;

    c.set_cell_text(&id("1"), "site", "North ridge").unwrap();
    c.set_cell_text(&id("1"), "survey_method", "POINT_COUNT").unwrap();
    c.set_cell_text(&id("1"), "survey_period", "dawn").unwrap();

    assert_eq!(c.revalidate(), 0);
    assert_eq!(
        c.row(&id("1")).unwrap().get("survey_method"),
        Some(&Value::Choice("point_count".into()))
    );
}

#[tokio::test]
async fn test_stale_and_unknown_events_are_ignored() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;

    c.handle_edit_event(EditEvent::Entered { row_id: id("gone") });
    c.handle_edit_event(EditEvent::CellChanged {
        row_id: id("1"),
        field: "wingspan".into(),
        value: Some(Value::Number(30.0)),
    });
    c.handle_edit_event(EditEvent::Exited {
        row_id: id("gone"),
        discard: false,
    });

    assert_eq!(c.row(&id("1")).unwrap(), observation("1"));
    assert!(matches!(
        c.set_cell_text(&id("gone"), "notes", "x"),
        Err(TableError::StaleReference(_))
    ));
}

#[tokio::test]
async fn test_navigation_follows_host_display_order() {
    let h = Harness::new(
        TableSchema::observations(),
        vec![observation("1"), observation("2")],
    );
    let c = &h.controller;
    c.set_cell_text(&id("1"), "count", "-1").unwrap();
    c.set_cell_text(&id("2"), "species", "").unwrap();
    assert!(c.commit().await.is_err());

    assert_eq!(c.current_error().unwrap().row_id, id("1"));
    c.set_row_order(vec![id("2"), id("1")]);
    assert_eq!(c.current_error().unwrap().row_id, id("2"));

    let next = c.next_error().unwrap();
    assert_eq!((next.row_id, next.field.as_str()), (id("1"), "count"));
    assert_eq!(h.focus.calls.borrow().as_slice(), &[(id("1"), "count".to_string())]);
}

#[tokio::test]
async fn test_load_prunes_selection_to_existing_rows() {
    let h = Harness::new(
        TableSchema::observations(),
        vec![observation("1"), observation("2")],
    );
    let c = &h.controller;
    c.set_selection(vec![id("1"), id("2"), id("ghost")]);
    assert_eq!(c.selected_ids(), vec![id("1"), id("2")]);

    c.load(vec![observation("2"), observation("3")], Some(10)).unwrap();

    assert_eq!(c.selected_ids(), vec![id("2")]);
    assert_eq!(c.remote_count(), Some(10));
}

#[tokio::test]
async fn test_operations_during_commit_are_busy() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;
    h.surface.auto_settle.set(false);
    c.set_cell_text(&id("1"), "notes", "x").unwrap();

    let host = async {
        let mut phase = c.subscribe_phase();
        phase
            .wait_for(|p| !p.is_idle())
            .await
            .unwrap();
        assert_eq!(c.add_record().unwrap_err(), TableError::Busy("commit"));
        assert_eq!(c.revert_all().unwrap_err(), TableError::Busy("commit"));
        assert_eq!(c.refresh().await.unwrap_err(), TableError::Busy("commit"));
        c.handle_edit_event(EditEvent::Exited {
            row_id: id("1"),
            discard: false,
        });
    };
    let (committed, _) = tokio::join!(c.commit(), host);
    assert!(committed.is_ok());
}

#[tokio::test]
async fn test_nan_from_the_surface_is_pending_and_blocks_commit() {
    let h = Harness::new(TableSchema::observations(), vec![observation("1")]);
    let c = &h.controller;

    c.handle_edit_event(EditEvent::Entered { row_id: id("1") });
    c.handle_edit_event(EditEvent::CellChanged {
        row_id: id("1"),
        field: "count".into(),
        value: Some(Value::Number(f64::NAN)),
    });
    c.handle_edit_event(EditEvent::Exited {
        row_id: id("1"),
        discard: false,
    });
    assert_eq!(c.row_state(&id("1")), Some(RowState::PersistedEdited));

    assert_eq!(c.commit().await.unwrap_err(), TableError::LocalValidation(1));
    assert_eq!(h.upsert_count(), 0);
    assert_eq!(c.current_error().unwrap().field, "count");

    c.revert_all().unwrap();
    assert_eq!(c.row_state(&id("1")), Some(RowState::Persisted));
    assert_eq!(c.row(&id("1")).unwrap(), observation("1"));
}
