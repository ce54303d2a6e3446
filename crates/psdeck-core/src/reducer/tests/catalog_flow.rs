use super::*;
use pretty_assertions::assert_eq;

#[test]
fn session_start_requests_the_catalog() {
    let mut state = state();
    let effects = runtime(&mut state, RuntimeAction::SessionStarted);

    assert!(matches!(
        effects.as_slice(),
        [SessionEffect::FetchCatalog { .. }, SessionEffect::RequestFrame]
    ));
    assert_eq!(state.screen, Screen::Catalog);
    assert_eq!(state.catalog.status, CatalogStatus::Loading);
}

#[test]
fn catalog_keeps_service_order() {
    let state = loaded_state(vec![
        script("Zeta", Vec::new()),
        script("Alpha", Vec::new()),
        script("Mid", Vec::new()),
    ]);
    let ids: Vec<&str> = state.catalog.scripts.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn transport_failure_shows_error_then_retry_populates() {
    let mut state = state();
    let first = fetch_id(&runtime(&mut state, RuntimeAction::SessionStarted));
    runtime(
        &mut state,
        RuntimeAction::CatalogLoaded {
            request_id: first,
            result: Err(CatalogUnavailable::new("connection refused")),
        },
    );
    assert_eq!(
        state.catalog.status,
        CatalogStatus::Unavailable(CatalogUnavailable::new("connection refused"))
    );
    assert!(state.catalog.scripts.is_empty());

    // Selecting from an unavailable catalog goes nowhere.
    assert!(user(&mut state, UserAction::SelectScript(0)).is_empty());
    assert_eq!(state.screen, Screen::Catalog);

    let effects = user(&mut state, UserAction::RefreshCatalog);
    let retry = fetch_id(&effects);
    assert_ne!(retry, first);
    assert_eq!(state.catalog.status, CatalogStatus::Loading);

    runtime(
        &mut state,
        RuntimeAction::CatalogLoaded {
            request_id: retry,
            result: Ok(two_scripts()),
        },
    );
    assert_eq!(state.catalog.status, CatalogStatus::Ready);
    assert_eq!(state.catalog.scripts.len(), 2);
    assert_eq!(state.screen, Screen::Catalog);
}

#[test]
fn superseded_fetch_result_is_dropped() {
    let mut state = state();
    let first = fetch_id(&runtime(&mut state, RuntimeAction::SessionStarted));
    let second = fetch_id(&user(&mut state, UserAction::RefreshCatalog));

    let effects = runtime(
        &mut state,
        RuntimeAction::CatalogLoaded {
            request_id: first,
            result: Ok(vec![script("Old", Vec::new())]),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.catalog.status, CatalogStatus::Loading);

    runtime(
        &mut state,
        RuntimeAction::CatalogLoaded {
            request_id: second,
            result: Ok(two_scripts()),
        },
    );
    assert_eq!(state.catalog.scripts.len(), 2);
}

#[test]
fn highlight_moves_and_selects() {
    let mut state = loaded_state(two_scripts());

    user(&mut state, UserAction::CatalogMoveUp);
    assert_eq!(state.catalog.highlighted, 1);

    user(&mut state, UserAction::SelectHighlighted);
    assert_eq!(state.screen, Screen::ScriptDetail);
    assert_eq!(
        state.selected_script().map(|s| s.id.as_str()),
        Some("Test-NetworkConnection")
    );
    assert_eq!(state.params.script_id(), Some("Test-NetworkConnection"));
}

#[test]
fn selecting_out_of_range_is_a_no_op() {
    let mut state = loaded_state(two_scripts());
    assert!(user(&mut state, UserAction::SelectScript(7)).is_empty());
    assert_eq!(state.screen, Screen::Catalog);
    assert!(state.selection.is_none());
}

#[test]
fn empty_catalog_ignores_navigation() {
    let mut state = loaded_state(Vec::new());
    assert!(user(&mut state, UserAction::CatalogMoveDown).is_empty());
    assert!(user(&mut state, UserAction::SelectHighlighted).is_empty());
    assert_eq!(state.screen, Screen::Catalog);
}

#[test]
fn catalog_survives_back_navigation_without_refetch() {
    let mut state = loaded_state(two_scripts());
    user(&mut state, UserAction::SelectScript(0));

    let effects = user(&mut state, UserAction::Back);
    assert_eq!(effects, vec![SessionEffect::RequestFrame]);
    assert_eq!(state.screen, Screen::Catalog);
    assert_eq!(state.catalog.scripts.len(), 2);
}
