use vigil_review::ticket::extract_ticket;

#[test]
fn title_with_reference_yields_the_ticket() {
    let id = extract_ticket("PROJ-123: fix bug", "", "main");
    assert_eq!(id.as_deref(), Some("PROJ-123"));
}

#[test]
fn no_reference_anywhere_yields_not_found() {
    assert!(extract_ticket("fix bug", "small cleanup", "main").is_none());
}

#[test]
fn unhyphenated_token_is_not_a_reference() {
    assert!(extract_ticket("proj123", "", "main").is_none());
}

#[test]
fn branch_name_is_scanned_last() {
    let id = extract_ticket("fix bug", "", "feature/CORE-55-retry");
    assert_eq!(id.as_deref(), Some("CORE-55"));
}
