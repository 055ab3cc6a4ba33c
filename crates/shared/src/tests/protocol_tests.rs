use super::*;

#[test]
fn notification_omits_missing_description() {
    let value = serde_json::to_value(Notification::success("Sponsor added successfully!"))
        .expect("json");
    assert_eq!(value["level"], "success");
    assert!(value.get("description").is_none());
}

#[test]
fn delete_decision_reads_confirm_flag() {
    let decision: DeleteDecision =
        serde_json::from_str(r#"{"confirm":false}"#).expect("decision");
    assert!(!decision.confirm);
}
