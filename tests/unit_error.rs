use std::path::PathBuf;

use orgtask::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidState("no organization".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let policy = Error::PermissionDenied("Access Denied".to_string());
    assert_eq!(policy.exit_code(), exit_codes::POLICY_BLOCKED);

    let missing = Error::NotFound("Task not found".to_string());
    assert_eq!(missing.exit_code(), exit_codes::NOT_FOUND);

    let op = Error::LockFailed(PathBuf::from(".orgtask/tasks.json.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
    assert!(op.is_storage_failure());
}

#[test]
fn status_codes_follow_taxonomy() {
    assert_eq!(Error::NotFound("x".into()).status_code(), 404);
    assert_eq!(Error::PermissionDenied("x".into()).status_code(), 403);
    assert_eq!(Error::InvalidArgument("x".into()).status_code(), 400);
    assert_eq!(Error::Storage("x".into()).status_code(), 500);
}

#[test]
fn json_error_includes_code() {
    let err = Error::PermissionDenied("Viewers cannot access audit logs".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::POLICY_BLOCKED);
    assert_eq!(json.http_status, 403);
    assert!(json.error.contains("Viewers cannot access audit logs"));
}
