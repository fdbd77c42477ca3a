use super::*;
use std::str::FromStr;

#[test]
fn test_typed_id_roundtrips_inner_value() {
    let id = UserId::new(42);
    assert_eq!(id.into_inner(), 42);
    assert_eq!(i32::from(SchoolId::from(7)), 7);
}

#[test]
fn test_typed_id_display() {
    assert_eq!(SchoolId::new(3).to_string(), "3");
}

#[test]
fn test_typed_id_from_str() {
    assert_eq!(UserId::from_str("19").unwrap(), UserId::new(19));
    assert!(UserId::from_str("nineteen").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let json = serde_json::to_string(&SchoolId::new(5)).unwrap();
    assert_eq!(json, "5");

    let back: SchoolId = serde_json::from_str("5").unwrap();
    assert_eq!(back, SchoolId::new(5));
}
