use super::*;

#[test]
fn type_id_none_sentinel() {
    assert!(TypeId::NONE.is_none());
    assert!(!TypeId::from_raw(0).is_none());
    assert_eq!(format!("{:?}", TypeId::NONE), "TypeId::NONE");
}

#[test]
fn type_id_index_matches_raw() {
    let id = TypeId::from_raw(12);
    assert_eq!(id.raw(), 12);
    assert_eq!(id.index(), 12);
    assert_eq!(format!("{id:?}"), "TypeId(12)");
}

#[test]
fn module_id_round_trip() {
    let id = ModuleId::from_raw(3);
    assert_eq!(id.index(), 3);
    assert_eq!(format!("{id:?}"), "ModuleId(3)");
}
