use super::*;

#[test]
fn intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("MyType");
    let b = interner.intern("MyType");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "MyType");
}

#[test]
fn distinct_spellings_get_distinct_names() {
    let interner = StringInterner::new();
    let upper = interner.intern("Value");
    let lower = interner.intern("value");
    assert_ne!(upper, lower);
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn vocabulary_is_pre_interned() {
    let interner = StringInterner::new();
    assert!(interner.get("INTEGER").is_some());
    assert!(interner.get("&Type").is_some());
    assert!(interner.get("not-interned-yet").is_none());
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert!(interner.get("fresh-name").is_none());
    assert_eq!(interner.len(), before);
    interner.intern("fresh-name");
    assert_eq!(interner.len(), before + 1);
}

#[test]
fn unknown_name_renders_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(u32::MAX)), "");
}

#[test]
fn lookup_trait_matches_inherent() {
    fn render<L: StringLookup>(lookup: &L, name: Name) -> String {
        lookup.lookup(name).to_owned()
    }
    let interner = StringInterner::new();
    let name = interner.intern("Rocket");
    assert_eq!(render(&interner, name), "Rocket");
}
