use crate::interner::{Atom, Interner, short_name};

#[test]
fn test_intern_deduplicates() {
    let mut interner = Interner::new();
    let a = interner.intern("app.Logger");
    let b = interner.intern_owned("app.Logger".to_string());
    assert_eq!(a, b);
    assert_eq!(interner.resolve(a), "app.Logger");
}

#[test]
fn test_none_atom_is_empty_string() {
    let interner = Interner::new();
    assert!(Atom::NONE.is_none());
    assert_eq!(interner.resolve(Atom::NONE), "");
    assert!(interner.is_empty());
}

#[test]
fn test_common_strings_are_preinterned() {
    let mut interner = Interner::new();
    interner.intern_common();
    assert!(interner.lookup("kotlin.Any").is_some());
    assert!(interner.lookup("app.Unknown").is_none());
    assert_eq!(interner.try_resolve(Atom(u32::MAX)), None);
}

#[test]
fn test_short_name() {
    assert_eq!(short_name("app.di.Logger"), "Logger");
    assert_eq!(short_name("Logger"), "Logger");
}
