/// SQL dialect selector.
///
/// SQLite is the only relational backend exercised; the enum exists so
/// placeholder/dialect decisions stay in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Sqlite,
}
