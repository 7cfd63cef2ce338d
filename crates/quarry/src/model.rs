/// The boundary to an external model layer.
///
/// Implementors name the table a model maps to; the primary key falls back
/// to the bound backend's convention (`id` vs `_id`) when left at `None`.
pub trait Model {
    const TABLE: &'static str;

    const PRIMARY_KEY: Option<&'static str> = None;
}
