//! Minimal schema vocabulary for the DDL surface adapters expose.

/// Definition of a table (relational) or collection (document).
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            ty,
            primary_key: false,
        });
        self
    }

    pub fn id(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            ty: ColumnType::Id,
            primary_key: true,
        });
        self
    }

    pub fn primary_key_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.primary_key)
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Record identifier, stored as text on the relational backend.
    Id,
    Text,
    Integer,
    Real,
    Bool,
}
