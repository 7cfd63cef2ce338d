/// Static description of what a backend can do.
#[derive(Debug)]
pub struct Capability {
    /// When true, the backend speaks SQL and queries compile through the
    /// SQL serializer.
    pub sql: bool,

    /// When true, the backend supports multi-statement transactions. When
    /// false, `transaction(..)` degrades to a non-transactional
    /// passthrough.
    pub transactions: bool,

    /// The backend's conventional primary-key column/field name.
    pub primary_key: &'static str,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        sql: true,
        transactions: true,
        primary_key: "id",
    };

    /// MongoDB capabilities.
    ///
    /// Multi-document transactions require a replica set; against the
    /// standalone deployments this engine targets they are unavailable, so
    /// the capability is reported as absent.
    pub const MONGODB: Self = Self {
        sql: false,
        transactions: false,
        primary_key: "_id",
    };
}
