//! Sample record types and unit-of-work helpers.
//!
//! Every helper uses a private store or database, so tests never share
//! state through [`MemoryStore::global`].

use tabula_core::{
    Entity, HardDelete, MemoryDatabase, MemoryDriver, MemoryStore, MemoryUnitOfWork,
    RelationalUnitOfWork, Row, SoftDelete, SoftDeletion,
};
use tracing_subscriber::EnvFilter;

/// A record type with physical deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Widget {
    /// Identity.
    pub id: u32,
    /// Display name.
    pub name: String,
}

impl Row for Widget {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

impl Entity for Widget {
    type Deletion = HardDelete;
}

/// Creates a widget.
pub fn widget(id: u32, name: &str) -> Widget {
    Widget {
        id,
        name: name.to_string(),
    }
}

/// A record type with soft deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Post {
    /// Identity.
    pub id: u32,
    /// Title.
    pub title: String,
    /// Deletion flag.
    pub deleted: bool,
}

impl Row for Post {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

impl SoftDelete for Post {
    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

impl Entity for Post {
    type Deletion = SoftDeletion;
}

/// Creates a live post.
pub fn post(id: u32, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        deleted: false,
    }
}

/// Creates an in-memory unit of work over a private store.
pub fn memory_uow() -> MemoryUnitOfWork {
    MemoryUnitOfWork::with_store(MemoryStore::new())
}

/// Creates an in-memory unit of work whose store holds `widgets`.
pub fn seeded_memory_uow(widgets: Vec<Widget>) -> MemoryUnitOfWork {
    let mut uow = memory_uow();
    uow.populate_table(widgets)
        .expect("Failed to populate widgets");
    uow
}

/// A relational unit of work together with the database it writes to.
pub struct TestDatabase {
    /// The shared database.
    pub database: MemoryDatabase,
    /// A unit of work on its own connection.
    pub uow: RelationalUnitOfWork<MemoryDriver>,
}

impl TestDatabase {
    /// Creates a database whose store has been initialized.
    pub fn new() -> Self {
        let database = MemoryDatabase::new();
        let mut uow = RelationalUnitOfWork::new(database.connect());
        uow.initialize_database()
            .expect("Failed to initialize database");
        Self { database, uow }
    }

    /// Creates an initialized database holding `widgets`.
    pub fn with_widgets(widgets: Vec<Widget>) -> Self {
        let test_db = Self::new();
        test_db
            .database
            .seed(widgets)
            .expect("Failed to seed widgets");
        test_db
    }

    /// Opens another unit of work on a fresh connection.
    pub fn connect(&self) -> RelationalUnitOfWork<MemoryDriver> {
        RelationalUnitOfWork::new(self.database.connect())
    }

    /// Returns the committed widgets.
    pub fn widgets(&self) -> Vec<Widget> {
        self.database.rows::<Widget>()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = RelationalUnitOfWork<MemoryDriver>;

    fn deref(&self) -> &Self::Target {
        &self.uow
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.uow
    }
}

/// Installs a test-friendly tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `warn`. Safe to call
/// from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
