/// Relational schema for one catalog snapshot.
///
/// `see_also` and `child_algorithms` reference lists are not stored as
/// columns; the relationship builder distills them into `relationships` rows
/// before the store is populated.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS algorithms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version INTEGER NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT 'unknown',
    deprecated INTEGER NOT NULL DEFAULT 0,
    deprecated_by TEXT,
    UNIQUE(name, version)
);

CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    algorithm_id INTEGER NOT NULL REFERENCES algorithms(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    direction TEXT NOT NULL,
    optional INTEGER NOT NULL DEFAULT 0,
    default_value TEXT,
    description TEXT NOT NULL DEFAULT '',
    UNIQUE(algorithm_id, name)
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS algorithm_categories (
    algorithm_id INTEGER NOT NULL REFERENCES algorithms(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (algorithm_id, category_id)
);

CREATE TABLE IF NOT EXISTS documentation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    algorithm_id INTEGER NOT NULL UNIQUE REFERENCES algorithms(id) ON DELETE CASCADE,
    full_description TEXT NOT NULL DEFAULT '',
    usage_examples TEXT NOT NULL DEFAULT '[]',
    refs TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS relationships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_algorithm_id INTEGER NOT NULL REFERENCES algorithms(id) ON DELETE CASCADE,
    to_algorithm_id INTEGER NOT NULL REFERENCES algorithms(id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL,
    weight REAL NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    UNIQUE(from_algorithm_id, to_algorithm_id, relationship_type)
);

CREATE TABLE IF NOT EXISTS embeddings (
    vector_id INTEGER PRIMARY KEY,
    algorithm_id INTEGER NOT NULL REFERENCES algorithms(id) ON DELETE CASCADE,
    facet TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_algorithms_name ON algorithms(name);
CREATE INDEX IF NOT EXISTS idx_properties_algorithm ON properties(algorithm_id);
CREATE INDEX IF NOT EXISTS idx_relationships_from ON relationships(from_algorithm_id);
CREATE INDEX IF NOT EXISTS idx_embeddings_algorithm ON embeddings(algorithm_id);
";
