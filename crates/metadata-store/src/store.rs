use crate::error::{MetadataStoreError, Result};
use crate::schema::SCHEMA;
use catalog_graph::Relationship;
use catalog_model::{
    AlgorithmRecord, Direction, DocRecord, EmbeddingFacet, PropertyRecord, MAX_REFERENCES,
    MAX_USAGE_EXAMPLES,
};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Denormalized read-back of one algorithm: entry row, nested properties,
/// and documentation when present.
#[derive(Debug, Clone)]
pub struct AlgorithmEntry {
    pub id: i64,
    pub record: AlgorithmRecord,
    pub documentation: Option<DocRecord>,
}

/// SQLite-backed store of catalog entries for one snapshot.
pub struct MetadataStore {
    conn: Connection,
}

impl MetadataStore {
    /// Create a fresh store, replacing any file already at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        log::info!("Metadata store created at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an existing store read-only. A missing file is an error; the
    /// query path never operates on a partially built snapshot.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Insert an algorithm with its properties and category links.
    /// Returns the integer identity.
    pub fn insert_algorithm(&mut self, record: &AlgorithmRecord) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO algorithms (name, version, summary, category, language, deprecated, deprecated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.name,
                record.version,
                record.summary,
                record.category,
                record.language,
                record.deprecated,
                record.deprecated_by,
            ],
        )?;
        let algorithm_id = tx.last_insert_rowid();

        {
            let mut insert_prop = tx.prepare(
                "INSERT INTO properties (algorithm_id, name, type, direction, optional, default_value, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for prop in &record.properties {
                insert_prop.execute(params![
                    algorithm_id,
                    prop.name,
                    prop.type_name,
                    prop.direction.as_str(),
                    prop.optional,
                    prop.default_value,
                    prop.description,
                ])?;
            }
        }

        for category in &record.categories {
            let category_id: i64 = match tx
                .query_row(
                    "SELECT id FROM categories WHERE name = ?1",
                    params![category],
                    |row| row.get(0),
                )
                .optional()?
            {
                Some(id) => id,
                None => {
                    tx.execute("INSERT INTO categories (name) VALUES (?1)", params![category])?;
                    tx.last_insert_rowid()
                }
            };
            tx.execute(
                "INSERT OR IGNORE INTO algorithm_categories (algorithm_id, category_id) VALUES (?1, ?2)",
                params![algorithm_id, category_id],
            )?;
        }

        tx.commit()?;
        Ok(algorithm_id)
    }

    /// Insert documentation, joined by `(name, version)`. Returns `false`
    /// when the owning algorithm is not in the store.
    pub fn insert_documentation(&mut self, doc: &DocRecord) -> Result<bool> {
        let Some(algorithm_id) = self.algorithm_id(&doc.algorithm_name, doc.version)? else {
            log::warn!("documentation for unknown algorithm: {}", doc.id());
            return Ok(false);
        };

        let examples: Vec<&String> = doc.usage_examples.iter().take(MAX_USAGE_EXAMPLES).collect();
        let refs: Vec<&String> = doc.references.iter().take(MAX_REFERENCES).collect();

        self.conn.execute(
            "INSERT INTO documentation (algorithm_id, full_description, usage_examples, refs)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                algorithm_id,
                doc.full_description,
                serde_json::to_string(&examples)?,
                serde_json::to_string(&refs)?,
            ],
        )?;
        Ok(true)
    }

    /// Insert a relationship row by resolving both endpoints to integer
    /// identities. Rows referencing unknown endpoints are skipped, not
    /// rejected wholesale. Returns `true` when a row was actually written.
    pub fn insert_relationship(&mut self, rel: &Relationship) -> Result<bool> {
        let endpoints = (rel.from.parse(), rel.to.parse());
        let ((from_name, from_version), (to_name, to_version)) = match endpoints {
            (Some(from), Some(to)) => (from, to),
            _ => {
                log::warn!("relationship with malformed endpoint: {} -> {}", rel.from, rel.to);
                return Ok(false);
            }
        };

        let from_id = self.algorithm_id(from_name, from_version)?;
        let to_id = self.algorithm_id(to_name, to_version)?;
        let (Some(from_id), Some(to_id)) = (from_id, to_id) else {
            log::warn!("relationship endpoint not in store: {} -> {}", rel.from, rel.to);
            return Ok(false);
        };

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO relationships (from_algorithm_id, to_algorithm_id, relationship_type, weight, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                from_id,
                to_id,
                rel.kind.as_str(),
                rel.weight as f64,
                serde_json::to_string(&rel.metadata)?,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Record the `(vector index internal id) -> (algorithm, facet)` mapping.
    pub fn insert_embedding_row(
        &mut self,
        vector_id: usize,
        algorithm_id: i64,
        facet: EmbeddingFacet,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO embeddings (vector_id, algorithm_id, facet) VALUES (?1, ?2, ?3)",
            params![vector_id as i64, algorithm_id, facet.as_str()],
        )?;
        Ok(())
    }

    /// Integer identity for `(name, version)`, if present.
    pub fn algorithm_id(&self, name: &str, version: u32) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM algorithms WHERE name = ?1 AND version = ?2",
                params![name, version],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Full denormalized record by integer identity.
    pub fn get_algorithm(&self, id: i64) -> Result<Option<AlgorithmEntry>> {
        let header = self
            .conn
            .query_row(
                "SELECT name, version, summary, category, language, deprecated, deprecated_by
                 FROM algorithms WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, bool>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, version, summary, category, language, deprecated, deprecated_by)) = header
        else {
            return Ok(None);
        };

        let properties = self.properties_of(id)?;
        let categories = self.categories_of(id)?;
        let documentation = self.documentation_of(id, &name, version)?;

        Ok(Some(AlgorithmEntry {
            id,
            record: AlgorithmRecord {
                name,
                version,
                summary,
                category,
                categories,
                // Raw reference lists are distilled into relationship rows at
                // ingest time and not kept as columns.
                see_also: Vec::new(),
                deprecated,
                deprecated_by,
                properties,
                child_algorithms: Vec::new(),
                language,
            },
            documentation,
        }))
    }

    fn properties_of(&self, algorithm_id: i64) -> Result<Vec<PropertyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, direction, optional, default_value, description
             FROM properties WHERE algorithm_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![algorithm_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut properties = Vec::new();
        for row in rows {
            let (name, type_name, direction, optional, default_value, description) = row?;
            let direction = Direction::parse(&direction).ok_or_else(|| {
                MetadataStoreError::MalformedRow(format!("unknown direction: {direction}"))
            })?;
            properties.push(PropertyRecord {
                name,
                type_name,
                direction,
                optional,
                default_value,
                description,
            });
        }
        Ok(properties)
    }

    fn categories_of(&self, algorithm_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name FROM categories c
             JOIN algorithm_categories ac ON ac.category_id = c.id
             WHERE ac.algorithm_id = ?1 ORDER BY c.id",
        )?;
        let rows = stmt.query_map(params![algorithm_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn documentation_of(
        &self,
        algorithm_id: i64,
        name: &str,
        version: u32,
    ) -> Result<Option<DocRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT full_description, usage_examples, refs
                 FROM documentation WHERE algorithm_id = ?1",
                params![algorithm_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((full_description, examples_json, refs_json)) = row else {
            return Ok(None);
        };

        Ok(Some(DocRecord {
            algorithm_name: name.to_string(),
            version,
            full_description,
            usage_examples: serde_json::from_str(&examples_json)?,
            references: serde_json::from_str(&refs_json)?,
        }))
    }

    /// Resolve a vector-index internal id to its `(algorithm, facet)` target.
    pub fn embedding_target(&self, vector_id: usize) -> Result<Option<(i64, EmbeddingFacet)>> {
        let row = self
            .conn
            .query_row(
                "SELECT algorithm_id, facet FROM embeddings WHERE vector_id = ?1",
                params![vector_id as i64],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((algorithm_id, facet)) = row else {
            return Ok(None);
        };
        let facet = EmbeddingFacet::parse(&facet)
            .ok_or_else(|| MetadataStoreError::MalformedRow(format!("unknown facet: {facet}")))?;
        Ok(Some((algorithm_id, facet)))
    }

    pub fn algorithm_count(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM algorithms", [], |row| row.get::<_, i64>(0))?
            as usize)
    }

    pub fn relationship_count(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM relationships", [], |row| {
                row.get::<_, i64>(0)
            })? as usize)
    }

    pub fn embedding_count(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| {
                row.get::<_, i64>(0)
            })? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_graph::RelationKind;
    use catalog_model::AlgorithmId;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_record() -> AlgorithmRecord {
        AlgorithmRecord {
            name: "Rebin".to_string(),
            version: 1,
            summary: "Rebins data".to_string(),
            category: "Transforms".to_string(),
            categories: vec!["Transforms".to_string(), "Rebin".to_string()],
            see_also: vec!["ResampleX".to_string()],
            deprecated: false,
            deprecated_by: None,
            properties: vec![PropertyRecord {
                name: "InputWorkspace".to_string(),
                type_name: "MatrixWorkspace".to_string(),
                direction: Direction::Input,
                optional: false,
                default_value: None,
                description: "The workspace to rebin".to_string(),
            }],
            child_algorithms: Vec::new(),
            language: "cpp".to_string(),
        }
    }

    fn store_in(dir: &TempDir) -> MetadataStore {
        MetadataStore::create(dir.path().join("catalog.db")).unwrap()
    }

    #[test]
    fn insert_and_read_back_denormalized() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let id = store.insert_algorithm(&sample_record()).unwrap();
        store
            .insert_documentation(&DocRecord {
                algorithm_name: "Rebin".to_string(),
                version: 1,
                full_description: "Long description".to_string(),
                usage_examples: vec!["ws = Rebin(ws, '0,100,1000')".to_string()],
                references: vec!["doi:10.1000/rebin".to_string()],
            })
            .unwrap();

        let entry = store.get_algorithm(id).unwrap().unwrap();
        assert_eq!(entry.record.name, "Rebin");
        assert_eq!(entry.record.categories, vec!["Transforms", "Rebin"]);
        assert_eq!(entry.record.properties.len(), 1);
        assert_eq!(entry.record.properties[0].direction, Direction::Input);

        let doc = entry.documentation.unwrap();
        assert_eq!(doc.full_description, "Long description");
        assert_eq!(doc.usage_examples.len(), 1);
    }

    #[test]
    fn missing_algorithm_reads_back_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get_algorithm(999).unwrap().is_none());
    }

    #[test]
    fn documentation_caps_examples_and_references() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert_algorithm(&sample_record()).unwrap();

        let doc = DocRecord {
            algorithm_name: "Rebin".to_string(),
            version: 1,
            full_description: String::new(),
            usage_examples: (0..8).map(|i| format!("example {i}")).collect(),
            references: (0..12).map(|i| format!("ref {i}")).collect(),
        };
        assert!(store.insert_documentation(&doc).unwrap());

        let id = store.algorithm_id("Rebin", 1).unwrap().unwrap();
        let stored = store.get_algorithm(id).unwrap().unwrap().documentation.unwrap();
        assert_eq!(stored.usage_examples.len(), 5);
        assert_eq!(stored.references.len(), 10);
    }

    #[test]
    fn documentation_for_unknown_algorithm_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let doc = DocRecord {
            algorithm_name: "Ghost".to_string(),
            version: 1,
            ..DocRecord::default()
        };
        assert!(!store.insert_documentation(&doc).unwrap());
    }

    fn relationship(from: &str, to: &str, kind: RelationKind) -> Relationship {
        Relationship {
            from: AlgorithmId::from_raw(from),
            to: AlgorithmId::from_raw(to),
            kind,
            weight: kind.default_weight(),
            metadata: BTreeMap::from([("source".to_string(), "test".to_string())]),
        }
    }

    #[test]
    fn relationships_resolve_endpoints_or_skip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert_algorithm(&sample_record()).unwrap();
        let mut other = sample_record();
        other.name = "ResampleX".to_string();
        store.insert_algorithm(&other).unwrap();

        assert!(store
            .insert_relationship(&relationship("Rebin-v1", "ResampleX-v1", RelationKind::SeeAlso))
            .unwrap());
        assert!(!store
            .insert_relationship(&relationship("Rebin-v1", "Ghost-v1", RelationKind::SeeAlso))
            .unwrap());
        assert_eq!(store.relationship_count().unwrap(), 1);
    }

    #[test]
    fn same_kind_duplicate_rows_are_ignored() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert_algorithm(&sample_record()).unwrap();
        let mut other = sample_record();
        other.name = "ResampleX".to_string();
        store.insert_algorithm(&other).unwrap();

        let rel = relationship("Rebin-v1", "ResampleX-v1", RelationKind::SeeAlso);
        assert!(store.insert_relationship(&rel).unwrap());
        assert!(!store.insert_relationship(&rel).unwrap());

        // A different kind between the same pair is a separate row.
        assert!(store
            .insert_relationship(&relationship(
                "Rebin-v1",
                "ResampleX-v1",
                RelationKind::SameCategory
            ))
            .unwrap());
        assert_eq!(store.relationship_count().unwrap(), 2);
    }

    #[test]
    fn embedding_mapping_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let id = store.insert_algorithm(&sample_record()).unwrap();

        store.insert_embedding_row(0, id, EmbeddingFacet::Summary).unwrap();
        store.insert_embedding_row(1, id, EmbeddingFacet::Full).unwrap();

        assert_eq!(
            store.embedding_target(0).unwrap(),
            Some((id, EmbeddingFacet::Summary))
        );
        assert_eq!(
            store.embedding_target(1).unwrap(),
            Some((id, EmbeddingFacet::Full))
        );
        assert_eq!(store.embedding_target(7).unwrap(), None);
        assert_eq!(store.embedding_count().unwrap(), 2);
    }

    #[test]
    fn open_requires_an_existing_file() {
        let dir = TempDir::new().unwrap();
        assert!(MetadataStore::open(dir.path().join("absent.db")).is_err());
    }

    #[test]
    fn open_is_read_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let mut store = MetadataStore::create(&path).unwrap();
            store.insert_algorithm(&sample_record()).unwrap();
        }

        let mut reopened = MetadataStore::open(&path).unwrap();
        assert_eq!(reopened.algorithm_count().unwrap(), 1);
        assert!(reopened.insert_algorithm(&sample_record()).is_err());
    }
}
