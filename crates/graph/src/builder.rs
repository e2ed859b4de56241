use crate::types::{RelationKind, Relationship};
use catalog_model::{AlgorithmId, AlgorithmRecord, Direction};
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Most producers/consumers considered per shared property type, applied to
/// each side before the cross product.
const WORKSPACE_FLOW_FAN_CAP: usize = 50;

/// Largest category that still produces co-membership edges.
const SAME_CATEGORY_MAX_MEMBERS: usize = 20;

/// Derives the typed relationship set from a catalog snapshot.
///
/// The derivation is deterministic: the same records produce the same edge
/// set, modulo ordering. Referenced names missing from the snapshot are
/// skipped silently; catalogs are incomplete by nature and no derivation pass
/// is allowed to fail the build.
pub struct RelationshipBuilder<'a> {
    records: &'a [AlgorithmRecord],
    latest: HashMap<&'a str, AlgorithmId>,
}

/// Collects edges while rejecting same-kind duplicates per ordered pair.
struct EdgeSink {
    edges: Vec<Relationship>,
    seen: HashSet<(AlgorithmId, AlgorithmId, RelationKind)>,
}

impl EdgeSink {
    fn new() -> Self {
        Self {
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, rel: Relationship) -> bool {
        let key = (rel.from.clone(), rel.to.clone(), rel.kind);
        if self.seen.insert(key) {
            self.edges.push(rel);
            true
        } else {
            false
        }
    }
}

impl<'a> RelationshipBuilder<'a> {
    pub fn new(records: &'a [AlgorithmRecord]) -> Self {
        let mut latest: HashMap<&str, (u32, AlgorithmId)> = HashMap::new();
        for record in records {
            match latest.get(record.name.as_str()) {
                Some((version, _)) if *version >= record.version => {}
                _ => {
                    latest.insert(record.name.as_str(), (record.version, record.id()));
                }
            }
        }

        Self {
            records,
            latest: latest.into_iter().map(|(k, (_, id))| (k, id)).collect(),
        }
    }

    /// Run every derivation pass and return the combined edge set.
    pub fn build(&self) -> Vec<Relationship> {
        log::info!("Building relationships for {} records", self.records.len());

        let mut sink = EdgeSink::new();
        self.collect_see_also(&mut sink);
        self.collect_workspace_flow(&mut sink);
        self.collect_calls_child(&mut sink);
        self.collect_replaced_by(&mut sink);
        self.collect_same_category(&mut sink);

        log::info!("Built {} relationships", sink.edges.len());
        sink.edges
    }

    /// Resolve a referenced name to the highest-version entry of that name.
    fn resolve_latest(&self, name: &str) -> Option<&AlgorithmId> {
        self.latest.get(name)
    }

    fn collect_see_also(&self, sink: &mut EdgeSink) {
        let mut count = 0usize;
        for record in self.records {
            let from = record.id();
            for related_name in &record.see_also {
                let Some(to) = self.resolve_latest(related_name) else {
                    log::debug!("see_also target not in catalog: {related_name}");
                    continue;
                };
                let rel = Relationship {
                    from: from.clone(),
                    to: to.clone(),
                    kind: RelationKind::SeeAlso,
                    weight: RelationKind::SeeAlso.default_weight(),
                    metadata: BTreeMap::from([(
                        "source".to_string(),
                        "algorithm_metadata".to_string(),
                    )]),
                };
                if sink.push(rel) {
                    count += 1;
                }
            }
        }
        log::info!("see_also: {count} edges");
    }

    fn collect_workspace_flow(&self, sink: &mut EdgeSink) {
        // BTreeMap keeps type iteration deterministic across runs.
        let mut producers: BTreeMap<&str, Vec<(AlgorithmId, &str)>> = BTreeMap::new();
        let mut consumers: BTreeMap<&str, Vec<(AlgorithmId, &str)>> = BTreeMap::new();

        for record in self.records {
            let id = record.id();
            for prop in &record.properties {
                let slot = match prop.direction {
                    Direction::Output => &mut producers,
                    Direction::Input => &mut consumers,
                    Direction::InOut => continue,
                };
                slot.entry(prop.type_name.as_str())
                    .or_default()
                    .push((id.clone(), prop.name.as_str()));
            }
        }

        let mut count = 0usize;
        for (type_name, producer_list) in &producers {
            let Some(consumer_list) = consumers.get(type_name) else {
                continue;
            };

            // Cap each side before the cross product to bound graph size.
            let producer_list = &producer_list[..producer_list.len().min(WORKSPACE_FLOW_FAN_CAP)];
            let consumer_list = &consumer_list[..consumer_list.len().min(WORKSPACE_FLOW_FAN_CAP)];

            for (prod_id, prod_prop) in producer_list {
                for (cons_id, cons_prop) in consumer_list {
                    if prod_id == cons_id {
                        continue;
                    }
                    let rel = Relationship {
                        from: prod_id.clone(),
                        to: cons_id.clone(),
                        kind: RelationKind::WorkspaceFlow,
                        weight: RelationKind::WorkspaceFlow.default_weight(),
                        metadata: BTreeMap::from([
                            ("workspace_type".to_string(), (*type_name).to_string()),
                            ("output_property".to_string(), (*prod_prop).to_string()),
                            ("input_property".to_string(), (*cons_prop).to_string()),
                        ]),
                    };
                    if sink.push(rel) {
                        count += 1;
                    }
                }
            }
        }
        log::info!("workspace_flow: {count} edges across {} types", producers.len());
    }

    fn collect_calls_child(&self, sink: &mut EdgeSink) {
        let mut count = 0usize;
        for record in self.records {
            let from = record.id();
            for child_name in &record.child_algorithms {
                let Some(to) = self.resolve_latest(child_name) else {
                    log::debug!("child algorithm not in catalog: {child_name}");
                    continue;
                };
                let rel = Relationship {
                    from: from.clone(),
                    to: to.clone(),
                    kind: RelationKind::CallsChild,
                    weight: RelationKind::CallsChild.default_weight(),
                    metadata: BTreeMap::from([
                        ("parent".to_string(), from.to_string()),
                        ("child".to_string(), to.to_string()),
                    ]),
                };
                if sink.push(rel) {
                    count += 1;
                }
            }
        }
        log::info!("calls_child: {count} edges");
    }

    fn collect_replaced_by(&self, sink: &mut EdgeSink) {
        let mut count = 0usize;
        for record in self.records {
            if !record.deprecated {
                continue;
            }
            let Some(replacement_name) = record.deprecated_by.as_deref().filter(|n| !n.is_empty())
            else {
                continue;
            };
            let Some(to) = self.resolve_latest(replacement_name) else {
                log::debug!("replacement not in catalog: {replacement_name}");
                continue;
            };
            let from = record.id();
            let rel = Relationship {
                from: from.clone(),
                to: to.clone(),
                kind: RelationKind::ReplacedBy,
                weight: RelationKind::ReplacedBy.default_weight(),
                metadata: BTreeMap::from([
                    ("deprecated".to_string(), from.to_string()),
                    ("replacement".to_string(), to.to_string()),
                ]),
            };
            if sink.push(rel) {
                count += 1;
            }
        }
        log::info!("replaced_by: {count} edges");
    }

    fn collect_same_category(&self, sink: &mut EdgeSink) {
        let mut groups: BTreeMap<&str, Vec<AlgorithmId>> = BTreeMap::new();
        for record in self.records {
            let id = record.id();
            for category in &record.categories {
                groups.entry(category.as_str()).or_default().push(id.clone());
            }
        }

        let mut count = 0usize;
        for (category, members) in &groups {
            // Singletons carry no signal; big categories explode quadratically.
            if members.len() <= 1 || members.len() > SAME_CATEGORY_MAX_MEMBERS {
                continue;
            }
            for (first, second) in members.iter().tuple_combinations() {
                let rel = Relationship {
                    from: first.clone(),
                    to: second.clone(),
                    kind: RelationKind::SameCategory,
                    weight: RelationKind::SameCategory.default_weight(),
                    metadata: BTreeMap::from([(
                        "category".to_string(),
                        (*category).to_string(),
                    )]),
                };
                if sink.push(rel) {
                    count += 1;
                }
            }
        }
        log::info!("same_category: {count} edges");
    }
}

/// Count relationships by kind.
pub fn relationship_statistics(relationships: &[Relationship]) -> BTreeMap<RelationKind, usize> {
    let mut stats = BTreeMap::new();
    for rel in relationships {
        *stats.entry(rel.kind).or_insert(0) += 1;
    }
    stats
}
