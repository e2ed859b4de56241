use crate::encoder::TextEncoder;
use crate::error::Result;
use catalog_model::{AlgorithmRecord, DocRecord, EmbeddingFacet, PropertyRecord};

/// Usage examples folded into the `usage` facet text.
const USAGE_EXAMPLE_LIMIT: usize = 3;

/// Properties folded into the `full` facet text.
const FULL_PROPERTY_LIMIT: usize = 5;

/// Description characters folded into the `full` facet text.
const FULL_DESCRIPTION_CHARS: usize = 500;

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn format_property(prop: &PropertyRecord) -> String {
    format!(
        "{} ({}, {}): {}",
        prop.name, prop.type_name, prop.direction, prop.description
    )
}

/// Compose the facet texts for one catalog entry.
///
/// `summary` and `full` are always present; `properties` and `usage` only
/// when their source text is non-empty, so an entry yields 2–4 facets.
pub fn facet_texts(
    record: &AlgorithmRecord,
    doc: Option<&DocRecord>,
) -> Vec<(EmbeddingFacet, String)> {
    let mut facets = Vec::with_capacity(4);

    let summary_text = format!("{}: {}", record.name, record.summary);
    facets.push((EmbeddingFacet::Summary, summary_text.clone()));

    let prop_texts: Vec<String> = record.properties.iter().map(format_property).collect();
    if !prop_texts.is_empty() {
        facets.push((EmbeddingFacet::Properties, prop_texts.join(" ")));
    }

    if let Some(doc) = doc {
        let usage_text = doc
            .usage_examples
            .iter()
            .take(USAGE_EXAMPLE_LIMIT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !usage_text.trim().is_empty() {
            facets.push((EmbeddingFacet::Usage, usage_text));
        }
    }

    let mut full_parts = vec![summary_text];
    if !prop_texts.is_empty() {
        full_parts.push(prop_texts[..prop_texts.len().min(FULL_PROPERTY_LIMIT)].join(" "));
    }
    if let Some(doc) = doc {
        full_parts.push(truncate_chars(&doc.full_description, FULL_DESCRIPTION_CHARS).to_string());
    }
    facets.push((EmbeddingFacet::Full, full_parts.join(" ")));

    facets
}

/// Turns catalog entries into per-facet embedding vectors.
pub struct EmbeddingGenerator<'a> {
    encoder: &'a dyn TextEncoder,
}

impl<'a> EmbeddingGenerator<'a> {
    pub fn new(encoder: &'a dyn TextEncoder) -> Self {
        Self { encoder }
    }

    /// Embed every facet of one entry.
    pub fn generate(
        &self,
        record: &AlgorithmRecord,
        doc: Option<&DocRecord>,
    ) -> Result<Vec<(EmbeddingFacet, Vec<f32>)>> {
        facet_texts(record, doc)
            .into_iter()
            .map(|(facet, text)| Ok((facet, self.encoder.encode(&text)?)))
            .collect()
    }
}
