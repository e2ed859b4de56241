use crate::retriever::{GraphNeighborhood, ScoredAlgorithm};
use catalog_metadata_store::AlgorithmEntry;

/// Most properties formatted per block.
const PROPERTY_LIMIT: usize = 10;

/// Property description characters kept per line.
const PROPERTY_DESCRIPTION_CHARS: usize = 100;

/// Usage example characters kept per block.
const USAGE_EXAMPLE_CHARS: usize = 300;

/// Upstream/downstream entries listed in a workflow context.
const WORKFLOW_NEIGHBOR_LIMIT: usize = 3;

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pack ranked results into a bounded textual context.
///
/// Blocks are appended in rank order until the next one would exceed
/// `max_chars`. The first block is always included regardless of length, so
/// a non-empty result list never produces an empty context.
pub fn build_context(results: &[ScoredAlgorithm], max_chars: usize) -> String {
    let mut parts = Vec::new();
    let mut current_len = 0usize;

    for (idx, result) in results.iter().enumerate() {
        let block = format_algorithm(&result.entry, Some(result.score), idx + 1);
        if idx > 0 && current_len + block.len() > max_chars {
            break;
        }
        current_len += block.len();
        parts.push(block);
    }

    parts.join("\n\n")
}

/// Format a primary entry together with its graph neighborhood.
pub fn build_workflow_context(entry: &AlgorithmEntry, neighborhood: &GraphNeighborhood) -> String {
    let mut parts = vec![format!("# {} Workflow Context\n", entry.record.name)];
    parts.push(format_algorithm(entry, None, 1));

    if !neighborhood.upstream.is_empty() {
        parts.push("\n## Commonly Used Before:".to_string());
        for node in neighborhood.upstream.iter().take(WORKFLOW_NEIGHBOR_LIMIT) {
            parts.push(format!("- {}: {}", node.name, node.summary));
        }
    }

    if !neighborhood.downstream.is_empty() {
        parts.push("\n## Commonly Used After:".to_string());
        for node in neighborhood.downstream.iter().take(WORKFLOW_NEIGHBOR_LIMIT) {
            parts.push(format!("- {}: {}", node.name, node.summary));
        }
    }

    parts.join("\n")
}

fn format_algorithm(entry: &AlgorithmEntry, score: Option<f32>, index: usize) -> String {
    let record = &entry.record;
    let mut parts = vec![format!(
        "## Algorithm {index}: {} (v{})",
        record.name, record.version
    )];

    if !record.summary.is_empty() {
        parts.push(format!("**Summary**: {}", record.summary));
    }

    if !record.category.is_empty() {
        parts.push(format!("**Category**: {}", record.category));
    }

    if !record.properties.is_empty() {
        parts.push("\n**Properties**:".to_string());
        for prop in record.properties.iter().take(PROPERTY_LIMIT) {
            let mut line = format!("- `{}` ({}, {})", prop.name, prop.type_name, prop.direction);
            if !prop.description.is_empty() {
                line.push_str(&format!(
                    ": {}",
                    truncate_chars(&prop.description, PROPERTY_DESCRIPTION_CHARS)
                ));
            }
            if !prop.optional {
                line.push_str(" [Required]");
            }
            parts.push(line);
        }
    }

    if let Some(doc) = &entry.documentation {
        if let Some(example) = doc.usage_examples.first() {
            parts.push("\n**Usage Example**:".to_string());
            parts.push(format!(
                "```python\n{}\n```",
                truncate_chars(example, USAGE_EXAMPLE_CHARS)
            ));
        }
    }

    if let Some(score) = score {
        parts.push(format!("\n*Relevance score: {score:.3}*"));
    }

    parts.push("---".to_string());
    parts.join("\n")
}
