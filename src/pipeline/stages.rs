//! Pipeline stage bodies
//!
//! Each function implements one of the five stages over the shared
//! collaborators. The runner owns ordering and state tracking; these
//! functions are pure pipeline logic and never touch the task store.

use crate::error::AppError;
use crate::generation::{Expert, Queries, StructuredGenerator, N_QUERIES};
use crate::prompts;
use crate::research::{RelevanceFilter, ScoredChunk};
use crate::state::{AppState, ContextChunk};
use futures_util::future::try_join_all;
use std::collections::HashSet;

/// Stage 3 output: the human-readable digest stored on the task, plus the
/// flat URL list feeding stage 4.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedSources {
    /// Markdown digest of per-query search results
    pub digest: String,
    /// Every result URL, in query order
    pub urls: Vec<String>,
}

/// Stage 1: synthesize the research persona for the topic.
pub async fn generate_expert(state: &AppState, topic: &str, lang: &str) -> Result<Expert, AppError> {
    let generator = StructuredGenerator::<Expert>::new(prompts::expert_instructions(), lang);
    generator.generate(state.chat.as_ref(), &[("topic", topic)]).await
}

/// Stage 2: derive exactly `N_QUERIES` search queries, steered by the persona.
pub async fn generate_queries(
    state: &AppState,
    expert_description: &str,
    topic: &str,
    lang: &str,
) -> Result<Vec<String>, AppError> {
    let generator = StructuredGenerator::<Queries>::new(
        prompts::search_queries_instructions(N_QUERIES),
        lang,
    );
    let queries = generator
        .generate(
            state.chat.as_ref(),
            &[("role", expert_description), ("topic", topic)],
        )
        .await?;
    Ok(queries.queries_list)
}

/// Stage 3: search each query and collect the sources digest.
///
/// Searches fan out concurrently; results come back in query order.
pub async fn collect_sources(
    state: &AppState,
    queries: &[String],
) -> Result<CollectedSources, AppError> {
    let results = try_join_all(queries.iter().map(|q| state.search.search(q))).await?;

    let mut digest = String::new();
    let mut urls = Vec::new();
    for (query, hits) in queries.iter().zip(results) {
        digest.push_str(&format!("## **{}**\n", capitalize(query)));
        for hit in &hits {
            digest.push_str(&format!(" - [{}]({})\n", hit.title, hit.url));
            urls.push(hit.url.clone());
        }
    }

    tracing::debug!(queries = queries.len(), urls = urls.len(), "Collected sources");
    Ok(CollectedSources { digest, urls })
}

/// Stage 4: fetch the collected URLs, filter chunks against the joined
/// queries plus the original topic, and assemble citable context.
pub async fn build_context(
    state: &AppState,
    queries: &[String],
    topic: &str,
    urls: &[String],
) -> Result<Vec<ContextChunk>, AppError> {
    let retrieval_query = format!("{}, {}", queries.join(", "), topic);
    let documents = state.fetcher.fetch_and_extract(urls).await?;

    let filter = RelevanceFilter::new(&state.pipeline);
    let chunks = filter
        .filter(state.embeddings.as_ref(), &retrieval_query, &documents)
        .await?;

    Ok(assemble_context(chunks))
}

/// Deduplicate by content, order by source, and assign dense 1-based ids.
fn assemble_context(mut chunks: Vec<ScoredChunk>) -> Vec<ContextChunk> {
    chunks.sort_by(|a, b| a.source_url.cmp(&b.source_url));

    let mut seen = HashSet::new();
    let mut context = Vec::new();
    for chunk in chunks {
        if !seen.insert(chunk.content.clone()) {
            continue;
        }
        let id = context.len() + 1;
        let author = crate::research::site::display_name_for(&chunk.source_url)
            .unwrap_or_else(|| format!("Source {}", id));
        context.push(ContextChunk {
            id,
            title: chunk.title,
            author,
            content: chunk.content,
            source_url: chunk.source_url.clone(),
            icon_url: crate::research::site::icon_for(&chunk.source_url),
        });
    }
    context
}

/// Stage 5: compose the narrated script from the ordered context.
pub async fn compose_summary(
    state: &AppState,
    topic: &str,
    queries: &[String],
    context: &[ContextChunk],
    lang: &str,
) -> Result<String, AppError> {
    let formatted_context = context
        .iter()
        .map(|c| format!("[{}] | {}\n[...]{}[...]", c.id, c.author, c.content))
        .collect::<Vec<_>>()
        .join("\n---\n");

    let prompt = prompts::storytelling_instructions().render(&[
        ("topic", topic),
        ("subtopics", &queries.join(", ")),
        ("context", &formatted_context),
        ("lang", lang),
    ])?;

    state.chat.generate(&prompt, None).await
}

/// Uppercase the first character of a query for the digest heading.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
