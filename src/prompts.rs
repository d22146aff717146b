//! Prompt templates for the pipeline stages

use crate::generation::PromptTemplate;

/// Persona-synthesis prompt (stage 1).
///
/// Asks the model to invent the research agent best suited to the topic.
pub fn expert_instructions() -> PromptTemplate {
    PromptTemplate::new(
        "I will give you a topic that requires researching a subject to construct an \
         entertaining narrated article, regardless of its complexity or the availability of a \
         definitive answer. The topic is \"{topic}\".\n\
         The research is conducted by a specific Agent defined by its emoji, name and role; \
         each field of expertise has a single corresponding emoji.\n\
         Invent the best Agent emoji, name, and behaviour description for this topic.\n\
         For example, for the topic \"should I invest in apple stocks?\" a good agent is the \
         emoji \"💰\", the name \"Trader\", and the description \"You are a seasoned finance \
         analyst AI assistant reporter. Your primary goal is to compose comprehensive, \
         entertaining and methodically arranged financial reports based on provided data and \
         trends.\"",
        &["topic"],
    )
}

/// Query-derivation prompt (stage 2).
///
/// Asks for `n` diverse search queries, steered by the persona description.
pub fn search_queries_instructions(n: usize) -> PromptTemplate {
    PromptTemplate::new(
        format!(
            "You are an expert journalist. {{role}}\n\
             You are given an article topic: \"{{topic}}\".\n\
             Write {n} web search queries that together form a diverse and entertaining corpus \
             about it. Find interesting and unexpected angles, for example:\n\
             - Historical facts: key dates, timelines, origins, mythology.\n\
             - Stories and anecdotes: twists, suspense, surprising facts.\n\
             - Science and data: studies, numbers, statistics, records.\n\
             - Influential figures and quotes.\n\
             - Myths and misconceptions worth debunking.\n\
             - Controversies, trends, and economic implications.\n\
             - Geography: how the subject varies between regions.\n\
             - The future: technology and speculation.\n\
             The {n} queries must all be different from each other."
        ),
        &["role", "topic"],
    )
}

/// Narrative-composition prompt (stage 5).
///
/// Turns the filtered context into a short voiceover-ready script with
/// bracketed numeric citations.
pub fn storytelling_instructions() -> PromptTemplate {
    PromptTemplate::new(
        "You will be given a topic, subtopics related to it, and context (extracts from \
         related websites) to support it. The main topic is \"{topic}\" and the subtopics are \
         \"{subtopics}\".\n\
         As an expert journalist, write a short viral narrated article in {lang} about \
         \"{topic}\", using the context below.\n\
         Here is the context to support the facts you will tell:\n---\n{context}\n---\n\
         Reference your sources from the context with bracketed numbers, like \"Blablabla. [1]\" \
         when you use a fact from context 1.\n\
         - Start with a captivating hook: short (under 25 words), dramatic or surprising, no \
         emojis. It serves as the central theme.\n\
         - Be story-driven: include anecdotes, examples, cultural references and little-known \
         facts. Use twists, tension and a climax.\n\
         - Include precise details: numbers, dates, durations, statistics, records.\n\
         - Use an oral, friendly tone with dynamic punctuation; the text will be read aloud by \
         a voiceover actor, so write plain text only, no emojis, no hashtags, no headings.\n\
         - Anticipate the viewer's thoughts with phrases like \"Have you ever wondered...\" to \
         create stakes and a narrative thread.\n\
         - Conclude with a short moral or an open question (under 30 words).",
        &["topic", "subtopics", "context", "lang"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expert_instructions_render() {
        let rendered = expert_instructions()
            .render(&[("topic", "coffee")])
            .unwrap();
        assert!(rendered.contains("\"coffee\""));
        assert!(!rendered.contains("{topic}"));
    }

    #[test]
    fn test_search_queries_instructions_embed_count() {
        let rendered = search_queries_instructions(3)
            .render(&[("role", "You are a historian."), ("topic", "coffee")])
            .unwrap();
        assert!(rendered.contains("Write 3 web search queries"));
        assert!(rendered.contains("You are a historian."));
    }

    #[test]
    fn test_storytelling_instructions_require_all_params() {
        let template = storytelling_instructions();
        assert!(template
            .render(&[("topic", "t"), ("subtopics", "s"), ("context", "c")])
            .is_err());
        let rendered = template
            .render(&[
                ("topic", "t"),
                ("subtopics", "s"),
                ("context", "c"),
                ("lang", "english"),
            ])
            .unwrap();
        assert!(rendered.contains("in english about"));
    }
}
