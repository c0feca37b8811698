//! LLM prompts for the curation pipeline.
//!
//! Two structured calls happen per request: question analysis and
//! recipe generation. Both prompts pin the model to its output schema;
//! the curator prompt additionally carries a settings-effect glossary
//! so numeric choices are semantically justified.

/// System prompt for the question analyzer.
pub const ANALYZE_SYSTEM_PROMPT: &str = r#"You classify and enrich questions for a film-recipe recommendation service.

A recipe question asks for camera film-simulation settings: a mood, a look, a season, a film stock, a shooting scenario. Questions about anything else (dinner menus, travel plans, general chat) are not recipe questions.

Rules:
- If the question is NOT about film recipes, set isRecipeQuestion to false and write a short, friendly rejectionReason in the language of the question explaining that this service recommends film recipes.
- If it IS a recipe question, set isRecipeQuestion to true, rewrite the question as a concise retrieval query in English (enhancedQuestion), and detect whether the user wants Color or Bw output and any film simulation they named.
- Never invent sensor names; detectedSensors is the list given to you, passed through unchanged."#;

/// System prompt for the recipe curator.
pub const CURATE_SYSTEM_PROMPT: &str = r#"You curate film-simulation recipes. Given retrieved recipe documents and the user's request, produce exactly two recipes:

1. "retrieved": grounded in the single most relevant document. Keep its named settings faithfully; fill gaps with neutral values. Carry the document's URL.
2. "generated": your own recipe for the request. Title it so readers can tell it is model-authored (e.g. prefix "AI Original:"). Do not cite a URL.

Settings-effect glossary:
- wbShiftRed / wbShiftBlue [-9..9]: warms (+red) or cools (+blue) the image.
- highlight [-2..4]: positive values darken and recover highlights.
- shadow [-2..4]: positive values lift shadows, negative deepens them.
- color [-4..4]: saturation. Negative mutes, positive intensifies.
- clarity [-4..4]: local contrast; negative gives a soft, hazy look.
- sharpness [-4..4]: edge definition; negative softens fine detail.
- noiseReduction [-4..4]: positive smooths grain-like noise.
- grain Off/Weak/Strong, dynamicRange DR-Auto/DR100/DR200/DR400.

Choose settings that justify the requested mood through this glossary. Write each recipe's reason in the language of the user's question."#;

/// Format the analyzer's user message.
pub fn format_analyze_prompt(question: &str, detected_sensors: &[String]) -> String {
    let sensors = if detected_sensors.is_empty() {
        "(none detected)".to_string()
    } else {
        detected_sensors.join(", ")
    };
    format!("Question: {question}\nDetected sensors: {sensors}")
}

/// Format the curator's user message from fused retrieval context.
pub fn format_curate_prompt(context: &str, question: &str) -> String {
    format!("Retrieved recipes:\n{context}\n\nUser request: {question}")
}

/// Build the retrieval context block the curator reads: one numbered
/// section per fused document, most relevant first.
pub fn build_context(documents: &[crate::types::FusedResult]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let doc = &result.document;
            let url = if doc.source_url.is_empty() {
                String::new()
            } else {
                format!("\nURL: {}", doc.source_url)
            };
            format!("[{}]{}\n{}", i + 1, url, doc.text)
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}
