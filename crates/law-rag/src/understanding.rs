//! Query Understanding (C6, §4.6): classification, extraction, query2doc, HyDE.
use law_index::bm25::ChineseTokenizer;

use crate::context::RetrievalContext;
use crate::types::{Bm25Keyword, Classification, Extraction, IdentifiedCrime};

const MAX_BM25_KEYWORDS: usize = 10;
const QUERY2DOC_PROMPT_TEMPLATE: &str = "你是一名中国刑法专家。请针对以下问题撰写一段50到100字的拟法律文书片段，\
使其在语义检索中最贴近能够回答该问题的法条或判例：\n\n问题：{query}";
const HYDE_PROMPT_TEMPLATE: &str = "你是一名中国刑法专家。请针对以下问题撰写一段100到200字的假设性法律解答，\
就像它确实来自一份权威判决或释法意见：\n\n问题：{query}";

/// Rule-based fallback: `is_criminal_law = (match_count > 0)`,
/// `confidence = min(1, 0.4 + 0.2 * match_count)` (§4.6). Public so callers that need to
/// force the LLM off for a single request (§6 `enable_llm`) can reach it directly
/// instead of going through [`classify`]'s own (process-wide) health check.
pub fn classify_offline(ctx: &RetrievalContext, query: &str) -> Classification {
    let match_count = detect_crimes(ctx, query).len() + detect_articles(ctx, query).len();
    Classification {
        is_criminal_law: match_count > 0,
        confidence: (0.4 + 0.2 * match_count as f32).min(1.0),
        reasoning: format!("rule-based fallback: {match_count} crime/article reference(s) matched in knowledge graph"),
    }
}

/// Classification: LLM-backed with a rule-based fallback on LLM unavailability (§4.6).
pub async fn classify(ctx: &RetrievalContext, query: &str) -> Classification {
    if !ctx.llm.is_healthy().await {
        return classify_offline(ctx, query);
    }

    let prompt = format!(
        "判断以下问题是否属于中国刑法相关的咨询，并给出0到1之间的置信度和简要理由，\
         以JSON格式回答，字段为 is_criminal_law(bool)、confidence(number)、reasoning(string)：\n\n问题：{query}"
    );
    match ctx.llm.generate(&prompt, 200, 0.0).await {
        Ok(text) => parse_classification(&text).unwrap_or_else(|| classify_offline(ctx, query)),
        Err(_) => classify_offline(ctx, query),
    }
}

fn parse_classification(text: &str) -> Option<Classification> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    Some(Classification {
        is_criminal_law: value.get("is_criminal_law")?.as_bool()?,
        confidence: value.get("confidence")?.as_f64()? as f32,
        reasoning: value.get("reasoning").and_then(|v| v.as_str()).unwrap_or("").to_string(),
    })
}

pub(crate) fn detect_crimes(ctx: &RetrievalContext, query: &str) -> Vec<String> {
    ctx.graph
        .all_crime_names()
        .into_iter()
        .filter(|name| query.contains(*name))
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn detect_articles(ctx: &RetrievalContext, query: &str) -> Vec<u32> {
    ctx.graph
        .all_article_numbers()
        .into_iter()
        .filter(|number| {
            query.contains(&format!("第{number}条")) || query.contains(&number.to_string())
        })
        .collect()
}

fn bm25_keywords(ctx: &RetrievalContext, query: &str) -> Vec<Bm25Keyword> {
    let tokenizer = ChineseTokenizer::new();
    let tokens = tokenizer.tokenize_str(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut tf: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    for t in &tokens {
        *tf.entry(t.clone()).or_insert(0) += 1;
    }

    let n = ctx.total_docs.max(1) as f32;
    let mut weighted: Vec<(String, f32)> = tf
        .into_iter()
        .map(|(term, freq)| {
            let df = *ctx.term_doc_freq.get(&term).unwrap_or(&0) as f32;
            let idf = ((n / (1.0 + df)) + 1.0).ln();
            (term, freq as f32 * idf)
        })
        .collect();

    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let max_weight = weighted.first().map(|(_, w)| *w).unwrap_or(1.0).max(f32::EPSILON);
    weighted.truncate(MAX_BM25_KEYWORDS);

    weighted
        .into_iter()
        .map(|(keyword, weight)| Bm25Keyword { keyword, weight: (weight / max_weight).clamp(0.0, 1.0) })
        .collect()
}

/// Extraction (§4.6): identified crimes + BM25 keywords are deterministic detection over
/// the knowledge graph and corpus statistics; `query2doc_enhanced`/`hyde_hypothetical`
/// are the only two fields that depend on the LLM and degrade to empty strings on
/// failure.
pub async fn extract(ctx: &RetrievalContext, query: &str) -> Extraction {
    let identified_crimes: Vec<IdentifiedCrime> = detect_crimes(ctx, query)
        .into_iter()
        .map(|name| IdentifiedCrime {
            name,
            confidence: 0.9,
            reasoning: "matched a known crime name in the knowledge graph".to_string(),
        })
        .collect();

    let identified_articles = detect_articles(ctx, query);
    let keywords = bm25_keywords(ctx, query);

    let query2doc_enhanced = generate_query2doc(ctx, query).await.unwrap_or_default();
    let hyde_hypothetical = generate_hyde(ctx, query).await.unwrap_or_default();

    Extraction {
        identified_crimes,
        identified_articles,
        bm25_keywords: keywords,
        query2doc_enhanced,
        hyde_hypothetical,
    }
}

/// Same deterministic detection as [`extract`] but never calls the LLM, so
/// `query2doc_enhanced`/`hyde_hypothetical` are always empty (§6 `enable_llm: false`).
/// The Router then naturally skips the two strategies that key off those fields.
pub async fn extract_offline(ctx: &RetrievalContext, query: &str) -> Extraction {
    let identified_crimes: Vec<IdentifiedCrime> = detect_crimes(ctx, query)
        .into_iter()
        .map(|name| IdentifiedCrime {
            name,
            confidence: 0.9,
            reasoning: "matched a known crime name in the knowledge graph".to_string(),
        })
        .collect();

    Extraction {
        identified_crimes,
        identified_articles: detect_articles(ctx, query),
        bm25_keywords: bm25_keywords(ctx, query),
        query2doc_enhanced: String::new(),
        hyde_hypothetical: String::new(),
    }
}

async fn generate_query2doc(ctx: &RetrievalContext, query: &str) -> Option<String> {
    let prompt = QUERY2DOC_PROMPT_TEMPLATE.replace("{query}", query);
    ctx.llm.generate(&prompt, 150, 0.7).await.ok()
}

async fn generate_hyde(ctx: &RetrievalContext, query: &str) -> Option<String> {
    let prompt = HYDE_PROMPT_TEMPLATE.replace("{query}", query);
    ctx.llm.generate(&prompt, 300, 0.7).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;

    #[tokio::test]
    async fn fallback_classification_flags_detected_crime() {
        let ctx = test_context().await;
        let c = classify_offline(&ctx, "故意伤害罪怎么量刑");
        assert!(c.is_criminal_law);
        assert!(c.confidence >= 0.6);
    }

    #[tokio::test]
    async fn fallback_classification_flags_no_match_as_not_criminal() {
        let ctx = test_context().await;
        let c = classify_offline(&ctx, "明天天气怎么样");
        assert!(!c.is_criminal_law);
    }

    #[tokio::test]
    async fn extraction_finds_keywords_and_crimes() {
        let ctx = test_context().await;
        let extraction = extract(&ctx, "故意伤害罪一般判多久").await;
        assert!(!extraction.identified_crimes.is_empty());
        assert!(!extraction.bm25_keywords.is_empty());
    }
}
