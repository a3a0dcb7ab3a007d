//! law-graph — Knowledge Graph (C4, §4.4).
//!
//! Built once at startup from a curated `(case_id, article_number, confidence,
//! is_primary)` mapping table joined against each case's `accusations` (the crime names
//! a case was charged under). Read-only after construction — there is no incremental
//! update path, matching the "built once at startup" contract.
pub mod error;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use law_core::{Article, Crime, CrimeArticleEdge, WeightedKeyword};

pub use error::GraphError;

/// A single curated row: one case charged under one article, with the mapping's
/// confidence in that case-article link.
#[derive(Debug, Clone)]
pub struct MappingRow {
    pub case_id: String,
    pub article_number: u32,
    pub confidence: f32,
    pub is_primary: bool,
}

/// Confidence floor applied to `rare_crime` edges when no stronger evidence exists
/// (§4.4). A crime/article pair backed by few cases should not be suppressed just
/// because its aggregate confidence looks weak.
const RARE_CRIME_CONFIDENCE_FLOOR: f32 = 0.7;

/// Below this case count, an edge is considered rare (§9 Open Question, resolved in
/// `DESIGN.md`).
const RARE_CRIME_CASE_THRESHOLD: u32 = 20;

#[derive(Debug, Default)]
struct EdgeAccumulator {
    case_ids: BTreeSet<String>,
    confidence_sum: f32,
    primary_hits: u32,
}

/// Read-only crime/article graph plus the case lists each edge was built from.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    edges: Vec<CrimeArticleEdge>,
    cases_by_edge: HashMap<(String, u32), Vec<String>>,
    by_crime: HashMap<String, Vec<usize>>,
    by_article: HashMap<u32, Vec<usize>>,
}

impl KnowledgeGraph {
    /// `mapping` is `kg/mapping.csv` (§6); `case_accusations` maps each `case_id` to the
    /// crime names it was charged under (from the `Document::Case.accusations` field).
    pub fn build(
        mapping: impl IntoIterator<Item = MappingRow>,
        case_accusations: &BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        let mut accum: BTreeMap<(String, u32), EdgeAccumulator> = BTreeMap::new();
        let mut cases_by_edge: HashMap<(String, u32), Vec<String>> = HashMap::new();

        for row in mapping {
            let Some(crimes) = case_accusations.get(&row.case_id) else {
                continue;
            };
            for crime in crimes {
                let key = (crime.clone(), row.article_number);
                let entry = accum.entry(key.clone()).or_default();
                entry.case_ids.insert(row.case_id.clone());
                entry.confidence_sum += row.confidence;
                if row.is_primary {
                    entry.primary_hits += 1;
                }
                cases_by_edge
                    .entry(key)
                    .or_default()
                    .push(row.case_id.clone());
            }
        }

        let mut edges = Vec::with_capacity(accum.len());
        for ((crime_name, article_number), acc) in accum {
            let case_count = acc.case_ids.len() as u32;
            let rare_crime = case_count < RARE_CRIME_CASE_THRESHOLD;
            let mut confidence = acc.confidence_sum / case_count.max(1) as f32;
            if rare_crime && acc.primary_hits == 0 {
                confidence = confidence.max(RARE_CRIME_CONFIDENCE_FLOOR);
            }
            edges.push(CrimeArticleEdge {
                crime: Crime { name: crime_name },
                article: Article { number: article_number },
                case_count,
                confidence: confidence.clamp(0.0, 1.0),
                rare_crime,
            });
        }

        let mut by_crime: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_article: HashMap<u32, Vec<usize>> = HashMap::new();
        for (i, e) in edges.iter().enumerate() {
            by_crime.entry(e.crime.name.clone()).or_default().push(i);
            by_article.entry(e.article.number).or_default().push(i);
        }

        Self {
            edges,
            cases_by_edge,
            by_crime,
            by_article,
        }
    }

    /// `related_articles(crime, limit)` ordered by confidence desc, then case_count desc
    /// (§4.4).
    pub fn related_articles(&self, crime: &str, limit: usize) -> Vec<CrimeArticleEdge> {
        let mut matches: Vec<CrimeArticleEdge> = self
            .by_crime
            .get(crime)
            .into_iter()
            .flatten()
            .map(|&i| self.edges[i].clone())
            .collect();
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.case_count.cmp(&a.case_count))
        });
        matches.truncate(limit);
        matches
    }

    /// `related_crimes(article, limit)`, symmetric to [`Self::related_articles`].
    pub fn related_crimes(&self, article: u32, limit: usize) -> Vec<CrimeArticleEdge> {
        let mut matches: Vec<CrimeArticleEdge> = self
            .by_article
            .get(&article)
            .into_iter()
            .flatten()
            .map(|&i| self.edges[i].clone())
            .collect();
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.case_count.cmp(&a.case_count))
        });
        matches.truncate(limit);
        matches
    }

    /// `cases_for(crime, article, limit)` → case id list (§4.4).
    pub fn cases_for(&self, crime: &str, article: u32, limit: usize) -> Vec<String> {
        let mut ids = self
            .cases_by_edge
            .get(&(crime.to_string(), article))
            .cloned()
            .unwrap_or_default();
        ids.sort();
        ids.dedup();
        ids.truncate(limit);
        ids
    }

    /// `expand(entities)`: union of neighbors for the detected crimes/articles, plus a
    /// weighted keyword set built from crime names and (stand-in) article titles,
    /// weighted by edge confidence (§4.4).
    pub fn expand(&self, crimes: &[String], articles: &[u32]) -> ExpandResult {
        let mut article_ids = BTreeSet::new();
        let mut crime_names = BTreeSet::new();
        let mut keywords: BTreeMap<String, f32> = BTreeMap::new();

        for crime in crimes {
            for edge in self.related_articles(crime, usize::MAX) {
                article_ids.insert(edge.article.number);
                let w = keywords.entry(crime.clone()).or_insert(0.0);
                *w = w.max(edge.confidence);
            }
        }
        for &article in articles {
            for edge in self.related_crimes(article, usize::MAX) {
                crime_names.insert(edge.crime.name.clone());
                let w = keywords.entry(format!("第{}条", edge.article.number)).or_insert(0.0);
                *w = w.max(edge.confidence);
            }
        }

        ExpandResult {
            article_ids: article_ids.into_iter().collect(),
            crime_names: crime_names.into_iter().collect(),
            keywords: keywords
                .into_iter()
                .map(|(keyword, weight)| WeightedKeyword { keyword, weight })
                .collect(),
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All distinct crime names in the graph, for detection scans (§4.6's rule-based
    /// classification fallback).
    pub fn all_crime_names(&self) -> Vec<&str> {
        self.by_crime.keys().map(|s| s.as_str()).collect()
    }

    /// All distinct article numbers in the graph, for detection scans.
    pub fn all_article_numbers(&self) -> Vec<u32> {
        self.by_article.keys().copied().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpandResult {
    pub article_ids: Vec<u32>,
    pub crime_names: Vec<String>,
    pub keywords: Vec<WeightedKeyword>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<MappingRow> {
        vec![
            MappingRow { case_id: "C1".into(), article_number: 234, confidence: 0.9, is_primary: true },
            MappingRow { case_id: "C2".into(), article_number: 234, confidence: 0.6, is_primary: false },
            MappingRow { case_id: "C3".into(), article_number: 264, confidence: 0.95, is_primary: true },
        ]
    }

    fn accusations() -> BTreeMap<String, BTreeSet<String>> {
        let mut m = BTreeMap::new();
        m.insert("C1".into(), BTreeSet::from(["故意伤害罪".to_string()]));
        m.insert("C2".into(), BTreeSet::from(["故意伤害罪".to_string()]));
        m.insert("C3".into(), BTreeSet::from(["盗窃罪".to_string()]));
        m
    }

    #[test]
    fn related_articles_orders_by_confidence_then_case_count() {
        let g = KnowledgeGraph::build(rows(), &accusations());
        let related = g.related_articles("故意伤害罪", 10);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].article.number, 234);
        assert_eq!(related[0].case_count, 2);
    }

    #[test]
    fn rare_crime_gets_confidence_floor() {
        let mut rows = rows();
        rows.push(MappingRow { case_id: "C4".into(), article_number: 300, confidence: 0.1, is_primary: false });
        let mut acc = accusations();
        acc.insert("C4".into(), BTreeSet::from(["寻衅滋事罪".to_string()]));

        let g = KnowledgeGraph::build(rows, &acc);
        let edge = g.related_articles("寻衅滋事罪", 10).remove(0);
        assert!(edge.rare_crime);
        assert!(edge.confidence >= RARE_CRIME_CONFIDENCE_FLOOR);
    }

    #[test]
    fn cases_for_returns_matching_case_ids() {
        let g = KnowledgeGraph::build(rows(), &accusations());
        let cases = g.cases_for("故意伤害罪", 234, 10);
        assert_eq!(cases, vec!["C1".to_string(), "C2".to_string()]);
    }

    #[test]
    fn expand_unions_neighbors_with_weighted_keywords() {
        let g = KnowledgeGraph::build(rows(), &accusations());
        let result = g.expand(&["故意伤害罪".to_string()], &[]);
        assert!(result.article_ids.contains(&234));
        assert!(!result.keywords.is_empty());
    }
}
