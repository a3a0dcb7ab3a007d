use std::collections::HashSet;

use bm25::Tokenizer;

/// A small seed dictionary of legal terms so common multi-character words segment as a
/// single token rather than falling through to the bigram fallback. Real deployments
/// would load a much larger dictionary from disk; this keeps the default self-contained.
const SEED_DICTIONARY: &[&str] = &[
    "故意伤害罪",
    "故意杀人罪",
    "盗窃罪",
    "抢劫罪",
    "诈骗罪",
    "交通肇事罪",
    "寻衅滋事罪",
    "贪污罪",
    "受贿罪",
    "贩卖毒品罪",
    "强奸罪",
    "绑架罪",
    "敲诈勒索罪",
    "非法拘禁罪",
    "刑法",
    "量刑",
    "有期徒刑",
    "无期徒刑",
    "死刑",
    "罚金",
    "累犯",
    "自首",
    "立功",
    "缓刑",
    "从轻处罚",
    "从重处罚",
];

const DEFAULT_STOPWORDS: &[&str] = &["的", "了", "和", "与", "或", "之", "是", "在", "对"];

fn max_dictionary_word_len() -> usize {
    SEED_DICTIONARY
        .iter()
        .map(|w| w.chars().count())
        .max()
        .unwrap_or(1)
}

/// Greedy forward maximum-match segmentation over [`SEED_DICTIONARY`], falling back to
/// character bigrams for any span that does not match a dictionary entry (§4.3). ASCII
/// runs (latin terms, article numbers) are kept as single whole-word tokens.
#[derive(Debug, Clone, Default)]
pub struct ChineseTokenizer {
    stopwords: HashSet<String>,
}

impl ChineseTokenizer {
    pub fn new() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_stopwords(stopwords: impl IntoIterator<Item = String>) -> Self {
        Self {
            stopwords: stopwords.into_iter().collect(),
        }
    }

    fn segment_cjk_run(&self, chars: &[char], out: &mut Vec<String>) {
        let max_len = max_dictionary_word_len();
        let mut i = 0usize;
        while i < chars.len() {
            let mut matched = false;
            let upper = max_len.min(chars.len() - i);
            for len in (1..=upper).rev() {
                if len == 1 {
                    continue;
                }
                let candidate: String = chars[i..i + len].iter().collect();
                if SEED_DICTIONARY.contains(&candidate.as_str()) {
                    out.push(candidate);
                    i += len;
                    matched = true;
                    break;
                }
            }
            if matched {
                continue;
            }
            // OOV fallback: emit a character bigram (or the lone trailing char).
            if i + 1 < chars.len() {
                let bigram: String = chars[i..i + 2].iter().collect();
                out.push(bigram);
            } else {
                out.push(chars[i].to_string());
            }
            i += 1;
        }
    }

    pub fn tokenize_str(&self, input: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut ascii_buf = String::new();
        let mut cjk_buf: Vec<char> = Vec::new();

        let flush_ascii = |buf: &mut String, out: &mut Vec<String>| {
            if !buf.is_empty() {
                out.push(std::mem::take(buf).to_lowercase());
            }
        };
        let flush_cjk = |buf: &mut Vec<char>, out: &mut Vec<String>, this: &Self| {
            if !buf.is_empty() {
                this.segment_cjk_run(buf, out);
                buf.clear();
            }
        };

        for ch in input.chars() {
            if ch.is_alphanumeric() && ch.is_ascii() {
                flush_cjk(&mut cjk_buf, &mut out, self);
                ascii_buf.push(ch);
            } else if ch.is_whitespace() || ch.is_ascii_punctuation() {
                flush_ascii(&mut ascii_buf, &mut out);
                flush_cjk(&mut cjk_buf, &mut out, self);
            } else {
                flush_ascii(&mut ascii_buf, &mut out);
                cjk_buf.push(ch);
            }
        }
        flush_ascii(&mut ascii_buf, &mut out);
        flush_cjk(&mut cjk_buf, &mut out, self);

        out.retain(|t| !t.is_empty() && !self.stopwords.contains(t));
        out
    }
}

impl Tokenizer for ChineseTokenizer {
    fn tokenize(&self, input_text: &str) -> Vec<String> {
        self.tokenize_str(input_text)
    }
}
