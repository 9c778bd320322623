use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SYMBOL_TEMPERATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{2,3})\s*°?\s*(f|c)\b").expect("Invalid temperature regex"));
static FAHRENHEIT_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{2,3})\s*degrees?\s*fahrenheit").expect("Invalid fahrenheit regex")
});
static CELSIUS_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{2,3})\s*degrees?\s*celsius").expect("Invalid celsius regex")
});

/// A character filter receives the original text and may add, remove, or change characters
/// before tokenization, for instance to strip HTML elements like <b> from provider payloads.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Turns markup into a single line of plain text. Script and style bodies are dropped.
#[derive(Debug, Default)]
pub struct HTMLTagFilter;

impl HTMLTagFilter {
    pub fn get_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut std::io::Cursor::new(html))
            .unwrap_or_default()
    }

    pub fn walk_html(handle: &Handle, out: &mut String) {
        match &handle.data {
            NodeData::Text { contents } => {
                let s = contents.borrow();
                let s = s.trim();
                if !s.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(s);
                }
            }
            NodeData::Element { name, .. } => {
                let local = &name.local;
                if &**local == "script" || &**local == "style" || &**local == "noscript" {
                    return;
                }
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
            _ => {
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
        }
    }
}

impl CharacterFilter for HTMLTagFilter {
    fn filter(&self, html: String) -> String {
        if !html.contains('<') && !html.contains('&') {
            return collapse_whitespace(&html);
        }
        let dom = Self::get_dom(&html);
        let mut out = String::new();
        Self::walk_html(&dom.document, &mut out);
        collapse_whitespace(&out)
    }
}

/// A tokenizer breaks text up into individual tokens (usually words).
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

pub struct WhiteSpaceTokenizer;

impl Tokenizer for WhiteSpaceTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.to_string())
            .collect::<Vec<String>>()
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut t| {
                t.term = t.term.to_lowercase();
                t
            })
            .collect()
    }
}

/// Removes every non-alphanumeric character and drops tokens shorter than `min_length`.
pub struct AlphanumericFilter {
    min_length: usize,
}

impl AlphanumericFilter {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for AlphanumericFilter {
    fn default() -> Self {
        Self { min_length: 3 }
    }
}

impl TokenFilter for AlphanumericFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .filter_map(|mut token| {
                let stripped: String = token.term.chars().filter(|c| c.is_alphanumeric()).collect();
                if stripped.chars().count() >= self.min_length {
                    token.term = stripped;
                    Some(token)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Pure text analysis pipeline - no async, no I/O, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl std::ops::Deref for TextToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.term
    }
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    /// The pipeline used to expand a recipe query into provider search terms.
    pub fn for_search_terms() -> Self {
        Self::new(
            vec![],
            Box::new(WhiteSpaceTokenizer),
            vec![
                Box::new(LowerCaseTokenFilter),
                Box::new(AlphanumericFilter::default()),
            ],
        )
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        let tokens = self.tokenizer.tokenize(content);
        tokens
            .into_iter()
            .enumerate()
            .map(|(idx, term)| TextToken { term, pos: idx })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: String) -> Vec<TextToken> {
        let content = self.char_filter(raw_content);
        let tokens = self.tokenize(content);
        self.token_filter(tokens)
    }
}

/// Strips markup from provider text fields.
pub fn sanitize_html(text: &str) -> String {
    HTMLTagFilter.filter(text.to_string())
}

/// The trimmed query followed by its normalized words, first occurrence wins.
pub fn search_terms(query: &str) -> Vec<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let tokens = TextAnalyzer::for_search_terms().analyze(trimmed.to_string());

    let mut seen = HashSet::new();
    std::iter::once(trimmed.to_string())
        .chain(tokens.into_iter().map(|t| t.term))
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Finds the first oven temperature mentioned in the instructions, e.g. `180C` or `350F`.
pub fn temperature_hint(instructions: &str) -> Option<String> {
    if let Some(caps) = SYMBOL_TEMPERATURE.captures(instructions) {
        return Some(format!("{}{}", &caps[1], caps[2].to_uppercase()));
    }
    if let Some(caps) = FAHRENHEIT_WORDS.captures(instructions) {
        return Some(format!("{}F", &caps[1]));
    }
    CELSIUS_WORDS
        .captures(instructions)
        .map(|caps| format!("{}C", &caps[1]))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
