//! search_web tool - web search over a pluggable backend
//!
//! The shipped backend is simulated: it classifies the query by keyword and
//! produces canned weather, news or pointer results.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Tool, ToolError, ToolResult};

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
}

/// Source of web search results
#[async_trait]
pub trait WebSearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, ToolError>;
}

/// Search the internet for current information and news
pub struct WebSearchTool {
    backend: Arc<dyn WebSearchBackend>,
    default_max_results: usize,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn WebSearchBackend>, default_max_results: usize) -> Self {
        Self {
            backend,
            default_max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "search_web"
    }

    fn description(&self) -> &'static str {
        "Search the internet for current information and news."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for web search"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of search results",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let query = match input["query"].as_str() {
            Some(q) => q,
            None => return ToolError::InvalidArguments("query is required".to_string()).into(),
        };
        let max_results = input["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.default_max_results);
        debug!(%query, %max_results, "WebSearchTool::execute: called");

        match self.backend.search(query, max_results).await {
            Ok(mut results) => {
                results.truncate(max_results);
                ToolResult::success(json!({
                    "query": query,
                    "total_found": results.len(),
                    "results": results,
                }))
            }
            Err(e) => e.into(),
        }
    }
}

/// Kind of query, decided by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Weather,
    News,
    Financial,
    General,
}

const WEATHER_KEYWORDS: &[&str] = &["weather", "temperature", "climate", "forecast", "rain", "sunny", "cloudy"];
const NEWS_KEYWORDS: &[&str] = &["news", "latest", "current", "today", "recent", "breaking", "updates"];
const FINANCIAL_KEYWORDS: &[&str] = &["price", "cost", "value", "bitcoin", "stock"];

const WEATHER_STOP_WORDS: &[&str] = &[
    "weather",
    "temperature",
    "climate",
    "forecast",
    "in",
    "for",
    "at",
    "the",
    "what",
    "is",
    "how",
];
const NEWS_STOP_WORDS: &[&str] = &[
    "news", "latest", "current", "today", "recent", "breaking", "updates", "what", "are", "the", "in", "for", "about",
];

const AI_HEADLINES: &[&str] = &[
    "OpenAI Announces Major Breakthrough in Multimodal AI",
    "Google DeepMind Releases New Language Model with Enhanced Reasoning",
    "Microsoft Integrates Advanced AI into Office Suite",
    "AI Startup Raises $100M for Revolutionary Computer Vision Technology",
    "New Study Shows AI Improving Healthcare Diagnosis Accuracy by 40%",
];
const GENERAL_HEADLINES: &[&str] = &[
    "Tech Industry Sees Record Investment in Q2 2025",
    "New Breakthrough in Quantum Computing Announced",
    "Global Climate Summit Reaches Historic Agreement",
    "Space Exploration Mission Launches Successfully",
    "Economic Markets Show Strong Growth This Quarter",
];

const NEWS_ITEMS: usize = 3;

/// Classify a query; weather wins over news, news over financial
pub fn classify(query: &str) -> QueryKind {
    let lower = query.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if mentions(WEATHER_KEYWORDS) {
        QueryKind::Weather
    } else if mentions(NEWS_KEYWORDS) {
        QueryKind::News
    } else if mentions(FINANCIAL_KEYWORDS) {
        QueryKind::Financial
    } else {
        QueryKind::General
    }
}

fn strip_words(query: &str, stop_words: &[&str]) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| !stop_words.contains(&w.to_lowercase().as_str()))
        .map(String::from)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// City named in a weather query, if any
pub fn extract_city(query: &str) -> Option<String> {
    let words = strip_words(query, WEATHER_STOP_WORDS);
    if words.is_empty() {
        return None;
    }
    Some(words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" "))
}

/// Topic of a news query; "general" when nothing is left
pub fn extract_topic(query: &str) -> String {
    let words = strip_words(query, NEWS_STOP_WORDS);
    if words.is_empty() {
        "general".to_string()
    } else {
        words.join(" ")
    }
}

fn mentions_ai(topic: &str) -> bool {
    let lower = topic.to_lowercase();
    lower.contains("artificial intelligence") || lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "ai")
}

fn query_url(base: &str, query: &str) -> String {
    format!("{}{}", base, query.replace(' ', "+"))
}

/// Offline backend producing simulated results
#[derive(Debug, Default, Clone)]
pub struct SimulatedWebSearch;

impl SimulatedWebSearch {
    pub fn new() -> Self {
        Self
    }

    fn weather(&self, city: &str) -> WebResult {
        let mut rng = rand::rng();
        let temperature = [20, 22, 25, 28, 30, 32, 35].choose(&mut rng).copied().unwrap_or(25);
        let condition = ["Sunny", "Partly cloudy", "Cloudy", "Light rain", "Clear"]
            .choose(&mut rng)
            .copied()
            .unwrap_or("Clear");
        let humidity: u32 = rng.random_range(40..=80);

        WebResult {
            title: format!("Weather for {}", city),
            content: format!(
                "Current weather in {}: {}, {}°C (feels like {}°C). Humidity: {}%. \
                 Note: This is simulated data for demo purposes. For accurate weather, check a dedicated weather service.",
                city,
                condition,
                temperature,
                temperature + 2,
                humidity
            ),
            url: query_url("https://weather.com/weather/today/l/", city),
            source: "weather_api".to_string(),
        }
    }

    fn news(&self, query: &str) -> Vec<WebResult> {
        let topic = extract_topic(query);
        let pool = if mentions_ai(&topic) { AI_HEADLINES } else { GENERAL_HEADLINES };
        let mut rng = rand::rng();

        pool.choose_multiple(&mut rng, NEWS_ITEMS)
            .map(|headline| WebResult {
                title: headline.to_string(),
                content: format!(
                    "{}. This is simulated news content for demo purposes. In a real implementation, \
                     this would fetch actual current news from news APIs or RSS feeds. The content would \
                     include recent developments, expert opinions, and relevant details about {}.",
                    headline, topic
                ),
                url: format!(
                    "https://news.example.com/{}",
                    headline.to_lowercase().replace(' ', "-")
                ),
                source: "news_api".to_string(),
            })
            .collect()
    }

    fn pointer(&self, query: &str, kind: QueryKind) -> WebResult {
        let (advice, sources) = match kind {
            QueryKind::Weather => (
                format!(
                    "For current weather information about '{}', I recommend checking a dedicated weather service. \
                     Weather data changes frequently and requires real-time APIs.",
                    query
                ),
                ["OpenWeatherMap", "Weather.com", "AccuWeather"],
            ),
            QueryKind::News => (
                format!(
                    "For the latest news about '{}', I recommend checking current news websites as news updates happen in real-time.",
                    query
                ),
                ["Google News", "BBC News", "Reuters"],
            ),
            QueryKind::Financial => (
                format!(
                    "For current financial information about '{}', I recommend checking a financial data service as prices change constantly.",
                    query
                ),
                ["Yahoo Finance", "Bloomberg", "MarketWatch"],
            ),
            QueryKind::General => (
                format!(
                    "I searched for '{}' but didn't find substantial instant answers. This might require checking current websites directly.",
                    query
                ),
                ["Google Search", "Bing", "DuckDuckGo"],
            ),
        };

        WebResult {
            title: format!("Search Performed: {}", query),
            content: format!("{} Recommended sources: {}", advice, sources.join(", ")),
            url: query_url("https://duckduckgo.com/?q=", query),
            source: "web_search".to_string(),
        }
    }
}

#[async_trait]
impl WebSearchBackend for SimulatedWebSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, ToolError> {
        let kind = classify(query);
        debug!(%query, ?kind, %max_results, "SimulatedWebSearch::search: called");

        let results = match kind {
            QueryKind::Weather => match extract_city(query) {
                Some(city) => vec![self.weather(&city)],
                None => vec![self.pointer(query, kind)],
            },
            QueryKind::News => self.news(query),
            QueryKind::Financial | QueryKind::General => vec![self.pointer(query, kind)],
        };

        Ok(results)
    }
}
