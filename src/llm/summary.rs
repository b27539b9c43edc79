//! Budgeted TLDR generation from a transcript.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use super::{ChatMessage, GenerationRequest, LLM};
use crate::error::SummaryError;
use crate::search::Language;
use crate::transcript::normalizer::is_blank;

static TLDR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TLDR:(?P<summary>.*?)Keywords:(?P<keywords>.*)$").expect("TLDR pattern is valid")
});

/// Separators accepted between keywords: ASCII, full-width, ideographic and Arabic commas
const KEYWORD_SEPARATORS: [char; 4] = [',', '，', '、', '،'];

/// Summary text and keywords drawn from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Context that biases the summary towards what the user searched for
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryContext<'a> {
    pub query: &'a str,
    pub title: &'a str,
}

/// Turns transcripts into budgeted summaries through a text-generation service
#[derive(Clone)]
pub struct SummaryGenerator {
    llm: Arc<dyn LLM>,
    temperature: f32,
}

impl SummaryGenerator {
    pub fn new(llm: Arc<dyn LLM>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    /// Summarize `transcript` in at most `budget` tokens of `language`.
    ///
    /// An empty transcript yields an empty result without calling the service.
    pub async fn summarize(
        &self,
        transcript: &str,
        budget: u32,
        language: &Language,
        context: SummaryContext<'_>,
    ) -> Result<SummaryResult, SummaryError> {
        if is_blank(transcript) {
            debug!("Empty transcript, skipping generation");
            return Ok(SummaryResult::default());
        }

        let request = self.build_request(transcript, budget, language, context);
        let response = self.llm.generate(request).await?;

        debug!(
            "Generation completed (tokens: {:?}, provider: {:?})",
            response.tokens_used,
            self.llm.provider_type()
        );

        let result = parse_summary_response(&response.content)?;
        info!(
            "📝 Summary of {} chars with {} keywords",
            result.summary.chars().count(),
            result.keywords.len()
        );
        Ok(result)
    }

    /// Build the generation request; the budget is a ceiling the service is asked to respect
    pub fn build_request(
        &self,
        transcript: &str,
        budget: u32,
        language: &Language,
        context: SummaryContext<'_>,
    ) -> GenerationRequest {
        let language_name = language.display_name();

        let mut instructions = format!(
            "We introduce Extreme TLDR Generation, a new form of extreme summarization of a \
             video transcript. TLDR Generation involves high source compression, removes stop \
             words and summarizes the transcript whilst retaining meaning. The result is the \
             shortest possible summary in {budget} or less tokens, written in {language_name}.\n"
        );

        if !context.query.trim().is_empty() {
            instructions.push_str(&format!(
                "The viewer found this video by searching for \"{}\"; keep the summary relevant to that search.\n",
                context.query.trim()
            ));
        }
        if !context.title.trim().is_empty() {
            instructions.push_str(&format!("The video is titled \"{}\".\n", context.title.trim()));
        }

        instructions.push_str(&format!(
            "After the summary, list the most important keywords, taken only from your summary, \
             separated by commas and written in {language_name}.\n\
             Answer in exactly this format and nothing else:\n\
             TLDR: <summary>\n\
             Keywords: <keyword>, <keyword>, ..."
        ));

        GenerationRequest {
            messages: vec![
                ChatMessage::system(instructions),
                ChatMessage::user(format!(
                    "Provide the extreme TLDR of the following video transcript: {transcript}"
                )),
            ],
            max_tokens: budget,
            temperature: self.temperature,
        }
    }
}

fn trim_field(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*')
}

/// Parse `TLDR: <summary> Keywords: <a, b, ...>` from generated text.
///
/// Line breaks are collapsed to spaces first, so labels and content may be
/// split across lines.
pub fn parse_summary_response(response: &str) -> Result<SummaryResult, SummaryError> {
    let flattened = response.replace("\r\n", " ").replace(['\n', '\r'], " ");

    let captures = TLDR_PATTERN
        .captures(&flattened)
        .ok_or_else(|| SummaryError::Format {
            response: response.to_string(),
        })?;

    let summary = trim_field(&captures["summary"]).to_string();
    let keywords = trim_field(&captures["keywords"])
        .split(KEYWORD_SEPARATORS)
        .map(|keyword| keyword.trim().trim_end_matches(['.', '。']).trim())
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect();

    Ok(SummaryResult { summary, keywords })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{LLMProvider, LLMResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedLlm {
        reply: Result<String, u16>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedLlm {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LLM for ScriptedLlm {
        async fn generate(&self, request: GenerationRequest) -> Result<LLMResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(LLMResponse {
                    content: text.clone(),
                    tokens_used: Some(42),
                }),
                Err(status) => Err(LlmError::Status {
                    provider: "OpenAI",
                    status: *status,
                    body: "rate limited".to_string(),
                }),
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::OpenAI
        }
    }

    #[test]
    fn test_parse_basic_response() {
        let result = parse_summary_response("TLDR: a short summary Keywords: alpha, beta").unwrap();
        assert_eq!(result.summary, "a short summary");
        assert_eq!(result.keywords, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_parse_collapses_line_breaks() {
        let result =
            parse_summary_response("\nTLDR:\na short\r\nsummary\nKeywords:\nalpha, beta\n").unwrap();
        assert_eq!(result.summary, "a short summary");
        assert_eq!(result.keywords, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_parse_missing_keywords_label() {
        let err = parse_summary_response("TLDR: a short summary").unwrap_err();
        assert!(matches!(err, SummaryError::Format { .. }));
    }

    #[test]
    fn test_parse_missing_tldr_label() {
        assert!(parse_summary_response("a short summary Keywords: alpha").is_err());
    }

    #[test]
    fn test_parse_east_asian_commas() {
        let result = parse_summary_response("TLDR: 机器学习入门 Keywords: 机器学习，神经网络、数据").unwrap();
        assert_eq!(result.summary, "机器学习入门");
        assert_eq!(result.keywords, vec!["机器学习", "神经网络", "数据"]);
    }

    #[test]
    fn test_parse_drops_empty_keywords_and_markdown() {
        let result =
            parse_summary_response("**TLDR:** ownership rules. **Keywords:** ownership, , borrowing.").unwrap();
        assert_eq!(result.summary, "ownership rules.");
        assert_eq!(result.keywords, vec!["ownership", "borrowing"]);
    }

    #[test]
    fn test_parse_empty_keyword_list() {
        let result = parse_summary_response("TLDR: nothing much Keywords:").unwrap();
        assert_eq!(result.summary, "nothing much");
        assert!(result.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_empty_transcript_short_circuits() {
        let llm = ScriptedLlm::replying("TLDR: x Keywords: y");
        let generator = SummaryGenerator::new(llm.clone(), 0.7);

        let result = generator
            .summarize("", 300, &Language::default(), SummaryContext::default())
            .await
            .unwrap();

        assert_eq!(result, SummaryResult::default());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_passes_budget_and_context() {
        let llm = ScriptedLlm::replying("TLDR: traits define shared behaviour Keywords: traits, behaviour");
        let generator = SummaryGenerator::new(llm.clone(), 0.7);
        let context = SummaryContext {
            query: "rust programming",
            title: "Rust traits explained",
        };

        let result = generator
            .summarize("today we talk about traits", 300, &Language::new("ja"), context)
            .await
            .unwrap();

        assert_eq!(result.keywords, vec!["traits", "behaviour"]);

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 300);
        assert_eq!(requests[0].temperature, 0.7);
        let instructions = &requests[0].messages[0].content;
        assert!(instructions.contains("300 or less tokens"));
        assert!(instructions.contains("Japanese"));
        assert!(instructions.contains("rust programming"));
        assert!(instructions.contains("Rust traits explained"));
        assert!(requests[0].messages[1].content.contains("today we talk about traits"));
    }

    #[tokio::test]
    async fn test_service_failure_is_generation_error() {
        let generator = SummaryGenerator::new(ScriptedLlm::failing(429), 0.7);
        let err = generator
            .summarize("some words", 200, &Language::default(), SummaryContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::Generation(LlmError::Status { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_format_error() {
        let generator = SummaryGenerator::new(ScriptedLlm::replying("I cannot help with that."), 0.7);
        let err = generator
            .summarize("some words", 200, &Language::default(), SummaryContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::Format { .. }));
    }
}
