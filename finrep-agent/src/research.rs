//! The financial research agent.
//!
//! A fixed persona, a four-phase working method and a report template, wired to a Groq model
//! with web search and article reading tools.

use crate::llm_agent::{DEFAULT_MAX_ITERATIONS, LlmAgent, LlmAgentBuilder};
use finrep_core::{Llm, ReportError, Result};
use finrep_model::{DEFAULT_GROQ_MODEL, GroqClient, GroqConfig};
use finrep_tool::{ArticleReaderTool, DuckDuckGoSearchTool};
use std::sync::Arc;

pub const RESEARCH_AGENT_NAME: &str = "financial_research_agent";

pub const RESEARCH_DESCRIPTION: &str = "\
You are an elite research analyst in the financial services domain.
Your expertise encompasses:

-Deep investigative financial research and analysis
-Fact-checking and source verification
-Data-driven reporting and visualization
-Expert interview synthesis
-Trend analysis and future predictions
-Complex topic simplification
-Ethical practices
-Balanced perspective presentation
-Global context integration";

pub const RESEARCH_INSTRUCTIONS: &str = "\
1. Research Phase
  -Search for 5 authoritative sources on the topic
  -Prioritize recent publications and expert opinions
  -Identify key stakeholders and perspectives

2. Analysis Phase
  -Extract and verify critical information
  -Cross-reference across multiple sources
  -Identify emerging patterns and trends
  -Evaluate conflicting viewpoints
3. Writing Phase
 -Craft an attention-grabbing headline
 -Structure content in Financial Report style
 -Include relevant quotes and statistics
 -Maintain objectivity and balance
 -Explain complex concepts clearly

4. Quality Phase
  -Verify all facts and attributions
  -Ensure narrative flow and readability
  -Add context where necessary
  -Include future implications";

pub const RESEARCH_EXPECTED_OUTPUT: &str = "\
#{Compelling Headline}
## Executive Summary
{Concise overview of key findings and significance}

## Background & Context
{Historical context and importance}
{Current landscape overview}

## Key Findings
{Main discoveries and analysis}
{Expert insights and quotes}

## Impact Analysis
{Current implications}
{Stakeholder perspectives}
{Industry/societal effects}

## Future Outlook
{Emerging trends}
{Expert predictions}
{Potential challenges and opportunities}

## Expert Insights
{Notable quotes and analysis from industry leaders}
{Contrasting viewpoints}

## Sources and Methodology
{List of primary sources with key contributions}
{Provide https:// links of all the primary sources}
{Research methodology overview}


---
Research conducted by Financial Agent
Credit Rating Style Report
Published:{current date}
Last Updated:{current date}";

const MARKDOWN_DIRECTIVE: &str = "- Use markdown to format your answers.";

/// Everything that shapes the research agent apart from its credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchAgentConfig {
    pub name: String,
    /// Groq model id.
    pub model: String,
    pub description: String,
    pub instructions: String,
    pub expected_output: String,
    /// Ask the model to answer in markdown.
    pub markdown: bool,
    pub max_iterations: usize,
}

impl Default for ResearchAgentConfig {
    fn default() -> Self {
        Self {
            name: RESEARCH_AGENT_NAME.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            description: RESEARCH_DESCRIPTION.to_string(),
            instructions: RESEARCH_INSTRUCTIONS.to_string(),
            expected_output: RESEARCH_EXPECTED_OUTPUT.to_string(),
            markdown: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ResearchAgentConfig {
    /// Assemble the system prompt sent ahead of every query.
    pub fn system_prompt(&self) -> String {
        let mut sections = Vec::new();

        if !self.description.is_empty() {
            sections.push(self.description.clone());
        }
        if !self.instructions.is_empty() {
            sections.push(format!("<instructions>\n{}\n</instructions>", self.instructions));
        }
        if self.markdown {
            sections.push(format!(
                "<additional_information>\n{}\n</additional_information>",
                MARKDOWN_DIRECTIVE
            ));
        }
        if !self.expected_output.is_empty() {
            sections.push(format!(
                "<expected_output>\n{}\n</expected_output>",
                self.expected_output
            ));
        }

        sections.join("\n\n")
    }
}

/// Build the default research agent backed by Groq. Performs no network I/O.
pub fn create_research_agent(api_key: &str) -> Result<LlmAgent> {
    create_research_agent_from_config(
        ResearchAgentConfig::default(),
        GroqConfig::llama70b(api_key),
    )
}

/// Build a research agent with a custom configuration against a Groq endpoint.
///
/// The model id in `config` wins over the one in `groq`.
pub fn create_research_agent_from_config(
    config: ResearchAgentConfig,
    groq: GroqConfig,
) -> Result<LlmAgent> {
    let groq = GroqConfig { model: config.model.clone(), ..groq };
    let model = GroqClient::new(groq)?;
    create_research_agent_with(config, Arc::new(model))
}

/// Build a research agent around any model.
pub fn create_research_agent_with(
    config: ResearchAgentConfig,
    model: Arc<dyn Llm>,
) -> Result<LlmAgent> {
    if config.model.trim().is_empty() {
        return Err(ReportError::Config("Research agent model id is empty".to_string()));
    }

    let instruction = config.system_prompt();
    LlmAgentBuilder::new(config.name)
        .description("Financial research analyst producing markdown reports")
        .model(model)
        .instruction(instruction)
        .tool(Arc::new(DuckDuckGoSearchTool::new()?))
        .tool(Arc::new(ArticleReaderTool::new()?))
        .max_iterations(config.max_iterations)
        .build()
}
