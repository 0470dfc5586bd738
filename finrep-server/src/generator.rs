use async_trait::async_trait;
use finrep_agent::{ResearchAgentConfig, create_research_agent_from_config};
use finrep_core::{ReportError, Result};
use finrep_model::GroqConfig;

/// Turns a research query into a markdown report.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, query: &str) -> Result<String>;
}

/// Production generator: a fresh research agent per request.
pub struct ResearchReportGenerator {
    api_key: Option<String>,
    agent_config: ResearchAgentConfig,
    groq_config: GroqConfig,
}

impl ResearchReportGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            agent_config: ResearchAgentConfig::default(),
            groq_config: GroqConfig::default(),
        }
    }

    pub fn with_agent_config(mut self, config: ResearchAgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    /// Transport settings for Groq (base URL, token limits). The key and model are
    /// taken from this generator.
    pub fn with_groq_config(mut self, config: GroqConfig) -> Self {
        self.groq_config = config;
        self
    }
}

#[async_trait]
impl ReportGenerator for ResearchReportGenerator {
    async fn generate(&self, query: &str) -> Result<String> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| ReportError::Config("GROQ_API_KEY is not set".to_string()))?;

        let groq = GroqConfig { api_key, ..self.groq_config.clone() };
        let agent = create_research_agent_from_config(self.agent_config.clone(), groq)?;
        let output = agent.run_query(query).await?;

        tracing::info!(
            tool_calls = output.tool_calls.len(),
            report_chars = output.content.len(),
            "Report generated"
        );
        Ok(output.content)
    }
}
