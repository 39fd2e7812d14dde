use std::sync::Arc;

use tokio::sync::OnceCell;

use super::ChatModel;
use super::OpenAiChatModel;
use crate::config::Config;
use crate::config::LlmTier;
use crate::error::ManusErr;
use crate::error::Result;

/// Builds the model for a tier the first time it is requested.
pub trait ModelFactory: Send + Sync {
    fn create(&self, tier: LlmTier) -> Result<Arc<dyn ChatModel>>;
}

pub struct OpenAiModelFactory {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl OpenAiModelFactory {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

impl ModelFactory for OpenAiModelFactory {
    fn create(&self, tier: LlmTier) -> Result<Arc<dyn ChatModel>> {
        let model_config = self.config.model(tier).clone();
        tracing::info!(%tier, model = %model_config.model, "creating chat model");
        Ok(Arc::new(OpenAiChatModel::with_client(
            self.client.clone(),
            model_config,
        )))
    }
}

struct NoFactory;

impl ModelFactory for NoFactory {
    fn create(&self, tier: LlmTier) -> Result<Arc<dyn ChatModel>> {
        Err(ManusErr::Config(format!("no model registered for tier `{tier}`")))
    }
}

/// Tier-keyed model cache shared by every run in the process.
///
/// Each tier is initialized at most once, on first use; afterwards the
/// instance is only read, so concurrent runs can share one registry.
pub struct ProviderRegistry {
    factory: Arc<dyn ModelFactory>,
    basic: OnceCell<Arc<dyn ChatModel>>,
    reasoning: OnceCell<Arc<dyn ChatModel>>,
    vision: OnceCell<Arc<dyn ChatModel>>,
}

impl ProviderRegistry {
    pub fn new(factory: Arc<dyn ModelFactory>) -> Self {
        Self {
            factory,
            basic: OnceCell::new(),
            reasoning: OnceCell::new(),
            vision: OnceCell::new(),
        }
    }

    pub fn from_config(config: Arc<Config>) -> Self {
        Self::new(Arc::new(OpenAiModelFactory::new(config)))
    }

    /// A registry pre-populated with fixed models. Requests for any other
    /// tier fail.
    pub fn with_models<I>(models: I) -> Self
    where
        I: IntoIterator<Item = (LlmTier, Arc<dyn ChatModel>)>,
    {
        let mut registry = Self::new(Arc::new(NoFactory));
        for (tier, model) in models {
            *registry.cell_mut(tier) = OnceCell::new_with(Some(model));
        }
        registry
    }

    pub async fn get(&self, tier: LlmTier) -> Result<Arc<dyn ChatModel>> {
        let model = self
            .cell(tier)
            .get_or_try_init(|| async { self.factory.create(tier) })
            .await?;
        Ok(Arc::clone(model))
    }

    fn cell(&self, tier: LlmTier) -> &OnceCell<Arc<dyn ChatModel>> {
        match tier {
            LlmTier::Basic => &self.basic,
            LlmTier::Reasoning => &self.reasoning,
            LlmTier::Vision => &self.vision,
        }
    }

    fn cell_mut(&mut self, tier: LlmTier) -> &mut OnceCell<Arc<dyn ChatModel>> {
        match tier {
            LlmTier::Basic => &mut self.basic,
            LlmTier::Reasoning => &mut self.reasoning,
            LlmTier::Vision => &mut self.vision,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::llm::ChunkStream;
    use crate::llm::OutputSchema;
    use async_trait::async_trait;
    use manus_protocol::Message;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    struct Echo(&'static str);

    #[async_trait]
    impl ChatModel for Echo {
        async fn invoke(&self, _messages: &[Message]) -> Result<String> {
            Ok(self.0.to_string())
        }

        async fn invoke_structured(
            &self,
            _messages: &[Message],
            _schema: &OutputSchema,
        ) -> Result<Value> {
            Ok(Value::Null)
        }

        async fn stream(&self, _messages: &[Message]) -> Result<ChunkStream> {
            Err(ManusErr::Stream("not supported".to_string()))
        }
    }

    struct CountingFactory(AtomicUsize);

    impl ModelFactory for CountingFactory {
        fn create(&self, _tier: LlmTier) -> Result<Arc<dyn ChatModel>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo("fresh")))
        }
    }

    #[tokio::test]
    async fn factory_runs_once_per_tier() {
        let factory = Arc::new(CountingFactory(AtomicUsize::new(0)));
        let registry = ProviderRegistry::new(factory.clone());

        let first = registry.get(LlmTier::Basic).await.unwrap();
        let second = registry.get(LlmTier::Basic).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.0.load(Ordering::SeqCst), 1);

        registry.get(LlmTier::Vision).await.unwrap();
        assert_eq!(factory.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn seeded_registry_rejects_missing_tiers() {
        let registry =
            ProviderRegistry::with_models([(LlmTier::Basic, Arc::new(Echo("hi")) as Arc<dyn ChatModel>)]);

        let model = registry.get(LlmTier::Basic).await.unwrap();
        assert_eq!(model.invoke(&[]).await.unwrap(), "hi");
        assert!(matches!(
            registry.get(LlmTier::Reasoning).await,
            Err(ManusErr::Config(_))
        ));
    }
}
