// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection.
//!
//! Simple questions go straight to the default model. Complex questions are
//! shown to a randomly chosen "turbo" evaluation model, whose recommendation
//! is then restricted to free-tier models when the catalog has any. Every
//! failure along the way degrades to the default model.

use std::path::Path;
use std::sync::{Arc, Mutex};

use qwenmux_config::model::RoutingConfig;
use qwenmux_core::types::GenerationRequest;
use qwenmux_core::{Credential, GenerationProvider, QwenmuxError};
use qwenmux_usage::TokenUsageTracker;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogStore};
use crate::classifier::{QuestionClassifier, QuestionTier};
use crate::prompt::PromptTemplate;

/// How a [`SelectionResult`] was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    /// Simple question, default model, no remote call.
    Simple,
    /// The evaluation model's recommendation was free-tier and accepted.
    Recommended,
    /// The recommendation was replaced by a free-tier model.
    FreeTierSubstitute,
    /// No free-tier models are known, so the recommendation stands as-is.
    Unfiltered,
    /// No evaluation model in the catalog.
    NoEvaluator,
    /// The evaluation call failed or returned nothing usable; the default
    /// model, restricted to free-tier models, is used instead.
    EvaluationFailed,
}

impl SelectionPath {
    /// True for the paths that ended on the default model because something
    /// was missing or broken.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            SelectionPath::NoEvaluator | SelectionPath::EvaluationFailed
        )
    }
}

/// The model chosen for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// Model that should answer the question.
    pub model: String,
    /// Classified complexity of the question.
    pub tier: QuestionTier,
    /// How the model was reached.
    pub path: SelectionPath,
    /// Evaluation model consulted, if any.
    pub evaluation_model: Option<String>,
}

/// Chooses the model that answers a question.
pub struct ModelSelector {
    classifier: QuestionClassifier,
    template: PromptTemplate,
    default_model: String,
    catalog: Arc<CatalogStore>,
    provider: Arc<dyn GenerationProvider>,
    tracker: Arc<TokenUsageTracker>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ModelSelector {
    /// Create a selector with an explicit template.
    pub fn new(
        config: &RoutingConfig,
        template: PromptTemplate,
        catalog: Arc<CatalogStore>,
        provider: Arc<dyn GenerationProvider>,
        tracker: Arc<TokenUsageTracker>,
    ) -> Self {
        Self {
            classifier: QuestionClassifier::from_config(config),
            template,
            default_model: config.default_model.clone(),
            catalog,
            provider,
            tracker,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Create a selector, loading the template from
    /// `routing.prompt_template_path`. Fails if the template is unreadable.
    pub fn from_config(
        config: &RoutingConfig,
        catalog: Arc<CatalogStore>,
        provider: Arc<dyn GenerationProvider>,
        tracker: Arc<TokenUsageTracker>,
    ) -> Result<Self, QwenmuxError> {
        let template = PromptTemplate::load(Path::new(&config.prompt_template_path))?;
        Ok(Self::new(config, template, catalog, provider, tracker))
    }

    /// Replace the random source used to pick the evaluation model.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    /// The shared catalog store.
    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Select a model for `question`. Never fails.
    pub async fn select(&self, question: &str, credential: Option<&Credential>) -> SelectionResult {
        let classification = self.classifier.classify(question);
        debug!(
            tier = %classification.tier,
            reason = classification.reason,
            "question classified"
        );

        if classification.tier == QuestionTier::Simple {
            return self.finish(QuestionTier::Simple, SelectionPath::Simple, None, None);
        }

        if let Some(credential) = credential {
            self.catalog.refresh_if_stale(credential).await;
        }
        let catalog = self.catalog.current();

        let Some(evaluator) = self.pick_evaluator(&catalog) else {
            warn!("no evaluation model in catalog, using default model");
            return self.finish(QuestionTier::Complex, SelectionPath::NoEvaluator, None, None);
        };

        let request = GenerationRequest {
            model: evaluator.clone(),
            prompt: self.template.render(question),
            credential: credential.cloned(),
        };
        let response = match self.provider.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(evaluator = %evaluator, error = %e, "model evaluation failed, using default model");
                return self.evaluation_failed(&catalog, evaluator);
            }
        };
        self.tracker.record_usage(&evaluator, response.usage);

        let recommendation = response.text.as_deref().unwrap_or_default().trim();
        if recommendation.is_empty() {
            warn!(evaluator = %evaluator, "evaluation model returned no recommendation, using default model");
            return self.evaluation_failed(&catalog, evaluator);
        }

        let (model, path) = self.free_tier_filter(&catalog, recommendation);
        self.finish(QuestionTier::Complex, path, Some(evaluator), Some(model))
    }

    /// The default model stands in for the missing recommendation and still
    /// goes through the free-tier filter.
    fn evaluation_failed(&self, catalog: &Catalog, evaluator: String) -> SelectionResult {
        let (model, _) = self.free_tier_filter(catalog, &self.default_model);
        self.finish(
            QuestionTier::Complex,
            SelectionPath::EvaluationFailed,
            Some(evaluator),
            Some(model),
        )
    }

    fn pick_evaluator(&self, catalog: &Catalog) -> Option<String> {
        let candidates = catalog.evaluation_candidates();
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        candidates.choose(&mut *rng).map(|name| name.to_string())
    }

    /// Restrict a recommendation to free-tier models when any exist.
    fn free_tier_filter(&self, catalog: &Catalog, recommendation: &str) -> (String, SelectionPath) {
        if catalog.is_free_tier(recommendation) {
            return (recommendation.to_string(), SelectionPath::Recommended);
        }

        if catalog.is_free_tier(&self.default_model) {
            return (self.default_model.clone(), SelectionPath::FreeTierSubstitute);
        }

        match catalog.free_tier().next() {
            Some(first) => (first.name.clone(), SelectionPath::FreeTierSubstitute),
            None => (recommendation.to_string(), SelectionPath::Unfiltered),
        }
    }

    fn finish(
        &self,
        tier: QuestionTier,
        path: SelectionPath,
        evaluation_model: Option<String>,
        model: Option<String>,
    ) -> SelectionResult {
        let model = model.unwrap_or_else(|| self.default_model.clone());
        info!(
            model = %model,
            tier = %tier,
            path = ?path,
            evaluator = evaluation_model.as_deref().unwrap_or("-"),
            "model selected"
        );
        SelectionResult {
            model,
            tier,
            path,
            evaluation_model,
        }
    }
}

impl std::fmt::Debug for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelector")
            .field("default_model", &self.default_model)
            .field("catalog", &self.catalog)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use qwenmux_core::types::{GenerationResponse, RemoteModel, TokenUsage};
    use qwenmux_test_utils::MockProvider;

    use super::*;
    use crate::catalog::{CostCategory, ModelDescriptor};

    fn descriptor(name: &str, free: bool) -> ModelDescriptor {
        ModelDescriptor {
            name: name.to_string(),
            description: String::new(),
            capabilities: BTreeSet::new(),
            cost_category: if free {
                CostCategory::Free
            } else {
                CostCategory::Low
            },
            free_tier_eligible: free,
        }
    }

    fn standard_catalog() -> Catalog {
        Catalog::from_entries([
            descriptor("qwen-turbo", false),
            descriptor("qwen-turbo-2024-11-01", false),
            descriptor("qwen-turbo-2025-02-11", false),
            descriptor("qwen-turbo-latest", true),
            descriptor("qwen-plus", false),
        ])
    }

    struct Fixture {
        provider: Arc<MockProvider>,
        tracker: Arc<TokenUsageTracker>,
        selector: ModelSelector,
    }

    fn fixture(catalog: Catalog) -> Fixture {
        let provider = Arc::new(MockProvider::new());
        let tracker = Arc::new(TokenUsageTracker::new());
        let store = Arc::new(CatalogStore::new(catalog, provider.clone()));
        let selector = ModelSelector::new(
            &RoutingConfig::default(),
            PromptTemplate::new("推荐一个模型：{question}"),
            store,
            provider.clone(),
            tracker.clone(),
        )
        .with_rng(StdRng::seed_from_u64(7));
        Fixture {
            provider,
            tracker,
            selector,
        }
    }

    fn long_analysis_question() -> String {
        format!("请分析{}", "经济形势".repeat(40))
    }

    #[tokio::test]
    async fn simple_question_uses_default_without_remote_calls() {
        let f = fixture(standard_catalog());
        let result = f
            .selector
            .select("1+1等于几？", Some(&Credential::new("k")))
            .await;

        assert_eq!(result.model, "qwen-turbo-latest");
        assert_eq!(result.path, SelectionPath::Simple);
        assert_eq!(result.tier, QuestionTier::Simple);
        assert_eq!(f.provider.generate_calls(), 0);
        assert_eq!(f.provider.list_calls(), 0);
        assert!(f.tracker.snapshot().is_empty());
    }

    #[tokio::test]
    async fn complex_question_consults_a_turbo_evaluator() {
        let f = fixture(standard_catalog());
        f.provider.push_text("  qwen-turbo-latest\n");

        let result = f.selector.select(&long_analysis_question(), None).await;

        assert_eq!(result.model, "qwen-turbo-latest");
        assert_eq!(result.path, SelectionPath::Recommended);
        let evaluator = result.evaluation_model.unwrap();
        assert!(
            ["qwen-turbo", "qwen-turbo-2024-11-01", "qwen-turbo-2025-02-11"]
                .contains(&evaluator.as_str()),
            "unexpected evaluator {evaluator}"
        );

        let requests = f.provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, evaluator);
        assert!(requests[0].prompt.starts_with("推荐一个模型：请分析"));

        let usage = f.tracker.snapshot().get(&evaluator).unwrap();
        assert_eq!((usage.input, usage.output), (10, 20));
    }

    #[tokio::test]
    async fn non_free_recommendation_is_replaced_by_default() {
        let f = fixture(standard_catalog());
        f.provider.push_text("qwen-plus");

        let result = f.selector.select("为什么天空是蓝的", None).await;
        assert_eq!(result.model, "qwen-turbo-latest");
        assert_eq!(result.path, SelectionPath::FreeTierSubstitute);
    }

    #[tokio::test]
    async fn substitute_is_first_free_entry_when_default_is_not_free() {
        let f = fixture(Catalog::from_entries([
            descriptor("qwen-turbo", false),
            descriptor("qwen-long", true),
            descriptor("qwen-max", true),
        ]));
        f.provider.push_text("qwen-plus");

        let result = f.selector.select("比较两种方案", None).await;
        assert_eq!(result.model, "qwen-long");
        assert_eq!(result.path, SelectionPath::FreeTierSubstitute);
    }

    #[tokio::test]
    async fn recommendation_kept_when_no_free_tier_models() {
        let f = fixture(Catalog::from_entries([descriptor("qwen-turbo", false)]));
        f.provider.push_text("qwen-max");

        let result = f.selector.select("解释量子纠缠", None).await;
        assert_eq!(result.model, "qwen-max");
        assert_eq!(result.path, SelectionPath::Unfiltered);
    }

    #[tokio::test]
    async fn no_evaluator_falls_back_without_remote_call() {
        let f = fixture(Catalog::from_entries([descriptor("qwen-turbo-latest", true)]));

        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.model, "qwen-turbo-latest");
        assert_eq!(result.path, SelectionPath::NoEvaluator);
        assert!(result.path.is_fallback());
        assert_eq!(f.provider.generate_calls(), 0);
    }

    #[tokio::test]
    async fn empty_catalog_falls_back() {
        let f = fixture(Catalog::default());
        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.path, SelectionPath::NoEvaluator);
        assert_eq!(result.model, "qwen-turbo-latest");
    }

    #[tokio::test]
    async fn evaluation_error_falls_back_without_usage() {
        let f = fixture(standard_catalog());
        f.provider.push_error("InvalidApiKey");

        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.model, "qwen-turbo-latest");
        assert_eq!(result.path, SelectionPath::EvaluationFailed);
        assert!(result.evaluation_model.is_some());
        assert!(f.tracker.snapshot().is_empty());
    }

    #[tokio::test]
    async fn blank_recommendation_falls_back_but_records_usage() {
        let f = fixture(standard_catalog());
        f.provider.push_response(GenerationResponse {
            request_id: None,
            text: Some("   ".into()),
            usage: Some(TokenUsage {
                input_tokens: 4,
                output_tokens: 0,
            }),
        });

        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.path, SelectionPath::EvaluationFailed);
        assert_eq!(f.tracker.snapshot().total_input(), 4);
    }

    #[tokio::test]
    async fn failed_evaluation_still_respects_free_tier() {
        let catalog = Catalog::from_entries([
            descriptor("qwen-turbo", false),
            descriptor("qwen-long", true),
        ]);

        let f = fixture(catalog.clone());
        f.provider.push_error("boom");
        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.model, "qwen-long");
        assert_eq!(result.path, SelectionPath::EvaluationFailed);

        let f = fixture(catalog);
        f.provider.push_text("\n");
        let result = f.selector.select("分析一下", None).await;
        assert_eq!(result.model, "qwen-long");
        assert_eq!(result.path, SelectionPath::EvaluationFailed);
    }

    #[tokio::test]
    async fn missing_usage_counts_as_zero() {
        let f = fixture(standard_catalog());
        f.provider.push_response(GenerationResponse {
            request_id: None,
            text: Some("qwen-turbo-latest".into()),
            usage: None,
        });

        let result = f.selector.select("分析一下", None).await;
        let evaluator = result.evaluation_model.unwrap();
        let usage = f.tracker.snapshot().get(&evaluator).unwrap();
        assert_eq!((usage.input, usage.output), (0, 0));
    }

    #[tokio::test]
    async fn credential_triggers_catalog_refresh_on_complex_path() {
        let f = fixture(Catalog::from_entries([descriptor("qwen-turbo-latest", true)]));
        f.provider.set_listing(
            vec![RemoteModel {
                name: "qwen-turbo-1101".into(),
                description: String::new(),
            }],
        );
        f.provider.push_text("qwen-turbo-latest");

        let result = f
            .selector
            .select("分析一下", Some(&Credential::new("k")))
            .await;

        assert_eq!(f.provider.list_calls(), 1);
        assert_eq!(result.evaluation_model.as_deref(), Some("qwen-turbo-1101"));
        assert_eq!(result.path, SelectionPath::Recommended);
        assert_eq!(
            f.provider.requests()[0].credential,
            Some(Credential::new("k"))
        );
    }

    #[tokio::test]
    async fn refresh_failure_does_not_prevent_selection() {
        let f = fixture(standard_catalog());
        f.provider.set_listing_error("timeout");
        f.provider.push_text("qwen-turbo-latest");

        let result = f
            .selector
            .select("分析一下", Some(&Credential::new("k")))
            .await;
        assert_eq!(result.path, SelectionPath::Recommended);
        assert_eq!(f.provider.list_calls(), 1);
    }

    #[tokio::test]
    async fn without_credential_catalog_is_not_refreshed() {
        let f = fixture(standard_catalog());
        f.provider.push_text("qwen-turbo-latest");
        f.selector.select("分析一下", None).await;
        assert_eq!(f.provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn evaluator_choice_covers_all_candidates() {
        let f = fixture(standard_catalog());
        let mut seen = BTreeSet::new();
        for _ in 0..60 {
            f.provider.push_text("qwen-turbo-latest");
            let result = f.selector.select("分析一下", None).await;
            seen.insert(result.evaluation_model.unwrap());
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("qwen-turbo-latest"));
    }

    const NAMES: [&str; 6] = [
        "qwen-turbo-1101",
        "qwen-turbo-latest",
        "qwen-plus",
        "qwen-max",
        "qwen-long",
        "gpt-4",
    ];

    #[derive(Debug, Clone)]
    enum Outcome {
        Error,
        Blank,
        Recommend(&'static str),
    }

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            Just(Outcome::Error),
            Just(Outcome::Blank),
            prop::sample::select(NAMES.to_vec()).prop_map(Outcome::Recommend),
        ]
    }

    fn catalog_entries() -> impl Strategy<Value = Vec<(&'static str, bool)>> {
        prop::collection::vec((prop::sample::select(NAMES.to_vec()), any::<bool>()), 0..6)
    }

    proptest! {
        #[test]
        fn complex_selection_stays_in_catalog_when_free_models_exist(
            evaluator_free in any::<bool>(),
            entries in catalog_entries(),
            outcome in outcome(),
            seed in any::<u64>(),
        ) {
            let mut catalog = vec![descriptor("qwen-turbo", evaluator_free)];
            catalog.extend(entries.iter().map(|(name, free)| descriptor(name, *free)));

            let f = fixture(Catalog::from_entries(catalog));
            match &outcome {
                Outcome::Error => f.provider.push_error("upstream down"),
                Outcome::Blank => f.provider.push_text("  "),
                Outcome::Recommend(name) => f.provider.push_text(*name),
            }
            let selector = f.selector.with_rng(StdRng::seed_from_u64(seed));

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let result = runtime.block_on(selector.select("请分析这个问题", None));

            let catalog = selector.catalog().current();
            prop_assert_eq!(result.tier, QuestionTier::Complex);
            if catalog.free_tier().next().is_some() {
                prop_assert!(
                    catalog.is_free_tier(&result.model),
                    "{} via {:?} is not a free-tier catalog entry",
                    result.model,
                    result.path
                );
            } else {
                prop_assert!(matches!(
                    result.path,
                    SelectionPath::Unfiltered | SelectionPath::EvaluationFailed
                ));
            }
        }
    }

    #[test]
    fn from_config_fails_without_template() {
        let provider = Arc::new(MockProvider::new());
        let config = RoutingConfig {
            prompt_template_path: "/nonexistent/template.txt".into(),
            ..RoutingConfig::default()
        };
        let result = ModelSelector::from_config(
            &config,
            Arc::new(CatalogStore::new(Catalog::default(), provider.clone())),
            provider,
            Arc::new(TokenUsageTracker::new()),
        );
        assert!(matches!(result, Err(QwenmuxError::Config(_))));
    }
}
