use crate::apis::EvaluatorsApi;
use crate::error::RootSignalsError;
use crate::types::{EvaluatorExecutionRequest, EvaluatorExecutionResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::{Uuid, uuid};

/// Evaluators hosted by Root Signals under fixed ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetEvaluator {
    Faithfulness,
    Relevance,
    Clarity,
    NonToxicity,
    Helpfulness,
    Politeness,
    Formality,
    Harmlessness,
    Confidentiality,
    Persuasiveness,
    JsonEmptyValuesRatio,
    JsonPropertyNameAccuracy,
    JsonPropertyTypeAccuracy,
    JsonPropertyCompleteness,
    JsonContentAccuracy,
    ContextRecall,
    AnswerCorrectness,
    AnswerSemanticSimilarity,
    SentimentRecognition,
    SafetyForChildren,
    Precision,
    Originality,
    Engagingness,
    Conciseness,
    Coherence,
    QualityOfWritingProfessional,
    QualityOfWritingCreative,
    Truthfulness,
    ContextPrecision,
    AnswerRelevance,
}

impl PresetEvaluator {
    pub const ALL: [PresetEvaluator; 30] = [
        Self::Faithfulness,
        Self::Relevance,
        Self::Clarity,
        Self::NonToxicity,
        Self::Helpfulness,
        Self::Politeness,
        Self::Formality,
        Self::Harmlessness,
        Self::Confidentiality,
        Self::Persuasiveness,
        Self::JsonEmptyValuesRatio,
        Self::JsonPropertyNameAccuracy,
        Self::JsonPropertyTypeAccuracy,
        Self::JsonPropertyCompleteness,
        Self::JsonContentAccuracy,
        Self::ContextRecall,
        Self::AnswerCorrectness,
        Self::AnswerSemanticSimilarity,
        Self::SentimentRecognition,
        Self::SafetyForChildren,
        Self::Precision,
        Self::Originality,
        Self::Engagingness,
        Self::Conciseness,
        Self::Coherence,
        Self::QualityOfWritingProfessional,
        Self::QualityOfWritingCreative,
        Self::Truthfulness,
        Self::ContextPrecision,
        Self::AnswerRelevance,
    ];

    /// The name the service lists the evaluator under.
    pub fn name(self) -> &'static str {
        match self {
            Self::Faithfulness => "Faithfulness",
            Self::Relevance => "Relevance",
            Self::Clarity => "Clarity",
            Self::NonToxicity => "Non_toxicity",
            Self::Helpfulness => "Helpfulness",
            Self::Politeness => "Politeness",
            Self::Formality => "Formality",
            Self::Harmlessness => "Harmlessness",
            Self::Confidentiality => "Confidentiality",
            Self::Persuasiveness => "Persuasiveness",
            Self::JsonEmptyValuesRatio => "JSON_Empty_Values_Ratio",
            Self::JsonPropertyNameAccuracy => "JSON_Property_Name_Accuracy",
            Self::JsonPropertyTypeAccuracy => "JSON_Property_Type_Accuracy",
            Self::JsonPropertyCompleteness => "JSON_Property_Completeness",
            Self::JsonContentAccuracy => "JSON_Content_Accuracy",
            Self::ContextRecall => "Context_Recall",
            Self::AnswerCorrectness => "Answer_Correctness",
            Self::AnswerSemanticSimilarity => "Answer_Semantic_Similarity",
            Self::SentimentRecognition => "Sentiment_recognition",
            Self::SafetyForChildren => "Safety_for_Children",
            Self::Precision => "Precision",
            Self::Originality => "Originality",
            Self::Engagingness => "Engagingness",
            Self::Conciseness => "Conciseness",
            Self::Coherence => "Coherence",
            Self::QualityOfWritingProfessional => "Quality_of_Writing_Professional",
            Self::QualityOfWritingCreative => "Quality_of_Writing_Creative",
            Self::Truthfulness => "Truthfulness",
            Self::ContextPrecision => "Context_Precision",
            Self::AnswerRelevance => "Answer_Relevance",
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Faithfulness => uuid!("901794f9-634c-4852-9e41-7c558f1ff1ab"),
            Self::Relevance => uuid!("bd789257-f458-4e9e-8ce9-fa6e86dc3fb9"),
            Self::Clarity => uuid!("9976d9f3-7265-4732-b518-d61c2642b14e"),
            Self::NonToxicity => uuid!("e296e374-7539-4eb2-a74a-47847dd26fb8"),
            Self::Helpfulness => uuid!("88bc92d5-bebf-45e4-9cd1-dfa33309c320"),
            Self::Politeness => uuid!("2856903a-e48c-4548-b3fe-520fd88c4f25"),
            Self::Formality => uuid!("8ab6cf1a-42b5-4a23-a15c-21372816483d"),
            Self::Harmlessness => uuid!("379fee0a-4fd1-4942-833b-7d78d78b334d"),
            Self::Confidentiality => uuid!("2eaa0a02-47a9-48f7-9b47-66ad257f93eb"),
            Self::Persuasiveness => uuid!("85bb6a74-f5dd-4130-8dcc-cffdf72327cc"),
            Self::JsonEmptyValuesRatio => uuid!("03829088-1799-438e-ae30-1db60832e52d"),
            Self::JsonPropertyNameAccuracy => uuid!("740923aa-8ffd-49cc-a95d-14f831243b25"),
            Self::JsonPropertyTypeAccuracy => uuid!("eabc6924-1fec-4e96-82ce-c03bf415c885"),
            Self::JsonPropertyCompleteness => uuid!("e5de37f7-d20c-420f-8072-f41dce96ecfc"),
            Self::JsonContentAccuracy => uuid!("b6a9aeff-c888-46d7-9e9c-7cf8cb461762"),
            Self::ContextRecall => uuid!("8bb60975-5062-4367-9fc6-a920044cba56"),
            Self::AnswerCorrectness => uuid!("d4487568-4243-4da8-9c76-adbaf762dbe0"),
            Self::AnswerSemanticSimilarity => uuid!("ff350bce-4b07-4af7-9640-803c9d3c2ff9"),
            Self::SentimentRecognition => uuid!("e3782c1e-eaf4-4b2d-8d26-53db2160f1fd"),
            Self::SafetyForChildren => uuid!("39a8b5ba-de77-4726-a6b0-621d40b3cdf5"),
            Self::Precision => uuid!("767bdd49-5f8c-48ca-8324-dfd6be7f8a79"),
            Self::Originality => uuid!("e72cb54f-548a-44f9-a6ca-4e14e5ade7f7"),
            Self::Engagingness => uuid!("64729487-d4a8-42d8-bd9e-72fd8390c134"),
            Self::Conciseness => uuid!("be828d33-158a-4e92-a2eb-f4d96c13f956"),
            Self::Coherence => uuid!("e599886c-c338-458f-91b3-5d7eba452618"),
            Self::QualityOfWritingProfessional => uuid!("059affa9-2d1c-48de-8e97-f81dd3fc3cbe"),
            Self::QualityOfWritingCreative => uuid!("060abfb6-57c9-43b5-9a6d-8a1a9bb853b8"),
            Self::Truthfulness => uuid!("053df10f-b0c7-400b-892e-46ce3aa1e430"),
            Self::ContextPrecision => uuid!("9d1e9a25-7e76-4771-b1e3-40825d7918c5"),
            Self::AnswerRelevance => uuid!("0907d422-e94f-4c9c-a63d-ec0eefd8a903"),
        }
    }

    /// Accepts the service name ("Non_toxicity") and loose spellings ("non toxicity", "NonToxicity").
    pub fn from_name(name: &str) -> Option<Self> {
        fn normalize(s: &str) -> String {
            s.chars()
                .filter(|c| !matches!(c, '_' | '-' | ' '))
                .flat_map(char::to_lowercase)
                .collect()
        }
        let wanted = normalize(name);
        Self::ALL.into_iter().find(|p| normalize(p.name()) == wanted)
    }
}

impl fmt::Display for PresetEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetEvaluator {
    type Err = RootSignalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| RootSignalsError::validation(format!("{s} is not a preset evaluator")))
    }
}

/// A preset evaluator bound to a client, callable like any other evaluator.
#[derive(Debug, Clone)]
pub struct PresetEvaluatorRunner {
    api: EvaluatorsApi,
    preset: PresetEvaluator,
    evaluator_version_id: Option<String>,
}

impl PresetEvaluatorRunner {
    pub(crate) fn new(api: EvaluatorsApi, preset: PresetEvaluator) -> Self {
        Self {
            api,
            preset,
            evaluator_version_id: None,
        }
    }

    pub fn with_version(mut self, evaluator_version_id: impl Into<String>) -> Self {
        self.evaluator_version_id = Some(evaluator_version_id.into());
        self
    }

    pub fn preset(&self) -> PresetEvaluator {
        self.preset
    }

    #[tracing::instrument(level = "info", skip_all, fields(preset = %self.preset))]
    pub async fn run(
        &self,
        mut payload: EvaluatorExecutionRequest,
        timeout: Option<Duration>,
    ) -> Result<EvaluatorExecutionResult, RootSignalsError> {
        if payload.evaluator_version_id.is_none() {
            payload.evaluator_version_id = self.evaluator_version_id.clone();
        }
        self.api
            .run(&self.preset.id().to_string(), payload, timeout)
            .await
    }
}
