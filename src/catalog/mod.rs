//! Catalog loading and lookup.
//!
//! All reference data the engine consults — synonym index, disease matrix,
//! specialty keyword lists, question banks, policy rules, messages — is
//! loaded once from JSON at startup and shared immutably across sessions.

mod fixture;
pub mod messages;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use thiserror::Error;

use crate::models::enums::Urgency;
use crate::text::interpret::SynonymIndex;
use types::{
    CandidateGeneratorConfig, ContextFile, ContextQuestion, DiseaseSpecialty, FacilityEntry,
    LocaleMessages, ParserSets, QuestionBankEntry, RedFlagQuestion, ScoringConfig, SkipRule,
    SpecialtyEntry, SpecialtyFile, SpecialtyUrgency, StopRules, SymptomRule, SynonymEntry,
};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file read failed ({file}): {reason}")]
    Load { file: String, reason: String },

    #[error("Catalog file parse failed ({file}): {reason}")]
    Parse { file: String, reason: String },

    #[error("No catalog data for locale: {0}")]
    MissingLocale(String),
}

/// The immutable reference data the engine runs on.
#[derive(Debug)]
pub struct Catalog {
    pub default_locale: String,
    pub synonyms: Vec<SynonymEntry>,
    pub synonym_index: SynonymIndex,
    pub specialties: Vec<SpecialtyEntry>,
    pub scoring: ScoringConfig,
    /// Disease label → symptom set, in kaggle space.
    pub disease_symptoms: BTreeMap<String, BTreeSet<String>>,
    /// Kaggle symptom → severity 1..=7.
    pub symptom_severity: BTreeMap<String, u8>,
    /// Canonical → kaggle symptoms.
    pub kaggle_to_canonical: BTreeMap<String, Vec<String>>,
    /// Derived: kaggle symptom → canonical (first claimant alphabetically).
    reverse_kaggle: BTreeMap<String, String>,
    pub disease_to_specialty: BTreeMap<String, DiseaseSpecialty>,
    /// Locale → question bank.
    pub question_banks: BTreeMap<String, Vec<QuestionBankEntry>>,
    pub skip_rules: Vec<SkipRule>,
    /// Sorted by `order`.
    pub context_questions: Vec<ContextQuestion>,
    pub pregnancy_relevant: BTreeSet<String>,
    pub red_flag_questions: Vec<RedFlagQuestion>,
    pub stop_rules: StopRules,
    pub candidate_generator: CandidateGeneratorConfig,
    pub emergency_rules: Vec<SymptomRule>,
    pub same_day_rules: Vec<SymptomRule>,
    pub specialty_urgency: SpecialtyUrgency,
    /// Locale → parser configuration.
    pub parser_sets: BTreeMap<String, ParserSets>,
    /// Locale → message tables.
    pub messages: BTreeMap<String, LocaleMessages>,
    pub facilities: Vec<FacilityEntry>,
}

struct CatalogParts {
    synonyms: Vec<SynonymEntry>,
    specialty_file: SpecialtyFile,
    disease_symptoms: BTreeMap<String, BTreeSet<String>>,
    symptom_severity: BTreeMap<String, u8>,
    kaggle_to_canonical: BTreeMap<String, Vec<String>>,
    disease_to_specialty: BTreeMap<String, DiseaseSpecialty>,
    question_banks: BTreeMap<String, Vec<QuestionBankEntry>>,
    skip_rules: Vec<SkipRule>,
    context_file: ContextFile,
    red_flag_questions: Vec<RedFlagQuestion>,
    stop_rules: StopRules,
    candidate_generator: CandidateGeneratorConfig,
    emergency_rules: Vec<SymptomRule>,
    same_day_rules: Vec<SymptomRule>,
    specialty_urgency: SpecialtyUrgency,
    parser_sets: BTreeMap<String, ParserSets>,
    messages: BTreeMap<String, LocaleMessages>,
    facilities: Vec<FacilityEntry>,
}

const DEFAULT_LOCALE: &str = "tr-TR";

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T, CatalogError> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path).map_err(|e| CatalogError::Load {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| CatalogError::Parse {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(file: &str, raw: &str) -> Result<T, CatalogError> {
    serde_json::from_str(raw).map_err(|e| CatalogError::Parse {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

impl Catalog {
    /// Load all catalog files from a directory.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let parts = CatalogParts {
            synonyms: read_json(dir, "synonyms.json")?,
            specialty_file: read_json(dir, "specialty_keywords.json")?,
            disease_symptoms: read_json(dir, "disease_symptoms.json")?,
            symptom_severity: read_json(dir, "symptom_severity.json")?,
            kaggle_to_canonical: read_json(dir, "kaggle_to_canonical.json")?,
            disease_to_specialty: read_json(dir, "disease_to_specialty.json")?,
            question_banks: read_json(dir, "question_bank.json")?,
            skip_rules: read_json(dir, "question_skip_rules.json")?,
            context_file: read_json(dir, "context_questions.json")?,
            red_flag_questions: read_json(dir, "red_flag_questions.json")?,
            stop_rules: read_json(dir, "stop_rules.json")?,
            candidate_generator: read_json(dir, "candidate_generator.json")?,
            emergency_rules: read_json(dir, "emergency_rules.json")?,
            same_day_rules: read_json(dir, "same_day_rules.json")?,
            specialty_urgency: read_json(dir, "specialty_urgency.json")?,
            parser_sets: read_json(dir, "parser_sets.json")?,
            messages: read_json(dir, "messages.json")?,
            facilities: read_json(dir, "facilities.json")?,
        };
        Ok(Self::assemble(parts))
    }

    /// Load the bundled Turkish-first catalog set.
    ///
    /// The bundled files are compiled in, so a parse failure here is a
    /// programmer error, not a runtime condition.
    pub fn load_embedded() -> Self {
        macro_rules! embedded {
            ($file:literal) => {
                parse_json($file, include_str!(concat!("../../resources/catalogs/", $file)))
                    .expect("bundled catalog file is valid")
            };
        }
        let parts = CatalogParts {
            synonyms: embedded!("synonyms.json"),
            specialty_file: embedded!("specialty_keywords.json"),
            disease_symptoms: embedded!("disease_symptoms.json"),
            symptom_severity: embedded!("symptom_severity.json"),
            kaggle_to_canonical: embedded!("kaggle_to_canonical.json"),
            disease_to_specialty: embedded!("disease_to_specialty.json"),
            question_banks: embedded!("question_bank.json"),
            skip_rules: embedded!("question_skip_rules.json"),
            context_file: embedded!("context_questions.json"),
            red_flag_questions: embedded!("red_flag_questions.json"),
            stop_rules: embedded!("stop_rules.json"),
            candidate_generator: embedded!("candidate_generator.json"),
            emergency_rules: embedded!("emergency_rules.json"),
            same_day_rules: embedded!("same_day_rules.json"),
            specialty_urgency: embedded!("specialty_urgency.json"),
            parser_sets: embedded!("parser_sets.json"),
            messages: embedded!("messages.json"),
            facilities: embedded!("facilities.json"),
        };
        Self::assemble(parts)
    }

    fn assemble(parts: CatalogParts) -> Self {
        let synonym_index = SynonymIndex::build(&parts.synonyms);

        // First claimant in canonical order wins a contested kaggle symptom.
        let mut reverse_kaggle: BTreeMap<String, String> = BTreeMap::new();
        for (canonical, kaggle_symptoms) in &parts.kaggle_to_canonical {
            for kaggle in kaggle_symptoms {
                reverse_kaggle
                    .entry(kaggle.clone())
                    .or_insert_with(|| canonical.clone());
            }
        }

        let mut context_questions = parts.context_file.questions;
        context_questions.sort_by_key(|q| q.order);

        for disease in parts.disease_to_specialty.keys() {
            if !parts.disease_symptoms.contains_key(disease) {
                tracing::warn!(disease = %disease, "Specialty mapping for unknown disease");
            }
        }

        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            synonyms: parts.synonyms,
            synonym_index,
            specialties: parts.specialty_file.specialties,
            scoring: parts.specialty_file.scoring,
            disease_symptoms: parts.disease_symptoms,
            symptom_severity: parts.symptom_severity,
            kaggle_to_canonical: parts.kaggle_to_canonical,
            reverse_kaggle,
            disease_to_specialty: parts.disease_to_specialty,
            question_banks: parts.question_banks,
            skip_rules: parts.skip_rules,
            context_questions,
            pregnancy_relevant: parts.context_file.pregnancy_relevant.into_iter().collect(),
            red_flag_questions: parts.red_flag_questions,
            stop_rules: parts.stop_rules,
            candidate_generator: parts.candidate_generator,
            emergency_rules: parts.emergency_rules,
            same_day_rules: parts.same_day_rules,
            specialty_urgency: parts.specialty_urgency,
            parser_sets: parts.parser_sets,
            messages: parts.messages,
            facilities: parts.facilities,
        }
    }

    // ── Lookups ─────────────────────────────────────────────

    /// Question bank for a locale, falling back to the default locale.
    pub fn bank_for(&self, locale: &str) -> Result<&[QuestionBankEntry], CatalogError> {
        self.question_banks
            .get(locale)
            .or_else(|| self.question_banks.get(&self.default_locale))
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogError::MissingLocale(locale.to_string()))
    }

    pub fn bank_entry(
        &self,
        locale: &str,
        canonical: &str,
    ) -> Result<Option<&QuestionBankEntry>, CatalogError> {
        Ok(self
            .bank_for(locale)?
            .iter()
            .find(|entry| entry.canonical == canonical))
    }

    pub fn messages_for(&self, locale: &str) -> Result<&LocaleMessages, CatalogError> {
        self.messages
            .get(locale)
            .or_else(|| self.messages.get(&self.default_locale))
            .ok_or_else(|| CatalogError::MissingLocale(locale.to_string()))
    }

    pub fn parser_sets_for(&self, locale: &str) -> Result<&ParserSets, CatalogError> {
        self.parser_sets
            .get(locale)
            .or_else(|| self.parser_sets.get(&self.default_locale))
            .ok_or_else(|| CatalogError::MissingLocale(locale.to_string()))
    }

    /// Message text by key; falls back to the default locale, then to the
    /// key itself so a missing entry stays visible instead of vanishing.
    pub fn msg(&self, locale: &str, key: &str) -> String {
        if let Some(table) = self.messages.get(locale) {
            if let Some(text) = table.text.get(key) {
                return text.clone();
            }
        }
        if let Some(table) = self.messages.get(&self.default_locale) {
            if let Some(text) = table.text.get(key) {
                return text.clone();
            }
        }
        key.to_string()
    }

    /// Localized text from a per-question locale map.
    pub fn localized<'a>(&self, map: &'a BTreeMap<String, String>, locale: &str) -> Option<&'a str> {
        map.get(locale)
            .or_else(|| map.get(&self.default_locale))
            .map(String::as_str)
    }

    pub fn canonical_for_kaggle(&self, kaggle: &str) -> Option<&str> {
        self.reverse_kaggle.get(kaggle).map(String::as_str)
    }

    pub fn kaggle_for(&self, canonical: &str) -> &[String] {
        self.kaggle_to_canonical
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn specialty(&self, id: &str) -> Option<&SpecialtyEntry> {
        self.specialties.iter().find(|s| s.id == id)
    }

    pub fn specialty_name_tr(&self, id: &str) -> String {
        self.specialty(id)
            .map(|s| s.name_tr.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Weighted-Jaccard weight of one kaggle symptom.
    pub fn symptom_weight(&self, kaggle: &str) -> f64 {
        let severity = self.symptom_severity.get(kaggle).copied().unwrap_or(0);
        self.candidate_generator.default_symptom_weight
            + f64::from(severity) * self.candidate_generator.severity_weight_multiplier
    }

    pub fn urgency_for_specialty(&self, id: &str) -> Urgency {
        if self.stop_rules.emergency_specialty_ids.iter().any(|s| s == id) {
            return Urgency::ErNow;
        }
        self.specialty_urgency.get(id).copied().unwrap_or(Urgency::Routine)
    }

    /// A skip rule forbids asking `canonical` when any listed canonical has
    /// been denied.
    pub fn is_skipped(&self, canonical: &str, denied: &BTreeSet<String>) -> bool {
        self.skip_rules.iter().any(|rule| {
            rule.canonical_symptom == canonical
                && rule.skip_if_denied.iter().any(|d| denied.contains(d))
        })
    }
}
