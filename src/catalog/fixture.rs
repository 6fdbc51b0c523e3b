//! Hand-built catalog for tests (no file I/O).
//!
//! Small enough to verify scoring arithmetic by hand, rich enough to drive
//! every selector and policy path. The bundled production catalogs live
//! under `resources/catalogs/`.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::enums::{AnswerType, Timing, Urgency};
use crate::models::session::ProfileField;

use super::types::{
    CandidateGeneratorConfig, ConfidenceThresholds, ContextFile, ContextQuestion, DiseaseSpecialty,
    DurationUnit, FacilityEntry, LocaleMessages, ParserSets, QuestionBankEntry, RedFlagQuestion,
    ScoringConfig, SkipRule, SpecialtyEntry, SpecialtyFile, StopRules, SymptomRule, SynonymEntry,
    WhenAsk,
};
use super::Catalog;

fn synonym(canonical: &str, variants: &[&str]) -> SynonymEntry {
    SynonymEntry {
        canonical: canonical.into(),
        kind: "symptom".into(),
        variants: variants.iter().map(|v| v.to_string()).collect(),
    }
}

fn specialty(id: &str, name_tr: &str, keywords: &[&str], negatives: &[&str]) -> SpecialtyEntry {
    SpecialtyEntry {
        id: id.into(),
        name_tr: name_tr.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        negative_keywords: negatives.iter().map(|k| k.to_string()).collect(),
    }
}

fn bank(canonical: &str, question: &str, answer_type: AnswerType) -> QuestionBankEntry {
    QuestionBankEntry {
        canonical: canonical.into(),
        question: question.into(),
        answer_type,
        choices: None,
        priority_when_known: Vec::new(),
        why_asking: None,
    }
}

fn bank_with_priority(
    canonical: &str,
    question: &str,
    answer_type: AnswerType,
    priority: &[&str],
) -> QuestionBankEntry {
    QuestionBankEntry {
        priority_when_known: priority.iter().map(|p| p.to_string()).collect(),
        ..bank(canonical, question, answer_type)
    }
}

fn locale_map(tr: &str, en: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("tr-TR".to_string(), tr.to_string()), ("en-US".to_string(), en.to_string())])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Catalog {
    /// Build the in-memory test catalog.
    pub fn load_test() -> Self {
        let synonyms = vec![
            synonym("baş ağrısı", &["başım ağrıyor", "baş ağrım"]),
            synonym("bulantı", &["midem bulanıyor", "bulantım var"]),
            synonym("kusma", &["kusuyorum"]),
            synonym("ateş", &["ateşim var"]),
            synonym("öksürük", &["öksürüyorum", "öksürüğüm var"]),
            synonym("balgam", &["balgam çıkarıyorum"]),
            synonym("nefes darlığı", &["nefes alamıyorum", "nefes darlığım var"]),
            synonym("göğüs ağrısı", &["göğsüm ağrıyor"]),
            synonym("göğüste baskı", &["baskı hissi", "göğsümde baskı"]),
            synonym("terleme", &["terliyorum"]),
            synonym("karın ağrısı", &["karnım ağrıyor"]),
            synonym("ishal", &["ishalim var"]),
            synonym("idrarda yanma", &["idrarımı yaparken yanıyor"]),
            synonym("bulanık görme", &["bulanık görüyorum"]),
            synonym("çarpıntı", &["kalbim hızlı atıyor"]),
            synonym("halsizlik", &["halsizim", "yorgunum"]),
        ];

        let specialty_file = SpecialtyFile {
            specialties: vec![
                specialty("neurology", "Nöroloji", &["baş ağrısı", "bulanık görme"], &[]),
                specialty(
                    "internal_medicine",
                    "İç Hastalıkları",
                    &["ateş", "halsizlik"],
                    &[],
                ),
                specialty(
                    "gastroenterology",
                    "Gastroenteroloji",
                    &["karın ağrısı", "bulantı", "kusma", "ishal"],
                    &[],
                ),
                specialty(
                    "pulmonology",
                    "Göğüs Hastalıkları",
                    &["öksürük", "balgam", "nefes darlığı"],
                    &[],
                ),
                specialty(
                    "cardiology",
                    "Kardiyoloji",
                    &["göğüs ağrısı", "göğüste baskı", "çarpıntı"],
                    &["döküntü"],
                ),
                specialty("urology_internal", "Üroloji", &["idrarda yanma"], &[]),
            ],
            scoring: ScoringConfig::default(),
        };

        let disease_symptoms: BTreeMap<String, BTreeSet<String>> = BTreeMap::from([
            (
                "Migraine".to_string(),
                string_set(&["headache", "nausea", "visual_disturbances"]),
            ),
            (
                "Influenza".to_string(),
                string_set(&["high_fever", "headache", "cough"]),
            ),
            (
                "Gastroenteritis".to_string(),
                string_set(&["abdominal_pain", "diarrhoea", "nausea", "vomiting"]),
            ),
            (
                "Pneumonia".to_string(),
                string_set(&["cough", "phlegm", "high_fever", "breathlessness"]),
            ),
            (
                "Heart attack".to_string(),
                string_set(&[
                    "chest_pain",
                    "chest_pressure",
                    "breathlessness",
                    "sweating",
                    "nausea",
                ]),
            ),
            (
                "Angina".to_string(),
                string_set(&["chest_pain", "chest_pressure", "palpitations"]),
            ),
            (
                "Urinary tract infection".to_string(),
                string_set(&["burning_micturition"]),
            ),
        ]);

        let symptom_severity: BTreeMap<String, u8> = BTreeMap::from([
            ("headache".to_string(), 3),
            ("nausea".to_string(), 3),
            ("vomiting".to_string(), 4),
            ("high_fever".to_string(), 5),
            ("cough".to_string(), 2),
            ("phlegm".to_string(), 2),
            ("breathlessness".to_string(), 6),
            ("chest_pain".to_string(), 6),
            ("chest_pressure".to_string(), 6),
            ("sweating".to_string(), 3),
            ("abdominal_pain".to_string(), 4),
            ("diarrhoea".to_string(), 4),
            ("burning_micturition".to_string(), 4),
            ("visual_disturbances".to_string(), 4),
            ("palpitations".to_string(), 5),
            ("fatigue".to_string(), 2),
        ]);

        let kaggle_to_canonical: BTreeMap<String, Vec<String>> = BTreeMap::from([
            ("baş ağrısı".to_string(), strings(&["headache"])),
            ("bulantı".to_string(), strings(&["nausea"])),
            ("kusma".to_string(), strings(&["vomiting"])),
            ("ateş".to_string(), strings(&["high_fever"])),
            ("öksürük".to_string(), strings(&["cough"])),
            ("balgam".to_string(), strings(&["phlegm"])),
            ("nefes darlığı".to_string(), strings(&["breathlessness"])),
            ("göğüs ağrısı".to_string(), strings(&["chest_pain"])),
            ("göğüste baskı".to_string(), strings(&["chest_pressure"])),
            ("terleme".to_string(), strings(&["sweating"])),
            ("karın ağrısı".to_string(), strings(&["abdominal_pain"])),
            ("ishal".to_string(), strings(&["diarrhoea"])),
            ("idrarda yanma".to_string(), strings(&["burning_micturition"])),
            ("bulanık görme".to_string(), strings(&["visual_disturbances"])),
            ("çarpıntı".to_string(), strings(&["palpitations"])),
            ("halsizlik".to_string(), strings(&["fatigue"])),
        ]);

        let disease_to_specialty: BTreeMap<String, DiseaseSpecialty> = BTreeMap::from([
            (
                "Migraine".to_string(),
                DiseaseSpecialty { id: "neurology".into(), confidence: 0.9 },
            ),
            (
                "Influenza".to_string(),
                DiseaseSpecialty { id: "internal_medicine".into(), confidence: 0.8 },
            ),
            (
                "Gastroenteritis".to_string(),
                DiseaseSpecialty { id: "gastroenterology".into(), confidence: 0.85 },
            ),
            (
                "Pneumonia".to_string(),
                DiseaseSpecialty { id: "pulmonology".into(), confidence: 0.9 },
            ),
            (
                "Heart attack".to_string(),
                DiseaseSpecialty { id: "cardiology".into(), confidence: 0.95 },
            ),
            (
                "Angina".to_string(),
                DiseaseSpecialty { id: "cardiology".into(), confidence: 0.9 },
            ),
            (
                "Urinary tract infection".to_string(),
                DiseaseSpecialty { id: "urology_internal".into(), confidence: 0.9 },
            ),
        ]);

        let question_bank_tr = vec![
            bank("baş ağrısı", "Baş ağrınız var mı?", AnswerType::YesNo),
            bank("bulantı", "Bulantınız var mı?", AnswerType::YesNo),
            bank("kusma", "Kusma oldu mu?", AnswerType::YesNo),
            bank("ateş", "Ateşiniz var mı?", AnswerType::YesNo),
            bank("öksürük", "Öksürüğünüz var mı?", AnswerType::YesNo),
            bank_with_priority(
                "balgam",
                "Öksürürken balgam çıkıyor mu?",
                AnswerType::YesNo,
                &["öksürük"],
            ),
            bank_with_priority(
                "öksürük süresi",
                "Kaç gündür öksürüyorsunuz?",
                AnswerType::FreeText,
                &["öksürük"],
            ),
            bank_with_priority(
                "nefes darlığı",
                "Nefes darlığınız var mı?",
                AnswerType::YesNo,
                &["göğüs ağrısı"],
            ),
            bank_with_priority(
                "göğüste baskı",
                "Göğsünüzde baskı ya da sıkışma hissi var mı?",
                AnswerType::YesNo,
                &["göğüs ağrısı"],
            ),
            QuestionBankEntry {
                why_asking: Some("Migren tipi baş ağrısını ayırt etmeye yardımcı olur.".into()),
                ..bank_with_priority(
                    "bulanık görme",
                    "Görmenizde bulanıklık ya da ışık çakmaları oluyor mu?",
                    AnswerType::YesNo,
                    &["baş ağrısı"],
                )
            },
            bank("ishal", "İshaliniz var mı?", AnswerType::YesNo),
            bank("terleme", "Soğuk terleme oluyor mu?", AnswerType::YesNo),
            bank("göğüs ağrısı", "Göğüs ağrınız var mı?", AnswerType::YesNo),
            bank("karın ağrısı", "Karın ağrınız var mı?", AnswerType::YesNo),
            bank("idrarda yanma", "İdrar yaparken yanma oluyor mu?", AnswerType::YesNo),
            bank("ağrı şiddeti", "Ağrınızı 0-10 arasında puanlar mısınız?", AnswerType::Number),
        ];

        let skip_rules = vec![
            SkipRule {
                canonical_symptom: "balgam".into(),
                skip_if_denied: strings(&["öksürük"]),
            },
            SkipRule {
                canonical_symptom: "öksürük süresi".into(),
                skip_if_denied: strings(&["öksürük"]),
            },
        ];

        let context_file = ContextFile {
            questions: vec![
                ContextQuestion {
                    id: "ctx_age".into(),
                    question: locale_map("Yaşınızı öğrenebilir miyim?", "How old are you?"),
                    answer_type: AnswerType::Number,
                    profile_field: ProfileField::Age,
                    when_ask: WhenAsk::Always,
                    when_symptoms_any: Vec::new(),
                    order: 1,
                    choices: None,
                },
                ContextQuestion {
                    id: "ctx_sex".into(),
                    question: locale_map("Cinsiyetinizi öğrenebilir miyim?", "What is your sex?"),
                    answer_type: AnswerType::MultiChoice,
                    profile_field: ProfileField::Sex,
                    when_ask: WhenAsk::Always,
                    when_symptoms_any: Vec::new(),
                    order: 2,
                    choices: Some(BTreeMap::from([
                        ("tr-TR".to_string(), strings(&["Kadın", "Erkek"])),
                        ("en-US".to_string(), strings(&["Female", "Male"])),
                    ])),
                },
                ContextQuestion {
                    id: "ctx_pregnancy".into(),
                    question: locale_map("Hamilelik ihtimaliniz var mı?", "Could you be pregnant?"),
                    answer_type: AnswerType::YesNo,
                    profile_field: ProfileField::Pregnancy,
                    when_ask: WhenAsk::Always,
                    when_symptoms_any: Vec::new(),
                    order: 3,
                    choices: None,
                },
                ContextQuestion {
                    id: "ctx_chronic".into(),
                    question: locale_map(
                        "Bilinen kronik hastalığınız var mı?",
                        "Do you have any chronic conditions?",
                    ),
                    answer_type: AnswerType::FreeText,
                    profile_field: ProfileField::Chronic,
                    when_ask: WhenAsk::WhenSymptomsAny,
                    when_symptoms_any: strings(&["göğüs ağrısı", "nefes darlığı"]),
                    order: 4,
                    choices: None,
                },
            ],
            pregnancy_relevant: strings(&["bulantı", "karın ağrısı"]),
        };

        let red_flag_questions = vec![
            RedFlagQuestion {
                id: "rf_uti_fever".into(),
                canonical: "ateş".into(),
                preconditions: strings(&["idrarda yanma"]),
                question: locale_map("Ateşiniz var mı?", "Do you have a fever?"),
                reason: locale_map(
                    "İdrar yolu şikayetlerinde ateş böbrek tutulumuna işaret edebilir.",
                    "Fever alongside urinary complaints can point to kidney involvement.",
                ),
            },
            RedFlagQuestion {
                id: "rf_neck_stiff".into(),
                canonical: "ense sertliği".into(),
                preconditions: strings(&["baş ağrısı", "ateş"]),
                question: locale_map(
                    "Ense sertliğiniz ya da boyun tutulması var mı?",
                    "Do you have neck stiffness?",
                ),
                reason: locale_map(
                    "Ateşle birlikte ense sertliği ivedi değerlendirme gerektirir.",
                    "Neck stiffness with fever needs prompt evaluation.",
                ),
            },
        ];

        let stop_rules = StopRules {
            max_questions: 6,
            max_questions_emergency: 3,
            emergency_specialty_ids: strings(&["cardiology"]),
            emergency_disease_keywords: strings(&["heart attack", "kalp krizi"]),
            min_expected_gain: 0.55,
            stop_on_high_confidence: true,
            confidence: ConfidenceThresholds::default(),
            default_specialty_id: "internal_medicine".into(),
            retract_on_denial: true,
        };

        let emergency_rules = vec![
            SymptomRule {
                id: "em_acs".into(),
                all_of: strings(&["göğüs ağrısı"]),
                any_of: strings(&["nefes darlığı", "terleme", "göğüste baskı"]),
                min_severity: None,
                min_duration_days: None,
                message_key: "emergency_acs".into(),
            },
            SymptomRule {
                id: "em_breathless".into(),
                all_of: strings(&["nefes darlığı"]),
                any_of: Vec::new(),
                min_severity: Some(8),
                min_duration_days: None,
                message_key: "emergency_breathless".into(),
            },
            SymptomRule {
                id: "em_fever_long".into(),
                all_of: strings(&["ateş"]),
                any_of: Vec::new(),
                min_severity: None,
                min_duration_days: Some(10),
                message_key: "emergency_fever".into(),
            },
        ];

        let same_day_rules = vec![
            SymptomRule {
                id: "sd_uti_fever".into(),
                all_of: strings(&["idrarda yanma", "ateş"]),
                any_of: Vec::new(),
                min_severity: None,
                min_duration_days: None,
                message_key: "same_day_uti_fever".into(),
            },
            SymptomRule {
                id: "sd_fever_3d".into(),
                all_of: strings(&["ateş"]),
                any_of: Vec::new(),
                min_severity: None,
                min_duration_days: Some(3),
                message_key: "same_day_fever".into(),
            },
        ];

        let specialty_urgency = BTreeMap::from([
            ("cardiology".to_string(), Urgency::SameDay),
            ("neurology".to_string(), Urgency::Within3Days),
            ("pulmonology".to_string(), Urgency::Within3Days),
            ("gastroenterology".to_string(), Urgency::Within3Days),
            ("urology_internal".to_string(), Urgency::Within3Days),
            ("internal_medicine".to_string(), Urgency::Routine),
        ]);

        let parser_sets_tr = ParserSets {
            duration_canonicals: string_set(&["öksürük süresi"]),
            severity_canonicals: string_set(&["ağrı şiddeti"]),
            timing_canonicals: string_set(&["öksürük gece artışı"]),
            duration_units: vec![
                DurationUnit { prefix: "gün".into(), days: 1 },
                DurationUnit { prefix: "hafta".into(), days: 7 },
                DurationUnit { prefix: "ay".into(), days: 30 },
            ],
            severity_words: BTreeMap::from([
                ("hafif".to_string(), 2u8),
                ("orta".to_string(), 6u8),
                ("şiddetli".to_string(), 8u8),
            ]),
            timing_words: BTreeMap::from([
                ("sabah".to_string(), Timing::Morning),
                ("akşam".to_string(), Timing::Evening),
                ("gece".to_string(), Timing::Night),
                ("gündüz".to_string(), Timing::Day),
            ]),
        };

        let messages_tr = LocaleMessages {
            text: BTreeMap::from(
                [
                    ("EMPTY_INPUT", "Mesaj veya yanıt bekleniyordu; boş istek işlenemedi."),
                    (
                        "SESSION_COMPLETE",
                        "Bu oturum tamamlandı; yeni bir değerlendirme için yeni oturum başlatın.",
                    ),
                    ("TURN_FAILED", "İsteğiniz işlenirken bir sorun oluştu; lütfen tekrar deneyin."),
                    ("BAD_SESSION", "Oturum bulunamadı."),
                    ("CONCURRENT_TURN", "Bu oturum için başka bir istek zaten işleniyor."),
                    ("UNKNOWN_ANSWER", "Yanıt, sorulmamış bir soruya ait."),
                    ("CATALOG_ERROR", "İstenen dil için başvuru verisi bulunamadı."),
                    ("urgency_EMERGENCY", "Acil durum"),
                    ("urgency_ER_NOW", "Acil servise hemen başvurun"),
                    ("urgency_SAME_DAY", "Bugün içinde başvurun"),
                    ("urgency_WITHIN_3_DAYS", "3 gün içinde başvurun"),
                    ("urgency_ROUTINE", "Rutin randevu yeterli"),
                    (
                        "disclaimer",
                        "Bu değerlendirme tıbbi tanı değildir; yalnızca yönlendirme amaçlıdır.",
                    ),
                    ("confidence_label_high", "Yüksek"),
                    ("confidence_label_medium", "Orta"),
                    ("confidence_label_low", "Düşük"),
                    (
                        "confidence_explain_high",
                        "Belirtiler tek bir tabloyla güçlü şekilde örtüşüyor.",
                    ),
                    (
                        "confidence_explain_medium",
                        "Belirtiler birden fazla tabloyla kısmen örtüşüyor.",
                    ),
                    (
                        "confidence_explain_low",
                        "Belirtiler henüz belirgin bir tabloya işaret etmiyor.",
                    ),
                    (
                        "emergency_acs",
                        "Göğüs ağrısıyla birlikte eşlik eden bulgular acil değerlendirme gerektirir.",
                    ),
                    ("emergency_breathless", "Şiddetli nefes darlığı acil değerlendirme gerektirir."),
                    ("emergency_fever", "Uzun süren yüksek ateş acil değerlendirme gerektirir."),
                    (
                        "same_day_uti_fever",
                        "İdrar şikayetlerine ateş eşlik ediyorsa bugün içinde bir sağlık kuruluşuna başvurun.",
                    ),
                    (
                        "same_day_fever",
                        "Üç günden uzun süren ateş için bugün içinde değerlendirme önerilir.",
                    ),
                    ("summary_symptoms", "Belirtiler"),
                    ("summary_denied", "Olmadığı belirtilenler"),
                    ("summary_duration", "Süre"),
                    ("summary_severity", "Şiddet"),
                    ("summary_timing", "Zamanlama"),
                    ("summary_qa", "Soru-cevap"),
                    ("summary_risk", "Risk düzeyi"),
                    ("why_phrase", "'{phrase}' ifadesi {specialty} ile eşleşti (+{points})"),
                    ("why_keyword", "'{keyword}' belirtisi {specialty} ile eşleşti (+{points})"),
                    ("why_negative", "'{keyword}' ifadesi {specialty} puanını düşürdü ({points})"),
                    ("why_prior", "Aday hastalıklar {specialty} uzmanlığına işaret ediyor (+{points})"),
                ]
                .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
            emergency_instructions: strings(&[
                "112'yi arayın veya en yakın acil servise başvurun.",
                "Araç kullanmayın; mümkünse yanınızda biri olsun.",
                "Belirtileriniz değişirse 112 operatörünü bilgilendirin.",
            ]),
            safety_notes: strings(&[
                "Belirtileriniz kötüleşirse beklemeden bir sağlık kuruluşuna başvurun.",
                "Bu özet, hekiminizle paylaşmanız için hazırlanmıştır.",
            ]),
        };

        let facilities = vec![
            FacilityEntry {
                name: "Şehir Hastanesi Acil Servisi".into(),
                kind: "hospital".into(),
                specialty_ids: strings(&["cardiology", "internal_medicine"]),
                city: "İstanbul".into(),
                address: "Atatürk Cad. No:1".into(),
                lat: Some(41.015),
                lon: Some(28.979),
            },
            FacilityEntry {
                name: "Merkez Nöroloji Kliniği".into(),
                kind: "clinic".into(),
                specialty_ids: strings(&["neurology"]),
                city: "Ankara".into(),
                address: "Kızılay Mah. 5. Sok.".into(),
                lat: Some(39.92),
                lon: Some(32.854),
            },
            FacilityEntry {
                name: "Anadolu Polikliniği".into(),
                kind: "clinic".into(),
                specialty_ids: strings(&["urology_internal", "internal_medicine"]),
                city: "İstanbul".into(),
                address: "Bağdat Cad. No:42".into(),
                lat: None,
                lon: None,
            },
        ];

        Catalog::assemble(super::CatalogParts {
            synonyms,
            specialty_file,
            disease_symptoms,
            symptom_severity,
            kaggle_to_canonical,
            disease_to_specialty,
            question_banks: BTreeMap::from([("tr-TR".to_string(), question_bank_tr)]),
            skip_rules,
            context_file,
            red_flag_questions,
            stop_rules,
            candidate_generator: CandidateGeneratorConfig::default(),
            emergency_rules,
            same_day_rules,
            specialty_urgency,
            parser_sets: BTreeMap::from([("tr-TR".to_string(), parser_sets_tr)]),
            messages: BTreeMap::from([("tr-TR".to_string(), messages_tr)]),
            facilities,
        })
    }
}
