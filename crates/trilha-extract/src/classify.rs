use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use trilha_model::CellStyle;

/// Minimum trimmed length (in characters) for a cell to qualify as a question.
const MIN_QUESTION_CHARS: usize = 5;

/// What a cell's text + style amount to, for extraction purposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClassification {
    /// The cell asks the user something and gets a response slot.
    Question,
    /// The cell opens a new section of the trail.
    SectionHeader,
    /// Anything else: instructions, examples, decoration.
    Plain,
}

/// Which signal flagged a cell as a question. Recorded in the question's
/// source metadata for auditability.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuestionSignal {
    /// Leading interrogative/imperative keyword (qual, como, descreva, ...).
    Keyword,
    /// The text ends with a question mark.
    QuestionMark,
}

impl QuestionSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionSignal::Keyword => "keyword",
            QuestionSignal::QuestionMark => "question_mark",
        }
    }
}

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:qual(?:is)?|o\s+que|que|como|por\s+qu[eê]|quando|onde|quem|quant[oa]s?|descreva|liste|explique|defina|identifique|escreva|preencha|indique|detalhe|cite)\b",
        )
        .expect("valid regex")
    })
}

fn exclusion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^exemplo\b|\(ex\b|^amostra\b|^demonstra[çc][aã]o\b|^nota\s*:|^obs\.?\s*:|^\[)")
            .expect("valid regex")
    })
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:fase|etapa|t[ií]tulo|cap[ií]tulo|m[oó]dulo|parte|se[çc][aã]o)\b")
            .expect("valid regex")
    })
}

/// The question signal for `text`, if any.
///
/// `text` must already be trimmed. Returns `None` for text that is too
/// short, matches an exclusion marker, or carries no interrogative signal.
pub(crate) fn question_signal(text: &str) -> Option<QuestionSignal> {
    if text.chars().count() < MIN_QUESTION_CHARS {
        return None;
    }
    if exclusion_re().is_match(text) {
        return None;
    }
    if question_re().is_match(text) {
        return Some(QuestionSignal::Keyword);
    }
    if text.ends_with('?') {
        return Some(QuestionSignal::QuestionMark);
    }
    None
}

/// Whether `text` matches an example/instruction exclusion marker.
pub(crate) fn is_excluded_text(text: &str) -> bool {
    exclusion_re().is_match(text)
}

/// Whether `text` starts with a section keyword (fase, etapa, módulo, ...).
pub(crate) fn matches_section_keyword(text: &str) -> bool {
    section_re().is_match(text)
}

/// Classify one cell from its trimmed text and style.
///
/// A question-keyword match takes priority over title-style heuristics: a
/// large bold filled cell whose text reads as a question is a question, not
/// a section header.
pub fn classify_cell(text: &str, style: &CellStyle) -> CellClassification {
    let text = text.trim();
    if text.is_empty() {
        return CellClassification::Plain;
    }

    if question_signal(text).is_some() {
        return CellClassification::Question;
    }

    if matches_section_keyword(text) || style.is_title_like() {
        return CellClassification::SectionHeader;
    }

    CellClassification::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilha_model::Color;

    fn title_style() -> CellStyle {
        CellStyle {
            font_size_100pt: Some(1600),
            bold: true,
            fill: Some(Color::new_argb(0xFF4472C4)),
        }
    }

    fn body_style() -> CellStyle {
        CellStyle {
            font_size_100pt: Some(1100),
            bold: false,
            fill: None,
        }
    }

    #[test]
    fn plain_body_question_is_a_question() {
        assert_eq!(
            classify_cell("Qual é o seu mercado-alvo?", &body_style()),
            CellClassification::Question
        );
    }

    #[test]
    fn styled_phase_header_is_a_section() {
        assert_eq!(
            classify_cell("Fase 1: Descoberta", &title_style()),
            CellClassification::SectionHeader
        );
    }

    #[test]
    fn keyword_match_beats_title_style() {
        // A title-styled cell with a question keyword is still a question.
        assert_eq!(
            classify_cell("Como você pretende crescer?", &title_style()),
            CellClassification::Question
        );
    }

    #[test]
    fn keyword_alternatives_are_accepted() {
        for text in [
            "Quais canais de venda você usa hoje",
            "Descreva sua operação atual",
            "Liste seus três maiores concorrentes",
            "Quantos funcionários a empresa tem",
            "Por que o cliente escolheria você",
            "Preencha o faturamento mensal",
        ] {
            assert_eq!(
                classify_cell(text, &body_style()),
                CellClassification::Question,
                "expected question: {text}"
            );
        }
    }

    #[test]
    fn trailing_question_mark_is_a_signal() {
        assert_eq!(
            classify_cell("Em sua opinião, o produto está pronto?", &body_style()),
            CellClassification::Question
        );
        assert_eq!(
            question_signal("Em sua opinião, o produto está pronto?"),
            Some(QuestionSignal::QuestionMark)
        );
    }

    #[test]
    fn short_and_excluded_text_is_rejected() {
        assert_eq!(classify_cell("", &body_style()), CellClassification::Plain);
        assert_eq!(
            classify_cell("Qua", &body_style()),
            CellClassification::Plain
        );
        for text in [
            "Exemplo: Qual é o seu nome? João",
            "(ex) descreva aqui",
            "Nota: preencha tudo",
            "Obs.: quantos quiser",
            "[instruções gerais]",
            "Amostra de resposta",
        ] {
            assert_eq!(
                classify_cell(text, &body_style()),
                CellClassification::Plain,
                "expected plain: {text}"
            );
        }
    }

    #[test]
    fn unstyled_section_keyword_is_still_a_section() {
        assert_eq!(
            classify_cell("Etapa 2 - Validação", &body_style()),
            CellClassification::SectionHeader
        );
        assert_eq!(
            classify_cell("Módulo de vendas", &body_style()),
            CellClassification::SectionHeader
        );
    }

    #[test]
    fn plain_instruction_stays_plain() {
        assert_eq!(
            classify_cell("Responda com sinceridade as perguntas abaixo.", &body_style()),
            CellClassification::Plain
        );
    }
}
