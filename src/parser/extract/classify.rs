//! Publication type and urgency. Both take normalized text and apply an ordered
//! rule list; the first rule that fires decides.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{PublicationType, Urgency};

/// Most specific first: a judgment outranks everything it may quote.
const TYPE_RULES: &[(PublicationType, &[&str])] = &[
    (PublicationType::Sentenca, &["SENTENCA"]),
    (PublicationType::Decisao, &["DECISAO"]),
    (PublicationType::Despacho, &["DESPACHO"]),
    (PublicationType::Citacao, &["CITACAO", "CITE-SE"]),
    (PublicationType::Intimacao, &["INTIMACAO", "INTIME-SE", "INTIMEM-SE"]),
    (PublicationType::Acordao, &["ACORDAO"]),
    (PublicationType::Edital, &["EDITAL"]),
];

const URGENCY_WORDS: &[&str] = &["URGENTE", "URGENCIA"];
const SUMMONS_WORDS: &[&str] = &["CITACAO", "MANDADO"];

const CRITICAL_DEADLINE_DAYS: u32 = 2;
const HIGH_DEADLINE_DAYS: u32 = 5;

/// `PRAZO DE 15 (QUINZE) DIAS`, `PRAZO 48 HORAS`, ...
static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PRAZO\s+(?:DE\s+)?(\d{1,4})\s*(?:\([^)]*\)\s*)?(DIA|HORA)").unwrap()
});

pub fn classify_type(normalized: &str) -> PublicationType {
    TYPE_RULES
        .iter()
        .find(|(_, words)| words.iter().any(|w| normalized.contains(w)))
        .map(|(kind, _)| *kind)
        .unwrap_or(PublicationType::Outros)
}

/// Urgency words, then the shortest deadline, then summons keywords.
pub fn classify_urgency(normalized: &str) -> Urgency {
    if URGENCY_WORDS.iter().any(|w| normalized.contains(w)) {
        return Urgency::Critical;
    }

    match shortest_deadline_days(normalized) {
        Some(days) if days <= CRITICAL_DEADLINE_DAYS => return Urgency::Critical,
        Some(days) if days <= HIGH_DEADLINE_DAYS => return Urgency::High,
        _ => {}
    }

    if SUMMONS_WORDS.iter().any(|w| normalized.contains(w)) {
        return Urgency::High;
    }

    Urgency::Normal
}

/// Shortest deadline in whole days; hour deadlines round up (48h is 2 days).
pub fn shortest_deadline_days(normalized: &str) -> Option<u32> {
    DEADLINE_RE
        .captures_iter(normalized)
        .filter_map(|caps| {
            let n: u32 = caps[1].parse().ok()?;
            Some(match &caps[2] {
                "HORA" => n.div_ceil(24),
                _ => n,
            })
        })
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize::normalize;

    fn kind(text: &str) -> PublicationType {
        classify_type(&normalize(text))
    }

    fn urgency(text: &str) -> Urgency {
        classify_urgency(&normalize(text))
    }

    #[test]
    fn type_priority_prefers_judgment() {
        assert_eq!(kind("Intimação da SENTENÇA proferida"), PublicationType::Sentenca);
        assert_eq!(kind("Decisão. Intime-se."), PublicationType::Decisao);
        assert_eq!(kind("Despacho: cite-se o réu"), PublicationType::Despacho);
        assert_eq!(kind("Cite-se por carta. Intime-se."), PublicationType::Citacao);
        assert_eq!(kind("Ficam intimadas as partes. INTIMAÇÃO"), PublicationType::Intimacao);
        assert_eq!(kind("Acórdão registrado"), PublicationType::Acordao);
        assert_eq!(kind("EDITAL DE PRAÇA"), PublicationType::Edital);
        assert_eq!(kind("Certidão de objeto e pé"), PublicationType::Outros);
    }

    #[test]
    fn urgency_word_outranks_long_deadline() {
        assert_eq!(
            urgency("Manifeste-se no prazo de 15 (quinze) dias. URGENTE."),
            Urgency::Critical
        );
    }

    #[test]
    fn deadline_thresholds() {
        assert_eq!(urgency("no prazo de 2 dias"), Urgency::Critical);
        assert_eq!(urgency("no prazo de 48 horas"), Urgency::Critical);
        assert_eq!(urgency("no prazo de 5 (cinco) dias úteis"), Urgency::High);
        assert_eq!(urgency("no prazo de 72 horas"), Urgency::High);
        assert_eq!(urgency("no prazo de 15 dias"), Urgency::Normal);
    }

    #[test]
    fn shortest_deadline_wins() {
        assert_eq!(
            shortest_deadline_days(&normalize("prazo de 15 dias, ou prazo de 1 dia")),
            Some(1)
        );
        assert_eq!(shortest_deadline_days("SEM PRAZO"), None);
    }

    #[test]
    fn several_deadlines_use_the_shortest() {
        assert_eq!(
            urgency("Contestação no prazo de 15 dias; emenda no prazo de 5 (cinco) dias."),
            Urgency::High
        );
        assert_eq!(
            urgency("Prazo de 10 dias para réplica e prazo de 24 horas para o depósito."),
            Urgency::Critical
        );
        assert_eq!(
            urgency("Prazo de 30 dias para recurso e prazo de 20 dias para contrarrazões."),
            Urgency::Normal
        );
    }

    #[test]
    fn summons_is_high_when_no_deadline_rule_fires() {
        assert_eq!(urgency("Expeça-se mandado de citação"), Urgency::High);
        assert_eq!(urgency("Citação no prazo de 15 dias"), Urgency::High);
        assert_eq!(urgency("Vistos. Arquivem-se os autos."), Urgency::Normal);
    }
}
