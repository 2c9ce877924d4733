use serde::{Deserialize, Serialize};

/// Ledger entry classification, shared by categories and transactions.
/// Stored as text; the reporting views key their sign convention off it
/// (entrada/ganho count positive, saida/divida negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Entrada,
    Saida,
    Divida,
    Ganho,
}

impl EntryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entrada" => Some(Self::Entrada),
            "saida" => Some(Self::Saida),
            "divida" => Some(Self::Divida),
            "ganho" => Some(Self::Ganho),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Saida => "saida",
            Self::Divida => "divida",
            Self::Ganho => "ganho",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_kinds_only() {
        assert_eq!(EntryKind::parse("entrada"), Some(EntryKind::Entrada));
        assert_eq!(EntryKind::parse("saida"), Some(EntryKind::Saida));
        assert_eq!(EntryKind::parse("divida"), Some(EntryKind::Divida));
        assert_eq!(EntryKind::parse("ganho"), Some(EntryKind::Ganho));
        assert_eq!(EntryKind::parse("ENTRADA"), None);
        assert_eq!(EntryKind::parse("outro"), None);
        assert_eq!(EntryKind::parse(""), None);
    }

    #[test]
    fn parse_round_trips_as_str() {
        for kind in [
            EntryKind::Entrada,
            EntryKind::Saida,
            EntryKind::Divida,
            EntryKind::Ganho,
        ] {
            assert_eq!(EntryKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EntryKind::Saida).unwrap(),
            r#""saida""#
        );
        let kind: EntryKind = serde_json::from_str(r#""ganho""#).unwrap();
        assert_eq!(kind, EntryKind::Ganho);
    }
}
