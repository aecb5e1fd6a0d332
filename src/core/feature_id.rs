//! Opake Feature-IDs der Render-Primitive: `<namespace>_<mode>_<type>_<measureId>`.

use super::{MeasureId, MeasureMode};

/// Namespace aller von dieser Engine erzeugten Primitive
pub const FEATURE_NAMESPACE: &str = "annotate";

/// Art eines Primitivs (Typ-Token der Feature-ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Messpunkt
    Point,
    /// Segment-Linie
    Line,
    /// Segment-Label
    Label,
    /// Summen-Label
    Total,
    /// Flächen-Polygon
    Polygon,
}

impl FeatureKind {
    fn token(&self) -> &'static str {
        match self {
            FeatureKind::Point => "point",
            FeatureKind::Line => "line",
            FeatureKind::Label => "label",
            FeatureKind::Total => "total",
            FeatureKind::Polygon => "polygon",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "point" => Some(FeatureKind::Point),
            "line" => Some(FeatureKind::Line),
            "label" => Some(FeatureKind::Label),
            "total" => Some(FeatureKind::Total),
            "polygon" => Some(FeatureKind::Polygon),
            _ => None,
        }
    }
}

/// Zerlegte Feature-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId {
    /// Modus der Messung
    pub mode: MeasureMode,
    /// Art des Primitivs
    pub kind: FeatureKind,
    /// Besitzende Messung
    pub measure_id: MeasureId,
}

impl FeatureId {
    /// Erstellt eine Feature-ID.
    pub fn new(mode: MeasureMode, kind: FeatureKind, measure_id: MeasureId) -> Self {
        Self {
            mode,
            kind,
            measure_id,
        }
    }

    /// Parst eine Feature-ID. Fremde Namespaces und unbekannte Tokens ergeben `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.split('_');
        let namespace = tokens.next()?;
        let mode = MeasureMode::from_token(tokens.next()?)?;
        let kind = FeatureKind::from_token(tokens.next()?)?;
        let measure_id = tokens.next()?.parse::<MeasureId>().ok()?;
        if namespace != FEATURE_NAMESPACE || tokens.next().is_some() {
            return None;
        }
        Some(Self::new(mode, kind, measure_id))
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            FEATURE_NAMESPACE,
            self.mode.token(),
            self.kind.token(),
            self.measure_id
        )
    }
}
