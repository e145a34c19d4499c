// Metric catalog - the fixed set of health metrics the history view knows about
use serde::Serialize;

/// How samples of a metric are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Point-in-time readings (weight, muscle, body fat)
    Measurement,
    /// Daily totals that add up over the period (water, steps, exercise)
    Cumulative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
    pub value_kind: ValueKind,
}

impl MetricDescriptor {
    const fn new(
        id: &'static str,
        title: &'static str,
        unit: &'static str,
        value_kind: ValueKind,
    ) -> Self {
        Self {
            id,
            title,
            unit,
            value_kind,
        }
    }

    pub fn is_cumulative(&self) -> bool {
        self.value_kind == ValueKind::Cumulative
    }
}

static METRICS: [MetricDescriptor; 6] = [
    MetricDescriptor::new("weight", "Weight", "kg", ValueKind::Measurement),
    MetricDescriptor::new("muscle", "Muscle", "kg", ValueKind::Measurement),
    MetricDescriptor::new("fat_percentage", "Body fat", "%", ValueKind::Measurement),
    MetricDescriptor::new("water", "Water", "glasses", ValueKind::Cumulative),
    MetricDescriptor::new("steps", "Steps", "steps", ValueKind::Cumulative),
    MetricDescriptor::new("exercise", "Exercise", "min", ValueKind::Cumulative),
];

pub struct MetricCatalog;

impl MetricCatalog {
    /// All metrics in display order
    pub fn all() -> &'static [MetricDescriptor] {
        &METRICS
    }

    pub fn by_id(id: &str) -> Option<&'static MetricDescriptor> {
        METRICS.iter().find(|m| m.id == id)
    }
}
