use serde::{Deserialize, Serialize};

/// Target unit system requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Linear value converter `value * factor + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConverter {
    pub factor: f64,
    pub offset: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::identity()
    }
}

impl UnitConverter {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            factor: 1.0,
            offset: 0.0,
        }
    }

    #[must_use]
    pub const fn linear(factor: f64, offset: f64) -> Self {
        Self { factor, offset }
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self.factor == 1.0 && self.offset == 0.0
    }

    #[must_use]
    pub fn convert(self, value: f64) -> f64 {
        if self.is_identity() {
            value
        } else {
            value * self.factor + self.offset
        }
    }
}

// (metric unit, imperial unit, factor, offset)
const METRIC_TO_IMPERIAL: &[(&str, &str, f64, f64)] = &[
    ("°C", "°F", 1.8, 32.0),
    ("m", "ft", 3.280_839_895, 0.0),
    ("km", "mi", 0.621_371_192, 0.0),
    ("mm", "in", 0.039_370_079, 0.0),
    ("km/h", "mph", 0.621_371_192, 0.0),
    ("m/s", "ft/s", 3.280_839_895, 0.0),
    ("kg", "lb", 2.204_622_622, 0.0),
    ("L", "gal", 0.264_172_052, 0.0),
    ("bar", "psi", 14.503_773_773, 0.0),
    ("kPa", "psi", 0.145_037_738, 0.0),
];

/// Units label and converter resolved for one chart item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedUnits {
    pub units: String,
    pub converter: UnitConverter,
}

/// Resolves the display units and converter for values reported in `units`.
///
/// Unknown units, or units already in the requested system, resolve to the
/// identity converter and keep their label.
#[must_use]
pub fn resolve_units(units: &str, system: Option<UnitSystem>) -> ResolvedUnits {
    let identity = ResolvedUnits {
        units: units.to_owned(),
        converter: UnitConverter::identity(),
    };
    let Some(system) = system else {
        return identity;
    };
    let conversion = match system {
        UnitSystem::Imperial => METRIC_TO_IMPERIAL
            .iter()
            .find(|(metric, ..)| *metric == units)
            .map(|(_, imperial, factor, offset)| {
                (*imperial, UnitConverter::linear(*factor, *offset))
            }),
        UnitSystem::Metric => METRIC_TO_IMPERIAL
            .iter()
            .find(|(_, imperial, ..)| *imperial == units)
            .map(|(metric, _, factor, offset)| {
                (
                    *metric,
                    UnitConverter::linear(1.0 / factor, -offset / factor),
                )
            }),
    };
    match conversion {
        Some((target, converter)) => ResolvedUnits {
            units: target.to_owned(),
            converter,
        },
        None => identity,
    }
}
