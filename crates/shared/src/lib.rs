use serde::{Deserialize, Serialize};

/// Display unit for wall lengths and canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Feet,
    Meters,
}

impl Units {
    /// Factor applied to a length measured in grid cells.
    ///
    /// One grid cell is one foot; the factor only affects labels and never
    /// touches stored coordinates.
    pub fn conversion_factor(&self) -> f64 {
        match self {
            Units::Feet => 1.0,
            Units::Meters => 0.3048,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Units::Feet => "feet",
            Units::Meters => "meters",
        }
    }

    pub fn all() -> &'static [Units] {
        &[Units::Feet, Units::Meters]
    }
}

/// One drawn wall: a straight 2D line in grid space plus its stroke width.
///
/// `points` is `[x1, y1, x2, y2]`. The 2D `y` axis becomes world depth (`z`)
/// once the layout reaches the 3D viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub points: [f64; 4],
    pub thickness: f64,
}

impl WallSegment {
    pub fn new(points: [f64; 4], thickness: f64) -> Self {
        Self { points, thickness }
    }

    /// Zero-length segment anchored at a single point
    pub fn at(x: f64, y: f64, thickness: f64) -> Self {
        Self::new([x, y, x, y], thickness)
    }

    pub fn start(&self) -> [f64; 2] {
        [self.points[0], self.points[1]]
    }

    pub fn end(&self) -> [f64; 2] {
        [self.points[2], self.points[3]]
    }

    pub fn set_end(&mut self, x: f64, y: f64) {
        self.points[2] = x;
        self.points[3] = y;
    }

    /// Euclidean length in grid units
    pub fn length(&self) -> f64 {
        let dx = self.points[2] - self.points[0];
        let dy = self.points[3] - self.points[1];
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self) -> [f64; 2] {
        [
            (self.points[0] + self.points[2]) / 2.0,
            (self.points[1] + self.points[3]) / 2.0,
        ]
    }

    /// Direction angle in radians, measured from +x towards +y
    pub fn angle(&self) -> f64 {
        (self.points[3] - self.points[1]).atan2(self.points[2] - self.points[0])
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() == 0.0
    }
}

/// The finished sketch handed from the 2D editor to the 3D viewer.
///
/// Passed by value; the viewer never writes back into the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorplanLayout {
    pub walls: Vec<WallSegment>,
    #[serde(default)]
    pub units: Units,
}

impl FloorplanLayout {
    pub fn new(walls: Vec<WallSegment>, units: Units) -> Self {
        Self { walls, units }
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

/// JSON form of the handoff: `{ "layout": [ { "points": [..], "thickness": n } ] }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutPayload {
    #[serde(default)]
    pub layout: Vec<WallSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
}

/// Errors while decoding a layout payload
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("wall {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("wall {index} has non-positive thickness {thickness}")]
    Thickness { index: usize, thickness: f64 },
}

impl LayoutPayload {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let payload: LayoutPayload = serde_json::from_str(json)?;
        for (index, wall) in payload.layout.iter().enumerate() {
            if wall.points.iter().any(|v| !v.is_finite()) {
                return Err(LayoutError::NonFinite { index });
            }
            if wall.thickness.is_nan() || wall.thickness <= 0.0 {
                return Err(LayoutError::Thickness {
                    index,
                    thickness: wall.thickness,
                });
            }
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_layout(self) -> FloorplanLayout {
        FloorplanLayout {
            walls: self.layout,
            units: self.units.unwrap_or_default(),
        }
    }
}

impl From<&FloorplanLayout> for LayoutPayload {
    fn from(layout: &FloorplanLayout) -> Self {
        Self {
            layout: layout.walls.clone(),
            units: Some(layout.units),
        }
    }
}
