// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Search criterion tree
//!
//! Criteria are built by the query layer. This crate only inspects them:
//! [`Criterion::contains_kind`] and [`Criterion::find_first`] walk the tree
//! depth-first, testing a node before its children.

use crate::error::{Error, Result};
use crate::geometry::Ring;
use crate::position::Position;
use std::fmt;

/// Comparison operator of a range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl ComparisonOperator {
    pub fn test(&self, candidate: f64, bound: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThan => candidate > bound,
            ComparisonOperator::GreaterOrEqual => candidate >= bound,
            ComparisonOperator::LessThan => candidate < bound,
            ComparisonOperator::LessOrEqual => candidate <= bound,
        }
    }
}

/// One bound of a range criterion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueComparison {
    pub operator: ComparisonOperator,
    pub value: f64,
}

/// Numeric range on an attribute; every comparison must hold
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCriterion {
    pub name: String,
    pub comparisons: Vec<ValueComparison>,
}

impl RangeCriterion {
    pub fn matches(&self, candidate: f64) -> bool {
        self.comparisons
            .iter()
            .all(|c| c.operator.test(candidate, c.value))
    }
}

/// Date range on an attribute (ISO-8601 strings, either bound optional)
#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeCriterion {
    pub name: String,
    pub lower: Option<String>,
    pub upper: Option<String>,
}

/// Intersection with a polygon (exterior ring first)
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCriterion {
    pub rings: Vec<Ring>,
}

/// Intersection with a longitude/latitude box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBoxCriterion {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundaryBoxCriterion {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            min_x: left,
            min_y: bottom,
            max_x: right,
            max_y: top,
        }
    }
}

/// Intersection with a circle: center plus a radius with optional unit
#[derive(Debug, Clone, PartialEq)]
pub struct CircleCriterion {
    pub center: Position,
    pub radius: String,
}

impl CircleCriterion {
    /// Radius in meters. Accepts `"50m"`, `"2km"` or a bare number of meters.
    pub fn radius_meters(&self) -> Result<f64> {
        let text = self.radius.trim();
        let (number, factor) = if let Some(km) = text.strip_suffix("km") {
            (km, 1000.0)
        } else if let Some(m) = text.strip_suffix('m') {
            (m, 1.0)
        } else {
            (text, 1.0)
        };
        match number.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value * factor),
            _ => Err(Error::InvalidGeometry(format!(
                "invalid circle radius '{}'",
                self.radius
            ))),
        }
    }
}

/// Criterion kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    Empty,
    And,
    Or,
    Not,
    StringMatch,
    StringMatchAny,
    IntMatch,
    LongMatch,
    DateMatch,
    Range,
    DateRange,
    BooleanMatch,
    Polygon,
    BoundaryBox,
    Circle,
    FieldExists,
}

/// A search predicate tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Criterion {
    /// Matches everything
    #[default]
    Empty,
    And(Vec<Criterion>),
    Or(Vec<Criterion>),
    Not(Box<Criterion>),
    StringMatch { name: String, value: String },
    StringMatchAny { name: String, values: Vec<String> },
    IntMatch { name: String, value: i32 },
    LongMatch { name: String, value: i64 },
    DateMatch { name: String, value: String },
    Range(RangeCriterion),
    DateRange(DateRangeCriterion),
    BooleanMatch { name: String, value: bool },
    Polygon(PolygonCriterion),
    BoundaryBox(BoundaryBoxCriterion),
    Circle(CircleCriterion),
    FieldExists(String),
}

impl Criterion {
    pub fn and(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Criterion::And(criteria.into_iter().collect())
    }

    pub fn or(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Criterion::Or(criteria.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(criterion: Criterion) -> Self {
        Criterion::Not(Box::new(criterion))
    }

    pub fn eq_str(name: impl Into<String>, value: impl Into<String>) -> Self {
        Criterion::StringMatch {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn eq_any_str<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Criterion::StringMatchAny {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn eq_int(name: impl Into<String>, value: i32) -> Self {
        Criterion::IntMatch {
            name: name.into(),
            value,
        }
    }

    pub fn eq_long(name: impl Into<String>, value: i64) -> Self {
        Criterion::LongMatch {
            name: name.into(),
            value,
        }
    }

    pub fn eq_bool(name: impl Into<String>, value: bool) -> Self {
        Criterion::BooleanMatch {
            name: name.into(),
            value,
        }
    }

    pub fn eq_date(name: impl Into<String>, value: impl Into<String>) -> Self {
        Criterion::DateMatch {
            name: name.into(),
            value: value.into(),
        }
    }

    fn bound(name: impl Into<String>, operator: ComparisonOperator, value: f64) -> Self {
        Criterion::Range(RangeCriterion {
            name: name.into(),
            comparisons: vec![ValueComparison { operator, value }],
        })
    }

    pub fn gt(name: impl Into<String>, value: f64) -> Self {
        Self::bound(name, ComparisonOperator::GreaterThan, value)
    }

    pub fn ge(name: impl Into<String>, value: f64) -> Self {
        Self::bound(name, ComparisonOperator::GreaterOrEqual, value)
    }

    pub fn lt(name: impl Into<String>, value: f64) -> Self {
        Self::bound(name, ComparisonOperator::LessThan, value)
    }

    pub fn le(name: impl Into<String>, value: f64) -> Self {
        Self::bound(name, ComparisonOperator::LessOrEqual, value)
    }

    /// Inclusive range `[lower, upper]`
    pub fn between(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Criterion::Range(RangeCriterion {
            name: name.into(),
            comparisons: vec![
                ValueComparison {
                    operator: ComparisonOperator::GreaterOrEqual,
                    value: lower,
                },
                ValueComparison {
                    operator: ComparisonOperator::LessOrEqual,
                    value: upper,
                },
            ],
        })
    }

    pub fn date_between(
        name: impl Into<String>,
        lower: Option<String>,
        upper: Option<String>,
    ) -> Self {
        Criterion::DateRange(DateRangeCriterion {
            name: name.into(),
            lower,
            upper,
        })
    }

    pub fn intersects_circle(center: Position, radius: impl Into<String>) -> Self {
        Criterion::Circle(CircleCriterion {
            center,
            radius: radius.into(),
        })
    }

    pub fn intersects_polygon(rings: Vec<Ring>) -> Self {
        Criterion::Polygon(PolygonCriterion { rings })
    }

    pub fn intersects_bbox(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Criterion::BoundaryBox(BoundaryBoxCriterion::new(left, bottom, right, top))
    }

    /// Parse a `"left,bottom,right,top"` box
    pub fn parse_bbox(bbox: &str) -> Result<Self> {
        let values = bbox
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidGeometry(format!("invalid bbox '{}': {}", bbox, e)))?;
        match values.as_slice() {
            [left, bottom, right, top] => Ok(Self::intersects_bbox(*left, *bottom, *right, *top)),
            _ => Err(Error::InvalidGeometry(format!(
                "invalid bbox '{}': expected left,bottom,right,top",
                bbox
            ))),
        }
    }

    pub fn attribute_exists(name: impl Into<String>) -> Self {
        Criterion::FieldExists(name.into())
    }

    pub fn kind(&self) -> CriterionKind {
        match self {
            Criterion::Empty => CriterionKind::Empty,
            Criterion::And(_) => CriterionKind::And,
            Criterion::Or(_) => CriterionKind::Or,
            Criterion::Not(_) => CriterionKind::Not,
            Criterion::StringMatch { .. } => CriterionKind::StringMatch,
            Criterion::StringMatchAny { .. } => CriterionKind::StringMatchAny,
            Criterion::IntMatch { .. } => CriterionKind::IntMatch,
            Criterion::LongMatch { .. } => CriterionKind::LongMatch,
            Criterion::DateMatch { .. } => CriterionKind::DateMatch,
            Criterion::Range(_) => CriterionKind::Range,
            Criterion::DateRange(_) => CriterionKind::DateRange,
            Criterion::BooleanMatch { .. } => CriterionKind::BooleanMatch,
            Criterion::Polygon(_) => CriterionKind::Polygon,
            Criterion::BoundaryBox(_) => CriterionKind::BoundaryBox,
            Criterion::Circle(_) => CriterionKind::Circle,
            Criterion::FieldExists(_) => CriterionKind::FieldExists,
        }
    }

    /// Direct sub-criteria
    pub fn children(&self) -> &[Criterion] {
        match self {
            Criterion::And(criteria) | Criterion::Or(criteria) => criteria,
            Criterion::Not(criterion) => std::slice::from_ref(criterion.as_ref()),
            _ => &[],
        }
    }

    /// Whether this node or any descendant has the given kind
    pub fn contains_kind(&self, kind: CriterionKind) -> bool {
        self.find_first(kind).is_some()
    }

    /// First node of the given kind, depth-first
    pub fn find_first(&self, kind: CriterionKind) -> Option<&Criterion> {
        if self.kind() == kind {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_first(kind))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, op: &str, criteria: &[Criterion]) -> fmt::Result {
            write!(f, "(")?;
            for (i, c) in criteria.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{}", c)?;
            }
            write!(f, ")")
        }

        match self {
            Criterion::Empty => write!(f, "*"),
            Criterion::And(criteria) => join(f, "AND", criteria),
            Criterion::Or(criteria) => join(f, "OR", criteria),
            Criterion::Not(c) => write!(f, "NOT {}", c),
            Criterion::StringMatch { name, value } => write!(f, "{} = \"{}\"", name, value),
            Criterion::StringMatchAny { name, values } => {
                write!(f, "{} IN {:?}", name, values)
            }
            Criterion::IntMatch { name, value } => write!(f, "{} = {}", name, value),
            Criterion::LongMatch { name, value } => write!(f, "{} = {}", name, value),
            Criterion::DateMatch { name, value } => write!(f, "{} = {}", name, value),
            Criterion::Range(r) => {
                write!(f, "{} IN RANGE {:?}", r.name, r.comparisons)
            }
            Criterion::DateRange(r) => write!(
                f,
                "{} IN [{}, {}]",
                r.name,
                r.lower.as_deref().unwrap_or("*"),
                r.upper.as_deref().unwrap_or("*")
            ),
            Criterion::BooleanMatch { name, value } => write!(f, "{} = {}", name, value),
            Criterion::Polygon(p) => write!(f, "INTERSECTS POLYGON({} rings)", p.rings.len()),
            Criterion::BoundaryBox(b) => write!(
                f,
                "INTERSECTS BBOX({}, {}, {}, {})",
                b.min_x, b.min_y, b.max_x, b.max_y
            ),
            Criterion::Circle(c) => write!(f, "INTERSECTS CIRCLE({}, {})", c.center, c.radius),
            Criterion::FieldExists(name) => write!(f, "EXISTS {}", name),
        }
    }
}

/// Whether the tree holds a circle constraint
pub fn contains_circle_criterion(criterion: &Criterion) -> bool {
    criterion.contains_kind(CriterionKind::Circle)
}

/// Whether the tree holds a polygon or bounding-box constraint
pub fn contains_polygon_or_bbox_criterion(criterion: &Criterion) -> bool {
    criterion.contains_kind(CriterionKind::Polygon)
        || criterion.contains_kind(CriterionKind::BoundaryBox)
}

pub fn find_circle_criterion(criterion: &Criterion) -> Option<&CircleCriterion> {
    match criterion.find_first(CriterionKind::Circle) {
        Some(Criterion::Circle(circle)) => Some(circle),
        _ => None,
    }
}

pub fn find_polygon_criterion(criterion: &Criterion) -> Option<&PolygonCriterion> {
    match criterion.find_first(CriterionKind::Polygon) {
        Some(Criterion::Polygon(polygon)) => Some(polygon),
        _ => None,
    }
}
