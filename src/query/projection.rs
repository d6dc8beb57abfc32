use super::reference::{Aliased, EdgeRef, NodeRef, PropertyRef};
use crate::ddl::escape_identifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Collect,
}

impl AggregateFn {
    fn name(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Collect => "collect",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFn,
    /// Rendered argument; `None` means `*`.
    pub arg: Option<String>,
    pub distinct: bool,
}

impl Aggregate {
    pub fn count_all() -> Self {
        Self {
            func: AggregateFn::Count,
            arg: None,
            distinct: false,
        }
    }

    pub fn count(target: impl Into<Projection>) -> Self {
        Self::over(AggregateFn::Count, target)
    }

    pub fn count_distinct(target: impl Into<Projection>) -> Self {
        let mut aggregate = Self::over(AggregateFn::Count, target);
        aggregate.distinct = true;
        aggregate
    }

    pub fn sum(property: PropertyRef) -> Self {
        Self::over(AggregateFn::Sum, property)
    }

    pub fn avg(property: PropertyRef) -> Self {
        Self::over(AggregateFn::Avg, property)
    }

    pub fn min(property: PropertyRef) -> Self {
        Self::over(AggregateFn::Min, property)
    }

    pub fn max(property: PropertyRef) -> Self {
        Self::over(AggregateFn::Max, property)
    }

    pub fn collect(target: impl Into<Projection>) -> Self {
        Self::over(AggregateFn::Collect, target)
    }

    pub fn over(func: AggregateFn, target: impl Into<Projection>) -> Self {
        Self {
            func,
            arg: Some(target.into().render()),
            distinct: false,
        }
    }

    pub fn render(&self) -> String {
        let arg = self.arg.as_deref().unwrap_or("*");
        if self.distinct {
            format!("{}(DISTINCT {arg})", self.func.name())
        } else {
            format!("{}({arg})", self.func.name())
        }
    }
}

/// Something that can appear in RETURN / WITH or as an aggregate argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    Alias(String),
    Property(PropertyRef),
    Aggregate(Aggregate),
    /// Caller-supplied expression emitted verbatim.
    Raw(String),
}

impl Projection {
    pub fn render(&self) -> String {
        match self {
            Projection::Alias(alias) => alias.clone(),
            Projection::Property(property) => property.expr(),
            Projection::Aggregate(aggregate) => aggregate.render(),
            Projection::Raw(expr) => expr.clone(),
        }
    }
}

impl From<&NodeRef> for Projection {
    fn from(node: &NodeRef) -> Self {
        Projection::Alias(node.alias().to_string())
    }
}

impl From<&EdgeRef> for Projection {
    fn from(edge: &EdgeRef) -> Self {
        Projection::Alias(edge.alias().to_string())
    }
}

impl From<PropertyRef> for Projection {
    fn from(property: PropertyRef) -> Self {
        Projection::Property(property)
    }
}

impl From<Aggregate> for Projection {
    fn from(aggregate: Aggregate) -> Self {
        Projection::Aggregate(aggregate)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnItem {
    pub projection: Projection,
    pub alias: Option<String>,
}

impl ReturnItem {
    pub fn new(projection: impl Into<Projection>) -> Self {
        Self {
            projection: projection.into(),
            alias: None,
        }
    }

    pub fn as_(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.projection.render(), escape_identifier(alias)),
            None => self.projection.render(),
        }
    }
}

impl From<Projection> for ReturnItem {
    fn from(projection: Projection) -> Self {
        ReturnItem::new(projection)
    }
}

impl From<&NodeRef> for ReturnItem {
    fn from(node: &NodeRef) -> Self {
        ReturnItem::new(node)
    }
}

impl From<&EdgeRef> for ReturnItem {
    fn from(edge: &EdgeRef) -> Self {
        ReturnItem::new(edge)
    }
}

impl From<PropertyRef> for ReturnItem {
    fn from(property: PropertyRef) -> Self {
        ReturnItem::new(property)
    }
}

impl From<Aggregate> for ReturnItem {
    fn from(aggregate: Aggregate) -> Self {
        ReturnItem::new(aggregate)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
