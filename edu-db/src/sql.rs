//! A small structured SQL builder.
//!
//! Queries are assembled from clause lists, and every user-supplied value
//! travels as a bound `?` parameter. A [`Fragment`] carries its SQL text
//! together with the parameters for its placeholders, so fragments can be
//! nested (sub-selects, `EXISTS`, derived-table joins) without losing track
//! of parameter order.

use serde::Serialize;

/// SQL text plus the values bound to its `?` placeholders, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<String>,
}

impl Fragment {
    /// SQL without placeholders.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// `column = ?`
    pub fn eq(column: &str, value: &str) -> Self {
        Self {
            sql: format!("{column} = ?"),
            params: vec![value.to_string()],
        }
    }

    /// `column IN (?, ?, …)`, or `None` for an empty list: an empty
    /// selection places no restriction.
    pub fn in_list(column: &str, values: &[&str]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        Some(Self {
            sql: format!("{column} IN ({placeholders})"),
            params: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    /// `self OR other`
    pub fn or(self, other: Fragment) -> Self {
        let mut params = self.params;
        params.extend(other.params);
        Self {
            sql: format!("{} OR {}", self.sql, other.sql),
            params,
        }
    }

    /// `(self)`
    pub fn grouped(self) -> Self {
        Self {
            sql: format!("({})", self.sql),
            params: self.params,
        }
    }

    /// `EXISTS (self)`
    pub fn exists(self) -> Self {
        Self {
            sql: format!("EXISTS ({})", self.sql),
            params: self.params,
        }
    }

    /// Conjunction of the present parts; `None` when there are none.
    pub fn all(parts: impl IntoIterator<Item = Option<Fragment>>) -> Option<Self> {
        let parts: Vec<Fragment> = parts.into_iter().flatten().collect();
        if parts.is_empty() {
            return None;
        }
        Some(Self::join(parts, " AND "))
    }

    fn join(parts: Vec<Fragment>, separator: &str) -> Self {
        let sql = parts
            .iter()
            .map(|p| p.sql.as_str())
            .collect::<Vec<_>>()
            .join(separator);
        let params = parts.into_iter().flat_map(|p| p.params).collect();
        Self { sql, params }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// Clause lists of one `SELECT` statement.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    distinct: bool,
    select: Vec<String>,
    from: String,
    joins: Vec<Fragment>,
    conditions: Vec<Fragment>,
    group_by: Vec<String>,
    order_by: Vec<String>,
}

impl SqlBuilder {
    pub fn from(table: &str) -> Self {
        Self {
            distinct: false,
            select: Vec::new(),
            from: table.to_string(),
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn select(&mut self, expr: &str) -> &mut Self {
        self.select.push(expr.to_string());
        self
    }

    /// `JOIN (subquery) alias ON on`
    pub fn join(&mut self, kind: JoinKind, subquery: Fragment, alias: &str, on: &str) -> &mut Self {
        let keyword = match kind {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        };
        self.joins.push(Fragment {
            sql: format!("{keyword} ({}) {alias} ON {on}", subquery.sql),
            params: subquery.params,
        });
        self
    }

    pub fn filter(&mut self, condition: Fragment) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn filter_opt(&mut self, condition: Option<Fragment>) -> &mut Self {
        if let Some(condition) = condition {
            self.conditions.push(condition);
        }
        self
    }

    pub fn group_by(&mut self, expr: &str) -> &mut Self {
        self.group_by.push(expr.to_string());
        self
    }

    pub fn order_by(&mut self, expr: &str) -> &mut Self {
        self.order_by.push(expr.to_string());
        self
    }

    /// Renders the statement. Parameters follow the textual order of their
    /// placeholders: joins first, then the `WHERE` conditions.
    pub fn to_fragment(&self) -> Fragment {
        let columns = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(", ")
        };
        let mut lines = vec![format!(
            "SELECT {}{columns}",
            if self.distinct { "DISTINCT " } else { "" }
        )];
        lines.push(format!("FROM {}", self.from));

        let mut params = Vec::new();
        for join in &self.joins {
            lines.push(join.sql.clone());
            params.extend(join.params.iter().cloned());
        }
        if let Some(condition) = Fragment::all(self.conditions.iter().cloned().map(Some)) {
            lines.push(format!("WHERE {}", condition.sql));
            params.extend(condition.params);
        }
        if !self.group_by.is_empty() {
            lines.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }
        if !self.order_by.is_empty() {
            lines.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }

        Fragment {
            sql: lines.join("\n"),
            params,
        }
    }

    pub fn build(&self, shape: RowShape) -> CompiledQuery {
        let Fragment { sql, params } = self.to_fragment();
        CompiledQuery { sql, params, shape }
    }
}

/// Administrative level of the rows returned by a map query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// One row per county: `judet, value`.
    County,
    /// One row per town of a county: `judet, localitate, value`.
    Town,
}

/// Layout of the rows a query produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowShape {
    Regions {
        grouping: Grouping,
        value_column: &'static str,
    },
    Schools,
}

/// A finished statement ready for the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<String>,
    pub shape: RowShape,
}
