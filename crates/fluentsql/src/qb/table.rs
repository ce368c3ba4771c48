//! Tables, column lists, grouping and ordering descriptors.

/// A table reference with an optional alias.
///
/// The alias (when present) is the prefix used to qualify this table's columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    name: String,
    alias: Option<String>,
}

impl Table {
    /// Create a table reference without alias.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Create an aliased table reference (`users AS u`).
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            name: name.into(),
            alias: (!alias.is_empty()).then_some(alias),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Qualifier for this table's columns: alias if present, else name.
    pub fn prefix(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Column list of this table's columns.
    pub fn columns(&self, cols: &[&str]) -> Columns {
        Columns::new().add(self, cols)
    }

    /// Grouping on this table's columns.
    pub fn group(&self, cols: &[&str]) -> Groupers {
        Groupers::new().add_table(self, cols)
    }

    /// Ordering on this table's columns.
    pub fn sort(&self, order: SortOrder, cols: &[&str]) -> Sorters {
        Sorters::new().add_table(order, self, cols)
    }
}

// ==================== Columns ====================

/// A single entry of a SELECT list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Column {
    /// `[prefix.]name [AS alias]`
    Bound {
        table: Option<Table>,
        name: String,
        alias: Option<String>,
    },
    /// Raw SQL emitted verbatim (trusted input, no escaping).
    Expr { sql: String, alias: Option<String> },
}

impl Column {
    pub fn alias(&self) -> Option<&str> {
        match self {
            Column::Bound { alias, .. } | Column::Expr { alias, .. } => alias.as_deref(),
        }
    }
}

/// Ordered SELECT list plus the DISTINCT flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Columns {
    pub(crate) distinct: bool,
    pub(crate) items: Vec<Column>,
}

fn non_empty(alias: String) -> Option<String> {
    (!alias.is_empty()).then_some(alias)
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DISTINCT flag.
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Add columns qualified by `table`.
    pub fn add(mut self, table: &Table, cols: &[&str]) -> Self {
        self.items.extend(cols.iter().map(|c| Column::Bound {
            table: Some(table.clone()),
            name: (*c).to_string(),
            alias: None,
        }));
        self
    }

    /// Add unqualified columns.
    pub fn add_plain(mut self, cols: &[&str]) -> Self {
        self.items.extend(cols.iter().map(|c| Column::Bound {
            table: None,
            name: (*c).to_string(),
            alias: None,
        }));
        self
    }

    /// Add one column of `table` with an alias.
    pub fn add_as(mut self, table: &Table, col: &str, alias: impl Into<String>) -> Self {
        self.items.push(Column::Bound {
            table: Some(table.clone()),
            name: col.to_string(),
            alias: non_empty(alias.into()),
        });
        self
    }

    /// Add an expression column such as `COUNT(*)`. Emitted verbatim.
    pub fn add_expr(mut self, sql: impl Into<String>, alias: impl Into<String>) -> Self {
        self.items.push(Column::Expr {
            sql: sql.into(),
            alias: non_empty(alias.into()),
        });
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn items(&self) -> &[Column] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ==================== GROUP BY ====================

/// One GROUP BY entry: columns sharing an optional table qualifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grouper {
    pub table: Option<Table>,
    pub columns: Vec<String>,
}

/// GROUP BY list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Groupers {
    pub(crate) items: Vec<Grouper>,
}

impl Groupers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group by unqualified columns.
    pub fn add(mut self, cols: &[&str]) -> Self {
        self.items.push(Grouper {
            table: None,
            columns: cols.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    /// Group by columns of `table`.
    pub fn add_table(mut self, table: &Table, cols: &[&str]) -> Self {
        self.items.push(Grouper {
            table: Some(table.clone()),
            columns: cols.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    pub fn items(&self) -> &[Grouper] {
        &self.items
    }

    /// True when no column would be emitted.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|g| g.columns.is_empty())
    }
}

// ==================== ORDER BY ====================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry. The direction applies to every listed column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sorter {
    pub order: SortOrder,
    pub table: Option<Table>,
    pub columns: Vec<String>,
}

/// ORDER BY list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sorters {
    pub(crate) items: Vec<Sorter>,
}

impl Sorters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order by unqualified columns.
    pub fn add(mut self, order: SortOrder, cols: &[&str]) -> Self {
        self.items.push(Sorter {
            order,
            table: None,
            columns: cols.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    /// Order by columns of `table`.
    pub fn add_table(mut self, order: SortOrder, table: &Table, cols: &[&str]) -> Self {
        self.items.push(Sorter {
            order,
            table: Some(table.clone()),
            columns: cols.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    pub fn items(&self) -> &[Sorter] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|s| s.columns.is_empty())
    }
}

// ==================== JOIN ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_prefers_alias() {
        assert_eq!(Table::new("users").prefix(), "users");
        assert_eq!(Table::aliased("users", "u").prefix(), "u");
        assert_eq!(Table::aliased("users", "").alias(), None);
    }

    #[test]
    fn test_columns_keep_order() {
        let u = Table::aliased("users", "u");
        let cols = u
            .columns(&["id", "name"])
            .add_expr("COUNT(*)", "n")
            .distinct(true);
        assert!(cols.is_distinct());
        assert_eq!(cols.len(), 3);
        assert_eq!(cols.items()[2].alias(), Some("n"));
    }

    #[test]
    fn test_empty_groupers() {
        assert!(Groupers::new().is_empty());
        assert!(Groupers::new().add(&[]).is_empty());
        assert!(!Groupers::new().add(&["a"]).is_empty());
    }
}
